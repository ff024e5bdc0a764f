//! Deep-object filter parsing and predicate evaluation
//!
//! Turns `filter[...][...]=value` query parameters into a [`Predicate`]
//! tree and optionally evaluates that tree against JSON records in memory.
//!
//! ## Usage
//!
//! ```
//! use deepfilter::filter::{DeepObjectFilter, Predicate};
//! use deepfilter::query::QueryParams;
//!
//! let params = QueryParams::from_query_str("filter[system_profile][started][ne]=true");
//! let predicate = DeepObjectFilter::new("system_profile").parse(&params).unwrap();
//! assert_eq!(predicate, !Predicate::compare("system_profile.started", true));
//! ```

mod matcher;
mod parser;
mod types;

pub use parser::{DeepObjectFilter, parse_filter};
pub use types::{FilterValue, Predicate};
