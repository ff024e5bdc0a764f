//! Deep-object query parameter filtering for HTTP APIs
//!
//! Parses bracket-chained query parameters such as
//! `filter[system_profile][cpu_flags][contains]=clzero` into a composable
//! [`Predicate`] that a data layer can evaluate. The bracket syntax follows
//! the OpenAPI "deepObject" parameter style informally: each bracket group
//! becomes one path segment, and a reserved trailing segment (`eq`, `ne`,
//! `gt`, `nil`, ...) changes the comparison instead of naming a field.
//!
//! All parameters matched in one filter namespace are ANDed into a single
//! predicate; `ne` negates its own leaf. Unrecognized trailing keywords pass
//! through as path segments, since they may just as well be keys inside a
//! nested mapping.
//!
//! ```
//! use deepfilter::{parse_filter, Predicate, QueryParams};
//!
//! let params = QueryParams::from_query_str(
//!     "filter[system_profile][sap_system]=true\
//!      &filter[system_profile][system_memory_bytes][gt]=4000000000",
//! );
//! let predicate = parse_filter(&params, "system_profile").unwrap();
//! assert_eq!(
//!     predicate,
//!     Predicate::compare("system_profile.sap_system", true)
//!         & Predicate::compare("system_profile.system_memory_bytes.gt", 4000000000i64),
//! );
//! ```

pub mod error;
pub mod extract;
pub mod filter;
pub mod query;

pub use error::FilterError;
pub use extract::OrderedQuery;
pub use filter::{DeepObjectFilter, FilterValue, Predicate, parse_filter};
pub use query::QueryParams;
