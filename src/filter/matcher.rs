//! In-memory predicate evaluation over JSON records
//!
//! The leaf grammar mirrors what the parser emits: a dot-joined field path
//! whose trailing segment may name a comparison. A trailing segment naming
//! a comparison keyword is always applied as the comparison here, so a
//! field that shares its name with a keyword cannot be addressed by this
//! evaluator; the parser itself stays agnostic and other data layers may
//! resolve the collision differently.
//!
//! Equality is type-strict: integers match only JSON numbers and strings
//! match only JSON strings, so the string `"1"` never matches the number 1.

use serde_json::Value as JsonValue;

use super::types::{FilterValue, Predicate};

/// Comparison keywords understood by the evaluator.
const COMPARISONS: [&str; 14] = [
    "eq",
    "gt",
    "gte",
    "lt",
    "lte",
    "contains",
    "icontains",
    "startswith",
    "istartswith",
    "endswith",
    "iendswith",
    "iexact",
    "isnull",
    "regex",
];

impl Predicate {
    /// Evaluate this predicate against a JSON record.
    pub fn matches(&self, record: &JsonValue) -> bool {
        match self {
            Self::True => true,
            Self::And { preds } => preds.iter().all(|p| p.matches(record)),
            Self::Not { inner } => !inner.matches(record),
            Self::Compare { path, value } => eval_compare(path, value, record),
        }
    }
}

/// Split a dot path into field segments and the trailing comparison, with
/// implicit equality when no keyword is present. A path that is nothing but
/// a keyword is treated as a field name.
fn split_comparison(path: &str) -> (Vec<&str>, &str) {
    let segments: Vec<&str> = path.split('.').collect();
    match segments.split_last() {
        Some((&last, rest)) if !rest.is_empty() && COMPARISONS.contains(&last) => {
            (rest.to_vec(), last)
        }
        _ => (segments, "eq"),
    }
}

fn eval_compare(path: &str, value: &FilterValue, record: &JsonValue) -> bool {
    let (field_segments, op) = split_comparison(path);

    let mut node = record;
    for segment in &field_segments {
        match node {
            JsonValue::Object(map) => match map.get(*segment) {
                Some(child) => node = child,
                // A missing field only ever satisfies a nil check.
                None => return op == "isnull" && *value == FilterValue::Bool(true),
            },
            _ => return op == "isnull" && *value == FilterValue::Bool(true),
        }
    }

    match op {
        "eq" => value_eq(node, value),
        "isnull" => *value == FilterValue::Bool(node.is_null()),
        "gt" | "gte" | "lt" | "lte" => ordering_matches(node, value, op),
        "contains" => contains_matches(node, value, false),
        "icontains" => contains_matches(node, value, true),
        "iexact" => string_matches(node, value, true, |field, operand| field == operand),
        "startswith" => string_matches(node, value, false, |f, o| f.starts_with(o)),
        "istartswith" => string_matches(node, value, true, |f, o| f.starts_with(o)),
        "endswith" => string_matches(node, value, false, |f, o| f.ends_with(o)),
        "iendswith" => string_matches(node, value, true, |f, o| f.ends_with(o)),
        "regex" => regex_matches(node, value),
        _ => false,
    }
}

/// Type-strict equality: numbers never match strings and vice versa.
fn value_eq(node: &JsonValue, value: &FilterValue) -> bool {
    match (node, value) {
        (JsonValue::Bool(field), FilterValue::Bool(operand)) => field == operand,
        (JsonValue::Number(field), FilterValue::Int(operand)) => field.as_i64() == Some(*operand),
        (JsonValue::String(field), FilterValue::Str(operand)) => field == operand,
        _ => false,
    }
}

fn ordering_matches(node: &JsonValue, value: &FilterValue, op: &str) -> bool {
    let (Some(field), FilterValue::Int(operand)) = (node.as_f64(), value) else {
        return false;
    };
    let operand = *operand as f64;
    match op {
        "gt" => field > operand,
        "gte" => field >= operand,
        "lt" => field < operand,
        "lte" => field <= operand,
        _ => false,
    }
}

/// Array membership or substring containment.
fn contains_matches(node: &JsonValue, value: &FilterValue, case_insensitive: bool) -> bool {
    match node {
        JsonValue::Array(items) => items.iter().any(|item| {
            if case_insensitive {
                if let (JsonValue::String(field), FilterValue::Str(operand)) = (item, value) {
                    return field.eq_ignore_ascii_case(operand);
                }
            }
            value_eq(item, value)
        }),
        JsonValue::String(field) => {
            let FilterValue::Str(operand) = value else {
                return false;
            };
            if case_insensitive {
                field.to_lowercase().contains(&operand.to_lowercase())
            } else {
                field.contains(operand.as_str())
            }
        }
        _ => false,
    }
}

fn string_matches(
    node: &JsonValue,
    value: &FilterValue,
    case_insensitive: bool,
    compare: impl Fn(&str, &str) -> bool,
) -> bool {
    let (JsonValue::String(field), FilterValue::Str(operand)) = (node, value) else {
        return false;
    };
    if case_insensitive {
        compare(&field.to_lowercase(), &operand.to_lowercase())
    } else {
        compare(field, operand)
    }
}

/// An invalid pattern simply fails to match.
fn regex_matches(node: &JsonValue, value: &FilterValue) -> bool {
    let (JsonValue::String(field), FilterValue::Str(pattern)) = (node, value) else {
        return false;
    };
    regex::Regex::new(pattern).is_ok_and(|re| re.is_match(field))
}
