//! Deep-object filter parameter parsing
//!
//! Recognizes bracket-chained query parameters inside one filter namespace
//! (`filter[system_profile][cpu_flags][contains]=clzero`), coerces the raw
//! values, rewrites operator keywords and folds every match into a single
//! conjunctive [`Predicate`].

use std::sync::OnceLock;

use regex::Regex;

use crate::error::FilterError;
use crate::query::QueryParams;

use super::types::{FilterValue, Predicate};

/// Operators that require an integer operand.
const ORDERING_OPS: [&str; 4] = ["gt", "gte", "lt", "lte"];

/// Full-key grammar: one identifier followed by one or more bracket groups,
/// each holding word characters only.
fn key_pattern() -> &'static Regex {
    static KEY_RE: OnceLock<Regex> = OnceLock::new();
    KEY_RE.get_or_init(|| {
        Regex::new(r"^(?P<root>\w+)(?P<brackets>(?:\[\w+\])+)$").expect("Invalid regex")
    })
}

/// Keywords accepted as aliases for native comparison segments.
///
/// Anything not listed here and not otherwise reserved passes through as a
/// plain path segment: a trailing `contains` or `regex` may just as well be
/// a key inside a nested mapping, so unknown keywords are data, not errors.
fn translate_comparator(segment: &str) -> Option<&'static str> {
    match segment {
        "eq_i" => Some("iexact"),
        "contains_i" => Some("icontains"),
        "starts_with_i" => Some("istartswith"),
        "ends_with_i" => Some("iendswith"),
        "starts_with" => Some("startswith"),
        "ends_with" => Some("endswith"),
        _ => None,
    }
}

/// Exactly four spellings are recognized; any other casing stays a string.
fn parse_bool_literal(raw: &str) -> Option<bool> {
    match raw {
        "true" | "True" => Some(true),
        "false" | "False" => Some(false),
        _ => None,
    }
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Parser for one deep-object filter namespace.
///
/// Only parameters of the form `<param_name>[<filter_prefix>][...]` are
/// considered; everything else in the query string is ignored, so several
/// independent filter namespaces (and unrelated parameters) coexist safely.
#[derive(Debug, Clone)]
pub struct DeepObjectFilter<'a> {
    filter_prefix: &'a str,
    param_name: &'a str,
    field_prefix: Option<&'a str>,
}

impl<'a> DeepObjectFilter<'a> {
    /// Parser for `filter[<filter_prefix>][...]` parameters.
    pub fn new(filter_prefix: &'a str) -> Self {
        Self {
            filter_prefix,
            param_name: "filter",
            field_prefix: None,
        }
    }

    /// Override the root keyword, letting several independent filter
    /// namespaces coexist under different roots.
    pub fn param_name(mut self, param_name: &'a str) -> Self {
        self.param_name = param_name;
        self
    }

    /// Prepend a path segment to every produced predicate path, redirecting
    /// the filter onto a related entity without clients knowing the join.
    pub fn field_prefix(mut self, field_prefix: &'a str) -> Self {
        self.field_prefix = Some(field_prefix);
        self
    }

    /// Parse every matching parameter into one conjunctive predicate.
    ///
    /// Returns [`Predicate::True`] when nothing in the query string claims
    /// this namespace. A parameter that claims it but breaks the bracket
    /// grammar, or supplies a non-integer value to an ordering operator,
    /// fails the whole call; the first offending key in request order wins.
    pub fn parse(&self, params: &QueryParams) -> Result<Predicate, FilterError> {
        let prefix = format!("{}[{}][", self.param_name, self.filter_prefix);
        let mut combined = Predicate::True;

        for (key, raw_value) in params.iter() {
            // Only parameters that explicitly claim this namespace are
            // scrutinized; other filter syntaxes we don't understand must
            // not trip validation.
            if !key.starts_with(&prefix) {
                continue;
            }
            let caps = key_pattern().captures(key).ok_or_else(|| {
                tracing::debug!(param = key, "filter parameter failed bracket grammar");
                FilterError::malformed(self.param_name)
            })?;
            let brackets = &caps["brackets"];
            let mut parts: Vec<&str> = brackets[1..brackets.len() - 1].split("][").collect();

            // The prefix guarantees at least two bracket groups, so `parts`
            // keeps at least one segment after a single operator pop.
            let value = self.coerce_value(raw_value, parts[parts.len() - 1])?;
            let (value, negate) = normalize_operator(&mut parts, value);

            if let Some(field_prefix) = self.field_prefix {
                parts.insert(0, field_prefix);
            }
            let mut predicate = Predicate::compare(parts.join("."), value);
            if negate {
                predicate = !predicate;
            }
            tracing::debug!(param = key, "matched deep-object filter parameter");
            combined = combined & predicate;
        }

        Ok(combined)
    }

    /// Coerce the raw value: boolean literals first, then operator-driven
    /// integer coercion keyed on the (pre-rewrite) trailing segment.
    fn coerce_value(&self, raw: &str, last: &str) -> Result<FilterValue, FilterError> {
        if let Some(b) = parse_bool_literal(raw) {
            // Boolean literals win even under ordering operators.
            return Ok(FilterValue::Bool(b));
        }
        if ORDERING_OPS.contains(&last) {
            if !all_digits(raw) {
                return Err(FilterError::non_integer(self.param_name));
            }
            // All-digit but beyond i64 is still not a usable operand.
            let n = raw
                .parse::<i64>()
                .map_err(|_| FilterError::non_integer(self.param_name))?;
            return Ok(FilterValue::Int(n));
        }
        if (last == "eq" || last == "ne") && all_digits(raw) {
            // Numeric equality special case: an all-digit operand under
            // eq/ne compares as a number, not a string.
            if let Ok(n) = raw.parse::<i64>() {
                return Ok(FilterValue::Int(n));
            }
        }
        Ok(FilterValue::Str(raw.to_string()))
    }
}

/// Rewrite trailing operator keywords in place, returning the (possibly
/// replaced) value and whether the resulting predicate is negated.
fn normalize_operator(parts: &mut Vec<&str>, mut value: FilterValue) -> (FilterValue, bool) {
    let mut negate = false;
    match parts[parts.len() - 1] {
        // Equality is the implicit default operator.
        "eq" => {
            parts.pop();
        }
        "ne" => {
            negate = true;
            parts.pop();
        }
        _ => {}
    }
    let last = parts.len() - 1;
    match parts[last] {
        tail @ ("nil" | "not_nil") => {
            // A nil check without an explicit boolean asserts the condition.
            let mut b = match value {
                FilterValue::Bool(b) => b,
                _ => true,
            };
            if tail == "not_nil" {
                b = !b;
            }
            value = FilterValue::Bool(b);
            parts[last] = "isnull";
        }
        tail => {
            if let Some(mapped) = translate_comparator(tail) {
                parts[last] = mapped;
            }
        }
    }
    (value, negate)
}

/// Parse `filter[<filter_prefix>][...]` parameters with default settings.
pub fn parse_filter(params: &QueryParams, filter_prefix: &str) -> Result<Predicate, FilterError> {
    DeepObjectFilter::new(filter_prefix).parse(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> QueryParams {
        pairs.iter().copied().collect()
    }

    #[test]
    fn empty_query_yields_identity() {
        let result = parse_filter(&QueryParams::new(), "system_profile").unwrap();
        assert!(result.is_true());
    }

    #[test]
    fn unrelated_params_are_ignored() {
        let qp = params(&[
            ("page", "2"),
            ("filter[other_field][x]", "1"),
            ("filter[system_profile]", "whole-value"),
        ]);
        let result = parse_filter(&qp, "system_profile").unwrap();
        assert!(result.is_true());
    }

    #[test]
    fn boolean_literal_spellings() {
        let cases = [
            ("true", true),
            ("True", true),
            ("false", false),
            ("False", false),
        ];
        for (raw, expected) in cases {
            let qp = params(&[("filter[system_profile][started]", raw)]);
            let result = parse_filter(&qp, "system_profile").unwrap();
            assert_eq!(
                result,
                Predicate::compare("system_profile.started", expected),
                "raw value {:?}",
                raw
            );
        }
    }

    #[test]
    fn other_boolean_casings_stay_strings() {
        let qp = params(&[("filter[system_profile][started]", "TRUE")]);
        let result = parse_filter(&qp, "system_profile").unwrap();
        assert_eq!(result, Predicate::compare("system_profile.started", "TRUE"));
    }

    #[test]
    fn unrecognized_keyword_passes_through() {
        let qp = params(&[("filter[system_profile][cpu_flags][contains]", "clzero")]);
        let result = parse_filter(&qp, "system_profile").unwrap();
        assert_eq!(
            result,
            Predicate::compare("system_profile.cpu_flags.contains", "clzero")
        );
    }

    #[test]
    fn ordering_operator_coerces_integer() {
        let qp = params(&[(
            "filter[system_profile][system_memory_bytes][gt]",
            "4000000000",
        )]);
        let result = parse_filter(&qp, "system_profile").unwrap();
        assert_eq!(
            result,
            Predicate::compare("system_profile.system_memory_bytes.gt", 4000000000i64)
        );
    }

    #[test]
    fn bare_digits_stay_strings_without_operator() {
        let qp = params(&[("filter[system_profile][number_of_sockets]", "1")]);
        let result = parse_filter(&qp, "system_profile").unwrap();
        assert_eq!(
            result,
            Predicate::compare("system_profile.number_of_sockets", "1")
        );
    }

    #[test]
    fn eq_coerces_digits_and_drops_segment() {
        let qp = params(&[("filter[system_profile][number_of_sockets][eq]", "1")]);
        let result = parse_filter(&qp, "system_profile").unwrap();
        assert_eq!(
            result,
            Predicate::compare("system_profile.number_of_sockets", 1i64)
        );
    }

    #[test]
    fn ne_negates_and_drops_segment() {
        let qp = params(&[("filter[system_profile][started][ne]", "true")]);
        let result = parse_filter(&qp, "system_profile").unwrap();
        assert_eq!(result, !Predicate::compare("system_profile.started", true));
    }

    #[test]
    fn nil_rewrites_to_isnull() {
        let qp = params(&[("filter[system_profile][registered][nil]", "")]);
        let result = parse_filter(&qp, "system_profile").unwrap();
        assert_eq!(
            result,
            Predicate::compare("system_profile.registered.isnull", true)
        );
    }

    #[test]
    fn nil_keeps_explicit_boolean() {
        let qp = params(&[("filter[system_profile][registered][nil]", "false")]);
        let result = parse_filter(&qp, "system_profile").unwrap();
        assert_eq!(
            result,
            Predicate::compare("system_profile.registered.isnull", false)
        );
    }

    #[test]
    fn not_nil_inverts_the_boolean() {
        let qp = params(&[("filter[system_profile][registered][not_nil]", "x")]);
        let result = parse_filter(&qp, "system_profile").unwrap();
        assert_eq!(
            result,
            Predicate::compare("system_profile.registered.isnull", false)
        );

        let qp = params(&[("filter[system_profile][registered][not_nil]", "false")]);
        let result = parse_filter(&qp, "system_profile").unwrap();
        assert_eq!(
            result,
            Predicate::compare("system_profile.registered.isnull", true)
        );
    }

    #[test]
    fn ne_after_nil_negates_the_isnull_leaf() {
        let qp = params(&[("filter[system_profile][registered][nil][ne]", "true")]);
        let result = parse_filter(&qp, "system_profile").unwrap();
        assert_eq!(
            result,
            !Predicate::compare("system_profile.registered.isnull", true)
        );
    }

    #[test]
    fn comparator_aliases_are_rewritten() {
        let cases = [
            ("eq_i", "iexact"),
            ("contains_i", "icontains"),
            ("starts_with_i", "istartswith"),
            ("ends_with_i", "iendswith"),
            ("starts_with", "startswith"),
            ("ends_with", "endswith"),
        ];
        for (alias, native) in cases {
            let key = format!("filter[system_profile][owner][{}]", alias);
            let qp = params(&[(key.as_str(), "bob")]);
            let result = parse_filter(&qp, "system_profile").unwrap();
            assert_eq!(
                result,
                Predicate::compare(format!("system_profile.owner.{}", native), "bob")
            );
        }
    }

    #[test]
    fn multiple_params_fold_with_and() {
        let qp = params(&[
            ("filter[system_profile][sap_system]", "true"),
            ("filter[system_profile][number_of_sockets][eq]", "2"),
            ("filter[system_profile][owner][starts_with]", "ad"),
        ]);
        let result = parse_filter(&qp, "system_profile").unwrap();
        assert_eq!(
            result,
            Predicate::And {
                preds: vec![
                    Predicate::compare("system_profile.sap_system", true),
                    Predicate::compare("system_profile.number_of_sockets", 2i64),
                    Predicate::compare("system_profile.owner.startswith", "ad"),
                ]
            }
        );
    }

    #[test]
    fn malformed_key_is_rejected() {
        let qp = params(&[("filter[system_profile][bogus]key", "x")]);
        let err = parse_filter(&qp, "system_profile").unwrap_err();
        assert_eq!(err, FilterError::malformed("filter"));
    }

    #[test]
    fn malformed_key_aborts_after_valid_ones() {
        let qp = params(&[
            ("filter[system_profile][sap_system]", "true"),
            ("filter[system_profile][broken]!", "x"),
        ]);
        assert!(parse_filter(&qp, "system_profile").is_err());
    }

    #[test]
    fn malformed_key_in_other_namespace_is_ignored() {
        let qp = params(&[("filter[other_field][bogus]key", "x")]);
        let result = parse_filter(&qp, "system_profile").unwrap();
        assert!(result.is_true());
    }

    #[test]
    fn non_integer_ordering_operand_is_rejected() {
        for raw in ["abc", "-5", "1.5", ""] {
            let qp = params(&[("filter[system_profile][size][gt]", raw)]);
            let err = parse_filter(&qp, "system_profile").unwrap_err();
            assert_eq!(err, FilterError::non_integer("filter"), "raw value {:?}", raw);
        }
    }

    #[test]
    fn overflowing_ordering_operand_is_rejected() {
        let qp = params(&[("filter[system_profile][size][gt]", "99999999999999999999")]);
        assert!(parse_filter(&qp, "system_profile").is_err());
    }

    #[test]
    fn overflowing_eq_operand_stays_string() {
        let qp = params(&[("filter[system_profile][serial][eq]", "99999999999999999999")]);
        let result = parse_filter(&qp, "system_profile").unwrap();
        assert_eq!(
            result,
            Predicate::compare("system_profile.serial", "99999999999999999999")
        );
    }

    #[test]
    fn boolean_literal_wins_over_ordering_coercion() {
        let qp = params(&[("filter[system_profile][size][gt]", "true")]);
        let result = parse_filter(&qp, "system_profile").unwrap();
        assert_eq!(result, Predicate::compare("system_profile.size.gt", true));
    }

    #[test]
    fn field_prefix_is_prepended() {
        let qp = params(&[("filter[system_profile][x]", "1")]);
        let result = DeepObjectFilter::new("system_profile")
            .field_prefix("related")
            .parse(&qp)
            .unwrap();
        assert_eq!(result, Predicate::compare("related.system_profile.x", "1"));
    }

    #[test]
    fn param_name_can_be_overridden() {
        let qp = params(&[
            ("search[system_profile][x]", "1"),
            ("filter[system_profile][y]", "2"),
        ]);
        let result = DeepObjectFilter::new("system_profile")
            .param_name("search")
            .parse(&qp)
            .unwrap();
        assert_eq!(result, Predicate::compare("system_profile.x", "1"));
    }

    #[test]
    fn operator_directly_after_prefix_keeps_the_prefix_segment() {
        // filter[system_profile][eq]=3 pops `eq`, leaving the prefix itself
        // as the whole path.
        let qp = params(&[("filter[system_profile][eq]", "3")]);
        let result = parse_filter(&qp, "system_profile").unwrap();
        assert_eq!(result, Predicate::compare("system_profile", 3i64));
    }
}
