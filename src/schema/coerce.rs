//! String/numeric coercion
//!
//! Every place that compares a response value against a code, a predicate
//! operand, or a numeric bound goes through this module:
//!
//! - Validation accepts `"1"` where the option code `1` was declared (and
//!   vice versa) by comparing string forms.
//! - Mask evaluation coerces numeric-looking text operands when the target
//!   column is numeric.
//! - Metrics coerce cells to numbers, treating unparsable text as null.

use std::cmp::Ordering;

use super::types::Scalar;

/// Parses trimmed text as a finite number.
pub fn parse_numeric(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Coerces a cell to a number. Null and unparsable text become `None`.
pub fn to_numeric(cell: Option<&Scalar>) -> Option<f64> {
    match cell? {
        Scalar::Int(i) => Some(*i as f64),
        Scalar::Float(f) if f.is_finite() => Some(*f),
        Scalar::Float(_) => None,
        Scalar::Text(s) => parse_numeric(s),
    }
}

/// Coerces a predicate operand for comparison against a column.
///
/// Numeric-looking text becomes a float when the column is numeric;
/// everything else is returned unchanged.
pub fn coerce_for_column(value: &Scalar, column_is_numeric: bool) -> Scalar {
    if column_is_numeric {
        if let Scalar::Text(s) = value {
            if let Some(n) = parse_numeric(s) {
                return Scalar::Float(n);
            }
        }
    }
    value.clone()
}

/// Strict cell comparison used by mask evaluation.
///
/// Numbers compare numerically (`1 == 1.0`), text compares exactly, and a
/// number never equals text.
pub fn cell_matches(cell: &Scalar, value: &Scalar) -> bool {
    match (cell, value) {
        (Scalar::Text(a), Scalar::Text(b)) => a == b,
        (Scalar::Text(_), _) | (_, Scalar::Text(_)) => false,
        (a, b) => a.as_f64() == b.as_f64(),
    }
}

/// Lenient code comparison used by validation and label lookup.
///
/// Falls back to comparing string forms so that `"1"` names the code `1`.
pub fn codes_match(raw: &Scalar, code: &Scalar) -> bool {
    if raw.is_numeric() && code.is_numeric() {
        return raw.as_f64() == code.as_f64();
    }
    raw == code || raw.to_string() == code.to_string()
}

/// Canonical string form of an option code, used for duplicate detection.
pub fn option_key(code: &Scalar) -> String {
    code.to_string()
}

/// Totally ordered grouping key for response values.
///
/// Numbers sort before text; `1` and `1.0` share a key.
#[derive(Debug, Clone)]
pub enum ScalarKey {
    Number(f64),
    Text(String),
}

impl ScalarKey {
    pub fn of(value: &Scalar) -> Self {
        match value {
            Scalar::Text(s) => ScalarKey::Text(s.clone()),
            other => {
                let n = other.as_f64().unwrap_or(f64::NAN);
                // -0.0 and 0.0 must land in the same group
                ScalarKey::Number(if n == 0.0 { 0.0 } else { n })
            }
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, ScalarKey::Number(_))
    }
}

impl PartialEq for ScalarKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScalarKey {}

impl PartialOrd for ScalarKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScalarKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (ScalarKey::Number(a), ScalarKey::Number(b)) => a.total_cmp(b),
            (ScalarKey::Number(_), ScalarKey::Text(_)) => Ordering::Less,
            (ScalarKey::Text(_), ScalarKey::Number(_)) => Ordering::Greater,
            (ScalarKey::Text(a), ScalarKey::Text(b)) => a.cmp(b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numeric() {
        assert_eq!(parse_numeric(" 42 "), Some(42.0));
        assert_eq!(parse_numeric("3.5"), Some(3.5));
        assert_eq!(parse_numeric(""), None);
        assert_eq!(parse_numeric("abc"), None);
        assert_eq!(parse_numeric("inf"), None);
        assert_eq!(parse_numeric("NaN"), None);
    }

    #[test]
    fn test_to_numeric() {
        assert_eq!(to_numeric(Some(&Scalar::Int(7))), Some(7.0));
        assert_eq!(to_numeric(Some(&Scalar::from("8"))), Some(8.0));
        assert_eq!(to_numeric(Some(&Scalar::from("n/a"))), None);
        assert_eq!(to_numeric(None), None);
    }

    #[test]
    fn test_coerce_for_numeric_column() {
        assert_eq!(coerce_for_column(&Scalar::from("5"), true), Scalar::Float(5.0));
        assert_eq!(coerce_for_column(&Scalar::from("5"), false), Scalar::from("5"));
        assert_eq!(coerce_for_column(&Scalar::from("x"), true), Scalar::from("x"));
    }

    #[test]
    fn test_cell_matches_is_strict_across_kinds() {
        assert!(cell_matches(&Scalar::Int(1), &Scalar::Float(1.0)));
        assert!(cell_matches(&Scalar::from("A"), &Scalar::from("A")));
        assert!(!cell_matches(&Scalar::from("1"), &Scalar::Int(1)));
        assert!(!cell_matches(&Scalar::Int(1), &Scalar::from("1")));
    }

    #[test]
    fn test_codes_match_falls_back_to_string_form() {
        assert!(codes_match(&Scalar::from("1"), &Scalar::Int(1)));
        assert!(codes_match(&Scalar::Int(1), &Scalar::from("1")));
        assert!(codes_match(&Scalar::Float(2.0), &Scalar::Int(2)));
        assert!(!codes_match(&Scalar::from("NORTH"), &Scalar::from("SOUTH")));
    }

    #[test]
    fn test_scalar_key_ordering() {
        let mut keys = vec![
            ScalarKey::of(&Scalar::from("b")),
            ScalarKey::of(&Scalar::Int(10)),
            ScalarKey::of(&Scalar::from("a")),
            ScalarKey::of(&Scalar::Float(2.5)),
        ];
        keys.sort();
        assert_eq!(keys[0], ScalarKey::Number(2.5));
        assert_eq!(keys[1], ScalarKey::Number(10.0));
        assert_eq!(keys[2], ScalarKey::Text("a".into()));
        assert_eq!(ScalarKey::of(&Scalar::Int(1)), ScalarKey::of(&Scalar::Float(1.0)));
    }
}
