use std::cmp::Ordering;
use std::fmt;

/// A single cell, kept in the type it was read with.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Display string for a cell, with `null` standing in for missing values.
    pub fn display(&self, null: &str) -> String {
        match self {
            Value::Null => null.to_string(),
            other => other.to_string(),
        }
    }

    /// Orders two non-null cells of one column. Numbers compare numerically
    /// with NaN above every other number, as polars sorts them; everything
    /// else falls back to the display string.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self.as_f64(), other.as_f64()) {
            (Some(a), Some(b)) => match (a.is_nan(), b.is_nan()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
            },
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => match (self, other) {
                (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
                (Value::Str(a), Value::Str(b)) => a.cmp(b),
                (a, b) => a.to_string().cmp(&b.to_string()),
            },
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            // Whole floats keep their decimal point so "10.0" never reads as an integer.
            Value::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{v:.1}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Str(s) => f.write_str(s),
        }
    }
}

/// Column type inferred from raw text cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inferred {
    Int,
    Float,
    Bool,
    Str,
}

/// Infers a column type the way the CSV readers do: every non-empty cell must
/// parse for a numeric or boolean type to win.
pub fn infer_column<'a>(cells: impl Iterator<Item = &'a str> + Clone) -> Inferred {
    let non_empty = || cells.clone().filter(|c| !c.is_empty());
    if non_empty().next().is_none() {
        Inferred::Str
    } else if non_empty().all(|c| c.parse::<i64>().is_ok()) {
        Inferred::Int
    } else if non_empty().all(|c| c.parse::<f64>().is_ok()) {
        Inferred::Float
    } else if non_empty().all(|c| c.eq_ignore_ascii_case("true") || c.eq_ignore_ascii_case("false")) {
        Inferred::Bool
    } else {
        Inferred::Str
    }
}

pub fn parse_cell(raw: &str, kind: Inferred) -> Value {
    if raw.is_empty() {
        return Value::Null;
    }
    match kind {
        Inferred::Int => raw.parse().map(Value::Int).unwrap_or(Value::Null),
        Inferred::Float => raw.parse().map(Value::Float).unwrap_or(Value::Null),
        Inferred::Bool => Value::Bool(raw.eq_ignore_ascii_case("true")),
        Inferred::Str => Value::Str(raw.to_string()),
    }
}

/// Rounds to one decimal place, ties to even.
pub fn round1(v: f64) -> f64 {
    (v * 10.0).round_ties_even() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floats_keep_a_decimal_point() {
        assert_eq!(Value::Float(10.0).to_string(), "10.0");
        assert_eq!(Value::Float(10.25).to_string(), "10.25");
        assert_eq!(Value::Int(10).to_string(), "10");
        assert_eq!(Value::Null.display("∅"), "∅");
    }

    #[test]
    fn numbers_sort_before_text() {
        assert_eq!(Value::Int(3).compare(&Value::Float(2.5)), Ordering::Greater);
        assert_eq!(Value::Int(3).compare(&Value::Str("a".into())), Ordering::Less);
        assert_eq!(
            Value::Str("b".into()).compare(&Value::Str("a".into())),
            Ordering::Greater
        );
    }

    #[test]
    fn nan_ranks_above_every_number() {
        let nan = Value::Float(f64::NAN);
        assert_eq!(nan.compare(&Value::Float(f64::INFINITY)), Ordering::Greater);
        assert_eq!(Value::Int(-3).compare(&nan), Ordering::Less);
        assert_eq!(nan.compare(&Value::Float(f64::NAN)), Ordering::Equal);
    }

    #[test]
    fn inference_prefers_the_narrowest_type() {
        assert_eq!(infer_column(["", ""].iter().copied()), Inferred::Str);
        let ints = ["1", "", "3"];
        assert_eq!(infer_column(ints.iter().copied()), Inferred::Int);
        let floats = ["1", "2.5"];
        assert_eq!(infer_column(floats.iter().copied()), Inferred::Float);
        let bools = ["true", "False"];
        assert_eq!(infer_column(bools.iter().copied()), Inferred::Bool);
        let text = ["1", "x"];
        assert_eq!(infer_column(text.iter().copied()), Inferred::Str);
        assert_eq!(parse_cell("", Inferred::Int), Value::Null);
    }

    #[test]
    fn rounding_is_half_to_even() {
        assert_eq!(round1(0.25), 0.2);
        assert_eq!(round1(0.75), 0.8);
        assert_eq!(round1(1.04), 1.0);
        assert_eq!(round1(-2.0), -2.0);
    }
}
