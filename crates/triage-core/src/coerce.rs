//! Numeric coercion for loosely typed JSON fields.
//!
//! The listing endpoint sends numbers either as JSON numbers or as strings,
//! and sometimes sends nothing usable at all. Coercion never fails loudly;
//! it reports [`Coerced::Unparseable`] and lets the caller decide.

use serde_json::Value;

/// Outcome of coercing one field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coerced<T> {
    Parsed(T),
    Unparseable,
}

impl<T> Coerced<T> {
    pub fn is_parsed(&self) -> bool {
        matches!(self, Coerced::Parsed(_))
    }

    pub fn ok(self) -> Option<T> {
        match self {
            Coerced::Parsed(v) => Some(v),
            Coerced::Unparseable => None,
        }
    }
}

impl<T> From<Option<T>> for Coerced<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Coerced::Unparseable, Coerced::Parsed)
    }
}

/// Coerce to a float.
///
/// Strings are parsed exactly as written; surrounding whitespace makes them
/// unparseable, while `"inf"` and `"NaN"` parse. JSON numbers outside the
/// `f64` range are unparseable.
pub fn coerce_float(value: &Value) -> Coerced<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => s.parse::<f64>().ok(),
        _ => None,
    };
    parsed.into()
}

/// Coerce to an integer.
///
/// JSON numbers with a fractional part are truncated toward zero. Strings
/// must hold an integer literal: `"45"` parses, `"45.0"` does not.
pub fn coerce_integer(value: &Value) -> Coerced<i64> {
    let parsed = match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|v| v.is_finite())
                .map(|v| v.trunc() as i64)
        }),
        Value::String(s) => s.parse::<i64>().ok(),
        _ => None,
    };
    parsed.into()
}
