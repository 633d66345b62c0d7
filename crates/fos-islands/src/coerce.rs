//! Prop coercion
//!
//! Attribute values are strings; components declare typed props. Scalars use
//! constructor-style casts (`Number("23")`, `Boolean("x")`), structured
//! types are parsed as JSON.

use serde_json::Value;

use crate::error::CoercionError;
use crate::schema::{ComponentDefinition, PropMap, PropType};

/// A typed prop value
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    String(String),
    /// Always `f64`, so `NaN` survives a bad cast
    Number(f64),
    Boolean(bool),
    Json(Value),
}

impl PropValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            PropValue::Json(v) => Some(v),
            _ => None,
        }
    }

    /// Typed value for a JSON literal declared as a default.
    ///
    /// Scalars must already have the declared JSON type.
    pub fn from_json(ty: PropType, value: &Value) -> Result<Self, String> {
        match (ty, value) {
            (PropType::String, Value::String(s)) => Ok(PropValue::String(s.clone())),
            (PropType::Number, Value::Number(n)) => n.as_f64()
                .map(PropValue::Number)
                .ok_or_else(|| format!("{} is not representable as f64", n)),
            (PropType::Boolean, Value::Bool(b)) => Ok(PropValue::Boolean(*b)),
            (PropType::Object | PropType::Array, v) => Ok(PropValue::Json(v.clone())),
            (ty, v) => Err(format!("expected a {} default, got {}", ty, v)),
        }
    }
}

impl std::fmt::Display for PropValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropValue::String(s) => f.write_str(s),
            PropValue::Number(n) => write!(f, "{}", format_number(*n)),
            PropValue::Boolean(b) => write!(f, "{}", b),
            PropValue::Json(Value::String(s)) => f.write_str(s),
            PropValue::Json(v) => write!(f, "{}", v),
        }
    }
}

/// Type raw attribute props against the component's schema.
///
/// Fields the schema does not declare are dropped. Declared fields missing
/// from `raw` stay missing; required-ness is the runtime's business.
pub fn coerce(raw: &PropMap<String>, definition: &ComponentDefinition) -> Result<PropMap<PropValue>, CoercionError> {
    let mut typed = PropMap::new();
    for (field, value) in raw {
        let Some(ty) = definition.prop_type(field) else {
            continue;
        };
        typed.insert(field.clone(), coerce_value(field, value, ty)?);
    }
    Ok(typed)
}

/// Convert one raw value to `ty`
pub fn coerce_value(field: &str, raw: &str, ty: PropType) -> Result<PropValue, CoercionError> {
    Ok(match ty {
        PropType::String => PropValue::String(raw.to_string()),
        PropType::Number => PropValue::Number(cast_number(raw)),
        PropType::Boolean => PropValue::Boolean(cast_boolean(raw)),
        PropType::Object | PropType::Array => {
            let value = serde_json::from_str(raw).map_err(|source| CoercionError::InvalidJson {
                field: field.to_string(),
                expected: ty,
                source,
            })?;
            PropValue::Json(value)
        }
    })
}

/// `Boolean(string)`: only the empty string is false
pub fn cast_boolean(raw: &str) -> bool {
    !raw.is_empty()
}

/// `Number(string)`.
///
/// Surrounding whitespace is ignored, the empty string is 0, `0x`/`0o`/`0b`
/// literals and signed `Infinity` are accepted, anything else that is not a
/// decimal literal is NaN.
pub fn cast_number(raw: &str) -> f64 {
    let s = raw.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}');
    if s.is_empty() {
        return 0.0;
    }

    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    let radix = match s.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return parse_radix(&s[2..], radix);
    }

    // f64::from_str also takes "inf" and "nan", which are not literals here
    if !s.bytes().all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E')) {
        return f64::NAN;
    }
    s.parse().unwrap_or(f64::NAN)
}

fn parse_radix(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }
    let mut acc = 0.0_f64;
    for c in digits.chars() {
        let Some(d) = c.to_digit(radix) else {
            return f64::NAN;
        };
        acc = acc * f64::from(radix) + f64::from(d);
    }
    acc
}

/// Number -> string the way a JS template prints it.
///
/// Shortest round-trip digits; exponent form (`1e+21`, `1.5e-7`) below
/// 1e-7 and from 1e21 up, plain decimals in between.
fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let s = if n > 0.0 { "Infinity" } else { "-Infinity" };
        s.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n.abs() >= 1e21 || n.abs() < 1e-7 {
        let formatted = format!("{:e}", n);
        match formatted.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => formatted,
        }
    } else {
        format!("{}", n)
    }
}
