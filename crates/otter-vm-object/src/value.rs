//! Engine values
//!
//! Objects are referenced by [`ObjectId`] handles into a [`Heap`](crate::heap::Heap);
//! a `Value` never owns the object it points at.

use std::fmt;

use crate::heap::ObjectId;
use crate::string::JsStr;

/// A runtime value
#[derive(Clone, Debug, Default)]
pub enum Value {
    /// `undefined`
    #[default]
    Undefined,
    /// `null`
    Null,
    /// Boolean
    Boolean(bool),
    /// IEEE-754 number
    Number(f64),
    /// Immutable string
    String(JsStr),
    /// Object handle
    Object(ObjectId),
}

impl Value {
    /// `undefined`
    #[inline]
    pub const fn undefined() -> Self {
        Self::Undefined
    }

    /// `null`
    #[inline]
    pub const fn null() -> Self {
        Self::Null
    }

    /// Boolean value
    #[inline]
    pub const fn boolean(b: bool) -> Self {
        Self::Boolean(b)
    }

    /// Number value
    #[inline]
    pub const fn number(n: f64) -> Self {
        Self::Number(n)
    }

    /// Number value from an int32
    #[inline]
    pub const fn int32(n: i32) -> Self {
        Self::Number(n as f64)
    }

    /// String value
    pub fn string(s: impl Into<JsStr>) -> Self {
        Self::String(s.into())
    }

    /// Object value
    #[inline]
    pub const fn object(id: ObjectId) -> Self {
        Self::Object(id)
    }

    #[inline]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// `undefined` or `null`
    #[inline]
    pub fn is_nullish(&self) -> bool {
        matches!(self, Self::Undefined | Self::Null)
    }

    #[inline]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    #[inline]
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    pub fn as_string(&self) -> Option<&JsStr> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn as_object(&self) -> Option<ObjectId> {
        match self {
            Self::Object(id) => Some(*id),
            _ => None,
        }
    }

    /// `typeof`-style name used in conversion errors
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Boolean(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Object(_) => "object",
        }
    }

    /// Numeric conversion for primitives; objects convert to NaN
    pub fn to_number(&self) -> f64 {
        match self {
            Self::Undefined => f64::NAN,
            Self::Null => 0.0,
            Self::Boolean(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Self::Number(n) => *n,
            Self::String(s) => string_to_number(&s.to_std_string()),
            Self::Object(_) => f64::NAN,
        }
    }

    /// The SameValue algorithm: NaN equals NaN, +0 and -0 differ
    pub fn same_value(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::Undefined, Self::Undefined) | (Self::Null, Self::Null) => true,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => {
                (a.is_nan() && b.is_nan()) || a.to_bits() == b.to_bits()
            }
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => f.write_str("undefined"),
            Self::Null => f.write_str("null"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Number(n) => f.write_str(&format_number(*n)),
            Self::String(s) => write!(f, "{s}"),
            Self::Object(_) => f.write_str("[object Object]"),
        }
    }
}

/// Numeric value of a string: decimal literals, `Infinity` and the
/// `0x`/`0o`/`0b` radix prefixes; anything else is NaN
fn string_to_number(text: &str) -> f64 {
    let trimmed = text.trim_matches(|c: char| c.is_whitespace() || c == '\u{FEFF}');
    if trimmed.is_empty() {
        return 0.0;
    }
    let radix = match trimmed.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return parse_radix(&trimmed[2..], radix);
    }
    let unsigned = trimmed.strip_prefix(&['+', '-'][..]).unwrap_or(trimmed);
    if unsigned == "Infinity" {
        return if trimmed.starts_with('-') { f64::NEG_INFINITY } else { f64::INFINITY };
    }
    // Rust's float grammar also takes "inf" and "nan"
    if !unsigned.bytes().all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-')) {
        return f64::NAN;
    }
    trimmed.parse().unwrap_or(f64::NAN)
}

fn parse_radix(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }
    digits
        .chars()
        .try_fold(0.0, |acc: f64, c| c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d)))
        .unwrap_or(f64::NAN)
}

/// Render a number the short way: integers without a fraction, NaN and
/// infinities by name.
pub(crate) fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        (if n > 0.0 { "Infinity" } else { "-Infinity" }).to_string()
    } else if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        let mut buf = itoa::Buffer::new();
        buf.format(n as i64).to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        expand_exponent(n)
    } else {
        let mut buf = ryu::Buffer::new();
        buf.format_finite(n).to_string()
    }
}

/// Shortest digits of a large integral value, padded with zeros instead of
/// an exponent
fn expand_exponent(n: f64) -> String {
    let mut buf = ryu::Buffer::new();
    let shortest = buf.format_finite(n);
    let Some((mantissa, exponent)) = shortest.split_once('e') else {
        return shortest.trim_end_matches(".0").to_string();
    };
    let exponent: usize = exponent.parse().unwrap_or(0);
    let (sign, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa),
    };
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let zeros = (exponent + 1).saturating_sub(digits.len());
    format!("{sign}{digits}{}", "0".repeat(zeros))
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::int32(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(JsStr::new(s))
    }
}

impl From<JsStr> for Value {
    fn from(s: JsStr) -> Self {
        Self::String(s)
    }
}

impl From<ObjectId> for Value {
    fn from(id: ObjectId) -> Self {
        Self::Object(id)
    }
}
