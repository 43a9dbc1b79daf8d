//! Value conversion traits for host collection marshalling.
//!
//! `FromValue` converts an engine `Value` into a Rust type when a script
//! writes into a host collection. `IntoValue` converts a Rust value back when
//! the collection is read. Conversions are type-directed and strict: a value
//! of the wrong kind is a `TypeMismatch`, never a silent coercion.

use crate::error::{VmError, VmResult};
use crate::string::JsStr;
use crate::value::Value;

/// Convert an engine `Value` into a Rust type.
pub trait FromValue: Sized {
    /// Convert from a Value, returning `TypeMismatch` on the wrong kind.
    fn from_value(value: &Value) -> VmResult<Self>;
}

/// Convert a Rust type into an engine `Value`.
pub trait IntoValue {
    /// Convert into a Value.
    fn into_value(self) -> Value;
}

fn mismatch(value: &Value, expected: &str) -> VmError {
    VmError::type_mismatch(format!("Cannot convert {} to {expected}", value.type_name()))
}

// ---------------------------------------------------------------------------
// FromValue implementations
// ---------------------------------------------------------------------------

impl FromValue for Value {
    fn from_value(value: &Value) -> VmResult<Self> {
        Ok(value.clone())
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> VmResult<Self> {
        value.as_number().ok_or_else(|| mismatch(value, "number"))
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> VmResult<Self> {
        match value.as_number() {
            Some(n) if n.fract() == 0.0 && n.abs() <= (1u64 << 53) as f64 => Ok(n as i64),
            _ => Err(mismatch(value, "integer")),
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> VmResult<Self> {
        let n = i64::from_value(value)?;
        i32::try_from(n).map_err(|_| mismatch(value, "int32"))
    }
}

impl FromValue for u32 {
    fn from_value(value: &Value) -> VmResult<Self> {
        let n = i64::from_value(value)?;
        u32::try_from(n).map_err(|_| mismatch(value, "uint32"))
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> VmResult<Self> {
        value.as_boolean().ok_or_else(|| mismatch(value, "boolean"))
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> VmResult<Self> {
        value
            .as_string()
            .map(JsStr::to_std_string)
            .ok_or_else(|| mismatch(value, "string"))
    }
}

impl FromValue for JsStr {
    fn from_value(value: &Value) -> VmResult<Self> {
        value.as_string().cloned().ok_or_else(|| mismatch(value, "string"))
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> VmResult<Self> {
        if value.is_nullish() {
            Ok(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}

// ---------------------------------------------------------------------------
// IntoValue implementations
// ---------------------------------------------------------------------------

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl IntoValue for f64 {
    fn into_value(self) -> Value {
        Value::number(self)
    }
}

impl IntoValue for i64 {
    fn into_value(self) -> Value {
        Value::number(self as f64)
    }
}

impl IntoValue for i32 {
    fn into_value(self) -> Value {
        Value::int32(self)
    }
}

impl IntoValue for u32 {
    fn into_value(self) -> Value {
        Value::number(self as f64)
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::boolean(self)
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::String(JsStr::new(&self))
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::String(JsStr::new(self))
    }
}

impl IntoValue for JsStr {
    fn into_value(self) -> Value {
        Value::String(self)
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        match self {
            Some(v) => v.into_value(),
            None => Value::null(),
        }
    }
}

impl IntoValue for () {
    fn into_value(self) -> Value {
        Value::undefined()
    }
}
