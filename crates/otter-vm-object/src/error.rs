//! Object model error types

use crate::value::Value;
use thiserror::Error;

/// Errors raised by property operations
#[derive(Debug, Error)]
pub enum VmError {
    /// Attribute violation (non-writable write, non-configurable redefine or delete,
    /// blocked array length shrink, adding to a non-extensible object)
    #[error("TypeError: {0}")]
    AttributeViolation(String),

    /// Type mismatch (host value conversion, calling a non-function accessor)
    #[error("TypeError: {0}")]
    TypeMismatch(String),

    /// Range error (e.g., invalid array length)
    #[error("RangeError: {0}")]
    RangeError(String),

    /// Internal error (dangling handle, re-entrant construction)
    #[error("InternalError: {0}")]
    InternalError(String),

    /// Value thrown by a native function
    #[error("Uncaught exception: {0}")]
    Exception(Value),
}

impl VmError {
    /// Create an attribute violation
    pub fn attribute_violation(msg: impl Into<String>) -> Self {
        Self::AttributeViolation(msg.into())
    }

    /// Create a type mismatch error
    pub fn type_mismatch(msg: impl Into<String>) -> Self {
        Self::TypeMismatch(msg.into())
    }

    /// Create a range error
    pub fn range_error(msg: impl Into<String>) -> Self {
        Self::RangeError(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }

    /// Create an exception carrying a thrown value
    pub fn exception(value: Value) -> Self {
        Self::Exception(value)
    }

    /// Whether this error can be swallowed by a non-throwing mutator
    pub fn is_attribute_violation(&self) -> bool {
        matches!(self, Self::AttributeViolation(_))
    }
}

/// Result type for object operations
pub type VmResult<T> = std::result::Result<T, VmError>;

/// Report a failed mutation according to the caller's throw flag.
///
/// With `throw` set the failure becomes an `AttributeViolation`, otherwise the
/// mutator returns `Ok(false)`.
#[inline]
pub(crate) fn reject(throw: bool, msg: impl FnOnce() -> String) -> VmResult<bool> {
    if throw {
        Err(VmError::AttributeViolation(msg()))
    } else {
        Ok(false)
    }
}
