//! # Otter VM Object Model
//!
//! Property storage and the property protocol every object representation
//! implements.
//!
//! ## Representations
//!
//! - **Ordinary**: insertion-ordered property map
//! - **Array**: dense slot vector that switches to a sparse map for far indices
//! - **String**: immutable narrow or wide string with read-only index properties
//! - **Host**: live views over host maps and vectors
//! - **Lazy**: placeholder built on first use, keeping its handle

#![warn(clippy::all)]

pub mod array;
pub mod config;
pub mod convert;
pub mod error;
pub mod function;
pub mod heap;
pub mod host;
pub mod lazy;
pub mod object_cell;
pub mod ordinary;
pub mod property;
pub mod protocol;
pub mod string;
pub mod string_object;
pub mod value;

pub use array::ArrayObject;
pub use config::HeapConfig;
pub use convert::{FromValue, IntoValue};
pub use error::{VmError, VmResult};
pub use function::{NativeFn, NativeFunction};
pub use heap::{Heap, Intrinsics, ObjectId, Repr};
pub use host::{HostAdapter, HostKey, HostMap, HostSequence, HostValue};
pub use lazy::LazyObject;
pub use ordinary::OrdinaryObject;
pub use property::{PartialDescriptor, PropertyAttributes, PropertyDescriptor, PropertyKey, PropertySlot};
pub use protocol::PropertyProtocol;
pub use string::JsStr;
pub use string_object::StringObject;
pub use value::Value;
