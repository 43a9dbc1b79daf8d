//! The property protocol shared by every object representation
//!
//! Representations only see their own storage. Prototype walks, accessor
//! calls and lazy materialization live in [`Heap`](crate::heap::Heap), which
//! composes the operations below.

use crate::error::VmResult;
use crate::heap::ObjectId;
use crate::property::{PartialDescriptor, PropertyKey, PropertySlot};
use crate::value::Value;

/// Own-property operations implemented by each representation.
///
/// Mutators take the caller's `throw` flag: an attribute violation is an
/// `Err` when it is set and `Ok(false)` otherwise.
pub trait PropertyProtocol {
    /// Class name used in messages (`"Object"`, `"Array"`, ...)
    fn class_name(&self) -> &'static str;

    /// Own property, if present
    fn get_own_property(&self, key: &PropertyKey) -> Option<PropertySlot>;

    /// Overwrite an own data property, rejecting read-only ones
    fn write_own(&mut self, key: &PropertyKey, value: Value, throw: bool) -> VmResult<bool>;

    /// Create a new own property with default attributes
    fn add_own(&mut self, key: &PropertyKey, value: Value, throw: bool) -> VmResult<bool>;

    /// Define or redefine an own property
    fn define_own_property(
        &mut self,
        key: &PropertyKey,
        desc: &PartialDescriptor,
        throw: bool,
    ) -> VmResult<bool>;

    /// Remove an own property; absent keys succeed
    fn delete_own(&mut self, key: &PropertyKey, throw: bool) -> VmResult<bool>;

    /// Own keys in enumeration order, paired with their enumerable flag
    fn own_keys(&self) -> Vec<(PropertyKey, bool)>;

    /// Prototype link
    fn prototype(&self) -> Option<ObjectId>;

    /// Replace the prototype link (cycle checks are the caller's job)
    fn set_prototype(&mut self, proto: Option<ObjectId>);

    fn is_extensible(&self) -> bool;

    fn prevent_extensions(&mut self);
}
