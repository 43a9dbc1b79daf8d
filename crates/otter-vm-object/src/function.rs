//! Native function objects
//!
//! The interpreter and built-ins hand closures to the heap as callable
//! objects; accessors reference them by handle.

use std::fmt;
use std::rc::Rc;

use crate::error::VmResult;
use crate::heap::{Heap, ObjectId};
use crate::ordinary::OrdinaryObject;
use crate::property::{PartialDescriptor, PropertyAttributes, PropertyDescriptor, PropertyKey, PropertySlot};
use crate::protocol::PropertyProtocol;
use crate::string::JsStr;
use crate::value::Value;

/// Host closure: `(heap, this, args) -> result`
pub type NativeFn = Rc<dyn Fn(&Heap, &Value, &[Value]) -> VmResult<Value>>;

/// Callable object
#[derive(Clone)]
pub struct NativeFunction {
    call: NativeFn,
    base: OrdinaryObject,
}

impl NativeFunction {
    /// Create a function with a non-enumerable `name`
    pub fn new(name: &str, call: NativeFn, prototype: Option<ObjectId>) -> Self {
        let mut base = OrdinaryObject::new(prototype);
        base.insert_slot(
            PropertyKey::from("name"),
            PropertySlot::Property(PropertyDescriptor::data_with_attrs(
                Value::String(JsStr::new(name)),
                PropertyAttributes::new(false, false, true),
            )),
        );
        Self { call, base }
    }

    /// The closure, cloned out so the heap can release its borrow before calling
    pub fn callable(&self) -> NativeFn {
        Rc::clone(&self.call)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction").field("base", &self.base).finish_non_exhaustive()
    }
}

impl PropertyProtocol for NativeFunction {
    fn class_name(&self) -> &'static str {
        "Function"
    }

    fn get_own_property(&self, key: &PropertyKey) -> Option<PropertySlot> {
        self.base.get_own_property(key)
    }

    fn write_own(&mut self, key: &PropertyKey, value: Value, throw: bool) -> VmResult<bool> {
        self.base.write_own(key, value, throw)
    }

    fn add_own(&mut self, key: &PropertyKey, value: Value, throw: bool) -> VmResult<bool> {
        self.base.add_own(key, value, throw)
    }

    fn define_own_property(
        &mut self,
        key: &PropertyKey,
        desc: &PartialDescriptor,
        throw: bool,
    ) -> VmResult<bool> {
        self.base.define_own_property(key, desc, throw)
    }

    fn delete_own(&mut self, key: &PropertyKey, throw: bool) -> VmResult<bool> {
        self.base.delete_own(key, throw)
    }

    fn own_keys(&self) -> Vec<(PropertyKey, bool)> {
        self.base.own_keys()
    }

    fn prototype(&self) -> Option<ObjectId> {
        self.base.prototype()
    }

    fn set_prototype(&mut self, proto: Option<ObjectId>) {
        self.base.set_prototype(proto);
    }

    fn is_extensible(&self) -> bool {
        self.base.is_extensible()
    }

    fn prevent_extensions(&mut self) {
        self.base.prevent_extensions();
    }
}
