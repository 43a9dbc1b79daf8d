//! Boxed string objects
//!
//! Indices below the string length read as one-unit strings and are
//! enumerable but read-only; `length` is read-only and hidden. Everything
//! else behaves like an ordinary object.

use crate::error::{VmResult, reject};
use crate::heap::ObjectId;
use crate::ordinary::OrdinaryObject;
use crate::property::{
    PartialDescriptor, PropertyAttributes, PropertyDescriptor, PropertyKey, PropertySlot, reconcile,
};
use crate::protocol::PropertyProtocol;
use crate::string::JsStr;
use crate::value::Value;

/// String object wrapping an immutable `JsStr`
#[derive(Debug, Clone)]
pub struct StringObject {
    value: JsStr,
    base: OrdinaryObject,
}

impl StringObject {
    pub fn new(value: JsStr, prototype: Option<ObjectId>) -> Self {
        Self {
            value,
            base: OrdinaryObject::new(prototype),
        }
    }

    /// The wrapped string
    pub fn value(&self) -> &JsStr {
        &self.value
    }

    /// Read-only slot for an in-range index or `length`
    fn fixed_slot(&self, key: &PropertyKey) -> Option<PropertySlot> {
        match key {
            PropertyKey::Index(i) => self.value.char_at(*i as usize).map(|c| {
                PropertySlot::Property(PropertyDescriptor::data_with_attrs(
                    Value::String(c),
                    PropertyAttributes::new(false, true, false),
                ))
            }),
            _ if key.is_length() => Some(PropertySlot::Property(PropertyDescriptor::data_with_attrs(
                Value::number(self.value.len() as f64),
                PropertyAttributes::frozen(),
            ))),
            _ => None,
        }
    }
}

impl PropertyProtocol for StringObject {
    fn class_name(&self) -> &'static str {
        "String"
    }

    fn get_own_property(&self, key: &PropertyKey) -> Option<PropertySlot> {
        self.fixed_slot(key).or_else(|| self.base.get_own_property(key))
    }

    fn write_own(&mut self, key: &PropertyKey, value: Value, throw: bool) -> VmResult<bool> {
        if self.fixed_slot(key).is_some() {
            return reject(throw, || format!("Cannot assign to read only property '{key}' of a String"));
        }
        self.base.write_own(key, value, throw)
    }

    fn add_own(&mut self, key: &PropertyKey, value: Value, throw: bool) -> VmResult<bool> {
        if self.fixed_slot(key).is_some() {
            return reject(throw, || format!("Cannot assign to read only property '{key}' of a String"));
        }
        self.base.add_own(key, value, throw)
    }

    fn define_own_property(
        &mut self,
        key: &PropertyKey,
        desc: &PartialDescriptor,
        throw: bool,
    ) -> VmResult<bool> {
        match self.fixed_slot(key) {
            // Only a request that changes nothing is accepted
            Some(slot) => Ok(reconcile(key, Some(&slot), desc, true, throw)?.is_some()),
            None => self.base.define_own_property(key, desc, throw),
        }
    }

    fn delete_own(&mut self, key: &PropertyKey, throw: bool) -> VmResult<bool> {
        if self.fixed_slot(key).is_some() {
            return reject(throw, || format!("Cannot delete property '{key}' of a String"));
        }
        self.base.delete_own(key, throw)
    }

    fn own_keys(&self) -> Vec<(PropertyKey, bool)> {
        let mut keys: Vec<(PropertyKey, bool)> = (0..self.value.len() as u32)
            .map(|i| (PropertyKey::Index(i), true))
            .collect();
        keys.push((PropertyKey::from("length"), false));
        keys.extend(self.base.own_keys());
        keys
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
