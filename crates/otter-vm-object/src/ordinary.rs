//! Ordinary objects: an insertion-ordered property table plus a prototype link

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

use crate::error::{VmResult, reject};
use crate::heap::ObjectId;
use crate::property::{PartialDescriptor, PropertyKey, PropertySlot, reconcile};
use crate::protocol::PropertyProtocol;
use crate::value::Value;

type PropertyMap = IndexMap<PropertyKey, PropertySlot, FxBuildHasher>;

/// Dictionary-backed object.
///
/// Also used as the fallback store for non-index keys of arrays, strings,
/// host adapters and functions.
#[derive(Debug, Clone)]
pub struct OrdinaryObject {
    properties: PropertyMap,
    prototype: Option<ObjectId>,
    extensible: bool,
}

impl OrdinaryObject {
    /// Create an empty extensible object
    pub fn new(prototype: Option<ObjectId>) -> Self {
        Self {
            properties: PropertyMap::with_hasher(FxBuildHasher),
            prototype,
            extensible: true,
        }
    }

    /// Number of own properties
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Store a slot directly, bypassing attribute checks
    pub(crate) fn insert_slot(&mut self, key: PropertyKey, slot: PropertySlot) {
        self.properties.insert(key, slot);
    }
}

impl PropertyProtocol for OrdinaryObject {
    fn class_name(&self) -> &'static str {
        "Object"
    }

    fn get_own_property(&self, key: &PropertyKey) -> Option<PropertySlot> {
        self.properties.get(key).cloned()
    }

    fn write_own(&mut self, key: &PropertyKey, value: Value, throw: bool) -> VmResult<bool> {
        if !self.properties.contains_key(key) {
            return self.add_own(key, value, throw);
        }
        let written = self
            .properties
            .get_mut(key)
            .is_some_and(|slot| slot.write_value(value));
        if written {
            Ok(true)
        } else {
            reject(throw, || format!("Cannot assign to read only property '{key}'"))
        }
    }

    fn add_own(&mut self, key: &PropertyKey, value: Value, throw: bool) -> VmResult<bool> {
        if !self.extensible {
            return reject(throw, || {
                format!("Cannot add property {key}, object is not extensible")
            });
        }
        self.properties.insert(key.clone(), PropertySlot::Value(value));
        Ok(true)
    }

    fn define_own_property(
        &mut self,
        key: &PropertyKey,
        desc: &PartialDescriptor,
        throw: bool,
    ) -> VmResult<bool> {
        let existing = self.properties.get(key);
        match reconcile(key, existing, desc, self.extensible, throw)? {
            Some(slot) => {
                self.properties.insert(key.clone(), slot);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete_own(&mut self, key: &PropertyKey, throw: bool) -> VmResult<bool> {
        match self.properties.get(key) {
            None => Ok(true),
            Some(slot) if !slot.is_configurable() => {
                reject(throw, || format!("Cannot delete property '{key}' of {}", self.class_name()))
            }
            Some(_) => {
                // shift_remove keeps the remaining keys in insertion order
                self.properties.shift_remove(key);
                Ok(true)
            }
        }
    }

    fn own_keys(&self) -> Vec<(PropertyKey, bool)> {
        self.properties
            .iter()
            .map(|(key, slot)| (key.clone(), slot.is_enumerable()))
            .collect()
    }

    fn prototype(&self) -> Option<ObjectId> {
        self.prototype
    }

    fn set_prototype(&mut self, proto: Option<ObjectId>) {
        self.prototype = proto;
    }

    fn is_extensible(&self) -> bool {
        self.extensible
    }

    fn prevent_extensions(&mut self) {
        self.extensible = false;
    }
}
