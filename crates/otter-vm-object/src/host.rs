//! Adapters exposing host-owned collections as objects
//!
//! Adapters keep no element storage of their own: every read converts the
//! host value with [`IntoValue`], every write converts the engine value with
//! [`FromValue`]. A failed conversion is a `TypeMismatch` and is reported
//! regardless of the throw flag.

use std::cell::RefCell;
use std::hash::Hash;
use std::rc::Rc;

use indexmap::IndexMap;
use serde::Serialize;

use crate::array::to_array_length;
use crate::config::HeapConfig;
use crate::convert::{FromValue, IntoValue};
use crate::error::{VmError, VmResult, reject};
use crate::heap::ObjectId;
use crate::ordinary::OrdinaryObject;
use crate::property::{PartialDescriptor, PropertyAttributes, PropertyDescriptor, PropertyKey, PropertySlot};
use crate::protocol::PropertyProtocol;
use crate::value::Value;

/// Element type storable in a host collection
pub trait HostValue: FromValue + IntoValue + Clone + Serialize + 'static {}

impl<T: FromValue + IntoValue + Clone + Serialize + 'static> HostValue for T {}

/// Key type of an associative host collection
pub trait HostKey: Clone + Eq + Hash + 'static {
    /// Convert a property key; `None` if it has no counterpart
    fn from_property_key(key: &PropertyKey) -> Option<Self>;

    fn to_property_key(&self) -> PropertyKey;
}

impl HostKey for String {
    fn from_property_key(key: &PropertyKey) -> Option<Self> {
        Some(key.to_string())
    }

    fn to_property_key(&self) -> PropertyKey {
        PropertyKey::string(self)
    }
}

impl HostKey for u32 {
    fn from_property_key(key: &PropertyKey) -> Option<Self> {
        key.as_index()
    }

    fn to_property_key(&self) -> PropertyKey {
        PropertyKey::index(*self)
    }
}

impl HostKey for i64 {
    fn from_property_key(key: &PropertyKey) -> Option<Self> {
        match key {
            PropertyKey::Index(i) => Some(i64::from(*i)),
            PropertyKey::String(s) => {
                let text = s.to_std_string();
                text.parse::<i64>().ok().filter(|n| n.to_string() == text)
            }
        }
    }

    fn to_property_key(&self) -> PropertyKey {
        PropertyKey::string(&self.to_string())
    }
}

/// Object representation backed by a host collection
pub trait HostAdapter {
    fn as_protocol(&self) -> &dyn PropertyProtocol;

    fn as_protocol_mut(&mut self) -> &mut dyn PropertyProtocol;

    /// The backing collection as a host-native value
    fn export(&self) -> VmResult<serde_json::Value>;
}

fn export_error(err: serde_json::Error) -> VmError {
    VmError::type_mismatch(format!("Cannot export host collection: {err}"))
}

fn entry_slot(value: Value) -> PropertySlot {
    PropertySlot::Value(value)
}

/// Host entries are always plain writable, non-configurable data
fn check_entry_descriptor(key: &PropertyKey, desc: &PartialDescriptor, throw: bool) -> VmResult<bool> {
    if desc.is_accessor() {
        reject(throw, || format!("Cannot define accessor property {key} on a host collection"))
    } else if desc.writable == Some(false) {
        reject(throw, || format!("Host collection entry {key} cannot be made read-only"))
    } else if desc.configurable == Some(true) {
        reject(throw, || format!("Host collection entry {key} cannot be made configurable"))
    } else {
        Ok(true)
    }
}

// ============================================================================
// Associative adapter
// ============================================================================

/// Adapter over a host map. Entries are plain writable, enumerable,
/// configurable data properties.
pub struct HostMap<K, V> {
    map: Rc<RefCell<IndexMap<K, V>>>,
    extensible: bool,
    base: OrdinaryObject,
}

impl<K: HostKey, V: HostValue> HostMap<K, V> {
    /// Adapter that accepts new keys
    pub fn new(map: Rc<RefCell<IndexMap<K, V>>>, prototype: Option<ObjectId>) -> Self {
        Self {
            map,
            extensible: true,
            base: OrdinaryObject::new(prototype),
        }
    }

    /// Adapter over a map whose key set is fixed
    pub fn fixed(map: Rc<RefCell<IndexMap<K, V>>>, prototype: Option<ObjectId>) -> Self {
        Self {
            extensible: false,
            ..Self::new(map, prototype)
        }
    }

    fn insert(&mut self, host_key: K, value: &Value) -> VmResult<bool> {
        let converted = V::from_value(value)?;
        self.map.borrow_mut().insert(host_key, converted);
        Ok(true)
    }
}

impl<K: HostKey, V: HostValue> PropertyProtocol for HostMap<K, V> {
    fn class_name(&self) -> &'static str {
        "Object"
    }

    fn get_own_property(&self, key: &PropertyKey) -> Option<PropertySlot> {
        match K::from_property_key(key) {
            Some(k) => self.map.borrow().get(&k).cloned().map(|v| entry_slot(v.into_value())),
            None => self.base.get_own_property(key),
        }
    }

    fn write_own(&mut self, key: &PropertyKey, value: Value, throw: bool) -> VmResult<bool> {
        match K::from_property_key(key) {
            Some(k) => {
                if !self.extensible && !self.map.borrow().contains_key(&k) {
                    return reject(throw, || "Host object is not extensible".to_string());
                }
                self.insert(k, &value)
            }
            None => self.base.write_own(key, value, throw),
        }
    }

    fn add_own(&mut self, key: &PropertyKey, value: Value, throw: bool) -> VmResult<bool> {
        match K::from_property_key(key) {
            Some(k) => {
                if !self.extensible {
                    return reject(throw, || "Host object is not extensible".to_string());
                }
                self.insert(k, &value)
            }
            None => self.base.add_own(key, value, throw),
        }
    }

    fn define_own_property(
        &mut self,
        key: &PropertyKey,
        desc: &PartialDescriptor,
        throw: bool,
    ) -> VmResult<bool> {
        let Some(k) = K::from_property_key(key) else {
            return self.base.define_own_property(key, desc, throw);
        };
        if !check_entry_descriptor(key, desc, throw)? {
            return Ok(false);
        }
        let present = self.map.borrow().contains_key(&k);
        if !present && !self.extensible {
            return reject(throw, || "Host object is not extensible".to_string());
        }
        match &desc.value {
            Some(value) => self.insert(k, value),
            None if present => Ok(true),
            None => self.insert(k, &Value::undefined()),
        }
    }

    fn delete_own(&mut self, key: &PropertyKey, throw: bool) -> VmResult<bool> {
        match K::from_property_key(key) {
            Some(k) => {
                self.map.borrow_mut().shift_remove(&k);
                Ok(true)
            }
            None => self.base.delete_own(key, throw),
        }
    }

    fn own_keys(&self) -> Vec<(PropertyKey, bool)> {
        let mut keys: Vec<(PropertyKey, bool)> =
            self.map.borrow().keys().map(|k| (k.to_property_key(), true)).collect();
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
        self.extensible
    }

    fn prevent_extensions(&mut self) {
        self.extensible = false;
        self.base.prevent_extensions();
    }
}

impl<K: HostKey, V: HostValue> HostAdapter for HostMap<K, V> {
    fn as_protocol(&self) -> &dyn PropertyProtocol {
        self
    }

    fn as_protocol_mut(&mut self) -> &mut dyn PropertyProtocol {
        self
    }

    fn export(&self) -> VmResult<serde_json::Value> {
        let map = self.map.borrow();
        let mut out = serde_json::Map::with_capacity(map.len());
        for (k, v) in map.iter() {
            out.insert(k.to_property_key().to_string(), serde_json::to_value(v).map_err(export_error)?);
        }
        Ok(serde_json::Value::Object(out))
    }
}

// ============================================================================
// Sequential adapter
// ============================================================================

/// Adapter over a host vector with a synthetic `length`.
///
/// Deleting an element resets it to `V::default()`; the vector only grows or
/// shrinks when the adapter is resizable.
pub struct HostSequence<V> {
    items: Rc<RefCell<Vec<V>>>,
    resizable: bool,
    base: OrdinaryObject,
    config: HeapConfig,
}

impl<V: HostValue + Default> HostSequence<V> {
    pub fn new(
        items: Rc<RefCell<Vec<V>>>,
        resizable: bool,
        prototype: Option<ObjectId>,
        config: HeapConfig,
    ) -> Self {
        Self {
            items,
            resizable,
            base: OrdinaryObject::new(prototype),
            config,
        }
    }

    fn set_item(&mut self, index: u32, value: &Value, throw: bool) -> VmResult<bool> {
        let converted = V::from_value(value)?;
        let index = index as usize;
        let mut items = self.items.borrow_mut();
        if index >= items.len() {
            if !self.resizable {
                return reject(throw, || "Cannot extend host sequence".to_string());
            }
            let required = index + 1;
            if required > items.capacity() {
                let capacity = self.config.grown_capacity(items.capacity(), required);
                let additional = capacity - items.len();
                items.reserve_exact(additional);
            }
            items.resize_with(required, V::default);
        }
        items[index] = converted;
        Ok(true)
    }

    fn resize(&mut self, value: &Value, throw: bool) -> VmResult<bool> {
        let new_length = to_array_length(value)? as usize;
        let mut items = self.items.borrow_mut();
        if new_length == items.len() {
            return Ok(true);
        }
        if !self.resizable {
            return reject(throw, || "Cannot resize host sequence".to_string());
        }
        items.resize_with(new_length, V::default);
        Ok(true)
    }
}

impl<V: HostValue + Default> PropertyProtocol for HostSequence<V> {
    fn class_name(&self) -> &'static str {
        "Array"
    }

    fn get_own_property(&self, key: &PropertyKey) -> Option<PropertySlot> {
        match key {
            PropertyKey::Index(i) => self
                .items
                .borrow()
                .get(*i as usize)
                .cloned()
                .map(|v| entry_slot(v.into_value())),
            _ if key.is_length() => Some(PropertySlot::Property(PropertyDescriptor::data_with_attrs(
                Value::number(self.items.borrow().len() as f64),
                PropertyAttributes::new(self.resizable, false, false),
            ))),
            _ => self.base.get_own_property(key),
        }
    }

    fn write_own(&mut self, key: &PropertyKey, value: Value, throw: bool) -> VmResult<bool> {
        match key {
            PropertyKey::Index(i) => self.set_item(*i, &value, throw),
            _ if key.is_length() => self.resize(&value, throw),
            _ => self.base.write_own(key, value, throw),
        }
    }

    fn add_own(&mut self, key: &PropertyKey, value: Value, throw: bool) -> VmResult<bool> {
        match key {
            PropertyKey::Index(i) => self.set_item(*i, &value, throw),
            _ => self.base.add_own(key, value, throw),
        }
    }

    fn define_own_property(
        &mut self,
        key: &PropertyKey,
        desc: &PartialDescriptor,
        throw: bool,
    ) -> VmResult<bool> {
        match key {
            PropertyKey::Index(i) => {
                if !check_entry_descriptor(key, desc, throw)? {
                    return Ok(false);
                }
                match &desc.value {
                    Some(value) => self.set_item(*i, value, throw),
                    None => Ok(true),
                }
            }
            _ if key.is_length() => {
                if desc.is_accessor() || desc.configurable == Some(true) || desc.enumerable == Some(true) {
                    return reject(throw, || "Cannot redefine property: length".to_string());
                }
                match &desc.value {
                    Some(value) => self.resize(value, throw),
                    None => Ok(true),
                }
            }
            _ => self.base.define_own_property(key, desc, throw),
        }
    }

    fn delete_own(&mut self, key: &PropertyKey, throw: bool) -> VmResult<bool> {
        match key {
            PropertyKey::Index(i) => {
                if let Some(item) = self.items.borrow_mut().get_mut(*i as usize) {
                    *item = V::default();
                }
                Ok(true)
            }
            _ if key.is_length() => reject(throw, || "Cannot delete property 'length' of Array".to_string()),
            _ => self.base.delete_own(key, throw),
        }
    }

    fn own_keys(&self) -> Vec<(PropertyKey, bool)> {
        let len = self.items.borrow().len() as u32;
        let mut keys: Vec<(PropertyKey, bool)> = (0..len).map(|i| (PropertyKey::Index(i), true)).collect();
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
        self.resizable = false;
        self.base.prevent_extensions();
    }
}

impl<V: HostValue + Default> HostAdapter for HostSequence<V> {
    fn as_protocol(&self) -> &dyn PropertyProtocol {
        self
    }

    fn as_protocol_mut(&mut self) -> &mut dyn PropertyProtocol {
        self
    }

    fn export(&self) -> VmResult<serde_json::Value> {
        serde_json::to_value(&*self.items.borrow()).map_err(export_error)
    }
}
