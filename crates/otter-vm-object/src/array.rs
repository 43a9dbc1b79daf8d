//! Fast arrays
//!
//! Elements live in a dense `Vec` of optional slots until a write lands far
//! beyond the populated region, at which point storage switches to an ordered
//! sparse map for the rest of the array's life. `length` is kept separately
//! and may exceed the number of dense slots.

use std::collections::BTreeMap;

use crate::config::HeapConfig;
use crate::error::{VmError, VmResult, reject};
use crate::heap::ObjectId;
use crate::ordinary::OrdinaryObject;
use crate::property::{
    PartialDescriptor, PropertyAttributes, PropertyDescriptor, PropertyKey, PropertySlot, reconcile,
};
use crate::protocol::PropertyProtocol;
use crate::value::Value;

// ============================================================================
// Storage
// ============================================================================

#[derive(Debug, Clone)]
enum Elements {
    Dense(Vec<Option<PropertySlot>>),
    Sparse(BTreeMap<u32, PropertySlot>),
}

/// Array with dense or sparse element storage
#[derive(Debug, Clone)]
pub struct ArrayObject {
    base: OrdinaryObject,
    elements: Elements,
    length: u32,
    length_writable: bool,
    /// Populated element slots
    element_count: u32,
    /// Element slots holding a descriptor record instead of a bare value
    described_count: u32,
    config: HeapConfig,
}

/// Coerce a value to an array length (`0 ..= 2^32 - 1`)
pub fn to_array_length(value: &Value) -> VmResult<u32> {
    let n = value.to_number();
    if n.fract() == 0.0 && (0.0..=u32::MAX as f64).contains(&n) {
        Ok(n as u32)
    } else {
        Err(VmError::range_error("Invalid array length"))
    }
}

impl ArrayObject {
    /// Create an empty array
    pub fn new(prototype: Option<ObjectId>, config: HeapConfig) -> Self {
        Self {
            base: OrdinaryObject::new(prototype),
            elements: Elements::Dense(Vec::new()),
            length: 0,
            length_writable: true,
            element_count: 0,
            described_count: 0,
            config,
        }
    }

    /// Create a dense array holding `values`
    pub fn from_values(values: Vec<Value>, prototype: Option<ObjectId>, config: HeapConfig) -> VmResult<Self> {
        let length = u32::try_from(values.len()).map_err(|_| VmError::range_error("Invalid array length"))?;
        let mut array = Self::new(prototype, config);
        array.elements = Elements::Dense(values.into_iter().map(|v| Some(PropertySlot::Value(v))).collect());
        array.length = length;
        array.element_count = length;
        Ok(array)
    }

    /// Current `length`
    #[inline]
    pub fn length(&self) -> u32 {
        self.length
    }

    /// Number of populated elements
    #[inline]
    pub fn element_count(&self) -> u32 {
        self.element_count
    }

    /// Whether elements are stored sparsely
    pub fn is_sparse(&self) -> bool {
        matches!(self.elements, Elements::Sparse(_))
    }

    /// Capacity of the dense buffer, if dense
    pub fn dense_capacity(&self) -> Option<usize> {
        match &self.elements {
            Elements::Dense(v) => Some(v.capacity()),
            Elements::Sparse(_) => None,
        }
    }

    /// Element slot at `index`
    pub fn slot(&self, index: u32) -> Option<PropertySlot> {
        match &self.elements {
            Elements::Dense(v) => v.get(index as usize).cloned().flatten(),
            Elements::Sparse(m) => m.get(&index).cloned(),
        }
    }

    /// Number of positions a sort visits: the dense buffer, or the
    /// populated elements of a sparse array
    pub fn sort_len(&self) -> u32 {
        match &self.elements {
            Elements::Dense(v) => v.len() as u32,
            Elements::Sparse(m) => m.len() as u32,
        }
    }

    /// Slot at sort position `pos`; sparse elements are visited by ascending index
    pub fn sort_slot(&self, pos: u32) -> Option<PropertySlot> {
        match &self.elements {
            Elements::Dense(v) => v.get(pos as usize).cloned().flatten(),
            Elements::Sparse(m) => m.values().nth(pos as usize).cloned(),
        }
    }

    /// Exchange the slots at two sort positions, holes included.
    ///
    /// Sparse arrays keep their indices and trade slot contents.
    pub fn sort_swap(&mut self, a: u32, b: u32) {
        let (lo, hi) = (a.min(b) as usize, a.max(b) as usize);
        if lo == hi {
            return;
        }
        match &mut self.elements {
            Elements::Dense(v) => {
                if hi < v.len() {
                    v.swap(lo, hi);
                }
            }
            Elements::Sparse(m) => {
                let mut slots = m.values_mut();
                if let (Some(first), Some(second)) = (slots.nth(lo), slots.nth(hi - lo - 1)) {
                    std::mem::swap(first, second);
                }
            }
        }
    }

    // ------------------------------------------------------------------------
    // Length
    // ------------------------------------------------------------------------

    /// Assign `length`, honoring writability and non-configurable elements
    pub fn set_length(&mut self, new_length: u32, throw: bool) -> VmResult<bool> {
        if new_length == self.length {
            return Ok(true);
        }
        if !self.length_writable {
            return reject(throw, || "Cannot assign to read only property 'length' of Array".to_string());
        }
        self.truncate(new_length, throw)
    }

    /// Move `length` to `target`, dropping elements at or above it.
    ///
    /// A non-configurable element stops the shrink just above itself; the
    /// partial shrink stays applied and the operation reports failure.
    fn truncate(&mut self, target: u32, throw: bool) -> VmResult<bool> {
        let mut target = target;
        let mut blocked = false;

        if target < self.length {
            if self.described_count > 0 {
                let blocker = match &self.elements {
                    Elements::Dense(v) => {
                        let end = v.len().min(self.length as usize);
                        (target as usize..end)
                            .rev()
                            .find(|&i| v[i].as_ref().is_some_and(|s| !s.is_configurable()))
                            .map(|i| i as u32)
                    }
                    Elements::Sparse(m) => m
                        .range(target..)
                        .rev()
                        .find(|(_, s)| !s.is_configurable())
                        .map(|(&i, _)| i),
                };
                if let Some(index) = blocker {
                    target = index + 1;
                    blocked = true;
                }
            }
            self.drop_elements_from(target);
        }

        self.length = target;
        if blocked {
            return reject(throw, || "Cannot redefine property: length".to_string());
        }
        Ok(true)
    }

    fn drop_elements_from(&mut self, target: u32) {
        let (removed, described) = match &mut self.elements {
            Elements::Dense(v) => {
                let start = target as usize;
                if start >= v.len() {
                    return;
                }
                let mut removed = 0;
                let mut described = 0;
                for slot in v.drain(start..).flatten() {
                    removed += 1;
                    described += u32::from(slot.is_described());
                }
                if start >= self.config.shrink_realloc_min && start < v.capacity() / 4 {
                    tracing::debug!(
                        target: "otter::object",
                        length = start,
                        capacity = v.capacity(),
                        "releasing dense array capacity"
                    );
                    v.shrink_to_fit();
                }
                (removed, described)
            }
            Elements::Sparse(m) => {
                let tail = m.split_off(&target);
                let described = tail.values().map(|s| u32::from(s.is_described())).sum::<u32>();
                (tail.len() as u32, described)
            }
        };
        self.element_count -= removed;
        self.described_count -= described;
    }

    fn length_descriptor(&self) -> PropertySlot {
        PropertySlot::Property(PropertyDescriptor::data_with_attrs(
            Value::number(self.length as f64),
            PropertyAttributes::new(self.length_writable, false, false),
        ))
    }

    fn define_length(&mut self, desc: &PartialDescriptor, throw: bool) -> VmResult<bool> {
        let redefine = || "Cannot redefine property: length".to_string();
        if desc.configurable == Some(true) || desc.enumerable == Some(true) || desc.is_accessor() {
            return reject(throw, redefine);
        }

        let mut ok = true;
        if let Some(value) = &desc.value {
            let new_length = to_array_length(value)?;
            if new_length != self.length {
                ok = self.length_writable && self.truncate(new_length, false)?;
            }
        }
        if let Some(writable) = desc.writable {
            if self.length_writable {
                self.length_writable = writable;
            } else if writable {
                ok = false;
            }
        }

        if ok { Ok(true) } else { reject(throw, redefine) }
    }

    // ------------------------------------------------------------------------
    // Elements
    // ------------------------------------------------------------------------

    /// Make room for `index` in dense storage.
    ///
    /// Returns false when the array is (or just became) sparse.
    fn expand(&mut self, index: u32) -> bool {
        let Elements::Dense(v) = &mut self.elements else {
            return false;
        };
        let required = index as usize + 1;
        if required <= v.len() {
            return true;
        }
        if required > v.capacity() {
            if self.config.should_sparsify(index, self.element_count) {
                self.sparsify(index);
                return false;
            }
            let capacity = self.config.grown_capacity(v.capacity(), required);
            v.reserve_exact(capacity - v.len());
        }
        v.resize(required, None);
        true
    }

    fn sparsify(&mut self, trigger: u32) {
        tracing::debug!(
            target: "otter::object",
            index = trigger,
            elements = self.element_count,
            "switching array to sparse storage"
        );
        if let Elements::Dense(v) = &mut self.elements {
            let map = std::mem::take(v)
                .into_iter()
                .enumerate()
                .filter_map(|(i, slot)| slot.map(|s| (i as u32, s)))
                .collect();
            self.elements = Elements::Sparse(map);
        }
    }

    fn take_raw(&mut self, index: u32) -> Option<PropertySlot> {
        match &mut self.elements {
            Elements::Dense(v) => v.get_mut(index as usize).and_then(Option::take),
            Elements::Sparse(m) => m.remove(&index),
        }
    }

    fn put_raw(&mut self, index: u32, slot: Option<PropertySlot>) {
        match slot {
            None => {
                self.take_raw(index);
            }
            Some(slot) => {
                if self.expand(index) {
                    if let Elements::Dense(v) = &mut self.elements {
                        v[index as usize] = Some(slot);
                    }
                } else if let Elements::Sparse(m) = &mut self.elements {
                    m.insert(index, slot);
                }
            }
        }
    }

    /// Store `slot` at `index`, keeping the element counters in step
    fn store(&mut self, index: u32, slot: PropertySlot) {
        let described = slot.is_described();
        let previous = self.take_raw(index);
        self.put_raw(index, Some(slot));
        match previous {
            Some(old) => self.described_count -= u32::from(old.is_described()),
            None => self.element_count += 1,
        }
        self.described_count += u32::from(described);
    }

    /// Grow `length` to cover `index`
    fn cover(&mut self, index: u32, throw: bool) -> VmResult<bool> {
        if index >= self.length {
            let length = index
                .checked_add(1)
                .ok_or_else(|| VmError::range_error("Invalid array length"))?;
            self.set_length(length, throw)
        } else {
            Ok(true)
        }
    }
}

impl PropertyProtocol for ArrayObject {
    fn class_name(&self) -> &'static str {
        "Array"
    }

    fn get_own_property(&self, key: &PropertyKey) -> Option<PropertySlot> {
        match key {
            PropertyKey::Index(i) => self.slot(*i),
            _ if key.is_length() => Some(self.length_descriptor()),
            _ => self.base.get_own_property(key),
        }
    }

    fn write_own(&mut self, key: &PropertyKey, value: Value, throw: bool) -> VmResult<bool> {
        match key {
            PropertyKey::Index(i) => {
                let written = match &mut self.elements {
                    Elements::Dense(v) => v
                        .get_mut(*i as usize)
                        .and_then(Option::as_mut)
                        .map(|slot| slot.write_value(value.clone())),
                    Elements::Sparse(m) => m.get_mut(i).map(|slot| slot.write_value(value.clone())),
                };
                match written {
                    Some(true) => Ok(true),
                    Some(false) => reject(throw, || format!("Cannot assign to read only property '{i}' of Array")),
                    None => self.add_own(key, value, throw),
                }
            }
            _ if key.is_length() => {
                let new_length = to_array_length(&value)?;
                self.set_length(new_length, throw)
            }
            _ => self.base.write_own(key, value, throw),
        }
    }

    fn add_own(&mut self, key: &PropertyKey, value: Value, throw: bool) -> VmResult<bool> {
        let &PropertyKey::Index(index) = key else {
            return self.base.add_own(key, value, throw);
        };
        if !self.base.is_extensible() {
            return reject(throw, || format!("Cannot add property {index}, object is not extensible"));
        }
        if !self.cover(index, throw)? {
            return Ok(false);
        }
        self.store(index, PropertySlot::Value(value));
        Ok(true)
    }

    fn define_own_property(
        &mut self,
        key: &PropertyKey,
        desc: &PartialDescriptor,
        throw: bool,
    ) -> VmResult<bool> {
        match key {
            PropertyKey::Index(index) => {
                let index = *index;
                let existing = self.slot(index);
                let Some(slot) = reconcile(key, existing.as_ref(), desc, self.base.is_extensible(), throw)? else {
                    return Ok(false);
                };
                if !self.cover(index, throw)? {
                    return Ok(false);
                }
                self.store(index, slot);
                Ok(true)
            }
            _ if key.is_length() => self.define_length(desc, throw),
            _ => self.base.define_own_property(key, desc, throw),
        }
    }

    fn delete_own(&mut self, key: &PropertyKey, throw: bool) -> VmResult<bool> {
        match key {
            PropertyKey::Index(index) => match self.slot(*index) {
                None => Ok(true),
                Some(slot) if !slot.is_configurable() => {
                    reject(throw, || format!("Cannot delete property '{index}' of Array"))
                }
                Some(slot) => {
                    self.take_raw(*index);
                    self.element_count -= 1;
                    self.described_count -= u32::from(slot.is_described());
                    Ok(true)
                }
            },
            _ if key.is_length() => reject(throw, || "Cannot delete property 'length' of Array".to_string()),
            _ => self.base.delete_own(key, throw),
        }
    }

    fn own_keys(&self) -> Vec<(PropertyKey, bool)> {
        let mut keys: Vec<(PropertyKey, bool)> = match &self.elements {
            Elements::Dense(v) => v
                .iter()
                .enumerate()
                .filter_map(|(i, slot)| slot.as_ref().map(|s| (PropertyKey::Index(i as u32), s.is_enumerable())))
                .collect(),
            Elements::Sparse(m) => m
                .iter()
                .map(|(&i, s)| (PropertyKey::Index(i), s.is_enumerable()))
                .collect(),
        };
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
