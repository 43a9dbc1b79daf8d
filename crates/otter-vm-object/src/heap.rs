//! Object heap and property protocol entry points
//!
//! The heap is an arena of slots addressed by [`ObjectId`]. Each slot owns the
//! current representation of one object; the representation may be replaced
//! in place (lazy materialization, array storage switch) without changing the
//! handle. Prototype links and accessor functions are plain handles and never
//! own what they point at.
//!
//! Every operation here composes the own-property operations of
//! [`PropertyProtocol`] with the parts that need the whole heap: prototype
//! walks, accessor calls with the original receiver, and lazy construction.
//! No slot borrow is held across a call into a native function or factory.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::array::ArrayObject;
use crate::config::HeapConfig;
use crate::error::{VmError, VmResult, reject};
use crate::function::NativeFunction;
use crate::host::{HostAdapter, HostKey, HostMap, HostSequence, HostValue};
use crate::lazy::LazyObject;
use crate::object_cell::ObjectCell;
use crate::ordinary::OrdinaryObject;
use crate::property::{PartialDescriptor, PropertyDescriptor, PropertyKey, PropertySlot};
use crate::protocol::PropertyProtocol;
use crate::string::JsStr;
use crate::string_object::StringObject;
use crate::value::Value;

/// Stable handle to a heap object
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u32);

impl ObjectId {
    /// Arena index
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Current representation of an object
pub enum Repr {
    Ordinary(OrdinaryObject),
    Array(ArrayObject),
    String(StringObject),
    Host(Box<dyn HostAdapter>),
    Function(NativeFunction),
    Lazy(LazyObject),
}

impl Repr {
    /// Protocol view; `None` for an unmaterialized lazy object
    pub fn protocol(&self) -> Option<&dyn PropertyProtocol> {
        match self {
            Repr::Ordinary(o) => Some(o),
            Repr::Array(a) => Some(a),
            Repr::String(s) => Some(s),
            Repr::Host(h) => Some(h.as_protocol()),
            Repr::Function(f) => Some(f),
            Repr::Lazy(_) => None,
        }
    }

    pub fn protocol_mut(&mut self) -> Option<&mut dyn PropertyProtocol> {
        match self {
            Repr::Ordinary(o) => Some(o),
            Repr::Array(a) => Some(a),
            Repr::String(s) => Some(s),
            Repr::Host(h) => Some(h.as_protocol_mut()),
            Repr::Function(f) => Some(f),
            Repr::Lazy(_) => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayObject> {
        match self {
            Repr::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn is_lazy(&self) -> bool {
        matches!(self, Repr::Lazy(_))
    }
}

impl fmt::Debug for Repr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Repr::Ordinary(o) => fmt::Debug::fmt(o, f),
            Repr::Array(a) => fmt::Debug::fmt(a, f),
            Repr::String(s) => fmt::Debug::fmt(s, f),
            Repr::Host(h) => write!(f, "Host({})", h.as_protocol().class_name()),
            Repr::Function(func) => fmt::Debug::fmt(func, f),
            Repr::Lazy(l) => fmt::Debug::fmt(l, f),
        }
    }
}

/// Built-in prototypes owned by one heap
#[derive(Clone, Copy, Debug)]
pub struct Intrinsics {
    /// `Object.prototype`
    pub object_prototype: ObjectId,
    /// `Function.prototype`
    pub function_prototype: ObjectId,
    /// `Array.prototype`
    pub array_prototype: ObjectId,
    /// `String.prototype`
    pub string_prototype: ObjectId,
}

type Slot = Rc<ObjectCell<Repr>>;

/// Arena of objects for one engine instance
pub struct Heap {
    slots: RefCell<Vec<Slot>>,
    intrinsics: Intrinsics,
    config: HeapConfig,
}

fn push_slot(slots: &mut Vec<Slot>, repr: Repr) -> ObjectId {
    slots.push(Rc::new(ObjectCell::new(repr)));
    ObjectId((slots.len() - 1) as u32)
}

impl Heap {
    /// Create a heap with default config
    pub fn new() -> Self {
        Self::with_config(HeapConfig::default())
    }

    /// Create a heap with custom config
    pub fn with_config(config: HeapConfig) -> Self {
        let mut slots = Vec::new();
        let object_prototype = push_slot(&mut slots, Repr::Ordinary(OrdinaryObject::new(None)));
        let function_prototype =
            push_slot(&mut slots, Repr::Ordinary(OrdinaryObject::new(Some(object_prototype))));
        let array_prototype = push_slot(
            &mut slots,
            Repr::Array(ArrayObject::new(Some(object_prototype), config)),
        );
        let string_prototype = push_slot(
            &mut slots,
            Repr::String(StringObject::new(JsStr::empty(), Some(object_prototype))),
        );
        Self {
            slots: RefCell::new(slots),
            intrinsics: Intrinsics {
                object_prototype,
                function_prototype,
                array_prototype,
                string_prototype,
            },
            config,
        }
    }

    pub fn intrinsics(&self) -> &Intrinsics {
        &self.intrinsics
    }

    pub fn config(&self) -> &HeapConfig {
        &self.config
    }

    /// Number of allocated handles
    pub fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ========================================================================
    // Allocation
    // ========================================================================

    /// Allocate a slot for `repr`
    pub fn alloc(&self, repr: Repr) -> VmResult<ObjectId> {
        let mut slots = self
            .slots
            .try_borrow_mut()
            .map_err(|_| VmError::internal("heap is busy"))?;
        if slots.len() >= u32::MAX as usize {
            return Err(VmError::internal("heap is full"));
        }
        Ok(push_slot(&mut slots, repr))
    }

    /// Ordinary object with the given prototype
    pub fn new_object(&self, prototype: Option<ObjectId>) -> VmResult<ObjectId> {
        self.alloc(Repr::Ordinary(OrdinaryObject::new(prototype)))
    }

    /// Ordinary object inheriting from `Object.prototype`
    pub fn new_plain_object(&self) -> VmResult<ObjectId> {
        self.new_object(Some(self.intrinsics.object_prototype))
    }

    /// Dense array holding `values`
    pub fn new_array(&self, values: Vec<Value>) -> VmResult<ObjectId> {
        let array = ArrayObject::from_values(values, Some(self.intrinsics.array_prototype), self.config)?;
        self.alloc(Repr::Array(array))
    }

    /// Empty array with the given `length`
    pub fn new_array_with_length(&self, length: u64) -> VmResult<ObjectId> {
        let length = u32::try_from(length).map_err(|_| VmError::range_error("Invalid array length"))?;
        let mut array = ArrayObject::new(Some(self.intrinsics.array_prototype), self.config);
        array.set_length(length, true)?;
        self.alloc(Repr::Array(array))
    }

    /// String object over `value`
    pub fn new_string_object(&self, value: JsStr) -> VmResult<ObjectId> {
        self.alloc(Repr::String(StringObject::new(
            value,
            Some(self.intrinsics.string_prototype),
        )))
    }

    /// Adapter over a host map that accepts new keys
    pub fn new_host_map<K: HostKey, V: HostValue>(
        &self,
        map: Rc<RefCell<IndexMap<K, V>>>,
    ) -> VmResult<ObjectId> {
        let adapter = HostMap::new(map, Some(self.intrinsics.object_prototype));
        self.alloc(Repr::Host(Box::new(adapter)))
    }

    /// Adapter over a host map whose key set is fixed
    pub fn new_fixed_host_map<K: HostKey, V: HostValue>(
        &self,
        map: Rc<RefCell<IndexMap<K, V>>>,
    ) -> VmResult<ObjectId> {
        let adapter = HostMap::fixed(map, Some(self.intrinsics.object_prototype));
        self.alloc(Repr::Host(Box::new(adapter)))
    }

    /// Adapter over a host vector
    pub fn new_host_sequence<V: HostValue + Default>(
        &self,
        items: Rc<RefCell<Vec<V>>>,
        resizable: bool,
    ) -> VmResult<ObjectId> {
        let adapter = HostSequence::new(
            items,
            resizable,
            Some(self.intrinsics.array_prototype),
            self.config,
        );
        self.alloc(Repr::Host(Box::new(adapter)))
    }

    /// Callable object wrapping a host closure
    pub fn new_native_function(
        &self,
        name: &str,
        call: impl Fn(&Heap, &Value, &[Value]) -> VmResult<Value> + 'static,
    ) -> VmResult<ObjectId> {
        let function = NativeFunction::new(name, Rc::new(call), Some(self.intrinsics.function_prototype));
        self.alloc(Repr::Function(function))
    }

    /// Object built on first use
    pub fn new_lazy(
        &self,
        factory: impl FnOnce(&Heap) -> VmResult<Repr> + 'static,
    ) -> VmResult<ObjectId> {
        self.alloc(Repr::Lazy(LazyObject::new(factory)))
    }

    // ========================================================================
    // Slot access
    // ========================================================================

    fn slot(&self, id: ObjectId) -> VmResult<Slot> {
        self.slots
            .try_borrow()
            .map_err(|_| VmError::internal("heap is busy"))?
            .get(id.0 as usize)
            .cloned()
            .ok_or_else(|| VmError::internal(format!("dangling object handle {}", id.0)))
    }

    /// Run the factory of a lazy object and install its result
    fn materialize(&self, id: ObjectId) -> VmResult<()> {
        let slot = self.slot(id)?;
        if !slot.borrow()?.is_lazy() {
            return Ok(());
        }
        let factory = match &mut *slot.borrow_mut()? {
            Repr::Lazy(lazy) => lazy.take_factory(),
            _ => return Ok(()),
        };
        let Some(factory) = factory else {
            return Err(VmError::internal("lazy object is not constructed"));
        };
        tracing::debug!(target: "otter::object", object = id.0, "materializing lazy object");
        let built = factory(self)?;
        slot.replace(built)?;
        self.materialize(id)
    }

    /// Inspect the representation behind `id`
    pub fn with_repr<R>(&self, id: ObjectId, f: impl FnOnce(&Repr) -> R) -> VmResult<R> {
        self.materialize(id)?;
        let slot = self.slot(id)?;
        let repr = slot.borrow()?;
        Ok(f(&repr))
    }

    /// Mutate the representation behind `id`
    pub fn with_repr_mut<R>(&self, id: ObjectId, f: impl FnOnce(&mut Repr) -> R) -> VmResult<R> {
        self.materialize(id)?;
        let slot = self.slot(id)?;
        let mut repr = slot.borrow_mut()?;
        Ok(f(&mut repr))
    }

    fn with_object<R>(&self, id: ObjectId, f: impl FnOnce(&dyn PropertyProtocol) -> R) -> VmResult<R> {
        self.with_repr(id, |repr| repr.protocol().map(f))?
            .ok_or_else(|| VmError::internal("lazy object is not constructed"))
    }

    fn with_object_mut<R>(
        &self,
        id: ObjectId,
        f: impl FnOnce(&mut dyn PropertyProtocol) -> R,
    ) -> VmResult<R> {
        self.with_repr_mut(id, |repr| repr.protocol_mut().map(f))?
            .ok_or_else(|| VmError::internal("lazy object is not constructed"))
    }

    // ========================================================================
    // Calls
    // ========================================================================

    /// Whether `value` is a callable object
    pub fn is_callable(&self, value: &Value) -> VmResult<bool> {
        match value.as_object() {
            Some(id) => self.with_repr(id, |repr| matches!(repr, Repr::Function(_))),
            None => Ok(false),
        }
    }

    /// Call `function` with `this` and `args`
    pub fn call(&self, function: &Value, this: &Value, args: &[Value]) -> VmResult<Value> {
        let callable = match function.as_object() {
            Some(id) => self.with_repr(id, |repr| match repr {
                Repr::Function(f) => Some(f.callable()),
                _ => None,
            })?,
            None => None,
        };
        match callable {
            Some(call) => call(self, this, args),
            None => Err(VmError::type_mismatch(format!("{function} is not a function"))),
        }
    }

    fn resolve(&self, slot: PropertySlot, receiver: &Value) -> VmResult<Value> {
        match slot {
            PropertySlot::Value(value) | PropertySlot::Property(PropertyDescriptor::Data { value, .. }) => {
                Ok(value)
            }
            PropertySlot::Property(PropertyDescriptor::Accessor { get: Some(getter), .. }) => {
                self.call(&getter, receiver, &[])
            }
            PropertySlot::Property(PropertyDescriptor::Accessor { get: None, .. }) => Ok(Value::undefined()),
        }
    }

    fn invoke_setter(
        &self,
        setter: Option<Value>,
        key: &PropertyKey,
        receiver: &Value,
        value: Value,
        throw: bool,
    ) -> VmResult<bool> {
        match setter {
            Some(setter) => {
                self.call(&setter, receiver, &[value])?;
                Ok(true)
            }
            None => reject(throw, || format!("Cannot set property {key} which has only a getter")),
        }
    }

    // ========================================================================
    // Property protocol
    // ========================================================================

    /// Own property as a complete descriptor
    pub fn get_own_property(&self, id: ObjectId, key: &PropertyKey) -> VmResult<Option<PropertyDescriptor>> {
        self.with_object(id, |o| o.get_own_property(key).map(|slot| slot.descriptor()))
    }

    /// Own property value, running a getter if it is an accessor
    pub fn get_own(&self, id: ObjectId, key: &PropertyKey) -> VmResult<Value> {
        match self.with_object(id, |o| o.get_own_property(key))? {
            Some(slot) => self.resolve(slot, &Value::Object(id)),
            None => Ok(Value::undefined()),
        }
    }

    /// Find `key` on `id` or its prototypes
    fn lookup(&self, id: ObjectId, key: &PropertyKey) -> VmResult<Option<PropertySlot>> {
        let mut current = id;
        for _ in 0..self.config.max_prototype_depth {
            let (slot, proto) = self.with_object(current, |o| match o.get_own_property(key) {
                Some(slot) => (Some(slot), None),
                None => (None, o.prototype()),
            })?;
            if slot.is_some() {
                return Ok(slot);
            }
            match proto {
                Some(next) => current = next,
                None => return Ok(None),
            }
        }
        Err(VmError::internal("prototype chain is too deep"))
    }

    /// `[[Get]]` with `id` as the receiver
    pub fn get(&self, id: ObjectId, key: &PropertyKey) -> VmResult<Value> {
        self.get_with_receiver(id, key, &Value::Object(id))
    }

    /// `[[Get]]` starting at `id`, binding accessors to `receiver`
    pub fn get_with_receiver(&self, id: ObjectId, key: &PropertyKey, receiver: &Value) -> VmResult<Value> {
        if key.is_proto() && !self.has_own_property(id, key)? {
            return Ok(self.prototype_of(id)?.map_or(Value::Null, Value::Object));
        }
        match self.lookup(id, key)? {
            Some(slot) => self.resolve(slot, receiver),
            None => Ok(Value::undefined()),
        }
    }

    /// `[[Set]]` with `id` as the receiver
    pub fn put(&self, id: ObjectId, key: &PropertyKey, value: Value, throw: bool) -> VmResult<bool> {
        let receiver = Value::Object(id);
        let own = self.with_object(id, |o| o.get_own_property(key))?;
        match own {
            Some(PropertySlot::Property(PropertyDescriptor::Accessor { set, .. })) => {
                return self.invoke_setter(set, key, &receiver, value, throw);
            }
            Some(_) => return self.with_object_mut(id, |o| o.write_own(key, value, throw))?,
            None => {}
        }

        if key.is_proto() {
            return match value {
                Value::Object(proto) => self.set_prototype_of(id, Some(proto), throw),
                Value::Null => self.set_prototype_of(id, None, throw),
                _ => Ok(true),
            };
        }

        if let Some(proto) = self.prototype_of(id)? {
            match self.lookup(proto, key)? {
                Some(PropertySlot::Property(PropertyDescriptor::Accessor { set, .. })) => {
                    return self.invoke_setter(set, key, &receiver, value, throw);
                }
                Some(inherited) if !inherited.is_writable() => {
                    return reject(throw, || format!("Cannot assign to read only property '{key}'"));
                }
                _ => {}
            }
        }
        self.with_object_mut(id, |o| o.add_own(key, value, throw))?
    }

    /// `[[DefineOwnProperty]]`
    pub fn define_own_property(
        &self,
        id: ObjectId,
        key: &PropertyKey,
        desc: &PartialDescriptor,
        throw: bool,
    ) -> VmResult<bool> {
        desc.validate()?;
        self.with_object_mut(id, |o| o.define_own_property(key, desc, throw))?
    }

    /// `[[Delete]]`; absent keys succeed
    pub fn delete(&self, id: ObjectId, key: &PropertyKey, throw: bool) -> VmResult<bool> {
        self.with_object_mut(id, |o| o.delete_own(key, throw))?
    }

    pub fn has_own_property(&self, id: ObjectId, key: &PropertyKey) -> VmResult<bool> {
        self.with_object(id, |o| o.get_own_property(key).is_some())
    }

    /// `key in object`
    pub fn has_property(&self, id: ObjectId, key: &PropertyKey) -> VmResult<bool> {
        Ok(self.lookup(id, key)?.is_some())
    }

    /// Own keys in enumeration order
    pub fn own_keys(&self, id: ObjectId, include_non_enumerable: bool) -> VmResult<Vec<PropertyKey>> {
        self.enumerate(id, include_non_enumerable, false)
    }

    /// Keys of `id`, optionally followed by those of its prototypes.
    ///
    /// A key seen once is never reported again, so a non-enumerable own
    /// property hides an enumerable inherited one.
    pub fn enumerate(
        &self,
        id: ObjectId,
        include_non_enumerable: bool,
        recursive: bool,
    ) -> VmResult<Vec<PropertyKey>> {
        let mut seen = FxHashSet::default();
        let mut out = Vec::new();
        let mut current = Some(id);
        let mut depth = 0;
        while let Some(object) = current {
            if depth == self.config.max_prototype_depth {
                return Err(VmError::internal("prototype chain is too deep"));
            }
            depth += 1;
            let (keys, proto) = self.with_object(object, |o| (o.own_keys(), o.prototype()))?;
            for (key, enumerable) in keys {
                if seen.insert(key.clone()) && (enumerable || include_non_enumerable) {
                    out.push(key);
                }
            }
            current = if recursive { proto } else { None };
        }
        Ok(out)
    }

    pub fn is_extensible(&self, id: ObjectId) -> VmResult<bool> {
        self.with_object(id, |o| o.is_extensible())
    }

    /// Forbid new own properties; cannot be undone
    pub fn prevent_extensions(&self, id: ObjectId) -> VmResult<bool> {
        self.with_object_mut(id, |o| o.prevent_extensions())?;
        Ok(true)
    }

    pub fn prototype_of(&self, id: ObjectId) -> VmResult<Option<ObjectId>> {
        self.with_object(id, |o| o.prototype())
    }

    /// Replace the prototype, refusing cycles and non-extensible targets
    pub fn set_prototype_of(&self, id: ObjectId, proto: Option<ObjectId>, throw: bool) -> VmResult<bool> {
        let (current, extensible) = self.with_object(id, |o| (o.prototype(), o.is_extensible()))?;
        if current == proto {
            return Ok(true);
        }
        if !extensible {
            return reject(throw, || "Object is not extensible".to_string());
        }
        let mut cursor = proto;
        let mut depth = 0;
        while let Some(p) = cursor {
            if p == id {
                return reject(throw, || "Cyclic __proto__ value".to_string());
            }
            depth += 1;
            if depth > self.config.max_prototype_depth {
                return Err(VmError::internal("prototype chain is too deep"));
            }
            cursor = self.prototype_of(p)?;
        }
        tracing::trace!(
            target: "otter::object",
            object = id.0,
            prototype = ?proto.map(ObjectId::index),
            "prototype changed"
        );
        self.with_object_mut(id, |o| o.set_prototype(proto))?;
        Ok(true)
    }

    // ========================================================================
    // Sort support
    // ========================================================================

    /// Number of positions a sort should visit.
    ///
    /// Arrays report their dense slots or populated sparse elements; other
    /// objects report `length`, clamped.
    pub fn element_count(&self, id: ObjectId) -> VmResult<u32> {
        if let Some(count) = self.with_repr(id, |repr| repr.as_array().map(ArrayObject::sort_len))? {
            return Ok(count);
        }
        let n = self.get(id, &PropertyKey::from("length"))?.to_number();
        if n.is_nan() || n <= 0.0 {
            Ok(0)
        } else {
            Ok(n.min(u32::MAX as f64) as u32)
        }
    }

    /// Element at sort position `index`; accessor elements run their getter
    pub fn element_at(&self, id: ObjectId, index: u32) -> VmResult<Value> {
        let slot = self.with_repr(id, |repr| repr.as_array().map(|a| a.sort_slot(index)))?;
        match slot {
            Some(Some(slot)) => self.resolve(slot, &Value::Object(id)),
            Some(None) => Ok(Value::undefined()),
            None => self.get(id, &PropertyKey::index(index)),
        }
    }

    /// Exchange the elements at two sort positions in place
    pub fn swap(&self, id: ObjectId, a: u32, b: u32) -> VmResult<()> {
        let swapped = self.with_repr_mut(id, |repr| match repr {
            Repr::Array(array) => {
                array.sort_swap(a, b);
                true
            }
            _ => false,
        })?;
        if !swapped {
            let (ka, kb) = (PropertyKey::index(a), PropertyKey::index(b));
            let va = self.get(id, &ka)?;
            let vb = self.get(id, &kb)?;
            self.put(id, &ka, vb, true)?;
            self.put(id, &kb, va, true)?;
        }
        Ok(())
    }

    // ========================================================================
    // Export
    // ========================================================================

    /// Project `value` into a host-native tree
    pub fn export(&self, value: &Value) -> VmResult<serde_json::Value> {
        let mut stack = SmallVec::<[ObjectId; 8]>::new();
        self.export_value(value, &mut stack)
    }

    fn export_value(&self, value: &Value, stack: &mut SmallVec<[ObjectId; 8]>) -> VmResult<serde_json::Value> {
        Ok(match value {
            Value::Undefined | Value::Null => serde_json::Value::Null,
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => export_number(*n),
            Value::String(s) => serde_json::Value::String(s.to_std_string()),
            Value::Object(id) => self.export_object(*id, stack)?,
        })
    }

    fn export_object(&self, id: ObjectId, stack: &mut SmallVec<[ObjectId; 8]>) -> VmResult<serde_json::Value> {
        enum Shape {
            Map,
            Sequence(u32),
            Text(JsStr),
            Host(VmResult<serde_json::Value>),
        }

        if stack.contains(&id) {
            return Err(VmError::type_mismatch("Converting circular structure"));
        }
        let shape = self.with_repr(id, |repr| match repr {
            Repr::Array(a) => Shape::Sequence(a.length()),
            Repr::String(s) => Shape::Text(s.value().clone()),
            Repr::Host(h) => Shape::Host(h.export()),
            _ => Shape::Map,
        })?;

        stack.push(id);
        let exported = match shape {
            Shape::Text(s) => serde_json::Value::String(s.to_std_string()),
            Shape::Host(result) => result?,
            Shape::Sequence(length) => {
                let mut items = Vec::with_capacity(length.min(1 << 16) as usize);
                for i in 0..length {
                    let item = self.get_own(id, &PropertyKey::index(i))?;
                    items.push(self.export_value(&item, stack)?);
                }
                serde_json::Value::Array(items)
            }
            Shape::Map => {
                let mut map = serde_json::Map::new();
                for key in self.own_keys(id, false)? {
                    let item = self.get(id, &key)?;
                    map.insert(key.to_string(), self.export_value(&item, stack)?);
                }
                serde_json::Value::Object(map)
            }
        };
        stack.pop();
        Ok(exported)
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Heap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Heap")
            .field("objects", &self.len())
            .field("intrinsics", &self.intrinsics)
            .finish()
    }
}

fn export_number(n: f64) -> serde_json::Value {
    if n.fract() == 0.0 && n.abs() <= (1u64 << 53) as f64 {
        serde_json::Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n).map_or(serde_json::Value::Null, serde_json::Value::Number)
    }
}
