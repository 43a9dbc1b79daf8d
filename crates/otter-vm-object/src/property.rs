//! Property keys, attributes and descriptors
//!
//! A property is stored either as a bare [`Value`] (writable, enumerable and
//! configurable data) or as a full [`PropertyDescriptor`]. Definition requests
//! arrive as a [`PartialDescriptor`] and are merged into the existing slot by
//! [`reconcile`].

use std::fmt;

use crate::error::{VmError, VmResult, reject};
use crate::string::JsStr;
use crate::value::Value;

/// Largest valid array index (`2^32 - 2`)
pub const MAX_ARRAY_INDEX: u32 = u32::MAX - 1;

/// Property key: canonical integer index or string
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    /// Integer index in `0 ..= 2^32 - 2`
    Index(u32),
    /// Any other key
    String(JsStr),
}

impl PropertyKey {
    /// Create a key from text, canonicalizing integer indices
    pub fn string(s: &str) -> Self {
        Self::from_js_str(JsStr::new(s))
    }

    /// Create a key from a `JsStr`, canonicalizing integer indices
    pub fn from_js_str(s: JsStr) -> Self {
        match s.as_narrow().and_then(parse_array_index) {
            Some(index) => Self::Index(index),
            None => Self::String(s),
        }
    }

    /// Create an index key; `2^32 - 1` is not an index and becomes a string key
    pub fn index(i: u32) -> Self {
        if i <= MAX_ARRAY_INDEX {
            Self::Index(i)
        } else {
            let mut buf = itoa::Buffer::new();
            Self::String(JsStr::new(buf.format(i)))
        }
    }

    #[inline]
    pub fn as_index(&self) -> Option<u32> {
        match self {
            Self::Index(i) => Some(*i),
            Self::String(_) => None,
        }
    }

    /// Whether this is the `length` key
    pub fn is_length(&self) -> bool {
        matches!(self, Self::String(s) if s.as_narrow() == Some(&b"length"[..]))
    }

    /// Whether this is the `__proto__` key
    pub fn is_proto(&self) -> bool {
        matches!(self, Self::String(s) if s.as_narrow() == Some(&b"__proto__"[..]))
    }

    /// Key as a string value
    pub fn to_js_str(&self) -> JsStr {
        match self {
            Self::Index(i) => {
                let mut buf = itoa::Buffer::new();
                JsStr::new(buf.format(*i))
            }
            Self::String(s) => s.clone(),
        }
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{i}"),
            Self::String(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for PropertyKey {
    fn from(s: &str) -> Self {
        Self::string(s)
    }
}

impl From<u32> for PropertyKey {
    fn from(i: u32) -> Self {
        Self::index(i)
    }
}

impl From<JsStr> for PropertyKey {
    fn from(s: JsStr) -> Self {
        Self::from_js_str(s)
    }
}

/// Parse a canonical array index: decimal digits, no leading zeros, at most
/// `2^32 - 2`.
pub fn parse_array_index(bytes: &[u8]) -> Option<u32> {
    match bytes {
        [] => None,
        [b'0'] => Some(0),
        [b'0', ..] => None,
        _ if bytes.len() > 10 => None,
        _ => {
            let mut n: u64 = 0;
            for &b in bytes {
                if !b.is_ascii_digit() {
                    return None;
                }
                n = n * 10 + u64::from(b - b'0');
            }
            u32::try_from(n).ok().filter(|&i| i <= MAX_ARRAY_INDEX)
        }
    }
}

/// Property attributes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PropertyAttributes {
    /// Property is writable (data properties only)
    pub writable: bool,
    /// Property is enumerable
    pub enumerable: bool,
    /// Property is configurable
    pub configurable: bool,
}

impl PropertyAttributes {
    /// Default data property attributes
    pub const fn data() -> Self {
        Self {
            writable: true,
            enumerable: true,
            configurable: true,
        }
    }

    /// Non-writable, non-enumerable, non-configurable
    pub const fn frozen() -> Self {
        Self {
            writable: false,
            enumerable: false,
            configurable: false,
        }
    }

    /// Create with explicit flags
    pub const fn new(writable: bool, enumerable: bool, configurable: bool) -> Self {
        Self {
            writable,
            enumerable,
            configurable,
        }
    }
}

/// Complete property descriptor
#[derive(Clone, Debug)]
pub enum PropertyDescriptor {
    /// Data property
    Data {
        /// The value
        value: Value,
        /// Attributes
        attributes: PropertyAttributes,
    },
    /// Accessor property
    Accessor {
        /// Getter function
        get: Option<Value>,
        /// Setter function
        set: Option<Value>,
        /// Attributes (`writable` is always false)
        attributes: PropertyAttributes,
    },
}

impl PropertyDescriptor {
    /// Create a data property with default attributes
    pub fn data(value: Value) -> Self {
        Self::Data {
            value,
            attributes: PropertyAttributes::data(),
        }
    }

    /// Create a data property with specific attributes
    pub fn data_with_attrs(value: Value, attributes: PropertyAttributes) -> Self {
        Self::Data { value, attributes }
    }

    /// Create an accessor property
    pub fn accessor(get: Option<Value>, set: Option<Value>, enumerable: bool, configurable: bool) -> Self {
        Self::Accessor {
            get,
            set,
            attributes: PropertyAttributes::new(false, enumerable, configurable),
        }
    }

    pub fn attributes(&self) -> PropertyAttributes {
        match self {
            Self::Data { attributes, .. } | Self::Accessor { attributes, .. } => *attributes,
        }
    }

    pub fn is_accessor(&self) -> bool {
        matches!(self, Self::Accessor { .. })
    }

    /// Value of a data property
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Data { value, .. } => Some(value),
            Self::Accessor { .. } => None,
        }
    }

    /// Writable data property
    pub fn is_writable(&self) -> bool {
        matches!(self, Self::Data { attributes, .. } if attributes.writable)
    }

    pub fn is_enumerable(&self) -> bool {
        self.attributes().enumerable
    }

    pub fn is_configurable(&self) -> bool {
        self.attributes().configurable
    }
}

/// Stored form of an own property
#[derive(Clone, Debug)]
pub enum PropertySlot {
    /// Writable, enumerable, configurable data
    Value(Value),
    /// Anything else
    Property(PropertyDescriptor),
}

impl PropertySlot {
    /// Full descriptor view of this slot
    pub fn descriptor(&self) -> PropertyDescriptor {
        match self {
            Self::Value(v) => PropertyDescriptor::data(v.clone()),
            Self::Property(p) => p.clone(),
        }
    }

    /// Store `desc`, collapsing default data properties to a bare value
    pub fn from_descriptor(desc: PropertyDescriptor) -> Self {
        match desc {
            PropertyDescriptor::Data { value, attributes } if attributes == PropertyAttributes::data() => {
                Self::Value(value)
            }
            other => Self::Property(other),
        }
    }

    pub fn is_configurable(&self) -> bool {
        match self {
            Self::Value(_) => true,
            Self::Property(p) => p.is_configurable(),
        }
    }

    pub fn is_enumerable(&self) -> bool {
        match self {
            Self::Value(_) => true,
            Self::Property(p) => p.is_enumerable(),
        }
    }

    pub fn is_writable(&self) -> bool {
        match self {
            Self::Value(_) => true,
            Self::Property(p) => p.is_writable(),
        }
    }

    /// Slot holds a descriptor record rather than a bare value
    pub fn is_described(&self) -> bool {
        matches!(self, Self::Property(_))
    }

    /// Overwrite the value of a writable data slot; returns false otherwise
    pub fn write_value(&mut self, new_value: Value) -> bool {
        match self {
            Self::Value(v) => {
                *v = new_value;
                true
            }
            Self::Property(PropertyDescriptor::Data { value, attributes }) if attributes.writable => {
                *value = new_value;
                true
            }
            Self::Property(_) => false,
        }
    }
}

/// A property definition request; absent fields keep their current state
#[derive(Clone, Debug, Default)]
pub struct PartialDescriptor {
    pub value: Option<Value>,
    pub get: Option<Value>,
    pub set: Option<Value>,
    pub writable: Option<bool>,
    pub enumerable: Option<bool>,
    pub configurable: Option<bool>,
}

impl PartialDescriptor {
    /// Empty request
    pub fn new() -> Self {
        Self::default()
    }

    /// Fully specified data descriptor
    pub fn data(value: Value, attributes: PropertyAttributes) -> Self {
        Self {
            value: Some(value),
            writable: Some(attributes.writable),
            enumerable: Some(attributes.enumerable),
            configurable: Some(attributes.configurable),
            ..Self::default()
        }
    }

    /// Fully specified accessor descriptor; `None` means "no function"
    pub fn accessor(get: Option<Value>, set: Option<Value>, enumerable: bool, configurable: bool) -> Self {
        Self {
            get: Some(get.unwrap_or_default()),
            set: Some(set.unwrap_or_default()),
            enumerable: Some(enumerable),
            configurable: Some(configurable),
            ..Self::default()
        }
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_getter(mut self, get: Value) -> Self {
        self.get = Some(get);
        self
    }

    pub fn with_setter(mut self, set: Value) -> Self {
        self.set = Some(set);
        self
    }

    pub fn with_writable(mut self, writable: bool) -> Self {
        self.writable = Some(writable);
        self
    }

    pub fn with_enumerable(mut self, enumerable: bool) -> Self {
        self.enumerable = Some(enumerable);
        self
    }

    pub fn with_configurable(mut self, configurable: bool) -> Self {
        self.configurable = Some(configurable);
        self
    }

    /// Request mentions a getter or setter
    pub fn is_accessor(&self) -> bool {
        self.get.is_some() || self.set.is_some()
    }

    /// Request mentions a value or writability
    pub fn is_data(&self) -> bool {
        self.value.is_some() || self.writable.is_some()
    }

    /// Reject requests that mix data and accessor fields
    pub fn validate(&self) -> VmResult<()> {
        if self.is_data() && self.is_accessor() {
            return Err(VmError::type_mismatch(
                "Invalid property descriptor. Cannot both specify accessors and a value or writable attribute",
            ));
        }
        Ok(())
    }

    fn is_default_data(&self) -> bool {
        self.value.is_some()
            && !self.is_accessor()
            && self.writable == Some(true)
            && self.enumerable == Some(true)
            && self.configurable == Some(true)
    }
}

fn function_slot(v: &Value) -> Option<Value> {
    if v.is_undefined() { None } else { Some(v.clone()) }
}

fn same_function(a: &Option<Value>, b: &Option<Value>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.same_value(b),
        _ => false,
    }
}

/// Merge a definition request into an existing property.
///
/// Returns the slot to store, or `Ok(None)` when the request is rejected and
/// `throw` is false.
pub fn reconcile(
    key: &PropertyKey,
    existing: Option<&PropertySlot>,
    desc: &PartialDescriptor,
    extensible: bool,
    throw: bool,
) -> VmResult<Option<PropertySlot>> {
    desc.validate()?;
    let redefine = || format!("Cannot redefine property: {key}");

    let current = match existing {
        None => {
            if !extensible {
                reject(throw, || format!("Cannot define property {key}, object is not extensible"))?;
                return Ok(None);
            }
            None
        }
        Some(slot) => Some(slot.descriptor()),
    };

    if let Some(current) = &current
        && !current.is_configurable()
    {
        if desc.configurable == Some(true) {
            reject(throw, redefine)?;
            return Ok(None);
        }
        if desc.enumerable.is_some_and(|e| e != current.is_enumerable()) {
            reject(throw, redefine)?;
            return Ok(None);
        }
        let violates = match current {
            PropertyDescriptor::Data { .. } if desc.is_accessor() => true,
            PropertyDescriptor::Accessor { .. } if desc.is_data() => true,
            PropertyDescriptor::Data { value, attributes } => {
                !attributes.writable
                    && (desc.writable == Some(true)
                        || desc.value.as_ref().is_some_and(|v| !v.same_value(value)))
            }
            PropertyDescriptor::Accessor { get, set, .. } => {
                desc.get.as_ref().is_some_and(|g| !same_function(&function_slot(g), get))
                    || desc.set.as_ref().is_some_and(|s| !same_function(&function_slot(s), set))
            }
        };
        if violates {
            reject(throw, redefine)?;
            return Ok(None);
        }
    }

    if desc.is_default_data() {
        return Ok(desc.value.clone().map(PropertySlot::Value));
    }

    let (mut value, mut get, mut set, mut accessor, mut attrs) = match current {
        None => (None, None, None, false, PropertyAttributes::default()),
        Some(PropertyDescriptor::Data { value, attributes }) => (Some(value), None, None, false, attributes),
        Some(PropertyDescriptor::Accessor { get, set, attributes }) => (None, get, set, true, attributes),
    };

    if let Some(w) = desc.writable {
        attrs.writable = w;
    }
    if let Some(e) = desc.enumerable {
        attrs.enumerable = e;
    }
    if let Some(c) = desc.configurable {
        attrs.configurable = c;
    }
    if desc.is_data() {
        if let Some(v) = &desc.value {
            value = Some(v.clone());
        }
        get = None;
        set = None;
        accessor = false;
    }
    if desc.is_accessor() {
        if let Some(g) = &desc.get {
            get = function_slot(g);
        }
        if let Some(s) = &desc.set {
            set = function_slot(s);
        }
        if !accessor {
            attrs.writable = false;
        }
        value = None;
        accessor = true;
    }

    let stored = if accessor {
        PropertyDescriptor::Accessor {
            get,
            set,
            attributes: attrs,
        }
    } else {
        PropertyDescriptor::Data {
            value: value.unwrap_or_default(),
            attributes: attrs,
        }
    };
    Ok(Some(PropertySlot::from_descriptor(stored)))
}
