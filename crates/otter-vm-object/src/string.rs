//! Immutable engine strings with narrow and wide encodings
//!
//! A `JsStr` is stored narrow (one byte per code unit) when every code unit
//! is ASCII, and wide (UTF-16 code units) otherwise. Lengths and indices are
//! always counted in UTF-16 code units. Operations pick the narrowest
//! encoding their result allows.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

#[derive(Clone)]
enum Encoding {
    Narrow(Arc<[u8]>),
    Wide(Arc<[u16]>),
}

/// Immutable string value
#[derive(Clone)]
pub struct JsStr {
    data: Encoding,
}

impl JsStr {
    /// Create from a Rust string
    pub fn new(s: &str) -> Self {
        if s.is_ascii() {
            Self::narrow(s.as_bytes())
        } else {
            Self {
                data: Encoding::Wide(s.encode_utf16().collect()),
            }
        }
    }

    /// Create from UTF-16 code units, choosing narrow storage when possible
    pub fn from_utf16(units: &[u16]) -> Self {
        if units.iter().all(|&u| u < 0x80) {
            Self {
                data: Encoding::Narrow(units.iter().map(|&u| u as u8).collect()),
            }
        } else {
            Self {
                data: Encoding::Wide(Arc::from(units)),
            }
        }
    }

    fn narrow(bytes: &[u8]) -> Self {
        debug_assert!(bytes.is_ascii());
        Self {
            data: Encoding::Narrow(Arc::from(bytes)),
        }
    }

    /// The empty string
    pub fn empty() -> Self {
        Self::narrow(b"")
    }

    /// Length in UTF-16 code units
    #[inline]
    pub fn len(&self) -> usize {
        match &self.data {
            Encoding::Narrow(b) => b.len(),
            Encoding::Wide(w) => w.len(),
        }
    }

    /// Check if empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the string uses single-byte storage
    #[inline]
    pub fn is_narrow(&self) -> bool {
        matches!(self.data, Encoding::Narrow(_))
    }

    /// ASCII bytes when narrow
    pub(crate) fn as_narrow(&self) -> Option<&[u8]> {
        match &self.data {
            Encoding::Narrow(b) => Some(b),
            Encoding::Wide(_) => None,
        }
    }

    /// Code unit at `index`
    #[inline]
    pub fn code_unit_at(&self, index: usize) -> Option<u16> {
        match &self.data {
            Encoding::Narrow(b) => b.get(index).map(|&c| c as u16),
            Encoding::Wide(w) => w.get(index).copied(),
        }
    }

    /// One-unit string at `index`
    pub fn char_at(&self, index: usize) -> Option<JsStr> {
        match &self.data {
            Encoding::Narrow(b) => b.get(index).map(|c| Self::narrow(std::slice::from_ref(c))),
            Encoding::Wide(w) => w.get(index).map(|u| Self::from_utf16(std::slice::from_ref(u))),
        }
    }

    /// Iterate over UTF-16 code units
    pub fn units(&self) -> Units<'_> {
        match &self.data {
            Encoding::Narrow(b) => Units::Narrow(b.iter()),
            Encoding::Wide(w) => Units::Wide(w.iter()),
        }
    }

    /// Copy out UTF-16 code units
    pub fn to_utf16(&self) -> Vec<u16> {
        self.units().collect()
    }

    /// Substring over `[start, end)` code units; bounds are clamped.
    ///
    /// Wide input is narrowed when the slice is all ASCII.
    pub fn substring(&self, start: usize, end: usize) -> JsStr {
        let end = end.min(self.len());
        let start = start.min(end);
        match &self.data {
            Encoding::Narrow(b) => Self::narrow(&b[start..end]),
            Encoding::Wide(w) => Self::from_utf16(&w[start..end]),
        }
    }

    /// Concatenate, widening if either side is wide
    pub fn concat(&self, other: &JsStr) -> JsStr {
        match (&self.data, &other.data) {
            (Encoding::Narrow(a), Encoding::Narrow(b)) => {
                let mut bytes = Vec::with_capacity(a.len() + b.len());
                bytes.extend_from_slice(a);
                bytes.extend_from_slice(b);
                Self {
                    data: Encoding::Narrow(bytes.into()),
                }
            }
            _ => {
                let mut units = Vec::with_capacity(self.len() + other.len());
                units.extend(self.units());
                units.extend(other.units());
                Self {
                    data: Encoding::Wide(units.into()),
                }
            }
        }
    }

    /// First occurrence of `needle` at or after `start`
    pub fn index_of(&self, needle: &JsStr, start: usize) -> Option<usize> {
        let n = needle.len();
        if n > self.len() {
            return None;
        }
        let last = self.len() - n;
        if let (Some(hay), Some(pat)) = (self.as_narrow(), needle.as_narrow()) {
            return (start..=last).find(|&i| &hay[i..i + n] == pat);
        }
        let hay = self.to_utf16();
        let pat = needle.to_utf16();
        (start..=last).find(|&i| hay[i..i + n] == pat[..])
    }

    /// Last occurrence of `needle` starting at or before `start`
    pub fn last_index_of(&self, needle: &JsStr, start: usize) -> Option<usize> {
        let n = needle.len();
        if n > self.len() {
            return None;
        }
        let from = start.min(self.len() - n);
        if let (Some(hay), Some(pat)) = (self.as_narrow(), needle.as_narrow()) {
            return (0..=from).rev().find(|&i| &hay[i..i + n] == pat);
        }
        let hay = self.to_utf16();
        let pat = needle.to_utf16();
        (0..=from).rev().find(|&i| hay[i..i + n] == pat[..])
    }

    /// Lowercase (locale-independent)
    pub fn to_lower(&self) -> JsStr {
        match &self.data {
            Encoding::Narrow(b) => Self::narrow(&b.to_ascii_lowercase()),
            Encoding::Wide(_) => Self::new(&self.to_std_string().to_lowercase()),
        }
    }

    /// Uppercase (locale-independent)
    pub fn to_upper(&self) -> JsStr {
        match &self.data {
            Encoding::Narrow(b) => Self::narrow(&b.to_ascii_uppercase()),
            Encoding::Wide(_) => Self::new(&self.to_std_string().to_uppercase()),
        }
    }

    /// Code point order, independent of encoding
    pub fn compare_to(&self, other: &JsStr) -> Ordering {
        match (self.as_narrow(), other.as_narrow()) {
            (Some(a), Some(b)) => a.cmp(b),
            _ => self.code_points().cmp(other.code_points()),
        }
    }

    /// Decoded code points; a lone surrogate yields its own unit value
    fn code_points(&self) -> impl Iterator<Item = u32> + '_ {
        char::decode_utf16(self.units()).map(|c| c.map_or_else(|e| u32::from(e.unpaired_surrogate()), u32::from))
    }

    /// Decode to a Rust string; lone surrogates become U+FFFD
    pub fn to_std_string(&self) -> String {
        match &self.data {
            Encoding::Narrow(b) => String::from_utf8_lossy(b).into_owned(),
            Encoding::Wide(w) => String::from_utf16_lossy(w),
        }
    }
}

/// Iterator over the code units of a `JsStr`
pub enum Units<'a> {
    Narrow(std::slice::Iter<'a, u8>),
    Wide(std::slice::Iter<'a, u16>),
}

impl Iterator for Units<'_> {
    type Item = u16;

    #[inline]
    fn next(&mut self) -> Option<u16> {
        match self {
            Units::Narrow(it) => it.next().map(|&c| c as u16),
            Units::Wide(it) => it.next().copied(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Units::Narrow(it) => it.size_hint(),
            Units::Wide(it) => it.size_hint(),
        }
    }
}

impl PartialEq for JsStr {
    fn eq(&self, other: &Self) -> bool {
        match (&self.data, &other.data) {
            (Encoding::Narrow(a), Encoding::Narrow(b)) => a == b,
            (Encoding::Wide(a), Encoding::Wide(b)) => a == b,
            _ => self.len() == other.len() && self.units().eq(other.units()),
        }
    }
}

impl Eq for JsStr {}

impl Hash for JsStr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        for unit in self.units() {
            state.write_u16(unit);
        }
    }
}

impl PartialOrd for JsStr {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for JsStr {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare_to(other)
    }
}

impl Default for JsStr {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for JsStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.data {
            Encoding::Narrow(b) => f.write_str(std::str::from_utf8(b).unwrap_or_default()),
            Encoding::Wide(_) => f.write_str(&self.to_std_string()),
        }
    }
}

impl fmt::Debug for JsStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JsStr({:?})", self.to_std_string())
    }
}

impl From<&str> for JsStr {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for JsStr {
    fn from(s: String) -> Self {
        Self::new(&s)
    }
}
