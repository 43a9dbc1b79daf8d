//! Deferred construction of expensive objects.
//!
//! A `LazyObject` sits in a heap slot until the first operation on that
//! handle. The heap then takes the factory, runs it and stores the result in
//! the same slot, so the handle keeps its identity.

use std::fmt;

use crate::error::VmResult;
use crate::heap::{Heap, Repr};

/// Builds the real representation; receives the heap for allocation.
pub type LazyFactory = Box<dyn FnOnce(&Heap) -> VmResult<Repr>>;

/// Placeholder representation awaiting its first use
pub struct LazyObject {
    factory: Option<LazyFactory>,
}

impl LazyObject {
    pub fn new(factory: impl FnOnce(&Heap) -> VmResult<Repr> + 'static) -> Self {
        Self {
            factory: Some(Box::new(factory)),
        }
    }

    /// Whether the factory has not been taken yet
    pub fn is_pending(&self) -> bool {
        self.factory.is_some()
    }

    /// Take the factory; `None` once construction has started
    pub(crate) fn take_factory(&mut self) -> Option<LazyFactory> {
        self.factory.take()
    }
}

impl fmt::Debug for LazyObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyObject").field("pending", &self.is_pending()).finish()
    }
}
