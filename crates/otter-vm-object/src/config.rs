//! Heap tuning knobs

/// Object heap configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapConfig {
    /// Array writes above this index may switch to sparse storage (default: 4096)
    pub sparse_index_threshold: u32,
    /// Sparse switch happens when `index / element_count` exceeds this (default: 10)
    pub sparse_density_ratio: u32,
    /// Dense capacity doubles below this many slots, then grows by 25% (default: 1024)
    pub dense_doubling_limit: usize,
    /// Shrinking below a quarter of capacity reallocates when the new length is
    /// at least this (default: 16)
    pub shrink_realloc_min: usize,
    /// Maximum prototype chain length walked before giving up (default: 10 000)
    pub max_prototype_depth: usize,
}

impl Default for HeapConfig {
    fn default() -> Self {
        Self {
            sparse_index_threshold: 4096,
            sparse_density_ratio: 10,
            dense_doubling_limit: 1024,
            shrink_realloc_min: 16,
            max_prototype_depth: 10_000,
        }
    }
}

impl HeapConfig {
    /// Capacity to allocate when dense storage of `capacity` slots must hold `required`.
    pub fn grown_capacity(&self, capacity: usize, required: usize) -> usize {
        if required <= capacity {
            return capacity;
        }
        let doubled = capacity * 2;
        if required > doubled {
            required
        } else if capacity < self.dense_doubling_limit {
            doubled
        } else {
            let mut next = capacity;
            while next < required {
                next += next / 4;
            }
            next
        }
    }

    /// Whether a dense array holding `element_count` elements should go sparse
    /// to store `index`.
    pub fn should_sparsify(&self, index: u32, element_count: u32) -> bool {
        index > self.sparse_index_threshold
            && (element_count == 0 || index / element_count > self.sparse_density_ratio)
    }
}
