//! Fast array tests
//!
//! Storage switching, length semantics and the in-place sort helpers,
//! driven through the heap.

use otter_vm_object::{Heap, HeapConfig, ObjectId, PartialDescriptor, PropertyAttributes, PropertyKey, Value, VmError};
use serde_json::json;

fn numbers(heap: &Heap, values: &[i32]) -> ObjectId {
    heap.new_array(values.iter().map(|&v| Value::int32(v)).collect()).unwrap()
}

fn is_sparse(heap: &Heap, id: ObjectId) -> bool {
    heap.with_repr(id, |r| r.as_array().is_some_and(|a| a.is_sparse())).unwrap()
}

fn length(heap: &Heap, id: ObjectId) -> Option<f64> {
    heap.get(id, &PropertyKey::from("length")).unwrap().as_number()
}

// ============================================================================
// Length
// ============================================================================

#[test]
fn test_shrink_then_grow_exposes_holes() {
    let heap = Heap::new();
    let arr = numbers(&heap, &[1, 2, 3]);
    assert!(heap.put(arr, &"length".into(), Value::int32(1), true).unwrap());
    assert!(heap.put(arr, &"length".into(), Value::int32(3), true).unwrap());

    assert_eq!(length(&heap, arr), Some(3.0));
    for i in 1..3 {
        assert!(!heap.has_own_property(arr, &PropertyKey::index(i)).unwrap());
        assert!(heap.get(arr, &PropertyKey::index(i)).unwrap().is_undefined());
    }
    assert_eq!(heap.export(&Value::Object(arr)).unwrap(), json!([1, null, null]));
}

#[test]
fn test_unnormalized_max_index_is_range_error() {
    let heap = Heap::new();
    let arr = numbers(&heap, &[1]);
    let key = PropertyKey::Index(u32::MAX);

    let err = heap.put(arr, &key, Value::int32(1), false).unwrap_err();
    assert!(matches!(err, VmError::RangeError(_)));
    let desc = PartialDescriptor::new().with_value(Value::int32(1));
    assert!(matches!(heap.define_own_property(arr, &key, &desc, false), Err(VmError::RangeError(_))));
    assert_eq!(length(&heap, arr), Some(1.0));
}

#[test]
fn test_write_past_end_extends_length() {
    let heap = Heap::new();
    let arr = numbers(&heap, &[]);
    heap.put(arr, &PropertyKey::index(9), Value::int32(1), true).unwrap();
    assert_eq!(length(&heap, arr), Some(10.0));
    assert_eq!(heap.element_count(arr).unwrap(), 10);
}

#[test]
fn test_invalid_length_is_range_error() {
    let heap = Heap::new();
    let arr = numbers(&heap, &[1]);
    for bad in [Value::number(-1.0), Value::number(1.5), Value::number(4_294_967_296.0)] {
        let err = heap.put(arr, &"length".into(), bad, false).unwrap_err();
        assert!(matches!(err, VmError::RangeError(_)));
    }
    assert!(matches!(heap.new_array_with_length(1 << 32), Err(VmError::RangeError(_))));
    let empty = heap.new_array_with_length(5).unwrap();
    assert_eq!(length(&heap, empty), Some(5.0));
    assert!(heap.own_keys(empty, false).unwrap().is_empty());
}

#[test]
fn test_non_configurable_element_blocks_shrink() {
    let heap = Heap::new();
    let arr = numbers(&heap, &[0, 1, 2, 3]);
    let locked = PartialDescriptor::data(Value::int32(1), PropertyAttributes::new(true, true, false));
    heap.define_own_property(arr, &PropertyKey::index(1), &locked, true).unwrap();

    assert!(!heap.put(arr, &"length".into(), Value::int32(0), false).unwrap());
    assert_eq!(length(&heap, arr), Some(2.0));
    assert!(heap.has_own_property(arr, &PropertyKey::index(1)).unwrap());
    assert!(!heap.has_own_property(arr, &PropertyKey::index(2)).unwrap());

    let err = heap.put(arr, &"length".into(), Value::int32(0), true).unwrap_err();
    assert!(err.is_attribute_violation());
    assert_eq!(length(&heap, arr), Some(2.0));
}

#[test]
fn test_read_only_length_blocks_growth() {
    let heap = Heap::new();
    let arr = numbers(&heap, &[1, 2]);
    let freeze = PartialDescriptor::new().with_writable(false);
    heap.define_own_property(arr, &"length".into(), &freeze, true).unwrap();

    assert!(!heap.put(arr, &PropertyKey::index(5), Value::int32(1), false).unwrap());
    assert!(heap.put(arr, &"length".into(), Value::int32(0), true).is_err());
    assert!(heap.put(arr, &PropertyKey::index(0), Value::int32(9), true).unwrap());
    assert_eq!(length(&heap, arr), Some(2.0));

    let desc = heap.get_own_property(arr, &"length".into()).unwrap().unwrap();
    assert_eq!(desc.attributes(), PropertyAttributes::new(false, false, false));
}

#[test]
fn test_length_cannot_be_deleted() {
    let heap = Heap::new();
    let arr = numbers(&heap, &[1]);
    assert!(!heap.delete(arr, &"length".into(), false).unwrap());
    assert!(heap.delete(arr, &PropertyKey::index(0), true).unwrap());
    assert_eq!(length(&heap, arr), Some(1.0));
}

// ============================================================================
// Storage switching
// ============================================================================

#[test]
fn test_far_write_on_empty_array_goes_sparse() {
    let heap = Heap::new();
    let edge = numbers(&heap, &[]);
    heap.put(edge, &PropertyKey::index(4096), Value::int32(1), true).unwrap();
    assert!(!is_sparse(&heap, edge));

    let far = numbers(&heap, &[]);
    heap.put(far, &PropertyKey::index(4097), Value::int32(1), true).unwrap();
    assert!(is_sparse(&heap, far));
    assert_eq!(length(&heap, far), Some(4098.0));
}

#[test]
fn test_density_decides_storage() {
    let heap = Heap::new();
    let thin: Vec<i32> = (0..100).collect();
    let thin = numbers(&heap, &thin);
    heap.put(thin, &PropertyKey::index(4097), Value::int32(1), true).unwrap();
    assert!(is_sparse(&heap, thin));

    let dense: Vec<i32> = (0..500).collect();
    let dense = numbers(&heap, &dense);
    heap.put(dense, &PropertyKey::index(4097), Value::int32(1), true).unwrap();
    assert!(!is_sparse(&heap, dense));
}

#[test]
fn test_sparse_array_keeps_values_and_order() {
    let heap = Heap::new();
    let arr = numbers(&heap, &[10, 20]);
    heap.put(arr, &PropertyKey::index(100_000), Value::int32(3), true).unwrap();
    heap.put(arr, &PropertyKey::index(50), Value::int32(2), true).unwrap();
    assert!(is_sparse(&heap, arr));

    let keys: Vec<String> = heap.own_keys(arr, false).unwrap().iter().map(ToString::to_string).collect();
    assert_eq!(keys, ["0", "1", "50", "100000"]);
    assert_eq!(heap.get(arr, &PropertyKey::index(1)).unwrap().as_number(), Some(20.0));

    // Shrinking never brings dense storage back
    heap.put(arr, &"length".into(), Value::int32(2), true).unwrap();
    assert!(is_sparse(&heap, arr));
    assert_eq!(heap.element_count(arr).unwrap(), 2);
}

#[test]
fn test_custom_threshold() {
    let heap = Heap::with_config(HeapConfig {
        sparse_index_threshold: 16,
        ..HeapConfig::default()
    });
    let arr = numbers(&heap, &[1]);
    heap.put(arr, &PropertyKey::index(17), Value::int32(1), true).unwrap();
    assert!(is_sparse(&heap, arr));
}

// ============================================================================
// Sort helpers
// ============================================================================

fn insertion_sort(heap: &Heap, id: ObjectId) {
    let n = heap.element_count(id).unwrap();
    for i in 1..n {
        let mut j = i;
        while j > 0 {
            let a = heap.element_at(id, j - 1).unwrap().to_number();
            let b = heap.element_at(id, j).unwrap().to_number();
            if a <= b {
                break;
            }
            heap.swap(id, j - 1, j).unwrap();
            j -= 1;
        }
    }
}

#[test]
fn test_sort_helpers_on_dense_array() {
    let heap = Heap::new();
    let arr = numbers(&heap, &[5, 3, 9, 1]);
    insertion_sort(&heap, arr);
    assert_eq!(heap.export(&Value::Object(arr)).unwrap(), json!([1, 3, 5, 9]));
}

#[test]
fn test_swap_moves_holes() {
    let heap = Heap::new();
    let arr = numbers(&heap, &[1, 2, 3]);
    heap.delete(arr, &PropertyKey::index(0), true).unwrap();
    heap.swap(arr, 0, 2).unwrap();
    assert!(!heap.has_own_property(arr, &PropertyKey::index(2)).unwrap());
    assert_eq!(heap.element_at(arr, 0).unwrap().as_number(), Some(3.0));
}

#[test]
fn test_sort_helpers_visit_only_stored_elements() {
    let heap = Heap::new();
    let empty = heap.new_array_with_length(u64::from(u32::MAX)).unwrap();
    assert_eq!(heap.element_count(empty).unwrap(), 0);

    let arr = numbers(&heap, &[40, 30]);
    heap.put(arr, &PropertyKey::index(100_000), Value::int32(10), true).unwrap();
    heap.put(arr, &PropertyKey::index(50), Value::int32(20), true).unwrap();
    assert!(is_sparse(&heap, arr));
    assert_eq!(heap.element_count(arr).unwrap(), 4);

    insertion_sort(&heap, arr);
    let at = |i: u32| heap.get(arr, &PropertyKey::index(i)).unwrap().as_number();
    assert_eq!([at(0), at(1), at(50), at(100_000)], [Some(10.0), Some(20.0), Some(30.0), Some(40.0)]);
    assert_eq!(length(&heap, arr), Some(100_001.0));
}

#[test]
fn test_element_at_runs_getters() {
    let heap = Heap::new();
    let getter = heap.new_native_function("get", |_, _, _| Ok(Value::int32(8))).unwrap();
    let arr = numbers(&heap, &[0, 0]);
    let accessor = PartialDescriptor::accessor(Some(Value::Object(getter)), None, true, true);
    heap.define_own_property(arr, &PropertyKey::index(1), &accessor, true).unwrap();
    assert_eq!(heap.element_at(arr, 1).unwrap().as_number(), Some(8.0));
    assert!(heap.element_at(arr, 7).unwrap().is_undefined());
}

#[test]
fn test_sort_helpers_on_array_like_object() {
    let heap = Heap::new();
    let obj = heap.new_plain_object().unwrap();
    for (i, v) in [4, 2, 7].into_iter().enumerate() {
        heap.put(obj, &PropertyKey::index(i as u32), Value::int32(v), true).unwrap();
    }
    heap.put(obj, &"length".into(), Value::int32(3), true).unwrap();
    insertion_sort(&heap, obj);
    let sorted: Vec<f64> = (0..3)
        .filter_map(|i| heap.get(obj, &PropertyKey::index(i)).unwrap().as_number())
        .collect();
    assert_eq!(sorted, [2.0, 4.0, 7.0]);

    let plain = heap.new_plain_object().unwrap();
    assert_eq!(heap.element_count(plain).unwrap(), 0);
    heap.put(plain, &"length".into(), Value::from("0x2"), true).unwrap();
    assert_eq!(heap.element_count(plain).unwrap(), 2);
    heap.put(plain, &"length".into(), Value::from("infinity"), true).unwrap();
    assert_eq!(heap.element_count(plain).unwrap(), 0);
}
