//! Host collection adapter tests
//!
//! Adapters are live views: the host and scripts share one collection.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use otter_vm_object::{Heap, PartialDescriptor, PropertyKey, Value, VmError};
use serde_json::json;

fn shared_map(entries: &[(&str, f64)]) -> Rc<RefCell<IndexMap<String, f64>>> {
    Rc::new(RefCell::new(
        entries.iter().map(|&(k, v)| (k.to_string(), v)).collect(),
    ))
}

fn names(keys: Vec<PropertyKey>) -> Vec<String> {
    keys.into_iter().map(|k| k.to_string()).collect()
}

// ============================================================================
// Maps
// ============================================================================

#[test]
fn test_map_is_a_live_view() {
    let heap = Heap::new();
    let map = shared_map(&[("a", 1.0)]);
    let obj = heap.new_host_map(Rc::clone(&map)).unwrap();

    assert_eq!(heap.get(obj, &"a".into()).unwrap().as_number(), Some(1.0));
    map.borrow_mut().insert("b".to_string(), 2.0);
    assert_eq!(heap.get(obj, &"b".into()).unwrap().as_number(), Some(2.0));

    heap.put(obj, &"c".into(), Value::int32(3), true).unwrap();
    assert_eq!(map.borrow().get("c"), Some(&3.0));
    assert!(heap.delete(obj, &"a".into(), true).unwrap());
    assert!(!map.borrow().contains_key("a"));

    assert_eq!(names(heap.own_keys(obj, false).unwrap()), ["b", "c"]);
    assert_eq!(heap.export(&Value::Object(obj)).unwrap(), json!({ "b": 2.0, "c": 3.0 }));
}

#[test]
fn test_map_rejects_wrong_value_kind() {
    let heap = Heap::new();
    let map = shared_map(&[("a", 1.0)]);
    let obj = heap.new_host_map(Rc::clone(&map)).unwrap();

    let err = heap.put(obj, &"a".into(), Value::from("text"), false).unwrap_err();
    assert!(matches!(err, VmError::TypeMismatch(_)));
    assert_eq!(map.borrow().get("a"), Some(&1.0));
}

#[test]
fn test_fixed_map_refuses_new_keys() {
    let heap = Heap::new();
    let map = shared_map(&[("a", 1.0)]);
    let obj = heap.new_fixed_host_map(Rc::clone(&map)).unwrap();

    assert!(!heap.is_extensible(obj).unwrap());
    assert!(heap.put(obj, &"a".into(), Value::int32(5), true).unwrap());
    assert!(!heap.put(obj, &"z".into(), Value::int32(1), false).unwrap());
    assert!(heap.put(obj, &"z".into(), Value::int32(1), true).unwrap_err().is_attribute_violation());
    assert_eq!(map.borrow().len(), 1);
    assert_eq!(map.borrow().get("a"), Some(&5.0));
}

#[test]
fn test_map_entries_cannot_become_accessors() {
    let heap = Heap::new();
    let getter = heap.new_native_function("get", |_, _, _| Ok(Value::int32(1))).unwrap();
    let obj = heap.new_host_map(shared_map(&[])).unwrap();
    let accessor = PartialDescriptor::accessor(Some(Value::Object(getter)), None, true, true);

    assert!(!heap.define_own_property(obj, &"a".into(), &accessor, false).unwrap());
    assert!(heap.define_own_property(obj, &"a".into(), &accessor, true).is_err());
    let data = PartialDescriptor::new().with_value(Value::number(0.5));
    assert!(heap.define_own_property(obj, &"a".into(), &data, true).unwrap());
    assert_eq!(heap.get(obj, &"a".into()).unwrap().as_number(), Some(0.5));
}

#[test]
fn test_numeric_map_keeps_other_keys_on_the_object() {
    let heap = Heap::new();
    let map: Rc<RefCell<IndexMap<u32, String>>> = Rc::new(RefCell::new(IndexMap::new()));
    let obj = heap.new_host_map(Rc::clone(&map)).unwrap();

    heap.put(obj, &PropertyKey::index(3), Value::from("three"), true).unwrap();
    heap.put(obj, &"label".into(), Value::from("digits"), true).unwrap();

    assert_eq!(map.borrow().get(&3).map(String::as_str), Some("three"));
    assert_eq!(map.borrow().len(), 1);
    assert_eq!(names(heap.own_keys(obj, false).unwrap()), ["3", "label"]);
}

// ============================================================================
// Sequences
// ============================================================================

#[test]
fn test_resizable_sequence_grows_and_shrinks() {
    let heap = Heap::new();
    let items = Rc::new(RefCell::new(vec![1.0, 2.0]));
    let seq = heap.new_host_sequence(Rc::clone(&items), true).unwrap();

    assert_eq!(heap.prototype_of(seq).unwrap(), Some(heap.intrinsics().array_prototype));
    heap.put(seq, &PropertyKey::index(4), Value::int32(5), true).unwrap();
    assert_eq!(*items.borrow(), vec![1.0, 2.0, 0.0, 0.0, 5.0]);
    assert_eq!(heap.get(seq, &"length".into()).unwrap().as_number(), Some(5.0));

    heap.put(seq, &"length".into(), Value::int32(1), true).unwrap();
    assert_eq!(*items.borrow(), vec![1.0]);
    assert_eq!(heap.export(&Value::Object(seq)).unwrap(), json!([1.0]));
}

#[test]
fn test_fixed_sequence_keeps_its_length() {
    let heap = Heap::new();
    let items = Rc::new(RefCell::new(vec![1.0, 2.0]));
    let seq = heap.new_host_sequence(Rc::clone(&items), false).unwrap();

    assert!(heap.put(seq, &PropertyKey::index(1), Value::int32(9), true).unwrap());
    assert!(!heap.put(seq, &PropertyKey::index(2), Value::int32(3), false).unwrap());
    assert!(!heap.put(seq, &"length".into(), Value::int32(0), false).unwrap());
    assert!(heap.put(seq, &"length".into(), Value::int32(0), true).is_err());
    assert_eq!(*items.borrow(), vec![1.0, 9.0]);

    let desc = heap.get_own_property(seq, &"length".into()).unwrap().unwrap();
    assert!(!desc.is_writable());
}

#[test]
fn test_entries_refuse_attribute_changes() {
    let heap = Heap::new();
    let items = Rc::new(RefCell::new(vec![1.0, 2.0]));
    let seq = heap.new_host_sequence(Rc::clone(&items), true).unwrap();
    let map = shared_map(&[("a", 1.0)]);
    let obj = heap.new_host_map(Rc::clone(&map)).unwrap();

    let read_only = PartialDescriptor::new().with_value(Value::int32(7)).with_writable(false);
    let configurable = PartialDescriptor::new().with_configurable(true);
    for (id, key) in [(seq, PropertyKey::index(0)), (obj, PropertyKey::from("a"))] {
        assert!(!heap.define_own_property(id, &key, &read_only, false).unwrap());
        let err = heap.define_own_property(id, &key, &configurable, true).unwrap_err();
        assert!(err.is_attribute_violation());
    }
    assert_eq!(*items.borrow(), vec![1.0, 2.0]);
    assert_eq!(map.borrow().get("a"), Some(&1.0));

    let plain = PartialDescriptor::new().with_value(Value::int32(7)).with_writable(true);
    assert!(heap.define_own_property(seq, &PropertyKey::index(0), &plain, true).unwrap());
    assert_eq!(items.borrow()[0], 7.0);

    let mixed = PartialDescriptor::new().with_value(Value::int32(1)).with_getter(Value::undefined());
    let err = heap.define_own_property(obj, &"a".into(), &mixed, false).unwrap_err();
    assert!(matches!(err, VmError::TypeMismatch(_)));
}

#[test]
fn test_sequence_delete_resets_element() {
    let heap = Heap::new();
    let items = Rc::new(RefCell::new(vec![String::from("a"), String::from("b")]));
    let seq = heap.new_host_sequence(Rc::clone(&items), true).unwrap();

    assert!(heap.delete(seq, &PropertyKey::index(0), true).unwrap());
    assert_eq!(*items.borrow(), vec![String::new(), String::from("b")]);
    assert!(heap.delete(seq, &PropertyKey::index(10), true).unwrap());
    assert!(!heap.delete(seq, &"length".into(), false).unwrap());
}

#[test]
fn test_sequence_supports_sort_helpers() {
    let heap = Heap::new();
    let items = Rc::new(RefCell::new(vec![3.0, 1.0, 2.0]));
    let seq = heap.new_host_sequence(Rc::clone(&items), false).unwrap();

    let n = heap.element_count(seq).unwrap();
    for i in 0..n {
        for j in 0..n - 1 - i {
            let a = heap.element_at(seq, j).unwrap().to_number();
            let b = heap.element_at(seq, j + 1).unwrap().to_number();
            if a > b {
                heap.swap(seq, j, j + 1).unwrap();
            }
        }
    }
    assert_eq!(*items.borrow(), vec![1.0, 2.0, 3.0]);
}
