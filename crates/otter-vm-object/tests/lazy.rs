//! Lazy object tests

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use otter_vm_object::{
    ArrayObject, Heap, ObjectId, OrdinaryObject, PropertyProtocol, Repr, Value, VmError, VmResult,
};

fn ready_object(heap: &Heap) -> VmResult<Repr> {
    let mut obj = OrdinaryObject::new(Some(heap.intrinsics().object_prototype));
    obj.add_own(&"ready".into(), Value::boolean(true), true)?;
    Ok(Repr::Ordinary(obj))
}

#[test]
fn test_factory_runs_once_on_first_use() {
    let heap = Heap::new();
    let runs = Rc::new(Cell::new(0));
    let counter = Rc::clone(&runs);
    let lazy = heap
        .new_lazy(move |heap| {
            counter.set(counter.get() + 1);
            ready_object(heap)
        })
        .unwrap();
    assert_eq!(runs.get(), 0);

    assert_eq!(heap.get(lazy, &"ready".into()).unwrap().as_boolean(), Some(true));
    heap.put(lazy, &"more".into(), Value::int32(1), true).unwrap();
    assert!(heap.has_own_property(lazy, &"more".into()).unwrap());
    assert_eq!(runs.get(), 1);
    assert!(!heap.with_repr(lazy, Repr::is_lazy).unwrap());
}

#[test]
fn test_handle_identity_survives_materialization() {
    let heap = Heap::new();
    let lazy = heap.new_lazy(ready_object).unwrap();
    let holder = heap.new_plain_object().unwrap();
    heap.put(holder, &"target".into(), Value::Object(lazy), true).unwrap();

    heap.get(lazy, &"ready".into()).unwrap();
    let held = heap.get(holder, &"target".into()).unwrap();
    assert_eq!(held.as_object(), Some(lazy));
    assert!(heap.get(holder, &"target".into()).unwrap().same_value(&Value::Object(lazy)));
}

#[test]
fn test_lazy_prototype_materializes_through_lookup() {
    let heap = Heap::new();
    let lazy = heap.new_lazy(ready_object).unwrap();
    let child = heap.new_object(Some(lazy)).unwrap();
    assert_eq!(heap.get(child, &"ready".into()).unwrap().as_boolean(), Some(true));
}

#[test]
fn test_factory_may_allocate_and_chain() {
    let heap = Heap::new();
    let lazy = heap
        .new_lazy(|heap| {
            let inner = heap.new_plain_object()?;
            heap.put(inner, &"deep".into(), Value::int32(1), true)?;
            let proto = heap.intrinsics().array_prototype;
            Ok(Repr::Lazy(otter_vm_object::LazyObject::new(move |heap| {
                let array = ArrayObject::from_values(vec![Value::Object(inner)], Some(proto), *heap.config())?;
                Ok(Repr::Array(array))
            })))
        })
        .unwrap();

    assert!(heap.with_repr(lazy, |r| r.as_array().is_some()).unwrap());
    let inner = heap.get(lazy, &0u32.into()).unwrap().as_object().unwrap();
    assert_eq!(heap.get(inner, &"deep".into()).unwrap().as_number(), Some(1.0));
}

#[test]
fn test_reentrant_access_is_an_error() {
    let heap = Heap::new();
    let handle: Rc<Cell<Option<ObjectId>>> = Rc::new(Cell::new(None));
    let observed: Rc<RefCell<Option<VmError>>> = Rc::new(RefCell::new(None));
    let (h, o) = (Rc::clone(&handle), Rc::clone(&observed));
    let lazy = heap
        .new_lazy(move |heap| {
            if let Some(me) = h.get() {
                *o.borrow_mut() = heap.get(me, &"ready".into()).err();
            }
            ready_object(heap)
        })
        .unwrap();
    handle.set(Some(lazy));

    assert_eq!(heap.get(lazy, &"ready".into()).unwrap().as_boolean(), Some(true));
    assert!(matches!(*observed.borrow(), Some(VmError::InternalError(_))));
}

#[test]
fn test_failed_factory_reports_error() {
    let heap = Heap::new();
    let lazy = heap
        .new_lazy(|_| Err(VmError::type_mismatch("cannot build")))
        .unwrap();
    assert!(matches!(heap.get(lazy, &"x".into()), Err(VmError::TypeMismatch(_))));
    assert!(matches!(heap.get(lazy, &"x".into()), Err(VmError::InternalError(_))));
}
