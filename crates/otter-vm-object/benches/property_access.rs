//! Property Access Benchmarks
//!
//! Compares lookups on ordinary objects, prototype chains and dense/sparse arrays.

use criterion::{Criterion, criterion_group, criterion_main};
use otter_vm_object::{Heap, PropertyKey, Value};
use std::hint::black_box;

/// Benchmark: own and inherited property reads
fn bench_object_access(c: &mut Criterion) {
    let heap = Heap::new();
    let obj = heap.new_plain_object().unwrap();
    let keys: Vec<PropertyKey> = (0..20).map(|i| PropertyKey::string(&format!("prop{i}"))).collect();
    for (i, key) in keys.iter().enumerate() {
        heap.put(obj, key, Value::int32(i as i32), true).unwrap();
    }

    c.bench_function("own_get_20_props", |b| {
        b.iter(|| {
            let mut sum = 0.0;
            for key in &keys {
                sum += heap.get(obj, key).unwrap().to_number();
            }
            black_box(sum)
        });
    });

    let mut leaf = obj;
    for _ in 0..8 {
        leaf = heap.new_object(Some(leaf)).unwrap();
    }
    c.bench_function("inherited_get_depth_8", |b| {
        b.iter(|| black_box(heap.get(leaf, &keys[19]).unwrap()));
    });
}

/// Benchmark: element writes in dense and sparse storage
fn bench_array_access(c: &mut Criterion) {
    c.bench_function("dense_push_1000", |b| {
        b.iter(|| {
            let heap = Heap::new();
            let arr = heap.new_array(Vec::new()).unwrap();
            for i in 0..1000 {
                heap.put(arr, &PropertyKey::index(i), Value::int32(i as i32), true).unwrap();
            }
            black_box(arr)
        });
    });

    c.bench_function("sparse_write_1000", |b| {
        b.iter(|| {
            let heap = Heap::new();
            let arr = heap.new_array(Vec::new()).unwrap();
            for i in 0..1000u32 {
                heap.put(arr, &PropertyKey::index(5000 + i * 7), Value::int32(i as i32), true).unwrap();
            }
            black_box(arr)
        });
    });
}

criterion_group!(benches, bench_object_access, bench_array_access);
criterion_main!(benches);
