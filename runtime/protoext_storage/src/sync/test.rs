use std::{
    ops::ControlFlow,
    sync::{Arc, Barrier},
    thread,
};

use protoext_descriptor::{Extension, FieldNumber, Value};

use crate::{
    test::{init_logger, COUNT},
    ExtensionFields, ExtensionMap, InternalExtensions, SyncExtensionMap,
};

#[test]
fn reads_do_not_allocate() {
    let store = SyncExtensionMap::new();

    assert!(!store.has_init());
    assert_eq!(store.len(), 0);
    assert!(!store.has(FieldNumber(5)));
    assert!(store.get(FieldNumber(5)).is_zero());

    store.clear(FieldNumber(5));
    store.range(&mut |_, _| panic!("nothing to visit"));

    assert!(store.lock_if_init().is_none());
    assert!(!store.has_init());
}

#[test]
fn set_then_clear() {
    init_logger();

    let store = SyncExtensionMap::new();
    let entry = Extension::from_value(&COUNT, Value::new(5_u64));

    assert_eq!(store.len(), 0);

    store.set(FieldNumber(5), entry.clone());

    assert!(store.has_init());
    assert!(store.has(FieldNumber(5)));
    assert_eq!(store.get(FieldNumber(5)), entry);

    store.clear(FieldNumber(5));

    assert!(!store.has(FieldNumber(5)));
    assert_eq!(store.len(), 0);
    assert!(store.has_init());
}

#[test]
fn lock_forces_allocation() {
    let store = SyncExtensionMap::new();

    let guard = store.lock();

    assert!(guard.is_held());
    assert!(store.has_init());

    // the store stays usable while the caller holds the lock
    store.set(FieldNumber(1), Extension::from_raw(vec![0x08_u8, 0x01]));
    assert_eq!(store.len(), 1);

    guard.unlock();

    assert!(store.lock_if_init().is_some_and(|x| x.is_held()));
}

#[test]
fn visitor_may_write_back() {
    let store = SyncExtensionMap::new();

    store.set(FieldNumber(1), Extension::from_raw(vec![0x08_u8, 0x01]));
    store.set(FieldNumber(2), Extension::from_raw(vec![0x10_u8, 0x01]));

    store.range(&mut |number, extension| {
        store.set(
            FieldNumber(number.get() + 100),
            extension.clone().without_raw(),
        );
        ControlFlow::Continue(())
    });

    assert_eq!(store.field_numbers(), vec![
        FieldNumber(1),
        FieldNumber(2),
        FieldNumber(101),
        FieldNumber(102),
    ]);
}

#[test]
fn concurrent_first_writers_share_one_allocation() {
    const WRITERS: u8 = 16;

    init_logger();

    for _ in 0..32 {
        let store = SyncExtensionMap::new();
        let barrier = Barrier::new(usize::from(WRITERS));

        thread::scope(|scope| {
            for writer in 0..WRITERS {
                let store = &store;
                let barrier = &barrier;

                scope.spawn(move || {
                    barrier.wait();
                    store.set(
                        FieldNumber(i32::from(writer)),
                        Extension::from_raw(vec![writer]),
                    );
                });
            }
        });

        assert_eq!(store.len(), usize::from(WRITERS));

        for writer in 0..WRITERS {
            assert_eq!(
                store.get(FieldNumber(i32::from(writer))).raw(),
                Some(&[writer][..])
            );
        }
    }
}

#[test]
fn lock_brackets_read_modify_write() {
    const THREADS: u64 = 8;
    const INCREMENTS: u64 = 200;

    let store = Arc::new(SyncExtensionMap::new());

    store.set(
        FieldNumber(5),
        Extension::from_value(&COUNT, Value::new(0_u64)),
    );

    let handles = (0..THREADS)
        .map(|_| {
            let store = store.clone();

            thread::spawn(move || {
                for _ in 0..INCREMENTS {
                    let guard = store.lock();

                    let current = *store
                        .get(FieldNumber(5))
                        .value()
                        .and_then(Value::downcast_ref::<u64>)
                        .unwrap();

                    store.set(
                        FieldNumber(5),
                        Extension::from_value(&COUNT, Value::new(current + 1)),
                    );

                    guard.unlock();
                }
            })
        })
        .collect::<Vec<_>>();

    for handle in handles {
        handle.join().unwrap();
    }

    let total = store
        .get(FieldNumber(5))
        .value()
        .and_then(Value::downcast_ref::<u64>)
        .copied();

    assert_eq!(total, Some(THREADS * INCREMENTS));
}

#[test]
fn conversions() {
    let map = [(FieldNumber(9), Extension::from_raw(vec![0x48_u8, 0x01]))]
        .into_iter()
        .collect::<ExtensionMap>();

    let store = SyncExtensionMap::from(map);

    assert!(store.has_init());
    assert!(store.has(FieldNumber(9)));

    let back = store.into_inner();
    assert_eq!(back.len(), 1);

    assert!(!SyncExtensionMap::from(ExtensionMap::new()).has_init());
    assert!(SyncExtensionMap::new().into_inner().get(FieldNumber(9)).is_zero());

    let extensions = InternalExtensions::new();
    extensions.set(FieldNumber(9), Extension::from_raw(vec![0x48_u8, 0x02]));

    assert_eq!(extensions.into_inner().len(), 1);
}
