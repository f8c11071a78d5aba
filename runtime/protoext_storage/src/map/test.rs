use std::iter;

use protoext_descriptor::{Extension, FieldNumber, Value};

use crate::{
    test::COUNT, ExtensionFields, ExtensionMap, SyncExtensionMap,
};

#[test]
fn allocates_on_first_write() {
    let mut map = ExtensionMap::new();

    map.clear(FieldNumber(1));
    assert!(!map.has_init());

    map.set(FieldNumber(1), Extension::from_raw(vec![0x08_u8, 0x01]));
    assert!(map.has_init());

    map.clear(FieldNumber(1));
    assert!(map.has_init());
    assert!(map.is_empty());
}

#[test]
fn overwrite_keeps_single_entry() {
    let mut map = ExtensionMap::new();
    let fresh = Extension::from_value(&COUNT, Value::new(2_u64));

    map.set(FieldNumber(5), Extension::from_raw(vec![0x28_u8, 0x01]));
    map.set(FieldNumber(5), fresh.clone());

    assert_eq!(map.len(), 1);
    assert_eq!(map.get(FieldNumber(5)), fresh);
}

#[test]
fn entries_are_stored_by_value() {
    let mut map = ExtensionMap::new();
    let mut entry = Extension::from_raw(vec![0x28_u8, 0x01]);

    map.set(FieldNumber(5), entry.clone());

    // rebuilding the caller's entry leaves the stored one untouched
    entry = entry.with_raw(vec![0x28_u8, 0x02]);
    assert_eq!(map.get(FieldNumber(5)).raw(), Some(&[0x28_u8, 0x01][..]));

    // so does rebuilding a fetched entry and storing it elsewhere
    let fetched = map
        .get(FieldNumber(5))
        .with_decoded(&COUNT, Value::new(1_u64))
        .without_raw();
    map.set(FieldNumber(6), fetched.clone());

    assert_eq!(
        map.get(FieldNumber(5)),
        Extension::from_raw(vec![0x28_u8, 0x01])
    );
    assert_eq!(map.get(FieldNumber(6)), fetched);
    assert_ne!(map.get(FieldNumber(5)), entry);
}

#[test]
fn lock_is_inert() {
    let map = ExtensionMap::new();

    let first = map.lock();
    let second = map.lock();

    assert!(!first.is_held());
    assert!(!second.is_held());

    first.unlock();
    second.unlock();

    // locking never allocates
    assert!(!map.has_init());
}

#[test]
fn reset_keeps_allocation() {
    let mut map = [
        (FieldNumber(1), Extension::from_raw(vec![0x08_u8, 0x01])),
        (FieldNumber(2), Extension::from_raw(vec![0x10_u8, 0x01])),
    ]
    .into_iter()
    .collect::<ExtensionMap>();

    assert_eq!(map.len(), 2);
    assert_eq!(map.iter().count(), 2);

    map.reset();

    assert!(map.is_empty());
    assert!(map.has_init());
    assert_eq!(map.iter().count(), 0);
}

#[test]
fn extend_overwrites() {
    let mut map = ExtensionMap::new();

    map.set(FieldNumber(1), Extension::from_raw(vec![0x08_u8, 0x01]));
    map.extend([
        (FieldNumber(1), Extension::from_raw(vec![0x08_u8, 0x02])),
        (FieldNumber(3), Extension::from_raw(vec![0x18_u8, 0x01])),
    ]);

    assert_eq!(map.field_numbers(), vec![FieldNumber(1), FieldNumber(3)]);
    assert_eq!(map.get(FieldNumber(1)).raw(), Some(&[0x08_u8, 0x02][..]));
}

#[test]
fn empty_collect_and_extend_do_not_allocate() {
    let collected = iter::empty().collect::<ExtensionMap>();
    assert!(!collected.has_init());
    assert!(!SyncExtensionMap::from(collected).has_init());

    let mut extended = ExtensionMap::new();
    extended.extend([]);
    assert!(!extended.has_init());
    assert!(!SyncExtensionMap::from(extended).has_init());

    let mut written = ExtensionMap::new();
    written.extend([(FieldNumber(1), Extension::from_raw(vec![0x08_u8]))]);
    assert!(written.has_init());
    assert!(SyncExtensionMap::from(written).has(FieldNumber(1)));
}
