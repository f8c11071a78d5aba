//! Implements the storage of the extension fields of a message instance.
//!
//! Two storage strategies share the [`ExtensionFields`] interface:
//!
//! - [`ExtensionMap`], an unsynchronized mapping for messages owned by a
//!   single thread at a time.
//! - [`SyncExtensionMap`] (wrapped by [`InternalExtensions`]), a lazily
//!   allocated mapping that can be shared across threads and exposes a
//!   per-instance lock for multi-call sequences.
//!
//! The strategy is chosen once per message type through [`StorageKind`], and
//! the storage field of a message instance is bound to the interface through
//! [`extension_fields_of`].
//!
//! # Example
//!
//! ``` rust
//! use std::ops::ControlFlow;
//!
//! use protoext_descriptor::{Extension, FieldNumber};
//! use protoext_storage::{
//!     extension_fields_of, ExtensionFields, InternalExtensions,
//! };
//!
//! let mut storage = InternalExtensions::default();
//! let fields = extension_fields_of(&mut storage);
//!
//! assert!(!fields.has_init());
//!
//! fields.set(FieldNumber(5), Extension::from_raw(vec![0x28, 0x01]));
//!
//! assert!(fields.has_init());
//! assert_eq!(fields.len(), 1);
//! assert_eq!(fields.get(FieldNumber(5)).raw(), Some(&[0x28, 0x01][..]));
//!
//! let mut visited = Vec::new();
//! fields.range(&mut |number, _| {
//!     visited.push(number);
//!     ControlFlow::Continue(())
//! });
//!
//! assert_eq!(visited, vec![FieldNumber(5)]);
//! ```

use std::{fmt::Debug, ops::ControlFlow};

use parking_lot::MutexGuard;
use protoext_descriptor::{Extension, FieldNumber};

pub mod map;
pub mod selector;
pub mod storage;
pub mod sync;

pub use map::ExtensionMap;
pub use selector::{
    extension_fields_of, try_extension_fields_of, InvalidHandleError,
};
pub use storage::{ExtensionStorage, StorageKind};
pub use sync::{InternalExtensions, SyncExtensionMap};

/// The visitor invoked by [`ExtensionFields::range`] for each populated field
/// number. Returning [`ControlFlow::Break`] stops the iteration.
pub type Visitor<'a> =
    dyn FnMut(FieldNumber, &Extension) -> ControlFlow<()> + 'a;

/// The set of operations shared by all the extension field stores.
///
/// Individual calls are internally consistent, but a sequence of calls is not
/// atomic unless the caller holds the guard returned by
/// [`ExtensionFields::lock`] for the whole sequence.
pub trait ExtensionFields: Debug + Send + Sync {
    /// Returns the number of populated field numbers.
    fn len(&self) -> usize;

    /// Checks whether no field number is populated.
    fn is_empty(&self) -> bool { self.len() == 0 }

    /// Checks whether an entry exists for the given field number.
    fn has(&self, number: FieldNumber) -> bool;

    /// Gets a copy of the entry of the given field number.
    ///
    /// Returns the zero entry if the field number is absent.
    fn get(&self, number: FieldNumber) -> Extension;

    /// Inserts or overwrites the entry of the given field number, allocating
    /// the backing storage if needed.
    fn set(&mut self, number: FieldNumber, extension: Extension);

    /// Removes the entry of the given field number if present.
    fn clear(&mut self, number: FieldNumber);

    /// Visits the populated entries in an unspecified order until the visitor
    /// breaks or every entry has been visited.
    fn range(&self, visit: &mut Visitor<'_>);

    /// Checks whether the backing storage has been allocated without forcing
    /// the allocation.
    fn has_init(&self) -> bool;

    /// Acquires the lock that brackets a multi-call sequence. The lock is
    /// released when the returned guard is dropped or
    /// [`ExtensionLock::unlock`]ed.
    fn lock(&self) -> ExtensionLock<'_>;

    /// Collects the populated field numbers in ascending order.
    fn field_numbers(&self) -> Vec<FieldNumber> {
        let mut numbers = Vec::with_capacity(self.len());

        self.range(&mut |number, _| {
            numbers.push(number);
            ControlFlow::Continue(())
        });

        numbers.sort_unstable();
        numbers
    }
}

/// The guard returned by [`ExtensionFields::lock`].
#[derive(Debug)]
#[must_use = "the lock is released as soon as the guard is dropped"]
pub enum ExtensionLock<'a> {
    /// Returned by the stores that provide no locking; callers must serialize
    /// their accesses externally.
    Inert,

    /// Holds the per-instance lock of a synchronized store.
    Held(MutexGuard<'a, ()>),
}

impl ExtensionLock<'_> {
    /// Checks whether the guard actually holds a lock.
    #[must_use]
    pub const fn is_held(&self) -> bool { matches!(self, Self::Held(_)) }

    /// Releases the lock.
    pub fn unlock(self) { drop(self); }
}
