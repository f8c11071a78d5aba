//! Contains the definition of [`SyncExtensionMap`], the extension field store
//! that can be shared across threads.

use std::sync::OnceLock;

use derive_more::{Deref, DerefMut, From};
use parking_lot::{Mutex, RwLock};
use protoext_descriptor::{Extension, FieldNumber};

use crate::{ExtensionFields, ExtensionLock, ExtensionMap, Visitor};

/// The lazily allocated record behind a [`SyncExtensionMap`].
///
/// `lock` is the lock handed to the callers for multi-call sequences, `map`
/// keeps the individual calls consistent. They are distinct so that a caller
/// holding `lock` can still call into the store.
#[derive(Debug, Default)]
struct Shared {
    lock: Mutex<()>,
    map: RwLock<ExtensionMap>,
}

/// An extension field store that can be accessed from multiple threads.
///
/// Nothing is allocated until the first write (or the first
/// [`SyncExtensionMap::lock`]); reads before that observe an empty store. The
/// allocation is atomic, concurrent first writers agree on a single record.
///
/// All the operations take `&self`; the [`ExtensionFields`] implementation
/// delegates to them.
#[derive(Debug, Default)]
pub struct SyncExtensionMap {
    shared: OnceLock<Box<Shared>>,
}

impl SyncExtensionMap {
    /// Creates an empty, unallocated [`SyncExtensionMap`].
    #[must_use]
    pub const fn new() -> Self { Self { shared: OnceLock::new() } }

    fn shared(&self) -> Option<&Shared> { self.shared.get().map(Box::as_ref) }

    fn shared_or_init(&self) -> &Shared {
        self.shared.get_or_init(|| {
            log::trace!("allocating synchronized extension storage");
            Box::default()
        })
    }

    /// Returns the number of populated field numbers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared().map_or(0, |shared| shared.map.read().len())
    }

    /// Checks whether no field number is populated.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Checks whether an entry exists for the given field number.
    #[must_use]
    pub fn has(&self, number: FieldNumber) -> bool {
        self.shared().is_some_and(|shared| shared.map.read().has(number))
    }

    /// Gets a copy of the entry of the given field number, or the zero entry
    /// if absent.
    #[must_use]
    pub fn get(&self, number: FieldNumber) -> Extension {
        self.shared()
            .map(|shared| shared.map.read().get(number))
            .unwrap_or_default()
    }

    /// Inserts or overwrites the entry of the given field number.
    pub fn set(&self, number: FieldNumber, extension: Extension) {
        self.shared_or_init().map.write().set(number, extension);
    }

    /// Removes the entry of the given field number if present.
    pub fn clear(&self, number: FieldNumber) {
        if let Some(shared) = self.shared() {
            shared.map.write().clear(number);
        }
    }

    /// Visits the entries present at the time of the call.
    ///
    /// The entries are copied out before visiting so the visitor may call
    /// back into this store. Changes made meanwhile by other callers are not
    /// observed; hold [`SyncExtensionMap::lock`] for the whole call to rule
    /// them out.
    pub fn range(&self, visit: &mut Visitor<'_>) {
        let Some(shared) = self.shared() else {
            return;
        };

        let snapshot = shared
            .map
            .read()
            .iter()
            .map(|(number, extension)| (number, extension.clone()))
            .collect::<Vec<_>>();

        for (number, extension) in &snapshot {
            if visit(*number, extension).is_break() {
                return;
            }
        }
    }

    /// Checks whether the backing record has been allocated.
    #[must_use]
    pub fn has_init(&self) -> bool { self.shared.get().is_some() }

    /// Acquires the per-instance lock, allocating the backing record first if
    /// needed.
    pub fn lock(&self) -> ExtensionLock<'_> {
        ExtensionLock::Held(self.shared_or_init().lock.lock())
    }

    /// Acquires the per-instance lock only if the backing record has already
    /// been allocated.
    pub fn lock_if_init(&self) -> Option<ExtensionLock<'_>> {
        self.shared().map(|shared| ExtensionLock::Held(shared.lock.lock()))
    }

    /// Consumes the store and returns the unsynchronized map of its entries.
    #[must_use]
    pub fn into_inner(self) -> ExtensionMap {
        self.shared
            .into_inner()
            .map_or_else(ExtensionMap::new, |shared| shared.map.into_inner())
    }
}

impl ExtensionFields for SyncExtensionMap {
    fn len(&self) -> usize { Self::len(self) }

    fn has(&self, number: FieldNumber) -> bool { Self::has(self, number) }

    fn get(&self, number: FieldNumber) -> Extension { Self::get(self, number) }

    fn set(&mut self, number: FieldNumber, extension: Extension) {
        Self::set(self, number, extension);
    }

    fn clear(&mut self, number: FieldNumber) { Self::clear(self, number); }

    fn range(&self, visit: &mut Visitor<'_>) { Self::range(self, visit); }

    fn has_init(&self) -> bool { Self::has_init(self) }

    fn lock(&self) -> ExtensionLock<'_> { Self::lock(self) }
}

impl From<ExtensionMap> for SyncExtensionMap {
    fn from(map: ExtensionMap) -> Self {
        if !map.has_init() {
            return Self::new();
        }

        Self {
            shared: OnceLock::from(Box::new(Shared {
                lock: Mutex::new(()),
                map: RwLock::new(map),
            })),
        }
    }
}

/// The extension storage field embedded in the messages whose extensions may
/// be accessed across threads.
#[derive(Debug, Default, Deref, DerefMut, From)]
pub struct InternalExtensions(SyncExtensionMap);

impl InternalExtensions {
    /// Creates an empty, unallocated [`InternalExtensions`].
    #[must_use]
    pub const fn new() -> Self { Self(SyncExtensionMap::new()) }

    /// Consumes the container and returns the wrapped store.
    #[must_use]
    pub fn into_inner(self) -> SyncExtensionMap { self.0 }
}

#[cfg(test)]
mod test;
