//! Contains the tagged choice between the two storage strategies.

use protoext_descriptor::{Extension, FieldNumber};
use serde::{Deserialize, Serialize};

use crate::{
    ExtensionFields, ExtensionLock, ExtensionMap, SyncExtensionMap, Visitor,
};

/// Selects the storage strategy of the extension fields of a message type.
///
/// The choice is made once, when the message type is defined.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum StorageKind {
    /// Unsynchronized storage; see [`ExtensionMap`].
    #[default]
    Plain,

    /// Lazily allocated storage shareable across threads; see
    /// [`SyncExtensionMap`].
    Synchronized,
}

impl StorageKind {
    /// Creates an empty storage of this kind.
    #[must_use]
    pub const fn new_storage(self) -> ExtensionStorage {
        ExtensionStorage::new(self)
    }
}

/// An extension field store whose strategy is picked at runtime from a
/// [`StorageKind`].
#[derive(Debug)]
pub enum ExtensionStorage {
    /// See [`ExtensionMap`].
    Plain(ExtensionMap),

    /// See [`SyncExtensionMap`].
    Synchronized(SyncExtensionMap),
}

impl ExtensionStorage {
    /// Creates an empty storage of the given kind.
    #[must_use]
    pub const fn new(kind: StorageKind) -> Self {
        match kind {
            StorageKind::Plain => Self::Plain(ExtensionMap::new()),
            StorageKind::Synchronized => {
                Self::Synchronized(SyncExtensionMap::new())
            }
        }
    }

    /// Returns the strategy of this storage.
    #[must_use]
    pub const fn kind(&self) -> StorageKind {
        match self {
            Self::Plain(_) => StorageKind::Plain,
            Self::Synchronized(_) => StorageKind::Synchronized,
        }
    }

    /// Returns the storage as an [`ExtensionFields`] trait object.
    #[must_use]
    pub fn as_fields(&self) -> &dyn ExtensionFields {
        match self {
            Self::Plain(map) => map,
            Self::Synchronized(map) => map,
        }
    }

    /// Returns the storage as a mutable [`ExtensionFields`] trait object.
    #[must_use]
    pub fn as_fields_mut(&mut self) -> &mut dyn ExtensionFields {
        match self {
            Self::Plain(map) => map,
            Self::Synchronized(map) => map,
        }
    }
}

impl Default for ExtensionStorage {
    fn default() -> Self { Self::new(StorageKind::default()) }
}

impl ExtensionFields for ExtensionStorage {
    fn len(&self) -> usize { self.as_fields().len() }

    fn has(&self, number: FieldNumber) -> bool { self.as_fields().has(number) }

    fn get(&self, number: FieldNumber) -> Extension {
        self.as_fields().get(number)
    }

    fn set(&mut self, number: FieldNumber, extension: Extension) {
        self.as_fields_mut().set(number, extension);
    }

    fn clear(&mut self, number: FieldNumber) {
        self.as_fields_mut().clear(number);
    }

    fn range(&self, visit: &mut Visitor<'_>) { self.as_fields().range(visit); }

    fn has_init(&self) -> bool { self.as_fields().has_init() }

    fn lock(&self) -> ExtensionLock<'_> { self.as_fields().lock() }
}
