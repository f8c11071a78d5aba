//! Contains the data types describing extension fields: [`FieldNumber`],
//! [`ExtensionDesc`], and the per-field [`entry::Extension`] record stored by
//! the extension field stores.
//!
//! The descriptors are produced outside of this crate (generated code) and are
//! treated as immutable, `'static` metadata.

use std::{
    any::{Any, TypeId},
    fmt::Debug,
    hash::{Hash, Hasher},
};

use derive_more::{Display, From};
use derive_new::new;
use serde::{Deserialize, Serialize};

pub mod entry;

pub use entry::{EntryState, Extension, Value};

/// Represents a field number uniquely identifying a field (including the
/// extension fields) within the wire representation of a message type.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    From,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct FieldNumber(pub i32);

impl FieldNumber {
    /// Returns the underlying integer of the field number.
    #[must_use]
    pub const fn get(self) -> i32 { self.0 }
}

/// The runtime identity of a Rust type, used by the descriptors to refer to
/// the message type being extended and to the payload type of the extension.
///
/// Two identities are equal if and only if they refer to the same type; the
/// name is only carried for diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct TypeIdentity {
    id: TypeId,
    name: &'static str,
}

impl TypeIdentity {
    /// Gets the identity of the type `T`.
    #[must_use]
    pub fn of<T: ?Sized + Any>() -> Self {
        Self { id: TypeId::of::<T>(), name: std::any::type_name::<T>() }
    }

    /// Returns the [`TypeId`] of the identified type.
    #[must_use]
    pub const fn id(&self) -> TypeId { self.id }

    /// Returns the name of the identified type.
    #[must_use]
    pub const fn name(&self) -> &'static str { self.name }

    /// Checks whether this identity refers to the type `T`.
    #[must_use]
    pub fn is<T: ?Sized + Any>(&self) -> bool { self.id == TypeId::of::<T>() }
}

impl PartialEq for TypeIdentity {
    fn eq(&self, other: &Self) -> bool { self.id == other.id }
}

impl Eq for TypeIdentity {}

impl Hash for TypeIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) { self.id.hash(state); }
}

/// A trait implemented by all the message types that can be extended.
pub trait Message: Any + Debug + Send + Sync {
    /// Resets the message to its zero state.
    fn reset(&mut self);

    /// Gets the [`TypeIdentity`] of this message type.
    fn type_identity(&self) -> TypeIdentity
    where
        Self: Sized,
    {
        TypeIdentity::of::<Self>()
    }
}

/// Describes an extension field defined outside of the schema of the message
/// type it extends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, new)]
pub struct ExtensionDesc {
    /// The message type that is being extended.
    pub extended_type: TypeIdentity,

    /// The type of the extension payload.
    pub extension_type: TypeIdentity,

    /// The field number of the extension.
    pub field: FieldNumber,

    /// The fully-qualified name of the extension, used for text formatting.
    pub name: &'static str,

    /// The wire tag encoding of the field.
    pub tag: &'static str,

    /// The name of the file in which the extension is defined.
    pub filename: &'static str,
}

impl ExtensionDesc {
    /// Checks whether this descriptor extends the message type `M`.
    #[must_use]
    pub fn extends<M: Message>(&self) -> bool { self.extended_type.is::<M>() }
}
