//! Contains the definition of [`Extension`], the value record stored for a
//! single extension field number.

use std::{any::Any, fmt::Debug, sync::Arc};

use by_address::ByAddress;

use crate::ExtensionDesc;

/// An opaque, already decoded extension value.
///
/// Cloning a [`Value`] is cheap and shares the underlying allocation. Two
/// values are equal only if they share the same allocation.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Value(ByAddress<Arc<dyn Any + Send + Sync>>);

impl Value {
    /// Wraps the given decoded value.
    #[must_use]
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(ByAddress(Arc::new(value)))
    }

    /// Wraps an already shared decoded value.
    #[must_use]
    pub const fn from_arc(value: Arc<dyn Any + Send + Sync>) -> Self {
        Self(ByAddress(value))
    }

    /// Gets the reference to the decoded value if it is of type `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0 .0.downcast_ref::<T>()
    }

    /// Checks whether the decoded value is of type `T`.
    #[must_use]
    pub fn is<T: Any>(&self) -> bool { self.0 .0.is::<T>() }

    /// Returns the shared pointer to the decoded value.
    #[must_use]
    pub fn as_arc(&self) -> &Arc<dyn Any + Send + Sync> { &self.0 .0 }
}

impl Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Value").field(&Arc::as_ptr(&self.0 .0)).finish()
    }
}

/// The state of an [`Extension`] entry, derived from which of its parts are
/// populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntryState {
    /// Nothing is populated; the zero entry.
    Empty,

    /// Only the descriptor is known.
    Described,

    /// The raw encoded bytes are present but haven't been decoded yet.
    Unparsed,

    /// The value has been set and hasn't been serialized yet.
    Fresh,

    /// The raw bytes have been decoded and the value is cached alongside them.
    Cached,
}

/// The value record of one extension field.
///
/// When an extension is set on a message, only the descriptor and the value
/// are populated. When a message is decoded, only the raw bytes are populated
/// until the extension is accessed, at which point the descriptor and the
/// value are filled in as well.
///
/// A value is never present without its descriptor; the constructors and
/// builders of this type uphold that.
///
/// The [`Default`] instance is the zero entry, returned for absent field
/// numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extension {
    desc: Option<&'static ExtensionDesc>,
    value: Option<Value>,
    raw: Option<Vec<u8>>,
}

impl Extension {
    /// Creates an entry holding only the raw encoded bytes.
    #[must_use]
    pub fn from_raw(raw: impl Into<Vec<u8>>) -> Self {
        Self { desc: None, value: None, raw: Some(raw.into()) }
    }

    /// Creates an entry holding a freshly set value together with its
    /// descriptor.
    #[must_use]
    pub const fn from_value(desc: &'static ExtensionDesc, value: Value) -> Self {
        Self { desc: Some(desc), value: Some(value), raw: None }
    }

    /// Creates an entry holding only the descriptor.
    #[must_use]
    pub const fn from_desc(desc: &'static ExtensionDesc) -> Self {
        Self { desc: Some(desc), value: None, raw: None }
    }

    /// Replaces the raw encoded bytes of this entry.
    #[must_use]
    pub fn with_raw(mut self, raw: impl Into<Vec<u8>>) -> Self {
        self.raw = Some(raw.into());
        self
    }

    /// Populates the decoded value together with its descriptor, keeping the
    /// raw bytes (if any) as the cached encoding.
    #[must_use]
    pub fn with_decoded(
        mut self,
        desc: &'static ExtensionDesc,
        value: Value,
    ) -> Self {
        self.desc = Some(desc);
        self.value = Some(value);
        self
    }

    /// Drops the raw encoded bytes, e.g., after the value has been mutated and
    /// the encoding went stale.
    #[must_use]
    pub fn without_raw(mut self) -> Self {
        self.raw = None;
        self
    }

    /// Drops the decoded value but keeps the descriptor and the raw bytes.
    #[must_use]
    pub fn without_value(mut self) -> Self {
        self.value = None;
        self
    }

    /// Returns the descriptor of the extension, if known.
    #[must_use]
    pub const fn desc(&self) -> Option<&'static ExtensionDesc> { self.desc }

    /// Returns the decoded value, if any.
    #[must_use]
    pub const fn value(&self) -> Option<&Value> { self.value.as_ref() }

    /// Returns the raw encoded bytes, if any.
    #[must_use]
    pub fn raw(&self) -> Option<&[u8]> { self.raw.as_deref() }

    /// Checks whether this is the zero entry.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.desc.is_none() && self.value.is_none() && self.raw.is_none()
    }

    /// Gets the [`EntryState`] of this entry.
    #[must_use]
    pub const fn state(&self) -> EntryState {
        match (&self.value, &self.raw) {
            (Some(_), Some(_)) => EntryState::Cached,
            (Some(_), None) => EntryState::Fresh,
            (None, Some(_)) => EntryState::Unparsed,
            (None, None) if self.desc.is_some() => EntryState::Described,
            (None, None) => EntryState::Empty,
        }
    }
}
