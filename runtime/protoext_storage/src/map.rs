//! Contains the definition of [`ExtensionMap`], the unsynchronized extension
//! field store.

use std::collections::HashMap;

use protoext_descriptor::{Extension, FieldNumber};

use crate::{ExtensionFields, ExtensionLock, Visitor};

/// A mapping from field numbers to extension entries without any internal
/// synchronization.
///
/// The backing map is allocated on the first write. Concurrent writes must be
/// serialized by the caller; [`ExtensionFields::lock`] on this store returns
/// [`ExtensionLock::Inert`] and provides no exclusion at all.
#[derive(Debug, Clone, Default)]
pub struct ExtensionMap {
    entries: Option<HashMap<FieldNumber, Extension>>,
}

impl ExtensionMap {
    /// Creates an empty, unallocated [`ExtensionMap`].
    #[must_use]
    pub const fn new() -> Self { Self { entries: None } }

    /// Returns an iterator over the populated entries in an unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (FieldNumber, &Extension)> {
        self.entries
            .iter()
            .flat_map(|entries| entries.iter().map(|(k, v)| (*k, v)))
    }

    /// Removes all the entries. The backing map stays allocated.
    pub fn reset(&mut self) {
        if let Some(entries) = &mut self.entries {
            entries.clear();
        }
    }

    fn entries_mut(&mut self) -> &mut HashMap<FieldNumber, Extension> {
        self.entries.get_or_insert_with(HashMap::new)
    }
}

impl ExtensionFields for ExtensionMap {
    fn len(&self) -> usize { self.entries.as_ref().map_or(0, HashMap::len) }

    fn has(&self, number: FieldNumber) -> bool {
        self.entries.as_ref().is_some_and(|x| x.contains_key(&number))
    }

    fn get(&self, number: FieldNumber) -> Extension {
        self.entries
            .as_ref()
            .and_then(|x| x.get(&number))
            .cloned()
            .unwrap_or_default()
    }

    fn set(&mut self, number: FieldNumber, extension: Extension) {
        self.entries_mut().insert(number, extension);
    }

    fn clear(&mut self, number: FieldNumber) {
        if let Some(entries) = &mut self.entries {
            entries.remove(&number);
        }
    }

    fn range(&self, visit: &mut Visitor<'_>) {
        for (number, extension) in self.iter() {
            if visit(number, extension).is_break() {
                return;
            }
        }
    }

    fn has_init(&self) -> bool { self.entries.is_some() }

    fn lock(&self) -> ExtensionLock<'_> { ExtensionLock::Inert }
}

impl FromIterator<(FieldNumber, Extension)> for ExtensionMap {
    fn from_iter<T: IntoIterator<Item = (FieldNumber, Extension)>>(
        iter: T,
    ) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl Extend<(FieldNumber, Extension)> for ExtensionMap {
    fn extend<T: IntoIterator<Item = (FieldNumber, Extension)>>(
        &mut self,
        iter: T,
    ) {
        let mut iter = iter.into_iter().peekable();

        // an empty extension is not a write
        if iter.peek().is_none() {
            return;
        }

        self.entries_mut().extend(iter);
    }
}

#[cfg(test)]
mod test;
