//! Binds the extension storage field of a message instance to the
//! [`ExtensionFields`] interface.

use std::any::{type_name, Any};

use crate::{
    ExtensionFields, ExtensionMap, ExtensionStorage, InternalExtensions,
};

/// The error returned by [`try_extension_fields_of`] when the given handle is
/// none of the recognized storage types.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error,
)]
#[error("invalid extension fields type: {type_name}")]
pub struct InvalidHandleError {
    /// The name of the rejected type.
    pub type_name: &'static str,
}

/// Binds the given extension storage field to the [`ExtensionFields`]
/// interface.
///
/// The recognized storage types are [`ExtensionMap`], [`InternalExtensions`]
/// and [`ExtensionStorage`].
///
/// # Errors
///
/// Returns [`InvalidHandleError`] if `handle` is of any other type.
pub fn try_extension_fields_of<T: Any>(
    handle: &mut T,
) -> Result<&mut dyn ExtensionFields, InvalidHandleError> {
    let handle: &mut dyn Any = handle;

    if handle.is::<ExtensionMap>() {
        if let Some(map) = handle.downcast_mut::<ExtensionMap>() {
            return Ok(map);
        }
    } else if handle.is::<InternalExtensions>() {
        if let Some(extensions) =
            handle.downcast_mut::<InternalExtensions>()
        {
            return Ok(&mut **extensions);
        }
    } else if let Some(storage) = handle.downcast_mut::<ExtensionStorage>() {
        return Ok(storage);
    }

    Err(InvalidHandleError { type_name: type_name::<T>() })
}

/// Binds the given extension storage field to the [`ExtensionFields`]
/// interface.
///
/// This is the construction path used by generated message code, where the
/// storage type is fixed at the definition of the message type.
///
/// # Panics
///
/// Panics if `handle` is none of the storage types recognized by
/// [`try_extension_fields_of`]. This indicates a mismatch between the
/// generated code and this crate and is not meant to be recovered from.
#[track_caller]
pub fn extension_fields_of<T: Any>(handle: &mut T) -> &mut dyn ExtensionFields {
    match try_extension_fields_of(handle) {
        Ok(fields) => fields,
        Err(error) => {
            log::error!("{error}");
            panic!("{error}")
        }
    }
}
