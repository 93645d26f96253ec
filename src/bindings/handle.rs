//! Host handles
//!
//! A [`HostHandle`] is the single opaque value handed to embedding code. It
//! always carries a [`TypeTag`] so that `unwrap` can check it against the
//! expected binding.

use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

use crate::core::{BindingError, BindingResult};
use crate::registry::{NativeTypeId, TypeBinding};

/// Binding name plus the resolved native type id
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeTag {
    name: Arc<str>,
    type_id: NativeTypeId,
}

impl TypeTag {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_id(&self) -> NativeTypeId {
        self.type_id
    }

    fn matches(&self, binding: &TypeBinding, type_id: NativeTypeId) -> bool {
        &*self.name == binding.name() && self.type_id == type_id
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.type_id)
    }
}

#[derive(Clone)]
pub struct HostHandle {
    tag: TypeTag,
    payload: Arc<dyn Any + Send + Sync>,
}

impl HostHandle {
    pub fn tag(&self) -> &TypeTag {
        &self.tag
    }

    pub fn type_name(&self) -> &str {
        self.tag.name()
    }

    /// Whether two handles share the same payload allocation.
    pub fn ptr_eq(&self, other: &HostHandle) -> bool {
        Arc::ptr_eq(&self.payload, &other.payload)
    }
}

impl fmt::Debug for HostHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostHandle").field("tag", &self.tag).finish_non_exhaustive()
    }
}

impl TypeBinding {
    /// Wraps a native value of this binding's type.
    ///
    /// Resolves the binding first if needed.
    pub fn wrap<T>(&self, value: T) -> BindingResult<HostHandle>
    where
        T: Any + Send + Sync,
    {
        let type_id = self.resolve()?;
        Ok(HostHandle {
            tag: TypeTag {
                name: Arc::from(self.name()),
                type_id,
            },
            payload: Arc::new(value),
        })
    }

    fn check(&self, handle: &HostHandle) -> BindingResult<()> {
        let type_id = self.resolve()?;
        if handle.tag.matches(self, type_id) {
            Ok(())
        } else {
            Err(BindingError::TypeMismatch {
                expected: self.name().to_string(),
                actual: handle.tag.name().to_string(),
            })
        }
    }

    /// Shared access to the wrapped value.
    pub fn unwrap_shared<T>(&self, handle: &HostHandle) -> BindingResult<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        self.check(handle)?;
        Arc::clone(&handle.payload)
            .downcast::<T>()
            .map_err(|_| self.payload_mismatch::<T>(handle))
    }

    /// Inverse of [`TypeBinding::wrap`].
    pub fn unwrap<T>(&self, handle: &HostHandle) -> BindingResult<T>
    where
        T: Any + Clone,
    {
        self.check(handle)?;
        handle
            .payload
            .downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| self.payload_mismatch::<T>(handle))
    }

    fn payload_mismatch<T>(&self, handle: &HostHandle) -> BindingError {
        BindingError::TypeMismatch {
            expected: format!("{} as {}", self.name(), type_name::<T>()),
            actual: handle.tag.name().to_string(),
        }
    }
}

/// Converts a native value into a host handle tagged with `binding`.
pub fn wrap<T>(value: T, binding: &TypeBinding) -> BindingResult<HostHandle>
where
    T: Any + Send + Sync,
{
    binding.wrap(value)
}

/// Converts a host handle back into the native value, checking its tag.
pub fn unwrap<T>(handle: &HostHandle, binding: &TypeBinding) -> BindingResult<T>
where
    T: Any + Clone,
{
    binding.unwrap(handle)
}
