use crate::bean::{Bean, BeanRef};
use crate::registry::TypeDescriptor;
use std::sync::Arc;

/// A live object plus the bookkeeping needed to tear it down
#[derive(Debug, Clone)]
pub struct AssembledInstance {
    definition_id: Arc<str>,
    object: BeanRef,
    sequence: u64,
    descriptor: Arc<TypeDescriptor>,
}

impl AssembledInstance {
    pub(crate) fn new(
        definition_id: Arc<str>,
        object: BeanRef,
        sequence: u64,
        descriptor: Arc<TypeDescriptor>,
    ) -> Self {
        AssembledInstance {
            definition_id,
            object,
            sequence,
            descriptor,
        }
    }

    pub fn definition_id(&self) -> &str {
        &self.definition_id
    }

    pub fn type_name(&self) -> &str {
        self.descriptor.name()
    }

    /// Shared handle to the object
    pub fn object(&self) -> &BeanRef {
        &self.object
    }

    /// Position in the container's construction order
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub(crate) fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    /// Borrow the object as `T`
    pub fn with<T: Bean, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.object.with(f)
    }
}

impl std::fmt::Display for AssembledInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.object, f)
    }
}
