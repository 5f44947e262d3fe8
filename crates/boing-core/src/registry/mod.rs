//! Type registry: the candidate tables the resolver works from
//!
//! Each assemblable type is described once by a [`TypeDescriptor`] listing its
//! constructor overloads, per-property setter overloads and lifecycle hooks.
//! The registry also owns the reference hierarchy used for assignability.

mod descriptor;
mod slot;
mod type_compat;

pub use descriptor::{Candidate, ConstructorFn, HookFn, SetterFn, TypeBuilder, TypeDescriptor};
pub use slot::{SlotKind, TypeSlot};
pub use type_compat::{TypeCompatibility, OBJECT};

use indexmap::IndexMap;
use std::sync::Arc;
use tracing::debug;

/// All types known to a container
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: IndexMap<String, Arc<TypeDescriptor>>,
    compat: TypeCompatibility,
}

impl TypeRegistry {
    /// Registry with the builtin reference hierarchy and no bean types
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a bean type, replacing any earlier descriptor of the same name
    pub fn register(&mut self, descriptor: TypeDescriptor) -> Arc<TypeDescriptor> {
        let descriptor = Arc::new(descriptor);
        self.compat.declare(
            descriptor.name(),
            descriptor.supertypes().iter().map(String::as_str),
        );
        debug!(
            "Registered type {} ({} constructors)",
            descriptor.name(),
            descriptor.constructors().len()
        );
        self.types
            .insert(descriptor.name().to_string(), descriptor.clone());
        descriptor
    }

    /// Declare a reference type that is not itself assembled, e.g. an
    /// interface bean types implement
    pub fn declare_reference_type<I, S>(&mut self, name: &str, supertypes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.compat.declare(name, supertypes);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<TypeDescriptor>> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn is_assignable(&self, source: &str, target: &str) -> bool {
        self.compat.is_assignable(source, target)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
