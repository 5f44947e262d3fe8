//! Object graph assembly
//!
//! [`GraphAssembler`] turns registered [`Definition`]s into wired objects:
//!
//! 1. plan every instance a request needs (singletons once, transients per
//!    reference unless shared)
//! 2. construct in constructor-dependency order, rejecting constructor cycles
//! 3. inject properties, which may reference each other freely
//! 4. run `init` hooks through the [`LifecycleManager`]
//!
//! Teardown runs `destroy` hooks in reverse construction order.

mod assembler;
mod definition;
mod instance;
mod lifecycle;

pub use assembler::GraphAssembler;
pub use definition::{ArgumentValue, Definition, Scope};
pub use instance::AssembledInstance;
pub use lifecycle::LifecycleManager;
