//! Boing: overload-resolving object assembly.
//!
//! Types are described once in a [`TypeRegistry`] (constructor overloads,
//! per-property setter overloads, lifecycle hooks). [`Definition`]s name a
//! type plus typed argument values; the [`Container`] resolves the best
//! overload for each, builds the object graph and runs `init`/`destroy` hooks.

pub mod assembly;
pub mod bean;
pub mod config;
pub mod di;
pub mod document;
pub mod error;
pub mod kind;
pub mod registry;
pub mod resolver;
pub mod value;

pub use assembly::{
    ArgumentValue, AssembledInstance, Definition, GraphAssembler, LifecycleManager, Scope,
};
pub use bean::{Bean, BeanRef, Disposable, Initializable};
pub use config::{AmbiguityPolicy, ContainerConfig, ResolutionPolicy};
pub use di::{Assembly, Container};
pub use document::DefinitionDocument;
pub use error::{
    AssemblyError, ConfigError, HookFailure, HookKind, InvocationError, ResolveError, Result,
    TeardownError,
};
pub use kind::{normalize, CanonicalKind, PrimitiveKind, RuntimeType};
pub use registry::{TypeDescriptor, TypeRegistry, TypeSlot};
pub use resolver::{Args, Conversion, Invoker, OverloadResolver, Resolution};
pub use value::{TypedValue, Value};
