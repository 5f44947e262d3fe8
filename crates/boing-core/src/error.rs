use crate::kind::PrimitiveKind;
use std::fmt;
use thiserror::Error;

/// Failure to pick a single candidate for an argument list
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("no candidate accepts ({})", .arg_types.join(", "))]
    NoMatch { arg_types: Vec<String> },

    #[error("candidates tie at score {score}: {}", .candidates.join(" | "))]
    Ambiguous { candidates: Vec<String>, score: u32 },
}

/// Failure while executing a selected constructor, setter or hook
#[derive(Debug, Error)]
pub enum InvocationError {
    #[error("null supplied for primitive `{kind}` at argument {position}")]
    NullToPrimitive { position: usize, kind: PrimitiveKind },

    #[error("argument {position}: expected {expected}, found {found}")]
    Conversion {
        position: usize,
        expected: String,
        found: String,
    },

    #[error("expected {expected} argument(s), got {found}")]
    Arity { expected: usize, found: usize },

    #[error("target is not a `{expected}`")]
    TargetMismatch { expected: String },

    #[error("{0}")]
    Raised(#[source] anyhow::Error),
}

impl InvocationError {
    /// Wrap an error returned by user code, keeping engine errors intact
    pub fn raised(error: anyhow::Error) -> Self {
        match error.downcast::<InvocationError>() {
            Ok(inner) => inner,
            Err(error) => InvocationError::Raised(error),
        }
    }
}

/// Errors that abort an assembly request
#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("bean `{definition}`: no {member} of `{type_name}` accepts ({})", .arg_types.join(", "))]
    NoMatch {
        definition: String,
        type_name: String,
        member: String,
        arg_types: Vec<String>,
    },

    #[error("bean `{definition}`: ambiguous {member} of `{type_name}`: {}", .candidates.join(" | "))]
    Ambiguous {
        definition: String,
        type_name: String,
        member: String,
        candidates: Vec<String>,
    },

    #[error("bean `{definition}`: {member} failed: {source}")]
    Invocation {
        definition: String,
        member: String,
        source: InvocationError,
    },

    #[error("reference cycle: {}", .path.join(" -> "))]
    Cycle { path: Vec<String> },

    #[error("bean `{0}` was referenced before it was constructed")]
    NotConstructed(String),

    #[error("unknown bean definition `{0}`")]
    UnknownDefinition(String),

    #[error("bean `{definition}` names unregistered type `{type_name}`")]
    UnknownType {
        definition: String,
        type_name: String,
    },

    #[error("bean `{definition}`: type `{type_name}` has no setter for property `{property}`")]
    UnknownProperty {
        definition: String,
        type_name: String,
        property: String,
    },

    #[error("bean definition `{0}` registered twice")]
    DuplicateDefinition(String),

    #[error("container has been torn down")]
    ContainerClosed,

    #[error("invalid definitions: {0}")]
    Config(#[from] ConfigError),
}

impl AssemblyError {
    /// Attach bean context to a resolver failure
    pub fn resolution(error: ResolveError, definition: &str, type_name: &str, member: &str) -> Self {
        match error {
            ResolveError::NoMatch { arg_types } => AssemblyError::NoMatch {
                definition: definition.to_string(),
                type_name: type_name.to_string(),
                member: member.to_string(),
                arg_types,
            },
            ResolveError::Ambiguous { candidates, .. } => AssemblyError::Ambiguous {
                definition: definition.to_string(),
                type_name: type_name.to_string(),
                member: member.to_string(),
                candidates,
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, AssemblyError>;

/// Which lifecycle hook ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
    Init,
    Destroy,
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookKind::Init => f.write_str("init"),
            HookKind::Destroy => f.write_str("destroy"),
        }
    }
}

/// A lifecycle hook that reported an error
#[derive(Debug, Error)]
#[error("bean `{definition}`: {hook} hook failed: {error}")]
pub struct HookFailure {
    pub definition: String,
    pub hook: HookKind,
    #[source]
    pub error: anyhow::Error,
}

#[derive(Debug, Error)]
pub enum TeardownError {
    #[error("teardown already ran for this container")]
    AlreadyTornDown,

    #[error("{} destroy hook(s) failed", .failures.len())]
    HookFailures { failures: Vec<HookFailure> },
}

/// Errors loading configuration or definition documents
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("bean `{bean}`: {reason}")]
    InvalidArgument { bean: String, reason: String },
}
