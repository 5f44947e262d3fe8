//! Primitive kinds and the boxed/unboxed normalization table.
//!
//! Runtime values arrive either as bare primitives or in their boxed form.
//! Overload resolution only cares about the canonical kind, so both forms
//! collapse to the same [`CanonicalKind`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of primitive kinds a slot or value can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Char,
    Boolean,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 8] = [
        PrimitiveKind::Byte,
        PrimitiveKind::Short,
        PrimitiveKind::Int,
        PrimitiveKind::Long,
        PrimitiveKind::Float,
        PrimitiveKind::Double,
        PrimitiveKind::Char,
        PrimitiveKind::Boolean,
    ];

    /// Name of the unboxed kind (`int`, `char`, ...)
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Boolean => "boolean",
        }
    }

    /// Name of the boxed wrapper type (`Integer`, `Character`, ...)
    pub fn boxed_name(self) -> &'static str {
        match self {
            PrimitiveKind::Byte => "Byte",
            PrimitiveKind::Short => "Short",
            PrimitiveKind::Int => "Integer",
            PrimitiveKind::Long => "Long",
            PrimitiveKind::Float => "Float",
            PrimitiveKind::Double => "Double",
            PrimitiveKind::Char => "Character",
            PrimitiveKind::Boolean => "Boolean",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn from_boxed_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.boxed_name() == name)
    }

    pub fn is_numeric(self) -> bool {
        !matches!(self, PrimitiveKind::Boolean | PrimitiveKind::Char)
    }

    /// Widening primitive conversions: a value of `self` may be passed where
    /// `target` is declared without losing its magnitude.
    pub fn widens_to(self, target: PrimitiveKind) -> bool {
        use PrimitiveKind::*;

        matches!(
            (self, target),
            (Byte, Short | Int | Long | Float | Double)
                | (Short, Int | Long | Float | Double)
                | (Char, Int | Long | Float | Double)
                | (Int, Long | Float | Double)
                | (Long, Float | Double)
                | (Float, Double)
        )
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Observed runtime type of a supplied value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RuntimeType {
    Primitive(PrimitiveKind),
    Boxed(PrimitiveKind),
    Reference(String),
    Null,
}

impl RuntimeType {
    pub fn reference(name: impl Into<String>) -> Self {
        RuntimeType::Reference(name.into())
    }

    /// Name of the reference type a value of this runtime type is seen as
    /// once boxed. `None` for the null marker.
    pub fn reference_name(&self) -> Option<&str> {
        match self {
            RuntimeType::Primitive(kind) | RuntimeType::Boxed(kind) => Some(kind.boxed_name()),
            RuntimeType::Reference(name) => Some(name),
            RuntimeType::Null => None,
        }
    }
}

impl fmt::Display for RuntimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeType::Primitive(kind) => f.write_str(kind.name()),
            RuntimeType::Boxed(kind) => f.write_str(kind.boxed_name()),
            RuntimeType::Reference(name) => f.write_str(name),
            RuntimeType::Null => f.write_str("null"),
        }
    }
}

/// Kind used for matching once boxing has been erased
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CanonicalKind {
    Primitive(PrimitiveKind),
    Reference(String),
    Null,
}

/// Map a runtime type to its canonical kind.
///
/// Boxed wrappers, including a reference spelled with a boxed name, collapse
/// to their primitive kind. Everything else is returned unchanged.
pub fn normalize(runtime: &RuntimeType) -> CanonicalKind {
    match runtime {
        RuntimeType::Primitive(kind) | RuntimeType::Boxed(kind) => CanonicalKind::Primitive(*kind),
        RuntimeType::Reference(name) => match PrimitiveKind::from_boxed_name(name) {
            Some(kind) => CanonicalKind::Primitive(kind),
            None => CanonicalKind::Reference(name.clone()),
        },
        RuntimeType::Null => CanonicalKind::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boxed_mapping_is_bijective() {
        for kind in PrimitiveKind::ALL {
            assert_eq!(PrimitiveKind::from_boxed_name(kind.boxed_name()), Some(kind));
            assert_eq!(PrimitiveKind::from_name(kind.name()), Some(kind));
        }

        let mut boxed: Vec<_> = PrimitiveKind::ALL.iter().map(|k| k.boxed_name()).collect();
        boxed.sort_unstable();
        boxed.dedup();
        assert_eq!(boxed.len(), PrimitiveKind::ALL.len());
    }

    #[test]
    fn test_normalize_boxed_and_unboxed_agree() {
        for kind in PrimitiveKind::ALL {
            let unboxed = normalize(&RuntimeType::Primitive(kind));
            assert_eq!(unboxed, normalize(&RuntimeType::Boxed(kind)));
            assert_eq!(unboxed, normalize(&RuntimeType::reference(kind.boxed_name())));
        }
    }

    #[test]
    fn test_normalize_identity_fallback() {
        assert_eq!(
            normalize(&RuntimeType::reference("SimpleClass")),
            CanonicalKind::Reference("SimpleClass".to_string())
        );
        assert_eq!(normalize(&RuntimeType::Null), CanonicalKind::Null);
        // lowercase names are not boxed names
        assert_eq!(
            normalize(&RuntimeType::reference("int")),
            CanonicalKind::Reference("int".to_string())
        );
    }

    #[test]
    fn test_widening_table() {
        use PrimitiveKind::*;

        assert!(Byte.widens_to(Int));
        assert!(Char.widens_to(Int));
        assert!(Float.widens_to(Double));
        assert!(!Int.widens_to(Short));
        assert!(!Byte.widens_to(Char));
        assert!(!Boolean.widens_to(Int));
        assert!(!Int.widens_to(Int));
    }
}
