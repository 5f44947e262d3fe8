use crate::kind::{CanonicalKind, PrimitiveKind};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SlotKind {
    Primitive(PrimitiveKind),
    Reference(String),
}

/// A declared parameter type in a constructor or setter signature
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeSlot {
    kind: SlotKind,
    nullable: bool,
}

impl TypeSlot {
    /// Unboxed primitive slot; rejects null at invocation
    pub fn primitive(kind: PrimitiveKind) -> Self {
        TypeSlot {
            kind: SlotKind::Primitive(kind),
            nullable: false,
        }
    }

    /// Boxed wrapper slot (`Integer`, ...); accepts null
    pub fn boxed(kind: PrimitiveKind) -> Self {
        TypeSlot {
            kind: SlotKind::Primitive(kind),
            nullable: true,
        }
    }

    /// Reference slot. Boxed wrapper names become boxed primitive slots.
    pub fn reference(name: impl Into<String>) -> Self {
        let name = name.into();
        match PrimitiveKind::from_boxed_name(&name) {
            Some(kind) => TypeSlot::boxed(kind),
            None => TypeSlot {
                kind: SlotKind::Reference(name),
                nullable: true,
            },
        }
    }

    pub fn kind(&self) -> &SlotKind {
        &self.kind
    }

    pub fn nullable(&self) -> bool {
        self.nullable
    }

    pub fn canonical(&self) -> CanonicalKind {
        match &self.kind {
            SlotKind::Primitive(kind) => CanonicalKind::Primitive(*kind),
            SlotKind::Reference(name) => CanonicalKind::Reference(name.clone()),
        }
    }

    /// Boxed wrapper name for primitive slots
    pub fn boxed_equivalent(&self) -> Option<&'static str> {
        match self.kind {
            SlotKind::Primitive(kind) => Some(kind.boxed_name()),
            SlotKind::Reference(_) => None,
        }
    }
}

impl From<PrimitiveKind> for TypeSlot {
    fn from(kind: PrimitiveKind) -> Self {
        TypeSlot::primitive(kind)
    }
}

impl From<&str> for TypeSlot {
    fn from(name: &str) -> Self {
        TypeSlot::reference(name)
    }
}

impl fmt::Display for TypeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.kind, self.nullable) {
            (SlotKind::Primitive(kind), false) => f.write_str(kind.name()),
            (SlotKind::Primitive(kind), true) => f.write_str(kind.boxed_name()),
            (SlotKind::Reference(name), _) => f.write_str(name),
        }
    }
}

pub(crate) fn join_slots(slots: &[TypeSlot]) -> String {
    slots
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
