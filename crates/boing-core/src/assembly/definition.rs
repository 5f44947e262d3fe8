use crate::value::{TypedValue, Value};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// How many instances a definition yields
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// One instance per container, cached by definition id
    #[default]
    Singleton,
    /// A fresh instance per request and per referencing definition
    #[serde(alias = "prototype")]
    Transient,
}

/// One constructor argument or property value of a definition
#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentValue {
    /// A value plus the runtime type it is supplied as
    Literal(TypedValue),
    /// Another definition. `shared` asks for one transient instance per
    /// request instead of a fresh one per reference; it has no effect on
    /// singletons.
    Ref { id: String, shared: bool },
    Null,
}

impl ArgumentValue {
    pub fn byte(v: i8) -> Self {
        Self::literal(Value::Byte(v))
    }

    pub fn short(v: i16) -> Self {
        Self::literal(Value::Short(v))
    }

    pub fn int(v: i32) -> Self {
        Self::literal(Value::Int(v))
    }

    pub fn long(v: i64) -> Self {
        Self::literal(Value::Long(v))
    }

    pub fn float(v: f32) -> Self {
        Self::literal(Value::Float(v))
    }

    pub fn double(v: f64) -> Self {
        Self::literal(Value::Double(v))
    }

    pub fn char(v: char) -> Self {
        Self::literal(Value::Char(v))
    }

    pub fn boolean(v: bool) -> Self {
        Self::literal(Value::Boolean(v))
    }

    pub fn string(v: impl Into<String>) -> Self {
        Self::literal(Value::Str(v.into()))
    }

    /// Unboxed primitive or plain reference value
    pub fn literal(value: Value) -> Self {
        ArgumentValue::Literal(TypedValue::new(value))
    }

    /// Primitive supplied in its boxed form, e.g. `Integer`
    pub fn boxed(value: Value) -> Self {
        ArgumentValue::Literal(TypedValue::boxed(value))
    }

    /// Value supplied as a named reference type
    pub fn typed(value: Value, type_name: impl Into<String>) -> Self {
        ArgumentValue::Literal(TypedValue::with_type(value, type_name))
    }

    pub fn list(items: Vec<Value>) -> Self {
        Self::literal(Value::List(items))
    }

    pub fn map(entries: IndexMap<String, Value>) -> Self {
        Self::literal(Value::Map(entries))
    }

    pub fn reference(id: impl Into<String>) -> Self {
        ArgumentValue::Ref {
            id: id.into(),
            shared: false,
        }
    }

    pub fn shared_reference(id: impl Into<String>) -> Self {
        ArgumentValue::Ref {
            id: id.into(),
            shared: true,
        }
    }

    pub fn null() -> Self {
        ArgumentValue::Null
    }

    /// Id of the referenced definition, if any
    pub fn reference_id(&self) -> Option<&str> {
        match self {
            ArgumentValue::Ref { id, .. } => Some(id),
            _ => None,
        }
    }
}

/// Declarative description of an object to assemble
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    pub id: String,
    pub type_name: String,
    pub constructor_args: Vec<ArgumentValue>,
    pub properties: IndexMap<String, ArgumentValue>,
    pub scope: Scope,
}

impl Definition {
    pub fn new(id: impl Into<String>, type_name: impl Into<String>, scope: Scope) -> Self {
        Definition {
            id: id.into(),
            type_name: type_name.into(),
            constructor_args: Vec::new(),
            properties: IndexMap::new(),
            scope,
        }
    }

    pub fn singleton(id: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::new(id, type_name, Scope::Singleton)
    }

    pub fn transient(id: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::new(id, type_name, Scope::Transient)
    }

    /// Append a constructor argument
    pub fn arg(mut self, value: ArgumentValue) -> Self {
        self.constructor_args.push(value);
        self
    }

    /// Set a property; a repeated name replaces the earlier value in place
    pub fn property(mut self, name: impl Into<String>, value: ArgumentValue) -> Self {
        self.properties.insert(name.into(), value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::{PrimitiveKind, RuntimeType};

    #[test]
    fn test_builder_keeps_order() {
        let def = Definition::singleton("simple1", "SimpleClass")
            .arg(ArgumentValue::byte(1))
            .arg(ArgumentValue::short(2))
            .property("stringVal", ArgumentValue::string("x"))
            .property("intVal", ArgumentValue::int(3))
            .property("stringVal", ArgumentValue::null());

        assert_eq!(def.constructor_args.len(), 2);
        let names: Vec<_> = def.properties.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["stringVal", "intVal"]);
        assert_eq!(def.properties["stringVal"], ArgumentValue::Null);
    }

    #[test]
    fn test_literal_runtime_types() {
        let ArgumentValue::Literal(unboxed) = ArgumentValue::int(7) else {
            panic!("expected literal");
        };
        assert_eq!(unboxed.runtime, RuntimeType::Primitive(PrimitiveKind::Int));

        let ArgumentValue::Literal(boxed) = ArgumentValue::boxed(Value::Int(7)) else {
            panic!("expected literal");
        };
        assert_eq!(boxed.runtime, RuntimeType::Boxed(PrimitiveKind::Int));
    }

    #[test]
    fn test_scope_names() {
        assert_eq!(serde_json::to_string(&Scope::Transient).unwrap(), "\"transient\"");
        let scope: Scope = serde_json::from_str("\"prototype\"").unwrap();
        assert_eq!(scope, Scope::Transient);
        assert_eq!(Scope::default(), Scope::Singleton);
    }
}
