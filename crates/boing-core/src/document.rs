//! JSON definition documents
//!
//! ```json
//! {
//!   "beans": [
//!     { "id": "simple1", "type": "SimpleClass",
//!       "constructorArgs": [ { "type": "byte", "value": 1 }, 2 ] },
//!     { "id": "complex1", "type": "ComplexClass", "scope": "transient",
//!       "properties": { "simpleBeanOne": { "ref": "simple1" } } }
//!   ]
//! }
//! ```

use crate::assembly::{ArgumentValue, Definition, Scope};
use crate::error::ConfigError;
use crate::kind::PrimitiveKind;
use crate::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefinitionDocument {
    #[serde(default)]
    pub beans: Vec<BeanEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeanEntry {
    pub id: String,

    #[serde(rename = "type")]
    pub type_name: String,

    /// Falls back to the container's default scope
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constructor_args: Vec<ArgumentEntry>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, ArgumentEntry>,
}

/// One argument as written in a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgumentEntry {
    Reference {
        #[serde(rename = "ref")]
        id: String,
        #[serde(default)]
        shared: bool,
    },
    Null {
        null: bool,
    },
    List {
        #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
        type_name: Option<String>,
        list: Vec<ArgumentEntry>,
    },
    Map {
        #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
        type_name: Option<String>,
        map: IndexMap<String, ArgumentEntry>,
    },
    Typed {
        #[serde(rename = "type")]
        type_name: String,
        value: Json,
    },
    /// Bare JSON scalar; its runtime type is inferred
    Scalar(Json),
}

impl DefinitionDocument {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Convert every bean to a [`Definition`], applying `default_scope` where
    /// a bean names none
    pub fn into_definitions(self, default_scope: Scope) -> Result<Vec<Definition>, ConfigError> {
        self.beans
            .into_iter()
            .map(|bean| bean.into_definition(default_scope))
            .collect()
    }
}

impl BeanEntry {
    pub fn into_definition(self, default_scope: Scope) -> Result<Definition, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidArgument {
            bean: self.id.clone(),
            reason,
        };

        let mut definition = Definition::new(
            self.id.clone(),
            self.type_name.clone(),
            self.scope.unwrap_or(default_scope),
        );

        for (position, entry) in self.constructor_args.iter().enumerate() {
            let value = entry.to_argument().map_err(|reason| {
                invalid(format!("constructor argument {}: {}", position, reason))
            })?;
            definition = definition.arg(value);
        }

        for (name, entry) in &self.properties {
            let value = entry
                .to_argument()
                .map_err(|reason| invalid(format!("property `{}`: {}", name, reason)))?;
            definition = definition.property(name.clone(), value);
        }

        Ok(definition)
    }
}

impl ArgumentEntry {
    pub fn to_argument(&self) -> Result<ArgumentValue, String> {
        match self {
            ArgumentEntry::Reference { id, shared: false } => {
                Ok(ArgumentValue::reference(id.clone()))
            }
            ArgumentEntry::Reference { id, shared: true } => {
                Ok(ArgumentValue::shared_reference(id.clone()))
            }
            ArgumentEntry::Null { null: true } => Ok(ArgumentValue::Null),
            ArgumentEntry::Null { null: false } => Err("`null` must be true".to_string()),
            ArgumentEntry::List { type_name, .. } | ArgumentEntry::Map { type_name, .. } => {
                let value = self.to_value()?;
                Ok(match type_name {
                    Some(name) => ArgumentValue::typed(value, name.clone()),
                    None => ArgumentValue::literal(value),
                })
            }
            ArgumentEntry::Typed { type_name, value } => typed_argument(type_name, value),
            ArgumentEntry::Scalar(Json::Null) => Ok(ArgumentValue::Null),
            ArgumentEntry::Scalar(json) => scalar_value(json).map(ArgumentValue::literal),
        }
    }

    /// Plain value, as used for collection elements
    fn to_value(&self) -> Result<Value, String> {
        match self {
            ArgumentEntry::Reference { id, .. } => Err(format!(
                "reference to `{}` is not allowed inside a collection",
                id
            )),
            ArgumentEntry::Null { .. } | ArgumentEntry::Scalar(Json::Null) => Ok(Value::Null),
            ArgumentEntry::List { list, .. } => list
                .iter()
                .map(ArgumentEntry::to_value)
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            ArgumentEntry::Map { map, .. } => map
                .iter()
                .map(|(k, v)| Ok((k.clone(), v.to_value()?)))
                .collect::<Result<IndexMap<_, _>, String>>()
                .map(Value::Map),
            ArgumentEntry::Typed { type_name, value } => match typed_argument(type_name, value)? {
                ArgumentValue::Literal(typed) => Ok(typed.value),
                _ => Ok(Value::Null),
            },
            ArgumentEntry::Scalar(json) => scalar_value(json),
        }
    }
}

fn typed_argument(type_name: &str, json: &Json) -> Result<ArgumentValue, String> {
    if let Some(kind) = PrimitiveKind::from_name(type_name) {
        return primitive_value(kind, json).map(ArgumentValue::literal);
    }
    if let Some(kind) = PrimitiveKind::from_boxed_name(type_name) {
        if json.is_null() {
            return Ok(ArgumentValue::Null);
        }
        return primitive_value(kind, json).map(ArgumentValue::boxed);
    }

    match (type_name, json) {
        (_, Json::Null) => Ok(ArgumentValue::Null),
        ("String", Json::String(s)) => Ok(ArgumentValue::string(s.clone())),
        ("String", other) => Err(format!("expected a string, found {}", other)),
        (name, other) => Ok(ArgumentValue::typed(scalar_value(other)?, name)),
    }
}

fn scalar_value(json: &Json) -> Result<Value, String> {
    match json {
        Json::String(s) => Ok(Value::Str(s.clone())),
        Json::Bool(b) => Ok(Value::Boolean(*b)),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i32::try_from(i).map(Value::Int).unwrap_or(Value::Long(i)))
            } else if n.is_f64() {
                n.as_f64().map(Value::Double).ok_or_else(|| format!("invalid number {}", n))
            } else {
                Err(format!("{} does not fit in a long", n))
            }
        }
        Json::Null => Ok(Value::Null),
        other => Err(format!("unsupported argument {}", other)),
    }
}

fn primitive_value(kind: PrimitiveKind, json: &Json) -> Result<Value, String> {
    let out_of_range = || format!("{} is not a valid {}", json, kind);

    match kind {
        PrimitiveKind::Byte => json
            .as_i64()
            .and_then(|i| i8::try_from(i).ok())
            .map(Value::Byte)
            .ok_or_else(out_of_range),
        PrimitiveKind::Short => json
            .as_i64()
            .and_then(|i| i16::try_from(i).ok())
            .map(Value::Short)
            .ok_or_else(out_of_range),
        PrimitiveKind::Int => json
            .as_i64()
            .and_then(|i| i32::try_from(i).ok())
            .map(Value::Int)
            .ok_or_else(out_of_range),
        PrimitiveKind::Long => json.as_i64().map(Value::Long).ok_or_else(out_of_range),
        PrimitiveKind::Float => json
            .as_f64()
            .map(|f| Value::Float(f as f32))
            .ok_or_else(out_of_range),
        PrimitiveKind::Double => json.as_f64().map(Value::Double).ok_or_else(out_of_range),
        PrimitiveKind::Char => {
            let mut chars = json.as_str().map(str::chars).ok_or_else(out_of_range)?;
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Value::Char(c)),
                _ => Err(out_of_range()),
            }
        }
        PrimitiveKind::Boolean => json.as_bool().map(Value::Boolean).ok_or_else(out_of_range),
    }
}
