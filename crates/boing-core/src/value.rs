use crate::bean::BeanRef;
use crate::kind::{PrimitiveKind, RuntimeType};
use indexmap::IndexMap;
use std::fmt;

/// A runtime value handed to a constructor or setter
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Char(char),
    Boolean(bool),
    Str(String),
    List(Vec<Value>),
    Map(IndexMap<String, Value>),
    Bean(BeanRef),
}

impl Value {
    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        match self {
            Value::Byte(_) => Some(PrimitiveKind::Byte),
            Value::Short(_) => Some(PrimitiveKind::Short),
            Value::Int(_) => Some(PrimitiveKind::Int),
            Value::Long(_) => Some(PrimitiveKind::Long),
            Value::Float(_) => Some(PrimitiveKind::Float),
            Value::Double(_) => Some(PrimitiveKind::Double),
            Value::Char(_) => Some(PrimitiveKind::Char),
            Value::Boolean(_) => Some(PrimitiveKind::Boolean),
            _ => None,
        }
    }

    /// Runtime type the value reports when no explicit type is attached
    pub fn runtime_type(&self) -> RuntimeType {
        if let Some(kind) = self.primitive_kind() {
            return RuntimeType::Primitive(kind);
        }

        match self {
            Value::Str(_) => RuntimeType::reference("String"),
            Value::List(_) => RuntimeType::reference("List"),
            Value::Map(_) => RuntimeType::reference("Map"),
            Value::Bean(bean) => RuntimeType::reference(bean.type_name()),
            _ => RuntimeType::Null,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Apply a widening primitive conversion.
    ///
    /// Returns `None` if the value is not a primitive or `target` is not
    /// reachable by widening. The identity conversion always succeeds.
    pub fn widen(&self, target: PrimitiveKind) -> Option<Value> {
        let source = self.primitive_kind()?;
        if source == target {
            return Some(self.clone());
        }
        if !source.widens_to(target) {
            return None;
        }

        let integral = match *self {
            Value::Byte(v) => i64::from(v),
            Value::Short(v) => i64::from(v),
            Value::Int(v) => i64::from(v),
            Value::Long(v) => v,
            Value::Char(c) => i64::from(u32::from(c)),
            Value::Float(v) => return Some(Value::Double(f64::from(v))),
            _ => return None,
        };

        // widens_to guarantees the target can hold the source range
        let widened = match target {
            PrimitiveKind::Short => Value::Short(integral as i16),
            PrimitiveKind::Int => Value::Int(integral as i32),
            PrimitiveKind::Long => Value::Long(integral),
            PrimitiveKind::Float => Value::Float(integral as f32),
            PrimitiveKind::Double => Value::Double(integral as f64),
            _ => return None,
        };
        Some(widened)
    }
}

/// Decimal form of a float: plain notation with at least one fraction digit
/// for magnitudes in `[1e-3, 1e7)`, otherwise `<mantissa>E<exponent>`
fn fmt_decimal<T>(v: T, f: &mut fmt::Formatter<'_>) -> fmt::Result
where
    T: Copy + Into<f64> + fmt::Display + fmt::LowerExp,
{
    let magnitude = v.into().abs();
    if magnitude.is_nan() {
        return f.write_str("NaN");
    }
    if magnitude.is_infinite() {
        return f.write_str(if v.into() > 0.0 { "Infinity" } else { "-Infinity" });
    }

    if magnitude == 0.0 || (1e-3..1e7).contains(&magnitude) {
        let plain = v.to_string();
        if plain.contains('.') {
            return f.write_str(&plain);
        }
        return write!(f, "{}.0", plain);
    }

    let scientific = format!("{:e}", v);
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((&scientific, "0"));
    if mantissa.contains('.') {
        write!(f, "{}E{}", mantissa, exponent)
    } else {
        write!(f, "{}.0E{}", mantissa, exponent)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Byte(v) => write!(f, "{}", v),
            Value::Short(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Long(v) => write!(f, "{}", v),
            Value::Float(v) => fmt_decimal(*v, f),
            Value::Double(v) => fmt_decimal(*v, f),
            Value::Char(c) => write!(f, "{}", c),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Str(s) => f.write_str(s),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Map(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}={}", key, value)?;
                }
                f.write_str("}")
            }
            Value::Bean(bean) => write!(f, "{}", bean),
        }
    }
}

/// A value together with the runtime type it was supplied as
#[derive(Debug, Clone, PartialEq)]
pub struct TypedValue {
    pub value: Value,
    pub runtime: RuntimeType,
}

impl TypedValue {
    /// Value with its natural runtime type (primitives unboxed)
    pub fn new(value: Value) -> Self {
        let runtime = value.runtime_type();
        TypedValue { value, runtime }
    }

    /// Primitive values are reported as their boxed wrapper
    pub fn boxed(value: Value) -> Self {
        let runtime = match value.primitive_kind() {
            Some(kind) => RuntimeType::Boxed(kind),
            None => value.runtime_type(),
        };
        TypedValue { value, runtime }
    }

    /// Value reported as the named reference type, e.g. a map supplied as
    /// `Properties`
    pub fn with_type(value: Value, type_name: impl Into<String>) -> Self {
        TypedValue {
            value,
            runtime: RuntimeType::Reference(type_name.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widen_integral() {
        assert_eq!(Value::Byte(-3).widen(PrimitiveKind::Long), Some(Value::Long(-3)));
        assert_eq!(Value::Char('A').widen(PrimitiveKind::Int), Some(Value::Int(65)));
        assert_eq!(Value::Short(7).widen(PrimitiveKind::Double), Some(Value::Double(7.0)));
        assert_eq!(Value::Float(1.5).widen(PrimitiveKind::Double), Some(Value::Double(1.5)));
    }

    #[test]
    fn test_widen_rejects_narrowing() {
        assert_eq!(Value::Int(300).widen(PrimitiveKind::Byte), None);
        assert_eq!(Value::Double(1.0).widen(PrimitiveKind::Float), None);
        assert_eq!(Value::Boolean(true).widen(PrimitiveKind::Int), None);
        assert_eq!(Value::Str("1".into()).widen(PrimitiveKind::Int), None);
    }

    #[test]
    fn test_display_matches_java_forms() {
        assert_eq!(Value::Float(0.0).to_string(), "0.0");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        assert_eq!(Value::Double(3.0).to_string(), "3.0");
        assert_eq!(Value::Double(-0.0).to_string(), "-0.0");
        assert_eq!(Value::Null.to_string(), "null");

        let list = Value::List(vec![Value::Int(1), Value::Str("two".into())]);
        assert_eq!(list.to_string(), "[1, two]");

        let mut entries = IndexMap::new();
        entries.insert("a".to_string(), Value::Int(1));
        entries.insert("b".to_string(), Value::Boolean(false));
        assert_eq!(Value::Map(entries).to_string(), "{a=1, b=false}");
    }

    #[test]
    fn test_display_switches_to_exponent_form() {
        assert_eq!(Value::Float(1e10).to_string(), "1.0E10");
        assert_eq!(Value::Double(1e-4).to_string(), "1.0E-4");
        assert_eq!(Value::Double(1e7).to_string(), "1.0E7");
        assert_eq!(Value::Double(-1.5e-5).to_string(), "-1.5E-5");
        assert_eq!(Value::Double(9_999_999.5).to_string(), "9999999.5");
        assert_eq!(Value::Double(0.001).to_string(), "0.001");
        assert_eq!(Value::Float(f32::INFINITY).to_string(), "Infinity");
        assert_eq!(Value::Double(f64::NAN).to_string(), "NaN");
    }

    #[test]
    fn test_typed_value_runtime_types() {
        assert_eq!(
            TypedValue::new(Value::Int(1)).runtime,
            RuntimeType::Primitive(PrimitiveKind::Int)
        );
        assert_eq!(
            TypedValue::boxed(Value::Int(1)).runtime,
            RuntimeType::Boxed(PrimitiveKind::Int)
        );
        assert_eq!(
            TypedValue::boxed(Value::Str("s".into())).runtime,
            RuntimeType::reference("String")
        );
        assert_eq!(
            TypedValue::with_type(Value::Map(IndexMap::new()), "Properties").runtime,
            RuntimeType::reference("Properties")
        );
    }
}
