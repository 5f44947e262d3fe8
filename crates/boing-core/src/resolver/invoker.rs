use super::overload::{Conversion, Resolution};
use crate::bean::BeanRef;
use crate::error::InvocationError;
use crate::registry::{ConstructorFn, HookFn, SetterFn};
use crate::value::Value;
use indexmap::IndexMap;

/// Converted arguments as a constructor or setter handle sees them.
///
/// Every value already has the exact slot type, so accessors only fail when
/// a handle reads a position with the wrong accessor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    values: Vec<Value>,
}

macro_rules! primitive_accessors {
    ($($name:ident, $boxed:ident => $variant:ident: $ty:ty as $wrapper:literal),* $(,)?) => {
        $(
            pub fn $name(&self, position: usize) -> Result<$ty, InvocationError> {
                match self.value(position)? {
                    Value::$variant(v) => Ok(*v),
                    other => Err(mismatch(position, stringify!($name), other)),
                }
            }

            /// Boxed slot read; `None` for null
            pub fn $boxed(&self, position: usize) -> Result<Option<$ty>, InvocationError> {
                match self.value(position)? {
                    Value::Null => Ok(None),
                    Value::$variant(v) => Ok(Some(*v)),
                    other => Err(mismatch(position, $wrapper, other)),
                }
            }
        )*
    };
}

fn mismatch(position: usize, expected: &str, found: &Value) -> InvocationError {
    InvocationError::Conversion {
        position,
        expected: expected.to_string(),
        found: found.runtime_type().to_string(),
    }
}

impl Args {
    pub fn new(values: Vec<Value>) -> Self {
        Args { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn value(&self, position: usize) -> Result<&Value, InvocationError> {
        self.values.get(position).ok_or(InvocationError::Arity {
            expected: position + 1,
            found: self.values.len(),
        })
    }

    primitive_accessors! {
        byte, boxed_byte => Byte: i8 as "Byte",
        short, boxed_short => Short: i16 as "Short",
        int, boxed_int => Int: i32 as "Integer",
        long, boxed_long => Long: i64 as "Long",
        float, boxed_float => Float: f32 as "Float",
        double, boxed_double => Double: f64 as "Double",
        char, boxed_char => Char: char as "Character",
        boolean, boxed_boolean => Boolean: bool as "Boolean",
    }

    pub fn string(&self, position: usize) -> Result<Option<String>, InvocationError> {
        match self.value(position)? {
            Value::Null => Ok(None),
            Value::Str(s) => Ok(Some(s.clone())),
            other => Err(mismatch(position, "String", other)),
        }
    }

    pub fn list(&self, position: usize) -> Result<Option<Vec<Value>>, InvocationError> {
        match self.value(position)? {
            Value::Null => Ok(None),
            Value::List(items) => Ok(Some(items.clone())),
            other => Err(mismatch(position, "List", other)),
        }
    }

    pub fn map(&self, position: usize) -> Result<Option<IndexMap<String, Value>>, InvocationError> {
        match self.value(position)? {
            Value::Null => Ok(None),
            Value::Map(entries) => Ok(Some(entries.clone())),
            other => Err(mismatch(position, "Map", other)),
        }
    }

    pub fn bean(&self, position: usize) -> Result<Option<BeanRef>, InvocationError> {
        match self.value(position)? {
            Value::Null => Ok(None),
            Value::Bean(bean) => Ok(Some(bean.clone())),
            other => Err(mismatch(position, "bean", other)),
        }
    }

    /// Any value, `None` for null
    pub fn object(&self, position: usize) -> Result<Option<Value>, InvocationError> {
        match self.value(position)? {
            Value::Null => Ok(None),
            other => Ok(Some(other.clone())),
        }
    }
}

/// Executes resolved candidates
pub struct Invoker;

impl Invoker {
    /// Apply the resolved conversions to the supplied values
    pub fn convert(
        conversions: &[Conversion],
        values: Vec<Value>,
    ) -> Result<Args, InvocationError> {
        if conversions.len() != values.len() {
            return Err(InvocationError::Arity {
                expected: conversions.len(),
                found: values.len(),
            });
        }

        let mut converted = Vec::with_capacity(values.len());
        for (position, (conversion, value)) in conversions.iter().zip(values).enumerate() {
            let value = match *conversion {
                Conversion::Identity | Conversion::Reference | Conversion::Null => value,
                Conversion::Widen(kind) => {
                    value.widen(kind).ok_or_else(|| mismatch(position, kind.name(), &value))?
                }
                Conversion::NullToPrimitive(kind) => {
                    return Err(InvocationError::NullToPrimitive { position, kind });
                }
            };
            converted.push(value);
        }

        Ok(Args::new(converted))
    }

    /// Run a resolved constructor
    pub fn construct(
        resolution: &Resolution<'_, ConstructorFn>,
        values: Vec<Value>,
    ) -> Result<BeanRef, InvocationError> {
        let args = Self::convert(&resolution.conversions, values)?;
        let construct = resolution.candidate.handle();
        construct(&args).map_err(InvocationError::raised)
    }

    /// Run a resolved setter against `target`
    pub fn apply_setter(
        resolution: &Resolution<'_, SetterFn>,
        target: &BeanRef,
        value: Value,
    ) -> Result<(), InvocationError> {
        let args = Self::convert(&resolution.conversions, vec![value])?;
        let set = resolution.candidate.handle();
        let mut guard = target.write();
        set(&mut *guard, &args).map_err(InvocationError::raised)
    }

    /// Run a lifecycle hook against `target`
    pub fn run_hook(hook: &HookFn, target: &BeanRef) -> anyhow::Result<()> {
        let mut guard = target.write();
        hook(&mut *guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::PrimitiveKind;

    #[test]
    fn test_convert_widens_values() {
        let args = Invoker::convert(
            &[Conversion::Identity, Conversion::Widen(PrimitiveKind::Long)],
            vec![Value::Byte(1), Value::Int(2)],
        )
        .unwrap();

        assert_eq!(args.byte(0).unwrap(), 1);
        assert_eq!(args.long(1).unwrap(), 2);
    }

    #[test]
    fn test_null_to_primitive_is_fatal() {
        let err = Invoker::convert(
            &[Conversion::Identity, Conversion::NullToPrimitive(PrimitiveKind::Int)],
            vec![Value::Byte(1), Value::Null],
        )
        .unwrap_err();

        assert!(matches!(
            err,
            InvocationError::NullToPrimitive {
                position: 1,
                kind: PrimitiveKind::Int
            }
        ));
        assert_eq!(err.to_string(), "null supplied for primitive `int` at argument 1");
    }

    #[test]
    fn test_null_passes_to_reference_slots() {
        let args = Invoker::convert(&[Conversion::Null], vec![Value::Null]).unwrap();
        assert_eq!(args.string(0).unwrap(), None);
        assert_eq!(args.bean(0).unwrap(), None);
        assert_eq!(args.object(0).unwrap(), None);
    }

    #[test]
    fn test_boxed_accessors_read_null() {
        let args = Invoker::convert(
            &[Conversion::Null, Conversion::Widen(PrimitiveKind::Long)],
            vec![Value::Null, Value::Int(7)],
        )
        .unwrap();

        assert_eq!(args.boxed_int(0).unwrap(), None);
        assert_eq!(args.boxed_long(1).unwrap(), Some(7));
        assert!(args.int(0).is_err());

        let err = Args::new(vec![Value::Boolean(true)]).boxed_char(0).unwrap_err();
        assert_eq!(err.to_string(), "argument 0: expected Character, found boolean");
    }

    #[test]
    fn test_accessor_mismatch() {
        let args = Args::new(vec![Value::Str("x".into())]);

        let err = args.int(0).unwrap_err();
        assert_eq!(err.to_string(), "argument 0: expected int, found String");

        let err = args.int(3).unwrap_err();
        assert!(matches!(err, InvocationError::Arity { expected: 4, found: 1 }));
    }

    #[test]
    fn test_arity_mismatch() {
        let err = Invoker::convert(&[Conversion::Identity], vec![]).unwrap_err();
        assert!(matches!(err, InvocationError::Arity { expected: 1, found: 0 }));
    }
}
