//! Test fixtures - bean types with heavily overloaded constructors and setters

use boing_core::registry::TypeSlot;
use boing_core::{
    Args, ArgumentValue, BeanRef, Definition, Disposable, Initializable, InvocationError,
    PrimitiveKind, TypeDescriptor, TypeRegistry, Value,
};
use std::fmt;
use tracing::debug;

const COLON: &str = ":";

/// Arities of the positional `SimpleClass` constructors
pub const SIMPLE_CLASS_ARITIES: [usize; 9] = [0, 1, 2, 4, 5, 6, 7, 8, 9];

/// A bean with a field of every primitive kind plus a few collections
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleClass {
    pub byte_val: i8,
    pub short_val: i16,
    pub int_val: i32,
    pub long_val: i64,
    pub float_val: f32,
    pub double_val: f64,
    pub char_val: char,
    pub bool_val: bool,
    pub string_val: Option<String>,
    pub object_val: Option<Value>,
    pub list_val: Option<Value>,
    pub map_val: Option<Value>,
    pub props: Option<Value>,
    pub vector: Option<Value>,
    pub destroyed: bool,
}

impl Default for SimpleClass {
    fn default() -> Self {
        SimpleClass {
            byte_val: 0,
            short_val: 0,
            int_val: 0,
            long_val: 0,
            float_val: 0.0,
            double_val: 0.0,
            char_val: '\0',
            bool_val: false,
            string_val: None,
            object_val: None,
            list_val: None,
            map_val: None,
            props: None,
            vector: None,
            destroyed: false,
        }
    }
}

impl SimpleClass {
    /// Fill the leading fields in declaration order from however many
    /// arguments were supplied
    fn positional(args: &Args) -> Result<Self, InvocationError> {
        let mut bean = SimpleClass::default();
        let n = args.len();

        if n > 0 {
            bean.byte_val = args.byte(0)?;
        }
        if n > 1 {
            bean.short_val = args.short(1)?;
        }
        if n > 2 {
            bean.int_val = args.int(2)?;
        }
        if n > 3 {
            bean.long_val = args.long(3)?;
        }
        if n > 4 {
            bean.string_val = args.string(4)?;
        }
        if n > 5 {
            bean.float_val = args.float(5)?;
        }
        if n > 6 {
            bean.double_val = args.double(6)?;
        }
        if n > 7 {
            bean.char_val = args.char(7)?;
        }
        if n > 8 {
            bean.bool_val = args.boolean(8)?;
        }
        Ok(bean)
    }
}

impl fmt::Display for SimpleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}:{}:{}:{}:{}:{}",
            self.byte_val,
            self.short_val,
            self.int_val,
            self.long_val,
            self.string_val.as_deref().unwrap_or("null"),
            Value::Float(self.float_val),
            Value::Double(self.double_val),
            escape_java(self.char_val),
            self.bool_val
        )?;

        for extra in [&self.list_val, &self.map_val, &self.props, &self.vector]
            .into_iter()
            .flatten()
        {
            write!(f, "{}{}", COLON, extra)?;
        }
        Ok(())
    }
}

impl Initializable for SimpleClass {
    fn init(&mut self) -> anyhow::Result<()> {
        self.bool_val = true;
        debug!("In init() of SimpleClass");
        Ok(())
    }
}

impl Disposable for SimpleClass {
    fn destroy(&mut self) -> anyhow::Result<()> {
        self.destroyed = true;
        debug!("In destroy() of SimpleClass");
        Ok(())
    }
}

/// A bean wired from two `SimpleClass` instances
#[derive(Debug, Default)]
pub struct ComplexClass {
    pub simple_bean_one: Option<BeanRef>,
    pub simple_bean_two: Option<BeanRef>,
    /// String form observed when `init` ran
    pub seen_at_init: Option<String>,
    pub destroyed: bool,
}

impl fmt::Display for ComplexClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_optional(&self.simple_bean_one, f)?;
        f.write_str(COLON)?;
        fmt_optional(&self.simple_bean_two, f)
    }
}

fn fmt_optional(bean: &Option<BeanRef>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match bean {
        Some(bean) => write!(f, "{}", bean),
        None => f.write_str("null"),
    }
}

impl Initializable for ComplexClass {
    fn init(&mut self) -> anyhow::Result<()> {
        self.seen_at_init = Some(self.to_string());
        debug!("In init() of ComplexClass");
        Ok(())
    }
}

impl Disposable for ComplexClass {
    fn destroy(&mut self) -> anyhow::Result<()> {
        self.destroyed = true;
        debug!("In destroy() of ComplexClass");
        Ok(())
    }
}

/// `\uXXXX` escaping of a single char, as Java string literals write it
pub fn escape_java(c: char) -> String {
    match c {
        '"' => "\\\"".to_string(),
        '\\' => "\\\\".to_string(),
        '\u{8}' => "\\b".to_string(),
        '\u{c}' => "\\f".to_string(),
        '\n' => "\\n".to_string(),
        '\r' => "\\r".to_string(),
        '\t' => "\\t".to_string(),
        c if (c as u32) < 0x20 || (c as u32) > 0x7f => {
            let mut units = [0u16; 2];
            c.encode_utf16(&mut units)
                .iter()
                .map(|unit| format!("\\u{:04X}", unit))
                .collect()
        }
        c => c.to_string(),
    }
}

pub fn simple_class_descriptor() -> TypeDescriptor {
    use PrimitiveKind::*;

    let positional: Vec<TypeSlot> = vec![
        Byte.into(),
        Short.into(),
        Int.into(),
        Long.into(),
        "String".into(),
        Float.into(),
        Double.into(),
        Char.into(),
        Boolean.into(),
    ];

    let mut builder =
        TypeDescriptor::builder::<SimpleClass>("SimpleClass").assignable_to(["SimpleClassParent"]);
    for arity in SIMPLE_CLASS_ARITIES {
        builder = builder.constructor(&positional[..arity], |a| Ok(SimpleClass::positional(a)?));
    }

    builder
        .constructor(&["List".into(), "Map".into()], |a| {
            Ok(SimpleClass {
                list_val: a.list(0)?.map(Value::List),
                map_val: a.map(1)?.map(Value::Map),
                ..SimpleClass::default()
            })
        })
        .constructor(&["Properties".into()], |a| {
            Ok(SimpleClass {
                props: a.map(0)?.map(Value::Map),
                ..SimpleClass::default()
            })
        })
        .constructor(&["Vector".into()], |a| {
            Ok(SimpleClass {
                vector: a.list(0)?.map(Value::List),
                ..SimpleClass::default()
            })
        })
        .constructor(&["Object".into()], |a| {
            Ok(SimpleClass {
                object_val: a.object(0)?,
                ..SimpleClass::default()
            })
        })
        .setter("byteVal", Byte, |s, a| {
            s.byte_val = a.byte(0)?;
            Ok(())
        })
        .setter("shortVal", Short, |s, a| {
            s.short_val = a.short(0)?;
            Ok(())
        })
        .setter("intVal", Int, |s, a| {
            s.int_val = a.int(0)?;
            Ok(())
        })
        .setter("longVal", Long, |s, a| {
            s.long_val = a.long(0)?;
            Ok(())
        })
        .setter("floatVal", Float, |s, a| {
            s.float_val = a.float(0)?;
            Ok(())
        })
        .setter("doubleVal", Double, |s, a| {
            s.double_val = a.double(0)?;
            Ok(())
        })
        .setter("charVal", Char, |s, a| {
            s.char_val = a.char(0)?;
            Ok(())
        })
        .setter("boolVal", Boolean, |s, a| {
            s.bool_val = a.boolean(0)?;
            Ok(())
        })
        .setter("stringVal", "String", |s, a| {
            s.string_val = a.string(0)?;
            Ok(())
        })
        .setter("objectVal", "Object", |s, a| {
            s.object_val = a.object(0)?;
            Ok(())
        })
        .setter("listVal", "List", |s, a| {
            s.list_val = a.list(0)?.map(Value::List);
            Ok(())
        })
        .setter("mapVal", "Map", |s, a| {
            s.map_val = a.map(0)?.map(Value::Map);
            Ok(())
        })
        .setter("props", "Properties", |s, a| {
            s.props = a.map(0)?.map(Value::Map);
            Ok(())
        })
        .setter("vector", "Vector", |s, a| {
            s.vector = a.list(0)?.map(Value::List);
            Ok(())
        })
        .initializable()
        .disposable()
        .build()
}

pub fn complex_class_descriptor() -> TypeDescriptor {
    TypeDescriptor::builder::<ComplexClass>("ComplexClass")
        .constructor(&[], |_| Ok(ComplexClass::default()))
        .constructor(&["SimpleClass".into()], |a| {
            Ok(ComplexClass {
                simple_bean_one: a.bean(0)?,
                ..ComplexClass::default()
            })
        })
        .constructor(&["SimpleClass".into(), "SimpleClass".into()], |a| {
            Ok(ComplexClass {
                simple_bean_one: a.bean(0)?,
                simple_bean_two: a.bean(1)?,
                ..ComplexClass::default()
            })
        })
        .setter("simpleBeanOne", "SimpleClass", |c, a| {
            c.simple_bean_one = a.bean(0)?;
            Ok(())
        })
        .setter("simpleBeanTwo", "SimpleClass", |c, a| {
            c.simple_bean_two = a.bean(0)?;
            Ok(())
        })
        .initializable()
        .disposable()
        .build()
}

/// Registry holding `SimpleClass` and `ComplexClass`
pub fn fixture_registry() -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    registry.declare_reference_type("SimpleClassParent", Vec::<String>::new());
    registry.register(simple_class_descriptor());
    registry.register(complex_class_descriptor());
    registry
}

/// `SimpleClass(byte 1, short 2, int 3, long 4)`
pub fn simple1() -> Definition {
    Definition::singleton("simple1", "SimpleClass")
        .arg(ArgumentValue::byte(1))
        .arg(ArgumentValue::short(2))
        .arg(ArgumentValue::int(3))
        .arg(ArgumentValue::long(4))
}

/// `SimpleClass` through the nine-argument constructor
pub fn simple2() -> Definition {
    Definition::singleton("simple2", "SimpleClass")
        .arg(ArgumentValue::byte(5))
        .arg(ArgumentValue::short(6))
        .arg(ArgumentValue::int(7))
        .arg(ArgumentValue::long(8))
        .arg(ArgumentValue::string("simple2"))
        .arg(ArgumentValue::float(1.5))
        .arg(ArgumentValue::double(2.5))
        .arg(ArgumentValue::char('c'))
        .arg(ArgumentValue::boolean(false))
}

/// `ComplexClass` wired to `simple1` and `simple2` through properties
pub fn complex1() -> Definition {
    Definition::singleton("complex1", "ComplexClass")
        .property("simpleBeanOne", ArgumentValue::reference("simple1"))
        .property("simpleBeanTwo", ArgumentValue::reference("simple2"))
}

pub fn fixture_definitions() -> Vec<Definition> {
    vec![simple1(), simple2(), complex1()]
}

/// String form of `simple1` once initialized
pub const SIMPLE1_STRING: &str = "1:2:3:4:null:0.0:0.0:\\u0000:true";

/// String form of `simple2` once initialized
pub const SIMPLE2_STRING: &str = "5:6:7:8:simple2:1.5:2.5:c:true";

/// The fixture definitions as a JSON document
pub fn fixture_document() -> &'static str {
    r#"{
  "beans": [
    {
      "id": "simple1",
      "type": "SimpleClass",
      "constructorArgs": [
        { "type": "byte", "value": 1 },
        { "type": "short", "value": 2 },
        { "type": "int", "value": 3 },
        { "type": "long", "value": 4 }
      ]
    },
    {
      "id": "simple2",
      "type": "SimpleClass",
      "constructorArgs": [
        { "type": "Byte", "value": 5 },
        { "type": "Short", "value": 6 },
        7,
        { "type": "Long", "value": 8 },
        "simple2",
        { "type": "float", "value": 1.5 },
        2.5,
        { "type": "char", "value": "c" },
        false
      ]
    },
    {
      "id": "complex1",
      "type": "ComplexClass",
      "properties": {
        "simpleBeanOne": { "ref": "simple1" },
        "simpleBeanTwo": { "ref": "simple2" }
      }
    }
  ]
}"#
}
