use rustc_hash::{FxHashMap, FxHashSet};

/// Root of the reference hierarchy; every reference type is assignable to it
pub const OBJECT: &str = "Object";

/// Declared supertypes of the reference types values may carry
const BUILTIN_REFERENCE_TYPES: &[(&str, &[&str])] = &[
    ("Number", &[]),
    ("Comparable", &[]),
    ("CharSequence", &[]),
    ("String", &["CharSequence", "Comparable"]),
    ("Byte", &["Number", "Comparable"]),
    ("Short", &["Number", "Comparable"]),
    ("Integer", &["Number", "Comparable"]),
    ("Long", &["Number", "Comparable"]),
    ("Float", &["Number", "Comparable"]),
    ("Double", &["Number", "Comparable"]),
    ("Character", &["Comparable"]),
    ("Boolean", &["Comparable"]),
    ("Collection", &[]),
    ("List", &["Collection"]),
    ("Vector", &["List"]),
    ("Map", &[]),
    ("Hashtable", &["Map"]),
    ("Properties", &["Hashtable"]),
];

/// Reference assignability over declared supertype edges
#[derive(Debug, Clone)]
pub struct TypeCompatibility {
    supertypes: FxHashMap<String, Vec<String>>,
}

impl TypeCompatibility {
    /// Hierarchy with only `Object`
    pub fn empty() -> Self {
        Self {
            supertypes: FxHashMap::default(),
        }
    }

    /// Hierarchy pre-loaded with strings, boxed wrappers and collections
    pub fn with_builtins() -> Self {
        let mut compat = Self::empty();
        for (name, supertypes) in BUILTIN_REFERENCE_TYPES {
            compat.declare(name, supertypes.iter().copied());
        }
        compat
    }

    /// Add supertype edges for `name`
    pub fn declare<I, S>(&mut self, name: &str, supertypes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = self.supertypes.entry(name.to_string()).or_default();
        for supertype in supertypes {
            let supertype = supertype.into();
            if !entry.contains(&supertype) {
                entry.push(supertype);
            }
        }
    }

    pub fn is_declared(&self, name: &str) -> bool {
        name == OBJECT || self.supertypes.contains_key(name)
    }

    /// Check if a value of type `source` may be passed where `target` is declared
    pub fn is_assignable(&self, source: &str, target: &str) -> bool {
        if source == target || target == OBJECT {
            return true;
        }

        let mut seen = FxHashSet::default();
        let mut to_process = vec![source];

        while let Some(current) = to_process.pop() {
            let Some(parents) = self.supertypes.get(current) else {
                continue;
            };
            for parent in parents {
                if parent == target {
                    return true;
                }
                if seen.insert(parent.as_str()) {
                    to_process.push(parent);
                }
            }
        }

        false
    }
}

impl Default for TypeCompatibility {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_assignability() {
        let compat = TypeCompatibility::with_builtins();

        assert!(compat.is_assignable("Properties", "Map"));
        assert!(compat.is_assignable("Vector", "Collection"));
        assert!(compat.is_assignable("Integer", "Number"));
        assert!(compat.is_assignable("String", "Object"));
        assert!(!compat.is_assignable("Map", "Properties"));
        assert!(!compat.is_assignable("List", "Map"));
        assert!(!compat.is_assignable("Character", "Number"));
    }

    #[test]
    fn test_everything_is_an_object() {
        let compat = TypeCompatibility::empty();
        assert!(compat.is_assignable("Unregistered", OBJECT));
        assert!(compat.is_assignable("Unregistered", "Unregistered"));
        assert!(!compat.is_assignable("Unregistered", "Other"));
    }

    #[test]
    fn test_declared_cycles_terminate() {
        let mut compat = TypeCompatibility::empty();
        compat.declare("A", ["B"]);
        compat.declare("B", ["A"]);

        assert!(compat.is_assignable("A", "B"));
        assert!(!compat.is_assignable("A", "C"));
    }

    #[test]
    fn test_user_types_extend_builtins() {
        let mut compat = TypeCompatibility::with_builtins();
        compat.declare("SimpleClass", ["SimpleClassParent"]);
        compat.declare("SimpleClassParent", ["Comparable"]);

        assert!(compat.is_assignable("SimpleClass", "Comparable"));
        assert!(compat.is_declared("SimpleClass"));
        assert!(!compat.is_declared("ComplexClass"));
    }
}
