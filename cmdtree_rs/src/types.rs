//! Argument values and the string-to-value coercion registry.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

/// A coerced argument value.
///
/// `List` only ever comes out of variadic capture; custom coercions may
/// return any shape they like.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ArgValue {
    Str(String),
    Int(i64),
    Bool(bool),
    List(Vec<ArgValue>),
}

impl ArgValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ArgValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ArgValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ArgValue]> {
        match self {
            ArgValue::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Str(s) => write!(f, "{}", s),
            ArgValue::Int(n) => write!(f, "{}", n),
            ArgValue::Bool(b) => write!(f, "{}", b),
            ArgValue::List(items) => {
                let rendered: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "{}", rendered.join(", "))
            }
        }
    }
}

/// The argument mapping handed to handlers: defaults pre-seeded, captured
/// values merged over them.
pub type ArgMap = HashMap<String, ArgValue>;

/// A string-to-value coercion. The error string is wrapped into a
/// structured dispatch failure by the matcher.
pub type CoercionFn = Box<dyn Fn(&str) -> Result<ArgValue, String> + Send + Sync>;

/// Maps a type name to its coercion function. Pre-populated with
/// `str`/`int`/`bool`; extensible (and overridable) until dispatching
/// begins.
pub struct TypeRegistry {
    coercions: HashMap<String, CoercionFn>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            coercions: HashMap::new(),
        };
        registry.register("str", coerce_str);
        registry.register("int", coerce_int);
        registry.register("bool", coerce_bool);
        registry
    }

    /// Register a coercion under `name`, replacing any previous one.
    pub fn register<F>(&mut self, name: &str, coerce: F)
    where
        F: Fn(&str) -> Result<ArgValue, String> + Send + Sync + 'static,
    {
        self.coercions.insert(name.to_string(), Box::new(coerce));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.coercions.contains_key(name)
    }

    /// Run the named coercion on one raw input token.
    pub(crate) fn coerce(&self, type_name: &str, raw: &str) -> Result<ArgValue, String> {
        match self.coercions.get(type_name) {
            Some(f) => f(raw),
            None => Err(format!("type '{}' is not registered", type_name)),
        }
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn coerce_str(raw: &str) -> Result<ArgValue, String> {
    Ok(ArgValue::Str(raw.to_string()))
}

/// Base 16 when the text starts with `0x`, base 10 otherwise.
fn coerce_int(raw: &str) -> Result<ArgValue, String> {
    let parsed = match raw.strip_prefix("0x") {
        Some(hex) => i64::from_str_radix(hex, 16),
        None => raw.parse::<i64>(),
    };
    parsed.map(ArgValue::Int).map_err(|e| e.to_string())
}

/// The truthy set is `{true, 1, yes, y, t}`, case-insensitive; everything
/// else is false. Never errors.
fn coerce_bool(raw: &str) -> Result<ArgValue, String> {
    let truthy = matches!(
        raw.to_lowercase().as_str(),
        "true" | "1" | "yes" | "y" | "t"
    );
    Ok(ArgValue::Bool(truthy))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_decimal_and_hex() {
        let registry = TypeRegistry::new();
        assert_eq!(registry.coerce("int", "42").unwrap(), ArgValue::Int(42));
        assert_eq!(registry.coerce("int", "0x1F").unwrap(), ArgValue::Int(31));
        assert_eq!(registry.coerce("int", "-7").unwrap(), ArgValue::Int(-7));
    }

    #[test]
    fn test_int_rejects_garbage() {
        let registry = TypeRegistry::new();
        assert!(registry.coerce("int", "abc").is_err());
        assert!(registry.coerce("int", "0xZZ").is_err());
        assert!(registry.coerce("int", "").is_err());
        // Uppercase 0X is not the hex marker.
        assert!(registry.coerce("int", "0X1F").is_err());
    }

    #[test]
    fn test_bool_truthy_set() {
        let registry = TypeRegistry::new();
        for raw in ["true", "TRUE", "1", "yes", "Yes", "y", "t", "T"] {
            assert_eq!(
                registry.coerce("bool", raw).unwrap(),
                ArgValue::Bool(true),
                "{:?} should be true",
                raw
            );
        }
        for raw in ["false", "0", "no", "n", "banana", ""] {
            assert_eq!(
                registry.coerce("bool", raw).unwrap(),
                ArgValue::Bool(false),
                "{:?} should be false",
                raw
            );
        }
    }

    #[test]
    fn test_str_is_identity() {
        let registry = TypeRegistry::new();
        assert_eq!(
            registry.coerce("str", "0x1F").unwrap(),
            ArgValue::Str("0x1F".into())
        );
    }

    #[test]
    fn test_register_custom_type() {
        let mut registry = TypeRegistry::new();
        assert!(!registry.contains("upper"));
        registry.register("upper", |raw| Ok(ArgValue::Str(raw.to_uppercase())));
        assert!(registry.contains("upper"));
        assert_eq!(
            registry.coerce("upper", "abc").unwrap(),
            ArgValue::Str("ABC".into())
        );
    }

    #[test]
    fn test_register_overrides_builtin() {
        let mut registry = TypeRegistry::new();
        registry.register("int", |_raw| Ok(ArgValue::Int(99)));
        assert_eq!(registry.coerce("int", "1").unwrap(), ArgValue::Int(99));
    }

    #[test]
    fn test_unknown_type_errors() {
        let registry = TypeRegistry::new();
        assert!(registry.coerce("nope", "x").is_err());
    }

    #[test]
    fn test_display_rendering() {
        assert_eq!(ArgValue::Str("ext4".into()).to_string(), "ext4");
        assert_eq!(ArgValue::Int(31).to_string(), "31");
        assert_eq!(ArgValue::Bool(true).to_string(), "true");
        assert_eq!(
            ArgValue::List(vec![ArgValue::Int(1), ArgValue::Int(2), ArgValue::Int(3)]).to_string(),
            "1, 2, 3"
        );
    }
}
