//! Declaration-token classification.
//!
//! One declaration token is either a literal word, a `@name(type)` variable
//! (optionally variadic), or a `-x`/`--name` option. Classification is pure:
//! it looks at nothing but the token text. Whether a variable's type is
//! actually registered is checked later, at registration time, when a type
//! registry is in scope.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::errors::RegistrationError;

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid regex literal")
}

/// Grammar for variable tokens: `@` NAME [`(` TYPE `)`] [`...`].
fn regex_variable() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        regex(r"^@([A-Za-z_][A-Za-z0-9_]*)(?:\(\s*([A-Za-z_][A-Za-z0-9_]*)\s*\))?(\.\.\.)?$")
    })
}

/// Which flag namespace an option lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum OptionKind {
    /// Single-character `-x` flags; combinable as `-xyz` in input.
    Short,
    /// `--name` flags.
    Long,
}

/// A variable token: captures one input token (or, if variadic, all
/// remaining input tokens) into a named, typed argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarSpec {
    /// Argument key the captured value is bound under.
    pub target: String,
    /// Type registry name used to coerce the raw text.
    pub type_name: String,
    /// Consume every remaining input token into an ordered list.
    pub variadic: bool,
}

impl fmt::Display for VarSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}({})", self.target, self.type_name)?;
        if self.variadic {
            write!(f, "...")?;
        }
        Ok(())
    }
}

/// One classified declaration token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Matched verbatim (or by unique prefix) against input.
    Literal(String),
    /// Captures typed input under `spec.target`.
    Variable(VarSpec),
    /// A flag; only legal in option registrations, never in command paths.
    Option { kind: OptionKind, name: String },
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Literal(text) => write!(f, "{}", text),
            Token::Variable(spec) => write!(f, "{}", spec),
            Token::Option {
                kind: OptionKind::Short,
                name,
            } => write!(f, "-{}", name),
            Token::Option {
                kind: OptionKind::Long,
                name,
            } => write!(f, "--{}", name),
        }
    }
}

/// Classify a single declaration token.
///
/// The canonical rendering of the returned token (its `Display`) is what
/// later comparisons and help listings use; for variables it regenerates
/// `@target(type)` with `...` appended if variadic, discarding whitespace
/// variations in the declared text.
pub fn classify(text: &str) -> Result<Token, RegistrationError> {
    if let Some(name) = text.strip_prefix("--") {
        if name.is_empty() {
            return Err(RegistrationError::BadTokenFormat {
                token: text.to_string(),
                reason: "long option needs a name".into(),
            });
        }
        return Ok(Token::Option {
            kind: OptionKind::Long,
            name: name.to_string(),
        });
    }

    if let Some(name) = text.strip_prefix('-') {
        if name.chars().count() != 1 {
            return Err(RegistrationError::BadTokenFormat {
                token: text.to_string(),
                reason: "short option is a single character".into(),
            });
        }
        return Ok(Token::Option {
            kind: OptionKind::Short,
            name: name.to_string(),
        });
    }

    if text.starts_with('@') {
        let caps = regex_variable().captures(text).ok_or_else(|| {
            RegistrationError::BadTokenFormat {
                token: text.to_string(),
                reason: "expected @name, @name(type), or a trailing ... for variadic".into(),
            }
        })?;
        let target = caps[1].to_string();
        let type_name = caps
            .get(2)
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| "str".to_string());
        return Ok(Token::Variable(VarSpec {
            target,
            type_name,
            variadic: caps.get(3).is_some(),
        }));
    }

    Ok(Token::Literal(text.to_string()))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_literal() {
        assert_eq!(classify("show").unwrap(), Token::Literal("show".into()));
        // No alias syntax: the pipe is part of the literal text.
        assert_eq!(
            classify("fs|ignored").unwrap(),
            Token::Literal("fs|ignored".into())
        );
    }

    #[test]
    fn test_classify_variable_defaults_to_str() {
        let tok = classify("@name").unwrap();
        assert_eq!(
            tok,
            Token::Variable(VarSpec {
                target: "name".into(),
                type_name: "str".into(),
                variadic: false,
            })
        );
        assert_eq!(tok.to_string(), "@name(str)");
    }

    #[test]
    fn test_classify_variable_typed() {
        let tok = classify("@id(int)").unwrap();
        assert_eq!(tok.to_string(), "@id(int)");
    }

    #[test]
    fn test_classify_variadic() {
        let tok = classify("@idlist(int)...").unwrap();
        if let Token::Variable(spec) = &tok {
            assert!(spec.variadic);
            assert_eq!(spec.type_name, "int");
        } else {
            panic!("Expected Variable token");
        }
        assert_eq!(tok.to_string(), "@idlist(int)...");
    }

    #[test]
    fn test_classify_discards_whitespace_in_type() {
        let tok = classify("@fstype( str )").unwrap();
        assert_eq!(tok.to_string(), "@fstype(str)");
    }

    #[test]
    fn test_classify_options() {
        assert_eq!(
            classify("--verbose").unwrap(),
            Token::Option {
                kind: OptionKind::Long,
                name: "verbose".into(),
            }
        );
        assert_eq!(
            classify("-v").unwrap(),
            Token::Option {
                kind: OptionKind::Short,
                name: "v".into(),
            }
        );
        assert_eq!(classify("--verbose").unwrap().to_string(), "--verbose");
        assert_eq!(classify("-v").unwrap().to_string(), "-v");
    }

    #[test]
    fn test_classify_bad_variable_grammar() {
        for bad in ["@", "@9id", "@x(", "@x(int", "@x()", "@x(int)extra", "@x( )"] {
            assert!(
                matches!(
                    classify(bad),
                    Err(RegistrationError::BadTokenFormat { .. })
                ),
                "expected BadTokenFormat for {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_classify_bad_options() {
        // Bare dashes and multi-character shorts cannot be declared.
        for bad in ["-", "--", "-abc"] {
            assert!(
                matches!(
                    classify(bad),
                    Err(RegistrationError::BadTokenFormat { .. })
                ),
                "expected BadTokenFormat for {:?}",
                bad
            );
        }
    }
}
