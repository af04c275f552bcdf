//! The option table: flag handlers resolved independently of trie position.
//!
//! Options are pure toggles. They take no positional argument; resolving
//! one invokes its handler with only the registered default arguments.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::errors::{DispatchFailure, RegistrationError};
use crate::token::{OptionKind, Token, classify};
use crate::tree::Handler;
use crate::types::ArgMap;

struct OptionBinding {
    handler: Handler,
    default_args: ArgMap,
    help: String,
    hidden: bool,
}

/// One row of the option listing, sorted short flags first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionEntry {
    /// Canonical flag display, e.g. `-v` or `--verbose`.
    pub display: String,
    pub help: String,
    pub hidden: bool,
    pub defaults: ArgMap,
}

pub(crate) struct OptionTable {
    bindings: HashMap<(OptionKind, String), OptionBinding>,
}

impl OptionTable {
    pub(crate) fn new() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Register one handler under every given flag text. Each text must
    /// classify as an option; each (kind, name) key is stored
    /// independently and re-registration overwrites.
    pub(crate) fn register(
        &mut self,
        option_texts: &[&str],
        handler: Handler,
        default_args: ArgMap,
        help: &str,
        hidden: bool,
    ) -> Result<(), RegistrationError> {
        if option_texts.is_empty() {
            return Err(RegistrationError::BadCommandShape {
                reason: "empty option list".into(),
            });
        }
        // Classify everything before touching the table so a bad text
        // cannot leave a partial registration behind.
        let mut keys = Vec::with_capacity(option_texts.len());
        for text in option_texts {
            match classify(text)? {
                Token::Option { kind, name } => keys.push((kind, name)),
                _ => {
                    return Err(RegistrationError::BadCommandShape {
                        reason: format!("'{}' is not an option token", text),
                    });
                }
            }
        }
        for key in keys {
            debug!(
                "registered option: {}",
                Token::Option {
                    kind: key.0,
                    name: key.1.clone()
                }
            );
            self.bindings.insert(
                key,
                OptionBinding {
                    handler: handler.clone(),
                    default_args: default_args.clone(),
                    help: help.to_string(),
                    hidden,
                },
            );
        }
        Ok(())
    }

    /// Resolve one input token that starts with `-`, invoking every flag
    /// handler it names. A combined short token `-abc` runs `-a`, `-b`,
    /// `-c` in that order; the first unknown name stops the scan.
    pub(crate) fn resolve(&self, token: &str) -> Result<(), DispatchFailure> {
        if let Some(name) = token.strip_prefix("--") {
            let binding = self
                .bindings
                .get(&(OptionKind::Long, name.to_string()))
                .ok_or_else(|| DispatchFailure::UnknownOption {
                    option: token.to_string(),
                })?;
            (binding.handler)(&binding.default_args);
            return Ok(());
        }
        let body = match token.strip_prefix('-') {
            Some(body) if !body.is_empty() => body,
            _ => {
                return Err(DispatchFailure::UnknownOption {
                    option: token.to_string(),
                });
            }
        };
        for ch in body.chars() {
            match self.bindings.get(&(OptionKind::Short, ch.to_string())) {
                Some(binding) => {
                    (binding.handler)(&binding.default_args);
                }
                None => {
                    return Err(DispatchFailure::UnknownOption {
                        option: format!("-{}", ch),
                    });
                }
            }
        }
        Ok(())
    }

    pub(crate) fn entries(&self) -> Vec<OptionEntry> {
        let mut keyed: Vec<_> = self.bindings.iter().collect();
        keyed.sort_unstable_by(|(a, _), (b, _)| a.cmp(b));
        keyed
            .into_iter()
            .map(|((kind, name), binding)| OptionEntry {
                display: Token::Option {
                    kind: *kind,
                    name: name.clone(),
                }
                .to_string(),
                help: binding.help.clone(),
                hidden: binding.hidden,
                defaults: binding.default_args.clone(),
            })
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
