//! The command trie: nodes, bindings, and registration.
//!
//! Registration runs in three phases so a failure can never leave the trie
//! half-mutated: classify and shape-check every token first, then walk the
//! existing nodes checking for variable conflicts, and only then create
//! nodes and attach the binding.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::errors::RegistrationError;
use crate::token::{Token, VarSpec, classify};
use crate::types::{ArgMap, TypeRegistry};

/// A bound command callback. Stored directly in the trie at registration
/// time; dispatch never resolves handlers by name.
pub type Handler = Arc<dyn Fn(&ArgMap) -> i32 + Send + Sync>;

/// A command-path token after shape validation: options are already
/// rejected by then.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PathToken {
    Literal(String),
    Variable(VarSpec),
}

impl fmt::Display for PathToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathToken::Literal(text) => write!(f, "{}", text),
            PathToken::Variable(spec) => write!(f, "{}", spec),
        }
    }
}

/// What a terminal node carries.
pub(crate) struct Binding {
    pub(crate) handler: Handler,
    pub(crate) default_args: ArgMap,
    pub(crate) help: String,
}

/// The single variable child a node may have, with its descriptor.
pub(crate) struct VariableChild {
    pub(crate) spec: VarSpec,
    pub(crate) node: CommandNode,
}

/// A trie vertex.
///
/// `hidden` starts true and every registration that creates or passes
/// through the node ANDs its own flag in, so one visible registration is
/// enough to make a shared node visible in help listings.
pub(crate) struct CommandNode {
    pub(crate) literal_children: HashMap<String, CommandNode>,
    pub(crate) variable_child: Option<Box<VariableChild>>,
    pub(crate) binding: Option<Binding>,
    pub(crate) hidden: bool,
}

impl CommandNode {
    fn new() -> Self {
        Self {
            literal_children: HashMap::new(),
            variable_child: None,
            binding: None,
            hidden: true,
        }
    }
}

/// One row of the registration listing, in registration order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandEntry {
    /// Canonical path display, e.g. `show slot @id(int)`.
    pub path: String,
    pub help: String,
    pub hidden: bool,
    pub defaults: ArgMap,
}

/// The rooted trie plus a flat registration listing.
pub(crate) struct CommandTree {
    root: CommandNode,
    entries: Vec<CommandEntry>,
}

impl CommandTree {
    pub(crate) fn new() -> Self {
        Self {
            root: CommandNode::new(),
            entries: Vec::new(),
        }
    }

    pub(crate) fn root(&self) -> &CommandNode {
        &self.root
    }

    pub(crate) fn entries(&self) -> &[CommandEntry] {
        &self.entries
    }

    /// Register one command path. Re-registering the exact same path is
    /// allowed; the newer binding wins.
    pub(crate) fn register(
        &mut self,
        token_texts: &[&str],
        handler: Handler,
        default_args: ArgMap,
        help: &str,
        hidden: bool,
        types: &TypeRegistry,
    ) -> Result<(), RegistrationError> {
        let tokens = validate_path(token_texts, types)?;
        self.check_variable_conflict(&tokens)?;

        let path = tokens
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(" ");

        let mut node = &mut self.root;
        node.hidden = node.hidden && hidden;
        for tok in &tokens {
            node = match tok {
                PathToken::Literal(word) => node
                    .literal_children
                    .entry(word.clone())
                    .or_insert_with(CommandNode::new),
                PathToken::Variable(spec) => {
                    let vc = node.variable_child.get_or_insert_with(|| {
                        Box::new(VariableChild {
                            spec: spec.clone(),
                            node: CommandNode::new(),
                        })
                    });
                    &mut vc.node
                }
            };
            node.hidden = node.hidden && hidden;
        }
        node.binding = Some(Binding {
            handler,
            default_args: default_args.clone(),
            help: help.to_string(),
        });
        debug!("registered command: {}", path);

        let entry = CommandEntry {
            path,
            help: help.to_string(),
            hidden,
            defaults: default_args,
        };
        match self.entries.iter_mut().find(|e| e.path == entry.path) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
        Ok(())
    }

    /// Walk the existing nodes along `tokens`, failing if a variable token
    /// disagrees with a variable child that is already there. Leaving the
    /// existing tree ends the walk: nodes not yet created cannot conflict.
    fn check_variable_conflict(&self, tokens: &[PathToken]) -> Result<(), RegistrationError> {
        let mut node = &self.root;
        let mut at: Vec<String> = Vec::new();
        for tok in tokens {
            match tok {
                PathToken::Literal(word) => match node.literal_children.get(word) {
                    Some(child) => node = child,
                    None => return Ok(()),
                },
                PathToken::Variable(spec) => match &node.variable_child {
                    Some(vc) => {
                        if vc.spec != *spec {
                            return Err(RegistrationError::ConflictingVariable {
                                at: at.join(" "),
                                existing: vc.spec.to_string(),
                                proposed: spec.to_string(),
                            });
                        }
                        node = &vc.node;
                    }
                    None => return Ok(()),
                },
            }
            at.push(tok.to_string());
        }
        Ok(())
    }
}

/// Classify and shape-check a whole command path without touching the tree.
fn validate_path(
    token_texts: &[&str],
    types: &TypeRegistry,
) -> Result<Vec<PathToken>, RegistrationError> {
    if token_texts.is_empty() {
        return Err(RegistrationError::BadCommandShape {
            reason: "empty command path".into(),
        });
    }
    let mut tokens = Vec::with_capacity(token_texts.len());
    for (i, text) in token_texts.iter().enumerate() {
        match classify(text)? {
            Token::Option { .. } => {
                return Err(RegistrationError::BadCommandShape {
                    reason: format!("option token '{}' is not allowed in a command path", text),
                });
            }
            Token::Literal(word) => tokens.push(PathToken::Literal(word)),
            Token::Variable(spec) => {
                if !types.contains(&spec.type_name) {
                    return Err(RegistrationError::BadTokenFormat {
                        token: (*text).to_string(),
                        reason: format!("type '{}' is not registered", spec.type_name),
                    });
                }
                if spec.variadic && i + 1 != token_texts.len() {
                    return Err(RegistrationError::BadCommandShape {
                        reason: format!("variadic token '{}' must be last", spec),
                    });
                }
                tokens.push(PathToken::Variable(spec));
            }
        }
    }
    Ok(tokens)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> Handler {
        Arc::new(|_args| 0)
    }

    fn register(
        tree: &mut CommandTree,
        types: &TypeRegistry,
        path: &[&str],
        hidden: bool,
    ) -> Result<(), RegistrationError> {
        tree.register(path, noop(), ArgMap::new(), "", hidden, types)
    }

    #[test]
    fn test_register_builds_shared_prefix() {
        let types = TypeRegistry::new();
        let mut tree = CommandTree::new();
        register(&mut tree, &types, &["show", "version"], false).unwrap();
        register(&mut tree, &types, &["show", "slot", "@id(int)"], false).unwrap();

        let show = &tree.root.literal_children["show"];
        assert_eq!(show.literal_children.len(), 2);
        assert!(show.binding.is_none());
        let slot = &show.literal_children["slot"];
        let vc = slot.variable_child.as_ref().unwrap();
        assert_eq!(vc.spec.target, "id");
        assert!(vc.node.binding.is_some());
    }

    #[test]
    fn test_variable_conflict_rejected() {
        let types = TypeRegistry::new();
        let mut tree = CommandTree::new();
        register(&mut tree, &types, &["show", "slot", "@id(int)"], false).unwrap();

        let err = register(&mut tree, &types, &["show", "slot", "@name(str)"], false).unwrap_err();
        assert_eq!(
            err,
            RegistrationError::ConflictingVariable {
                at: "show slot".into(),
                existing: "@id(int)".into(),
                proposed: "@name(str)".into(),
            }
        );
        // Variadic flag alone is enough to conflict.
        let err = register(&mut tree, &types, &["show", "slot", "@id(int)..."], false).unwrap_err();
        assert!(matches!(
            err,
            RegistrationError::ConflictingVariable { .. }
        ));
    }

    #[test]
    fn test_identical_variable_is_idempotent() {
        let types = TypeRegistry::new();
        let mut tree = CommandTree::new();
        register(&mut tree, &types, &["show", "slot", "@id(int)"], false).unwrap();
        register(&mut tree, &types, &["show", "slot", "@id(int)"], false).unwrap();
        assert_eq!(tree.entries().len(), 1);
    }

    #[test]
    fn test_reregistration_overwrites_binding_and_listing() {
        let types = TypeRegistry::new();
        let mut tree = CommandTree::new();
        tree.register(&["ping"], noop(), ArgMap::new(), "first", false, &types)
            .unwrap();
        tree.register(&["ping"], noop(), ArgMap::new(), "second", true, &types)
            .unwrap();

        let node = &tree.root.literal_children["ping"];
        assert_eq!(node.binding.as_ref().unwrap().help, "second");
        assert_eq!(tree.entries().len(), 1);
        assert_eq!(tree.entries()[0].help, "second");
        assert!(tree.entries()[0].hidden);
    }

    #[test]
    fn test_option_token_in_path_rejected() {
        let types = TypeRegistry::new();
        let mut tree = CommandTree::new();
        let err = register(&mut tree, &types, &["show", "--verbose"], false).unwrap_err();
        assert!(matches!(err, RegistrationError::BadCommandShape { .. }));
    }

    #[test]
    fn test_empty_path_rejected() {
        let types = TypeRegistry::new();
        let mut tree = CommandTree::new();
        let err = register(&mut tree, &types, &[], false).unwrap_err();
        assert!(matches!(err, RegistrationError::BadCommandShape { .. }));
    }

    #[test]
    fn test_variadic_must_be_last() {
        let types = TypeRegistry::new();
        let mut tree = CommandTree::new();
        let err = register(
            &mut tree,
            &types,
            &["clear", "@idlist(int)...", "now"],
            false,
        )
        .unwrap_err();
        assert!(matches!(err, RegistrationError::BadCommandShape { .. }));
    }

    #[test]
    fn test_unknown_type_rejected() {
        let types = TypeRegistry::new();
        let mut tree = CommandTree::new();
        let err = register(&mut tree, &types, &["set", "@x(ipaddr)"], false).unwrap_err();
        assert!(matches!(err, RegistrationError::BadTokenFormat { .. }));
    }

    #[test]
    fn test_failed_registration_leaves_no_trace() {
        let types = TypeRegistry::new();
        let mut tree = CommandTree::new();
        register(&mut tree, &types, &["net", "add", "@host"], false).unwrap();

        // Fails in phase 1 (unknown type): nothing under "net" may change.
        register(&mut tree, &types, &["net", "del", "@x(ipaddr)"], false).unwrap_err();
        let net = &tree.root.literal_children["net"];
        assert_eq!(net.literal_children.len(), 1);
        assert!(net.literal_children.contains_key("add"));

        // Fails in phase 2 (variable conflict): the deeper literal child
        // the failing path wanted must not appear either.
        register(&mut tree, &types, &["net", "add", "@host(int)", "x"], false).unwrap_err();
        let net = &tree.root.literal_children["net"];
        let add = &net.literal_children["add"];
        let vc = add.variable_child.as_ref().unwrap();
        assert_eq!(vc.spec.type_name, "str");
        assert!(vc.node.literal_children.is_empty());
        assert_eq!(tree.entries().len(), 1);
    }

    #[test]
    fn test_hidden_and_accumulation() {
        let types = TypeRegistry::new();
        let mut tree = CommandTree::new();
        register(&mut tree, &types, &["show", "secrets"], true).unwrap();
        register(&mut tree, &types, &["show", "version"], false).unwrap();

        // The shared node went hidden -> visible; the private branch of the
        // hidden registration stays hidden.
        let show = &tree.root.literal_children["show"];
        assert!(!show.hidden);
        assert!(show.literal_children["secrets"].hidden);
        assert!(!show.literal_children["version"].hidden);
    }

    #[test]
    fn test_hidden_and_accumulation_is_order_independent() {
        let types = TypeRegistry::new();
        let mut tree = CommandTree::new();
        register(&mut tree, &types, &["show", "version"], false).unwrap();
        register(&mut tree, &types, &["show", "secrets"], true).unwrap();

        let show = &tree.root.literal_children["show"];
        assert!(!show.hidden);
        assert!(show.literal_children["secrets"].hidden);
        assert!(!show.literal_children["version"].hidden);
    }

    #[test]
    fn test_listing_uses_canonical_display() {
        let types = TypeRegistry::new();
        let mut tree = CommandTree::new();
        register(&mut tree, &types, &["set", "fs", "@fstype( str )"], false).unwrap();
        assert_eq!(tree.entries()[0].path, "set fs @fstype(str)");
    }
}
