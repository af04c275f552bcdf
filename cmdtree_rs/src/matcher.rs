//! The matcher: resolves an input token sequence against the command tree.
//!
//! The walk looks at one token at a time, in a fixed order of concerns:
//! help keyword first, then variadic capture, then inline options, then
//! literal children, then the variable child. Literal matching treats an
//! exact key as one candidate among the prefix matches, so `file` against
//! children `{file, filesystem}` is ambiguous rather than exact-wins.
//!
//! Dispatch never returns `Err`: every user input problem becomes a `Bad`
//! outcome carrying enough structure for the fallback handler to explain
//! itself.

use serde::Serialize;

use crate::errors::DispatchFailure;
use crate::options::OptionTable;
use crate::tree::{CommandNode, Handler};
use crate::types::{ArgMap, ArgValue, TypeRegistry};

/// A resolved command: the bound handler plus defaults merged with
/// captured arguments (captured values win on key collision).
pub(crate) struct MatchedCommand {
    pub(crate) handler: Handler,
    pub(crate) args: ArgMap,
}

/// Payload handed to the bad-command handler.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BadCommand {
    /// The original input tokens, untouched.
    pub input: Vec<String>,
    /// How many leading tokens were consumed before the failure.
    pub matched: usize,
    pub failure: DispatchFailure,
    /// Displays of everything reachable from the node where the walk
    /// stopped: literal children sorted, then the variable child.
    pub candidates: Vec<String>,
}

/// One child of the node a help request stopped at.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HelpTopic {
    /// Literal text, or the variable display like `@id(int)`.
    pub display: String,
    /// Help text bound at that child, empty if the child itself is not a
    /// complete command.
    pub help: String,
    pub hidden: bool,
}

/// Payload handed to the help handler.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HelpRequest {
    /// Input consumed before the help keyword.
    pub prefix: Vec<String>,
    /// Help text bound at the reached node itself, empty if none.
    pub help: String,
    /// Literal children sorted by display, then the variable child.
    pub topics: Vec<HelpTopic>,
}

pub(crate) enum MatchOutcome {
    Matched(MatchedCommand),
    Bad(BadCommand),
    Help(HelpRequest),
}

/// Walk `tokens` from `root`, producing a match outcome. Read-only over
/// the tree, the option table, and the type registry.
pub(crate) fn match_tokens(
    root: &CommandNode,
    tokens: &[&str],
    types: &TypeRegistry,
    options: &OptionTable,
    help_keywords: &[String],
) -> MatchOutcome {
    let mut node = root;
    let mut captured = ArgMap::new();

    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i];

        // Help keyword stops the walk before anything else gets a look,
        // even a literal child or option with the same text.
        if help_keywords.iter().any(|k| k.eq_ignore_ascii_case(token)) {
            return MatchOutcome::Help(help_request(&tokens[..i], node));
        }

        // A variadic child swallows every remaining token, flags included.
        if let Some(vc) = node.variable_child.as_deref() {
            if vc.spec.variadic {
                let mut seq = Vec::with_capacity(tokens.len() - i);
                for (offset, raw) in tokens[i..].iter().enumerate() {
                    match types.coerce(&vc.spec.type_name, raw) {
                        Ok(value) => seq.push(value),
                        Err(message) => {
                            return MatchOutcome::Bad(bad_command(
                                tokens,
                                i + offset,
                                node,
                                DispatchFailure::Coercion {
                                    type_name: vc.spec.type_name.clone(),
                                    token: (*raw).to_string(),
                                    message,
                                },
                            ));
                        }
                    }
                }
                captured.insert(vc.spec.target.clone(), ArgValue::List(seq));
                node = &vc.node;
                break;
            }
        }

        // Inline option: resolved against the option table without moving
        // the tree position.
        if token.starts_with('-') {
            if let Err(failure) = options.resolve(token) {
                return MatchOutcome::Bad(bad_command(tokens, i, node, failure));
            }
            i += 1;
            continue;
        }

        // Literal matching by exact-or-prefix candidate set.
        let mut matches: Vec<(&str, &CommandNode)> = node
            .literal_children
            .iter()
            .filter(|(key, _)| key.starts_with(token))
            .map(|(key, child)| (key.as_str(), child))
            .collect();
        matches.sort_unstable_by_key(|&(key, _)| key);
        match matches.len() {
            1 => {
                node = matches[0].1;
                i += 1;
                continue;
            }
            0 => {}
            _ => {
                return MatchOutcome::Bad(bad_command(
                    tokens,
                    i,
                    node,
                    DispatchFailure::Ambiguous {
                        token: token.to_string(),
                        candidates: matches.iter().map(|(key, _)| (*key).to_string()).collect(),
                    },
                ));
            }
        }

        // No literal qualified; a plain variable child may take the token.
        if let Some(vc) = node.variable_child.as_deref() {
            match types.coerce(&vc.spec.type_name, token) {
                Ok(value) => {
                    captured.insert(vc.spec.target.clone(), value);
                    node = &vc.node;
                    i += 1;
                    continue;
                }
                Err(message) => {
                    return MatchOutcome::Bad(bad_command(
                        tokens,
                        i,
                        node,
                        DispatchFailure::Coercion {
                            type_name: vc.spec.type_name.clone(),
                            token: token.to_string(),
                            message,
                        },
                    ));
                }
            }
        }

        return MatchOutcome::Bad(bad_command(
            tokens,
            i,
            node,
            DispatchFailure::UnknownToken {
                token: token.to_string(),
            },
        ));
    }

    match &node.binding {
        Some(binding) => {
            let mut args = binding.default_args.clone();
            args.extend(captured);
            MatchOutcome::Matched(MatchedCommand {
                handler: binding.handler.clone(),
                args,
            })
        }
        None => MatchOutcome::Bad(bad_command(
            tokens,
            tokens.len(),
            node,
            DispatchFailure::Incomplete,
        )),
    }
}

fn bad_command(
    tokens: &[&str],
    matched: usize,
    node: &CommandNode,
    failure: DispatchFailure,
) -> BadCommand {
    let mut candidates: Vec<String> = node.literal_children.keys().cloned().collect();
    candidates.sort_unstable();
    if let Some(vc) = node.variable_child.as_deref() {
        candidates.push(vc.spec.to_string());
    }
    BadCommand {
        input: tokens.iter().map(|t| (*t).to_string()).collect(),
        matched,
        failure,
        candidates,
    }
}

fn help_request(prefix: &[&str], node: &CommandNode) -> HelpRequest {
    let mut topics: Vec<HelpTopic> = node
        .literal_children
        .iter()
        .map(|(key, child)| HelpTopic {
            display: key.clone(),
            help: child
                .binding
                .as_ref()
                .map(|b| b.help.clone())
                .unwrap_or_default(),
            hidden: child.hidden,
        })
        .collect();
    topics.sort_unstable_by(|a, b| a.display.cmp(&b.display));
    if let Some(vc) = node.variable_child.as_deref() {
        topics.push(HelpTopic {
            display: vc.spec.to_string(),
            help: vc
                .node
                .binding
                .as_ref()
                .map(|b| b.help.clone())
                .unwrap_or_default(),
            hidden: vc.node.hidden,
        });
    }
    HelpRequest {
        prefix: prefix.iter().map(|t| (*t).to_string()).collect(),
        help: node
            .binding
            .as_ref()
            .map(|b| b.help.clone())
            .unwrap_or_default(),
        topics,
    }
}

// ============================================================================
// Tests
// ============================================================================
