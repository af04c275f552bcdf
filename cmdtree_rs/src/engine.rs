//! The dispatch front end.
//!
//! One `Dispatcher` owns the command tree, the option table, the type
//! registry, the help keywords, and both fallback handlers; nothing in
//! this crate lives in process-wide state. Registration takes `&mut self`
//! and dispatch takes `&self`, so the type system enforces the intended
//! lifecycle: build everything up front, then dispatch freely — from
//! several threads at once if the handlers allow it.

use std::sync::Arc;

use tracing::debug;

use crate::errors::Result;
use crate::help;
use crate::matcher::{self, BadCommand, HelpRequest, MatchOutcome};
use crate::options::{OptionEntry, OptionTable};
use crate::tree::{CommandEntry, CommandTree};
use crate::types::{ArgMap, ArgValue, TypeRegistry};

type BadCommandHandler = Box<dyn Fn(&BadCommand) -> i32 + Send + Sync>;
type HelpHandler = Box<dyn Fn(&HelpRequest) -> i32 + Send + Sync>;

pub struct Dispatcher {
    tree: CommandTree,
    options: OptionTable,
    types: TypeRegistry,
    help_keywords: Vec<String>,
    on_bad_command: BadCommandHandler,
    on_help: HelpHandler,
}

impl Dispatcher {
    /// A dispatcher with the builtin types, `?` as the help keyword, and
    /// printing fallback handlers.
    pub fn new() -> Self {
        Self {
            tree: CommandTree::new(),
            options: OptionTable::new(),
            types: TypeRegistry::new(),
            help_keywords: vec!["?".to_string()],
            on_bad_command: Box::new(help::print_bad_command),
            on_help: Box::new(help::print_help),
        }
    }

    /// Register a command path. `tokens` mixes literal words, `@name(type)`
    /// variables, and at most one trailing `@name(type)...` variadic.
    /// `defaults` is owned by this registration alone; captured arguments
    /// are merged over a copy of it on every dispatch.
    pub fn register_command<F>(
        &mut self,
        tokens: &[&str],
        handler: F,
        defaults: ArgMap,
        help: &str,
        hidden: bool,
    ) -> Result<()>
    where
        F: Fn(&ArgMap) -> i32 + Send + Sync + 'static,
    {
        self.tree
            .register(tokens, Arc::new(handler), defaults, help, hidden, &self.types)
    }

    /// Register one handler under several flag texts, e.g.
    /// `&["-v", "--verbose"]`.
    pub fn register_option<F>(
        &mut self,
        option_texts: &[&str],
        handler: F,
        defaults: ArgMap,
        help: &str,
        hidden: bool,
    ) -> Result<()>
    where
        F: Fn(&ArgMap) -> i32 + Send + Sync + 'static,
    {
        self.options
            .register(option_texts, Arc::new(handler), defaults, help, hidden)
    }

    /// Add or replace a coercion under `name`, making it legal in
    /// `@var(name)` tokens of later registrations.
    pub fn register_type<F>(&mut self, name: &str, coerce: F)
    where
        F: Fn(&str) -> std::result::Result<ArgValue, String> + Send + Sync + 'static,
    {
        self.types.register(name, coerce);
    }

    /// Replace the default `?` help trigger with a custom word set.
    pub fn set_help_keywords(&mut self, words: &[&str]) {
        self.help_keywords = words.iter().map(|w| (*w).to_string()).collect();
    }

    pub fn set_bad_command_handler<F>(&mut self, handler: F)
    where
        F: Fn(&BadCommand) -> i32 + Send + Sync + 'static,
    {
        self.on_bad_command = Box::new(handler);
    }

    pub fn set_help_handler<F>(&mut self, handler: F)
    where
        F: Fn(&HelpRequest) -> i32 + Send + Sync + 'static,
    {
        self.on_help = Box::new(handler);
    }

    /// Resolve and run one input token sequence. Returns the handler's
    /// exit code; match failures and help requests return whatever the
    /// corresponding fallback handler reports.
    pub fn dispatch(&self, tokens: &[&str]) -> i32 {
        debug!("dispatch: {:?}", tokens);
        match matcher::match_tokens(
            self.tree.root(),
            tokens,
            &self.types,
            &self.options,
            &self.help_keywords,
        ) {
            MatchOutcome::Matched(cmd) => (cmd.handler)(&cmd.args),
            MatchOutcome::Bad(bad) => {
                debug!("dispatch failed: {}", bad.failure);
                (self.on_bad_command)(&bad)
            }
            MatchOutcome::Help(request) => (self.on_help)(&request),
        }
    }

    /// Split an interactive line on whitespace and dispatch it. Blank
    /// lines are a no-op reporting 0.
    pub fn dispatch_line(&self, line: &str) -> i32 {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            return 0;
        }
        self.dispatch(&tokens)
    }

    /// Registered command paths, in registration order.
    pub fn commands(&self) -> &[CommandEntry] {
        self.tree.entries()
    }

    /// Registered options, short flags first.
    pub fn options(&self) -> Vec<OptionEntry> {
        self.options.entries()
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
