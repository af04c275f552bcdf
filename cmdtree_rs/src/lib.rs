//! # cmdtree
//!
//! **Trie-based command dispatch** - declarative command registration with
//! prefix matching, typed argument capture, and pluggable fallback
//! behavior, for CLIs and interactive shells.
//!
//! Commands are declared as token sequences mixing literal words with
//! typed variable placeholders. The engine indexes them in a trie and
//! resolves user input against it, so embedding programs never parse
//! their own command lines.
//!
//! ## Features
//!
//! - **Prefix dispatch** - `sh ver` resolves like `show version` when the
//!   abbreviation is unambiguous
//! - **Typed captures** - `@id(int)` coerces input (`0x1F` included) before
//!   the handler runs
//! - **Variadic tails** - `@ids(int)...` collects every remaining token
//! - **Flag table** - `-v` / `--verbose` handlers fire anywhere on the
//!   line, combinable as `-abc`
//! - **Help interception** - a configurable keyword (`?` by default) stops
//!   the walk and lists what is reachable
//! - **Replaceable fallbacks** - bad-command and help handlers are plain
//!   closures the embedding program can swap out
//!
//! ## Quick Start
//!
//! ```rust
//! use cmdtree::{ArgMap, Dispatcher};
//!
//! let mut cli = Dispatcher::new();
//! cli.register_command(
//!     &["show", "slot", "@id(int)"],
//!     |args| {
//!         println!("slot {}", args["id"]);
//!         0
//!     },
//!     ArgMap::new(),
//!     "print one inventory slot",
//!     false,
//! )
//! .unwrap();
//!
//! // Unique prefixes work like the full words.
//! assert_eq!(cli.dispatch(&["sh", "slot", "0x1F"]), 0);
//! ```
//!
//! ## Replacing the fallback handlers
//!
//! ```rust
//! use cmdtree::Dispatcher;
//!
//! let mut cli = Dispatcher::new();
//! cli.set_bad_command_handler(|bad| {
//!     eprintln!("{} (after {} good tokens)", bad.failure, bad.matched);
//!     2
//! });
//! assert_eq!(cli.dispatch(&["no", "such"]), 2);
//! ```

#![doc(html_root_url = "https://docs.rs/cmdtree/0.3.2")]

// ============================================================================
// Core Modules
// ============================================================================

/// The dispatch front end owning every registry.
///
/// Contains [`Dispatcher`], the one object an embedding program builds,
/// registers against, and dispatches through.
pub mod engine;

/// Error taxonomy: registration errors and dispatch failure reasons.
pub mod errors;

/// The matcher and its outcome payloads.
///
/// [`BadCommand`](matcher::BadCommand) and
/// [`HelpRequest`](matcher::HelpRequest) are what the replaceable
/// fallback handlers receive.
pub mod matcher;

/// The flat option table for `-x` / `--name` flag handlers.
pub mod options;

/// Declaration-token classification.
///
/// [`classify`](token::classify) turns one declaration token into a
/// [`Token`](token::Token): literal, `@name(type)` variable, or option.
pub mod token;

/// The command trie and registration walk.
pub mod tree;

/// Argument values, the type registry, and the builtin coercions.
///
/// # Key Types
///
/// - [`ArgValue`](types::ArgValue) - a captured argument (str/int/bool/list)
/// - [`ArgMap`](types::ArgMap) - name → value mapping handed to handlers
/// - [`TypeRegistry`](types::TypeRegistry) - type name → coercion function
pub mod types;

/// Default fallback handlers, callable from custom ones to delegate.
pub mod help;

// ============================================================================
// Re-exports for convenience
// ============================================================================

/// The dispatch engine.
pub use engine::Dispatcher;

/// Dispatch-time failure reasons, carried inside [`BadCommand`].
pub use errors::DispatchFailure;

/// Registration-time errors.
pub use errors::RegistrationError;

/// Result alias for registration calls.
pub use errors::Result;

/// Payload handed to the bad-command handler.
pub use matcher::BadCommand;

/// Payload handed to the help handler.
pub use matcher::HelpRequest;

/// One child listed in a help payload.
pub use matcher::HelpTopic;

/// One row of the option listing.
pub use options::OptionEntry;

/// One row of the command listing.
pub use tree::CommandEntry;

/// A bound command callback.
pub use tree::Handler;

/// Name → value mapping handed to handlers.
pub use types::ArgMap;

/// A captured argument value.
pub use types::ArgValue;

/// Type name → coercion registry.
pub use types::TypeRegistry;
