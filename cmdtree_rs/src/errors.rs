//! Error taxonomy, split by phase.
//!
//! Registration problems are configuration bugs: they come back as `Err`
//! and abort the offending registration without touching already-built
//! state. Dispatch problems are user input: they never surface as `Err`
//! anywhere — the matcher wraps them into a [`crate::matcher::BadCommand`]
//! payload and routes them to the bad-command handler.

use serde::Serialize;
use thiserror::Error;

/// Result type alias for registration calls.
pub type Result<T> = std::result::Result<T, RegistrationError>;

/// Errors raised while registering commands, options, or types.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistrationError {
    /// Declaration token does not parse under the token grammar, or names
    /// a type missing from the type registry.
    #[error("bad token '{token}': {reason}")]
    BadTokenFormat { token: String, reason: String },

    /// A second registration disagrees about the variable child at a tree
    /// position that already has one.
    #[error("conflicting variable after '{at}': registered {existing}, new {proposed}")]
    ConflictingVariable {
        at: String,
        existing: String,
        proposed: String,
    },

    /// The token sequence itself is unusable: an option token inside a
    /// command path, tokens after a variadic, or an empty path.
    #[error("bad command shape: {reason}")]
    BadCommandShape { reason: String },
}

/// Why a dispatch attempt failed. Carried inside the Bad outcome payload;
/// always recoverable.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum DispatchFailure {
    /// Input token could not be converted to the declared type.
    #[error("invalid value '{token}' for type {type_name}: {message}")]
    Coercion {
        type_name: String,
        token: String,
        message: String,
    },

    /// A flag token with no entry in the option table.
    #[error("unknown option '{option}'")]
    UnknownOption { option: String },

    /// No literal candidate and no variable child accepted the token.
    #[error("unknown command '{token}'")]
    UnknownToken { token: String },

    /// More than one literal child matched the token as exact-or-prefix.
    #[error("ambiguous command '{token}': matches {}", .candidates.join(", "))]
    Ambiguous {
        token: String,
        candidates: Vec<String>,
    },

    /// Input ran out at a node with no bound handler.
    #[error("incomplete command")]
    Incomplete,
}
