//! Error types for the fallible edges of the crate.
//!
//! The tree engine itself never fails: lookups return `Option`, vetoes and
//! misuse are no-ops. Errors only come from decoding caller input.

use thiserror::Error;

/// Errors raised while decoding tree data or settings.
#[derive(Debug, Error)]
pub enum TreeError {
    /// Tree data JSON could not be decoded.
    #[error("invalid tree data: {0}")]
    Parse(#[source] serde_json::Error),

    /// A settings document could not be decoded.
    #[error("invalid settings: {0}")]
    Settings(#[source] serde_json::Error),

    /// A key binding in the settings is not understood.
    #[error(transparent)]
    Keymap(#[from] KeymapError),
}

/// Errors raised while parsing key bindings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeymapError {
    /// The action name does not match any [`TreeAction`](crate::keymap::TreeAction).
    #[error("unknown tree action '{0}'")]
    UnknownAction(String),

    /// The key string could not be parsed into a key combination.
    #[error("invalid key binding '{0}'")]
    InvalidKey(String),
}
