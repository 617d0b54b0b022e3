//! Error types for the fallible edges of the engine.
//!
//! The simulation itself never fails: invalid commands are ignored. Only
//! loading tuning files and touching the score store can go wrong, and both
//! report through these enums so callers can log and fall back to defaults.

use std::fmt;

/// Failure while loading or validating a [`crate::Tuning`].
#[derive(Debug)]
pub enum ConfigError {
    /// The tuning file could not be read.
    Io(std::io::Error),
    /// The tuning JSON was malformed.
    Parse(serde_json::Error),
    /// A value parsed fine but is outside its playable range.
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Human-readable description of the constraint.
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "failed to read tuning: {e}"),
            ConfigError::Parse(e) => write!(f, "malformed tuning JSON: {e}"),
            ConfigError::Invalid { field, reason } => {
                write!(f, "invalid tuning value `{field}`: {reason}")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid { .. } => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// Failure while persisting the high score board.
#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Serialize(serde_json::Error),
    /// Browser storage is missing or refused the write.
    Unavailable,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "score store I/O failed: {e}"),
            StoreError::Serialize(e) => write!(f, "could not encode high scores: {e}"),
            StoreError::Unavailable => write!(f, "score storage unavailable"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            StoreError::Serialize(e) => Some(e),
            StoreError::Unavailable => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialize(e)
    }
}
