//! Error types for the merge crate.

use std::fmt;
use std::path::PathBuf;

use carryover_types::ValueKind;

/// Which input document an error refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentSide {
    Old,
    New,
}

impl fmt::Display for DocumentSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Old => write!(f, "old"),
            Self::New => write!(f, "new"),
        }
    }
}

/// Failure reported by a custom or type-specific handler.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    /// Create a handler error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Result returned by merge handlers.
pub type HandlerResult = Result<serde_json::Value, HandlerError>;

/// Errors that can occur while merging documents.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// A document root was not a JSON object.
    #[error("{side} document root must be an object, got {found}")]
    NonObjectRoot { side: DocumentSide, found: ValueKind },

    /// Default merging reached a key whose new value cannot take the old
    /// value's merge semantics (no type mismatch rule was configured).
    #[error("cannot merge '{path}': old value is {expected} but new value is {found}")]
    KindMismatch {
        path: String,
        expected: ValueKind,
        found: ValueKind,
    },

    /// A registered handler failed.
    #[error("handler failed at '{path}': {source}")]
    Handler {
        path: String,
        #[source]
        source: HandlerError,
    },

    /// A document could not be read or written.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A document is not valid JSON.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The merged document could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl MergeError {
    /// Wrap a handler failure with the path it occurred at.
    pub fn handler(path: impl Into<String>, source: HandlerError) -> Self {
        Self::Handler {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias for merge results.
pub type MergeResult<T> = Result<T, MergeError>;

/// Errors produced while loading a strategy file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The strategy file could not be read.
    #[error("failed to read strategy file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The strategy file is not valid TOML or has unexpected fields.
    #[error("invalid strategy file: {0}")]
    Toml(#[from] toml::de::Error),

    /// A rule is well-formed but can never apply.
    #[error("invalid rule: {0}")]
    InvalidRule(String),
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_object_root_names_side_and_kind() {
        let err = MergeError::NonObjectRoot {
            side: DocumentSide::Old,
            found: ValueKind::List,
        };
        assert_eq!(err.to_string(), "old document root must be an object, got list");
    }

    #[test]
    fn handler_error_carries_path() {
        let err = MergeError::handler("info.history", HandlerError::new("boom"));
        assert_eq!(err.to_string(), "handler failed at 'info.history': boom");
    }

    #[test]
    fn kind_mismatch_message() {
        let err = MergeError::KindMismatch {
            path: "a".into(),
            expected: ValueKind::Object,
            found: ValueKind::Number,
        };
        assert_eq!(
            err.to_string(),
            "cannot merge 'a': old value is object but new value is number"
        );
    }
}
