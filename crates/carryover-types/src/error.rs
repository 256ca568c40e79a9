use thiserror::Error;

/// Errors produced by value model operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("unknown value kind: {0:?}")]
    UnknownKind(String),
}
