//! Merge engine for carryover.
//!
//! Walks a legacy ("old") JSON document against an authoritative ("new") one
//! and decides, key by key, what ends up in the result. Decisions come from a
//! [`MergeStrategy`]: ordered, prefix-matched rule tables plus handler
//! registries. Without any rules the new document wins, nested objects merge
//! recursively, and lists are unioned.
//!
//! # Key Types
//!
//! - [`MergeAction`] -- Resolution policy attached to a rule
//! - [`MergeStrategy`] -- Rule tables and handlers for one merge
//! - [`merge_documents`] / [`merge_objects`] -- Engine entry points
//! - [`MergeReport`] / [`ValueMismatch`] -- Scalar disagreements resolved in favour of new
//! - [`StrategyConfig`] -- TOML strategy files
//! - [`BuiltinHandler`] -- Handlers nameable from strategy files

pub mod action;
pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod report;
pub mod strategy;

pub use action::MergeAction;
pub use config::{CustomBinding, KindRule, PathRule, StrategyConfig, TypeHandlerBinding};
pub use document::{read_document, to_pretty_json, write_document};
pub use engine::{merge_documents, merge_objects, union_lists, MergeOutcome};
pub use error::{
    ConfigError, ConfigResult, DocumentSide, HandlerError, HandlerResult, MergeError, MergeResult,
};
pub use handlers::BuiltinHandler;
pub use report::{MergeReport, ValueMismatch};
pub use strategy::{CustomHandler, MergeStrategy, TypeHandler};
