//! Value model for carryover.
//!
//! Documents are plain [`serde_json::Value`] trees (built with the
//! `preserve_order` feature so object keys keep their source order). This
//! crate adds the small amount of structure the merge engine needs on top of
//! that: a kind taxonomy, canonical comparison keys for composite values, and
//! dot-joined paths with raw prefix matching.
//!
//! # Key Types
//!
//! - [`ValueKind`] -- Runtime kind of a value (null, bool, number, string, list, object)
//! - [`CanonicalSet`] -- Set of canonical keys used to deduplicate list elements
//! - [`join_path`] / [`matches_pattern`] -- Dot-path construction and prefix matching

pub mod canonical;
pub mod error;
pub mod kind;
pub mod path;

pub use canonical::{canonical_key, CanonicalSet};
pub use error::TypeError;
pub use kind::ValueKind;
pub use path::{join_path, matches_pattern};

/// Re-exported so downstream crates name one JSON model.
pub use serde_json::{Map, Value};
