//! TOML strategy files.
//!
//! A strategy file lists rules in the order they should be matched:
//!
//! ```toml
//! exclude = ["info.weather", "history"]
//!
//! [[missing_key]]
//! pattern = "info"
//! action = "keep_old"
//!
//! [[type_mismatch]]
//! old = "number"
//! new = "string"
//! action = "keep_old"
//!
//! [[custom]]
//! pattern = "history"
//! handler = "prefer_present"
//!
//! [[type_handler]]
//! kind = "list"
//! handler = "union"
//! ```
//!
//! An exclude pattern resolves to `skip`, or to `custom` when a `[[custom]]`
//! binding exists for exactly the same pattern.

use std::path::Path;

use carryover_types::ValueKind;
use serde::{Deserialize, Serialize};

use crate::action::MergeAction;
use crate::error::{ConfigError, ConfigResult};
use crate::handlers::BuiltinHandler;
use crate::strategy::MergeStrategy;

/// Serializable description of a [`MergeStrategy`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StrategyConfig {
    /// Excluded path patterns, in match order.
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Rules for old keys missing from the new document.
    #[serde(default)]
    pub missing_key: Vec<PathRule>,
    /// Rules for keys where either side is `null`.
    #[serde(default)]
    pub none_value: Vec<PathRule>,
    /// Rules for keys whose old and new kinds differ.
    #[serde(default)]
    pub type_mismatch: Vec<KindRule>,
    /// Custom handlers bound to path patterns.
    #[serde(default)]
    pub custom: Vec<CustomBinding>,
    /// Handlers replacing default merging for a value kind.
    #[serde(default, rename = "type_handler")]
    pub type_handlers: Vec<TypeHandlerBinding>,
}

/// A path pattern and the action it resolves to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathRule {
    pub pattern: String,
    pub action: MergeAction,
}

/// A type mismatch rule for an `(old, new)` kind pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KindRule {
    pub old: ValueKind,
    pub new: ValueKind,
    pub action: MergeAction,
}

/// A built-in handler bound to a path pattern.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomBinding {
    pub pattern: String,
    pub handler: BuiltinHandler,
}

/// A built-in handler bound to a value kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeHandlerBinding {
    pub kind: ValueKind,
    pub handler: BuiltinHandler,
}

impl StrategyConfig {
    /// Parse a strategy from TOML text.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a strategy file.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Append exclude patterns after the ones already configured.
    pub fn add_excludes<I, S>(&mut self, patterns: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(patterns.into_iter().map(Into::into));
    }

    /// Build the strategy described by this configuration.
    pub fn build(&self) -> ConfigResult<MergeStrategy> {
        let mut strategy = MergeStrategy::new();

        for binding in &self.custom {
            check_pattern("custom", &binding.pattern)?;
            let handler = binding.handler;
            strategy.set_custom_handler(binding.pattern.clone(), move |new, old| {
                handler.apply(new, old)
            });
        }

        for pattern in &self.exclude {
            check_pattern("exclude", pattern)?;
            let action = if strategy.has_custom_handler_for(pattern) {
                MergeAction::Custom
            } else {
                MergeAction::Skip
            };
            strategy.set_exclude_rule(pattern.clone(), action);
        }

        for rule in &self.missing_key {
            check_pattern("missing_key", &rule.pattern)?;
            strategy.set_missing_key_rule(rule.pattern.clone(), rule.action);
        }

        for rule in &self.none_value {
            check_pattern("none_value", &rule.pattern)?;
            strategy.set_none_value_rule(rule.pattern.clone(), rule.action);
        }

        for rule in &self.type_mismatch {
            if rule.old == rule.new {
                return Err(ConfigError::InvalidRule(format!(
                    "type_mismatch rule for {} -> {} can never apply",
                    rule.old, rule.new
                )));
            }
            if rule.old == ValueKind::Null || rule.new == ValueKind::Null {
                return Err(ConfigError::InvalidRule(
                    "type_mismatch rules cannot involve null; use none_value rules".into(),
                ));
            }
            strategy.set_type_mismatch_rule(rule.old, rule.new, rule.action);
        }

        for binding in &self.type_handlers {
            if binding.kind == ValueKind::Null {
                return Err(ConfigError::InvalidRule(
                    "type_handler for null can never apply; use none_value rules".into(),
                ));
            }
            let handler = binding.handler;
            strategy.set_type_specific_handler(binding.kind, move |new, old| {
                handler.apply(Some(new), old)
            });
        }

        tracing::debug!(rules = strategy.rule_count(), "strategy built");
        Ok(strategy)
    }
}

fn check_pattern(table: &str, pattern: &str) -> ConfigResult<()> {
    if pattern.is_empty() {
        return Err(ConfigError::InvalidRule(format!(
            "{table} pattern must not be empty"
        )));
    }
    Ok(())
}
