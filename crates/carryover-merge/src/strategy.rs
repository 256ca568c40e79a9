//! Rule tables and handler registries consulted by the merge engine.

use std::collections::BTreeMap;
use std::fmt;

use carryover_types::{matches_pattern, ValueKind};
use serde_json::Value;

use crate::action::MergeAction;
use crate::error::HandlerResult;

/// Handler invoked for `Custom` actions: `(new value if present, old value)`.
pub type CustomHandler = dyn Fn(Option<&Value>, &Value) -> HandlerResult + Send + Sync;

/// Handler invoked for every key whose old value has a given kind:
/// `(new value, old value)`.
pub type TypeHandler = dyn Fn(&Value, &Value) -> HandlerResult + Send + Sync;

// ---------------------------------------------------------------------------
// PatternTable
// ---------------------------------------------------------------------------

/// Ordered pattern table with first-match lookup.
struct PatternTable<T> {
    entries: Vec<(String, T)>,
}

impl<T> PatternTable<T> {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert or replace. A replaced pattern keeps its original position.
    fn set(&mut self, pattern: String, entry: T) {
        match self.entries.iter_mut().find(|(p, _)| *p == pattern) {
            Some(slot) => slot.1 = entry,
            None => self.entries.push((pattern, entry)),
        }
    }

    fn lookup(&self, path: &str) -> Option<&T> {
        self.entries
            .iter()
            .find(|(pattern, _)| matches_pattern(pattern, path))
            .map(|(_, entry)| entry)
    }

    fn patterns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(p, _)| p.as_str())
    }

    fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(p, entry)| (p.as_str(), entry))
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

// ---------------------------------------------------------------------------
// MergeStrategy
// ---------------------------------------------------------------------------

/// The rule set governing one merge.
///
/// A strategy holds independently populated tables:
///
/// | Table | Key | Default when nothing matches |
/// |-------|-----|------------------------------|
/// | exclude rules | path pattern | not excluded |
/// | missing-key rules | path pattern | [`MergeAction::Skip`] |
/// | none-value rules | path pattern | [`MergeAction::Skip`] |
/// | type-mismatch rules | `(old kind, new kind)` | none (fall through) |
/// | type-specific handlers | old kind | none |
/// | custom handlers | path pattern | none |
///
/// Pattern tables match by raw string prefix and the first registered
/// pattern wins, so registration order matters.
///
/// # Exclusion only honours `Custom`
///
/// When an exclude rule matches, the key is left exactly as the new document
/// has it **whatever action the rule carries**, unless the action is
/// [`MergeAction::Custom`], in which case the custom handler for the path
/// decides. Registering `KeepOld` under an exclude rule therefore does
/// nothing. Use a missing-key or none-value rule to pull old values in.
///
/// # Examples
///
/// ```
/// use carryover_merge::{merge_documents, MergeAction, MergeStrategy};
/// use serde_json::json;
///
/// let mut strategy = MergeStrategy::new();
/// strategy.set_exclude_rule("info.weather", MergeAction::Skip);
/// strategy.set_missing_key_rule("info", MergeAction::KeepOld);
///
/// let new = json!({"info": {"weather": "sun"}});
/// let old = json!({"info": {"weather": "rain", "mood": "calm"}});
/// let outcome = merge_documents(&new, &old, &strategy)?;
/// assert_eq!(outcome.merged, json!({"info": {"weather": "sun", "mood": "calm"}}));
/// # Ok::<_, carryover_merge::MergeError>(())
/// ```
pub struct MergeStrategy {
    exclude_rules: PatternTable<MergeAction>,
    missing_key_rules: PatternTable<MergeAction>,
    none_value_rules: PatternTable<MergeAction>,
    type_mismatch_rules: BTreeMap<(ValueKind, ValueKind), MergeAction>,
    type_handlers: BTreeMap<ValueKind, Box<TypeHandler>>,
    custom_handlers: PatternTable<Box<CustomHandler>>,
}

impl MergeStrategy {
    /// Create a strategy with empty tables.
    pub fn new() -> Self {
        Self {
            exclude_rules: PatternTable::new(),
            missing_key_rules: PatternTable::new(),
            none_value_rules: PatternTable::new(),
            type_mismatch_rules: BTreeMap::new(),
            type_handlers: BTreeMap::new(),
            custom_handlers: PatternTable::new(),
        }
    }

    /// Exclude paths starting with `pattern`. See the type-level docs for
    /// which actions have an effect.
    pub fn set_exclude_rule(&mut self, pattern: impl Into<String>, action: MergeAction) {
        self.exclude_rules.set(pattern.into(), action);
    }

    /// Decide what happens to old keys absent from the new document.
    pub fn set_missing_key_rule(&mut self, pattern: impl Into<String>, action: MergeAction) {
        self.missing_key_rules.set(pattern.into(), action);
    }

    /// Decide what happens when either side of a key is `null`.
    pub fn set_none_value_rule(&mut self, pattern: impl Into<String>, action: MergeAction) {
        self.none_value_rules.set(pattern.into(), action);
    }

    /// Decide what happens when the old and new values have different kinds.
    pub fn set_type_mismatch_rule(
        &mut self,
        old_kind: ValueKind,
        new_kind: ValueKind,
        action: MergeAction,
    ) {
        self.type_mismatch_rules.insert((old_kind, new_kind), action);
    }

    /// Replace default merging for every key whose old value has `kind`.
    pub fn set_type_specific_handler<F>(&mut self, kind: ValueKind, handler: F)
    where
        F: Fn(&Value, &Value) -> HandlerResult + Send + Sync + 'static,
    {
        self.type_handlers.insert(kind, Box::new(handler));
    }

    /// Register the handler used by `Custom` actions on paths starting with
    /// `pattern`.
    pub fn set_custom_handler<F>(&mut self, pattern: impl Into<String>, handler: F)
    where
        F: Fn(Option<&Value>, &Value) -> HandlerResult + Send + Sync + 'static,
    {
        self.custom_handlers.set(pattern.into(), Box::new(handler));
    }

    /// Exclude action for `path`, if any exclude pattern matches.
    pub fn exclude_action(&self, path: &str) -> Option<MergeAction> {
        self.exclude_rules.lookup(path).copied()
    }

    /// Missing-key action for `path` (default [`MergeAction::Skip`]).
    pub fn missing_key_action(&self, path: &str) -> MergeAction {
        self.missing_key_rules
            .lookup(path)
            .copied()
            .unwrap_or(MergeAction::Skip)
    }

    /// None-value action for `path` (default [`MergeAction::Skip`]).
    pub fn none_value_action(&self, path: &str) -> MergeAction {
        self.none_value_rules
            .lookup(path)
            .copied()
            .unwrap_or(MergeAction::Skip)
    }

    /// Type mismatch action for an `(old, new)` kind pair, if configured.
    pub fn type_mismatch_action(
        &self,
        old_kind: ValueKind,
        new_kind: ValueKind,
    ) -> Option<MergeAction> {
        self.type_mismatch_rules.get(&(old_kind, new_kind)).copied()
    }

    /// Type-specific handler for `kind`, if registered.
    pub fn type_specific_handler(&self, kind: ValueKind) -> Option<&TypeHandler> {
        self.type_handlers.get(&kind).map(|h| h.as_ref())
    }

    /// Custom handler for `path`, if any custom pattern matches.
    pub fn custom_handler(&self, path: &str) -> Option<&CustomHandler> {
        self.custom_handlers.lookup(path).map(|h| h.as_ref())
    }

    /// Returns `true` if a custom handler is registered for exactly `pattern`.
    pub fn has_custom_handler_for(&self, pattern: &str) -> bool {
        self.custom_handlers.patterns().any(|p| p == pattern)
    }

    /// Exclude rules as registered, in registration order.
    ///
    /// Unlike [`exclude_action`](Self::exclude_action) this yields each
    /// pattern's own action, not the first prefix match.
    pub fn exclude_rules(&self) -> impl Iterator<Item = (&str, MergeAction)> {
        self.exclude_rules.iter().map(|(p, a)| (p, *a))
    }

    /// Missing-key rules as registered, in registration order.
    pub fn missing_key_rules(&self) -> impl Iterator<Item = (&str, MergeAction)> {
        self.missing_key_rules.iter().map(|(p, a)| (p, *a))
    }

    /// None-value rules as registered, in registration order.
    pub fn none_value_rules(&self) -> impl Iterator<Item = (&str, MergeAction)> {
        self.none_value_rules.iter().map(|(p, a)| (p, *a))
    }

    /// Type mismatch rules as `(old kind, new kind, action)`, ordered by kind pair.
    pub fn type_mismatch_rules(
        &self,
    ) -> impl Iterator<Item = (ValueKind, ValueKind, MergeAction)> + '_ {
        self.type_mismatch_rules
            .iter()
            .map(|(&(old, new), &action)| (old, new, action))
    }

    /// Total number of registered rules and handlers.
    pub fn rule_count(&self) -> usize {
        self.exclude_rules.len()
            + self.missing_key_rules.len()
            + self.none_value_rules.len()
            + self.type_mismatch_rules.len()
            + self.type_handlers.len()
            + self.custom_handlers.len()
    }

    /// Returns `true` if no rules or handlers are registered.
    pub fn is_empty(&self) -> bool {
        self.rule_count() == 0
    }
}

impl Default for MergeStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MergeStrategy")
            .field("exclude_rules", &self.exclude_rules.entries)
            .field("missing_key_rules", &self.missing_key_rules.entries)
            .field("none_value_rules", &self.none_value_rules.entries)
            .field("type_mismatch_rules", &self.type_mismatch_rules)
            .field("type_handlers", &self.type_handlers.keys().collect::<Vec<_>>())
            .field(
                "custom_handlers",
                &self.custom_handlers.patterns().collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_strategy_defaults() {
        let strategy = MergeStrategy::new();
        assert!(strategy.is_empty());
        assert_eq!(strategy.exclude_action("a"), None);
        assert_eq!(strategy.missing_key_action("a"), MergeAction::Skip);
        assert_eq!(strategy.none_value_action("a"), MergeAction::Skip);
        assert_eq!(
            strategy.type_mismatch_action(ValueKind::Number, ValueKind::String),
            None
        );
        assert!(strategy.type_specific_handler(ValueKind::List).is_none());
        assert!(strategy.custom_handler("a").is_none());
    }

    #[test]
    fn first_registered_pattern_wins() {
        let mut strategy = MergeStrategy::new();
        strategy.set_missing_key_rule("info", MergeAction::KeepOld);
        strategy.set_missing_key_rule("info.weather", MergeAction::Custom);
        assert_eq!(strategy.missing_key_action("info.weather"), MergeAction::KeepOld);
    }

    #[test]
    fn more_specific_pattern_first_wins() {
        let mut strategy = MergeStrategy::new();
        strategy.set_missing_key_rule("info.weather", MergeAction::Custom);
        strategy.set_missing_key_rule("info", MergeAction::KeepOld);
        assert_eq!(strategy.missing_key_action("info.weather"), MergeAction::Custom);
        assert_eq!(strategy.missing_key_action("info.mood"), MergeAction::KeepOld);
    }

    #[test]
    fn reregistering_keeps_position() {
        let mut strategy = MergeStrategy::new();
        strategy.set_none_value_rule("a", MergeAction::KeepNew);
        strategy.set_none_value_rule("a.b", MergeAction::Custom);
        strategy.set_none_value_rule("a", MergeAction::KeepOld);
        assert_eq!(strategy.none_value_action("a.b"), MergeAction::KeepOld);
        assert_eq!(strategy.rule_count(), 2);
    }

    #[test]
    fn prefix_match_crosses_segment_boundary() {
        let mut strategy = MergeStrategy::new();
        strategy.set_exclude_rule("info", MergeAction::Skip);
        assert_eq!(
            strategy.exclude_action("information.x"),
            Some(MergeAction::Skip)
        );
        assert_eq!(strategy.exclude_action("inf"), None);
    }

    #[test]
    fn type_mismatch_is_keyed_by_ordered_pair() {
        let mut strategy = MergeStrategy::new();
        strategy.set_type_mismatch_rule(ValueKind::Number, ValueKind::String, MergeAction::KeepOld);
        assert_eq!(
            strategy.type_mismatch_action(ValueKind::Number, ValueKind::String),
            Some(MergeAction::KeepOld)
        );
        assert_eq!(
            strategy.type_mismatch_action(ValueKind::String, ValueKind::Number),
            None
        );
    }

    #[test]
    fn handlers_are_callable() {
        let mut strategy = MergeStrategy::new();
        strategy.set_custom_handler("history", |new, old| {
            Ok(new.cloned().unwrap_or_else(|| old.clone()))
        });
        strategy.set_type_specific_handler(ValueKind::Number, |_new, old| Ok(old.clone()));

        let custom = strategy.custom_handler("history.items").unwrap();
        assert_eq!(custom(None, &json!([1])).unwrap(), json!([1]));

        let typed = strategy.type_specific_handler(ValueKind::Number).unwrap();
        assert_eq!(typed(&json!(2), &json!(1)).unwrap(), json!(1));

        assert!(strategy.has_custom_handler_for("history"));
        assert!(!strategy.has_custom_handler_for("hist"));
    }

    #[test]
    fn exclude_rules_in_order() {
        let mut strategy = MergeStrategy::new();
        strategy.set_exclude_rule("b", MergeAction::Skip);
        strategy.set_exclude_rule("a", MergeAction::Skip);
        let patterns: Vec<&str> = strategy.exclude_rules().map(|(p, _)| p).collect();
        assert_eq!(patterns, ["b", "a"]);
    }

    #[test]
    fn exclude_rules_report_own_action_not_prefix_match() {
        let mut strategy = MergeStrategy::new();
        strategy.set_exclude_rule("info", MergeAction::Skip);
        strategy.set_exclude_rule("info.weather", MergeAction::Custom);
        assert_eq!(strategy.exclude_action("info.weather"), Some(MergeAction::Skip));
        assert_eq!(
            strategy.exclude_rules().collect::<Vec<_>>(),
            [("info", MergeAction::Skip), ("info.weather", MergeAction::Custom)]
        );
    }

    #[test]
    fn rule_tables_are_listed() {
        let mut strategy = MergeStrategy::new();
        strategy.set_missing_key_rule("user", MergeAction::KeepOld);
        strategy.set_none_value_rule("token", MergeAction::Custom);
        strategy.set_type_mismatch_rule(ValueKind::String, ValueKind::Number, MergeAction::KeepOld);
        strategy.set_type_mismatch_rule(ValueKind::Number, ValueKind::String, MergeAction::KeepNew);

        assert_eq!(
            strategy.missing_key_rules().collect::<Vec<_>>(),
            [("user", MergeAction::KeepOld)]
        );
        assert_eq!(
            strategy.none_value_rules().collect::<Vec<_>>(),
            [("token", MergeAction::Custom)]
        );
        assert_eq!(
            strategy.type_mismatch_rules().collect::<Vec<_>>(),
            [
                (ValueKind::Number, ValueKind::String, MergeAction::KeepNew),
                (ValueKind::String, ValueKind::Number, MergeAction::KeepOld),
            ]
        );
    }

    #[test]
    fn strategy_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MergeStrategy>();
    }

    #[test]
    fn debug_lists_patterns() {
        let mut strategy = MergeStrategy::new();
        strategy.set_custom_handler("history", |_new, old| Ok(old.clone()));
        let rendered = format!("{strategy:?}");
        assert!(rendered.contains("history"));
    }
}
