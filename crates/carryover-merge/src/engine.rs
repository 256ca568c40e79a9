//! The recursive merge engine.
//!
//! The result starts as a copy of the new object. Each key of the old object
//! is then resolved in this order, and the first step that applies decides
//! the key:
//!
//! 1. exclude rules (only `Custom` has an effect)
//! 2. missing-key rules, when the key is absent from new
//! 3. none-value rules, when either side is `null`
//! 4. type-mismatch rules, when the kinds differ (only an unconfigured pair
//!    falls through)
//! 5. type-specific handler for the old value's kind
//! 6. default by the old value's kind: objects recurse, lists union, scalars
//!    keep new and record a mismatch
//!
//! Keys present only in the new object are never visited.

use carryover_types::{join_path, CanonicalSet, Map, Value, ValueKind};
use tracing::{debug, info, warn};

use crate::action::MergeAction;
use crate::error::{DocumentSide, MergeError, MergeResult};
use crate::report::{MergeReport, ValueMismatch};
use crate::strategy::MergeStrategy;

/// The merged document and the diagnostics gathered while producing it.
#[derive(Clone, Debug, PartialEq)]
pub struct MergeOutcome {
    /// The merged document (always an object).
    pub merged: Value,
    /// Scalar disagreements resolved in favour of the new document.
    pub report: MergeReport,
}

/// Merge the `old` document into the `new` document.
///
/// Both roots must be objects.
///
/// # Examples
///
/// ```
/// use carryover_merge::{merge_documents, MergeStrategy};
/// use serde_json::json;
///
/// let new = json!({"tags": ["a", "b"], "version": 2});
/// let old = json!({"tags": ["b", "c"], "version": 1, "stale": true});
///
/// let outcome = merge_documents(&new, &old, &MergeStrategy::new())?;
/// assert_eq!(outcome.merged, json!({"tags": ["a", "b", "c"], "version": 2}));
/// assert_eq!(outcome.report.len(), 1);
/// # Ok::<_, carryover_merge::MergeError>(())
/// ```
pub fn merge_documents(
    new: &Value,
    old: &Value,
    strategy: &MergeStrategy,
) -> MergeResult<MergeOutcome> {
    let new_map = root_object(new, DocumentSide::New)?;
    let old_map = root_object(old, DocumentSide::Old)?;

    let mut report = MergeReport::new();
    let merged = merge_level(new_map, old_map, strategy, "", &mut report)?;

    debug!(
        keys = merged.len(),
        mismatches = report.len(),
        "merge complete"
    );
    Ok(MergeOutcome {
        merged: Value::Object(merged),
        report,
    })
}

/// Merge `old` into `new` at `current_path` (empty at the root).
///
/// This is the object-level entry point used when the caller already holds
/// maps; scalar mismatches are logged but not collected.
pub fn merge_objects(
    new: &Map<String, Value>,
    old: &Map<String, Value>,
    strategy: &MergeStrategy,
    current_path: &str,
) -> MergeResult<Map<String, Value>> {
    let mut report = MergeReport::new();
    merge_level(new, old, strategy, current_path, &mut report)
}

/// Union two lists: every element of `new` in order, then each element of
/// `old` not already present, in `old`'s order.
///
/// Duplicates already inside `new` are kept; only old elements are checked.
pub fn union_lists(new: &[Value], old: &[Value]) -> Vec<Value> {
    let mut merged = new.to_vec();
    let mut seen: CanonicalSet = new.iter().collect();

    for item in old {
        if seen.insert(item) {
            merged.push(item.clone());
        }
    }
    merged
}

fn root_object(value: &Value, side: DocumentSide) -> MergeResult<&Map<String, Value>> {
    value.as_object().ok_or(MergeError::NonObjectRoot {
        side,
        found: ValueKind::of(value),
    })
}

fn merge_level(
    new: &Map<String, Value>,
    old: &Map<String, Value>,
    strategy: &MergeStrategy,
    current_path: &str,
    report: &mut MergeReport,
) -> MergeResult<Map<String, Value>> {
    let mut result = new.clone();

    for (key, old_value) in old {
        let full_path = join_path(current_path, key);

        if let Some(action) = strategy.exclude_action(&full_path) {
            if action == MergeAction::Custom {
                apply_custom(&mut result, key, &full_path, new.get(key), old_value, strategy)?;
            } else {
                debug!(path = %full_path, %action, "excluded");
            }
            continue;
        }

        let Some(new_value) = new.get(key) else {
            match strategy.missing_key_action(&full_path) {
                MergeAction::KeepOld => {
                    result.insert(key.clone(), old_value.clone());
                }
                MergeAction::Custom => {
                    apply_custom(&mut result, key, &full_path, None, old_value, strategy)?;
                }
                MergeAction::Skip | MergeAction::KeepNew | MergeAction::Merge => {
                    debug!(path = %full_path, "dropping key missing from new document");
                }
            }
            continue;
        };

        if old_value.is_null() || new_value.is_null() {
            match strategy.none_value_action(&full_path) {
                MergeAction::KeepOld => {
                    result.insert(key.clone(), old_value.clone());
                }
                MergeAction::Custom => {
                    apply_custom(&mut result, key, &full_path, Some(new_value), old_value, strategy)?;
                }
                MergeAction::Skip | MergeAction::KeepNew | MergeAction::Merge => {}
            }
            continue;
        }

        let old_kind = ValueKind::of(old_value);
        let new_kind = ValueKind::of(new_value);

        if old_kind != new_kind {
            match strategy.type_mismatch_action(old_kind, new_kind) {
                Some(MergeAction::KeepNew | MergeAction::Skip | MergeAction::Merge) => continue,
                Some(MergeAction::KeepOld) => {
                    result.insert(key.clone(), old_value.clone());
                    continue;
                }
                Some(MergeAction::Custom) => {
                    apply_custom(&mut result, key, &full_path, Some(new_value), old_value, strategy)?;
                    continue;
                }
                None => {
                    debug!(
                        path = %full_path,
                        old = %old_kind,
                        new = %new_kind,
                        "no type mismatch rule; merging by old kind"
                    );
                }
            }
        }

        if let Some(handler) = strategy.type_specific_handler(old_kind) {
            let merged =
                handler(new_value, old_value).map_err(|e| MergeError::handler(&full_path, e))?;
            result.insert(key.clone(), merged);
            continue;
        }

        match old_value {
            Value::Object(old_child) => {
                let Value::Object(new_child) = new_value else {
                    return Err(kind_mismatch(full_path, old_kind, new_kind));
                };
                let merged = merge_level(new_child, old_child, strategy, &full_path, report)?;
                result.insert(key.clone(), Value::Object(merged));
            }
            Value::Array(old_items) => {
                let Value::Array(new_items) = new_value else {
                    return Err(kind_mismatch(full_path, old_kind, new_kind));
                };
                result.insert(key.clone(), Value::Array(union_lists(new_items, old_items)));
            }
            // Nulls were resolved by the none-value rules above.
            Value::Null => {}
            scalar => {
                if scalar != new_value {
                    info!(
                        path = %full_path,
                        old = %scalar,
                        new = %new_value,
                        "value mismatch (keeping new value)"
                    );
                    report.record(ValueMismatch {
                        path: full_path,
                        old: scalar.clone(),
                        new: new_value.clone(),
                    });
                }
            }
        }
    }

    Ok(result)
}

fn apply_custom(
    result: &mut Map<String, Value>,
    key: &str,
    full_path: &str,
    new_value: Option<&Value>,
    old_value: &Value,
    strategy: &MergeStrategy,
) -> MergeResult<()> {
    let Some(handler) = strategy.custom_handler(full_path) else {
        warn!(path = %full_path, "custom action without a registered handler; key left unchanged");
        return Ok(());
    };

    let value = handler(new_value, old_value).map_err(|e| MergeError::handler(full_path, e))?;
    result.insert(key.to_string(), value);
    Ok(())
}

fn kind_mismatch(path: String, expected: ValueKind, found: ValueKind) -> MergeError {
    MergeError::KindMismatch {
        path,
        expected,
        found,
    }
}
