//! Handlers that can be named from strategy files.

use std::fmt;

use carryover_types::ValueKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::engine::union_lists;
use crate::error::{HandlerError, HandlerResult};

/// A built-in merge handler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinHandler {
    /// The new value when present and not `null`, otherwise the old value.
    PreferPresent,
    /// Always the old value.
    KeepOld,
    /// Always the new value; fails when the new value is absent.
    KeepNew,
    /// Union of two lists, new order first. An absent new value yields the
    /// old list unchanged.
    Union,
}

impl BuiltinHandler {
    /// Apply the handler to `(new, old)`.
    pub fn apply(self, new: Option<&Value>, old: &Value) -> HandlerResult {
        match self {
            Self::PreferPresent => match new {
                Some(value) if !value.is_null() => Ok(value.clone()),
                _ => Ok(old.clone()),
            },
            Self::KeepOld => Ok(old.clone()),
            Self::KeepNew => new
                .cloned()
                .ok_or_else(|| HandlerError::new("keep_new requires a new value")),
            Self::Union => match (new, old) {
                (Some(Value::Array(new_items)), Value::Array(old_items)) => {
                    Ok(Value::Array(union_lists(new_items, old_items)))
                }
                (None, Value::Array(_)) => Ok(old.clone()),
                (new, old) => Err(HandlerError::new(format!(
                    "union expects two lists, got {} and {}",
                    new.map_or("nothing".to_string(), |v| ValueKind::of(v).to_string()),
                    ValueKind::of(old)
                ))),
            },
        }
    }

    /// Name used in strategy files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PreferPresent => "prefer_present",
            Self::KeepOld => "keep_old",
            Self::KeepNew => "keep_new",
            Self::Union => "union",
        }
    }
}

impl fmt::Display for BuiltinHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prefer_present_falls_back_to_old() {
        let handler = BuiltinHandler::PreferPresent;
        assert_eq!(handler.apply(None, &json!([1, 2])).unwrap(), json!([1, 2]));
        assert_eq!(handler.apply(Some(&json!(null)), &json!("old")).unwrap(), json!("old"));
        assert_eq!(handler.apply(Some(&json!("new")), &json!("old")).unwrap(), json!("new"));
    }

    #[test]
    fn prefer_present_with_null_old_returns_new() {
        let handler = BuiltinHandler::PreferPresent;
        assert_eq!(handler.apply(Some(&json!(3)), &json!(null)).unwrap(), json!(3));
    }

    #[test]
    fn keep_old_and_keep_new() {
        assert_eq!(
            BuiltinHandler::KeepOld.apply(Some(&json!(1)), &json!(2)).unwrap(),
            json!(2)
        );
        assert_eq!(
            BuiltinHandler::KeepNew.apply(Some(&json!(1)), &json!(2)).unwrap(),
            json!(1)
        );
        assert!(BuiltinHandler::KeepNew.apply(None, &json!(2)).is_err());
    }

    #[test]
    fn union_of_lists() {
        let merged = BuiltinHandler::Union
            .apply(Some(&json!(["a", "b"])), &json!(["b", "c"]))
            .unwrap();
        assert_eq!(merged, json!(["a", "b", "c"]));
    }

    #[test]
    fn union_with_absent_new_returns_old() {
        let merged = BuiltinHandler::Union.apply(None, &json!([1])).unwrap();
        assert_eq!(merged, json!([1]));
    }

    #[test]
    fn union_rejects_non_lists() {
        let err = BuiltinHandler::Union
            .apply(Some(&json!({"a": 1})), &json!([1]))
            .unwrap_err();
        assert_eq!(err.message(), "union expects two lists, got object and list");
    }

    #[test]
    fn names_round_trip_through_serde() {
        for handler in [
            BuiltinHandler::PreferPresent,
            BuiltinHandler::KeepOld,
            BuiltinHandler::KeepNew,
            BuiltinHandler::Union,
        ] {
            let json = serde_json::to_string(&handler).unwrap();
            assert_eq!(json, format!("\"{handler}\""));
        }
    }
}
