//! Canonical comparison keys for JSON values.
//!
//! A canonical key is compact JSON with object keys emitted in sorted order,
//! so two values that differ only in key order produce the same key. Keys are
//! comparison surrogates only and are never written to output.

use std::collections::HashSet;

use serde_json::Value;

/// Compute the canonical key of `value`.
pub fn canonical_key(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));

            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(item, out);
            }
            out.push('}');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// A set of canonical keys, used to union lists without duplicates.
#[derive(Clone, Debug, Default)]
pub struct CanonicalSet {
    seen: HashSet<String>,
}

impl CanonicalSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `value`, returning `true` if no equal value was present.
    pub fn insert(&mut self, value: &Value) -> bool {
        self.seen.insert(canonical_key(value))
    }

    /// Number of distinct values.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Returns `true` if nothing has been inserted.
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

impl<'a> FromIterator<&'a Value> for CanonicalSet {
    fn from_iter<I: IntoIterator<Item = &'a Value>>(iter: I) -> Self {
        let mut set = Self::new();
        for value in iter {
            set.insert(value);
        }
        set
    }
}
