//! The two merge flavours used while preprocessing a raw document
//!
//! Presets and `axes_defaults` fill in missing keys recursively, so the user's value
//! wins at every leaf. Themes are applied the other way around: the theme mapping
//! is updated with the user's top-level keys, each replacing the theme value whole.

use serde_json::{Map, Value};

/// Recursively add keys from `defaults` that `target` does not define.
///
/// Nested mappings present on both sides are merged key by key; any other value
/// already in `target` (scalars, lists, `null`) is kept untouched.
pub fn merge_defaults(target: &mut Map<String, Value>, defaults: &Map<String, Value>) {
    for (key, default) in defaults {
        match target.get_mut(key) {
            None => {
                target.insert(key.clone(), default.clone());
            }
            Some(Value::Object(existing)) => {
                if let Value::Object(nested) = default {
                    merge_defaults(existing, nested);
                }
            }
            Some(_) => {}
        }
    }
}

/// Start from `defaults` and overwrite each top-level key the user supplied.
pub fn update_wholesale(
    defaults: &Map<String, Value>,
    user: Map<String, Value>,
) -> Map<String, Value> {
    let mut merged = defaults.clone();
    for (key, value) in user {
        merged.insert(key, value);
    }
    merged
}
