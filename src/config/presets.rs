//! Named presets (journal page templates) and themes

use super::merge::{merge_defaults, update_wholesale};
use serde_json::{json, Map, Value};

/// Names of the built-in presets
pub const PRESETS: &[&str] = &["ieee_single_col", "ieee_double_col", "nature_single_col"];

/// Names of the built-in themes
pub const THEMES: &[&str] = &["light", "dark"];

/// Default values for a named preset
pub fn preset(name: &str) -> Option<Map<String, Value>> {
    let value = match name {
        "ieee_single_col" => json!({
            "size": {"width": 89, "height": 67, "unit": "mm"},
            "font": {"size": 8}
        }),
        "ieee_double_col" => json!({
            "size": {"width": 183, "height": 67, "unit": "mm"},
            "font": {"size": 8}
        }),
        "nature_single_col" => json!({
            "size": {"width": 89, "height": 89, "unit": "mm"},
            "font": {"size": 9}
        }),
        _ => return None,
    };
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

/// Default values for a named theme
pub fn theme(name: &str) -> Option<Map<String, Value>> {
    let value = match name {
        "light" | "dark" => json!({"palette": "okabe_ito"}),
        _ => return None,
    };
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

/// Fill keys missing from `raw` with the defaults of its `preset`, if any.
pub fn apply_preset(raw: &mut Map<String, Value>) {
    let Some(name) = raw.get("preset").and_then(Value::as_str).map(str::to_string) else {
        return;
    };
    match preset(&name) {
        Some(defaults) => {
            tracing::debug!(preset = %name, "Applying preset defaults");
            merge_defaults(raw, &defaults);
        }
        None => tracing::warn!(preset = %name, "Unknown preset, ignoring"),
    }
}

/// Lay the user's top-level keys over the defaults of its `theme`, if any.
pub fn apply_theme(raw: Map<String, Value>) -> Map<String, Value> {
    let Some(name) = raw.get("theme").and_then(Value::as_str).map(str::to_string) else {
        return raw;
    };
    match theme(&name) {
        Some(defaults) => {
            tracing::debug!(theme = %name, "Applying theme defaults");
            update_wholesale(&defaults, raw)
        }
        None => {
            tracing::warn!(theme = %name, "Unknown theme, ignoring");
            raw
        }
    }
}
