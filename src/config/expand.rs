//! Raw preprocessing pass: overlay file expansion and `axes_defaults` folding
//!
//! Both steps operate on the raw mapping before typed validation. After
//! [`expand_overlays`] every panel's `overlays` list contains mappings only.

use super::merge::merge_defaults;
use crate::{NicefigsError, Result};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Resolve `path` against `base_dir` unless it is absolute.
pub fn resolve_path(path: impl AsRef<Path>, base_dir: Option<&Path>) -> PathBuf {
    let path = path.as_ref();
    match base_dir {
        Some(base) if path.is_relative() => base.join(path),
        _ => path.to_path_buf(),
    }
}

/// Read an overlay collection file: a top-level list of mappings.
pub fn read_overlay_file(path: &Path) -> Result<Vec<Value>> {
    let display = path.display().to_string();
    if !path.exists() {
        return Err(NicefigsError::NotFound(format!("overlay file '{}'", display)));
    }
    let text = std::fs::read_to_string(path)?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let parse_error =
        |e: &dyn std::fmt::Display| NicefigsError::Parse(format!("{}: {}", display, e));
    let parsed: Value = if is_json {
        serde_json::from_str(&text).map_err(|e| parse_error(&e))?
    } else {
        serde_yaml::from_str(&text).map_err(|e| parse_error(&e))?
    };

    let Value::Array(entries) = parsed else {
        return Err(NicefigsError::OverlayFile {
            path: display,
            message: "expected a list of overlay mappings at the top level".to_string(),
        });
    };

    for (index, entry) in entries.iter().enumerate() {
        if !entry.is_object() {
            return Err(NicefigsError::OverlayFile {
                path: display,
                message: format!("entry {} is not a mapping", index),
            });
        }
    }

    Ok(entries)
}

/// Splice overlay file references into every panel's inline overlay list.
///
/// String entries are file paths, mapping entries are kept as they are and `null`
/// entries are dropped. Values of any other shape are left for typed validation
/// to reject.
pub fn expand_overlays(raw: &mut Map<String, Value>, base_dir: Option<&Path>) -> Result<()> {
    let Some(Value::Array(panels)) = raw.get_mut("panels") else {
        return Ok(());
    };

    for panel in panels.iter_mut() {
        let Some(Value::Array(entries)) = panel.get_mut("overlays") else {
            continue;
        };

        let mut expanded = Vec::with_capacity(entries.len());
        for entry in entries.drain(..) {
            match entry {
                Value::String(reference) => {
                    let path = resolve_path(&reference, base_dir);
                    let overlays = read_overlay_file(&path)?;
                    tracing::debug!(
                        file = %path.display(),
                        count = overlays.len(),
                        "Expanded overlay file"
                    );
                    expanded.extend(overlays);
                }
                Value::Null => {}
                other => expanded.push(other),
            }
        }
        *entries = expanded;
    }

    Ok(())
}

/// Deep-merge `axes_defaults` into each panel's `axes`, the panel winning per field.
pub fn fold_axes_defaults(raw: &mut Map<String, Value>) {
    let Some(Value::Object(defaults)) = raw.get("axes_defaults").cloned() else {
        return;
    };
    let Some(Value::Array(panels)) = raw.get_mut("panels") else {
        return;
    };

    for panel in panels.iter_mut() {
        let Value::Object(panel) = panel else {
            continue;
        };
        let axes = panel
            .entry("axes")
            .or_insert_with(|| Value::Object(Map::new()));
        if axes.is_null() {
            *axes = Value::Object(Map::new());
        }
        if let Value::Object(axes) = axes {
            merge_defaults(axes, &defaults);
        }
    }
}

/// First overlay entry that is still a file reference, as `(panel, index)`
pub fn find_raw_overlay_reference(raw: &Map<String, Value>) -> Option<(usize, usize)> {
    let panels = raw.get("panels")?.as_array()?;
    panels.iter().enumerate().find_map(|(p, panel)| {
        let overlays = panel.get("overlays")?.as_array()?;
        overlays
            .iter()
            .position(Value::is_string)
            .map(|index| (p, index))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn obj(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_expand_splices_in_place() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("marks.yaml"),
            "- {type: vline, x: 1}\n- {type: hline, y: 2}\n",
        )
        .unwrap();

        let mut raw = obj(json!({"panels": [{"overlays": [
            {"type": "point", "x": 0, "y": 0},
            "marks.yaml",
            null,
            {"type": "band", "x0": 0, "x1": 1}
        ]}]}));
        expand_overlays(&mut raw, Some(dir.path())).unwrap();

        let overlays = raw["panels"][0]["overlays"].as_array().unwrap();
        let kinds: Vec<_> = overlays.iter().map(|o| o["type"].as_str().unwrap()).collect();
        assert_eq!(kinds, vec!["point", "vline", "hline", "band"]);
        assert!(find_raw_overlay_reference(&raw).is_none());
    }

    #[test]
    fn test_expand_json_collection() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("band.json");
        std::fs::write(&file, r#"[{"type": "band", "x0": 0, "x1": 1}]"#).unwrap();

        let mut raw = obj(json!({"panels": [{"overlays": [file.to_str().unwrap()]}]}));
        expand_overlays(&mut raw, None).unwrap();
        assert_eq!(raw["panels"][0]["overlays"][0]["x1"], json!(1));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let mut raw = obj(json!({"panels": [{"overlays": ["nope.yaml"]}]}));
        let err = expand_overlays(&mut raw, Some(dir.path())).unwrap_err();
        assert!(matches!(err, NicefigsError::NotFound(_)));
    }

    #[test]
    fn test_non_list_file_is_rejected() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("bad.yaml"), "type: vline\nx: 1\n").unwrap();
        let mut raw = obj(json!({"panels": [{"overlays": ["bad.yaml"]}]}));
        let err = expand_overlays(&mut raw, Some(dir.path())).unwrap_err();
        let NicefigsError::OverlayFile { path, .. } = err else {
            panic!("expected an overlay file error");
        };
        assert!(path.ends_with("bad.yaml"));
    }

    #[test]
    fn test_non_map_entry_names_index() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("mixed.yaml"), "- {type: vline, x: 1}\n- 42\n").unwrap();
        let mut raw = obj(json!({"panels": [{"overlays": ["mixed.yaml"]}]}));
        let err = expand_overlays(&mut raw, Some(dir.path())).unwrap_err();
        assert!(err.to_string().contains("entry 1"));
    }

    #[test]
    fn test_fold_axes_defaults_panel_wins() {
        let mut raw = obj(json!({
            "axes_defaults": {"grid": {"show": false, "color": "#eeeeee"}, "xlabel": "time"},
            "panels": [
                {"axes": {"grid": {"show": true}}},
                {}
            ]
        }));
        fold_axes_defaults(&mut raw);
        assert_eq!(raw["panels"][0]["axes"]["grid"]["show"], json!(true));
        assert_eq!(raw["panels"][0]["axes"]["grid"]["color"], json!("#eeeeee"));
        assert_eq!(raw["panels"][1]["axes"]["xlabel"], json!("time"));
    }

    #[test]
    fn test_find_raw_overlay_reference() {
        let raw = obj(json!({"panels": [{}, {"overlays": [{"type": "vline"}, "left.yaml"]}]}));
        assert_eq!(find_raw_overlay_reference(&raw), Some((1, 1)));
    }
}
