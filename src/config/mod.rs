//! Configuration loading and validation
//!
//! Loading is an explicit two-pass pipeline:
//!
//! 1. raw preprocessing on a `serde_json::Value` mapping: preset defaults, theme
//!    defaults, overlay file expansion, `axes_defaults` folding
//! 2. typed validation into [`FigureSpec`] via serde, with the failing field path
//!    reported through `serde_path_to_error`

pub mod expand;
pub mod merge;
pub mod models;
pub mod overrides;
pub mod presets;
pub mod text;

pub use models::*;
pub use overrides::{apply_overrides, parse_override};
pub use text::{OffsetUnit, TextLike, TextSpec, TextStyleSpec};

use crate::{NicefigsError, Result};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Where a configuration document comes from
#[derive(Debug, Clone)]
pub enum ConfigSource {
    /// A YAML or JSON document on disk
    Path(PathBuf),
    /// An in-memory mapping, with an optional base directory for relative paths
    Value {
        raw: Value,
        base_dir: Option<PathBuf>,
    },
}

impl From<PathBuf> for ConfigSource {
    fn from(path: PathBuf) -> Self {
        ConfigSource::Path(path)
    }
}

impl From<&Path> for ConfigSource {
    fn from(path: &Path) -> Self {
        ConfigSource::Path(path.to_path_buf())
    }
}

impl From<Value> for ConfigSource {
    fn from(raw: Value) -> Self {
        ConfigSource::Value { raw, base_dir: None }
    }
}

/// Load, preprocess and validate a configuration into a [`FigureSpec`].
pub fn load_config(source: impl Into<ConfigSource>) -> Result<FigureSpec> {
    match source.into() {
        ConfigSource::Path(path) => {
            let (raw, base_dir) = read_document(&path)?;
            validate(raw, Some(&base_dir))
        }
        ConfigSource::Value { raw, base_dir } => validate(raw, base_dir.as_deref()),
    }
}

/// Parse a document into a raw mapping, returning it with its absolute directory.
pub fn read_document(path: &Path) -> Result<(Value, PathBuf)> {
    if !path.exists() {
        return Err(NicefigsError::NotFound(format!(
            "config file '{}'",
            path.display()
        )));
    }
    let text = std::fs::read_to_string(path)?;
    let raw = parse_document(&text, path)?;

    let absolute = std::path::absolute(path)?;
    let base_dir = absolute
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    tracing::debug!(
        config = %path.display(),
        base_dir = %base_dir.display(),
        "Loaded config document"
    );
    Ok((raw, base_dir))
}

fn parse_document(text: &str, path: &Path) -> Result<Value> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let parse_error =
        |e: &dyn std::fmt::Display| NicefigsError::Parse(format!("{}: {}", path.display(), e));

    if is_json {
        serde_json::from_str(text).map_err(|e| parse_error(&e))
    } else {
        serde_yaml::from_str(text).map_err(|e| parse_error(&e))
    }
}

/// Run the preprocessing and typed validation passes on an in-memory mapping.
///
/// `base_dir` resolves relative overlay paths and is recorded on the spec; when it
/// is `None` a `base_dir` already present in `raw` is kept.
pub fn validate(raw: Value, base_dir: Option<&Path>) -> Result<FigureSpec> {
    let Value::Object(raw) = raw else {
        return Err(NicefigsError::Parse(
            "configuration must be a mapping at the top level".to_string(),
        ));
    };

    let base_dir = base_dir.map(Path::to_path_buf).or_else(|| {
        raw.get("base_dir")
            .and_then(Value::as_str)
            .map(PathBuf::from)
    });

    let raw = preprocess(raw, base_dir.as_deref())?;
    let mut spec = typed(raw)?;
    spec.base_dir = base_dir;
    check_constraints(&spec)?;
    Ok(spec)
}

/// Raw pass: presets, themes, overlay files, axes defaults.
pub fn preprocess(
    mut raw: Map<String, Value>,
    base_dir: Option<&Path>,
) -> Result<Map<String, Value>> {
    presets::apply_preset(&mut raw);
    let mut raw = presets::apply_theme(raw);
    expand::expand_overlays(&mut raw, base_dir)?;
    expand::fold_axes_defaults(&mut raw);
    Ok(raw)
}

/// Typed pass: coerce a preprocessed mapping into a [`FigureSpec`].
pub fn typed(raw: Map<String, Value>) -> Result<FigureSpec> {
    if let Some((panel, index)) = expand::find_raw_overlay_reference(&raw) {
        return Err(NicefigsError::validation(
            format!("panels[{}].overlays[{}]", panel, index),
            "overlay file reference was not expanded before validation",
        ));
    }

    serde_path_to_error::deserialize(Value::Object(raw)).map_err(|err| {
        let path = err.path().to_string();
        NicefigsError::validation(path, err.into_inner().to_string())
    })
}

fn check_constraints(spec: &FigureSpec) -> Result<()> {
    if !(spec.size.width > 0.0 && spec.size.height > 0.0) {
        return Err(NicefigsError::validation(
            "size",
            format!(
                "width and height must be positive, got {}x{}",
                spec.size.width, spec.size.height
            ),
        ));
    }
    if spec.layout.rows == 0 || spec.layout.cols == 0 {
        return Err(NicefigsError::validation(
            "layout",
            "rows and cols must be at least 1",
        ));
    }
    if spec.panels.len() > spec.layout.slots() {
        return Err(NicefigsError::validation(
            "panels",
            format!(
                "{} panels do not fit a {}x{} grid",
                spec.panels.len(),
                spec.layout.rows,
                spec.layout.cols
            ),
        ));
    }
    if spec.export.formats.is_empty() {
        return Err(NicefigsError::validation(
            "export.formats",
            "at least one export format is required",
        ));
    }
    if spec.export.dpi == 0 {
        return Err(NicefigsError::validation("export.dpi", "dpi must be positive"));
    }

    for (p, panel) in spec.panels.iter().enumerate() {
        for (axis, ticks) in [("xticks", &panel.axes.xticks), ("yticks", &panel.axes.yticks)] {
            if let Some(range) = &ticks.range {
                let valid = range.len() == 3 && range[2] > 0.0;
                if !valid {
                    return Err(NicefigsError::validation(
                        format!("panels[{}].axes.{}.range", p, axis),
                        "expected [min, max, step] with a positive step",
                    ));
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn minimal() -> Value {
        json!({
            "size": {"width": 4, "height": 3},
            "panels": [{"series": [{"type": "line", "x": "t", "y": "v"}]}]
        })
    }

    #[test]
    fn test_validate_minimal() {
        let spec = validate(minimal(), None).unwrap();
        assert_eq!(spec.panels.len(), 1);
        assert_eq!(spec.panels[0].series[0].kind, SeriesKind::Line);
        assert!(spec.base_dir.is_none());
    }

    #[test]
    fn test_validate_is_idempotent() {
        let raw = json!({
            "size": {"width": 89, "height": 67, "unit": "mm"},
            "preset": "ieee_single_col",
            "theme": "light",
            "layout": {"rows": 1, "cols": 2, "wspace": 0.3},
            "axes_defaults": {"grid": {"show": false}, "xlabel": {"text": "t", "dy": -0.05}},
            "panels": [
                {"axes": {"title": "A", "limits": {"x": [0, 10]}},
                 "series": [{"type": "cdf", "x": "v", "label": "run"}],
                 "overlays": [{"type": "band", "x0": 1, "x1": 2, "ymax_frac": 0.5}]},
                {"axes": {"legend": {"labels": ["a", null]}}}
            ],
            "export": {"path": "out/fig", "formats": ["png", "svg"], "metadata": {"Title": "x"}}
        });
        let dir = tempdir().unwrap();
        let spec = validate(raw, Some(dir.path())).unwrap();
        let again = validate(spec.as_raw(), None).unwrap();
        assert_eq!(again, spec);
    }

    #[test]
    fn test_unknown_field_reports_path() {
        let mut raw = minimal();
        raw["panels"][0]["axes"] = json!({"xscale": "cubic"});
        let err = validate(raw, None).unwrap_err();
        let NicefigsError::Validation { path, message } = err else {
            panic!("expected a validation error");
        };
        assert_eq!(path, "panels[0].axes.xscale");
        assert!(message.contains("cubic"));
    }

    #[test]
    fn test_misspelled_key_is_rejected() {
        let mut raw = minimal();
        raw["exprot"] = json!({});
        assert!(matches!(
            validate(raw, None),
            Err(NicefigsError::Validation { .. })
        ));
    }

    #[test]
    fn test_too_many_panels() {
        let mut raw = minimal();
        raw["layout"] = json!({"rows": 1, "cols": 1});
        raw["panels"] = json!([{}, {}]);
        let err = validate(raw, None).unwrap_err();
        assert!(err.to_string().contains("panels"));
    }

    #[test]
    fn test_constraint_violations() {
        let mut raw = minimal();
        raw["export"] = json!({"formats": []});
        assert!(validate(raw, None).is_err());

        let mut raw = minimal();
        raw["size"]["width"] = json!(0);
        assert!(validate(raw, None).is_err());

        let mut raw = minimal();
        raw["panels"][0]["axes"] = json!({"xticks": {"range": [0, 1]}});
        let err = validate(raw, None).unwrap_err();
        assert!(err.to_string().contains("panels[0].axes.xticks.range"));
    }

    #[test]
    fn test_raw_overlay_reference_is_rejected_by_typed_pass() {
        let raw = json!({
            "size": {"width": 4, "height": 3},
            "panels": [{"overlays": ["band.yaml"]}]
        });
        let Value::Object(raw) = raw else { unreachable!() };
        let err = typed(raw).unwrap_err();
        assert!(err.to_string().contains("panels[0].overlays[0]"));
    }

    #[test]
    fn test_load_yaml_document_expands_overlays() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("band.yaml"), "[{type: band, x0: 0, x1: 1}]\n").unwrap();
        let config = dir.path().join("fig.yaml");
        std::fs::write(
            &config,
            "size: {width: 4, height: 3}\npanels:\n  - overlays: [band.yaml]\n",
        )
        .unwrap();

        let spec = load_config(config.as_path()).unwrap();
        let overlays = spec.panels[0].overlays.as_ref().unwrap();
        assert_eq!(overlays.len(), 1);
        assert_eq!(overlays[0].kind, OverlayKind::Band);
        assert_eq!(overlays[0].x0, Some(0.0));
        assert_eq!(overlays[0].x1, Some(1.0));
        assert_eq!(
            spec.base_dir.as_deref(),
            Some(std::path::absolute(dir.path()).unwrap().as_path())
        );
    }

    #[test]
    fn test_load_json_document() {
        let dir = tempdir().unwrap();
        let config = dir.path().join("fig.json");
        std::fs::write(&config, minimal().to_string()).unwrap();
        let spec = load_config(config.as_path()).unwrap();
        assert_eq!(spec.size.width, 4.0);
    }

    #[test]
    fn test_malformed_document_is_parse_error() {
        let dir = tempdir().unwrap();
        let config = dir.path().join("fig.yaml");
        std::fs::write(&config, "size: {width: 4\n").unwrap();
        assert!(matches!(
            load_config(config.as_path()),
            Err(NicefigsError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_document_is_not_found() {
        let err = load_config(PathBuf::from("/definitely/not/here.yaml")).unwrap_err();
        assert!(matches!(err, NicefigsError::NotFound(_)));
    }

    #[test]
    fn test_preset_merge_scenario() {
        let raw = json!({
            "preset": "ieee_single_col",
            "font": {"size": 10},
            "panels": []
        });
        let spec = validate(raw, None).unwrap();
        assert_eq!(spec.size.width, 89.0);
        assert_eq!(spec.size.unit, SizeUnit::Mm);
        assert_eq!(spec.font.size, 10.0);
    }

    #[test]
    fn test_theme_merge_scenario() {
        let mut raw = minimal();
        raw["theme"] = json!("light");
        raw["palette"] = json!("custom");
        let spec = validate(raw, None).unwrap();
        assert_eq!(spec.palette.as_deref(), Some("custom"));
    }
}
