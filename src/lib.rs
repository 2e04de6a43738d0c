/*!
# nicefigs - declarative publication figures

Describe a multi-panel figure in YAML (or JSON, or an in-memory mapping) and let
nicefigs validate it, draw it and export it.

## Example

```yaml
size: { width: 89, height: 67, unit: mm }
preset: ieee_single_col
layout: { rows: 1, cols: 2 }
panels:
  - axes: { title: "Latency", xlabel: "ms" }
    series:
      - { type: cdf, x: latency_ms, data: runs.csv, label: "baseline" }
    overlays:
      - { type: vline, x: 20, color: red, linestyle: dashed }
      - marks/budget.yaml
export: { path: out/latency, formats: [png, svg, pdf], dpi: 300 }
```

## Architecture

The pipeline is split into explicit stages:
- [`config`] - document loading, presets/themes, overlay file expansion and typed validation
- [`style`] - unit conversion, text style merging, line styles, colors, offsets
- [`canvas`] - the in-memory scene (figure, panels, artists) every stage draws onto
- [`layer`] - the series-type registry and the built-in layers
- [`overlay`] - declarative shapes and annotations composited on a panel
- [`axes`] - ticks, spines, grid, titles/labels and the legend
- [`figure`] - grid layout and panel dispatch
- [`reader`] - tabular data sources (polars)
- [`writer`] - PNG/SVG/PDF export
*/

pub mod axes;
pub mod canvas;
pub mod config;
pub mod figure;
pub mod layer;
pub mod overlay;
pub mod reader;
pub mod style;
pub mod writer;

use std::path::PathBuf;

// Re-export key types for convenience
pub use canvas::{Figure, Panel};
pub use config::{load_config, validate, ConfigSource, FigureSpec};
pub use reader::{DataSource, ExternalData};

// DataFrame abstraction (wraps Polars)
pub use polars::prelude::DataFrame;

/// Main library error type
#[derive(thiserror::Error, Debug)]
pub enum NicefigsError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error at `{path}`: {message}")]
    Validation { path: String, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid overlay file '{path}': {message}")]
    OverlayFile { path: String, message: String },

    #[error("Plot type '{0}' is not registered")]
    LayerNotFound(String),

    #[error("Column '{column}' does not exist. Available columns: {available}")]
    ColumnNotFound { column: String, available: String },

    #[error("Data source error: {0}")]
    Data(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl NicefigsError {
    /// Shorthand for a validation error rooted at `path`
    pub fn validation(path: impl Into<String>, message: impl Into<String>) -> Self {
        NicefigsError::Validation {
            path: path.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, NicefigsError>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Where relative export paths are resolved from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportBase {
    /// The directory of the loaded config document
    #[default]
    Spec,
    /// The current working directory
    Cwd,
}

/// Options for [`render_spec`]
#[derive(Default)]
pub struct RenderOptions {
    pub export_base: ExportBase,
    pub external_data: Option<ExternalData>,
}

/// Load a config document, render it and write every requested export file.
pub fn render(config_path: impl Into<PathBuf>) -> Result<Vec<PathBuf>> {
    let spec = load_config(ConfigSource::Path(config_path.into()))?;
    render_spec(&spec, RenderOptions::default())
}

/// Render an already validated spec and export it.
///
/// Returns the paths written, one per requested format.
pub fn render_spec(spec: &FigureSpec, options: RenderOptions) -> Result<Vec<PathBuf>> {
    let base_dir = match options.export_base {
        ExportBase::Spec => spec.base_dir.clone(),
        ExportBase::Cwd => None,
    };

    let figure = figure::render_figure(spec, options.external_data.as_ref())?;
    writer::save(&figure, &spec.export, base_dir.as_deref())
}
