//! Typed figure specification
//!
//! The full declarative schema: figure size and fonts, grid layout, panels with
//! their axes, series and overlays, and export instructions. Values are produced
//! by [`crate::config::validate`] from a preprocessed raw mapping; every struct
//! is `Serialize` so a validated spec can be turned back into raw form.
//!
//! Units: `Size::unit` (`in`, `mm`, `pt`) also governs `points`-mode text
//! offsets. Line styles accept aliases (`dashed`, `--`, `dash`, ...) that are
//! normalized when drawing.

use super::text::{TextLike, TextStyleSpec};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

// =============================================================================
// Figure-level types
// =============================================================================

/// Canvas size unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeUnit {
    #[default]
    In,
    Mm,
    Pt,
}

impl std::fmt::Display for SizeUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SizeUnit::In => "in",
            SizeUnit::Mm => "mm",
            SizeUnit::Pt => "pt",
        };
        write!(f, "{}", s)
    }
}

/// Canvas size of the exported figure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Size {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub unit: SizeUnit,
}

fn default_family() -> String {
    "serif".to_string()
}
fn default_font_size() -> f64 {
    9.0
}
fn default_normal() -> String {
    "normal".to_string()
}
fn default_true() -> bool {
    true
}
fn default_preamble() -> Option<String> {
    Some(r"\usepackage{amsmath}".to_string())
}

/// Global font defaults merged into all text unless overridden
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FontSpec {
    #[serde(default = "default_family")]
    pub family: String,
    #[serde(default = "default_font_size")]
    pub size: f64,
    #[serde(default = "default_normal")]
    pub weight: String,
    #[serde(default = "default_normal")]
    pub style: String,
    #[serde(default = "default_true")]
    pub use_tex: bool,
    #[serde(default = "default_preamble")]
    pub latex_preamble: Option<String>,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            family: default_family(),
            size: default_font_size(),
            weight: default_normal(),
            style: default_normal(),
            use_tex: true,
            latex_preamble: default_preamble(),
        }
    }
}

fn default_one() -> usize {
    1
}

/// Grid layout for all panels
///
/// `wspace`/`hspace` are fractions of the average panel width/height. When either
/// is unset, spacing is computed automatically and the set one (if any) overrides
/// its axis afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayoutSpec {
    #[serde(default = "default_one")]
    pub rows: usize,
    #[serde(default = "default_one")]
    pub cols: usize,
    #[serde(default)]
    pub wspace: Option<f64>,
    #[serde(default)]
    pub hspace: Option<f64>,
    #[serde(default)]
    pub shared_x: bool,
    #[serde(default)]
    pub shared_y: bool,
}

impl Default for LayoutSpec {
    fn default() -> Self {
        Self {
            rows: 1,
            cols: 1,
            wspace: None,
            hspace: None,
            shared_x: false,
            shared_y: false,
        }
    }
}

impl LayoutSpec {
    pub fn slots(&self) -> usize {
        self.rows * self.cols
    }

    /// Automatic spacing governs the figure unless both values are fixed
    pub fn is_constrained(&self) -> bool {
        self.wspace.is_none() || self.hspace.is_none()
    }
}

/// Export file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    Svg,
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Svg => "svg",
            ExportFormat::Pdf => "pdf",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

fn default_export_path() -> String {
    "figure.png".to_string()
}
fn default_dpi() -> u32 {
    300
}
fn default_formats() -> Vec<ExportFormat> {
    vec![ExportFormat::Png]
}

/// Export options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExportSpec {
    #[serde(default = "default_export_path")]
    pub path: String,
    #[serde(default = "default_dpi")]
    pub dpi: u32,
    #[serde(default = "default_formats")]
    pub formats: Vec<ExportFormat>,
    #[serde(default = "default_true")]
    pub tight_layout: bool,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl Default for ExportSpec {
    fn default() -> Self {
        Self {
            path: default_export_path(),
            dpi: default_dpi(),
            formats: default_formats(),
            tight_layout: true,
            metadata: BTreeMap::new(),
        }
    }
}

fn default_palette() -> Option<String> {
    Some("okabe_ito".to_string())
}

/// Top-level figure specification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FigureSpec {
    pub size: Size,
    #[serde(default)]
    pub font: FontSpec,
    #[serde(default)]
    pub layout: LayoutSpec,
    pub panels: Vec<PanelSpec>,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub preset: Option<String>,
    #[serde(default = "default_palette")]
    pub palette: Option<String>,
    #[serde(default)]
    pub export: ExportSpec,
    /// Defaults folded into every panel's axes at load time
    #[serde(default)]
    pub axes_defaults: Option<AxesSpec>,
    /// Absolute directory of the loaded document, used for relative paths
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_dir: Option<PathBuf>,
}

impl FigureSpec {
    /// Turn the spec back into a raw mapping accepted by [`crate::config::validate`]
    pub fn as_raw(&self) -> serde_json::Value {
        // Every field is plain data; serialization to a JSON value cannot fail.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

// =============================================================================
// Panel and axes
// =============================================================================

/// A single subplot with its series and overlays
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PanelSpec {
    #[serde(default)]
    pub axes: AxesSpec,
    #[serde(default)]
    pub series: Vec<SeriesSpec>,
    /// Inline overlays; overlay file references are expanded before validation
    #[serde(default)]
    pub overlays: Option<Vec<OverlaySpec>>,
}

/// Axis scale kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleKind {
    #[default]
    Linear,
    Log,
    Symlog,
}

/// Per-axis value limits
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Limits {
    #[serde(default)]
    pub x: Option<[f64; 2]>,
    #[serde(default)]
    pub y: Option<[f64; 2]>,
}

/// All per-panel presentation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AxesSpec {
    #[serde(default)]
    pub title: TextLike,
    #[serde(default)]
    pub xlabel: TextLike,
    #[serde(default)]
    pub ylabel: TextLike,
    #[serde(default)]
    pub xscale: ScaleKind,
    #[serde(default)]
    pub yscale: ScaleKind,
    #[serde(default)]
    pub grid: GridSpec,
    #[serde(default)]
    pub limits: Limits,
    #[serde(default)]
    pub legend: LegendSpec,
    #[serde(default)]
    pub spines: SpinesSpec,
    #[serde(default)]
    pub xticks: AxisTicksSpec,
    #[serde(default)]
    pub yticks: AxisTicksSpec,
    #[serde(default = "default_true")]
    pub show_axes_frame: bool,
    #[serde(default = "default_true")]
    pub show_xlabel: bool,
    #[serde(default = "default_true")]
    pub show_ylabel: bool,
    #[serde(default = "default_true")]
    pub show_title: bool,
}

impl Default for AxesSpec {
    fn default() -> Self {
        Self {
            title: TextLike::Absent,
            xlabel: TextLike::Absent,
            ylabel: TextLike::Absent,
            xscale: ScaleKind::Linear,
            yscale: ScaleKind::Linear,
            grid: GridSpec::default(),
            limits: Limits::default(),
            legend: LegendSpec::default(),
            spines: SpinesSpec::default(),
            xticks: AxisTicksSpec::default(),
            yticks: AxisTicksSpec::default(),
            show_axes_frame: true,
            show_xlabel: true,
            show_ylabel: true,
            show_title: true,
        }
    }
}

/// Which ticks the grid follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridWhich {
    Major,
    Minor,
    #[default]
    Both,
}

fn default_grid_linestyle() -> String {
    ":".to_string()
}
fn default_grid_linewidth() -> f64 {
    0.5
}
fn default_grid_color() -> String {
    "#cccccc".to_string()
}

/// Background grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridSpec {
    #[serde(default = "default_true")]
    pub show: bool,
    #[serde(default)]
    pub which: GridWhich,
    #[serde(default = "default_grid_linestyle")]
    pub linestyle: String,
    #[serde(default = "default_grid_linewidth")]
    pub linewidth: f64,
    #[serde(default = "default_grid_color")]
    pub color: String,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            show: true,
            which: GridWhich::Both,
            linestyle: default_grid_linestyle(),
            linewidth: default_grid_linewidth(),
            color: default_grid_color(),
        }
    }
}

fn default_black() -> String {
    "black".to_string()
}

/// Visibility and styling of the four spines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpinesSpec {
    #[serde(default = "default_true")]
    pub show_left: bool,
    #[serde(default = "default_true")]
    pub show_right: bool,
    #[serde(default = "default_true")]
    pub show_top: bool,
    #[serde(default = "default_true")]
    pub show_bottom: bool,
    #[serde(default = "default_black")]
    pub color: String,
    #[serde(default)]
    pub linewidth: Option<f64>,
}

impl Default for SpinesSpec {
    fn default() -> Self {
        Self {
            show_left: true,
            show_right: true,
            show_top: true,
            show_bottom: true,
            color: default_black(),
            linewidth: None,
        }
    }
}

/// Unit of legend offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegendOffsetUnit {
    /// Axes fractions
    #[default]
    Axes,
    /// Typographic points (1/72 in)
    Points,
}

fn default_loc() -> String {
    "best".to_string()
}

/// Legend placement and styling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LegendSpec {
    #[serde(default = "default_true")]
    pub show: bool,
    #[serde(default = "default_loc")]
    pub loc: String,
    #[serde(default = "default_one")]
    pub ncol: usize,
    #[serde(default)]
    pub frameon: bool,
    #[serde(default)]
    pub title: TextLike,
    #[serde(default)]
    pub labels: Option<Vec<TextLike>>,
    #[serde(default)]
    pub style: Option<TextStyleSpec>,
    /// `[x, y]` or `[x, y, w, h]` in axes coordinates
    #[serde(default)]
    pub anchor: Option<Vec<f64>>,
    #[serde(default)]
    pub offset_x: Option<f64>,
    #[serde(default)]
    pub offset_y: Option<f64>,
    #[serde(default)]
    pub offset_unit: LegendOffsetUnit,
}

impl Default for LegendSpec {
    fn default() -> Self {
        Self {
            show: true,
            loc: default_loc(),
            ncol: 1,
            frameon: false,
            title: TextLike::Absent,
            labels: None,
            style: None,
            anchor: None,
            offset_x: None,
            offset_y: None,
            offset_unit: LegendOffsetUnit::Axes,
        }
    }
}

/// Tick formatter family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatterKind {
    /// `%`-style pattern, e.g. `%.2f`
    Printf,
    /// Brace-style pattern, e.g. `{:.1f}` or `{x:.0f} ms`
    #[default]
    Strfmt,
    /// Scientific notation with `places` digits
    Sci,
    /// Value times 100 followed by `%`
    Percent,
    /// Thousands separators
    Thousands,
    /// No tick text
    Blank,
}

/// Declarative tick formatter
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TickFormatterSpec {
    #[serde(default)]
    pub kind: FormatterKind,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub places: Option<usize>,
    /// Multiply values before formatting
    #[serde(default)]
    pub scale: Option<f64>,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub suffix: Option<String>,
    /// Surround the text with `$...$`
    #[serde(default)]
    pub wrap_mathtext: bool,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
}

/// Tick placement and label styling for one axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AxisTicksSpec {
    #[serde(default)]
    pub family: Option<String>,
    #[serde(default)]
    pub size: Option<f64>,
    #[serde(default)]
    pub weight: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default = "default_black")]
    pub color: String,
    /// Show tick labels
    #[serde(default = "default_true")]
    pub show: bool,
    #[serde(default)]
    pub rotation: Option<f64>,
    /// `in`, `out` or `inout`
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub length: Option<f64>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub locations: Option<Vec<f64>>,
    /// `[min, max, step]`, inclusive of `max`
    #[serde(default)]
    pub range: Option<Vec<f64>>,
    #[serde(default)]
    pub fmt: Option<TickFormatterSpec>,
    /// Per-tick overrides; `null` entries keep the generated label
    #[serde(default)]
    pub labels: Option<Vec<TextLike>>,
}

impl Default for AxisTicksSpec {
    fn default() -> Self {
        Self {
            family: None,
            size: None,
            weight: None,
            style: None,
            color: default_black(),
            show: true,
            rotation: None,
            direction: None,
            length: None,
            width: None,
            locations: None,
            range: None,
            fmt: None,
            labels: None,
        }
    }
}

impl AxisTicksSpec {
    pub fn style_spec(&self) -> TextStyleSpec {
        TextStyleSpec {
            family: self.family.clone(),
            size: self.size,
            weight: self.weight.clone(),
            style: self.style.clone(),
            color: self.color.clone(),
        }
    }
}

// =============================================================================
// Series
// =============================================================================

/// Series type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    Line,
    Scatter,
    Bar,
    Hist,
    Cdf,
    Ecdf,
    Heatmap,
}

impl SeriesKind {
    /// Registry name of this series type
    pub fn as_str(&self) -> &'static str {
        match self {
            SeriesKind::Line => "line",
            SeriesKind::Scatter => "scatter",
            SeriesKind::Bar => "bar",
            SeriesKind::Hist => "hist",
            SeriesKind::Cdf => "cdf",
            SeriesKind::Ecdf => "ecdf",
            SeriesKind::Heatmap => "heatmap",
        }
    }
}

impl std::fmt::Display for SeriesKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn default_series_color() -> String {
    "C0".to_string()
}
fn default_line_width() -> f64 {
    1.0
}
fn default_line_style() -> String {
    "solid".to_string()
}

/// Per-series line and marker styling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LineSpec {
    #[serde(default = "default_series_color")]
    pub color: String,
    /// Width in points
    #[serde(default = "default_line_width")]
    pub width: f64,
    #[serde(default = "default_line_style")]
    pub style: String,
    #[serde(default)]
    pub marker: Option<String>,
}

impl Default for LineSpec {
    fn default() -> Self {
        Self {
            color: default_series_color(),
            width: default_line_width(),
            style: default_line_style(),
            marker: None,
        }
    }
}

/// A loader description for a table on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoaderSpec {
    pub path: String,
    /// `csv`, `parquet`, `json` or `ndjson`; inferred from the extension when unset
    #[serde(default)]
    pub reader: Option<String>,
    #[serde(default)]
    pub options: BTreeMap<String, serde_json::Value>,
}

/// Where a series gets its table from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataRef {
    /// A file path, or a key into the external data map
    Path(String),
    Loader(LoaderSpec),
}

impl DataRef {
    /// Key used to look the series up in named external data
    pub fn key(&self) -> &str {
        match self {
            DataRef::Path(path) => path,
            DataRef::Loader(loader) => &loader.path,
        }
    }
}

/// A single data series and how to render it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeriesSpec {
    #[serde(rename = "type")]
    pub kind: SeriesKind,
    #[serde(default)]
    pub x: Option<String>,
    #[serde(default)]
    pub y: Option<String>,
    #[serde(default)]
    pub data: Option<DataRef>,
    /// Row filter, a SQL `WHERE` predicate
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub style: LineSpec,
    #[serde(default)]
    pub label: TextLike,
    /// Number of bins (hist only)
    #[serde(default)]
    pub bins: Option<usize>,
}

impl SeriesSpec {
    pub fn new(kind: SeriesKind) -> Self {
        Self {
            kind,
            x: None,
            y: None,
            data: None,
            query: None,
            style: LineSpec::default(),
            label: TextLike::Absent,
            bins: None,
        }
    }

    /// Concrete label string for legend gathering
    pub fn label_text(&self) -> Option<String> {
        self.label.text().map(str::to_string)
    }
}

// =============================================================================
// Overlays
// =============================================================================

/// Overlay type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayKind {
    Line,
    Hline,
    Vline,
    Point,
    Rect,
    Circle,
    Annotation,
    Band,
}

impl std::fmt::Display for OverlayKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OverlayKind::Line => "line",
            OverlayKind::Hline => "hline",
            OverlayKind::Vline => "vline",
            OverlayKind::Point => "point",
            OverlayKind::Rect => "rect",
            OverlayKind::Circle => "circle",
            OverlayKind::Annotation => "annotation",
            OverlayKind::Band => "band",
        };
        write!(f, "{}", s)
    }
}

/// A declarative shape or annotation drawn on top of the data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OverlaySpec {
    #[serde(rename = "type")]
    pub kind: OverlayKind,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub edgecolor: Option<String>,
    #[serde(default)]
    pub facecolor: Option<String>,
    #[serde(default)]
    pub fill: Option<bool>,
    #[serde(default)]
    pub alpha: Option<f64>,
    #[serde(default)]
    pub linewidth: Option<f64>,
    #[serde(default)]
    pub linestyle: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub show_in_legend: bool,
    #[serde(default)]
    pub zorder: Option<i32>,
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub x0: Option<f64>,
    #[serde(default)]
    pub x1: Option<f64>,
    #[serde(default)]
    pub y0: Option<f64>,
    #[serde(default)]
    pub y1: Option<f64>,
    #[serde(default)]
    pub radius: Option<f64>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub text_dx: f64,
    #[serde(default)]
    pub text_dy: f64,
    #[serde(default)]
    pub text_ha: Option<String>,
    #[serde(default)]
    pub text_va: Option<String>,
    #[serde(default)]
    pub text_rotation: Option<f64>,
    #[serde(default)]
    pub ymin_frac: Option<f64>,
    #[serde(default)]
    pub ymax_frac: Option<f64>,
}

impl OverlaySpec {
    /// An overlay of `kind` with every optional field unset
    pub fn new(kind: OverlayKind) -> Self {
        Self {
            kind,
            color: None,
            edgecolor: None,
            facecolor: None,
            fill: None,
            alpha: None,
            linewidth: None,
            linestyle: None,
            label: None,
            show_in_legend: false,
            zorder: None,
            x: None,
            y: None,
            x0: None,
            x1: None,
            y0: None,
            y1: None,
            radius: None,
            width: None,
            height: None,
            text: None,
            text_dx: 0.0,
            text_dy: 0.0,
            text_ha: None,
            text_va: None,
            text_rotation: None,
            ymin_frac: None,
            ymax_frac: None,
        }
    }
}
