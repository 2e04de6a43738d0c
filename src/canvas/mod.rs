//! In-memory figure scene
//!
//! Every drawing stage writes onto this scene instead of a backend directly: a
//! [`Figure`] owns a grid of [`Panel`]s, each panel owns its artists (in data
//! coordinates), its two axes, text items, spines, grid and legend. Writers paint
//! the finished scene; tests inspect it.

pub mod axis;
pub mod legend;

pub use axis::{Axis, Tick, TickDirection, TickLabelOverride};
pub use legend::{Legend, LegendEntry, LegendOffset};

use crate::config::{GridWhich, OffsetUnit, SizeUnit};
use crate::style::offset::text_offset_inches;
use crate::style::text::EffectiveStyle;

/// Fractional margin added around autoscaled data
pub const AUTOSCALE_MARGIN: f64 = 0.05;

/// Handle to an artist within its panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArtistId(pub usize);

/// Rectangle in figure fractions, origin bottom-left
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bbox {
    pub left: f64,
    pub bottom: f64,
    pub width: f64,
    pub height: f64,
}

impl Bbox {
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn top(&self) -> f64 {
        self.bottom + self.height
    }
}

/// Unresolved positional offset of a text item
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextOffset {
    pub dx: f64,
    pub dy: f64,
    pub dx_unit: OffsetUnit,
    pub dy_unit: OffsetUnit,
    pub size_unit: SizeUnit,
}

impl Default for TextOffset {
    fn default() -> Self {
        Self {
            dx: 0.0,
            dy: 0.0,
            dx_unit: OffsetUnit::Axes,
            dy_unit: OffsetUnit::Axes,
            size_unit: SizeUnit::In,
        }
    }
}

/// A title, axis label or legend title
#[derive(Debug, Clone, PartialEq)]
pub struct TextItem {
    pub text: String,
    pub style: EffectiveStyle,
    pub rotation: f64,
    pub ha: Option<String>,
    pub va: Option<String>,
    /// Extra distance from the axes in points
    pub pad: f64,
    pub offset: TextOffset,
}

/// Text placed at a data position
#[derive(Debug, Clone, PartialEq)]
pub struct TextArtist {
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub style: EffectiveStyle,
    pub ha: String,
    pub va: String,
    pub rotation: f64,
}

/// One bar of a bar chart or histogram
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarRect {
    pub x: f64,
    pub width: f64,
    pub bottom: f64,
    pub height: f64,
}

/// Geometry of a drawable
#[derive(Debug, Clone, PartialEq)]
pub enum ArtistKind {
    /// Connected polyline
    Line { xs: Vec<f64>, ys: Vec<f64> },
    /// Unconnected markers; `size` is the marker area in points squared
    Scatter {
        xs: Vec<f64>,
        ys: Vec<f64>,
        size: f64,
    },
    Bars(Vec<BarRect>),
    /// Horizontal line spanning the axes at data `y`
    HLine { y: f64 },
    /// Vertical line spanning the axes at data `x`
    VLine { x: f64 },
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    Circle { x: f64, y: f64, radius: f64 },
    /// Data-x interval spanning axes-fraction `[ymin_frac, ymax_frac]`
    Band {
        x0: f64,
        x1: f64,
        ymin_frac: f64,
        ymax_frac: f64,
    },
    Text(TextArtist),
}

impl ArtistKind {
    pub fn name(&self) -> &'static str {
        match self {
            ArtistKind::Line { .. } => "line",
            ArtistKind::Scatter { .. } => "scatter",
            ArtistKind::Bars(_) => "bars",
            ArtistKind::HLine { .. } => "hline",
            ArtistKind::VLine { .. } => "vline",
            ArtistKind::Rect { .. } => "rect",
            ArtistKind::Circle { .. } => "circle",
            ArtistKind::Band { .. } => "band",
            ArtistKind::Text(_) => "text",
        }
    }

    /// Whether the shape has an interior
    pub fn is_filled(&self) -> bool {
        matches!(
            self,
            ArtistKind::Bars(_)
                | ArtistKind::Rect { .. }
                | ArtistKind::Circle { .. }
                | ArtistKind::Band { .. }
        )
    }
}

/// Visual properties; `None` fields use the painter's defaults
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArtistStyle {
    pub color: Option<String>,
    pub facecolor: Option<String>,
    pub edgecolor: Option<String>,
    /// Width in points
    pub linewidth: Option<f64>,
    /// Canonical line style token
    pub linestyle: Option<String>,
    pub marker: Option<String>,
    pub alpha: Option<f64>,
    pub zorder: Option<f64>,
}

/// A drawable on a panel
#[derive(Debug, Clone, PartialEq)]
pub struct Artist {
    pub kind: ArtistKind,
    pub style: ArtistStyle,
    /// Legend label; `None` keeps the artist out of the legend
    pub label: Option<String>,
}

impl Artist {
    pub fn new(kind: ArtistKind) -> Self {
        Self {
            kind,
            style: ArtistStyle::default(),
            label: None,
        }
    }

    pub fn with_style(mut self, style: ArtistStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_label(mut self, label: Option<String>) -> Self {
        self.label = label;
        self
    }

    /// Default stacking order, as in the usual plotting conventions
    pub fn zorder(&self) -> f64 {
        self.style.zorder.unwrap_or(match self.kind {
            ArtistKind::Rect { .. }
            | ArtistKind::Circle { .. }
            | ArtistKind::Band { .. }
            | ArtistKind::Bars(_) => 1.0,
            ArtistKind::Text(_) => 3.0,
            _ => 2.0,
        })
    }
}

/// Spine visibility and style
#[derive(Debug, Clone, PartialEq)]
pub struct Spines {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
    pub color: String,
    pub linewidth: f64,
}

impl Default for Spines {
    fn default() -> Self {
        Self {
            left: true,
            right: true,
            top: true,
            bottom: true,
            color: "black".to_string(),
            linewidth: 0.8,
        }
    }
}

/// Grid line style
#[derive(Debug, Clone, PartialEq)]
pub struct GridStyle {
    pub which: GridWhich,
    pub linestyle: String,
    pub linewidth: f64,
    pub color: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dim {
    X,
    Y,
}

/// Data extent contributed by the artists along one dimension
#[derive(Debug, Clone, Default)]
struct Extent {
    lo: Option<f64>,
    hi: Option<f64>,
    sticky: Vec<f64>,
}

impl Extent {
    fn add(&mut self, value: f64, positive_only: bool) {
        if !value.is_finite() || (positive_only && value <= 0.0) {
            return;
        }
        self.lo = Some(self.lo.map_or(value, |lo| lo.min(value)));
        self.hi = Some(self.hi.map_or(value, |hi| hi.max(value)));
    }
}

/// One subplot in the figure grid
#[derive(Debug, Clone)]
pub struct Panel {
    pub index: usize,
    pub row: usize,
    pub col: usize,
    /// Hidden slots are not painted at all
    pub visible: bool,
    pub bbox: Bbox,
    /// Full canvas size in inches
    pub figure_size: (f64, f64),
    artists: Vec<Artist>,
    pub xaxis: Axis,
    pub yaxis: Axis,
    pub title: Option<TextItem>,
    pub xlabel: Option<TextItem>,
    pub ylabel: Option<TextItem>,
    pub spines: Spines,
    pub frame_on: bool,
    pub grid: Option<GridStyle>,
    pub legend: Option<Legend>,
}

impl Panel {
    pub fn new(index: usize, row: usize, col: usize, bbox: Bbox, figure_size: (f64, f64)) -> Self {
        Self {
            index,
            row,
            col,
            visible: true,
            bbox,
            figure_size,
            artists: Vec::new(),
            xaxis: Axis::default(),
            yaxis: Axis::default(),
            title: None,
            xlabel: None,
            ylabel: None,
            spines: Spines::default(),
            frame_on: true,
            grid: None,
            legend: None,
        }
    }

    pub fn add_artist(&mut self, artist: Artist) -> ArtistId {
        self.artists.push(artist);
        ArtistId(self.artists.len() - 1)
    }

    pub fn artists(&self) -> &[Artist] {
        &self.artists
    }

    pub fn artist(&self, id: ArtistId) -> Option<&Artist> {
        self.artists.get(id.0)
    }

    pub fn artist_mut(&mut self, id: ArtistId) -> Option<&mut Artist> {
        self.artists.get_mut(id.0)
    }

    /// Artists with their handles, in drawing order
    pub fn artists_by_zorder(&self) -> Vec<(ArtistId, &Artist)> {
        let mut ordered: Vec<_> = self
            .artists
            .iter()
            .enumerate()
            .map(|(i, a)| (ArtistId(i), a))
            .collect();
        ordered.sort_by(|a, b| {
            a.1.zorder()
                .partial_cmp(&b.1.zorder())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ordered
    }

    /// Handles whose label qualifies for the legend: set, not starting with `_`,
    /// and non-empty unless `allow_empty`
    pub fn labelled_handles(&self, allow_empty: bool) -> Vec<(ArtistId, String)> {
        self.artists
            .iter()
            .enumerate()
            .filter_map(|(i, artist)| {
                let label = artist.label.as_ref()?;
                if label.starts_with('_') || (!allow_empty && label.is_empty()) {
                    return None;
                }
                Some((ArtistId(i), label.clone()))
            })
            .collect()
    }

    pub fn set_xlim(&mut self, lo: f64, hi: f64) {
        self.xaxis.limits = Some((lo, hi));
    }

    pub fn set_ylim(&mut self, lo: f64, hi: f64) {
        self.yaxis.limits = Some((lo, hi));
    }

    /// Current x view interval
    pub fn xlim(&self) -> (f64, f64) {
        self.xaxis.limits.unwrap_or_else(|| self.autoscale(Dim::X))
    }

    /// Current y view interval
    pub fn ylim(&self) -> (f64, f64) {
        self.yaxis.limits.unwrap_or_else(|| self.autoscale(Dim::Y))
    }

    pub fn axis(&self, dim: Dim) -> &Axis {
        match dim {
            Dim::X => &self.xaxis,
            Dim::Y => &self.yaxis,
        }
    }

    fn extent(&self, dim: Dim) -> Extent {
        let positive_only = self.axis(dim).scale == crate::config::ScaleKind::Log;
        let mut extent = Extent::default();
        let mut add = |v: f64| extent.add(v, positive_only);
        let mut sticky = Vec::new();

        for artist in &self.artists {
            match (&artist.kind, dim) {
                (ArtistKind::Line { xs, .. }, Dim::X)
                | (ArtistKind::Scatter { xs, .. }, Dim::X) => {
                    xs.iter().copied().for_each(&mut add)
                }
                (ArtistKind::Line { ys, .. }, Dim::Y)
                | (ArtistKind::Scatter { ys, .. }, Dim::Y) => {
                    ys.iter().copied().for_each(&mut add)
                }
                (ArtistKind::Bars(bars), Dim::X) => {
                    for bar in bars {
                        add(bar.x);
                        add(bar.x + bar.width);
                    }
                }
                (ArtistKind::Bars(bars), Dim::Y) => {
                    for bar in bars {
                        add(bar.bottom);
                        add(bar.bottom + bar.height);
                        sticky.push(bar.bottom);
                    }
                }
                (ArtistKind::VLine { x }, Dim::X) => add(*x),
                (ArtistKind::HLine { y }, Dim::Y) => add(*y),
                (ArtistKind::Band { x0, x1, .. }, Dim::X) => {
                    add(*x0);
                    add(*x1);
                }
                (ArtistKind::Rect { x, width, .. }, Dim::X) => {
                    add(*x);
                    add(x + width);
                }
                (ArtistKind::Rect { y, height, .. }, Dim::Y) => {
                    add(*y);
                    add(y + height);
                }
                (ArtistKind::Circle { x, radius, .. }, Dim::X) => {
                    add(x - radius);
                    add(x + radius);
                }
                (ArtistKind::Circle { y, radius, .. }, Dim::Y) => {
                    add(y - radius);
                    add(y + radius);
                }
                _ => {}
            }
        }
        extent.sticky = sticky;
        extent
    }

    /// Data limits along `dim` without margins, if any artist contributes
    pub fn data_limits(&self, dim: Dim) -> Option<(f64, f64)> {
        let extent = self.extent(dim);
        Some((extent.lo?, extent.hi?))
    }

    /// View interval from the data with a 5% margin, clamped to sticky edges
    pub fn autoscale(&self, dim: Dim) -> (f64, f64) {
        let axis = self.axis(dim);
        let log = axis.scale == crate::config::ScaleKind::Log;
        let extent = self.extent(dim);

        let (data_lo, data_hi) = match (extent.lo, extent.hi) {
            (Some(lo), Some(hi)) => (lo, hi),
            _ => return if log { (1.0, 10.0) } else { (0.0, 1.0) },
        };

        let (t_lo, t_hi) = if data_lo == data_hi {
            let t = axis.transform(data_lo);
            let half = if log || t == 0.0 { 0.5 } else { t.abs() * AUTOSCALE_MARGIN };
            (t - half, t + half)
        } else {
            (axis.transform(data_lo), axis.transform(data_hi))
        };

        let margin = (t_hi - t_lo) * AUTOSCALE_MARGIN;
        let mut lo = axis.inverse(t_lo - margin);
        let mut hi = axis.inverse(t_hi + margin);

        for s in extent.sticky {
            if lo < s && s <= data_lo {
                lo = s;
            }
            if hi > s && s >= data_hi {
                hi = s;
            }
        }
        (lo, hi)
    }

    /// Axes size in inches
    pub fn axes_size_in(&self) -> (f64, f64) {
        (
            self.bbox.width * self.figure_size.0,
            self.bbox.height * self.figure_size.1,
        )
    }

    /// Resolve a text offset to inches using the current limits and geometry
    pub fn text_offset_inches(&self, offset: &TextOffset) -> (f64, f64) {
        let (x_lo, x_hi) = self.xlim();
        let (y_lo, y_hi) = self.ylim();
        let dx = text_offset_inches(
            offset.dx,
            offset.dx_unit,
            offset.size_unit,
            x_hi - x_lo,
            self.bbox.width,
            self.figure_size.0,
        );
        let dy = text_offset_inches(
            offset.dy,
            offset.dy_unit,
            offset.size_unit,
            y_hi - y_lo,
            self.bbox.height,
            self.figure_size.1,
        );
        (dx, dy)
    }

    /// Remove the panel from the output
    pub fn hide(&mut self) {
        self.visible = false;
    }
}

/// The whole canvas
#[derive(Debug, Clone)]
pub struct Figure {
    pub width_in: f64,
    pub height_in: f64,
    pub dpi: u32,
    pub rows: usize,
    pub cols: usize,
    pub palette: Option<String>,
    pub panels: Vec<Panel>,
}

impl Figure {
    pub fn new(width_in: f64, height_in: f64, dpi: u32) -> Self {
        Self {
            width_in,
            height_in,
            dpi,
            rows: 0,
            cols: 0,
            palette: None,
            panels: Vec::new(),
        }
    }

    pub fn panel(&self, row: usize, col: usize) -> Option<&Panel> {
        self.panels.iter().find(|p| p.row == row && p.col == col)
    }

    pub fn visible_panels(&self) -> impl Iterator<Item = &Panel> {
        self.panels.iter().filter(|p| p.visible)
    }
}
