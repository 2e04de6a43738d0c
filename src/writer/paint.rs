//! Scene painting onto a plotters drawing area
//!
//! Geometry is laid out in figure inches (origin bottom-left) and mapped to
//! backend pixels through a [`Page`]. Clipping to the axes rectangle and dash
//! splitting happen here, so the PNG and SVG backends agree on the output.
//! Text is always drawn centred on its own layout box; the box itself is
//! placed from estimated glyph metrics.

use super::geometry::{clip_polygon, clip_polyline, dash_polyline, ellipse, Rect};
use crate::canvas::legend::{loc_anchor, BEST_CANDIDATES};
use crate::canvas::{
    Artist, ArtistKind, ArtistStyle, Figure, GridStyle, Legend, Panel, TextItem, TickDirection,
};
use crate::config::GridWhich;
use crate::style::colour::{parse_color_or, Rgba};
use crate::style::linetype::dash_pattern;
use crate::style::offset::{legend_offset_fraction, shift_anchor};
use crate::style::text::{strip_markup, EffectiveStyle};
use crate::style::units::{in_to_pt, pt_to_in};
use crate::{NicefigsError, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontDesc, FontFamily, FontStyle, FontTransform};
use std::cell::Cell;
use std::f64::consts::{FRAC_PI_2, PI};

/// Average glyph advance as a fraction of the font size
const CHAR_WIDTH_EM: f64 = 0.55;
const LINE_HEIGHT_EM: f64 = 1.2;
/// Padding around the content when cropping tightly, in inches
const TIGHT_PAD_IN: f64 = 0.1;
const TICK_LABEL_PAD_PT: f64 = 3.5;
const DEFAULT_LINEWIDTH_PT: f64 = 1.5;
const DEFAULT_EDGEWIDTH_PT: f64 = 1.0;
/// Marker diameter for line series, in points
const LINE_MARKER_PT: f64 = 6.0;
const ELLIPSE_SEGMENTS: usize = 72;
const GRID_FALLBACK: Rgba = Rgba::rgb(176, 176, 176);
const LEGEND_EDGE: Rgba = Rgba::rgb(204, 204, 204);

/// Estimated `(width, height)` in inches of a single line of text
pub fn text_extent_in(text: &str, size_pt: f64) -> (f64, f64) {
    let chars = strip_markup(text).chars().count() as f64;
    (
        pt_to_in(chars * CHAR_WIDTH_EM * size_pt),
        pt_to_in(LINE_HEIGHT_EM * size_pt),
    )
}

/// Rotations are snapped to quarter turns
fn quarter_turns(rotation: f64) -> i64 {
    ((rotation / 90.0).round() as i64).rem_euclid(4)
}

fn rotated_extent((w, h): (f64, f64), rotation: f64) -> (f64, f64) {
    if quarter_turns(rotation) % 2 == 1 {
        (h, w)
    } else {
        (w, h)
    }
}

/// Horizontal alignment name → fraction of the box left of the anchor
fn ha_fraction(ha: &str) -> f64 {
    match ha.to_lowercase().as_str() {
        "left" => 0.0,
        "right" => 1.0,
        _ => 0.5,
    }
}

/// Vertical alignment name → fraction of the box below the anchor
fn va_fraction(va: &str) -> f64 {
    match va.to_lowercase().as_str() {
        "top" => 1.0,
        "bottom" | "baseline" => 0.0,
        _ => 0.5,
    }
}

/// A text element resolved to a layout box
#[derive(Debug, Clone)]
struct Label {
    text: String,
    style: EffectiveStyle,
    rotation: f64,
    bounds: Rect,
}

impl Label {
    fn new(
        text: &str,
        style: &EffectiveStyle,
        rotation: f64,
        at: (f64, f64),
        align: (f64, f64),
    ) -> Self {
        let size = rotated_extent(text_extent_in(text, style.size), rotation);
        Self {
            text: strip_markup(text),
            style: style.clone(),
            rotation,
            bounds: Rect::anchored(at, size, align),
        }
    }
}

/// Pixel mapping of the output image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Page {
    /// Pixels per inch
    pub ppi: f64,
    /// Figure inches at the top-left pixel
    pub origin: (f64, f64),
    pub width_px: u32,
    pub height_px: u32,
}

impl Page {
    /// Page covering the whole figure, or only its content when `tight`
    pub fn new(figure: &Figure, ppi: f64, tight: bool) -> Self {
        let full = Rect::new(0.0, 0.0, figure.width_in, figure.height_in);
        let bounds = if tight {
            content_bounds(figure)
                .map(|b| b.inflate(TIGHT_PAD_IN))
                .filter(|b| b.is_finite() && b.width() > 0.0 && b.height() > 0.0)
                .unwrap_or(full)
        } else {
            full
        };
        Self {
            ppi,
            origin: (bounds.x0, bounds.y1),
            width_px: (bounds.width() * ppi).round().max(1.0) as u32,
            height_px: (bounds.height() * ppi).round().max(1.0) as u32,
        }
    }

    fn px(&self, (x, y): (f64, f64)) -> (f64, f64) {
        ((x - self.origin.0) * self.ppi, (self.origin.1 - y) * self.ppi)
    }

    fn ipx(&self, point: (f64, f64)) -> (i32, i32) {
        let (x, y) = self.px(point);
        (x.round() as i32, y.round() as i32)
    }

    fn pt(&self, points: f64) -> f64 {
        pt_to_in(points) * self.ppi
    }
}

/// One panel's axes rectangle and view limits
struct Frame<'p> {
    panel: &'p Panel,
    rect: Rect,
    xlim: (f64, f64),
    ylim: (f64, f64),
}

impl<'p> Frame<'p> {
    fn new(panel: &'p Panel) -> Self {
        let (w, h) = panel.figure_size;
        let b = &panel.bbox;
        Self {
            panel,
            rect: Rect::new(b.left * w, b.bottom * h, b.right() * w, b.top() * h),
            xlim: panel.xlim(),
            ylim: panel.ylim(),
        }
    }

    fn axes_to_in(&self, fx: f64, fy: f64) -> (f64, f64) {
        (
            self.rect.x0 + fx * self.rect.width(),
            self.rect.y0 + fy * self.rect.height(),
        )
    }

    fn x_in(&self, x: f64) -> f64 {
        self.rect.x0 + self.panel.xaxis.to_fraction(x, self.xlim) * self.rect.width()
    }

    fn y_in(&self, y: f64) -> f64 {
        self.rect.y0 + self.panel.yaxis.to_fraction(y, self.ylim) * self.rect.height()
    }

    fn data_to_in(&self, x: f64, y: f64) -> (f64, f64) {
        (self.x_in(x), self.y_in(y))
    }

    fn points(&self, xs: &[f64], ys: &[f64]) -> Vec<(f64, f64)> {
        xs.iter().zip(ys).map(|(x, y)| self.data_to_in(*x, *y)).collect()
    }

    /// Inches the tick marks protrude outside the spine
    fn tick_outside_in(&self, direction: TickDirection, length_pt: f64) -> f64 {
        match direction {
            TickDirection::Out => pt_to_in(length_pt),
            TickDirection::InOut => pt_to_in(length_pt) / 2.0,
            TickDirection::In => 0.0,
        }
    }

    fn xtick_labels(&self) -> Vec<Label> {
        let axis = &self.panel.xaxis;
        let y = self.rect.y0
            - self.tick_outside_in(axis.direction, axis.tick_length)
            - pt_to_in(TICK_LABEL_PAD_PT);
        axis.ticks(self.xlim)
            .into_iter()
            .filter(|tick| tick.visible && !tick.label.is_empty())
            .filter(|tick| (0.0..=1.0).contains(&axis.to_fraction(tick.value, self.xlim)))
            .map(|tick| {
                let at = (self.x_in(tick.value), y);
                Label::new(&tick.label, &tick.style, tick.rotation, at, (0.5, 1.0))
            })
            .collect()
    }

    fn ytick_labels(&self) -> Vec<Label> {
        let axis = &self.panel.yaxis;
        let x = self.rect.x0
            - self.tick_outside_in(axis.direction, axis.tick_length)
            - pt_to_in(TICK_LABEL_PAD_PT);
        axis.ticks(self.ylim)
            .into_iter()
            .filter(|tick| tick.visible && !tick.label.is_empty())
            .filter(|tick| (0.0..=1.0).contains(&axis.to_fraction(tick.value, self.ylim)))
            .map(|tick| {
                let at = (x, self.y_in(tick.value));
                Label::new(&tick.label, &tick.style, tick.rotation, at, (1.0, 0.5))
            })
            .collect()
    }

    /// Tick labels, axis labels and title, in paint order
    fn decorations(&self) -> Vec<Label> {
        let xticks = self.xtick_labels();
        let yticks = self.ytick_labels();
        let (xaxis, yaxis) = (&self.panel.xaxis, &self.panel.yaxis);
        let xband = xticks
            .iter()
            .map(|l| self.rect.y0 - l.bounds.y0)
            .fold(self.tick_outside_in(xaxis.direction, xaxis.tick_length), f64::max);
        let yband = yticks
            .iter()
            .map(|l| self.rect.x0 - l.bounds.x0)
            .fold(self.tick_outside_in(yaxis.direction, yaxis.tick_length), f64::max);

        let mut labels = xticks;
        labels.extend(yticks);

        let center = self.rect.center();
        let offset = |item: &TextItem| self.panel.text_offset_inches(&item.offset);

        if let Some(item) = &self.panel.xlabel {
            let (dx, dy) = offset(item);
            let at = (center.0 + dx, self.rect.y0 - xband - pt_to_in(item.pad) + dy);
            let ha = item.ha.as_deref().map_or(0.5, ha_fraction);
            labels.push(Label::new(&item.text, &item.style, item.rotation, at, (ha, 1.0)));
        }
        if let Some(item) = &self.panel.ylabel {
            let (dx, dy) = offset(item);
            let at = (self.rect.x0 - yband - pt_to_in(item.pad) + dx, center.1 + dy);
            let va = item.va.as_deref().map_or(0.5, va_fraction);
            labels.push(Label::new(&item.text, &item.style, item.rotation, at, (1.0, va)));
        }
        if let Some(item) = &self.panel.title {
            let (dx, dy) = offset(item);
            let at = (center.0 + dx, self.rect.y1 + pt_to_in(item.pad) + dy);
            let ha = item.ha.as_deref().map_or(0.5, ha_fraction);
            labels.push(Label::new(&item.text, &item.style, item.rotation, at, (ha, 0.0)));
        }
        labels
    }

    fn text_artists(&self) -> Vec<Label> {
        self.panel
            .artists_by_zorder()
            .into_iter()
            .filter_map(|(_, artist)| match &artist.kind {
                ArtistKind::Text(text) => Some(Label::new(
                    &text.text,
                    &text.style,
                    text.rotation,
                    self.data_to_in(text.x, text.y),
                    (ha_fraction(&text.ha), va_fraction(&text.va)),
                )),
                _ => None,
            })
            .collect()
    }

    /// Artist vertices inside the axes, used to place `best` legends
    fn data_points(&self) -> Vec<(f64, f64)> {
        let mut points = Vec::new();
        for artist in self.panel.artists() {
            match &artist.kind {
                ArtistKind::Line { xs, ys } | ArtistKind::Scatter { xs, ys, .. } => {
                    points.extend(self.points(xs, ys))
                }
                ArtistKind::Bars(bars) => points.extend(bars.iter().map(|bar| {
                    self.data_to_in(bar.x + bar.width / 2.0, bar.bottom + bar.height)
                })),
                ArtistKind::Text(text) => points.push(self.data_to_in(text.x, text.y)),
                _ => {}
            }
        }
        points.retain(|p| self.rect.contains(*p));
        points
    }
}

/// Legend box geometry in inches
struct LegendLayout {
    rect: Rect,
    em: f64,
    rows: usize,
    column_width: f64,
    title_height: f64,
}

impl LegendLayout {
    const BORDER_PAD_EM: f64 = 0.4;
    const AXES_PAD_EM: f64 = 0.5;
    const HANDLE_LENGTH_EM: f64 = 2.0;
    const HANDLE_GAP_EM: f64 = 0.8;
    const ROW_HEIGHT_EM: f64 = 1.3;
    const COLUMN_GAP_EM: f64 = 2.0;

    fn new(frame: &Frame, legend: &Legend) -> Self {
        let em = pt_to_in(legend.style.size);
        let ncol = legend.ncol.max(1).min(legend.entries.len().max(1));
        let rows = legend.entries.len().div_ceil(ncol);

        let widest = legend
            .entries
            .iter()
            .map(|e| text_extent_in(&e.label, legend.style.size).0)
            .fold(0.0, f64::max);
        let column_width = (Self::HANDLE_LENGTH_EM + Self::HANDLE_GAP_EM) * em + widest;
        let (title_width, title_height) = legend
            .title
            .as_ref()
            .map(|t| text_extent_in(&t.text, t.style.size))
            .map_or((0.0, 0.0), |(w, h)| (w, h * 1.1));

        let pad = Self::BORDER_PAD_EM * em;
        let body_width = ncol as f64 * column_width + (ncol - 1) as f64 * Self::COLUMN_GAP_EM * em;
        let size = (
            2.0 * pad + body_width.max(title_width),
            2.0 * pad + rows as f64 * Self::ROW_HEIGHT_EM * em + title_height,
        );

        Self {
            rect: Self::place(frame, legend, size, em),
            em,
            rows,
            column_width,
            title_height,
        }
    }

    fn place(frame: &Frame, legend: &Legend, size: (f64, f64), em: f64) -> Rect {
        let (axes_w, axes_h) = (frame.rect.width(), frame.rect.height());
        let fx = legend_offset_fraction(legend.offset.dx, legend.offset.unit, axes_w);
        let fy = legend_offset_fraction(legend.offset.dy, legend.offset.unit, axes_h);

        let loc = legend.loc.to_lowercase();
        let named = loc_anchor(&loc);
        if named.is_none() && loc != "best" {
            tracing::warn!(loc = %legend.loc, "Unknown legend location, using best");
        }

        // Box the legend is placed in, in inches
        let (container, shift) = match &legend.anchor {
            Some(anchor) if anchor.len() >= 2 => {
                let shifted = shift_anchor(anchor, fx, fy);
                let (x0, y0) = frame.axes_to_in(shifted[0], shifted[1]);
                let (w, h) = match shifted.get(2..4) {
                    Some([w, h]) => (w * axes_w, h * axes_h),
                    _ => (0.0, 0.0),
                };
                (Rect::new(x0, y0, x0 + w, y0 + h), (0.0, 0.0))
            }
            _ => (
                frame.rect.inflate(-Self::AXES_PAD_EM * em),
                (fx * axes_w, fy * axes_h),
            ),
        };

        let at = |placement: ((f64, f64), (f64, f64))| {
            let ((ax, ay), corner) = placement;
            let point = (
                container.x0 + ax * container.width() + shift.0,
                container.y0 + ay * container.height() + shift.1,
            );
            Rect::anchored(point, size, corner)
        };

        match named {
            Some(placement) => at(placement),
            None => {
                let points = frame.data_points();
                BEST_CANDIDATES
                    .iter()
                    .filter_map(|name| loc_anchor(name))
                    .map(at)
                    .enumerate()
                    .min_by_key(|(i, rect)| {
                        (points.iter().filter(|p| rect.contains(**p)).count(), *i)
                    })
                    .map(|(_, rect)| rect)
                    .unwrap_or_else(|| Rect::anchored(frame.rect.center(), size, (0.5, 0.5)))
            }
        }
    }

    /// Row centre line and column start of entry `i` (entries fill columns first)
    fn entry_origin(&self, i: usize) -> (f64, f64) {
        let (col, row) = (i / self.rows, i % self.rows);
        let pad = Self::BORDER_PAD_EM * self.em;
        let column_step = self.column_width + Self::COLUMN_GAP_EM * self.em;
        let row_step = Self::ROW_HEIGHT_EM * self.em;
        let x = self.rect.x0 + pad + col as f64 * column_step;
        let y = self.rect.y1 - pad - self.title_height - (row as f64 + 0.5) * row_step;
        (x, y)
    }
}

/// Union of everything painted on the figure, in inches
pub fn content_bounds(figure: &Figure) -> Option<Rect> {
    let mut bounds: Option<Rect> = None;
    let mut add = |rect: Rect| {
        if rect.is_finite() {
            bounds = Some(bounds.map_or(rect, |b| b.union(&rect)));
        }
    };

    for panel in figure.visible_panels() {
        let frame = Frame::new(panel);
        add(frame.rect);
        for label in frame.decorations().into_iter().chain(frame.text_artists()) {
            add(label.bounds);
        }
        if let Some(legend) = &panel.legend {
            let layout = LegendLayout::new(&frame, legend);
            add(layout.rect);
        }
    }
    bounds
}

fn to_plotters(color: Rgba) -> RGBAColor {
    RGBAColor(color.r, color.g, color.b, color.a)
}

fn draw_error<E: std::fmt::Debug>(e: E) -> NicefigsError {
    NicefigsError::Export(format!("{:?}", e))
}

fn has_marker(marker: Option<&str>) -> Option<&str> {
    marker.filter(|m| !m.is_empty() && !m.eq_ignore_ascii_case("none") && *m != " ")
}

/// Paints one [`Figure`] onto a drawing area
pub struct Painter<'a, DB: DrawingBackend> {
    area: &'a DrawingArea<DB, Shift>,
    page: Page,
    palette: Option<&'a str>,
    text_warned: Cell<bool>,
}

impl<'a, DB: DrawingBackend> Painter<'a, DB> {
    pub fn new(area: &'a DrawingArea<DB, Shift>, page: Page, palette: Option<&'a str>) -> Self {
        Self {
            area,
            page,
            palette,
            text_warned: Cell::new(false),
        }
    }

    pub fn paint(&self, figure: &Figure) -> Result<()> {
        self.area.fill(&WHITE).map_err(draw_error)?;
        for panel in figure.visible_panels() {
            self.paint_panel(&Frame::new(panel))?;
        }
        Ok(())
    }

    fn color(&self, value: &str, fallback: Rgba) -> Rgba {
        parse_color_or(value, self.palette, fallback)
    }

    fn paint_panel(&self, frame: &Frame) -> Result<()> {
        let panel = frame.panel;
        if let Some(grid) = &panel.grid {
            self.paint_grid(frame, grid)?;
        }
        for (_, artist) in panel.artists_by_zorder() {
            self.paint_artist(frame, artist)?;
        }
        self.paint_spines(frame)?;
        self.paint_ticks(frame)?;
        for label in frame.decorations() {
            self.text(&label);
        }
        if let Some(legend) = &panel.legend {
            self.paint_legend(frame, legend)?;
        }
        Ok(())
    }

    fn paint_grid(&self, frame: &Frame, grid: &GridStyle) -> Result<()> {
        let color = self.color(&grid.color, GRID_FALLBACK);
        let lines = |values: Vec<f64>, minor: bool, fraction: &dyn Fn(f64) -> f64| -> Vec<f64> {
            let values = if minor {
                values.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect()
            } else {
                values
            };
            values.into_iter().map(fraction).filter(|f| (0.0..=1.0).contains(f)).collect()
        };
        let which: &[bool] = match grid.which {
            GridWhich::Major => &[false],
            GridWhich::Minor => &[true],
            GridWhich::Both => &[false, true],
        };

        let (xaxis, yaxis) = (&frame.panel.xaxis, &frame.panel.yaxis);
        for &minor in which {
            let xs = lines(xaxis.tick_values(frame.xlim), minor, &|v: f64| {
                xaxis.to_fraction(v, frame.xlim)
            });
            for fx in xs {
                let segment = [frame.axes_to_in(fx, 0.0), frame.axes_to_in(fx, 1.0)];
                self.stroke(&segment, color, grid.linewidth, Some(&grid.linestyle), None)?;
            }
            let ys = lines(yaxis.tick_values(frame.ylim), minor, &|v: f64| {
                yaxis.to_fraction(v, frame.ylim)
            });
            for fy in ys {
                let segment = [frame.axes_to_in(0.0, fy), frame.axes_to_in(1.0, fy)];
                self.stroke(&segment, color, grid.linewidth, Some(&grid.linestyle), None)?;
            }
        }
        Ok(())
    }

    fn paint_spines(&self, frame: &Frame) -> Result<()> {
        let spines = &frame.panel.spines;
        let color = self.color(&spines.color, Rgba::BLACK);
        let r = frame.rect;
        let sides = [
            (spines.left, [(r.x0, r.y0), (r.x0, r.y1)]),
            (spines.right, [(r.x1, r.y0), (r.x1, r.y1)]),
            (spines.top, [(r.x0, r.y1), (r.x1, r.y1)]),
            (spines.bottom, [(r.x0, r.y0), (r.x1, r.y0)]),
        ];
        for (shown, segment) in sides {
            if shown {
                self.stroke(&segment, color, spines.linewidth, None, None)?;
            }
        }
        Ok(())
    }

    fn paint_ticks(&self, frame: &Frame) -> Result<()> {
        let span = |direction: TickDirection, length: f64| -> (f64, f64) {
            let length = pt_to_in(length);
            match direction {
                TickDirection::Out => (-length, 0.0),
                TickDirection::In => (0.0, length),
                TickDirection::InOut => (-length / 2.0, length / 2.0),
            }
        };

        let xaxis = &frame.panel.xaxis;
        let (lo, hi) = span(xaxis.direction, xaxis.tick_length);
        for value in xaxis.tick_values(frame.xlim) {
            let f = xaxis.to_fraction(value, frame.xlim);
            if !(0.0..=1.0).contains(&f) {
                continue;
            }
            let x = frame.axes_to_in(f, 0.0).0;
            let segment = [(x, frame.rect.y0 + lo), (x, frame.rect.y0 + hi)];
            self.stroke(&segment, Rgba::BLACK, xaxis.tick_width, None, None)?;
        }

        let yaxis = &frame.panel.yaxis;
        let (lo, hi) = span(yaxis.direction, yaxis.tick_length);
        for value in yaxis.tick_values(frame.ylim) {
            let f = yaxis.to_fraction(value, frame.ylim);
            if !(0.0..=1.0).contains(&f) {
                continue;
            }
            let y = frame.axes_to_in(0.0, f).1;
            let segment = [(frame.rect.x0 + lo, y), (frame.rect.x0 + hi, y)];
            self.stroke(&segment, Rgba::BLACK, yaxis.tick_width, None, None)?;
        }
        Ok(())
    }

    fn stroke_color(&self, style: &ArtistStyle) -> Rgba {
        let color = self.color(style.color.as_deref().unwrap_or("C0"), Rgba::BLACK);
        color.with_alpha(style.alpha.unwrap_or(1.0))
    }

    fn face_color(&self, style: &ArtistStyle) -> Rgba {
        let value = style.facecolor.as_deref().or(style.color.as_deref()).unwrap_or("C0");
        self.color(value, Rgba::BLACK).with_alpha(style.alpha.unwrap_or(1.0))
    }

    fn edge_color(&self, style: &ArtistStyle) -> Option<Rgba> {
        let edge = self.color(style.edgecolor.as_deref()?, Rgba::BLACK);
        Some(edge.with_alpha(style.alpha.unwrap_or(1.0)))
    }

    fn paint_artist(&self, frame: &Frame, artist: &Artist) -> Result<()> {
        let style = &artist.style;
        let clip = Some(&frame.rect);
        let linewidth = style.linewidth.unwrap_or(DEFAULT_LINEWIDTH_PT);

        match &artist.kind {
            ArtistKind::Line { xs, ys } => {
                let color = self.stroke_color(style);
                let points = frame.points(xs, ys);
                self.stroke(&points, color, linewidth, style.linestyle.as_deref(), clip)?;
                if let Some(marker) = has_marker(style.marker.as_deref()) {
                    for point in points.iter().filter(|p| frame.rect.contains(**p)) {
                        self.marker(*point, marker, LINE_MARKER_PT / 2.0, color, None)?;
                    }
                }
            }
            ArtistKind::Scatter { xs, ys, size } => {
                let face = self.face_color(style);
                let edge = self.edge_color(style);
                let marker = has_marker(style.marker.as_deref()).unwrap_or("o");
                let radius = size.max(0.0).sqrt() / 2.0;
                for point in frame.points(xs, ys).into_iter().filter(|p| frame.rect.contains(*p)) {
                    self.marker(point, marker, radius, face, edge)?;
                }
            }
            ArtistKind::Bars(bars) => {
                for bar in bars {
                    let corners = [
                        frame.data_to_in(bar.x, bar.bottom),
                        frame.data_to_in(bar.x + bar.width, bar.bottom),
                        frame.data_to_in(bar.x + bar.width, bar.bottom + bar.height),
                        frame.data_to_in(bar.x, bar.bottom + bar.height),
                    ];
                    self.shape(&corners, style, frame)?;
                }
            }
            ArtistKind::HLine { y } => {
                let y = frame.y_in(*y);
                let segment = [(frame.rect.x0, y), (frame.rect.x1, y)];
                let color = self.stroke_color(style);
                self.stroke(&segment, color, linewidth, style.linestyle.as_deref(), clip)?;
            }
            ArtistKind::VLine { x } => {
                let x = frame.x_in(*x);
                let segment = [(x, frame.rect.y0), (x, frame.rect.y1)];
                let color = self.stroke_color(style);
                self.stroke(&segment, color, linewidth, style.linestyle.as_deref(), clip)?;
            }
            ArtistKind::Rect { x, y, width, height } => {
                let corners = [
                    frame.data_to_in(*x, *y),
                    frame.data_to_in(x + width, *y),
                    frame.data_to_in(x + width, y + height),
                    frame.data_to_in(*x, y + height),
                ];
                self.shape(&corners, style, frame)?;
            }
            ArtistKind::Circle { x, y, radius } => {
                let outline: Vec<(f64, f64)> = ellipse((*x, *y), *radius, *radius, ELLIPSE_SEGMENTS)
                    .into_iter()
                    .map(|(px, py)| frame.data_to_in(px, py))
                    .collect();
                self.shape(&outline, style, frame)?;
            }
            ArtistKind::Band {
                x0,
                x1,
                ymin_frac,
                ymax_frac,
            } => {
                let (left, right) = (frame.x_in(*x0), frame.x_in(*x1));
                let bottom = frame.axes_to_in(0.0, *ymin_frac).1;
                let top = frame.axes_to_in(0.0, *ymax_frac).1;
                let corners = [(left, bottom), (right, bottom), (right, top), (left, top)];
                self.shape(&corners, style, frame)?;
            }
            ArtistKind::Text(text) => {
                let label = Label::new(
                    &text.text,
                    &text.style,
                    text.rotation,
                    frame.data_to_in(text.x, text.y),
                    (ha_fraction(&text.ha), va_fraction(&text.va)),
                );
                self.text(&label);
            }
        }
        Ok(())
    }

    /// Filled outline clipped to the axes, with an optional edge
    fn shape(&self, outline: &[(f64, f64)], style: &ArtistStyle, frame: &Frame) -> Result<()> {
        let face = self.face_color(style);
        if face.a > 0.0 {
            let clipped = clip_polygon(outline, &frame.rect);
            if clipped.len() >= 3 {
                let points: Vec<(i32, i32)> = clipped.iter().map(|p| self.page.ipx(*p)).collect();
                self.area
                    .draw(&Polygon::new(points, to_plotters(face).filled()))
                    .map_err(draw_error)?;
            }
        }
        if let Some(edge) = self.edge_color(style).filter(|c| c.a > 0.0) {
            let mut ring = outline.to_vec();
            if let Some(first) = outline.first() {
                ring.push(*first);
            }
            let width = style.linewidth.unwrap_or(DEFAULT_EDGEWIDTH_PT);
            self.stroke(&ring, edge, width, style.linestyle.as_deref(), Some(&frame.rect))?;
        }
        Ok(())
    }

    /// Polyline in inches, clipped then dashed in pixel space
    fn stroke(
        &self,
        points: &[(f64, f64)],
        color: Rgba,
        width_pt: f64,
        linestyle: Option<&str>,
        clip: Option<&Rect>,
    ) -> Result<()> {
        if color.a <= 0.0 || width_pt <= 0.0 {
            return Ok(());
        }
        let style = ShapeStyle {
            color: to_plotters(color),
            filled: false,
            stroke_width: self.page.pt(width_pt).round().max(1.0) as u32,
        };
        let pattern: Option<Vec<f64>> = linestyle
            .and_then(|ls| dash_pattern(ls, width_pt))
            .map(|dashes| dashes.into_iter().map(|d| self.page.pt(d)).collect());

        for run in clip_polyline(points, clip) {
            let run: Vec<(f64, f64)> = run.iter().map(|p| self.page.px(*p)).collect();
            let pieces = match &pattern {
                Some(pattern) => dash_polyline(&run, pattern),
                None => vec![run],
            };
            for piece in pieces {
                let piece: Vec<(i32, i32)> = piece
                    .iter()
                    .map(|(x, y)| (x.round() as i32, y.round() as i32))
                    .collect();
                self.area
                    .draw(&PathElement::new(piece, style))
                    .map_err(draw_error)?;
            }
        }
        Ok(())
    }

    /// Marker centred on `center` (inches); `radius` in points
    fn marker(
        &self,
        center: (f64, f64),
        marker: &str,
        radius: f64,
        face: Rgba,
        edge: Option<Rgba>,
    ) -> Result<()> {
        let (cx, cy) = self.page.px(center);
        let r = self.page.pt(radius).max(1.0);
        let at = |dx: f64, dy: f64| ((cx + dx * r).round() as i32, (cy + dy * r).round() as i32);
        let fill = to_plotters(face).filled();
        let outline = edge.map(|c| ShapeStyle {
            color: to_plotters(c),
            filled: false,
            stroke_width: 1,
        });

        let polygon: Option<Vec<(i32, i32)>> = match marker {
            "o" | "." => {
                let radius = if marker == "." { r / 2.0 } else { r };
                let center = (cx.round() as i32, cy.round() as i32);
                let size = radius.round().max(1.0) as u32;
                self.area.draw(&Circle::new(center, size, fill)).map_err(draw_error)?;
                if let Some(outline) = outline {
                    self.area.draw(&Circle::new(center, size, outline)).map_err(draw_error)?;
                }
                None
            }
            "s" => Some(vec![at(-1.0, -1.0), at(1.0, -1.0), at(1.0, 1.0), at(-1.0, 1.0)]),
            "^" => Some(vec![at(0.0, -1.0), at(1.0, 1.0), at(-1.0, 1.0)]),
            "v" => Some(vec![at(0.0, 1.0), at(1.0, -1.0), at(-1.0, -1.0)]),
            "D" | "d" => Some(vec![at(0.0, -1.0), at(1.0, 0.0), at(0.0, 1.0), at(-1.0, 0.0)]),
            "*" => Some(
                (0..10)
                    .map(|i| {
                        let theta = PI * (i as f64) / 5.0 - FRAC_PI_2;
                        let scale = if i % 2 == 0 { 1.0 } else { 0.4 };
                        at(scale * theta.cos(), scale * theta.sin())
                    })
                    .collect(),
            ),
            "x" | "+" => {
                let stroke = ShapeStyle {
                    color: to_plotters(face),
                    filled: false,
                    stroke_width: self.page.pt(1.0).round().max(1.0) as u32,
                };
                let arms = if marker == "x" {
                    [[at(-1.0, -1.0), at(1.0, 1.0)], [at(-1.0, 1.0), at(1.0, -1.0)]]
                } else {
                    [[at(-1.0, 0.0), at(1.0, 0.0)], [at(0.0, -1.0), at(0.0, 1.0)]]
                };
                for arm in arms {
                    self.area
                        .draw(&PathElement::new(arm.to_vec(), stroke))
                        .map_err(draw_error)?;
                }
                None
            }
            other => {
                tracing::debug!(marker = other, "Unknown marker, drawing a circle");
                return self.marker(center, "o", radius, face, edge);
            }
        };

        if let Some(points) = polygon {
            self.area
                .draw(&Polygon::new(points.clone(), fill))
                .map_err(draw_error)?;
            if let Some(outline) = outline {
                let mut ring = points;
                ring.push(ring[0]);
                self.area
                    .draw(&PathElement::new(ring, outline))
                    .map_err(draw_error)?;
            }
        }
        Ok(())
    }

    /// Draw a label centred on its box. Failures (missing fonts) are logged once.
    fn text(&self, label: &Label) {
        if label.text.is_empty() {
            return;
        }
        let color = to_plotters(self.color(&label.style.color, Rgba::BLACK));
        let family = match label.style.family.to_lowercase().as_str() {
            "serif" => FontFamily::Serif,
            "sans-serif" | "sans" => FontFamily::SansSerif,
            "monospace" => FontFamily::Monospace,
            _ => FontFamily::Name(&label.style.family),
        };
        let font_style = if label.style.is_bold() {
            FontStyle::Bold
        } else if label.style.is_italic() {
            FontStyle::Italic
        } else {
            FontStyle::Normal
        };
        let transform = match quarter_turns(label.rotation) {
            1 => FontTransform::Rotate270,
            2 => FontTransform::Rotate180,
            3 => FontTransform::Rotate90,
            _ => FontTransform::None,
        };

        let font =
            FontDesc::new(family, self.page.pt(label.style.size), font_style).transform(transform);
        let style = TextStyle::from(font)
            .color(&color)
            .pos(Pos::new(HPos::Center, VPos::Center));
        let center = self.page.ipx(label.bounds.center());

        if let Err(e) = self.area.draw(&Text::new(label.text.clone(), center, style)) {
            if !self.text_warned.replace(true) {
                tracing::warn!(error = ?e, "Text could not be rendered");
            }
        }
    }

    fn paint_legend(&self, frame: &Frame, legend: &Legend) -> Result<()> {
        let layout = LegendLayout::new(frame, legend);
        let rect = layout.rect;

        if legend.frameon {
            let corners = [
                (rect.x0, rect.y0),
                (rect.x1, rect.y0),
                (rect.x1, rect.y1),
                (rect.x0, rect.y1),
            ];
            let points: Vec<(i32, i32)> = corners.iter().map(|p| self.page.ipx(*p)).collect();
            self.area
                .draw(&Polygon::new(points, to_plotters(Rgba::WHITE.with_alpha(0.8)).filled()))
                .map_err(draw_error)?;
            let mut ring = corners.to_vec();
            ring.push(corners[0]);
            self.stroke(&ring, LEGEND_EDGE, 0.8, None, None)?;
        }

        if let Some(title) = &legend.title {
            let pad = LegendLayout::BORDER_PAD_EM * layout.em;
            let at = (rect.center().0, rect.y1 - pad);
            self.text(&Label::new(&title.text, &title.style, 0.0, at, (0.5, 1.0)));
        }

        let handle_length = LegendLayout::HANDLE_LENGTH_EM * layout.em;
        for (i, entry) in legend.entries.iter().enumerate() {
            let (x, y) = layout.entry_origin(i);
            if let Some(artist) = entry.handle.and_then(|id| frame.panel.artist(id)) {
                self.legend_handle(artist, (x, y), handle_length, layout.em)?;
            }
            let at = (x + handle_length + LegendLayout::HANDLE_GAP_EM * layout.em, y);
            self.text(&Label::new(&entry.label, &legend.style, 0.0, at, (0.0, 0.5)));
        }
        Ok(())
    }

    /// Legend key for `artist`, drawn in the handle slot starting at `(x, y)`
    fn legend_handle(
        &self,
        artist: &Artist,
        (x, y): (f64, f64),
        length: f64,
        em: f64,
    ) -> Result<()> {
        let style = &artist.style;
        match &artist.kind {
            ArtistKind::Line { .. } | ArtistKind::HLine { .. } | ArtistKind::VLine { .. } => {
                let color = self.stroke_color(style);
                let width = style.linewidth.unwrap_or(DEFAULT_LINEWIDTH_PT);
                let segment = [(x, y), (x + length, y)];
                self.stroke(&segment, color, width, style.linestyle.as_deref(), None)?;
                if let Some(marker) = has_marker(style.marker.as_deref()) {
                    self.marker((x + length / 2.0, y), marker, LINE_MARKER_PT / 2.0, color, None)?;
                }
            }
            ArtistKind::Scatter { size, .. } => {
                let marker = has_marker(style.marker.as_deref()).unwrap_or("o");
                let radius = (size.max(0.0).sqrt() / 2.0).min(in_to_pt(em) / 2.0);
                self.marker(
                    (x + length / 2.0, y),
                    marker,
                    radius,
                    self.face_color(style),
                    self.edge_color(style),
                )?;
            }
            ArtistKind::Text(_) => {}
            _ => {
                let half = 0.35 * em;
                let corners = [
                    (x, y - half),
                    (x + length, y - half),
                    (x + length, y + half),
                    (x, y + half),
                ];
                let face = self.face_color(style);
                if face.a > 0.0 {
                    let points: Vec<(i32, i32)> =
                        corners.iter().map(|p| self.page.ipx(*p)).collect();
                    self.area
                        .draw(&Polygon::new(points, to_plotters(face).filled()))
                        .map_err(draw_error)?;
                }
                if let Some(edge) = self.edge_color(style) {
                    let mut ring = corners.to_vec();
                    ring.push(corners[0]);
                    let width = style.linewidth.unwrap_or(DEFAULT_EDGEWIDTH_PT);
                    self.stroke(&ring, edge, width, style.linestyle.as_deref(), None)?;
                }
            }
        }
        Ok(())
    }
}
