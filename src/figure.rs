//! Figure assembly: panel grid layout, per-panel dispatch and shared axes

use crate::axes;
use crate::canvas::{Bbox, Dim, Figure, Panel};
use crate::config::{FigureSpec, LayoutSpec, PanelSpec};
use crate::layer;
use crate::overlay::draw_overlays;
use crate::reader::{self, ExternalData};
use crate::style::context::{self, PresentationContext};
use crate::Result;

/// Figure-fraction margins used when spacing is fixed on both axes
const FIXED_MARGINS: Margins = Margins {
    left: 0.125,
    right: 0.1,
    bottom: 0.11,
    top: 0.12,
};

/// Room kept around the axes in constrained layout, in multiples of the font size
const AUTO_LEFT_EM: f64 = 4.5;
const AUTO_RIGHT_EM: f64 = 1.2;
const AUTO_BOTTOM_EM: f64 = 4.0;
const AUTO_TOP_EM: f64 = 2.4;
const AUTO_WSPACE_EM: f64 = 5.0;
const AUTO_HSPACE_EM: f64 = 6.0;

/// Fallback spacing ratio when automatic spacing leaves no room for the axes
const FALLBACK_SPACING: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Margins {
    left: f64,
    right: f64,
    bottom: f64,
    top: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Spacing {
    /// Gap as a figure fraction
    Absolute(f64),
    /// Gap as a fraction of the average axes extent
    Relative(f64),
}

/// Axes extent and gap along one direction
fn split(available: f64, n: usize, spacing: Spacing) -> (f64, f64) {
    let n = n.max(1) as f64;
    match spacing {
        Spacing::Relative(ratio) => {
            let extent = available / (n + (n - 1.0) * ratio);
            (extent, ratio * extent)
        }
        Spacing::Absolute(gap) => {
            let extent = (available - (n - 1.0) * gap) / n;
            if extent > 0.0 {
                (extent, gap)
            } else {
                split(available, n as usize, Spacing::Relative(FALLBACK_SPACING))
            }
        }
    }
}

/// Lay out a `rows x cols` panel grid on a canvas of `width_in x height_in`.
///
/// Unset spacing is constrained (derived from the font size); a set `wspace` or
/// `hspace` fixes that direction only.
pub fn make_grid(layout: &LayoutSpec, width_in: f64, height_in: f64, font_size: f64) -> Figure {
    let em_in = font_size / 72.0;
    let margins = if layout.is_constrained() {
        Margins {
            left: AUTO_LEFT_EM * em_in / width_in,
            right: AUTO_RIGHT_EM * em_in / width_in,
            bottom: AUTO_BOTTOM_EM * em_in / height_in,
            top: AUTO_TOP_EM * em_in / height_in,
        }
    } else {
        FIXED_MARGINS
    };

    let wspace = match layout.wspace {
        Some(ratio) => Spacing::Relative(ratio),
        None => Spacing::Absolute(AUTO_WSPACE_EM * em_in / width_in),
    };
    let hspace = match layout.hspace {
        Some(ratio) => Spacing::Relative(ratio),
        None => Spacing::Absolute(AUTO_HSPACE_EM * em_in / height_in),
    };

    let (axes_w, gap_w) = split(1.0 - margins.left - margins.right, layout.cols, wspace);
    let (axes_h, gap_h) = split(1.0 - margins.bottom - margins.top, layout.rows, hspace);

    let mut figure = Figure::new(width_in, height_in, 100);
    figure.rows = layout.rows;
    figure.cols = layout.cols;
    for row in 0..layout.rows {
        for col in 0..layout.cols {
            let bbox = Bbox {
                left: margins.left + col as f64 * (axes_w + gap_w),
                bottom: margins.bottom + (layout.rows - 1 - row) as f64 * (axes_h + gap_h),
                width: axes_w,
                height: axes_h,
            };
            let index = row * layout.cols + col;
            figure.panels.push(Panel::new(index, row, col, bbox, (width_in, height_in)));
        }
    }
    tracing::debug!(rows = layout.rows, cols = layout.cols, "Created panel grid");
    figure
}

/// Draw one panel: series, overlays, axes styling, legend
fn draw_panel(
    panel: &mut Panel,
    spec: &PanelSpec,
    figure_spec: &FigureSpec,
    external: Option<&ExternalData>,
) -> Result<()> {
    let ctx = context::current();
    let base_dir = figure_spec.base_dir.as_deref();

    for series in &spec.series {
        let Some(table) = reader::series_table(series, base_dir, external)? else {
            tracing::warn!(series = %series.kind, "Series has no data source, skipping");
            continue;
        };
        let table = match &series.query {
            Some(query) => reader::filter_rows(table, query)?,
            None => table,
        };
        layer::make(series.kind.as_str(), series)?.draw(panel, &table)?;
    }

    draw_overlays(panel, spec.overlays.as_deref());

    axes::setup(panel, &spec.axes, &ctx.font, figure_spec.size.unit, ctx.font.use_tex);
    axes::legend(panel, &spec.axes.legend, &ctx.font, ctx.font.use_tex);
    Ok(())
}

/// Fill grid slots row-major with the figure's panel specs; hide the remaining slots
pub fn draw_panels(
    figure: &mut Figure,
    spec: &FigureSpec,
    external: Option<&ExternalData>,
) -> Result<()> {
    for (index, panel) in figure.panels.iter_mut().enumerate() {
        match spec.panels.get(index) {
            Some(panel_spec) => draw_panel(panel, panel_spec, spec, external)?,
            None => panel.hide(),
        }
    }
    Ok(())
}

/// Unify view limits across visible panels and hide inner tick labels
pub fn share_axes(figure: &mut Figure, layout: &LayoutSpec) {
    for (dim, shared) in [(Dim::X, layout.shared_x), (Dim::Y, layout.shared_y)] {
        if !shared {
            continue;
        }
        let union = figure
            .visible_panels()
            .map(|p| match dim {
                Dim::X => p.xlim(),
                Dim::Y => p.ylim(),
            })
            .reduce(|(a_lo, a_hi), (b_lo, b_hi)| (a_lo.min(b_lo), a_hi.max(b_hi)));
        let Some((lo, hi)) = union else {
            continue;
        };

        let visible: Vec<(usize, usize)> =
            figure.visible_panels().map(|p| (p.row, p.col)).collect();
        for panel in figure.panels.iter_mut().filter(|p| p.visible) {
            match dim {
                Dim::X => {
                    panel.set_xlim(lo, hi);
                    // Only the lowest visible panel of a column keeps its labels
                    let below = visible.iter().any(|&(r, c)| c == panel.col && r > panel.row);
                    if below {
                        panel.xaxis.show_labels = false;
                    }
                }
                Dim::Y => {
                    panel.set_ylim(lo, hi);
                    let left = visible.iter().any(|&(r, c)| r == panel.row && c < panel.col);
                    if left {
                        panel.yaxis.show_labels = false;
                    }
                }
            }
        }
    }
}

/// Build the whole scene for `spec` without exporting it.
///
/// The figure's presentation context is active for the duration of the call.
pub fn render_figure(spec: &FigureSpec, external: Option<&ExternalData>) -> Result<Figure> {
    let _context = PresentationContext::from_spec(spec).enter();
    let ctx = context::current();

    let mut figure = make_grid(&spec.layout, ctx.width_in, ctx.height_in, ctx.font.size);
    figure.dpi = ctx.dpi;
    figure.palette = ctx.palette.clone();

    draw_panels(&mut figure, spec, external)?;
    share_axes(&mut figure, &spec.layout);
    tracing::debug!(
        panels = spec.panels.len(),
        slots = figure.panels.len(),
        "Rendered figure"
    );
    Ok(figure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::ArtistKind;
    use crate::config::{validate, OverlayKind, OverlaySpec, SeriesKind, SeriesSpec};
    use crate::reader::DataSource;
    use polars::prelude::*;
    use serde_json::json;

    fn layout(rows: usize, cols: usize) -> LayoutSpec {
        LayoutSpec {
            rows,
            cols,
            ..Default::default()
        }
    }

    #[test]
    fn test_grid_is_row_major() {
        let figure = make_grid(&layout(2, 2), 6.0, 4.0, 9.0);
        assert_eq!(figure.panels.len(), 4);
        let p1 = &figure.panels[1];
        let p2 = &figure.panels[2];
        assert_eq!((p1.row, p1.col), (0, 1));
        assert!(p1.bbox.left > figure.panels[0].bbox.left);
        assert!(p2.bbox.bottom < figure.panels[0].bbox.bottom);
        for p in &figure.panels {
            assert!(p.bbox.width > 0.0 && p.bbox.height > 0.0);
            assert!(p.bbox.right() <= 1.0 && p.bbox.top() <= 1.0);
        }
    }

    #[test]
    fn test_explicit_wspace() {
        let spec = LayoutSpec {
            wspace: Some(0.5),
            hspace: Some(0.0),
            ..layout(1, 2)
        };
        let figure = make_grid(&spec, 6.0, 4.0, 9.0);
        let (a, b) = (&figure.panels[0].bbox, &figure.panels[1].bbox);
        let gap = b.left - a.right();
        assert!((gap - 0.5 * a.width).abs() < 1e-12);
    }

    #[test]
    fn test_extra_slots_hidden() {
        let spec = validate(
            json!({
                "size": {"width": 6, "height": 2},
                "layout": {"rows": 1, "cols": 3},
                "panels": [{}, {}]
            }),
            None,
        )
        .unwrap();
        let figure = render_figure(&spec, None).unwrap();
        assert_eq!(figure.panels.len(), 3);
        assert_eq!(figure.visible_panels().count(), 2);
        assert!(!figure.panels[2].visible);
    }

    #[test]
    fn test_external_frame_feeds_series() {
        let mut spec = validate(
            json!({"size": {"width": 4, "height": 3}, "panels": [{}]}),
            None,
        )
        .unwrap();
        let mut series = SeriesSpec::new(SeriesKind::Cdf);
        series.x = Some("v".to_string());
        spec.panels[0].series.push(series);
        spec.panels[0].overlays = Some(vec![OverlaySpec {
            x: Some(2.0),
            ..OverlaySpec::new(OverlayKind::Vline)
        }]);

        let df = df! { "v" => [3.0, 1.0, 2.0] }.unwrap();
        let external = ExternalData::Single(DataSource::Frame(df));
        let figure = render_figure(&spec, Some(&external)).unwrap();

        let artists = figure.panels[0].artists();
        assert_eq!(artists.len(), 2);
        assert_eq!(
            artists[0].kind,
            ArtistKind::Line {
                xs: vec![1.0, 2.0, 3.0],
                ys: vec![1.0 / 3.0, 2.0 / 3.0, 1.0]
            }
        );
        assert_eq!(figure.panels[0].ylim(), (0.0, 1.0));
    }

    #[test]
    fn test_context_restored_after_render() {
        let spec = validate(
            json!({"size": {"width": 4, "height": 3}, "panels": [], "export": {"dpi": 72}}),
            None,
        )
        .unwrap();
        let figure = render_figure(&spec, None).unwrap();
        assert_eq!(figure.dpi, 72);
        assert_eq!(context::depth(), 0);
    }

    #[test]
    fn test_shared_x_unifies_limits() {
        let spec = LayoutSpec {
            shared_x: true,
            ..layout(2, 1)
        };
        let mut figure = make_grid(&spec, 4.0, 6.0, 9.0);
        figure.panels[0].set_xlim(0.0, 1.0);
        figure.panels[1].set_xlim(-2.0, 0.5);
        share_axes(&mut figure, &spec);

        assert_eq!(figure.panels[0].xlim(), (-2.0, 1.0));
        assert_eq!(figure.panels[1].xlim(), (-2.0, 1.0));
        assert!(!figure.panels[0].xaxis.show_labels);
        assert!(figure.panels[1].xaxis.show_labels);
    }

    #[test]
    fn test_unregistered_type_fails() {
        let mut spec = validate(
            json!({"size": {"width": 4, "height": 3}, "panels": [{}]}),
            None,
        )
        .unwrap();
        let mut series = SeriesSpec::new(SeriesKind::Heatmap);
        series.x = Some("v".to_string());
        spec.panels[0].series.push(series);
        let external = ExternalData::Single(DataSource::Frame(df! { "v" => [1.0] }.unwrap()));
        assert!(matches!(
            render_figure(&spec, Some(&external)),
            Err(crate::NicefigsError::LayerNotFound(_))
        ));
    }
}
