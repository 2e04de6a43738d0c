//! Declarative overlays: reference lines, shapes, bands and annotations
//!
//! Overlays are composited after the series of a panel. Drawing is fail-soft:
//! an overlay with missing or unusable geometry is logged and skipped, and the
//! rest of the batch still draws.

use crate::canvas::{Artist, ArtistId, ArtistKind, ArtistStyle, Panel, TextArtist};
use crate::config::{OverlayKind, OverlaySpec};
use crate::style::context;
use crate::style::normalize_linestyle;
use crate::style::text::EffectiveStyle;

/// Marker area of a point overlay without `width`, in points squared
pub const DEFAULT_POINT_SIZE: f64 = 30.0;

/// Why an overlay was skipped
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
enum Skip {
    #[error("missing required field(s): {0}")]
    Missing(&'static str),
    #[error("field '{0}' is not a finite number")]
    NotFinite(&'static str),
    #[error("field '{0}' must not be negative")]
    Negative(&'static str),
}

fn need(value: Option<f64>, name: &'static str, fields: &'static str) -> Result<f64, Skip> {
    let value = value.ok_or(Skip::Missing(fields))?;
    if !value.is_finite() {
        return Err(Skip::NotFinite(name));
    }
    Ok(value)
}

fn stroke_style(spec: &OverlaySpec) -> ArtistStyle {
    ArtistStyle {
        color: spec.color.clone(),
        linewidth: spec.linewidth,
        linestyle: spec.linestyle.as_deref().map(normalize_linestyle),
        alpha: spec.alpha,
        zorder: spec.zorder.map(f64::from),
        ..Default::default()
    }
}

/// Patch style: explicit face/edge colors win over `color`
fn fill_style(spec: &OverlaySpec) -> ArtistStyle {
    let face = if spec.fill == Some(false) {
        Some("none".to_string())
    } else {
        spec.facecolor.clone().or_else(|| spec.color.clone())
    };
    ArtistStyle {
        facecolor: face,
        edgecolor: spec.edgecolor.clone().or_else(|| spec.color.clone()),
        ..stroke_style(spec)
    }
}

fn text_style() -> EffectiveStyle {
    EffectiveStyle::from_font(&context::current().font)
}

/// Centred label drawn over a rect or circle
fn shape_label(spec: &OverlaySpec, cx: f64, cy: f64) -> Option<Artist> {
    let text = spec.text.as_deref().filter(|t| !t.is_empty())?;
    let style = ArtistStyle {
        zorder: spec.zorder.map(|z| f64::from(z) + 1.0),
        ..Default::default()
    };
    Some(
        Artist::new(ArtistKind::Text(TextArtist {
            x: cx + spec.text_dx,
            y: cy + spec.text_dy,
            text: text.to_string(),
            style: text_style(),
            ha: spec.text_ha.clone().unwrap_or_else(|| "center".to_string()),
            va: "center".to_string(),
            rotation: spec.text_rotation.unwrap_or(0.0),
        }))
        .with_style(style),
    )
}

/// Build the overlay's artist and any label drawn with it
fn build(spec: &OverlaySpec) -> Result<(Artist, Option<Artist>), Skip> {
    let built = match spec.kind {
        OverlayKind::Vline => {
            let x = need(spec.x, "x", "x")?;
            (Artist::new(ArtistKind::VLine { x }).with_style(stroke_style(spec)), None)
        }
        OverlayKind::Hline => {
            let y = need(spec.y, "y", "y")?;
            (Artist::new(ArtistKind::HLine { y }).with_style(stroke_style(spec)), None)
        }
        OverlayKind::Line => {
            const FIELDS: &str = "x0, y0, x1, y1";
            let x0 = need(spec.x0, "x0", FIELDS)?;
            let y0 = need(spec.y0, "y0", FIELDS)?;
            let x1 = need(spec.x1, "x1", FIELDS)?;
            let y1 = need(spec.y1, "y1", FIELDS)?;
            let kind = ArtistKind::Line {
                xs: vec![x0, x1],
                ys: vec![y0, y1],
            };
            (Artist::new(kind).with_style(stroke_style(spec)), None)
        }
        OverlayKind::Point => {
            let x = need(spec.x, "x", "x, y")?;
            let y = need(spec.y, "y", "x, y")?;
            let size = match spec.width {
                Some(w) if !w.is_finite() => return Err(Skip::NotFinite("width")),
                Some(w) if w < 0.0 => return Err(Skip::Negative("width")),
                Some(w) => w,
                None => DEFAULT_POINT_SIZE,
            };
            let style = ArtistStyle {
                color: spec.color.clone(),
                alpha: spec.alpha,
                zorder: spec.zorder.map(f64::from),
                marker: Some("o".to_string()),
                ..Default::default()
            };
            let kind = ArtistKind::Scatter {
                xs: vec![x],
                ys: vec![y],
                size,
            };
            (Artist::new(kind).with_style(style), None)
        }
        OverlayKind::Rect => {
            let (x, y, width, height) = match (spec.x, spec.y, spec.width, spec.height) {
                (Some(x), Some(y), Some(w), Some(h)) => (x, y, w, h),
                _ => {
                    const FIELDS: &str = "x, y, width, height or x0, x1, y0, y1";
                    let x0 = need(spec.x0, "x0", FIELDS)?;
                    let x1 = need(spec.x1, "x1", FIELDS)?;
                    let y0 = need(spec.y0, "y0", FIELDS)?;
                    let y1 = need(spec.y1, "y1", FIELDS)?;
                    (x0.min(x1), y0.min(y1), (x1 - x0).abs(), (y1 - y0).abs())
                }
            };
            for (value, name) in [(x, "x"), (y, "y"), (width, "width"), (height, "height")] {
                if !value.is_finite() {
                    return Err(Skip::NotFinite(name));
                }
            }
            let kind = ArtistKind::Rect { x, y, width, height };
            let label = shape_label(spec, x + width / 2.0, y + height / 2.0);
            (Artist::new(kind).with_style(fill_style(spec)), label)
        }
        OverlayKind::Circle => {
            const FIELDS: &str = "x, y, radius";
            let x = need(spec.x, "x", FIELDS)?;
            let y = need(spec.y, "y", FIELDS)?;
            let radius = need(spec.radius, "radius", FIELDS)?;
            if radius < 0.0 {
                return Err(Skip::Negative("radius"));
            }
            let label = shape_label(spec, x, y);
            let kind = ArtistKind::Circle { x, y, radius };
            (Artist::new(kind).with_style(fill_style(spec)), label)
        }
        OverlayKind::Annotation => {
            const FIELDS: &str = "x, y, text";
            let x = need(spec.x, "x", FIELDS)?;
            let y = need(spec.y, "y", FIELDS)?;
            let text = spec.text.clone().ok_or(Skip::Missing(FIELDS))?;
            let kind = ArtistKind::Text(TextArtist {
                x: x + spec.text_dx,
                y: y + spec.text_dy,
                text,
                style: text_style(),
                ha: spec.text_ha.clone().unwrap_or_else(|| "center".to_string()),
                va: spec.text_va.clone().unwrap_or_else(|| "center".to_string()),
                rotation: spec.text_rotation.unwrap_or(0.0),
            });
            let style = ArtistStyle {
                color: spec.color.clone(),
                alpha: spec.alpha,
                zorder: spec.zorder.map(f64::from),
                ..Default::default()
            };
            (Artist::new(kind).with_style(style), None)
        }
        OverlayKind::Band => {
            let x0 = need(spec.x0, "x0", "x0, x1")?;
            let x1 = need(spec.x1, "x1", "x0, x1")?;
            let kind = ArtistKind::Band {
                x0: x0.min(x1),
                x1: x0.max(x1),
                ymin_frac: spec.ymin_frac.unwrap_or(0.0).clamp(0.0, 1.0),
                ymax_frac: spec.ymax_frac.unwrap_or(1.0).clamp(0.0, 1.0),
            };
            let style = ArtistStyle {
                facecolor: spec.facecolor.clone().or_else(|| spec.color.clone()),
                edgecolor: spec.edgecolor.clone(),
                ..stroke_style(spec)
            };
            (Artist::new(kind).with_style(style), None)
        }
    };
    Ok(built)
}

/// Draw one overlay; `None` when nothing was drawn.
///
/// With `show_in_legend` the artist is labelled with `label` (an empty label
/// still reserves a legend slot); otherwise it never appears in the legend.
pub fn draw_overlay(panel: &mut Panel, spec: &OverlaySpec) -> Option<ArtistId> {
    let (artist, label) = match build(spec) {
        Ok(built) => built,
        Err(reason) => {
            tracing::warn!(overlay = %spec.kind, %reason, "Skipping overlay");
            return None;
        }
    };

    let legend_label = if spec.show_in_legend {
        Some(spec.label.clone().unwrap_or_default())
    } else {
        None
    };
    let id = panel.add_artist(artist.with_label(legend_label));
    if let Some(label) = label {
        panel.add_artist(label);
    }
    Some(id)
}

/// Draw every overlay in order, returning the handles of those drawn
pub fn draw_overlays(panel: &mut Panel, overlays: Option<&[OverlaySpec]>) -> Vec<ArtistId> {
    overlays
        .unwrap_or_default()
        .iter()
        .filter_map(|spec| draw_overlay(panel, spec))
        .collect()
}
