//! Axes composer: scales, limits, ticks, spines, frame, grid, titles and legend
//!
//! [`setup`] applies a panel's effective [`AxesSpec`] in a fixed order (later
//! steps may read state written by earlier ones); [`legend()`] resolves the legend
//! after every drawable is on the panel.

pub mod breaks;
pub mod format;
mod legend;

pub use legend::legend;

use crate::canvas::{
    Axis, GridStyle, Panel, Spines, TextItem, TextOffset, TickDirection, TickLabelOverride,
};
use crate::config::{AxesSpec, AxisTicksSpec, FontSpec, SizeUnit, TextLike, TextSpec};
use crate::style::normalize_linestyle;
use crate::style::text::{latex_wrap, merge_text_style, EffectiveStyle};
use breaks::range_breaks;

/// Default title padding in points
const TITLE_PAD: f64 = 6.0;
/// Default axis label padding in points
const LABEL_PAD: f64 = 4.0;
const DEFAULT_SPINE_WIDTH: f64 = 0.8;

/// Apply `axes` to `panel`.
///
/// Order: scales, limits, ticks, spines, frame, grid, then title and labels.
pub fn setup(
    panel: &mut Panel,
    axes: &AxesSpec,
    font: &FontSpec,
    size_unit: SizeUnit,
    use_tex: bool,
) {
    panel.xaxis.scale = axes.xscale;
    panel.yaxis.scale = axes.yscale;

    if let Some([lo, hi]) = axes.limits.x {
        panel.set_xlim(lo, hi);
    }
    if let Some([lo, hi]) = axes.limits.y {
        panel.set_ylim(lo, hi);
    }

    configure_ticks(&mut panel.xaxis, &axes.xticks, font, use_tex);
    configure_ticks(&mut panel.yaxis, &axes.yticks, font, use_tex);

    let spines = &axes.spines;
    panel.spines = Spines {
        left: spines.show_left,
        right: spines.show_right,
        top: spines.show_top,
        bottom: spines.show_bottom,
        color: spines.color.clone(),
        linewidth: spines.linewidth.unwrap_or(DEFAULT_SPINE_WIDTH),
    };

    if !axes.show_axes_frame {
        panel.frame_on = false;
        panel.spines.left = false;
        panel.spines.right = false;
        panel.spines.top = false;
        panel.spines.bottom = false;
    }

    panel.grid = axes.grid.show.then(|| GridStyle {
        which: axes.grid.which,
        linestyle: normalize_linestyle(&axes.grid.linestyle),
        linewidth: axes.grid.linewidth,
        color: axes.grid.color.clone(),
    });

    let item = |value: &TextLike, shown: bool, rotation: f64, pad: f64| {
        if !shown {
            return None;
        }
        text_item(value, font, size_unit, use_tex, rotation, pad)
    };
    panel.title = item(&axes.title, axes.show_title, 0.0, TITLE_PAD);
    panel.xlabel = item(&axes.xlabel, axes.show_xlabel, 0.0, LABEL_PAD);
    panel.ylabel = item(&axes.ylabel, axes.show_ylabel, 90.0, LABEL_PAD);
}

/// Tick positions, formatter, styling and per-tick overrides for one axis
fn configure_ticks(axis: &mut Axis, ticks: &AxisTicksSpec, font: &FontSpec, use_tex: bool) {
    axis.locations = match (&ticks.locations, &ticks.range) {
        (Some(locations), _) => Some(locations.clone()),
        (None, Some(range)) if range.len() == 3 => Some(range_breaks(range[0], range[1], range[2])),
        _ => None,
    };
    axis.formatter = ticks.fmt.clone();

    axis.label_style = merge_text_style(Some(&ticks.style_spec()), font);
    axis.label_rotation = ticks.rotation.unwrap_or(0.0);
    axis.show_labels = ticks.show;

    if let Some(direction) = &ticks.direction {
        match TickDirection::parse(direction) {
            Some(parsed) => axis.direction = parsed,
            None => {
                tracing::warn!(direction = %direction, "Unknown tick direction, keeping default")
            }
        }
    }
    if let Some(length) = ticks.length {
        axis.tick_length = length;
    }
    if let Some(width) = ticks.width {
        axis.tick_width = width;
    }

    axis.label_overrides = ticks
        .labels
        .iter()
        .flatten()
        .map(|label| {
            let spec = label.as_spec()?;
            let style = override_style(&spec, &axis.label_style);
            let mut custom = TickLabelOverride::from_spec(&spec, style);
            custom.text = custom.text.map(|text| latex_wrap(&text, &custom.style, use_tex));
            Some(custom)
        })
        .collect();
}

/// Per-tick style: explicit descriptor fields over the axis-wide tick style
fn override_style(spec: &TextSpec, base: &EffectiveStyle) -> EffectiveStyle {
    EffectiveStyle {
        family: spec.family.clone().unwrap_or_else(|| base.family.clone()),
        size: spec.size.unwrap_or(base.size),
        weight: spec.weight.clone().unwrap_or_else(|| base.weight.clone()),
        style: spec.style.clone().unwrap_or_else(|| base.style.clone()),
        color: spec.color.clone().unwrap_or_else(|| base.color.clone()),
    }
}

/// Resolve a text-like title or label.
///
/// `None` when absent, hidden, unset or empty.
pub fn text_item(
    value: &TextLike,
    font: &FontSpec,
    size_unit: SizeUnit,
    use_tex: bool,
    default_rotation: f64,
    default_pad: f64,
) -> Option<TextItem> {
    let spec = value.as_spec()?;
    if !spec.show {
        return None;
    }
    let text = spec.text.as_deref().filter(|t| !t.is_empty())?;
    let style = merge_text_style(Some(&spec.style_spec()), font);
    Some(TextItem {
        text: latex_wrap(text, &style, use_tex),
        rotation: spec.rotation.unwrap_or(default_rotation),
        ha: spec.ha.clone(),
        va: spec.va.clone(),
        pad: spec.pad.unwrap_or(default_pad),
        offset: TextOffset {
            dx: spec.dx.unwrap_or(0.0),
            dy: spec.dy.unwrap_or(0.0),
            dx_unit: spec.dx_unit,
            dy_unit: spec.dy_unit,
            size_unit,
        },
        style,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Bbox;
    use crate::config::{GridSpec, OffsetUnit, ScaleKind};

    fn panel() -> Panel {
        let bbox = Bbox {
            left: 0.1,
            bottom: 0.1,
            width: 0.8,
            height: 0.8,
        };
        Panel::new(0, 0, 0, bbox, (4.0, 3.0))
    }

    #[test]
    fn test_range_ticks_inclusive() {
        let mut axes = AxesSpec::default();
        axes.xticks.range = Some(vec![0.0, 1.0, 0.25]);
        let mut p = panel();
        setup(&mut p, &axes, &FontSpec::default(), SizeUnit::In, false);
        p.set_xlim(0.0, 1.0);
        assert_eq!(p.xaxis.tick_values(p.xlim()), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn test_locations_beat_range() {
        let mut axes = AxesSpec::default();
        axes.yticks.locations = Some(vec![1.0, 2.0]);
        axes.yticks.range = Some(vec![0.0, 10.0, 1.0]);
        let mut p = panel();
        setup(&mut p, &axes, &FontSpec::default(), SizeUnit::In, false);
        assert_eq!(p.yaxis.locations, Some(vec![1.0, 2.0]));
    }

    #[test]
    fn test_frame_hide_overrides_spines() {
        let axes = AxesSpec {
            show_axes_frame: false,
            ..Default::default()
        };
        let mut p = panel();
        setup(&mut p, &axes, &FontSpec::default(), SizeUnit::In, false);
        assert!(!p.frame_on);
        assert!(!p.spines.left && !p.spines.bottom && !p.spines.top && !p.spines.right);
    }

    #[test]
    fn test_grid_and_scales() {
        let axes = AxesSpec {
            xscale: ScaleKind::Log,
            grid: GridSpec {
                show: false,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut p = panel();
        setup(&mut p, &axes, &FontSpec::default(), SizeUnit::In, false);
        assert_eq!(p.xaxis.scale, ScaleKind::Log);
        assert!(p.grid.is_none());

        setup(&mut p, &AxesSpec::default(), &FontSpec::default(), SizeUnit::In, false);
        assert_eq!(p.grid.as_ref().map(|g| g.linestyle.as_str()), Some(":"));
    }

    #[test]
    fn test_title_and_labels() {
        let axes = AxesSpec {
            title: TextLike::Described(TextSpec {
                text: Some("Latency".to_string()),
                weight: Some("bold".to_string()),
                dx: Some(0.5),
                dx_unit: OffsetUnit::Points,
                ..Default::default()
            }),
            xlabel: TextLike::Literal(String::new()),
            ylabel: TextLike::Literal("count".to_string()),
            ..Default::default()
        };
        let mut p = panel();
        setup(&mut p, &axes, &FontSpec::default(), SizeUnit::Mm, true);

        let title = p.title.as_ref().unwrap();
        assert_eq!(title.text, r"\textbf{Latency}");
        assert_eq!(title.offset.dx, 0.5);
        assert_eq!(title.offset.size_unit, SizeUnit::Mm);
        assert!(p.xlabel.is_none());
        assert_eq!(p.ylabel.as_ref().unwrap().rotation, 90.0);
    }

    #[test]
    fn test_hidden_title() {
        let axes = AxesSpec {
            title: TextLike::Literal("hidden".to_string()),
            show_title: false,
            ..Default::default()
        };
        let mut p = panel();
        setup(&mut p, &axes, &FontSpec::default(), SizeUnit::In, false);
        assert!(p.title.is_none());
    }

    #[test]
    fn test_tick_label_overrides() {
        let mut axes = AxesSpec::default();
        axes.xticks.locations = Some(vec![0.0, 1.0]);
        axes.xticks.size = Some(7.0);
        axes.xticks.labels = Some(vec![
            TextLike::Absent,
            TextLike::Described(TextSpec {
                text: Some("one".to_string()),
                color: Some("red".to_string()),
                ..Default::default()
            }),
        ]);
        let mut p = panel();
        setup(&mut p, &axes, &FontSpec::default(), SizeUnit::In, false);

        let ticks = p.xaxis.ticks((0.0, 1.0));
        assert_eq!(ticks[0].label, "0");
        assert_eq!(ticks[1].label, "one");
        assert_eq!(ticks[1].style.color, "red");
        assert_eq!(ticks[1].style.size, 7.0);
    }

    #[test]
    fn test_tick_label_override_keeps_tick_color() {
        let mut axes = AxesSpec::default();
        axes.yticks.locations = Some(vec![0.0, 1.0]);
        axes.yticks.color = "gray".to_string();
        axes.yticks.labels = Some(vec![TextLike::Described(TextSpec {
            weight: Some("bold".to_string()),
            ..Default::default()
        })]);
        let mut p = panel();
        setup(&mut p, &axes, &FontSpec::default(), SizeUnit::In, false);

        let ticks = p.yaxis.ticks((0.0, 1.0));
        assert_eq!(ticks[0].style.weight, "bold");
        assert_eq!(ticks[0].style.color, "gray");
        assert_eq!(ticks[1].style.weight, "normal");
    }
}
