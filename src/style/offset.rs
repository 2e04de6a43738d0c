//! Positional offsets for text and legends
//!
//! Offsets never move the data coordinate system. They are resolved to a
//! display-space translation at paint time, from the panel's limits and geometry
//! as they are then.

use super::units::{pt_to_in, to_inches};
use crate::config::{LegendOffsetUnit, OffsetUnit, SizeUnit};

/// Inches of translation for one text offset component.
///
/// `points` mode reads `value` in the figure size unit. `axes` mode treats it as
/// a data deflection: `value / (axis_max - axis_min) * (axes_fraction * figure_extent_in)`.
pub fn text_offset_inches(
    value: f64,
    unit: OffsetUnit,
    size_unit: SizeUnit,
    axis_span: f64,
    axes_fraction: f64,
    figure_extent_in: f64,
) -> f64 {
    match unit {
        OffsetUnit::Points => to_inches(value, size_unit),
        OffsetUnit::Axes => {
            if axis_span == 0.0 || !axis_span.is_finite() {
                return 0.0;
            }
            value / axis_span * (axes_fraction * figure_extent_in)
        }
    }
}

/// Legend offset component as an axes fraction.
///
/// `axes` values already are fractions; `points` values are 1/72 in and divided
/// by the axes extent.
pub fn legend_offset_fraction(value: f64, unit: LegendOffsetUnit, axes_extent_in: f64) -> f64 {
    match unit {
        LegendOffsetUnit::Axes => value,
        LegendOffsetUnit::Points => {
            if axes_extent_in <= 0.0 {
                0.0
            } else {
                pt_to_in(value) / axes_extent_in
            }
        }
    }
}

/// Shift an anchor box (`[x, y]` or `[x, y, w, h]`) by an axes-fraction offset.
pub fn shift_anchor(anchor: &[f64], dx: f64, dy: f64) -> Vec<f64> {
    anchor
        .iter()
        .enumerate()
        .map(|(i, v)| match i {
            0 => v + dx,
            1 => v + dy,
            _ => *v,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_mode_uses_size_unit() {
        let dx = text_offset_inches(25.4, OffsetUnit::Points, SizeUnit::Mm, 10.0, 0.5, 4.0);
        assert!((dx - 1.0).abs() < 1e-12);
        let dx = text_offset_inches(0.25, OffsetUnit::Points, SizeUnit::In, 10.0, 0.5, 4.0);
        assert_eq!(dx, 0.25);
    }

    #[test]
    fn test_axes_mode_scales_with_limits() {
        // 1 data unit over a span of 10 on an axes 0.5 * 4in = 2in wide
        let dx = text_offset_inches(1.0, OffsetUnit::Axes, SizeUnit::In, 10.0, 0.5, 4.0);
        assert!((dx - 0.2).abs() < 1e-12);
        // Doubling the span halves the offset
        let dx = text_offset_inches(1.0, OffsetUnit::Axes, SizeUnit::In, 20.0, 0.5, 4.0);
        assert!((dx - 0.1).abs() < 1e-12);
        assert_eq!(text_offset_inches(1.0, OffsetUnit::Axes, SizeUnit::In, 0.0, 0.5, 4.0), 0.0);
    }

    #[test]
    fn test_legend_offsets() {
        assert_eq!(legend_offset_fraction(0.1, LegendOffsetUnit::Axes, 3.0), 0.1);
        let f = legend_offset_fraction(72.0, LegendOffsetUnit::Points, 2.0);
        assert!((f - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_shift_anchor_keeps_box_size() {
        assert_eq!(shift_anchor(&[1.0, 0.5, 0.3, 0.2], 0.25, -0.25), vec![1.25, 0.25, 0.3, 0.2]);
        assert_eq!(shift_anchor(&[0.0, 1.0], 0.5, 0.5), vec![0.5, 1.5]);
    }
}
