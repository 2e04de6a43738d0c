//! Histogram layer - counts of `x` in equal-width bins

use super::{column_values, required_column, series_style, Layer};
use crate::canvas::{Artist, ArtistKind, BarRect, Panel};
use crate::config::SeriesSpec;
use crate::{DataFrame, Result};

pub const DEFAULT_BINS: usize = 30;

#[derive(Debug, Clone)]
pub struct HistogramLayer {
    spec: SeriesSpec,
}

impl HistogramLayer {
    pub fn new(spec: SeriesSpec) -> Self {
        Self { spec }
    }
}

/// Equal-width bins over the finite values; the last bin includes its right edge.
///
/// A constant sample is centred in a unit-wide range.
pub fn histogram(values: &[f64], bins: usize) -> Vec<BarRect> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let bins = bins.max(1);
    let (Some(min), Some(max)) = (
        finite.iter().copied().reduce(f64::min),
        finite.iter().copied().reduce(f64::max),
    ) else {
        return Vec::new();
    };
    let (lo, hi) = if min == max { (min - 0.5, max + 0.5) } else { (min, max) };
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for v in finite {
        let index = (((v - lo) / width) as usize).min(bins - 1);
        counts[index] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| BarRect {
            x: lo + i as f64 * width,
            width,
            bottom: 0.0,
            height: count as f64,
        })
        .collect()
}

impl Layer for HistogramLayer {
    fn draw(&self, panel: &mut Panel, table: &DataFrame) -> Result<()> {
        let values = column_values(table, required_column(&self.spec, "x")?)?;
        let bars = histogram(&values, self.spec.bins.unwrap_or(DEFAULT_BINS));

        let mut style = series_style(&self.spec);
        style.facecolor = Some(self.spec.style.color.clone());
        style.marker = None;

        panel.add_artist(
            Artist::new(ArtistKind::Bars(bars))
                .with_style(style)
                .with_label(self.spec.label_text()),
        );
        Ok(())
    }
}
