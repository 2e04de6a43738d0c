//! Empirical CDF layer, registered as both `cdf` and `ecdf`

use super::{column_values, required_column, series_style, Layer};
use crate::canvas::{Artist, ArtistKind, Panel};
use crate::config::SeriesSpec;
use crate::{DataFrame, Result};

#[derive(Debug, Clone)]
pub struct CdfLayer {
    spec: SeriesSpec,
}

impl CdfLayer {
    pub fn new(spec: SeriesSpec) -> Self {
        Self { spec }
    }
}

/// Sorted finite values and their ranks over N
pub fn empirical_cdf(values: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len() as f64;
    let ranks = (1..=sorted.len()).map(|i| i as f64 / n).collect();
    (sorted, ranks)
}

impl Layer for CdfLayer {
    fn draw(&self, panel: &mut Panel, table: &DataFrame) -> Result<()> {
        let values = column_values(table, required_column(&self.spec, "x")?)?;
        let (xs, ys) = empirical_cdf(&values);
        panel.add_artist(
            Artist::new(ArtistKind::Line { xs, ys })
                .with_style(series_style(&self.spec))
                .with_label(self.spec.label_text()),
        );
        panel.set_ylim(0.0, 1.0);
        Ok(())
    }
}
