//! Bar layer - one bar per row, centred on `x`
//!
//! String `x` columns are categorical: bars sit at 0..n and the x axis is
//! labelled with the category names.

use super::{column_strings, column_values, required_column, series_style, Layer};
use crate::canvas::{Artist, ArtistKind, BarRect, Panel};
use crate::config::SeriesSpec;
use crate::{DataFrame, Result};

const BAR_WIDTH: f64 = 0.8;

#[derive(Debug, Clone)]
pub struct BarLayer {
    spec: SeriesSpec,
}

impl BarLayer {
    pub fn new(spec: SeriesSpec) -> Self {
        Self { spec }
    }
}

impl Layer for BarLayer {
    fn draw(&self, panel: &mut Panel, table: &DataFrame) -> Result<()> {
        let x_column = required_column(&self.spec, "x")?;
        let heights = column_values(table, required_column(&self.spec, "y")?)?;

        let positions = match column_strings(table, x_column)? {
            Some(categories) => {
                let positions = (0..categories.len()).map(|i| i as f64).collect();
                panel.xaxis.categories = Some(categories);
                positions
            }
            None => column_values(table, x_column)?,
        };

        let bars = positions
            .iter()
            .zip(&heights)
            .filter(|(x, h)| x.is_finite() && h.is_finite())
            .map(|(x, h)| BarRect {
                x: x - BAR_WIDTH / 2.0,
                width: BAR_WIDTH,
                bottom: 0.0,
                height: *h,
            })
            .collect();

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
