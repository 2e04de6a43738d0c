//! Line layer - `x` against `y` as a connected polyline

use super::{column_values, required_column, series_style, Layer};
use crate::canvas::{Artist, ArtistKind, Panel};
use crate::config::SeriesSpec;
use crate::{DataFrame, Result};

#[derive(Debug, Clone)]
pub struct LineLayer {
    spec: SeriesSpec,
}

impl LineLayer {
    pub fn new(spec: SeriesSpec) -> Self {
        Self { spec }
    }
}

impl Layer for LineLayer {
    fn draw(&self, panel: &mut Panel, table: &DataFrame) -> Result<()> {
        let xs = column_values(table, required_column(&self.spec, "x")?)?;
        let ys = column_values(table, required_column(&self.spec, "y")?)?;
        panel.add_artist(
            Artist::new(ArtistKind::Line { xs, ys })
                .with_style(series_style(&self.spec))
                .with_label(self.spec.label_text()),
        );
        Ok(())
    }
}
