//! Scatter layer - unconnected markers

use super::{column_values, required_column, series_style, Layer};
use crate::canvas::{Artist, ArtistKind, Panel};
use crate::config::SeriesSpec;
use crate::{DataFrame, Result};

const DEFAULT_MARKER: &str = "o";

/// Marker area in points squared
const DEFAULT_MARKER_AREA: f64 = 36.0;

#[derive(Debug, Clone)]
pub struct ScatterLayer {
    spec: SeriesSpec,
}

impl ScatterLayer {
    pub fn new(spec: SeriesSpec) -> Self {
        Self { spec }
    }
}

impl Layer for ScatterLayer {
    fn draw(&self, panel: &mut Panel, table: &DataFrame) -> Result<()> {
        let xs = column_values(table, required_column(&self.spec, "x")?)?;
        let ys = column_values(table, required_column(&self.spec, "y")?)?;

        let mut style = series_style(&self.spec);
        style.marker = Some(
            self.spec
                .style
                .marker
                .clone()
                .unwrap_or_else(|| DEFAULT_MARKER.to_string()),
        );
        style.linestyle = None;

        panel.add_artist(
            Artist::new(ArtistKind::Scatter {
                xs,
                ys,
                size: DEFAULT_MARKER_AREA,
            })
            .with_style(style)
            .with_label(self.spec.label_text()),
        );
        Ok(())
    }
}
