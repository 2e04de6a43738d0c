//! Legend state attached to a panel

use super::{ArtistId, TextItem};
use crate::config::LegendOffsetUnit;
use crate::style::text::EffectiveStyle;

/// One legend row: a drawable handle (or a placeholder) and its label
#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    /// `None` for placeholder entries synthesized to match label overrides
    pub handle: Option<ArtistId>,
    pub label: String,
}

/// Legend box translation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegendOffset {
    pub dx: f64,
    pub dy: f64,
    pub unit: LegendOffsetUnit,
}

impl Default for LegendOffset {
    fn default() -> Self {
        Self {
            dx: 0.0,
            dy: 0.0,
            unit: LegendOffsetUnit::Axes,
        }
    }
}

/// A resolved legend
#[derive(Debug, Clone, PartialEq)]
pub struct Legend {
    pub entries: Vec<LegendEntry>,
    pub title: Option<TextItem>,
    pub loc: String,
    pub ncol: usize,
    pub frameon: bool,
    /// `[x, y]` or `[x, y, w, h]` in axes fractions, before the offset
    pub anchor: Option<Vec<f64>>,
    pub offset: LegendOffset,
    pub style: EffectiveStyle,
}

impl Legend {
    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.label.as_str()).collect()
    }
}

/// Fractional anchor point of a named legend location, plus the box corner that
/// sits on it (both as `(x, y)` in [0, 1])
pub fn loc_anchor(loc: &str) -> Option<((f64, f64), (f64, f64))> {
    let placement = match loc.to_lowercase().as_str() {
        "upper right" => ((1.0, 1.0), (1.0, 1.0)),
        "upper left" => ((0.0, 1.0), (0.0, 1.0)),
        "lower left" => ((0.0, 0.0), (0.0, 0.0)),
        "lower right" => ((1.0, 0.0), (1.0, 0.0)),
        "right" | "center right" => ((1.0, 0.5), (1.0, 0.5)),
        "center left" => ((0.0, 0.5), (0.0, 0.5)),
        "lower center" => ((0.5, 0.0), (0.5, 0.0)),
        "upper center" => ((0.5, 1.0), (0.5, 1.0)),
        "center" => ((0.5, 0.5), (0.5, 0.5)),
        _ => return None,
    };
    Some(placement)
}

/// Candidates tried, in order, for `loc: best`
pub const BEST_CANDIDATES: &[&str] = &[
    "upper right",
    "upper left",
    "lower left",
    "lower right",
    "right",
    "center left",
    "center right",
    "lower center",
    "upper center",
    "center",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loc_anchor() {
        assert_eq!(loc_anchor("upper right"), Some(((1.0, 1.0), (1.0, 1.0))));
        assert_eq!(loc_anchor("Lower Center"), Some(((0.5, 0.0), (0.5, 0.0))));
        assert_eq!(loc_anchor("best"), None);
        for loc in BEST_CANDIDATES {
            assert!(loc_anchor(loc).is_some());
        }
    }
}
