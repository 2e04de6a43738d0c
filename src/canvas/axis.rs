//! Axis state: scale, view limits, ticks and tick label styling

use crate::axes::breaks::{auto_breaks, breaks_in_range};
use crate::axes::format::format_ticks;
use crate::config::{ScaleKind, TextSpec, TickFormatterSpec};
use crate::style::text::EffectiveStyle;

/// Linear threshold of symlog axes
pub const SYMLOG_LINTHRESH: f64 = 1.0;

/// Tick direction relative to the spine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TickDirection {
    In,
    #[default]
    Out,
    InOut,
}

impl TickDirection {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "in" => Some(TickDirection::In),
            "out" => Some(TickDirection::Out),
            "inout" => Some(TickDirection::InOut),
            _ => None,
        }
    }
}

/// A resolved tick label override
#[derive(Debug, Clone, PartialEq)]
pub struct TickLabelOverride {
    pub text: Option<String>,
    pub style: EffectiveStyle,
    pub rotation: Option<f64>,
    pub show: bool,
}

impl TickLabelOverride {
    pub fn from_spec(spec: &TextSpec, style: EffectiveStyle) -> Self {
        Self {
            text: spec.text.clone(),
            style,
            rotation: spec.rotation,
            show: spec.show,
        }
    }
}

/// One finished tick: position, label text and how to draw it
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub value: f64,
    pub label: String,
    pub style: EffectiveStyle,
    pub rotation: f64,
    pub visible: bool,
}

/// State of one axis of a panel
#[derive(Debug, Clone)]
pub struct Axis {
    pub scale: ScaleKind,
    /// Explicit view limits; `None` autoscales from the panel's artists
    pub limits: Option<(f64, f64)>,
    /// Explicit tick positions
    pub locations: Option<Vec<f64>>,
    pub formatter: Option<TickFormatterSpec>,
    /// Category names placed at 0..n, set by categorical layers
    pub categories: Option<Vec<String>>,
    /// Per-tick overrides; `None` keeps the generated label
    pub label_overrides: Vec<Option<TickLabelOverride>>,
    pub label_style: EffectiveStyle,
    pub label_rotation: f64,
    pub show_labels: bool,
    pub direction: TickDirection,
    /// Tick length in points
    pub tick_length: f64,
    /// Tick width in points
    pub tick_width: f64,
}

impl Default for Axis {
    fn default() -> Self {
        Self {
            scale: ScaleKind::Linear,
            limits: None,
            locations: None,
            formatter: None,
            categories: None,
            label_overrides: Vec::new(),
            label_style: EffectiveStyle {
                family: "serif".to_string(),
                size: 9.0,
                weight: "normal".to_string(),
                style: "normal".to_string(),
                color: "black".to_string(),
            },
            label_rotation: 0.0,
            show_labels: true,
            direction: TickDirection::Out,
            tick_length: 3.5,
            tick_width: 0.8,
        }
    }
}

impl Axis {
    /// Map a data value to [0, 1] along the view interval `(lo, hi)`
    pub fn to_fraction(&self, value: f64, (lo, hi): (f64, f64)) -> f64 {
        let (t, t_lo, t_hi) = (
            self.transform(value),
            self.transform(lo),
            self.transform(hi),
        );
        if (t_hi - t_lo).abs() < f64::EPSILON {
            return 0.5;
        }
        (t - t_lo) / (t_hi - t_lo)
    }

    /// Scale transform into the space where the axis is linear
    pub fn transform(&self, value: f64) -> f64 {
        match self.scale {
            ScaleKind::Linear => value,
            ScaleKind::Log => {
                if value > 0.0 {
                    value.log10()
                } else {
                    f64::NEG_INFINITY
                }
            }
            ScaleKind::Symlog => {
                let abs = value.abs();
                let t = if abs <= SYMLOG_LINTHRESH {
                    abs / SYMLOG_LINTHRESH
                } else {
                    1.0 + (abs / SYMLOG_LINTHRESH).log10()
                };
                t.copysign(value)
            }
        }
    }

    /// Inverse of [`Axis::transform`]
    pub fn inverse(&self, t: f64) -> f64 {
        match self.scale {
            ScaleKind::Linear => t,
            ScaleKind::Log => 10f64.powf(t),
            ScaleKind::Symlog => {
                let abs = t.abs();
                let v = if abs <= 1.0 {
                    abs * SYMLOG_LINTHRESH
                } else {
                    SYMLOG_LINTHRESH * 10f64.powf(abs - 1.0)
                };
                v.copysign(t)
            }
        }
    }

    /// Tick positions within the view interval
    pub fn tick_values(&self, view: (f64, f64)) -> Vec<f64> {
        self.indexed_ticks(view).into_iter().map(|(_, v)| v).collect()
    }

    /// Visible tick positions with their index among all candidate positions.
    ///
    /// Explicit locations and categories keep their list index, so labels and
    /// overrides stay attached to the same tick when limits hide some of them.
    fn indexed_ticks(&self, (lo, hi): (f64, f64)) -> Vec<(usize, f64)> {
        if let Some(locations) = &self.locations {
            return breaks_in_range(locations, lo, hi);
        }
        if let Some(categories) = &self.categories {
            let positions: Vec<f64> = (0..categories.len()).map(|i| i as f64).collect();
            return breaks_in_range(&positions, lo, hi);
        }
        auto_breaks(self.scale, lo, hi).into_iter().enumerate().collect()
    }

    /// Finished ticks: generated labels, then formatter output, then overrides
    pub fn ticks(&self, view: (f64, f64)) -> Vec<Tick> {
        let indexed = self.indexed_ticks(view);
        let pick = |all: Vec<String>| -> Vec<String> {
            indexed
                .iter()
                .map(|(i, _)| all.get(*i).cloned().unwrap_or_default())
                .collect()
        };
        let labels = match (&self.categories, &self.formatter, &self.locations) {
            (_, _, Some(locations)) => pick(format_ticks(locations, self.formatter.as_ref())),
            (Some(categories), None, None) => pick(categories.clone()),
            _ => {
                let values: Vec<f64> = indexed.iter().map(|(_, v)| *v).collect();
                format_ticks(&values, self.formatter.as_ref())
            }
        };

        indexed
            .into_iter()
            .zip(labels)
            .map(|((i, value), label)| {
                let mut tick = Tick {
                    value,
                    label,
                    style: self.label_style.clone(),
                    rotation: self.label_rotation,
                    visible: self.show_labels,
                };
                if let Some(Some(custom)) = self.label_overrides.get(i) {
                    if let Some(text) = &custom.text {
                        tick.label = text.clone();
                    }
                    tick.style = custom.style.clone();
                    if let Some(rotation) = custom.rotation {
                        tick.rotation = rotation;
                    }
                    tick.visible = tick.visible && custom.show;
                }
                tick
            })
            .collect()
    }
}
