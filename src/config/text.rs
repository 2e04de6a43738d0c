//! Text-bearing configuration values
//!
//! Every title, axis label, legend entry, series label and tick label override is
//! a [`TextLike`]: absent, a plain string, or a structured [`TextSpec`]. A single
//! `Deserialize` implementation performs the coercion for all of them.

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Cow;
use std::fmt;

/// Unit in which a text offset (`dx`/`dy`) is expressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OffsetUnit {
    /// Data-unit deflection relative to the current axis range
    #[default]
    Axes,
    /// Absolute offset in the figure size unit
    Points,
}

fn default_text_color() -> String {
    "black".to_string()
}

/// Typographic properties shared by all text-bearing specs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TextStyleSpec {
    #[serde(default)]
    pub family: Option<String>,
    /// Font size in points
    #[serde(default)]
    pub size: Option<f64>,
    #[serde(default)]
    pub weight: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default = "default_text_color")]
    pub color: String,
}

impl Default for TextStyleSpec {
    fn default() -> Self {
        Self {
            family: None,
            size: None,
            weight: None,
            style: None,
            color: default_text_color(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Concrete text content and presentation
///
/// `text: None` means "leave as-is"; `Some("")` explicitly renders nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TextSpec {
    #[serde(default = "default_true")]
    pub show: bool,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub family: Option<String>,
    #[serde(default)]
    pub size: Option<f64>,
    #[serde(default)]
    pub weight: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    /// `None` inherits the surrounding text color
    #[serde(default)]
    pub color: Option<String>,
    /// Rotation in degrees
    #[serde(default)]
    pub rotation: Option<f64>,
    #[serde(default)]
    pub ha: Option<String>,
    #[serde(default)]
    pub va: Option<String>,
    /// Extra padding in points
    #[serde(default)]
    pub pad: Option<f64>,
    #[serde(default)]
    pub dx: Option<f64>,
    #[serde(default)]
    pub dy: Option<f64>,
    #[serde(default)]
    pub dx_unit: OffsetUnit,
    #[serde(default)]
    pub dy_unit: OffsetUnit,
}

impl Default for TextSpec {
    fn default() -> Self {
        Self {
            show: true,
            text: None,
            family: None,
            size: None,
            weight: None,
            style: None,
            color: None,
            rotation: None,
            ha: None,
            va: None,
            pad: None,
            dx: None,
            dy: None,
            dx_unit: OffsetUnit::Axes,
            dy_unit: OffsetUnit::Axes,
        }
    }
}

impl TextSpec {
    /// A descriptor carrying only literal text
    pub fn literal(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// The typography part of this descriptor
    pub fn style_spec(&self) -> TextStyleSpec {
        TextStyleSpec {
            family: self.family.clone(),
            size: self.size,
            weight: self.weight.clone(),
            style: self.style.clone(),
            color: self.color.clone().unwrap_or_else(default_text_color),
        }
    }
}

/// A field accepting a bare string, a structured text descriptor, or nothing
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TextLike {
    #[default]
    Absent,
    Literal(String),
    Described(TextSpec),
}

impl TextLike {
    pub fn is_absent(&self) -> bool {
        matches!(self, TextLike::Absent)
    }

    /// View this value as a descriptor; `None` when absent
    pub fn as_spec(&self) -> Option<Cow<'_, TextSpec>> {
        match self {
            TextLike::Absent => None,
            TextLike::Literal(text) => Some(Cow::Owned(TextSpec::literal(text.clone()))),
            TextLike::Described(spec) => Some(Cow::Borrowed(spec)),
        }
    }

    /// The concrete text, if any was set
    pub fn text(&self) -> Option<&str> {
        match self {
            TextLike::Absent => None,
            TextLike::Literal(text) => Some(text),
            TextLike::Described(spec) => spec.text.as_deref(),
        }
    }
}

impl From<&str> for TextLike {
    fn from(text: &str) -> Self {
        TextLike::Literal(text.to_string())
    }
}

impl From<TextSpec> for TextLike {
    fn from(spec: TextSpec) -> Self {
        TextLike::Described(spec)
    }
}

impl Serialize for TextLike {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TextLike::Absent => serializer.serialize_none(),
            TextLike::Literal(text) => serializer.serialize_str(text),
            TextLike::Described(spec) => spec.serialize(serializer),
        }
    }
}

struct TextLikeVisitor;

impl<'de> Visitor<'de> for TextLikeVisitor {
    type Value = TextLike;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a string, a text mapping or null")
    }

    fn visit_unit<E: de::Error>(self) -> Result<TextLike, E> {
        Ok(TextLike::Absent)
    }

    fn visit_none<E: de::Error>(self) -> Result<TextLike, E> {
        Ok(TextLike::Absent)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<TextLike, D::Error> {
        deserializer.deserialize_any(TextLikeVisitor)
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<TextLike, E> {
        Ok(TextLike::Literal(value.to_string()))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<TextLike, E> {
        Ok(TextLike::Literal(value))
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<TextLike, A::Error> {
        TextSpec::deserialize(de::value::MapAccessDeserializer::new(map)).map(TextLike::Described)
    }
}

impl<'de> Deserialize<'de> for TextLike {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TextLikeVisitor)
    }
}
