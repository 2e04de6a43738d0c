//! Text style inheritance and the LaTeX wrapping heuristic

use crate::config::{FontSpec, TextStyleSpec};

/// Fully resolved typography for one text element
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveStyle {
    pub family: String,
    /// Size in points
    pub size: f64,
    pub weight: String,
    pub style: String,
    pub color: String,
}

impl EffectiveStyle {
    /// Global font defaults with the fixed foreground color
    pub fn from_font(font: &FontSpec) -> Self {
        Self {
            family: font.family.clone(),
            size: font.size,
            weight: font.weight.clone(),
            style: font.style.clone(),
            color: "black".to_string(),
        }
    }

    pub fn is_bold(&self) -> bool {
        self.weight.eq_ignore_ascii_case("bold")
    }

    pub fn is_italic(&self) -> bool {
        self.style.eq_ignore_ascii_case("italic") || self.style.eq_ignore_ascii_case("oblique")
    }
}

/// Field-by-field merge: local override, else the global font value.
///
/// Color never inherits from the figure; an unset local color is black.
pub fn merge_text_style(local: Option<&TextStyleSpec>, font: &FontSpec) -> EffectiveStyle {
    let Some(local) = local else {
        return EffectiveStyle::from_font(font);
    };
    EffectiveStyle {
        family: local.family.clone().unwrap_or_else(|| font.family.clone()),
        size: local.size.unwrap_or(font.size),
        weight: local.weight.clone().unwrap_or_else(|| font.weight.clone()),
        style: local.style.clone().unwrap_or_else(|| font.style.clone()),
        color: local.color.clone(),
    }
}

const MARKUP_COMMANDS: &[&str] = &[r"\textbf", r"\textit", r"\mathbf", r"\mathit"];

/// Whether `text` is already user-authored markup that must not be wrapped
fn is_markup(text: &str) -> bool {
    let math = text.len() >= 2
        && text.starts_with('$')
        && text.ends_with('$')
        && !text[1..text.len() - 1].contains('$');
    math || MARKUP_COMMANDS.iter().any(|cmd| text.contains(cmd)) || text.contains('\\')
}

/// Wrap `text` in `\textbf{}`/`\textit{}` according to its effective style.
///
/// Bold wraps italic. Nothing is changed when LaTeX is disabled, the text is
/// empty, or it already looks like markup.
pub fn latex_wrap(text: &str, style: &EffectiveStyle, use_tex: bool) -> String {
    if !use_tex || text.is_empty() || is_markup(text) {
        return text.to_string();
    }

    let mut wrapped = text.to_string();
    if style.is_italic() {
        wrapped = format!(r"\textit{{{}}}", wrapped);
    }
    if style.is_bold() {
        wrapped = format!(r"\textbf{{{}}}", wrapped);
    }
    wrapped
}

/// Strip the LaTeX wrapping commands for backends that draw plain text.
pub fn strip_markup(text: &str) -> String {
    let mut plain = text.to_string();
    for cmd in MARKUP_COMMANDS {
        plain = plain.replace(&format!("{}{{", cmd), "");
    }
    if plain.len() != text.len() {
        plain = plain.replace('}', "");
    }
    if plain.len() >= 2 && plain.starts_with('$') && plain.ends_with('$') {
        plain = plain[1..plain.len() - 1].to_string();
    }
    plain
}
