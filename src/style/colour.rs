//! Color parsing and categorical palettes
//!
//! Accepts any CSS color understood by `csscolorparser`, the single-letter
//! shorthands (`r`, `k`, ...) and palette cycle references `C0`..`C9`, which
//! resolve through the figure palette.

/// Okabe-Ito colorblind-safe palette
pub const OKABE_ITO: &[&str] = &[
    "#000000", "#E69F00", "#56B4E9", "#009E73", "#F0E442", "#0072B2", "#D55E00", "#CC79A7",
];

/// Tableau 10 palette
pub const TAB10: &[&str] = &[
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Default palette when a figure names none or an unknown one
pub const DEFAULT_PALETTE: &str = "okabe_ito";

/// Look up a named categorical palette.
pub fn palette_colors(name: &str) -> Option<&'static [&'static str]> {
    match name.to_lowercase().as_str() {
        "okabe_ito" | "okabe-ito" => Some(OKABE_ITO),
        "tab10" | "default" => Some(TAB10),
        _ => None,
    }
}

/// An sRGB color with alpha
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Opacity in [0, 1]
    pub a: f64,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
    pub const TRANSPARENT: Rgba = Rgba {
        r: 0,
        g: 0,
        b: 0,
        a: 0.0,
    };

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Same color with opacity multiplied by `alpha`
    pub fn with_alpha(self, alpha: f64) -> Self {
        Self {
            a: (self.a * alpha).clamp(0.0, 1.0),
            ..self
        }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

fn single_letter(value: &str) -> Option<Rgba> {
    let color = match value {
        "b" => Rgba::rgb(0, 0, 255),
        "g" => Rgba::rgb(0, 128, 0),
        "r" => Rgba::rgb(255, 0, 0),
        "c" => Rgba::rgb(0, 191, 191),
        "m" => Rgba::rgb(191, 0, 191),
        "y" => Rgba::rgb(191, 191, 0),
        "k" => Rgba::BLACK,
        "w" => Rgba::WHITE,
        _ => return None,
    };
    Some(color)
}

/// Index of a `C0`..`C9` style cycle reference
fn cycle_index(value: &str) -> Option<usize> {
    let digits = value.strip_prefix('C')?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Parse a color, resolving cycle references through `palette`.
pub fn parse_color(value: &str, palette: Option<&str>) -> Result<Rgba, String> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("none") {
        return Ok(Rgba::TRANSPARENT);
    }
    if let Some(color) = single_letter(value) {
        return Ok(color);
    }
    if let Some(index) = cycle_index(value) {
        let colors = palette
            .and_then(palette_colors)
            .unwrap_or(OKABE_ITO);
        return parse_color(colors[index % colors.len()], None);
    }

    let parsed =
        csscolorparser::parse(value).map_err(|e| format!("Invalid color '{}': {}", value, e))?;
    let [r, g, b, a] = parsed.to_rgba8();
    Ok(Rgba {
        r,
        g,
        b,
        a: a as f64 / 255.0,
    })
}

/// Parse a color, falling back to `fallback` (with a warning) when it is invalid.
pub fn parse_color_or(value: &str, palette: Option<&str>, fallback: Rgba) -> Rgba {
    parse_color(value, palette).unwrap_or_else(|msg| {
        tracing::warn!("{}", msg);
        fallback
    })
}

/// Convert a CSS color name/value to hex format.
pub fn color_to_hex(value: &str) -> Result<String, String> {
    parse_color(value, None).map(|c| c.to_hex())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_to_hex_named_colors() {
        assert_eq!(color_to_hex("red").unwrap(), "#ff0000");
        assert_eq!(color_to_hex("green").unwrap(), "#008000");
        assert_eq!(color_to_hex("black").unwrap(), "#000000");
    }

    #[test]
    fn test_color_to_hex_hex_values() {
        assert_eq!(color_to_hex("#FF0000").unwrap(), "#ff0000");
        assert_eq!(color_to_hex("#eee").unwrap(), "#eeeeee");
    }

    #[test]
    fn test_single_letter_colors() {
        assert_eq!(parse_color("k", None).unwrap(), Rgba::BLACK);
        assert_eq!(parse_color("r", None).unwrap(), Rgba::rgb(255, 0, 0));
    }

    #[test]
    fn test_cycle_references_use_palette() {
        assert_eq!(color_to_hex("C1").unwrap(), "#e69f00");
        assert_eq!(parse_color("C0", Some("tab10")).unwrap().to_hex(), "#1f77b4");
        // Wraps around the palette length
        assert_eq!(
            parse_color("C8", Some("okabe_ito")).unwrap(),
            parse_color("C0", Some("okabe_ito")).unwrap()
        );
        // Unknown palette names fall back to the default
        assert_eq!(
            parse_color("C2", Some("custom")).unwrap(),
            parse_color("C2", None).unwrap()
        );
    }

    #[test]
    fn test_none_is_transparent() {
        assert_eq!(parse_color("none", None).unwrap().a, 0.0);
    }

    #[test]
    fn test_invalid_color() {
        assert!(parse_color("notacolor", None).is_err());
        assert!(parse_color("C", None).is_err());
        assert_eq!(parse_color_or("notacolor", None, Rgba::BLACK), Rgba::BLACK);
    }

    #[test]
    fn test_alpha() {
        let c = parse_color("rgba(255, 0, 0, 0.5)", None).unwrap();
        assert!((c.a - 0.5).abs() < 0.01);
        assert!((Rgba::WHITE.with_alpha(0.25).a - 0.25).abs() < 1e-12);
    }
}
