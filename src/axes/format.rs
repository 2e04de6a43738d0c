//! Tick label formatting
//!
//! Supports `%`-style (`%.2f`, `%d`, `%g`) and brace-style (`{:.1f}`, `{x:,.0f}`)
//! patterns, scientific, percent and thousands formatters, and a blank formatter.
//! Values are scaled first, then formatted, then decorated with prefix/suffix and
//! optional bold/italic/mathtext wrapping.

use crate::config::{FormatterKind, TickFormatterSpec};
use regex::{Captures, Regex};
use std::sync::LazyLock;

static PRINTF_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"%(?P<flags>[-+ 0#]*)(?P<width>\d+)?(?:\.(?P<prec>\d+))?(?P<conv>[diufFeEgGs%])",
    )
    .ok()
});

static BRACE_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\{(?P<name>[A-Za-z_]\w*|\d+)?(?::(?P<spec>[^{}]*))?\}").ok());

static BRACE_SPEC_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^(?P<sign>[+\- ])?(?P<zero>0)?(?P<width>\d+)?(?P<comma>,)?(?:\.(?P<prec>\d+))?(?P<ty>[dfFeEgG%n])?$").ok()
});

/// Fixed-point with `prec` decimals
pub fn format_fixed(value: f64, prec: usize) -> String {
    let text = format!("{:.*}", prec, value);
    // Avoid "-0.00"
    if text.starts_with('-') && text[1..].chars().all(|c| c == '0' || c == '.') {
        text[1..].to_string()
    } else {
        text
    }
}

/// Scientific notation with a signed two-digit exponent, e.g. `1.50e+03`
pub fn format_sci(value: f64, prec: usize, upper: bool) -> String {
    let raw = format!("{:.*e}", prec, value);
    let (mantissa, exponent) = raw.split_once('e').unwrap_or((raw.as_str(), "0"));
    let exp: i32 = exponent.parse().unwrap_or(0);
    let sign = if exp < 0 { '-' } else { '+' };
    let e = if upper { 'E' } else { 'e' };
    format!("{}{}{}{:02}", mantissa, e, sign, exp.abs())
}

fn strip_trailing_zeros(text: &str) -> String {
    if !text.contains('.') {
        return text.to_string();
    }
    let (number, exponent) = match text.find(['e', 'E']) {
        Some(pos) => (&text[..pos], &text[pos..]),
        None => (text, ""),
    };
    let trimmed = number.trim_end_matches('0').trim_end_matches('.');
    format!("{}{}", trimmed, exponent)
}

/// General format with `prec` significant digits, like `%g`
pub fn format_general(value: f64, prec: usize, upper: bool) -> String {
    let prec = prec.max(1);
    if value == 0.0 {
        return "0".to_string();
    }
    if !value.is_finite() {
        return value.to_string();
    }
    let exp = value.abs().log10().floor() as i32;
    if exp < -4 || exp >= prec as i32 {
        strip_trailing_zeros(&format_sci(value, prec - 1, upper))
    } else {
        let decimals = (prec as i32 - 1 - exp).max(0) as usize;
        strip_trailing_zeros(&format_fixed(value, decimals))
    }
}

/// Insert `,` thousands separators into the integer part
pub fn group_thousands(text: &str) -> String {
    let (sign, rest) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text),
    };
    let (int_part, frac_part) = match rest.find('.') {
        Some(pos) => (&rest[..pos], &rest[pos..]),
        None => (rest, ""),
    };
    if !int_part.chars().all(|c| c.is_ascii_digit()) {
        return text.to_string();
    }

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{}{}{}", sign, grouped, frac_part)
}

fn pad(text: String, width: Option<usize>, left_align: bool, zero: bool) -> String {
    let Some(width) = width else {
        return text;
    };
    if text.len() >= width {
        return text;
    }
    let fill = width - text.len();
    if left_align {
        format!("{}{}", text, " ".repeat(fill))
    } else if zero {
        let (sign, digits) = match text.strip_prefix('-') {
            Some(rest) => ("-", rest.to_string()),
            None => ("", text),
        };
        format!("{}{}{}", sign, "0".repeat(fill), digits)
    } else {
        format!("{}{}", " ".repeat(fill), text)
    }
}

fn with_sign(text: String, value: f64, sign: Option<&str>) -> String {
    match sign {
        Some("+") if value >= 0.0 => format!("+{}", text),
        Some(" ") if value >= 0.0 => format!(" {}", text),
        _ => text,
    }
}

/// Format `value` with a `%`-style pattern
pub fn printf_format(pattern: &str, value: f64) -> String {
    let Some(re) = PRINTF_RE.as_ref() else {
        return pattern.to_string();
    };
    re.replace_all(pattern, |caps: &Captures| {
        let flags = caps.name("flags").map_or("", |m| m.as_str());
        let width = caps.name("width").and_then(|m| m.as_str().parse().ok());
        let prec: Option<usize> = caps.name("prec").and_then(|m| m.as_str().parse().ok());
        let conv = caps.name("conv").map_or("f", |m| m.as_str());

        let body = match conv {
            "%" => return "%".to_string(),
            "d" | "i" | "u" => format_fixed(value.trunc(), 0),
            "f" | "F" => format_fixed(value, prec.unwrap_or(6)),
            "e" | "E" => format_sci(value, prec.unwrap_or(6), conv == "E"),
            "g" | "G" => format_general(value, prec.unwrap_or(6), conv == "G"),
            _ => format_general(value, 12, false),
        };
        let sign = if flags.contains('+') {
            Some("+")
        } else if flags.contains(' ') {
            Some(" ")
        } else {
            None
        };
        let body = with_sign(body, value, sign);
        pad(body, width, flags.contains('-'), flags.contains('0'))
    })
    .into_owned()
}

fn format_brace_spec(spec: &str, value: f64) -> Option<String> {
    let caps = BRACE_SPEC_RE.as_ref()?.captures(spec)?;
    let prec: Option<usize> = caps.name("prec").and_then(|m| m.as_str().parse().ok());
    let width = caps.name("width").and_then(|m| m.as_str().parse().ok());
    let comma = caps.name("comma").is_some();

    let mut body = match caps.name("ty").map(|m| m.as_str()) {
        Some("f") | Some("F") => format_fixed(value, prec.unwrap_or(6)),
        Some("e") | Some("E") => format_sci(value, prec.unwrap_or(6), spec.ends_with('E')),
        Some("g") | Some("G") | Some("n") => {
            format_general(value, prec.unwrap_or(6), spec.ends_with('G'))
        }
        Some("%") => format!("{}%", format_fixed(value * 100.0, prec.unwrap_or(6))),
        Some("d") => format_fixed(value.round(), 0),
        _ => match prec {
            Some(p) => format_general(value, p, false),
            None => format_general(value, 12, false),
        },
    };
    if comma {
        body = group_thousands(&body);
    }
    let body = with_sign(body, value, caps.name("sign").map(|m| m.as_str()));
    Some(pad(body, width, false, caps.name("zero").is_some()))
}

/// Format `value` with a brace-style pattern such as `{:.2f}` or `{x:.0f} ms`
pub fn brace_format(pattern: &str, value: f64) -> String {
    let Some(re) = BRACE_RE.as_ref() else {
        return pattern.to_string();
    };
    re.replace_all(pattern, |caps: &Captures| {
        let spec = caps.name("spec").map_or("", |m| m.as_str());
        format_brace_spec(spec, value).unwrap_or_else(|| format_general(value, 12, false))
    })
    .into_owned()
}

/// Shortest fixed-point labels (at most 6 decimals) that keep the ticks distinct
pub fn default_labels(ticks: &[f64]) -> Vec<String> {
    let decimals = (0..=6)
        .find(|&d| {
            ticks.iter().all(|v| {
                let text = format_fixed(*v, d);
                text.parse::<f64>()
                    .map(|parsed| (parsed - v).abs() <= 1e-9 * v.abs().max(1.0))
                    .unwrap_or(false)
            })
        })
        .unwrap_or(6);
    ticks.iter().map(|v| format_fixed(*v, decimals)).collect()
}

fn decorate(text: String, spec: &TickFormatterSpec) -> String {
    if text.is_empty() {
        return text;
    }
    let mut text = format!(
        "{}{}{}",
        spec.prefix.as_deref().unwrap_or(""),
        text,
        spec.suffix.as_deref().unwrap_or("")
    );
    if spec.wrap_mathtext {
        if spec.italic {
            text = format!(r"\mathit{{{}}}", text);
        }
        if spec.bold {
            text = format!(r"\mathbf{{{}}}", text);
        }
        format!("${}$", text)
    } else {
        if spec.italic {
            text = format!(r"\textit{{{}}}", text);
        }
        if spec.bold {
            text = format!(r"\textbf{{{}}}", text);
        }
        text
    }
}

/// Format one tick value with a declarative formatter.
pub fn format_tick(spec: &TickFormatterSpec, value: f64) -> String {
    let value = value * spec.scale.unwrap_or(1.0);
    let body = match spec.kind {
        FormatterKind::Blank => return String::new(),
        FormatterKind::Printf => match &spec.pattern {
            Some(pattern) => printf_format(pattern, value),
            None => format_general(value, 6, false),
        },
        FormatterKind::Strfmt => match &spec.pattern {
            Some(pattern) => brace_format(pattern, value),
            None => match spec.places {
                Some(places) => format_fixed(value, places),
                None => format_general(value, 6, false),
            },
        },
        FormatterKind::Sci => format_sci(value, spec.places.unwrap_or(2), false),
        FormatterKind::Percent => {
            format!("{}%", format_fixed(value * 100.0, spec.places.unwrap_or(0)))
        }
        FormatterKind::Thousands => group_thousands(&format_fixed(value, spec.places.unwrap_or(0))),
    };
    decorate(body, spec)
}

/// Tick labels for `ticks`, through `formatter` if one is configured
pub fn format_ticks(ticks: &[f64], formatter: Option<&TickFormatterSpec>) -> Vec<String> {
    match formatter {
        Some(spec) => ticks.iter().map(|v| format_tick(spec, *v)).collect(),
        None => default_labels(ticks),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formatter(kind: FormatterKind) -> TickFormatterSpec {
        TickFormatterSpec {
            kind,
            ..Default::default()
        }
    }

    #[test]
    fn test_printf_patterns() {
        assert_eq!(printf_format("%.2f", 3.14159), "3.14");
        assert_eq!(printf_format("%d ms", 12.7), "12 ms");
        assert_eq!(printf_format("%5.1f", 2.0), "  2.0");
        assert_eq!(printf_format("%+.1f", 2.0), "+2.0");
        assert_eq!(printf_format("%g", 0.5), "0.5");
        assert_eq!(printf_format("%.1e", 1500.0), "1.5e+03");
        assert_eq!(printf_format("%d%%", 40.0), "40%");
    }

    #[test]
    fn test_brace_patterns() {
        assert_eq!(brace_format("{:.1f}", 2.26), "2.3");
        assert_eq!(brace_format("{x:.0f} ms", 12.4), "12 ms");
        assert_eq!(brace_format("{:,.0f}", 1234567.0), "1,234,567");
        assert_eq!(brace_format("{:.0%}", 0.25), "25%");
        assert_eq!(brace_format("{}", 1.5), "1.5");
        assert_eq!(brace_format("{:.2e}", 1500.0), "1.50e+03");
    }

    #[test]
    fn test_general_format() {
        assert_eq!(format_general(0.0, 6, false), "0");
        assert_eq!(format_general(100000.0, 6, false), "100000");
        assert_eq!(format_general(1e-5, 6, false), "1e-05");
        assert_eq!(format_general(0.25, 6, false), "0.25");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("1234"), "1,234");
        assert_eq!(group_thousands("-1234567.25"), "-1,234,567.25");
        assert_eq!(group_thousands("999"), "999");
    }

    #[test]
    fn test_formatter_kinds() {
        assert_eq!(format_tick(&formatter(FormatterKind::Blank), 3.0), "");

        let mut sci = formatter(FormatterKind::Sci);
        sci.places = Some(1);
        assert_eq!(format_tick(&sci, 12345.0), "1.2e+04");

        assert_eq!(format_tick(&formatter(FormatterKind::Percent), 0.5), "50%");
        assert_eq!(format_tick(&formatter(FormatterKind::Thousands), 25000.0), "25,000");

        let mut printf = formatter(FormatterKind::Printf);
        printf.pattern = Some("%.1f".to_string());
        printf.scale = Some(1000.0);
        printf.suffix = Some(" ms".to_string());
        assert_eq!(format_tick(&printf, 0.0123), "12.3 ms");
    }

    #[test]
    fn test_mathtext_wrap() {
        let mut spec = formatter(FormatterKind::Strfmt);
        spec.pattern = Some("{:.0f}".to_string());
        spec.wrap_mathtext = true;
        spec.bold = true;
        assert_eq!(format_tick(&spec, 3.0), r"$\mathbf{3}$");

        spec.wrap_mathtext = false;
        spec.italic = true;
        assert_eq!(format_tick(&spec, 3.0), r"\textbf{\textit{3}}");
    }

    #[test]
    fn test_default_labels() {
        assert_eq!(default_labels(&[0.0, 0.5, 1.0]), vec!["0.0", "0.5", "1.0"]);
        assert_eq!(default_labels(&[0.0, 20.0, 40.0]), vec!["0", "20", "40"]);
        assert_eq!(default_labels(&[0.25, 0.5]), vec!["0.25", "0.50"]);
    }
}
