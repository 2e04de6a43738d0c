//! Line style aliases and their dash patterns.

/// Normalize a line style token to its canonical form.
///
/// - `solid`, `-` → `-`
/// - `dashed`, `dash`, `--` → `--`
/// - `dotted`, `dot`, `:` → `:`
/// - `dashdot`, `dash-dot`, `-.` → `-.`
///
/// Matching is case-insensitive and ignores surrounding whitespace. An empty token
/// is solid; anything unrecognized is returned unchanged so backend-native
/// patterns (such as hex dash strings) still work.
pub fn normalize_linestyle(style: &str) -> String {
    let trimmed = style.trim();
    match trimmed.to_lowercase().as_str() {
        "" | "solid" | "-" => "-".to_string(),
        "dashed" | "dash" | "--" => "--".to_string(),
        "dotted" | "dot" | ":" => ":".to_string(),
        "dashdot" | "dash-dot" | "-." => "-.".to_string(),
        _ => trimmed.to_string(),
    }
}

/// Parse a hex dash pattern such as `"33"` or `"1343"`.
///
/// Even number (2-8) of non-zero hex digits, each an on/off length in line widths.
fn parse_hex_linetype(s: &str) -> Option<Vec<f64>> {
    let len = s.len();
    if !(2..=8).contains(&len) || len % 2 != 0 {
        return None;
    }

    let mut result = Vec::with_capacity(len);
    for c in s.chars() {
        let digit = c.to_digit(16)?;
        if digit == 0 {
            return None;
        }
        result.push(digit as f64);
    }
    Some(result)
}

/// On/off dash lengths in points for a line style at `linewidth` points.
///
/// `None` means a continuous line. Unknown styles are drawn solid.
pub fn dash_pattern(style: &str, linewidth: f64) -> Option<Vec<f64>> {
    let scale = linewidth.max(0.5);
    let unit: Vec<f64> = match normalize_linestyle(style).as_str() {
        "-" => return None,
        "--" => vec![3.7, 1.6],
        ":" => vec![1.0, 1.65],
        "-." => vec![6.4, 1.6, 1.0, 1.6],
        other => match parse_hex_linetype(other) {
            Some(pattern) => pattern,
            None => {
                tracing::debug!(style = other, "Unknown line style, drawing solid");
                return None;
            }
        },
    };
    Some(unit.into_iter().map(|v| v * scale).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_aliases() {
        for token in ["solid", "-", "", "SOLID", " solid "] {
            assert_eq!(normalize_linestyle(token), "-", "token {token:?}");
        }
        for token in ["dashed", "dash", "--"] {
            assert_eq!(normalize_linestyle(token), "--");
        }
        for token in ["dotted", "dot", ":"] {
            assert_eq!(normalize_linestyle(token), ":");
        }
        for token in ["dashdot", "dash-dot", "-.", "DashDot"] {
            assert_eq!(normalize_linestyle(token), "-.");
        }
    }

    #[test]
    fn test_unknown_passes_through() {
        assert_eq!(normalize_linestyle("1343"), "1343");
        assert_eq!(normalize_linestyle("loosely"), "loosely");
    }

    #[test]
    fn test_dash_pattern_scales_with_width() {
        assert_eq!(dash_pattern("solid", 1.0), None);
        assert_eq!(dash_pattern("dashed", 1.0), Some(vec![3.7, 1.6]));
        assert_eq!(dash_pattern("--", 2.0), Some(vec![7.4, 3.2]));
        assert_eq!(dash_pattern("dotted", 1.0), Some(vec![1.0, 1.65]));
        assert_eq!(dash_pattern("-.", 1.0), Some(vec![6.4, 1.6, 1.0, 1.6]));
    }

    #[test]
    fn test_hex_patterns() {
        assert_eq!(dash_pattern("33", 1.0), Some(vec![3.0, 3.0]));
        assert_eq!(dash_pattern("1a2b", 1.0), Some(vec![1.0, 10.0, 2.0, 11.0]));
        // Odd length, zero digits and non-hex text fall back to solid
        assert_eq!(dash_pattern("123", 1.0), None);
        assert_eq!(dash_pattern("10", 1.0), None);
        assert_eq!(dash_pattern("gg", 1.0), None);
    }
}
