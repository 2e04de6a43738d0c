//! Unit conversion and style resolution
//!
//! Pure helpers shared by the drawing stages: size units, text style merging and
//! LaTeX wrapping, line style aliases, colors, positional offsets and the scoped
//! presentation context.

pub mod colour;
pub mod context;
pub mod linetype;
pub mod offset;
pub mod text;
pub mod units;

pub use colour::{parse_color, Rgba};
pub use linetype::{dash_pattern, normalize_linestyle};
pub use text::{latex_wrap, merge_text_style, EffectiveStyle};
pub use units::{in_to_mm, in_to_pt, mm_to_in, pt_to_in, to_inches};
