//! Size unit conversion. All geometry after config validation is in inches.

use crate::config::SizeUnit;

pub const MM_PER_INCH: f64 = 25.4;
pub const POINTS_PER_INCH: f64 = 72.0;

pub fn mm_to_in(mm: f64) -> f64 {
    mm / MM_PER_INCH
}

pub fn in_to_mm(inch: f64) -> f64 {
    inch * MM_PER_INCH
}

pub fn pt_to_in(pt: f64) -> f64 {
    pt / POINTS_PER_INCH
}

pub fn in_to_pt(inch: f64) -> f64 {
    inch * POINTS_PER_INCH
}

/// Convert `value` expressed in `unit` to inches
pub fn to_inches(value: f64, unit: SizeUnit) -> f64 {
    match unit {
        SizeUnit::In => value,
        SizeUnit::Mm => mm_to_in(value),
        SizeUnit::Pt => pt_to_in(value),
    }
}
