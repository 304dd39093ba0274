//! Numeric input helpers centralizing parsing and safe casts for form fields.

use num_traits::cast::cast;

use crate::constants::{LEVEL_MAX, LEVEL_MIN, POLITICAL_POINTS_MAX, POLITICAL_POINTS_MIN};

/// Parse a manual bonus counter. Non-numeric text counts as 0 and values
/// beyond the i32 range saturate.
#[must_use]
pub fn parse_manual_bonus(text: &str) -> i32 {
    text.trim().parse::<i64>().map_or(0, saturate_i64_to_i32)
}

/// Parse political points, returning a value only for integers in range.
#[must_use]
pub fn parse_political_points(text: &str) -> Option<i32> {
    text.trim()
        .trim_start_matches('+')
        .parse::<i32>()
        .ok()
        .filter(|value| political_points_in_range(*value))
}

#[must_use]
pub const fn political_points_in_range(value: i32) -> bool {
    value >= POLITICAL_POINTS_MIN && value <= POLITICAL_POINTS_MAX
}

/// Clamp a requested level into the supported range.
#[must_use]
pub fn clamp_level(value: i32) -> u8 {
    let clamped = value.clamp(i32::from(LEVEL_MIN), i32::from(LEVEL_MAX));
    cast::<i32, u8>(clamped).unwrap_or(LEVEL_MIN)
}

/// Saturate an i64 into the i32 range.
#[must_use]
pub fn saturate_i64_to_i32(value: i64) -> i32 {
    let clamped = value.clamp(i64::from(i32::MIN), i64::from(i32::MAX));
    cast::<i64, i32>(clamped).unwrap_or(0)
}
