//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Convert a member count to f64 for vote ratios.
#[must_use]
pub fn count_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(f64::MAX)
}

/// Round a f64 and clamp it to the i32 range, returning 0 for NaN values.
#[must_use]
pub fn round_f64_to_i32(value: f64) -> i32 {
    if value.is_nan() {
        return 0;
    }
    let min = cast::<i32, f64>(i32::MIN).unwrap_or(f64::MIN);
    let max = cast::<i32, f64>(i32::MAX).unwrap_or(f64::MAX);
    let clamped = value.clamp(min, max).round();
    cast::<f64, i32>(clamped).unwrap_or(0)
}

/// Convert an integral f64 to i64, rejecting fractions and out-of-range values.
#[must_use]
pub fn integral_f64_to_i64(value: f64) -> Option<i64> {
    if !value.is_finite() || value.fract() != 0.0 {
        return None;
    }
    cast::<f64, i64>(value)
}

/// Shortest decimal form of a dimension, e.g. `30` or `30.5`.
#[must_use]
pub fn format_dimension(value: f64) -> String {
    if value == 0.0 {
        // Avoid printing `-0`.
        return "0".to_string();
    }
    format!("{value}")
}

/// Fixed-point form of a coordinate. Negative zero prints unsigned.
#[must_use]
pub fn format_fixed(value: f64, decimals: usize) -> String {
    let value = if value == 0.0 { 0.0 } else { value };
    format!("{value:.decimals$}")
}
