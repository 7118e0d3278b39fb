//! Numeric helpers for the string-encoded stats the sheet stores.
//!
//! Stats live as text because the sheet keeps whatever the player is typing,
//! including an empty field. Everything that does arithmetic on them goes
//! through [`parse_stat_or_zero`].

use num_traits::cast::cast;

/// Upper bound of a sound volume slider.
pub const MAX_VOLUME: u8 = 100;

/// Parse a stat the way a browser `parseInt` would, falling back to zero.
///
/// Leading whitespace and an optional sign are accepted, digits are read up to
/// the first non-digit, and anything without a leading digit yields `0`.
/// Values beyond the `i32` range saturate.
#[must_use]
pub fn parse_stat_or_zero(raw: &str) -> i32 {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return 0;
    }
    let magnitude = rest[..digits_len]
        .bytes()
        .fold(0_i64, |acc, digit| {
            acc.saturating_mul(10)
                .saturating_add(i64::from(digit - b'0'))
        });
    saturate_i64_to_i32(if negative { -magnitude } else { magnitude })
}

/// Render a stat back into its stored text form.
#[must_use]
pub fn format_stat(value: i32) -> String {
    value.to_string()
}

/// Clamp an i64 into the i32 range.
#[must_use]
pub fn saturate_i64_to_i32(value: i64) -> i32 {
    let clamped = value.clamp(i64::from(i32::MIN), i64::from(i32::MAX));
    cast::<i64, i32>(clamped).unwrap_or(0)
}

/// Clamp an arbitrary number into the 0-100 volume range. Non-finite input maps to 0.
#[must_use]
pub fn clamp_volume(value: f64) -> u8 {
    if !value.is_finite() {
        return 0;
    }
    let clamped = value.round().clamp(0.0, f64::from(MAX_VOLUME));
    cast::<f64, u8>(clamped).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_reads_leading_integer() {
        assert_eq!(parse_stat_or_zero("12"), 12);
        assert_eq!(parse_stat_or_zero("  7 "), 7);
        assert_eq!(parse_stat_or_zero("10abc"), 10);
        assert_eq!(parse_stat_or_zero("-3"), -3);
        assert_eq!(parse_stat_or_zero("+4"), 4);
    }

    #[test]
    fn parse_falls_back_to_zero() {
        assert_eq!(parse_stat_or_zero(""), 0);
        assert_eq!(parse_stat_or_zero("abc"), 0);
        assert_eq!(parse_stat_or_zero("-"), 0);
        assert_eq!(parse_stat_or_zero("4.5"), 4);
    }

    #[test]
    fn parse_saturates_huge_values() {
        assert_eq!(parse_stat_or_zero("99999999999999999999"), i32::MAX);
        assert_eq!(parse_stat_or_zero("-99999999999999999999"), i32::MIN);
    }

    #[test]
    fn volume_is_clamped() {
        assert_eq!(clamp_volume(-5.0), 0);
        assert_eq!(clamp_volume(42.4), 42);
        assert_eq!(clamp_volume(250.0), 100);
        assert_eq!(clamp_volume(f64::NAN), 0);
    }
}
