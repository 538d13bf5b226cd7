//! Difficulty and timestamp conversions for the job header fields.

use time::macros::format_description;
use time::OffsetDateTime;

/// Exponent of the difficulty-1 target (`0x1d00ffff`).
const MAX_TARGET_EXPONENT: i32 = 0x1d;

/// Coefficient of the difficulty-1 target.
const MAX_TARGET_COEFFICIENT: f64 = 0xffff as f64;

/// Convert compact `nBits` to difficulty.
///
/// The bits format is: [exponent (1 byte)][coefficient (3 bytes)], and
/// target = coefficient * 2^(8 * (exponent - 3)). Difficulty is the
/// difficulty-1 target divided by this target, so a zero coefficient gives
/// infinity.
pub fn nbits_to_difficulty(bits: u32) -> f64 {
    let exponent = (bits >> 24) as i32;
    let coefficient = (bits & 0x00ff_ffff) as f64;

    let target = coefficient * 2f64.powi(8 * (exponent - 3));
    let max_target = MAX_TARGET_COEFFICIENT * 2f64.powi(8 * (MAX_TARGET_EXPONENT - 3));

    max_target / target
}

/// Format difficulty for display (e.g., "1.23 T" for trillion).
pub fn format_difficulty(difficulty: f64) -> String {
    if difficulty >= 1e12 {
        format!("{:.2} T", difficulty / 1e12)
    } else if difficulty >= 1e9 {
        format!("{:.2} G", difficulty / 1e9)
    } else if difficulty >= 1e6 {
        format!("{:.2} M", difficulty / 1e6)
    } else if difficulty >= 1e3 {
        format!("{:.2} K", difficulty / 1e3)
    } else {
        format!("{:.2}", difficulty)
    }
}

/// Format a unix timestamp as `YYYY-MM-DD HH:MM:SS UTC`.
pub fn format_ntime(ntime: u32) -> Option<String> {
    let datetime = OffsetDateTime::from_unix_timestamp(ntime as i64).ok()?;
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second] UTC");
    match datetime.format(&format) {
        Ok(formatted) => Some(formatted),
        Err(e) => {
            tracing::warn!(ntime, error = %e, "failed to format ntime");
            None
        }
    }
}

/// Parse a 32-bit header field given as hex, such as `nbits` or `ntime`.
pub fn parse_hex_u32(field: &str) -> Option<u32> {
    let trimmed = field.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    u32::from_str_radix(digits, 16).ok()
}
