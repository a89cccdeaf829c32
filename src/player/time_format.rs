// SPDX-License-Identifier: MPL-2.0
//! Time label formatting and frame-rate parsing.

use crate::config::DEFAULT_FRAME_RATE;

/// Formats seconds as `HH:MM:SS`, dropping the hour segment when it is zero.
///
/// Fractions are floored; negative and non-finite input reads as zero.
///
/// ```
/// use inline_player::player::format_time;
///
/// assert_eq!(format_time(60.0), "01:00");
/// assert_eq!(format_time(3725.9), "01:02:05");
/// ```
#[must_use]
pub fn format_time(secs: f64) -> String {
    let total = if secs.is_finite() && secs > 0.0 {
        secs.floor() as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

/// Parses a frame rate written as `"N"` or `"N/D"`.
///
/// Returns `None` for malformed or non-positive rates.
#[must_use]
pub fn parse_frame_rate(rate: &str) -> Option<f64> {
    let rate = rate.trim();
    let value = match rate.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            num / den
        }
        None => rate.parse().ok()?,
    };
    (value.is_finite() && value > 0.0).then_some(value)
}

/// Duration of one frame in seconds, falling back to the default rate.
#[must_use]
pub fn frame_duration(rate: Option<&str>) -> f64 {
    1.0 / rate.and_then(parse_frame_rate).unwrap_or(DEFAULT_FRAME_RATE)
}
