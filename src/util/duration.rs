//! Human duration parsing and formatting.
//!
//! Moderation timeouts and giveaways accept durations such as `10m`, `2h` or
//! `1d12h`. Every `<number><unit>` pair in the input is summed; anything between
//! pairs is ignored.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use crate::error::AppError;

static DURATION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)([smhd])").expect("duration pattern is valid"));

/// Shortest accepted timeout or giveaway length.
pub const MIN_DURATION: Duration = Duration::from_secs(60);

/// Longest accepted timeout or giveaway length (28 days, Discord's timeout cap).
pub const MAX_DURATION: Duration = Duration::from_secs(28 * 24 * 60 * 60);

/// Parses a duration string by summing every `<number><unit>` pair.
///
/// # Returns
/// - `Some(Duration)` - At least one pair matched and the total is non-zero
/// - `None` - No pair matched, the total is zero, or a number overflowed
pub fn parse_duration(input: &str) -> Option<Duration> {
    let mut total_secs: u64 = 0;

    for captures in DURATION_PATTERN.captures_iter(input) {
        let value: u64 = captures[1].parse().ok()?;
        let unit_secs = match &captures[2] {
            "s" => 1,
            "m" => 60,
            "h" => 60 * 60,
            "d" => 24 * 60 * 60,
            _ => return None,
        };
        total_secs = total_secs.checked_add(value.checked_mul(unit_secs)?)?;
    }

    (total_secs > 0).then(|| Duration::from_secs(total_secs))
}

/// Parses a duration and enforces the 1 minute to 28 days window.
///
/// # Returns
/// - `Ok(Duration)` - Valid duration inside the window
/// - `Err(AppError::BadRequest)` - Unparsable or out of range, with a message for the user
pub fn parse_bounded_duration(input: &str) -> Result<Duration, AppError> {
    match parse_duration(input) {
        Some(duration) if (MIN_DURATION..=MAX_DURATION).contains(&duration) => Ok(duration),
        _ => Err(AppError::BadRequest(
            "Please provide a valid duration between 1 minute and 28 days.\nExamples: 1h, 30m, 1d, 2h30m"
                .to_string(),
        )),
    }
}

/// Formats a duration as compact text, e.g. `1d 2h 3m 4s`.
///
/// Zero components are skipped; a zero duration renders as `0s`.
pub fn format_compact(duration: Duration) -> String {
    let total = duration.as_secs();
    let parts = [
        (total / 86_400, "d"),
        ((total % 86_400) / 3_600, "h"),
        ((total % 3_600) / 60, "m"),
        (total % 60, "s"),
    ];

    let rendered: Vec<String> = parts
        .iter()
        .filter(|(value, _)| *value > 0)
        .map(|(value, unit)| format!("{value}{unit}"))
        .collect();

    if rendered.is_empty() {
        "0s".to_string()
    } else {
        rendered.join(" ")
    }
}

/// Formats a track length as `h:mm:ss` or `m:ss`.
pub fn format_track_length(duration: Duration) -> String {
    let total = duration.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sums_every_unit_pair() {
        assert_eq!(parse_duration("10m"), Some(Duration::from_secs(600)));
        assert_eq!(parse_duration("1h30m"), Some(Duration::from_secs(5400)));
        assert_eq!(parse_duration("1d 12h"), Some(Duration::from_secs(129_600)));
        assert_eq!(parse_duration("45s"), Some(Duration::from_secs(45)));
    }

    #[test]
    fn rejects_text_without_units() {
        assert_eq!(parse_duration("soon"), None);
        assert_eq!(parse_duration("15"), None);
        assert_eq!(parse_duration("0m"), None);
        assert_eq!(parse_duration(""), None);
    }

    #[test]
    fn bounded_duration_enforces_window() {
        assert!(parse_bounded_duration("30s").is_err());
        assert!(parse_bounded_duration("1m").is_ok());
        assert!(parse_bounded_duration("28d").is_ok());
        assert!(parse_bounded_duration("28d1s").is_err());
        assert!(matches!(
            parse_bounded_duration("forever"),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn formats_compact_durations() {
        assert_eq!(format_compact(Duration::from_secs(0)), "0s");
        assert_eq!(format_compact(Duration::from_secs(3_661)), "1h 1m 1s");
        assert_eq!(format_compact(Duration::from_secs(90_000)), "1d 1h");
    }

    #[test]
    fn formats_track_lengths() {
        assert_eq!(format_track_length(Duration::from_secs(65)), "1:05");
        assert_eq!(format_track_length(Duration::from_secs(3_725)), "1:02:05");
    }
}
