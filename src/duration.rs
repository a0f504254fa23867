// duration.rs - ISO 8601 Duration Decoding
// Converts the period text the catalog API reports for each video
// (e.g. "PT1H2M30S", "P1DT4M", "PT0S") into whole seconds.
//
// Calendar units (years, months) have no fixed length and are rejected.
// Sub-second fractions are truncated.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DurationError {
    #[error("duration '{0}' does not start with the 'P' designator")]
    MissingDesignator(String),
    #[error("duration '{0}' is malformed")]
    Malformed(String),
    #[error("duration '{text}' uses unsupported unit '{unit}'")]
    UnsupportedUnit { text: String, unit: char },
    #[error("duration '{0}' overflows")]
    Overflow(String),
}

const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_HOUR: u64 = 60 * SECONDS_PER_MINUTE;
const SECONDS_PER_DAY: u64 = 24 * SECONDS_PER_HOUR;
const SECONDS_PER_WEEK: u64 = 7 * SECONDS_PER_DAY;

/// Decode an ISO 8601 duration into a total number of whole seconds.
pub fn parse_iso8601_duration(text: &str) -> Result<u64, DurationError> {
    let body = text
        .trim()
        .strip_prefix('P')
        .ok_or_else(|| DurationError::MissingDesignator(text.to_string()))?;

    let (date_part, time_part) = match body.split_once('T') {
        Some((_, "")) => return Err(DurationError::Malformed(text.to_string())),
        Some((date, time)) => (date, Some(time)),
        None => (body, None),
    };

    if date_part.is_empty() && time_part.is_none() {
        return Err(DurationError::Malformed(text.to_string()));
    }

    let mut total: u64 = 0;

    let mut last_rank = None;
    for (value, unit) in split_components(date_part, text)? {
        let (rank, per_unit) = match unit {
            'W' => (0, SECONDS_PER_WEEK),
            'D' => (1, SECONDS_PER_DAY),
            other => {
                return Err(DurationError::UnsupportedUnit {
                    text: text.to_string(),
                    unit: other,
                })
            }
        };
        last_rank = check_order(last_rank, rank, text)?;
        total = accumulate(total, whole_number(value, text)?, per_unit, text)?;
    }

    let mut last_rank = None;
    for (value, unit) in split_components(time_part.unwrap_or(""), text)? {
        let (rank, amount, per_unit) = match unit {
            'H' => (0, whole_number(value, text)?, SECONDS_PER_HOUR),
            'M' => (1, whole_number(value, text)?, SECONDS_PER_MINUTE),
            'S' => (2, truncated_seconds(value, text)?, 1),
            other => {
                return Err(DurationError::UnsupportedUnit {
                    text: text.to_string(),
                    unit: other,
                })
            }
        };
        last_rank = check_order(last_rank, rank, text)?;
        total = accumulate(total, amount, per_unit, text)?;
    }

    Ok(total)
}

// Split "1H30M" into [("1", 'H'), ("30", 'M')]
fn split_components<'a>(part: &'a str, text: &str) -> Result<Vec<(&'a str, char)>, DurationError> {
    let mut components = Vec::new();
    let mut start = 0;

    for (index, ch) in part.char_indices() {
        if ch.is_ascii_alphabetic() {
            let value = &part[start..index];
            if value.is_empty() {
                return Err(DurationError::Malformed(text.to_string()));
            }
            components.push((value, ch));
            start = index + ch.len_utf8();
        }
    }

    if start < part.len() {
        return Err(DurationError::Malformed(text.to_string()));
    }

    Ok(components)
}

// Units appear at most once, largest first
fn check_order(last: Option<u8>, rank: u8, text: &str) -> Result<Option<u8>, DurationError> {
    match last {
        Some(previous) if rank <= previous => Err(DurationError::Malformed(text.to_string())),
        _ => Ok(Some(rank)),
    }
}

fn whole_number(value: &str, text: &str) -> Result<u64, DurationError> {
    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DurationError::Malformed(text.to_string()));
    }
    value
        .parse::<u64>()
        .map_err(|_| DurationError::Overflow(text.to_string()))
}

fn truncated_seconds(value: &str, text: &str) -> Result<u64, DurationError> {
    match value.split_once(&['.', ','][..]) {
        Some((whole, fraction)) => {
            if whole.is_empty() || fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()) {
                return Err(DurationError::Malformed(text.to_string()));
            }
            whole_number(whole, text)
        }
        None => whole_number(value, text),
    }
}

fn accumulate(total: u64, amount: u64, per_unit: u64, text: &str) -> Result<u64, DurationError> {
    amount
        .checked_mul(per_unit)
        .and_then(|seconds| total.checked_add(seconds))
        .ok_or_else(|| DurationError::Overflow(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_components() {
        assert_eq!(parse_iso8601_duration("PT1H"), Ok(3600));
        assert_eq!(parse_iso8601_duration("PT30M"), Ok(1800));
        assert_eq!(parse_iso8601_duration("PT15S"), Ok(15));
    }

    #[test]
    fn test_combined_components() {
        assert_eq!(parse_iso8601_duration("PT1H2M30S"), Ok(3750));
        assert_eq!(parse_iso8601_duration("PT4M13S"), Ok(253));
        assert_eq!(parse_iso8601_duration("P1DT2H"), Ok(93_600));
        assert_eq!(parse_iso8601_duration("P1W"), Ok(604_800));
    }

    #[test]
    fn test_zero_durations_from_live_streams() {
        assert_eq!(parse_iso8601_duration("P0D"), Ok(0));
        assert_eq!(parse_iso8601_duration("PT0S"), Ok(0));
    }

    #[test]
    fn test_fractional_seconds_are_truncated() {
        assert_eq!(parse_iso8601_duration("PT10.9S"), Ok(10));
        assert_eq!(parse_iso8601_duration("PT1M0,5S"), Ok(60));
    }

    #[test]
    fn test_malformed_input_is_rejected() {
        assert_eq!(
            parse_iso8601_duration("T1H"),
            Err(DurationError::MissingDesignator("T1H".to_string()))
        );
        for bad in ["P", "PT", "PTH", "PT12", "PT1.5M", "PT.5S", "PT5.S", "PT-5S", "PT1H1H", "PT5S1H", "PT1S2M", "P1D1W", "P1D2D"] {
            assert!(
                matches!(parse_iso8601_duration(bad), Err(DurationError::Malformed(_))),
                "expected {:?} to be malformed",
                bad
            );
        }
    }

    #[test]
    fn test_calendar_units_are_unsupported() {
        assert!(matches!(
            parse_iso8601_duration("P1Y"),
            Err(DurationError::UnsupportedUnit { unit: 'Y', .. })
        ));
        assert!(matches!(
            parse_iso8601_duration("P2M"),
            Err(DurationError::UnsupportedUnit { unit: 'M', .. })
        ));
        assert!(matches!(
            parse_iso8601_duration("PT1X"),
            Err(DurationError::UnsupportedUnit { unit: 'X', .. })
        ));
    }

    #[test]
    fn test_overflow_is_reported() {
        assert!(matches!(
            parse_iso8601_duration("P99999999999999999999W"),
            Err(DurationError::Overflow(_))
        ));
        assert!(matches!(
            parse_iso8601_duration("P9999999999999999W"),
            Err(DurationError::Overflow(_))
        ));
    }
}
