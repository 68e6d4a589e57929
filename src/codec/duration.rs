//! Duration literals
//!
//! The database prints and accepts durations as `<h>h<m>m<s>s`. Any zero
//! component may be left out, and `0s` stands for an empty duration.

use chrono::Duration;

use super::error::{CodecError, CodecResult};

/// Parse a literal such as `6h20m15s`, `20m`, `24h` or `15s`
pub fn parse(literal: &str) -> CodecResult<Duration> {
    if literal.trim().is_empty() {
        return Err(CodecError::InvalidArgument(
            "Duration literal cannot be blank".to_string(),
        ));
    }

    let re = regex::Regex::new(r"^(?:(\d+)h)?(?:(\d+)m)?(?:(\d+)s)?$")
        .map_err(|e| CodecError::InvalidArgument(e.to_string()))?;
    let caps = re
        .captures(literal)
        .filter(|caps| caps.iter().skip(1).any(|group| group.is_some()))
        .ok_or_else(|| CodecError::InvalidArgument(format!("Invalid duration literal: {literal}")))?;

    let component = |idx: usize| -> CodecResult<i64> {
        match caps.get(idx) {
            Some(m) => m.as_str().parse().map_err(|_| {
                CodecError::InvalidArgument(format!("Duration component out of range: {literal}"))
            }),
            None => Ok(0),
        }
    };

    let (hours, minutes, seconds) = (component(1)?, component(2)?, component(3)?);
    let total = hours
        .checked_mul(3600)
        .and_then(|h| minutes.checked_mul(60).and_then(|m| h.checked_add(m)))
        .and_then(|hm| hm.checked_add(seconds))
        .ok_or_else(|| CodecError::InvalidArgument(format!("Duration out of range: {literal}")))?;

    Duration::try_seconds(total)
        .ok_or_else(|| CodecError::InvalidArgument(format!("Duration out of range: {literal}")))
}

/// Render a duration as a literal, dropping sub-second precision
pub fn format(duration: Duration) -> CodecResult<String> {
    if duration < Duration::zero() {
        return Err(CodecError::InvalidArgument(
            "Duration cannot be negative".to_string(),
        ));
    }

    let total = duration.num_seconds();
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    if total == 0 {
        return Ok("0s".to_string());
    }

    let mut literal = String::new();
    if hours > 0 {
        literal.push_str(&format!("{hours}h"));
    }
    if minutes > 0 {
        literal.push_str(&format!("{minutes}m"));
    }
    if seconds > 0 {
        literal.push_str(&format!("{seconds}s"));
    }
    Ok(literal)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hms(h: i64, m: i64, s: i64) -> Duration {
        Duration::hours(h) + Duration::minutes(m) + Duration::seconds(s)
    }

    #[test]
    fn test_format() {
        assert_eq!(format(hms(6, 20, 15)).unwrap(), "6h20m15s");
        assert_eq!(format(Duration::zero()).unwrap(), "0s");
        assert_eq!(format(Duration::days(1)).unwrap(), "24h");
        assert_eq!(format(hms(0, 5, 0)).unwrap(), "5m");
        assert_eq!(format(hms(1, 0, 30)).unwrap(), "1h30s");
        assert_eq!(format(Duration::milliseconds(400)).unwrap(), "0s");
    }

    #[test]
    fn test_format_negative() {
        assert!(matches!(
            format(Duration::seconds(-1)),
            Err(CodecError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_parse() {
        assert_eq!(parse("6h20m15s").unwrap(), hms(6, 20, 15));
        assert_eq!(parse("168h0m0s").unwrap(), Duration::days(7));
        assert_eq!(parse("20m0s").unwrap(), hms(0, 20, 0));
        assert_eq!(parse("45s").unwrap(), hms(0, 0, 45));
        assert_eq!(parse("1h30s").unwrap(), hms(1, 0, 30));
        assert_eq!(parse("0s").unwrap(), Duration::zero());
        assert_eq!(parse("6h").unwrap(), hms(6, 0, 0));
        assert_eq!(parse("1h2m").unwrap(), hms(1, 2, 0));
        assert_eq!(parse("1m").unwrap(), hms(0, 1, 0));
    }

    #[test]
    fn test_parse_invalid() {
        for literal in ["", "  ", "abc", "1s2m", "-5s", "1.5s", "5", "h", "1m1h", " 5s"] {
            assert!(
                matches!(parse(literal), Err(CodecError::InvalidArgument(_))),
                "expected failure for {:?}",
                literal
            );
        }
    }

    #[test]
    fn test_round_trip() {
        for seconds in [0, 1, 59, 60, 61, 120, 3599, 3600, 3660, 3661, 86_400, 604_800, 1_000_000] {
            let duration = Duration::seconds(seconds);
            assert_eq!(parse(&format(duration).unwrap()).unwrap(), duration);
        }
    }

    #[test]
    fn test_whole_minutes_and_hours_round_trip() {
        for (literal, duration) in [
            ("1m", Duration::minutes(1)),
            ("1h", Duration::hours(1)),
            ("24h", Duration::days(1)),
        ] {
            assert_eq!(format(duration).unwrap(), literal);
            assert_eq!(parse(literal).unwrap(), duration);
        }
    }
}
