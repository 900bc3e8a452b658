//! Wall-clock arithmetic on "minutes since local midnight".
//!
//! A night in the diary usually crosses midnight, so every interval between
//! two `HH:MM` instants goes through [`duration_between`], which assumes the
//! end lies on the following day whenever it reads earlier than the start.
//! Computation stays in whole minutes; [`format_duration`] is for display only.

use chrono::{NaiveTime, Timelike};

use crate::error::ValidationError;

/// Minutes in a day.
pub const MINUTES_PER_DAY: u32 = 1440;

/// Parse `HH:MM` into minutes since midnight.
///
/// Permissive: a missing string, or one without a `:`, yields `0` (midnight).
/// A non-numeric hour also yields `0`; a non-numeric minute part counts as 0
/// minutes. Out-of-range values are wrapped into `[0, 1440)`.
///
/// Callers that must tell "midnight" apart from "garbage" should use
/// [`parse_clock_time`] instead.
pub fn time_to_minutes(time: &str) -> u32 {
    let Some((hours, minutes)) = time.split_once(':') else {
        return 0;
    };
    let Ok(hours) = hours.trim().parse::<u64>() else {
        return 0;
    };
    let minutes = minutes.trim().parse::<u64>().unwrap_or(0);
    let total = hours.saturating_mul(60).saturating_add(minutes);
    (total % u64::from(MINUTES_PER_DAY)) as u32
}

/// Strict variant of [`time_to_minutes`] for the ingestion boundary.
///
/// # Errors
/// Returns [`ValidationError::InvalidClockTime`] unless `time` is a valid
/// 24-hour `H:MM`/`HH:MM` clock reading.
pub fn parse_clock_time(time: &str) -> Result<u32, ValidationError> {
    NaiveTime::parse_from_str(time.trim(), "%H:%M")
        .map(|t| t.hour() * 60 + t.minute())
        .map_err(|_| ValidationError::InvalidClockTime(time.to_string()))
}

/// Format minutes since midnight as `HH:MM`, wrapping any integer
/// (negative or past a day) into `[0, 1440)` first.
pub fn minutes_to_time_str(minutes: i64) -> String {
    let total = minutes.rem_euclid(i64::from(MINUTES_PER_DAY));
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Format a duration as `"Xh YYm"`.
///
/// Rounds half up to the nearest minute, then drops the sign.
pub fn format_duration(minutes: f64) -> String {
    let total = (minutes + 0.5).floor().abs() as u64;
    format!("{}h {:02}m", total / 60, total % 60)
}

/// Minutes from `start` to `end` on the same logical night.
///
/// When `end` reads earlier than `start` the interval is taken to cross
/// midnight. The result is always in `[0, 1439]`.
pub fn duration_between(start: &str, end: &str) -> u32 {
    minutes_between(time_to_minutes(start), time_to_minutes(end))
}

/// [`duration_between`] over already-parsed minute-of-day values.
pub fn minutes_between(start: u32, end: u32) -> u32 {
    if end < start {
        (MINUTES_PER_DAY - start) + end
    } else {
        end - start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn time_to_minutes_parses_clock() {
        assert_eq!(time_to_minutes("00:00"), 0);
        assert_eq!(time_to_minutes("06:15"), 375);
        assert_eq!(time_to_minutes("23:59"), 1439);
        assert_eq!(time_to_minutes("7:05"), 425);
    }

    #[test]
    fn time_to_minutes_is_permissive() {
        assert_eq!(time_to_minutes(""), 0);
        assert_eq!(time_to_minutes("0615"), 0);
        assert_eq!(time_to_minutes("ab:cd"), 0);
        assert_eq!(time_to_minutes("06:"), 360);
        assert_eq!(time_to_minutes("24:30"), 30);
    }

    #[test]
    fn parse_clock_time_rejects_garbage() {
        assert_eq!(parse_clock_time("23:15"), Ok(1395));
        assert!(parse_clock_time("").is_err());
        assert!(parse_clock_time("24:00").is_err());
        assert!(parse_clock_time("12:60").is_err());
        assert!(parse_clock_time("noon").is_err());
    }

    #[test]
    fn minutes_to_time_str_wraps() {
        assert_eq!(minutes_to_time_str(-30), "23:30");
        assert_eq!(minutes_to_time_str(1500), "01:00");
        assert_eq!(minutes_to_time_str(0), "00:00");
        assert_eq!(minutes_to_time_str(-1440), "00:00");
        assert_eq!(minutes_to_time_str(1439), "23:59");
    }

    #[test]
    fn format_duration_uses_absolute_value() {
        assert_eq!(format_duration(-95.0), "1h 35m");
        assert_eq!(format_duration(435.0), "7h 15m");
        assert_eq!(format_duration(0.0), "0h 00m");
        assert_eq!(format_duration(390.6), "6h 31m");
        assert_eq!(format_duration(59.4), "0h 59m");
    }

    #[test]
    fn duration_between_crosses_midnight() {
        assert_eq!(duration_between("23:00", "06:15"), 435);
        assert_eq!(duration_between("23:15", "06:00"), 405);
        assert_eq!(duration_between("01:00", "06:00"), 300);
        assert_eq!(duration_between("06:00", "05:59"), 1439);
    }

    fn clock() -> impl Strategy<Value = String> {
        (0u32..24, 0u32..60).prop_map(|(h, m)| format!("{h:02}:{m:02}"))
    }

    proptest! {
        #[test]
        fn duration_to_self_is_zero(t in clock()) {
            prop_assert_eq!(duration_between(&t, &t), 0);
        }

        #[test]
        fn duration_stays_within_a_day(a in clock(), b in clock()) {
            prop_assert!(duration_between(&a, &b) <= 1439);
        }

        #[test]
        fn clock_round_trips(t in clock()) {
            prop_assert_eq!(minutes_to_time_str(i64::from(time_to_minutes(&t))), t);
        }

        #[test]
        fn wrapped_formatting_matches_modulo(m in -100_000i64..100_000) {
            let expected = minutes_to_time_str(m.rem_euclid(1440));
            prop_assert_eq!(minutes_to_time_str(m), expected);
        }
    }
}
