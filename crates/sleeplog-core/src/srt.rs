//! Sleep Restriction Therapy prescription.
//!
//! Averages TST and TIB over the most recent nights, restricts the next
//! sleep window to the average sleep time (rounded down to 15 minutes,
//! never below an age-dependent safety floor) and anchors it on a fixed
//! wake time. Guidance for the next cycle follows the sleep efficiency
//! bands of [`SeClass`](crate::metrics::SeClass).
//!
//! # Usage
//! ```rust,ignore
//! use sleeplog_core::srt::{calculate_srt, Window};
//!
//! let rx = calculate_srt(&entries, Window::Days(14), "06:00", 42)?;
//! println!("{} to {}", rx.prescribed_bed_time, rx.fixed_wake_time);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::entry::{sorted_by_date, NightlyEntry};
use crate::error::ValidationError;
use crate::metrics::{calculate_metrics, sleep_efficiency, SE_GOOD_THRESHOLD, SE_POOR_THRESHOLD};
use crate::time::{format_duration, minutes_to_time_str, time_to_minutes};

/// Nights averaged when the caller does not choose a window.
pub const DEFAULT_WINDOW_DAYS: usize = 14;
/// Prescribed time in bed is rounded down to this step.
pub const TIB_STEP_MIN: u32 = 15;
/// Safety floor for adults under [`ELDERLY_AGE`].
pub const MIN_TIB_ADULT: u32 = 300;
/// Safety floor from [`ELDERLY_AGE`] on.
pub const MIN_TIB_ELDERLY: u32 = 330;
pub const ELDERLY_AGE: u32 = 65;
/// SE above which a 30 minute extension is always suggested.
pub const SE_EXCELLENT_THRESHOLD: f64 = 95.0;
/// Prescribed windows shorter than this get a 30 minute extension.
pub const SHORT_WINDOW_MIN: u32 = 360;

/// How many of the most recent nights to aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Window {
    /// The last N nights by date
    Days(usize),
    /// Every night in the diary
    All,
}

impl Default for Window {
    fn default() -> Self {
        Self::Days(DEFAULT_WINDOW_DAYS)
    }
}

impl Window {
    /// The tail of `sorted` this window covers.
    pub fn select<'a, T>(&self, sorted: &'a [T]) -> &'a [T] {
        match *self {
            Self::All => sorted,
            Self::Days(n) => &sorted[sorted.len().saturating_sub(n)..],
        }
    }
}

impl FromStr for Window {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        match s.parse::<usize>() {
            Ok(n) if n > 0 => Ok(Self::Days(n)),
            _ => Err(ValidationError::InvalidValue {
                field: "window".to_string(),
                message: format!("expected a positive number of days or 'all', got '{s}'"),
            }),
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Days(n) => write!(f, "{n}"),
            Self::All => f.write_str("all"),
        }
    }
}

/// Change to the sleep window suggested for the next cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Adjustment {
    /// SE < 85: restrict further, as long as the floor allows
    Shorten { minutes: u32 },
    /// 85 <= SE <= 90
    Keep,
    /// SE > 90
    Lengthen { minutes: u32 },
}

/// Prescribed sleep window for the next cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SrtPrescription {
    pub nights_analyzed: usize,
    /// Average total sleep time, minutes
    pub avg_tst: f64,
    /// Average time in bed, minutes
    pub avg_tib: f64,
    /// Ratio of the averages, percent
    pub avg_se: f64,
    /// Safety floor that applied for the patient's age
    pub min_tib: u32,
    pub prescribed_tib: u32,
    pub prescribed_bed_time: String,
    pub fixed_wake_time: String,
    pub adjustment: Adjustment,
    /// Time in bed the adjustment leads to, never below `min_tib`
    pub next_cycle_tib: u32,
    pub recommendation_text: String,
    /// Set when the floor raised `prescribed_tib`
    pub floored_note: Option<String>,
}

/// Safety floor on time in bed for a patient of `age`.
pub fn min_tib_for_age(age: u32) -> u32 {
    if age >= ELDERLY_AGE {
        MIN_TIB_ELDERLY
    } else {
        MIN_TIB_ADULT
    }
}

/// Pick the next-cycle adjustment from the average SE and prescribed TIB.
pub fn choose_adjustment(avg_se: f64, prescribed_tib: u32) -> Adjustment {
    if avg_se < SE_POOR_THRESHOLD {
        Adjustment::Shorten {
            minutes: TIB_STEP_MIN,
        }
    } else if avg_se <= SE_GOOD_THRESHOLD {
        Adjustment::Keep
    } else if prescribed_tib < SHORT_WINDOW_MIN || avg_se > SE_EXCELLENT_THRESHOLD {
        Adjustment::Lengthen { minutes: 30 }
    } else {
        Adjustment::Lengthen {
            minutes: TIB_STEP_MIN,
        }
    }
}

fn guidance(adjustment: Adjustment) -> String {
    match adjustment {
        Adjustment::Shorten { minutes } => format!(
            "SE < 85% - shorten time in bed by {minutes} min next week (as long as it stays above the minimum)."
        ),
        Adjustment::Keep => {
            "SE 85-90% - no change, keep the current sleep window.".to_string()
        }
        Adjustment::Lengthen { minutes } => format!(
            "SE > 90% - lengthen time in bed by {minutes} min for better rest."
        ),
    }
}

/// Compute an SRT prescription from the diary.
///
/// Entries are sorted by date and the last `window` nights are averaged.
/// `fixed_wake_time` is read permissively (see
/// [`time_to_minutes`](crate::time::time_to_minutes)).
///
/// # Errors
/// Returns [`ValidationError::EmptyCollection`] when the window holds no
/// nights, instead of computing on empty aggregates.
pub fn calculate_srt(
    entries: &[NightlyEntry],
    window: Window,
    fixed_wake_time: &str,
    patient_age: u32,
) -> Result<SrtPrescription, ValidationError> {
    let sorted = sorted_by_date(entries);
    let nights = window.select(&sorted);
    if nights.is_empty() {
        return Err(ValidationError::EmptyCollection(
            "no diary nights to base a prescription on".to_string(),
        ));
    }

    let (sum_tst, sum_tib) = nights.iter().fold((0u64, 0u64), |(tst, tib), entry| {
        let m = calculate_metrics(entry);
        (tst + u64::from(m.tst), tib + u64::from(m.tib))
    });
    let count = nights.len() as f64;
    let avg_tst = sum_tst as f64 / count;
    let avg_tib = sum_tib as f64 / count;
    let avg_se = sleep_efficiency(avg_tst, avg_tib);

    let mut prescribed_tib = (avg_tst / f64::from(TIB_STEP_MIN)).floor() as u32 * TIB_STEP_MIN;
    let min_tib = min_tib_for_age(patient_age);
    let floored_note = if prescribed_tib < min_tib {
        prescribed_tib = min_tib;
        Some(format!(
            "Safety minimum applied ({}). ",
            format_duration(f64::from(min_tib))
        ))
    } else {
        None
    };

    let adjustment = choose_adjustment(avg_se, prescribed_tib);
    let next_cycle_tib = match adjustment {
        Adjustment::Shorten { minutes } => prescribed_tib.saturating_sub(minutes).max(min_tib),
        Adjustment::Keep => prescribed_tib,
        Adjustment::Lengthen { minutes } => prescribed_tib + minutes,
    };

    let mut recommendation_text = floored_note.clone().unwrap_or_default();
    recommendation_text.push_str(&guidance(adjustment));

    let bed_minutes = i64::from(time_to_minutes(fixed_wake_time)) - i64::from(prescribed_tib);
    let prescribed_bed_time = minutes_to_time_str(bed_minutes);

    tracing::debug!(
        nights = nights.len(),
        avg_tst,
        avg_se,
        prescribed_tib,
        floored = floored_note.is_some(),
        "computed SRT prescription"
    );

    Ok(SrtPrescription {
        nights_analyzed: nights.len(),
        avg_tst,
        avg_tib,
        avg_se,
        min_tib,
        prescribed_tib,
        prescribed_bed_time,
        fixed_wake_time: fixed_wake_time.to_string(),
        adjustment,
        next_cycle_tib,
        recommendation_text,
        floored_note,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A night with the given sleep and bed minutes, asleep at lights out.
    fn night(date: &str, tst: u32, tib: u32) -> NightlyEntry {
        let out = minutes_to_time_str(23 * 60 + i64::from(tib));
        let wake = minutes_to_time_str(23 * 60 + i64::from(tst));
        NightlyEntry::new(date, date, "23:00", "23:00", wake, out)
    }

    #[test]
    fn empty_diary_signals_no_data() {
        let result = calculate_srt(&[], Window::default(), "06:00", 40);
        assert!(matches!(result, Err(ValidationError::EmptyCollection(_))));
    }

    #[test]
    fn rounds_down_to_quarter_hour() {
        let entries = vec![night("2024-03-01", 391, 420)];
        let rx = calculate_srt(&entries, Window::default(), "06:00", 70).unwrap();
        assert_eq!(rx.avg_tst, 391.0);
        assert_eq!(rx.prescribed_tib, 390);
        assert_eq!(rx.min_tib, 330);
        assert!(rx.floored_note.is_none());
        assert_eq!(rx.prescribed_bed_time, "23:30");
        // SE 93.1: above 90, window >= 6h, not above 95
        assert_eq!(rx.adjustment, Adjustment::Lengthen { minutes: 15 });
        assert_eq!(rx.next_cycle_tib, 405);
        assert!(rx.recommendation_text.starts_with("SE > 90%"));
    }

    #[test]
    fn applies_safety_floor() {
        let entries = vec![night("2024-03-01", 250, 480)];
        let rx = calculate_srt(&entries, Window::default(), "06:00", 30).unwrap();
        assert_eq!(rx.prescribed_tib, 300);
        assert_eq!(rx.prescribed_bed_time, "01:00");
        assert_eq!(rx.floored_note.as_deref(), Some("Safety minimum applied (5h 00m). "));
        assert_eq!(rx.adjustment, Adjustment::Shorten { minutes: 15 });
        assert_eq!(rx.next_cycle_tib, 300);
        assert!(rx.recommendation_text.starts_with("Safety minimum applied"));

        let rx = calculate_srt(&entries, Window::default(), "06:00", 65).unwrap();
        assert_eq!(rx.prescribed_tib, 330);
        assert_eq!(rx.prescribed_bed_time, "00:30");
    }

    #[test]
    fn keeps_window_in_middle_band() {
        // 87.5% efficiency
        let entries = vec![night("2024-03-01", 420, 480)];
        let rx = calculate_srt(&entries, Window::default(), "07:00", 30).unwrap();
        assert_eq!(rx.adjustment, Adjustment::Keep);
        assert_eq!(rx.next_cycle_tib, rx.prescribed_tib);
        assert_eq!(rx.prescribed_bed_time, "00:00");
    }

    #[test]
    fn exactly_ninety_percent_keeps_window() {
        let entries = vec![night("2024-03-01", 360, 400)];
        let rx = calculate_srt(&entries, Window::default(), "06:00", 30).unwrap();
        assert_eq!(rx.avg_se, 90.0);
        assert_eq!(rx.adjustment, Adjustment::Keep);
    }

    #[test]
    fn short_or_excellent_windows_extend_by_half_hour() {
        assert_eq!(choose_adjustment(92.0, 345), Adjustment::Lengthen { minutes: 30 });
        assert_eq!(choose_adjustment(96.0, 420), Adjustment::Lengthen { minutes: 30 });
        assert_eq!(choose_adjustment(92.0, 420), Adjustment::Lengthen { minutes: 15 });
        assert_eq!(choose_adjustment(84.9, 420), Adjustment::Shorten { minutes: 15 });
    }

    #[test]
    fn averages_only_the_latest_nights() {
        let mut entries = Vec::new();
        for day in 1..=20u32 {
            let tst = if day > 6 { 420 } else { 200 };
            entries.push(night(&format!("2024-03-{day:02}"), tst, 450));
        }
        entries.reverse();

        let rx = calculate_srt(&entries, Window::Days(14), "06:00", 30).unwrap();
        assert_eq!(rx.nights_analyzed, 14);
        assert_eq!(rx.avg_tst, 420.0);

        let rx = calculate_srt(&entries, Window::All, "06:00", 30).unwrap();
        assert_eq!(rx.nights_analyzed, 20);
        assert_eq!(rx.avg_tst, (14.0 * 420.0 + 6.0 * 200.0) / 20.0);
    }

    #[test]
    fn same_input_same_output() {
        let entries = vec![night("2024-03-01", 391, 420), night("2024-03-02", 350, 450)];
        let a = calculate_srt(&entries, Window::default(), "06:30", 50).unwrap();
        let b = calculate_srt(&entries, Window::default(), "06:30", 50).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn window_parses_days_and_all() {
        assert_eq!("14".parse::<Window>().unwrap(), Window::Days(14));
        assert_eq!("ALL".parse::<Window>().unwrap(), Window::All);
        assert!("0".parse::<Window>().is_err());
        assert!("two weeks".parse::<Window>().is_err());
        assert_eq!(Window::Days(7).to_string(), "7");
    }
}
