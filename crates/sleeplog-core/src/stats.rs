//! Period statistics over the diary.
//!
//! Summarizes a rolling window of nights (or the whole diary): average
//! sleep time, time in bed, efficiency, latency and WASO, subjective
//! ratings, plus one series point per night for charting.

use serde::{Deserialize, Serialize};

use crate::entry::{sorted_by_date, NightlyEntry};
use crate::error::ValidationError;
use crate::metrics::{calculate_metrics, round1, sleep_efficiency, SeClass};
use crate::srt::Window;
use crate::time::format_duration;

/// One night in a chart series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NightPoint {
    pub date: String,
    pub se: f64,
    pub se_class: SeClass,
    /// TST in hours, two decimals
    pub tst_hours: f64,
    /// TIB in hours, two decimals
    pub tib_hours: f64,
    pub sol: u32,
    pub waso: u32,
    pub sleep_quality: u8,
    pub energy_level: u8,
    pub is_day_off: bool,
}

/// Averages over a window of nights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSummary {
    pub window: Window,
    pub nights: usize,
    pub first_date: String,
    pub last_date: String,
    /// Minutes
    pub avg_tst: f64,
    pub avg_tst_formatted: String,
    /// Minutes
    pub avg_tib: f64,
    pub avg_tib_formatted: String,
    /// Ratio of the averages, one decimal
    pub avg_se: f64,
    pub se_class: SeClass,
    /// Minutes, rounded
    pub avg_sol: u32,
    /// Minutes, rounded
    pub avg_waso: u32,
    /// One decimal
    pub avg_sleep_quality: f64,
    /// One decimal
    pub avg_energy: f64,
    pub total_awakenings: usize,
    pub series: Vec<NightPoint>,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Summarize the nights selected by `window`.
///
/// # Errors
/// Returns [`ValidationError::EmptyCollection`] when the window is empty.
pub fn summarize(entries: &[NightlyEntry], window: Window) -> Result<PeriodSummary, ValidationError> {
    let sorted = sorted_by_date(entries);
    let nights = window.select(&sorted);
    let (Some(first), Some(last)) = (nights.first(), nights.last()) else {
        return Err(ValidationError::EmptyCollection(
            "no diary nights in the selected period".to_string(),
        ));
    };

    let mut sum_tst = 0u64;
    let mut sum_tib = 0u64;
    let mut sum_sol = 0u64;
    let mut sum_waso = 0u64;
    let mut sum_quality = 0u64;
    let mut sum_energy = 0u64;
    let mut total_awakenings = 0usize;
    let mut series = Vec::with_capacity(nights.len());

    for entry in nights {
        let m = calculate_metrics(entry);
        sum_tst += u64::from(m.tst);
        sum_tib += u64::from(m.tib);
        sum_sol += u64::from(m.sol);
        sum_waso += u64::from(m.waso);
        sum_quality += u64::from(entry.quality_or_default());
        sum_energy += u64::from(entry.energy_or_default());
        total_awakenings += m.num_awakenings;

        series.push(NightPoint {
            date: entry.date.clone(),
            se: m.se,
            se_class: SeClass::from_se(m.se),
            tst_hours: round2(f64::from(m.tst) / 60.0),
            tib_hours: round2(f64::from(m.tib) / 60.0),
            sol: m.sol,
            waso: m.waso,
            sleep_quality: entry.quality_or_default(),
            energy_level: entry.energy_or_default(),
            is_day_off: entry.is_day_off,
        });
    }

    let count = nights.len() as f64;
    let avg_tst = sum_tst as f64 / count;
    let avg_tib = sum_tib as f64 / count;
    let avg_se = round1(sleep_efficiency(avg_tst, avg_tib));

    Ok(PeriodSummary {
        window,
        nights: nights.len(),
        first_date: first.date.clone(),
        last_date: last.date.clone(),
        avg_tst,
        avg_tst_formatted: format_duration(avg_tst),
        avg_tib,
        avg_tib_formatted: format_duration(avg_tib),
        avg_se,
        se_class: SeClass::from_se(avg_se),
        avg_sol: (sum_sol as f64 / count).round() as u32,
        avg_waso: (sum_waso as f64 / count).round() as u32,
        avg_sleep_quality: round1(sum_quality as f64 / count),
        avg_energy: round1(sum_energy as f64 / count),
        total_awakenings,
        series,
    })
}
