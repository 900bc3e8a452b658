//! Per-night CBT-I metrics.
//!
//! [`calculate_metrics`] turns one diary night into TIB, SOL, WASO, TST and
//! sleep efficiency. It is pure and recomputed on every call; nothing here
//! is cached or stored.

use serde::{Deserialize, Serialize};

use crate::entry::NightlyEntry;
use crate::time::{duration_between, format_duration};

/// Sleep efficiency at or above which a night counts as good.
pub const SE_GOOD_THRESHOLD: f64 = 90.0;
/// Sleep efficiency below which a night counts as poor.
pub const SE_POOR_THRESHOLD: f64 = 85.0;

/// Metrics derived from a single [`NightlyEntry`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedMetrics {
    /// Time in bed, minutes
    pub tib: u32,
    pub tib_formatted: String,
    /// Sleep onset latency, minutes
    pub sol: u32,
    /// Wake after sleep onset, minutes
    pub waso: u32,
    /// Total sleep time, minutes (never negative)
    pub tst: u32,
    pub tst_formatted: String,
    /// Sleep efficiency in percent, one decimal
    pub se: f64,
    pub num_awakenings: usize,
    /// Summed nap minutes; informational, not subtracted from TST
    pub naps_duration: u32,
}

/// Clinical band of a sleep efficiency value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeClass {
    /// SE >= 90
    Success,
    /// 85 <= SE < 90
    Warning,
    /// SE < 85
    Danger,
}

impl SeClass {
    /// Classify a sleep efficiency percentage.
    pub fn from_se(se: f64) -> Self {
        if se >= SE_GOOD_THRESHOLD {
            Self::Success
        } else if se >= SE_POOR_THRESHOLD {
            Self::Warning
        } else {
            Self::Danger
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Danger => "danger",
        }
    }
}

impl std::fmt::Display for SeClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Round to one decimal place.
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Sleep efficiency in percent; 0 when there is no time in bed.
pub fn sleep_efficiency(tst: f64, tib: f64) -> f64 {
    if tib > 0.0 {
        tst / tib * 100.0
    } else {
        0.0
    }
}

/// Derive the metric set of one night.
///
/// TST is `lights out -> final wake` minus SOL and WASO, floored at zero
/// when awakenings are over-reported.
pub fn calculate_metrics(entry: &NightlyEntry) -> DerivedMetrics {
    let tib = duration_between(&entry.time_in_bed, &entry.time_out_of_bed);
    let sol = entry.sol;
    let waso = entry
        .awakenings
        .iter()
        .fold(0u32, |acc, a| acc.saturating_add(a.duration));

    let sleep_window = duration_between(&entry.lights_out, &entry.final_wake_time);
    let tst = sleep_window.saturating_sub(sol).saturating_sub(waso);
    if tst == 0 && sleep_window > 0 {
        tracing::debug!(
            id = %entry.id,
            sleep_window,
            sol,
            waso,
            "SOL and WASO cover the whole sleep window, TST floored at 0"
        );
    }

    let se = round1(sleep_efficiency(f64::from(tst), f64::from(tib)));
    let naps_duration = entry
        .naps
        .iter()
        .fold(0u32, |acc, n| acc.saturating_add(n.duration));

    DerivedMetrics {
        tib,
        tib_formatted: format_duration(f64::from(tib)),
        sol,
        waso,
        tst,
        tst_formatted: format_duration(f64::from(tst)),
        se,
        num_awakenings: entry.awakenings.len(),
        naps_duration,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{Awakening, Nap};

    fn reference_night() -> NightlyEntry {
        let mut entry = NightlyEntry::new("n1", "2024-03-02", "23:00", "23:15", "06:00", "06:15");
        entry.sol = 15;
        entry.awakenings.push(Awakening {
            time: "02:00".to_string(),
            duration: 20,
            ..Awakening::default()
        });
        entry
    }

    #[test]
    fn reference_night_metrics() {
        let m = calculate_metrics(&reference_night());
        assert_eq!(m.tib, 435);
        assert_eq!(m.waso, 20);
        assert_eq!(m.sol, 15);
        assert_eq!(m.tst, 370);
        assert_eq!(m.se, 85.1);
        assert_eq!(m.num_awakenings, 1);
        assert_eq!(m.tib_formatted, "7h 15m");
        assert_eq!(m.tst_formatted, "6h 10m");
    }

    #[test]
    fn tst_is_clamped_at_zero() {
        let mut entry = reference_night();
        entry.sol = 300;
        entry.awakenings[0].duration = 200;
        let m = calculate_metrics(&entry);
        assert_eq!(m.tst, 0);
        assert_eq!(m.se, 0.0);
    }

    #[test]
    fn zero_time_in_bed_gives_zero_efficiency() {
        let entry = NightlyEntry::new("n1", "2024-03-02", "23:00", "23:00", "23:00", "23:00");
        let m = calculate_metrics(&entry);
        assert_eq!(m.tib, 0);
        assert_eq!(m.se, 0.0);
    }

    #[test]
    fn naps_are_summed_but_not_subtracted() {
        let mut entry = reference_night();
        entry.naps.push(Nap {
            time: "14:30".to_string(),
            duration: 30,
            intentional: false,
        });
        entry.naps.push(Nap {
            time: "17:00".to_string(),
            duration: 15,
            intentional: true,
        });
        let m = calculate_metrics(&entry);
        assert_eq!(m.naps_duration, 45);
        assert_eq!(m.tst, 370);
    }

    #[test]
    fn missing_times_read_as_midnight() {
        let entry = NightlyEntry::new("n1", "2024-03-02", "", "", "06:00", "06:30");
        let m = calculate_metrics(&entry);
        assert_eq!(m.tib, 390);
        assert_eq!(m.tst, 360);
    }

    #[test]
    fn se_class_cut_points() {
        assert_eq!(SeClass::from_se(90.0), SeClass::Success);
        assert_eq!(SeClass::from_se(97.3), SeClass::Success);
        assert_eq!(SeClass::from_se(89.9), SeClass::Warning);
        assert_eq!(SeClass::from_se(85.0), SeClass::Warning);
        assert_eq!(SeClass::from_se(84.9), SeClass::Danger);
        assert_eq!(SeClass::from_se(0.0), SeClass::Danger);
        assert_eq!(SeClass::from_se(90.0).to_string(), "success");
    }
}
