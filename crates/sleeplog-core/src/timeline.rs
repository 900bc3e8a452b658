//! 24-hour grid layout of diary nights.
//!
//! Each night is laid out on a day-long axis that starts at the configured
//! grid hour (16:00 by default, so an evening-to-morning night reads left to
//! right). Positions are minutes from the grid start, plus the same values
//! as percentages of the row width for renderers.

use serde::{Deserialize, Serialize};

use crate::entry::NightlyEntry;
use crate::metrics::{calculate_metrics, SeClass};
use crate::time::{duration_between, minutes_between, minutes_to_time_str, time_to_minutes, MINUTES_PER_DAY};

/// Grid start hour used when none is configured.
pub const DEFAULT_GRID_START_HOUR: u32 = 16;
/// Relaxation length assumed when recorded without a duration.
pub const DEFAULT_RELAXATION_MIN: u32 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SegmentKind {
    InBed,
    Asleep,
    Awake { got_out_of_bed: bool },
    Nap { intentional: bool },
}

/// A bar on the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    #[serde(flatten)]
    pub kind: SegmentKind,
    pub start: String,
    pub offset_min: u32,
    pub width_min: u32,
    pub left_pct: f64,
    pub width_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    LightsOut,
    Caffeine,
    Activity,
    Alcohol,
    Medication,
    Relaxation,
    ScreenTime,
}

/// A point event on the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub kind: MarkerKind,
    pub time: String,
    pub offset_min: u32,
    pub left_pct: f64,
    pub label: String,
}

/// One night laid out on the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineRow {
    pub id: String,
    pub date: String,
    pub is_day_off: bool,
    pub se: f64,
    pub se_class: SeClass,
    pub sleep_quality: u8,
    pub energy_level: u8,
    pub segments: Vec<Segment>,
    pub markers: Vec<Marker>,
}

/// Positions relative to a grid start hour.
#[derive(Debug, Clone, Copy)]
pub struct Grid {
    start_min: u32,
}

impl Grid {
    /// Grid starting at `start_hour` (taken modulo 24).
    pub fn new(start_hour: u32) -> Self {
        Self {
            start_min: (start_hour % 24) * 60,
        }
    }

    /// Minutes from the grid start to the clock reading `time`.
    pub fn offset(&self, time: &str) -> u32 {
        minutes_between(self.start_min, time_to_minutes(time))
    }

    fn pct(minutes: u32) -> f64 {
        f64::from(minutes) / f64::from(MINUTES_PER_DAY) * 100.0
    }

    /// Hour labels along the axis, `HH:00`.
    pub fn hour_labels(&self) -> Vec<String> {
        (0..24)
            .map(|h| minutes_to_time_str(i64::from(self.start_min + h * 60)))
            .collect()
    }

    fn segment(&self, kind: SegmentKind, start: &str, width_min: u32) -> Segment {
        let offset_min = self.offset(start);
        Segment {
            kind,
            start: start.to_string(),
            offset_min,
            width_min,
            left_pct: Self::pct(offset_min),
            width_pct: Self::pct(width_min),
        }
    }

    fn marker(&self, kind: MarkerKind, time: &str, label: String) -> Marker {
        let offset_min = self.offset(time);
        Marker {
            kind,
            time: time.to_string(),
            offset_min,
            left_pct: Self::pct(offset_min),
            label,
        }
    }

    /// Lay out one night.
    pub fn layout(&self, entry: &NightlyEntry) -> TimelineRow {
        let m = calculate_metrics(entry);
        let mut segments = vec![self.segment(SegmentKind::InBed, &entry.time_in_bed, m.tib)];
        let mut markers = Vec::new();

        let sleep_start =
            minutes_to_time_str(i64::from(time_to_minutes(&entry.lights_out)) + i64::from(entry.sol));
        let sleep_width = duration_between(&sleep_start, &entry.final_wake_time);
        if sleep_width > 0 {
            segments.push(self.segment(SegmentKind::Asleep, &sleep_start, sleep_width));
            for awakening in entry.awakenings.iter().filter(|a| !a.time.is_empty()) {
                segments.push(self.segment(
                    SegmentKind::Awake {
                        got_out_of_bed: awakening.got_out_of_bed,
                    },
                    &awakening.time,
                    awakening.duration,
                ));
            }
        }

        for nap in entry.naps.iter().filter(|n| !n.time.is_empty()) {
            segments.push(self.segment(
                SegmentKind::Nap {
                    intentional: nap.intentional,
                },
                &nap.time,
                nap.duration,
            ));
        }

        if !entry.lights_out.is_empty() {
            markers.push(self.marker(MarkerKind::LightsOut, &entry.lights_out, "Lights out".to_string()));
        }
        for c in entry.caffeine.iter().filter(|c| !c.time.is_empty()) {
            markers.push(self.marker(MarkerKind::Caffeine, &c.time, format!("Caffeine: {}", c.kind)));
        }
        for a in entry.physical_activity.iter().filter(|a| !a.time.is_empty()) {
            markers.push(self.marker(
                MarkerKind::Activity,
                &a.time,
                format!("Activity: {} ({} min)", a.kind, a.duration),
            ));
        }
        for a in entry.alcohol.iter().filter(|a| !a.time.is_empty()) {
            markers.push(self.marker(
                MarkerKind::Alcohol,
                &a.time,
                format!("Alcohol: {}, {} units", a.kind, a.units),
            ));
        }
        for med in entry.meds.iter().filter(|m| !m.time.is_empty()) {
            markers.push(self.marker(MarkerKind::Medication, &med.time, format!("Medication: {}", med.name)));
        }

        let in_bed = i64::from(time_to_minutes(&entry.time_in_bed));
        if entry.relaxation.used {
            let duration = match entry.relaxation.duration {
                0 => DEFAULT_RELAXATION_MIN,
                d => d,
            };
            let time = minutes_to_time_str(in_bed - i64::from(duration));
            markers.push(self.marker(
                MarkerKind::Relaxation,
                &time,
                format!("Relaxation: {duration} min"),
            ));
        }
        if entry.screen_time > 0 {
            let time = minutes_to_time_str(in_bed - i64::from(entry.screen_time));
            markers.push(self.marker(
                MarkerKind::ScreenTime,
                &time,
                format!("Screen time: {} min before bed", entry.screen_time),
            ));
        }

        TimelineRow {
            id: entry.id.clone(),
            date: entry.date.clone(),
            is_day_off: entry.is_day_off,
            se: m.se,
            se_class: SeClass::from_se(m.se),
            sleep_quality: entry.quality_or_default(),
            energy_level: entry.energy_or_default(),
            segments,
            markers,
        }
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(DEFAULT_GRID_START_HOUR)
    }
}

/// Lay out every night, newest first.
pub fn layout_diary(entries: &[NightlyEntry], grid_start_hour: u32) -> Vec<TimelineRow> {
    let grid = Grid::new(grid_start_hour);
    crate::entry::sorted_by_date(entries)
        .into_iter()
        .rev()
        .map(|entry| grid.layout(entry))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{AlcoholIntake, Awakening, Relaxation};

    fn reference_night() -> NightlyEntry {
        let mut entry = NightlyEntry::new("n1", "2024-03-02", "23:00", "23:15", "06:00", "06:15");
        entry.sol = 15;
        entry.awakenings.push(Awakening {
            time: "02:00".to_string(),
            duration: 20,
            got_out_of_bed: true,
            activity: String::new(),
        });
        entry
    }

    #[test]
    fn offsets_wrap_around_grid_start() {
        let grid = Grid::new(16);
        assert_eq!(grid.offset("16:00"), 0);
        assert_eq!(grid.offset("23:00"), 420);
        assert_eq!(grid.offset("06:00"), 840);
        assert_eq!(grid.offset("15:59"), 1439);
    }

    #[test]
    fn hour_labels_start_at_grid_hour() {
        let labels = Grid::new(20).hour_labels();
        assert_eq!(labels.len(), 24);
        assert_eq!(labels[0], "20:00");
        assert_eq!(labels[4], "00:00");
        assert_eq!(labels[23], "19:00");
    }

    #[test]
    fn lays_out_bed_sleep_and_awakenings() {
        let row = Grid::default().layout(&reference_night());

        assert_eq!(row.segments[0].kind, SegmentKind::InBed);
        assert_eq!(row.segments[0].offset_min, 420);
        assert_eq!(row.segments[0].width_min, 435);

        assert_eq!(row.segments[1].kind, SegmentKind::Asleep);
        assert_eq!(row.segments[1].start, "23:30");
        assert_eq!(row.segments[1].width_min, 390);

        assert_eq!(row.segments[2].kind, SegmentKind::Awake { got_out_of_bed: true });
        assert_eq!(row.segments[2].offset_min, 600);
        assert_eq!(row.segments[2].width_pct, 20.0 / 1440.0 * 100.0);

        assert_eq!(row.markers[0].kind, MarkerKind::LightsOut);
        assert_eq!(row.se_class, SeClass::Warning);
    }

    #[test]
    fn places_pre_bed_markers_before_time_in_bed() {
        let mut entry = reference_night();
        entry.relaxation = Relaxation {
            used: true,
            duration: 0,
        };
        entry.screen_time = 90;
        entry.alcohol.push(AlcoholIntake {
            time: "21:00".to_string(),
            units: 1,
            kind: "Wine".to_string(),
        });

        let row = Grid::default().layout(&entry);
        let find = |kind| row.markers.iter().find(|m| m.kind == kind).unwrap();
        assert_eq!(find(MarkerKind::Relaxation).time, "22:45");
        assert_eq!(find(MarkerKind::ScreenTime).time, "21:30");
        assert_eq!(find(MarkerKind::Alcohol).offset_min, 300);
    }

    #[test]
    fn diary_rows_are_newest_first() {
        let mut older = reference_night();
        older.id = "old".to_string();
        older.date = "2024-03-01".to_string();
        let rows = layout_diary(&[older, reference_night()], 16);
        assert_eq!(rows[0].id, "n1");
        assert_eq!(rows[1].id, "old");
    }
}
