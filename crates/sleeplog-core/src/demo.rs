//! Seeded demo diary.
//!
//! Produces a plausible two weeks of insomnia nights (late, variable sleep
//! onset, a few awakenings) with one good night a week before the end, for
//! trying the tool without typing a diary in.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::{Rng, SeedableRng};
use rand_pcg::Mcg128Xsl64;

use crate::entry::{Awakening, CaffeineIntake, Nap, NightlyEntry, PhysicalActivity, Relaxation};
use crate::time::minutes_to_time_str;

/// Nights generated when the caller does not choose.
pub const DEFAULT_DEMO_NIGHTS: u32 = 14;
/// Nights before the end date that gets the good night.
const GOOD_NIGHT_OFFSET: u32 = 7;

fn clock(hour: u32, minute: u32) -> String {
    minutes_to_time_str(i64::from(hour * 60 + minute))
}

/// Generate `nights` entries for the nights before `end_date`, oldest first.
///
/// The same `seed` always yields the same diary. Every generated night
/// passes [`validate_entry`](crate::validation::validate_entry).
pub fn generate(end_date: NaiveDate, nights: u32, seed: u64) -> Vec<NightlyEntry> {
    let mut rng = Mcg128Xsl64::seed_from_u64(seed);
    let mut entries = Vec::with_capacity(nights as usize);

    for i in (1..=nights).rev() {
        let date = end_date - Duration::days(i64::from(i));
        let good = i == GOOD_NIGHT_OFFSET;

        let bed_hour = if good { 23 } else { rng.gen_range(22..=23) };
        let bed_minute = if good { 0 } else { [0, 15, 30, 45][rng.gen_range(0..4)] };
        let sol = if good { 15 } else { 30 + rng.gen_range(0..4) * 15 };
        let lights_out_delay = if rng.gen_bool(0.5) { 0 } else { 15 };

        let wake_minute = [0, 15, 30][rng.gen_range(0..3)];
        let out_of_bed_minute = (wake_minute + 15).min(59);

        let awakening_count = if good { 0 } else { rng.gen_range(1..=3) };
        let awakenings = (0..awakening_count)
            .map(|j| Awakening {
                time: clock((bed_hour + 2 + j) % 24, 0),
                duration: 10 + rng.gen_range(0..4) * 5,
                got_out_of_bed: rng.gen_bool(0.5),
                activity: if rng.gen_bool(0.5) {
                    "Reading".to_string()
                } else {
                    String::new()
                },
            })
            .collect();

        let naps = if !good && rng.gen_bool(0.3) {
            vec![Nap {
                time: "14:30".to_string(),
                duration: 30,
                intentional: false,
            }]
        } else {
            Vec::new()
        };

        let caffeine = (0..rng.gen_range(1..=3))
            .map(|j| CaffeineIntake {
                time: clock(8 + j * 4, 0),
                kind: "Coffee".to_string(),
            })
            .collect();

        let physical_activity = if rng.gen_bool(0.4) {
            vec![PhysicalActivity {
                time: "17:00".to_string(),
                duration: 45,
                kind: "Walk".to_string(),
            }]
        } else {
            Vec::new()
        };

        let date_str = date.format("%Y-%m-%d").to_string();
        let mut entry = NightlyEntry::new(
            format!("demo-{date_str}"),
            date_str,
            clock(bed_hour, bed_minute),
            clock(bed_hour, bed_minute + lights_out_delay),
            clock(6, wake_minute),
            clock(6, out_of_bed_minute),
        );
        entry.is_day_off = matches!(date.weekday(), Weekday::Sat | Weekday::Sun);
        entry.sol = sol;
        entry.awakenings = awakenings;
        entry.naps = naps;
        entry.caffeine = caffeine;
        entry.physical_activity = physical_activity;
        entry.screen_time = if good { 30 } else { 90 + rng.gen_range(0..60) };
        entry.relaxation = Relaxation {
            used: good,
            duration: if good { 20 } else { 0 },
        };
        entry.sleep_quality = if good {
            4
        } else if rng.gen_bool(0.5) {
            2
        } else {
            3
        };
        entry.energy_level = if good { 8 } else { 2 + rng.gen_range(0..4) };
        entry.mood = if good { 4 } else { 3 };
        entry.notes = if good {
            "Slept really well, feeling rested.".to_string()
        } else {
            "Rough night, racing thoughts.".to_string()
        };

        entries.push(entry);
    }

    tracing::debug!(nights, seed, "generated demo diary");
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate_entry;

    fn end() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    #[test]
    fn generates_requested_nights_oldest_first() {
        let entries = generate(end(), DEFAULT_DEMO_NIGHTS, 7);
        assert_eq!(entries.len(), 14);
        assert_eq!(entries[0].date, "2024-03-01");
        assert_eq!(entries[13].date, "2024-03-14");
    }

    #[test]
    fn every_night_is_valid() {
        for seed in 0..20 {
            for entry in generate(end(), DEFAULT_DEMO_NIGHTS, seed) {
                assert_eq!(validate_entry(&entry), Ok(()), "seed {seed}, night {}", entry.date);
            }
        }
    }

    #[test]
    fn same_seed_same_diary() {
        assert_eq!(generate(end(), 14, 42), generate(end(), 14, 42));
    }

    #[test]
    fn good_night_a_week_before_end() {
        let entries = generate(end(), 14, 1);
        let good = entries.iter().find(|e| e.date == "2024-03-08").unwrap();
        assert_eq!(good.sol, 15);
        assert!(good.awakenings.is_empty());
        assert_eq!(good.time_in_bed, "23:00");
        assert_eq!(good.sleep_quality, 4);
        assert!(good.relaxation.used);
    }

    #[test]
    fn weekends_are_days_off() {
        let entries = generate(end(), 14, 3);
        // 2024-03-02 was a Saturday
        let saturday = entries.iter().find(|e| e.date == "2024-03-02").unwrap();
        assert!(saturday.is_day_off);
        let monday = entries.iter().find(|e| e.date == "2024-03-04").unwrap();
        assert!(!monday.is_day_off);
    }
}
