//! Integration tests for the diary -> metrics -> SRT pipeline.

use chrono::NaiveDate;
use sleeplog_core::demo;
use sleeplog_core::{
    calculate_metrics, calculate_srt, layout_diary, summarize, validate_entry, Adjustment,
    Awakening, NightlyEntry, SeClass, ValidationError, Window,
};

/// 480 minutes in bed, 450 between lights out and final wake.
fn night(date: &str, sol: u32, waso: u32) -> NightlyEntry {
    let mut entry = NightlyEntry::new(date, date, "22:30", "22:30", "06:00", "06:30");
    entry.sol = sol;
    if waso > 0 {
        entry.awakenings.push(Awakening {
            time: "03:00".to_string(),
            duration: waso,
            ..Awakening::default()
        });
    }
    entry
}

fn week(sol: u32, waso: u32) -> Vec<NightlyEntry> {
    (1..=7)
        .map(|d| night(&format!("2024-04-{d:02}"), sol, waso))
        .collect()
}

#[test]
fn test_poor_week_restricts_window() {
    let entries = week(60, 90);
    for entry in &entries {
        validate_entry(entry).unwrap();
        assert_eq!(calculate_metrics(entry).tst, 300);
    }

    let rx = calculate_srt(&entries, Window::Days(7), "06:00", 45).unwrap();
    assert_eq!(rx.nights_analyzed, 7);
    assert_eq!(rx.avg_tst, 300.0);
    assert_eq!(rx.prescribed_tib, 300);
    assert_eq!(rx.prescribed_bed_time, "01:00");
    assert_eq!(rx.adjustment, Adjustment::Shorten { minutes: 15 });
    assert_eq!(rx.next_cycle_tib, 300);
    assert!(rx.floored_note.is_none());

    // Same diary, older patient: the higher floor applies.
    let rx = calculate_srt(&entries, Window::Days(7), "06:00", 70).unwrap();
    assert_eq!(rx.prescribed_tib, 330);
    assert_eq!(rx.prescribed_bed_time, "00:30");
    assert!(rx
        .recommendation_text
        .starts_with("Safety minimum applied (5h 30m)."));
}

#[test]
fn test_good_week_extends_window() {
    let rx = calculate_srt(&week(0, 0), Window::All, "06:30", 30).unwrap();
    assert_eq!(rx.avg_se, 93.75);
    assert_eq!(rx.prescribed_tib, 450);
    assert_eq!(rx.prescribed_bed_time, "23:00");
    assert_eq!(rx.adjustment, Adjustment::Lengthen { minutes: 15 });
    assert_eq!(rx.next_cycle_tib, 465);
}

#[test]
fn test_window_only_uses_latest_nights() {
    let mut entries = week(0, 0);
    entries.push(night("2024-03-01", 240, 0));

    let windowed = calculate_srt(&entries, Window::Days(7), "06:00", 30).unwrap();
    let all = calculate_srt(&entries, Window::All, "06:00", 30).unwrap();
    assert_eq!(windowed.avg_tst, 450.0);
    assert_eq!(all.nights_analyzed, 8);
    assert!(all.avg_tst < windowed.avg_tst);
}

#[test]
fn test_empty_diary_has_no_prescription_or_stats() {
    assert!(matches!(
        calculate_srt(&[], Window::default(), "06:00", 30),
        Err(ValidationError::EmptyCollection(_))
    ));
    assert!(matches!(
        summarize(&[], Window::default()),
        Err(ValidationError::EmptyCollection(_))
    ));
}

#[test]
fn test_demo_diary_flows_through_every_view() {
    let end = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();
    let entries = demo::generate(end, 14, 5);

    let rx = calculate_srt(&entries, Window::default(), "06:00", 30).unwrap();
    assert_eq!(rx.nights_analyzed, 14);
    assert!(rx.prescribed_tib >= 300);
    assert_eq!(rx.prescribed_tib % 15, 0);

    let summary = summarize(&entries, Window::Days(7)).unwrap();
    assert_eq!(summary.nights, 7);
    assert_eq!(summary.last_date, "2024-05-19");

    let rows = layout_diary(&entries, 16);
    assert_eq!(rows.len(), 14);
    assert_eq!(rows[0].date, "2024-05-19");
    assert!(rows.iter().all(|r| r.se_class == SeClass::from_se(r.se)));
}
