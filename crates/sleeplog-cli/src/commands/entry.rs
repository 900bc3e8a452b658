//! Diary entry commands for CLI.

use chrono::{Duration, Local};
use clap::{Args, Subcommand};
use serde::Serialize;
use sleeplog_core::storage::parse_entries_json;
use sleeplog_core::time::parse_clock_time;
use sleeplog_core::{
    calculate_metrics, validate_entry, Awakening, DerivedMetrics, DiaryDb, Nap, NightlyEntry,
    SeClass,
};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::CmdResult;

#[derive(Subcommand)]
pub enum EntryAction {
    /// Record a night
    Add(AddArgs),
    /// List recorded nights, oldest first
    List {
        /// Print the raw entries as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one night with its metrics
    Show {
        /// Entry ID
        id: String,
    },
    /// Delete a night
    Delete {
        /// Entry ID
        id: String,
    },
}

#[derive(Args)]
pub struct AddArgs {
    /// Read the entry from a JSON file instead of flags
    #[arg(long, value_name = "FILE", conflicts_with_all = ["in_bed", "lights_out", "wake", "out_of_bed"])]
    json: Option<PathBuf>,
    /// Night date, YYYY-MM-DD (default: yesterday)
    #[arg(long)]
    date: Option<String>,
    /// Got into bed, HH:MM
    #[arg(long, required_unless_present = "json")]
    in_bed: Option<String>,
    /// Lights out, HH:MM
    #[arg(long, required_unless_present = "json")]
    lights_out: Option<String>,
    /// Final awakening, HH:MM
    #[arg(long, required_unless_present = "json")]
    wake: Option<String>,
    /// Got out of bed, HH:MM
    #[arg(long, required_unless_present = "json")]
    out_of_bed: Option<String>,
    /// Minutes to fall asleep after lights out
    #[arg(long, default_value = "0")]
    sol: u32,
    /// Night awakening as HH:MM=MINUTES (repeatable)
    #[arg(long = "awakening", value_parser = parse_timed)]
    awakenings: Vec<(String, u32)>,
    /// Daytime nap as HH:MM=MINUTES (repeatable)
    #[arg(long = "nap", value_parser = parse_timed)]
    naps: Vec<(String, u32)>,
    /// Screen time before bed, minutes
    #[arg(long, default_value = "0")]
    screen_time: u32,
    /// Sleep quality, 1-5
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
    quality: Option<u8>,
    /// Energy level, 1-10
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=10))]
    energy: Option<u8>,
    /// Mood, 1-5
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
    mood: Option<u8>,
    /// Mark the next day as a day off
    #[arg(long)]
    day_off: bool,
    #[arg(long)]
    notes: Option<String>,
}

/// Parse `HH:MM=MINUTES`.
fn parse_timed(s: &str) -> Result<(String, u32), String> {
    let (time, minutes) = s
        .split_once('=')
        .ok_or_else(|| format!("expected HH:MM=MINUTES, got '{s}'"))?;
    parse_clock_time(time).map_err(|e| e.to_string())?;
    let minutes = minutes
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid minutes in '{s}'"))?;
    Ok((time.trim().to_string(), minutes))
}

fn entry_from_flags(args: AddArgs) -> NightlyEntry {
    let date = args.date.unwrap_or_else(|| {
        (Local::now().date_naive() - Duration::days(1))
            .format("%Y-%m-%d")
            .to_string()
    });
    let mut entry = NightlyEntry::new(
        Uuid::new_v4().to_string(),
        date,
        args.in_bed.unwrap_or_default(),
        args.lights_out.unwrap_or_default(),
        args.wake.unwrap_or_default(),
        args.out_of_bed.unwrap_or_default(),
    );
    entry.sol = args.sol;
    entry.awakenings = args
        .awakenings
        .into_iter()
        .map(|(time, duration)| Awakening {
            time,
            duration,
            ..Awakening::default()
        })
        .collect();
    entry.naps = args
        .naps
        .into_iter()
        .map(|(time, duration)| Nap {
            time,
            duration,
            intentional: false,
        })
        .collect();
    entry.screen_time = args.screen_time;
    entry.is_day_off = args.day_off;
    if let Some(q) = args.quality {
        entry.sleep_quality = q;
    }
    if let Some(e) = args.energy {
        entry.energy_level = e;
    }
    if let Some(m) = args.mood {
        entry.mood = m;
    }
    entry.notes = args.notes.unwrap_or_default();
    entry
}

fn entry_from_file(path: &Path) -> Result<NightlyEntry, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    // A single object, or a one-element export.
    let trimmed = content.trim_start();
    let mut entries = if trimmed.starts_with('[') {
        parse_entries_json(&content)?
    } else {
        parse_entries_json(&format!("[{content}]"))?
    };
    match entries.len() {
        1 => Ok(entries.remove(0)),
        n => Err(format!("expected one entry in {}, found {n}", path.display()).into()),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EntryWithMetrics<'a> {
    entry: &'a NightlyEntry,
    metrics: DerivedMetrics,
}

pub fn run(action: EntryAction) -> CmdResult {
    let db = DiaryDb::open()?;

    match action {
        EntryAction::Add(mut args) => {
            let entry = match args.json.take() {
                Some(path) => entry_from_file(&path)?,
                None => entry_from_flags(args),
            };
            validate_entry(&entry)?;
            db.upsert_entry(&entry)?;
            tracing::info!(id = %entry.id, date = %entry.date, "entry saved");

            let m = calculate_metrics(&entry);
            println!("entry saved: {}", entry.id);
            println!(
                "TIB {}  TST {}  SE {:.1}% ({})",
                m.tib_formatted,
                m.tst_formatted,
                m.se,
                SeClass::from_se(m.se)
            );
        }
        EntryAction::List { json } => {
            let entries = db.list_entries()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if entries.is_empty() {
                println!("no entries");
            } else {
                for entry in &entries {
                    let m = calculate_metrics(entry);
                    println!(
                        "{}  {}  TIB {}  TST {}  SE {:>5.1}%  {}",
                        entry.date,
                        entry.id,
                        m.tib_formatted,
                        m.tst_formatted,
                        m.se,
                        SeClass::from_se(m.se)
                    );
                }
            }
        }
        EntryAction::Show { id } => {
            let entry = db
                .get_entry(&id)?
                .ok_or_else(|| format!("entry not found: {id}"))?;
            let out = EntryWithMetrics {
                entry: &entry,
                metrics: calculate_metrics(&entry),
            };
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        EntryAction::Delete { id } => {
            if !db.delete_entry(&id)? {
                return Err(format!("entry not found: {id}").into());
            }
            println!("entry deleted: {id}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_timed_accepts_clock_and_minutes() {
        assert_eq!(parse_timed("02:30=20").unwrap(), ("02:30".to_string(), 20));
    }

    #[test]
    fn parse_timed_rejects_bad_input() {
        assert!(parse_timed("02:30").is_err());
        assert!(parse_timed("25:00=10").is_err());
        assert!(parse_timed("02:30=ten").is_err());
    }
}
