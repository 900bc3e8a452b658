use clap::Args;
use serde::Serialize;
use sleeplog_core::{calculate_metrics, DerivedMetrics, DiaryDb, NightlyEntry};

use super::CmdResult;

#[derive(Args)]
pub struct MetricsArgs {
    /// Entry ID (default: every night)
    id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NightMetrics<'a> {
    id: &'a str,
    date: &'a str,
    #[serde(flatten)]
    metrics: DerivedMetrics,
}

fn night_metrics(entry: &NightlyEntry) -> NightMetrics<'_> {
    NightMetrics {
        id: &entry.id,
        date: &entry.date,
        metrics: calculate_metrics(entry),
    }
}

pub fn run(args: MetricsArgs) -> CmdResult {
    let db = DiaryDb::open()?;

    match args.id {
        Some(id) => {
            let entry = db
                .get_entry(&id)?
                .ok_or_else(|| format!("entry not found: {id}"))?;
            println!("{}", serde_json::to_string_pretty(&night_metrics(&entry))?);
        }
        None => {
            let entries = db.list_entries()?;
            let all: Vec<NightMetrics<'_>> = entries.iter().map(night_metrics).collect();
            println!("{}", serde_json::to_string_pretty(&all)?);
        }
    }
    Ok(())
}
