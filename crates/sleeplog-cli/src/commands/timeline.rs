use clap::Args;
use serde::Serialize;
use sleeplog_core::{layout_diary, Grid, TimelineRow};

use super::{load_config, load_diary, CmdResult};

#[derive(Args)]
pub struct TimelineArgs {
    /// Hour the grid starts at (default: grid.start_hour from config)
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..24))]
    start_hour: Option<u32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TimelineView {
    start_hour: u32,
    resolution_min: u32,
    hour_labels: Vec<String>,
    rows: Vec<TimelineRow>,
}

pub fn run(args: TimelineArgs) -> CmdResult {
    let config = load_config()?;
    let start_hour = args.start_hour.unwrap_or(config.grid.start_hour);

    let view = TimelineView {
        start_hour,
        resolution_min: config.grid.resolution_min,
        hour_labels: Grid::new(start_hour).hour_labels(),
        rows: layout_diary(&load_diary()?, start_hour),
    };
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}
