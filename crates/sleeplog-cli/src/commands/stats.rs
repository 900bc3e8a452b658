use clap::Args;
use sleeplog_core::{summarize, Window};

use super::{load_config, load_diary, CmdResult};

#[derive(Args)]
pub struct StatsArgs {
    /// Nights to average, or "all" (default: srt.window from config)
    #[arg(long)]
    days: Option<Window>,
}

pub fn run(args: StatsArgs) -> CmdResult {
    let window = match args.days {
        Some(window) => window,
        None => load_config()?.srt.window()?,
    };
    let summary = summarize(&load_diary()?, window)?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
