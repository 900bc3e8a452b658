use clap::Args;
use sleeplog_core::time::parse_clock_time;
use sleeplog_core::{calculate_srt, Window};

use super::{load_config, load_diary, CmdResult};

#[derive(Args)]
pub struct SrtArgs {
    /// Nights to average, or "all" (default: srt.window from config)
    #[arg(long)]
    days: Option<Window>,
    /// Fixed wake time, HH:MM (default: srt.fixed_wake_time from config)
    #[arg(long)]
    wake: Option<String>,
    /// Patient age in years (default: patient.age from config)
    #[arg(long)]
    age: Option<u32>,
    /// Print only the recommendation text
    #[arg(long)]
    text: bool,
}

pub fn run(args: SrtArgs) -> CmdResult {
    let config = load_config()?;
    let window = match args.days {
        Some(window) => window,
        None => config.srt.window()?,
    };
    let wake = args.wake.unwrap_or(config.srt.fixed_wake_time);
    parse_clock_time(&wake)?;
    let age = args.age.unwrap_or(config.patient.age);

    let rx = calculate_srt(&load_diary()?, window, &wake, age)?;
    if args.text {
        println!(
            "Bed {} / wake {} ({} in bed). {}",
            rx.prescribed_bed_time,
            rx.fixed_wake_time,
            sleeplog_core::time::format_duration(f64::from(rx.prescribed_tib)),
            rx.recommendation_text
        );
    } else {
        println!("{}", serde_json::to_string_pretty(&rx)?);
    }
    Ok(())
}
