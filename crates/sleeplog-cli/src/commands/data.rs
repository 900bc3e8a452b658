//! Diary-wide data commands: export, import, reset and demo data.

use chrono::Local;
use clap::Subcommand;
use sleeplog_core::demo::{self, DEFAULT_DEMO_NIGHTS};
use sleeplog_core::DiaryDb;
use std::path::PathBuf;

use super::CmdResult;

/// Upper bound for `data demo --nights`, about ten years.
const MAX_DEMO_NIGHTS: i64 = 3650;

#[derive(Subcommand)]
pub enum DataAction {
    /// Write the diary as a JSON array
    Export {
        /// Output file (default: stdout)
        file: Option<PathBuf>,
    },
    /// Replace the diary with a JSON export
    Import {
        /// Exported JSON file
        file: PathBuf,
        /// Confirm replacing the current diary
        #[arg(long)]
        yes: bool,
    },
    /// Delete every diary entry
    Reset {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
    /// Replace the diary with generated demo nights
    Demo {
        /// Random seed; the same seed gives the same diary
        #[arg(long, default_value = "1")]
        seed: u64,
        /// Number of nights ending yesterday
        #[arg(long, default_value_t = DEFAULT_DEMO_NIGHTS, value_parser = clap::value_parser!(u32).range(1..=MAX_DEMO_NIGHTS))]
        nights: u32,
    },
}

pub fn run(action: DataAction) -> CmdResult {
    let mut db = DiaryDb::open()?;

    match action {
        DataAction::Export { file } => {
            let json = db.export_json()?;
            match file {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    println!("exported {} entries to {}", db.count()?, path.display());
                }
                None => println!("{json}"),
            }
        }
        DataAction::Import { file, yes } => {
            if !yes {
                return Err("refusing to replace the diary without --yes".into());
            }
            let json = std::fs::read_to_string(&file)?;
            let n = db.import_json(&json)?;
            println!("imported {n} entries");
        }
        DataAction::Reset { yes } => {
            if !yes {
                return Err("refusing to delete the diary without --yes".into());
            }
            let n = db.clear()?;
            println!("deleted {n} entries");
        }
        DataAction::Demo { seed, nights } => {
            let entries = demo::generate(Local::now().date_naive(), nights, seed);
            let n = db.replace_all(&entries)?;
            println!("loaded {n} demo entries");
        }
    }
    Ok(())
}
