pub mod completions;
pub mod config;
pub mod data;
pub mod entry;
pub mod metrics;
pub mod srt;
pub mod stats;
pub mod timeline;

use sleeplog_core::{Config, DiaryDb, NightlyEntry};

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Every stored night, date ascending.
pub fn load_diary() -> Result<Vec<NightlyEntry>, Box<dyn std::error::Error>> {
    Ok(DiaryDb::open()?.list_entries()?)
}

/// The saved config, failing loudly on a broken file.
pub fn load_config() -> Result<Config, Box<dyn std::error::Error>> {
    Ok(Config::load()?)
}
