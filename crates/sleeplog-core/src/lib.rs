//! # Sleeplog Core Library
//!
//! This library provides the core logic of a CBT-I (cognitive behavioural
//! therapy for insomnia) sleep diary. Everything the `sleeplog` CLI does is
//! implemented here; the CLI only parses arguments and prints results.
//!
//! ## Architecture
//!
//! - **Entries**: nightly diary records, with ingestion-time coercion of
//!   loosely typed and legacy JSON
//! - **Engine**: pure, synchronous functions over `&[NightlyEntry]` that derive
//!   TIB, SOL, WASO, TST and sleep efficiency, and the Sleep Restriction
//!   Therapy prescription
//! - **Storage**: SQLite diary storage and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`calculate_metrics`]: per-night metrics
//! - [`calculate_srt`]: sleep window prescription
//! - [`validate_entry`]: consistency checks at entry acceptance
//! - [`DiaryDb`]: diary persistence and JSON export/import
//! - [`Config`]: application configuration management

pub mod demo;
pub mod entry;
pub mod error;
pub mod metrics;
pub mod srt;
pub mod stats;
pub mod storage;
pub mod time;
pub mod timeline;
pub mod validation;

pub use entry::{
    AlcoholIntake, Awakening, CaffeineIntake, Medication, Nap, NightlyEntry, PhysicalActivity,
    Relaxation,
};
pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use metrics::{calculate_metrics, DerivedMetrics, SeClass};
pub use srt::{calculate_srt, Adjustment, SrtPrescription, Window};
pub use stats::{summarize, PeriodSummary};
pub use storage::{Config, DiaryDb};
pub use timeline::{layout_diary, Grid, TimelineRow};
pub use validation::validate_entry;
