//! Core error types for sleeplog-core.
//!
//! The metrics engine itself never fails on bad numbers; errors only come
//! from the boundaries around it (entry acceptance, storage, configuration)
//! and from aggregations asked to run over an empty window.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for sleeplog-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Diary store errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Stored payload could not be decoded back into an entry
    #[error("Corrupt entry '{id}': {message}")]
    CorruptEntry { id: String, message: String },

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Clock string is not a valid `HH:MM`
    #[error("Invalid clock time '{0}', expected HH:MM")]
    InvalidClockTime(String),

    /// Date is not a valid `YYYY-MM-DD`
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    /// Lights out happens before getting into bed
    #[error("Lights out ({lights_out}) cannot happen before getting into bed ({time_in_bed})")]
    LightsOutBeforeBed {
        time_in_bed: String,
        lights_out: String,
    },

    /// Final wake happens before lights out
    #[error("Final wake ({final_wake}) must come after lights out ({lights_out})")]
    WakeBeforeLightsOut {
        lights_out: String,
        final_wake: String,
    },

    /// Getting out of bed happens before final wake
    #[error("Out of bed ({out_of_bed}) must come after final wake ({final_wake})")]
    OutOfBedBeforeWake {
        final_wake: String,
        out_of_bed: String,
    },

    /// Total time in bed exceeds a day
    #[error("Total time in bed of {minutes} minutes exceeds 24 hours")]
    TimeInBedTooLong { minutes: u32 },

    /// Awakening recorded outside the lights-out to final-wake interval
    #[error("Awakening at {time} lies outside the sleep period ({lights_out} to {final_wake})")]
    AwakeningOutsideSleep {
        time: String,
        lights_out: String,
        final_wake: String,
    },

    /// Empty collection
    #[error("No data: {0}")]
    EmptyCollection(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseLocked {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Storage(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
