//! Error types for ground track estimation

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackError {
    /// Catalog fetch or parse failure
    #[error("Catalog load failed: {0}")]
    Load(String),

    /// Out-of-range or unparsable 1-based catalog index
    #[error("Invalid selection '{input}': choose a number between 1 and {len}")]
    InvalidSelection { input: String, len: usize },

    /// Value outside the domain of a time/frame model
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The ephemeris engine could not produce a state
    #[error("Propagation failed for {object} at {epoch}: {reason}")]
    Propagation {
        object: String,
        epoch: String,
        reason: String,
    },

    #[error("Trajectory history is full ({capacity} samples)")]
    HistoryFull { capacity: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TrackError>;
