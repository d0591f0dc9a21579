use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotePilotError {
    #[error("Configuration could not be parsed: {reason}")]
    ConfigParse { reason: String },

    #[error("Configuration file {path} could not be read: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Highlight payload could not be parsed: {reason}")]
    PayloadParse { reason: String },

    #[error("Highlight payload is missing required field `{field}`")]
    MissingField { field: &'static str },

    #[error("Invalid time {time}: must be a finite, non-negative number of seconds")]
    InvalidTime { time: f64 },

    #[error("Export filename {filename:?} is not a plain file name")]
    InvalidFilename { filename: String },

    #[error("Unknown video: {id}")]
    UnknownVideo { id: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, NotePilotError>;
