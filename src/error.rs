//! Custom error types for the adhan-cut system

use thiserror::Error;

/// Main error type for the adhan-cut system
#[derive(Error, Debug)]
pub enum AdhanError {
    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Audio resolution and decoding errors
///
/// Every variant is a per-item condition: the batch runner records it as a
/// skip warning and continues with the remaining items.
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Audio file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to open file: {0}")]
    Open(String),

    #[error("Failed to probe container format: {0}")]
    Probe(String),

    #[error("No decodable audio track in file")]
    NoAudioTrack,

    #[error("Sample rate missing from stream parameters")]
    UnknownSampleRate,

    #[error("Failed to decode audio: {0}")]
    Decode(String),

    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),

    #[error("Signal contains no samples")]
    DegenerateSignal,
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid configuration value: {field} = {value}")]
    InvalidValue { field: String, value: String },
}

pub type Result<T> = std::result::Result<T, AdhanError>;
