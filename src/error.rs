//! Error types for susurrus

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SusurrusError {
    #[error("failed to open audio resource `{path}`: {reason}")]
    ResourceOpen { path: String, reason: String },

    #[error("audio decode error: {0}")]
    Decode(String),

    #[error("audio device error: {0}")]
    Device(String),

    #[error("resampling error: {0}")]
    Resample(String),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("weighted draw over a pool with zero total weight")]
    EmptyPool,

    #[error("no playable file-backed sound with positive weight in the pool")]
    NoNonEmptyCandidate,

    #[error("soundscape `{0}` used after uninit")]
    UseAfterUninit(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SusurrusError>;
