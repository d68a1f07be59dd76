//! Error types for untracker-core.

use thiserror::Error;

/// Error type for untracker-core operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Failed to load composition: {0}")]
    Load(String),

    #[error("Unsupported render parameter value: {param} = {value}")]
    InvalidRenderParam { param: &'static str, value: i32 },

    #[error("Sample names unavailable: {0}")]
    NamesUnavailable(String),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// A rejected per-source mute or unmute request.
///
/// Returned instead of raised so that callers decide whether the failure is
/// fatal. The extraction loop never treats it as fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot {} source {index}: {reason}", verb(.muted))]
pub struct MuteError {
    /// Source index the request targeted.
    pub index: usize,
    /// Requested state (`true` = mute).
    pub muted: bool,
    /// Engine-provided reason.
    pub reason: String,
}

fn verb(muted: &bool) -> &'static str {
    if *muted {
        "mute"
    } else {
        "unmute"
    }
}

impl MuteError {
    pub fn new(index: usize, muted: bool, reason: impl Into<String>) -> Self {
        Self {
            index,
            muted,
            reason: reason.into(),
        }
    }
}
