//! Error types for untracker-mod

use thiserror::Error;

/// Module loading error.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    /// File ends before a required section.
    #[error("module truncated: {len} bytes, need at least {needed}")]
    Truncated { len: usize, needed: usize },

    /// Neither a tagged 31-sample module nor a plausible 15-sample one.
    #[error("unrecognised module format: {0}")]
    UnrecognisedFormat(String),

    /// Song length or order entries out of range.
    #[error("invalid order list: {0}")]
    InvalidOrders(String),
}

/// Result type for module loading
pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for untracker_core::Error {
    fn from(e: Error) -> Self {
        untracker_core::Error::Load(e.to_string())
    }
}
