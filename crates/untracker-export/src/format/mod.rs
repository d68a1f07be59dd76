//! Per-format writer implementations.

#[cfg(feature = "wav")]
pub mod wav;

#[cfg(feature = "flac")]
pub mod flac;

#[cfg(feature = "vorbis")]
pub mod vorbis;

#[cfg(feature = "opus")]
pub mod opus;
