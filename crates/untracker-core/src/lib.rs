//! # untracker-core
//!
//! Shared vocabulary for the untracker stem extractor:
//!
//! - **[`RenderConfig`]** - Immutable per-run render settings and their validation
//! - **[`SynthesisSession`]** - The narrow interface to a module playback engine
//! - **[`SoundSource`]** - A soloable instrument or sample
//! - **[`AudioFormat`]**, **[`BitDepth`]**, **[`ChannelLayout`]**, **[`Interpolation`]**
//!
//! ## Feature Flags
//!
//! - `testing`: [`testing::ScriptedSession`], a deterministic in-memory session

pub mod config;
pub mod error;
mod session;
mod source;
mod types;

#[cfg(feature = "testing")]
pub mod testing;

pub use config::RenderConfig;
pub use error::{Error, MuteError, Result};
pub use session::{LoadSession, RenderParam, SynthesisSession};
pub use source::{SoundSource, SourceKind};
pub use types::{AudioFormat, BitDepth, ChannelLayout, Interpolation};
