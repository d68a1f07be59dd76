//! # untracker-mod
//!
//! A ProTracker-family MOD player exposed as an untracker
//! [`SynthesisSession`](untracker_core::SynthesisSession).
//!
//! Each sample slot is one soloable source. Muting a slot silences every
//! note that plays it on any channel.
//!
//! ```ignore
//! use untracker_core::{ChannelLayout, LoadSession, SynthesisSession};
//! use untracker_mod::ModSession;
//!
//! let mut session = ModSession::load_file("song.mod")?;
//! session.set_source_mute(3, true)?;
//! let mut block = vec![0.0; 4096 * 2];
//! let frames = session.read_interleaved(44_100, ChannelLayout::Stereo, &mut block);
//! ```
//!
//! ## Feature Flags
//!
//! - `testing`: [`fixture::ModBuilder`] for assembling MOD files in memory

pub mod error;
pub mod format;
mod mixer;
mod player;
mod session;

#[cfg(any(test, feature = "testing"))]
pub mod fixture;

pub use error::{Error, Result};
pub use format::{Module, Sample};
pub use player::song_duration;
pub use session::ModSession;
