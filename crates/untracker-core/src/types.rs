//! Output format and rendering vocabulary shared by every crate.

use std::fmt;
use std::str::FromStr;

/// Output container/codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AudioFormat {
    #[default]
    Wav,
    Flac,
    Vorbis,
    Opus,
}

impl AudioFormat {
    pub const ALL: [AudioFormat; 4] = [
        AudioFormat::Wav,
        AudioFormat::Flac,
        AudioFormat::Vorbis,
        AudioFormat::Opus,
    ];

    /// File extension (without dot).
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Wav => "wav",
            AudioFormat::Flac => "flac",
            AudioFormat::Vorbis => "ogg",
            AudioFormat::Opus => "opus",
        }
    }

    /// Name as accepted on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            AudioFormat::Wav => "wav",
            AudioFormat::Flac => "flac",
            AudioFormat::Vorbis => "vorbis",
            AudioFormat::Opus => "opus",
        }
    }

    /// Sample rate used when none was requested explicitly.
    ///
    /// Opus only encodes at a handful of rates and 48 kHz is its native one.
    pub fn default_sample_rate(&self) -> u32 {
        match self {
            AudioFormat::Opus => 48_000,
            _ => 44_100,
        }
    }

    /// Whether the bit depth setting applies (lossless PCM containers).
    pub fn is_lossless(&self) -> bool {
        matches!(self, AudioFormat::Wav | AudioFormat::Flac)
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AudioFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "wav" => Ok(AudioFormat::Wav),
            "flac" => Ok(AudioFormat::Flac),
            "vorbis" | "ogg" => Ok(AudioFormat::Vorbis),
            "opus" => Ok(AudioFormat::Opus),
            other => Err(format!("unknown format '{other}'")),
        }
    }
}

/// Integer PCM bit depth for lossless containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BitDepth {
    #[default]
    Int16,
    Int24,
}

impl BitDepth {
    /// Bits per sample.
    pub fn bits(&self) -> u16 {
        match self {
            BitDepth::Int16 => 16,
            BitDepth::Int24 => 24,
        }
    }

    pub fn from_bits(bits: u16) -> Option<Self> {
        match bits {
            16 => Some(BitDepth::Int16),
            24 => Some(BitDepth::Int24),
            _ => None,
        }
    }

    /// Largest positive integer sample value.
    #[inline]
    pub fn full_scale(&self) -> f32 {
        match self {
            BitDepth::Int16 => 32767.0,
            BitDepth::Int24 => 8388607.0,
        }
    }
}

/// Interleaved channel arity requested from the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelLayout {
    Mono,
    Stereo,
    /// Front left, front right, rear left, rear right.
    Quad,
}

impl ChannelLayout {
    pub fn channels(&self) -> usize {
        match self {
            ChannelLayout::Mono => 1,
            ChannelLayout::Stereo => 2,
            ChannelLayout::Quad => 4,
        }
    }

    pub fn from_count(count: u16) -> Option<Self> {
        match count {
            1 => Some(ChannelLayout::Mono),
            2 => Some(ChannelLayout::Stereo),
            4 => Some(ChannelLayout::Quad),
            _ => None,
        }
    }
}

/// Sample interpolation used by the engine when resampling sources.
///
/// Ordered from cheapest to most expensive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Interpolation {
    Nearest,
    Linear,
    #[default]
    Cubic,
    Sinc,
}

impl Interpolation {
    /// Cheapest setting, used for throwaway render passes.
    pub const CHEAPEST: Interpolation = Interpolation::Nearest;

    /// Interpolation filter length in taps.
    pub fn filter_length(&self) -> i32 {
        match self {
            Interpolation::Nearest => 1,
            Interpolation::Linear => 2,
            Interpolation::Cubic => 4,
            Interpolation::Sinc => 8,
        }
    }

    /// Maps a filter length back to the closest setting that is not longer.
    pub fn from_filter_length(taps: i32) -> Option<Self> {
        match taps {
            1 => Some(Interpolation::Nearest),
            2 | 3 => Some(Interpolation::Linear),
            4..=7 => Some(Interpolation::Cubic),
            t if t >= 8 => Some(Interpolation::Sinc),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Interpolation::Nearest => "nearest",
            Interpolation::Linear => "linear",
            Interpolation::Cubic => "cubic",
            Interpolation::Sinc => "sinc",
        }
    }
}

impl FromStr for Interpolation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nearest" => Ok(Interpolation::Nearest),
            "linear" => Ok(Interpolation::Linear),
            "cubic" => Ok(Interpolation::Cubic),
            "sinc" | "8tap" => Ok(Interpolation::Sinc),
            other => Err(format!("unknown resampling method '{other}'")),
        }
    }
}
