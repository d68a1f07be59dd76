//! Render configuration.

use crate::{AudioFormat, BitDepth, ChannelLayout, Error, Interpolation, Result};
use std::ops::RangeInclusive;

pub const SAMPLE_RATE_RANGE: RangeInclusive<u32> = 8_000..=192_000;
pub const STEREO_SEPARATION_RANGE: RangeInclusive<u32> = 0..=200;
pub const VORBIS_QUALITY_RANGE: RangeInclusive<u8> = 0..=10;
pub const OPUS_BITRATE_RANGE: RangeInclusive<u32> = 16..=512;
pub const CHANNEL_COUNTS: [u16; 3] = [1, 2, 4];
pub const BIT_DEPTHS: [u16; 2] = [16, 24];

/// Configuration for one extraction run.
///
/// Built once from external configuration and never mutated after the run
/// starts. The only derived adjustment (mono when stereo separation is 0) is
/// exposed through [`RenderConfig::effective_layout`] rather than by mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Output sample rate in Hz.
    pub sample_rate: u32,
    /// Output channel count (1, 2 or 4).
    pub channels: u16,
    /// Engine interpolation for the final render.
    pub interpolation: Interpolation,
    /// Stereo separation in percent (0 forces mono).
    pub stereo_separation: u32,
    /// Output container/codec.
    pub format: AudioFormat,
    /// Bits per sample for lossless containers (16 or 24).
    pub bit_depth: u16,
    /// Vorbis quality level (0-10).
    pub vorbis_quality: u8,
    /// Opus bitrate in kbps (16-512).
    pub opus_bitrate_kbps: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            channels: 2,
            interpolation: Interpolation::Cubic,
            stereo_separation: 100,
            format: AudioFormat::Wav,
            bit_depth: 16,
            vorbis_quality: 5,
            opus_bitrate_kbps: 128,
        }
    }
}

impl RenderConfig {
    pub fn validate(&self) -> Result<()> {
        if !SAMPLE_RATE_RANGE.contains(&self.sample_rate) {
            return Err(Error::InvalidConfig(format!(
                "sample rate {} out of range ({}-{} Hz)",
                self.sample_rate,
                SAMPLE_RATE_RANGE.start(),
                SAMPLE_RATE_RANGE.end()
            )));
        }
        if !CHANNEL_COUNTS.contains(&self.channels) {
            return Err(Error::InvalidConfig(format!(
                "channel count {} not supported (1, 2 or 4)",
                self.channels
            )));
        }
        if !BIT_DEPTHS.contains(&self.bit_depth) {
            return Err(Error::InvalidConfig(format!(
                "bit depth {} not supported (16 or 24)",
                self.bit_depth
            )));
        }
        if !VORBIS_QUALITY_RANGE.contains(&self.vorbis_quality) {
            return Err(Error::InvalidConfig(format!(
                "vorbis quality {} out of range (0-10)",
                self.vorbis_quality
            )));
        }
        if !OPUS_BITRATE_RANGE.contains(&self.opus_bitrate_kbps) {
            return Err(Error::InvalidConfig(format!(
                "opus bitrate {} kbps out of range (16-512)",
                self.opus_bitrate_kbps
            )));
        }
        if !STEREO_SEPARATION_RANGE.contains(&self.stereo_separation) {
            return Err(Error::InvalidConfig(format!(
                "stereo separation {}% out of range (0-200)",
                self.stereo_separation
            )));
        }
        Ok(())
    }

    /// Channel layout for the configured channel count.
    pub fn channel_layout(&self) -> Result<ChannelLayout> {
        ChannelLayout::from_count(self.channels).ok_or_else(|| {
            Error::InvalidConfig(format!(
                "channel count {} not supported (1, 2 or 4)",
                self.channels
            ))
        })
    }

    /// Layout actually rendered: zero stereo separation forces mono.
    pub fn effective_layout(&self) -> Result<ChannelLayout> {
        if self.stereo_separation == 0 {
            return Ok(ChannelLayout::Mono);
        }
        self.channel_layout()
    }

    pub fn bit_depth(&self) -> Result<BitDepth> {
        BitDepth::from_bits(self.bit_depth).ok_or_else(|| {
            Error::InvalidConfig(format!(
                "bit depth {} not supported (16 or 24)",
                self.bit_depth
            ))
        })
    }
}
