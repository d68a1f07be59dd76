//! Writer options.

use crate::{ExportError, Result};
use untracker_core::{AudioFormat, BitDepth, ChannelLayout, RenderConfig};

/// Everything a writer needs to open an output file.
#[derive(Debug, Clone, PartialEq)]
pub struct WriterSpec {
    /// Output container/codec.
    pub format: AudioFormat,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Interleaved channel count.
    pub channels: u16,
    /// Bit depth (lossless formats only).
    pub bit_depth: BitDepth,
    /// Vorbis quality (0-10).
    pub vorbis_quality: u8,
    /// Opus bitrate in kbps.
    pub opus_bitrate_kbps: u32,
}

impl Default for WriterSpec {
    fn default() -> Self {
        Self {
            format: AudioFormat::Wav,
            sample_rate: 44_100,
            channels: 2,
            bit_depth: BitDepth::Int16,
            vorbis_quality: 5,
            opus_bitrate_kbps: 128,
        }
    }
}

impl WriterSpec {
    /// Derives the spec from a validated config and the layout actually rendered.
    pub fn from_config(config: &RenderConfig, layout: ChannelLayout) -> Result<Self> {
        let bit_depth = config
            .bit_depth()
            .map_err(|e| ExportError::InvalidOptions(e.to_string()))?;
        Ok(Self {
            format: config.format,
            sample_rate: config.sample_rate,
            channels: layout.channels() as u16,
            bit_depth,
            vorbis_quality: config.vorbis_quality,
            opus_bitrate_kbps: config.opus_bitrate_kbps,
        })
    }

    pub fn channel_count(&self) -> usize {
        self.channels as usize
    }
}

/// Clamp a float sample and scale it to the integer range of `bit_depth`.
#[inline]
pub(crate) fn quantize(sample: f32, bit_depth: BitDepth) -> i32 {
    let clamped = sample.clamp(-1.0, 1.0);
    (clamped * bit_depth.full_scale()) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_from_config() {
        let config = RenderConfig {
            format: AudioFormat::Flac,
            sample_rate: 48_000,
            channels: 4,
            bit_depth: 24,
            ..Default::default()
        };
        let spec = WriterSpec::from_config(&config, ChannelLayout::Mono).unwrap();
        assert_eq!(spec.format, AudioFormat::Flac);
        assert_eq!(spec.sample_rate, 48_000);
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.bit_depth, BitDepth::Int24);
    }

    #[test]
    fn test_spec_rejects_bad_bit_depth() {
        let config = RenderConfig {
            bit_depth: 12,
            ..Default::default()
        };
        assert!(WriterSpec::from_config(&config, ChannelLayout::Stereo).is_err());
    }

    #[test]
    fn test_quantize_clips() {
        assert_eq!(quantize(0.0, BitDepth::Int16), 0);
        assert_eq!(quantize(1.0, BitDepth::Int16), 32767);
        assert_eq!(quantize(-1.0, BitDepth::Int16), -32767);
        assert_eq!(quantize(1.5, BitDepth::Int16), 32767);
        assert_eq!(quantize(-1.5, BitDepth::Int24), -8388607);
        assert_eq!(quantize(0.5, BitDepth::Int24), 4194303);
    }
}
