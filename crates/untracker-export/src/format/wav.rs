//! WAV format encoder using hound
//!
//! Streams 16-bit or 24-bit integer PCM as frames arrive.

use crate::error::Result;
use crate::options::{quantize, WriterSpec};
use crate::writer::{whole_frames, AudioWriter};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;
use untracker_core::BitDepth;

/// Streaming WAV writer.
pub struct WavStemWriter<W: Write + Seek = BufWriter<File>> {
    writer: WavWriter<W>,
    channels: usize,
    bit_depth: BitDepth,
}

impl WavStemWriter<BufWriter<File>> {
    /// Create the file at `path` and write the header.
    pub fn create(path: &Path, spec: &WriterSpec) -> Result<Self> {
        let writer = WavWriter::create(path, wav_spec(spec))?;
        Ok(Self {
            writer,
            channels: spec.channel_count(),
            bit_depth: spec.bit_depth,
        })
    }
}

impl<W: Write + Seek> WavStemWriter<W> {
    /// Write into an arbitrary seekable sink (used for in-memory encoding).
    pub fn new(sink: W, spec: &WriterSpec) -> Result<Self> {
        let writer = WavWriter::new(sink, wav_spec(spec))?;
        Ok(Self {
            writer,
            channels: spec.channel_count(),
            bit_depth: spec.bit_depth,
        })
    }
}

impl<W: Write + Seek> AudioWriter for WavStemWriter<W> {
    fn write_frames(&mut self, interleaved: &[f32]) -> Result<usize> {
        let frames = whole_frames(interleaved, self.channels)?;
        match self.bit_depth {
            BitDepth::Int16 => {
                for &sample in interleaved {
                    self.writer
                        .write_sample(quantize(sample, BitDepth::Int16) as i16)?;
                }
            }
            BitDepth::Int24 => {
                for &sample in interleaved {
                    self.writer.write_sample(quantize(sample, BitDepth::Int24))?;
                }
            }
        }
        Ok(frames)
    }

    fn finalize(self: Box<Self>) -> Result<()> {
        self.writer.finalize()?;
        Ok(())
    }
}

/// Create hound WavSpec from our spec
fn wav_spec(spec: &WriterSpec) -> WavSpec {
    WavSpec {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: spec.bit_depth.bits(),
        sample_format: SampleFormat::Int,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn stereo16() -> WriterSpec {
        WriterSpec::default()
    }

    #[test]
    fn test_wav_header_in_memory() {
        let mut bytes = Vec::new();
        {
            let mut writer =
                Box::new(WavStemWriter::new(Cursor::new(&mut bytes), &stereo16()).unwrap());
            assert_eq!(writer.write_frames(&[0.0, 0.5, -0.5, 0.25]).unwrap(), 2);
            writer.finalize().unwrap();
        }

        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
        // 44-byte header + 2 frames * 2 channels * 2 bytes
        assert_eq!(bytes.len(), 44 + 8);
    }

    #[test]
    fn test_wav_rejects_partial_frames() {
        let mut bytes = Vec::new();
        let mut writer = WavStemWriter::new(Cursor::new(&mut bytes), &stereo16()).unwrap();
        assert!(writer.write_frames(&[0.0, 0.5, 0.1]).is_err());
    }

    #[test]
    fn test_wav_file_roundtrip_24bit_quad() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quad.wav");
        let spec = WriterSpec {
            channels: 4,
            bit_depth: BitDepth::Int24,
            sample_rate: 48_000,
            ..Default::default()
        };

        let mut writer: Box<dyn AudioWriter> = Box::new(WavStemWriter::create(&path, &spec).unwrap());
        writer.write_frames(&[1.0, -1.0, 0.5, 2.0]).unwrap();
        writer.finalize().unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().channels, 4);
        assert_eq!(reader.spec().bits_per_sample, 24);
        assert_eq!(reader.spec().sample_rate, 48_000);
        let samples: Vec<i32> = reader.samples::<i32>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![8388607, -8388607, 4194303, 8388607]);
    }
}
