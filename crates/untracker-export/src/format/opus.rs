//! Ogg Opus encoder using the opus and ogg crates
//!
//! Opus only runs at 8, 12, 16, 24 or 48 kHz with one or two channels.
//! Frames are encoded in 20 ms packets; a trailing partial packet is padded
//! with silence and the final granule position trims the padding.

use crate::error::{ExportError, Result};
use crate::options::WriterSpec;
use crate::writer::{whole_frames, AudioWriter};
use ogg::{PacketWriteEndInfo, PacketWriter};
use opus::{Application, Bitrate, Channels, Encoder};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Sample rates the Opus encoder accepts.
pub const OPUS_SAMPLE_RATES: [u32; 5] = [8_000, 12_000, 16_000, 24_000, 48_000];

const STREAM_SERIAL: u32 = 0x756e_7472;
const MAX_PACKET_BYTES: usize = 4000;

/// Streaming Ogg Opus writer.
pub struct OpusStemWriter {
    encoder: Encoder,
    packets: PacketWriter<'static, BufWriter<File>>,
    channels: usize,
    /// Samples per channel in one 20 ms packet.
    frame_size: usize,
    /// Granule positions are always counted at 48 kHz.
    granule_scale: u64,
    pre_skip: u64,
    pending: Vec<f32>,
    encoded_frames: u64,
    /// Held back so the last packet can carry the end-of-stream flag.
    last_packet: Option<Vec<u8>>,
    scratch: Vec<u8>,
}

impl OpusStemWriter {
    pub fn create(path: &Path, spec: &WriterSpec) -> Result<Self> {
        if !OPUS_SAMPLE_RATES.contains(&spec.sample_rate) {
            return Err(ExportError::UnsupportedFormat(format!(
                "Opus cannot encode at {} Hz",
                spec.sample_rate
            )));
        }
        let opus_channels = match spec.channels {
            1 => Channels::Mono,
            2 => Channels::Stereo,
            n => {
                return Err(ExportError::UnsupportedFormat(format!(
                    "Opus supports 1 or 2 channels, got {}",
                    n
                )))
            }
        };

        let mut encoder = Encoder::new(spec.sample_rate, opus_channels, Application::Audio)?;
        let bitrate = i32::try_from(spec.opus_bitrate_kbps.saturating_mul(1000))
            .map_err(|_| ExportError::InvalidOptions("Opus bitrate out of range".into()))?;
        encoder.set_bitrate(Bitrate::Bits(bitrate))?;

        let granule_scale = u64::from(48_000 / spec.sample_rate);
        let pre_skip = encoder.get_lookahead()?.max(0) as u64 * granule_scale;

        let file = BufWriter::new(File::create(path)?);
        let mut packets = PacketWriter::new(file);
        packets.write_packet(
            opus_head(spec.channels as u8, pre_skip as u16, spec.sample_rate),
            STREAM_SERIAL,
            PacketWriteEndInfo::EndPage,
            0,
        )?;
        packets.write_packet(
            opus_tags(),
            STREAM_SERIAL,
            PacketWriteEndInfo::EndPage,
            0,
        )?;

        Ok(Self {
            encoder,
            packets,
            channels: spec.channel_count(),
            frame_size: spec.sample_rate as usize / 50,
            granule_scale,
            pre_skip,
            pending: Vec::new(),
            encoded_frames: 0,
            last_packet: None,
            scratch: vec![0; MAX_PACKET_BYTES],
        })
    }

    fn granule(&self) -> u64 {
        self.pre_skip + self.encoded_frames * self.granule_scale
    }

    fn encode_packet(&mut self, samples: &[f32], frames: usize) -> Result<()> {
        let len = self.encoder.encode_float(samples, &mut self.scratch)?;
        if let Some(previous) = self.last_packet.take() {
            let granule = self.granule();
            self.packets.write_packet(
                previous,
                STREAM_SERIAL,
                PacketWriteEndInfo::NormalPacket,
                granule,
            )?;
        }
        self.encoded_frames += frames as u64;
        self.last_packet = Some(self.scratch[..len].to_vec());
        Ok(())
    }
}

impl AudioWriter for OpusStemWriter {
    fn write_frames(&mut self, interleaved: &[f32]) -> Result<usize> {
        let frames = whole_frames(interleaved, self.channels)?;
        self.pending.extend_from_slice(interleaved);

        let packet_len = self.frame_size * self.channels;
        while self.pending.len() >= packet_len {
            let packet: Vec<f32> = self.pending.drain(..packet_len).collect();
            self.encode_packet(&packet, self.frame_size)?;
        }
        Ok(frames)
    }

    fn finalize(self: Box<Self>) -> Result<()> {
        let mut this = *self;

        if !this.pending.is_empty() {
            let frames = this.pending.len() / this.channels;
            let mut packet = std::mem::take(&mut this.pending);
            packet.resize(this.frame_size * this.channels, 0.0);
            let len = this.encoder.encode_float(&packet, &mut this.scratch)?;
            if let Some(previous) = this.last_packet.take() {
                let granule = this.granule();
                this.packets.write_packet(
                    previous,
                    STREAM_SERIAL,
                    PacketWriteEndInfo::NormalPacket,
                    granule,
                )?;
            }
            this.encoded_frames += frames as u64;
            this.last_packet = Some(this.scratch[..len].to_vec());
        }

        let granule = this.granule();
        // An empty stream still needs an end-of-stream page.
        let last = this.last_packet.take().unwrap_or_default();
        this.packets
            .write_packet(last, STREAM_SERIAL, PacketWriteEndInfo::EndStream, granule)?;

        let mut file = this.packets.into_inner();
        file.flush()?;
        Ok(())
    }
}

/// Identification header (RFC 7845 section 5.1).
fn opus_head(channels: u8, pre_skip: u16, input_rate: u32) -> Vec<u8> {
    let mut head = Vec::with_capacity(19);
    head.extend_from_slice(b"OpusHead");
    head.push(1);
    head.push(channels);
    head.extend_from_slice(&pre_skip.to_le_bytes());
    head.extend_from_slice(&input_rate.to_le_bytes());
    head.extend_from_slice(&0i16.to_le_bytes());
    head.push(0);
    head
}

/// Comment header with a vendor string and no user comments.
fn opus_tags() -> Vec<u8> {
    let vendor = concat!("untracker ", env!("CARGO_PKG_VERSION"));
    let mut tags = Vec::with_capacity(16 + vendor.len());
    tags.extend_from_slice(b"OpusTags");
    tags.extend_from_slice(&(vendor.len() as u32).to_le_bytes());
    tags.extend_from_slice(vendor.as_bytes());
    tags.extend_from_slice(&0u32.to_le_bytes());
    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use untracker_core::AudioFormat;

    fn opus_spec() -> WriterSpec {
        WriterSpec {
            format: AudioFormat::Opus,
            sample_rate: 48_000,
            ..Default::default()
        }
    }

    #[test]
    fn test_opus_head_layout() {
        let head = opus_head(2, 312, 48_000);
        assert_eq!(head.len(), 19);
        assert_eq!(&head[0..8], b"OpusHead");
        assert_eq!(head[9], 2);
        assert_eq!(u16::from_le_bytes([head[10], head[11]]), 312);
        assert_eq!(
            u32::from_le_bytes([head[12], head[13], head[14], head[15]]),
            48_000
        );
    }

    #[test]
    fn test_opus_rejects_unsupported_rate() {
        let dir = tempfile::tempdir().unwrap();
        let spec = WriterSpec {
            sample_rate: 44_100,
            ..opus_spec()
        };
        let result = OpusStemWriter::create(&dir.path().join("x.opus"), &spec);
        assert!(matches!(result, Err(ExportError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_opus_rejects_quad() {
        let dir = tempfile::tempdir().unwrap();
        let spec = WriterSpec {
            channels: 4,
            ..opus_spec()
        };
        assert!(OpusStemWriter::create(&dir.path().join("x.opus"), &spec).is_err());
    }

    #[test]
    fn test_opus_writer_produces_ogg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stem.opus");

        let mut writer: Box<dyn AudioWriter> =
            Box::new(OpusStemWriter::create(&path, &opus_spec()).unwrap());
        // 2.5 packets worth of stereo audio
        let block: Vec<f32> = (0..4800).map(|i| ((i as f32) * 0.02).sin() * 0.3).collect();
        assert_eq!(writer.write_frames(&block).unwrap(), 2400);
        writer.finalize().unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[0..4], b"OggS");
        assert!(bytes.windows(8).any(|w| w == b"OpusHead"));
    }
}
