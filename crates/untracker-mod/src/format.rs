//! ProTracker MOD loader.
//!
//! Handles the tagged 31-sample layout (`M.K.`, `FLT8`, `6CHN`, `16CH`, ...)
//! and falls back to the untagged 15-sample Soundtracker layout.

use crate::error::{Error, Result};

/// Rows in every MOD pattern.
pub const ROWS_PER_PATTERN: usize = 64;

/// Maximum order list entries.
pub const MAX_ORDERS: usize = 128;

const TITLE_LEN: usize = 20;
const SAMPLE_HEADER_LEN: usize = 30;
const SAMPLE_NAME_LEN: usize = 22;
const CELL_LEN: usize = 4;

/// One pattern cell, decoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cell {
    /// 1-based sample number, 0 when empty.
    pub sample: u8,
    /// Amiga period, 0 when no note.
    pub period: u16,
    pub effect: u8,
    pub param: u8,
}

impl Cell {
    pub fn decode(bytes: [u8; 4]) -> Self {
        Self {
            sample: (bytes[0] & 0xF0) | (bytes[2] >> 4),
            period: (u16::from(bytes[0] & 0x0F) << 8) | u16::from(bytes[1]),
            effect: bytes[2] & 0x0F,
            param: bytes[3],
        }
    }

    pub fn param_x(&self) -> u8 {
        self.param >> 4
    }

    pub fn param_y(&self) -> u8 {
        self.param & 0x0F
    }
}

/// 64 rows of cells, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    channels: usize,
    cells: Vec<Cell>,
}

impl Pattern {
    pub fn cell(&self, row: usize, channel: usize) -> Cell {
        self.cells
            .get(row * self.channels + channel)
            .copied()
            .unwrap_or_default()
    }

    pub fn row(&self, row: usize) -> &[Cell] {
        let start = row * self.channels;
        &self.cells[start..start + self.channels]
    }
}

/// Sample slot with its PCM converted to `f32`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sample {
    pub name: String,
    pub data: Vec<f32>,
    /// Fine tune in 1/8 semitones (-8..=7).
    pub finetune: i8,
    /// Default volume (0-64).
    pub volume: u8,
    pub loop_start: usize,
    pub loop_len: usize,
}

impl Sample {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_looped(&self) -> bool {
        self.loop_len > 2
    }

    pub fn loop_end(&self) -> usize {
        self.loop_start + self.loop_len
    }
}

/// A parsed module.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub title: String,
    pub channels: usize,
    pub samples: Vec<Sample>,
    /// Played part of the order list.
    pub orders: Vec<usize>,
    pub patterns: Vec<Pattern>,
}

/// Header layout variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Layout {
    samples: usize,
    channels: usize,
}

impl Layout {
    fn song_length_offset(&self) -> usize {
        TITLE_LEN + self.samples * SAMPLE_HEADER_LEN
    }

    fn orders_offset(&self) -> usize {
        self.song_length_offset() + 2
    }

    fn patterns_offset(&self) -> usize {
        // 31-sample modules carry a 4-byte tag after the order list
        let tag = if self.samples == 31 { 4 } else { 0 };
        self.orders_offset() + MAX_ORDERS + tag
    }
}

/// Channel count for a 31-sample format tag.
pub fn channels_from_tag(tag: &[u8]) -> Option<usize> {
    match tag {
        b"M.K." | b"M!K!" | b"M&K!" | b"FLT4" | b"4CHN" => Some(4),
        b"6CHN" => Some(6),
        b"8CHN" | b"FLT8" | b"CD81" | b"OKTA" => Some(8),
        [d, b'C', b'H', b'N'] if d.is_ascii_digit() && *d != b'0' => Some(usize::from(d - b'0')),
        [d1, d2, b'C', b'H'] if d1.is_ascii_digit() && d2.is_ascii_digit() => {
            let n = usize::from(d1 - b'0') * 10 + usize::from(d2 - b'0');
            (1..=32).contains(&n).then_some(n)
        }
        _ => None,
    }
}

fn detect_layout(data: &[u8]) -> Layout {
    data.get(1080..1084)
        .and_then(channels_from_tag)
        .map(|channels| Layout {
            samples: 31,
            channels,
        })
        .unwrap_or(Layout {
            samples: 15,
            channels: 4,
        })
}

fn read_name(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    bytes[..end]
        .iter()
        .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { ' ' })
        .collect::<String>()
        .trim_end()
        .to_string()
}

fn be_word(bytes: &[u8], offset: usize) -> usize {
    usize::from(u16::from_be_bytes([bytes[offset], bytes[offset + 1]]))
}

fn require(data: &[u8], needed: usize) -> Result<()> {
    if data.len() < needed {
        return Err(Error::Truncated {
            len: data.len(),
            needed,
        });
    }
    Ok(())
}

struct SampleHeader {
    name: String,
    length: usize,
    finetune: i8,
    volume: u8,
    loop_start: usize,
    loop_len: usize,
}

fn parse_sample_header(bytes: &[u8]) -> SampleHeader {
    let nibble = bytes[24] & 0x0F;
    SampleHeader {
        name: read_name(&bytes[..SAMPLE_NAME_LEN]),
        length: be_word(bytes, 22) * 2,
        finetune: if nibble > 7 { nibble as i8 - 16 } else { nibble as i8 },
        volume: bytes[25],
        loop_start: be_word(bytes, 26) * 2,
        loop_len: be_word(bytes, 28) * 2,
    }
}

impl Module {
    /// Parse a module from its raw bytes.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let layout = detect_layout(data);
        let header_len = layout.patterns_offset();
        require(data, header_len)?;

        let title = read_name(&data[..TITLE_LEN]);
        let headers: Vec<SampleHeader> = (0..layout.samples)
            .map(|i| {
                let start = TITLE_LEN + i * SAMPLE_HEADER_LEN;
                parse_sample_header(&data[start..start + SAMPLE_HEADER_LEN])
            })
            .collect();

        let song_length = usize::from(data[layout.song_length_offset()]);
        if song_length == 0 || song_length > MAX_ORDERS {
            return Err(Error::InvalidOrders(format!(
                "song length {} not in 1-{}",
                song_length, MAX_ORDERS
            )));
        }
        let order_table = &data[layout.orders_offset()..layout.orders_offset() + MAX_ORDERS];
        let orders: Vec<usize> = order_table[..song_length]
            .iter()
            .map(|&o| usize::from(o))
            .collect();

        if layout.samples == 15 {
            // No tag to go by; reject anything that does not look like a module
            if orders.iter().any(|&o| o >= 64) || headers.iter().any(|h| h.volume > 64) {
                return Err(Error::UnrecognisedFormat(
                    "no format tag and header is not a 15-sample module".into(),
                ));
            }
        }

        let pattern_len = ROWS_PER_PATTERN * layout.channels * CELL_LEN;
        let used = orders.iter().copied().max().unwrap_or(0) + 1;
        let declared = order_table.iter().map(|&o| usize::from(o)).max().unwrap_or(0) + 1;
        let available = (data.len() - header_len) / pattern_len;
        if available < used {
            return Err(Error::Truncated {
                len: data.len(),
                needed: header_len + used * pattern_len,
            });
        }
        let pattern_count = if declared <= available { declared } else { used };

        let patterns = (0..pattern_count)
            .map(|p| {
                let start = header_len + p * pattern_len;
                let cells = data[start..start + pattern_len]
                    .chunks_exact(CELL_LEN)
                    .map(|c| Cell::decode([c[0], c[1], c[2], c[3]]))
                    .collect();
                Pattern {
                    channels: layout.channels,
                    cells,
                }
            })
            .collect();

        let mut offset = header_len + pattern_count * pattern_len;
        let mut samples = Vec::with_capacity(layout.samples);
        for header in headers {
            let start = offset.min(data.len());
            let end = (offset + header.length).min(data.len());
            if end - start < header.length {
                tracing::debug!(
                    "sample '{}' truncated: {} of {} bytes",
                    header.name,
                    end - start,
                    header.length
                );
            }
            let pcm: Vec<f32> = data[start..end]
                .iter()
                .map(|&b| f32::from(b as i8) / 128.0)
                .collect();
            offset += header.length;

            let (loop_start, loop_len) = if header.loop_len > 2 && header.loop_start < pcm.len() {
                (
                    header.loop_start,
                    header.loop_len.min(pcm.len() - header.loop_start),
                )
            } else {
                (0, 0)
            };

            samples.push(Sample {
                name: header.name,
                data: pcm,
                finetune: header.finetune,
                volume: header.volume.min(64),
                loop_start,
                loop_len,
            });
        }

        tracing::debug!(
            "Loaded module '{}': {} channels, {} samples, {} orders, {} patterns",
            title,
            layout.channels,
            samples.len(),
            orders.len(),
            pattern_count
        );

        Ok(Self {
            title,
            channels: layout.channels,
            samples,
            orders,
            patterns,
        })
    }

    pub fn pattern_at_order(&self, order: usize) -> Option<&Pattern> {
        self.orders.get(order).and_then(|&p| self.patterns.get(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::ModBuilder;

    #[test]
    fn test_channel_tags() {
        assert_eq!(channels_from_tag(b"M.K."), Some(4));
        assert_eq!(channels_from_tag(b"FLT8"), Some(8));
        assert_eq!(channels_from_tag(b"6CHN"), Some(6));
        assert_eq!(channels_from_tag(b"2CHN"), Some(2));
        assert_eq!(channels_from_tag(b"12CH"), Some(12));
        assert_eq!(channels_from_tag(b"0CHN"), None);
        assert_eq!(channels_from_tag(b"99CH"), None);
        assert_eq!(channels_from_tag(b"XXXX"), None);
    }

    #[test]
    fn test_cell_decode() {
        // sample 0x12, period 0x1AC, effect C, param 0x20
        let cell = Cell::decode([0x11, 0xAC, 0x2C, 0x20]);
        assert_eq!(cell.sample, 0x12);
        assert_eq!(cell.period, 0x1AC);
        assert_eq!(cell.effect, 0xC);
        assert_eq!(cell.param, 0x20);
        assert_eq!(cell.param_x(), 2);
        assert_eq!(cell.param_y(), 0);
    }

    #[test]
    fn test_parse_tagged_module() {
        let bytes = ModBuilder::new("song", 4)
            .sample(0, "kick drum", vec![64; 100], 64)
            .sample(1, "unused", vec![10; 40], 32)
            .note(0, 0, 0, 1, 428)
            .build();

        let module = Module::parse(&bytes).unwrap();
        assert_eq!(module.title, "song");
        assert_eq!(module.channels, 4);
        assert_eq!(module.samples.len(), 31);
        assert_eq!(module.samples[0].name, "kick drum");
        assert_eq!(module.samples[0].len(), 100);
        assert_eq!(module.samples[0].volume, 64);
        assert_eq!(module.samples[1].name, "unused");
        assert!(module.samples[2].is_empty());
        assert_eq!(module.orders, vec![0]);
        assert_eq!(module.patterns.len(), 1);

        let cell = module.patterns[0].cell(0, 0);
        assert_eq!(cell.sample, 1);
        assert_eq!(cell.period, 428);
    }

    #[test]
    fn test_sample_data_scaling() {
        let bytes = ModBuilder::new("s", 4)
            .sample(0, "a", vec![0x40, 0xC0, 0x7F, 0x80], 64)
            .build();
        let module = Module::parse(&bytes).unwrap();
        assert_eq!(module.samples[0].data, vec![0.5, -0.5, 127.0 / 128.0, -1.0]);
    }

    #[test]
    fn test_truncated_sample_data_tolerated() {
        let mut bytes = ModBuilder::new("s", 4)
            .sample(0, "long", vec![1; 200], 64)
            .build();
        bytes.truncate(bytes.len() - 150);

        let module = Module::parse(&bytes).unwrap();
        assert_eq!(module.samples[0].len(), 50);
    }

    #[test]
    fn test_truncated_header_rejected() {
        assert!(matches!(
            Module::parse(&[0u8; 100]),
            Err(Error::Truncated { .. })
        ));
    }

    #[test]
    fn test_garbage_rejected() {
        let garbage = vec![0xFFu8; 2000];
        assert!(Module::parse(&garbage).is_err());
    }

    #[test]
    fn test_fifteen_sample_fallback() {
        let bytes = ModBuilder::soundtracker("old")
            .sample(0, "bass", vec![5; 64], 40)
            .note(0, 0, 1, 1, 214)
            .build();

        let module = Module::parse(&bytes).unwrap();
        assert_eq!(module.samples.len(), 15);
        assert_eq!(module.channels, 4);
        assert_eq!(module.samples[0].name, "bass");
        assert_eq!(module.patterns[0].cell(0, 1).period, 214);
    }

    #[test]
    fn test_loop_points_clamped() {
        let bytes = ModBuilder::new("s", 4)
            .looped_sample(0, "pad", vec![1; 100], 64, 40, 200)
            .build();
        let module = Module::parse(&bytes).unwrap();
        let sample = &module.samples[0];
        assert!(sample.is_looped());
        assert_eq!(sample.loop_start, 40);
        assert_eq!(sample.loop_end(), 100);
    }

    #[test]
    fn test_finetune_sign() {
        let bytes = ModBuilder::new("s", 4)
            .sample(0, "a", vec![1; 10], 64)
            .finetune(0, 0x0F)
            .build();
        let module = Module::parse(&bytes).unwrap();
        assert_eq!(module.samples[0].finetune, -1);
    }
}
