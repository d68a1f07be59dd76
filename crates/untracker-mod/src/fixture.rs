//! In-memory MOD file builder for tests.
//!
//! ```ignore
//! let bytes = ModBuilder::new("demo", 4)
//!     .sample(0, "kick", vec![100; 64], 64)
//!     .note(0, 0, 0, 1, 428)
//!     .build();
//! ```

use crate::format::{MAX_ORDERS, ROWS_PER_PATTERN};

#[derive(Debug, Clone, Default)]
struct SlotSpec {
    name: String,
    data: Vec<u8>,
    volume: u8,
    finetune: u8,
    loop_start: usize,
    loop_len: usize,
}

#[derive(Debug, Clone, Copy, Default)]
struct CellSpec {
    sample: u8,
    period: u16,
    effect: u8,
    param: u8,
}

/// Builds the bytes of a MOD file.
#[derive(Debug, Clone)]
pub struct ModBuilder {
    title: String,
    channels: usize,
    slots: Vec<SlotSpec>,
    orders: Vec<u8>,
    /// Cells keyed by (pattern, row, channel).
    cells: Vec<((usize, usize, usize), CellSpec)>,
}

impl ModBuilder {
    /// Tagged 31-sample module.
    pub fn new(title: &str, channels: usize) -> Self {
        Self {
            title: title.to_string(),
            channels,
            slots: vec![SlotSpec::default(); 31],
            orders: vec![0],
            cells: Vec::new(),
        }
    }

    /// Untagged 15-sample module.
    pub fn soundtracker(title: &str) -> Self {
        Self {
            slots: vec![SlotSpec::default(); 15],
            ..Self::new(title, 4)
        }
    }

    /// Sets a one-shot sample. `data` is signed 8-bit PCM and should have an
    /// even length.
    pub fn sample(mut self, slot: usize, name: &str, data: Vec<u8>, volume: u8) -> Self {
        self.slots[slot] = SlotSpec {
            name: name.to_string(),
            data,
            volume,
            ..Default::default()
        };
        self
    }

    /// Sets a looped sample. Loop points are in bytes.
    pub fn looped_sample(
        mut self,
        slot: usize,
        name: &str,
        data: Vec<u8>,
        volume: u8,
        loop_start: usize,
        loop_len: usize,
    ) -> Self {
        self.slots[slot] = SlotSpec {
            name: name.to_string(),
            data,
            volume,
            finetune: 0,
            loop_start,
            loop_len,
        };
        self
    }

    pub fn finetune(mut self, slot: usize, nibble: u8) -> Self {
        self.slots[slot].finetune = nibble & 0x0F;
        self
    }

    pub fn orders(mut self, orders: &[u8]) -> Self {
        self.orders = orders.to_vec();
        self
    }

    /// Places a note (1-based `sample`, 0 for none) without effect.
    pub fn note(self, pattern: usize, row: usize, channel: usize, sample: u8, period: u16) -> Self {
        self.cell(pattern, row, channel, sample, period, 0, 0)
    }

    /// Places an effect, keeping any note already in the cell.
    pub fn effect(mut self, pattern: usize, row: usize, channel: usize, effect: u8, param: u8) -> Self {
        let key = (pattern, row, channel);
        match self.cells.iter_mut().find(|(k, _)| *k == key) {
            Some((_, cell)) => {
                cell.effect = effect;
                cell.param = param;
            }
            None => self.cells.push((
                key,
                CellSpec {
                    effect,
                    param,
                    ..Default::default()
                },
            )),
        }
        self
    }

    #[allow(clippy::too_many_arguments)]
    pub fn cell(
        mut self,
        pattern: usize,
        row: usize,
        channel: usize,
        sample: u8,
        period: u16,
        effect: u8,
        param: u8,
    ) -> Self {
        let key = (pattern, row, channel);
        self.cells.retain(|(k, _)| *k != key);
        self.cells.push((
            key,
            CellSpec {
                sample,
                period,
                effect,
                param,
            },
        ));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();

        let mut title = self.title.as_bytes().to_vec();
        title.resize(20, 0);
        out.extend_from_slice(&title);

        for slot in &self.slots {
            let mut name = slot.name.as_bytes().to_vec();
            name.resize(22, 0);
            out.extend_from_slice(&name);
            out.extend_from_slice(&((slot.data.len() / 2) as u16).to_be_bytes());
            out.push(slot.finetune);
            out.push(slot.volume);
            out.extend_from_slice(&((slot.loop_start / 2) as u16).to_be_bytes());
            let loop_words = if slot.loop_len > 2 { slot.loop_len / 2 } else { 1 };
            out.extend_from_slice(&(loop_words as u16).to_be_bytes());
        }

        out.push(self.orders.len() as u8);
        out.push(127);
        let mut orders = self.orders.clone();
        orders.resize(MAX_ORDERS, 0);
        out.extend_from_slice(&orders);

        if self.slots.len() == 31 {
            let tag = match self.channels {
                4 => "M.K.".to_string(),
                n if n < 10 => format!("{n}CHN"),
                n => format!("{n}CH"),
            };
            out.extend_from_slice(tag.as_bytes());
        }

        let pattern_count = self.orders.iter().map(|&o| usize::from(o)).max().unwrap_or(0) + 1;
        let mut patterns = vec![[0u8; 4]; pattern_count * ROWS_PER_PATTERN * self.channels];
        for ((pattern, row, channel), cell) in &self.cells {
            if *pattern >= pattern_count {
                continue;
            }
            let idx = (pattern * ROWS_PER_PATTERN + row) * self.channels + channel;
            patterns[idx] = [
                (cell.sample & 0xF0) | ((cell.period >> 8) as u8 & 0x0F),
                (cell.period & 0xFF) as u8,
                ((cell.sample & 0x0F) << 4) | (cell.effect & 0x0F),
                cell.param,
            ];
        }
        for cell in patterns {
            out.extend_from_slice(&cell);
        }

        for slot in &self.slots {
            out.extend_from_slice(&slot.data);
        }
        out
    }
}
