//! Pattern sequencer and per-channel effect processing.
//!
//! The player advances one tick at a time. Each call to
//! [`Player::advance_tick`] processes the row (on its first tick) or the
//! running effects, after which the caller renders
//! [`Player::tick_seconds`] worth of audio from the channel state.

use crate::format::{Cell, Module, ROWS_PER_PATTERN};
use crate::mixer::Voice;
use std::collections::HashSet;

pub const DEFAULT_SPEED: u32 = 6;
pub const DEFAULT_TEMPO: u32 = 125;

const PERIOD_MIN: u16 = 113;
const PERIOD_MAX: u16 = 856;

/// First half of the ProTracker vibrato sine.
const SINE_TABLE: [u8; 32] = [
    0, 24, 49, 74, 97, 120, 141, 161, 180, 197, 212, 224, 235, 244, 250, 253, 255, 253, 250, 244,
    235, 224, 212, 197, 180, 161, 141, 120, 97, 74, 49, 24,
];

#[derive(Debug, Clone, Copy, Default)]
struct Oscillator {
    position: u8,
    speed: u8,
    depth: u8,
}

impl Oscillator {
    fn configure(&mut self, param: u8) {
        if param >> 4 != 0 {
            self.speed = param >> 4;
        }
        if param & 0x0F != 0 {
            self.depth = param & 0x0F;
        }
    }

    fn value(&self) -> i32 {
        let v = i32::from(SINE_TABLE[usize::from(self.position & 31)]);
        if self.position & 32 != 0 {
            -v
        } else {
            v
        }
    }

    fn step(&mut self) {
        self.position = (self.position + self.speed) & 63;
    }
}

/// Sequencer state of one pattern channel.
#[derive(Debug, Clone, Default)]
pub struct Channel {
    pub voice: Voice,
    /// 0-based sample slot selected by the last sample number.
    pub instrument: Option<usize>,
    pub finetune: i8,
    /// Base period, changed by slides.
    pub period: u16,
    /// Period heard this tick (arpeggio/vibrato applied).
    pub output_period: u16,
    pub volume: u8,
    /// Volume heard this tick (tremolo applied).
    pub output_volume: u8,
    porta_target: u16,
    porta_speed: u8,
    vibrato: Oscillator,
    tremolo: Oscillator,
    last_offset: u8,
    cell: Cell,
}

impl Channel {
    fn trigger(&mut self, period: u16, module: &Module) {
        self.period = period;
        self.vibrato.position = 0;
        self.tremolo.position = 0;

        let Some(slot) = self.instrument else {
            return;
        };
        let offset = if self.cell.effect == 0x9 {
            if self.cell.param != 0 {
                self.last_offset = self.cell.param;
            }
            usize::from(self.last_offset) * 256
        } else {
            0
        };
        self.voice.trigger(slot, &module.samples[slot], offset);
    }

    /// First tick of a row: new sample/note and tick-0 effects.
    fn start_row(&mut self, cell: Cell, module: &Module) {
        self.cell = cell;

        let number = usize::from(cell.sample);
        if number > 0 && number <= module.samples.len() {
            let sample = &module.samples[number - 1];
            self.instrument = Some(number - 1);
            self.volume = sample.volume;
            self.finetune = sample.finetune;
        }

        let delayed = cell.effect == 0xE && cell.param_x() == 0xD && cell.param_y() > 0;
        if cell.period != 0 && !delayed {
            if cell.effect == 0x3 || cell.effect == 0x5 {
                self.porta_target = cell.period;
            } else {
                self.trigger(cell.period, module);
            }
        }

        match cell.effect {
            0x3 if cell.param != 0 => self.porta_speed = cell.param,
            0x4 => self.vibrato.configure(cell.param),
            0x7 => self.tremolo.configure(cell.param),
            0xC => self.volume = cell.param.min(64),
            0xE => {
                let y = cell.param_y();
                match cell.param_x() {
                    0x1 if self.period != 0 => {
                        self.period = self.period.saturating_sub(u16::from(y)).max(PERIOD_MIN)
                    }
                    0x2 if self.period != 0 => {
                        self.period = (self.period + u16::from(y)).min(PERIOD_MAX)
                    }
                    0xA => self.volume = (self.volume + y).min(64),
                    0xB => self.volume = self.volume.saturating_sub(y),
                    0xC if y == 0 => self.volume = 0,
                    _ => {}
                }
            }
            _ => {}
        }

        self.output_period = self.period;
        self.output_volume = self.volume;
    }

    /// Running effects on ticks after the first.
    fn continue_row(&mut self, tick: u32, module: &Module) {
        let cell = self.cell;
        match cell.effect {
            0x1 if self.period != 0 => {
                self.period = self
                    .period
                    .saturating_sub(u16::from(cell.param))
                    .max(PERIOD_MIN)
            }
            0x2 if self.period != 0 => {
                self.period = (self.period + u16::from(cell.param)).min(PERIOD_MAX)
            }
            0x3 => self.tone_portamento(),
            0x5 => {
                self.tone_portamento();
                self.volume_slide(cell.param);
            }
            0x6 | 0xA => self.volume_slide(cell.param),
            0xE => {
                let y = u32::from(cell.param_y());
                match cell.param_x() {
                    0x9 if y != 0 && tick % y == 0 => self.voice.restart(),
                    0xC if tick == y => self.volume = 0,
                    0xD if tick == y && cell.period != 0 => self.trigger(cell.period, module),
                    _ => {}
                }
            }
            _ => {}
        }

        self.output_period = self.period;
        self.output_volume = self.volume;

        match cell.effect {
            0x0 if cell.param != 0 => {
                let semitones = match tick % 3 {
                    0 => 0,
                    1 => cell.param_x(),
                    _ => cell.param_y(),
                };
                if semitones != 0 && self.period != 0 {
                    let shifted = f64::from(self.period) / 2f64.powf(f64::from(semitones) / 12.0);
                    self.output_period = (shifted.round() as u16).max(1);
                }
            }
            0x4 | 0x6 => {
                let delta = self.vibrato.value() * i32::from(self.vibrato.depth) / 128;
                self.output_period = (i32::from(self.period) + delta).max(1) as u16;
                self.vibrato.step();
            }
            0x7 => {
                let delta = self.tremolo.value() * i32::from(self.tremolo.depth) / 64;
                self.output_volume = (i32::from(self.volume) + delta).clamp(0, 64) as u8;
                self.tremolo.step();
            }
            _ => {}
        }
    }

    fn tone_portamento(&mut self) {
        if self.period == 0 || self.porta_target == 0 {
            return;
        }
        let speed = u16::from(self.porta_speed);
        if self.period < self.porta_target {
            self.period = (self.period + speed).min(self.porta_target);
        } else if self.period > self.porta_target {
            self.period = self.period.saturating_sub(speed).max(self.porta_target);
        }
    }

    fn volume_slide(&mut self, param: u8) {
        let (up, down) = (param >> 4, param & 0x0F);
        if up != 0 {
            self.volume = (self.volume + up).min(64);
        } else {
            self.volume = self.volume.saturating_sub(down);
        }
    }
}

/// Song position and timing.
#[derive(Debug, Clone)]
pub struct Player {
    channels: Vec<Channel>,
    speed: u32,
    tempo: u32,
    order: usize,
    row: usize,
    tick: u32,
    /// Extra repeats of the current row (EEx).
    row_delay: u32,
    jump_order: Option<usize>,
    break_row: Option<usize>,
    /// Tempo in effect for the tick last processed.
    tick_tempo: u32,
    visited: HashSet<(usize, usize)>,
    ended: bool,
}

impl Player {
    pub fn new(channels: usize) -> Self {
        let mut visited = HashSet::new();
        visited.insert((0, 0));
        Self {
            channels: vec![Channel::default(); channels],
            speed: DEFAULT_SPEED,
            tempo: DEFAULT_TEMPO,
            order: 0,
            row: 0,
            tick: 0,
            row_delay: 0,
            jump_order: None,
            break_row: None,
            tick_tempo: DEFAULT_TEMPO,
            visited,
            ended: false,
        }
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn channels_mut(&mut self) -> &mut [Channel] {
        &mut self.channels
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Length of the tick last processed.
    pub fn tick_seconds(&self) -> f64 {
        2.5 / f64::from(self.tick_tempo)
    }

    /// Processes the next tick. Returns `false` once the song has ended.
    pub fn advance_tick(&mut self, module: &Module) -> bool {
        if self.ended {
            return false;
        }

        if self.tick == 0 {
            self.process_row(module);
            if self.ended {
                return false;
            }
        } else {
            let effect_tick = self.tick % self.speed;
            for channel in &mut self.channels {
                channel.continue_row(effect_tick, module);
            }
        }
        self.tick_tempo = self.tempo;

        self.tick += 1;
        if self.tick >= self.speed * (1 + self.row_delay) {
            self.tick = 0;
            self.next_row(module);
        }
        true
    }

    fn process_row(&mut self, module: &Module) {
        let Some(pattern) = module.pattern_at_order(self.order) else {
            self.ended = true;
            return;
        };

        self.row_delay = 0;
        self.jump_order = None;
        self.break_row = None;

        for (channel, &cell) in self.channels.iter_mut().zip(pattern.row(self.row)) {
            channel.start_row(cell, module);

            match cell.effect {
                0xB => self.jump_order = Some(usize::from(cell.param)),
                0xD => {
                    let row = usize::from(cell.param_x()) * 10 + usize::from(cell.param_y());
                    self.break_row = Some(if row < ROWS_PER_PATTERN { row } else { 0 });
                }
                0xF if cell.param == 0 => {}
                0xF if cell.param < 32 => self.speed = u32::from(cell.param),
                0xF => self.tempo = u32::from(cell.param),
                0xE if cell.param_x() == 0xE && self.row_delay == 0 => {
                    self.row_delay = u32::from(cell.param_y())
                }
                _ => {}
            }
        }
    }

    fn next_row(&mut self, module: &Module) {
        if self.jump_order.is_some() || self.break_row.is_some() {
            self.order = self.jump_order.unwrap_or(self.order + 1);
            self.row = self.break_row.unwrap_or(0);
        } else {
            self.row += 1;
            if self.row >= ROWS_PER_PATTERN {
                self.row = 0;
                self.order += 1;
            }
        }

        if self.order >= module.orders.len() {
            self.ended = true;
        } else if !self.visited.insert((self.order, self.row)) {
            tracing::debug!("song loops back to order {} row {}", self.order, self.row);
            self.ended = true;
        }
    }
}

/// Total song length in seconds, computed by running the sequencer without
/// mixing.
pub fn song_duration(module: &Module) -> f64 {
    let mut player = Player::new(module.channels);
    let mut seconds = 0.0;
    while player.advance_tick(module) {
        seconds += player.tick_seconds();
    }
    seconds
}
