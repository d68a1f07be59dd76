//! Test helpers and fixtures for untracker integration tests
//!
//! Modules are synthesised with [`ModBuilder`] so no binary fixtures are
//! checked in.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use untracker_mod::fixture::ModBuilder;

/// Low rate keeps prescans of the many empty slots fast.
pub const TEST_SAMPLE_RATE: u32 = 8_000;

/// ProTracker period of C-2.
pub const PERIOD_C2: u16 = 428;

/// Square wave in signed 8-bit, as stored in a MOD.
pub fn square_wave(len: usize, level: i8) -> Vec<u8> {
    (0..len)
        .map(|i| {
            let v = if (i / 16) % 2 == 0 { level } else { -level };
            v as u8
        })
        .collect()
}

/// 4-channel module where only sample 1 ("lead") is ever triggered.
///
/// Sample 2 ("unused") has data but no note refers to it, so it must not
/// produce a stem.
pub fn one_voice_module() -> Vec<u8> {
    ModBuilder::new("one voice", 4)
        .looped_sample(0, "lead", square_wave(256, 100), 64, 0, 256)
        .sample(1, "unused", square_wave(256, 100), 64)
        .note(0, 0, 0, 1, PERIOD_C2)
        .build()
}

/// Like [`one_voice_module`] at speed 1, so the song lasts 1.28 s.
pub fn short_module() -> Vec<u8> {
    ModBuilder::new("short", 4)
        .looped_sample(0, "lead", square_wave(256, 100), 64, 0, 256)
        .note(0, 0, 0, 1, PERIOD_C2)
        .effect(0, 0, 1, 0xF, 1)
        .build()
}

/// Two audible samples in different channels.
pub fn duet_module() -> Vec<u8> {
    ModBuilder::new("duet", 4)
        .looped_sample(0, "left hand", square_wave(256, 80), 64, 0, 256)
        .looped_sample(1, "right hand", square_wave(128, 80), 64, 0, 128)
        .note(0, 0, 0, 1, PERIOD_C2)
        .note(0, 16, 1, 2, PERIOD_C2)
        .build()
}

/// Writes `bytes` to `dir/name` and returns the path.
pub fn write_module(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).expect("Failed to write module");
    path
}

/// Sorted file names inside `dir`.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("Failed to read output directory")
        .map(|e| e.expect("bad entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Reads a 16-bit WAV back as normalised samples.
pub fn read_wav(path: &Path) -> (hound::WavSpec, Vec<f32>) {
    let mut reader = hound::WavReader::open(path).expect("Failed to open WAV");
    let spec = reader.spec();
    let samples = reader
        .samples::<i16>()
        .map(|s| s.expect("bad sample") as f32 / 32768.0)
        .collect();
    (spec, samples)
}

/// Peak amplitude of a signal.
pub fn peak(samples: &[f32]) -> f32 {
    samples
        .iter()
        .map(|s| s.abs())
        .fold(0.0_f32, |a, b| a.max(b))
}
