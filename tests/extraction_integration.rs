//! End-to-end extraction through the library API.
//!
//! Run with:
//! ```bash
//! cargo test -p untracker --test extraction_integration
//! ```

#![cfg(feature = "wav")]

#[path = "helpers/mod.rs"]
mod helpers;

use helpers::*;
use untracker::prelude::*;
use untracker::{Error, SourceKind};

fn extraction(input: &std::path::Path, out: &std::path::Path) -> ExtractionBuilder {
    Extraction::builder()
        .input(input)
        .output_dir(out)
        .sample_rate(TEST_SAMPLE_RATE)
}

#[test]
fn test_only_triggered_sample_gets_a_stem() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_module(dir.path(), "one voice.mod", &one_voice_module());
    let out = dir.path().join("stems");

    let report = extraction(&input, &out).run().expect("Extraction failed");

    // 31 sample slots, one of them played
    assert_eq!(report.sources(), 31);
    assert!(report
        .stems
        .iter()
        .all(|s| s.source.kind == SourceKind::Sample));
    assert_eq!(report.written().len(), 1);
    assert_eq!(report.silent().len(), 30);
    assert!(report.failed().is_empty());
    assert!(report.mutes.is_clean());

    let stem_dir = out.join("one_voice");
    assert_eq!(file_names(&stem_dir), vec!["001-lead.wav".to_string()]);

    let (spec, samples) = read_wav(&stem_dir.join("001-lead.wav"));
    assert_eq!(spec.sample_rate, TEST_SAMPLE_RATE);
    assert_eq!(spec.channels, 2);
    assert_eq!(spec.bits_per_sample, 16);
    assert!(peak(&samples) > 0.01);
}

#[test]
fn test_each_stem_holds_one_source() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_module(dir.path(), "duet.mod", &duet_module());

    let report = extraction(&input, dir.path()).run().expect("Extraction failed");
    assert_eq!(report.written().len(), 2);

    let stem_dir = dir.path().join("duet");
    assert_eq!(
        file_names(&stem_dir),
        vec!["001-left_hand.wav".to_string(), "002-right_hand.wav".to_string()]
    );

    // Channel 0 is hard left and channel 1 hard right in the Amiga layout
    let (_, left_hand) = read_wav(&stem_dir.join("001-left_hand.wav"));
    let left_peak = peak(&left_hand.iter().step_by(2).copied().collect::<Vec<_>>());
    let right_peak = peak(&left_hand.iter().skip(1).step_by(2).copied().collect::<Vec<_>>());
    assert!(left_peak > 0.01);
    assert_eq!(right_peak, 0.0);

    // The second voice enters at row 16, so its stem starts with silence
    let (_, right_hand) = read_wav(&stem_dir.join("002-right_hand.wav"));
    assert_eq!(peak(&right_hand[..2 * 1000]), 0.0);
    assert!(peak(&right_hand) > 0.01);
}

#[test]
fn test_zero_separation_writes_mono() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_module(dir.path(), "mono.mod", &one_voice_module());

    extraction(&input, dir.path())
        .stereo_separation(0)
        .run()
        .expect("Extraction failed");

    let (spec, samples) = read_wav(&dir.path().join("mono/001-lead.wav"));
    assert_eq!(spec.channels, 1);
    assert!(peak(&samples) > 0.0);
}

#[test]
fn test_quad_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_module(dir.path(), "quad.mod", &one_voice_module());

    extraction(&input, dir.path())
        .channels(4)
        .run()
        .expect("Extraction failed");

    let (spec, _) = read_wav(&dir.path().join("quad/001-lead.wav"));
    assert_eq!(spec.channels, 4);
}

#[test]
fn test_24_bit_wav() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_module(dir.path(), "deep.mod", &one_voice_module());

    extraction(&input, dir.path())
        .bit_depth(24)
        .run()
        .expect("Extraction failed");

    let reader = hound::WavReader::open(dir.path().join("deep/001-lead.wav")).unwrap();
    assert_eq!(reader.spec().bits_per_sample, 24);
}

#[cfg(feature = "flac")]
#[test]
fn test_flac_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_module(dir.path(), "lossless.mod", &one_voice_module());

    extraction(&input, dir.path())
        .format(AudioFormat::Flac)
        .run()
        .expect("Extraction failed");

    let bytes = std::fs::read(dir.path().join("lossless/001-lead.flac")).unwrap();
    assert_eq!(&bytes[..4], b"fLaC");
}

#[test]
fn test_garbage_input_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_module(dir.path(), "noise.mod", &[0x55; 64]);

    let err = extraction(&input, dir.path()).run().unwrap_err();
    assert!(matches!(
        err,
        Error::Core(untracker::core::Error::Load(_))
    ));
    assert!(!dir.path().join("noise").exists());
}

#[test]
fn test_invalid_config_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_module(dir.path(), "bad.mod", &one_voice_module());

    let err = extraction(&input, dir.path())
        .sample_rate(4_000)
        .run()
        .unwrap_err();
    assert!(err.to_string().contains("sample rate"));
    assert!(!dir.path().join("bad").exists());
}
