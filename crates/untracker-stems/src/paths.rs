//! Output naming: `<out>/<composition>/<NNN>-<name>.<ext>`.

use std::path::{Path, PathBuf};
use untracker_core::{AudioFormat, BitDepth, SoundSource};
use untracker_export::WriterSpec;

/// Replacement for names that sanitize to nothing.
pub const UNNAMED_PLACEHOLDER: &str = "unnamed";

const RESERVED: [char; 10] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*', ' '];

/// Makes `name` safe as a single path component.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if RESERVED.contains(&c) { '_' } else { c })
        .collect();
    match cleaned.as_str() {
        "" => UNNAMED_PLACEHOLDER.to_string(),
        "." | ".." => "_".to_string(),
        _ => cleaned,
    }
}

/// Three-digit 1-based stem number.
///
/// Indices past 998 wrap because only the last three digits of the
/// four-digit form are kept (index 999 gives `000`).
pub fn stem_number(index: usize) -> String {
    let padded = format!("{:04}", index + 1);
    padded[padded.len() - 3..].to_string()
}

/// Composition name from an input path: last component, last extension removed.
pub fn composition_name(input: &str) -> String {
    let file = input.rsplit(['/', '\\']).next().unwrap_or(input);
    let stem = match file.rfind('.') {
        Some(dot) => &file[..dot],
        None => file,
    };
    sanitize_filename(stem)
}

/// `NNN-name.ext`, or `NNN.ext` when `name` is empty.
pub fn stem_file_name(index: usize, name: &str, format: AudioFormat) -> String {
    let number = stem_number(index);
    if name.is_empty() {
        format!("{}.{}", number, format.extension())
    } else {
        format!("{}-{}.{}", number, sanitize_filename(name), format.extension())
    }
}

/// Where and how one stem is written.
#[derive(Debug, Clone, PartialEq)]
pub struct StemOutputDescriptor {
    pub source: SoundSource,
    pub path: PathBuf,
    pub format: AudioFormat,
    pub sample_rate: u32,
    pub channels: u16,
    pub bit_depth: BitDepth,
}

impl StemOutputDescriptor {
    pub fn new(stem_dir: &Path, source: &SoundSource, spec: &WriterSpec) -> Self {
        let file = stem_file_name(source.index, &source.name, spec.format);
        Self {
            source: source.clone(),
            path: stem_dir.join(file),
            format: spec.format,
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            bit_depth: spec.bit_depth,
        }
    }

    /// Directory that must exist before the writer opens.
    pub fn directory(&self) -> Option<&Path> {
        self.path.parent()
    }
}
