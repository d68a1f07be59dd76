//! Soloable sound sources.

use std::fmt;

/// What kind of engine object a source index addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Instrument,
    Sample,
}

impl SourceKind {
    pub fn label(&self) -> &'static str {
        match self {
            SourceKind::Instrument => "instrument",
            SourceKind::Sample => "sample",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An independently mutable sound-generating unit of the composition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundSource {
    /// 0-based index as understood by the engine's mute interface.
    pub index: usize,
    /// Display name; never empty once enumerated.
    pub name: String,
    pub kind: SourceKind,
}

impl SoundSource {
    /// Creates a source, substituting `"{kind}_{index + 1}"` for an empty name.
    pub fn new(index: usize, name: impl Into<String>, kind: SourceKind) -> Self {
        let name = name.into();
        let name = if name.is_empty() {
            Self::synthetic_name(index, kind)
        } else {
            name
        };
        Self { index, name, kind }
    }

    pub fn synthetic_name(index: usize, kind: SourceKind) -> String {
        format!("{}_{}", kind.label(), index + 1)
    }
}

impl fmt::Display for SoundSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.kind, self.index, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_names_are_one_based() {
        let s = SoundSource::new(0, "", SourceKind::Sample);
        assert_eq!(s.name, "sample_1");

        let s = SoundSource::new(41, "", SourceKind::Instrument);
        assert_eq!(s.name, "instrument_42");
    }

    #[test]
    fn test_real_names_kept() {
        let s = SoundSource::new(2, "kick drum", SourceKind::Sample);
        assert_eq!(s.name, "kick drum");
        assert_eq!(s.to_string(), "sample 2: kick drum");
    }
}
