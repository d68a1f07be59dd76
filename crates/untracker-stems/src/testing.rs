//! Writer backend doubles for unit tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use untracker_core::AudioFormat;
use untracker_export::{AudioWriter, ExportError, Result, WriterBackend, WriterSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterMode {
    /// Accept every frame.
    Normal,
    /// Accept `n` blocks in full, then report one frame short.
    ShortAfter(usize),
    /// Accept `n` blocks, then fail with an I/O error.
    FailAfter(usize),
}

type FrameLog = Rc<RefCell<HashMap<PathBuf, u64>>>;

/// Creates real (empty-content) files and counts the frames sent to each.
#[derive(Debug)]
pub struct FakeBackend {
    mode: WriterMode,
    fail_open: Vec<String>,
    opened: RefCell<Vec<PathBuf>>,
    frames: FrameLog,
}

impl FakeBackend {
    pub fn new(mode: WriterMode) -> Self {
        Self {
            mode,
            fail_open: Vec::new(),
            opened: RefCell::new(Vec::new()),
            frames: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    /// Opening any path whose file name contains `needle` fails.
    pub fn failing_open(mut self, needle: &str) -> Self {
        self.fail_open.push(needle.to_string());
        self
    }

    pub fn opened(&self) -> Vec<PathBuf> {
        self.opened.borrow().clone()
    }

    pub fn frames_written(&self, path: &Path) -> u64 {
        self.frames.borrow().get(path).copied().unwrap_or(0)
    }
}

impl WriterBackend for FakeBackend {
    fn open(&self, path: &Path, spec: &WriterSpec) -> Result<Box<dyn AudioWriter>> {
        self.opened.borrow_mut().push(path.to_path_buf());
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if self.fail_open.iter().any(|n| name.contains(n.as_str())) {
            return Err(ExportError::InvalidOptions(format!("refusing to open {name}")));
        }
        let file = File::create(path)?;
        Ok(Box::new(FakeWriter {
            file,
            path: path.to_path_buf(),
            channels: usize::from(spec.channels.max(1)),
            mode: self.mode,
            blocks: 0,
            frames: Rc::clone(&self.frames),
        }))
    }

    fn supports(&self, _format: AudioFormat) -> bool {
        true
    }
}

struct FakeWriter {
    file: File,
    path: PathBuf,
    channels: usize,
    mode: WriterMode,
    blocks: usize,
    frames: FrameLog,
}

impl AudioWriter for FakeWriter {
    fn write_frames(&mut self, interleaved: &[f32]) -> Result<usize> {
        let frames = interleaved.len() / self.channels;
        let accepted = match self.mode {
            WriterMode::ShortAfter(n) if self.blocks >= n => frames.saturating_sub(1),
            WriterMode::FailAfter(n) if self.blocks >= n => {
                return Err(ExportError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "disk full",
                )))
            }
            _ => frames,
        };
        self.blocks += 1;
        self.file.write_all(&[0u8; 4])?;
        *self.frames.borrow_mut().entry(self.path.clone()).or_insert(0) += accepted as u64;
        Ok(accepted)
    }

    fn finalize(self: Box<Self>) -> Result<()> {
        let mut file = self.file;
        file.flush()?;
        Ok(())
    }
}
