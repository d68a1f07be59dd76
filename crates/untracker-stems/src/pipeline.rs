//! Render-and-write pipeline for one soloed source.

use crate::error::StemError;
use crate::paths::StemOutputDescriptor;
use std::path::Path;
use untracker_core::{ChannelLayout, SynthesisSession};
use untracker_export::{AudioWriter, WriterBackend, WriterSpec};

/// Frames rendered per block.
pub const BLOCK_FRAMES: usize = 4096;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub frames: u64,
    pub blocks: usize,
}

/// Streams the session from its current position to the end into a new
/// file at `descriptor.path`.
///
/// The output directory is created here, right before the writer opens. On
/// any write failure the partial file is removed.
pub fn render_stem<S, B>(
    session: &mut S,
    backend: &B,
    descriptor: &StemOutputDescriptor,
    spec: &WriterSpec,
    layout: ChannelLayout,
    buffer: &mut [f32],
) -> Result<RenderStats, StemError>
where
    S: SynthesisSession + ?Sized,
    B: WriterBackend + ?Sized,
{
    let path = descriptor.path.as_path();
    if let Some(dir) = descriptor.directory() {
        std::fs::create_dir_all(dir).map_err(|source| StemError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let mut writer = backend.open(path, spec).map_err(|source| StemError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let width = layout.channels();
    let duration = session.duration_seconds();
    let mut stats = RenderStats::default();

    loop {
        if duration > 0.0 && session.position_seconds() >= duration {
            break;
        }
        let frames = session.read_interleaved(spec.sample_rate, layout, buffer);
        if frames == 0 {
            break;
        }

        match writer.write_frames(&buffer[..frames * width]) {
            Ok(written) if written == frames => {}
            Ok(written) => {
                discard(writer, path);
                return Err(StemError::ShortWrite {
                    path: path.to_path_buf(),
                    written,
                    expected: frames,
                });
            }
            Err(source) => {
                discard(writer, path);
                return Err(StemError::Write {
                    path: path.to_path_buf(),
                    source,
                });
            }
        }
        stats.frames += frames as u64;
        stats.blocks += 1;
    }

    if let Err(source) = writer.finalize() {
        remove_partial(path);
        return Err(StemError::Finalize {
            path: path.to_path_buf(),
            source,
        });
    }

    tracing::debug!(
        "Wrote {} frames in {} blocks to {}",
        stats.frames,
        stats.blocks,
        path.display()
    );
    Ok(stats)
}

/// Closes a failed writer and deletes what it wrote.
fn discard(writer: Box<dyn AudioWriter>, path: &Path) {
    if let Err(e) = writer.finalize() {
        tracing::debug!("Closing failed writer for {}: {}", path.display(), e);
    }
    remove_partial(path);
}

fn remove_partial(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => tracing::info!("Removed partial file {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::error!("Could not remove partial file {}: {}", path.display(), e),
    }
}
