//! Size/duration splitter for media artifacts.
//!
//! An artifact at or under the size ceiling is passed through as a single
//! chunk. Anything larger is cut into `ceil(duration / window)` time-range
//! chunks, each exported as its own WAV file into the job's working
//! directory. Ranges are contiguous, non-overlapping, and exactly cover
//! `[0, total_duration)`.

use crate::audio::WavArtifact;
use crate::error::{PolyscribeError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One time-range slice of a media artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaChunk {
    /// Position of this chunk in the artifact, starting at 0.
    pub index: usize,
    /// WAV file holding the chunk's audio.
    pub path: PathBuf,
    /// Start of the covered time range in milliseconds (inclusive).
    pub start_ms: u64,
    /// End of the covered time range in milliseconds (exclusive).
    pub end_ms: u64,
}

impl MediaChunk {
    /// Duration of the covered range in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        self.end_ms - self.start_ms
    }
}

/// Splitter configured with a size ceiling and a duration window.
#[derive(Debug, Clone)]
pub struct MediaSplitter {
    max_whole_bytes: u64,
    window_ms: u64,
}

impl MediaSplitter {
    /// Creates a splitter with the given size ceiling and duration window.
    pub fn new(max_whole_bytes: u64, window_ms: u64) -> Self {
        Self {
            max_whole_bytes,
            window_ms,
        }
    }

    /// Splits the artifact at `source` into chunks.
    ///
    /// Chunk files are written into `work_dir`; the single-chunk case
    /// references the source file directly and writes nothing.
    ///
    /// Fails before producing any chunk if the source is unreadable or has
    /// zero duration — a partial chunk set is never returned.
    pub fn split(&self, source: &Path, work_dir: &Path) -> Result<Vec<MediaChunk>> {
        let artifact = WavArtifact::open(source)?;
        let total_ms = artifact.duration_ms();

        if total_ms == 0 {
            return Err(PolyscribeError::EmptySource {
                message: format!("{} has zero duration", source.display()),
            });
        }

        if artifact.byte_size() <= self.max_whole_bytes {
            debug!(
                size = artifact.byte_size(),
                "artifact under size ceiling, sending whole"
            );
            return Ok(vec![MediaChunk {
                index: 0,
                path: source.to_path_buf(),
                start_ms: 0,
                end_ms: total_ms,
            }]);
        }

        if self.window_ms == 0 {
            return Err(PolyscribeError::ConfigInvalidValue {
                key: "pipeline.chunk_window_ms".to_string(),
                message: "must be positive".to_string(),
            });
        }

        let count = total_ms.div_ceil(self.window_ms) as usize;
        info!(chunks = count, total_ms, "splitting media artifact");

        let mut chunks = Vec::with_capacity(count);
        for index in 0..count {
            let start_ms = index as u64 * self.window_ms;
            let end_ms = ((index as u64 + 1) * self.window_ms).min(total_ms);
            let path = work_dir.join(format!("chunk_{index:03}.wav"));

            artifact.export_range(start_ms, end_ms, &path)?;

            chunks.push(MediaChunk {
                index,
                path,
                start_ms,
                end_ms,
            });
        }

        Ok(chunks)
    }
}
