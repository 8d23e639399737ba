//! WAV source artifacts.
//!
//! A [`WavArtifact`] is an immutable, fully loaded WAV file with a measurable
//! byte size and duration. The media splitter slices it by time range and
//! exports each range as its own WAV file.

use crate::error::{PolyscribeError, Result};
use std::io::Read;
use std::path::Path;

/// A loaded WAV artifact: interleaved 16-bit PCM samples plus format spec.
pub struct WavArtifact {
    spec: hound::WavSpec,
    samples: Vec<i16>,
    byte_size: u64,
}

impl WavArtifact {
    /// Load a WAV artifact from a file on disk.
    ///
    /// Fails with an unreadable-source error if the file cannot be read or
    /// is not a valid 16-bit WAV.
    pub fn open(path: &Path) -> Result<Self> {
        let byte_size = std::fs::metadata(path)
            .map_err(|e| PolyscribeError::UnreadableSource {
                message: format!("Failed to stat {}: {}", path.display(), e),
            })?
            .len();
        let file = std::fs::File::open(path).map_err(|e| PolyscribeError::UnreadableSource {
            message: format!("Failed to open {}: {}", path.display(), e),
        })?;
        Self::from_reader(Box::new(file), byte_size)
    }

    /// Load a WAV artifact from any reader (for testing/flexibility).
    pub fn from_reader(reader: Box<dyn Read + Send>, byte_size: u64) -> Result<Self> {
        let mut wav_reader =
            hound::WavReader::new(reader).map_err(|e| PolyscribeError::UnreadableSource {
                message: format!("Failed to parse WAV file: {}", e),
            })?;

        let spec = wav_reader.spec();
        if spec.bits_per_sample != 16 || spec.sample_format != hound::SampleFormat::Int {
            return Err(PolyscribeError::UnreadableSource {
                message: format!(
                    "Unsupported sample format: {} bits {:?}",
                    spec.bits_per_sample, spec.sample_format
                ),
            });
        }

        let samples: Vec<i16> = wav_reader
            .samples::<i16>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| PolyscribeError::UnreadableSource {
                message: format!("Failed to read WAV samples: {}", e),
            })?;

        Ok(Self {
            spec,
            samples,
            byte_size,
        })
    }

    /// Size of the artifact on disk in bytes.
    pub fn byte_size(&self) -> u64 {
        self.byte_size
    }

    /// Format spec of the source.
    pub fn spec(&self) -> hound::WavSpec {
        self.spec
    }

    /// Number of frames (one sample per channel).
    fn frame_count(&self) -> u64 {
        self.samples.len() as u64 / u64::from(self.spec.channels)
    }

    /// Total duration in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        self.frame_count() * 1000 / u64::from(self.spec.sample_rate)
    }

    /// Sample index of the frame starting at `ms`, clamped to the artifact.
    fn sample_index_at(&self, ms: u64) -> usize {
        let frame = (ms * u64::from(self.spec.sample_rate) / 1000).min(self.frame_count());
        (frame * u64::from(self.spec.channels)) as usize
    }

    /// Interleaved samples covering the time range `[start_ms, end_ms)`.
    ///
    /// Ranges are clamped to the artifact; an empty range yields an empty
    /// slice.
    pub fn slice_range_ms(&self, start_ms: u64, end_ms: u64) -> &[i16] {
        let start = self.sample_index_at(start_ms);
        let end = self.sample_index_at(end_ms.max(start_ms));
        &self.samples[start..end]
    }

    /// Export the time range `[start_ms, end_ms)` as a WAV file at `path`.
    ///
    /// The chunk keeps the source spec (rate, channels, 16-bit PCM).
    pub fn export_range(&self, start_ms: u64, end_ms: u64, path: &Path) -> Result<()> {
        let samples = self.slice_range_ms(start_ms, end_ms);

        let mut writer = hound::WavWriter::create(path, self.spec).map_err(|e| {
            PolyscribeError::Session {
                message: format!("Failed to create chunk file {}: {}", path.display(), e),
            }
        })?;
        for &sample in samples {
            writer
                .write_sample(sample)
                .map_err(|e| PolyscribeError::Session {
                    message: format!("Failed to write chunk file {}: {}", path.display(), e),
                })?;
        }
        writer.finalize().map_err(|e| PolyscribeError::Session {
            message: format!("Failed to finalize chunk file {}: {}", path.display(), e),
        })?;

        Ok(())
    }
}
