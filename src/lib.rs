//! polyscribe - chunked transcription and translation for large artifacts
//!
//! Splits media or text into bounded chunks, fans them out to an external
//! transformation capability under a concurrency cap, reassembles the
//! results in index order, and merges them into a persisted, sectioned
//! document.

// Enforce error handling discipline
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
pub mod capability;
pub mod cli;
pub mod collect;
pub mod config;
pub mod defaults;
pub mod dispatch;
pub mod document;
pub mod error;
pub mod job;
pub mod pipeline;
pub mod session;
pub mod split;

// Core traits (capability seams)
pub use capability::{Generate, MockGenerator, MockTranscriber, Transcribe};

// Pipeline
pub use dispatch::{CapabilitySet, Dispatcher, UnitOutcome, UnitResult, WorkUnit};
pub use pipeline::{PipelineContext, PipelineOutput};

// Persistence
pub use document::{Document, DocumentStore, SectionRole};
pub use session::Session;

// Job substrate
pub use job::{JobId, JobQueue, JobStatus};

// Error handling
pub use error::{PolyscribeError, Result};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
