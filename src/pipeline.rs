//! Pipeline orchestration: split → dispatch → collect → merge.
//!
//! Three runs share the same spine. Transcription splits a media artifact,
//! transcribes each chunk, and creates a new document from the combined
//! text. Reformat and translation split a document's text on sentence
//! boundaries, transform each chunk, and merge the combined result back
//! into the document's primary or secondary section.
//!
//! All collaborators — capabilities, the document store, tuning — are
//! injected through [`PipelineContext`]; pipeline stages read no process
//! state. The per-job session releases its working area on every exit path.

use crate::collect::{self, Joiner};
use crate::config::PipelineConfig;
use crate::dispatch::{CapabilityKind, CapabilitySet, Dispatcher, UnitOutcome, WorkUnit};
use crate::document::{DocumentStore, SectionRole};
use crate::error::Result;
use crate::session::Session;
use crate::split::{MediaSplitter, SentenceSplitter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Everything a pipeline run needs, injected once at construction.
pub struct PipelineContext {
    pub settings: PipelineConfig,
    pub capabilities: Arc<CapabilitySet>,
    pub store: DocumentStore,
    pub temp_dir: PathBuf,
}

/// Terminal payload of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutput {
    /// The combined artifact.
    pub text: String,
    /// Filename of the document the artifact was persisted into.
    pub document: Option<String>,
}

impl PipelineContext {
    fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(
            self.capabilities.clone(),
            self.settings.max_concurrent_units,
        )
    }
}

fn log_fallbacks(stage: &str, results: &[crate::dispatch::UnitResult]) {
    let degraded = results
        .iter()
        .filter(|r| r.outcome == UnitOutcome::Fallback)
        .count();
    if degraded > 0 {
        warn!(stage, degraded, total = results.len(), "units degraded to fallback");
    }
}

/// Transcribes a media artifact into a new document.
///
/// The artifact is split in the job's session directory, each chunk is
/// transcribed under the concurrency cap, and the combined text becomes a
/// new document's primary section. Returns the combined text and the
/// created document's filename.
pub async fn run_transcription(
    ctx: &PipelineContext,
    source: &Path,
    source_name: &str,
) -> Result<PipelineOutput> {
    // Dropping the session cleans the working area on every exit path.
    let session = Session::create(&ctx.temp_dir)?;

    let splitter = MediaSplitter::new(
        ctx.settings.max_whole_artifact_bytes,
        ctx.settings.chunk_window_ms,
    );
    let chunks = splitter.split(source, session.dir())?;
    info!(source = %source.display(), chunks = chunks.len(), "transcription run started");

    let units = WorkUnit::for_media(chunks);
    let results = ctx.dispatcher().dispatch(units).await;
    log_fallbacks("transcribe", &results);

    let combined = collect::combine(&results, Joiner::Space)?;
    let document = ctx.store.create(source_name, &combined)?;

    Ok(PipelineOutput {
        text: combined,
        document: Some(document),
    })
}

/// Reformats text and merges it as the document's primary section.
///
/// The existing secondary section, if any, is preserved.
pub async fn run_reformat(
    ctx: &PipelineContext,
    text: &str,
    document: &str,
) -> Result<PipelineOutput> {
    let chunks = SentenceSplitter::new(ctx.settings.max_chunk_words).split(text);
    info!(document, chunks = chunks.len(), "reformat run started");

    let units = WorkUnit::for_text(chunks, CapabilityKind::Reformat);
    let results = ctx.dispatcher().dispatch(units).await;
    log_fallbacks("reformat", &results);

    let combined = collect::combine(&results, Joiner::Paragraph)?;
    ctx.store
        .merge(document, &combined, SectionRole::Primary)?;

    Ok(PipelineOutput {
        text: combined,
        document: Some(document.to_string()),
    })
}

/// Translates text and merges it as the document's secondary section.
///
/// The existing primary section is preserved.
pub async fn run_translation(
    ctx: &PipelineContext,
    text: &str,
    document: &str,
    target_language: &str,
) -> Result<PipelineOutput> {
    let chunks = SentenceSplitter::new(ctx.settings.max_chunk_words).split(text);
    info!(document, chunks = chunks.len(), target_language, "translation run started");

    let units = WorkUnit::for_text(
        chunks,
        CapabilityKind::Translate {
            target_language: target_language.to_string(),
        },
    );
    let results = ctx.dispatcher().dispatch(units).await;
    log_fallbacks("translate", &results);

    let combined = collect::combine(&results, Joiner::Line)?;
    ctx.store
        .merge(document, &combined, SectionRole::Secondary)?;

    Ok(PipelineOutput {
        text: combined,
        document: Some(document.to_string()),
    })
}
