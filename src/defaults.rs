//! Default configuration constants for polyscribe.
//!
//! This module provides shared constants used across the configuration types
//! and pipeline stages to ensure consistency and eliminate duplication.

/// Size ceiling in bytes below which a media artifact is sent whole.
///
/// Artifacts at or under 10 MiB fit a single external transcription call;
/// anything larger is split into duration-bounded chunks first.
pub const MAX_WHOLE_ARTIFACT_BYTES: u64 = 10 * 1024 * 1024;

/// Duration window per media chunk in milliseconds.
///
/// 10 minutes keeps each chunk comfortably inside the external
/// transcription service's per-request limits.
pub const CHUNK_WINDOW_MS: u64 = 10 * 60 * 1000;

/// Maximum words per text chunk for sentence-boundary splitting.
///
/// Sentences accumulate into a chunk until the next one would push it past
/// this ceiling. A single sentence longer than the ceiling becomes its own
/// chunk rather than being cut mid-sentence.
pub const MAX_CHUNK_WORDS: usize = 500;

/// Maximum number of units in flight against the external capability.
///
/// Small on purpose: the external service rate-limits aggressively, and a
/// cap of 3 keeps a large job under the limit without inter-batch pauses.
pub const MAX_CONCURRENT_UNITS: usize = 3;

/// Model identifier for the transcription capability.
pub const TRANSCRIBE_MODEL: &str = "whisper-1";

/// Model identifier for the text-generation capability.
pub const GENERATE_MODEL: &str = "gpt-4o";

/// Sampling temperature for text-generation calls.
///
/// Low but non-zero: rewriting and translation want near-deterministic
/// output that still reads naturally.
pub const GENERATE_TEMPERATURE: f32 = 0.3;

/// Base URL for the external capability API.
pub const API_BASE: &str = "https://api.openai.com/v1";

/// Canonical heading for a document's primary-content section.
pub const PRIMARY_HEADING: &str = "## Content";

/// Canonical heading for a document's secondary (translated) section.
///
/// The document merge locates this heading by literal substring match.
/// Renaming it breaks preserve-on-merge for every existing document.
pub const SECONDARY_HEADING: &str = "## Translation";

/// Title prefix for newly created documents.
pub const DOCUMENT_TITLE: &str = "Transcript";

/// Instructions sent with reformat units.
pub const REFORMAT_INSTRUCTIONS: &str = "You clean up raw speech transcripts. \
Fix punctuation, casing, and obvious transcription slips. Break the text \
into readable paragraphs. Do not summarize, reorder, or drop content. \
Return only the cleaned text.";

/// Instructions sent with translation units, parameterized by target language.
pub fn translate_instructions(target_language: &str) -> String {
    format!(
        "You are a professional translator. Translate the user's text into \
         {target_language}. Preserve meaning, tone, and paragraph structure. \
         Return only the translation."
    )
}

/// Default target language for translation runs.
pub const TARGET_LANGUAGE: &str = "Chinese";
