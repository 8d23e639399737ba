//! Bounded-concurrency dispatch of work units to external capabilities.
//!
//! Each chunk becomes one [`WorkUnit`] bound to a capability. The dispatcher
//! runs units on a semaphore-gated task pool — at most `max_concurrent`
//! capability calls in flight at any time — and collects one [`UnitResult`]
//! per unit over a channel. It returns only after every dispatched unit has
//! reported: there is no early return, no partial result set, and no
//! cancellation of slower units when others finish.
//!
//! A unit failure never aborts the batch. The failed unit degrades to its
//! fallback payload with the `Fallback` outcome recorded, trading fidelity
//! for availability.

use crate::capability::{Generate, Transcribe};
use crate::defaults;
use crate::error::Result;
use crate::split::{MediaChunk, TextChunk};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Semaphore, mpsc};
use tracing::{debug, warn};

/// The payload a unit carries to its capability.
#[derive(Debug, Clone)]
pub enum UnitPayload {
    /// WAV file on disk, read at invocation time.
    Media(PathBuf),
    /// In-memory text.
    Text(String),
}

/// Which external capability a unit targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityKind {
    /// Speech-to-text over a media payload.
    Transcribe,
    /// Clean up a raw transcript chunk.
    Reformat,
    /// Translate a text chunk into the target language.
    Translate { target_language: String },
}

/// A chunk bound to a target capability.
#[derive(Debug, Clone)]
pub struct WorkUnit {
    pub index: usize,
    pub payload: UnitPayload,
    pub capability: CapabilityKind,
}

impl WorkUnit {
    /// Builds transcription units from media chunks.
    pub fn for_media(chunks: Vec<MediaChunk>) -> Vec<WorkUnit> {
        chunks
            .into_iter()
            .map(|chunk| WorkUnit {
                index: chunk.index,
                payload: UnitPayload::Media(chunk.path),
                capability: CapabilityKind::Transcribe,
            })
            .collect()
    }

    /// Builds text-transform units from text chunks.
    pub fn for_text(chunks: Vec<TextChunk>, capability: CapabilityKind) -> Vec<WorkUnit> {
        chunks
            .into_iter()
            .map(|chunk| WorkUnit {
                index: chunk.index,
                payload: UnitPayload::Text(chunk.text),
                capability: capability.clone(),
            })
            .collect()
    }

    /// Payload substituted when this unit's external call fails.
    ///
    /// Text transforms fall back to the untransformed chunk text. A media
    /// chunk has no textual original, so its fallback is empty text; the
    /// result still reports `Fallback` at the right index.
    pub fn fallback_text(&self) -> String {
        match &self.payload {
            UnitPayload::Text(text) => text.clone(),
            UnitPayload::Media(_) => String::new(),
        }
    }
}

/// How a unit's result was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitOutcome {
    /// The external call succeeded.
    Success,
    /// The external call failed; the fallback payload was substituted.
    Fallback,
}

/// The result of one dispatched unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitResult {
    pub index: usize,
    pub payload: String,
    pub outcome: UnitOutcome,
}

impl UnitResult {
    pub fn success(index: usize, payload: String) -> Self {
        Self {
            index,
            payload,
            outcome: UnitOutcome::Success,
        }
    }

    pub fn fallback(index: usize, payload: String) -> Self {
        Self {
            index,
            payload,
            outcome: UnitOutcome::Fallback,
        }
    }
}

/// The capabilities a dispatch round may invoke, injected once per pipeline.
pub struct CapabilitySet {
    pub transcriber: Arc<dyn Transcribe>,
    pub generator: Arc<dyn Generate>,
    pub temperature: f32,
}

impl CapabilitySet {
    /// Invokes the unit's target capability with its payload.
    fn invoke(&self, unit: &WorkUnit) -> Result<String> {
        match (&unit.capability, &unit.payload) {
            (CapabilityKind::Transcribe, UnitPayload::Media(path)) => {
                let audio = std::fs::read(path)?;
                self.transcriber.transcribe(&audio)
            }
            (CapabilityKind::Transcribe, UnitPayload::Text(_)) => {
                Err(crate::error::PolyscribeError::ExternalCall {
                    message: "transcription unit carries a text payload".to_string(),
                })
            }
            (CapabilityKind::Reformat, UnitPayload::Text(text)) => {
                self.generator
                    .generate(defaults::REFORMAT_INSTRUCTIONS, text, self.temperature)
            }
            (CapabilityKind::Translate { target_language }, UnitPayload::Text(text)) => {
                let instructions = defaults::translate_instructions(target_language);
                self.generator.generate(&instructions, text, self.temperature)
            }
            (_, UnitPayload::Media(_)) => Err(crate::error::PolyscribeError::ExternalCall {
                message: "text-transform unit carries a media payload".to_string(),
            }),
        }
    }
}

/// Dispatcher with a fixed concurrency cap.
pub struct Dispatcher {
    capabilities: Arc<CapabilitySet>,
    max_concurrent: usize,
}

impl Dispatcher {
    /// Creates a dispatcher over the given capabilities.
    ///
    /// A cap of 0 is clamped to 1.
    pub fn new(capabilities: Arc<CapabilitySet>, max_concurrent: usize) -> Self {
        Self {
            capabilities,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Runs every unit to completion and returns one result per unit.
    ///
    /// Capability calls run on the blocking thread pool with at most
    /// `max_concurrent` in flight. Results arrive in completion order; the
    /// collector re-establishes index order.
    pub async fn dispatch(&self, units: Vec<WorkUnit>) -> Vec<UnitResult> {
        let total = units.len();
        if total == 0 {
            return Vec::new();
        }

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let (tx, mut rx) = mpsc::channel(total);

        for unit in units {
            // The semaphore is never closed while dispatching.
            let Ok(permit) = semaphore.clone().acquire_owned().await else {
                let _ = tx.send(UnitResult::fallback(unit.index, unit.fallback_text())).await;
                continue;
            };
            let capabilities = self.capabilities.clone();
            let tx = tx.clone();

            tokio::spawn(async move {
                let _permit = permit; // Hold until the unit reports
                let index = unit.index;
                let fallback = unit.fallback_text();

                let outcome =
                    tokio::task::spawn_blocking(move || capabilities.invoke(&unit)).await;

                let result = match outcome {
                    Ok(Ok(text)) => {
                        debug!(unit = index, "unit completed");
                        UnitResult::success(index, text)
                    }
                    Ok(Err(e)) => {
                        warn!(unit = index, error = %e, "unit degraded to fallback");
                        UnitResult::fallback(index, fallback)
                    }
                    Err(e) => {
                        warn!(unit = index, error = %e, "unit task panicked, using fallback");
                        UnitResult::fallback(index, fallback)
                    }
                };

                let _ = tx.send(result).await;
            });
        }
        drop(tx);

        // Join barrier: the channel closes only after every unit has sent.
        let mut results = Vec::with_capacity(total);
        while let Some(result) = rx.recv().await {
            results.push(result);
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{MockGenerator, MockTranscriber};
    use crate::error::PolyscribeError;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn capability_set(
        transcriber: Arc<dyn Transcribe>,
        generator: Arc<dyn Generate>,
    ) -> Arc<CapabilitySet> {
        Arc::new(CapabilitySet {
            transcriber,
            generator,
            temperature: 0.0,
        })
    }

    fn text_units(texts: &[&str], capability: CapabilityKind) -> Vec<WorkUnit> {
        texts
            .iter()
            .enumerate()
            .map(|(index, text)| WorkUnit {
                index,
                payload: UnitPayload::Text(text.to_string()),
                capability: capability.clone(),
            })
            .collect()
    }

    #[tokio::test]
    async fn dispatch_empty_units_returns_empty() {
        let set = capability_set(
            Arc::new(MockTranscriber::new("t")),
            Arc::new(MockGenerator::new("g")),
        );
        let dispatcher = Dispatcher::new(set, 3);
        let results = dispatcher.dispatch(Vec::new()).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn dispatch_produces_one_result_per_unit() {
        let set = capability_set(
            Arc::new(MockTranscriber::new("t")),
            Arc::new(MockGenerator::new("g")),
        );
        let dispatcher = Dispatcher::new(set, 2);

        let units = text_units(&["a.", "b.", "c.", "d."], CapabilityKind::Reformat);
        let results = dispatcher.dispatch(units).await;

        assert_eq!(results.len(), 4);
        let mut indices: Vec<usize> = results.iter().map(|r| r.index).collect();
        indices.sort_unstable();
        assert_eq!(indices, vec![0, 1, 2, 3]);
        for result in &results {
            assert_eq!(result.outcome, UnitOutcome::Success);
        }
    }

    #[tokio::test]
    async fn failed_unit_degrades_to_fallback_without_aborting_batch() {
        // Fails only the unit whose content contains the marker.
        struct FailOnMarker;
        impl Generate for FailOnMarker {
            fn generate(&self, _i: &str, content: &str, _t: f32) -> Result<String> {
                if content.contains("poison") {
                    Err(PolyscribeError::ExternalCall {
                        message: "simulated outage".to_string(),
                    })
                } else {
                    Ok(format!("ok:{content}"))
                }
            }
            fn model_name(&self) -> &str {
                "fail-on-marker"
            }
        }

        let set = capability_set(Arc::new(MockTranscriber::new("t")), Arc::new(FailOnMarker));
        let dispatcher = Dispatcher::new(set, 3);

        let units = text_units(&["first.", "poison pill.", "third."], CapabilityKind::Reformat);
        let mut results = dispatcher.dispatch(units).await;
        results.sort_by_key(|r| r.index);

        assert_eq!(results.len(), 3);
        assert_eq!(results[0], UnitResult::success(0, "ok:first.".to_string()));
        // The failed unit carries its original, untransformed text
        assert_eq!(
            results[1],
            UnitResult::fallback(1, "poison pill.".to_string())
        );
        assert_eq!(results[2], UnitResult::success(2, "ok:third.".to_string()));
    }

    #[tokio::test]
    async fn all_units_report_even_when_all_fail() {
        let set = capability_set(
            Arc::new(MockTranscriber::new("t")),
            Arc::new(MockGenerator::new("g").with_failure()),
        );
        let dispatcher = Dispatcher::new(set, 2);

        let units = text_units(&["a.", "b.", "c."], CapabilityKind::Reformat);
        let results = dispatcher.dispatch(units).await;

        assert_eq!(results.len(), 3);
        for result in &results {
            assert_eq!(result.outcome, UnitOutcome::Fallback);
        }
    }

    #[tokio::test]
    async fn concurrency_never_exceeds_the_cap() {
        // Generator that tracks concurrent executions
        struct SlowGenerator {
            concurrent: Arc<AtomicU32>,
            max_concurrent: Arc<AtomicU32>,
        }

        impl Generate for SlowGenerator {
            fn generate(&self, _i: &str, content: &str, _t: f32) -> Result<String> {
                let current = self.concurrent.fetch_add(1, Ordering::SeqCst) + 1;
                self.max_concurrent.fetch_max(current, Ordering::SeqCst);

                std::thread::sleep(Duration::from_millis(50));

                self.concurrent.fetch_sub(1, Ordering::SeqCst);
                Ok(content.to_string())
            }
            fn model_name(&self) -> &str {
                "slow-mock"
            }
        }

        let concurrent = Arc::new(AtomicU32::new(0));
        let max_concurrent = Arc::new(AtomicU32::new(0));

        let set = capability_set(
            Arc::new(MockTranscriber::new("t")),
            Arc::new(SlowGenerator {
                concurrent: concurrent.clone(),
                max_concurrent: max_concurrent.clone(),
            }),
        );
        let dispatcher = Dispatcher::new(set, 2);

        let units = text_units(
            &["a.", "b.", "c.", "d.", "e.", "f."],
            CapabilityKind::Reformat,
        );
        let results = dispatcher.dispatch(units).await;

        assert_eq!(results.len(), 6);
        assert!(
            max_concurrent.load(Ordering::SeqCst) <= 2,
            "Max concurrent was {} (should be <= 2)",
            max_concurrent.load(Ordering::SeqCst)
        );
    }

    #[tokio::test]
    async fn combined_output_is_independent_of_completion_order() {
        // Earlier units sleep longer, so completion order is the reverse of
        // index order. The collector must still produce index order.
        struct InverseDelay;
        impl Generate for InverseDelay {
            fn generate(&self, _i: &str, content: &str, _t: f32) -> Result<String> {
                let index: u64 = content.trim_end_matches('.').parse().unwrap_or(0);
                std::thread::sleep(Duration::from_millis(60_u64.saturating_sub(index * 20)));
                Ok(format!("u{content}"))
            }
            fn model_name(&self) -> &str {
                "inverse-delay"
            }
        }

        let set = capability_set(Arc::new(MockTranscriber::new("t")), Arc::new(InverseDelay));
        let dispatcher = Dispatcher::new(set, 3);

        let units = text_units(&["0.", "1.", "2."], CapabilityKind::Reformat);
        let results = dispatcher.dispatch(units).await;

        // All three ran concurrently; the slowest (index 0) finished last
        assert_eq!(results.len(), 3);
        let combined = crate::collect::combine(&results, crate::collect::Joiner::Space).unwrap();
        assert_eq!(combined, "u0. u1. u2.");
    }

    #[tokio::test]
    async fn translate_units_reach_the_generator_with_the_language() {
        struct CaptureInstructions;
        impl Generate for CaptureInstructions {
            fn generate(&self, instructions: &str, _c: &str, _t: f32) -> Result<String> {
                Ok(instructions.to_string())
            }
            fn model_name(&self) -> &str {
                "capture"
            }
        }

        let set = capability_set(
            Arc::new(MockTranscriber::new("t")),
            Arc::new(CaptureInstructions),
        );
        let dispatcher = Dispatcher::new(set, 1);

        let units = text_units(
            &["hello."],
            CapabilityKind::Translate {
                target_language: "German".to_string(),
            },
        );
        let results = dispatcher.dispatch(units).await;

        assert_eq!(results.len(), 1);
        assert!(results[0].payload.contains("German"));
    }

    #[tokio::test]
    async fn media_unit_with_missing_file_falls_back() {
        let set = capability_set(
            Arc::new(MockTranscriber::new("t").with_response("text")),
            Arc::new(MockGenerator::new("g")),
        );
        let dispatcher = Dispatcher::new(set, 1);

        let units = vec![WorkUnit {
            index: 0,
            payload: UnitPayload::Media(PathBuf::from("/nonexistent/chunk.wav")),
            capability: CapabilityKind::Transcribe,
        }];
        let results = dispatcher.dispatch(units).await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].outcome, UnitOutcome::Fallback);
        // Media fallback is empty text
        assert_eq!(results[0].payload, "");
    }

    #[tokio::test]
    async fn mismatched_payload_and_capability_falls_back() {
        let set = capability_set(
            Arc::new(MockTranscriber::new("t")),
            Arc::new(MockGenerator::new("g")),
        );
        let dispatcher = Dispatcher::new(set, 1);

        let units = vec![WorkUnit {
            index: 0,
            payload: UnitPayload::Text("not audio".to_string()),
            capability: CapabilityKind::Transcribe,
        }];
        let results = dispatcher.dispatch(units).await;

        assert_eq!(results[0].outcome, UnitOutcome::Fallback);
        assert_eq!(results[0].payload, "not audio");
    }

    #[test]
    fn unit_outcome_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&UnitOutcome::Fallback).unwrap(),
            "\"fallback\""
        );
        assert_eq!(
            serde_json::to_string(&UnitOutcome::Success).unwrap(),
            "\"success\""
        );
    }

    #[test]
    fn for_text_binds_capability_to_every_chunk() {
        let chunks = vec![
            TextChunk {
                index: 0,
                text: "a.".to_string(),
                words: 1,
            },
            TextChunk {
                index: 1,
                text: "b.".to_string(),
                words: 1,
            },
        ];
        let units = WorkUnit::for_text(chunks, CapabilityKind::Reformat);
        assert_eq!(units.len(), 2);
        assert!(units.iter().all(|u| u.capability == CapabilityKind::Reformat));
        assert_eq!(units[1].index, 1);
    }

    #[test]
    fn fallback_text_for_media_is_empty() {
        let unit = WorkUnit {
            index: 0,
            payload: UnitPayload::Media(PathBuf::from("chunk.wav")),
            capability: CapabilityKind::Transcribe,
        };
        assert_eq!(unit.fallback_text(), "");
    }
}
