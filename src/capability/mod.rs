//! External content-transformation capabilities.
//!
//! The pipeline treats transcription and text generation as opaque blocking
//! calls behind these traits, so implementations can be swapped (real HTTP
//! client vs mock). The dispatcher always invokes capabilities on a blocking
//! thread; implementations are free to block.

pub mod openai;

use crate::error::{PolyscribeError, Result};
use std::sync::Arc;

/// Trait for speech-to-text transcription.
pub trait Transcribe: Send + Sync {
    /// Transcribe encoded audio bytes to text.
    ///
    /// Fails with an external-call error on any transport or quota failure.
    /// There is no streaming partial output.
    fn transcribe(&self, audio: &[u8]) -> Result<String>;

    /// Get the name of the backing model
    fn model_name(&self) -> &str;
}

/// Trait for instruction-driven text generation.
///
/// Used for both reformatting and translation, distinguished only by the
/// instruction payload.
pub trait Generate: Send + Sync {
    /// Rewrite `content` according to `instructions`.
    fn generate(&self, instructions: &str, content: &str, temperature: f32) -> Result<String>;

    /// Get the name of the backing model
    fn model_name(&self) -> &str;
}

/// Implement Transcribe for Arc<T> to allow sharing across units.
impl<T: Transcribe + ?Sized> Transcribe for Arc<T> {
    fn transcribe(&self, audio: &[u8]) -> Result<String> {
        (**self).transcribe(audio)
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

/// Implement Generate for Arc<T> to allow sharing across units.
impl<T: Generate + ?Sized> Generate for Arc<T> {
    fn generate(&self, instructions: &str, content: &str, temperature: f32) -> Result<String> {
        (**self).generate(instructions, content, temperature)
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

/// Mock transcriber for testing
#[derive(Debug, Clone)]
pub struct MockTranscriber {
    model_name: String,
    response: String,
    should_fail: bool,
}

impl MockTranscriber {
    /// Create a new mock transcriber with default settings
    pub fn new(model_name: &str) -> Self {
        Self {
            model_name: model_name.to_string(),
            response: "mock transcription".to_string(),
            should_fail: false,
        }
    }

    /// Configure the mock to return a specific response
    pub fn with_response(mut self, response: &str) -> Self {
        self.response = response.to_string();
        self
    }

    /// Configure the mock to fail on transcribe
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl Transcribe for MockTranscriber {
    fn transcribe(&self, _audio: &[u8]) -> Result<String> {
        if self.should_fail {
            Err(PolyscribeError::ExternalCall {
                message: "mock transcription failure".to_string(),
            })
        } else {
            Ok(self.response.clone())
        }
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Mock generator for testing.
///
/// By default echoes the content with a `[mock] ` prefix so tests can tell
/// per-chunk outputs apart; a fixed response can be configured instead.
#[derive(Debug, Clone)]
pub struct MockGenerator {
    model_name: String,
    response: Option<String>,
    should_fail: bool,
}

impl MockGenerator {
    /// Create a new mock generator with default settings
    pub fn new(model_name: &str) -> Self {
        Self {
            model_name: model_name.to_string(),
            response: None,
            should_fail: false,
        }
    }

    /// Configure the mock to return a fixed response
    pub fn with_response(mut self, response: &str) -> Self {
        self.response = Some(response.to_string());
        self
    }

    /// Configure the mock to fail on generate
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl Generate for MockGenerator {
    fn generate(&self, _instructions: &str, content: &str, _temperature: f32) -> Result<String> {
        if self.should_fail {
            return Err(PolyscribeError::ExternalCall {
                message: "mock generation failure".to_string(),
            });
        }
        match &self.response {
            Some(response) => Ok(response.clone()),
            None => Ok(format!("[mock] {content}")),
        }
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
