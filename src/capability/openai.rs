//! HTTP capability client for OpenAI-style APIs.
//!
//! One client implements both capability traits: multipart upload to
//! `/audio/transcriptions` for speech-to-text and JSON `/chat/completions`
//! for text generation. All failures — transport, quota, non-2xx — map to
//! the external-call error and are handled per unit by the dispatcher.

use crate::capability::{Generate, Transcribe};
use crate::config::CapabilityConfig;
use crate::error::{PolyscribeError, Result};
use reqwest::blocking::multipart;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// HTTP client bound to one API endpoint and model pair.
pub struct OpenAiCapability {
    client: reqwest::blocking::Client,
    api_base: String,
    api_key: String,
    transcribe_model: String,
    generate_model: String,
}

impl OpenAiCapability {
    /// Builds a client from configuration.
    ///
    /// Fails if no API key is configured.
    pub fn new(config: &CapabilityConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| PolyscribeError::ConfigInvalidValue {
                key: "capability.api_key".to_string(),
                message: "missing API key (set POLYSCRIBE_API_KEY)".to_string(),
            })?;

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| PolyscribeError::Other(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key,
            transcribe_model: config.transcribe_model.clone(),
            generate_model: config.generate_model.clone(),
        })
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.api_key.trim())
    }
}

impl Transcribe for OpenAiCapability {
    fn transcribe(&self, audio: &[u8]) -> Result<String> {
        let part = multipart::Part::bytes(audio.to_vec())
            .file_name("chunk.wav")
            .mime_str("audio/wav")
            .map_err(|e| PolyscribeError::ExternalCall {
                message: format!("Failed to build upload part: {e}"),
            })?;
        let form = multipart::Form::new()
            .text("model", self.transcribe_model.clone())
            .text("response_format", "text")
            .part("file", part);

        let response = self
            .client
            .post(format!("{}/audio/transcriptions", self.api_base))
            .header("Authorization", self.bearer())
            .multipart(form)
            .send()
            .map_err(|e| PolyscribeError::ExternalCall {
                message: format!("Transcription request failed: {e}"),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(PolyscribeError::ExternalCall {
                message: format!("Transcription returned {status}: {body}"),
            });
        }

        response
            .text()
            .map(|text| text.trim().to_string())
            .map_err(|e| PolyscribeError::ExternalCall {
                message: format!("Failed to read transcription response: {e}"),
            })
    }

    fn model_name(&self) -> &str {
        &self.transcribe_model
    }
}

impl Generate for OpenAiCapability {
    fn generate(&self, instructions: &str, content: &str, temperature: f32) -> Result<String> {
        let body = ChatRequest {
            model: &self.generate_model,
            temperature,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: instructions,
                },
                ChatMessage {
                    role: "user",
                    content,
                },
            ],
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .header("Authorization", self.bearer())
            .json(&body)
            .send()
            .map_err(|e| PolyscribeError::ExternalCall {
                message: format!("Generation request failed: {e}"),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(PolyscribeError::ExternalCall {
                message: format!("Generation returned {status}: {body}"),
            });
        }

        let parsed: ChatResponse =
            response.json().map_err(|e| PolyscribeError::ExternalCall {
                message: format!("Failed to parse generation response: {e}"),
            })?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| PolyscribeError::ExternalCall {
                message: "Generation response contained no choices".to_string(),
            })
    }

    fn model_name(&self) -> &str {
        &self.generate_model
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: String,
}
