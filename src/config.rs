use crate::defaults;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub capability: CapabilityConfig,
    pub pipeline: PipelineConfig,
}

/// Durable and scratch storage locations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage root. Defaults to the platform data directory when unset.
    pub root: Option<PathBuf>,
}

/// External capability configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CapabilityConfig {
    pub api_base: String,
    pub api_key: Option<String>,
    pub transcribe_model: String,
    pub generate_model: String,
    pub temperature: f32,
}

/// Split and dispatch tuning
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    pub max_whole_artifact_bytes: u64,
    pub chunk_window_ms: u64,
    pub max_chunk_words: usize,
    pub max_concurrent_units: usize,
    pub target_language: String,
}

impl Default for CapabilityConfig {
    fn default() -> Self {
        Self {
            api_base: defaults::API_BASE.to_string(),
            api_key: None,
            transcribe_model: defaults::TRANSCRIBE_MODEL.to_string(),
            generate_model: defaults::GENERATE_MODEL.to_string(),
            temperature: defaults::GENERATE_TEMPERATURE,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_whole_artifact_bytes: defaults::MAX_WHOLE_ARTIFACT_BYTES,
            chunk_window_ms: defaults::CHUNK_WINDOW_MS,
            max_chunk_words: defaults::MAX_CHUNK_WORDS,
            max_concurrent_units: defaults::MAX_CONCURRENT_UNITS,
            target_language: defaults::TARGET_LANGUAGE.to_string(),
        }
    }
}

impl StorageConfig {
    /// Resolved storage root.
    ///
    /// Uses `~/.local/share/polyscribe` on Linux when no root is configured.
    pub fn resolved_root(&self) -> PathBuf {
        self.root.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from(".polyscribe"))
                .join("polyscribe")
        })
    }

    /// Scratch area for per-job session directories.
    pub fn temp_dir(&self) -> PathBuf {
        self.resolved_root().join("temp")
    }

    /// Durable area for persisted documents.
    pub fn documents_dir(&self) -> PathBuf {
        self.resolved_root().join("transcripts")
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e) => {
                if e.downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false)
                {
                    Ok(Self::default())
                } else {
                    Err(e)
                }
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - POLYSCRIBE_API_KEY → capability.api_key
    /// - POLYSCRIBE_API_BASE → capability.api_base
    /// - POLYSCRIBE_STORAGE_DIR → storage.root
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var("POLYSCRIBE_API_KEY")
            && !key.is_empty()
        {
            self.capability.api_key = Some(key);
        }

        if let Ok(base) = std::env::var("POLYSCRIBE_API_BASE")
            && !base.is_empty()
        {
            self.capability.api_base = base;
        }

        if let Ok(root) = std::env::var("POLYSCRIBE_STORAGE_DIR")
            && !root.is_empty()
        {
            self.storage.root = Some(PathBuf::from(root));
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/polyscribe/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join("polyscribe")
            .join("config.toml")
    }
}
