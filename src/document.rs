//! Persisted, sectioned documents.
//!
//! A document is plain Markdown: a metadata header (source name, generation
//! timestamp), a primary-content section, and optionally a secondary
//! (translated) section. Merging locates the secondary section by its
//! canonical heading text — a literal substring match — and preserves
//! whichever section the writer did not produce.
//!
//! Concurrent writers targeting the same document are NOT serialized here.
//! Two jobs interleaving read-modify-write on one file can lose a section;
//! callers that need exclusion must provide it themselves.

use crate::defaults::{DOCUMENT_TITLE, PRIMARY_HEADING, SECONDARY_HEADING};
use crate::error::{PolyscribeError, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Which section of a document a write targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionRole {
    /// Transcribed or reformatted source-language content.
    Primary,
    /// Translated content.
    Secondary,
}

/// A parsed document: metadata preamble plus up to two sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Title and generation timestamp lines.
    pub preamble: String,
    /// Body of the primary section.
    pub primary: String,
    /// Body of the secondary section, if present.
    pub secondary: Option<String>,
}

impl Document {
    /// Creates a fresh document with a metadata header and empty sections.
    pub fn new(source_name: &str) -> Self {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        Self {
            preamble: format!(
                "# {DOCUMENT_TITLE}: {source_name}\nGenerated on: {timestamp}"
            ),
            primary: String::new(),
            secondary: None,
        }
    }

    /// Parses rendered document text back into its parts.
    ///
    /// Unknown leading content stays in the preamble; a missing primary
    /// heading yields an empty primary body.
    pub fn parse(text: &str) -> Self {
        let (before_secondary, secondary) = match text.find(SECONDARY_HEADING) {
            Some(pos) => {
                let body = &text[pos + SECONDARY_HEADING.len()..];
                (&text[..pos], Some(body.trim().to_string()))
            }
            None => (text, None),
        };

        let (preamble, primary) = match before_secondary.find(PRIMARY_HEADING) {
            Some(pos) => {
                let body = &before_secondary[pos + PRIMARY_HEADING.len()..];
                (
                    before_secondary[..pos].trim().to_string(),
                    body.trim().to_string(),
                )
            }
            None => (before_secondary.trim().to_string(), String::new()),
        };

        Self {
            preamble,
            primary,
            secondary,
        }
    }

    /// Renders the document in its canonical shape.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.preamble);
        out.push_str("\n\n");
        out.push_str(PRIMARY_HEADING);
        out.push_str("\n\n");
        out.push_str(&self.primary);
        if let Some(secondary) = &self.secondary {
            out.push_str("\n\n");
            out.push_str(SECONDARY_HEADING);
            out.push_str("\n\n");
            out.push_str(secondary);
        }
        out.push('\n');
        out
    }
}

/// One entry in a document listing.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentEntry {
    pub filename: String,
    pub source_name: String,
    pub created_at: String,
}

/// Durable store for documents, one Markdown file per document.
pub struct DocumentStore {
    dir: PathBuf,
}

impl DocumentStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Full path of a stored document.
    pub fn path_of(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }

    /// Creates a new document from a source name and primary content.
    ///
    /// The filename is the sanitized source stem plus a timestamp, so
    /// repeated runs over the same source never collide. Returns the
    /// filename.
    pub fn create(&self, source_name: &str, primary: &str) -> Result<String> {
        let stem = Path::new(source_name)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| source_name.to_string());
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let filename = format!("{}_{}.md", sanitize_filename(&stem), timestamp);

        let mut document = Document::new(source_name);
        document.primary = primary.trim().to_string();

        self.write(&filename, &document)?;
        info!(document = %filename, "created document");
        Ok(filename)
    }

    /// Merges new section content into a document, preserving the other
    /// role's section verbatim.
    ///
    /// If the document does not exist it is created with a metadata header
    /// derived from the filename.
    pub fn merge(&self, filename: &str, content: &str, role: SectionRole) -> Result<()> {
        let path = self.path_of(filename);
        let mut document = match fs::read_to_string(&path) {
            Ok(text) => Document::parse(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Document::new(&source_name_from_filename(filename))
            }
            Err(e) => {
                return Err(PolyscribeError::Persist {
                    message: format!("Failed to read {}: {}", path.display(), e),
                });
            }
        };

        match role {
            SectionRole::Primary => document.primary = content.trim().to_string(),
            SectionRole::Secondary => document.secondary = Some(content.trim().to_string()),
        }

        self.write(filename, &document)?;
        info!(document = %filename, ?role, "merged section");
        Ok(())
    }

    /// Reads a stored document's full text.
    pub fn read(&self, filename: &str) -> Result<String> {
        let path = self.path_of(filename);
        fs::read_to_string(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PolyscribeError::DocumentNotFound {
                    name: filename.to_string(),
                }
            } else {
                PolyscribeError::Persist {
                    message: format!("Failed to read {}: {}", path.display(), e),
                }
            }
        })
    }

    /// Reads the primary section of a stored document.
    pub fn primary_content(&self, filename: &str) -> Result<String> {
        Ok(Document::parse(&self.read(filename)?).primary)
    }

    /// Lists stored documents, newest first.
    pub fn list(&self) -> Result<Vec<DocumentEntry>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(PolyscribeError::Persist {
                    message: format!("Failed to list {}: {}", self.dir.display(), e),
                });
            }
        };

        let mut documents = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "skipping unreadable directory entry");
                    continue;
                }
            };
            let filename = entry.file_name().to_string_lossy().to_string();
            if !filename.ends_with(".md") {
                continue;
            }

            let modified = entry
                .metadata()
                .and_then(|m| m.modified())
                .unwrap_or(std::time::SystemTime::UNIX_EPOCH);
            let created_at = chrono::DateTime::<chrono::Local>::from(modified)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string();

            documents.push(DocumentEntry {
                source_name: source_name_from_filename(&filename),
                filename,
                created_at,
            });
        }

        documents.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(documents)
    }

    fn write(&self, filename: &str, document: &Document) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| PolyscribeError::Persist {
            message: format!("Failed to create {}: {}", self.dir.display(), e),
        })?;
        let path = self.path_of(filename);
        fs::write(&path, document.render()).map_err(|e| PolyscribeError::Persist {
            message: format!("Failed to write {}: {}", path.display(), e),
        })
    }
}

/// Keeps alphanumerics, dash, underscore, and dot; replaces the rest.
fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if sanitized.is_empty() {
        "document".to_string()
    } else {
        sanitized
    }
}

/// Recovers a display name from a stored filename: strips the extension and
/// the trailing `_<timestamp>` the store appended.
fn source_name_from_filename(filename: &str) -> String {
    let stem = filename.strip_suffix(".md").unwrap_or(filename);
    match stem.rsplit_once('_') {
        Some((rest, suffix)) if suffix.chars().all(|c| c.is_ascii_digit()) => {
            match rest.rsplit_once('_') {
                Some((name, date)) if date.chars().all(|c| c.is_ascii_digit()) => name.to_string(),
                _ => rest.to_string(),
            }
        }
        _ => stem.to_string(),
    }
}
