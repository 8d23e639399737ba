//! Per-job working area for intermediate chunk artifacts.
//!
//! A session owns one uniquely named directory under the scratch root. Chunk
//! files are written and deleted only by the owning job's pipeline stages.
//! Cleanup removes every file and the directory itself and runs on every
//! exit path: the session cleans itself up when dropped, so an early `?`
//! return from any pipeline stage still releases the working area.

use crate::error::{PolyscribeError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// Exclusive, ephemeral working directory for one job.
pub struct Session {
    id: String,
    dir: PathBuf,
}

impl Session {
    /// Creates a fresh session directory under `temp_root`.
    pub fn create(temp_root: &Path) -> Result<Self> {
        let id = Uuid::new_v4().to_string();
        let dir = temp_root.join(&id);
        fs::create_dir_all(&dir).map_err(|e| PolyscribeError::Session {
            message: format!("Failed to create session directory {}: {}", dir.display(), e),
        })?;
        debug!(session = %id, "created session");
        Ok(Self { id, dir })
    }

    /// The session identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The session's working directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Removes every file in the working area and the area itself.
    ///
    /// Never fails: a missing directory is a no-op, and per-file failures
    /// are logged and skipped so the rest of the area is still released.
    pub fn cleanup(&self) {
        if !self.dir.exists() {
            return;
        }

        match fs::read_dir(&self.dir) {
            Ok(entries) => {
                for entry in entries.flatten() {
                    if let Err(e) = fs::remove_file(entry.path()) {
                        warn!(
                            session = %self.id,
                            file = %entry.path().display(),
                            error = %e,
                            "failed to remove session file"
                        );
                    }
                }
            }
            Err(e) => {
                warn!(session = %self.id, error = %e, "failed to list session directory");
            }
        }

        if let Err(e) = fs::remove_dir(&self.dir) {
            warn!(session = %self.id, error = %e, "failed to remove session directory");
        } else {
            debug!(session = %self.id, "cleaned up session");
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.cleanup();
    }
}
