//! In-process job substrate with submit/poll semantics.
//!
//! A job is a deferred pipeline run. Callers submit work, receive an
//! identifier, and poll: the status is `processing` until the run finishes,
//! then exactly one terminal payload — the combined text plus the stored
//! document's filename, or an error message.

use crate::error::Result;
use crate::pipeline::PipelineOutput;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

/// Identifier handed back on submit.
pub type JobId = String;

/// Status observed by a poller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobStatus {
    /// The run has not finished yet.
    Processing,
    /// The run finished; the combined text and stored document reference.
    Completed {
        text: String,
        saved_to: Option<String>,
    },
    /// The run failed with a job-level error.
    Failed { error: String },
}

impl JobStatus {
    /// Serialize status to JSON string.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize status from JSON string.
    pub fn from_json(s: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// True once the job has reached a terminal status.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Processing)
    }
}

/// Registry of submitted jobs and their statuses.
#[derive(Clone, Default)]
pub struct JobQueue {
    jobs: Arc<Mutex<HashMap<JobId, JobStatus>>>,
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Submits deferred work and returns its job identifier.
    ///
    /// The work runs on the async runtime; its result (or error) becomes the
    /// job's terminal status.
    pub async fn submit<F>(&self, work: F) -> JobId
    where
        F: Future<Output = Result<PipelineOutput>> + Send + 'static,
    {
        let id = Uuid::new_v4().to_string();
        self.jobs
            .lock()
            .await
            .insert(id.clone(), JobStatus::Processing);
        info!(job = %id, "job submitted");

        let jobs = self.jobs.clone();
        let job_id = id.clone();
        tokio::spawn(async move {
            let status = match work.await {
                Ok(output) => JobStatus::Completed {
                    text: output.text,
                    saved_to: output.document,
                },
                Err(e) => JobStatus::Failed {
                    error: e.to_string(),
                },
            };
            info!(job = %job_id, failed = matches!(status, JobStatus::Failed { .. }), "job finished");
            jobs.lock().await.insert(job_id, status);
        });

        id
    }

    /// Current status of a job, or None for an unknown identifier.
    pub async fn poll(&self, id: &str) -> Option<JobStatus> {
        self.jobs.lock().await.get(id).cloned()
    }

    /// Polls until the job reaches a terminal status.
    ///
    /// Returns None for an unknown identifier.
    pub async fn wait(&self, id: &str, poll_interval: Duration) -> Option<JobStatus> {
        loop {
            match self.poll(id).await {
                Some(status) if status.is_terminal() => return Some(status),
                Some(_) => tokio::time::sleep(poll_interval).await,
                None => return None,
            }
        }
    }
}
