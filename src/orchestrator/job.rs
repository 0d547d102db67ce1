//! Job handle for a detached download process

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::Result;
use crate::types::{DownloadRequest, JobId, Status};

/// One submitted download request bound to its background process and log file
///
/// The child process is fully detached: dropping the `Job` (or exiting the
/// submitting process) does not stop the download. The handle exists to poll
/// status and, if ever needed, to send an OS-level termination signal.
pub struct Job {
    id: JobId,
    request: DownloadRequest,
    url: Url,
    log_path: PathBuf,
    created_at: DateTime<Utc>,
    child: tokio::process::Child,
    last_status: Status,
}

impl Job {
    pub(crate) fn new(
        id: JobId,
        request: DownloadRequest,
        url: Url,
        log_path: PathBuf,
        child: tokio::process::Child,
    ) -> Self {
        Self {
            id,
            request,
            url,
            log_path,
            created_at: Utc::now(),
            child,
            // The constructor only runs after a successful spawn, so the
            // Pending state is never observable on a handle.
            last_status: Status::Running,
        }
    }

    /// Job identifier
    pub fn id(&self) -> JobId {
        self.id
    }

    /// The request this job was created from
    pub fn request(&self) -> &DownloadRequest {
        &self.request
    }

    /// The canonical episode URL handed to the external tool
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Path of the append-mode log file receiving the tool's combined
    /// stdout/stderr
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// When the job was submitted
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// OS process id of the background task, if it is still running
    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    /// Non-blocking status check.
    ///
    /// Exit code 0 maps to [`Status::Succeeded`], anything else (including
    /// death by signal) to [`Status::Failed`]. Terminal statuses are cached;
    /// the log file is never parsed.
    pub fn status(&mut self) -> Status {
        if self.last_status.is_terminal() {
            return self.last_status;
        }
        match self.child.try_wait() {
            Ok(Some(exit)) => {
                self.last_status = if exit.success() {
                    Status::Succeeded
                } else {
                    Status::Failed
                };
                tracing::info!(
                    job = %self.id,
                    code = ?exit.code(),
                    status = ?self.last_status,
                    "download job exited"
                );
                self.last_status
            }
            Ok(None) => Status::Running,
            Err(e) => {
                tracing::warn!(job = %self.id, error = %e, "failed to poll job status");
                self.last_status
            }
        }
    }

    /// Block (asynchronously) until the process exits and return the terminal
    /// status.
    ///
    /// Detached submission never requires this, but callers that do want to
    /// observe completion can await it.
    pub async fn wait(&mut self) -> Result<Status> {
        if self.last_status.is_terminal() {
            return Ok(self.last_status);
        }
        let exit = self.child.wait().await?;
        self.last_status = if exit.success() {
            Status::Succeeded
        } else {
            Status::Failed
        };
        Ok(self.last_status)
    }

    /// Send an OS-level termination signal to the background process.
    ///
    /// This is the only supported form of cancellation. The job transitions
    /// to [`Status::Failed`] once the kill takes effect; poll
    /// [`Job::status`] to observe it.
    pub fn terminate(&mut self) -> Result<()> {
        if self.last_status.is_terminal() {
            return Ok(());
        }
        tracing::info!(job = %self.id, "terminating download job");
        self.child.start_kill()?;
        Ok(())
    }
}

impl std::fmt::Debug for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Job")
            .field("id", &self.id)
            .field("request", &self.request)
            .field("url", &self.url.as_str())
            .field("log_path", &self.log_path)
            .field("last_status", &self.last_status)
            .finish_non_exhaustive()
    }
}
