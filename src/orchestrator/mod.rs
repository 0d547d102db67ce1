//! Download request orchestrator
//!
//! The orchestrator is deliberately thin: it validates a
//! [`DownloadRequest`], makes sure the output directory exists, builds the
//! canonical episode URL, and launches the external downloader tool as a
//! detached background process with its combined stdout/stderr appended to a
//! per-job log file. Everything stream-related (scraping, provider failover,
//! Tor identity rotation, the actual transfer) happens inside the invoked
//! tool, configured declaratively through the shared config file and the
//! provider list.
//!
//! There is no retry at this layer and no persistence beyond the log files.
//! Submissions are independent of each other: each job owns its process and
//! its own append-mode log file, so concurrent submissions never corrupt one
//! another's output.

mod command;
mod job;


pub use job::Job;

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::types::{DownloadRequest, JobId, ProviderList};
use command::Invocation;

/// Download request orchestrator
///
/// Holds an immutable configuration snapshot (environment overrides are
/// applied by the caller before construction and never change afterwards)
/// and a process-local job id counter.
pub struct Orchestrator {
    config: Arc<Config>,
    next_job_id: AtomicU64,
}

impl Orchestrator {
    /// Create an orchestrator over a fixed configuration snapshot
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            next_job_id: AtomicU64::new(1),
        }
    }

    /// The configuration this orchestrator was built with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Submit one episode-download request.
    ///
    /// Validates the request (`InvalidRequest` on empty slug or episode < 1),
    /// creates the output directory recursively (`Filesystem` on failure),
    /// builds the episode URL, and spawns the external tool detached with its
    /// output appended to a fresh per-job log file. Returns as soon as the
    /// process is spawned; the caller is never blocked on the download and
    /// may exit immediately afterwards.
    pub async fn submit(
        &self,
        request: DownloadRequest,
        providers: &ProviderList,
    ) -> Result<Job> {
        request.validate()?;
        let url = request.episode_url(&self.config.host)?;

        let output_dir = request
            .output_dir
            .clone()
            .unwrap_or_else(|| self.config.general.download_path.clone());
        tokio::fs::create_dir_all(&output_dir)
            .await
            .map_err(|source| Error::Filesystem {
                path: output_dir.clone(),
                source,
            })?;

        let id = JobId::new(self.next_job_id.fetch_add(1, Ordering::Relaxed));

        let log_dir = self.config.job_log_dir();
        tokio::fs::create_dir_all(&log_dir)
            .await
            .map_err(|source| Error::Filesystem {
                path: log_dir.clone(),
                source,
            })?;
        let log_path = log_dir.join(job_log_file_name(&request, id));

        let invocation = Invocation::build(&self.config, &url, &output_dir, providers)?;

        // Append mode: a second submission for the same slug/episode (or a
        // re-run after a crash) must never truncate earlier log output.
        let log_file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .map_err(|source| Error::Filesystem {
                path: log_path.clone(),
                source,
            })?;
        let stderr_file = log_file.try_clone().map_err(|source| Error::Filesystem {
            path: log_path.clone(),
            source,
        })?;

        let mut command = invocation.to_command();
        command
            .stdin(Stdio::null())
            .stdout(Stdio::from(log_file))
            .stderr(Stdio::from(stderr_file));
        // Own process group: the job must survive the submitting terminal's
        // SIGINT/SIGHUP (the `nohup &` semantics of a detached task).
        #[cfg(unix)]
        command.process_group(0);

        let child = command.spawn().map_err(|source| Error::Spawn {
            tool: invocation.program.clone(),
            source,
        })?;

        tracing::info!(
            job = %id,
            slug = %request.slug,
            season = request.season,
            episode = request.episode,
            url = %url,
            provider = providers.default_provider(),
            log = %log_path.display(),
            pid = child.id(),
            "spawned detached download job"
        );

        Ok(Job::new(id, request, url, log_path, child))
    }
}

/// Per-job log file name: slug, zero-padded season/episode, and the job id
/// so simultaneous submissions for the same episode get distinct files
pub(crate) fn job_log_file_name(request: &DownloadRequest, id: JobId) -> PathBuf {
    PathBuf::from(format!(
        "{slug}-s{season:02}e{episode:03}-job{id}.log",
        slug = request.slug,
        season = request.season,
        episode = request.episode,
    ))
}

/// Resolve the effective output directory without submitting (CLI preview)
pub fn effective_output_dir<'a>(config: &'a Config, request: &'a DownloadRequest) -> &'a Path {
    request
        .output_dir
        .as_deref()
        .unwrap_or(&config.general.download_path)
}
