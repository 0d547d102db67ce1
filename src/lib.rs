//! # anidl
//!
//! A small orchestration library around the `aniworld` command-line
//! downloader: it turns a series slug plus episode number into the canonical
//! episode URL, launches the external tool as a detached background process,
//! and keeps the invoking terminal free while the download runs.
//!
//! The library does no scraping, no provider failover, and no media transfer
//! itself. Those belong to the invoked tool; this crate owns request
//! validation, configuration, process launch, per-job logging, and
//! non-blocking status reporting.
//!
//! ## Example
//!
//! ```no_run
//! use anidl::{Config, DownloadRequest, Orchestrator};
//!
//! # async fn run() -> anidl::Result<()> {
//! let mut config = Config::load_or_default(None)?;
//! config.apply_env_overrides();
//! let providers = config.provider_list()?;
//!
//! let orchestrator = Orchestrator::new(config);
//! let job = orchestrator
//!     .submit(DownloadRequest::new("one-piece", 1), &providers)
//!     .await?;
//! println!("job {} logging to {}", job.id(), job.log_path().display());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use orchestrator::{Job, Orchestrator, effective_output_dir};
pub use types::{DownloadRequest, JobId, ProviderList, Status};
