//! `anidl`: submit one episode download and return immediately.
//!
//! The heavy lifting lives in the library crate; this binary only parses
//! arguments, loads configuration, and prints where the detached job logs to.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use tracing_subscriber::EnvFilter;

use anidl::{Config, DownloadRequest, Orchestrator, ProviderList, effective_output_dir};

const USAGE: &str = "\
usage: anidl <slug> <episode> [output_dir]

example:
  anidl one-piece 1 ~/Downloads/anime

The slug is the series identifier from the site URL. Season defaults to 1;
pass --season to override. Run `anidl --help` for all options.";

#[derive(Debug, Parser)]
#[command(
    name = "anidl",
    version,
    about = "Submit an episode download to the external downloader as a detached background job"
)]
struct Cli {
    /// Series slug as it appears in the site URL (e.g. "one-piece")
    slug: String,

    /// Episode number, 1-based
    episode: u32,

    /// Directory the episode is saved to (default: configured downloads path)
    output_dir: Option<PathBuf>,

    /// Season number, 1-based
    #[arg(short, long, default_value_t = 1)]
    season: u32,

    /// Provider to try first, ahead of the configured priority order
    #[arg(short, long)]
    provider: Option<String>,

    /// Path to the config file (default: the platform config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging (same effect as IS_DEBUG_MODE=true)
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            // help/version are not errors
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("{e}");
            eprintln!("{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, code = e.code(), "submission failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anidl::Result<()> {
    // The subscriber must exist before config loading so its debug lines
    // (config path, fallback to defaults) are not dropped. At this point only
    // the flag and the environment can ask for debug; a debug_mode from the
    // config file still reaches the child via IS_DEBUG_MODE, and RUST_LOG
    // always wins for this process.
    init_logging(cli.debug || env_debug_requested());

    let mut config = Config::load_or_default(cli.config.as_deref())?;
    config.apply_env_overrides();
    if cli.debug {
        config.general.debug_mode = true;
    }

    let providers = build_providers(&config, cli.provider.as_deref())?;

    let mut request = DownloadRequest::new(cli.slug, cli.episode).with_season(cli.season);
    if let Some(dir) = cli.output_dir {
        request = request.with_output_dir(dir);
    }

    let orchestrator = Orchestrator::new(config);
    let output_dir = effective_output_dir(orchestrator.config(), &request).to_path_buf();
    let job = orchestrator.submit(request, &providers).await?;

    println!("submitted job {}: {}", job.id(), job.url());
    println!("  output: {}", output_dir.display());
    println!("  log:    {}", job.log_path().display());
    Ok(())
}

/// Configured provider order, with an optional command-line override promoted
/// to the front
fn build_providers(config: &Config, cli_provider: Option<&str>) -> anidl::Result<ProviderList> {
    match cli_provider {
        Some(name) => ProviderList::new(
            std::iter::once(name.to_string())
                .chain(config.provider_list()?.iter().map(str::to_string)),
        ),
        None => config.provider_list(),
    }
}

/// Whether `IS_DEBUG_MODE` asks for debug logging before the config is loaded
fn env_debug_requested() -> bool {
    std::env::var(anidl::config::ENV_DEBUG_MODE).is_ok_and(|v| anidl::config::is_truthy(&v))
}

fn init_logging(debug: bool) {
    let default_level = if debug { "anidl=debug" } else { "anidl=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
