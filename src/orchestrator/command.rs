//! External downloader invocation building
//!
//! The orchestrator never scrapes or downloads anything itself; it assembles
//! one command line for the external tool and hands the provider/retry policy
//! over declaratively. Provider failover and Tor identity rotation happen
//! inside the tool.

use std::ffi::OsString;
use std::path::PathBuf;
use url::Url;

use crate::config::{Config, ENV_DEBUG_MODE, ENV_USE_TOR};
use crate::error::{Error, Result};
use crate::types::ProviderList;

/// A fully resolved external tool invocation
#[derive(Debug)]
pub(crate) struct Invocation {
    /// Resolved path to the downloader binary
    pub(crate) program: PathBuf,
    /// Arguments in order
    pub(crate) args: Vec<OsString>,
    /// Environment variables set for the child
    pub(crate) envs: Vec<(&'static str, String)>,
}

impl Invocation {
    /// Build the tool invocation for one episode download.
    ///
    /// The provider handed to `-p` is the list's default (first) entry; the
    /// remaining failover order and the Tor retry budget live in the shared
    /// config file the tool reads itself.
    pub(crate) fn build(
        config: &Config,
        url: &Url,
        output_dir: &std::path::Path,
        providers: &ProviderList,
    ) -> Result<Self> {
        let program = resolve_tool(config)?;

        let mut args: Vec<OsString> = vec![
            "-e".into(),
            url.as_str().into(),
            "-o".into(),
            output_dir.as_os_str().to_owned(),
            "-a".into(),
            config.general.action.as_arg().into(),
            "-L".into(),
            config.general.language.clone().into(),
            "-p".into(),
            providers.default_provider().into(),
        ];

        if config.general.aniskip {
            args.push("-k".into());
        }
        if config.general.keep_watching {
            args.push("-K".into());
        }
        if config.advanced.only_direct_link {
            args.push("-D".into());
        }
        if config.advanced.only_command {
            args.push("-C".into());
        }
        if config.advanced.use_playwright {
            args.push("-w".into());
        }
        if let Some(proxy) = &config.advanced.proxy {
            args.push("-x".into());
            args.push(proxy.clone().into());
        }
        if config.tor.use_tor {
            args.push("-t".into());
        }

        let mut envs = Vec::new();
        if config.tor.use_tor {
            envs.push((ENV_USE_TOR, "true".to_string()));
        }
        if config.general.debug_mode {
            envs.push((ENV_DEBUG_MODE, "true".to_string()));
        }

        Ok(Self {
            program,
            args,
            envs,
        })
    }

    /// Turn the invocation into a spawnable command (stdio wiring is the
    /// caller's responsibility)
    pub(crate) fn to_command(&self) -> tokio::process::Command {
        let mut command = tokio::process::Command::new(&self.program);
        command.args(&self.args);
        for (name, value) in &self.envs {
            command.env(name, value);
        }
        command
    }
}

/// Resolve the downloader binary: explicit path wins, otherwise PATH discovery
fn resolve_tool(config: &Config) -> Result<PathBuf> {
    if let Some(path) = &config.downloader.path {
        return Ok(path.clone());
    }
    if config.downloader.search_path {
        return which::which(&config.downloader.tool_name).map_err(|_| Error::ToolNotFound {
            tool: config.downloader.tool_name.clone(),
        });
    }
    Err(Error::ToolNotFound {
        tool: config.downloader.tool_name.clone(),
    })
}
