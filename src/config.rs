//! Configuration types for anidl
//!
//! The persisted configuration is a JSON document with `general`, `providers`,
//! `tor` and `advanced` sections, shared with the external downloader tool.
//! The orchestrator itself only consumes a few of these fields (download path,
//! provider priority, debug/tor flags, log file location); the rest is carried
//! so one config file can drive both programs.
//!
//! Environment overrides (`IS_DEBUG_MODE`, `USE_TOR`) are applied once at
//! startup via [`Config::apply_env_overrides`] and never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::ProviderList;

/// Environment variable that force-enables debug logging
pub const ENV_DEBUG_MODE: &str = "IS_DEBUG_MODE";

/// Environment variable that force-enables Tor routing in the downloader tool
pub const ENV_USE_TOR: &str = "USE_TOR";

/// General settings (paths, language, UI-adjacent defaults)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default action performed by the downloader tool
    #[serde(default)]
    pub action: Action,

    /// Default directory downloads are written to
    #[serde(default = "default_download_path")]
    pub download_path: PathBuf,

    /// Preferred audio/subtitle language
    #[serde(default = "default_language")]
    pub language: String,

    /// Skip intros/outros via aniskip
    #[serde(default)]
    pub aniskip: bool,

    /// Continue with the next episode automatically
    #[serde(default)]
    pub keep_watching: bool,

    /// Preferred terminal size (columns, rows) for the external tool's TUI
    #[serde(default = "default_terminal_size")]
    pub terminal_size: [u16; 2],

    /// Enable debug logging
    #[serde(default)]
    pub debug_mode: bool,

    /// Log file location; per-job logs are placed in the same directory
    #[serde(default = "default_log_file_path")]
    pub log_file_path: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            action: Action::default(),
            download_path: default_download_path(),
            language: default_language(),
            aniskip: false,
            keep_watching: false,
            terminal_size: default_terminal_size(),
            debug_mode: false,
            log_file_path: default_log_file_path(),
        }
    }
}

/// Action the downloader tool performs for an episode
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Fetch the episode to disk (default)
    #[default]
    Download,
    /// Stream in a local player
    Watch,
    /// Watch synchronized with others
    Syncplay,
}

impl Action {
    /// CLI argument value understood by the external tool
    pub fn as_arg(&self) -> &'static str {
        match self {
            Action::Download => "Download",
            Action::Watch => "Watch",
            Action::Syncplay => "Syncplay",
        }
    }
}

/// Provider selection settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// Default provider for downloads
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Default provider for watching
    #[serde(default = "default_watch_provider")]
    pub default_watch_provider: String,

    /// Failover order across providers (first = tried first)
    #[serde(default = "default_provider_priority")]
    pub provider_priority: Vec<String>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            default_watch_provider: default_watch_provider(),
            provider_priority: default_provider_priority(),
        }
    }
}

/// Tor settings, consumed by the external tool's anti-blocking logic
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TorConfig {
    /// Route traffic through Tor
    #[serde(default)]
    pub use_tor: bool,

    /// Request a new identity and retry automatically when blocked
    #[serde(default = "default_true")]
    pub auto_retry: bool,

    /// Maximum retries with a fresh identity (default: 3)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for TorConfig {
    fn default() -> Self {
        Self {
            use_tor: false,
            auto_retry: true,
            max_retries: default_max_retries(),
        }
    }
}

/// Advanced settings passed through to the external tool
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AdvancedConfig {
    /// Print the direct stream link instead of downloading
    #[serde(default)]
    pub only_direct_link: bool,

    /// Print the constructed command instead of running it
    #[serde(default)]
    pub only_command: bool,

    /// Render pages with a headless browser
    #[serde(default)]
    pub use_playwright: bool,

    /// HTTP proxy, e.g. "http://127.0.0.1:8080"
    #[serde(default)]
    pub proxy: Option<String>,
}

/// External downloader binary location
///
/// Mirrors the pattern used for other external tools: an explicit path wins,
/// otherwise the binary is discovered on PATH when `search_path` is enabled.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DownloaderConfig {
    /// Explicit path to the downloader binary (None = discover on PATH)
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Binary name searched on PATH when no explicit path is set
    #[serde(default = "default_tool_name")]
    pub tool_name: String,

    /// Whether to search PATH when no explicit path is set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            path: None,
            tool_name: default_tool_name(),
            search_path: true,
        }
    }
}

/// Main configuration for the orchestrator
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// General settings
    #[serde(default)]
    pub general: GeneralConfig,

    /// Provider selection settings
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Tor settings
    #[serde(default)]
    pub tor: TorConfig,

    /// Advanced settings
    #[serde(default)]
    pub advanced: AdvancedConfig,

    /// Streaming-site host used in the episode URL template
    #[serde(default = "default_host")]
    pub host: String,

    /// External downloader binary location
    #[serde(default)]
    pub downloader: DownloaderConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            providers: ProvidersConfig::default(),
            tor: TorConfig::default(),
            advanced: AdvancedConfig::default(),
            host: default_host(),
            downloader: DownloaderConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from `path`, falling back to defaults.
    ///
    /// A missing file is not an error (defaults apply, matching the external
    /// tool's behavior); a present-but-unparsable file is, so a typo never
    /// silently downgrades to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match default_config_path() {
                Some(p) => p,
                None => return Ok(Self::default()),
            },
        };

        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file found, using defaults");
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(&path).map_err(|source| Error::Filesystem {
            path: path.clone(),
            source,
        })?;
        let config: Config = serde_json::from_str(&raw).map_err(|e| Error::Config {
            message: format!("failed to parse {}: {e}", path.display()),
            key: None,
        })?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Apply environment overrides once at startup.
    ///
    /// `IS_DEBUG_MODE` and `USE_TOR` are truthy on `{true,1,t,y,yes}`
    /// case-insensitively and can only enable their flag, never disable a
    /// persisted `true`.
    pub fn apply_env_overrides(&mut self) {
        if env_truthy(ENV_DEBUG_MODE) {
            self.general.debug_mode = true;
        }
        if env_truthy(ENV_USE_TOR) {
            self.tor.use_tor = true;
        }
    }

    /// Provider failover list: the default provider first, then the configured
    /// priority order with duplicates dropped
    pub fn provider_list(&self) -> Result<ProviderList> {
        let names = std::iter::once(self.providers.default_provider.clone())
            .chain(self.providers.provider_priority.iter().cloned());
        ProviderList::new(names)
    }

    /// Directory that per-job log files are written to (the directory of
    /// `general.log_file_path`)
    pub fn job_log_dir(&self) -> PathBuf {
        match self.general.log_file_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

/// Parse a truthiness string the way the external tool does:
/// `{true,1,t,y,yes}` case-insensitively
pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "t" | "y" | "yes"
    )
}

fn env_truthy(name: &str) -> bool {
    std::env::var(name).is_ok_and(|v| is_truthy(&v))
}

/// Default location of the config file (`<config dir>/anidl/config.json`)
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "anidl")
        .map(|dirs| dirs.config_dir().join("config.json"))
}

// Default value functions

fn default_download_path() -> PathBuf {
    // The user downloads folder; a relative fallback keeps tests and minimal
    // environments working without a home directory.
    directories::UserDirs::new()
        .and_then(|dirs| dirs.download_dir().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("downloads"))
}

fn default_language() -> String {
    "German Dub".to_string()
}

fn default_terminal_size() -> [u16; 2] {
    [90, 38]
}

fn default_log_file_path() -> PathBuf {
    directories::ProjectDirs::from("", "", "anidl")
        .map(|dirs| dirs.data_local_dir().join("logs").join("anidl.log"))
        .unwrap_or_else(|| PathBuf::from("anidl.log"))
}

fn default_provider() -> String {
    "VOE".to_string()
}

fn default_watch_provider() -> String {
    "Doodstream".to_string()
}

fn default_provider_priority() -> Vec<String> {
    vec![
        "VOE".into(),
        "Vidoza".into(),
        "Streamtape".into(),
        "Doodstream".into(),
        "Vidmoly".into(),
        "SpeedFiles".into(),
    ]
}

fn default_host() -> String {
    "aniworld.to".to_string()
}

fn default_tool_name() -> String {
    "aniworld".to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_retries() -> u32 {
    3
}
