//! Core types for anidl

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

use crate::error::{Error, Result};

/// Unique identifier for a submitted job
///
/// Identifiers are allocated by the [`Orchestrator`](crate::Orchestrator) from
/// a process-local counter; they are not persisted anywhere.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub u64);

impl JobId {
    /// Create a new JobId
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the inner u64 value
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for JobId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Job status
///
/// Lifecycle: `Pending -(spawn succeeds)-> Running -(exit 0)-> Succeeded`;
/// `Running -(exit != 0)-> Failed`. `Succeeded` and `Failed` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Created but the background process has not been spawned yet
    Pending,
    /// Background process is alive
    Running,
    /// Background process exited with code 0
    Succeeded,
    /// Background process exited with a non-zero code
    Failed,
}

impl Status {
    /// Whether this status is terminal (the process has exited)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Succeeded | Status::Failed)
    }
}

/// One episode-download request: slug plus episode number, season defaulting
/// to 1
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRequest {
    /// URL-safe identifier of the series (e.g. "one-piece")
    pub slug: String,

    /// Episode number, 1-based
    pub episode: u32,

    /// Season number, 1-based (default: 1)
    #[serde(default = "default_season")]
    pub season: u32,

    /// Output directory override (None = use the configured downloads path)
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

fn default_season() -> u32 {
    1
}

impl DownloadRequest {
    /// Create a request for season 1 with no output directory override
    pub fn new(slug: impl Into<String>, episode: u32) -> Self {
        Self {
            slug: slug.into(),
            episode,
            season: 1,
            output_dir: None,
        }
    }

    /// Set the season number
    pub fn with_season(mut self, season: u32) -> Self {
        self.season = season;
        self
    }

    /// Set the output directory override
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Validate the request invariants: non-empty URL-safe slug, episode >= 1,
    /// season >= 1
    pub fn validate(&self) -> Result<()> {
        if self.slug.trim().is_empty() {
            return Err(Error::invalid_request("slug must not be empty"));
        }
        if self.slug.contains(['/', '?', '#']) || self.slug.contains(char::is_whitespace) {
            return Err(Error::invalid_request(format!(
                "slug {:?} contains characters that are not URL-safe",
                self.slug
            )));
        }
        if self.episode < 1 {
            return Err(Error::invalid_request(format!(
                "episode must be >= 1, got {}",
                self.episode
            )));
        }
        if self.season < 1 {
            return Err(Error::invalid_request(format!(
                "season must be >= 1, got {}",
                self.season
            )));
        }
        Ok(())
    }

    /// Build the canonical episode URL by template substitution:
    /// `https://<host>/anime/stream/<slug>/staffel-<season>/episode-<episode>`
    ///
    /// The request is validated first, so an unvalidated request cannot
    /// produce a malformed URL.
    pub fn episode_url(&self, host: &str) -> Result<Url> {
        self.validate()?;
        let raw = format!(
            "https://{host}/anime/stream/{slug}/staffel-{season}/episode-{episode}",
            slug = self.slug,
            season = self.season,
            episode = self.episode,
        );
        Url::parse(&raw).map_err(|e| Error::invalid_request(format!("bad episode URL {raw:?}: {e}")))
    }
}

/// Ordered, duplicate-free sequence of provider names; the first entry is the
/// default provider, the rest is the failover order handed to the external tool
///
/// Deserialization goes through the validating constructor, so an empty or
/// all-blank list in persisted data is rejected the same way as in code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>")]
pub struct ProviderList(Vec<String>);

impl TryFrom<Vec<String>> for ProviderList {
    type Error = Error;

    fn try_from(names: Vec<String>) -> Result<Self> {
        Self::new(names)
    }
}

impl ProviderList {
    /// Build a provider list from an ordered sequence of names.
    ///
    /// Later duplicates are dropped (order-preserving, case-sensitive). An
    /// empty result is a configuration error.
    pub fn new(names: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut seen = Vec::new();
        for name in names {
            let name = name.trim().to_string();
            if name.is_empty() {
                continue;
            }
            if !seen.contains(&name) {
                seen.push(name);
            }
        }
        if seen.is_empty() {
            return Err(Error::Config {
                message: "provider list must contain at least one provider".into(),
                key: Some("providers.provider_priority".into()),
            });
        }
        Ok(Self(seen))
    }

    /// The default provider (first entry)
    pub fn default_provider(&self) -> &str {
        // Invariant: constructor rejects empty lists
        &self.0[0]
    }

    /// All providers in priority order
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Iterate over provider names in priority order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of providers
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false, since the constructor rejects empty lists
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    // --- DownloadRequest validation ---

    #[test]
    fn empty_slug_is_rejected() {
        let req = DownloadRequest::new("", 1);
        let err = req.validate().unwrap_err();
        assert_eq!(err.code(), "invalid_request");
    }

    #[test]
    fn whitespace_only_slug_is_rejected() {
        let req = DownloadRequest::new("   ", 1);
        assert!(req.validate().is_err());
    }

    #[test]
    fn slug_with_slash_is_rejected() {
        let req = DownloadRequest::new("one/piece", 1);
        let err = req.validate().unwrap_err();
        assert_eq!(err.code(), "invalid_request");
    }

    #[test]
    fn slug_with_space_is_rejected() {
        let req = DownloadRequest::new("one piece", 1);
        assert!(req.validate().is_err());
    }

    #[test]
    fn episode_zero_is_rejected() {
        let req = DownloadRequest::new("one-piece", 0);
        let err = req.validate().unwrap_err();
        assert_eq!(err.code(), "invalid_request");
        assert!(err.to_string().contains("episode"));
    }

    #[test]
    fn season_zero_is_rejected() {
        let req = DownloadRequest::new("one-piece", 1).with_season(0);
        let err = req.validate().unwrap_err();
        assert!(err.to_string().contains("season"));
    }

    #[test]
    fn valid_request_passes_validation() {
        let req = DownloadRequest::new("one-piece", 1);
        req.validate().expect("minimal valid request must pass");
    }

    // --- Episode URL template ---

    #[test]
    fn golden_url_for_one_piece_episode_one() {
        let req = DownloadRequest::new("one-piece", 1);
        let url = req.episode_url("aniworld.to").unwrap();
        assert_eq!(
            url.as_str(),
            "https://aniworld.to/anime/stream/one-piece/staffel-1/episode-1"
        );
    }

    #[test]
    fn url_uses_requested_season_not_hardcoded_one() {
        let req = DownloadRequest::new("attack-on-titan", 12).with_season(3);
        let url = req.episode_url("aniworld.to").unwrap();
        assert_eq!(
            url.as_str(),
            "https://aniworld.to/anime/stream/attack-on-titan/staffel-3/episode-12"
        );
    }

    #[test]
    fn url_respects_custom_host() {
        let req = DownloadRequest::new("one-piece", 2);
        let url = req.episode_url("mirror.example.net").unwrap();
        assert_eq!(url.host_str(), Some("mirror.example.net"));
        assert_eq!(url.path(), "/anime/stream/one-piece/staffel-1/episode-2");
    }

    #[test]
    fn url_building_rejects_invalid_request() {
        let req = DownloadRequest::new("one-piece", 0);
        assert!(req.episode_url("aniworld.to").is_err());
    }

    // --- ProviderList ---

    #[test]
    fn provider_list_preserves_order_and_first_is_default() {
        let list = ProviderList::new(
            ["VOE", "Vidoza", "Streamtape"].map(String::from),
        )
        .unwrap();
        assert_eq!(list.default_provider(), "VOE");
        assert_eq!(list.as_slice(), &["VOE", "Vidoza", "Streamtape"]);
    }

    #[test]
    fn provider_list_drops_later_duplicates() {
        let list = ProviderList::new(
            ["VOE", "Vidoza", "VOE", "Streamtape", "Vidoza"].map(String::from),
        )
        .unwrap();
        assert_eq!(
            list.as_slice(),
            &["VOE", "Vidoza", "Streamtape"],
            "duplicates must be dropped while keeping first-seen order"
        );
    }

    #[test]
    fn provider_list_skips_blank_entries() {
        let list = ProviderList::new(["", "  ", "VOE"].map(String::from)).unwrap();
        assert_eq!(list.as_slice(), &["VOE"]);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn empty_provider_list_is_a_config_error() {
        let err = ProviderList::new(Vec::new()).unwrap_err();
        assert_eq!(err.code(), "config_error");
    }

    #[test]
    fn deserializing_an_empty_provider_list_is_rejected() {
        let result = serde_json::from_str::<ProviderList>("[]");
        assert!(
            result.is_err(),
            "an empty persisted list must not bypass construction validation"
        );
    }

    #[test]
    fn deserializing_dedups_like_the_constructor() {
        let list: ProviderList =
            serde_json::from_str(r#"["VOE", "Vidoza", "VOE", ""]"#).unwrap();
        assert_eq!(list.as_slice(), &["VOE", "Vidoza"]);
        assert_eq!(list.default_provider(), "VOE");
    }

    #[test]
    fn provider_list_serializes_as_a_plain_array() {
        let list = ProviderList::new(["VOE", "Vidoza"].map(String::from)).unwrap();
        assert_eq!(
            serde_json::to_string(&list).unwrap(),
            r#"["VOE","Vidoza"]"#
        );
    }

    // --- Status ---

    #[test]
    fn terminal_statuses_are_flagged() {
        assert!(!Status::Pending.is_terminal());
        assert!(!Status::Running.is_terminal());
        assert!(Status::Succeeded.is_terminal());
        assert!(Status::Failed.is_terminal());
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Status::Running).unwrap(), "\"running\"");
        assert_eq!(serde_json::to_string(&Status::Failed).unwrap(), "\"failed\"");
    }

    #[test]
    fn request_deserializes_with_season_default() {
        let req: DownloadRequest =
            serde_json::from_str(r#"{"slug":"one-piece","episode":5}"#).unwrap();
        assert_eq!(req.season, 1, "season must default to 1 when absent");
        assert_eq!(req.output_dir, None);
    }
}
