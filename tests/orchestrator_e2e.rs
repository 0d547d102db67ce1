//! End-to-end tests through the public API: load a config from disk, submit
//! jobs against a stand-in downloader script, and observe logs and statuses.

#![cfg(unix)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use anidl::{Config, DownloadRequest, Orchestrator, Status};

fn write_script(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-downloader");
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn write_config_file(base: &Path, tool: &Path) -> PathBuf {
    let config_path = base.join("config.json");
    let json = serde_json::json!({
        "general": {
            "download_path": base.join("downloads"),
            "log_file_path": base.join("logs").join("anidl.log"),
        },
        "downloader": {
            "path": tool,
            "search_path": false,
        },
    });
    std::fs::write(&config_path, serde_json::to_string_pretty(&json).unwrap()).unwrap();
    config_path
}

#[tokio::test]
async fn config_file_to_finished_download_job() {
    let dir = tempfile::tempdir().unwrap();
    // The script records its arguments so the wiring is verifiable end to end
    let tool = write_script(dir.path(), r#"echo "args: $@"; exit 0"#);
    let config_path = write_config_file(dir.path(), &tool);

    let mut config = Config::load_or_default(Some(&config_path)).unwrap();
    config.apply_env_overrides();
    let providers = config.provider_list().unwrap();

    let orchestrator = Orchestrator::new(config);
    let mut job = orchestrator
        .submit(DownloadRequest::new("one-piece", 1), &providers)
        .await
        .unwrap();

    assert_eq!(job.wait().await.unwrap(), Status::Succeeded);

    let log = std::fs::read_to_string(job.log_path()).unwrap();
    assert!(
        log.contains("https://aniworld.to/anime/stream/one-piece/staffel-1/episode-1"),
        "episode URL must reach the tool: {log:?}"
    );
    assert!(log.contains("-p VOE"), "default provider must reach the tool: {log:?}");
}

#[tokio::test]
async fn submission_returns_while_the_download_is_still_running() {
    let dir = tempfile::tempdir().unwrap();
    let tool = write_script(dir.path(), "sleep 2; exit 0");
    let config_path = write_config_file(dir.path(), &tool);

    let config = Config::load_or_default(Some(&config_path)).unwrap();
    let providers = config.provider_list().unwrap();
    let orchestrator = Orchestrator::new(config);

    let start = std::time::Instant::now();
    let mut job = orchestrator
        .submit(DownloadRequest::new("one-piece", 1), &providers)
        .await
        .unwrap();
    assert!(
        start.elapsed() < Duration::from_secs(1),
        "submit must not block on the download"
    );
    assert_eq!(job.status(), Status::Running);

    job.terminate().unwrap();
    while !job.status().is_terminal() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn reruns_append_to_the_same_episode_history() {
    let dir = tempfile::tempdir().unwrap();
    let tool = write_script(dir.path(), "echo attempt; exit 1");
    let config_path = write_config_file(dir.path(), &tool);

    let config = Config::load_or_default(Some(&config_path)).unwrap();
    let providers = config.provider_list().unwrap();
    let orchestrator = Orchestrator::new(config);

    let mut first = orchestrator
        .submit(DownloadRequest::new("one-piece", 2), &providers)
        .await
        .unwrap();
    assert_eq!(first.wait().await.unwrap(), Status::Failed);
    let mut second = orchestrator
        .submit(DownloadRequest::new("one-piece", 2), &providers)
        .await
        .unwrap();
    assert_eq!(second.wait().await.unwrap(), Status::Failed);

    // Distinct job ids mean distinct files; both survive on disk afterwards
    assert!(first.log_path().is_file());
    assert!(second.log_path().is_file());
    assert_ne!(first.log_path(), second.log_path());
}
