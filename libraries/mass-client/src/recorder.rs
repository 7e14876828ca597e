//! Capture of command/response pairs as JSON fixtures.
//!
//! Point a client at a live server with a recorder attached and every
//! successful command is written to `NNN_send_command_<command>.json`.
//! The files are what the test suites load as canned responses.

use crate::error::Result;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// Writes numbered fixture files into a directory.
#[derive(Debug)]
pub struct FixtureRecorder {
    dir: PathBuf,
    counter: AtomicUsize,
}

/// Summary of what a recorder has written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureStats {
    pub fixture_dir: PathBuf,
    pub fixture_count: usize,
    pub latest_counter: usize,
}

#[derive(Serialize)]
struct Fixture<'a> {
    command: &'a str,
    args: &'a Value,
    response: &'a Value,
    timestamp: String,
}

impl FixtureRecorder {
    /// Create the directory if needed. Numbering continues after any
    /// fixtures already present.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        let start = highest_counter(&dir)?;
        Ok(Self {
            dir,
            counter: AtomicUsize::new(start),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write one fixture and return its path.
    pub async fn record(&self, command: &str, args: &Value, response: &Value) -> Result<PathBuf> {
        let number = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let path = self.dir.join(fixture_file_name(number, command));

        let fixture = Fixture {
            command,
            args,
            response,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        let body = serde_json::to_vec_pretty(&fixture)
            .map_err(|e| crate::ClientError::ParseError(e.to_string()))?;
        tokio::fs::write(&path, body).await?;

        debug!(path = %path.display(), command = %command, "Recorded fixture");
        Ok(path)
    }

    pub fn stats(&self) -> FixtureStats {
        let fixture_count = std::fs::read_dir(&self.dir)
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
                    .count()
            })
            .unwrap_or(0);

        FixtureStats {
            fixture_dir: self.dir.clone(),
            fixture_count,
            latest_counter: self.counter.load(Ordering::SeqCst),
        }
    }
}

/// `3, "players/all"` -> `003_send_command_players_all.json`
pub fn fixture_file_name(number: usize, command: &str) -> String {
    format!("{:03}_send_command_{}.json", number, command.replace('/', "_"))
}

fn highest_counter(dir: &Path) -> Result<usize> {
    let mut highest = 0;
    for entry in std::fs::read_dir(dir)? {
        let name = entry?.file_name();
        let name = name.to_string_lossy();
        if let Some((prefix, _)) = name.split_once('_') {
            if let Ok(n) = prefix.parse::<usize>() {
                highest = highest.max(n);
            }
        }
    }
    Ok(highest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fixture_file_name() {
        assert_eq!(
            fixture_file_name(1, "players/all"),
            "001_send_command_players_all.json"
        );
        assert_eq!(
            fixture_file_name(12, "players/cmd/volume_set"),
            "012_send_command_players_cmd_volume_set.json"
        );
    }

    #[tokio::test]
    async fn test_record_writes_numbered_files() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = FixtureRecorder::new(dir.path()).unwrap();

        let first = recorder
            .record("players/all", &json!({}), &json!([]))
            .await
            .unwrap();
        let second = recorder
            .record("music/search", &json!({"search_query": "x"}), &json!({}))
            .await
            .unwrap();

        assert!(first.ends_with("001_send_command_players_all.json"));
        assert!(second.ends_with("002_send_command_music_search.json"));

        let written: Value =
            serde_json::from_slice(&std::fs::read(&second).unwrap()).unwrap();
        assert_eq!(written["command"], "music/search");
        assert_eq!(written["args"]["search_query"], "x");
        assert!(written["timestamp"].is_string());

        let stats = recorder.stats();
        assert_eq!(stats.fixture_count, 2);
        assert_eq!(stats.latest_counter, 2);
    }

    #[tokio::test]
    async fn test_numbering_continues_after_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("007_send_command_players_all.json"), "{}").unwrap();

        let recorder = FixtureRecorder::new(dir.path()).unwrap();
        let path = recorder
            .record("players/all", &json!({}), &json!([]))
            .await
            .unwrap();

        assert!(path.ends_with("008_send_command_players_all.json"));
    }
}
