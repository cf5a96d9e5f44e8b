//! File-based data source.
//!
//! Reads one JSON fixture per domain from a directory. Useful for running the
//! dashboard offline against captured backend responses.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{DashboardSource, Domain, FetchError, Payload};

/// A data source that reads domain payloads from JSON files.
///
/// Each domain maps to `<dir>/<label>.json`, e.g. `dashboard.json` or
/// `timeline.json`. Files are re-read on every fetch, so editing a fixture
/// shows up on that domain's next poll.
#[derive(Debug)]
pub struct FileSource {
    dir: PathBuf,
    description: String,
}

impl FileSource {
    /// Create a new file source rooted at the given directory.
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref().to_path_buf();
        let description = format!("file: {}", dir.display());
        Self { dir, description }
    }

    /// Returns the directory being read.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the fixture for a domain.
    pub fn path_for(&self, domain: Domain) -> PathBuf {
        self.dir.join(format!("{}.json", domain.label()))
    }
}

#[async_trait]
impl DashboardSource for FileSource {
    async fn fetch(&self, domain: Domain) -> Result<Payload, FetchError> {
        let path = self.path_for(domain);
        let content = tokio::fs::read(&path).await.map_err(|e| {
            FetchError::NetworkFailure(format!("Read error: {}: {}", path.display(), e))
        })?;
        domain.decode(&content)
    }

    fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ErrorKind;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_fixture(dir: &TempDir, name: &str, content: &str) {
        let mut file = std::fs::File::create(dir.path().join(name)).unwrap();
        writeln!(file, "{}", content).unwrap();
    }

    #[test]
    fn test_file_source_new() {
        let source = FileSource::new("/tmp/fixtures");
        assert_eq!(source.dir(), Path::new("/tmp/fixtures"));
        assert_eq!(source.description(), "file: /tmp/fixtures");
        assert_eq!(
            source.path_for(Domain::Metrics),
            Path::new("/tmp/fixtures/metrics.json")
        );
    }

    #[tokio::test]
    async fn test_file_source_reads_fixture() {
        let dir = TempDir::new().unwrap();
        write_fixture(
            &dir,
            "agents.json",
            r#"{"agents": {"orchestrator": true, "pharmaceutical": false}}"#,
        );

        let source = FileSource::new(dir.path());
        match source.fetch(Domain::Agents).await.unwrap() {
            Payload::Agents(status) => {
                assert_eq!(status.agents.len(), 2);
                assert!(status.agents["orchestrator"].is_active());
            }
            other => panic!("unexpected payload: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_file_source_picks_up_changes() {
        let dir = TempDir::new().unwrap();
        write_fixture(&dir, "timeline.json", r#"{"total_events": 1, "timeline": []}"#);
        let source = FileSource::new(dir.path());

        let first = source.fetch(Domain::Timeline).await.unwrap();
        write_fixture(&dir, "timeline.json", r#"{"total_events": 2, "timeline": []}"#);
        let second = source.fetch(Domain::Timeline).await.unwrap();

        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_file_source_missing_file() {
        let source = FileSource::new("/nonexistent/fixtures");

        let err = source.fetch(Domain::Dashboard).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NetworkFailure);
        assert!(err.to_string().contains("Read error"));
    }

    #[tokio::test]
    async fn test_file_source_invalid_json() {
        let dir = TempDir::new().unwrap();
        write_fixture(&dir, "metrics.json", "not valid json");

        let source = FileSource::new(dir.path());
        let err = source.fetch(Domain::Metrics).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidResponse);
    }
}
