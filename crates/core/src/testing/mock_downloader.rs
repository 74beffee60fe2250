//! Mock download strategy for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::PathBuf;
use tokio::sync::Mutex;

use crate::downloader::{AudioDownloader, DownloadError, DownloadedAudio};
use crate::proxy::ProxyEndpoint;

/// A recorded download call for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedDownload {
    pub video_id: String,
    /// Display form of the proxy endpoint the call was routed through.
    pub proxy: String,
}

/// Mock implementation of the `AudioDownloader` trait.
///
/// Outcomes are scripted: push `Err`s (and `Ok`s) in the order the
/// strategy should produce them; once the script runs dry every call
/// succeeds. A successful call writes a real file into the configured
/// storage directory, so ledger and sweep behavior can be asserted on
/// disk.
pub struct MockDownloader {
    name: String,
    storage_dir: PathBuf,
    script: Mutex<VecDeque<Result<(), DownloadError>>>,
    calls: Mutex<Vec<RecordedDownload>>,
}

impl MockDownloader {
    pub fn new(name: impl Into<String>, storage_dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            storage_dir: storage_dir.into(),
            script: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue the outcome of the next unscripted call.
    pub async fn push_outcome(&self, outcome: Result<(), DownloadError>) {
        self.script.lock().await.push_back(outcome);
    }

    /// Queue `count` generic transfer failures.
    pub async fn push_failures(&self, count: usize) {
        let mut script = self.script.lock().await;
        for _ in 0..count {
            script.push_back(Err(DownloadError::Transfer("connection reset".to_string())));
        }
    }

    /// Calls made so far.
    pub async fn recorded(&self) -> Vec<RecordedDownload> {
        self.calls.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }
}

#[async_trait]
impl AudioDownloader for MockDownloader {
    fn name(&self) -> &str {
        &self.name
    }

    async fn download(
        &self,
        video_id: &str,
        proxy: &ProxyEndpoint,
    ) -> Result<DownloadedAudio, DownloadError> {
        self.calls.lock().await.push(RecordedDownload {
            video_id: video_id.to_string(),
            proxy: proxy.to_string(),
        });

        let outcome = self.script.lock().await.pop_front().unwrap_or(Ok(()));
        outcome?;

        let file_name = format!("{}.webm", uuid::Uuid::new_v4());
        let path = self.storage_dir.join(&file_name);
        tokio::fs::write(&path, b"mock audio")
            .await
            .map_err(|e| DownloadError::Storage(e.to_string()))?;

        Ok(DownloadedAudio { file_name, path })
    }
}
