//! Types for audio download strategies.

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

use crate::proxy::ProxyEndpoint;

/// Errors that can occur while downloading a track.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Neither of the acceptable audio stream formats is available.
    #[error("no suitable audio stream")]
    NoAudioStream,

    /// The platform refused playback because of an age restriction.
    /// Retrying or switching proxies does not recover from this.
    #[error("age restricted: {0}")]
    AgeRestricted(String),

    /// The platform refused playback for some other reason.
    #[error("video unplayable: {0}")]
    Unplayable(String),

    /// Network failure while talking to the platform or transferring
    /// the stream.
    #[error("transfer failed: {0}")]
    Transfer(String),

    /// Local file create/write failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// The external extractor tool failed or is missing.
    #[error("extractor failed: {0}")]
    Extractor(String),
}

/// A fully written track in the managed storage directory.
#[derive(Debug, Clone)]
pub struct DownloadedAudio {
    /// Globally unique file name (UUID + container extension). This is
    /// the identifier clients use to fetch the track.
    pub file_name: String,
    /// Absolute path of the file on disk.
    pub path: PathBuf,
}

/// A pluggable "video id -> local audio file" operation.
///
/// On success the file is fully written; on any failure during
/// transfer the implementation removes whatever it wrote, so callers
/// never observe a partial file as valid.
#[async_trait]
pub trait AudioDownloader: Send + Sync {
    /// Short name for logs and metrics.
    fn name(&self) -> &str;

    /// Fetch the audio of `video_id`, routed through `proxy` unless it
    /// is the direct marker.
    async fn download(
        &self,
        video_id: &str,
        proxy: &ProxyEndpoint,
    ) -> Result<DownloadedAudio, DownloadError>;
}

/// Generate a fresh globally-unique file name with the given extension.
pub(crate) fn fresh_file_name(extension: &str) -> String {
    format!("{}{}", Uuid::new_v4(), extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_file_names_are_unique() {
        let a = fresh_file_name(".webm");
        let b = fresh_file_name(".webm");
        assert_ne!(a, b);
        assert!(a.ends_with(".webm"));
    }
}
