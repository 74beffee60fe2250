//! Native client for the platform's internal player API.
//!
//! Resolves a video's adaptive streams through the `youtubei/v1/player`
//! endpoint using the Android client profile, which hands back direct
//! stream URLs, then copies the preferred audio stream into the managed
//! storage directory.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::proxy::ProxyEndpoint;

use super::types::{fresh_file_name, AudioDownloader, DownloadError, DownloadedAudio};

const PLAYER_ENDPOINT: &str = "https://www.youtube.com/youtubei/v1/player?prettyPrint=false";

// Android client profile: the player API serves it plain stream URLs
// that need no signature deciphering.
const CLIENT_NAME: &str = "ANDROID";
const CLIENT_VERSION: &str = "19.09.37";
const ANDROID_SDK_VERSION: u32 = 30;
const USER_AGENT: &str = "com.google.android.youtube/19.09.37 (Linux; U; Android 11) gzip";

/// Primary download strategy: lightweight native client against the
/// platform's streaming API.
pub struct InnertubeDownloader {
    storage_dir: PathBuf,
    timeout: Duration,
}

impl InnertubeDownloader {
    pub fn new(storage_dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            storage_dir: storage_dir.into(),
            timeout,
        }
    }

    /// The HTTP client is rebuilt per attempt because the proxy is an
    /// attempt-level decision.
    fn build_client(&self, proxy: &ProxyEndpoint) -> Result<Client, DownloadError> {
        let mut builder = Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT);

        if let Some(url) = proxy.url() {
            let proxy = reqwest::Proxy::all(url)
                .map_err(|e| DownloadError::Transfer(format!("invalid proxy {}: {}", url, e)))?;
            builder = builder.proxy(proxy);
        }

        builder
            .build()
            .map_err(|e| DownloadError::Transfer(format!("failed to build HTTP client: {}", e)))
    }

    async fn resolve_player(
        &self,
        client: &Client,
        video_id: &str,
    ) -> Result<PlayerResponse, DownloadError> {
        let body = json!({
            "context": {
                "client": {
                    "clientName": CLIENT_NAME,
                    "clientVersion": CLIENT_VERSION,
                    "androidSdkVersion": ANDROID_SDK_VERSION,
                    "hl": "en",
                }
            },
            "videoId": video_id,
            "contentCheckOk": true,
            "racyCheckOk": true,
        });

        let response = client
            .post(PLAYER_ENDPOINT)
            .json(&body)
            .send()
            .await
            .map_err(|e| DownloadError::Transfer(e.to_string()))?;

        if !response.status().is_success() {
            return Err(DownloadError::Transfer(format!(
                "player API returned HTTP {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| DownloadError::Transfer(format!("failed to parse player response: {}", e)))
    }
}

#[async_trait]
impl AudioDownloader for InnertubeDownloader {
    fn name(&self) -> &str {
        "innertube"
    }

    async fn download(
        &self,
        video_id: &str,
        proxy: &ProxyEndpoint,
    ) -> Result<DownloadedAudio, DownloadError> {
        let client = self.build_client(proxy)?;

        let player = self.resolve_player(&client, video_id).await?;
        check_playability(&player)?;

        let formats = player
            .streaming_data
            .map(|s| s.adaptive_formats)
            .unwrap_or_default();
        let (format, extension) = choose_audio_stream(&formats)?;
        let stream_url = format.url.as_deref().ok_or(DownloadError::NoAudioStream)?;

        debug!(
            video_id = video_id,
            mime_type = %format.mime_type,
            bitrate = format.bitrate,
            "Selected audio stream"
        );

        let file_name = fresh_file_name(extension);
        let path = self.storage_dir.join(&file_name);

        let response = client
            .get(stream_url)
            .send()
            .await
            .map_err(|e| DownloadError::Transfer(e.to_string()))?;
        if !response.status().is_success() {
            return Err(DownloadError::Transfer(format!(
                "stream fetch returned HTTP {}",
                response.status()
            )));
        }

        let mut file = tokio::fs::File::create(&path)
            .await
            .map_err(|e| DownloadError::Storage(e.to_string()))?;

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    super::remove_partial(&path).await;
                    return Err(DownloadError::Transfer(e.to_string()));
                }
            };
            if let Err(e) = file.write_all(&chunk).await {
                super::remove_partial(&path).await;
                return Err(DownloadError::Storage(e.to_string()));
            }
        }

        if let Err(e) = file.flush().await {
            super::remove_partial(&path).await;
            return Err(DownloadError::Storage(e.to_string()));
        }

        Ok(DownloadedAudio { file_name, path })
    }
}

// ============================================================================
// Player response
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerResponse {
    playability_status: Option<PlayabilityStatus>,
    streaming_data: Option<StreamingData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayabilityStatus {
    status: Option<String>,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StreamingData {
    #[serde(default)]
    adaptive_formats: Vec<AdaptiveFormat>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdaptiveFormat {
    url: Option<String>,
    mime_type: String,
    bitrate: Option<u64>,
}

/// Map a non-OK playability status to the right error. Age-gate
/// refusals get their own variant so the retry loop can give up on
/// them immediately.
fn check_playability(player: &PlayerResponse) -> Result<(), DownloadError> {
    let Some(status) = &player.playability_status else {
        return Ok(());
    };
    match status.status.as_deref() {
        None | Some("OK") => Ok(()),
        Some(other) => {
            let reason = status
                .reason
                .clone()
                .unwrap_or_else(|| other.to_string());
            if reason.to_lowercase().contains("age") {
                Err(DownloadError::AgeRestricted(reason))
            } else {
                Err(DownloadError::Unplayable(reason))
            }
        }
    }
}

/// Prefer an audio/webm stream, fall back to audio/mp4. Within a
/// container, take the highest bitrate. Neither present means there is
/// nothing worth a partial download.
fn choose_audio_stream(
    formats: &[AdaptiveFormat],
) -> Result<(&AdaptiveFormat, &'static str), DownloadError> {
    for (mime_prefix, extension) in [("audio/webm", ".webm"), ("audio/mp4", ".m4a")] {
        let best = formats
            .iter()
            .filter(|f| f.mime_type.starts_with(mime_prefix) && f.url.is_some())
            .max_by_key(|f| f.bitrate.unwrap_or(0));
        if let Some(format) = best {
            return Ok((format, extension));
        }
    }
    Err(DownloadError::NoAudioStream)
}
