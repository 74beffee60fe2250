//! High-resolution thumbnail existence probe.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Checks whether the source video has a max-resolution thumbnail.
/// Purely informational: the probe can never fail, only answer no.
#[async_trait]
pub trait ThumbnailProbe: Send + Sync {
    async fn has_max_res(&self, video_id: &str) -> bool;
}

pub struct YoutubeThumbnailProbe {
    client: Client,
}

impl YoutubeThumbnailProbe {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");
        Self { client }
    }
}

impl Default for YoutubeThumbnailProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ThumbnailProbe for YoutubeThumbnailProbe {
    async fn has_max_res(&self, video_id: &str) -> bool {
        let url = format!(
            "https://img.youtube.com/vi/{}/maxresdefault.jpg",
            urlencoding::encode(video_id)
        );
        // Anything but a success status, including connection failures,
        // counts as "no thumbnail".
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}
