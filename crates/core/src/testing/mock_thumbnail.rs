//! Mock thumbnail probe for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

use crate::downloader::ThumbnailProbe;

/// Answers a fixed yes/no and records which ids were probed.
pub struct MockThumbnailProbe {
    answer: AtomicBool,
    probed: Mutex<Vec<String>>,
}

impl MockThumbnailProbe {
    pub fn new(answer: bool) -> Self {
        Self {
            answer: AtomicBool::new(answer),
            probed: Mutex::new(Vec::new()),
        }
    }

    pub fn set_answer(&self, answer: bool) {
        self.answer.store(answer, Ordering::SeqCst);
    }

    pub async fn probed(&self) -> Vec<String> {
        self.probed.lock().await.clone()
    }
}

impl Default for MockThumbnailProbe {
    fn default() -> Self {
        Self::new(false)
    }
}

#[async_trait]
impl ThumbnailProbe for MockThumbnailProbe {
    async fn has_max_res(&self, video_id: &str) -> bool {
        self.probed.lock().await.push(video_id.to_string());
        self.answer.load(Ordering::SeqCst)
    }
}
