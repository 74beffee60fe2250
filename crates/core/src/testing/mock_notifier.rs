//! Mock notifier for testing.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::notify::{Notifier, TrackAnnouncement};

/// Records every announcement instead of delivering it.
#[derive(Default)]
pub struct MockNotifier {
    announcements: Mutex<Vec<TrackAnnouncement>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn announcements(&self) -> Vec<TrackAnnouncement> {
        self.announcements.lock().await.clone()
    }

    pub async fn announcement_count(&self) -> usize {
        self.announcements.lock().await.len()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn announce(&self, announcement: &TrackAnnouncement) {
        self.announcements.lock().await.push(announcement.clone());
    }
}
