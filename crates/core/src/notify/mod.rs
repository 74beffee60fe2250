//! Webhook notifications for completed downloads.
//!
//! Deliveries are fire-and-forget: the orchestrator spawns them
//! detached from the request path, and a failed delivery is logged and
//! counted, never surfaced to the requester.

mod webhook;

pub use webhook::WebhookNotifier;

use async_trait::async_trait;

/// Everything a notification needs to describe one completed download.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackAnnouncement {
    pub account_id: String,
    pub display_name: String,
    pub title: String,
    pub video_id: String,
    pub server_name: String,
    /// Caller-supplied webhook, delivered in addition to the configured
    /// global one.
    pub extra_webhook: Option<String>,
}

/// Notification sink. Implementations log their own failures; callers
/// get no channel back.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn announce(&self, announcement: &TrackAnnouncement);
}
