//! Webhook message construction and delivery.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::metrics;

use super::{Notifier, TrackAnnouncement};

const WATCH_URL_PREFIX: &str = "https://www.youtube.com/watch?v=";

/// Accent color of the embed.
const EMBED_COLOR: u32 = 5_439_356;

/// "Suppress notifications" message flag: the embed shows up in the
/// channel without pinging anyone.
const MESSAGE_FLAGS: u32 = 4096;

#[derive(Debug, Serialize)]
struct EmbedFooter {
    text: String,
}

#[derive(Debug, Serialize)]
struct Embed {
    description: String,
    color: u32,
    footer: EmbedFooter,
}

#[derive(Debug, Serialize)]
struct WebhookMessage {
    content: Option<serde_json::Value>,
    embeds: Vec<Embed>,
    attachments: Vec<String>,
    flags: u32,
}

/// Delivers track announcements to the configured global webhook and
/// any per-request target. Deliveries are independent; one failing
/// does not stop the other, and neither is retried.
pub struct WebhookNotifier {
    client: Client,
    global_webhook: Option<String>,
}

impl WebhookNotifier {
    pub fn new(global_webhook: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            global_webhook,
        }
    }

    async fn deliver(&self, url: &str, message: &WebhookMessage) {
        // Webhook URLs embed tokens, so they stay out of the logs.
        match self.client.post(url).json(message).send().await {
            Ok(response) if response.status().is_success() => {
                debug!("Webhook delivered");
            }
            Ok(response) => {
                metrics::WEBHOOK_FAILURES.inc();
                warn!(status = %response.status(), "Webhook delivery rejected");
            }
            Err(e) => {
                metrics::WEBHOOK_FAILURES.inc();
                warn!(error = %e, "Webhook delivery failed");
            }
        }
    }
}

fn build_message(announcement: &TrackAnnouncement) -> WebhookMessage {
    WebhookMessage {
        content: None,
        embeds: vec![Embed {
            description: format!(
                "**[{}] {}** - [{}]({}{})",
                announcement.account_id,
                announcement.display_name,
                announcement.title,
                WATCH_URL_PREFIX,
                announcement.video_id,
            ),
            color: EMBED_COLOR,
            footer: EmbedFooter {
                text: announcement.server_name.clone(),
            },
        }],
        attachments: Vec::new(),
        flags: MESSAGE_FLAGS,
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn announce(&self, announcement: &TrackAnnouncement) {
        let message = build_message(announcement);

        if let Some(url) = &self.global_webhook {
            self.deliver(url, &message).await;
        }
        if let Some(url) = &announcement.extra_webhook {
            self.deliver(url, &message).await;
        }
    }
}
