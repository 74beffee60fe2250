//! Download orchestrator implementation.
//!
//! One call per incoming request, independent of and concurrent with
//! any other in-flight request. The only state shared between requests
//! is the proxy cursor and the history ledger, both safe under
//! concurrent callers.

use std::sync::Arc;

use tracing::{info, warn};

use crate::downloader::{AudioDownloader, DownloadError, DownloadedAudio, ThumbnailProbe};
use crate::history::HistoryLedger;
use crate::metrics;
use crate::moderation::{ModerationFilter, RejectReason};
use crate::notify::{Notifier, TrackAnnouncement};
use crate::proxy::{ProxyEndpoint, ProxyPool};

use super::types::{
    AcquireError, AcquireFailure, AcquiredTrack, OrchestratorConfig, TrackRequest,
};

pub struct DownloadOrchestrator {
    config: OrchestratorConfig,
    filter: ModerationFilter,
    proxies: ProxyPool,
    primary: Arc<dyn AudioDownloader>,
    fallback: Arc<dyn AudioDownloader>,
    thumbnails: Arc<dyn ThumbnailProbe>,
    ledger: Arc<HistoryLedger>,
    notifier: Arc<dyn Notifier>,
}

impl DownloadOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: OrchestratorConfig,
        filter: ModerationFilter,
        proxies: ProxyPool,
        primary: Arc<dyn AudioDownloader>,
        fallback: Arc<dyn AudioDownloader>,
        thumbnails: Arc<dyn ThumbnailProbe>,
        ledger: Arc<HistoryLedger>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            filter,
            proxies,
            primary,
            fallback,
            thumbnails,
            ledger,
            notifier,
        }
    }

    /// Run the full protocol for one request: moderate, retry the
    /// primary strategy, fall back once, then record and announce the
    /// winner.
    pub async fn download(&self, request: &TrackRequest) -> Result<AcquiredTrack, AcquireFailure> {
        if self.filter.is_account_banned(&request.account_id) {
            info!(
                account_id = %request.account_id,
                server = %request.server_name,
                title = %request.title,
                "Blocked account"
            );
            return Err(self.reject(RejectReason::BannedAccount));
        }

        if self.filter.is_title_banned(&request.title) {
            info!(
                account_id = %request.account_id,
                server = %request.server_name,
                title = %request.title,
                "Blocked title"
            );
            return Err(self.reject(RejectReason::BannedTitle));
        }

        let mut last: Option<(DownloadError, Option<String>)> = None;

        let attempts = self.config.retries + 1;
        for attempt in 1..=attempts {
            let (proxy, proxy_label) = self.rotate();
            match self.primary.download(&request.video_id, &proxy).await {
                Ok(audio) => {
                    metrics::DOWNLOAD_ATTEMPTS
                        .with_label_values(&[self.primary.name(), "success"])
                        .inc();
                    return Ok(self.finish(request, audio, proxy_label).await);
                }
                Err(e) => {
                    metrics::DOWNLOAD_ATTEMPTS
                        .with_label_values(&[self.primary.name(), "error"])
                        .inc();
                    warn!(
                        video_id = %request.video_id,
                        attempt = attempt,
                        attempts = attempts,
                        error = %e,
                        "Primary download attempt failed"
                    );
                    // No amount of retrying or proxy switching gets past
                    // an age gate.
                    let abort = matches!(e, DownloadError::AgeRestricted(_));
                    last = Some((e, proxy_label));
                    if abort {
                        break;
                    }
                }
            }
        }

        if self.config.use_fallback {
            metrics::FALLBACK_DOWNLOADS.inc();
            let (proxy, proxy_label) = self.rotate();
            info!(
                video_id = %request.video_id,
                title = %request.title,
                "Primary strategy exhausted, trying fallback"
            );
            match self.fallback.download(&request.video_id, &proxy).await {
                Ok(audio) => {
                    metrics::DOWNLOAD_ATTEMPTS
                        .with_label_values(&[self.fallback.name(), "success"])
                        .inc();
                    return Ok(self.finish(request, audio, proxy_label).await);
                }
                Err(e) => {
                    metrics::DOWNLOAD_ATTEMPTS
                        .with_label_values(&[self.fallback.name(), "error"])
                        .inc();
                    warn!(
                        video_id = %request.video_id,
                        error = %e,
                        "Fallback download failed"
                    );
                    last = Some((e, proxy_label));
                }
            }
        }

        let (error, proxy) = last.expect("at least one download attempt is always made");
        Err(AcquireFailure {
            error: error.into(),
            proxy,
        })
    }

    fn reject(&self, reason: RejectReason) -> AcquireFailure {
        metrics::MODERATION_REJECTIONS
            .with_label_values(&[reason.as_str()])
            .inc();
        AcquireFailure {
            error: AcquireError::PolicyRejection(reason),
            proxy: None,
        }
    }

    /// One rotation per attempt when proxying is enabled; the reserved
    /// direct slot passes through as a plain direct connection.
    fn rotate(&self) -> (ProxyEndpoint, Option<String>) {
        if self.config.use_proxies {
            let endpoint = self.proxies.next().clone();
            let label = endpoint.to_string();
            (endpoint, Some(label))
        } else {
            (ProxyEndpoint::Direct, None)
        }
    }

    async fn finish(
        &self,
        request: &TrackRequest,
        audio: DownloadedAudio,
        proxy: Option<String>,
    ) -> AcquiredTrack {
        let max_res = self.thumbnails.has_max_res(&request.video_id).await;

        self.ledger.record(&audio.file_name).await;

        info!(
            title = %request.title,
            server = %request.server_name,
            account_id = %request.account_id,
            file = %audio.file_name,
            "Download complete"
        );

        if let Some(webhook) = &request.webhook_url {
            let notifier = Arc::clone(&self.notifier);
            let announcement = TrackAnnouncement {
                account_id: request.account_id.clone(),
                display_name: request.display_name.clone().unwrap_or_default(),
                title: request.title.clone(),
                video_id: request.video_id.clone(),
                server_name: request.server_name.clone(),
                extra_webhook: Some(webhook.clone()),
            };
            // Detached from the request path: a slow or failing webhook
            // never delays or fails the response.
            tokio::spawn(async move {
                notifier.announce(&announcement).await;
            });
        }

        let url = format!(
            "{}:{}/{}",
            self.config.public.endpoint, self.config.public.port, audio.file_name
        );

        AcquiredTrack {
            file_name: audio.file_name,
            url,
            max_res,
            proxy,
        }
    }
}
