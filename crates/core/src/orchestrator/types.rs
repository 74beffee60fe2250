//! Types for the download orchestrator.

use thiserror::Error;

use crate::config::{Config, PublicConfig};
use crate::downloader::DownloadError;
use crate::moderation::RejectReason;

/// A request to fetch a track, as received from a game server.
/// Immutable once received.
#[derive(Debug, Clone)]
pub struct TrackRequest {
    /// Source video identifier.
    pub video_id: String,
    /// Title as declared by the requester; moderated, not verified.
    pub title: String,
    /// Name of the originating game server.
    pub server_name: String,
    /// Opaque account identifier of the requester.
    pub account_id: String,
    /// Display name of the requester, if known.
    pub display_name: Option<String>,
    /// Webhook to announce this download to, if any.
    pub webhook_url: Option<String>,
}

/// Successful terminal outcome of a request.
#[derive(Debug, Clone)]
pub struct AcquiredTrack {
    /// Unique file name inside the storage directory.
    pub file_name: String,
    /// Externally addressable URL of the stored file.
    pub url: String,
    /// Whether the source video has a max-resolution thumbnail.
    pub max_res: bool,
    /// Proxy slot the winning attempt was routed through, if rotation
    /// was enabled.
    pub proxy: Option<String>,
}

/// Failed terminal outcome of a request.
#[derive(Debug)]
pub struct AcquireFailure {
    pub error: AcquireError,
    /// Proxy slot of the last attempt, if rotation was enabled.
    pub proxy: Option<String>,
}

/// Why a request produced no track.
#[derive(Debug, Error)]
pub enum AcquireError {
    /// Rejected by the moderation filter before any download work.
    #[error("rejected by policy: {0}")]
    PolicyRejection(RejectReason),

    /// Every configured strategy failed; carries the last error.
    #[error(transparent)]
    Download(#[from] DownloadError),
}

/// Orchestrator knobs, extracted from the relevant config sections.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Extra primary-strategy attempts after the first failure.
    pub retries: u32,
    /// Whether a proxy is rotated in for every attempt.
    pub use_proxies: bool,
    /// Whether the fallback strategy runs after the primary is
    /// exhausted.
    pub use_fallback: bool,
    /// Public address used to compose result URLs.
    pub public: PublicConfig,
}

impl From<&Config> for OrchestratorConfig {
    fn from(config: &Config) -> Self {
        Self {
            retries: config.download.retries,
            use_proxies: config.proxy.enabled,
            use_fallback: config.download.use_fallback,
            public: config.public.clone(),
        }
    }
}
