use std::sync::Arc;
use std::time::Duration;

use jukebox_core::{Config, DownloadOrchestrator, SanitizedConfig, Searcher};

/// Shared application state
pub struct AppState {
    config: Config,
    orchestrator: DownloadOrchestrator,
    searcher: Arc<dyn Searcher>,
    /// Client used for the playlist relay.
    relay_client: reqwest::Client,
}

impl AppState {
    pub fn new(
        config: Config,
        orchestrator: DownloadOrchestrator,
        searcher: Arc<dyn Searcher>,
    ) -> Self {
        let relay_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            orchestrator,
            searcher,
            relay_client,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn orchestrator(&self) -> &DownloadOrchestrator {
        &self.orchestrator
    }

    pub fn searcher(&self) -> &dyn Searcher {
        self.searcher.as_ref()
    }

    pub fn playlist_upstream(&self) -> Option<&str> {
        self.config.playlist.upstream_url.as_deref()
    }

    pub fn relay_client(&self) -> &reqwest::Client {
        &self.relay_client
    }
}
