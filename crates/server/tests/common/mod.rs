//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that creates an in-process
//! server with mock dependencies injected, enabling comprehensive E2E
//! testing without network access or an extractor binary.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use jukebox_core::{
    testing::{MockDownloader, MockNotifier, MockSearcher, MockThumbnailProbe},
    Config, DownloadConfig, DownloadOrchestrator, HistoryLedger, ModerationConfig,
    ModerationFilter, OrchestratorConfig, ProxyPool, PublicConfig, StorageConfig,
};
use jukebox_server::api::create_router;
use jukebox_server::state::AppState;

/// Test fixture for E2E testing with mock dependencies.
///
/// Provides an in-process server with fully controllable mocks for
/// both download strategies, the searcher, the thumbnail probe and the
/// notifier, plus a real ledger and storage directory under a temp
/// dir.
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock primary strategy - script failures per attempt
    pub primary: Arc<MockDownloader>,
    /// Mock fallback strategy
    pub fallback: Arc<MockDownloader>,
    /// Mock searcher - configure search results
    pub searcher: Arc<MockSearcher>,
    /// Mock notifier - records webhook announcements
    pub notifier: Arc<MockNotifier>,
    /// Real ledger backed by a temp history file
    pub ledger: Arc<HistoryLedger>,
    /// Directory downloads land in
    pub storage_dir: PathBuf,
    /// Temp dir holding storage and history
    pub temp_dir: TempDir,
}

/// Knobs for fixture construction.
pub struct TestConfig {
    pub retries: u32,
    pub use_fallback: bool,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            retries: 0,
            use_fallback: true,
        }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with default mocks.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom download configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let storage_dir = temp_dir.path().join("tracks");
        std::fs::create_dir_all(&storage_dir).expect("Failed to create storage dir");

        let config = Config {
            public: PublicConfig {
                endpoint: "http://radio.example.com".to_string(),
                port: 3045,
            },
            storage: StorageConfig {
                dir: storage_dir.clone(),
                history_file: temp_dir.path().join("history.json"),
                ..Default::default()
            },
            download: DownloadConfig {
                retries: test_config.retries,
                use_fallback: test_config.use_fallback,
                ..Default::default()
            },
            moderation: ModerationConfig {
                banned_terms: vec!["idiot".to_string()],
                banned_accounts: vec!["banned-account".to_string()],
            },
            ..Default::default()
        };

        let ledger = Arc::new(
            HistoryLedger::load(
                &config.storage.history_file,
                &storage_dir,
                Duration::from_secs(config.storage.retention_secs),
            )
            .await,
        );

        let primary = Arc::new(MockDownloader::new("mock-primary", &storage_dir));
        let fallback = Arc::new(MockDownloader::new("mock-fallback", &storage_dir));
        let searcher = Arc::new(MockSearcher::new());
        let notifier = Arc::new(MockNotifier::new());
        let thumbnails = Arc::new(MockThumbnailProbe::new(true));

        let orchestrator = DownloadOrchestrator::new(
            OrchestratorConfig::from(&config),
            ModerationFilter::new(&config.moderation),
            ProxyPool::new(&["direct".to_string()]).expect("Failed to create proxy pool"),
            Arc::clone(&primary) as Arc<dyn jukebox_core::AudioDownloader>,
            Arc::clone(&fallback) as Arc<dyn jukebox_core::AudioDownloader>,
            thumbnails as Arc<dyn jukebox_core::ThumbnailProbe>,
            Arc::clone(&ledger),
            Arc::clone(&notifier) as Arc<dyn jukebox_core::Notifier>,
        );

        let state = Arc::new(AppState::new(
            config,
            orchestrator,
            Arc::clone(&searcher) as Arc<dyn jukebox_core::Searcher>,
        ));

        let router = create_router(state, &storage_dir);

        Self {
            router,
            primary,
            fallback,
            searcher,
            notifier,
            ledger,
            storage_dir,
            temp_dir,
        }
    }

    /// Send a GET request to the test server.
    #[allow(dead_code)]
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    #[allow(dead_code)]
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a GET request and return the raw body bytes.
    #[allow(dead_code)]
    pub async fn get_raw(&self, path: &str) -> (StatusCode, Vec<u8>) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();
        (status, bytes.to_vec())
    }

    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        let request = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                builder
                    .body(Body::from(json.to_string()))
                    .expect("Failed to build request")
            }
            None => builder.body(Body::empty()).expect("Failed to build request"),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}
