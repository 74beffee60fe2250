//! Orchestrator lifecycle integration tests.
//!
//! These tests verify the complete request protocol through the
//! orchestrator: moderation -> primary retries -> fallback -> ledger
//! recording -> notification.

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use jukebox_core::{
    testing::{MockDownloader, MockNotifier, MockThumbnailProbe},
    AcquireError, DownloadError, DownloadOrchestrator, HistoryLedger, ModerationConfig,
    ModerationFilter, OrchestratorConfig, ProxyPool, PublicConfig, RejectReason, TrackRequest,
};

/// Test helper wiring the orchestrator to mocks and a temp ledger.
struct TestHarness {
    primary: Arc<MockDownloader>,
    fallback: Arc<MockDownloader>,
    notifier: Arc<MockNotifier>,
    thumbnails: Arc<MockThumbnailProbe>,
    ledger: Arc<HistoryLedger>,
    _temp_dir: TempDir,
}

impl TestHarness {
    async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let storage = temp_dir.path().to_path_buf();

        let ledger = Arc::new(
            HistoryLedger::load(
                storage.join("history.json"),
                &storage,
                Duration::from_secs(3600),
            )
            .await,
        );

        Self {
            primary: Arc::new(MockDownloader::new("mock-primary", &storage)),
            fallback: Arc::new(MockDownloader::new("mock-fallback", &storage)),
            notifier: Arc::new(MockNotifier::new()),
            thumbnails: Arc::new(MockThumbnailProbe::new(true)),
            ledger,
            _temp_dir: temp_dir,
        }
    }

    fn orchestrator(
        &self,
        retries: u32,
        use_proxies: bool,
        use_fallback: bool,
    ) -> DownloadOrchestrator {
        let config = OrchestratorConfig {
            retries,
            use_proxies,
            use_fallback,
            public: PublicConfig {
                endpoint: "http://radio.example.com".to_string(),
                port: 3045,
            },
        };

        let filter = ModerationFilter::new(&ModerationConfig {
            banned_terms: vec!["idiot".to_string()],
            banned_accounts: vec!["banned-account".to_string()],
        });

        let proxies = ProxyPool::new(&[
            "direct".to_string(),
            "http://a:1".to_string(),
            "http://b:2".to_string(),
        ])
        .unwrap();

        DownloadOrchestrator::new(
            config,
            filter,
            proxies,
            Arc::clone(&self.primary) as Arc<dyn jukebox_core::AudioDownloader>,
            Arc::clone(&self.fallback) as Arc<dyn jukebox_core::AudioDownloader>,
            Arc::clone(&self.thumbnails) as Arc<dyn jukebox_core::ThumbnailProbe>,
            Arc::clone(&self.ledger),
            Arc::clone(&self.notifier) as Arc<dyn jukebox_core::Notifier>,
        )
    }
}

fn request() -> TrackRequest {
    TrackRequest {
        video_id: "tkzY_VwNIek".to_string(),
        title: "Ween - Ocean Man".to_string(),
        server_name: "EU West 3".to_string(),
        account_id: "account01".to_string(),
        display_name: Some("Some Player".to_string()),
        webhook_url: None,
    }
}

#[tokio::test]
async fn test_success_yields_servable_url_and_ledger_entry() {
    let harness = TestHarness::new().await;
    let orchestrator = harness.orchestrator(0, false, true);

    let track = orchestrator.download(&request()).await.unwrap();

    assert!(!track.file_name.is_empty());
    assert_eq!(
        track.url,
        format!("http://radio.example.com:3045/{}", track.file_name)
    );
    assert!(track.max_res);
    assert!(track.proxy.is_none());

    let entries = harness.ledger.entries().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].file_name, track.file_name);

    assert_eq!(harness.primary.call_count().await, 1);
    assert_eq!(harness.fallback.call_count().await, 0);
    assert_eq!(harness.thumbnails.probed().await, vec!["tkzY_VwNIek"]);
}

#[tokio::test]
async fn test_banned_account_rejected_before_any_attempt() {
    let harness = TestHarness::new().await;
    let orchestrator = harness.orchestrator(2, false, true);

    let mut req = request();
    req.account_id = "banned-account".to_string();

    let failure = orchestrator.download(&req).await.unwrap_err();
    assert!(matches!(
        failure.error,
        AcquireError::PolicyRejection(RejectReason::BannedAccount)
    ));

    assert_eq!(harness.primary.call_count().await, 0);
    assert_eq!(harness.fallback.call_count().await, 0);
    assert!(harness.ledger.is_empty().await);
}

#[tokio::test]
async fn test_banned_title_rejected_before_any_attempt() {
    let harness = TestHarness::new().await;
    let orchestrator = harness.orchestrator(0, false, true);

    let mut req = request();
    req.title = "This is an IDIOT video".to_string();

    let failure = orchestrator.download(&req).await.unwrap_err();
    assert!(matches!(
        failure.error,
        AcquireError::PolicyRejection(RejectReason::BannedTitle)
    ));
    assert_eq!(harness.primary.call_count().await, 0);
}

#[tokio::test]
async fn test_retries_exhausted_then_fallback_invoked_once() {
    let harness = TestHarness::new().await;
    let orchestrator = harness.orchestrator(2, false, true);

    harness.primary.push_failures(3).await;

    let track = orchestrator.download(&request()).await.unwrap();

    assert_eq!(harness.primary.call_count().await, 3);
    assert_eq!(harness.fallback.call_count().await, 1);
    assert!(!track.file_name.is_empty());
}

#[tokio::test]
async fn test_age_restriction_short_circuits_retries() {
    let harness = TestHarness::new().await;
    let orchestrator = harness.orchestrator(2, false, true);

    harness
        .primary
        .push_outcome(Err(DownloadError::AgeRestricted(
            "Sign in to confirm your age".to_string(),
        )))
        .await;

    let track = orchestrator.download(&request()).await.unwrap();

    // No further primary attempts after the age gate; straight to the
    // fallback.
    assert_eq!(harness.primary.call_count().await, 1);
    assert_eq!(harness.fallback.call_count().await, 1);
    assert!(!track.file_name.is_empty());
}

#[tokio::test]
async fn test_fallback_disabled_surfaces_last_primary_error() {
    let harness = TestHarness::new().await;
    let orchestrator = harness.orchestrator(0, false, false);

    harness.primary.push_failures(1).await;

    let failure = orchestrator.download(&request()).await.unwrap_err();
    assert!(matches!(
        failure.error,
        AcquireError::Download(DownloadError::Transfer(_))
    ));
    assert_eq!(harness.fallback.call_count().await, 0);
    assert!(harness.ledger.is_empty().await);
}

#[tokio::test]
async fn test_both_strategies_failing_yields_fallback_error() {
    let harness = TestHarness::new().await;
    let orchestrator = harness.orchestrator(0, false, true);

    harness.primary.push_failures(1).await;
    harness
        .fallback
        .push_outcome(Err(DownloadError::Extractor(
            "ERROR: Video unavailable".to_string(),
        )))
        .await;

    let failure = orchestrator.download(&request()).await.unwrap_err();
    assert!(matches!(
        failure.error,
        AcquireError::Download(DownloadError::Extractor(_))
    ));
    assert!(harness.ledger.is_empty().await);
    assert_eq!(harness.notifier.announcement_count().await, 0);
}

#[tokio::test]
async fn test_each_attempt_consumes_one_proxy_rotation() {
    let harness = TestHarness::new().await;
    let orchestrator = harness.orchestrator(2, true, true);

    harness.primary.push_failures(3).await;

    let track = orchestrator.download(&request()).await.unwrap();

    let primary_proxies: Vec<String> = harness
        .primary
        .recorded()
        .await
        .into_iter()
        .map(|c| c.proxy)
        .collect();
    assert_eq!(primary_proxies, vec!["direct", "http://a:1", "http://b:2"]);

    // The fallback gets one more rotation, wrapping around the pool.
    let fallback_proxies: Vec<String> = harness
        .fallback
        .recorded()
        .await
        .into_iter()
        .map(|c| c.proxy)
        .collect();
    assert_eq!(fallback_proxies, vec!["direct"]);
    assert_eq!(track.proxy.as_deref(), Some("direct"));
}

#[tokio::test]
async fn test_storage_ids_are_unique_across_downloads() {
    let harness = TestHarness::new().await;
    let orchestrator = harness.orchestrator(0, false, true);

    let first = orchestrator.download(&request()).await.unwrap();
    let second = orchestrator.download(&request()).await.unwrap();

    assert_ne!(first.file_name, second.file_name);
    assert_eq!(harness.ledger.len().await, 2);
}

#[tokio::test]
async fn test_webhook_announced_only_when_target_supplied() {
    let harness = TestHarness::new().await;
    let orchestrator = harness.orchestrator(0, false, true);

    // No webhook target: no announcement.
    orchestrator.download(&request()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(harness.notifier.announcement_count().await, 0);

    // With a target the detached dispatch fires.
    let mut req = request();
    req.webhook_url = Some("http://hooks.example.com/server".to_string());
    orchestrator.download(&req).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let announcements = harness.notifier.announcements().await;
    assert_eq!(announcements.len(), 1);
    assert_eq!(announcements[0].account_id, "account01");
    assert_eq!(announcements[0].display_name, "Some Player");
    assert_eq!(announcements[0].title, "Ween - Ocean Man");
    assert_eq!(
        announcements[0].extra_webhook.as_deref(),
        Some("http://hooks.example.com/server")
    );
}

#[tokio::test]
async fn test_missing_display_name_announces_empty_string() {
    let harness = TestHarness::new().await;
    let orchestrator = harness.orchestrator(0, false, true);

    let mut req = request();
    req.display_name = None;
    req.webhook_url = Some("http://hooks.example.com/server".to_string());

    orchestrator.download(&req).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let announcements = harness.notifier.announcements().await;
    assert_eq!(announcements.len(), 1);
    assert_eq!(announcements[0].display_name, "");
}
