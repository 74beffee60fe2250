use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jukebox_core::{
    load_config, validate_config, AudioDownloader, DownloadOrchestrator, HistoryLedger,
    HistorySweeper, InnertubeDownloader, ModerationFilter, Notifier, OrchestratorConfig,
    ProxyPool, Searcher, ThumbnailProbe, WebhookNotifier, YoutubeSearcher,
    YoutubeThumbnailProbe, YtDlpDownloader,
};

use jukebox_server::api::create_router;
use jukebox_server::state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("JUKEBOX_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!(version = VERSION, "Configuration loaded successfully");
    info!("Storage directory: {:?}", config.storage.dir);
    info!(
        "Proxy rotation: {}",
        if config.proxy.enabled { "enabled" } else { "disabled" }
    );

    // Compute config hash for startup logging
    let config_json = serde_json::to_string(&config).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    info!(config_hash = &config_hash[..16], "Effective configuration");

    // Create the managed storage directory. This is the one startup
    // fault we cannot run without.
    std::fs::create_dir_all(&config.storage.dir).with_context(|| {
        format!(
            "Failed to create storage directory {:?}",
            config.storage.dir
        )
    })?;

    // Load the download history and start the expiry sweeper
    let ledger = Arc::new(
        HistoryLedger::load(
            &config.storage.history_file,
            &config.storage.dir,
            Duration::from_secs(config.storage.retention_secs),
        )
        .await,
    );

    let sweeper = HistorySweeper::new(
        Arc::clone(&ledger),
        Duration::from_secs(config.storage.sweep_interval_secs),
    );
    sweeper.start();

    // Moderation filter
    let filter = ModerationFilter::new(&config.moderation);
    info!(
        banned_terms = config.moderation.banned_terms.len(),
        banned_accounts = config.moderation.banned_accounts.len(),
        "Moderation filter initialized"
    );

    // Proxy pool. An empty list is only possible with rotation
    // disabled; the pool still needs one slot to exist.
    let proxy_endpoints = if config.proxy.endpoints.is_empty() {
        vec!["direct".to_string()]
    } else {
        config.proxy.endpoints.clone()
    };
    let proxies = ProxyPool::new(&proxy_endpoints).context("Failed to create proxy pool")?;

    // Download strategies
    let download_timeout = Duration::from_secs(config.download.timeout_secs);
    let primary: Arc<dyn AudioDownloader> = Arc::new(InnertubeDownloader::new(
        &config.storage.dir,
        download_timeout,
    ));
    let fallback: Arc<dyn AudioDownloader> = Arc::new(YtDlpDownloader::new(
        config.download.ytdlp_path.clone(),
        &config.storage.dir,
        config.download.cookies_file.clone(),
        download_timeout,
    ));

    let thumbnails: Arc<dyn ThumbnailProbe> = Arc::new(YoutubeThumbnailProbe::new());
    let notifier: Arc<dyn Notifier> =
        Arc::new(WebhookNotifier::new(config.notify.global_webhook.clone()));

    // Orchestrator
    let orchestrator = DownloadOrchestrator::new(
        OrchestratorConfig::from(&config),
        filter,
        proxies,
        primary,
        fallback,
        thumbnails,
        Arc::clone(&ledger),
        notifier,
    );
    info!("Download orchestrator initialized");

    // Searcher
    let searcher: Arc<dyn Searcher> = Arc::new(YoutubeSearcher::default());

    // Create app state and router
    let storage_dir = config.storage.dir.clone();
    let state = Arc::new(AppState::new(config.clone(), orchestrator, searcher));
    let app = create_router(state, &storage_dir);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    sweeper.stop();

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
