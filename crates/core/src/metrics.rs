//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Download attempts per strategy and outcome
//! - Fallback invocations
//! - Moderation rejections
//! - Expiry sweep activity
//! - Webhook delivery failures

use once_cell::sync::Lazy;
use prometheus::{IntCounter, IntCounterVec, Opts, Registry};

/// Download attempts by strategy and result.
pub static DOWNLOAD_ATTEMPTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("jukebox_download_attempts_total", "Total download attempts"),
        &["strategy", "result"], // result: "success" | "error"
    )
    .unwrap()
});

/// How often the fallback extractor was invoked.
pub static FALLBACK_DOWNLOADS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "jukebox_fallback_downloads_total",
        "Downloads that fell back to the external extractor",
    )
    .unwrap()
});

/// Requests rejected by moderation, by reason.
pub static MODERATION_REJECTIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "jukebox_moderation_rejections_total",
            "Requests rejected by the moderation filter",
        ),
        &["reason"],
    )
    .unwrap()
});

/// Tracks removed by the expiry sweep.
pub static TRACKS_EXPIRED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "jukebox_tracks_expired_total",
        "Tracks dropped by the expiry sweep",
    )
    .unwrap()
});

/// Webhook deliveries that failed.
pub static WEBHOOK_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "jukebox_webhook_failures_total",
        "Webhook deliveries that failed",
    )
    .unwrap()
});

/// Register all core metrics with the given registry.
pub fn register_core_metrics(registry: &Registry) {
    let _ = registry.register(Box::new(DOWNLOAD_ATTEMPTS.clone()));
    let _ = registry.register(Box::new(FALLBACK_DOWNLOADS.clone()));
    let _ = registry.register(Box::new(MODERATION_REJECTIONS.clone()));
    let _ = registry.register(Box::new(TRACKS_EXPIRED.clone()));
    let _ = registry.register(Box::new(WEBHOOK_FAILURES.clone()));
}
