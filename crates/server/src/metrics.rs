//! Prometheus metrics exposition.
//!
//! Core components define their own metrics in `jukebox_core::metrics`;
//! this module owns the registry and renders the text format for the
//! `/api/v1/metrics` endpoint.

use once_cell::sync::Lazy;
use prometheus::{Encoder, Registry, TextEncoder};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    jukebox_core::metrics::register_core_metrics(&registry);
    registry
});

/// Render all registered metrics in the Prometheus text format.
pub fn render() -> String {
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
