//! Download orchestration.
//!
//! Composes the moderation filter, proxy pool, download strategies,
//! history ledger and notifier into the per-request protocol:
//! moderate, retry the primary strategy, fall back, record, announce.

mod runner;
mod types;

pub use runner::DownloadOrchestrator;
pub use types::*;
