//! The persisted track ledger.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// One owned track: its file name in the storage directory and when it
/// was downloaded.
///
/// Serialized keys are `uuid`/`timestamp` — the wire format the
/// original backend persisted, so an existing history file loads
/// unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(rename = "uuid")]
    pub file_name: String,
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Result of one expiry sweep.
#[derive(Debug, Clone, Copy, Default)]
pub struct SweepStats {
    /// Entries still within the retention window.
    pub kept: usize,
    /// Entries dropped from the ledger this sweep.
    pub expired: usize,
    /// Expired entries whose file could not be deleted. The entry is
    /// dropped anyway, so these files are orphaned until manual
    /// cleanup.
    pub delete_failures: usize,
}

/// The source of truth for which files the service still owns.
///
/// The entry set lives in memory behind a lock and is rewritten to the
/// history file after every mutation. A failed write is logged and
/// otherwise ignored: the in-memory state keeps operating, at the cost
/// of losing the update if the process dies before the next successful
/// write.
pub struct HistoryLedger {
    history_file: PathBuf,
    storage_dir: PathBuf,
    retention: Duration,
    entries: Mutex<Vec<HistoryEntry>>,
}

impl HistoryLedger {
    /// Load the ledger from disk. A missing or unreadable history file
    /// initializes an empty ledger rather than failing startup.
    pub async fn load(
        history_file: impl Into<PathBuf>,
        storage_dir: impl Into<PathBuf>,
        retention: std::time::Duration,
    ) -> Self {
        let history_file = history_file.into();

        let entries = match tokio::fs::read(&history_file).await {
            Ok(bytes) => match serde_json::from_slice::<Vec<HistoryEntry>>(&bytes) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(
                        path = %history_file.display(),
                        error = %e,
                        "History file is corrupt, starting with an empty ledger"
                    );
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                warn!(
                    path = %history_file.display(),
                    error = %e,
                    "Failed to read history file, starting with an empty ledger"
                );
                Vec::new()
            }
        };

        info!(entries = entries.len(), "Download history loaded");

        Self {
            history_file,
            storage_dir: storage_dir.into(),
            retention: Duration::from_std(retention).unwrap_or_else(|_| Duration::hours(1)),
            entries: Mutex::new(entries),
        }
    }

    /// Record a freshly downloaded track, stamped now, and persist.
    pub async fn record(&self, file_name: &str) {
        let mut entries = self.entries.lock().await;
        entries.push(HistoryEntry {
            file_name: file_name.to_string(),
            created_at: Utc::now(),
        });
        self.persist(&entries).await;
    }

    /// Drop every entry older than the retention window, deleting its
    /// backing file, then persist the survivors. An entry is dropped
    /// whether or not its file deletion succeeded.
    pub async fn sweep(&self) -> SweepStats {
        let now = Utc::now();
        let mut entries = self.entries.lock().await;

        let (kept, expired): (Vec<HistoryEntry>, Vec<HistoryEntry>) = entries
            .drain(..)
            .partition(|e| now.signed_duration_since(e.created_at) <= self.retention);
        *entries = kept;

        let mut stats = SweepStats {
            kept: entries.len(),
            expired: expired.len(),
            delete_failures: 0,
        };

        for entry in &expired {
            let path = self.storage_dir.join(&entry.file_name);
            match tokio::fs::remove_file(&path).await {
                Ok(()) => debug!(file = %entry.file_name, "Expired track deleted"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    stats.delete_failures += 1;
                    warn!(
                        file = %entry.file_name,
                        error = %e,
                        "Failed to delete expired track, file is now orphaned"
                    );
                }
            }
        }

        if stats.expired > 0 {
            self.persist(&entries).await;
        }

        stats
    }

    /// Snapshot of the current entry set.
    pub async fn entries(&self) -> Vec<HistoryEntry> {
        self.entries.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    /// Rewrite the whole history file. Called with the entry lock held
    /// so writes cannot interleave.
    async fn persist(&self, entries: &[HistoryEntry]) {
        let json = match serde_json::to_vec(entries) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Failed to serialize download history");
                return;
            }
        };
        if let Err(e) = tokio::fs::write(&self.history_file, json).await {
            warn!(
                path = %self.history_file.display(),
                error = %e,
                "Failed to persist download history"
            );
        }
    }
}
