//! Download history and expiry.
//!
//! Every successfully downloaded track is recorded in a persisted,
//! time-stamped ledger. A background sweeper periodically drops entries
//! older than the retention window and deletes their files, keeping
//! disk usage bounded.

mod ledger;
mod sweeper;

pub use ledger::{HistoryEntry, HistoryLedger, SweepStats};
pub use sweeper::HistorySweeper;
