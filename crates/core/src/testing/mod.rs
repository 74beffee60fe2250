//! Mock implementations for testing.
//!
//! These mocks let orchestrator and server tests run without network
//! access, an extractor binary, or a real webhook target.

mod mock_downloader;
mod mock_notifier;
mod mock_searcher;
mod mock_thumbnail;

pub use mock_downloader::{MockDownloader, RecordedDownload};
pub use mock_notifier::MockNotifier;
pub use mock_searcher::MockSearcher;
pub use mock_thumbnail::MockThumbnailProbe;
