//! Audio download strategies.
//!
//! This module provides an `AudioDownloader` trait with two
//! implementations: a native client against the platform's player API
//! (primary), and a fallback that shells out to the external `yt-dlp`
//! extractor.

mod innertube;
mod thumbnail;
mod types;
mod ytdlp;

pub use innertube::InnertubeDownloader;
pub use thumbnail::{ThumbnailProbe, YoutubeThumbnailProbe};
pub use types::*;
pub use ytdlp::YtDlpDownloader;

use std::path::Path;

/// Best-effort removal of a partially written file. "Already absent"
/// is not a failure.
pub(crate) async fn remove_partial(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to clean up partial file");
        }
    }
}
