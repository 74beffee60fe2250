//! Types for the video search system.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors inside a search backend. These never cross the `Searcher`
/// trait boundary; they only decide whether the placeholder is used.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("API error: {0}")]
    Api(String),

    #[error("failed to parse search response: {0}")]
    Parse(String),
}

/// One row of a search response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Source video identifier.
    pub id: String,
    pub title: String,
    /// Duration rendered as "M:SS" or "H:MM:SS".
    pub timestamp: String,
    /// Channel name.
    pub author: String,
    /// Relative age as reported by the platform ("6 years ago").
    pub ago: String,
    /// Abbreviated view count ("22M").
    pub views: String,
    /// Duration in seconds.
    pub seconds: u32,
}

impl SearchHit {
    /// The fixed hit returned when the platform search fails or comes
    /// back empty.
    pub fn placeholder() -> Self {
        Self {
            id: "tkzY_VwNIek".to_string(),
            title: "Ween - Ocean Man".to_string(),
            timestamp: "2:08".to_string(),
            author: "Ween".to_string(),
            ago: "6 years ago".to_string(),
            views: "22M".to_string(),
            seconds: 128,
        }
    }
}

/// Trait for search backends. Infallible by contract; the worst
/// possible answer is `vec![SearchHit::placeholder()]`.
#[async_trait]
pub trait Searcher: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    async fn search(&self, query: &str) -> Vec<SearchHit>;
}

/// Render a duration in seconds the way players display it.
pub fn format_timestamp(seconds: u32) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let seconds = seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

/// Abbreviate a view count to one decimal and a magnitude suffix.
pub fn format_view_count(views: u64) -> String {
    const SUFFIXES: [&str; 5] = ["", "K", "M", "B", "T"];

    if views < 1000 {
        return views.to_string();
    }

    let tier = ((views.ilog10() / 3) as usize).min(SUFFIXES.len() - 1);
    let scaled = views as f64 / 1000f64.powi(tier as i32);
    format!("{:.1}{}", scaled, SUFFIXES[tier])
}
