//! Search backend over the platform's internal search API.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

use super::types::{format_timestamp, format_view_count, SearchError, SearchHit, Searcher};

const SEARCH_ENDPOINT: &str = "https://www.youtube.com/youtubei/v1/search?prettyPrint=false";

// Web client profile for the search endpoint.
const CLIENT_NAME: &str = "WEB";
const CLIENT_VERSION: &str = "2.20240304.00.00";

/// Filter parameter restricting results to videos.
const VIDEOS_ONLY_PARAMS: &str = "EgIQAQ%3D%3D";

pub struct YoutubeSearcher {
    client: Client,
}

impl YoutubeSearcher {
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");
        Self { client }
    }

    async fn try_search(&self, query: &str) -> Result<Vec<SearchHit>, SearchError> {
        let body = json!({
            "context": {
                "client": {
                    "clientName": CLIENT_NAME,
                    "clientVersion": CLIENT_VERSION,
                    "hl": "en",
                }
            },
            "query": query,
            "params": VIDEOS_ONLY_PARAMS,
        });

        let response = self
            .client
            .post(SEARCH_ENDPOINT)
            .json(&body)
            .send()
            .await
            .map_err(|e| SearchError::Api(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SearchError::Api(format!(
                "search API returned HTTP {}",
                response.status()
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| SearchError::Parse(e.to_string()))?;

        Ok(parse_results(&payload))
    }
}

impl Default for YoutubeSearcher {
    fn default() -> Self {
        Self::new(Duration::from_secs(15))
    }
}

#[async_trait]
impl Searcher for YoutubeSearcher {
    fn name(&self) -> &str {
        "youtube"
    }

    async fn search(&self, query: &str) -> Vec<SearchHit> {
        match self.try_search(query).await {
            Ok(hits) if !hits.is_empty() => hits,
            Ok(_) => {
                debug!(query = query, "Search returned no results, using placeholder");
                vec![SearchHit::placeholder()]
            }
            Err(e) => {
                warn!(query = query, error = %e, "Search failed, using placeholder");
                vec![SearchHit::placeholder()]
            }
        }
    }
}

/// Walk the deeply nested search response and collect every video
/// renderer. Entries without a parseable duration (live streams,
/// premieres) are skipped.
fn parse_results(payload: &Value) -> Vec<SearchHit> {
    let mut hits = Vec::new();

    let sections = payload
        .pointer("/contents/twoColumnSearchResultsRenderer/primaryContents/sectionListRenderer/contents")
        .and_then(Value::as_array);

    let Some(sections) = sections else {
        return hits;
    };

    for section in sections {
        let Some(items) = section
            .pointer("/itemSectionRenderer/contents")
            .and_then(Value::as_array)
        else {
            continue;
        };

        for item in items {
            let Some(video) = item.get("videoRenderer") else {
                continue;
            };
            if let Some(hit) = parse_video(video) {
                hits.push(hit);
            }
        }
    }

    hits
}

fn parse_video(video: &Value) -> Option<SearchHit> {
    let id = video.get("videoId")?.as_str()?.to_string();
    let title = video
        .pointer("/title/runs/0/text")?
        .as_str()?
        .to_string();

    let seconds = parse_duration(video.pointer("/lengthText/simpleText")?.as_str()?)?;
    if seconds == 0 {
        return None;
    }

    let author = video
        .pointer("/ownerText/runs/0/text")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let ago = video
        .pointer("/publishedTimeText/simpleText")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let views = video
        .pointer("/viewCountText/simpleText")
        .and_then(Value::as_str)
        .map(|text| format_view_count(parse_view_count(text)))
        .unwrap_or_default();

    Some(SearchHit {
        id,
        title,
        timestamp: format_timestamp(seconds),
        author,
        ago,
        views,
        seconds,
    })
}

/// Parse "2:08" / "1:02:05" into seconds.
fn parse_duration(text: &str) -> Option<u32> {
    let mut seconds: u32 = 0;
    for part in text.split(':') {
        seconds = seconds
            .checked_mul(60)?
            .checked_add(part.trim().parse::<u32>().ok()?)?;
    }
    Some(seconds)
}

/// Extract the numeric count from strings like "22,123,456 views".
fn parse_view_count(text: &str) -> u64 {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}
