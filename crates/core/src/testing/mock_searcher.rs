//! Mock searcher for testing.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::search::{SearchHit, Searcher};

/// Mock implementation of the `Searcher` trait.
///
/// Returns configured hits and records queries. With no hits
/// configured it returns the placeholder, honoring the trait's
/// never-empty contract.
#[derive(Default)]
pub struct MockSearcher {
    results: Mutex<Vec<SearchHit>>,
    queries: Mutex<Vec<String>>,
}

impl MockSearcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_results(&self, results: Vec<SearchHit>) {
        *self.results.lock().await = results;
    }

    pub async fn recorded_queries(&self) -> Vec<String> {
        self.queries.lock().await.clone()
    }
}

#[async_trait]
impl Searcher for MockSearcher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search(&self, query: &str) -> Vec<SearchHit> {
        self.queries.lock().await.push(query.to_string());
        let results = self.results.lock().await.clone();
        if results.is_empty() {
            vec![SearchHit::placeholder()]
        } else {
            results
        }
    }
}
