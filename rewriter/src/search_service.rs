use anyhow::Result;
use async_trait::async_trait;

use crate::models::{SearchResult, SearchResults};

/// Web search capability used by the dynamic case-study generator.
#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<SearchResults>;
}

/// Deterministic stand-in for a real search backend.
///
/// Returns a single Brazilian success story built around the target keyword,
/// whatever the query.
pub struct StaticWebSearch {
    keyword: String,
}

impl StaticWebSearch {
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
        }
    }
}

#[async_trait]
impl WebSearch for StaticWebSearch {
    async fn search(&self, query: &str) -> Result<SearchResults> {
        log::debug!("Static web search for query: {}", query);

        Ok(SearchResults {
            results: vec![SearchResult {
                title: format!("Magazine Luiza: caso de sucesso com {}", self.keyword),
                snippet: format!(
                    "A varejista brasileira cresceu 150% utilizando estratégias de {}",
                    self.keyword
                ),
                url: "https://www.linkedin.com/pulse/caso-sucesso-brasileiro".to_string(),
            }],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_search_mentions_keyword() {
        let search = StaticWebSearch::new("seo local");
        let results = search.search("qualquer consulta").await.unwrap();
        assert_eq!(results.results.len(), 1);
        assert!(results.results[0].snippet.contains("seo local"));
        assert!(results.results[0].url.starts_with("https://"));
    }
}
