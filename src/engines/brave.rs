//! Brave engine adapter.

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::engine::{check_target_input, extract_hits, keep_href, EngineAdapter, SelectorRules};
use crate::{Result, SearchHit};

const SEARCH_URL: &str = "https://search.brave.com/search";

/// Brave paginates with a 0-based `offset` parameter and links results
/// directly, no redirect unwrapping needed.
pub struct Brave {
    rules: SelectorRules,
    navigation_timeout: Duration,
}

impl Brave {
    pub fn new(navigation_timeout: Duration) -> Self {
        Self {
            rules: SelectorRules {
                container: "#results".to_string(),
                item: "div.result-content".to_string(),
                title: "div.title".to_string(),
                link: "a".to_string(),
                snippet: "div.content".to_string(),
                skip_classes: Vec::new(),
            },
            navigation_timeout,
        }
    }

    pub fn with_rules(mut self, rules: SelectorRules) -> Self {
        self.rules = rules;
        self
    }
}

#[async_trait]
impl EngineAdapter for Brave {
    fn name(&self) -> &str {
        "brave"
    }

    fn rules(&self) -> &SelectorRules {
        &self.rules
    }

    fn navigation_timeout(&self) -> Duration {
        self.navigation_timeout
    }

    fn build_target(&self, query: &str, page: u32) -> Result<Url> {
        check_target_input(query, page)?;
        let offset = page - 1;
        let target = format!(
            "{SEARCH_URL}?q={}&offset={offset}",
            urlencoding::encode(query)
        );
        Ok(Url::parse(&target)?)
    }

    fn parse(&self, html: &str) -> Result<Vec<SearchHit>> {
        extract_hits(self.name(), html, &self.rules, keep_href)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SearchError;

    fn adapter() -> Brave {
        Brave::new(Duration::from_secs(10))
    }

    #[test]
    fn test_name() {
        assert_eq!(adapter().name(), "brave");
    }

    #[test]
    fn test_build_target_first_page() {
        let url = adapter().build_target("rust async", 1).unwrap();
        assert_eq!(
            url.as_str(),
            "https://search.brave.com/search?q=rust%20async&offset=0"
        );
    }

    #[test]
    fn test_build_target_offset_is_zero_based() {
        let url = adapter().build_target("rust", 4).unwrap();
        assert!(url.as_str().ends_with("&offset=3"));
    }

    #[test]
    fn test_build_target_rejects_invalid_input() {
        assert!(matches!(
            adapter().build_target("", 1),
            Err(SearchError::InvalidInput(_))
        ));
        assert!(matches!(
            adapter().build_target("rust", 0),
            Err(SearchError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_parse_results_page() {
        let html = r#"
            <html><body>
            <div id="results">
                <div class="result-content">
                    <a href="https://tokio.rs/">
                        <div class="title">Tokio - An asynchronous Rust runtime</div>
                    </a>
                    <div class="content">Build reliable network applications.</div>
                </div>
                <div class="result-content">
                    <a href="https://async.rs/">
                        <div class="title">async-std</div>
                    </a>
                </div>
            </div>
            </body></html>
        "#;
        let hits = adapter().parse(html).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "Tokio - An asynchronous Rust runtime");
        assert_eq!(hits[0].link, "https://tokio.rs/");
        assert_eq!(hits[0].snippet, "Build reliable network applications.");
        assert_eq!(hits[1].snippet, "");
    }

    #[test]
    fn test_parse_missing_container_fails() {
        let html = "<html><body><h1>Rate limited</h1></body></html>";
        assert!(matches!(
            adapter().parse(html),
            Err(SearchError::ExtractionFailed { .. })
        ));
    }

    #[test]
    fn test_parse_empty_results_container() {
        let html = r#"<html><body><div id="results"></div></body></html>"#;
        assert!(adapter().parse(html).unwrap().is_empty());
    }
}
