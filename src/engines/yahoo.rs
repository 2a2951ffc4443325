//! Yahoo engine adapter.

use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use url::Url;

use crate::engine::{check_target_input, extract_hits, EngineAdapter, SelectorRules};
use crate::{Result, SearchHit};

const SEARCH_URL: &str = "https://search.yahoo.com/search";
const RESULTS_PER_PAGE: u32 = 7;

/// Yahoo gates results behind a GDPR consent page and wraps organic links
/// in an `r.search.yahoo.com` redirect whose `RU=` segment carries the
/// percent-encoded destination.
pub struct Yahoo {
    rules: SelectorRules,
    navigation_timeout: Duration,
    redirect_re: Regex,
}

impl Yahoo {
    pub fn new(navigation_timeout: Duration) -> Self {
        Self {
            rules: SelectorRules {
                container: "#web".to_string(),
                item: "div.algo".to_string(),
                title: "h3".to_string(),
                link: "a".to_string(),
                snippet: "div.compText".to_string(),
                skip_classes: Vec::new(),
            },
            navigation_timeout,
            redirect_re: Regex::new(r"/RU=([^/]+)/").unwrap(),
        }
    }

    pub fn with_rules(mut self, rules: SelectorRules) -> Self {
        self.rules = rules;
        self
    }

    fn clean_link(&self, href: &str) -> Option<String> {
        if href.is_empty() {
            return None;
        }
        if href.contains("r.search.yahoo.com") {
            if let Some(caps) = self.redirect_re.captures(href) {
                if let Ok(decoded) = urlencoding::decode(&caps[1]) {
                    return Some(decoded.into_owned());
                }
            }
        }
        Some(href.to_string())
    }
}

#[async_trait]
impl EngineAdapter for Yahoo {
    fn name(&self) -> &str {
        "yahoo"
    }

    fn rules(&self) -> &SelectorRules {
        &self.rules
    }

    fn navigation_timeout(&self) -> Duration {
        self.navigation_timeout
    }

    fn consent_selector(&self) -> Option<&str> {
        Some("button.reject-all")
    }

    fn build_target(&self, query: &str, page: u32) -> Result<Url> {
        check_target_input(query, page)?;
        // Yahoo's `b` parameter is the 1-based rank of the first result.
        let first_rank = (page - 1) * RESULTS_PER_PAGE + 1;
        let target = format!(
            "{SEARCH_URL}?q={}&b={first_rank}",
            urlencoding::encode(query)
        );
        Ok(Url::parse(&target)?)
    }

    fn parse(&self, html: &str) -> Result<Vec<SearchHit>> {
        extract_hits(self.name(), html, &self.rules, |href| self.clean_link(href))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SearchError;

    fn adapter() -> Yahoo {
        Yahoo::new(Duration::from_secs(10))
    }

    #[test]
    fn test_name_and_consent() {
        assert_eq!(adapter().name(), "yahoo");
        assert_eq!(adapter().consent_selector(), Some("button.reject-all"));
    }

    #[test]
    fn test_build_target_first_page() {
        let url = adapter().build_target("rust wasm", 1).unwrap();
        assert_eq!(
            url.as_str(),
            "https://search.yahoo.com/search?q=rust%20wasm&b=1"
        );
    }

    #[test]
    fn test_build_target_rank_stride() {
        let url = adapter().build_target("rust", 3).unwrap();
        assert!(url.as_str().ends_with("&b=15"));
    }

    #[test]
    fn test_build_target_rejects_invalid_input() {
        assert!(matches!(
            adapter().build_target("rust", 0),
            Err(SearchError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_clean_link_unwraps_redirect() {
        let href = "https://r.search.yahoo.com/_ylt=Awr/RV=2/RE=123/RO=10/RU=https%3a%2f%2fwww.rust-lang.org%2f/RK=2/RS=abc";
        assert_eq!(
            adapter().clean_link(href),
            Some("https://www.rust-lang.org/".to_string())
        );
    }

    #[test]
    fn test_clean_link_passes_direct_urls() {
        assert_eq!(
            adapter().clean_link("https://example.com/"),
            Some("https://example.com/".to_string())
        );
        assert_eq!(adapter().clean_link(""), None);
    }

    #[test]
    fn test_parse_results_page() {
        let html = r#"
            <html><body>
            <div id="web">
                <ol>
                    <li><div class="algo">
                        <h3><a href="https://r.search.yahoo.com/_ylt=x/RU=https%3a%2f%2fwww.rust-lang.org%2f/RK=2/RS=y">Rust Programming Language</a></h3>
                        <div class="compText"><p>A systems programming language.</p></div>
                    </div></li>
                    <li><div class="algo">
                        <h3><a href="https://crates.io/">crates.io</a></h3>
                    </div></li>
                </ol>
            </div>
            </body></html>
        "#;
        let hits = adapter().parse(html).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].link, "https://www.rust-lang.org/");
        assert_eq!(hits[0].snippet, "A systems programming language.");
        assert_eq!(hits[1].title, "crates.io");
        assert_eq!(hits[1].snippet, "");
    }

    #[test]
    fn test_parse_missing_container_fails() {
        let html = "<html><body><div id='consent-page'>Before you continue</div></body></html>";
        assert!(matches!(
            adapter().parse(html),
            Err(SearchError::ExtractionFailed { .. })
        ));
    }
}
