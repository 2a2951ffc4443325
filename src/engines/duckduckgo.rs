//! DuckDuckGo engine adapter.

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::engine::{check_target_input, extract_hits, EngineAdapter, SelectorRules};
use crate::{Result, SearchHit};

const SEARCH_URL: &str = "https://duckduckgo.com/html/";
const RESULTS_PER_PAGE: u32 = 10;

/// DuckDuckGo serves a static HTML results page at `/html/` with
/// offset-based pagination. Organic links are wrapped in a
/// `duckduckgo.com/l/?uddg=` redirect that carries the real URL.
pub struct DuckDuckGo {
    rules: SelectorRules,
    navigation_timeout: Duration,
}

impl DuckDuckGo {
    /// Creates the adapter with its default markup rules.
    pub fn new(navigation_timeout: Duration) -> Self {
        Self {
            rules: SelectorRules {
                container: "div.results".to_string(),
                item: "div.result".to_string(),
                title: "a.result__a".to_string(),
                link: "a.result__a".to_string(),
                snippet: "a.result__snippet".to_string(),
                // Sponsored rows and the "more results" stub share the
                // result class but are not organic hits.
                skip_classes: vec!["result--ad".to_string(), "result--more".to_string()],
            },
            navigation_timeout,
        }
    }

    /// Overrides the markup rules, e.g. after an upstream markup change.
    pub fn with_rules(mut self, rules: SelectorRules) -> Self {
        self.rules = rules;
        self
    }
}

#[async_trait]
impl EngineAdapter for DuckDuckGo {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    fn rules(&self) -> &SelectorRules {
        &self.rules
    }

    fn navigation_timeout(&self) -> Duration {
        self.navigation_timeout
    }

    fn build_target(&self, query: &str, page: u32) -> Result<Url> {
        check_target_input(query, page)?;
        let offset = (page - 1) * RESULTS_PER_PAGE;
        let target = format!(
            "{SEARCH_URL}?q={}&s={offset}&o=json&dc={}&api=d.js",
            urlencoding::encode(query),
            offset + 1
        );
        Ok(Url::parse(&target)?)
    }

    fn parse(&self, html: &str) -> Result<Vec<SearchHit>> {
        extract_hits(self.name(), html, &self.rules, clean_link)
    }
}

/// Unwraps the `uddg` redirect parameter to the destination URL.
fn clean_link(href: &str) -> Option<String> {
    if href.is_empty() {
        return None;
    }
    let absolute = match href.strip_prefix("//") {
        Some(rest) => format!("https://{rest}"),
        None => href.to_string(),
    };
    if absolute.contains("duckduckgo.com/l/") {
        if let Ok(url) = Url::parse(&absolute) {
            if let Some((_, uddg)) = url.query_pairs().find(|(key, _)| key == "uddg") {
                return Some(uddg.into_owned());
            }
        }
    }
    Some(absolute)
}
