//! Ask engine adapter.

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::engine::{check_target_input, extract_hits, keep_href, EngineAdapter, SelectorRules};
use crate::{Result, SearchHit};

const SEARCH_URL: &str = "https://www.ask.com/web";

/// Ask uses plain 1-based `page` pagination and direct result links.
pub struct Ask {
    rules: SelectorRules,
    navigation_timeout: Duration,
}

impl Ask {
    pub fn new(navigation_timeout: Duration) -> Self {
        Self {
            rules: SelectorRules {
                container: "div.results".to_string(),
                item: "div.result".to_string(),
                title: "div.result-title".to_string(),
                link: "a.result-title-link".to_string(),
                snippet: "p.result-abstract".to_string(),
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
impl EngineAdapter for Ask {
    fn name(&self) -> &str {
        "ask"
    }

    fn rules(&self) -> &SelectorRules {
        &self.rules
    }

    fn navigation_timeout(&self) -> Duration {
        self.navigation_timeout
    }

    fn build_target(&self, query: &str, page: u32) -> Result<Url> {
        check_target_input(query, page)?;
        let target = format!(
            "{SEARCH_URL}?q={}&page={page}",
            urlencoding::encode(query)
        );
        Ok(Url::parse(&target)?)
    }

    fn parse(&self, html: &str) -> Result<Vec<SearchHit>> {
        extract_hits(self.name(), html, &self.rules, keep_href)
    }
}
