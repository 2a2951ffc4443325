//! Engine adapter contract and shared extraction machinery.
//!
//! One adapter per supported engine: it knows the results-page URL scheme,
//! the readiness signal to wait for after navigation, and the markup rules
//! that turn the rendered page into [`SearchHit`]s. Adapters are stateless
//! and never retry; retry policy belongs to the caller.

use std::time::Duration;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use crate::browser::BrowserSession;
use crate::{Result, SearchError, SearchHit};

/// How long `navigate` polls for a declared consent interstitial before
/// moving on to the readiness wait.
const CONSENT_BOUND: Duration = Duration::from_secs(2);

/// CSS rules describing how an engine lays out its results page.
///
/// Kept as data rather than code: engine markup drifts, and the skip list
/// for ads and widgets changes more often than the extraction flow itself.
#[derive(Debug, Clone)]
pub struct SelectorRules {
    /// Results container; doubles as the navigation readiness signal.
    pub container: String,
    /// One organic result within the container.
    pub item: String,
    /// Title element within an item.
    pub title: String,
    /// Link anchor within an item.
    pub link: String,
    /// Snippet element within an item; often absent from the markup.
    pub snippet: String,
    /// Item classes marking non-result rows (ads, related-search widgets).
    pub skip_classes: Vec<String>,
}

/// Per-engine scraping behavior.
#[async_trait]
pub trait EngineAdapter: Send + Sync {
    /// Registered engine name; the external identifier.
    fn name(&self) -> &str;

    /// Markup rules for this engine's results page.
    fn rules(&self) -> &SelectorRules;

    /// Upper bound on navigation and readiness waiting.
    fn navigation_timeout(&self) -> Duration;

    /// Consent/cookie interstitial to dismiss before the readiness wait,
    /// if this engine serves one.
    fn consent_selector(&self) -> Option<&str> {
        None
    }

    /// Maps a non-empty query and 1-based page number to the engine's
    /// results-page URL. Deterministic; URL-encodes the query.
    fn build_target(&self, query: &str, page: u32) -> Result<Url>;

    /// Extracts hits from a rendered results page, in document order.
    fn parse(&self, html: &str) -> Result<Vec<SearchHit>>;

    /// Drives the session to the target and waits for the results container.
    ///
    /// A consent interstitial, when declared, is dismissed first since it
    /// blocks the container from appearing.
    async fn navigate(&self, session: &BrowserSession, target: &Url) -> Result<()> {
        let bound = self.navigation_timeout();
        debug!(engine = self.name(), url = %target, "navigating");
        match tokio::time::timeout(bound, session.goto(target.as_str())).await {
            Ok(result) => result?,
            Err(_) => return Err(timeout_error(self.name())),
        }

        if let Some(css) = self.consent_selector() {
            session.try_dismiss(css, CONSENT_BOUND).await;
        }

        if !session.wait_for(&self.rules().container, bound).await? {
            return Err(timeout_error(self.name()));
        }
        Ok(())
    }

    /// Reads the currently loaded page and parses it.
    async fn extract(&self, session: &BrowserSession) -> Result<Vec<SearchHit>> {
        let html = session.content().await?;
        self.parse(&html)
    }
}

fn timeout_error(engine: &str) -> SearchError {
    SearchError::NavigationTimeout {
        engine: engine.to_string(),
    }
}

/// Shared validation for `build_target` implementations.
pub(crate) fn check_target_input(query: &str, page: u32) -> Result<()> {
    if query.trim().is_empty() {
        return Err(SearchError::InvalidInput(
            "query must not be empty".to_string(),
        ));
    }
    if page < 1 {
        return Err(SearchError::InvalidInput("page must be >= 1".to_string()));
    }
    Ok(())
}

/// Extracts hits from `html` according to `rules`.
///
/// `clean_link` maps a raw `href` to the final absolute URL, or `None` to
/// drop the item (engines wrap organic links in redirects; ads often have
/// no usable href at all). A hit with a missing snippet is kept with an
/// empty one. Fails only when the results container itself is absent —
/// an empty container is a valid zero-hit page.
pub(crate) fn extract_hits<F>(
    engine: &str,
    html: &str,
    rules: &SelectorRules,
    clean_link: F,
) -> Result<Vec<SearchHit>>
where
    F: Fn(&str) -> Option<String>,
{
    let document = Html::parse_document(html);
    let container_sel = parse_selector(engine, &rules.container)?;
    let item_sel = parse_selector(engine, &rules.item)?;
    let title_sel = parse_selector(engine, &rules.title)?;
    let link_sel = parse_selector(engine, &rules.link)?;
    let snippet_sel = parse_selector(engine, &rules.snippet)?;

    let Some(container) = document.select(&container_sel).next() else {
        return Err(SearchError::ExtractionFailed {
            engine: engine.to_string(),
            reason: format!("results container '{}' not found", rules.container),
        });
    };

    let mut hits = Vec::new();
    for (index, item) in container.select(&item_sel).enumerate() {
        if rules
            .skip_classes
            .iter()
            .any(|skip| item.value().classes().any(|class| class == skip.as_str()))
        {
            debug!("skipping item {}: non-result markup", index + 1);
            continue;
        }

        let Some(title_el) = item.select(&title_sel).next() else {
            debug!("skipping item {}: no title element", index + 1);
            continue;
        };
        let Some(link_el) = item.select(&link_sel).next() else {
            debug!("skipping item {}: no link element", index + 1);
            continue;
        };

        let title = collapse_text(title_el);
        let href = link_el.value().attr("href").unwrap_or_default();
        let Some(link) = clean_link(href) else {
            debug!("skipping item {}: no usable link", index + 1);
            continue;
        };
        if title.is_empty() || link.is_empty() {
            debug!("skipping item {}: empty title or link", index + 1);
            continue;
        }

        let snippet = item
            .select(&snippet_sel)
            .next()
            .map(collapse_text)
            .unwrap_or_default();

        hits.push(SearchHit::new(title, link, snippet));
    }

    Ok(hits)
}

/// Identity link cleaner: keep any non-empty href.
pub(crate) fn keep_href(href: &str) -> Option<String> {
    if href.is_empty() {
        None
    } else {
        Some(href.to_string())
    }
}

fn collapse_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn parse_selector(engine: &str, css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| SearchError::ExtractionFailed {
        engine: engine.to_string(),
        reason: format!("invalid selector '{css}': {e:?}"),
    })
}
