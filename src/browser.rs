//! Headless browser sessions over the Chrome DevTools Protocol.
//!
//! Each [`BrowserSession`] owns one Chromium process and a single blank page
//! that adapters navigate for the duration of one search. Sessions are
//! launched and torn down by [`ChromiumLauncher`], the production
//! implementation of the pool's launcher seam.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::pool::SessionLauncher;
use crate::{Result, SearchError};

/// How often a readiness wait re-checks the page for its selector.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Desktop user agent presented to the engines.
///
/// Chrome's `--headless=new` mode injects "HeadlessChrome" into the UA,
/// which the engines trivially detect and block.
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Injected before any engine script runs; hides the automation markers
/// the engines probe for (navigator.webdriver, empty plugin list, missing
/// window.chrome).
const STEALTH_SCRIPT: &str = r#"
Object.defineProperty(navigator, 'webdriver', {
    get: () => undefined
});

Object.defineProperty(navigator, 'plugins', {
    get: () => [1, 2, 3, 4, 5]
});

Object.defineProperty(navigator, 'languages', {
    get: () => ['en-US', 'en']
});

window.chrome = {
    runtime: {}
};

Object.defineProperty(navigator, 'permissions', {
    get: () => ({
        query: () => Promise.resolve({ state: 'prompt' })
    })
});
"#;

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

fn next_session_id() -> u64 {
    NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed)
}

/// Launch-time settings for the Chromium processes backing the pool.
#[derive(Debug, Clone)]
pub struct BrowserSettings {
    /// Whether to run the browser in headless mode.
    pub headless: bool,
    /// Path to the Chrome/Chromium executable. If `None`, auto-detected.
    pub chrome_path: Option<String>,
    /// User agent presented to the engines.
    pub user_agent: String,
    /// Additional launch arguments for Chrome.
    pub launch_args: Vec<String>,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_path: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            launch_args: Vec::new(),
        }
    }
}

/// A handle to one live Chromium process and its page.
///
/// Owned by the browser pool; callers borrow a session through a lease for
/// the scope of one search and must not retain it afterward.
pub struct BrowserSession {
    id: u64,
    backend: Option<Backend>,
}

struct Backend {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
}

impl BrowserSession {
    /// Identifier of the underlying browser process, unique per launch.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// A session with no live browser behind it, for exercising pool and
    /// orchestrator logic without Chromium.
    #[cfg(test)]
    pub(crate) fn detached() -> Self {
        Self {
            id: next_session_id(),
            backend: None,
        }
    }

    fn backend(&self) -> Result<&Backend> {
        self.backend
            .as_ref()
            .ok_or_else(|| SearchError::Browser("session has no live browser".to_string()))
    }

    /// Drives the page to the given URL and waits for the load to commit.
    pub async fn goto(&self, url: &str) -> Result<()> {
        let backend = self.backend()?;
        backend
            .page
            .goto(url)
            .await
            .map_err(|e| SearchError::Browser(format!("navigation to {url} failed: {e}")))?;
        Ok(())
    }

    /// Polls for a CSS selector until it matches or the bound elapses.
    ///
    /// Returns `Ok(true)` once the selector matches, `Ok(false)` if it never
    /// did within the bound. Protocol errors during the poll are treated as
    /// "not there yet"; a dead browser surfaces as a timeout and the caller
    /// releases the session as unhealthy.
    pub async fn wait_for(&self, css: &str, bound: Duration) -> Result<bool> {
        let backend = self.backend()?;
        let deadline = Instant::now() + bound;
        loop {
            if backend.page.find_element(css).await.is_ok() {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Clicks the element matching `css` if it appears within the bound.
    ///
    /// Best-effort: consent banners are not always served, and a banner
    /// that fails to dismiss still leaves the readiness wait to decide.
    pub async fn try_dismiss(&self, css: &str, bound: Duration) -> bool {
        let backend = match self.backend() {
            Ok(backend) => backend,
            Err(_) => return false,
        };
        let deadline = Instant::now() + bound;
        loop {
            match backend.page.find_element(css).await {
                Ok(element) => {
                    if let Err(e) = element.click().await {
                        debug!("failed to click '{}': {}", css, e);
                        return false;
                    }
                    debug!("dismissed interstitial '{}'", css);
                    return true;
                }
                Err(_) if Instant::now() < deadline => {
                    tokio::time::sleep(POLL_INTERVAL).await;
                }
                Err(_) => {
                    debug!("no interstitial '{}' within bound", css);
                    return false;
                }
            }
        }
    }

    /// Returns the rendered HTML of the currently loaded page.
    pub async fn content(&self) -> Result<String> {
        let backend = self.backend()?;
        backend
            .page
            .content()
            .await
            .map_err(|e| SearchError::Browser(format!("failed to read page content: {e}")))
    }
}

impl std::fmt::Debug for BrowserSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserSession")
            .field("id", &self.id)
            .field("live", &self.backend.is_some())
            .finish()
    }
}

/// Launches and tears down Chromium-backed sessions.
pub struct ChromiumLauncher {
    settings: BrowserSettings,
}

impl ChromiumLauncher {
    /// Creates a launcher with the given settings.
    pub fn new(settings: BrowserSettings) -> Self {
        Self { settings }
    }

    fn browser_config(&self) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder();

        if self.settings.headless {
            builder = builder.arg("--headless=new");
        } else {
            builder = builder.with_head();
        }

        // Resolve the executable: explicit path wins, otherwise detect.
        let chrome_path = match self.settings.chrome_path {
            Some(ref path) => path.clone().into(),
            None => crate::chrome::find_chrome()?,
        };
        debug!("using Chrome at: {}", chrome_path.display());
        builder = builder.chrome_executable(chrome_path);

        builder = builder.arg(format!("--user-agent={}", self.settings.user_agent));

        builder = builder
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--no-sandbox")
            .arg("--disable-setuid-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            .arg("--disable-infobars")
            .arg("--disable-extensions")
            .arg("--disable-background-networking")
            .arg("--disable-default-apps")
            .arg("--disable-sync")
            .arg("--disable-translate")
            .arg("--mute-audio")
            .arg("--no-first-run");

        for arg in &self.settings.launch_args {
            builder = builder.arg(arg);
        }

        builder
            .build()
            .map_err(|e| SearchError::Browser(format!("failed to build browser config: {e}")))
    }
}

#[async_trait]
impl SessionLauncher for ChromiumLauncher {
    async fn launch(&self) -> Result<BrowserSession> {
        let config = self.browser_config()?;

        let (mut browser, mut cdp) = Browser::launch(config)
            .await
            .map_err(|e| SearchError::Browser(format!("failed to launch browser: {e}")))?;

        // Drain CDP events for the lifetime of this process.
        let handler = tokio::spawn(async move {
            while let Some(event) = cdp.next().await {
                if let Err(e) = event {
                    debug!("browser CDP handler error: {}", e);
                }
            }
            debug!("browser CDP handler exited");
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let _ = browser.close().await;
                handler.abort();
                return Err(SearchError::Browser(format!("failed to open page: {e}")));
            }
        };

        if let Err(e) = page
            .execute(AddScriptToEvaluateOnNewDocumentParams::new(STEALTH_SCRIPT))
            .await
        {
            let _ = browser.close().await;
            handler.abort();
            return Err(SearchError::Browser(format!(
                "failed to install stealth script: {e}"
            )));
        }

        let session = BrowserSession {
            id: next_session_id(),
            backend: Some(Backend {
                browser,
                page,
                handler,
            }),
        };
        debug!(session = session.id, "launched browser session");
        Ok(session)
    }

    async fn teardown(&self, session: BrowserSession) -> Result<()> {
        let id = session.id;
        if let Some(mut backend) = session.backend {
            if let Err(e) = backend.browser.close().await {
                warn!(session = id, "browser close failed: {}", e);
            }
            backend.handler.abort();
        }
        debug!(session = id, "browser session torn down");
        Ok(())
    }
}
