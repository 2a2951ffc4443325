//! Chrome/Chromium executable detection.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{Result, SearchError};

/// Well-known Chrome/Chromium executable paths per platform.
#[cfg(target_os = "macos")]
const KNOWN_PATHS: &[&str] = &[
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    "/Applications/Google Chrome Canary.app/Contents/MacOS/Google Chrome Canary",
    "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
];

#[cfg(all(unix, not(target_os = "macos")))]
const KNOWN_PATHS: &[&str] = &[
    "/opt/google/chrome/chrome",
    "/opt/chromium.org/chromium/chrome",
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
];

#[cfg(windows)]
const KNOWN_PATHS: &[&str] = &[
    r"C:\Program Files\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files\Chromium\Application\chrome.exe",
];

/// Well-known command names to search in PATH.
const KNOWN_COMMANDS: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
    "chrome",
];

/// Locates a Chrome/Chromium executable on this host.
///
/// Checks well-known install locations first, then falls back to a PATH
/// lookup. Fails when nothing is found; the service cannot start without a
/// browser.
pub fn find_chrome() -> Result<PathBuf> {
    for path in KNOWN_PATHS {
        let candidate = Path::new(path);
        if candidate.exists() {
            debug!("found Chrome at known path: {}", candidate.display());
            return Ok(candidate.to_path_buf());
        }
    }

    for command in KNOWN_COMMANDS {
        if let Ok(path) = which::which(command) {
            debug!("found Chrome via PATH: {}", path.display());
            return Ok(path);
        }
    }

    Err(SearchError::Browser(
        "no Chrome/Chromium executable found; install Chrome or set chrome_path".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_paths_not_empty() {
        assert!(!KNOWN_PATHS.is_empty());
        assert!(!KNOWN_COMMANDS.is_empty());
    }

    #[test]
    fn test_find_chrome_reports_browser_error_when_missing() {
        // Either outcome is valid on a given host; only the error shape is
        // asserted here.
        match find_chrome() {
            Ok(path) => assert!(!path.as_os_str().is_empty()),
            Err(SearchError::Browser(msg)) => assert!(msg.contains("chrome_path")),
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }
}
