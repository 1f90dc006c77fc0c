//! Browser manager errors and configuration.

use std::path::PathBuf;

use thiserror::Error;

use crate::cdp::CdpError;

/// Errors raised while acquiring the page that hosts the list.
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error(transparent)]
    Cdp(#[from] CdpError),

    #[error("Invalid target url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("List did not appear: {0}")]
    ListNotFound(String),

    #[error("Browser not connected")]
    NotConnected,

    #[error("Chrome not found. Please install Google Chrome or Chromium.")]
    ChromeNotFound,

    #[error("Chrome is not running on port {0} and launching is disabled")]
    LaunchDisabled(u16),

    #[error("Failed to launch Chrome: {0}")]
    LaunchFailed(String),
}

impl BrowserError {
    /// The browser went away underneath us.
    pub fn is_disconnected(&self) -> bool {
        matches!(
            self,
            BrowserError::NotConnected | BrowserError::Cdp(CdpError::SessionClosed)
        )
    }
}

/// How to reach (or start) the browser.
#[derive(Debug, Clone)]
pub struct BrowserManagerConfig {
    /// Chrome remote debugging port.
    pub debug_port: u16,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Profile directory; a persistent one keeps the user logged in.
    pub profile_dir: Option<PathBuf>,
    pub headless: bool,
    /// Start Chrome when nothing listens on `debug_port`.
    pub launch: bool,
}

impl Default for BrowserManagerConfig {
    fn default() -> Self {
        Self {
            debug_port: 9222,
            viewport_width: 1280,
            viewport_height: 900,
            profile_dir: None,
            headless: false,
            launch: true,
        }
    }
}

impl BrowserManagerConfig {
    /// Configured profile directory, or `~/.listwalk/browser-profile`.
    pub fn get_profile_dir(&self) -> PathBuf {
        self.profile_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".listwalk")
                .join("browser-profile")
        })
    }

    /// HTTP discovery endpoint.
    pub fn endpoint(&self) -> String {
        format!("http://localhost:{}", self.debug_port)
    }

    /// Command line for a Chrome we launch ourselves.
    pub fn chrome_args(&self) -> Vec<String> {
        let mut args = vec![
            format!("--remote-debugging-port={}", self.debug_port),
            format!("--user-data-dir={}", self.get_profile_dir().display()),
            format!("--window-size={},{}", self.viewport_width, self.viewport_height),
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
            "--disable-background-networking".to_string(),
            "--disable-sync".to_string(),
            "--disable-translate".to_string(),
        ];
        if self.headless {
            args.push("--headless=new".to_string());
        }
        args
    }
}
