//! BrowserManager core: connect to Chrome, launching it when allowed.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use tokio::process::{Child, Command};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::cdp::{CdpClient, PageSession};
use super::{BrowserError, BrowserManagerConfig};

const STARTUP_POLL: Duration = Duration::from_millis(200);
const STARTUP_ATTEMPTS: u32 = 30;

#[cfg(target_os = "macos")]
const CHROME_CANDIDATES: &[&str] = &[
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
];

#[cfg(target_os = "linux")]
const CHROME_CANDIDATES: &[&str] = &[
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
];

#[cfg(target_os = "windows")]
const CHROME_CANDIDATES: &[&str] = &[
    r"C:\Program Files\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
];

#[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
const CHROME_CANDIDATES: &[&str] = &[];

/// Owns the CDP connection and the pages opened through it.
pub struct BrowserManager {
    pub(super) config: BrowserManagerConfig,
    pub(super) client: RwLock<Option<Arc<CdpClient>>>,
    /// Pages opened by this manager.
    pub(super) pages: RwLock<Vec<Arc<PageSession>>>,
    /// Chrome process, when this manager started it.
    pub(super) chrome_process: RwLock<Option<Child>>,
}

impl BrowserManager {
    pub fn new(config: BrowserManagerConfig) -> Self {
        Self {
            config,
            client: RwLock::new(None),
            pages: RwLock::new(Vec::new()),
            chrome_process: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &BrowserManagerConfig {
        &self.config
    }

    /// First installed Chrome-compatible browser.
    pub fn find_chrome() -> Option<PathBuf> {
        CHROME_CANDIDATES
            .iter()
            .map(|p| PathBuf::from(*p))
            .find(|p| p.exists())
    }

    async fn debugger_listening(&self) -> bool {
        reqwest::get(&format!("{}/json/version", self.config.endpoint()))
            .await
            .is_ok()
    }

    async fn spawn_chrome(&self) -> Result<Child, BrowserError> {
        let chrome_path = Self::find_chrome().ok_or(BrowserError::ChromeNotFound)?;
        let profile_dir = self.config.get_profile_dir();
        if let Err(e) = std::fs::create_dir_all(&profile_dir) {
            warn!("Failed to create profile directory {}: {}", profile_dir.display(), e);
        }

        let child = Command::new(&chrome_path)
            .args(self.config.chrome_args())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        info!(
            "Launched {} (pid {:?}, profile {})",
            chrome_path.display(),
            child.id(),
            profile_dir.display()
        );
        Ok(child)
    }

    /// Poll the discovery endpoint until the launched browser answers.
    async fn wait_until_ready(&self) -> Result<(), BrowserError> {
        for attempt in 1..=STARTUP_ATTEMPTS {
            tokio::time::sleep(STARTUP_POLL).await;
            if self.debugger_listening().await {
                debug!("Chrome answered after {} polls", attempt);
                return Ok(());
            }
        }
        Err(BrowserError::LaunchFailed(format!(
            "no answer on port {} after {:?}",
            self.config.debug_port,
            STARTUP_POLL * STARTUP_ATTEMPTS
        )))
    }

    /// Connect to the browser. Idempotent.
    pub async fn connect(&self) -> Result<(), BrowserError> {
        if self.client.read().await.is_some() {
            return Ok(());
        }

        if self.debugger_listening().await {
            info!("Using Chrome already running on port {}", self.config.debug_port);
        } else if self.config.launch {
            let child = self.spawn_chrome().await?;
            *self.chrome_process.write().await = Some(child);
            self.wait_until_ready().await?;
        } else {
            return Err(BrowserError::LaunchDisabled(self.config.debug_port));
        }

        let client = CdpClient::connect(&self.config.endpoint()).await?;
        *self.client.write().await = Some(Arc::new(client));
        Ok(())
    }

    pub(super) async fn client(&self) -> Result<Arc<CdpClient>, BrowserError> {
        self.client
            .read()
            .await
            .clone()
            .ok_or(BrowserError::NotConnected)
    }

    /// Drop the connection and every page session.
    pub async fn close(&self) -> Result<(), BrowserError> {
        self.pages.write().await.clear();
        if self.client.write().await.take().is_some() {
            debug!("Browser connection closed");
        }
        Ok(())
    }

    /// Close the connection and stop Chrome if this manager started it.
    pub async fn shutdown_chrome(&self) -> Result<(), BrowserError> {
        self.close().await?;
        if let Some(mut child) = self.chrome_process.write().await.take() {
            info!("Stopping launched Chrome");
            if let Err(e) = child.kill().await {
                warn!("Failed to stop Chrome: {}", e);
            }
        }
        Ok(())
    }
}
