// Shared headless-browser handle for rendered extraction.
//
// One browser per run, created on first use and released once at shutdown.
// Every render runs in its own context so concurrent pages never share state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use browserless_client::{BrowserlessClient, BrowserlessError, ContentOptions, WaitUntil};
use tokio::sync::OnceCell;
use tracing::{info, warn};

/// How long to wait for a page, and how long to let scripts run after DOM-ready.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub settle: Duration,
    pub timeout: Duration,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            settle: Duration::from_secs(2),
            timeout: Duration::from_secs(20),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BrowserError {
    #[error("failed to launch browser: {0}")]
    Launch(String),

    #[error("browser already released")]
    Released,

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("render timed out after {0:?}")]
    Timeout(Duration),
}

/// An isolated browsing context (cookies, storage, cache) inside one browser.
#[async_trait]
pub trait BrowserContext: Send + Sync {
    /// Navigate, wait for DOM-ready plus the settle delay, return the HTML.
    async fn render(&self, url: &str, options: &RenderOptions) -> Result<String, BrowserError>;

    async fn close(&self);
}

#[async_trait]
pub trait Browser: Send + Sync {
    async fn new_context(&self) -> Result<Box<dyn BrowserContext>, BrowserError>;

    async fn close(&self);
}

#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Arc<dyn Browser>, BrowserError>;
}

/// Lazily-launched browser shared by every rendered extraction in a run.
pub struct SharedBrowser {
    launcher: Box<dyn BrowserLauncher>,
    handle: OnceCell<Arc<dyn Browser>>,
    released: AtomicBool,
    closed: AtomicBool,
}

impl SharedBrowser {
    pub fn new(launcher: impl BrowserLauncher + 'static) -> Self {
        Self {
            launcher: Box::new(launcher),
            handle: OnceCell::new(),
            released: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        }
    }

    /// The shared browser, launching it on first call.
    /// Concurrent first callers wait on a single launch. A failed launch is retried
    /// by the next caller. A launch that completes after `release()` is closed here.
    pub async fn acquire(&self) -> Result<Arc<dyn Browser>, BrowserError> {
        if self.released.load(Ordering::Acquire) {
            return Err(BrowserError::Released);
        }
        let browser = self
            .handle
            .get_or_try_init(|| async {
                info!("browser: launching shared instance");
                self.launcher.launch().await
            })
            .await?;
        if self.released.load(Ordering::Acquire) {
            self.close_once(browser).await;
            return Err(BrowserError::Released);
        }
        Ok(Arc::clone(browser))
    }

    pub fn is_launched(&self) -> bool {
        self.handle.initialized()
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }

    /// Close the browser if it was ever launched. Safe to call more than once.
    pub async fn release(&self) {
        if self.released.swap(true, Ordering::AcqRel) {
            return;
        }
        match self.handle.get() {
            Some(browser) => self.close_once(browser).await,
            None => info!("browser: never launched, nothing to release"),
        }
    }

    async fn close_once(&self, browser: &Arc<dyn Browser>) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            browser.close().await;
            info!("browser: shared instance released");
        }
    }
}

// --- Browserless backend ---

/// Launches a connection to a Browserless endpoint.
pub struct BrowserlessLauncher {
    base_url: String,
    token: Option<String>,
}

impl BrowserlessLauncher {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token,
        }
    }
}

#[async_trait]
impl BrowserLauncher for BrowserlessLauncher {
    async fn launch(&self) -> Result<Arc<dyn Browser>, BrowserError> {
        let client = BrowserlessClient::new(&self.base_url, self.token.as_deref())
            .map_err(|e| BrowserError::Launch(e.to_string()))?;
        let version = client
            .version()
            .await
            .map_err(|e| BrowserError::Launch(format!("{} unreachable: {e}", self.base_url)))?;
        info!(
            endpoint = client.base_url(),
            browser = version.browser.as_str(),
            "browser: connected"
        );
        Ok(Arc::new(BrowserlessBrowser {
            client: Arc::new(client),
        }))
    }
}

struct BrowserlessBrowser {
    client: Arc<BrowserlessClient>,
}

#[async_trait]
impl Browser for BrowserlessBrowser {
    async fn new_context(&self) -> Result<Box<dyn BrowserContext>, BrowserError> {
        // Browserless serves each /content call from a fresh incognito context.
        Ok(Box::new(BrowserlessContext {
            client: Arc::clone(&self.client),
        }))
    }

    async fn close(&self) {}
}

struct BrowserlessContext {
    client: Arc<BrowserlessClient>,
}

#[async_trait]
impl BrowserContext for BrowserlessContext {
    async fn render(&self, url: &str, options: &RenderOptions) -> Result<String, BrowserError> {
        let content_options = ContentOptions {
            wait_until: WaitUntil::DomContentLoaded,
            settle: options.settle,
            timeout: options.timeout,
        };
        self.client
            .content(url, &content_options)
            .await
            .map_err(|e| match e {
                BrowserlessError::Timeout(_) => BrowserError::Timeout(options.timeout),
                other => {
                    warn!(url, error = %other, "browser: render failed");
                    BrowserError::Navigation(other.to_string())
                }
            })
    }

    async fn close(&self) {}
}
