// Test mocks for the acquisition core.
//
// One mock per trait boundary:
// - MockFetcher (ContentFetcher): map of locator → FetchOutcome, records calls
// - MockTier (ExtractionTier): closure-backed, counts attempts
// - FakeLauncher (BrowserLauncher): counts launches, contexts and closes
// - MockManagedExtractor (ManagedExtractor): fixed page

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use newswire_common::{Article, ExtractionResult, FetchOutcome};

use crate::browser::{Browser, BrowserContext, BrowserError, BrowserLauncher, RenderOptions};
use crate::scrape::{ExtractionTier, ManagedExtractor, ManagedPage, TierError, TierLevel};
use crate::traits::ContentFetcher;

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

/// Map-based content fetcher. Unregistered locators come back as `Failure`.
/// Builder pattern: `.on_feed()`, `.on_search()`, `.on_page()`, `.delay()`.
#[derive(Default)]
pub struct MockFetcher {
    feeds: HashMap<String, FetchOutcome>,
    searches: HashMap<String, FetchOutcome>,
    pages: HashMap<String, FetchOutcome>,
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_feed(mut self, locator: &str, outcome: FetchOutcome) -> Self {
        self.feeds.insert(locator.to_string(), outcome);
        self
    }

    pub fn on_search(mut self, query: &str, outcome: FetchOutcome) -> Self {
        self.searches.insert(query.to_string(), outcome);
        self
    }

    pub fn on_page(mut self, url: &str, outcome: FetchOutcome) -> Self {
        self.pages.insert(url.to_string(), outcome);
        self
    }

    /// Hold the response for `key` back by `delay`.
    pub fn delay(mut self, key: &str, delay: Duration) -> Self {
        self.delays.insert(key.to_string(), delay);
        self
    }

    /// Calls in arrival order, as `"<kind>:<key>"`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    async fn respond(
        &self,
        kind: &str,
        key: &str,
        table: &HashMap<String, FetchOutcome>,
    ) -> FetchOutcome {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(format!("{kind}:{key}"));
        }
        if let Some(delay) = self.delays.get(key) {
            tokio::time::sleep(*delay).await;
        }
        table.get(key).cloned().unwrap_or_else(|| {
            FetchOutcome::failure(format!("MockFetcher: no {kind} registered for {key}"))
        })
    }
}

#[async_trait]
impl ContentFetcher for MockFetcher {
    async fn feed(&self, locator: &str, _label: &str) -> FetchOutcome {
        self.respond("feed", locator, &self.feeds).await
    }

    async fn search(&self, query: &str, _lookback_days: u32) -> FetchOutcome {
        self.respond("search", query, &self.searches).await
    }

    async fn page(&self, url: &str) -> FetchOutcome {
        self.respond("page", url, &self.pages).await
    }
}

/// `n` distinct feed articles titled `"<prefix> 0"`, `"<prefix> 1"`, ...
pub fn sample_articles(prefix: &str, n: usize) -> Vec<Article> {
    (0..n)
        .map(|i| {
            Article::new(
                Some(&format!("{prefix} {i}")),
                Some(&format!("https://{prefix}.example/{i}")),
                prefix,
                "2025-06-01T00:00:00Z",
                "snippet",
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// MockTier
// ---------------------------------------------------------------------------

type TierResponse = dyn Fn() -> Result<ExtractionResult, TierError> + Send + Sync;

/// Extraction tier driven by a closure. Counts attempts.
pub struct MockTier {
    level: TierLevel,
    respond: Box<TierResponse>,
    calls: AtomicUsize,
}

impl MockTier {
    pub fn new(
        level: TierLevel,
        respond: impl Fn() -> Result<ExtractionResult, TierError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            level,
            respond: Box::new(respond),
            calls: AtomicUsize::new(0),
        }
    }

    /// Succeeds with `content`.
    pub fn content(level: TierLevel, content: &str) -> Self {
        let content = content.to_string();
        Self::new(level, move || {
            Ok(ExtractionResult {
                title: String::new(),
                content: content.clone(),
            })
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExtractionTier for MockTier {
    fn level(&self) -> TierLevel {
        self.level
    }

    async fn attempt(&self, _url: &str) -> Result<ExtractionResult, TierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.respond)()
    }
}

// ---------------------------------------------------------------------------
// FakeLauncher
// ---------------------------------------------------------------------------

#[derive(Default)]
struct LaunchCounters {
    launches: AtomicUsize,
    closes: AtomicUsize,
    contexts_opened: AtomicUsize,
    contexts_closed: AtomicUsize,
    renders: AtomicUsize,
    failures_left: AtomicUsize,
}

/// In-memory browser launcher. Clones share counters.
#[derive(Clone)]
pub struct FakeLauncher {
    counters: Arc<LaunchCounters>,
    html: Arc<String>,
    launch_delay: Duration,
}

impl FakeLauncher {
    pub fn new() -> Self {
        Self::with_html("<article>rendered</article>")
    }

    /// Every render returns `html`.
    pub fn with_html(html: &str) -> Self {
        Self {
            counters: Arc::new(LaunchCounters::default()),
            html: Arc::new(html.to_string()),
            launch_delay: Duration::ZERO,
        }
    }

    /// The first `n` launches fail.
    pub fn failing_first(n: usize) -> Self {
        let launcher = Self::new();
        launcher.counters.failures_left.store(n, Ordering::SeqCst);
        launcher
    }

    /// Make each launch take `delay`, so concurrent acquirers overlap.
    pub fn with_launch_delay(mut self, delay: Duration) -> Self {
        self.launch_delay = delay;
        self
    }

    pub fn launches(&self) -> usize {
        self.counters.launches.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.counters.closes.load(Ordering::SeqCst)
    }

    pub fn contexts_opened(&self) -> usize {
        self.counters.contexts_opened.load(Ordering::SeqCst)
    }

    pub fn contexts_closed(&self) -> usize {
        self.counters.contexts_closed.load(Ordering::SeqCst)
    }

    pub fn renders(&self) -> usize {
        self.counters.renders.load(Ordering::SeqCst)
    }
}

impl Default for FakeLauncher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BrowserLauncher for FakeLauncher {
    async fn launch(&self) -> Result<Arc<dyn Browser>, BrowserError> {
        self.counters.launches.fetch_add(1, Ordering::SeqCst);
        if !self.launch_delay.is_zero() {
            tokio::time::sleep(self.launch_delay).await;
        }
        let failing = self
            .counters
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(BrowserError::Launch("fake launch failure".to_string()));
        }
        Ok(Arc::new(FakeBrowser {
            counters: Arc::clone(&self.counters),
            html: Arc::clone(&self.html),
        }))
    }
}

struct FakeBrowser {
    counters: Arc<LaunchCounters>,
    html: Arc<String>,
}

#[async_trait]
impl Browser for FakeBrowser {
    async fn new_context(&self) -> Result<Box<dyn BrowserContext>, BrowserError> {
        self.counters.contexts_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeContext {
            counters: Arc::clone(&self.counters),
            html: Arc::clone(&self.html),
        }))
    }

    async fn close(&self) {
        self.counters.closes.fetch_add(1, Ordering::SeqCst);
    }
}

struct FakeContext {
    counters: Arc<LaunchCounters>,
    html: Arc<String>,
}

#[async_trait]
impl BrowserContext for FakeContext {
    async fn render(&self, _url: &str, _options: &RenderOptions) -> Result<String, BrowserError> {
        self.counters.renders.fetch_add(1, Ordering::SeqCst);
        Ok(self.html.as_ref().clone())
    }

    async fn close(&self) {
        self.counters.contexts_closed.fetch_add(1, Ordering::SeqCst);
    }
}

// ---------------------------------------------------------------------------
// MockManagedExtractor
// ---------------------------------------------------------------------------

/// Managed extractor returning one fixed page.
pub struct MockManagedExtractor {
    page: ManagedPage,
}

impl MockManagedExtractor {
    pub fn returning(title: Option<&str>, body: &str) -> Self {
        Self {
            page: ManagedPage {
                title: title.map(String::from),
                body: body.to_string(),
            },
        }
    }
}

#[async_trait]
impl ManagedExtractor for MockManagedExtractor {
    async fn extract_page(&self, _url: &str) -> Result<ManagedPage, TierError> {
        Ok(self.page.clone())
    }
}
