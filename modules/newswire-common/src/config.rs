/// Secrets and endpoints loaded from environment variables.
/// Tunables (catalog, thresholds, report location) live in the TOML FileConfig.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // Search
    pub newsapi_key: Option<String>,

    // Managed extraction (Tier 3)
    pub apify_api_token: Option<String>,

    // Headless browser (Tier 2)
    pub browserless_url: String,
    pub browserless_token: Option<String>,
}

const DEFAULT_BROWSERLESS_URL: &str = "http://localhost:3000";

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            newsapi_key: None,
            apify_api_token: None,
            browserless_url: DEFAULT_BROWSERLESS_URL.to_string(),
            browserless_token: None,
        }
    }
}

impl AppConfig {
    /// Every key is optional; absence selects the documented fallback.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let config = Self {
            newsapi_key: non_empty_env("NEWSAPI_KEY"),
            apify_api_token: non_empty_env("APIFY_API_TOKEN"),
            browserless_url: non_empty_env("BROWSERLESS_URL")
                .unwrap_or_else(|| DEFAULT_BROWSERLESS_URL.to_string()),
            browserless_token: non_empty_env("BROWSERLESS_TOKEN"),
        };

        config.log_keys();
        config
    }

    fn log_keys(&self) {
        fn preview(val: &str) -> String {
            let n = val.char_indices().nth(5).map(|(i, _)| i).unwrap_or(val.len());
            format!("{}...({} chars)", &val[..n], val.len())
        }
        fn preview_opt(val: &Option<String>) -> String {
            match val {
                Some(v) if !v.is_empty() => preview(v),
                _ => "<not set>".to_string(),
            }
        }

        tracing::info!("Config loaded:");
        tracing::info!("  NEWSAPI_KEY: {}", preview_opt(&self.newsapi_key));
        tracing::info!("  APIFY_API_TOKEN: {}", preview_opt(&self.apify_api_token));
        tracing::info!("  BROWSERLESS_URL: {}", self.browserless_url);
        tracing::info!("  BROWSERLESS_TOKEN: {}", preview_opt(&self.browserless_token));
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
