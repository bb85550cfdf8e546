pub mod error;

pub use error::{BrowserlessError, Result};

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Extra time allowed on top of navigation + settle before the HTTP call itself gives up.
const REQUEST_MARGIN: Duration = Duration::from_secs(5);

/// Page lifecycle event Browserless waits for before the settle delay starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WaitUntil {
    Load,
    DomContentLoaded,
    NetworkIdle0,
    NetworkIdle2,
}

/// Per-request rendering options for `/content`.
#[derive(Debug, Clone)]
pub struct ContentOptions {
    pub wait_until: WaitUntil,
    /// Fixed delay after the lifecycle event, for client-side rendering to finish.
    pub settle: Duration,
    /// Navigation timeout enforced inside the browser.
    pub timeout: Duration,
}

impl Default for ContentOptions {
    fn default() -> Self {
        Self {
            wait_until: WaitUntil::DomContentLoaded,
            settle: Duration::from_secs(2),
            timeout: Duration::from_secs(20),
        }
    }
}

#[derive(Debug, Serialize)]
struct GotoOptions {
    #[serde(rename = "waitUntil")]
    wait_until: WaitUntil,
    timeout: u64,
}

#[derive(Debug, Serialize)]
struct ContentRequest<'a> {
    url: &'a str,
    #[serde(rename = "gotoOptions")]
    goto_options: GotoOptions,
    #[serde(rename = "waitForTimeout")]
    wait_for_timeout: u64,
}

/// Subset of `/json/version` used to confirm the browser is reachable.
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserVersion {
    #[serde(rename = "Browser", default)]
    pub browser: String,
}

pub struct BrowserlessClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl BrowserlessClient {
    pub fn new(base_url: &str, token: Option<&str>) -> Result<Self> {
        let client = reqwest::Client::builder().build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.map(String::from),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        let mut endpoint = format!("{}{}", self.base_url, path);
        if let Some(ref token) = self.token {
            endpoint.push_str(&format!("?token={token}"));
        }
        endpoint
    }

    /// Report the browser build behind this endpoint.
    pub async fn version(&self) -> Result<BrowserVersion> {
        let resp = self
            .client
            .get(self.endpoint("/json/version"))
            .timeout(Duration::from_secs(10))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(BrowserlessError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.json().await?)
    }

    /// Fetch fully-rendered HTML content for a URL via Browserless /content endpoint.
    /// Every request is served from a fresh incognito browser context.
    pub async fn content(&self, url: &str, options: &ContentOptions) -> Result<String> {
        let timeout_ms = options.timeout.as_millis() as u64;
        let body = ContentRequest {
            url,
            goto_options: GotoOptions {
                wait_until: options.wait_until,
                timeout: timeout_ms,
            },
            wait_for_timeout: options.settle.as_millis() as u64,
        };

        tracing::debug!(url, timeout_ms, "browserless: requesting rendered content");

        let resp = self
            .client
            .post(self.endpoint("/content"))
            .header("Content-Type", "application/json")
            .timeout(options.timeout + options.settle + REQUEST_MARGIN)
            .json(&body)
            .send()
            .await
            .map_err(|e| classify(e, timeout_ms))?;

        let status = resp.status();
        if status.as_u16() == 408 {
            return Err(BrowserlessError::Timeout(timeout_ms));
        }
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(BrowserlessError::Api {
                status: status.as_u16(),
                message,
            });
        }

        resp.text().await.map_err(|e| classify(e, timeout_ms))
    }
}

fn classify(err: reqwest::Error, timeout_ms: u64) -> BrowserlessError {
    if err.is_timeout() {
        BrowserlessError::Timeout(timeout_ms)
    } else {
        BrowserlessError::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_request_uses_browserless_field_names() {
        let body = ContentRequest {
            url: "https://example.com/a",
            goto_options: GotoOptions {
                wait_until: WaitUntil::DomContentLoaded,
                timeout: 20_000,
            },
            wait_for_timeout: 2_000,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["url"], "https://example.com/a");
        assert_eq!(json["gotoOptions"]["waitUntil"], "domcontentloaded");
        assert_eq!(json["gotoOptions"]["timeout"], 20_000);
        assert_eq!(json["waitForTimeout"], 2_000);
    }

    #[test]
    fn token_is_appended_as_query() {
        let client = BrowserlessClient::new("http://localhost:3000/", Some("abc")).unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000");
        assert_eq!(
            client.endpoint("/content"),
            "http://localhost:3000/content?token=abc"
        );
    }

    #[test]
    fn version_tolerates_missing_browser_field() {
        let v: BrowserVersion = serde_json::from_str(r#"{"Protocol-Version":"1.3"}"#).unwrap();
        assert!(v.browser.is_empty());
    }
}
