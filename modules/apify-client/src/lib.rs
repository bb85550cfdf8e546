pub mod error;
pub mod types;

pub use error::{ApifyError, Result};
pub use types::{CrawledPage, CrawledPageMetadata, RunData, StartUrl, WebsiteCrawlerInput};

use serde::de::DeserializeOwned;
use serde::Serialize;
use types::ApiResponse;

const BASE_URL: &str = "https://api.apify.com/v2";

/// Actor ID for apify/website-content-crawler.
const WEBSITE_CONTENT_CRAWLER: &str = "aYG0l9s7dbB7j3gbS";

/// Server-side wait per poll request; the API caps it at 60s.
const WAIT_FOR_FINISH_SECS: u32 = 60;

pub struct ApifyClient {
    client: reqwest::Client,
    token: String,
}

impl ApifyClient {
    pub fn new(token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{BASE_URL}{path}")
    }

    /// Start an actor run. Returns immediately with run metadata.
    pub async fn start_run<I: Serialize + ?Sized>(
        &self,
        actor_id: &str,
        input: &I,
    ) -> Result<RunData> {
        let resp = self
            .client
            .post(self.url(&format!("/acts/{actor_id}/runs")))
            .bearer_auth(&self.token)
            .json(input)
            .send()
            .await?;

        let api_resp: ApiResponse<RunData> = ensure_success(resp).await?.json().await?;
        Ok(api_resp.data)
    }

    /// Long-poll until the run reaches a terminal status.
    pub async fn wait_for_run(&self, run_id: &str) -> Result<RunData> {
        let url = self.url(&format!("/actor-runs/{run_id}?waitForFinish={WAIT_FOR_FINISH_SECS}"));
        loop {
            let resp = self.client.get(&url).bearer_auth(&self.token).send().await?;
            let run = ensure_success(resp).await?.json::<ApiResponse<RunData>>().await?.data;

            match run.status.as_str() {
                "SUCCEEDED" => return Ok(run),
                "FAILED" | "ABORTED" | "TIMED-OUT" => return Err(ApifyError::RunFailed(run.status)),
                status => tracing::debug!(run_id, status, "Run still in progress"),
            }
        }
    }

    /// Fetch dataset items from a completed run.
    pub async fn get_dataset_items<T: DeserializeOwned>(&self, dataset_id: &str) -> Result<Vec<T>> {
        let resp = self
            .client
            .get(self.url(&format!("/datasets/{dataset_id}/items?format=json")))
            .bearer_auth(&self.token)
            .send()
            .await?;

        Ok(ensure_success(resp).await?.json().await?)
    }

    /// Extract one page end-to-end: start crawler run, poll, fetch the single dataset item.
    pub async fn crawl_page(&self, page_url: &str) -> Result<CrawledPage> {
        tracing::info!(page_url, "Starting website content crawl");

        let input = WebsiteCrawlerInput::single_page(page_url);
        let run = self.start_run(WEBSITE_CONTENT_CRAWLER, &input).await?;
        tracing::info!(run_id = %run.id, "Apify run started, polling for completion");

        let completed = self.wait_for_run(&run.id).await?;
        tracing::info!(
            run_id = %completed.id,
            dataset_id = %completed.default_dataset_id,
            "Run completed, fetching results"
        );

        let pages: Vec<CrawledPage> = self
            .get_dataset_items(&completed.default_dataset_id)
            .await?;
        tracing::info!(count = pages.len(), "Fetched crawled pages");

        pages
            .into_iter()
            .next()
            .ok_or_else(|| ApifyError::NoPage(page_url.to_string()))
    }
}

/// Turn a non-2xx response into `ApifyError::Api` carrying the body.
async fn ensure_success(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = resp.text().await.unwrap_or_default();
    Err(ApifyError::Api {
        status: status.as_u16(),
        message,
    })
}
