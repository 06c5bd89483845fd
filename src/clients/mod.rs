/// External element sources
use crate::errors::AppResult;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// HTTP client wrapper with common configuration
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(timeout_secs: u64) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent("personal-ephemeris/0.1")
            .build()?;
        Ok(Self { client })
    }

    pub fn get_client(&self) -> &Client {
        &self.client
    }
}

/// Downloads comet element files and satellite TLEs
pub struct ElementsClient {
    http_client: HttpClient,
    celestrak_url: String,
}

impl ElementsClient {
    pub fn new(celestrak_url: String, timeout_secs: u64) -> AppResult<Self> {
        Ok(Self {
            http_client: HttpClient::new(timeout_secs)?,
            celestrak_url,
        })
    }

    /// Base URL used for TLE lookups
    pub fn celestrak_url(&self) -> &str {
        &self.celestrak_url
    }

    /// Fetch a plain-text document, failing on any non-success status
    pub async fn fetch_text(&self, url: &str) -> AppResult<String> {
        debug!("GET {}", url);
        let resp = self
            .http_client
            .get_client()
            .get(url)
            .send()
            .await?
            .error_for_status()?;

        let text = resp.text().await?;
        Ok(text)
    }

    /// Fetch the current TLE for one NORAD catalog number
    pub async fn fetch_tle(&self, norad_id: u32) -> AppResult<String> {
        debug!("GET {} CATNR={}", self.celestrak_url, norad_id);
        let resp = self
            .http_client
            .get_client()
            .get(&self.celestrak_url)
            .query(&[("CATNR", norad_id.to_string()), ("FORMAT", "TLE".to_string())])
            .send()
            .await?
            .error_for_status()?;

        let text = resp.text().await?;
        Ok(text)
    }
}
