use crate::error::{MonitorError, Result};

use reqwest::{Client, RequestBuilder};
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Thin HTTP client for the Sentinel backend.
#[derive(Clone)]
pub struct ApiClient {
    pub(crate) client: Client,
    base_url: String,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        // Bare "host:port" gets http://; no trailing slash so joined routes
        // carry exactly one separator.
        fn normalize(raw: String) -> String {
            let trimmed = raw.trim().trim_end_matches('/').to_string();
            let with_scheme = if trimmed.starts_with("http://")
                || trimmed.starts_with("https://")
            {
                trimmed
            } else {
                format!("http://{}", trimmed)
            };
            if with_scheme != raw {
                debug!(from = %raw, to = %with_scheme, "normalized API base URL");
            }
            with_scheme
        }

        let base_url = normalize(base_url.into());
        let client = Client::builder().timeout(timeout).build()?;

        info!(base_url = %base_url, "API client ready");
        Ok(Self { client, base_url })
    }

    /// Absolute URL for a route; absolute inputs are passed through.
    pub fn build_url(&self, path: impl AsRef<str>) -> String {
        let p = path.as_ref();
        if p.starts_with("http://") || p.starts_with("https://") {
            return p.to_string();
        }
        format!("{}/{}", self.base_url, p.trim_start_matches('/'))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.build_url(path);
        let response = self.execute(self.client.get(&url), &url).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|err| {
            warn!(url = %url, error = %err, "response body did not match schema");
            MonitorError::Serialization(err)
        })
    }

    /// POST a JSON body; only the status of the reply is inspected.
    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<()> {
        let url = self.build_url(path);
        self.execute(self.client.post(&url).json(body), &url)
            .await
            .map(|_| ())
    }

    async fn execute(
        &self,
        request: RequestBuilder,
        url: &str,
    ) -> Result<reqwest::Response> {
        let response = request.send().await.map_err(|err| {
            warn!(url = %url, error = %err, "request failed");
            MonitorError::Http(err)
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = %status, "request rejected");
            return Err(MonitorError::Status {
                status,
                url: url.to_string(),
            });
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gets_scheme_and_loses_trailing_slash() {
        let client =
            ApiClient::new("localhost:8000/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(
            client.build_url("/api/triage/queue"),
            "http://localhost:8000/api/triage/queue"
        );
        assert_eq!(
            client.build_url("https://other.host/x"),
            "https://other.host/x"
        );
    }
}
