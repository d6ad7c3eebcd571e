//! Network access behind a small trait so the pipeline can run against
//! in-memory pages in tests.

use crate::error::{Error, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};

pub trait Http {
    async fn get_text(&self, url: &str) -> Result<String>;
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>>;
    /// Follow redirects and report the final URL.
    async fn resolve_redirect(&self, url: &str) -> Result<String>;
}

/// [`Http`] on top of a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestHttp {
    client: Client,
}

impl ReqwestHttp {
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { client })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    async fn get_ok(&self, url: &str) -> Result<reqwest::Response> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(Error::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response)
    }
}

impl Http for ReqwestHttp {
    #[instrument(level = "debug", skip(self))]
    async fn get_text(&self, url: &str) -> Result<String> {
        let text = self.get_ok(url).await?.text().await?;
        debug!(bytes = text.len(), "Fetched text");
        Ok(text)
    }

    #[instrument(level = "debug", skip(self))]
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let bytes = self.get_ok(url).await?.bytes().await?;
        debug!(bytes = bytes.len(), "Fetched bytes");
        Ok(bytes.to_vec())
    }

    #[instrument(level = "debug", skip(self))]
    async fn resolve_redirect(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        let resolved = response.url().to_string();
        debug!(%resolved, "Resolved redirect");
        Ok(resolved)
    }
}
