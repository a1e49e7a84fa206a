use crate::config::HttpConfig;
use crate::domain::ports::Transport;
use crate::utils::error::{Result, TransportError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

const DEFAULT_USER_AGENT: &str = concat!("open311-client/", env!("CARGO_PKG_VERSION"));

/// [`Transport`] backed by a reqwest [`Client`].
///
/// Status codes are logged but not interpreted; error pages flow back as
/// ordinary bodies.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &HttpConfig) -> Result<Self> {
        let user_agent = config
            .user_agent
            .clone()
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(user_agent)
            .build()
            .map_err(TransportError::from)?;

        Ok(Self::new(client))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &Url) -> std::result::Result<String, TransportError> {
        let response = self.client.get(url.clone()).send().await?;
        tracing::debug!("API response status: {}", response.status());
        Ok(response.text().await?)
    }

    async fn post(
        &self,
        url: &Url,
        form: &[(String, String)],
    ) -> std::result::Result<String, TransportError> {
        let response = self.client.post(url.clone()).form(form).send().await?;
        tracing::debug!("API response status: {}", response.status());
        Ok(response.text().await?)
    }
}
