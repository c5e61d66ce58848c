use std::time::Duration;

use color_eyre::eyre::{Result, WrapErr};
use reqwest::Client;

use crate::config::Config;
use crate::ports::http::{HttpTransport, RequestBody, TransportError};

/// `HttpTransport` backed by a shared reqwest client.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .wrap_err("Failed to build http client")?;
        Ok(Self { client })
    }

    fn check_status(response: reqwest::Response) -> Result<reqwest::Response, TransportError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(TransportError::Status {
                url: response.url().to_string(),
                status: status.as_u16(),
            })
        }
    }
}

#[async_trait::async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post(&self, url: &str, body: RequestBody) -> Result<Vec<u8>, TransportError> {
        let request = match body {
            // This automatically serializes to x-www-form-urlencoded and sets the header
            RequestBody::Form(pairs) => self.client.post(url).form(&pairs),
            RequestBody::Json(value) => self.client.post(url).json(&value),
        };

        let response = Self::check_status(request.send().await?)?;
        let bytes = response.bytes().await?;
        tracing::trace!(url, bytes = bytes.len(), "Received response");
        Ok(bytes.to_vec())
    }

    async fn resolve_redirect(&self, url: &str) -> Result<String, TransportError> {
        let response = Self::check_status(self.client.get(url).send().await?)?;
        Ok(response.url().to_string())
    }
}
