use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ApiConfig;
use crate::errors::{AppError, AppResult};
use crate::utils::url::UrlUtils;

/// Thin wrapper around a configured reqwest client.
///
/// Every failure is reported as [`AppError::Upstream`] tagged with the
/// calling service, with credentials stripped from the message.
#[derive(Debug, Clone)]
pub struct StandardHttpClient {
    client: Client,
}

impl StandardHttpClient {
    /// Build a client with the configured user agent and timeouts
    pub fn new(config: &ApiConfig) -> AppResult<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// GET a URL and decode the JSON body
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        service: &str,
        url: &str,
        query: &[(&str, &str)],
        headers: &[(&str, &str)],
    ) -> AppResult<T> {
        debug!("Fetching JSON from {}: {}", service, UrlUtils::obfuscate_credentials(url));

        let mut request = self.client.get(url).query(query);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = Self::send(service, request).await?;
        response.json::<T>().await.map_err(|e| {
            AppError::upstream(
                service,
                None,
                format!("Invalid response body: {}", UrlUtils::obfuscate_credentials(&e.to_string())),
            )
        })
    }

    /// GET a URL and return the body as text
    pub async fn get_text(&self, service: &str, url: &str) -> AppResult<String> {
        debug!("Fetching text from {}: {}", service, UrlUtils::obfuscate_credentials(url));

        let response = Self::send(service, self.client.get(url)).await?;
        let content = response.text().await.map_err(|e| {
            AppError::upstream(
                service,
                None,
                format!("Failed to read response: {}", UrlUtils::obfuscate_credentials(&e.to_string())),
            )
        })?;

        debug!("Fetched {} characters from {}", content.len(), service);
        Ok(content)
    }

    async fn send(service: &str, request: RequestBuilder) -> AppResult<Response> {
        let response = request.send().await.map_err(|e| {
            AppError::upstream(service, None, UrlUtils::obfuscate_credentials(&e.to_string()))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::upstream(
                service,
                Some(status.as_u16()),
                status.canonical_reason().unwrap_or("Unknown"),
            ));
        }

        Ok(response)
    }
}
