//! F1TV API access
//!
//! The resolution chain runs leaves first:
//!
//! - [`classifier`]: is this a video detail URL, and which content does it name
//! - [`catalog`]: content metadata, including alternate race channels
//! - [`channels`]: choose one alternate channel by text query
//! - [`playback`]: tokenized manifest URL for content (and channel)
//!
//! [`F1TvClient`] carries the API settings and the entitlement token
//! explicitly; there is no process-wide state.

pub mod catalog;
pub mod channels;
pub mod classifier;
pub mod playback;

use serde::Deserialize;

use crate::config::ApiConfig;
use crate::errors::{AppError, AppResult};
use crate::utils::StandardHttpClient;
use crate::utils::url::UrlUtils;

pub use channels::find_channel;
pub use classifier::{extract_content_ref, is_service_url};

/// Every F1TV response wraps its payload in `resultObj`
#[derive(Debug, Deserialize)]
pub(crate) struct ResultEnvelope<T> {
    #[serde(rename = "resultObj")]
    pub result_obj: T,
}

/// Client for the catalog, playback and manifest endpoints
#[derive(Debug, Clone)]
pub struct F1TvClient {
    http: StandardHttpClient,
    api: ApiConfig,
    token: Option<String>,
}

impl F1TvClient {
    pub fn new(api: ApiConfig, token: Option<String>) -> AppResult<Self> {
        let http = StandardHttpClient::new(&api)?;
        Ok(Self { http, api, token })
    }

    pub fn api(&self) -> &ApiConfig {
        &self.api
    }

    pub(crate) fn http(&self) -> &StandardHttpClient {
        &self.http
    }

    /// Token for authenticated calls, rejecting absent or blank values
    pub(crate) fn require_token(&self) -> AppResult<&str> {
        self.token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                AppError::auth("Authentication token is missing. Provide it with --token or F1TV_TOKEN.")
            })
    }

    pub(crate) fn endpoint(&self, path: &str) -> AppResult<String> {
        UrlUtils::join(&self.api.base_url, path).map_err(|e| {
            AppError::configuration(format!("Invalid API base URL '{}': {e}", self.api.base_url))
        })
    }
}
