//! Playback resolution: exchange content (and channel) ids plus the
//! entitlement token for a tokenized manifest URL.

use serde::Deserialize;
use tracing::{info, warn};

use super::{F1TvClient, ResultEnvelope};
use crate::errors::AppResult;
use crate::models::ManifestRef;
use crate::utils::url::UrlUtils;

const SERVICE: &str = "playback";
const TOKEN_HEADER: &str = "entitlementToken";
const KNOWN_STREAM_TYPES: [&str; 2] = ["HLS", "DASH"];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaybackResult {
    url: String,
    #[serde(default)]
    stream_type: String,
}

impl F1TvClient {
    /// Resolve the tokenized manifest for `content_id`, optionally for one channel.
    ///
    /// Fails with [`crate::errors::AppError::Auth`] before any request when no
    /// token is configured. An unknown declared stream type only logs a warning.
    pub async fn resolve_playback_url(
        &self,
        content_id: &str,
        channel_id: Option<&str>,
    ) -> AppResult<ManifestRef> {
        let token = self.require_token()?;

        let api = self.api();
        let path = format!("/2.0/R/{}/{}/ALL/CONTENT/PLAY", api.language_path, api.platform);
        let url = self.endpoint(&path)?;

        let query: Vec<(&str, &str)> = match channel_id {
            Some(channel_id) => vec![("channelId", channel_id), ("contentId", content_id)],
            None => vec![("contentId", content_id)],
        };
        let headers = [(TOKEN_HEADER, token)];

        let envelope: ResultEnvelope<PlaybackResult> =
            self.http().get_json(SERVICE, &url, &query, &headers).await?;
        let result = envelope.result_obj;

        if !KNOWN_STREAM_TYPES.contains(&result.stream_type.as_str()) {
            warn!(
                "Stream type may not work. Found '{}', expected one of {:?}",
                result.stream_type, KNOWN_STREAM_TYPES
            );
        }

        let manifest = ManifestRef::new(result.url, result.stream_type);
        info!(
            "Resolved {} manifest: {}",
            manifest.transport_family,
            UrlUtils::obfuscate_credentials(&manifest.url)
        );
        Ok(manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use crate::errors::AppError;

    #[tokio::test]
    async fn test_missing_token_fails_before_request() {
        let api = ApiConfig {
            // Nothing listens here; reaching the network would be an Upstream error
            base_url: "http://127.0.0.1:9".to_string(),
            ..ApiConfig::default()
        };

        for token in [None, Some(String::new()), Some("  ".to_string())] {
            let client = F1TvClient::new(api.clone(), token).unwrap();
            let err = client.resolve_playback_url("1000005104", None).await.unwrap_err();
            assert!(matches!(err, AppError::Auth { .. }), "unexpected error: {err}");
        }
    }
}
