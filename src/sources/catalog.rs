//! Catalog lookups: content metadata for a video detail URL.

use serde::Deserialize;
use tracing::{debug, info};

use super::{F1TvClient, ResultEnvelope, classifier};
use crate::errors::{AppError, AppResult};
use crate::models::{ChannelDescriptor, ContentInfo, ContentKind, ContentRef, string_or_number};

const SERVICE: &str = "catalog";

#[derive(Debug, Deserialize)]
struct ContainerList {
    #[serde(default)]
    containers: Vec<Container>,
}

#[derive(Debug, Deserialize)]
struct Container {
    #[serde(deserialize_with = "string_or_number")]
    id: String,
    #[serde(default)]
    metadata: ContainerMetadata,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContainerMetadata {
    #[serde(default)]
    title: String,
    #[serde(default)]
    content_type: Option<String>,
    #[serde(default)]
    content_subtype: Option<String>,
    #[serde(default)]
    additional_streams: Option<Vec<ChannelDescriptor>>,
}

impl From<Container> for ContentInfo {
    fn from(container: Container) -> Self {
        let metadata = container.metadata;
        let kind = match metadata.additional_streams {
            Some(channels) => ContentKind::Race { channels },
            None => ContentKind::NonRace,
        };

        Self {
            id: container.id,
            title: metadata.title,
            content_type: metadata.content_type,
            content_subtype: metadata.content_subtype,
            kind,
        }
    }
}

impl F1TvClient {
    /// Resolve a video detail URL to its content metadata
    pub async fn fetch_content_info(&self, url: &str) -> AppResult<ContentInfo> {
        let content = classifier::extract_content_ref(url)?;
        self.fetch_content(&content).await
    }

    /// Fetch metadata for an already extracted content reference.
    ///
    /// The first container of the response is used; an empty list is
    /// [`AppError::NotFound`].
    pub async fn fetch_content(&self, content: &ContentRef) -> AppResult<ContentInfo> {
        let api = self.api();
        let path = format!(
            "/3.0/R/{}/{}/ALL/CONTENT/VIDEO/{}/{}/2",
            api.language_path, api.platform, content.id, api.entitlement
        );
        let url = self.endpoint(&path)?;

        let query = [
            ("contentId", content.id.as_str()),
            ("entitlement", api.entitlement.as_str()),
            ("homeCountry", api.home_country.as_str()),
        ];
        let envelope: ResultEnvelope<ContainerList> =
            self.http().get_json(SERVICE, &url, &query, &[]).await?;

        let container = envelope
            .result_obj
            .containers
            .into_iter()
            .next()
            .ok_or_else(|| AppError::not_found("content", content.id.clone()))?;

        let info = ContentInfo::from(container);
        debug!(
            "Content {} type={:?} subtype={:?} channels={}",
            info.id,
            info.content_type,
            info.content_subtype,
            info.channels().len()
        );
        info!("Resolved content '{}' ({})", info.title, info.id);
        Ok(info)
    }
}
