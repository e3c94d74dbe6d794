//! Domain models shared by the resolvers, the manifest selector and the
//! transcode builder. Everything here lives for a single run only.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::AppError;

/// Content identifier and slug taken from a video detail URL path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentRef {
    pub id: String,
    pub name: String,
}

/// Whether a piece of content offers alternate channels.
///
/// Decided once when the catalog response is converted; callers match on
/// this instead of probing for optional fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ContentKind {
    Race { channels: Vec<ChannelDescriptor> },
    NonRace,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentInfo {
    pub id: String,
    pub title: String,
    pub content_type: Option<String>,
    pub content_subtype: Option<String>,
    pub kind: ContentKind,
}

impl ContentInfo {
    pub fn is_race(&self) -> bool {
        matches!(self.kind, ContentKind::Race { .. })
    }

    /// Alternate channels, empty for non-race content
    pub fn channels(&self) -> &[ChannelDescriptor] {
        match &self.kind {
            ContentKind::Race { channels } => channels,
            ContentKind::NonRace => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelType {
    /// On-board camera feed
    Obc,
    #[serde(other)]
    Other,
}

/// One alternate feed of a race event, as returned by the catalog API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelDescriptor {
    #[serde(rename = "type")]
    pub kind: ChannelType,
    #[serde(default)]
    pub reporting_name: String,
    #[serde(default)]
    pub title: String,
    #[serde(deserialize_with = "string_or_number")]
    pub channel_id: String,
    #[serde(default)]
    pub playback_url: Option<String>,
    #[serde(default)]
    pub driver_first_name: Option<String>,
    #[serde(default)]
    pub driver_last_name: Option<String>,
    #[serde(default)]
    pub racing_number: Option<u32>,
}

impl ChannelDescriptor {
    pub fn driver_full_name(&self) -> Option<String> {
        match (&self.driver_first_name, &self.driver_last_name) {
            (Some(first), Some(last)) => Some(format!("{first} {last}")),
            (Some(name), None) | (None, Some(name)) => Some(name.clone()),
            (None, None) => None,
        }
    }

    /// Ordered text fields a channel query is matched against
    pub fn search_fields(&self) -> Vec<String> {
        let mut fields = vec![self.reporting_name.clone(), self.title.clone()];
        if self.kind == ChannelType::Obc {
            fields.extend(self.driver_full_name());
            fields.extend(self.racing_number.map(|n| n.to_string()));
        }
        fields
    }
}

/// Manifest dialect of a tokenized playback URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransportFamily {
    /// HLS style line-oriented playlists
    SegmentedHttp,
    /// DASH MPD documents
    ManifestDescription,
}

impl TransportFamily {
    pub const MANIFEST_DESCRIPTION_MARKER: &'static str = ".mpd";

    /// Infer the family from the file marker of a manifest URL.
    ///
    /// The query string is ignored when the URL parses, so tokenized URLs
    /// such as `.../index.mpd?token=..` still count as manifest-description.
    pub fn from_manifest_url(manifest_url: &str) -> Self {
        let path = url::Url::parse(manifest_url)
            .map(|u| u.path().to_string())
            .unwrap_or_else(|_| manifest_url.to_string());

        if path
            .to_ascii_lowercase()
            .ends_with(Self::MANIFEST_DESCRIPTION_MARKER)
        {
            Self::ManifestDescription
        } else {
            Self::SegmentedHttp
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SegmentedHttp => "segmented-http",
            Self::ManifestDescription => "manifest-description",
        }
    }
}

impl fmt::Display for TransportFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestRef {
    pub url: String,
    pub transport_family: TransportFamily,
    /// Stream type declared by the playback API (`HLS`, `DASH`, ...)
    pub stream_type: String,
}

impl ManifestRef {
    pub fn new<U: Into<String>, S: Into<String>>(url: U, stream_type: S) -> Self {
        let url = url.into();
        Self {
            transport_family: TransportFamily::from_manifest_url(&url),
            url,
            stream_type: stream_type.into(),
        }
    }
}

/// Normalized result of rendition selection.
///
/// Track ids are family specific: positional indexes for segmented-http,
/// the manifest's own numeric representation ids for manifest-description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RenditionSelection {
    pub video_track_id: u32,
    pub audio_track_id: u32,
    pub bandwidth: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
    pub width: u64,
    pub height: u64,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Requested video size: highest bandwidth, or an exact `<width>x<height>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSelector {
    Best,
    Exact(Resolution),
}

impl FromStr for ResolutionSelector {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "best" {
            return Ok(Self::Best);
        }

        let invalid = || {
            AppError::configuration(format!(
                "invalid video size '{s}', expected 'best' or '<width>x<height>'"
            ))
        };
        let (width, height) = s.split_once('x').ok_or_else(invalid)?;
        let width = width.trim().parse().map_err(|_| invalid())?;
        let height = height.trim().parse().map_err(|_| invalid())?;

        Ok(Self::Exact(Resolution { width, height }))
    }
}

impl fmt::Display for ResolutionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Best => f.write_str("best"),
            Self::Exact(resolution) => resolution.fmt(f),
        }
    }
}

/// Accept ids that the API sends either as JSON strings or numbers
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(serde_json::Number),
    }

    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s,
        StringOrNumber::Number(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_transport_family_from_url() {
        assert_eq!(
            TransportFamily::from_manifest_url("https://cdn.example.com/a/index.mpd"),
            TransportFamily::ManifestDescription
        );
        assert_eq!(
            TransportFamily::from_manifest_url("https://cdn.example.com/a/index.mpd?token=abc"),
            TransportFamily::ManifestDescription
        );
        assert_eq!(
            TransportFamily::from_manifest_url("https://cdn.example.com/a/index.m3u8?token=abc"),
            TransportFamily::SegmentedHttp
        );
        assert_eq!(
            TransportFamily::from_manifest_url("not a url.mpd"),
            TransportFamily::ManifestDescription
        );
    }

    #[test]
    fn test_resolution_selector_parse() {
        assert_eq!("best".parse::<ResolutionSelector>().unwrap(), ResolutionSelector::Best);
        assert_eq!(
            "1920x1080".parse::<ResolutionSelector>().unwrap(),
            ResolutionSelector::Exact(Resolution {
                width: 1920,
                height: 1080
            })
        );
        assert!("1920".parse::<ResolutionSelector>().is_err());
        assert!("widexhigh".parse::<ResolutionSelector>().is_err());
        assert!("BEST".parse::<ResolutionSelector>().is_err());
    }

    #[test]
    fn test_channel_descriptor_deserialize() {
        let channel: ChannelDescriptor = serde_json::from_value(json!({
            "type": "obc",
            "reportingName": "HAMILTON",
            "title": "HAM",
            "channelId": 1033,
            "playbackUrl": "CONTENT/PLAY?channelId=1033&contentId=1000005104",
            "driverFirstName": "Lewis",
            "driverLastName": "Hamilton",
            "racingNumber": 44,
            "teamName": "Mercedes"
        }))
        .unwrap();

        assert_eq!(channel.kind, ChannelType::Obc);
        assert_eq!(channel.channel_id, "1033");
        assert_eq!(channel.driver_full_name().as_deref(), Some("Lewis Hamilton"));
        assert_eq!(
            channel.search_fields(),
            vec!["HAMILTON", "HAM", "Lewis Hamilton", "44"]
        );
    }

    #[test]
    fn test_non_obc_search_fields_skip_driver() {
        let channel: ChannelDescriptor = serde_json::from_value(json!({
            "type": "additional",
            "reportingName": "TRACKER",
            "title": "Live Timing",
            "channelId": "1040",
            "driverFirstName": "Ignored"
        }))
        .unwrap();

        assert_eq!(channel.kind, ChannelType::Other);
        assert_eq!(channel.search_fields(), vec!["TRACKER", "Live Timing"]);
    }
}
