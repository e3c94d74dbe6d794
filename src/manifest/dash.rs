//! Manifest-description (DASH MPD) documents.
//!
//! The document is read twice. A structured serde pass lists the video
//! representations (id, bandwidth, size) but keeps no per-set language;
//! a generic element tree pass finds the audio adaptation set for a
//! language. Track ids on both sides are the manifest's own numeric
//! representation ids.

use serde::Deserialize;
use tracing::debug;

use super::xml_tree::{self, XmlNode};
use super::{pick_video, VideoCandidate};
use crate::errors::{AppError, AppResult};
use crate::models::{RenditionSelection, Resolution, ResolutionSelector, TransportFamily};

#[derive(Debug, Deserialize)]
struct MpdDocument {
    #[serde(rename = "Period", default)]
    periods: Vec<PeriodElement>,
}

#[derive(Debug, Deserialize)]
struct PeriodElement {
    #[serde(rename = "AdaptationSet", default)]
    adaptation_sets: Vec<AdaptationSetElement>,
}

#[derive(Debug, Deserialize)]
struct AdaptationSetElement {
    #[serde(rename = "@mimeType")]
    mime_type: Option<String>,
    #[serde(rename = "@contentType")]
    content_type: Option<String>,
    #[serde(rename = "@width")]
    width: Option<u64>,
    #[serde(rename = "@height")]
    height: Option<u64>,
    #[serde(rename = "Representation", default)]
    representations: Vec<RepresentationElement>,
}

#[derive(Debug, Deserialize)]
struct RepresentationElement {
    #[serde(rename = "@id")]
    id: Option<String>,
    #[serde(rename = "@bandwidth")]
    bandwidth: Option<u64>,
    #[serde(rename = "@width")]
    width: Option<u64>,
    #[serde(rename = "@height")]
    height: Option<u64>,
    #[serde(rename = "@mimeType")]
    mime_type: Option<String>,
}

/// A video representation from the structured pass
#[derive(Debug, Clone, PartialEq)]
pub struct DashPlaylist {
    /// Representation id, expected to be numeric
    pub name: String,
    pub bandwidth: u64,
    pub resolution: Option<Resolution>,
}

#[derive(Debug, Clone)]
pub struct DashManifest {
    pub playlists: Vec<DashPlaylist>,
    pub document: XmlNode,
}

fn is_video(mime_type: Option<&str>, content_type: Option<&str>) -> bool {
    mime_type.is_some_and(|m| m.starts_with("video/")) || content_type == Some("video")
}

fn is_audio(set: &XmlNode) -> bool {
    let mime_type = set.attribute("mimeType").or_else(|| {
        set.first_child_named("Representation")
            .and_then(|rep| rep.attribute("mimeType"))
    });
    mime_type.is_some_and(|m| m.starts_with("audio/")) || set.attribute("contentType") == Some("audio")
}

impl DashManifest {
    pub fn parse(body: &str) -> AppResult<Self> {
        let mpd: MpdDocument = quick_xml::de::from_str(body)
            .map_err(|e| AppError::parse(TransportFamily::ManifestDescription, e.to_string()))?;
        let document = xml_tree::parse_document(body)
            .map_err(|e| AppError::parse(TransportFamily::ManifestDescription, e))?;

        let playlists: Vec<DashPlaylist> = mpd
            .periods
            .iter()
            .flat_map(|period| &period.adaptation_sets)
            .flat_map(|set| {
                set.representations.iter().filter_map(move |rep| {
                    let mime_type = rep.mime_type.as_deref().or(set.mime_type.as_deref());
                    if !is_video(mime_type, set.content_type.as_deref()) {
                        return None;
                    }
                    Some(DashPlaylist {
                        name: rep.id.clone().unwrap_or_default(),
                        bandwidth: rep.bandwidth.unwrap_or_default(),
                        resolution: rep
                            .width
                            .or(set.width)
                            .zip(rep.height.or(set.height))
                            .map(|(width, height)| Resolution { width, height }),
                    })
                })
            })
            .collect();

        debug!("Parsed MPD with {} video representations", playlists.len());
        Ok(Self { playlists, document })
    }

    pub fn select(&self, language: &str, selector: &ResolutionSelector) -> AppResult<RenditionSelection> {
        // Candidates carry the playlist position; only the winner's id has to be numeric
        let candidates = self
            .playlists
            .iter()
            .enumerate()
            .map(|(index, playlist)| VideoCandidate {
                track_id: index as u32,
                bandwidth: playlist.bandwidth,
                resolution: playlist.resolution,
            });

        let chosen = pick_video(candidates, selector).ok_or_else(|| {
            AppError::rendition_not_found(format!("no video representation matches '{selector}'"))
        })?;
        let playlist = &self.playlists[chosen.track_id as usize];

        Ok(RenditionSelection {
            video_track_id: parse_track_id(&playlist.name)?,
            audio_track_id: self.audio_track_id(language)?,
            bandwidth: chosen.bandwidth,
        })
    }

    /// Id of the first representation in the first audio adaptation set for `language`
    pub fn audio_track_id(&self, language: &str) -> AppResult<u32> {
        let adaptation_set = self
            .document
            .descendants_named("AdaptationSet")
            .into_iter()
            .find(|set| is_audio(set) && set.attribute("lang") == Some(language))
            .ok_or_else(|| {
                AppError::rendition_not_found(format!("no '{language}' audio adaptation set"))
            })?;

        let id = adaptation_set
            .first_child_named("Representation")
            .and_then(|rep| rep.attribute("id"))
            .ok_or_else(|| {
                AppError::rendition_not_found(format!(
                    "'{language}' audio adaptation set has no representation"
                ))
            })?;

        parse_track_id(id)
    }
}

fn parse_track_id(id: &str) -> AppResult<u32> {
    id.trim().parse().map_err(|_| {
        AppError::parse(
            TransportFamily::ManifestDescription,
            format!("representation id '{id}' is not numeric"),
        )
    })
}
