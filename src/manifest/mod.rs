//! Manifest parsing and rendition selection.
//!
//! The two manifest families are parsed by independent modules with their
//! own shapes ([`hls::HlsManifest`], [`dash::DashManifest`]); they share only
//! the video selection policy and the [`RenditionSelection`] output.
//!
//! Video policy:
//! - `best`: strictly greater bandwidth than the running maximum, seeded at 0,
//!   so the first of equal bandwidths wins and zero bandwidths never win
//! - `<width>x<height>`: exact size match, the last match wins

use tracing::{debug, info};

use crate::errors::AppResult;
use crate::models::{ManifestRef, RenditionSelection, Resolution, ResolutionSelector, TransportFamily};
use crate::sources::F1TvClient;
use crate::utils::url::UrlUtils;

pub mod dash;
pub mod hls;
pub mod xml_tree;

pub use dash::DashManifest;
pub use hls::HlsManifest;

const SERVICE: &str = "manifest";

/// A manifest body parsed according to its transport family
#[derive(Debug, Clone)]
pub enum ParsedManifest {
    SegmentedHttp(HlsManifest),
    ManifestDescription(DashManifest),
}

impl ParsedManifest {
    pub fn parse(family: TransportFamily, body: &str) -> AppResult<Self> {
        match family {
            TransportFamily::SegmentedHttp => HlsManifest::parse(body).map(Self::SegmentedHttp),
            TransportFamily::ManifestDescription => {
                DashManifest::parse(body).map(Self::ManifestDescription)
            }
        }
    }

    pub fn family(&self) -> TransportFamily {
        match self {
            Self::SegmentedHttp(_) => TransportFamily::SegmentedHttp,
            Self::ManifestDescription(_) => TransportFamily::ManifestDescription,
        }
    }

    /// Choose one video rendition and the audio track for `language`
    pub fn select_rendition(
        &self,
        language: &str,
        selector: &ResolutionSelector,
    ) -> AppResult<RenditionSelection> {
        let selection = match self {
            Self::SegmentedHttp(manifest) => manifest.select(language, selector),
            Self::ManifestDescription(manifest) => manifest.select(language, selector),
        }?;

        debug!(
            "Selected {} rendition: video={} audio={} bandwidth={}",
            self.family(),
            selection.video_track_id,
            selection.audio_track_id,
            selection.bandwidth
        );
        Ok(selection)
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct VideoCandidate {
    pub track_id: u32,
    pub bandwidth: u64,
    pub resolution: Option<Resolution>,
}

pub(crate) fn pick_video<I>(candidates: I, selector: &ResolutionSelector) -> Option<VideoCandidate>
where
    I: IntoIterator<Item = VideoCandidate>,
{
    let mut chosen: Option<VideoCandidate> = None;
    let mut max_bandwidth = 0;

    for candidate in candidates {
        match selector {
            ResolutionSelector::Best => {
                if candidate.bandwidth > max_bandwidth {
                    max_bandwidth = candidate.bandwidth;
                    chosen = Some(candidate);
                }
            }
            ResolutionSelector::Exact(wanted) => {
                if candidate.resolution.as_ref() == Some(wanted) {
                    chosen = Some(candidate);
                }
            }
        }
    }

    chosen
}

impl F1TvClient {
    /// Download and parse the manifest behind a tokenized URL
    pub async fn fetch_manifest(&self, manifest: &ManifestRef) -> AppResult<ParsedManifest> {
        let body = self.http().get_text(SERVICE, &manifest.url).await?;
        ParsedManifest::parse(manifest.transport_family, &body)
    }

    /// Fetch the manifest and select renditions in one step
    pub async fn select_rendition(
        &self,
        manifest: &ManifestRef,
        language: &str,
        selector: &ResolutionSelector,
    ) -> AppResult<RenditionSelection> {
        let parsed = self.fetch_manifest(manifest).await?;
        let selection = parsed.select_rendition(language, selector)?;
        info!(
            "Using {} rendition video={} audio={} ({} bps) from {}",
            manifest.transport_family,
            selection.video_track_id,
            selection.audio_track_id,
            selection.bandwidth,
            UrlUtils::obfuscate_credentials(&manifest.url)
        );
        Ok(selection)
    }
}
