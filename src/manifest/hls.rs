//! Segmented-HTTP (HLS) master playlists.
//!
//! Video track ids are positions in the master playlist's variant list,
//! I-frame variants included; audio track ids are positions within the
//! audio rendition group the chosen variant references.

use m3u8_rs::{AlternativeMediaType, MasterPlaylist, Playlist};
use tracing::debug;

use super::{pick_video, VideoCandidate};
use crate::errors::{AppError, AppResult};
use crate::models::{RenditionSelection, Resolution, ResolutionSelector, TransportFamily};

#[derive(Debug, Clone, PartialEq)]
pub struct HlsAudioTrack {
    pub name: String,
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HlsVariant {
    pub bandwidth: u64,
    pub resolution: Option<Resolution>,
    pub is_i_frame_only: bool,
    pub audio: Vec<HlsAudioTrack>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HlsManifest {
    pub variants: Vec<HlsVariant>,
}

impl HlsManifest {
    pub fn parse(body: &str) -> AppResult<Self> {
        let playlist = m3u8_rs::parse_playlist_res(body.as_bytes()).map_err(|e| {
            AppError::parse(TransportFamily::SegmentedHttp, format!("{e:?}"))
        })?;

        match playlist {
            Playlist::MasterPlaylist(master) => Ok(Self::from_master(master)),
            Playlist::MediaPlaylist(_) => {
                debug!("Manifest is a media playlist, no variants to choose from");
                Ok(Self::default())
            }
        }
    }

    fn from_master(master: MasterPlaylist) -> Self {
        let variants = master
            .variants
            .iter()
            .map(|variant| {
                let audio = variant
                    .audio
                    .as_deref()
                    .map(|group| {
                        master
                            .alternatives
                            .iter()
                            .filter(|alt| {
                                matches!(alt.media_type, AlternativeMediaType::Audio)
                                    && alt.group_id == group
                            })
                            .map(|alt| HlsAudioTrack {
                                name: alt.name.clone(),
                                language: alt.language.clone(),
                            })
                            .collect()
                    })
                    .unwrap_or_default();

                HlsVariant {
                    bandwidth: variant.bandwidth,
                    resolution: variant.resolution.as_ref().map(|r| Resolution {
                        width: r.width,
                        height: r.height,
                    }),
                    is_i_frame_only: variant.is_i_frame,
                    audio,
                }
            })
            .collect();

        Self { variants }
    }

    pub fn select(&self, language: &str, selector: &ResolutionSelector) -> AppResult<RenditionSelection> {
        let candidates = self
            .variants
            .iter()
            .enumerate()
            .filter(|(_, variant)| !variant.is_i_frame_only)
            .map(|(index, variant)| VideoCandidate {
                track_id: index as u32,
                bandwidth: variant.bandwidth,
                resolution: variant.resolution,
            });

        let chosen = pick_video(candidates, selector).ok_or_else(|| {
            AppError::rendition_not_found(format!("no video variant matches '{selector}'"))
        })?;
        let variant = &self.variants[chosen.track_id as usize];

        let audio_track_id = variant
            .audio
            .iter()
            .position(|track| track.language.as_deref() == Some(language))
            .ok_or_else(|| {
                AppError::rendition_not_found(format!(
                    "variant {} has no '{language}' audio track",
                    chosen.track_id
                ))
            })?;

        Ok(RenditionSelection {
            video_track_id: chosen.track_id,
            audio_track_id: audio_track_id as u32,
            bandwidth: chosen.bandwidth,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MASTER: &str = r#"#EXTM3U
#EXT-X-VERSION:6
#EXT-X-INDEPENDENT-SEGMENTS
#EXT-X-MEDIA:TYPE=AUDIO,GROUP-ID="aac",LANGUAGE="eng",NAME="English",DEFAULT=YES,AUTOSELECT=YES,URI="audio/eng.m3u8"
#EXT-X-MEDIA:TYPE=AUDIO,GROUP-ID="aac",LANGUAGE="deu",NAME="Deutsch",DEFAULT=NO,AUTOSELECT=YES,URI="audio/deu.m3u8"
#EXT-X-MEDIA:TYPE=AUDIO,GROUP-ID="aac",LANGUAGE="fx",NAME="FX",DEFAULT=NO,AUTOSELECT=YES,URI="audio/fx.m3u8"
#EXT-X-STREAM-INF:BANDWIDTH=1000,RESOLUTION=640x360,CODECS="avc1.4d401e,mp4a.40.2",AUDIO="aac"
video/360.m3u8
#EXT-X-STREAM-INF:BANDWIDTH=5000,RESOLUTION=1920x1080,CODECS="avc1.640028,mp4a.40.2",AUDIO="aac"
video/1080.m3u8
#EXT-X-STREAM-INF:BANDWIDTH=3000,RESOLUTION=1280x720,CODECS="avc1.4d401f,mp4a.40.2",AUDIO="aac"
video/720.m3u8
"#;

    fn parse(body: &str) -> HlsManifest {
        HlsManifest::parse(body).unwrap()
    }

    #[test]
    fn test_parse_master_playlist() {
        let manifest = parse(MASTER);
        assert_eq!(manifest.variants.len(), 3);
        assert_eq!(manifest.variants[1].bandwidth, 5000);
        assert_eq!(
            manifest.variants[1].resolution,
            Some(Resolution { width: 1920, height: 1080 })
        );
        let languages: Vec<_> = manifest.variants[0]
            .audio
            .iter()
            .map(|a| a.language.as_deref().unwrap())
            .collect();
        assert_eq!(languages, vec!["eng", "deu", "fx"]);
    }

    #[test]
    fn test_best_picks_highest_bandwidth() {
        let selection = parse(MASTER).select("eng", &ResolutionSelector::Best).unwrap();
        assert_eq!(selection.video_track_id, 1);
        assert_eq!(selection.audio_track_id, 0);
        assert_eq!(selection.bandwidth, 5000);
    }

    #[test]
    fn test_exact_resolution_ignores_bandwidth() {
        let selector: ResolutionSelector = "1280x720".parse().unwrap();
        let selection = parse(MASTER).select("deu", &selector).unwrap();
        assert_eq!(selection.video_track_id, 2);
        assert_eq!(selection.audio_track_id, 1);
        assert_eq!(selection.bandwidth, 3000);
    }

    #[test]
    fn test_missing_audio_language_is_an_error() {
        let err = parse(MASTER).select("spa", &ResolutionSelector::Best).unwrap_err();
        assert!(matches!(err, AppError::RenditionNotFound { .. }));
    }

    #[test]
    fn test_missing_resolution_is_an_error() {
        let selector: ResolutionSelector = "3840x2160".parse().unwrap();
        let err = parse(MASTER).select("eng", &selector).unwrap_err();
        assert!(matches!(err, AppError::RenditionNotFound { .. }));
    }

    #[test]
    fn test_i_frame_variants_are_skipped_but_keep_indexes() {
        let body = r#"#EXTM3U
#EXT-X-MEDIA:TYPE=AUDIO,GROUP-ID="aac",LANGUAGE="eng",NAME="English",URI="audio/eng.m3u8"
#EXT-X-I-FRAME-STREAM-INF:BANDWIDTH=90000,RESOLUTION=1920x1080,URI="iframe/1080.m3u8"
#EXT-X-STREAM-INF:BANDWIDTH=4000,RESOLUTION=1920x1080,AUDIO="aac"
video/1080.m3u8
"#;
        let manifest = parse(body);
        assert_eq!(manifest.variants.len(), 2);
        assert!(manifest.variants.iter().any(|v| v.is_i_frame_only));

        let selection = manifest.select("eng", &ResolutionSelector::Best).unwrap();
        let chosen = &manifest.variants[selection.video_track_id as usize];
        assert!(!chosen.is_i_frame_only);
        assert_eq!(chosen.bandwidth, 4000);
    }

    #[test]
    fn test_only_i_frame_variants_yield_no_rendition() {
        let body = r#"#EXTM3U
#EXT-X-I-FRAME-STREAM-INF:BANDWIDTH=90000,RESOLUTION=1920x1080,URI="iframe/1080.m3u8"
"#;
        let err = parse(body).select("eng", &ResolutionSelector::Best).unwrap_err();
        assert!(matches!(err, AppError::RenditionNotFound { .. }));
    }

    #[test]
    fn test_media_playlist_has_no_variants() {
        let body = "#EXTM3U\n#EXT-X-TARGETDURATION:6\n#EXTINF:6.0,\nsegment0.ts\n#EXT-X-ENDLIST\n";
        let manifest = parse(body);
        assert!(manifest.variants.is_empty());
        let err = manifest.select("eng", &ResolutionSelector::Best).unwrap_err();
        assert!(matches!(err, AppError::RenditionNotFound { .. }));
    }

    #[test]
    fn test_audio_group_is_per_variant() {
        let body = r#"#EXTM3U
#EXT-X-MEDIA:TYPE=AUDIO,GROUP-ID="low",LANGUAGE="eng",NAME="English",URI="low/eng.m3u8"
#EXT-X-MEDIA:TYPE=AUDIO,GROUP-ID="high",LANGUAGE="nld",NAME="Nederlands",URI="high/nld.m3u8"
#EXT-X-MEDIA:TYPE=AUDIO,GROUP-ID="high",LANGUAGE="eng",NAME="English",URI="high/eng.m3u8"
#EXT-X-STREAM-INF:BANDWIDTH=1000,RESOLUTION=640x360,AUDIO="low"
low.m3u8
#EXT-X-STREAM-INF:BANDWIDTH=6000,RESOLUTION=1920x1080,AUDIO="high"
high.m3u8
"#;
        let selection = parse(body).select("eng", &ResolutionSelector::Best).unwrap();
        assert_eq!(selection.video_track_id, 1);
        assert_eq!(selection.audio_track_id, 1);
    }
}
