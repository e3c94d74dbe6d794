//! Download orchestration
//!
//! Runs the resolution chain for one video page URL:
//! classify → catalog → channel → playback → manifest selection, then
//! builds and runs the transcoder command. Each stage fails fast; the
//! international audio pass repeats playback resolution and selection
//! sequentially for the secondary feed.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::models::{ContentInfo, ContentKind, ContentRef, ManifestRef, ResolutionSelector};
use crate::sources::{F1TvClient, channels, classifier};
use crate::transcode::{SecondaryAudio, TranscodeCommandBuilder, TranscodeInput, TranscodeRunner};

/// Per-run choices that are not part of the persistent configuration
#[derive(Debug, Clone, Default)]
pub struct DownloadRequest {
    pub url: String,
    pub channel: Option<String>,
    pub audio_only: bool,
    pub remove_vocals: bool,
    /// Language of the secondary commentary track from the international feed
    pub international_audio: Option<String>,
}

/// Everything needed to run the transcoder
#[derive(Debug, Clone)]
pub struct DownloadPlan {
    pub content: ContentInfo,
    pub primary: TranscodeInput,
    pub secondary: Option<SecondaryAudio>,
    pub output_path: PathBuf,
    pub args: Vec<String>,
    /// Follow-up pass producing a vocal-free copy of an audio-only download
    pub vocal_removal: Option<(PathBuf, Vec<String>)>,
}

pub struct Downloader {
    client: F1TvClient,
    config: Config,
    builder: TranscodeCommandBuilder,
}

impl Downloader {
    pub fn new(config: Config) -> AppResult<Self> {
        let client = F1TvClient::new(config.api.clone(), config.token().map(str::to_string))?;
        Ok(Self {
            client,
            config,
            builder: TranscodeCommandBuilder::new(),
        })
    }

    pub fn client(&self) -> &F1TvClient {
        &self.client
    }

    pub async fn content_info(&self, url: &str) -> AppResult<ContentInfo> {
        self.client.fetch_content_info(url).await
    }

    /// Lines describing the alternate channels, `None` when the content has none
    pub fn list_channels(&self, content: &ContentInfo) -> Option<Vec<String>> {
        match &content.kind {
            ContentKind::Race { channels } => {
                Some(channels.iter().map(channels::describe_channel).collect())
            }
            ContentKind::NonRace => None,
        }
    }

    /// Tokenized manifest for the content, or for one of its race channels.
    ///
    /// Races default to the configured default channel. The channel id is
    /// only sent when the descriptor's own playback URL carries one.
    pub async fn tokenized_url(
        &self,
        content: &ContentInfo,
        channel: Option<&str>,
    ) -> AppResult<ManifestRef> {
        let query = channels::effective_channel_query(
            content,
            channel,
            &self.config.download.default_channel,
        );

        let Some(query) = query else {
            if let Some(channel) = channel {
                warn!("'{}' has no alternate channels, ignoring channel '{}'", content.title, channel);
            }
            return self.client.resolve_playback_url(&content.id, None).await;
        };

        let descriptor = channels::find_channel(content.channels(), query)
            .ok_or_else(|| AppError::not_found("channel", query))?;
        info!("Using channel '{}' ({})", descriptor.title, descriptor.channel_id);

        let channel_id = match &descriptor.playback_url {
            Some(playback_url) if !playback_url.contains("channelId") => None,
            _ => Some(descriptor.channel_id.as_str()),
        };
        self.client.resolve_playback_url(&content.id, channel_id).await
    }

    /// Resolve everything for a request without starting the transcoder
    pub async fn plan(&self, request: &DownloadRequest) -> AppResult<DownloadPlan> {
        if request.remove_vocals && !request.audio_only {
            return Err(AppError::configuration(
                "--remove-vocals can only be used with --audio-only downloads",
            ));
        }

        let content_ref = classifier::extract_content_ref(&request.url)?;
        let download = &self.config.download;
        let selector: ResolutionSelector = download.video_size.parse()?;

        let content = self.client.fetch_content(&content_ref).await?;
        let manifest = self.tokenized_url(&content, request.channel.as_deref()).await?;
        let selection = self
            .client
            .select_rendition(&manifest, &download.audio_language, &selector)
            .await?;
        let primary = TranscodeInput {
            manifest,
            selection,
            language: download.audio_language.clone(),
        };

        let extension = if request.audio_only {
            "m4a"
        } else {
            download.format.as_str()
        };
        let output_path = self.output_path(&content_ref, &content, request.channel.as_deref(), extension);
        let output = output_path.to_string_lossy().to_string();

        if request.audio_only {
            let args = self.builder.audio_only_args(&primary, &output);
            let vocal_removal = request.remove_vocals.then(|| {
                let no_vocals = no_vocals_path(&output_path);
                let args = self
                    .builder
                    .vocal_removal_args(&output, &no_vocals.to_string_lossy());
                (no_vocals, args)
            });

            return Ok(DownloadPlan {
                content,
                primary,
                secondary: None,
                output_path,
                args,
                vocal_removal,
            });
        }

        let secondary = match (&request.international_audio, content.is_race()) {
            (Some(language), true) => Some(self.international_audio(&content, language).await?),
            (Some(_), false) => {
                warn!("'{}' is not a race, skipping international audio", content.title);
                None
            }
            (None, _) => None,
        };

        let args = self
            .builder
            .video_args(&primary, secondary.as_ref(), &download.format, &output);

        Ok(DownloadPlan {
            content,
            primary,
            secondary,
            output_path,
            args,
            vocal_removal: None,
        })
    }

    /// Run a plan's transcoder command, then the vocal removal pass if any
    pub async fn run<F>(&self, plan: &DownloadPlan, mut on_progress: F) -> AppResult<()>
    where
        F: FnMut(&str),
    {
        let runner = TranscodeRunner::new(self.config.download.ffmpeg_command.clone());

        info!("Output file: {}", plan.output_path.display());
        runner.run(&plan.args, &mut on_progress).await?;

        if let Some((path, args)) = &plan.vocal_removal {
            info!("Removing vocals into {}", path.display());
            runner.run(args, &mut on_progress).await?;
        }
        Ok(())
    }

    async fn international_audio(
        &self,
        content: &ContentInfo,
        language: &str,
    ) -> AppResult<SecondaryAudio> {
        info!("Adding {} commentary as a second audio track", language);

        let channel = self.config.download.international_channel.as_str();
        let manifest = self.tokenized_url(content, Some(channel)).await?;
        let selection = self
            .client
            .select_rendition(&manifest, language, &ResolutionSelector::Best)
            .await?;

        Ok(SecondaryAudio {
            input: TranscodeInput {
                manifest,
                selection,
                language: language.to_string(),
            },
            offset: self.config.download.itsoffset.clone(),
        })
    }

    fn output_path(
        &self,
        content_ref: &ContentRef,
        content: &ContentInfo,
        channel: Option<&str>,
        extension: &str,
    ) -> PathBuf {
        let name = output_file_name(&content_ref.name, content.is_race(), channel, extension);
        match &self.config.download.output_directory {
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        }
    }
}

/// `<slug>.<ext>`, or `<slug>-<first word of channel>.<ext>` for race channels
pub fn output_file_name(slug: &str, is_race: bool, channel: Option<&str>, extension: &str) -> String {
    match channel.filter(|_| is_race) {
        Some(channel) => {
            let first_word = channel.split(' ').next().unwrap_or_default();
            format!("{slug}-{first_word}.{extension}")
        }
        None => format!("{slug}.{extension}"),
    }
}

fn no_vocals_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let file_name = match path.extension() {
        Some(ext) => format!("{stem}-no-vocals.{}", ext.to_string_lossy()),
        None => format!("{stem}-no-vocals"),
    };
    path.with_file_name(file_name)
}
