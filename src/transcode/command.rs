//! FFmpeg argument generation for resolved downloads.

use tracing::debug;

use crate::models::{ManifestRef, RenditionSelection, TransportFamily};

/// Primary input: the manifest and what was selected from it
#[derive(Debug, Clone)]
pub struct TranscodeInput {
    pub manifest: ManifestRef,
    pub selection: RenditionSelection,
    pub language: String,
}

/// Extra commentary track taken from a second manifest
#[derive(Debug, Clone)]
pub struct SecondaryAudio {
    pub input: TranscodeInput,
    /// ffmpeg `-itsoffset` value applied to the second input
    pub offset: String,
}

/// Builds ffmpeg argument vectors
#[derive(Debug, Clone, Copy, Default)]
pub struct TranscodeCommandBuilder;

impl TranscodeCommandBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Audio-only extraction of the primary language
    pub fn audio_only_args(&self, input: &TranscodeInput, output_path: &str) -> Vec<String> {
        let mut args = Self::base_args();
        args.extend([
            "-i".to_string(),
            input.manifest.url.clone(),
            "-map".to_string(),
            format!("0:a:m:language:{}", input.language),
            "-vn".to_string(),
            "-c:a".to_string(),
            "copy".to_string(),
        ]);
        Self::add_output_args(&mut args, output_path);

        debug!("Generated audio-only command with {} arguments", args.len());
        args
    }

    /// Video download with the selected renditions, optionally muxing a
    /// secondary audio track as the second audio stream
    pub fn video_args(
        &self,
        input: &TranscodeInput,
        secondary: Option<&SecondaryAudio>,
        format: &str,
        output_path: &str,
    ) -> Vec<String> {
        let mut args = Self::base_args();
        args.extend(["-i".to_string(), input.manifest.url.clone()]);

        let mut mapping = vec![
            "-map".to_string(),
            Self::video_map(input),
            "-map".to_string(),
            Self::audio_map(0, input),
        ];
        let mut codecs = vec![
            "-c:v".to_string(),
            "copy".to_string(),
            "-c:a".to_string(),
            "copy".to_string(),
        ];

        if let Some(secondary) = secondary {
            args.extend([
                "-itsoffset".to_string(),
                secondary.offset.clone(),
                "-i".to_string(),
                secondary.input.manifest.url.clone(),
            ]);
            mapping.extend(["-map".to_string(), Self::audio_map(1, &secondary.input)]);

            // "eng" on the international feed is the Sky commentary
            let secondary_label = if secondary.input.language == "eng" {
                "Sky"
            } else {
                secondary.input.language.as_str()
            };
            codecs.extend([
                "-metadata:s:a:0".to_string(),
                format!("language={}", input.language),
                "-disposition:a:0".to_string(),
                "default".to_string(),
                "-metadata:s:a:1".to_string(),
                format!("language={secondary_label}"),
                "-disposition:a:1".to_string(),
                "0".to_string(),
            ]);
        }

        args.extend(mapping);
        args.extend(codecs);

        if format == "mp4" {
            args.extend([
                "-bsf:a".to_string(),
                "aac_adtstoasc".to_string(),
                "-movflags".to_string(),
                "faststart".to_string(),
            ]);
        }
        Self::add_output_args(&mut args, output_path);

        debug!("Generated video command with {} arguments", args.len());
        args
    }

    /// Second pass that cancels centre-panned vocals from an audio file
    pub fn vocal_removal_args(&self, input_path: &str, output_path: &str) -> Vec<String> {
        let mut args = Self::base_args();
        args.extend([
            "-i".to_string(),
            input_path.to_string(),
            "-af".to_string(),
            "pan=stereo|c0=c0|c1=-1*c1,aformat=channel_layouts=mono".to_string(),
            "-c:a".to_string(),
            "aac".to_string(),
            "-b:a".to_string(),
            "256k".to_string(),
        ]);
        Self::add_output_args(&mut args, output_path);
        args
    }

    fn base_args() -> Vec<String> {
        vec!["-loglevel".to_string(), "error".to_string(), "-stats".to_string()]
    }

    fn add_output_args(args: &mut Vec<String>, output_path: &str) {
        args.extend(["-y".to_string(), output_path.to_string()]);
    }

    fn video_map(input: &TranscodeInput) -> String {
        match input.manifest.transport_family {
            TransportFamily::SegmentedHttp => format!("0:p:{}:v", input.selection.video_track_id),
            TransportFamily::ManifestDescription => {
                format!("0:v:m:id:{}", input.selection.video_track_id)
            }
        }
    }

    fn audio_map(input_index: usize, input: &TranscodeInput) -> String {
        match input.manifest.transport_family {
            TransportFamily::SegmentedHttp => format!(
                "{input_index}:p:{}:a:{}",
                input.selection.video_track_id, input.selection.audio_track_id
            ),
            TransportFamily::ManifestDescription => {
                format!("{input_index}:a:m:language:{}", input.language)
            }
        }
    }
}
