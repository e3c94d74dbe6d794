use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

use crate::errors::{AppError, AppResult};

pub mod defaults;
pub mod duration_serde;

use defaults::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub download: DownloadConfig,
    /// Entitlement token; supplied per run, never written back to disk
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// F1TV endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_entitlement")]
    pub entitlement: String,
    #[serde(default = "default_home_country")]
    pub home_country: String,
    #[serde(default = "default_language_path")]
    pub language_path: String,
    #[serde(default = "default_platform")]
    pub platform: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Total time allowed for a single request
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,
    #[serde(default = "default_connect_timeout", with = "duration_serde")]
    pub connect_timeout: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    #[serde(default = "default_audio_language")]
    pub audio_language: String,
    /// `best` or `<width>x<height>`
    #[serde(default = "default_video_size")]
    pub video_size: String,
    /// Container for video downloads (`mp4` or `ts`)
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default)]
    pub output_directory: Option<PathBuf>,
    /// Offset applied to the secondary audio input
    #[serde(default = "default_itsoffset")]
    pub itsoffset: String,
    #[serde(default = "default_ffmpeg_command")]
    pub ffmpeg_command: String,
    /// Channel used for races when none is requested
    #[serde(default = "default_channel")]
    pub default_channel: String,
    #[serde(default = "default_international_channel")]
    pub international_channel: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_entitlement() -> String {
    DEFAULT_ENTITLEMENT.to_string()
}

fn default_home_country() -> String {
    DEFAULT_HOME_COUNTRY.to_string()
}

fn default_language_path() -> String {
    DEFAULT_LANGUAGE_PATH.to_string()
}

fn default_platform() -> String {
    DEFAULT_PLATFORM.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS)
}

fn default_audio_language() -> String {
    DEFAULT_AUDIO_LANGUAGE.to_string()
}

fn default_video_size() -> String {
    DEFAULT_VIDEO_SIZE.to_string()
}

fn default_format() -> String {
    DEFAULT_FORMAT.to_string()
}

fn default_itsoffset() -> String {
    DEFAULT_ITSOFFSET.to_string()
}

fn default_ffmpeg_command() -> String {
    DEFAULT_FFMPEG_COMMAND.to_string()
}

fn default_channel() -> String {
    DEFAULT_CHANNEL.to_string()
}

fn default_international_channel() -> String {
    DEFAULT_INTERNATIONAL_CHANNEL.to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            entitlement: default_entitlement(),
            home_country: default_home_country(),
            language_path: default_language_path(),
            platform: default_platform(),
            user_agent: default_user_agent(),
            request_timeout: default_request_timeout(),
            connect_timeout: default_connect_timeout(),
        }
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            audio_language: default_audio_language(),
            video_size: default_video_size(),
            format: default_format(),
            output_directory: None,
            itsoffset: default_itsoffset(),
            ffmpeg_command: default_ffmpeg_command(),
            default_channel: default_channel(),
            international_channel: default_international_channel(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            download: DownloadConfig::default(),
            token: None,
        }
    }
}

impl Config {
    /// Layer defaults, the optional TOML file and `F1TV_*` environment variables.
    ///
    /// A missing file is not an error. Nested keys use `__` in the
    /// environment, e.g. `F1TV_DOWNLOAD__AUDIO_LANGUAGE=deu`.
    pub fn load_from_file(config_file: &str) -> AppResult<Self> {
        debug!("Loading configuration from {} and {}* environment", config_file, ENV_PREFIX);

        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_file))
            .merge(Env::raw().only(&[ENV_OUTDIR]).map(|_| "download.output_directory".into()))
            .merge(Env::prefixed(ENV_PREFIX).ignore(&["OUTDIR"]).split("__"))
            .extract()
            .map_err(|e| AppError::configuration(e.to_string()))
    }

    /// The token, if one is present and non-blank
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults_without_file() {
        Jail::expect_with(|_jail| {
            let config = Config::load_from_file("missing.toml").map_err(|e| e.to_string())?;
            assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
            assert_eq!(config.api.request_timeout, Duration::from_secs(30));
            assert_eq!(config.download.audio_language, "eng");
            assert_eq!(config.download.video_size, "best");
            assert_eq!(config.download.default_channel, "F1 LIVE");
            assert!(config.download.output_directory.is_none());
            assert!(config.token().is_none());
            Ok(())
        });
    }

    #[test]
    fn test_file_and_environment_layers() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "f1tv.toml",
                r#"
                [api]
                request_timeout = "45s"
                home_country = "NLD"

                [download]
                audio_language = "nld"
                "#,
            )?;
            jail.set_env("F1TV_DOWNLOAD__VIDEO_SIZE", "1280x720");
            jail.set_env("F1TV_TOKEN", "secret-token");
            jail.set_env("F1TV_OUTDIR", "/tmp/races");

            let config = Config::load_from_file("f1tv.toml").map_err(|e| e.to_string())?;
            assert_eq!(config.api.request_timeout, Duration::from_secs(45));
            assert_eq!(config.api.home_country, "NLD");
            assert_eq!(config.api.entitlement, DEFAULT_ENTITLEMENT);
            assert_eq!(config.download.audio_language, "nld");
            assert_eq!(config.download.video_size, "1280x720");
            assert_eq!(config.download.output_directory, Some(PathBuf::from("/tmp/races")));
            assert_eq!(config.token(), Some("secret-token"));
            Ok(())
        });
    }

    #[test]
    fn test_blank_token_is_absent() {
        let config = Config {
            token: Some("   ".to_string()),
            ..Config::default()
        };
        assert!(config.token().is_none());
    }

    #[test]
    fn test_invalid_duration_is_configuration_error() {
        Jail::expect_with(|jail| {
            jail.create_file("f1tv.toml", "[api]\nrequest_timeout = \"soon\"\n")?;
            let err = Config::load_from_file("f1tv.toml").unwrap_err();
            assert!(matches!(err, AppError::Configuration { .. }));
            Ok(())
        });
    }
}
