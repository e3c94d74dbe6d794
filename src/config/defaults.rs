/// Configuration default values
///
/// This module contains all the default values for configuration options,
/// making them easily changeable in one central location.
// API defaults
pub const DEFAULT_BASE_URL: &str = "https://f1tv.formula1.com";
pub const DEFAULT_ENTITLEMENT: &str = "F1_TV_Pro_Annual";
pub const DEFAULT_HOME_COUNTRY: &str = "USA";
pub const DEFAULT_LANGUAGE_PATH: &str = "ENG";
pub const DEFAULT_PLATFORM: &str = "BIG_SCREEN_HLS";
pub const DEFAULT_USER_AGENT: &str = "AppleTV6,2/11.1";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

// Download defaults
pub const DEFAULT_AUDIO_LANGUAGE: &str = "eng";
pub const DEFAULT_VIDEO_SIZE: &str = "best";
pub const DEFAULT_FORMAT: &str = "mp4";
pub const DEFAULT_ITSOFFSET: &str = "-00:00:04.750";
pub const DEFAULT_FFMPEG_COMMAND: &str = "ffmpeg";
pub const DEFAULT_CHANNEL: &str = "F1 LIVE";
pub const DEFAULT_INTERNATIONAL_CHANNEL: &str = "INTERNATIONAL";

// Environment
pub const ENV_PREFIX: &str = "F1TV_";
/// Legacy output directory variable, mapped onto `download.output_directory`
pub const ENV_OUTDIR: &str = "F1TV_OUTDIR";
