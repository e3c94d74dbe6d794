use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use f1tv_dl::{
    config::Config,
    downloader::{DownloadRequest, Downloader},
    errors::AppError,
    sources::is_service_url,
    utils::url::UrlUtils,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Mp4,
    Ts,
}

impl OutputFormat {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Ts => "ts",
        }
    }
}

#[derive(Parser)]
#[command(name = "f1tv-dl")]
#[command(version)]
#[command(about = "Download a video from F1TV")]
#[command(long_about = None)]
struct Cli {
    /// The F1TV URL for the video
    #[arg(value_parser = parse_service_url)]
    url: String,

    /// Entitlement token (falls back to F1TV_TOKEN / the config file)
    #[arg(short = 'T', long)]
    token: Option<String>,

    /// Download only the audio stream
    #[arg(long)]
    audio_only: bool,

    /// After an audio-only download, create a second file with vocals removed
    #[arg(long, requires = "audio_only")]
    remove_vocals: bool,

    /// Choose an alternate channel (e.g. "Lewis Hamilton")
    #[arg(short, long)]
    channel: Option<String>,

    /// Include a secondary audio track from the "INTERNATIONAL" feed
    #[arg(short, long, value_parser = ["eng", "nld", "deu", "fra", "por", "spa", "fx"])]
    international_audio: Option<String>,

    /// Time offset to sync secondary audio as '(-)hh:mm:ss.SSS'
    #[arg(short = 't', long, allow_hyphen_values = true)]
    itsoffset: Option<String>,

    /// Primary audio stream language
    #[arg(short = 'a', long)]
    audio_stream: Option<String>,

    /// Video resolution (e.g. 1920x1080, best); ignored with --audio-only
    #[arg(short = 's', long)]
    video_size: Option<String>,

    /// Video output format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Directory to save the downloaded file
    #[arg(short, long, value_name = "DIR")]
    output_directory: Option<PathBuf>,

    /// List available channels and exit
    #[arg(long)]
    channel_list: bool,

    /// Print the tokenized stream URL and exit
    #[arg(long)]
    stream_url: bool,

    /// Configuration file path
    #[arg(long, default_value = "f1tv-dl.toml")]
    config: String,

    /// Log level
    #[arg(short = 'l', long, default_value = "info", value_parser = ["trace", "debug", "info", "warn", "error"])]
    log_level: String,
}

fn parse_service_url(s: &str) -> Result<String, String> {
    if is_service_url(s) {
        Ok(s.to_string())
    } else {
        Err("Not a valid F1TV video page URL.".to_string())
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_filter = format!("f1tv_dl={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    if let Err(e) = run(cli).await {
        error!("Error: {e}");

        if e.downcast_ref::<AppError>().is_some_and(AppError::is_unauthorized) {
            warn!("The token may be invalid or expired. Provide a new one with --token or F1TV_TOKEN.");
        }
        debug!("{e:?}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load_from_file(&cli.config)?;
    debug!("Configuration loaded from: {}", cli.config);

    // Override config with CLI arguments
    if let Some(token) = cli.token {
        info!("Using manually provided authentication token.");
        config.token = Some(token);
    }
    if let Some(audio_stream) = cli.audio_stream {
        config.download.audio_language = audio_stream;
    }
    if let Some(video_size) = cli.video_size {
        config.download.video_size = video_size;
    }
    if let Some(format) = cli.format {
        config.download.format = format.as_str().to_string();
    }
    if let Some(output_directory) = cli.output_directory {
        config.download.output_directory = Some(output_directory);
    }
    if let Some(itsoffset) = cli.itsoffset {
        config.download.itsoffset = itsoffset;
    }

    let downloader = Downloader::new(config)?;

    if cli.channel_list {
        let content = downloader.content_info(&cli.url).await?;
        match downloader.list_channels(&content) {
            Some(lines) => lines.iter().for_each(|line| println!("{line}")),
            None => info!("This URL does not have additional streams."),
        }
        return Ok(());
    }

    if cli.stream_url {
        let content = downloader.content_info(&cli.url).await?;
        let manifest = downloader
            .tokenized_url(&content, cli.channel.as_deref())
            .await?;
        debug!("Stream URL: {}", UrlUtils::obfuscate_credentials(&manifest.url));
        println!("{}", manifest.url);
        return Ok(());
    }

    let request = DownloadRequest {
        url: cli.url,
        channel: cli.channel,
        audio_only: cli.audio_only,
        remove_vocals: cli.remove_vocals,
        international_audio: cli.international_audio,
    };

    let plan = downloader.plan(&request).await?;
    info!(
        "Starting {} download of '{}'",
        if request.audio_only { "audio-only" } else { "video" },
        plan.content.title
    );

    downloader
        .run(&plan, |progress| {
            print!("\r{progress}");
            let _ = std::io::stdout().flush();
        })
        .await?;

    println!();
    info!("Download complete.");
    Ok(())
}
