//! songnote - send a song snippet as a Telegram video note
//!
//! Resolves the song behind a link, downloads its video, cuts the requested
//! slice into a square clip and posts a link message plus the clip.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use songnote::pipeline::{Pipeline, RunRequest};
use songnote::services::{ClipSpec, FfmpegProcessor, TelegramSender, YtDlpFetcher};
use songnote::{FallbackOrchestrator, SongOverride, SourceLink};
use songnote_common::config::{self, ConfigOrigin};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "songnote")]
#[command(about = "Downloads a song, cuts a fragment, and sends it as a Telegram video note")]
#[command(version)]
struct Args {
    /// URL to a song (e.g. from song.link)
    #[arg(long)]
    url: String,

    /// Start time in seconds
    #[arg(long)]
    start: u32,

    /// Duration in seconds (10 to 60, longer values are clamped)
    #[arg(long)]
    duration: u32,

    /// Custom song name (requires --authorname)
    #[arg(long)]
    songname: Option<String>,

    /// Custom author name (requires --songname)
    #[arg(long)]
    authorname: Option<String>,

    /// Path to a cookies file for yt-dlp
    #[arg(long, default_value = "youtube_cookies.txt")]
    cookies: PathBuf,

    /// Use the test Telegram chat
    #[arg(short = 't', long = "test")]
    test: bool,

    /// Remove temporary files after completion (-r false to keep)
    #[arg(short = 'r', long = "remove", action = ArgAction::Set, default_value_t = true)]
    remove: bool,

    /// Config file path
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = config::resolve_config_path(args.config.as_deref());
    let (config, origin) =
        config::load_config(config_path.as_deref()).context("Failed to load config")?;
    songnote_common::logging::init(&config.logging).context("Failed to initialize logging")?;

    info!("Starting songnote v{}", env!("CARGO_PKG_VERSION"));
    match &origin {
        ConfigOrigin::File(path) => info!(path = %path.display(), "Loaded config"),
        ConfigOrigin::Missing(path) => {
            warn!(path = %path.display(), "Config file not found, using defaults")
        }
        ConfigOrigin::Defaults => info!("No config file found, using defaults"),
    }

    let chat_id = config
        .telegram
        .chat_id_for(args.test)
        .context("No target chat")?
        .to_string();
    if args.test {
        info!("Using test chat");
    }
    anyhow::ensure!(
        !config.telegram.bot_token.trim().is_empty(),
        "telegram.bot_token is not set (config file or {})",
        config::BOT_TOKEN_ENV
    );

    let clip = ClipSpec::from_request(args.start, args.duration)?;

    let song_override =
        SongOverride::from_parts(args.songname.as_deref(), args.authorname.as_deref());
    if song_override.is_none() && (args.songname.is_some() || args.authorname.is_some()) {
        warn!("Custom names need both --songname and --authorname, ignoring");
    }

    let orchestrator = FallbackOrchestrator::from_config(&config.resolver)
        .context("Failed to build metadata resolvers")?;
    let sender = TelegramSender::new(config.telegram.bot_token.clone())
        .context("Failed to build Telegram client")?;
    let pipeline = Pipeline::new(
        orchestrator,
        Box::new(YtDlpFetcher::new(&config.media.ytdlp_path, Some(args.cookies.as_path()))),
        Box::new(FfmpegProcessor::new(&config.media.ffmpeg_path)),
        Box::new(sender),
        &config.media.work_dir,
    );

    let request = RunRequest {
        link: SourceLink::new(args.url),
        clip,
        song_override,
        chat_id,
        remove_work_dir: args.remove,
    };

    let report = pipeline.run(&request).await.context("Run failed")?;
    info!(
        display = %report.presentation.display_text,
        output = %report.output_path.display(),
        "Done"
    );
    Ok(())
}
