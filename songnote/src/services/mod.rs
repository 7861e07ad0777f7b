//! Collaborators run after metadata resolution
//!
//! - `media_fetcher` - video download (yt-dlp)
//! - `media_processor` - clip cut and re-encode (ffmpeg)
//! - `telegram` - message and video note delivery
//! - `work_dir` - working directory lifecycle

pub mod media_fetcher;
pub mod media_processor;
pub mod process_output;
pub mod telegram;
pub mod work_dir;

pub use media_fetcher::{MediaFetcher, YtDlpFetcher};
pub use media_processor::{ClipSpec, FfmpegProcessor, MediaProcessor};
pub use telegram::{MessageSender, TelegramSender};
pub use work_dir::WorkDir;
