//! Video download through yt-dlp

use super::process_output::run_streaming;
use crate::error::MediaError;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{info, warn};

/// Downloads a video to a local file
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    async fn fetch(&self, url: &str, output: &Path) -> Result<(), MediaError>;
}

/// `yt-dlp` backed fetcher
pub struct YtDlpFetcher {
    binary: PathBuf,
    cookies: Option<PathBuf>,
}

impl YtDlpFetcher {
    /// Cookies are only used when the file exists
    pub fn new(binary: impl Into<PathBuf>, cookies: Option<&Path>) -> Self {
        let cookies = match cookies {
            Some(path) if path.exists() => Some(path.to_path_buf()),
            Some(path) => {
                warn!(cookies = %path.display(), "Cookies file not found, downloading without it");
                None
            }
            None => None,
        };

        Self {
            binary: binary.into(),
            cookies,
        }
    }

    pub fn cookies(&self) -> Option<&Path> {
        self.cookies.as_deref()
    }
}

/// yt-dlp arguments: best video+audio merged to mp4
pub fn build_args(url: &str, output: &Path, cookies: Option<&Path>) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "-f".into(),
        "bestvideo+bestaudio/best".into(),
        "--merge-output-format".into(),
        "mp4".into(),
        "-o".into(),
        output.as_os_str().to_owned(),
    ];
    if let Some(cookies) = cookies {
        args.push("--cookies".into());
        args.push(cookies.as_os_str().to_owned());
    }
    args.push(url.into());
    args
}

#[async_trait]
impl MediaFetcher for YtDlpFetcher {
    async fn fetch(&self, url: &str, output: &Path) -> Result<(), MediaError> {
        info!(url, output = %output.display(), "Downloading video");

        let mut command = Command::new(&self.binary);
        command.args(build_args(url, output, self.cookies()));
        run_streaming("yt-dlp", command).await
    }
}
