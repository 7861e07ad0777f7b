//! Clip extraction through ffmpeg
//!
//! Trims `[start, start + duration)`, crops to a centered square, scales to
//! the video-note size and fades the audio in and out.

use super::process_output::run_streaming;
use crate::error::MediaError;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{info, warn};

/// Shortest accepted clip
pub const MIN_CLIP_SECS: u32 = 10;
/// Longest clip; longer requests are clamped
pub const MAX_CLIP_SECS: u32 = 60;
/// Video note edge length in pixels
pub const VIDEO_NOTE_SIZE: u32 = 400;

const FADE_SECS: f64 = 1.0;

/// Portion of the source to keep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipSpec {
    pub start_secs: u32,
    pub duration_secs: u32,
}

impl ClipSpec {
    /// Validate a requested clip, clamping overlong durations
    pub fn from_request(start_secs: u32, duration_secs: u32) -> Result<Self, MediaError> {
        if duration_secs < MIN_CLIP_SECS {
            return Err(MediaError::InvalidClip(format!(
                "Min duration is {} seconds, got {}",
                MIN_CLIP_SECS, duration_secs
            )));
        }

        let clamped = duration_secs.min(MAX_CLIP_SECS);
        if clamped != duration_secs {
            warn!(
                requested = duration_secs,
                clamped, "Requested duration too long, clamping"
            );
        }

        Ok(Self {
            start_secs,
            duration_secs: clamped,
        })
    }
}

/// Cuts and re-encodes a downloaded video
#[async_trait]
pub trait MediaProcessor: Send + Sync {
    async fn process(&self, input: &Path, output: &Path, clip: ClipSpec) -> Result<(), MediaError>;
}

/// `ffmpeg` backed processor
pub struct FfmpegProcessor {
    binary: PathBuf,
}

impl FfmpegProcessor {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

/// Video and audio filter graph for `clip`
pub fn build_filter_complex(clip: ClipSpec) -> String {
    let fade_out_start = (f64::from(clip.duration_secs) - FADE_SECS).max(0.0);
    format!(
        "[0:v]trim=start={start}:duration={dur},setpts=PTS-STARTPTS,crop=ih:ih,scale={size}:{size}[vout];\
         [0:a]atrim=start={start}:duration={dur},asetpts=PTS-STARTPTS,\
         afade=t=in:st=0:d={fade:.2},afade=t=out:st={out:.2}:d={fade:.2}[aout]",
        start = clip.start_secs,
        dur = clip.duration_secs,
        size = VIDEO_NOTE_SIZE,
        fade = FADE_SECS,
        out = fade_out_start,
    )
}

pub fn build_args(input: &Path, output: &Path, clip: ClipSpec) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-i".into(), input.as_os_str().to_owned()];
    args.extend(
        [
            "-filter_complex".to_string(),
            build_filter_complex(clip),
            "-map".to_string(),
            "[vout]".to_string(),
            "-map".to_string(),
            "[aout]".to_string(),
        ]
        .into_iter()
        .map(OsString::from),
    );
    args.extend(
        [
            "-c:v", "libx264", "-profile:v", "baseline", "-pix_fmt", "yuv420p", "-preset",
            "medium", "-c:a", "aac", "-b:a", "128k", "-movflags", "+faststart", "-y",
        ]
        .into_iter()
        .map(OsString::from),
    );
    args.push(output.as_os_str().to_owned());
    args
}

#[async_trait]
impl MediaProcessor for FfmpegProcessor {
    async fn process(&self, input: &Path, output: &Path, clip: ClipSpec) -> Result<(), MediaError> {
        info!(
            input = %input.display(),
            output = %output.display(),
            start = clip.start_secs,
            duration = clip.duration_secs,
            "Cutting clip"
        );

        let mut command = Command::new(&self.binary);
        command.args(build_args(input, output, clip));
        run_streaming("ffmpeg", command).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_duration_bounds() {
        assert!(matches!(ClipSpec::from_request(0, 9), Err(MediaError::InvalidClip(_))));
        assert_eq!(ClipSpec::from_request(5, 10).unwrap().duration_secs, 10);
        assert_eq!(ClipSpec::from_request(5, 90).unwrap().duration_secs, 60);
    }

    #[test]
    fn test_filter_complex() {
        let clip = ClipSpec {
            start_secs: 42,
            duration_secs: 30,
        };
        assert_eq!(
            build_filter_complex(clip),
            "[0:v]trim=start=42:duration=30,setpts=PTS-STARTPTS,crop=ih:ih,scale=400:400[vout];\
             [0:a]atrim=start=42:duration=30,asetpts=PTS-STARTPTS,\
             afade=t=in:st=0:d=1.00,afade=t=out:st=29.00:d=1.00[aout]"
        );
    }

    #[test]
    fn test_fade_out_start_never_negative() {
        let clip = ClipSpec {
            start_secs: 0,
            duration_secs: 0,
        };
        assert!(build_filter_complex(clip).contains("afade=t=out:st=0.00:d=1.00"));
    }

    #[test]
    fn test_args_end_with_overwrite_and_output() {
        let clip = ClipSpec::from_request(0, 15).unwrap();
        let args = build_args(Path::new("in.mp4"), Path::new("out.mp4"), clip);
        assert_eq!(args[0], "-i");
        assert_eq!(args[1], "in.mp4");
        assert_eq!(args[args.len() - 2], "-y");
        assert_eq!(args[args.len() - 1], "out.mp4");
        assert!(args.iter().any(|a| a == "+faststart"));
    }
}
