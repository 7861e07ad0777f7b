//! External tool runner with incremental output forwarding
//!
//! stdout and stderr are read concurrently, line by line, and forwarded to
//! the log as they arrive. Progress output that rewrites itself with `\r`
//! is collapsed to its latest state.

use crate::error::MediaError;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

/// Run `command` to completion, forwarding its output to the log
pub async fn run_streaming(tool: &str, mut command: Command) -> Result<(), MediaError> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = command.spawn().map_err(|source| MediaError::Spawn {
        tool: tool.to_string(),
        source,
    })?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let (out, err) = tokio::join!(
        forward_output(tool, "stdout", stdout),
        forward_output(tool, "stderr", stderr)
    );
    out?;
    err?;

    let status = child.wait().await?;
    if !status.success() {
        return Err(MediaError::Failed {
            tool: tool.to_string(),
            status: status.to_string(),
        });
    }

    debug!(tool, "Tool finished successfully");
    Ok(())
}

async fn forward_output<R>(tool: &str, stream: &str, reader: Option<R>) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let Some(reader) = reader else {
        return Ok(());
    };

    let mut segments = BufReader::new(reader).split(b'\n');
    while let Some(segment) = segments.next_segment().await? {
        if let Some(line) = collapse_progress(&segment) {
            info!(tool, stream, "{}", line);
        }
    }
    Ok(())
}

/// Latest state of a possibly `\r`-rewritten line, or `None` when blank
pub fn collapse_progress(segment: &[u8]) -> Option<String> {
    String::from_utf8_lossy(segment)
        .split('\r')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .last()
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_progress_keeps_last_state() {
        assert_eq!(
            collapse_progress(b"[download]  10.0%\r[download]  55.5%\r[download] 100.0%\r").as_deref(),
            Some("[download] 100.0%")
        );
        assert_eq!(collapse_progress(b"plain line").as_deref(), Some("plain line"));
        assert_eq!(collapse_progress(b"  \r \r"), None);
        assert_eq!(collapse_progress(b""), None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_streaming_success() {
        let mut command = Command::new("sh");
        command.arg("-c").arg("printf 'one\\rtwo\\n'; echo err >&2");
        assert!(run_streaming("sh", command).await.is_ok());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_streaming_reports_exit_status() {
        let mut command = Command::new("sh");
        command.arg("-c").arg("exit 3");
        let err = run_streaming("sh", command).await.unwrap_err();
        assert!(matches!(err, MediaError::Failed { ref tool, .. } if tool == "sh"));
    }

    #[tokio::test]
    async fn test_run_streaming_missing_binary() {
        let command = Command::new("songnote-no-such-tool");
        let err = run_streaming("songnote-no-such-tool", command).await.unwrap_err();
        assert!(matches!(err, MediaError::Spawn { .. }));
    }
}
