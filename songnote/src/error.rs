//! Error types for songnote
//!
//! Resolution errors never abort a run; they are absorbed by the
//! orchestrator. Media and delivery errors end the run.

use thiserror::Error;

/// Failure of a single metadata resolution stage
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// Network or connection failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Non-success HTTP status from an upstream service
    #[error("Upstream returned status {status}: {body}")]
    Upstream { status: u16, body: String },

    /// Response body could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Response body could not be read
    #[error("Read error: {0}")]
    Read(String),

    /// Every page technique came up empty
    #[error("No usable data found in page {0}")]
    ScrapeExhausted(String),

    /// Overall resolution deadline elapsed before the stage finished
    #[error("Resolution deadline exceeded")]
    DeadlineExceeded,
}

/// External media tool failure (download or transcode)
#[derive(Debug, Error)]
pub enum MediaError {
    /// Tool could not be started
    #[error("Failed to start {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// Tool exited with a non-zero status
    #[error("{tool} exited with {status}")]
    Failed { tool: String, status: String },

    /// Requested clip cannot be cut
    #[error("Invalid clip: {0}")]
    InvalidClip(String),

    /// I/O error while waiting for or reading from the tool
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Chat API delivery failure
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Network failure talking to the chat API
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Chat API rejected the request
    #[error("Telegram API error on {method} (status code: {status}): {body}")]
    Api {
        method: &'static str,
        status: u16,
        body: String,
    },

    /// Local file could not be read for upload
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure of an end-to-end run after resolution
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Working directory error: {0}")]
    WorkDir(#[from] std::io::Error),

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}
