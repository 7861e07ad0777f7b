//! Metadata resolution stages
//!
//! Two network-backed stages feed the orchestrator:
//! 1. **embed** - oEmbed endpoint query (structured JSON)
//! 2. **page** - scrape of the link's rendered page (meta tags, structured
//!    block heuristic, raw-text regex)
//!
//! Each stage sits behind a trait so the orchestrator can be exercised with
//! in-memory stages, and returns its result together with a `StageTrace`
//! instead of logging from inside the extraction code.

pub mod embed;
pub mod heuristic;
pub mod page;

pub use embed::{EmbedMetadataResolver, OembedResponse};
pub use heuristic::{ClassBlockHeuristic, PageHeuristic};
pub use page::{PageFindings, PageMetadataScraper};

use crate::error::ResolutionError;
use crate::types::{RawMetadataFragment, SourceLink, Traced};
use async_trait::async_trait;
use reqwest::Client;
use songnote_common::config::ResolverConfig;
use std::time::Duration;

/// Structured-metadata stage (oEmbed)
#[async_trait]
pub trait EmbedSource: Send + Sync {
    /// Stage name for diagnostics
    fn name(&self) -> &'static str;

    /// Query the endpoint for `link` and extract a fragment
    async fn resolve(
        &self,
        link: &SourceLink,
    ) -> Result<Traced<RawMetadataFragment>, ResolutionError>;
}

/// Page-scraping stage
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Stage name for diagnostics
    fn name(&self) -> &'static str;

    /// Fetch the page behind `link` and run the extraction techniques
    async fn scrape(&self, link: &SourceLink) -> Result<Traced<PageFindings>, ResolutionError>;
}

/// Build the HTTP client shared by the resolver stages
pub fn build_http_client(config: &ResolverConfig) -> Result<Client, ResolutionError> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| ResolutionError::Transport(format!("Failed to build HTTP client: {}", e)))
}

/// True when `url` points at the target video platform
pub fn is_video_platform_url(url: &str) -> bool {
    url.contains("youtube.com") || url.contains("youtu.be")
}
