//! Fallback orchestrator
//!
//! Runs the resolution stages one after the other and merges their fragments.
//!
//! # Flow
//! 1. Embed stage; any error is logged and counts as "nothing produced"
//! 2. Page stage, only when the merged result is still incomplete (no video
//!    URL, or neither title nor artist)
//! 3. Merge with a fixed precedence: fragments are ordered by stage, the
//!    identity group (title + artist) comes from the first fragment naming
//!    the song, the video URL from the first fragment that has one
//!
//! Stages never log; the orchestrator writes their traces out at debug level.

use crate::error::ResolutionError;
use crate::resolvers::{
    EmbedMetadataResolver, EmbedSource, PageFindings, PageMetadataScraper, PageSource,
};
use crate::text::split_combined_title;
use crate::types::{RawMetadataFragment, ResolvedMetadata, SourceLink, StageTrace, Traced};
use songnote_common::config::ResolverConfig;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Outcome of one resolution run
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Merged metadata
    pub metadata: ResolvedMetadata,
    /// Non-empty fragments in precedence order
    pub fragments: Vec<RawMetadataFragment>,
}

/// Runs the embed stage, then the page stage when needed
pub struct FallbackOrchestrator {
    embed: Box<dyn EmbedSource>,
    page: Box<dyn PageSource>,
    deadline: Option<Duration>,
}

impl FallbackOrchestrator {
    pub fn new(embed: Box<dyn EmbedSource>, page: Box<dyn PageSource>) -> Self {
        Self {
            embed,
            page,
            deadline: None,
        }
    }

    /// Build the network-backed stages from configuration
    pub fn from_config(config: &ResolverConfig) -> Result<Self, ResolutionError> {
        let embed = EmbedMetadataResolver::new(config)?;
        let page = PageMetadataScraper::new(config)?;
        let deadline = match config.overall_deadline_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        Ok(Self::new(Box::new(embed), Box::new(page)).with_deadline(deadline))
    }

    /// Bound both stages together by `deadline`
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Resolve `link` to best-effort metadata. Never fails.
    pub async fn resolve(&self, link: &SourceLink) -> Resolution {
        // A deadline too far out to represent is no deadline at all
        let deadline = self.deadline.and_then(|d| Instant::now().checked_add(d));
        let mut fragments = Vec::new();

        info!(link = %link, stage = self.embed.name(), "Resolving metadata");
        match within(deadline, self.embed.resolve(link)).await {
            Ok(Traced { value, trace }) => {
                log_trace(self.embed.name(), &trace);
                if !value.is_empty() {
                    fragments.push(value);
                }
            }
            Err(e) => warn!(link = %link, stage = self.embed.name(), error = %e, "Stage produced nothing"),
        }

        let mut metadata = merge_fragments(&fragments);
        if metadata.is_incomplete() {
            info!(
                link = %link,
                stage = self.page.name(),
                title = ?metadata.title,
                artist = ?metadata.artist,
                video_url = ?metadata.video_url,
                "Metadata incomplete, trying page fallback"
            );

            match within(deadline, self.page.scrape(link)).await {
                Ok(Traced { value, trace }) => {
                    log_trace(self.page.name(), &trace);
                    let fragment = page_fragment(&value);
                    if !fragment.is_empty() {
                        fragments.push(fragment);
                    }
                    metadata = merge_fragments(&fragments);
                }
                Err(e) => warn!(link = %link, stage = self.page.name(), error = %e, "Stage produced nothing"),
            }
        }

        info!(
            link = %link,
            title = ?metadata.title,
            artist = ?metadata.artist,
            video_url = ?metadata.video_url,
            "Resolution complete"
        );
        Resolution {
            metadata,
            fragments,
        }
    }
}

async fn within<T, F>(deadline: Option<Instant>, stage: F) -> Result<T, ResolutionError>
where
    F: Future<Output = Result<T, ResolutionError>>,
{
    match deadline {
        Some(at) => tokio::time::timeout_at(at, stage)
            .await
            .map_err(|_| ResolutionError::DeadlineExceeded)?,
        None => stage.await,
    }
}

fn log_trace(stage: &str, trace: &StageTrace) {
    for note in trace.notes() {
        debug!(stage, "{}", note);
    }
}

/// Turn page findings into a fragment by splitting the combined text
pub fn page_fragment(findings: &PageFindings) -> RawMetadataFragment {
    let (title, artist) = findings
        .combined_text
        .as_deref()
        .map(split_combined_title)
        .unwrap_or((None, None));
    RawMetadataFragment::new(title, artist, findings.video_url.as_deref())
}

/// Merge fragments given in precedence order
pub fn merge_fragments(fragments: &[RawMetadataFragment]) -> ResolvedMetadata {
    let identity = fragments.iter().find(|f| f.has_identity());
    let video_url = fragments.iter().find_map(|f| f.video_url.clone());

    ResolvedMetadata {
        artist: identity.and_then(|f| f.artist.clone()),
        title: identity.and_then(|f| f.title.clone()),
        video_url,
    }
}
