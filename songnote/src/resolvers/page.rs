//! Page metadata scraper
//!
//! Fetches the rendered page behind a song link and runs an ordered list of
//! extraction techniques over it:
//!
//! 1. **Meta tags** - `og:title` and `og:video:url` / `og:video:secure_url`
//! 2. **Structured block** - a `PageHeuristic`, only while no title text is known
//! 3. **Raw text** - regex scan for a watch/short link, only while no video URL is known
//!
//! Findings are merged first-non-empty per field, so an earlier technique
//! always wins over a later one.

use super::heuristic::{ClassBlockHeuristic, PageHeuristic};
use super::{build_http_client, is_video_platform_url, PageSource};
use crate::error::ResolutionError;
use crate::types::{non_empty, SourceLink, StageTrace, Traced};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use songnote_common::config::ResolverConfig;
use std::sync::Arc;
use tracing::debug;

static VIDEO_LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"https?://(?:www\.)?(?:youtube\.com/watch\?v=|youtu\.be/)[a-zA-Z0-9_-]{11}")
        .expect("video link regex is valid")
});

/// What the page techniques found
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageFindings {
    /// Combined title text (may embed the artist, e.g. `"Song by Artist"`)
    pub combined_text: Option<String>,
    /// Video URL on the target platform
    pub video_url: Option<String>,
}

impl PageFindings {
    pub fn is_empty(&self) -> bool {
        self.combined_text.is_none() && self.video_url.is_none()
    }

    /// Keep existing fields, fill gaps from `later`
    pub fn or(self, later: PageFindings) -> PageFindings {
        PageFindings {
            combined_text: self.combined_text.or(later.combined_text),
            video_url: self.video_url.or(later.video_url),
        }
    }
}

/// Parsed page plus its raw text
pub struct PageDocument<'a> {
    pub html: &'a Html,
    pub raw: &'a str,
}

/// One page extraction technique
pub trait PageTechnique: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether the technique still has anything to contribute
    fn applies(&self, found: &PageFindings) -> bool;

    fn extract(&self, page: &PageDocument<'_>, trace: &mut StageTrace) -> PageFindings;
}

/// Open-graph meta tag pass
pub struct MetaTagTechnique;

impl PageTechnique for MetaTagTechnique {
    fn name(&self) -> &'static str {
        "meta-tags"
    }

    fn applies(&self, _found: &PageFindings) -> bool {
        true
    }

    fn extract(&self, page: &PageDocument<'_>, trace: &mut StageTrace) -> PageFindings {
        let Ok(selector) = Selector::parse("meta[property]") else {
            return PageFindings::default();
        };

        let mut findings = PageFindings::default();
        for meta in page.html.select(&selector) {
            let property = meta.value().attr("property").unwrap_or_default();
            let Some(content) = meta.value().attr("content").and_then(non_empty) else {
                continue;
            };

            match property {
                "og:title" => findings.combined_text = Some(content),
                "og:video:url" | "og:video:secure_url" if is_video_platform_url(&content) => {
                    findings.video_url = Some(content)
                }
                _ => {}
            }
        }

        if findings.combined_text.is_none() {
            trace.note("og:title not found or empty");
        }
        findings
    }
}

/// Adapter running a `PageHeuristic` as a technique
pub struct HeuristicTechnique {
    heuristic: Arc<dyn PageHeuristic>,
}

impl HeuristicTechnique {
    pub fn new(heuristic: Arc<dyn PageHeuristic>) -> Self {
        Self { heuristic }
    }
}

impl PageTechnique for HeuristicTechnique {
    fn name(&self) -> &'static str {
        self.heuristic.name()
    }

    fn applies(&self, found: &PageFindings) -> bool {
        found.combined_text.is_none()
    }

    fn extract(&self, page: &PageDocument<'_>, trace: &mut StageTrace) -> PageFindings {
        let combined_text = self.heuristic.extract_text(page.html);
        match &combined_text {
            Some(text) => trace.note(format!(
                "Found title via {} heuristic: {}",
                self.heuristic.name(),
                text
            )),
            None => trace.note(format!("{} heuristic found nothing", self.heuristic.name())),
        }
        PageFindings {
            combined_text,
            video_url: None,
        }
    }
}

/// Regex scan of the raw page text for a video link
pub struct RawTextTechnique;

impl PageTechnique for RawTextTechnique {
    fn name(&self) -> &'static str {
        "raw-text"
    }

    fn applies(&self, found: &PageFindings) -> bool {
        found.video_url.is_none()
    }

    fn extract(&self, page: &PageDocument<'_>, trace: &mut StageTrace) -> PageFindings {
        let video_url = VIDEO_LINK_RE.find(page.raw).map(|m| m.as_str().to_string());
        if let Some(url) = &video_url {
            trace.note(format!("Found video URL via regex: {}", url));
        }
        PageFindings {
            combined_text: None,
            video_url,
        }
    }
}

/// Page-scraping stage
pub struct PageMetadataScraper {
    http_client: Client,
    techniques: Vec<Box<dyn PageTechnique>>,
}

impl PageMetadataScraper {
    /// Create scraper from configuration (default heuristic unless disabled)
    pub fn new(config: &ResolverConfig) -> Result<Self, ResolutionError> {
        let heuristic: Option<Arc<dyn PageHeuristic>> = if config.page_heuristic {
            Some(Arc::new(ClassBlockHeuristic::default()))
        } else {
            None
        };
        Ok(Self::with_client(build_http_client(config)?, heuristic))
    }

    /// Create scraper with an explicit client and heuristic
    pub fn with_client(http_client: Client, heuristic: Option<Arc<dyn PageHeuristic>>) -> Self {
        Self {
            http_client,
            techniques: default_techniques(heuristic),
        }
    }

    /// Run the techniques over a page body
    pub fn extract_from_body(&self, body: &str) -> Traced<PageFindings> {
        run_techniques(&self.techniques, body)
    }
}

/// Technique order: meta tags, optional heuristic, raw text
pub fn default_techniques(heuristic: Option<Arc<dyn PageHeuristic>>) -> Vec<Box<dyn PageTechnique>> {
    let mut techniques: Vec<Box<dyn PageTechnique>> = vec![Box::new(MetaTagTechnique)];
    if let Some(heuristic) = heuristic {
        techniques.push(Box::new(HeuristicTechnique::new(heuristic)));
    }
    techniques.push(Box::new(RawTextTechnique));
    techniques
}

/// Parse `body` and apply each technique that still applies, in order
pub fn run_techniques(techniques: &[Box<dyn PageTechnique>], body: &str) -> Traced<PageFindings> {
    let html = Html::parse_document(body);
    let page = PageDocument {
        html: &html,
        raw: body,
    };

    let mut trace = StageTrace::new();
    let mut found = PageFindings::default();
    for technique in techniques {
        if !technique.applies(&found) {
            continue;
        }
        let findings = technique.extract(&page, &mut trace);
        found = found.or(findings);
    }

    trace.note(format!(
        "Page result: combined_text={:?} video_url={:?}",
        found.combined_text, found.video_url
    ));
    Traced::new(found, trace)
}

#[async_trait]
impl PageSource for PageMetadataScraper {
    fn name(&self) -> &'static str {
        "page"
    }

    async fn scrape(&self, link: &SourceLink) -> Result<Traced<PageFindings>, ResolutionError> {
        debug!(link = %link, "Fetching page for scraping");

        let response = self.http_client.get(link.as_str()).send().await.map_err(|e| {
            ResolutionError::Transport(format!("Page request for {} failed: {}", link, e))
        })?;
        debug!(link = %link, status = %response.status(), "Page response received");

        let body = response
            .text()
            .await
            .map_err(|e| ResolutionError::Read(format!("Page body for {}: {}", link, e)))?;

        let result = self.extract_from_body(&body);
        if result.value.is_empty() {
            return Err(ResolutionError::ScrapeExhausted(link.to_string()));
        }
        Ok(result)
    }
}
