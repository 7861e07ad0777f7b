//! oEmbed metadata resolver
//!
//! Queries a song.link-style oEmbed endpoint and turns its loosely structured
//! `title` / `author_name` / `html` / `provider_url` fields into a
//! `RawMetadataFragment`.
//!
//! # Extraction policy
//! 1. A usable author (not a platform brand, no bare "Topic" label once the
//!    `" - Topic"` channel suffix is removed) is the artist; the artist is
//!    excised from the title when the title embeds it.
//! 2. Otherwise the title is split on the first `" - "` into artist and title.
//! 3. A derived artist loses any `" - Topic"` suffix.
//!
//! The video URL comes from the player markup (embed links rewritten to
//! watch links), falling back to `provider_url` when it names the platform.

use super::{build_http_client, is_video_platform_url, EmbedSource};
use crate::error::ResolutionError;
use crate::text::{split_on_first, strip_known_suffix, strip_surrounding_separator_artifacts, TOPIC_SUFFIX};
use crate::types::{non_empty, RawMetadataFragment, SourceLink, StageTrace, Traced};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use songnote_common::config::ResolverConfig;
use tracing::debug;

/// Author names that identify the hosting platform rather than the artist
const PLATFORM_AUTHORS: &[&str] = &["youtube", "soundcloud", "spotify"];

/// Marker carried by auto-generated artist channels
const TOPIC_MARKER: &str = "Topic";

static PLAYER_SRC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"src="([^"]*youtube\.com[^"]*(?:embed/|watch\?v=)[a-zA-Z0-9_-]+[^"]*)""#)
        .expect("player src regex is valid")
});

static EMBED_PATH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.*?)/embed/([a-zA-Z0-9_-]+)").expect("embed path regex is valid")
});

/// oEmbed JSON response (only the fields used here)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OembedResponse {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub provider_url: String,
    #[serde(default)]
    pub html: String,
}

/// oEmbed stage
pub struct EmbedMetadataResolver {
    http_client: Client,
    endpoint: String,
}

impl EmbedMetadataResolver {
    /// Create resolver from configuration
    pub fn new(config: &ResolverConfig) -> Result<Self, ResolutionError> {
        Ok(Self {
            http_client: build_http_client(config)?,
            endpoint: config.oembed_endpoint.clone(),
        })
    }

    /// Create resolver with an existing HTTP client
    pub fn with_client(http_client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            http_client,
            endpoint: endpoint.into(),
        }
    }

    /// Query the oEmbed endpoint
    ///
    /// # Errors
    /// - `Transport` if the request cannot be sent
    /// - `Read` if the body cannot be read
    /// - `Upstream` on a non-200 status (carries status and body)
    /// - `Decode` if the body is not the expected JSON
    pub async fn fetch(&self, link: &SourceLink) -> Result<OembedResponse, ResolutionError> {
        debug!(link = %link, endpoint = %self.endpoint, "Querying oEmbed endpoint");

        let response = self
            .http_client
            .get(&self.endpoint)
            .query(&[("url", link.as_str()), ("format", "json")])
            .send()
            .await
            .map_err(|e| {
                ResolutionError::Transport(format!(
                    "oEmbed request to {} failed: {}",
                    self.endpoint, e
                ))
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ResolutionError::Read(format!("oEmbed body for {}: {}", link, e)))?;

        if status != reqwest::StatusCode::OK {
            return Err(ResolutionError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            ResolutionError::Decode(format!("oEmbed JSON for {}: {}. Raw response: {}", link, e, body))
        })
    }
}

#[async_trait]
impl EmbedSource for EmbedMetadataResolver {
    fn name(&self) -> &'static str {
        "oEmbed"
    }

    async fn resolve(
        &self,
        link: &SourceLink,
    ) -> Result<Traced<RawMetadataFragment>, ResolutionError> {
        let response = self.fetch(link).await?;
        Ok(extract_fragment(&response))
    }
}

/// Turn a decoded oEmbed response into a fragment
pub fn extract_fragment(response: &OembedResponse) -> Traced<RawMetadataFragment> {
    let mut trace = StageTrace::new();

    let (title, artist) = extract_identity(&response.title, &response.author_name, &mut trace);
    let video_url = extract_video_url(response, &mut trace);

    let fragment = RawMetadataFragment::new(title, artist, video_url);
    trace.note(format!(
        "oEmbed result: title={:?} artist={:?} video_url={:?}",
        fragment.title, fragment.artist, fragment.video_url
    ));
    Traced::new(fragment, trace)
}

/// True when the author field names the actual artist
fn is_usable_author(author: &str) -> bool {
    !author.is_empty()
        && !PLATFORM_AUTHORS
            .iter()
            .any(|platform| author.eq_ignore_ascii_case(platform))
        && !author.contains(TOPIC_MARKER)
}

/// Derive (title, artist) from the raw oEmbed title and author
pub fn extract_identity(
    raw_title: &str,
    raw_author: &str,
    trace: &mut StageTrace,
) -> (Option<String>, Option<String>) {
    let raw_title = raw_title.trim();
    let raw_author = raw_author.trim();

    // "<Artist> - Topic" channels are auto-generated but still name the artist
    let author = strip_known_suffix(raw_author, TOPIC_SUFFIX).trim();

    let (title, artist) = if is_usable_author(author) {
        trace.note(format!("Using oEmbed author '{}' as artist", author));
        let title = if raw_title.contains(author) {
            let excised = strip_surrounding_separator_artifacts(raw_title, author);
            if excised.is_empty() {
                raw_title.to_string()
            } else {
                excised
            }
        } else {
            raw_title.to_string()
        };
        (non_empty(title), Some(author.to_string()))
    } else if !raw_title.is_empty() {
        trace.note(format!(
            "oEmbed author '{}' unusable, splitting title '{}'",
            raw_author, raw_title
        ));
        match split_on_first(raw_title, " - ") {
            Some((artist, title)) => (non_empty(title), non_empty(artist)),
            None => (Some(raw_title.to_string()), None),
        }
    } else {
        (None, None)
    };

    let artist = artist.and_then(|a| non_empty(strip_known_suffix(&a, TOPIC_SUFFIX)));
    (title, artist)
}

/// Find the video URL in the player markup, falling back to `provider_url`
pub fn extract_video_url(response: &OembedResponse, trace: &mut StageTrace) -> Option<String> {
    if let Some(captures) = PLAYER_SRC_RE.captures(&response.html) {
        let src = &captures[1];
        let url = rewrite_embed_url(src);
        trace.note(format!("Video URL from player markup: {}", url));
        return Some(url);
    }

    let provider = response.provider_url.trim();
    if !provider.is_empty() && is_video_platform_url(provider) {
        trace.note(format!("Video URL from provider_url: {}", provider));
        return Some(provider.to_string());
    }

    None
}

/// Rewrite `…/embed/<id>?…` to `…/watch?v=<id>`; other URLs pass through
pub fn rewrite_embed_url(src: &str) -> String {
    match EMBED_PATH_RE.captures(src) {
        Some(captures) => {
            let base = &captures[1];
            let base = if base.starts_with("//") {
                format!("https:{}", base)
            } else {
                base.to_string()
            };
            format!("{}/watch?v={}", base, &captures[2])
        }
        None => src.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(title: &str, author: &str) -> OembedResponse {
        OembedResponse {
            title: title.to_string(),
            author_name: author.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_author_excised_from_title() {
        let fragment = extract_fragment(&response("Song X - Artist Y", "Artist Y")).value;
        assert_eq!(fragment.title.as_deref(), Some("Song X"));
        assert_eq!(fragment.artist.as_deref(), Some("Artist Y"));
    }

    #[test]
    fn test_author_not_in_title_keeps_title() {
        let fragment = extract_fragment(&response("Blue Monday", "New Order")).value;
        assert_eq!(fragment.title.as_deref(), Some("Blue Monday"));
        assert_eq!(fragment.artist.as_deref(), Some("New Order"));
    }

    #[test]
    fn test_title_equal_to_author_is_kept() {
        let fragment = extract_fragment(&response("Weezer", "Weezer")).value;
        assert_eq!(fragment.title.as_deref(), Some("Weezer"));
        assert_eq!(fragment.artist.as_deref(), Some("Weezer"));
    }

    #[test]
    fn test_topic_channel_suffix_stripped() {
        let fragment = extract_fragment(&response("Cool Track", "SomeChannel - Topic")).value;
        assert_eq!(fragment.title.as_deref(), Some("Cool Track"));
        assert_eq!(fragment.artist.as_deref(), Some("SomeChannel"));
    }

    #[test]
    fn test_topic_channel_excised_from_title() {
        let fragment =
            extract_fragment(&response("SomeChannel - Cool Track", "SomeChannel - Topic")).value;
        assert_eq!(fragment.title.as_deref(), Some("Cool Track"));
        assert_eq!(fragment.artist.as_deref(), Some("SomeChannel"));
    }

    #[test]
    fn test_bare_topic_label_falls_through_to_split() {
        let fragment = extract_fragment(&response("Band - Anthem", "Topic")).value;
        assert_eq!(fragment.artist.as_deref(), Some("Band"));
        assert_eq!(fragment.title.as_deref(), Some("Anthem"));
    }

    #[test]
    fn test_platform_author_falls_through_to_split() {
        for author in ["YouTube", "youtube", "SoundCloud", "Spotify"] {
            let fragment = extract_fragment(&response("Artist - Track", author)).value;
            assert_eq!(fragment.artist.as_deref(), Some("Artist"), "author {}", author);
            assert_eq!(fragment.title.as_deref(), Some("Track"));
        }
    }

    #[test]
    fn test_empty_response_is_empty_fragment() {
        let fragment = extract_fragment(&OembedResponse::default()).value;
        assert!(fragment.is_empty());
    }

    #[test]
    fn test_video_url_from_embed_markup() {
        let resp = OembedResponse {
            html: r#"<iframe width="100%" src="https://www.youtube.com/embed/dQw4w9WgXcQ?feature=oembed&autoplay=1" frameborder="0"></iframe>"#.to_string(),
            ..Default::default()
        };
        let mut trace = StageTrace::new();
        assert_eq!(
            extract_video_url(&resp, &mut trace).as_deref(),
            Some("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
        );
        assert_eq!(trace.notes().len(), 1);
    }

    #[test]
    fn test_video_url_watch_markup_passes_through() {
        let resp = OembedResponse {
            html: r#"<a src="https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=5">x</a>"#.to_string(),
            ..Default::default()
        };
        let mut trace = StageTrace::new();
        assert_eq!(
            extract_video_url(&resp, &mut trace).as_deref(),
            Some("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=5")
        );
    }

    #[test]
    fn test_video_url_provider_fallback() {
        let mut trace = StageTrace::new();
        let resp = OembedResponse {
            html: r#"<iframe src="https://embed.song.link/?url=abc"></iframe>"#.to_string(),
            provider_url: "https://www.youtube.com/".to_string(),
            ..Default::default()
        };
        assert_eq!(
            extract_video_url(&resp, &mut trace).as_deref(),
            Some("https://www.youtube.com/")
        );

        let resp = OembedResponse {
            provider_url: "https://song.link".to_string(),
            ..Default::default()
        };
        assert!(extract_video_url(&resp, &mut trace).is_none());
    }

    #[test]
    fn test_rewrite_protocol_relative_embed() {
        assert_eq!(
            rewrite_embed_url("//www.youtube.com/embed/abcdefghijk?rel=0"),
            "https://www.youtube.com/watch?v=abcdefghijk"
        );
    }
}
