//! Core types for the metadata resolution pipeline
//!
//! - `SourceLink` - the link being resolved
//! - `RawMetadataFragment` - one technique's partial result
//! - `ResolvedMetadata` - merged result handed to the delivery steps
//! - `SongOverride` - caller-supplied names that bypass resolution output
//! - `StageTrace` - diagnostics returned by pure extraction code

use std::fmt;

/// Link to a song on an aggregator service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLink(String);

impl SourceLink {
    pub fn new(link: impl Into<String>) -> Self {
        Self(link.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trim a value and drop it when nothing is left
pub fn non_empty(value: impl AsRef<str>) -> Option<String> {
    let trimmed = value.as_ref().trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Partial metadata produced by a single extraction technique
///
/// Fields are either absent or trimmed and non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawMetadataFragment {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub video_url: Option<String>,
}

impl RawMetadataFragment {
    /// Build a fragment, normalizing empty values to `None`
    pub fn new(
        title: Option<impl AsRef<str>>,
        artist: Option<impl AsRef<str>>,
        video_url: Option<impl AsRef<str>>,
    ) -> Self {
        Self {
            title: title.and_then(non_empty),
            artist: artist.and_then(non_empty),
            video_url: video_url.and_then(non_empty),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.artist.is_none() && self.video_url.is_none()
    }

    /// True when the fragment names the song in any way
    pub fn has_identity(&self) -> bool {
        self.title.is_some() || self.artist.is_some()
    }
}

/// Final merged metadata for one resolution run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedMetadata {
    pub artist: Option<String>,
    pub title: Option<String>,
    pub video_url: Option<String>,
}

impl ResolvedMetadata {
    pub fn has_identity(&self) -> bool {
        self.title.is_some() || self.artist.is_some()
    }

    /// Resolution is considered incomplete when the video URL is missing or
    /// when neither title nor artist is known.
    pub fn is_incomplete(&self) -> bool {
        self.video_url.is_none() || !self.has_identity()
    }

    /// URL handed to the downloader: the video URL when known, else the link itself
    pub fn download_target<'a>(&'a self, link: &'a SourceLink) -> &'a str {
        self.video_url.as_deref().unwrap_or(link.as_str())
    }
}

/// Caller-supplied song and author names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongOverride {
    pub song_name: String,
    pub author_name: String,
}

impl SongOverride {
    /// Overrides only apply when both names are present; values are kept verbatim
    pub fn from_parts(song_name: Option<&str>, author_name: Option<&str>) -> Option<Self> {
        fn present(name: Option<&str>) -> Option<&str> {
            name.filter(|n| !n.trim().is_empty())
        }
        match (present(song_name), present(author_name)) {
            (Some(song_name), Some(author_name)) => Some(Self {
                song_name: song_name.to_string(),
                author_name: author_name.to_string(),
            }),
            _ => None,
        }
    }
}

/// Ordered diagnostic notes recorded by a stage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageTrace {
    notes: Vec<String>,
}

impl StageTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn note(&mut self, message: impl Into<String>) {
        self.notes.push(message.into());
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }
}

/// Result of a stage together with its diagnostics
#[derive(Debug, Clone, Default)]
pub struct Traced<T> {
    pub value: T,
    pub trace: StageTrace,
}

impl<T> Traced<T> {
    pub fn new(value: T, trace: StageTrace) -> Self {
        Self { value, trace }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_normalizes_empty_fields() {
        let fragment = RawMetadataFragment::new(Some("  Song "), Some("   "), None::<&str>);
        assert_eq!(fragment.title.as_deref(), Some("Song"));
        assert!(fragment.artist.is_none());
        assert!(fragment.video_url.is_none());
        assert!(fragment.has_identity());
    }

    #[test]
    fn test_download_target_falls_back_to_link() {
        let link = SourceLink::new("https://song.link/s/abc");
        let resolved = ResolvedMetadata::default();
        assert_eq!(resolved.download_target(&link), "https://song.link/s/abc");

        let resolved = ResolvedMetadata {
            video_url: Some("https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string()),
            ..Default::default()
        };
        assert_eq!(
            resolved.download_target(&link),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_incomplete_detection() {
        let mut resolved = ResolvedMetadata {
            title: Some("Song".to_string()),
            ..Default::default()
        };
        assert!(resolved.is_incomplete(), "missing video URL");

        resolved.video_url = Some("https://youtu.be/dQw4w9WgXcQ".to_string());
        assert!(!resolved.is_incomplete());

        resolved.title = None;
        assert!(resolved.is_incomplete(), "missing title and artist");
    }

    #[test]
    fn test_override_requires_both_names() {
        assert!(SongOverride::from_parts(Some("Anthem"), None).is_none());
        assert!(SongOverride::from_parts(Some("Anthem"), Some(" ")).is_none());
        let ov = SongOverride::from_parts(Some("Anthem"), Some("Band")).unwrap();
        assert_eq!(ov.song_name, "Anthem");
        assert_eq!(ov.author_name, "Band");
    }

    #[test]
    fn test_override_kept_verbatim() {
        let ov = SongOverride::from_parts(Some(" Anthem "), Some("Band  ")).unwrap();
        assert_eq!(ov.song_name, " Anthem ");
        assert_eq!(ov.author_name, "Band  ");
    }
}
