//! Presentation strings derived from resolved metadata
//!
//! - `display_text` - label for the chat message, already escaped for MarkdownV2
//! - `file_base_text` - same composition, unquoted and unescaped
//! - `file_name` - `file_base_text` made filesystem-safe, never empty

use crate::text::{escape_for_message_syntax, escape_link_target, sanitize_for_filesystem};
use crate::types::{ResolvedMetadata, SongOverride, SourceLink};
use songnote_common::time::generic_track_name;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentationStrings {
    pub display_text: String,
    pub file_base_text: String,
    pub file_name: String,
}

impl PresentationStrings {
    /// Compose the strings; overrides win over resolved metadata
    pub fn build(
        metadata: &ResolvedMetadata,
        song_override: Option<&SongOverride>,
        link: &SourceLink,
    ) -> Self {
        let title = metadata.title.as_deref();
        let artist = metadata.artist.as_deref();

        let (display, file_base_text) = match (song_override, title, artist) {
            (Some(ov), _, _) => (
                format!("\"{}\" by {}", ov.song_name, ov.author_name),
                format!("{} by {}", ov.song_name, ov.author_name),
            ),
            (None, Some(title), Some(artist)) => (
                format!("\"{}\" by {}", title, artist),
                format!("{} by {}", title, artist),
            ),
            (None, Some(title), None) => (format!("\"{}\"", title), title.to_string()),
            (None, None, Some(artist)) => (format!("Unknown Song by {}", artist), artist.to_string()),
            (None, None, None) => (link.as_str().to_string(), generic_track_name()),
        };

        let sanitized = sanitize_for_filesystem(&file_base_text);
        let file_name = if sanitized.is_empty() || sanitized.chars().all(|c| c == '_') {
            format!("{}_fallback", generic_track_name())
        } else {
            sanitized
        };

        Self {
            display_text: escape_for_message_syntax(&display),
            file_base_text,
            file_name,
        }
    }

    /// `[display](link)` inline link for a MarkdownV2 message
    pub fn message_text(&self, link: &SourceLink) -> String {
        format!("[{}]({})", self.display_text, escape_link_target(link.as_str()))
    }
}
