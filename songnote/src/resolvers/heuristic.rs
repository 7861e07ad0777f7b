//! Structured-block page heuristics
//!
//! Pulls a song title (and artist) out of page markup that carries no
//! structured metadata by looking for elements with known style-class
//! fragments. The class names are generated by the page's CSS tooling and
//! change without notice; a heuristic that finds nothing simply yields `None`.

use scraper::{ElementRef, Html, Selector};

/// Swappable DOM heuristic run when meta tags carry no title
pub trait PageHeuristic: Send + Sync {
    /// Heuristic name for diagnostics
    fn name(&self) -> &'static str;

    /// Combined title text (`"<title> by <artist>"` or `"<title>"`), if found
    fn extract_text(&self, document: &Html) -> Option<String>;
}

/// Container class fragment on song.link pages
pub const CONTAINER_CLASS: &str = "e12n0mv62";
/// Song title child class fragment
pub const TITLE_CLASS: &str = "e12n0mv61";
/// Artist name child class fragment
pub const ARTIST_CLASS: &str = "e12n0mv60";

/// Finds a container `div` by class fragment and reads the title and artist
/// from its direct `div` children.
#[derive(Debug, Clone)]
pub struct ClassBlockHeuristic {
    container_class: String,
    title_class: String,
    artist_class: String,
}

impl ClassBlockHeuristic {
    pub fn new(
        container_class: impl Into<String>,
        title_class: impl Into<String>,
        artist_class: impl Into<String>,
    ) -> Self {
        Self {
            container_class: container_class.into(),
            title_class: title_class.into(),
            artist_class: artist_class.into(),
        }
    }

    /// Title and artist text from one container, if it has a title child
    fn read_block(&self, container: ElementRef<'_>) -> Option<String> {
        let mut title: Option<String> = None;
        let mut artist: Option<String> = None;

        for child in container.children().filter_map(ElementRef::wrap) {
            if child.value().name() != "div" {
                continue;
            }
            let class = child.value().attr("class").unwrap_or_default();

            if title.is_none() && class.contains(self.title_class.as_str()) {
                title = Some(element_text(child)).filter(|t| !t.is_empty());
            }
            if artist.is_none() && class.contains(self.artist_class.as_str()) {
                artist = Some(element_text(child)).filter(|a| !a.is_empty());
            }
        }

        match (title, artist) {
            (Some(title), Some(artist)) => Some(format!("{} by {}", title, artist)),
            (Some(title), None) => Some(title),
            _ => None,
        }
    }
}

impl Default for ClassBlockHeuristic {
    fn default() -> Self {
        Self::new(CONTAINER_CLASS, TITLE_CLASS, ARTIST_CLASS)
    }
}

impl PageHeuristic for ClassBlockHeuristic {
    fn name(&self) -> &'static str {
        "class-block"
    }

    fn extract_text(&self, document: &Html) -> Option<String> {
        let selector = Selector::parse("div[class]").ok()?;

        document
            .select(&selector)
            .filter(|div| {
                div.value()
                    .attr("class")
                    .is_some_and(|class| class.contains(self.container_class.as_str()))
            })
            .find_map(|container| self.read_block(container))
    }
}

/// All descendant text nodes, trimmed and joined with single spaces
pub fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
