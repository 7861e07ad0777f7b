//! Text normalization helpers
//!
//! Pure string utilities shared by every resolution stage. No I/O and no
//! error conditions; empty input yields well-defined (possibly empty) output.

/// Suffix YouTube appends to auto-generated artist channels
pub const TOPIC_SUFFIX: &str = " - Topic";

/// Characters Telegram MarkdownV2 treats as markup
const MARKDOWN_V2_RESERVED: &[char] = &[
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
    '\\',
];

/// Split on the first occurrence of `separator`.
///
/// Both halves are trimmed. Returns `None` when the separator is absent.
pub fn split_on_first<'a>(text: &'a str, separator: &str) -> Option<(&'a str, &'a str)> {
    text.split_once(separator)
        .map(|(left, right)| (left.trim(), right.trim()))
}

/// Remove `suffix` when it terminates `text` (case-sensitive)
pub fn strip_known_suffix<'a>(text: &'a str, suffix: &str) -> &'a str {
    text.strip_suffix(suffix).unwrap_or(text)
}

/// Excise `substring` from `text` and clean up the separator debris it leaves.
///
/// Used when the artist name is embedded in a combined "Artist - Title"
/// string. Leading `" - "`/`"- "`, trailing `" - "`/`" -"` and surrounding
/// whitespace are trimmed until nothing more changes.
pub fn strip_surrounding_separator_artifacts(text: &str, substring: &str) -> String {
    let mut removed = text.to_string();
    // Removal can join the pieces around a match into a new match
    while !substring.is_empty() && removed.contains(substring) {
        removed = removed.replace(substring, "");
    }

    let mut current = removed.trim();
    loop {
        let before = current.len();
        for prefix in [" - ", "- "] {
            current = current.strip_prefix(prefix).unwrap_or(current);
        }
        for suffix in [" - ", " -"] {
            current = current.strip_suffix(suffix).unwrap_or(current);
        }
        current = current.trim();
        if current.len() == before {
            break;
        }
    }
    current.to_string()
}

/// Make `text` safe to use as a file name.
///
/// Spaces and path separators become underscores; other reserved characters
/// are dropped. The result may be empty.
pub fn sanitize_for_filesystem(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            ' ' | '/' | '\\' => Some('_'),
            ':' | '*' | '?' | '"' | '<' | '>' | '|' => None,
            other => Some(other),
        })
        .collect()
}

/// Backslash-escape every MarkdownV2 reserved character
pub fn escape_for_message_syntax(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if MARKDOWN_V2_RESERVED.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Escape the URL part of a MarkdownV2 inline link (`)` and `\` only)
pub fn escape_link_target(url: &str) -> String {
    let mut escaped = String::with_capacity(url.len());
    for c in url.chars() {
        if c == ')' || c == '\\' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Split an artist/title combination found in page text.
///
/// `"<title> by <artist>"` is tried first, then `"<artist> - <title>"`;
/// otherwise the whole text is the title. Returns `(title, artist)`.
pub fn split_combined_title(text: &str) -> (Option<String>, Option<String>) {
    let text = text.trim();
    if text.is_empty() {
        return (None, None);
    }

    let (title, artist) = if let Some((title, artist)) = split_on_first(text, " by ") {
        (title, Some(artist))
    } else if let Some((artist, title)) = split_on_first(text, " - ") {
        (title, Some(artist))
    } else {
        (text, None)
    };

    let artist = artist.map(|a| strip_known_suffix(a, TOPIC_SUFFIX).trim().to_string());
    (
        Some(title.to_string()).filter(|t| !t.is_empty()),
        artist.filter(|a| !a.is_empty()),
    )
}
