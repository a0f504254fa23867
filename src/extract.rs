// extract.rs - Playlist Link Extraction
// Pulls a canonical YouTube playlist URL out of free-form chat text.
//
// Key Features:
// - Matches http(s)://[www.]youtube.com/playlist?list=<id> anywhere in the text
// - Drops anything after the playlist id (extra query parameters, punctuation)
// - Purely syntactic: the link is never fetched or otherwise validated here
//
// Used by: commands/playlist.rs (message handling)

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

// Compile regex once - the id is one or more word/hyphen characters
static PLAYLIST_URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"https?://(?:www\.)?youtube\.com/playlist\?list=[\w-]+")
        .expect("Invalid playlist URL regex pattern")
});

/// A playlist URL that matched the known link shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistReference {
    url: String,
}

impl PlaylistReference {
    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// Build a reference without matching the link shape.
    #[cfg(test)]
    pub fn unchecked(url: &str) -> Self {
        PlaylistReference { url: url.to_string() }
    }
}

impl fmt::Display for PlaylistReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

/// Find the first playlist link in `text`.
/// Returns `None` when the text holds no playlist link; that is a normal outcome.
pub fn extract_playlist_url(text: &str) -> Option<PlaylistReference> {
    PLAYLIST_URL_REGEX.find(text).map(|m| PlaylistReference {
        url: m.as_str().to_string(),
    })
}
