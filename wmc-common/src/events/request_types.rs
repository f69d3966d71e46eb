//! Playback request type definitions
//!
//! Supporting types for the structured command sent to the web client and the
//! confidence tier returned to the host for arbitration.

use serde::{Deserialize, Serialize};

/// What kind of media a playback request targets
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackKind {
    /// A single song (track)
    Song,
    /// A whole album
    Album,
    /// Everything by an artist
    Artist,
    /// A named playlist
    Playlist,
    /// Resume whatever the client was playing
    Continue,
    /// Anything the client chooses
    Something,
    /// A song narrowed down by its album
    #[serde(rename = "song+album")]
    SongOnAlbum,
    /// A song narrowed down by its artist
    #[serde(rename = "song+artist")]
    SongByArtist,
}

impl PlaybackKind {
    /// Wire name used in event payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaybackKind::Song => "song",
            PlaybackKind::Album => "album",
            PlaybackKind::Artist => "artist",
            PlaybackKind::Playlist => "playlist",
            PlaybackKind::Continue => "continue",
            PlaybackKind::Something => "something",
            PlaybackKind::SongOnAlbum => "song+album",
            PlaybackKind::SongByArtist => "song+artist",
        }
    }
}

impl std::fmt::Display for PlaybackKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured command describing what the web client should play
///
/// Serialized as `{"type": "song", "name": "..."}`; absent fields are omitted.
/// A request always carries a kind, so a typeless request cannot be built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlaybackRequest {
    #[serde(rename = "type")]
    pub kind: PlaybackKind,

    /// Song, album, artist or playlist name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Album narrowing a song request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,

    /// Artist narrowing a song request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
}

impl PlaybackRequest {
    /// Request without a target name (`continue`, `something`)
    pub fn bare(kind: PlaybackKind) -> Self {
        Self {
            kind,
            name: None,
            album: None,
            artist: None,
        }
    }

    /// Request for a named song, album, artist or playlist
    pub fn named(kind: PlaybackKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: Some(name.into()),
            album: None,
            artist: None,
        }
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }
}

/// Coarse match strength returned to the host for cross-skill arbitration
///
/// Ordered from weakest to strongest, so `GENERIC < TITLE < MULTI_KEY < EXACT`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfidenceTier {
    /// Skill could handle the phrase but nothing specific was recognized
    Generic,
    /// Only a title-like fragment was recognized
    Title,
    /// Several keys of the phrase agree
    MultiKey,
    /// Phrase fully recognized (or names the client explicitly)
    Exact,
}

impl std::fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfidenceTier::Generic => write!(f, "GENERIC"),
            ConfidenceTier::Title => write!(f, "TITLE"),
            ConfidenceTier::MultiKey => write!(f, "MULTI_KEY"),
            ConfidenceTier::Exact => write!(f, "EXACT"),
        }
    }
}
