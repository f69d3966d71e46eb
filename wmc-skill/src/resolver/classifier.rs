//! Classifier resolver
//!
//! Trains an [`IntentClassifier`] from `.intent` and `.entity` resources once,
//! at construction, and composes playback requests from the extracted slots.

use super::intent_engine::{Classification, IntentClassifier};
use super::{bare_client_request, Resolution, Resolver, ResolverError};
use crate::normalizer::{normalize_text, strip_playback_verb, NormalizedPhrase};
use crate::resources::{read_lines, ResourceLocator};
use tracing::{debug, warn};
use wmc_common::config::ClassifierConfig;
use wmc_common::{PlaybackKind, PlaybackRequest};

/// Intents trained from `<name>.intent`, one per playback category
pub const INTENT_NAMES: [&str; 5] = [
    "play.song",
    "play.album",
    "play.artist",
    "play.playlist",
    "play.something",
];

/// Entity vocabularies read from `<name>.entity` when present
pub const ENTITY_NAMES: [&str; 4] = ["song_name", "playlist_name", "album_name", "artist_name"];

const SOMETHING_INTENT: &str = "play.something";

/// Resolver backed by the trained intent classifier
#[derive(Debug, Clone)]
pub struct ClassifierResolver {
    classifier: IntentClassifier,
    client_name: String,
    min_confidence: f64,
}

impl ClassifierResolver {
    /// Load examples and train; blocks until training is complete
    pub fn train(
        resources: &dyn ResourceLocator,
        config: &ClassifierConfig,
        client_name: &str,
    ) -> Result<Self, ResolverError> {
        let mut builder = IntentClassifier::builder().fuzzy_threshold(config.fuzzy_threshold);

        for intent in INTENT_NAMES {
            match read_lines(resources, &format!("{}.intent", intent)) {
                Some(examples) => {
                    builder.add_intent(intent, &examples);
                }
                None => warn!("Intent resource {}.intent not found", intent),
            }
        }

        for entity in ENTITY_NAMES {
            if let Some(values) = read_lines(resources, &format!("{}.entity", entity)) {
                builder.add_entity(entity, &values);
            } else {
                debug!("No vocabulary for entity {}", entity);
            }
        }

        Ok(Self::new(builder.train()?, config, client_name))
    }

    /// Wrap an already trained classifier
    pub fn new(classifier: IntentClassifier, config: &ClassifierConfig, client_name: &str) -> Self {
        Self {
            classifier,
            client_name: normalize_text(client_name),
            min_confidence: config.min_confidence,
        }
    }
}

impl Resolver for ClassifierResolver {
    fn name(&self) -> &'static str {
        "classifier"
    }

    fn resolve(&self, phrase: &NormalizedPhrase) -> Option<Resolution> {
        if let Some(resolution) = bare_client_request(phrase, &self.client_name) {
            debug!("Bare client request, continuing playback");
            return Some(resolution);
        }

        // Examples are written as "play ..."; a spoken verb is not doubled
        let query = format!("play {}", strip_playback_verb(&phrase.text));
        let classification = self.classifier.classify(&query)?;

        if classification.confidence < self.min_confidence {
            debug!(
                confidence = classification.confidence,
                min = self.min_confidence,
                "Classification below threshold"
            );
            return None;
        }

        let request = compose_request(&classification)?;
        Some(Resolution::new(classification.confidence, request))
    }
}

/// Build the request from the populated slots, first rule wins:
/// playlist, song+album, song+artist, song, album, artist
fn compose_request(classification: &Classification) -> Option<PlaybackRequest> {
    let slot = |name: &str| {
        classification
            .slots
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    };
    let song = slot("song_name");
    let album = slot("album_name");
    let artist = slot("artist_name");

    if let Some(playlist) = slot("playlist_name") {
        return Some(PlaybackRequest::named(PlaybackKind::Playlist, playlist));
    }

    match (song, album, artist) {
        (Some(song), Some(album), _) => {
            Some(PlaybackRequest::named(PlaybackKind::SongOnAlbum, song).with_album(album))
        }
        (Some(song), None, Some(artist)) => {
            Some(PlaybackRequest::named(PlaybackKind::SongByArtist, song).with_artist(artist))
        }
        (Some(song), None, None) => Some(PlaybackRequest::named(PlaybackKind::Song, song)),
        (None, Some(album), artist) => {
            let request = PlaybackRequest::named(PlaybackKind::Album, album);
            Some(match artist {
                Some(artist) => request.with_artist(artist),
                None => request,
            })
        }
        (None, None, Some(artist)) => Some(PlaybackRequest::named(PlaybackKind::Artist, artist)),
        (None, None, None) if classification.intent == SOMETHING_INTENT => {
            Some(PlaybackRequest::bare(PlaybackKind::Something))
        }
        (None, None, None) => None,
    }
}
