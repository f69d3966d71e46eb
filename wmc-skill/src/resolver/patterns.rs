//! Regex resolver
//!
//! Ordered named patterns loaded from `<name>.regex` resources. The first
//! pattern that matches decides the request type, its named group the target.

use super::{bare_client_request, Resolution, Resolver};
use crate::normalizer::{normalize_text, NormalizedPhrase};
use crate::resources::{read_pattern, ResourceLocator};
use regex::{Regex, RegexBuilder};
use tracing::{debug, info, warn};
use wmc_common::{PlaybackKind, PlaybackRequest};

/// Patterns in check order: (resource name, capture group, request kind)
///
/// `something` is checked before `song` because the song pattern captures any
/// "play ..." phrase.
pub const PATTERN_ORDER: [(&str, Option<&str>, PlaybackKind); 5] = [
    ("playlist", Some("playlist"), PlaybackKind::Playlist),
    ("album", Some("album"), PlaybackKind::Album),
    ("artist", Some("artist"), PlaybackKind::Artist),
    ("something", None, PlaybackKind::Something),
    ("song", Some("track"), PlaybackKind::Song),
];

#[derive(Debug, Clone)]
struct NamedPattern {
    name: &'static str,
    regex: Regex,
    group: Option<&'static str>,
    kind: PlaybackKind,
}

/// Resolver driven by the ordered pattern list
#[derive(Debug, Clone)]
pub struct RegexResolver {
    client_name: String,
    patterns: Vec<NamedPattern>,
}

impl RegexResolver {
    /// Load every pattern in [`PATTERN_ORDER`] from resources
    ///
    /// Missing or unusable patterns are skipped; their check can never match.
    pub fn load(resources: &dyn ResourceLocator, client_name: &str) -> Self {
        let sources = PATTERN_ORDER.iter().filter_map(|(name, _, _)| {
            let file = format!("{}.regex", name);
            match read_pattern(resources, &file) {
                Some(pattern) => Some((*name, pattern)),
                None => {
                    warn!("Pattern resource {} not found, skipping '{}' check", file, name);
                    None
                }
            }
        });
        Self::from_patterns(sources, client_name)
    }

    /// Build from `(name, pattern)` pairs; unknown names are ignored
    pub fn from_patterns<'a, I, S>(sources: I, client_name: &str) -> Self
    where
        I: IntoIterator<Item = (&'a str, S)>,
        S: AsRef<str>,
    {
        let sources: Vec<(&str, S)> = sources.into_iter().collect();

        // Keep check order regardless of input order
        let patterns: Vec<NamedPattern> = PATTERN_ORDER
            .iter()
            .filter_map(|(name, group, kind)| {
                let (_, source) = sources.iter().find(|(n, _)| n == name)?;
                let regex = match RegexBuilder::new(source.as_ref()).case_insensitive(true).build() {
                    Ok(regex) => regex,
                    Err(e) => {
                        warn!("Invalid '{}' pattern, skipping: {}", name, e);
                        return None;
                    }
                };
                if let Some(group) = group {
                    if !regex.capture_names().flatten().any(|n| n == *group) {
                        warn!("'{}' pattern has no <{}> group, skipping", name, group);
                        return None;
                    }
                }
                Some(NamedPattern {
                    name: *name,
                    regex,
                    group: *group,
                    kind: *kind,
                })
            })
            .collect();

        info!(
            patterns = ?patterns.iter().map(|p| p.name).collect::<Vec<_>>(),
            "Regex resolver ready"
        );

        Self {
            client_name: normalize_text(client_name),
            patterns,
        }
    }

    /// Names of the patterns that loaded, in check order
    pub fn pattern_names(&self) -> Vec<&'static str> {
        self.patterns.iter().map(|p| p.name).collect()
    }
}

impl Resolver for RegexResolver {
    fn name(&self) -> &'static str {
        "regex"
    }

    fn resolve(&self, phrase: &NormalizedPhrase) -> Option<Resolution> {
        if let Some(resolution) = bare_client_request(phrase, &self.client_name) {
            debug!("Bare client request, continuing playback");
            return Some(resolution);
        }

        for pattern in &self.patterns {
            let Some(captures) = pattern.regex.captures(&phrase.text) else {
                continue;
            };

            let request = match pattern.group {
                Some(group) => {
                    let name = captures.name(group).map(|m| m.as_str().trim()).unwrap_or("");
                    if name.is_empty() {
                        continue;
                    }
                    PlaybackRequest::named(pattern.kind, name)
                }
                None => PlaybackRequest::bare(pattern.kind),
            };

            debug!(pattern = pattern.name, request = ?request, "Pattern matched");
            return Some(Resolution::new(1.0, request));
        }

        debug!(phrase = %phrase.text, "No pattern matched");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::PhraseNormalizer;
    use crate::resources::BundledResources;

    fn resolver() -> RegexResolver {
        RegexResolver::load(&BundledResources::new("en-us"), "apple music")
    }

    fn resolve(resolver: &RegexResolver, phrase: &str) -> Option<Resolution> {
        let normalizer = PhraseNormalizer::new("apple music", None).unwrap();
        resolver.resolve(&normalizer.normalize(phrase))
    }

    fn request(resolver: &RegexResolver, phrase: &str) -> PlaybackRequest {
        resolve(resolver, phrase)
            .unwrap_or_else(|| panic!("no match for {:?}", phrase))
            .request
    }

    #[test]
    fn test_all_bundled_patterns_load() {
        assert_eq!(
            resolver().pattern_names(),
            vec!["playlist", "album", "artist", "something", "song"]
        );
    }

    #[test]
    fn test_playlist() {
        let resolver = resolver();
        let resolution = resolve(&resolver, "play my road trip playlist").unwrap();
        assert_eq!(resolution.confidence, 1.0);
        assert_eq!(
            resolution.request,
            PlaybackRequest::named(PlaybackKind::Playlist, "road trip")
        );
    }

    #[test]
    fn test_album() {
        assert_eq!(
            request(&resolver(), "play the album abbey road"),
            PlaybackRequest::named(PlaybackKind::Album, "abbey road")
        );
    }

    #[test]
    fn test_artist() {
        let resolver = resolver();
        assert_eq!(
            request(&resolver, "play songs by queen"),
            PlaybackRequest::named(PlaybackKind::Artist, "queen")
        );
        assert_eq!(
            request(&resolver, "play the artist miles davis"),
            PlaybackRequest::named(PlaybackKind::Artist, "miles davis")
        );
    }

    #[test]
    fn test_something_before_song() {
        let resolver = resolver();
        assert_eq!(
            request(&resolver, "play anything"),
            PlaybackRequest::bare(PlaybackKind::Something)
        );
        assert_eq!(
            request(&resolver, "play some music"),
            PlaybackRequest::bare(PlaybackKind::Something)
        );
    }

    #[test]
    fn test_song_with_client_suffix() {
        assert_eq!(
            request(&resolver(), "play bohemian rhapsody on apple music"),
            PlaybackRequest::named(PlaybackKind::Song, "bohemian rhapsody")
        );
    }

    #[test]
    fn test_continue() {
        assert_eq!(
            request(&resolver(), "continue on apple music"),
            PlaybackRequest::bare(PlaybackKind::Continue)
        );
    }

    #[test]
    fn test_no_match() {
        let resolver = resolver();
        assert!(resolve(&resolver, "what is the weather like").is_none());
        assert!(resolve(&resolver, "").is_none());
    }

    #[test]
    fn test_first_match_wins() {
        // Album pattern also matches, playlist is checked first
        let resolver = RegexResolver::from_patterns(
            [
                ("album", r"^play (?P<album>.+)$"),
                ("playlist", r"^play (?P<playlist>.+) playlist$"),
            ],
            "apple music",
        );
        assert_eq!(
            request(&resolver, "play chill playlist"),
            PlaybackRequest::named(PlaybackKind::Playlist, "chill")
        );
        assert_eq!(
            request(&resolver, "play chill"),
            PlaybackRequest::named(PlaybackKind::Album, "chill")
        );
    }

    #[test]
    fn test_unusable_patterns_are_skipped() {
        let resolver = RegexResolver::from_patterns(
            [
                ("album", r"^play (?P<album>.+"),
                ("artist", r"^play music by (?P<who>.+)$"),
                ("song", r"^play (?P<track>.+)$"),
            ],
            "apple music",
        );
        assert_eq!(resolver.pattern_names(), vec!["song"]);
    }

    #[test]
    fn test_missing_resources_leave_only_continue() {
        let resolver = RegexResolver::load(&BundledResources::new("fr-fr"), "apple music");
        assert!(resolver.pattern_names().is_empty());
        assert!(resolve(&resolver, "play hey jude").is_none());
        assert_eq!(
            request(&resolver, "apple music"),
            PlaybackRequest::bare(PlaybackKind::Continue)
        );
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let resolver = resolver();
        let first = resolve(&resolver, "play hey jude");
        let second = resolve(&resolver, "play hey jude");
        assert_eq!(first, second);
    }
}
