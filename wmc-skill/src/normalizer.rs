//! Phrase normalization
//!
//! Lowercases the transcribed phrase, collapses whitespace and strips the
//! client-designation suffix ("... on apple music"), remembering whether the
//! client was named at all.

use regex::{Regex, RegexBuilder};
use tracing::warn;

/// Placeholder in the `on_client` pattern replaced by the client name
pub const CLIENT_PLACEHOLDER: &str = "{client}";

/// Leading words that only say "start playback"
const PLAYBACK_VERBS: [&str; 3] = ["play", "continue", "resume"];

/// Phrase after normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPhrase {
    /// Phrase as received
    pub original: String,
    /// Lowercased phrase without the client suffix
    pub text: String,
    /// The phrase named the client explicitly
    pub client_specified: bool,
}

/// Strips the client designation from phrases
#[derive(Debug, Clone)]
pub struct PhraseNormalizer {
    client_name: String,
    suffix: Regex,
}

impl PhraseNormalizer {
    /// Build from the client name and an optional `on_client` pattern
    ///
    /// `{client}` inside the pattern expands to the client name with flexible
    /// whitespace. An unusable pattern falls back to the built-in suffix.
    pub fn new(client_name: &str, on_client_pattern: Option<&str>) -> Result<Self, regex::Error> {
        let client_name = normalize_text(client_name);
        let client_words = client_name
            .split(' ')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(r"\s+");

        let default_pattern = format!(r"\s*\b(?:on|using|with)\s+{}\s*$", client_words);

        let suffix = match on_client_pattern {
            Some(pattern) => {
                let expanded = pattern.replace(CLIENT_PLACEHOLDER, &client_words);
                match compile(&expanded) {
                    Ok(regex) => regex,
                    Err(e) => {
                        warn!("Invalid on_client pattern, using built-in suffix: {}", e);
                        compile(&default_pattern)?
                    }
                }
            }
            None => compile(&default_pattern)?,
        };

        Ok(Self {
            client_name,
            suffix,
        })
    }

    /// Normalized client name
    pub fn client_name(&self) -> &str {
        &self.client_name
    }

    pub fn normalize(&self, phrase: &str) -> NormalizedPhrase {
        let cleaned = normalize_text(phrase.trim_end_matches(['.', '!', '?', ',']));
        let client_specified = cleaned.contains(&self.client_name);
        let text = self.suffix.replace(&cleaned, "").trim().to_string();

        NormalizedPhrase {
            original: phrase.to_string(),
            text,
            client_specified,
        }
    }
}

/// Phrase without a leading "play", "continue" or "resume"
pub fn strip_playback_verb(text: &str) -> &str {
    let text = text.trim();
    for verb in PLAYBACK_VERBS {
        if text == verb {
            return "";
        }
        if let Some(rest) = text.strip_prefix(verb) {
            if rest.starts_with(char::is_whitespace) {
                return rest.trim_start();
            }
        }
    }
    text
}

/// Lowercase with single spaces between words
pub fn normalize_text(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn compile(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> PhraseNormalizer {
        PhraseNormalizer::new("Apple Music", None).unwrap()
    }

    #[test]
    fn test_strips_client_suffix() {
        let phrase = normalizer().normalize("Play Bohemian Rhapsody on Apple Music");
        assert_eq!(phrase.text, "play bohemian rhapsody");
        assert!(phrase.client_specified);
        assert_eq!(phrase.original, "Play Bohemian Rhapsody on Apple Music");
    }

    #[test]
    fn test_no_suffix_is_noop() {
        let phrase = normalizer().normalize("play   my road trip playlist.");
        assert_eq!(phrase.text, "play my road trip playlist");
        assert!(!phrase.client_specified);
    }

    #[test]
    fn test_bare_client_name_is_kept() {
        let phrase = normalizer().normalize("apple music");
        assert_eq!(phrase.text, "apple music");
        assert!(phrase.client_specified);
    }

    #[test]
    fn test_resource_pattern_with_placeholder() {
        let normalizer =
            PhraseNormalizer::new("apple music", Some(r"\s*\b(?:on|via)\s+{client}\s*$")).unwrap();
        assert_eq!(normalizer.normalize("play hey jude via apple  music").text, "play hey jude");
        // "using" is not part of this pattern
        assert_eq!(
            normalizer.normalize("play hey jude using apple music").text,
            "play hey jude using apple music"
        );
    }

    #[test]
    fn test_invalid_pattern_falls_back() {
        let normalizer = PhraseNormalizer::new("apple music", Some("(unclosed")).unwrap();
        assert_eq!(normalizer.normalize("play jazz on apple music").text, "play jazz");
    }

    #[test]
    fn test_strip_playback_verb() {
        assert_eq!(strip_playback_verb("play hey jude"), "hey jude");
        assert_eq!(strip_playback_verb("continue"), "");
        assert_eq!(strip_playback_verb("resume  apple music"), "apple music");
        assert_eq!(strip_playback_verb("playlist road trip"), "playlist road trip");
        assert_eq!(strip_playback_verb("hey jude"), "hey jude");
    }
}
