//! Resource loading
//!
//! Patterns, intent examples, entity vocabularies and dialogs are plain text
//! resources looked up by file name (`playlist.regex`, `play.song.intent`,
//! `song_name.entity`, `Playing.dialog`). Everything is read once while the
//! skill is built; nothing is loaded lazily at query time.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use wmc_common::config::SkillConfig;

/// Language the bundled resources are written for
pub const BUNDLED_LANGUAGE: &str = "en-us";

static BUNDLED_EN_US: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("on_client.regex", include_str!("../resources/en-us/on_client.regex")),
        ("playlist.regex", include_str!("../resources/en-us/playlist.regex")),
        ("album.regex", include_str!("../resources/en-us/album.regex")),
        ("artist.regex", include_str!("../resources/en-us/artist.regex")),
        ("something.regex", include_str!("../resources/en-us/something.regex")),
        ("song.regex", include_str!("../resources/en-us/song.regex")),
        ("play.song.intent", include_str!("../resources/en-us/play.song.intent")),
        ("play.album.intent", include_str!("../resources/en-us/play.album.intent")),
        ("play.artist.intent", include_str!("../resources/en-us/play.artist.intent")),
        ("play.playlist.intent", include_str!("../resources/en-us/play.playlist.intent")),
        ("play.something.intent", include_str!("../resources/en-us/play.something.intent")),
        ("song_name.entity", include_str!("../resources/en-us/song_name.entity")),
        ("playlist_name.entity", include_str!("../resources/en-us/playlist_name.entity")),
        ("Playing.dialog", include_str!("../resources/en-us/Playing.dialog")),
    ])
});

/// Host-provided access to named text resources
pub trait ResourceLocator: Send + Sync {
    /// Full text of the named resource, `None` when it does not exist
    fn read(&self, name: &str) -> Option<String>;
}

/// Resources compiled into the binary
#[derive(Debug, Clone)]
pub struct BundledResources {
    language: String,
}

impl BundledResources {
    pub fn new(language: &str) -> Self {
        if !language.eq_ignore_ascii_case(BUNDLED_LANGUAGE) {
            warn!(
                "No bundled resources for language '{}', only {} is bundled",
                language, BUNDLED_LANGUAGE
            );
        }
        Self {
            language: language.to_lowercase(),
        }
    }
}

impl ResourceLocator for BundledResources {
    fn read(&self, name: &str) -> Option<String> {
        if self.language != BUNDLED_LANGUAGE {
            return None;
        }
        BUNDLED_EN_US.get(name).map(|text| text.to_string())
    }
}

/// Resources read from `<root>/<language>/<name>`
///
/// Files missing from the directory fall back to the bundled copy.
#[derive(Debug, Clone)]
pub struct DirectoryResources {
    dir: PathBuf,
    fallback: BundledResources,
}

impl DirectoryResources {
    pub fn new(root: &Path, language: &str) -> Self {
        Self {
            dir: root.join(language),
            fallback: BundledResources::new(language),
        }
    }
}

impl ResourceLocator for DirectoryResources {
    fn read(&self, name: &str) -> Option<String> {
        let path = self.dir.join(name);
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                debug!("Loaded resource {}", path.display());
                Some(text)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => self.fallback.read(name),
            Err(e) => {
                warn!("Failed to read resource {}: {}", path.display(), e);
                None
            }
        }
    }
}

/// Pick the locator the configuration asks for
pub fn locator_for(config: &SkillConfig) -> Box<dyn ResourceLocator> {
    match &config.resource_dir {
        Some(dir) => Box::new(DirectoryResources::new(dir, &config.language)),
        None => Box::new(BundledResources::new(&config.language)),
    }
}

/// Non-empty, non-comment lines of a list resource (`.intent`, `.entity`, `.dialog`)
pub fn read_lines(resources: &dyn ResourceLocator, name: &str) -> Option<Vec<String>> {
    let text = resources.read(name)?;
    Some(
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect(),
    )
}

/// The single pattern held by a `.regex` resource
pub fn read_pattern(resources: &dyn ResourceLocator, name: &str) -> Option<String> {
    read_lines(resources, name)?.into_iter().next()
}
