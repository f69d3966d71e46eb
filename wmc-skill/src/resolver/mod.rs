//! Intent resolution
//!
//! A resolver turns a normalized phrase into a playback request with a
//! confidence score, or declines it. Two implementations exist:
//! - [`RegexResolver`]: ordered named patterns, first match wins
//! - [`ClassifierResolver`]: example-trained intent classifier with slots
//!
//! Both are built once, eagerly, and are immutable afterwards.

mod classifier;
mod intent_engine;
mod patterns;

pub use classifier::{ClassifierResolver, ENTITY_NAMES, INTENT_NAMES};
pub use intent_engine::{Classification, IntentClassifier, IntentClassifierBuilder};
pub use patterns::{RegexResolver, PATTERN_ORDER};

use crate::normalizer::{normalize_text, strip_playback_verb, NormalizedPhrase};
use crate::resources::ResourceLocator;
use thiserror::Error;
use wmc_common::config::{ResolverKind, SkillConfig};
use wmc_common::{PlaybackKind, PlaybackRequest};

/// Resolver construction errors
///
/// Query-time resolution never fails; it only declines.
#[derive(Debug, Error)]
pub enum ResolverError {
    /// No intent examples could be loaded, nothing to train on
    #[error("No intents available for training")]
    NoIntents,

    /// A pattern could not be compiled
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Resolver output for an accepted phrase
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Score in [0.0, 1.0]
    pub confidence: f64,
    pub request: PlaybackRequest,
}

impl Resolution {
    pub fn new(confidence: f64, request: PlaybackRequest) -> Self {
        Self {
            confidence: confidence.clamp(0.0, 1.0),
            request,
        }
    }
}

/// Phrase-to-request resolution
pub trait Resolver: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Resolve a phrase; `None` means nothing found
    fn resolve(&self, phrase: &NormalizedPhrase) -> Option<Resolution>;
}

/// Build the resolver selected by the configuration
pub fn build_resolver(
    config: &SkillConfig,
    resources: &dyn ResourceLocator,
) -> Result<Box<dyn Resolver>, ResolverError> {
    let resolver: Box<dyn Resolver> = match config.resolver {
        ResolverKind::Regex => Box::new(RegexResolver::load(resources, &config.client_name)),
        ResolverKind::Classifier => Box::new(ClassifierResolver::train(
            resources,
            &config.classifier,
            &config.client_name,
        )?),
    };
    Ok(resolver)
}

/// Request to simply resume the client
///
/// Matches the bare client name ("apple music"), or a phrase that is nothing
/// but a playback verb once the client suffix is gone ("continue on apple
/// music", "play apple music").
pub(crate) fn bare_client_request(
    phrase: &NormalizedPhrase,
    client_name: &str,
) -> Option<Resolution> {
    let original = normalize_text(&phrase.original);
    let rest = strip_playback_verb(&phrase.text);

    let is_bare = original == client_name
        || (phrase.client_specified && (rest.is_empty() || rest == client_name));

    is_bare.then(|| Resolution::new(1.0, PlaybackRequest::bare(PlaybackKind::Continue)))
}
