//! Web music control skill
//!
//! Answers the host's "can you play this?" question with a confidence tier and
//! a playback request, and forwards accepted requests to the web client as
//! bus events.

use crate::dialog::{BusSpeech, DialogRenderer, SpeechOutput, DIALOG_NAMES};
use crate::error::Result;
use crate::normalizer::PhraseNormalizer;
use crate::resolver::{build_resolver, Resolver};
use crate::resources::{locator_for, read_pattern, ResourceLocator};
use crate::tiers::TierPolicy;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};
use wmc_common::config::SkillConfig;
use wmc_common::events::{EventBus, EventChannel, SkillEvent};
use wmc_common::{ConfidenceTier, PlaybackRequest};

/// Dialog spoken when playback starts
pub const PLAYING_DIALOG: &str = "Playing";

/// Answer to a query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryMatch {
    /// Phrase as received
    pub phrase: String,
    pub tier: ConfidenceTier,
    /// Request to start, absent for a bare client mention without a client
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<PlaybackRequest>,
}

/// Capability the host arbitrates "play ..." utterances over
pub trait CommonPlaySkill: Send + Sync {
    /// Whether and how well this skill can play the phrase
    fn match_query(&self, phrase: &str) -> Option<QueryMatch>;

    /// Start playback of a match this skill won
    fn start_playback(&self, phrase: &str, data: Option<&PlaybackRequest>);
}

pub struct WebMusicSkill {
    normalizer: PhraseNormalizer,
    resolver: Box<dyn Resolver>,
    tiers: TierPolicy,
    bus: EventBus,
    channel: EventChannel,
    speech: Box<dyn SpeechOutput>,
    client_connected: AtomicBool,
}

impl WebMusicSkill {
    /// Build the skill, loading every resource and compiling or training the resolver
    pub fn new(config: &SkillConfig, resources: &dyn ResourceLocator, bus: EventBus) -> Result<Self> {
        config.validate()?;
        let on_client = read_pattern(resources, "on_client.regex");
        let normalizer = PhraseNormalizer::new(&config.client_name, on_client.as_deref())?;
        let resolver = build_resolver(config, resources)?;
        let speech = BusSpeech::new(bus.clone(), DialogRenderer::load(resources, &DIALOG_NAMES));

        info!(
            resolver = resolver.name(),
            client = %normalizer.client_name(),
            language = %config.language,
            channel = ?config.event_channel,
            "Web music control skill ready"
        );

        Ok(Self {
            normalizer,
            resolver,
            tiers: TierPolicy::from_config(&config.tiers),
            bus,
            channel: config.event_channel,
            speech: Box::new(speech),
            client_connected: AtomicBool::new(config.client_connected),
        })
    }

    /// Build with the resources the configuration points at
    pub fn from_config(config: &SkillConfig, bus: EventBus) -> Result<Self> {
        let resources = locator_for(config);
        Self::new(config, resources.as_ref(), bus)
    }

    /// Replace the speech output
    pub fn with_speech(mut self, speech: Box<dyn SpeechOutput>) -> Self {
        self.speech = speech;
        self
    }

    pub fn resolver_name(&self) -> &'static str {
        self.resolver.name()
    }

    pub fn is_client_connected(&self) -> bool {
        self.client_connected.load(Ordering::SeqCst)
    }

    pub fn set_client_connected(&self, connected: bool) {
        let was = self.client_connected.swap(connected, Ordering::SeqCst);
        if was != connected {
            info!(connected, "Web client connection changed");
        }
    }

    /// Track client connection events seen on the bus
    pub fn handle_event(&self, event: &SkillEvent) {
        match event {
            SkillEvent::ClientConnected(info) => {
                let client = info.as_ref().and_then(|i| i.client.as_deref());
                debug!(client = ?client, "Client connected event");
                self.set_client_connected(true);
            }
            SkillEvent::ClientDisconnected => self.set_client_connected(false),
            _ => {}
        }
    }
}

impl CommonPlaySkill for WebMusicSkill {
    fn match_query(&self, phrase: &str) -> Option<QueryMatch> {
        let normalized = self.normalizer.normalize(phrase);

        if !self.is_client_connected() {
            // Still claim the phrase when the client was asked for by name
            if normalized.client_specified {
                info!(phrase, "Client named but not connected");
                return Some(QueryMatch {
                    phrase: phrase.to_string(),
                    tier: ConfidenceTier::Generic,
                    data: None,
                });
            }
            debug!(phrase, "No client connected, declining");
            return None;
        }

        let resolution = self.resolver.resolve(&normalized)?;
        let tier = self
            .tiers
            .assign(resolution.confidence, normalized.client_specified);

        debug!(
            phrase,
            confidence = resolution.confidence,
            tier = %tier,
            request = ?resolution.request,
            "Matched"
        );

        Some(QueryMatch {
            phrase: phrase.to_string(),
            tier,
            data: Some(resolution.request),
        })
    }

    fn start_playback(&self, phrase: &str, data: Option<&PlaybackRequest>) {
        if !self.is_client_connected() {
            info!(phrase, "No web client connected, not starting playback");
            return;
        }
        let Some(request) = data else {
            debug!(phrase, "Nothing to play");
            return;
        };

        let event = self.channel.play_event(request.clone());
        let event_type = event.event_type();
        match self.bus.emit(event) {
            Ok(receivers) => info!(event = event_type, receivers, request = ?request, "Playback requested"),
            Err(_) => warn!(event = event_type, "No listener for play event, request dropped"),
        }

        self.speech.speak_dialog(PLAYING_DIALOG);
    }
}
