//! Event types for the web music control event system
//!
//! Provides the message-bus event definitions and the EventBus shared by the
//! skill and its host.

// Sub-modules (supporting types)
mod request_types;

pub use request_types::{ConfidenceTier, PlaybackKind, PlaybackRequest};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Outbound play event name
pub const PLAY_EVENT: &str = "web-music-control:play";

/// Outbound play event name used by older web clients
pub const LEGACY_PLAY_EVENT: &str = "web_client:play";

/// Speech output event name
pub const SPEAK_EVENT: &str = "speak";

/// Web client announced itself
pub const CONNECTED_EVENT: &str = "web-music-control:connected";

/// Web client went away
pub const DISCONNECTED_EVENT: &str = "web-music-control:disconnected";

/// Message bus event types
///
/// Serialized the way the host bus carries messages:
/// `{"type": "<event name>", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum SkillEvent {
    /// Ask the web client to start playback
    #[serde(rename = "web-music-control:play")]
    Play(PlaybackRequest),

    /// Same as `Play`, under the legacy event name
    #[serde(rename = "web_client:play")]
    LegacyPlay(PlaybackRequest),

    /// Ask the host speech service to say something
    #[serde(rename = "speak")]
    Speak(SpeakData),

    /// Web client connected to the bus; the payload is optional
    #[serde(rename = "web-music-control:connected")]
    ClientConnected(Option<ClientInfo>),

    /// Web client disconnected from the bus
    #[serde(rename = "web-music-control:disconnected")]
    ClientDisconnected,
}

/// Payload of a speak event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeakData {
    /// Rendered text to speak
    pub utterance: String,
    /// Dialog the text was rendered from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialog: Option<String>,
}

/// Payload of a client connected event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ClientInfo {
    /// Client display name, if it sent one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
}

impl SkillEvent {
    /// Get event type as string for filtering
    pub fn event_type(&self) -> &'static str {
        match self {
            SkillEvent::Play(_) => PLAY_EVENT,
            SkillEvent::LegacyPlay(_) => LEGACY_PLAY_EVENT,
            SkillEvent::Speak(_) => SPEAK_EVENT,
            SkillEvent::ClientConnected(_) => CONNECTED_EVENT,
            SkillEvent::ClientDisconnected => DISCONNECTED_EVENT,
        }
    }

    /// Playback request carried by a play event, if any
    pub fn playback_request(&self) -> Option<&PlaybackRequest> {
        match self {
            SkillEvent::Play(request) | SkillEvent::LegacyPlay(request) => Some(request),
            _ => None,
        }
    }
}

/// Which outbound event name play requests are published under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum EventChannel {
    /// `web-music-control:play`
    #[default]
    WebMusicControl,
    /// `web_client:play`
    WebClient,
}

impl EventChannel {
    /// Wrap a request in the play event for this channel
    pub fn play_event(&self, request: PlaybackRequest) -> SkillEvent {
        match self {
            EventChannel::WebMusicControl => SkillEvent::Play(request),
            EventChannel::WebClient => SkillEvent::LegacyPlay(request),
        }
    }
}

impl std::str::FromStr for EventChannel {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "web-music-control" => Ok(EventChannel::WebMusicControl),
            "web-client" | "web_client" => Ok(EventChannel::WebClient),
            other => Err(crate::Error::InvalidInput(format!(
                "Unknown event channel '{}' (expected web-music-control or web-client)",
                other
            ))),
        }
    }
}

// ========================================
// EventBus Implementation
// ========================================

/// Central event distribution bus between the skill and its host
///
/// The EventBus uses tokio::broadcast internally, providing:
/// - Non-blocking publish (slow subscribers don't block the skill)
/// - Multiple concurrent subscribers
/// - Lagged message detection for slow subscribers
///
/// # Examples
///
/// ```
/// use wmc_common::events::{EventBus, SkillEvent};
/// use wmc_common::{PlaybackKind, PlaybackRequest};
///
/// let event_bus = EventBus::new(100);
/// let mut rx = event_bus.subscribe();
///
/// event_bus
///     .emit(SkillEvent::Play(PlaybackRequest::bare(PlaybackKind::Continue)))
///     .ok();
///
/// let received = rx.try_recv().unwrap();
/// assert_eq!(received.event_type(), "web-music-control:play");
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SkillEvent>,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// `capacity` is the number of events buffered before the oldest are dropped
    /// for lagging subscribers.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<SkillEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: SkillEvent,
    ) -> Result<usize, broadcast::error::SendError<SkillEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: SkillEvent) {
        let _ = self.tx.send(event);
    }
}
