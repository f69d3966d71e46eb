//! Integration tests for the web music control skill
//!
//! Drive the skill the way a host does: match a phrase, start playback of
//! the match, observe the events on the bus.

use std::fs;
use tempfile::TempDir;
use wmc_common::config::{ResolverKind, SkillConfig};
use wmc_common::events::{EventBus, EventChannel, SkillEvent};
use wmc_common::{ConfidenceTier, PlaybackKind, PlaybackRequest};
use wmc_skill::resolver::ResolverError;
use wmc_skill::resources::{BundledResources, DirectoryResources};
use wmc_skill::{CommonPlaySkill, SkillError, WebMusicSkill};

fn connected_config(resolver: ResolverKind) -> SkillConfig {
    SkillConfig {
        resolver,
        client_connected: true,
        ..SkillConfig::default()
    }
}

fn build(config: &SkillConfig) -> (WebMusicSkill, EventBus) {
    let bus = EventBus::new(16);
    let skill = WebMusicSkill::new(config, &BundledResources::new("en-us"), bus.clone()).unwrap();
    (skill, bus)
}

fn drain(rx: &mut tokio::sync::broadcast::Receiver<SkillEvent>) -> Vec<SkillEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[test]
fn test_no_client_only_claims_client_name() {
    for resolver in [ResolverKind::Regex, ResolverKind::Classifier] {
        let (skill, _) = build(&SkillConfig {
            resolver,
            ..SkillConfig::default()
        });

        let m = skill.match_query("Apple Music").unwrap();
        assert_eq!(m.tier, ConfidenceTier::Generic);
        assert!(m.data.is_none());

        assert!(skill.match_query("play anything").is_none());
        assert!(skill.match_query("play my road trip playlist").is_none());
    }
}

#[test]
fn test_regex_song_on_client_is_exact() {
    let (skill, _) = build(&connected_config(ResolverKind::Regex));

    let m = skill.match_query("play bohemian rhapsody on apple music").unwrap();
    assert_eq!(m.tier, ConfidenceTier::Exact);
    assert_eq!(
        m.data,
        Some(PlaybackRequest::named(PlaybackKind::Song, "bohemian rhapsody"))
    );
}

#[test]
fn test_regex_playlist_and_continue() {
    let (skill, _) = build(&connected_config(ResolverKind::Regex));

    let m = skill.match_query("play my road trip playlist").unwrap();
    assert_eq!(m.tier, ConfidenceTier::Exact);
    assert_eq!(
        m.data,
        Some(PlaybackRequest::named(PlaybackKind::Playlist, "road trip"))
    );

    let m = skill.match_query("continue on apple music").unwrap();
    assert_eq!(m.data, Some(PlaybackRequest::bare(PlaybackKind::Continue)));
}

#[test]
fn test_classifier_artist_tier_depends_on_client() {
    let (skill, _) = build(&connected_config(ResolverKind::Classifier));
    let expected = Some(PlaybackRequest::named(PlaybackKind::Artist, "miles davis"));

    let m = skill.match_query("play some jazz by miles davis").unwrap();
    assert_eq!(m.tier, ConfidenceTier::Title);
    assert_eq!(m.data, expected);

    let m = skill
        .match_query("play some jazz by miles davis on apple music")
        .unwrap();
    assert_eq!(m.tier, ConfidenceTier::Exact);
    assert_eq!(m.data, expected);
}

#[test]
fn test_classifier_known_song() {
    let (skill, _) = build(&connected_config(ResolverKind::Classifier));

    let m = skill.match_query("play hey jude").unwrap();
    assert_eq!(m.tier, ConfidenceTier::Exact);
    assert_eq!(m.data, Some(PlaybackRequest::named(PlaybackKind::Song, "hey jude")));
}

#[test]
fn test_match_is_idempotent() {
    for resolver in [ResolverKind::Regex, ResolverKind::Classifier] {
        let (skill, _) = build(&connected_config(resolver));
        let first = skill.match_query("play so what by miles davis");
        assert!(first.is_some());
        assert_eq!(first, skill.match_query("play so what by miles davis"));
    }
}

#[test]
fn test_start_playback_emits_play_and_speak() {
    let (skill, bus) = build(&connected_config(ResolverKind::Regex));
    let mut rx = bus.subscribe();

    let m = skill.match_query("play the album abbey road").unwrap();
    skill.start_playback(&m.phrase, m.data.as_ref());

    let events = drain(&mut rx);
    assert_eq!(events.len(), 2);
    assert_eq!(
        events[0],
        SkillEvent::Play(PlaybackRequest::named(PlaybackKind::Album, "abbey road"))
    );
    assert_eq!(events[1].event_type(), "speak");

    let json = serde_json::to_value(&events[0]).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "type": "web-music-control:play",
            "data": {"type": "album", "name": "abbey road"}
        })
    );
}

#[test]
fn test_legacy_event_channel() {
    let (skill, bus) = build(&SkillConfig {
        event_channel: EventChannel::WebClient,
        ..connected_config(ResolverKind::Regex)
    });
    let mut rx = bus.subscribe();

    skill.start_playback("play something", Some(&PlaybackRequest::bare(PlaybackKind::Something)));

    let events = drain(&mut rx);
    assert_eq!(events[0].event_type(), "web_client:play");
    assert_eq!(
        events[0].playback_request(),
        Some(&PlaybackRequest::bare(PlaybackKind::Something))
    );
}

#[test]
fn test_connection_events_gate_playback() {
    let (skill, bus) = build(&SkillConfig::default());
    let mut rx = bus.subscribe();
    let request = PlaybackRequest::named(PlaybackKind::Song, "yesterday");

    skill.start_playback("play yesterday", Some(&request));
    assert!(drain(&mut rx).is_empty());

    let connected: SkillEvent =
        serde_json::from_str(r#"{"type": "web-music-control:connected"}"#).unwrap();
    skill.handle_event(&connected);
    assert!(skill.match_query("play yesterday").is_some());

    skill.start_playback("play yesterday", Some(&request));
    let events = drain(&mut rx);
    assert_eq!(events[0], SkillEvent::Play(request.clone()));

    skill.handle_event(&SkillEvent::ClientDisconnected);
    skill.start_playback("play yesterday", Some(&request));
    assert!(drain(&mut rx).is_empty());
}

#[test]
fn test_start_playback_without_data_is_silent() {
    let (skill, bus) = build(&connected_config(ResolverKind::Regex));
    let mut rx = bus.subscribe();

    skill.start_playback("apple music", None);
    assert!(drain(&mut rx).is_empty());
}

#[test]
fn test_directory_resources_override_patterns() {
    let dir = TempDir::new().unwrap();
    let lang_dir = dir.path().join("en-us");
    fs::create_dir_all(&lang_dir).unwrap();
    fs::write(lang_dir.join("song.regex"), "^(?:play|hear)\\s+(?P<track>.+)$\n").unwrap();
    fs::write(lang_dir.join("Playing.dialog"), "# custom\nRolling.\n").unwrap();

    let bus = EventBus::new(16);
    let mut rx = bus.subscribe();
    let skill = WebMusicSkill::new(
        &connected_config(ResolverKind::Regex),
        &DirectoryResources::new(dir.path(), "en-us"),
        bus,
    )
    .unwrap();

    let m = skill.match_query("hear yesterday").unwrap();
    assert_eq!(m.data, Some(PlaybackRequest::named(PlaybackKind::Song, "yesterday")));

    // Bundled patterns still apply
    let m = skill.match_query("play anything").unwrap();
    assert_eq!(m.data, Some(PlaybackRequest::bare(PlaybackKind::Something)));

    skill.start_playback(&m.phrase, m.data.as_ref());
    match &drain(&mut rx)[1] {
        SkillEvent::Speak(data) => assert_eq!(data.utterance, "Rolling."),
        other => panic!("expected speak event, got {:?}", other),
    }
}

#[test]
fn test_classifier_without_resources_fails_to_build() {
    let config = SkillConfig {
        language: "fr-fr".to_string(),
        ..connected_config(ResolverKind::Classifier)
    };
    let result = WebMusicSkill::new(&config, &BundledResources::new("fr-fr"), EventBus::new(4));
    assert!(matches!(
        result,
        Err(SkillError::Resolver(ResolverError::NoIntents))
    ));
}

#[test]
fn test_classifier_phrase_without_verb() {
    // Hosts may strip the spoken "play" before asking
    let (skill, _) = build(&connected_config(ResolverKind::Classifier));

    let m = skill.match_query("hey jude").unwrap();
    assert_eq!(m.tier, ConfidenceTier::Exact);
    assert_eq!(m.data, Some(PlaybackRequest::named(PlaybackKind::Song, "hey jude")));

    let m = skill.match_query("some jazz by miles davis").unwrap();
    assert_eq!(m.tier, ConfidenceTier::Title);
    assert_eq!(
        m.data,
        Some(PlaybackRequest::named(PlaybackKind::Artist, "miles davis"))
    );
}

#[test]
fn test_empty_client_name_is_rejected() {
    let config = SkillConfig {
        client_name: String::new(),
        ..connected_config(ResolverKind::Regex)
    };
    let result = WebMusicSkill::new(&config, &BundledResources::new("en-us"), EventBus::new(4));
    assert!(matches!(
        result,
        Err(SkillError::Common(wmc_common::Error::Config(_)))
    ));
}
