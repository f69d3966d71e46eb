//! Web music control (web-music-control) - Command-line host
//!
//! Runs the skill outside a voice assistant: every phrase is matched, matches
//! with a request are started, and every event the skill publishes is printed
//! as one JSON line.

use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use wmc_common::config::{LoggingConfig, ResolverKind, SkillConfig};
use wmc_common::events::{EventBus, EventChannel, SkillEvent};
use wmc_skill::{CommonPlaySkill, QueryMatch, WebMusicSkill};

/// Command-line arguments for web-music-control
#[derive(Parser, Debug)]
#[command(name = "web-music-control")]
#[command(about = "Resolve spoken phrases into web music client playback requests")]
#[command(version)]
struct Args {
    /// Phrases to match; read from stdin, one per line, when omitted
    phrases: Vec<String>,

    /// Config file (TOML)
    #[arg(short, long, env = "WMC_CONFIG")]
    config: Option<PathBuf>,

    /// Resolver to use (regex or classifier)
    #[arg(short, long)]
    resolver: Option<ResolverKind>,

    /// Directory holding <language>/<resource> files
    #[arg(long)]
    resource_dir: Option<PathBuf>,

    /// Spoken client name
    #[arg(long)]
    client_name: Option<String>,

    /// Play event name (web-music-control or web-client)
    #[arg(long)]
    event_channel: Option<EventChannel>,

    /// Start with a connected web client
    #[arg(long)]
    connected: bool,

    /// Only match, never start playback
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args)?;
    init_tracing(&config.logging)?;

    info!(
        "Starting web-music-control {} ({}, built {}, {})",
        env!("CARGO_PKG_VERSION"),
        env!("WMC_GIT_REVISION"),
        env!("WMC_BUILD_DATE"),
        env!("WMC_BUILD_PROFILE")
    );

    let bus = EventBus::new(config.event_bus_capacity);
    let mut rx = bus.subscribe();

    let skill = WebMusicSkill::from_config(&config, bus.clone())
        .context("Failed to build web music control skill")?;
    info!(resolver = skill.resolver_name(), "Skill initialized");

    if args.phrases.is_empty() {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with('{') {
                // Inbound bus event, e.g. a client connecting
                match serde_json::from_str::<SkillEvent>(line) {
                    Ok(event) => skill.handle_event(&event),
                    Err(e) => warn!("Ignoring malformed event: {}", e),
                }
                continue;
            }
            process_phrase(&skill, line, args.dry_run)?;
            print_events(&mut rx)?;
        }
    } else {
        for phrase in &args.phrases {
            process_phrase(&skill, phrase, args.dry_run)?;
            print_events(&mut rx)?;
        }
    }

    info!("Done");
    Ok(())
}

/// Config file per resolution order, then command-line overrides
fn load_config(args: &Args) -> Result<SkillConfig> {
    let mut config =
        SkillConfig::resolve(args.config.as_deref()).context("Failed to load configuration")?;

    if let Some(resolver) = args.resolver {
        config.resolver = resolver;
    }
    if let Some(dir) = &args.resource_dir {
        config.resource_dir = Some(dir.clone());
    }
    if let Some(name) = &args.client_name {
        config.client_name = name.clone();
    }
    if let Some(channel) = args.event_channel {
        config.event_channel = channel;
    }
    if args.connected {
        config.client_connected = true;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// RUST_LOG wins over the configured level; logs go to stderr unless a file is set
fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "web_music_control={0},wmc_skill={0},wmc_common={0}",
            logging.level
        ))
    });

    let writer = match &logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(logging.file.is_none()),
        )
        .init();
    Ok(())
}

fn process_phrase(skill: &WebMusicSkill, phrase: &str, dry_run: bool) -> Result<()> {
    let matched: Option<QueryMatch> = skill.match_query(phrase);
    println!(
        "{}",
        serde_json::to_string(&serde_json::json!({ "phrase": phrase, "match": matched }))?
    );

    if dry_run {
        return Ok(());
    }
    if let Some(QueryMatch { data: Some(request), .. }) = &matched {
        skill.start_playback(phrase, Some(request));
    }
    Ok(())
}

/// Print every event published so far
fn print_events(rx: &mut broadcast::Receiver<SkillEvent>) -> Result<()> {
    loop {
        match rx.try_recv() {
            Ok(event) => println!("{}", serde_json::to_string(&event)?),
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                warn!(skipped, "Event output lagged");
            }
            Err(broadcast::error::TryRecvError::Empty) | Err(broadcast::error::TryRecvError::Closed) => {
                debug!("Event queue drained");
                return Ok(());
            }
        }
    }
}
