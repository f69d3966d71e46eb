//! # Web Music Control Common Library
//!
//! Shared code for the web music control skill and its host binary:
//! - Playback request and confidence tier types
//! - Event types (SkillEvent enum) and the EventBus
//! - Configuration loading
//! - Common error type

pub mod config;
pub mod error;
pub mod events;

pub use error::{Error, Result};
pub use events::{ConfidenceTier, PlaybackKind, PlaybackRequest};
