//! Web music control skill library
//!
//! Resolves spoken "play ..." phrases into playback requests for a web music
//! client and publishes them on the event bus.

pub mod dialog;
pub mod error;
pub mod normalizer;
pub mod resolver;
pub mod resources;
pub mod skill;
pub mod tiers;

pub use error::{Result, SkillError};
pub use skill::{CommonPlaySkill, QueryMatch, WebMusicSkill};
