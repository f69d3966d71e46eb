//! Spoken feedback
//!
//! Dialogs are `<name>.dialog` resources, one variant per line. A random
//! variant is spoken each time.

use crate::resources::{read_lines, ResourceLocator};
use rand::seq::SliceRandom;
use std::collections::HashMap;
use tracing::{debug, warn};
use wmc_common::events::{EventBus, SkillEvent, SpeakData};

/// Dialogs the skill speaks
pub const DIALOG_NAMES: [&str; 1] = ["Playing"];

/// Host speech capability
pub trait SpeechOutput: Send + Sync {
    fn speak_dialog(&self, name: &str);
}

/// Renders dialog names to text
#[derive(Debug, Clone, Default)]
pub struct DialogRenderer {
    dialogs: HashMap<String, Vec<String>>,
}

impl DialogRenderer {
    /// Load the given dialogs from resources
    pub fn load(resources: &dyn ResourceLocator, names: &[&str]) -> Self {
        let mut dialogs = HashMap::new();
        for name in names {
            match read_lines(resources, &format!("{}.dialog", name)) {
                Some(lines) if !lines.is_empty() => {
                    dialogs.insert(name.to_string(), lines);
                }
                _ => warn!("Dialog {}.dialog not found, its name will be spoken", name),
            }
        }
        Self { dialogs }
    }

    /// One variant of the dialog, or the name itself when unknown
    pub fn render(&self, name: &str) -> String {
        self.dialogs
            .get(name)
            .and_then(|lines| lines.choose(&mut rand::thread_rng()))
            .cloned()
            .unwrap_or_else(|| name.replace('.', " "))
    }
}

/// Speech output publishing `speak` events on the bus
#[derive(Clone)]
pub struct BusSpeech {
    bus: EventBus,
    renderer: DialogRenderer,
}

impl BusSpeech {
    pub fn new(bus: EventBus, renderer: DialogRenderer) -> Self {
        Self { bus, renderer }
    }
}

impl SpeechOutput for BusSpeech {
    fn speak_dialog(&self, name: &str) {
        let utterance = self.renderer.render(name);
        debug!(dialog = name, utterance = %utterance, "Speaking");

        // Spoken feedback is best effort
        self.bus.emit_lossy(SkillEvent::Speak(SpeakData {
            utterance,
            dialog: Some(name.to_string()),
        }));
    }
}
