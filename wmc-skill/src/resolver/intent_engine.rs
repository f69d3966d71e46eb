//! Example-trained intent classifier
//!
//! Each intent is a list of example utterances. Inside an example `{name}`
//! marks a slot and `*` matches any words without extracting them. Training
//! compiles every example into an anchored template; classification scores
//! the templates that match the whole query.
//!
//! Scoring:
//! - a template without slots or wildcards scores 1.0
//! - otherwise `0.5 + 0.5 × mean(confirmation)` over its slots and wildcards,
//!   where a slot is confirmed by a close entity vocabulary entry
//!   (Jaro-Winkler similarity ≥ fuzzy threshold) and a wildcard never is
//!
//! The highest score wins; ties go to the template with more literal text.

use super::ResolverError;
use crate::normalizer::normalize_text;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

/// Intent classification result
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Winning intent label
    pub intent: String,
    /// Score in [0.0, 1.0]
    pub confidence: f64,
    /// Slot name → extracted value (canonical vocabulary entry when confirmed)
    pub slots: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
struct Template {
    regex: Regex,
    slots: Vec<String>,
    wildcards: usize,
    literal_len: usize,
}

impl Template {
    fn compile(example: &str) -> Result<Self, regex::Error> {
        let mut parts = Vec::new();
        let mut slots = Vec::new();
        let mut wildcards = 0;
        let mut literal_len = 0;

        for token in normalize_text(example).split(' ') {
            if let Some(slot) = token.strip_prefix('{').and_then(|t| t.strip_suffix('}')) {
                parts.push(format!("(?P<{}>.+?)", slot));
                slots.push(slot.to_string());
            } else if token == "*" {
                parts.push(".+?".to_string());
                wildcards += 1;
            } else {
                parts.push(regex::escape(token));
                literal_len += token.len();
            }
        }

        let regex = Regex::new(&format!("^{}$", parts.join(r"\s+")))?;
        Ok(Self {
            regex,
            slots,
            wildcards,
            literal_len,
        })
    }
}

#[derive(Debug, Clone)]
struct TrainedIntent {
    name: String,
    templates: Vec<Template>,
}

/// Collects intents and entities before training
#[derive(Debug, Clone)]
pub struct IntentClassifierBuilder {
    intents: Vec<(String, Vec<String>)>,
    entities: HashMap<String, Vec<String>>,
    fuzzy_threshold: f64,
}

impl Default for IntentClassifierBuilder {
    fn default() -> Self {
        Self {
            intents: Vec::new(),
            entities: HashMap::new(),
            fuzzy_threshold: 0.92,
        }
    }
}

impl IntentClassifierBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Minimum similarity for a slot value to count as a vocabulary entry
    pub fn fuzzy_threshold(mut self, threshold: f64) -> Self {
        self.fuzzy_threshold = threshold;
        self
    }

    pub fn add_intent<S: AsRef<str>>(&mut self, name: &str, examples: &[S]) -> &mut Self {
        let examples = examples.iter().map(|e| e.as_ref().to_string()).collect();
        self.intents.push((name.to_string(), examples));
        self
    }

    pub fn add_entity<S: AsRef<str>>(&mut self, name: &str, values: &[S]) -> &mut Self {
        let values = values
            .iter()
            .map(|v| normalize_text(v.as_ref()))
            .filter(|v| !v.is_empty())
            .collect();
        self.entities.insert(name.to_string(), values);
        self
    }

    /// Compile all examples
    ///
    /// Examples that do not compile (bad slot names, a slot used twice) are
    /// skipped. Fails only when no usable example remains.
    pub fn train(self) -> Result<IntentClassifier, ResolverError> {
        let mut intents = Vec::new();

        for (name, examples) in self.intents {
            let templates: Vec<Template> = examples
                .iter()
                .filter_map(|example| match Template::compile(example) {
                    Ok(template) => Some(template),
                    Err(e) => {
                        warn!(intent = %name, example = %example, "Skipping example: {}", e);
                        None
                    }
                })
                .collect();

            if templates.is_empty() {
                warn!(intent = %name, "Intent has no usable examples");
                continue;
            }
            intents.push(TrainedIntent { name, templates });
        }

        if intents.is_empty() {
            return Err(ResolverError::NoIntents);
        }

        info!(
            intents = intents.len(),
            templates = intents.iter().map(|i| i.templates.len()).sum::<usize>(),
            entities = self.entities.len(),
            "Intent classifier trained"
        );

        Ok(IntentClassifier {
            intents,
            entities: self.entities,
            fuzzy_threshold: self.fuzzy_threshold,
        })
    }
}

/// Trained classifier, immutable after training
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    intents: Vec<TrainedIntent>,
    entities: HashMap<String, Vec<String>>,
    fuzzy_threshold: f64,
}

impl IntentClassifier {
    pub fn builder() -> IntentClassifierBuilder {
        IntentClassifierBuilder::new()
    }

    /// Names of the trained intents
    pub fn intent_names(&self) -> Vec<&str> {
        self.intents.iter().map(|i| i.name.as_str()).collect()
    }

    /// Best classification of the query, `None` when no template matches
    pub fn classify(&self, query: &str) -> Option<Classification> {
        let query = normalize_text(query);
        let mut best: Option<(Classification, usize)> = None;

        for intent in &self.intents {
            for template in &intent.templates {
                let Some(captures) = template.regex.captures(&query) else {
                    continue;
                };

                let mut slots = BTreeMap::new();
                let mut confirmation = 0.0;
                for slot in &template.slots {
                    let raw = captures.name(slot).map(|m| m.as_str().trim()).unwrap_or("");
                    let (value, confirmed) = self.confirm(slot, raw);
                    confirmation += confirmed;
                    slots.insert(slot.clone(), value);
                }

                let evidence = template.slots.len() + template.wildcards;
                let confidence = if evidence == 0 {
                    1.0
                } else {
                    0.5 + 0.5 * confirmation / evidence as f64
                };

                let better = match &best {
                    None => true,
                    Some((current, literal_len)) => {
                        confidence > current.confidence
                            || (confidence == current.confidence
                                && template.literal_len > *literal_len)
                    }
                };
                if better {
                    best = Some((
                        Classification {
                            intent: intent.name.clone(),
                            confidence,
                            slots,
                        },
                        template.literal_len,
                    ));
                }
            }
        }

        let classification = best.map(|(classification, _)| classification);
        debug!(query = %query, result = ?classification, "Classified");
        classification
    }

    /// Canonical value and confirmation score of a slot value
    fn confirm(&self, entity: &str, value: &str) -> (String, f64) {
        let Some(vocabulary) = self.entities.get(entity) else {
            return (value.to_string(), 0.0);
        };

        let closest = vocabulary
            .iter()
            .map(|entry| (entry, strsim::jaro_winkler(value, entry)))
            .max_by(|a, b| a.1.total_cmp(&b.1));

        match closest {
            Some((entry, similarity)) if similarity >= self.fuzzy_threshold => {
                (entry.clone(), similarity)
            }
            _ => (value.to_string(), 0.0),
        }
    }
}
