//! Final-assembly helpers shared by the importers.

use std::collections::{HashMap, HashSet};

use super::registry::new_key;
use crate::models::{Intent, IntentSlot, TrainingPhrase};

/// Platform default intent names. When an imported intent matches one of
/// these, the name itself doubles as its stable key so downstream tooling
/// recognizes it; anything else gets a fresh opaque key.
const DEFAULT_INTENT_NAMES: &[&str] = &["None", "Yes", "No", "Stop", "Cancel", "Help"];

pub fn intent_key_for(name: &str) -> String {
    if DEFAULT_INTENT_NAMES.contains(&name) {
        name.to_string()
    } else {
        new_key()
    }
}

/// Deduplicate phrases by rewritten text; first occurrence wins, order is
/// preserved.
pub fn dedup_phrases(phrases: Vec<TrainingPhrase>) -> Vec<TrainingPhrase> {
    let mut seen = HashSet::new();
    phrases
        .into_iter()
        .filter(|phrase| seen.insert(phrase.text.clone()))
        .collect()
}

/// Build an intent's slot-usage list from the unique slot keys across its
/// phrases, in first-occurrence order.
pub fn intent_slots_from_phrases(phrases: &[TrainingPhrase]) -> Vec<IntentSlot> {
    let mut keys: Vec<String> = Vec::new();
    for phrase in phrases {
        for key in &phrase.slots {
            push_unique(&mut keys, key);
        }
    }
    keys.into_iter().map(IntentSlot::new).collect()
}

pub(crate) fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}

/// Name-keyed, insertion-ordered intent accumulation. Backs the importers
/// whose payloads repeat an intent name across records (one row or file
/// per utterance).
#[derive(Debug, Default)]
pub struct IntentAccumulator {
    intents: Vec<Intent>,
    index: HashMap<String, usize>,
}

impl IntentAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The intent registered under `name`, created empty on first sight.
    pub fn get_or_create(&mut self, name: &str) -> &mut Intent {
        if !self.index.contains_key(name) {
            self.index.insert(name.to_string(), self.intents.len());
            self.intents.push(Intent {
                key: intent_key_for(name),
                name: name.to_string(),
                inputs: Vec::new(),
                slots: Vec::new(),
            });
        }
        let i = self.index[name];
        &mut self.intents[i]
    }

    /// Flatten in first-discovery order.
    pub fn into_intents(self) -> Vec<Intent> {
        self.intents
    }
}
