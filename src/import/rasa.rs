//! Rasa 2 NLU training data importer.
//!
//! Rasa training data is YAML with an `nlu` list of intent, synonym, and
//! lookup items. Utterances annotate entities inline in two marker forms
//! (`[literal](entity)` and `[literal]{json}`); synonym and lookup items
//! supply extra slot values out of band. A project export is a zip of such
//! documents; a single document imports directly.

use std::collections::HashMap;

use serde_json::Value;
use tracing::warn;

use super::ImportError;
use super::annotate;
use super::assemble;
use super::registry::SlotRegistry;
use crate::archive::ZipReader;
use crate::models::{ImportMetadata, ImportResult, Intent, IntentSlot, SlotType, TrainingPhrase};

/// Normalize an `examples` field: either one dash-list string block or an
/// array of strings / `{text}` objects.
fn examples_of(item: &Value) -> Vec<String> {
    match item.get("examples") {
        Some(Value::String(block)) => block
            .split("- ")
            .map(str::trim)
            .filter(|example| !example.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::Array(entries)) => entries
            .iter()
            .filter_map(|entry| {
                if let Some(text) = entry.get("text").and_then(Value::as_str) {
                    Some(text.trim().to_string())
                } else {
                    entry.as_str().map(|text| text.trim().to_string())
                }
            })
            .collect(),
        _ => Vec::new(),
    }
}

#[derive(Default)]
struct RasaBuilder {
    registry: SlotRegistry,
    /// intent discovery order
    intent_names: Vec<String>,
    intent_keys: HashMap<String, String>,
    intent_inputs: HashMap<String, Vec<TrainingPhrase>>,
    intent_slot_keys: HashMap<String, Vec<String>>,
    /// slot name -> mention literals and lookup values, unique
    slot_inputs: HashMap<String, Vec<String>>,
    /// literal or synonym-block canonical -> synonyms, unique
    synonyms: HashMap<String, Vec<String>>,
}

impl RasaBuilder {
    fn extract(&mut self, document: &Value) -> Result<(), ImportError> {
        let Some(items) = document.get("nlu").and_then(Value::as_array) else {
            return Err(ImportError::UnrecognizedFormat(
                "Rasa document has no nlu list".to_string(),
            ));
        };
        for item in items {
            if let Some(intent) = item.get("intent").and_then(Value::as_str) {
                self.add_intent(intent, examples_of(item));
            }
        }
        for item in items {
            if let Some(canonical) = item.get("synonym").and_then(Value::as_str) {
                for example in examples_of(item) {
                    assemble::push_unique(
                        self.synonyms.entry(canonical.to_string()).or_default(),
                        &example,
                    );
                }
            }
        }
        for item in items {
            if let Some(lookup) = item.get("lookup").and_then(Value::as_str) {
                self.add_lookup(lookup, examples_of(item));
            }
        }
        Ok(())
    }

    fn add_intent(&mut self, intent: &str, examples: Vec<String>) {
        if !self.intent_keys.contains_key(intent) {
            self.intent_keys
                .insert(intent.to_string(), assemble::intent_key_for(intent));
            self.intent_names.push(intent.to_string());
        }

        for example in examples {
            let annotated =
                annotate::rewrite_entity_markers(&example, &mut self.registry, |mention| {
                    assemble::push_unique(
                        self.slot_inputs
                            .entry(mention.entity.to_string())
                            .or_default(),
                        mention.literal,
                    );
                    if let Some(value) = mention.value {
                        assemble::push_unique(
                            self.synonyms.entry(mention.literal.to_string()).or_default(),
                            value,
                        );
                    }
                });

            let slot_keys = self.intent_slot_keys.entry(intent.to_string()).or_default();
            for key in &annotated.slots {
                assemble::push_unique(slot_keys, key);
            }

            let inputs = self.intent_inputs.entry(intent.to_string()).or_default();
            if !inputs.iter().any(|phrase| phrase.text == annotated.text) {
                inputs.push(TrainingPhrase {
                    text: annotated.text,
                    slots: annotated.slots,
                });
            }
        }
    }

    fn add_lookup(&mut self, lookup: &str, examples: Vec<String>) {
        for example in examples {
            self.registry.get_or_create(lookup, |_| SlotType::Custom);
            assemble::push_unique(
                self.slot_inputs.entry(lookup.to_string()).or_default(),
                &example,
            );
        }
    }

    fn finish(mut self) -> Result<ImportResult, ImportError> {
        let mut intents = Vec::with_capacity(self.intent_names.len());
        for name in &self.intent_names {
            let Some(key) = self.intent_keys.get(name) else {
                continue;
            };
            intents.push(Intent {
                key: key.clone(),
                name: name.clone(),
                inputs: self.intent_inputs.remove(name).unwrap_or_default(),
                slots: self
                    .intent_slot_keys
                    .remove(name)
                    .unwrap_or_default()
                    .into_iter()
                    .map(IntentSlot::new)
                    .collect(),
            });
        }

        // slot inputs flatten as single-value entries, each followed by
        // its recorded synonyms
        let names: Vec<String> = self.registry.names().map(str::to_string).collect();
        for name in &names {
            let Some(literals) = self.slot_inputs.get(name) else {
                continue;
            };
            for literal in literals {
                self.registry.push_input(name, literal.clone())?;
                if let Some(synonyms) = self.synonyms.get(literal) {
                    for synonym in synonyms {
                        self.registry.push_input(name, synonym.clone())?;
                    }
                }
            }
        }

        Ok(ImportResult {
            intents,
            slots: self.registry.into_slots(),
            metadata: ImportMetadata::default(),
        })
    }
}

/// Importer for Rasa 2 training data.
#[derive(Debug, Default)]
pub struct RasaImporter;

impl RasaImporter {
    pub fn new() -> Self {
        Self
    }

    /// Import a project export: a zip containing YAML documents. Files
    /// that are not Rasa NLU documents are skipped.
    pub fn import_zip(&self, bytes: Vec<u8>) -> Result<ImportResult, ImportError> {
        let mut reader = ZipReader::new(bytes)?;
        let mut builder = RasaBuilder::default();
        for (name, text) in reader.texts(&["*.yml", "*.yaml", "**/*.yml", "**/*.yaml"]) {
            let document = match serde_yaml::from_str::<Value>(&text) {
                Ok(document) => document,
                Err(err) => {
                    warn!("Skipping unparseable YAML file {}: {}", name, err);
                    continue;
                }
            };
            if let Err(err) = builder.extract(&document) {
                warn!("Skipping non-NLU YAML file {}: {}", name, err);
            }
        }
        builder.finish()
    }

    /// Import a single YAML document.
    pub fn import_yaml(&self, contents: &str) -> Result<ImportResult, ImportError> {
        let document: Value = serde_yaml::from_str(contents)?;
        let mut builder = RasaBuilder::default();
        builder.extract(&document)?;
        builder.finish()
    }
}
