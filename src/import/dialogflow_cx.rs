//! Dialogflow CX agent export (zip) importer.
//!
//! An agent export keeps entity types, intents, and training phrases in
//! separate JSON files:
//!
//! ```text
//! entityTypes/<entity>/<entity>.json
//! entityTypes/<entity>/entities/<lang>.json
//! intents/<intent>/<intent>.json
//! intents/<intent>/trainingPhrases/<lang>.json
//! ```
//!
//! Training phrases arrive pre-split into text/parameter parts, so no
//! marker scanning happens here — parameter IDs resolve through the
//! intent's parameter table and rewrite as segments.

use std::collections::HashMap;

use glob::Pattern;
use serde::Deserialize;
use tracing::warn;

use super::ImportError;
use super::annotate::{self, Segment};
use super::assemble;
use super::registry::{SlotRegistry, new_key};
use crate::archive::ZipReader;
use crate::models::{ImportMetadata, ImportResult, Intent, SlotType, TrainingPhrase};

/// `@sys.*` entity types with a canonical equivalent; the rest import as
/// `Custom`.
fn builtin_slot_type(entity_type: &str) -> SlotType {
    match entity_type {
        "@sys.geo-city" => SlotType::Geography,
        "@sys.date-time" => SlotType::DateTime,
        "@sys.number-sequence" => SlotType::KeyPhrase,
        _ => SlotType::Custom,
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntityTypeFile {
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct EntitiesFile {
    entities: Vec<Entity>,
}

#[derive(Debug, Deserialize)]
struct Entity {
    value: String,
    #[serde(default)]
    synonyms: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntentFile {
    display_name: String,
    #[serde(default)]
    parameters: Vec<Parameter>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Parameter {
    id: String,
    entity_type: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrainingPhrasesFile {
    training_phrases: Vec<PhraseRecord>,
}

#[derive(Debug, Deserialize)]
struct PhraseRecord {
    parts: Vec<PhrasePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PhrasePart {
    #[serde(default)]
    text: String,
    #[serde(default)]
    parameter_id: Option<String>,
}

/// Importer for Dialogflow CX agent exports.
#[derive(Debug, Default)]
pub struct DialogflowCxImporter;

impl DialogflowCxImporter {
    pub fn new() -> Self {
        Self
    }

    pub fn import_zip(&self, bytes: Vec<u8>) -> Result<ImportResult, ImportError> {
        let mut reader = ZipReader::new(bytes)?;
        let mut registry = SlotRegistry::new();
        let mut intents = Vec::new();

        // entity pass
        for (file_name, text) in reader.texts(&["entityTypes/*/*.json"]) {
            let entity_type = match serde_json::from_str::<EntityTypeFile>(&text) {
                Ok(entity_type) => entity_type,
                Err(err) => {
                    warn!("Skipping malformed entity type file {}: {}", file_name, err);
                    continue;
                }
            };
            let name = entity_type.display_name;
            registry.get_or_create(&name, |_| SlotType::Custom);

            let entities_glob = format!("{}/entities/*.json", Pattern::escape(parent_dir(&file_name)));
            for (entities_name, entities_text) in reader.texts(&[&entities_glob]) {
                match serde_json::from_str::<EntitiesFile>(&entities_text) {
                    Ok(file) => {
                        for entity in file.entities {
                            let mut group = vec![entity.value];
                            group.extend(entity.synonyms);
                            registry.add_input_group(&name, &group)?;
                        }
                    }
                    Err(err) => {
                        warn!("Skipping malformed entities file {}: {}", entities_name, err);
                    }
                }
            }
        }

        // intent pass
        for (file_name, text) in reader.texts(&["intents/*/*.json"]) {
            let intent_file = match serde_json::from_str::<IntentFile>(&text) {
                Ok(intent_file) => intent_file,
                Err(err) => {
                    warn!("Skipping malformed intent file {}: {}", file_name, err);
                    continue;
                }
            };

            // parameter id -> registered entity name
            let mut parameter_entities: HashMap<&str, String> = HashMap::new();
            for parameter in &intent_file.parameters {
                if parameter.entity_type.starts_with("@sys.") {
                    registry.get_or_create(&parameter.entity_type, builtin_slot_type);
                    parameter_entities.insert(&parameter.id, parameter.entity_type.clone());
                } else {
                    let custom = parameter.entity_type.replacen('@', "", 1);
                    if registry.contains(&custom) {
                        parameter_entities.insert(&parameter.id, custom);
                    }
                }
            }

            let mut phrases = Vec::new();
            let phrases_glob = format!(
                "{}/trainingPhrases/*.json",
                Pattern::escape(parent_dir(&file_name))
            );
            for (phrases_name, phrases_text) in reader.texts(&[&phrases_glob]) {
                let file = match serde_json::from_str::<TrainingPhrasesFile>(&phrases_text) {
                    Ok(file) => file,
                    Err(err) => {
                        warn!(
                            "Skipping malformed training phrases file {}: {}",
                            phrases_name, err
                        );
                        continue;
                    }
                };
                for record in &file.training_phrases {
                    let segments: Vec<Segment<'_>> = record
                        .parts
                        .iter()
                        .map(|part| {
                            match part
                                .parameter_id
                                .as_deref()
                                .and_then(|id| parameter_entities.get(id))
                            {
                                Some(entity_name) => Segment::Slot(entity_name.as_str()),
                                // unresolved parameters pass through as text
                                None => Segment::Text(&part.text),
                            }
                        })
                        .collect();
                    let annotated = annotate::rewrite_segments(&segments, "", &registry)?;
                    phrases.push(TrainingPhrase {
                        text: annotated.text,
                        slots: annotated.slots,
                    });
                }
            }

            let inputs = assemble::dedup_phrases(phrases);
            let slots = assemble::intent_slots_from_phrases(&inputs);
            intents.push(Intent {
                key: new_key(),
                name: intent_file.display_name,
                inputs,
                slots,
            });
        }

        Ok(ImportResult {
            intents,
            slots: registry.into_slots(),
            metadata: ImportMetadata::default(),
        })
    }
}

fn parent_dir(path: &str) -> &str {
    path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}
