//! IBM Watson Assistant workspace (JSON) importer.
//!
//! A workspace is a single JSON document carrying `intents` and
//! `entities` arrays. Intent examples annotate slot mentions out of band,
//! as `mentions` with `[start, end)` character offsets into the example
//! text — offsets are authoritative, so a mention referencing an unknown
//! entity aborts the run rather than being skipped.

use serde::Deserialize;
use tracing::warn;

use super::ImportError;
use super::annotate::{self, SpanRef};
use super::assemble;
use super::registry::SlotRegistry;
use crate::models::{ImportMetadata, ImportResult, Intent, Language, SlotType, TrainingPhrase};

#[derive(Debug, Deserialize)]
struct Workspace {
    intents: Vec<WorkspaceIntent>,
    entities: Vec<WorkspaceEntity>,
    #[serde(default)]
    language: String,
}

#[derive(Debug, Deserialize)]
struct WorkspaceIntent {
    intent: String,
    examples: Vec<IntentExample>,
}

#[derive(Debug, Deserialize)]
struct IntentExample {
    text: String,
    #[serde(default)]
    mentions: Vec<Mention>,
}

#[derive(Debug, Deserialize)]
struct Mention {
    entity: String,
    location: Vec<usize>,
}

#[derive(Debug, Deserialize)]
struct WorkspaceEntity {
    entity: String,
    values: Vec<EntityValue>,
}

#[derive(Debug, Deserialize)]
struct EntityValue {
    value: String,
    #[serde(rename = "type")]
    value_type: ValueType,
    #[serde(default)]
    synonyms: Vec<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ValueType {
    Synonyms,
    Patterns,
}

/// Importer for Watson Assistant workspace exports.
#[derive(Debug, Default)]
pub struct WatsonImporter;

impl WatsonImporter {
    pub fn new() -> Self {
        Self
    }

    pub fn import_json(&self, payload: &str) -> Result<ImportResult, ImportError> {
        let workspace: Workspace = serde_json::from_str(payload).map_err(|err| {
            ImportError::UnrecognizedFormat(format!(
                "expected a Watson Assistant workspace: {err}"
            ))
        })?;

        let mut registry = SlotRegistry::new();
        for entity in &workspace.entities {
            registry.get_or_create(&entity.entity, |_| SlotType::Custom);
            for value in &entity.values {
                let mut group = vec![value.value.as_str()];
                if matches!(value.value_type, ValueType::Synonyms) {
                    group.extend(value.synonyms.iter().map(String::as_str));
                }
                registry.add_input_group(&entity.entity, &group)?;
            }
        }

        let mut intents = Vec::with_capacity(workspace.intents.len());
        for intent in &workspace.intents {
            let mut phrases = Vec::new();
            for example in &intent.examples {
                match annotate_example(example, &registry) {
                    Ok(phrase) => phrases.push(phrase),
                    Err(ImportError::MalformedRecord(message)) => {
                        warn!("Skipping malformed Watson example: {}", message);
                    }
                    Err(err) => return Err(err),
                }
            }
            let inputs = assemble::dedup_phrases(phrases);
            let slots = assemble::intent_slots_from_phrases(&inputs);
            intents.push(Intent {
                key: assemble::intent_key_for(&intent.intent),
                name: intent.intent.clone(),
                inputs,
                slots,
            });
        }

        Ok(ImportResult {
            intents,
            slots: registry.into_slots(),
            metadata: ImportMetadata {
                language: Language::from_locale(&workspace.language),
            },
        })
    }
}

fn annotate_example(
    example: &IntentExample,
    registry: &SlotRegistry,
) -> Result<TrainingPhrase, ImportError> {
    let spans = example
        .mentions
        .iter()
        .map(|mention| {
            if mention.location.len() < 2 {
                return Err(ImportError::MalformedRecord(format!(
                    "mention of {} has no [start, end] location",
                    mention.entity
                )));
            }
            Ok(SpanRef {
                start: mention.location[0],
                end: mention.location[1],
                slot: &mention.entity,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let annotated = annotate::rewrite_spans(&example.text, &spans, registry)?;
    Ok(TrainingPhrase {
        text: annotated.text,
        slots: annotated.slots,
    })
}
