//! Amazon Lex v1 bot export (zip) importer.
//!
//! A Lex export is a zip of JSON documents, each `{ metadata, resource }`.
//! Bot files embed intents, slot types, and a locale; standalone intent
//! files carry one intent plus the slot types it references. Utterances
//! mention slots inline as `{slotName}` markers, but slot definitions may
//! arrive in any file in any order — so raw text is accumulated first and
//! annotated only once every file has been read.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::ImportError;
use super::annotate;
use super::assemble;
use super::registry::{SlotRegistry, new_key};
use crate::archive::ZipReader;
use crate::models::{
    ImportMetadata, ImportResult, Intent, IntentSlot, Language, SlotDialog, SlotType,
    TrainingPhrase,
};

/// Amazon built-in slot types with a canonical equivalent; custom types
/// and unmapped built-ins import as `Custom`.
fn amazon_slot_type(slot_type: &str) -> SlotType {
    match slot_type {
        "AMAZON.DATE" | "AMAZON.TIME" => SlotType::DateTime,
        "AMAZON.NUMBER" | "AMAZON.FOUR_DIGIT_NUMBER" => SlotType::Number,
        "AMAZON.EmailAddress" => SlotType::Email,
        "AMAZON.PhoneNumber" => SlotType::PhoneNumber,
        "AMAZON.Ordinal" => SlotType::Ordinal,
        "AMAZON.Percentage" => SlotType::Percentage,
        "AMAZON.City" | "AMAZON.US_CITY" | "AMAZON.US_STATE" | "AMAZON.Country" => {
            SlotType::Geography
        }
        "AMAZON.Person" | "AMAZON.FirstName" => SlotType::Name,
        "AMAZON.SearchQuery" => SlotType::KeyPhrase,
        _ => SlotType::Custom,
    }
}

#[derive(Debug, Deserialize)]
struct LexFile {
    #[allow(dead_code)]
    metadata: LexMetadata,
    resource: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LexMetadata {
    #[serde(default)]
    #[allow(dead_code)]
    schema_version: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BotResource {
    #[serde(default)]
    intents: Vec<IntentResource>,
    #[serde(default)]
    slot_types: Vec<SlotTypeResource>,
    #[serde(default)]
    locale: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntentResource {
    name: String,
    #[serde(default)]
    sample_utterances: Vec<String>,
    #[serde(default)]
    slots: Vec<IntentSlotResource>,
    #[serde(default)]
    slot_types: Vec<SlotTypeResource>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntentSlotResource {
    name: String,
    slot_type: String,
    #[serde(default)]
    sample_utterances: Vec<String>,
    #[serde(default)]
    value_elicitation_prompt: Option<PromptResource>,
    #[serde(default)]
    slot_constraint: String,
}

#[derive(Debug, Deserialize)]
struct PromptResource {
    #[serde(default)]
    messages: Vec<MessageResource>,
}

#[derive(Debug, Deserialize)]
struct MessageResource {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SlotTypeResource {
    name: String,
    #[serde(default)]
    enumeration_values: Vec<EnumerationValue>,
}

#[derive(Debug, Deserialize)]
struct EnumerationValue {
    value: String,
    #[serde(default)]
    synonyms: Vec<String>,
}

/// An intent as gathered from the files, before annotation.
struct PendingIntent {
    name: String,
    utterances: Vec<String>,
    slots: Vec<PendingSlot>,
}

struct PendingSlot {
    name: String,
    prompts: Vec<String>,
    utterances: Vec<String>,
    required: bool,
}

#[derive(Default)]
struct LexBuilder {
    registry: SlotRegistry,
    /// slot name -> vendor slot type, first sighting wins
    slot_types: HashMap<String, String>,
    /// vendor slot type name -> enumeration groups, first sighting wins
    type_inputs: HashMap<String, Vec<String>>,
    intents: Vec<PendingIntent>,
    intent_index: HashMap<String, usize>,
    language: Option<Language>,
}

impl LexBuilder {
    fn add_file(&mut self, file: LexFile) {
        if file.resource.get("intents").is_some() {
            match serde_json::from_value::<BotResource>(file.resource) {
                Ok(bot) => self.add_bot(bot),
                Err(err) => warn!("Skipping malformed Lex bot resource: {}", err),
            }
        } else if file.resource.get("sampleUtterances").is_some() {
            match serde_json::from_value::<IntentResource>(file.resource) {
                Ok(intent) => self.add_intent(intent),
                Err(err) => warn!("Skipping malformed Lex intent resource: {}", err),
            }
        }
        // slot-type-only files ride along inside bot/intent resources;
        // anything else in the archive is not ours to import
    }

    fn add_bot(&mut self, bot: BotResource) {
        Language::merge_first(&mut self.language, &bot.locale);
        for slot_type in bot.slot_types {
            self.add_slot_type(slot_type);
        }
        for intent in bot.intents {
            self.add_intent(intent);
        }
    }

    fn add_slot_type(&mut self, slot_type: SlotTypeResource) {
        let groups: Vec<String> = slot_type
            .enumeration_values
            .iter()
            .map(|value| {
                let mut group = vec![value.value.clone()];
                group.extend(value.synonyms.iter().cloned());
                group.join(",")
            })
            .collect();
        self.type_inputs.entry(slot_type.name).or_insert(groups);
    }

    fn add_intent(&mut self, resource: IntentResource) {
        for slot_type in resource.slot_types {
            self.add_slot_type(slot_type);
        }

        let mut slots = Vec::with_capacity(resource.slots.len());
        for slot in resource.slots {
            let vendor_type = self
                .slot_types
                .entry(slot.name.clone())
                .or_insert(slot.slot_type)
                .clone();
            self.registry
                .get_or_create(&slot.name, |_| amazon_slot_type(&vendor_type));
            slots.push(PendingSlot {
                name: slot.name,
                prompts: slot
                    .value_elicitation_prompt
                    .into_iter()
                    .flat_map(|prompt| prompt.messages.into_iter().map(|message| message.content))
                    .collect(),
                utterances: slot.sample_utterances,
                required: slot.slot_constraint == "Required",
            });
        }

        let pending = PendingIntent {
            name: resource.name,
            utterances: resource.sample_utterances,
            slots,
        };
        // duplicate intent names replace in place, keeping discovery order
        match self.intent_index.get(&pending.name) {
            Some(&i) => self.intents[i] = pending,
            None => {
                self.intent_index
                    .insert(pending.name.clone(), self.intents.len());
                self.intents.push(pending);
            }
        }
    }

    /// Annotate everything gathered, now that every slot definition has
    /// been seen, and flatten.
    fn finish(mut self) -> Result<ImportResult, ImportError> {
        let pendings = std::mem::take(&mut self.intents);
        let mut intents = Vec::with_capacity(pendings.len());
        for pending in pendings {
            let phrases: Vec<TrainingPhrase> = pending
                .utterances
                .iter()
                .map(|utterance| self.annotate(utterance))
                .collect();
            let inputs = assemble::dedup_phrases(phrases);

            let slots = pending
                .slots
                .into_iter()
                .map(|slot| {
                    let key = self
                        .registry
                        .get_or_create(&slot.name, |_| SlotType::Custom)
                        .key
                        .clone();
                    IntentSlot {
                        id: key,
                        dialog: SlotDialog {
                            prompt: slot.prompts.iter().map(|p| self.annotate(p)).collect(),
                            confirm: Vec::new(),
                            utterances: slot
                                .utterances
                                .iter()
                                .map(|u| self.annotate(u))
                                .collect(),
                            confirm_enabled: false,
                        },
                        required: slot.required,
                    }
                })
                .collect();

            intents.push(Intent {
                key: new_key(),
                name: pending.name,
                inputs,
                slots,
            });
        }

        // backfill slot inputs from the enumeration groups recorded under
        // each slot's vendor type name
        let names: Vec<String> = self.registry.names().map(str::to_string).collect();
        for name in &names {
            let Some(vendor_type) = self.slot_types.get(name) else {
                continue;
            };
            if let Some(groups) = self.type_inputs.get(vendor_type) {
                for group in groups {
                    self.registry.push_input(name, group.clone())?;
                }
            }
        }

        Ok(ImportResult {
            intents,
            slots: self.registry.into_slots(),
            metadata: ImportMetadata {
                language: self.language,
            },
        })
    }

    fn annotate(&mut self, text: &str) -> TrainingPhrase {
        let annotated = annotate::rewrite_simple_markers(text, &mut self.registry);
        TrainingPhrase {
            text: annotated.text,
            slots: annotated.slots,
        }
    }
}

/// Importer for Lex v1 bot exports.
#[derive(Debug, Default)]
pub struct LexImporter;

impl LexImporter {
    pub fn new() -> Self {
        Self
    }

    pub fn import_zip(&self, bytes: Vec<u8>) -> Result<ImportResult, ImportError> {
        let mut reader = ZipReader::new(bytes)?;
        let mut builder = LexBuilder::default();
        for (name, text) in reader.texts(&["**"]) {
            match serde_json::from_str::<LexFile>(&text) {
                Ok(file) => builder.add_file(file),
                Err(err) => warn!("Skipping non-Lex archive entry {}: {}", name, err),
            }
        }
        builder.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amazon_slot_type_table() {
        assert_eq!(amazon_slot_type("AMAZON.DATE"), SlotType::DateTime);
        assert_eq!(amazon_slot_type("AMAZON.NUMBER"), SlotType::Number);
        assert_eq!(amazon_slot_type("FlowerTypes"), SlotType::Custom);
    }

    #[test]
    fn test_annotation_is_file_order_independent() {
        let intent_json = serde_json::json!({
            "metadata": { "schemaVersion": "1.0" },
            "resource": {
                "name": "OrderFlowers",
                "sampleUtterances": ["I want to order {FlowerType}"],
                "slots": [{
                    "name": "FlowerType",
                    "slotType": "FlowerTypes",
                    "slotConstraint": "Required",
                    "valueElicitationPrompt": { "messages": [{ "contentType": "PlainText", "content": "What type of flowers?" }], "maxAttempts": 2 }
                }],
                "slotTypes": []
            }
        });
        let slot_type_file = serde_json::json!({
            "metadata": { "schemaVersion": "1.0" },
            "resource": {
                "name": "OrderFlowers",
                "sampleUtterances": ["buy {FlowerType}"],
                "slots": [{ "name": "FlowerType", "slotType": "FlowerTypes", "slotConstraint": "Optional" }],
                "slotTypes": [{
                    "name": "FlowerTypes",
                    "enumerationValues": [{ "value": "tulips", "synonyms": ["tulip"] }]
                }]
            }
        });

        // slot enumeration arrives after the first intent definition
        let mut builder = LexBuilder::default();
        builder.add_file(serde_json::from_value(intent_json).unwrap());
        builder.add_file(serde_json::from_value(slot_type_file).unwrap());
        let result = builder.finish().unwrap();

        assert_eq!(result.slots.len(), 1);
        let slot = &result.slots[0];
        assert_eq!(slot.name, "FlowerType");
        assert_eq!(slot.inputs, vec!["tulips,tulip"]);

        // the duplicate intent name replaced the first definition
        assert_eq!(result.intents.len(), 1);
        let intent = &result.intents[0];
        assert_eq!(
            intent.inputs[0].text,
            format!("buy {{{{[FlowerType].{}}}}}", slot.key)
        );
        assert_eq!(intent.inputs[0].slots, vec![slot.key.clone()]);
        assert!(!intent.slots[0].required);
    }

    #[test]
    fn test_required_slot_and_prompts() {
        let bot = serde_json::json!({
            "metadata": { "schemaVersion": "1.0" },
            "resource": {
                "name": "Bot",
                "locale": "en-US",
                "intents": [{
                    "name": "BookHotel",
                    "sampleUtterances": ["book a room in {City}"],
                    "slots": [{
                        "name": "City",
                        "slotType": "AMAZON.US_CITY",
                        "slotConstraint": "Required",
                        "valueElicitationPrompt": { "messages": [{ "contentType": "PlainText", "content": "Which city?" }], "maxAttempts": 2 }
                    }],
                    "slotTypes": []
                }],
                "slotTypes": []
            }
        });
        let mut builder = LexBuilder::default();
        builder.add_file(serde_json::from_value(bot).unwrap());
        let result = builder.finish().unwrap();

        assert_eq!(result.metadata.language.as_ref().unwrap().as_str(), "en");
        let slot = &result.slots[0];
        assert_eq!(slot.slot_type, SlotType::Geography);
        let intent_slot = &result.intents[0].slots[0];
        assert!(intent_slot.required);
        assert_eq!(intent_slot.dialog.prompt[0].text, "Which city?");
    }
}
