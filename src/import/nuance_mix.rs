//! Nuance Mix TRSX importer.
//!
//! TRSX is a single XML document: an ontology of intents and concepts,
//! optional `<dictionaries>` with canonical-value/literal pairs, and
//! `<samples>` whose text interleaves plaintext with `<annotation>`
//! elements. The importer walks the verbose tree produced by
//! [`crate::xml::parse_verbose`] — concepts are discovered across the
//! whole document first, then samples rewrite as segment lists. An
//! annotation referencing an unknown concept aborts the run.

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use super::ImportError;
use super::annotate::{self, Segment};
use super::assemble;
use super::registry::{SlotRegistry, new_key};
use crate::models::{ImportMetadata, ImportResult, Intent, SlotType, TrainingPhrase};
use crate::xml;

/// Predefined `nuance_*` entities with a canonical equivalent. Predefined
/// entities never carry dictionary inputs.
fn predefined_slot_type(concept: &str) -> Option<SlotType> {
    match concept {
        "nuance_AMOUNT" => Some(SlotType::Currency),
        "nuance_CALENDARX" => Some(SlotType::DateTime),
        "nuance_CARDINAL_NUMBER" | "nuance_DOUBLE" | "nuance_NUMBER" => Some(SlotType::Number),
        "nuance_DURATION" => Some(SlotType::Age),
        "nuance_GENERIC_ORDER" | "nuance_ORDINAL_NUMBER" => Some(SlotType::Ordinal),
        "nuance_TEMPERATURE" => Some(SlotType::Temperature),
        _ => None,
    }
}

// verbose-tree accessors

/// First node under `key` (`key` holds an array of nodes).
fn node<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value.get(key)?.as_array()?.first()
}

fn nodes<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn attr<'a>(value: &'a Value, name: &str) -> Option<&'a str> {
    value.get(format!("@{name}"))?.as_str()
}

fn text_of(value: &Value) -> Option<&str> {
    value.get("#")?.as_str()
}

/// Annotations of one sample, whatever its content shape (pure text,
/// annotation-only, or mixed segments).
fn sample_annotations(sample: &Value) -> Vec<&Value> {
    if let Some(segments) = sample.get("#").and_then(Value::as_array) {
        segments
            .iter()
            .filter_map(|segment| node(segment, "annotation"))
            .collect()
    } else {
        nodes(sample, "annotation").iter().collect()
    }
}

fn sample_segments(sample: &Value) -> Vec<Segment<'_>> {
    if let Some(segments) = sample.get("#").and_then(Value::as_array) {
        segments
            .iter()
            .filter_map(|segment| {
                if let Some(text) = segment.get("#").and_then(Value::as_str) {
                    Some(Segment::Text(text.trim()))
                } else {
                    node(segment, "annotation")
                        .and_then(|annotation| attr(annotation, "conceptref"))
                        .map(Segment::Slot)
                }
            })
            .collect()
    } else if let Some(text) = sample.get("#").and_then(Value::as_str) {
        vec![Segment::Text(text.trim())]
    } else {
        nodes(sample, "annotation")
            .iter()
            .filter_map(|annotation| attr(annotation, "conceptref").map(Segment::Slot))
            .collect()
    }
}

/// Importer for Nuance Mix TRSX exports.
#[derive(Debug, Default)]
pub struct NuanceMixImporter;

impl NuanceMixImporter {
    pub fn new() -> Self {
        Self
    }

    pub fn import_trsx(&self, xml_content: &str) -> Result<ImportResult, ImportError> {
        let tree = xml::parse_verbose(xml_content)?;
        let Some(project) = node(&tree, "project") else {
            return Err(ImportError::UnrecognizedFormat(
                "TRSX payload has no <project> root".to_string(),
            ));
        };

        let ontology = node(project, "ontology");
        let concepts_parent = ontology.and_then(|o| node(o, "concepts"));
        let intents_parent = ontology.and_then(|o| node(o, "intents"));
        let samples: &[Value] = node(project, "samples")
            .map(|s| nodes(s, "sample"))
            .unwrap_or(&[]);

        // concept discovery: explicit ontology concepts, then concepts
        // linked from intents, then concepts referenced by annotations
        let mut concept_names: Vec<String> = Vec::new();
        if let Some(concepts) = concepts_parent {
            for concept in nodes(concepts, "concept") {
                if let Some(name) = attr(concept, "name") {
                    assemble::push_unique(&mut concept_names, name);
                }
            }
        }
        if let Some(intents) = intents_parent {
            for intent in nodes(intents, "intent") {
                if let Some(links) = node(intent, "links") {
                    for link in nodes(links, "link") {
                        if let Some(concept) = attr(link, "conceptref") {
                            assemble::push_unique(&mut concept_names, concept);
                        }
                    }
                }
            }
        }
        for sample in samples {
            for annotation in sample_annotations(sample) {
                if let Some(concept) = attr(annotation, "conceptref") {
                    assemble::push_unique(&mut concept_names, concept);
                }
            }
        }

        // inputs for custom concepts: dictionary entries first, then
        // canonical values observed in sample annotations
        let mut inputs_by_concept: HashMap<String, Vec<(String, Vec<String>)>> = HashMap::new();
        if let Some(dictionaries) = node(project, "dictionaries") {
            for dictionary in nodes(dictionaries, "dictionary") {
                let Some(concept) = attr(dictionary, "conceptref") else {
                    continue;
                };
                let groups = inputs_by_concept.entry(concept.to_string()).or_default();
                for entry in nodes(dictionary, "entry") {
                    let (Some(value), Some(literal)) =
                        (attr(entry, "value"), attr(entry, "literal"))
                    else {
                        continue;
                    };
                    let at = match groups.iter().position(|(canonical, _)| canonical == value) {
                        Some(at) => at,
                        None => {
                            groups.push((value.to_string(), Vec::new()));
                            groups.len() - 1
                        }
                    };
                    let aliases = &mut groups[at].1;
                    if literal != value && !aliases.iter().any(|alias| alias == literal) {
                        aliases.push(literal.to_string());
                    }
                }
            }
        }
        for sample in samples {
            for annotation in sample_annotations(sample) {
                let (Some(concept), Some(canonical)) =
                    (attr(annotation, "conceptref"), text_of(annotation))
                else {
                    continue;
                };
                let groups = inputs_by_concept.entry(concept.to_string()).or_default();
                if !groups.iter().any(|(value, _)| value == canonical) {
                    groups.push((canonical.to_string(), Vec::new()));
                }
            }
        }

        let mut registry = SlotRegistry::new();
        for concept in &concept_names {
            match predefined_slot_type(concept) {
                Some(slot_type) => {
                    registry.get_or_create(concept, |_| slot_type);
                }
                None => {
                    registry.get_or_create(concept, |_| SlotType::Custom);
                    if let Some(groups) = inputs_by_concept.get(concept) {
                        for (canonical, aliases) in groups {
                            let mut group = vec![canonical.clone()];
                            group.extend(aliases.iter().cloned());
                            registry.push_input(concept, group.join(","))?;
                        }
                    }
                }
            }
        }

        // samples grouped by intent reference
        let mut samples_by_intent: HashMap<&str, Vec<&Value>> = HashMap::new();
        for sample in samples {
            if let Some(intent) = attr(sample, "intentref") {
                samples_by_intent.entry(intent).or_default().push(sample);
            }
        }

        let mut intents = Vec::new();
        let mut seen_intents = HashSet::new();
        if let Some(intents_node) = intents_parent {
            for intent_node in nodes(intents_node, "intent") {
                let Some(name) = attr(intent_node, "name") else {
                    continue;
                };
                if !seen_intents.insert(name) {
                    continue;
                }

                let mut phrases = Vec::new();
                for sample in samples_by_intent.get(name).map(Vec::as_slice).unwrap_or(&[]) {
                    let segments = sample_segments(sample);
                    let annotated = annotate::rewrite_segments(&segments, " ", &registry)?;
                    phrases.push(TrainingPhrase {
                        text: annotated.text,
                        slots: annotated.slots,
                    });
                }

                let inputs = assemble::dedup_phrases(phrases);
                let slots = assemble::intent_slots_from_phrases(&inputs);
                intents.push(Intent {
                    key: new_key(),
                    name: name.to_string(),
                    inputs,
                    slots,
                });
            }
        }

        Ok(ImportResult {
            intents,
            slots: registry.into_slots(),
            metadata: ImportMetadata::default(),
        })
    }
}
