//! Canonical flat CSV importer.
//!
//! The platform's own interchange format: headerless two-column rows of
//! `intent,utterance`, with slot mentions inline as `{name}` markers.
//! This is the same flat shape [`crate::export::CsvExporter`] writes.

use tracing::warn;

use super::ImportError;
use super::annotate;
use super::assemble::{self, IntentAccumulator};
use super::registry::SlotRegistry;
use crate::models::{ImportMetadata, ImportResult, IntentSlot, TrainingPhrase};

/// Importer for the canonical flat CSV format.
#[derive(Debug, Default)]
pub struct CanonicalCsvImporter;

impl CanonicalCsvImporter {
    pub fn new() -> Self {
        Self
    }

    pub fn import_csv(&self, csv_content: &str) -> Result<ImportResult, ImportError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(csv_content.as_bytes());

        let mut registry = SlotRegistry::new();
        let mut intents = IntentAccumulator::new();

        for (index, record) in reader.records().enumerate() {
            let record = match record {
                Ok(record) => record,
                Err(err) => {
                    warn!("Skipping malformed CSV row {}: {}", index + 1, err);
                    continue;
                }
            };
            let (Some(intent_name), Some(utterance)) = (record.get(0), record.get(1)) else {
                continue;
            };
            if intent_name.is_empty() || utterance.is_empty() {
                continue;
            }

            let annotated = annotate::rewrite_simple_markers(utterance, &mut registry);
            let intent = intents.get_or_create(intent_name);
            for key in &annotated.slots {
                if !intent.slots.iter().any(|slot| slot.id == *key) {
                    intent.slots.push(IntentSlot::new(key.clone()));
                }
            }
            intent.inputs.push(TrainingPhrase {
                text: annotated.text,
                slots: annotated.slots,
            });
        }

        let intents = intents
            .into_intents()
            .into_iter()
            .map(|mut intent| {
                intent.inputs = assemble::dedup_phrases(std::mem::take(&mut intent.inputs));
                intent
            })
            .collect();

        Ok(ImportResult {
            intents,
            slots: registry.into_slots(),
            metadata: ImportMetadata::default(),
        })
    }
}
