//! Salesforce Einstein intent dataset (CSV) importer.
//!
//! One row per (intent, utterance) pair, headered. The format carries no
//! slot annotations, so utterances import verbatim and the result has no
//! slots.

use serde::Deserialize;
use tracing::warn;

use super::ImportError;
use super::assemble::{self, IntentAccumulator};
use crate::models::{ImportMetadata, ImportResult, Language, TrainingPhrase};

#[derive(Debug, Deserialize)]
struct EinsteinRow {
    #[serde(rename = "MlIntentName")]
    intent_name: String,
    #[serde(rename = "Utterance")]
    utterance: String,
    #[serde(rename = "Language", default)]
    language: String,
}

/// Importer for Einstein intent dataset CSV exports.
#[derive(Debug, Default)]
pub struct EinsteinImporter;

impl EinsteinImporter {
    pub fn new() -> Self {
        Self
    }

    pub fn import_csv(&self, csv_content: &str) -> Result<ImportResult, ImportError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(csv_content.as_bytes());

        let headers = reader.headers()?.clone();
        for required in ["MlIntentName", "Utterance"] {
            if !headers.iter().any(|header| header == required) {
                return Err(ImportError::UnrecognizedFormat(format!(
                    "Einstein CSV is missing the {required} column"
                )));
            }
        }

        let mut intents = IntentAccumulator::new();
        let mut language = None;
        for (index, row) in reader.deserialize::<EinsteinRow>().enumerate() {
            let row = match row {
                Ok(row) => row,
                Err(err) => {
                    // +2: 1-based, after the header row
                    warn!("Skipping malformed Einstein row {}: {}", index + 2, err);
                    continue;
                }
            };
            if row.intent_name.is_empty() || row.utterance.is_empty() {
                continue;
            }
            Language::merge_first(&mut language, &row.language);
            intents
                .get_or_create(&row.intent_name)
                .inputs
                .push(TrainingPhrase::plain(row.utterance));
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
            slots: Vec::new(),
            metadata: ImportMetadata { language },
        })
    }
}
