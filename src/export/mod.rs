//! Export functionality
//!
//! The canonical output surface is deliberately flat: one CSV row per
//! (intent, training phrase) pair. Rewritten placeholder text is emitted
//! as-is.

use thiserror::Error;

use crate::models::ImportResult;

/// Error during export
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of an export operation.
#[derive(Debug, Clone)]
pub struct ExportResult {
    pub content: String,
}

/// Exporter for the flat canonical CSV interchange format.
#[derive(Debug, Default)]
pub struct CsvExporter;

impl CsvExporter {
    pub fn new() -> Self {
        Self
    }

    /// Flatten an import result to `intent-name,utterance-text` rows.
    pub fn export(&self, result: &ImportResult) -> Result<ExportResult, ExportError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for intent in &result.intents {
            for phrase in &intent.inputs {
                writer.write_record([intent.name.as_str(), phrase.text.as_str()])?;
            }
        }
        let bytes = writer
            .into_inner()
            .map_err(|err| ExportError::Io(std::io::Error::other(err.to_string())))?;
        let content = String::from_utf8(bytes)
            .map_err(|err| ExportError::Io(std::io::Error::other(err.to_string())))?;
        Ok(ExportResult { content })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ImportMetadata, Intent, TrainingPhrase};

    #[test]
    fn test_one_row_per_intent_phrase_pair() {
        let result = ImportResult {
            intents: vec![
                Intent {
                    key: "k1".into(),
                    name: "greeting".into(),
                    inputs: vec![
                        TrainingPhrase::plain("hello"),
                        TrainingPhrase::plain("hi there"),
                    ],
                    slots: vec![],
                },
                Intent {
                    key: "k2".into(),
                    name: "farewell".into(),
                    inputs: vec![TrainingPhrase::plain("bye")],
                    slots: vec![],
                },
            ],
            slots: vec![],
            metadata: ImportMetadata::default(),
        };

        let exported = CsvExporter::new().export(&result).unwrap();
        assert_eq!(
            exported.content,
            "greeting,hello\ngreeting,hi there\nfarewell,bye\n"
        );
    }

    #[test]
    fn test_fields_with_commas_are_quoted() {
        let result = ImportResult {
            intents: vec![Intent {
                key: "k".into(),
                name: "order".into(),
                inputs: vec![TrainingPhrase::plain("one, please")],
                slots: vec![],
            }],
            slots: vec![],
            metadata: ImportMetadata::default(),
        };
        let exported = CsvExporter::new().export(&result).unwrap();
        assert_eq!(exported.content, "order,\"one, please\"\n");
    }
}
