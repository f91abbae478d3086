//! Import functionality
//!
//! Provides importers for converting third-party conversational-AI export
//! payloads into the canonical intent/slot model:
//! - Dialogflow CX (zip of JSON files)
//! - Salesforce Einstein (headered CSV)
//! - Amazon Lex v1 (zip of JSON files)
//! - Nuance Mix (TRSX XML)
//! - Rasa 2 (zip of YAML documents, or a single document)
//! - IBM Watson Assistant (workspace JSON)
//! - the platform's own flat CSV interchange (headerless two-column rows)
//!
//! The importers share the slot identity machinery in [`registry`] and the
//! utterance-rewriting strategies in [`annotate`]; [`assemble`] holds the
//! final-assembly helpers. Each importer owns its run state — nothing is
//! shared across import runs.

pub mod annotate;
pub mod assemble;
pub mod canonical;
pub mod dialogflow_cx;
pub mod einstein;
pub mod lex;
pub mod nuance_mix;
pub mod rasa;
pub mod registry;
pub mod watson;

/// Error during import.
///
/// Importers recover from [`ImportError::MalformedRecord`] internally when
/// it concerns one unit of a multi-part payload (the unit is skipped and
/// logged); every other variant aborts the run.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// The payload does not match the vendor's expected top-level shape at
    /// all. Fatal; no partial result is produced.
    #[error("Unrecognized format: {0}")]
    UnrecognizedFormat(String),

    /// One file/row/segment inside a multi-part payload is unparseable.
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// A structural annotation references a slot that was never
    /// registered. Structural data is assumed internally consistent, so
    /// this aborts the run rather than being papered over.
    #[error("Missing slot reference: {0}")]
    MissingSlotReference(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

// Re-export for convenience
pub use canonical::CanonicalCsvImporter;
pub use dialogflow_cx::DialogflowCxImporter;
pub use einstein::EinsteinImporter;
pub use lex::LexImporter;
pub use nuance_mix::NuanceMixImporter;
pub use rasa::RasaImporter;
pub use registry::SlotRegistry;
pub use watson::WatsonImporter;
