//! NLU Import SDK - converters from third-party conversational-AI export
//! formats into one canonical intent/slot model
//!
//! Provides unified interfaces for:
//! - The canonical model types (Intent, Slot, TrainingPhrase, ImportResult)
//! - Slot identity and utterance annotation shared by every importer
//! - Importers for Dialogflow CX, Einstein, Lex v1, Nuance Mix, Rasa 2,
//!   Watson Assistant, and the platform's flat CSV interchange
//! - Canonical flat CSV export (intent name, utterance text)

pub mod archive;
pub mod export;
pub mod import;
pub mod models;
pub mod xml;

// Re-export commonly used types
pub use export::{CsvExporter, ExportError, ExportResult};
pub use import::{
    CanonicalCsvImporter, DialogflowCxImporter, EinsteinImporter, ImportError, LexImporter,
    NuanceMixImporter, RasaImporter, SlotRegistry, WatsonImporter,
};

// Re-export models
pub use models::{
    ImportMetadata, ImportResult, Intent, IntentSlot, Language, Slot, SlotDialog, SlotType,
    TrainingPhrase,
};
