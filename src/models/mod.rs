//! Canonical intent/slot model.
//!
//! Every importer, whatever its source format, produces these shapes. The
//! principal cross-entity invariant: any slot key referenced from a
//! [`TrainingPhrase`] or an [`IntentSlot`] must exist in
//! [`ImportResult::slots`].

pub mod intent;
pub mod language;
pub mod slot;

pub use intent::{Intent, IntentSlot, SlotDialog, TrainingPhrase};
pub use language::Language;
pub use slot::{Slot, SlotType};

use serde::{Deserialize, Serialize};

/// Run-level metadata attached to an import result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportMetadata {
    /// Language derived from vendor locale metadata, when the format
    /// carries any. First successfully parsed signal wins.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
}

/// Result of one import run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[must_use = "import results should be processed or errors checked"]
pub struct ImportResult {
    /// Intents in first-discovery order.
    pub intents: Vec<Intent>,
    /// Slots in first-discovery order.
    pub slots: Vec<Slot>,
    pub metadata: ImportMetadata,
}
