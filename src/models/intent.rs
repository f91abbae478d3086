//! Intent model types.

use serde::{Deserialize, Serialize};

/// One example utterance for an intent, with every slot mention rewritten
/// to the canonical `{{[name].key}}` placeholder grammar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingPhrase {
    pub text: String,
    /// Keys of the slots referenced by `text`, in first-occurrence order.
    /// Each key appears at most once, no matter how many times the slot
    /// is mentioned in the text.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub slots: Vec<String>,
}

impl TrainingPhrase {
    /// A phrase with no slot references.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            slots: Vec::new(),
        }
    }
}

/// Dialog configuration attached to a slot usage. Defaults to empty; only
/// vendors that export elicitation data (Lex) fill it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotDialog {
    #[serde(default)]
    pub prompt: Vec<TrainingPhrase>,
    #[serde(default)]
    pub confirm: Vec<TrainingPhrase>,
    #[serde(default)]
    pub utterances: Vec<TrainingPhrase>,
    #[serde(default)]
    pub confirm_enabled: bool,
}

/// One slot usage within an intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentSlot {
    /// Key of the referenced slot.
    pub id: String,
    #[serde(default)]
    pub dialog: SlotDialog,
    #[serde(default)]
    pub required: bool,
}

impl IntentSlot {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            dialog: SlotDialog::default(),
            required: false,
        }
    }
}

/// A labeled group of example utterances representing one recognized user
/// goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    /// Opaque identifier, stable within one import run.
    pub key: String,
    /// Vendor display name; the dedup key within a run.
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<TrainingPhrase>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub slots: Vec<IntentSlot>,
}
