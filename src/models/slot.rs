//! Slot model types.

use serde::{Deserialize, Serialize};

/// Semantic type of a slot: user-defined (`Custom`) or one of the
/// platform's built-in types.
///
/// Every vendor keeps its own catalogue of built-in entity types; the
/// importers map those onto this enumeration and fall back to `Custom`
/// for anything without an equivalent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotType {
    #[default]
    Custom,
    Age,
    Currency,
    DateTime,
    Dimension,
    Email,
    Geography,
    KeyPhrase,
    Name,
    NatoApco,
    Number,
    Ordinal,
    Percentage,
    PhoneNumber,
    Temperature,
    Url,
}

impl SlotType {
    pub fn is_builtin(self) -> bool {
        self != SlotType::Custom
    }
}

/// A named, typed placeholder for a piece of information extractable from
/// an utterance (an "entity" in most vendor vocabularies).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    /// Opaque identifier, unique within one import run and stable once
    /// allocated. Training phrases reference slots through this key.
    pub key: String,
    /// Vendor-provided display name; the dedup key within a run.
    pub name: String,
    #[serde(rename = "type")]
    pub slot_type: SlotType,
    /// Enumerated values in discovery order. Each entry is one
    /// comma-joined `value,synonym,…` group; importers that carry no
    /// synonym information emit single-value entries.
    #[serde(default)]
    pub inputs: Vec<String>,
}
