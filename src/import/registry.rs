//! Per-run slot identity and input accumulation.

use std::collections::HashMap;

use uuid::Uuid;

use super::ImportError;
use crate::models::{Slot, SlotType};

/// Allocate a fresh opaque key. 12 lowercase-hex characters of a v4 UUID —
/// short enough to keep rewritten utterances readable, unique at import
/// scale.
pub(crate) fn new_key() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    hex[..12].to_string()
}

/// Owns slot identity for one import run: maps a vendor slot name to a
/// canonical [`Slot`], guaranteeing one record per distinct name.
///
/// The name is the sole dedup key — callers must pass the exact same name
/// string for every mention of the same slot. Instantiate one registry per
/// import call; registries are never shared across runs.
#[derive(Debug, Default)]
pub struct SlotRegistry {
    slots: Vec<Slot>,
    index: HashMap<String, usize>,
}

impl SlotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the slot registered under `name`, creating it with a fresh
    /// key and empty inputs on first sight. `resolve_type` supplies the
    /// slot type for newly created slots (vendor built-in table lookup, or
    /// `Custom`); it is not consulted for existing registrations.
    pub fn get_or_create<F>(&mut self, name: &str, resolve_type: F) -> &Slot
    where
        F: FnOnce(&str) -> SlotType,
    {
        if !self.index.contains_key(name) {
            self.index.insert(name.to_string(), self.slots.len());
            self.slots.push(Slot {
                key: new_key(),
                name: name.to_string(),
                slot_type: resolve_type(name),
                inputs: Vec::new(),
            });
        }
        &self.slots[self.index[name]]
    }

    pub fn get(&self, name: &str) -> Option<&Slot> {
        self.index.get(name).map(|&i| &self.slots[i])
    }

    pub fn key_of(&self, name: &str) -> Option<&str> {
        self.get(name).map(|slot| slot.key.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Append one comma-joined `value,synonym,…` input group to a
    /// registered slot. Values are trimmed before joining. The slot must
    /// already exist — this never creates one.
    pub fn add_input_group<S: AsRef<str>>(
        &mut self,
        name: &str,
        values: &[S],
    ) -> Result<(), ImportError> {
        let group = values
            .iter()
            .map(|value| value.as_ref().trim())
            .collect::<Vec<_>>()
            .join(",");
        self.push_input(name, group)
    }

    /// Append one raw input entry, as-is. The slot must already exist.
    pub fn push_input(&mut self, name: &str, input: String) -> Result<(), ImportError> {
        let i = *self
            .index
            .get(name)
            .ok_or_else(|| ImportError::MissingSlotReference(name.to_string()))?;
        self.slots[i].inputs.push(input);
        Ok(())
    }

    /// Registered names in first-discovery order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|slot| slot.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Flatten to the canonical slot array, in first-discovery order. This
    /// ordering is part of the output contract.
    pub fn into_slots(self) -> Vec<Slot> {
        self.slots
    }
}
