//! Case- and space-insensitive name tables shared by the condition-type and
//! control-type registries.

use std::collections::HashMap;

use crate::errors::{AutomationError, Result};

/// A read-only name -> identifier table.
///
/// Keys are normalized on insert and lookup, so `"control type"`,
/// `"ControlType"` and `"CONTROLTYPE"` all address the same entry.
#[derive(Debug)]
pub struct NameRegistry<T> {
    kind: &'static str,
    entries: HashMap<String, T>,
    /// Canonical spelling of every key, in insertion order
    names: Vec<&'static str>,
}

impl<T: Copy> NameRegistry<T> {
    pub(crate) fn new(kind: &'static str, pairs: &[(&'static str, T)]) -> Self {
        let mut entries = HashMap::with_capacity(pairs.len());
        let mut names = Vec::with_capacity(pairs.len());
        for (name, id) in pairs {
            entries.insert(normalize_key(name), *id);
            names.push(*name);
        }
        Self {
            kind,
            entries,
            names,
        }
    }

    /// Logical table name used in error messages, e.g. "Condition Type"
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Resolves a name, failing with [`AutomationError::Unrecognized`] on a miss
    pub fn map(&self, name: &str) -> Result<T> {
        self.get(name)
            .ok_or_else(|| AutomationError::unrecognized(self.kind, name.trim()))
    }

    /// Resolves a name without producing an error
    pub fn get(&self, name: &str) -> Option<T> {
        self.entries.get(&normalize_key(name)).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&normalize_key(name))
    }

    /// Canonical key spellings, in registration order
    pub fn names(&self) -> &[&'static str] {
        &self.names
    }
}

/// Lowercases and strips every whitespace character
pub(crate) fn normalize_key(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}
