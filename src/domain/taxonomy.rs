//! Fine-grained role taxonomy.
//!
//! Reference data loaded once from a JSON array and never mutated.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub const MISSING_COARSE_ROLE: &str = "N/A";
pub const MISSING_DESCRIPTION: &str = "No description available.";
pub const MISSING_EXAMPLE: &str = "No example available.";

/// One entry of taxonomy.json
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyEntry {
    pub fine_role: String,
    pub coarse_role: String,
    pub description: String,
    pub example: String,
}

/// Display info for a role, with placeholders for unknown roles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleInfo {
    pub fine_role: String,
    pub coarse_role: String,
    pub description: String,
    pub example: String,
    /// False when the role is missing from the taxonomy
    pub known: bool,
}

/// Lookup table keyed by fine role
#[derive(Debug, Clone, Default)]
pub struct Taxonomy {
    entries: HashMap<String, TaxonomyEntry>,
}

impl Taxonomy {
    /// Build from entries; a later duplicate fine role replaces an earlier one
    pub fn new(entries: Vec<TaxonomyEntry>) -> Self {
        let entries = entries
            .into_iter()
            .map(|e| (e.fine_role.clone(), e))
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, fine_role: &str) -> Option<&TaxonomyEntry> {
        self.entries.get(fine_role)
    }

    pub fn coarse_role_of(&self, fine_role: &str) -> Option<&str> {
        self.get(fine_role).map(|e| e.coarse_role.as_str())
    }

    /// Describe a role, never failing
    pub fn describe(&self, fine_role: &str) -> RoleInfo {
        match self.get(fine_role) {
            Some(entry) => RoleInfo {
                fine_role: entry.fine_role.clone(),
                coarse_role: entry.coarse_role.clone(),
                description: entry.description.clone(),
                example: entry.example.clone(),
                known: true,
            },
            None => RoleInfo {
                fine_role: fine_role.to_string(),
                coarse_role: MISSING_COARSE_ROLE.to_string(),
                description: MISSING_DESCRIPTION.to_string(),
                example: MISSING_EXAMPLE.to_string(),
                known: false,
            },
        }
    }
}
