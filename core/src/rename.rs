//! Texture identifier rename table
//!
//! The binary map format stores texture names in a fixed-width field of 15
//! characters. Identifiers longer than that are replaced with short numeric
//! names; the table remembers every replacement so maps can be rewritten to
//! match, and so the same original always maps to the same replacement within
//! a run.

use std::collections::BTreeMap;

/// Width of the texture-name field in the compiled map format.
pub const MAX_TEXTURE_NAME_LEN: usize = 15;

/// Mapping from original texture identifier (relative path, extension
/// stripped) to its staged replacement name.
///
/// Threaded explicitly through the normalizer rather than living in process
/// globals, then consulted read-only by the map compiler adapter.
#[derive(Debug, Default)]
pub struct RenameTable {
    entries: BTreeMap<String, String>,
    next_id: u64,
}

impl RenameTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign (or reuse) a short numeric replacement for an over-length
    /// identifier. The first over-length identifier of a run becomes `"0"`,
    /// the next distinct one `"1"`, and so on; repeat lookups of the same
    /// original return the same replacement.
    pub fn assign(&mut self, original: &str) -> &str {
        let next_id = &mut self.next_id;
        self.entries.entry(original.to_string()).or_insert_with(|| {
            let id = next_id.to_string();
            *next_id += 1;
            id
        })
    }

    /// Record a base texture whose name survived unchanged (or whose group
    /// merely moved during flattening). Maps still reference the original
    /// relative identifier, so these entries participate in map rewriting
    /// too.
    pub fn record(&mut self, original: &str, replacement: &str) {
        self.entries
            .entry(original.to_string())
            .or_insert_with(|| replacement.to_string());
    }

    pub fn get(&self, original: &str) -> Option<&str> {
        self.entries.get(original).map(String::as_str)
    }

    /// Whether some original already stages under `name`. Flattening pulls
    /// every group to one directory, so staged names must be unique across
    /// the whole run.
    pub fn is_staged(&self, name: &str) -> bool {
        self.entries.values().any(|v| v == name)
    }

    /// All `(original, replacement)` pairs, in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Whether an identifier fits the map format's name field.
pub fn fits_name_field(name: &str) -> bool {
    name.chars().count() <= MAX_TEXTURE_NAME_LEN
}
