//! Block catalog lookup.
//!
//! The editor store never hard-codes block subtypes. It asks a
//! [`BlockCatalog`] for the default title and description of a subtype and
//! for whether the subtype is a condition (and therefore gets an
//! end-marker).
//!
//! [`Catalog`] is the standard implementation: the built-in product catalog,
//! optionally extended with entries loaded from `.pipeline-editor/blocks/`.

mod builtin;

use pe_protocol::block_models::{BlockKind, CatalogEntry, END_MARKER_SUBTYPE, PLACEHOLDER_SUBTYPE};
use std::collections::HashMap;
use thiserror::Error;

/// Source of block subtype definitions.
pub trait BlockCatalog: Send + Sync {
    /// Look up a user-addable subtype.
    ///
    /// Returns `None` for unknown subtypes and for the reserved system
    /// subtypes.
    fn lookup(&self, subtype: &str) -> Option<&CatalogEntry>;

    /// All entries in display order.
    fn entries(&self) -> &[CatalogEntry];
}

/// Errors raised while building a catalog.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The subtype is reserved for blocks the editor generates itself.
    #[error("Subtype '{0}' is reserved for system blocks")]
    ReservedSubtype(String),

    /// Catalog entries may not declare system-only kinds.
    #[error("Subtype '{subtype}' declares system kind '{kind}'")]
    SystemKind { subtype: String, kind: BlockKind },
}

/// Ordered catalog with constant-time lookup by subtype.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// The built-in product catalog.
    pub fn builtin() -> Self {
        let entries = builtin::builtin_entries();
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (entry.subtype.clone(), i))
            .collect();
        Self { entries, index }
    }

    /// The built-in catalog extended with `extra` entries.
    ///
    /// An extra entry whose subtype already exists replaces the built-in
    /// definition in place; new subtypes are appended.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if an entry uses a reserved subtype or a
    /// system-only kind.
    pub fn with_extensions(extra: Vec<CatalogEntry>) -> Result<Self, CatalogError> {
        let mut catalog = Self::builtin();
        for entry in extra {
            catalog.insert(entry)?;
        }
        Ok(catalog)
    }

    fn insert(&mut self, entry: CatalogEntry) -> Result<(), CatalogError> {
        if entry.subtype == END_MARKER_SUBTYPE || entry.subtype == PLACEHOLDER_SUBTYPE {
            return Err(CatalogError::ReservedSubtype(entry.subtype));
        }
        if entry.kind.is_system() {
            return Err(CatalogError::SystemKind {
                subtype: entry.subtype,
                kind: entry.kind,
            });
        }

        match self.index.get(&entry.subtype) {
            Some(&i) => self.entries[i] = entry,
            None => {
                self.index.insert(entry.subtype.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
        Ok(())
    }

    /// Entries of a single kind, in display order.
    pub fn entries_of_kind(&self, kind: BlockKind) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter().filter(move |entry| entry.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl BlockCatalog for Catalog {
    fn lookup(&self, subtype: &str) -> Option<&CatalogEntry> {
        self.index.get(subtype).map(|&i| &self.entries[i])
    }

    fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }
}
