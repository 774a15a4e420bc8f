// crates/utilmat-core/src/catalog.rs
//
// Item catalog: itemId -> itemName lookup table.
//
// The catalog is read once per build, to derive the column universe and to
// resolve every event. Names need not be unique across ids; the matrix is
// keyed by name, so two ids sharing a name land in the same column.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One catalog row. Aliases accept MovieLens `movies.csv` headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(alias = "movieId", alias = "itemId")]
    pub item_id: String,

    #[serde(alias = "title", alias = "movie_title", alias = "itemName")]
    pub item_name: String,
}

/// Ordered itemId -> itemName mapping.
///
/// Entry order is preserved: it defines the column order of every matrix
/// built from this catalog. A repeated item id keeps its first name.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    by_id: HashMap<String, usize>,
    ignored_duplicates: usize,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from `(item_id, item_name)` pairs in order.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut catalog = Self::new();
        for (id, name) in pairs {
            catalog.insert(id, name);
        }
        catalog
    }

    /// Insert an entry. Returns `false` (and keeps the existing name) if the
    /// item id is already present.
    pub fn insert(&mut self, item_id: impl Into<String>, item_name: impl Into<String>) -> bool {
        let item_id = item_id.into();
        if self.by_id.contains_key(&item_id) {
            self.ignored_duplicates += 1;
            return false;
        }
        self.by_id.insert(item_id.clone(), self.entries.len());
        self.entries.push(CatalogEntry {
            item_id,
            item_name: item_name.into(),
        });
        true
    }

    /// Look up the name of an item id.
    pub fn name_of(&self, item_id: &str) -> Option<&str> {
        self.by_id
            .get(item_id)
            .map(|&idx| self.entries[idx].item_name.as_str())
    }

    /// Entries in catalog order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Item names in catalog order, repeats included.
    pub fn item_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.item_name.as_str())
    }

    /// Number of distinct item ids.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries dropped because their item id was already present.
    pub fn ignored_duplicates(&self) -> usize {
        self.ignored_duplicates
    }
}

impl FromIterator<CatalogEntry> for Catalog {
    fn from_iter<T: IntoIterator<Item = CatalogEntry>>(iter: T) -> Self {
        Self::from_pairs(iter.into_iter().map(|e| (e.item_id, e.item_name)))
    }
}
