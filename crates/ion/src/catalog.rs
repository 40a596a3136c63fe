//! Registry of shared symbol tables.

use crate::symtab::SymbolTable;
use std::sync::Arc;

/// A set of shared tables keyed by `(name, version)`.
///
/// Readers resolve symbol-table imports against a catalog. The catalog is
/// read-mostly: populate it up front, then share it.
#[derive(Default)]
pub struct Catalog {
    tables: Vec<Arc<SymbolTable>>,
}

impl Catalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether the catalog holds no tables.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Registers a shared table. The table should be locked; an unnamed
    /// table is refused by debug builds only in spirit and skipped here.
    pub fn add(&mut self, table: Arc<SymbolTable>) {
        if table.name().is_some() {
            self.tables.push(table);
        }
    }

    /// Finds the table with exactly this name and version.
    pub fn find_exact(&self, name: &str, version: u32) -> Option<Arc<SymbolTable>> {
        self.tables
            .iter()
            .find(|t| t.name() == Some(name) && t.version() == version)
            .cloned()
    }

    /// Finds the best available match for an import.
    ///
    /// The first table under the requested name becomes the candidate; a
    /// later table replaces it only when its version is at least the
    /// requested one and no higher than the candidate's. The walk stops
    /// as soon as the candidate's version is exact. A requested version
    /// of zero asks for the latest version instead.
    pub fn find_best(&self, name: &str, version: u32) -> Option<Arc<SymbolTable>> {
        let mut best: Option<&Arc<SymbolTable>> = None;
        for table in &self.tables {
            if table.name() != Some(name) {
                continue;
            }
            match best {
                None => best = Some(table),
                Some(current) => {
                    if version > 0 && table.version() >= version {
                        if table.version() <= current.version() {
                            best = Some(table);
                        }
                    } else if table.version() > current.version() {
                        best = Some(table);
                    }
                }
            }
            if best.is_some_and(|b| b.version() == version) {
                break;
            }
        }
        best.cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symtab::SymbolTable;

    fn shared(name: &str, version: u32, symbols: &[&str]) -> Arc<SymbolTable> {
        let mut table = SymbolTable::new_shared(name, version);
        for s in symbols {
            table.add_symbol(s).unwrap();
        }
        table.lock();
        Arc::new(table)
    }

    #[test]
    fn exact_match_wins() {
        let mut catalog = Catalog::new();
        catalog.add(shared("t", 1, &["a"]));
        catalog.add(shared("t", 2, &["a", "b"]));
        let found = catalog.find_best("t", 1).unwrap();
        assert_eq!(found.version(), 1);
        // An exact match later in the catalog displaces an over-version
        // candidate.
        let mut reversed = Catalog::new();
        reversed.add(shared("t", 3, &["a", "b", "c"]));
        reversed.add(shared("t", 2, &["a", "b"]));
        assert_eq!(reversed.find_best("t", 2).unwrap().version(), 2);
    }

    #[test]
    fn inexact_match_follows_catalog_order() {
        // With no exact version present the first same-name table is the
        // candidate; a later one displaces it only when its version is at
        // least the requested one and no higher than the candidate's.
        let mut catalog = Catalog::new();
        catalog.add(shared("t", 1, &["a"]));
        catalog.add(shared("t", 5, &["a", "b", "c", "d", "e"]));
        assert_eq!(catalog.find_best("t", 2).unwrap().version(), 1);

        let mut reversed = Catalog::new();
        reversed.add(shared("t", 5, &["a", "b", "c", "d", "e"]));
        reversed.add(shared("t", 1, &["a"]));
        assert_eq!(reversed.find_best("t", 2).unwrap().version(), 5);

        let mut narrowing = Catalog::new();
        narrowing.add(shared("t", 5, &["a", "b", "c", "d", "e"]));
        narrowing.add(shared("t", 3, &["a", "b", "c"]));
        narrowing.add(shared("t", 4, &["a", "b", "c", "d"]));
        assert_eq!(narrowing.find_best("t", 2).unwrap().version(), 3);

        assert!(catalog.find_exact("t", 2).is_none());
        assert!(catalog.find_best("missing", 1).is_none());
    }

    #[test]
    fn version_zero_asks_for_the_latest() {
        let mut catalog = Catalog::new();
        catalog.add(shared("t", 2, &["a", "b"]));
        catalog.add(shared("t", 7, &["a", "b", "c"]));
        catalog.add(shared("t", 4, &["a", "b", "c", "d"]));
        assert_eq!(catalog.find_best("t", 0).unwrap().version(), 7);
    }
}
