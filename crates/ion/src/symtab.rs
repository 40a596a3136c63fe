//! Symbol tables: system, shared, and local.
//!
//! A table maps interned text to small integer SIDs, assigned contiguously
//! from 1. A local table's SID space starts with the system symbols, then
//! each import's symbols in declaration order, then locally added text. A
//! shared table owns its SID space outright and never incorporates the
//! system symbols.

use crate::catalog::Catalog;
use crate::error::{IonError, IonResult};
use crate::ion_type::Sid;
use ion_kit_collections::HashIndex;
use std::sync::{Arc, OnceLock};

/// SID of `$ion`.
pub const SID_ION: Sid = 1;
/// SID of `$ion_1_0`.
pub const SID_ION_1_0: Sid = 2;
/// SID of `$ion_symbol_table`.
pub const SID_ION_SYMBOL_TABLE: Sid = 3;
/// SID of `name`.
pub const SID_NAME: Sid = 4;
/// SID of `version`.
pub const SID_VERSION: Sid = 5;
/// SID of `imports`.
pub const SID_IMPORTS: Sid = 6;
/// SID of `symbols`.
pub const SID_SYMBOLS: Sid = 7;
/// SID of `max_id`.
pub const SID_MAX_ID: Sid = 8;
/// SID of `$ion_shared_symbol_table`.
pub const SID_ION_SHARED_SYMBOL_TABLE: Sid = 9;

/// Highest SID defined by the system table.
pub const SYSTEM_MAX_SID: Sid = 9;

/// The system symbols, 1-indexed by SID.
pub const SYSTEM_SYMBOLS: [&str; 9] = [
    "$ion",
    "$ion_1_0",
    "$ion_symbol_table",
    "name",
    "version",
    "imports",
    "symbols",
    "max_id",
    "$ion_shared_symbol_table",
];

/// Symbol count past which a table builds its lookup structures.
const INDEX_THRESHOLD: usize = 16;

/// An import request: a shared table by name and version, with the
/// declared symbol count when the declaration carries one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    pub name: String,
    pub version: u32,
    pub max_id: Option<u32>,
}

/// A resolved import as recorded in a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub name: String,
    pub version: u32,
    /// Concrete SID count this import occupies.
    pub max_id: u32,
}

#[derive(Debug, Clone)]
struct SymbolEntry {
    /// `None` for symbols whose text is unknowable (substituted imports).
    text: Option<String>,
}

/// Which flavor of table this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    System,
    Shared,
    Local,
}

/// A symbol table.
#[derive(Clone)]
pub struct SymbolTable {
    kind: TableKind,
    name: Option<String>,
    version: u32,
    imports: Vec<Import>,
    /// Every symbol in SID order; `symbols[sid - 1]` is SID `sid`.
    symbols: Vec<SymbolEntry>,
    /// Entries up to this count came from the system table or imports.
    imported_count: usize,
    by_name: Option<HashIndex<String, Sid>>,
    locked: bool,
}

impl std::fmt::Debug for SymbolTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymbolTable")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("version", &self.version)
            .field("max_sid", &self.max_sid())
            .finish()
    }
}

/// The one process-wide system table for Ion 1.0.
pub fn system_symbol_table() -> &'static Arc<SymbolTable> {
    static SYSTEM: OnceLock<Arc<SymbolTable>> = OnceLock::new();
    SYSTEM.get_or_init(|| {
        let mut table = SymbolTable {
            kind: TableKind::System,
            name: Some("$ion".to_owned()),
            version: 1,
            imports: Vec::new(),
            symbols: SYSTEM_SYMBOLS
                .iter()
                .map(|text| SymbolEntry {
                    text: Some((*text).to_owned()),
                })
                .collect(),
            imported_count: 0,
            by_name: None,
            locked: false,
        };
        table.locked = true;
        Arc::new(table)
    })
}

impl SymbolTable {
    /// A fresh local table seeded with the system SID space.
    pub fn new_local() -> Self {
        let system = system_symbol_table();
        SymbolTable {
            kind: TableKind::Local,
            name: None,
            version: 0,
            imports: Vec::new(),
            symbols: system.symbols.clone(),
            imported_count: system.symbols.len(),
            by_name: None,
            locked: false,
        }
    }

    /// A fresh shared table. Shared tables start empty; the system SID
    /// space is not incorporated.
    pub fn new_shared(name: impl Into<String>, version: u32) -> Self {
        SymbolTable {
            kind: TableKind::Shared,
            name: Some(name.into()),
            version: version.max(1),
            imports: Vec::new(),
            symbols: Vec::new(),
            imported_count: 0,
            by_name: None,
            locked: false,
        }
    }

    pub fn kind(&self) -> TableKind {
        self.kind
    }

    /// The table name; present iff shared (or system).
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn is_shared(&self) -> bool {
        matches!(self.kind, TableKind::Shared | TableKind::System)
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Whether this is the identity system table.
    pub fn is_system(&self) -> bool {
        self.kind == TableKind::System
    }

    pub fn imports(&self) -> &[Import] {
        &self.imports
    }

    /// The highest SID in this table.
    pub fn max_sid(&self) -> Sid {
        self.symbols.len() as Sid
    }

    /// Count of locally defined symbols (beyond system and imports).
    pub fn local_symbol_count(&self) -> usize {
        self.symbols.len() - self.imported_count
    }

    /// Texts of the locally defined symbols, in SID order.
    pub fn local_symbols(&self) -> impl Iterator<Item = Option<&str>> {
        self.symbols[self.imported_count..]
            .iter()
            .map(|e| e.text.as_deref())
    }

    /// Refuses every further mutation.
    pub fn lock(&mut self) {
        self.locked = true;
    }

    fn check_mutable(&self) -> IonResult<()> {
        if self.locked {
            Err(IonError::IsImmutable)
        } else {
            Ok(())
        }
    }

    /// Names a shared table.
    pub fn set_name(&mut self, name: impl Into<String>) -> IonResult<()> {
        self.check_mutable()?;
        self.name = Some(name.into());
        if self.kind == TableKind::Local {
            self.kind = TableKind::Shared;
        }
        Ok(())
    }

    /// Versions a shared table.
    pub fn set_version(&mut self, version: u32) -> IonResult<()> {
        self.check_mutable()?;
        if version == 0 {
            return Err(IonError::InvalidArg);
        }
        self.version = version;
        Ok(())
    }

    /// Pads or truncates to an exact SID count.
    ///
    /// Padding entries have unknown text. Truncation below the imported
    /// range is refused.
    pub fn set_max_sid(&mut self, max_sid: Sid) -> IonResult<()> {
        self.check_mutable()?;
        let target = max_sid as usize;
        if target < self.imported_count {
            return Err(IonError::InvalidArg);
        }
        while self.symbols.len() < target {
            self.symbols.push(SymbolEntry { text: None });
        }
        if self.symbols.len() > target {
            self.symbols.truncate(target);
            self.by_name = None;
            self.maybe_build_index();
        }
        Ok(())
    }

    /// Resolves and applies an import.
    ///
    /// Fails with [`IonError::HasLocalSymbols`] once local text has been
    /// added, and with [`IonError::ImportNotFound`] when the catalog has no
    /// match and the declaration does not pin a `max_id` (the SID space
    /// would be unknowable).
    pub fn add_import(&mut self, spec: &ImportSpec, catalog: Option<&Catalog>) -> IonResult<()> {
        self.check_mutable()?;
        if self.local_symbol_count() > 0 {
            return Err(IonError::HasLocalSymbols);
        }
        // The system table is implicitly present; importing it is a no-op.
        if spec.name == "$ion" {
            return Ok(());
        }
        let resolved = catalog.and_then(|c| c.find_best(&spec.name, spec.version));
        let (max_id, source) = match (&resolved, spec.max_id) {
            (Some(table), Some(declared)) => (declared, Some(Arc::clone(table))),
            (Some(table), None) => {
                if table.version() == spec.version {
                    (table.max_sid(), Some(Arc::clone(table)))
                } else {
                    // Inexact match with no declared width is unusable.
                    return Err(IonError::ImportNotFound);
                }
            }
            (None, Some(declared)) => (declared, None),
            (None, None) => return Err(IonError::ImportNotFound),
        };
        for sid in 1..=max_id {
            let text = source
                .as_ref()
                .and_then(|t| t.find_by_sid(sid).map(str::to_owned));
            self.symbols.push(SymbolEntry { text });
        }
        self.imported_count = self.symbols.len();
        self.imports.push(Import {
            name: spec.name.clone(),
            version: spec.version,
            max_id,
        });
        self.by_name = None;
        self.maybe_build_index();
        Ok(())
    }

    fn maybe_build_index(&mut self) {
        if self.by_name.is_some() || self.symbols.len() < INDEX_THRESHOLD {
            return;
        }
        let mut index = HashIndex::with_buckets(self.symbols.len() * 2);
        for (at, entry) in self.symbols.iter().enumerate() {
            if let Some(text) = &entry.text {
                // First occurrence wins; later duplicates keep their SID
                // but are unreachable by name.
                let _ = index.insert(text.clone(), at as Sid + 1);
            }
        }
        self.by_name = Some(index);
    }

    /// Appends a symbol positionally, duplicates and unknown text
    /// included. This is how a serialized `symbols` list loads: the list
    /// is positional, so a repeated text still claims its own SID (name
    /// lookup keeps resolving to the first).
    pub fn push_symbol(&mut self, text: Option<String>) -> IonResult<Sid> {
        self.check_mutable()?;
        self.symbols.push(SymbolEntry { text: text.clone() });
        let sid = self.symbols.len() as Sid;
        if let Some(index) = &mut self.by_name {
            if let Some(text) = text {
                let _ = index.insert(text, sid);
            }
        } else {
            self.maybe_build_index();
        }
        Ok(sid)
    }

    /// Interns text, returning its SID; existing text returns the
    /// existing SID.
    pub fn add_symbol(&mut self, text: &str) -> IonResult<Sid> {
        self.check_mutable()?;
        if let Some(sid) = self.find_by_name(text) {
            return Ok(sid);
        }
        self.symbols.push(SymbolEntry {
            text: Some(text.to_owned()),
        });
        let sid = self.symbols.len() as Sid;
        if let Some(index) = &mut self.by_name {
            let _ = index.insert(text.to_owned(), sid);
        } else {
            self.maybe_build_index();
        }
        Ok(sid)
    }

    /// Looks up a SID by exact text.
    pub fn find_by_name(&self, text: &str) -> Option<Sid> {
        match &self.by_name {
            Some(index) => index.find(&text.to_owned()).copied(),
            None => self
                .symbols
                .iter()
                .position(|e| e.text.as_deref() == Some(text))
                .map(|at| at as Sid + 1),
        }
    }

    /// Looks up text by SID; `None` for out-of-range SIDs and for in-range
    /// SIDs whose text is unknown (substituted imports).
    pub fn find_by_sid(&self, sid: Sid) -> Option<&str> {
        if sid == 0 {
            return None;
        }
        self.symbols
            .get(sid as usize - 1)
            .and_then(|e| e.text.as_deref())
    }

    /// Whether a SID falls inside this table's SID space.
    pub fn sid_in_range(&self, sid: Sid) -> bool {
        sid >= 1 && sid <= self.max_sid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_table_layout() {
        let system = system_symbol_table();
        assert_eq!(system.max_sid(), 9);
        assert_eq!(system.find_by_sid(1), Some("$ion"));
        assert_eq!(system.find_by_sid(9), Some("$ion_shared_symbol_table"));
        assert_eq!(system.find_by_name("name"), Some(4));
        assert!(system.is_locked());
    }

    #[test]
    fn local_tables_start_with_system_sids() {
        let mut table = SymbolTable::new_local();
        assert_eq!(table.max_sid(), SYSTEM_MAX_SID);
        let sid = table.add_symbol("foo").unwrap();
        assert_eq!(sid, 10);
        assert_eq!(table.add_symbol("bar").unwrap(), 11);
        assert_eq!(table.add_symbol("foo").unwrap(), 10);
        assert_eq!(table.find_by_name("foo"), Some(10));
        assert_eq!(table.find_by_sid(11), Some("bar"));
    }

    #[test]
    fn shared_tables_do_not_include_system_sids() {
        let mut table = SymbolTable::new_shared("com.example.test", 1);
        assert_eq!(table.max_sid(), 0);
        assert_eq!(table.add_symbol("alpha").unwrap(), 1);
        assert_eq!(table.find_by_name("$ion"), None);
    }

    #[test]
    fn locked_tables_refuse_mutation() {
        let mut table = SymbolTable::new_local();
        table.add_symbol("foo").unwrap();
        table.lock();
        assert_eq!(table.add_symbol("bar"), Err(IonError::IsImmutable));
        assert_eq!(table.set_name("x"), Err(IonError::IsImmutable));
        assert_eq!(table.find_by_name("foo"), Some(10));
    }

    #[test]
    fn index_kicks_in_past_the_threshold() {
        let mut table = SymbolTable::new_local();
        let mut sids = Vec::new();
        for i in 0..40 {
            sids.push(table.add_symbol(&format!("sym{i}")).unwrap());
        }
        assert!(table.by_name.is_some());
        for (i, sid) in sids.iter().enumerate() {
            assert_eq!(table.find_by_name(&format!("sym{i}")), Some(*sid));
            assert_eq!(table.find_by_sid(*sid), Some(format!("sym{i}").as_str()));
        }
    }

    #[test]
    fn import_after_local_symbols_is_refused() {
        let mut table = SymbolTable::new_local();
        table.add_symbol("local").unwrap();
        let spec = ImportSpec {
            name: "t".to_owned(),
            version: 1,
            max_id: Some(2),
        };
        assert_eq!(
            table.add_import(&spec, None),
            Err(IonError::HasLocalSymbols)
        );
    }

    #[test]
    fn missing_import_without_max_id_fails() {
        let mut table = SymbolTable::new_local();
        let spec = ImportSpec {
            name: "absent".to_owned(),
            version: 1,
            max_id: None,
        };
        assert_eq!(table.add_import(&spec, None), Err(IonError::ImportNotFound));
    }

    #[test]
    fn substituted_imports_reserve_unknown_sids() {
        let mut table = SymbolTable::new_local();
        let spec = ImportSpec {
            name: "absent".to_owned(),
            version: 1,
            max_id: Some(3),
        };
        table.add_import(&spec, None).unwrap();
        assert_eq!(table.max_sid(), 12);
        assert_eq!(table.find_by_sid(10), None);
        assert!(table.sid_in_range(12));
        assert!(!table.sid_in_range(13));
        // Local symbols continue after the substituted range.
        assert_eq!(table.add_symbol("after").unwrap(), 13);
    }

    #[test]
    fn every_sid_maps_back_to_itself() {
        let mut table = SymbolTable::new_local();
        for i in 0..20 {
            table.add_symbol(&format!("s{i}")).unwrap();
        }
        for sid in 1..=table.max_sid() {
            match table.find_by_sid(sid) {
                Some(text) => assert_eq!(table.find_by_name(text), Some(sid)),
                None => panic!("all sids should have text here"),
            }
        }
    }
}
