//! Catalog lookup for shared symbol tables (Ion Symbols: The Catalog).
//!
//! Ein Catalog loest `(name, version)`-Imports zu publizierten Shared-Tabellen
//! auf. Die Aufloesung ist best-effort: fehlt die exakte Version, ist die
//! naechsthoehere verfuegbare Version der beste Ersatz, sonst die hoechste
//! vorhandene — die SID-Arithmetik korrigiert der Import-Mechanismus ueber
//! die deklarierte `max_id`.

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::symtab::SymbolTable;
use crate::FastHashMap;

/// Read-only resolution of shared symbol tables by name and version.
pub trait Catalog {
    /// Die hoechste verfuegbare Version der Tabelle `name`.
    fn get_table(&self, name: &str) -> Option<Rc<SymbolTable>>;

    /// Best match fuer `(name, version)`: exakt, sonst naechsthoehere
    /// Version, sonst die hoechste vorhandene.
    fn get_table_version(&self, name: &str, version: u32) -> Option<Rc<SymbolTable>>;
}

/// In-memory catalog backed by a map of version-sorted tables.
#[derive(Default)]
pub struct MapCatalog {
    tables: FastHashMap<Rc<str>, BTreeMap<u32, Rc<SymbolTable>>>,
}

impl MapCatalog {
    /// Erstellt einen leeren Catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registriert eine Shared-Tabelle. Nicht-Shared-Tabellen werden
    /// ignoriert (System-Tabellen sind implizit, lokale Tabellen haben
    /// keinen Namen).
    pub fn put_table(&mut self, table: Rc<SymbolTable>) {
        let Some(name) = table.name() else { return };
        let name: Rc<str> = Rc::from(name);
        let version = table.version();
        self.tables.entry(name).or_default().insert(version, table);
    }

    /// Anzahl registrierter `(name, version)`-Paare.
    pub fn len(&self) -> usize {
        self.tables.values().map(BTreeMap::len).sum()
    }

    /// True wenn der Catalog leer ist.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl Catalog for MapCatalog {
    fn get_table(&self, name: &str) -> Option<Rc<SymbolTable>> {
        let versions = self.tables.get(name)?;
        versions.values().next_back().cloned()
    }

    fn get_table_version(&self, name: &str, version: u32) -> Option<Rc<SymbolTable>> {
        let versions = self.tables.get(name)?;
        if let Some(exact) = versions.get(&version) {
            return Some(Rc::clone(exact));
        }
        // Naechsthoehere Version, sonst hoechste vorhandene.
        versions
            .range(version..)
            .next()
            .or_else(|| versions.iter().next_back())
            .map(|(_, t)| Rc::clone(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared(name: &str, version: u32, symbols: &[&str]) -> Rc<SymbolTable> {
        Rc::new(
            SymbolTable::new_shared(name, version, symbols.iter().map(|s| s.to_string()))
                .unwrap(),
        )
    }

    #[test]
    fn exact_version_wins() {
        let mut cat = MapCatalog::new();
        cat.put_table(shared("t", 1, &["a"]));
        cat.put_table(shared("t", 2, &["a", "b"]));

        let found = cat.get_table_version("t", 1).unwrap();
        assert_eq!(found.version(), 1);
    }

    /// Best match: fehlt die exakte Version, gewinnt die naechsthoehere.
    #[test]
    fn next_higher_version_substitutes() {
        let mut cat = MapCatalog::new();
        cat.put_table(shared("t", 1, &["a"]));
        cat.put_table(shared("t", 4, &["a", "b", "c", "d"]));

        let found = cat.get_table_version("t", 2).unwrap();
        assert_eq!(found.version(), 4);
    }

    #[test]
    fn highest_version_as_fallback() {
        let mut cat = MapCatalog::new();
        cat.put_table(shared("t", 1, &["a"]));
        cat.put_table(shared("t", 3, &["a", "b"]));

        let found = cat.get_table_version("t", 9).unwrap();
        assert_eq!(found.version(), 3);
    }

    #[test]
    fn get_table_returns_latest() {
        let mut cat = MapCatalog::new();
        cat.put_table(shared("t", 2, &["a"]));
        cat.put_table(shared("t", 5, &["a", "b"]));

        assert_eq!(cat.get_table("t").unwrap().version(), 5);
        assert!(cat.get_table("missing").is_none());
    }

    #[test]
    fn non_shared_tables_are_ignored() {
        let mut cat = MapCatalog::new();
        cat.put_table(Rc::new(SymbolTable::system_1_0()));
        assert!(cat.is_empty());
    }
}
