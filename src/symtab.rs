//! Symbol tables (Ion Symbols: Symbol Tables, Local Symbol Tables, Shared
//! Symbol Tables).
//!
//! Ion assigns small integer SIDs to symbol text through three table kinds:
//! the fixed per-version *system* table, immutable published *shared* tables,
//! and stream-scoped *local* tables. A local table is an ordered chain of
//! imported tables — each contributing a contiguous SID range, densely from
//! SID 1 in import order — followed by locally declared symbols starting at
//! `imported_max_id + 1`.
//!
//! Lifecycle: local tables are mutable only through [`LocalTableBuilder`]
//! while the declaring struct is being consumed; afterwards they are frozen
//! behind `Rc` and never change.

use std::rc::Rc;

use crate::error::{Error, Result};
use crate::symbol::{SymbolToken, SYSTEM_SYMBOLS_1_0};
use crate::FastHashMap;

/// Obergrenze fuer den `table_extends`-Vergleich: Subset-Tabellen mit mehr
/// SIDs werden konservativ als nicht-erweiternd behandelt, statt bei jedem
/// Aufruf O(n) Symbolnamen zu vergleichen. Ueberschreibbar via
/// [`table_extends_with_limit`].
pub const EXTENDS_DEFAULT_MAX_ID: u32 = 20;

// ============================================================================
// Table kinds
// ============================================================================

/// The fixed, version-specific system table (Ion Symbols: System Symbols).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemTable {
    version: u32,
}

/// A named, versioned, immutable shared table.
///
/// Slots koennen leer sein: eine aus einer serialisierten Darstellung
/// materialisierte Tabelle bewahrt Null-Slots verbatim, und eine
/// Substitute-Tabelle (Katalog-Miss mit deklarierter `max_id`) besteht nur
/// aus leeren Slots — die SIDs bleiben gueltig, nur der Text fehlt.
#[derive(Debug, Clone)]
pub struct SharedTable {
    name: Rc<str>,
    version: u32,
    slots: Vec<Option<Rc<str>>>,
    lookup: FastHashMap<Rc<str>, u32>,
}

/// A stream-scoped local table: import chain plus local declarations.
#[derive(Debug, Clone)]
pub struct LocalTable {
    imports: Vec<Rc<SymbolTable>>,
    imported_max_id: u32,
    slots: Vec<Option<Rc<str>>>,
    lookup: FastHashMap<Rc<str>, u32>,
}

/// A symbol table of one of the three kinds. The tags are mutually
/// exclusive by construction.
#[derive(Debug, Clone)]
pub enum SymbolTable {
    /// Fixed per-version mapping, immutable.
    System(SystemTable),
    /// Named + versioned, immutable once published.
    Shared(SharedTable),
    /// Stream-scoped, frozen after construction.
    Local(LocalTable),
}

impl SymbolTable {
    /// Die Ion 1.0 System-Tabelle (SIDs 1-9).
    pub fn system_1_0() -> Self {
        Self::System(SystemTable { version: 1 })
    }

    /// Erstellt eine Shared-Tabelle aus deklarierten Symbolen.
    ///
    /// Programmatic Mode: doppelte und leere Texte werden uebersprungen,
    /// nicht als Fehler behandelt. NICHT geeignet um eine serialisierte
    /// Tabelle zu materialisieren — dort muessen Slots verbatim erhalten
    /// bleiben, siehe [`SymbolTable::shared_from_slots`].
    pub fn new_shared(
        name: impl Into<Rc<str>>,
        version: u32,
        symbols: impl IntoIterator<Item = String>,
    ) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::EmptySymbolText);
        }
        let mut slots: Vec<Option<Rc<str>>> = Vec::new();
        let mut lookup = FastHashMap::default();
        for text in symbols {
            if text.is_empty() {
                continue;
            }
            let rc: Rc<str> = text.into();
            if lookup.contains_key(&rc) {
                continue;
            }
            slots.push(Some(Rc::clone(&rc)));
            lookup.insert(rc, slots.len() as u32);
        }
        Ok(Self::Shared(SharedTable { name, version: version.max(1), slots, lookup }))
    }

    /// Materialisiert eine Shared-Tabelle aus serialisierten Slots.
    ///
    /// Jeder Slot, auch leere, belegt einen SID — im Stream referenzierte
    /// SIDs duerfen nicht verrutschen.
    pub fn shared_from_slots(
        name: impl Into<Rc<str>>,
        version: u32,
        slots: Vec<Option<Rc<str>>>,
    ) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::EmptySymbolText);
        }
        let mut lookup = FastHashMap::default();
        for (i, slot) in slots.iter().enumerate() {
            if let Some(text) = slot {
                // Erster Eintrag gewinnt bei Duplikaten.
                lookup.entry(Rc::clone(text)).or_insert(i as u32 + 1);
            }
        }
        Ok(Self::Shared(SharedTable { name, version: version.max(1), slots, lookup }))
    }

    /// Substitute-Tabelle fuer einen Katalog-Miss: `max_id` Slots, alle ohne
    /// Text. Die SID-Arithmetik der importierenden Tabelle bleibt korrekt,
    /// Text-Zugriffe auf diese SIDs liefern `UnknownSymbolText`.
    pub fn substitute(name: impl Into<Rc<str>>, version: u32, max_id: u32) -> Self {
        Self::Shared(SharedTable {
            name: name.into(),
            version: version.max(1),
            slots: vec![None; max_id as usize],
            lookup: FastHashMap::default(),
        })
    }

    // === Tags ===

    /// True for the system table.
    pub fn is_system(&self) -> bool {
        matches!(self, Self::System(_))
    }

    /// True for shared tables (system tables are not "shared" here,
    /// matching the mutually-exclusive tags).
    pub fn is_shared(&self) -> bool {
        matches!(self, Self::Shared(_))
    }

    /// True for local tables.
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local(_))
    }

    // === Queries ===

    /// Name einer Shared-Tabelle, sonst `None`.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Shared(s) => Some(&s.name),
            _ => None,
        }
    }

    /// Version einer Shared- oder System-Tabelle.
    pub fn version(&self) -> u32 {
        match self {
            Self::System(s) => s.version,
            Self::Shared(s) => s.version,
            Self::Local(_) => 0,
        }
    }

    /// Highest assigned SID.
    pub fn max_id(&self) -> u32 {
        match self {
            Self::System(_) => SYSTEM_SYMBOLS_1_0.len() as u32,
            Self::Shared(s) => s.slots.len() as u32,
            Self::Local(l) => l.imported_max_id + l.slots.len() as u32,
        }
    }

    /// Combined extent of the import chain (0 for non-local tables).
    pub fn imported_max_id(&self) -> u32 {
        match self {
            Self::Local(l) => l.imported_max_id,
            _ => 0,
        }
    }

    /// The ordered import chain (empty for non-local tables).
    pub fn imports(&self) -> &[Rc<SymbolTable>] {
        match self {
            Self::Local(l) => &l.imports,
            _ => &[],
        }
    }

    /// Anzahl lokal deklarierter Slots (inkl. leerer).
    pub fn local_symbol_count(&self) -> u32 {
        match self {
            Self::Local(l) => l.slots.len() as u32,
            _ => 0,
        }
    }

    /// Die lokal deklarierten Slots in SID-Reihenfolge.
    pub(crate) fn local_slots(&self) -> &[Option<Rc<str>>] {
        match self {
            Self::Local(l) => &l.slots,
            _ => &[],
        }
    }

    /// Beitrag eines System-Imports am Kopf der Import-Kette (0 wenn die
    /// Kette nicht mit einer System-Tabelle beginnt).
    fn system_prefix_max(&self) -> u32 {
        match self {
            Self::Local(l) => match l.imports.first() {
                Some(head) if head.is_system() => head.max_id(),
                _ => 0,
            },
            _ => 0,
        }
    }

    /// Pure lookup: text → fully resolved token. No mutation; frozen tables
    /// never learn new symbols.
    pub fn find(&self, text: &str) -> Option<SymbolToken> {
        match self {
            Self::System(_) => {
                let pos = SYSTEM_SYMBOLS_1_0.iter().position(|s| *s == text)?;
                Some(SymbolToken::from_parts(
                    Some(Rc::from(SYSTEM_SYMBOLS_1_0[pos])),
                    Some(pos as u32 + 1),
                ))
            }
            Self::Shared(s) => {
                let sid = *s.lookup.get(text)?;
                let slot = s.slots[(sid - 1) as usize].as_ref()?;
                Some(SymbolToken::from_parts(Some(Rc::clone(slot)), Some(sid)))
            }
            Self::Local(l) => {
                // Imports in Ketten-Reihenfolge, dann lokale Deklarationen.
                let mut base = 0u32;
                for import in &l.imports {
                    if let Some(tok) = import.find(text) {
                        let sid = base + tok.sid().unwrap_or(0);
                        return Some(SymbolToken::from_parts(tok.text_rc(), Some(sid)));
                    }
                    base += import.max_id();
                }
                let local_sid = *l.lookup.get(text)?;
                let slot = l.slots[(local_sid - 1) as usize].as_ref()?;
                Some(SymbolToken::from_parts(
                    Some(Rc::clone(slot)),
                    Some(l.imported_max_id + local_sid),
                ))
            }
        }
    }

    /// Pure lookup: SID → text, `None` for unassigned SIDs and empty slots.
    pub fn find_known_symbol(&self, sid: u32) -> Option<Rc<str>> {
        if sid == 0 {
            return None;
        }
        match self {
            Self::System(_) => SYSTEM_SYMBOLS_1_0
                .get((sid - 1) as usize)
                .map(|s| Rc::from(*s)),
            Self::Shared(s) => s.slots.get((sid - 1) as usize)?.clone(),
            Self::Local(l) => {
                if sid <= l.imported_max_id {
                    let mut base = 0u32;
                    for import in &l.imports {
                        let extent = import.max_id();
                        if sid <= base + extent {
                            return import.find_known_symbol(sid - base);
                        }
                        base += extent;
                    }
                    None
                } else {
                    l.slots.get((sid - l.imported_max_id - 1) as usize)?.clone()
                }
            }
        }
    }
}

/// Entpackt `Option<&SymbolTable>` an Aufrufstellen die zwingend eine
/// Tabelle brauchen. Helper-APIs die ohne Tabelle auskommen (z.B.
/// [`crate::symbol::localize`]) rufen das bewusst NICHT auf.
pub fn require(table: Option<&SymbolTable>) -> Result<&SymbolTable> {
    table.ok_or(Error::MissingSymbolTable)
}

// ============================================================================
// Local table construction
// ============================================================================

/// Builder for local tables; the only mutable phase in a table's life.
///
/// Zwei Modi (Ion Symbols: Local Symbol Tables):
/// - [`LocalTableBuilder::add_symbol`]: programmatisch — doppelte und leere
///   Texte werden uebersprungen.
/// - [`LocalTableBuilder::add_slot`]: aus einer serialisierten Darstellung —
///   jeder Slot, auch leere, belegt einen SID, damit im Stream bereits
///   referenzierte SIDs nicht verrutschen.
#[derive(Debug)]
pub struct LocalTableBuilder {
    imports: Vec<Rc<SymbolTable>>,
    imported_max_id: u32,
    slots: Vec<Option<Rc<str>>>,
    lookup: FastHashMap<Rc<str>, u32>,
}

impl LocalTableBuilder {
    /// Startet mit einer Import-Kette. Die Kette wird verbatim uebernommen;
    /// wer die System-Tabelle als Kopf will, uebergibt sie als ersten
    /// Eintrag.
    pub fn with_imports(imports: Vec<Rc<SymbolTable>>) -> Result<Self> {
        let mut imported_max_id = 0u32;
        for import in &imports {
            if import.is_local() {
                return Err(Error::invalid_symbol_table(
                    "a local table cannot import another local table",
                ));
            }
            imported_max_id += import.max_id();
        }
        Ok(Self {
            imports,
            imported_max_id,
            slots: Vec::new(),
            lookup: FastHashMap::default(),
        })
    }

    /// Leerer Builder ohne Imports.
    pub fn new() -> Self {
        Self {
            imports: Vec::new(),
            imported_max_id: 0,
            slots: Vec::new(),
            lookup: FastHashMap::default(),
        }
    }

    /// Programmatic mode: declares a symbol, skipping duplicates and empty
    /// text. Returns the SID the text resolves to in this table.
    pub fn add_symbol(&mut self, text: &str) -> Option<u32> {
        if text.is_empty() {
            return None;
        }
        // Bereits ueber einen Import oder eine fruehere Deklaration bekannt?
        if let Some(local) = self.lookup.get(text) {
            return Some(self.imported_max_id + local);
        }
        let mut base = 0u32;
        for import in &self.imports {
            if let Some(tok) = import.find(text) {
                return Some(base + tok.sid().unwrap_or(0));
            }
            base += import.max_id();
        }
        let rc: Rc<str> = Rc::from(text);
        self.slots.push(Some(Rc::clone(&rc)));
        let local = self.slots.len() as u32;
        self.lookup.insert(rc, local);
        Some(self.imported_max_id + local)
    }

    /// Stream mode: appends a slot verbatim. `None` for null or non-string
    /// entries in a serialized `symbols` list; the slot still consumes a SID.
    pub fn add_slot(&mut self, text: Option<Rc<str>>) -> u32 {
        match text {
            Some(rc) if !rc.is_empty() => {
                self.slots.push(Some(Rc::clone(&rc)));
                let local = self.slots.len() as u32;
                // Duplikate behalten beide Slots; der erste gewinnt im Lookup.
                self.lookup.entry(rc).or_insert(local);
                self.imported_max_id + local
            }
            _ => {
                self.slots.push(None);
                self.imported_max_id + self.slots.len() as u32
            }
        }
    }

    /// Friert die Tabelle ein. Danach ist sie unveraenderlich.
    pub fn build(self) -> SymbolTable {
        SymbolTable::Local(LocalTable {
            imports: self.imports,
            imported_max_id: self.imported_max_id,
            slots: self.slots,
            lookup: self.lookup,
        })
    }
}

impl Default for LocalTableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience: local table over the given import chain with programmatic
/// declarations.
pub fn new_local_table<'a>(
    imports: Vec<Rc<SymbolTable>>,
    symbols: impl IntoIterator<Item = &'a str>,
) -> Result<SymbolTable> {
    let mut builder = LocalTableBuilder::with_imports(imports)?;
    for text in symbols {
        builder.add_symbol(text);
    }
    Ok(builder.build())
}

// ============================================================================
// Predicates
// ============================================================================

/// Is the table null, system, or a local table contributing nothing beyond
/// the system defaults? Trivial tables need not be re-serialized or tracked
/// across a stream boundary.
pub fn is_trivial(table: Option<&SymbolTable>) -> bool {
    match table {
        None => true,
        Some(t) if t.is_system() => true,
        Some(t) if t.is_local() => {
            t.local_symbol_count() == 0 && t.imported_max_id() == t.system_prefix_max()
        }
        Some(_) => false,
    }
}

/// Local table that actually changes the resolution context: at least one
/// local declaration, or imports contributing SIDs beyond the system prefix.
///
/// Ein Import der keine Symbole beitraegt macht die Tabelle NICHT
/// non-trivial — er darf als No-op behandelt werden, wird aber beim Lesen
/// trotzdem angewendet.
pub fn is_local_and_non_trivial(table: Option<&SymbolTable>) -> bool {
    match table {
        Some(t) if t.is_local() => {
            t.local_symbol_count() > 0 || t.imported_max_id() > t.system_prefix_max()
        }
        _ => false,
    }
}

/// Sind zwei Tabellen "dieselbe" fuer den Import-Vergleich? System: gleiche
/// Version. Shared: gleicher Name, Version und Umfang. Lokale Tabellen nur
/// bei Identitaet.
fn same_table(a: &SymbolTable, b: &SymbolTable) -> bool {
    if std::ptr::eq(a, b) {
        return true;
    }
    match (a, b) {
        (SymbolTable::System(x), SymbolTable::System(y)) => x.version == y.version,
        (SymbolTable::Shared(x), SymbolTable::Shared(y)) => {
            x.name == y.name && x.version == y.version && x.slots.len() == y.slots.len()
        }
        _ => false,
    }
}

/// True iff `subset` is a local table whose declarations, in order, form a
/// prefix of `superset`'s declarations and whose import chain is the same.
/// Used to detect that re-fetching or rebuilding a table is unnecessary.
///
/// Uses [`EXTENDS_DEFAULT_MAX_ID`] as the cost guard.
pub fn table_extends(superset: &SymbolTable, subset: &SymbolTable) -> bool {
    table_extends_with_limit(superset, subset, EXTENDS_DEFAULT_MAX_ID)
}

/// [`table_extends`] with an explicit cost guard: subsets with `max_id`
/// above `limit` are conservatively reported as non-extending rather than
/// paying an O(n) name comparison per call.
pub fn table_extends_with_limit(
    superset: &SymbolTable,
    subset: &SymbolTable,
    limit: u32,
) -> bool {
    if std::ptr::eq(superset, subset) {
        return true;
    }
    if !(superset.is_local() && subset.is_local()) {
        return false;
    }
    if superset.max_id() < subset.max_id() {
        return false;
    }
    if subset.max_id() > limit {
        return false;
    }

    let super_imports = superset.imports();
    let sub_imports = subset.imports();
    if super_imports.len() != sub_imports.len() {
        return false;
    }
    for (a, b) in super_imports.iter().zip(sub_imports) {
        if !same_table(a, b) {
            return false;
        }
    }

    let super_slots = superset.local_slots();
    let sub_slots = subset.local_slots();
    if sub_slots.len() > super_slots.len() {
        return false;
    }
    super_slots
        .iter()
        .zip(sub_slots)
        .all(|(sup, sub)| sup.as_deref() == sub.as_deref())
}
