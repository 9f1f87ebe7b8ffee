//! Symbol-table construction from serialized declarations (Ion Symbols:
//! Local Symbol Tables, Shared Symbol Tables).
//!
//! Liest eine Tabellen-Deklaration ueber das normale Reader-Geruest —
//! rekursiv ueber einen [`UserReader`], damit binaere, Text- und
//! Baum-Quellen identisch behandelt werden. Feldnamen werden gegen die
//! System-Tabelle aufgeloest, deshalb funktionieren sowohl rohe SIDs
//! (binaer) als auch roher Text (Baum/Text).
//!
//! Stream-Modus: jeder Slot der `symbols`-Liste belegt einen SID, auch
//! Null- und Nicht-String-Slots — im Stream referenzierte SIDs duerfen
//! nicht verrutschen.

use std::rc::Rc;

use log::{debug, warn};

use crate::catalog::Catalog;
use crate::element::IonType;
use crate::error::{Error, Result};
use crate::symtab::{LocalTableBuilder, SymbolTable};

use super::{SystemReader, UserReader};

/// Feldnamen einer Tabellen-Deklaration (System-SIDs 4-8).
const FIELD_NAME: &str = "name";
const FIELD_VERSION: &str = "version";
const FIELD_IMPORTS: &str = "imports";
const FIELD_SYMBOLS: &str = "symbols";
const FIELD_MAX_ID: &str = "max_id";

/// Der implizite System-Import traegt diesen Namen in Import-Listen und
/// wird dort uebersprungen.
const SYSTEM_TABLE_NAME: &str = "$ion";

/// Liest eine Local-Symbol-Table-Deklaration aus einem herausgeloesten
/// Struct und baut die Tabelle: System-Tabelle als Kopf der Import-Kette,
/// dann die deklarierten Imports, dann die lokalen Slots.
pub(super) fn read_local_table<R: SystemReader>(
    sys: R,
    catalog: Option<&Rc<dyn Catalog>>,
) -> Result<SymbolTable> {
    let mut reader = UserReader::new(sys);
    match reader.next()? {
        Some(IonType::Struct) if !reader.is_null() => {}
        _ => return Err(Error::invalid_symbol_table("declaration is not a struct")),
    }
    reader.step_in()?;

    let system: Rc<SymbolTable> = Rc::new(SymbolTable::system_1_0());
    let mut imports: Vec<Rc<SymbolTable>> = vec![Rc::clone(&system)];
    let mut slots: Vec<Option<Rc<str>>> = Vec::new();

    // Wiederholte Felder: das letzte gewinnt.
    while let Some(field_type) = reader.next()? {
        let Some(field) = reader.field_name() else { continue };
        match field.text() {
            Some(FIELD_SYMBOLS) => {
                slots = read_symbol_slots(&mut reader, field_type)?;
            }
            Some(FIELD_IMPORTS) => {
                imports = read_imports(&mut reader, field_type, &system, catalog)?;
            }
            // name/version/max_id gehoeren zu Shared-Tabellen; hier wie
            // jedes andere offene Feld ignoriert.
            _ => {}
        }
    }

    let mut builder = LocalTableBuilder::with_imports(imports)?;
    for slot in slots {
        builder.add_slot(slot);
    }
    let table = builder.build();
    debug!(
        "local symbol table: {} imports, max_id {}",
        table.imports().len(),
        table.max_id()
    );
    Ok(table)
}

/// Liest die `symbols`-Liste. Null zaehlt als leere Liste; jeder andere
/// Nicht-Listen-Wert ist eine kaputte Deklaration.
fn read_symbol_slots<R: SystemReader>(
    reader: &mut UserReader<R>,
    field_type: IonType,
) -> Result<Vec<Option<Rc<str>>>> {
    if reader.is_null() {
        return Ok(Vec::new());
    }
    if field_type != IonType::List {
        return Err(Error::invalid_symbol_table("symbols must be a list"));
    }
    reader.step_in()?;
    let mut slots = Vec::new();
    while let Some(entry_type) = reader.next()? {
        if entry_type == IonType::String && !reader.is_null() {
            slots.push(Some(reader.string_value()?));
        } else {
            // Slot verbatim erhalten: SID ohne Text.
            slots.push(None);
        }
    }
    reader.step_out()?;
    Ok(slots)
}

/// Liest die `imports`-Liste und loest jeden Deskriptor auf.
fn read_imports<R: SystemReader>(
    reader: &mut UserReader<R>,
    field_type: IonType,
    system: &Rc<SymbolTable>,
    catalog: Option<&Rc<dyn Catalog>>,
) -> Result<Vec<Rc<SymbolTable>>> {
    let mut imports: Vec<Rc<SymbolTable>> = vec![Rc::clone(system)];
    if reader.is_null() {
        return Ok(imports);
    }
    if field_type != IonType::List {
        return Err(Error::invalid_symbol_table(
            "imports must be a list of import descriptors",
        ));
    }
    reader.step_in()?;
    while let Some(entry_type) = reader.next()? {
        if entry_type != IonType::Struct || reader.is_null() {
            // Nicht-Struct-Eintraege werden uebersprungen.
            continue;
        }
        if let Some(table) = read_import_descriptor(reader, catalog)? {
            imports.push(table);
        }
    }
    reader.step_out()?;
    Ok(imports)
}

/// Liest einen Import-Deskriptor `{name, version, max_id}` und loest ihn
/// gegen den Catalog auf.
///
/// - Catalog-Treffer mit exakter Version und passender `max_id`: die
///   Tabelle selbst.
/// - Treffer mit abweichender Version oder `max_id`: Substitute mit genau
///   der deklarierten Ausdehnung (bekannter Text bleibt erhalten).
/// - Miss mit deklarierter `max_id`: Substitute ohne Text — die SIDs
///   bleiben gueltig, Text-Zugriffe liefern `UnknownSymbolText`.
/// - Miss ohne `max_id`: die SID-Arithmetik ist nicht rekonstruierbar,
///   die Deklaration ist kaputt.
fn read_import_descriptor<R: SystemReader>(
    reader: &mut UserReader<R>,
    catalog: Option<&Rc<dyn Catalog>>,
) -> Result<Option<Rc<SymbolTable>>> {
    reader.step_in()?;
    let mut name: Option<Rc<str>> = None;
    let mut version: u32 = 1;
    let mut max_id: Option<u32> = None;
    while let Some(field_type) = reader.next()? {
        let Some(field) = reader.field_name() else { continue };
        match field.text() {
            Some(FIELD_NAME) if field_type == IonType::String && !reader.is_null() => {
                name = Some(reader.string_value()?);
            }
            Some(FIELD_VERSION) if field_type == IonType::Int && !reader.is_null() => {
                version = u32::try_from(reader.int_value()?).unwrap_or(0).max(1);
            }
            Some(FIELD_MAX_ID) if field_type == IonType::Int && !reader.is_null() => {
                max_id = u32::try_from(reader.int_value()?).ok();
            }
            _ => {}
        }
    }
    reader.step_out()?;

    // Deskriptoren ohne brauchbaren Namen werden uebersprungen; der
    // System-Import ist implizit.
    let Some(name) = name.filter(|n| !n.is_empty()) else {
        return Ok(None);
    };
    if &*name == SYSTEM_TABLE_NAME {
        return Ok(None);
    }

    let found = catalog.and_then(|c| c.get_table_version(&name, version));
    let table = match (found, max_id) {
        (Some(t), None) => {
            if t.version() == version {
                t
            } else {
                return Err(Error::invalid_symbol_table(format!(
                    "import of '{name}' matched version {} instead of {version} \
                     and declares no max_id",
                    t.version()
                )));
            }
        }
        (Some(t), Some(m)) => {
            if t.version() == version && t.max_id() == m {
                t
            } else {
                // Ausdehnung der Deklaration gewinnt; Text soweit bekannt.
                Rc::new(substitute_for(&t, &name, version, m)?)
            }
        }
        (None, Some(m)) => {
            warn!("import of '{name}' version {version} not in catalog, substituting {m} SIDs");
            Rc::new(SymbolTable::substitute(Rc::clone(&name), version, m))
        }
        (None, None) => {
            return Err(Error::invalid_symbol_table(format!(
                "import of '{name}' version {version} is not in the catalog \
                 and declares no max_id"
            )));
        }
    };
    Ok(Some(table))
}

/// Schneidet eine gefundene Tabelle auf die deklarierte Ausdehnung zu bzw.
/// fuellt sie mit leeren Slots auf.
fn substitute_for(
    table: &SymbolTable,
    name: &Rc<str>,
    version: u32,
    max_id: u32,
) -> Result<SymbolTable> {
    let slots = (1..=max_id).map(|sid| table.find_known_symbol(sid)).collect();
    SymbolTable::shared_from_slots(Rc::clone(name), version, slots)
}

/// Liest eine Shared-Symbol-Table-Deklaration (`{name, version, symbols}`)
/// und materialisiert die Tabelle, Slots verbatim.
///
/// Fuer Catalog-Befuellung aus `$ion_shared_symbol_table`-Structs; der
/// User-Level-Filter konsumiert solche Structs NICHT, sie sind gewoehnliche
/// Anwendungswerte.
pub fn read_shared_table<R: SystemReader>(sys: R) -> Result<SymbolTable> {
    let mut reader = UserReader::new(sys);
    match reader.next()? {
        Some(IonType::Struct) if !reader.is_null() => {}
        _ => return Err(Error::invalid_symbol_table("declaration is not a struct")),
    }
    reader.step_in()?;

    let mut name: Option<Rc<str>> = None;
    let mut version: u32 = 1;
    let mut slots: Vec<Option<Rc<str>>> = Vec::new();
    while let Some(field_type) = reader.next()? {
        let Some(field) = reader.field_name() else { continue };
        match field.text() {
            Some(FIELD_NAME) if field_type == IonType::String && !reader.is_null() => {
                name = Some(reader.string_value()?);
            }
            Some(FIELD_VERSION) if field_type == IonType::Int && !reader.is_null() => {
                version = u32::try_from(reader.int_value()?).unwrap_or(0).max(1);
            }
            Some(FIELD_SYMBOLS) => {
                slots = read_symbol_slots(&mut reader, field_type)?;
            }
            _ => {}
        }
    }

    let Some(name) = name.filter(|n| !n.is_empty()) else {
        return Err(Error::invalid_symbol_table(
            "shared table declaration has no name",
        ));
    };
    SymbolTable::shared_from_slots(name, version, slots)
}
