//! User-level reader: the symbol-table filter (Ion Symbols: "Processing of
//! Symbol Tables").
//!
//! Wickelt einen beliebigen [`SystemReader`] ein und konsumiert das
//! Symboltabellen-Protokoll unsichtbar: auf Tiefe 0 ersetzt ein Version
//! Marker (`$ion_1_0`) die aktive Tabelle durch die System-Tabelle, und ein
//! mit `$ion_symbol_table` annotiertes Struct wird — rekursiv ueber dieses
//! selbe Geruest — zu einer neuen lokalen Tabelle verarbeitet. Beides wird
//! nie an den Aufrufer durchgereicht; pro erfolgreichem [`UserReader::next`]
//! erscheint genau ein Anwendungswert, egal wie viele Protokollwerte davor
//! lagen.
//!
//! Innerhalb eines Containers (`step_in`) wird nichts gefiltert: dort sind
//! auch annotierte Structs gewoehnliche Anwendungswerte.
//!
//! Nicht thread-sicher: ein Reader, ein Thread, ein logischer Durchlauf.

use std::rc::Rc;

use log::debug;

use crate::catalog::Catalog;
use crate::element::{Decimal, IonType, Timestamp};
use crate::error::{Error, Result};
use crate::span::{SeekableReader, Span, SpanProvider};
use crate::symbol::{localize, localize_all, SymbolToken, SID_ION_1_0, SID_ION_SYMBOL_TABLE, TEXT_ION_SYMBOL_TABLE};
use crate::symtab::SymbolTable;

use super::{lst, SystemReader};

/// Symbol-table-filtering reader over any system-level reader.
pub struct UserReader<R: SystemReader> {
    sys: R,
    catalog: Option<Rc<dyn Catalog>>,
    /// Die aktive Symboltabelle. Startet als System-Tabelle.
    symtab: Rc<SymbolTable>,
    /// Pro-Advance-Stack der auf Tiefe 0 konsumierten Protokoll-Tabellen.
    /// Pro Reader-Instanz, nie global: Reader bleiben unabhaengig und
    /// thread-isoliert. Abrufbar bis zum naechsten Advance.
    passed: Vec<Rc<SymbolTable>>,
    /// Bereits klassifizierter naechster Anwendungswert (one-ahead fuer
    /// die `has_next`/`next`-Trennung).
    pending: Option<IonType>,
    eof: bool,
}

impl<R: SystemReader> UserReader<R> {
    /// Reader ohne Catalog: Imports werden nur ueber ihre deklarierte
    /// `max_id` substituiert.
    pub fn new(sys: R) -> Self {
        Self {
            sys,
            catalog: None,
            symtab: Rc::new(SymbolTable::system_1_0()),
            passed: Vec::new(),
            pending: None,
            eof: false,
        }
    }

    /// Reader mit Catalog fuer die Aufloesung von Shared-Imports.
    pub fn with_catalog(sys: R, catalog: Rc<dyn Catalog>) -> Self {
        Self {
            sys,
            catalog: Some(catalog),
            symtab: Rc::new(SymbolTable::system_1_0()),
            passed: Vec::new(),
            pending: None,
            eof: false,
        }
    }

    /// SID eines rohen Symbol-Tokens, notfalls ueber den Text gegen die
    /// System-Tabelle aufgeloest.
    fn system_sid_of(token: &SymbolToken) -> Option<u32> {
        match token.sid() {
            Some(sid) => Some(sid),
            None => token
                .text()
                .and_then(|text| SymbolTable::system_1_0().find(text))
                .and_then(|tok| tok.sid()),
        }
    }

    /// Traegt der prefetchte Wert die `$ion_symbol_table`-Annotation
    /// (roher Text oder roher SID 3)?
    fn peek_has_lst_annotation(&self) -> bool {
        self.sys.peek_annotations().iter().any(|a| {
            a.has_text(TEXT_ION_SYMBOL_TABLE) || a.sid() == Some(SID_ION_SYMBOL_TABLE)
        })
    }

    /// Der Advance-Loop: konsumiert auf Tiefe 0 beliebig viele
    /// Protokollwerte und parkt den naechsten Anwendungswert als prefetcht.
    /// Der aktuelle Wert bleibt dabei gueltig.
    fn next_helper_user(&mut self) -> Result<bool> {
        if self.eof {
            return Ok(false);
        }
        if self.pending.is_some() {
            return Ok(true);
        }

        self.passed.clear();

        loop {
            let Some(next_type) = self.sys.peek_type()? else {
                if self.sys.depth() == 0 {
                    self.eof = true;
                }
                return Ok(false);
            };

            if self.sys.at_top_level() {
                if next_type == IonType::Symbol && !self.sys.peek_is_null() {
                    // Null-Symbole werden hier nie konsumiert.
                    if let Some(token) = self.sys.peek_symbol() {
                        if Self::system_sid_of(&token) == Some(SID_ION_1_0) {
                            debug!("version marker, resetting to the system table");
                            let system = Rc::new(SymbolTable::system_1_0());
                            self.symtab = Rc::clone(&system);
                            self.passed.push(system);
                            self.sys.skip_next()?;
                            continue;
                        }
                    }
                } else if next_type == IonType::Struct
                    && !self.sys.peek_is_null()
                    && self.peek_has_lst_annotation()
                {
                    let sub = self.sys.detach_next()?;
                    let table =
                        Rc::new(lst::read_local_table(sub, self.catalog.as_ref())?);
                    self.symtab = Rc::clone(&table);
                    self.passed.push(table);
                    continue;
                }
            }

            // Kein Protokollwert: das ist der naechste Anwendungswert.
            self.pending = Some(next_type);
            return Ok(true);
        }
    }

    // === Navigation ===

    /// True wenn auf dieser Tiefe ein weiterer Anwendungswert folgt.
    /// Konsumiert dabei ggf. Protokollwerte, laesst den aktuellen Wert aber
    /// gueltig; mehrfacher Aufruf bewegt nichts.
    pub fn has_next(&mut self) -> Result<bool> {
        self.next_helper_user()
    }

    /// Positioniert den Cursor auf den naechsten Anwendungswert und liefert
    /// seinen Typ, `None` am Ende der aktuellen Sequenz.
    pub fn next(&mut self) -> Result<Option<IonType>> {
        if !self.next_helper_user()? {
            // Kein Wert mehr: der aktuelle Wert wird geloescht.
            self.sys.next()?;
            self.pending = None;
            return Ok(None);
        }
        self.pending = None;
        self.sys.next()
    }

    /// Steigt in den aktuellen Container ein. Ab hier wird nichts mehr
    /// gefiltert — Symbol-Table-Structs sind nur auf Tiefe 0 Protokoll.
    pub fn step_in(&mut self) -> Result<()> {
        self.sys.step_in()?;
        self.pending = None;
        Ok(())
    }

    /// Steigt aus dem aktuellen Container aus; der Cursor steht danach
    /// HINTER dem Container, erst `next`/`has_next` bewegt ihn weiter.
    /// Fehler auf Tiefe 0.
    pub fn step_out(&mut self) -> Result<()> {
        self.sys.step_out()?;
        self.pending = None;
        Ok(())
    }

    /// Verschachtelungstiefe (0 = oberste Ebene).
    pub fn depth(&self) -> usize {
        self.sys.depth()
    }

    /// True wenn der Cursor ueber Struct-Feldern iteriert.
    pub fn is_in_struct(&self) -> bool {
        self.sys.is_in_struct()
    }

    /// Typ des aktuellen Werts, `None` ohne aktuellen Wert.
    pub fn ion_type(&self) -> Option<IonType> {
        self.sys.current_type()
    }

    /// True wenn der aktuelle Wert ein null ist.
    pub fn is_null(&self) -> bool {
        self.sys.is_null()
    }

    // === Symbol resolution ===

    /// Feldname des aktuellen Werts, gegen die aktive Tabelle lokalisiert.
    pub fn field_name(&self) -> Option<SymbolToken> {
        self.sys
            .field_token()
            .map(|raw| localize(Some(&self.symtab), &raw))
    }

    /// Annotationen des aktuellen Werts, lokalisiert.
    pub fn annotations(&self) -> Vec<SymbolToken> {
        localize_all(Some(&self.symtab), &self.sys.annotation_tokens())
    }

    /// Die aktive Symboltabelle.
    pub fn symbol_table(&self) -> &Rc<SymbolTable> {
        &self.symtab
    }

    /// Nimmt die oberste waehrend des letzten Advance konsumierte
    /// Protokoll-Tabelle vom Stack (Diagnose; der Stack wird beim naechsten
    /// Advance geleert).
    pub fn pop_passed_symbol_table(&mut self) -> Option<Rc<SymbolTable>> {
        self.passed.pop()
    }

    // === Scalar accessors ===

    pub fn bool_value(&self) -> Result<bool> {
        self.sys.bool_value()
    }

    pub fn int_value(&self) -> Result<i64> {
        self.sys.int_value()
    }

    pub fn float_value(&self) -> Result<f64> {
        self.sys.float_value()
    }

    pub fn decimal_value(&self) -> Result<Decimal> {
        self.sys.decimal_value()
    }

    pub fn timestamp_value(&self) -> Result<Timestamp> {
        self.sys.timestamp_value()
    }

    /// Text des aktuellen string- ODER symbol-Werts. Fuer ein Symbol ohne
    /// aufloesbaren Text: `UnknownSymbolText` mit dem SID — der SID selbst
    /// bleibt ueber [`UserReader::symbol_value`] zugreifbar.
    pub fn string_value(&self) -> Result<Rc<str>> {
        match self.sys.current_type() {
            Some(IonType::Symbol) => {
                let token = self.symbol_value()?;
                match token.text_rc() {
                    Some(text) => Ok(text),
                    None => Err(Error::UnknownSymbolText {
                        sid: token.sid().unwrap_or(0),
                    }),
                }
            }
            _ => self.sys.string_value(),
        }
    }

    /// Symbol-Token des aktuellen Werts, lokalisiert.
    pub fn symbol_value(&self) -> Result<SymbolToken> {
        let raw = self.sys.symbol_value()?;
        Ok(localize(Some(&self.symtab), &raw))
    }

    pub fn bytes_value(&self) -> Result<Rc<[u8]>> {
        self.sys.bytes_value()
    }

    // === Facet support ===

    /// Facet-Abfrage: Seek-Faehigkeit dieses Readers, falls der
    /// darunterliegende System-Reader Spans unterstuetzt. Explizite
    /// Capability-Pruefung; `None` statt Laufzeitfehler bei Readern ohne
    /// Seek-Unterstuetzung.
    pub fn as_seekable(&mut self) -> Option<&mut dyn SeekableReader> {
        if self.sys.as_span_source().is_some() {
            Some(self)
        } else {
            None
        }
    }
}

impl<R: SystemReader> SpanProvider for UserReader<R> {
    fn current_span(&mut self) -> Result<Span> {
        let symtab = Rc::clone(&self.symtab);
        let Some(source) = self.sys.as_span_source() else {
            return Err(Error::illegal_state(
                "current_span",
                "this reader does not support spans",
            ));
        };
        // Die aktive Tabelle wird eager eingefangen, nie lazy rekonstruiert.
        Ok(source.capture()?.with_symbol_table(symtab))
    }
}

impl<R: SystemReader> SeekableReader for UserReader<R> {
    fn hoist(&mut self, span: &Span) -> Result<()> {
        let restored = span.symbol_table().cloned();
        let Some(source) = self.sys.as_span_source() else {
            return Err(Error::illegal_state(
                "hoist",
                "this reader does not support spans",
            ));
        };
        source.seek(span)?;
        // Der Span traegt die Tabellen-Identitaet; der Stream bis zur
        // Position wird nicht erneut validiert.
        if let Some(table) = restored {
            self.symtab = table;
        }
        self.pending = None;
        self.eof = false;
        self.passed.clear();
        Ok(())
    }
}
