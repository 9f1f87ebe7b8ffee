//! Streaming reader framework (Ion: Symbols, "Processing of Symbol Tables").
//!
//! Zwei Ebenen (Ion Symbols: system view vs. user view):
//!
//! - Ein **System-Level Reader** ([`SystemReader`]) ist ein roher Cursor
//!   ueber genau eine Kodierung (binaer, Text oder Baum). Er liefert alle
//!   Werte des Streams — auch Version Marker und Symbol-Table-Structs — und
//!   kennt keine Symboltabellen: Annotation- und Feld-Tokens sind rohe
//!   SIDs oder roher Text, je nachdem was die Kodierung wusste.
//! - Ein **User-Level Reader** ([`UserReader`]) wickelt einen System-Level
//!   Reader ein, konsumiert das Symboltabellen-Protokoll unsichtbar und
//!   zeigt nur die Anwendungswerte, mit aufgeloesten Symbolen.
//!
//! Der Baum-Reader ([`TreeReader`]) ist die hier implementierte
//! System-Ebene; binaere und Text-Tokenizer sind externe Kollaborateure,
//! die denselben Trait erfuellen.
//!
//! # Beispiel
//!
//! ```
//! use axion::element::Element;
//! use axion::reader::{TreeReader, UserReader};
//! use axion::IonType;
//!
//! let stream = vec![Element::int(1), Element::string("two")];
//! let mut reader = UserReader::new(TreeReader::new(stream));
//!
//! assert_eq!(reader.next().unwrap(), Some(IonType::Int));
//! assert_eq!(reader.int_value().unwrap(), 1);
//! assert_eq!(reader.next().unwrap(), Some(IonType::String));
//! assert_eq!(reader.next().unwrap(), None);
//! ```

mod lst;
mod tree;
mod user;

pub use lst::read_shared_table;
pub use tree::TreeReader;
pub use user::UserReader;

use std::rc::Rc;

use crate::element::{Decimal, IonType, Timestamp};
use crate::error::Result;
use crate::span::SpanSource;
use crate::symbol::SymbolToken;

/// Raw cursor over one concrete encoding, with no symbol table awareness.
///
/// Vertrag (eine logische Ebene pro Tiefe):
/// - [`SystemReader::peek_type`] prefetcht den naechsten Wert auf der
///   aktuellen Tiefe, ohne den aktuellen Wert zu verlieren; idempotent.
/// - [`SystemReader::next`] macht den prefetchten Wert aktuell.
/// - [`SystemReader::skip_next`] verwirft ihn, [`SystemReader::detach_next`]
///   loest ihn als eigenstaendigen Reader heraus (Grundlage fuer das
///   Konsumieren von Symbol-Table-Structs, ohne den aeusseren Cursor zu
///   bewegen).
/// - Nach [`SystemReader::step_out`] steht der Cursor HINTER dem Container;
///   erst ein frisches `peek_type`/`next` bewegt ihn weiter.
///
/// Nicht thread-sicher: ein Reader, ein Thread, ein logischer Durchlauf.
pub trait SystemReader: Sized {
    /// Prefetcht den naechsten Wert auf dieser Tiefe und liefert seinen Typ,
    /// `None` am Ende der aktuellen Sequenz.
    fn peek_type(&mut self) -> Result<Option<IonType>>;

    /// True wenn der prefetchte Wert ein null ist (jeder Null-Typ).
    fn peek_is_null(&self) -> bool;

    /// Rohes Symbol-Token des prefetchten Werts, `None` wenn er kein
    /// Symbol ist.
    fn peek_symbol(&self) -> Option<SymbolToken>;

    /// Rohe Annotationen des prefetchten Werts, in Deklarationsreihenfolge.
    fn peek_annotations(&self) -> Vec<SymbolToken>;

    /// Verwirft den prefetchten Wert.
    fn skip_next(&mut self) -> Result<()>;

    /// Loest den prefetchten Wert als eigenstaendigen Reader heraus, der
    /// genau diesen einen Wert liefert; der Wert ist danach aus diesem
    /// Cursor verschwunden.
    fn detach_next(&mut self) -> Result<Self>;

    /// Macht den prefetchten (oder naechsten) Wert aktuell.
    fn next(&mut self) -> Result<Option<IonType>>;

    /// Steigt in den aktuellen Container ein.
    fn step_in(&mut self) -> Result<()>;

    /// Steigt aus dem aktuellen Container aus; Fehler auf Tiefe 0.
    fn step_out(&mut self) -> Result<()>;

    /// Verschachtelungstiefe; Tiefe 0 ist die oberste Ebene.
    fn depth(&self) -> usize;

    /// True auf Tiefe 0 der Stream-Sequenz. False nach einem Hoist — ein
    /// herausgeloester Einzelwert ist kein Stream, dort wird kein
    /// Symboltabellen-Protokoll konsumiert.
    fn at_top_level(&self) -> bool;

    /// True wenn der Cursor ueber Struct-Feldern iteriert.
    fn is_in_struct(&self) -> bool;

    /// Typ des aktuellen Werts, `None` ohne aktuellen Wert.
    fn current_type(&self) -> Option<IonType>;

    /// True wenn der aktuelle Wert ein null ist.
    fn is_null(&self) -> bool;

    /// Rohes Feldnamen-Token des aktuellen Werts (nur in Structs).
    fn field_token(&self) -> Option<SymbolToken>;

    /// Rohe Annotationen des aktuellen Werts.
    fn annotation_tokens(&self) -> Vec<SymbolToken>;

    // === Scalar accessors (aktueller Wert) ===

    fn bool_value(&self) -> Result<bool>;
    fn int_value(&self) -> Result<i64>;
    fn float_value(&self) -> Result<f64>;
    fn decimal_value(&self) -> Result<Decimal>;
    fn timestamp_value(&self) -> Result<Timestamp>;
    fn string_value(&self) -> Result<Rc<str>>;
    /// Rohes Symbol-Token (nicht lokalisiert).
    fn symbol_value(&self) -> Result<SymbolToken>;
    fn bytes_value(&self) -> Result<Rc<[u8]>>;

    /// Facet-Abfrage: Span-Faehigkeit dieses Readers, falls vorhanden.
    /// Explizite Capability-Pruefung statt Reflektion; Reader ohne
    /// Seek-Unterstuetzung liefern `None`.
    fn as_span_source(&mut self) -> Option<&mut dyn SpanSource> {
        None
    }
}
