//! Spans: opaque, resumable cursor positions.
//!
//! Ein Span beschreibt "wo der Cursor steht" — fuer einen Baum-Reader als
//! festgehaltener Knoten (kein Offset noetig), fuer binaere und
//! Text-Kollaborateure als Byte-/Zeichen-Offset. Zusaetzlich traegt jeder
//! Span die Identitaet der beim Capture aktiven Symboltabelle: ein Restore
//! validiert den Stream nicht erneut, er vertraut der eingefangenen Tabelle.
//! Die Tabelle wird deshalb eager beim Capture festgehalten, nie lazy
//! rekonstruiert.
//!
//! Spans sind nach Erstellung unveraenderlich und halten ihren Quell-Reader
//! nicht am Leben.

use std::rc::Rc;

use crate::element::Element;
use crate::error::{Error, Result};
use crate::symtab::SymbolTable;

/// The reader kind a span belongs to. Spans are not interchangeable across
/// kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
    /// Span eines Baum-Readers: haelt den Knoten selbst.
    Tree,
    /// Span eines Offset-basierten Readers (binaer/Text).
    Offset,
}

impl SpanKind {
    /// Name fuer Fehlermeldungen.
    pub fn name(self) -> &'static str {
        match self {
            Self::Tree => "tree",
            Self::Offset => "offset",
        }
    }
}

#[derive(Debug, Clone)]
enum SpanRepr {
    Tree { node: Rc<Element> },
    Offset { start: u64, end: u64 },
}

/// An opaque, reader-kind-tagged cursor position.
///
/// Gleichheit ist nur innerhalb derselben Reader-Art definiert; Spans
/// verschiedener Arten sind nie gleich. Die eingefangene Symboltabelle
/// gehoert nicht zur Positions-Identitaet.
#[derive(Debug, Clone)]
pub struct Span {
    repr: SpanRepr,
    symtab: Option<Rc<SymbolTable>>,
}

impl Span {
    /// Span ueber einen festgehaltenen Baum-Knoten.
    pub(crate) fn for_tree(node: Rc<Element>) -> Self {
        Self { repr: SpanRepr::Tree { node }, symtab: None }
    }

    /// Span ueber einen Offset-Bereich der zugrundeliegenden Quelle.
    ///
    /// Konstruktor fuer die binaeren/Text-Kollaborateure; dieser Crate
    /// restauriert solche Spans nicht selbst.
    pub fn for_offsets(start: u64, end: u64) -> Self {
        Self { repr: SpanRepr::Offset { start, end }, symtab: None }
    }

    /// Haengt die beim Capture aktive Symboltabelle an.
    pub fn with_symbol_table(mut self, table: Rc<SymbolTable>) -> Self {
        self.symtab = Some(table);
        self
    }

    /// Die Art des Readers der diesen Span erzeugt hat.
    pub fn kind(&self) -> SpanKind {
        match self.repr {
            SpanRepr::Tree { .. } => SpanKind::Tree,
            SpanRepr::Offset { .. } => SpanKind::Offset,
        }
    }

    /// Die beim Capture aktive Symboltabelle, falls angehaengt.
    pub fn symbol_table(&self) -> Option<&Rc<SymbolTable>> {
        self.symtab.as_ref()
    }

    /// Offset-Bereich, `None` fuer Baum-Spans.
    pub fn offsets(&self) -> Option<(u64, u64)> {
        match self.repr {
            SpanRepr::Offset { start, end } => Some((start, end)),
            SpanRepr::Tree { .. } => None,
        }
    }

    /// Der festgehaltene Knoten, `None` fuer Offset-Spans.
    pub(crate) fn tree_node(&self) -> Option<&Rc<Element>> {
        match &self.repr {
            SpanRepr::Tree { node } => Some(node),
            SpanRepr::Offset { .. } => None,
        }
    }
}

impl PartialEq for Span {
    fn eq(&self, other: &Self) -> bool {
        match (&self.repr, &other.repr) {
            // Baum-Spans: Positions-Identitaet ist Knoten-Identitaet.
            (SpanRepr::Tree { node: a }, SpanRepr::Tree { node: b }) => Rc::ptr_eq(a, b),
            (
                SpanRepr::Offset { start: a0, end: a1 },
                SpanRepr::Offset { start: b0, end: b1 },
            ) => a0 == b0 && a1 == b1,
            _ => false,
        }
    }
}

// ============================================================================
// Capability traits
// ============================================================================

/// System-level span capability: capture the prefetch-independent current
/// position, and seek back to a captured one.
pub trait SpanSource {
    /// Die Span-Art dieses Readers.
    fn span_kind(&self) -> SpanKind;

    /// Span des aktuellen Werts. Fehler wenn kein Wert aktuell ist.
    fn capture(&self) -> Result<Span>;

    /// Re-positioniert diesen Reader auf den Span. Fehler
    /// [`Error::IncompatibleSpan`] bei fremder Span-Art.
    fn seek(&mut self, span: &Span) -> Result<()>;
}

/// User-level facet: produce spans for the current value.
pub trait SpanProvider {
    /// Span des aktuellen Werts, inklusive der aktiven Symboltabelle.
    fn current_span(&mut self) -> Result<Span>;
}

/// User-level facet: restore a captured span ("hoist", nach dem Restore ist
/// der Wert des Spans der naechste und einzige Wert des Readers).
pub trait SeekableReader: SpanProvider {
    /// Re-positioniert den Reader auf den Span und stellt die eingefangene
    /// Symboltabelle wieder her.
    fn hoist(&mut self, span: &Span) -> Result<()>;
}

/// Fehler-Helfer: Span der Art `produced` traf auf einen Reader der Art
/// `against`.
pub(crate) fn incompatible(produced: SpanKind, against: SpanKind) -> Error {
    Error::IncompatibleSpan {
        produced_by: produced.name(),
        restored_against: against.name(),
    }
}
