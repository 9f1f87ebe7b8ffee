//! Tree-backed system-level reader.
//!
//! Ein Cursor ueber eine Sequenz unveraenderlicher [`Element`]-Knoten. Die
//! Position ist ein expliziter Frame-Stack ("wo geht es nach `step_out`
//! weiter") plus Index — keine Parent-Pointer auf den Knoten, damit Baum-
//! und Puffer-Varianten strukturell gleich bleiben.
//!
//! Der Reader haelt genau einen prefetchten Wert (`next_slot`) und den
//! aktuellen Wert (`curr`) getrennt: Prefetch macht die Accessoren des
//! aktuellen Werts nicht ungueltig.

use std::rc::Rc;

use crate::element::{Decimal, Element, IonType, Timestamp, Value};
use crate::error::{Error, Result};
use crate::span::{incompatible, Span, SpanKind, SpanSource};
use crate::symbol::SymbolToken;

use super::SystemReader;

/// Ein Wert mit seinem Feldnamen (nur Struct-Kinder haben einen).
#[derive(Debug, Clone)]
struct Slot {
    field: Option<SymbolToken>,
    node: Rc<Element>,
}

/// Resume-Marker: Container plus Index des naechsten Kindes.
#[derive(Debug, Clone)]
struct Frame {
    container: Rc<Element>,
    index: usize,
}

/// System-level reader over an in-memory value sequence.
pub struct TreeReader {
    top: Vec<Rc<Element>>,
    top_index: usize,
    frames: Vec<Frame>,
    /// True fuer einen herausgeloesten Einzelwert (Hoist/Detach): kein
    /// Stream, kein Symboltabellen-Protokoll.
    hoisted: bool,
    next_slot: Option<Slot>,
    curr: Option<Slot>,
}

impl TreeReader {
    /// Reader ueber eine Top-Level-Sequenz von Werten.
    pub fn new(elements: impl IntoIterator<Item = Element>) -> Self {
        Self::from_rc(elements.into_iter().map(Rc::new).collect())
    }

    /// Reader ueber bereits geteilte Knoten (Refcount-Increment statt Kopie).
    pub fn from_rc(elements: Vec<Rc<Element>>) -> Self {
        Self {
            top: elements,
            top_index: 0,
            frames: Vec::new(),
            hoisted: false,
            next_slot: None,
            curr: None,
        }
    }

    /// Reader ueber einen einzelnen herausgeloesten Knoten.
    pub(crate) fn hoisted(node: Rc<Element>) -> Self {
        Self {
            top: vec![node],
            top_index: 0,
            frames: Vec::new(),
            hoisted: true,
            next_slot: None,
            curr: None,
        }
    }

    /// Holt den naechsten Slot der aktuellen Ebene in den Prefetch.
    fn fill_next(&mut self) {
        if self.next_slot.is_some() {
            return;
        }
        self.next_slot = match self.frames.last_mut() {
            None => {
                let node = self.top.get(self.top_index).cloned();
                node.map(|node| {
                    self.top_index += 1;
                    Slot { field: None, node }
                })
            }
            Some(frame) => frame.container.child(frame.index).map(|(field, node)| {
                frame.index += 1;
                Slot {
                    field: field.cloned(),
                    node: Rc::clone(node),
                }
            }),
        };
    }

    /// Gibt einen prefetchten Slot an die Ebene zurueck (fuer `step_in`:
    /// der prefetchte Geschwisterwert darf nicht verloren gehen).
    fn unfetch(&mut self) {
        if self.next_slot.take().is_some() {
            match self.frames.last_mut() {
                None => self.top_index -= 1,
                Some(frame) => frame.index -= 1,
            }
        }
    }

    /// Aktueller Wert oder `TypeMismatch` mit leerem `actual`.
    fn expect_value(&self, expected: IonType) -> Result<&Element> {
        let Some(slot) = &self.curr else {
            return Err(Error::TypeMismatch { expected: expected.name(), actual: "" });
        };
        if slot.node.is_null() {
            return Err(Error::TypeMismatch { expected: expected.name(), actual: "null" });
        }
        if slot.node.ion_type() != expected {
            return Err(Error::TypeMismatch {
                expected: expected.name(),
                actual: slot.node.ion_type().name(),
            });
        }
        Ok(&slot.node)
    }
}

impl SystemReader for TreeReader {
    fn peek_type(&mut self) -> Result<Option<IonType>> {
        self.fill_next();
        Ok(self.next_slot.as_ref().map(|s| s.node.ion_type()))
    }

    fn peek_is_null(&self) -> bool {
        self.next_slot.as_ref().is_some_and(|s| s.node.is_null())
    }

    fn peek_symbol(&self) -> Option<SymbolToken> {
        match self.next_slot.as_ref()?.node.value() {
            Value::Symbol(tok) => Some(tok.clone()),
            _ => None,
        }
    }

    fn peek_annotations(&self) -> Vec<SymbolToken> {
        self.next_slot
            .as_ref()
            .map(|s| s.node.annotations().to_vec())
            .unwrap_or_default()
    }

    fn skip_next(&mut self) -> Result<()> {
        self.fill_next();
        if self.next_slot.take().is_none() {
            return Err(Error::illegal_state("skip_next", "no value is pending"));
        }
        Ok(())
    }

    fn detach_next(&mut self) -> Result<Self> {
        self.fill_next();
        match self.next_slot.take() {
            Some(slot) => Ok(Self::hoisted(slot.node)),
            None => Err(Error::illegal_state("detach_next", "no value is pending")),
        }
    }

    fn next(&mut self) -> Result<Option<IonType>> {
        self.fill_next();
        self.curr = self.next_slot.take();
        Ok(self.curr.as_ref().map(|s| s.node.ion_type()))
    }

    fn step_in(&mut self) -> Result<()> {
        let Some(slot) = &self.curr else {
            return Err(Error::illegal_state("step_in", "no current value"));
        };
        if !slot.node.ion_type().is_container() {
            return Err(Error::illegal_state("step_in", "current value is not a container"));
        }
        if slot.node.is_null() {
            return Err(Error::illegal_state("step_in", "cannot step into a null container"));
        }
        let container = Rc::clone(&slot.node);
        // Prefetchten Geschwisterwert zurueckgeben, sonst ginge er verloren.
        self.unfetch();
        self.frames.push(Frame { container, index: 0 });
        self.curr = None;
        Ok(())
    }

    fn step_out(&mut self) -> Result<()> {
        if self.frames.pop().is_none() {
            return Err(Error::illegal_state("step_out", "already at depth 0"));
        }
        // Der Eltern-Index steht bereits hinter dem Container.
        self.curr = None;
        self.next_slot = None;
        Ok(())
    }

    fn depth(&self) -> usize {
        self.frames.len()
    }

    fn at_top_level(&self) -> bool {
        self.frames.is_empty() && !self.hoisted
    }

    fn is_in_struct(&self) -> bool {
        self.frames
            .last()
            .is_some_and(|f| f.container.ion_type() == IonType::Struct)
    }

    fn current_type(&self) -> Option<IonType> {
        self.curr.as_ref().map(|s| s.node.ion_type())
    }

    fn is_null(&self) -> bool {
        self.curr.as_ref().is_some_and(|s| s.node.is_null())
    }

    fn field_token(&self) -> Option<SymbolToken> {
        self.curr.as_ref()?.field.clone()
    }

    fn annotation_tokens(&self) -> Vec<SymbolToken> {
        self.curr
            .as_ref()
            .map(|s| s.node.annotations().to_vec())
            .unwrap_or_default()
    }

    fn bool_value(&self) -> Result<bool> {
        match self.expect_value(IonType::Bool)?.value() {
            Value::Bool(b) => Ok(*b),
            _ => unreachable!("expect_value prueft den Typ"),
        }
    }

    fn int_value(&self) -> Result<i64> {
        match self.expect_value(IonType::Int)?.value() {
            Value::Int(i) => Ok(*i),
            _ => unreachable!("expect_value prueft den Typ"),
        }
    }

    fn float_value(&self) -> Result<f64> {
        match self.expect_value(IonType::Float)?.value() {
            Value::Float(f) => Ok(*f),
            _ => unreachable!("expect_value prueft den Typ"),
        }
    }

    fn decimal_value(&self) -> Result<Decimal> {
        match self.expect_value(IonType::Decimal)?.value() {
            Value::Decimal(d) => Ok(*d),
            _ => unreachable!("expect_value prueft den Typ"),
        }
    }

    fn timestamp_value(&self) -> Result<Timestamp> {
        match self.expect_value(IonType::Timestamp)?.value() {
            Value::Timestamp(t) => Ok(*t),
            _ => unreachable!("expect_value prueft den Typ"),
        }
    }

    fn string_value(&self) -> Result<Rc<str>> {
        match self.expect_value(IonType::String)?.value() {
            Value::String(s) => Ok(Rc::clone(s)),
            _ => unreachable!("expect_value prueft den Typ"),
        }
    }

    fn symbol_value(&self) -> Result<SymbolToken> {
        match self.expect_value(IonType::Symbol)?.value() {
            Value::Symbol(tok) => Ok(tok.clone()),
            _ => unreachable!("expect_value prueft den Typ"),
        }
    }

    fn bytes_value(&self) -> Result<Rc<[u8]>> {
        let Some(slot) = &self.curr else {
            return Err(Error::TypeMismatch { expected: "blob", actual: "" });
        };
        match slot.node.value() {
            Value::Blob(b) | Value::Clob(b) => Ok(Rc::clone(b)),
            Value::Null(_) => Err(Error::TypeMismatch { expected: "blob", actual: "null" }),
            other => Err(Error::TypeMismatch {
                expected: "blob",
                actual: other.ion_type().name(),
            }),
        }
    }

    fn as_span_source(&mut self) -> Option<&mut dyn SpanSource> {
        Some(self)
    }
}

impl SpanSource for TreeReader {
    fn span_kind(&self) -> SpanKind {
        SpanKind::Tree
    }

    fn capture(&self) -> Result<Span> {
        match &self.curr {
            Some(slot) => Ok(Span::for_tree(Rc::clone(&slot.node))),
            None => Err(Error::illegal_state("current_span", "no current value")),
        }
    }

    fn seek(&mut self, span: &Span) -> Result<()> {
        match span.tree_node() {
            Some(node) => {
                // Re-Anchoring: der Knoten wird der einzige Top-Level-Wert,
                // die Tiefen-Buchfuehrung beginnt von vorn.
                *self = Self::hoisted(Rc::clone(node));
                Ok(())
            }
            None => Err(incompatible(span.kind(), SpanKind::Tree)),
        }
    }
}
