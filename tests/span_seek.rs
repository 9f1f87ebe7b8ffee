//! Span-Tests: Capture, Restore ("Hoist"), Inkompatibilitaet ueber
//! Reader-Arten hinweg, Facet-Abfrage.

use std::rc::Rc;

use axion::element::{Element, Value};
use axion::reader::{TreeReader, UserReader};
use axion::span::{SeekableReader, Span, SpanKind, SpanProvider};
use axion::{Error, IonType, SymbolToken};

fn tok(text: &str) -> SymbolToken {
    SymbolToken::with_text(text).unwrap()
}

fn lst(symbols: &[&str]) -> Element {
    let body = Element::struct_of([(
        tok("symbols"),
        Element::list(symbols.iter().map(|s| Element::string(*s))),
    )]);
    Element::annotated(vec![tok("$ion_symbol_table")], body.value().clone())
}

/// Round-Trip: Capture an einem Wert, weiterlesen, Restore — der naechste
/// `next()` liefert denselben Typ, dieselben Annotationen und denselben
/// Skalarwert wie direkt nach dem Capture.
#[test]
fn capture_advance_restore_round_trip() {
    let stream = vec![
        Element::int(1),
        Element::annotated(vec![tok("note")], Value::Int(42)),
        Element::string("tail"),
    ];
    let mut reader = UserReader::new(TreeReader::new(stream));

    reader.next().unwrap();
    assert_eq!(reader.next().unwrap(), Some(IonType::Int));
    let observed_annotations = reader.annotations();
    let observed_value = reader.int_value().unwrap();
    let span = reader.current_span().unwrap();
    assert_eq!(span.kind(), SpanKind::Tree);

    // Weiterlesen bis ans Ende.
    assert_eq!(reader.next().unwrap(), Some(IonType::String));
    assert_eq!(reader.next().unwrap(), None);

    // Restore: der Wert des Spans ist der naechste und einzige Wert.
    reader.hoist(&span).unwrap();
    assert_eq!(reader.next().unwrap(), Some(IonType::Int));
    assert_eq!(reader.annotations(), observed_annotations);
    assert_eq!(reader.int_value().unwrap(), observed_value);
    assert_eq!(reader.next().unwrap(), None);
}

/// Der Span traegt die beim Capture aktive Symboltabelle; ein Restore auf
/// einen frischen Reader loest Symbole ohne erneutes Lesen des Protokolls
/// auf.
#[test]
fn span_restores_symbol_table_on_fresh_reader() {
    let stream = vec![
        lst(&["captured"]),
        Element::symbol(SymbolToken::with_sid(10)),
    ];
    let mut reader = UserReader::new(TreeReader::new(stream));
    reader.next().unwrap();
    assert_eq!(reader.string_value().unwrap().as_ref(), "captured");
    let span = reader.current_span().unwrap();
    assert!(span.symbol_table().is_some());

    // Frischer Reader derselben Art, ohne die Protokollwerte des Streams.
    let mut fresh = UserReader::new(TreeReader::new(Vec::<Element>::new()));
    fresh.hoist(&span).unwrap();
    assert_eq!(fresh.next().unwrap(), Some(IonType::Symbol));
    assert_eq!(fresh.string_value().unwrap().as_ref(), "captured");
}

/// Hoist eines Werts aus einem Struct: der Wert selbst bleibt erhalten,
/// der Feldnamen-Kontext gehoert nicht zur Position.
#[test]
fn hoist_from_struct_drops_field_context() {
    let stream = vec![Element::struct_of([(tok("f"), Element::int(7))])];
    let mut reader = UserReader::new(TreeReader::new(stream));
    reader.next().unwrap();
    reader.step_in().unwrap();
    reader.next().unwrap();
    assert_eq!(reader.field_name().unwrap().text(), Some("f"));
    let span = reader.current_span().unwrap();

    reader.hoist(&span).unwrap();
    assert_eq!(reader.next().unwrap(), Some(IonType::Int));
    assert_eq!(reader.int_value().unwrap(), 7);
    assert_eq!(reader.field_name(), None);
    assert_eq!(reader.depth(), 0);
}

/// Nach dem Hoist ist der Reader kein Stream: ein dort liegendes
/// `$ion_symbol_table`-Struct wuerde nicht als Protokoll konsumiert.
#[test]
fn hoisted_reader_does_not_filter() {
    let table_struct = lst(&["ghost"]);
    let stream = vec![table_struct];
    let mut reader = UserReader::new(TreeReader::new(vec![Element::list([
        stream[0].clone(),
    ])]));
    reader.next().unwrap();
    reader.step_in().unwrap();
    reader.next().unwrap();
    let span = reader.current_span().unwrap();

    reader.hoist(&span).unwrap();
    // Das Struct erscheint als Wert, samt Annotation.
    assert_eq!(reader.next().unwrap(), Some(IonType::Struct));
    assert!(reader
        .annotations()
        .iter()
        .any(|a| a.has_text("$ion_symbol_table")));
}

/// Capture ohne aktuellen Wert schlaegt fehl: direkt nach Konstruktion und
/// nach `step_out` vor dem naechsten `next`.
#[test]
fn capture_without_current_value_fails() {
    let mut reader = UserReader::new(TreeReader::new(vec![
        Element::list([Element::int(1)]),
    ]));
    assert!(matches!(
        reader.current_span().unwrap_err(),
        Error::IllegalCursorState { operation: "current_span", .. }
    ));

    reader.next().unwrap();
    reader.step_in().unwrap();
    reader.next().unwrap();
    reader.step_out().unwrap();
    assert!(reader.current_span().is_err());
}

/// Ein Offset-Span (binaere/Text-Kollaborateure) passt nicht auf einen
/// Baum-Reader.
#[test]
fn offset_span_is_incompatible_with_tree_reader() {
    let mut reader = UserReader::new(TreeReader::new(vec![Element::int(1)]));
    reader.next().unwrap();

    let foreign = Span::for_offsets(0, 16);
    let err = reader.hoist(&foreign).unwrap_err();
    assert_eq!(
        err,
        Error::IncompatibleSpan { produced_by: "offset", restored_against: "tree" }
    );
}

/// Facet-Abfrage: der Baum-Reader unterstuetzt Spans.
#[test]
fn tree_reader_exposes_seekable_facet() {
    let mut reader = UserReader::new(TreeReader::new(vec![Element::int(1)]));
    reader.next().unwrap();

    let seekable = reader.as_seekable().expect("tree reader is seekable");
    let span = seekable.current_span().unwrap();
    seekable.hoist(&span).unwrap();
    assert_eq!(reader.next().unwrap(), Some(IonType::Int));
}

/// Spans sind unveraenderliche Werte: mehrfaches Restore desselben Spans
/// funktioniert.
#[test]
fn span_is_reusable() {
    let mut reader = UserReader::new(TreeReader::new(vec![Element::int(9)]));
    reader.next().unwrap();
    let span = reader.current_span().unwrap();

    for _ in 0..3 {
        reader.hoist(&span).unwrap();
        assert_eq!(reader.next().unwrap(), Some(IonType::Int));
        assert_eq!(reader.int_value().unwrap(), 9);
    }
}

/// Gleichheit nur innerhalb derselben Reader-Art.
#[test]
fn span_equality_within_kind() {
    let node = Rc::new(Element::int(1));
    let mut reader = UserReader::new(TreeReader::from_rc(vec![Rc::clone(&node)]));
    reader.next().unwrap();
    let a = reader.current_span().unwrap();
    let b = reader.current_span().unwrap();

    assert_eq!(a, b);
    assert_ne!(a, Span::for_offsets(0, 1));
}
