//! End-to-end Tests fuer den User-Level Reader: Advance-Determinismus,
//! Tiefen-Isolation des Protokolls, Cursor-Missbrauch.

use axion::element::Element;
use axion::reader::{TreeReader, UserReader};
use axion::{Error, IonType, SymbolToken};

fn tok(text: &str) -> SymbolToken {
    SymbolToken::with_text(text).unwrap()
}

fn ivm() -> Element {
    Element::symbol(tok("$ion_1_0"))
}

fn lst(symbols: &[&str]) -> Element {
    let body = Element::struct_of([(
        tok("symbols"),
        Element::list(symbols.iter().map(|s| Element::string(*s))),
    )]);
    Element::annotated(vec![tok("$ion_symbol_table")], body.value().clone())
}

/// Advance-Determinismus: egal wie viele Protokollwerte zwischen den
/// Anwendungswerten liegen, `next()` liefert genau die Anwendungswerte in
/// Originalreihenfolge, jeweils mit der dort aktiven Tabelle.
#[test]
fn user_values_in_order_with_correct_tables() {
    let stream = vec![
        ivm(),
        Element::int(1),
        lst(&["alpha"]),
        Element::symbol(SymbolToken::with_sid(10)),
        ivm(), // Reset auf die System-Tabelle
        lst(&["beta"]),
        ivm(),
        lst(&["gamma"]),
        Element::symbol(SymbolToken::with_sid(10)),
        Element::string("done"),
    ];
    let mut reader = UserReader::new(TreeReader::new(stream));

    assert_eq!(reader.next().unwrap(), Some(IonType::Int));
    assert_eq!(reader.int_value().unwrap(), 1);

    assert_eq!(reader.next().unwrap(), Some(IonType::Symbol));
    assert_eq!(reader.string_value().unwrap().as_ref(), "alpha");

    assert_eq!(reader.next().unwrap(), Some(IonType::Symbol));
    assert_eq!(reader.string_value().unwrap().as_ref(), "gamma");

    assert_eq!(reader.next().unwrap(), Some(IonType::String));
    assert_eq!(reader.string_value().unwrap().as_ref(), "done");

    assert_eq!(reader.next().unwrap(), None);
}

/// Wiederholtes Lesen desselben Streams liefert identische Folgen.
#[test]
fn repeated_reads_are_deterministic() {
    let build = || {
        vec![
            lst(&["a", "b"]),
            Element::symbol(SymbolToken::with_sid(11)),
            Element::list([Element::int(1)]),
        ]
    };
    let collect = |stream: Vec<Element>| {
        let mut reader = UserReader::new(TreeReader::new(stream));
        let mut seen = Vec::new();
        while let Some(t) = reader.next().unwrap() {
            seen.push(t);
        }
        seen
    };

    assert_eq!(collect(build()), collect(build()));
    assert_eq!(collect(build()), vec![IonType::Symbol, IonType::List]);
}

/// Tiefen-Isolation: die `$ion_symbol_table`-Annotation ist unterhalb von
/// Tiefe 0 bedeutungslos, das Struct ist ein gewoehnlicher Anwendungswert.
#[test]
fn annotated_struct_inside_container_is_user_data() {
    let inner = Element::annotated(
        vec![tok("$ion_symbol_table")],
        Element::struct_of([(
            tok("symbols"),
            Element::list([Element::string("ghost")]),
        )])
        .value()
        .clone(),
    );
    let stream = vec![
        Element::list([inner]),
        Element::symbol(SymbolToken::with_sid(10)),
    ];
    let mut reader = UserReader::new(TreeReader::new(stream));

    assert_eq!(reader.next().unwrap(), Some(IonType::List));
    reader.step_in().unwrap();
    assert_eq!(reader.next().unwrap(), Some(IonType::Struct));
    assert!(reader
        .annotations()
        .iter()
        .any(|a| a.has_text("$ion_symbol_table")));
    reader.step_out().unwrap();

    // Die "Tabelle" wurde nicht angewendet: SID 10 bleibt unaufgeloest.
    assert_eq!(reader.next().unwrap(), Some(IonType::Symbol));
    assert_eq!(
        reader.string_value().unwrap_err(),
        Error::UnknownSymbolText { sid: 10 }
    );
}

/// Cursor-Missbrauch: `step_out` auf Tiefe 0 schlaegt fehl; nach einem
/// `step_in` funktioniert es und der Cursor steht hinter dem Container.
#[test]
fn step_out_misuse_and_recovery() {
    let stream = vec![
        Element::list([Element::int(1), Element::int(2)]),
        Element::string("after"),
    ];
    let mut reader = UserReader::new(TreeReader::new(stream));

    let err = reader.step_out().unwrap_err();
    assert!(matches!(
        err,
        Error::IllegalCursorState { operation: "step_out", .. }
    ));

    reader.next().unwrap();
    reader.step_in().unwrap();
    assert_eq!(reader.depth(), 1);
    reader.next().unwrap();
    reader.step_out().unwrap();
    assert_eq!(reader.depth(), 0);

    // Positioniert HINTER dem Container: der Rest der Liste wird
    // uebersprungen, erst ein frisches next() liefert den Folgewert.
    assert_eq!(reader.next().unwrap(), Some(IonType::String));
    assert_eq!(reader.string_value().unwrap().as_ref(), "after");
}

/// Ein Stream der nur aus Protokollwerten besteht ist aus Anwendersicht
/// leer.
#[test]
fn protocol_only_stream_is_empty() {
    let mut reader = UserReader::new(TreeReader::new(vec![ivm(), lst(&["a"]), ivm()]));
    assert_eq!(reader.next().unwrap(), None);
    assert!(!reader.has_next().unwrap());
}

/// Struct-Navigation mit Feldnamen aus der aktiven Tabelle.
#[test]
fn struct_navigation_with_resolved_field_names() {
    let stream = vec![
        lst(&["width", "height"]),
        Element::struct_of([
            (SymbolToken::with_sid(10), Element::int(640)),
            (SymbolToken::with_sid(11), Element::int(480)),
        ]),
    ];
    let mut reader = UserReader::new(TreeReader::new(stream));

    reader.next().unwrap();
    reader.step_in().unwrap();
    assert!(reader.is_in_struct());

    reader.next().unwrap();
    assert_eq!(reader.field_name().unwrap().text(), Some("width"));
    assert_eq!(reader.int_value().unwrap(), 640);

    reader.next().unwrap();
    assert_eq!(reader.field_name().unwrap().text(), Some("height"));
    assert_eq!(reader.int_value().unwrap(), 480);

    assert_eq!(reader.next().unwrap(), None);
    reader.step_out().unwrap();
    assert_eq!(reader.next().unwrap(), None);
}
