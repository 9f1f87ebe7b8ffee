//! Central error types for the Ion 1.0 reader framework.
//!
//! Each variant references the relevant section of the Amazon Ion 1.0
//! specification (the Symbols document for table-protocol errors, the core
//! spec for cursor and encoding errors).

use core::fmt;
use std::borrow::Cow;

/// All error conditions surfaced by the reader framework.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// A symbol token or declaration was supplied with null or zero-length
    /// text where text is required (Ion Symbols: Symbol Representations).
    EmptySymbolText,
    /// A token resolves to a known SID but no known text (Ion Symbols:
    /// Symbol Resolution).
    ///
    /// Erwartbarer Datenzustand bei Streams mit nicht aufloesbaren Imports,
    /// kein Bug: SID-Zugriff bleibt gueltig, nur der Text-Zugriff schlaegt
    /// fehl.
    UnknownSymbolText {
        /// Der SID dessen Text nicht bekannt ist.
        sid: u32,
    },
    /// A depth-0 struct carrying the `$ion_symbol_table` annotation does not
    /// have the shape of a valid symbol table declaration (Ion Symbols:
    /// Local Symbol Tables).
    InvalidSymbolTable {
        /// Was an der Struktur nicht stimmte (leer wenn nicht verfügbar).
        detail: Cow<'static, str>,
    },
    /// A cursor operation was called in a state that does not permit it:
    /// `step_out` without a matching `step_in`, or a scalar accessor with no
    /// current value.
    IllegalCursorState {
        /// Die Operation die fehlschlug.
        operation: &'static str,
        /// Beschreibung des Zustands (leer wenn nicht verfügbar).
        detail: Cow<'static, str>,
    },
    /// A span was restored against a reader of a different kind than the one
    /// that produced it. Spans are not interchangeable across encodings.
    IncompatibleSpan {
        /// Kind des Readers der den Span erzeugt hat.
        produced_by: &'static str,
        /// Kind des Readers gegen den restauriert wurde.
        restored_against: &'static str,
    },
    /// The underlying source ended before a declared value was fully
    /// readable. Propagated unchanged from the system-level reader.
    TruncatedSource {
        /// Byte-/Zeichen-Offset an dem die Quelle endete (0 wenn unbekannt).
        offset: u64,
    },
    /// A symbol table was required but none was supplied. Only raised at
    /// call sites that need a table; helper APIs accept "no table" to mean
    /// text-only, unresolved.
    MissingSymbolTable,
    /// A scalar accessor was called on a value of a different type.
    TypeMismatch {
        /// Der Typ den der Accessor erwartet.
        expected: &'static str,
        /// Der tatsaechlich vorliegende Typ (leer wenn kein current value).
        actual: &'static str,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySymbolText => {
                write!(f, "symbol text must be non-empty (Ion Symbols)")
            }
            Self::UnknownSymbolText { sid } => {
                write!(f, "unknown text for SID {sid} (Ion Symbols: Symbol Resolution)")
            }
            Self::InvalidSymbolTable { detail } => {
                if detail.is_empty() {
                    write!(f, "invalid local symbol table (Ion Symbols: Local Symbol Tables)")
                } else {
                    write!(
                        f,
                        "invalid local symbol table: {detail} (Ion Symbols: Local Symbol Tables)"
                    )
                }
            }
            Self::IllegalCursorState { operation, detail } => {
                if detail.is_empty() {
                    write!(f, "illegal cursor state for {operation}")
                } else {
                    write!(f, "illegal cursor state for {operation}: {detail}")
                }
            }
            Self::IncompatibleSpan { produced_by, restored_against } => {
                write!(
                    f,
                    "span produced by a {produced_by} reader cannot be restored \
                     against a {restored_against} reader"
                )
            }
            Self::TruncatedSource { offset } => {
                if *offset == 0 {
                    write!(f, "source truncated inside a declared value")
                } else {
                    write!(f, "source truncated inside a declared value at offset {offset}")
                }
            }
            Self::MissingSymbolTable => {
                write!(f, "a symbol table is required here but none was supplied")
            }
            Self::TypeMismatch { expected, actual } => {
                if actual.is_empty() {
                    write!(f, "expected a value of type {expected}, but no value is current")
                } else {
                    write!(f, "expected a value of type {expected}, found {actual}")
                }
            }
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Erstellt einen `InvalidSymbolTable` Fehler mit Kontext.
    pub fn invalid_symbol_table(detail: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidSymbolTable { detail: detail.into() }
    }

    /// Erstellt einen `IllegalCursorState` Fehler mit Kontext.
    pub fn illegal_state(operation: &'static str, detail: impl Into<Cow<'static, str>>) -> Self {
        Self::IllegalCursorState {
            operation,
            detail: detail.into(),
        }
    }
}

/// A convenience `Result` type alias using [`Error`].
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    /// Every variant must produce a non-empty Display string carrying its
    /// distinguishing context.

    #[test]
    fn empty_symbol_text_display() {
        let e = Error::EmptySymbolText;
        let msg = e.to_string();
        assert!(msg.contains("non-empty"), "{msg}");
        assert!(msg.contains("Symbols"), "{msg}");
    }

    #[test]
    fn unknown_symbol_text_display() {
        let e = Error::UnknownSymbolText { sid: 15 };
        let msg = e.to_string();
        assert!(msg.contains("15"), "{msg}");
        assert!(msg.contains("Resolution"), "{msg}");
    }

    #[test]
    fn invalid_symbol_table_display() {
        let e = Error::invalid_symbol_table("");
        let msg = e.to_string();
        assert!(msg.contains("symbol table"), "{msg}");
        assert!(msg.contains("Local Symbol Tables"), "{msg}");
    }

    #[test]
    fn invalid_symbol_table_with_detail_display() {
        let e = Error::invalid_symbol_table("imports is not a list");
        let msg = e.to_string();
        assert!(msg.contains("imports is not a list"), "{msg}");
    }

    #[test]
    fn illegal_cursor_state_display() {
        let e = Error::illegal_state("step_out", "already at depth 0");
        let msg = e.to_string();
        assert!(msg.contains("step_out"), "{msg}");
        assert!(msg.contains("depth 0"), "{msg}");
    }

    #[test]
    fn incompatible_span_display() {
        let e = Error::IncompatibleSpan {
            produced_by: "offset",
            restored_against: "tree",
        };
        let msg = e.to_string();
        assert!(msg.contains("offset"), "{msg}");
        assert!(msg.contains("tree"), "{msg}");
    }

    #[test]
    fn truncated_source_display() {
        let e = Error::TruncatedSource { offset: 128 };
        let msg = e.to_string();
        assert!(msg.contains("truncated"), "{msg}");
        assert!(msg.contains("128"), "{msg}");
    }

    #[test]
    fn missing_symbol_table_display() {
        let e = Error::MissingSymbolTable;
        assert!(e.to_string().contains("symbol table"));
    }

    #[test]
    fn type_mismatch_display() {
        let e = Error::TypeMismatch { expected: "int", actual: "string" };
        let msg = e.to_string();
        assert!(msg.contains("int"), "{msg}");
        assert!(msg.contains("string"), "{msg}");
    }

    #[test]
    fn type_mismatch_without_current_value_display() {
        let e = Error::TypeMismatch { expected: "bool", actual: "" };
        let msg = e.to_string();
        assert!(msg.contains("no value is current"), "{msg}");
    }

    #[test]
    fn error_implements_std_error() {
        let e: Box<dyn std::error::Error> = Box::new(Error::EmptySymbolText);
        assert!(!e.to_string().is_empty());
    }

    #[test]
    fn error_is_clone_and_eq() {
        let e1 = Error::UnknownSymbolText { sid: 7 };
        let e2 = e1.clone();
        assert_eq!(e1, e2);
    }

    #[test]
    fn result_type_alias_works() {
        let ok: Result<u32> = Ok(42);
        assert_eq!(ok.unwrap(), 42);

        let err: Result<u32> = Err(Error::MissingSymbolTable);
        assert!(err.is_err());
    }
}
