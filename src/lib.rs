//! axion – Amazon Ion 1.0 streaming reader framework
//!
//! Cursor-basierte Navigation ueber hierarchische Ion-Werte mit
//! transparenter Symboltabellen-Verarbeitung: Version Marker und
//! `$ion_symbol_table`-Structs werden auf Tiefe 0 unsichtbar konsumiert,
//! der Aufrufer sieht nur Anwendungswerte mit aufgeloesten Symbolen.
//! Positionen lassen sich als [`span::Span`] einfangen und spaeter
//! wiederherstellen.
//!
//! Die Byte- und Text-Tokenizer sind externe Kollaborateure hinter dem
//! [`reader::SystemReader`]-Trait; enthalten ist der Baum-Reader
//! ([`reader::TreeReader`]) ueber das unveraenderliche Wertemodell in
//! [`element`].
//!
//! # Beispiel
//!
//! ```
//! use axion::element::Element;
//! use axion::reader::{TreeReader, UserReader};
//! use axion::{IonType, SymbolToken};
//!
//! // Ein Stream: Version Marker, dann ein Anwendungswert.
//! let stream = vec![
//!     Element::symbol(SymbolToken::with_text("$ion_1_0").unwrap()),
//!     Element::string("hello"),
//! ];
//! let mut reader = UserReader::new(TreeReader::new(stream));
//!
//! assert_eq!(reader.next().unwrap(), Some(IonType::String));
//! assert_eq!(reader.string_value().unwrap().as_ref(), "hello");
//! assert_eq!(reader.next().unwrap(), None);
//! ```

pub mod catalog;
pub mod element;
pub mod error;
pub mod reader;
pub mod span;
pub mod symbol;
pub mod symtab;

pub use element::IonType;
pub use error::{Error, Result};
pub use symbol::SymbolToken;

/// HashMap mit ahash (schneller, nicht DoS-resistent — für interne
/// Datenstrukturen wie Symbol-Lookups).
pub(crate) type FastHashMap<K, V> = hashbrown::HashMap<K, V, ahash::RandomState>;
