//! Symbol tokens and the Ion 1.0 system symbols (Ion Symbols: System Symbols).
//!
//! A symbol token names a value by text and/or a small integer SID. After
//! resolution against a symbol table at least one side is known; a token with
//! neither is invalid and cannot be constructed through this module.

use std::rc::Rc;

use crate::error::{Error, Result};
use crate::symtab::SymbolTable;

// === System symbols (Ion Symbols: System Symbols, Table of SIDs 1-9) ===

/// `$ion` (SID 1).
pub const SID_ION: u32 = 1;
/// `$ion_1_0` (SID 2) — der Version Marker.
pub const SID_ION_1_0: u32 = 2;
/// `$ion_symbol_table` (SID 3) — Annotation für Local Symbol Tables.
pub const SID_ION_SYMBOL_TABLE: u32 = 3;
/// `name` (SID 4).
pub const SID_NAME: u32 = 4;
/// `version` (SID 5).
pub const SID_VERSION: u32 = 5;
/// `imports` (SID 6).
pub const SID_IMPORTS: u32 = 6;
/// `symbols` (SID 7).
pub const SID_SYMBOLS: u32 = 7;
/// `max_id` (SID 8).
pub const SID_MAX_ID: u32 = 8;
/// `$ion_shared_symbol_table` (SID 9) — Annotation für Shared Symbol Tables.
pub const SID_ION_SHARED_SYMBOL_TABLE: u32 = 9;

/// Text of the version marker symbol.
pub const TEXT_ION_1_0: &str = "$ion_1_0";
/// Text of the local-symbol-table annotation.
pub const TEXT_ION_SYMBOL_TABLE: &str = "$ion_symbol_table";

/// Die neun Ion 1.0 System-Symbole, indiziert SID-1.
pub(crate) const SYSTEM_SYMBOLS_1_0: [&str; 9] = [
    "$ion",
    "$ion_1_0",
    "$ion_symbol_table",
    "name",
    "version",
    "imports",
    "symbols",
    "max_id",
    "$ion_shared_symbol_table",
];

// === SymbolToken ===

/// A name represented as a (text, SID) pair, at least one side known.
///
/// Zwei Tokens sind gleich wenn ihr aufgeloester Text uebereinstimmt. Sind
/// beide Texte unbekannt, wird als letzter Ausweg der SID verglichen — das
/// ist verlustbehaftet (verschiedene Tabellen koennen denselben SID anders
/// belegen) und nur fuer Tokens aus demselben Resolutionskontext korrekt.
#[derive(Debug, Clone, Eq)]
pub struct SymbolToken {
    text: Option<Rc<str>>,
    sid: Option<u32>,
}

impl SymbolToken {
    /// Erstellt ein Token aus Text. Fehler bei leerem Text.
    pub fn with_text(text: impl Into<Rc<str>>) -> Result<Self> {
        let text = text.into();
        if text.is_empty() {
            return Err(Error::EmptySymbolText);
        }
        Ok(Self { text: Some(text), sid: None })
    }

    /// Erstellt ein Token aus einem SID ohne bekannten Text.
    pub fn with_sid(sid: u32) -> Self {
        Self { text: None, sid: Some(sid) }
    }

    /// Erstellt ein voll aufgeloestes Token (Text und SID bekannt).
    pub fn resolved(text: impl Into<Rc<str>>, sid: u32) -> Result<Self> {
        let text = text.into();
        if text.is_empty() {
            return Err(Error::EmptySymbolText);
        }
        Ok(Self { text: Some(text), sid: Some(sid) })
    }

    /// Interner Konstruktor ohne Leerheits-Pruefung. Fuer Slots die aus
    /// einer serialisierten Tabelle uebernommen wurden (Text darf fehlen,
    /// SID zaehlt trotzdem).
    pub(crate) fn from_parts(text: Option<Rc<str>>, sid: Option<u32>) -> Self {
        debug_assert!(text.is_some() || sid.is_some());
        Self { text, sid }
    }

    /// The token's text, if known.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// The token's text as a shared `Rc<str>` (Refcount-Increment statt Kopie).
    pub fn text_rc(&self) -> Option<Rc<str>> {
        self.text.clone()
    }

    /// The token's SID, if known.
    pub fn sid(&self) -> Option<u32> {
        self.sid
    }

    /// The token's text, or `UnknownSymbolText` carrying the SID.
    ///
    /// SID-Zugriff via [`SymbolToken::sid`] bleibt auch dann gueltig — das
    /// ist der normale Zustand bei nicht aufloesbaren Imports, kein Fehler
    /// des Streams.
    pub fn text_or_error(&self) -> Result<&str> {
        match self.text.as_deref() {
            Some(text) => Ok(text),
            None => Err(Error::UnknownSymbolText { sid: self.sid.unwrap_or(0) }),
        }
    }

    /// True wenn der Text dieses Tokens `expected` ist.
    pub fn has_text(&self, expected: &str) -> bool {
        self.text.as_deref() == Some(expected)
    }
}

impl PartialEq for SymbolToken {
    fn eq(&self, other: &Self) -> bool {
        match (self.text.as_deref(), other.text.as_deref()) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self.sid == other.sid,
            _ => false,
        }
    }
}

// === Localization (Symbol Resolution) ===

/// Resolves a raw token against a symbol table: fills in missing text,
/// discards SIDs the table cannot vouch for.
///
/// `symtab = None` bedeutet "text-only, unaufgeloest" und ist hier erlaubt;
/// nur der SID wird dann verworfen, weil ihm ohne Tabelle nicht zu trauen
/// ist.
pub fn localize(symtab: Option<&SymbolTable>, token: &SymbolToken) -> SymbolToken {
    match symtab {
        Some(table) => {
            match token.text() {
                None => {
                    let sid = token.sid().unwrap_or(0);
                    match table.find_known_symbol(sid) {
                        Some(text) => SymbolToken::from_parts(Some(text), Some(sid)),
                        None => token.clone(),
                    }
                }
                Some(text) => {
                    if let Some(found) = table.find(text) {
                        found
                    } else if token.sid().is_some() {
                        // Dem SID ist nicht zu trauen — verwerfen.
                        SymbolToken::from_parts(token.text_rc(), None)
                    } else {
                        token.clone()
                    }
                }
            }
        }
        None => {
            if token.text().is_some() && token.sid().is_some() {
                SymbolToken::from_parts(token.text_rc(), None)
            } else {
                token.clone()
            }
        }
    }
}

/// Localizes a slice of raw tokens (annotations, typically) in one pass.
pub fn localize_all(symtab: Option<&SymbolTable>, tokens: &[SymbolToken]) -> Vec<SymbolToken> {
    tokens.iter().map(|t| localize(symtab, t)).collect()
}

/// Extracts the text of every token, failing on the first one without text.
pub fn to_texts(tokens: &[SymbolToken]) -> Result<Vec<Rc<str>>> {
    tokens
        .iter()
        .map(|t| {
            t.text_rc()
                .ok_or(Error::UnknownSymbolText { sid: t.sid().unwrap_or(0) })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symtab::SymbolTable;

    #[test]
    fn with_text_rejects_empty() {
        assert_eq!(SymbolToken::with_text(""), Err(Error::EmptySymbolText));
    }

    #[test]
    fn with_sid_has_no_text() {
        let t = SymbolToken::with_sid(15);
        assert_eq!(t.sid(), Some(15));
        assert_eq!(t.text(), None);
    }

    /// SID-only Token: Text-Zugriff schlaegt mit dem SID fehl, SID-Zugriff
    /// funktioniert weiterhin.
    #[test]
    fn unknown_text_carries_sid() {
        let t = SymbolToken::with_sid(15);
        assert_eq!(t.text_or_error(), Err(Error::UnknownSymbolText { sid: 15 }));
        assert_eq!(t.sid(), Some(15));
    }

    #[test]
    fn equality_prefers_text() {
        let a = SymbolToken::resolved("abc", 10).unwrap();
        let b = SymbolToken::resolved("abc", 99).unwrap();
        assert_eq!(a, b); // gleicher Text, SIDs egal
    }

    #[test]
    fn equality_text_beats_sid() {
        let a = SymbolToken::resolved("abc", 10).unwrap();
        let b = SymbolToken::resolved("xyz", 10).unwrap();
        assert_ne!(a, b);
    }

    /// Letzter Ausweg: beide Texte unbekannt → SID-Vergleich.
    #[test]
    fn equality_sid_last_resort() {
        assert_eq!(SymbolToken::with_sid(12), SymbolToken::with_sid(12));
        assert_ne!(SymbolToken::with_sid(12), SymbolToken::with_sid(13));
    }

    #[test]
    fn text_known_vs_unknown_not_equal() {
        let a = SymbolToken::resolved("abc", 12).unwrap();
        let b = SymbolToken::with_sid(12);
        assert_ne!(a, b);
    }

    #[test]
    fn localize_fills_in_system_text() {
        let system = SymbolTable::system_1_0();
        let raw = SymbolToken::with_sid(SID_ION_1_0);
        let local = localize(Some(&system), &raw);
        assert_eq!(local.text(), Some(TEXT_ION_1_0));
        assert_eq!(local.sid(), Some(SID_ION_1_0));
    }

    #[test]
    fn localize_discards_untrusted_sid() {
        let system = SymbolTable::system_1_0();
        // Text den die Tabelle nicht kennt, mit behauptetem SID.
        let raw = SymbolToken::resolved("not_a_system_symbol", 42).unwrap();
        let local = localize(Some(&system), &raw);
        assert_eq!(local.text(), Some("not_a_system_symbol"));
        assert_eq!(local.sid(), None);
    }

    #[test]
    fn localize_without_table_discards_sid() {
        let raw = SymbolToken::resolved("abc", 42).unwrap();
        let local = localize(None, &raw);
        assert_eq!(local.text(), Some("abc"));
        assert_eq!(local.sid(), None);
    }

    #[test]
    fn localize_without_table_keeps_sid_only_token() {
        let raw = SymbolToken::with_sid(42);
        let local = localize(None, &raw);
        assert_eq!(local.sid(), Some(42));
        assert_eq!(local.text(), None);
    }

    #[test]
    fn to_texts_fails_on_unknown() {
        let tokens = vec![
            SymbolToken::resolved("a", 10).unwrap(),
            SymbolToken::with_sid(11),
        ];
        assert_eq!(to_texts(&tokens), Err(Error::UnknownSymbolText { sid: 11 }));
    }

    #[test]
    fn system_symbol_order() {
        assert_eq!(SYSTEM_SYMBOLS_1_0[(SID_ION_1_0 - 1) as usize], TEXT_ION_1_0);
        assert_eq!(
            SYSTEM_SYMBOLS_1_0[(SID_ION_SYMBOL_TABLE - 1) as usize],
            TEXT_ION_SYMBOL_TABLE
        );
        assert_eq!(SYSTEM_SYMBOLS_1_0.len(), 9);
    }
}
