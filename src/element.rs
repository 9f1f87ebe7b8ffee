//! Immutable in-memory value model (Ion data model).
//!
//! This is deliberately a minimal tree: enough for the tree-backed system
//! reader, for materializing symbol table declarations, and for tests. It is
//! not a DOM — values never mutate, carry no parent links, and share
//! children via `Rc` so a span can retain a node without keeping a reader
//! alive.

use std::rc::Rc;

use crate::symbol::SymbolToken;

/// The thirteen Ion value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IonType {
    Null,
    Bool,
    Int,
    Float,
    Decimal,
    Timestamp,
    Symbol,
    String,
    Clob,
    Blob,
    List,
    Sexp,
    Struct,
}

impl IonType {
    /// Kleingeschriebener Typname fuer Fehlermeldungen.
    pub fn name(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Decimal => "decimal",
            Self::Timestamp => "timestamp",
            Self::Symbol => "symbol",
            Self::String => "string",
            Self::Clob => "clob",
            Self::Blob => "blob",
            Self::List => "list",
            Self::Sexp => "sexp",
            Self::Struct => "struct",
        }
    }

    /// True fuer list, sexp und struct.
    pub fn is_container(self) -> bool {
        matches!(self, Self::List | Self::Sexp | Self::Struct)
    }
}

/// An exact decimal: `coefficient * 10^exponent`.
///
/// Gleichheit ist Repraesentations-Gleichheit (1.0 ≠ 1.00), wie im Ion
/// Datenmodell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decimal {
    /// Der Koeffizient (vorzeichenbehaftet).
    pub coefficient: i64,
    /// Der Zehnerexponent.
    pub exponent: i32,
}

/// Timestamp precision, from year down to fractional seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TimestampPrecision {
    Year,
    Month,
    Day,
    Minute,
    Second,
}

/// A point in time with explicit precision and optional UTC offset.
///
/// Komponenten jenseits der Precision sind 0 und nicht signifikant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    pub year: i32,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    /// Millisekunden-Anteil (nur bei Precision `Second` signifikant).
    pub millis: u16,
    /// Offset zu UTC in Minuten; `None` = unbekannter Offset.
    pub offset_minutes: Option<i16>,
    pub precision: TimestampPrecision,
}

impl Timestamp {
    /// Timestamp mit Tages-Precision.
    pub fn from_ymd(year: i32, month: u8, day: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour: 0,
            minute: 0,
            second: 0,
            millis: 0,
            offset_minutes: None,
            precision: TimestampPrecision::Day,
        }
    }
}

/// The content of a value, without annotations.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Typed null (`null`, `null.int`, ...).
    Null(IonType),
    Bool(bool),
    /// Ion int. Begrenzt auf i64; beliebige Praezision ist Sache der
    /// Tokenizer-Kollaborateure.
    Int(i64),
    Float(f64),
    Decimal(Decimal),
    Timestamp(Timestamp),
    String(Rc<str>),
    Symbol(SymbolToken),
    Clob(Rc<[u8]>),
    Blob(Rc<[u8]>),
    List(Vec<Rc<Element>>),
    Sexp(Vec<Rc<Element>>),
    Struct(Vec<(SymbolToken, Rc<Element>)>),
}

impl Value {
    /// Der Ion-Typ dieses Inhalts.
    pub fn ion_type(&self) -> IonType {
        match self {
            Self::Null(t) => *t,
            Self::Bool(_) => IonType::Bool,
            Self::Int(_) => IonType::Int,
            Self::Float(_) => IonType::Float,
            Self::Decimal(_) => IonType::Decimal,
            Self::Timestamp(_) => IonType::Timestamp,
            Self::String(_) => IonType::String,
            Self::Symbol(_) => IonType::Symbol,
            Self::Clob(_) => IonType::Clob,
            Self::Blob(_) => IonType::Blob,
            Self::List(_) => IonType::List,
            Self::Sexp(_) => IonType::Sexp,
            Self::Struct(_) => IonType::Struct,
        }
    }
}

/// A value plus its annotations — one node of the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    annotations: Vec<SymbolToken>,
    value: Value,
}

impl Element {
    /// Wert ohne Annotationen.
    pub fn new(value: Value) -> Self {
        Self { annotations: Vec::new(), value }
    }

    /// Wert mit Annotationen.
    pub fn annotated(annotations: Vec<SymbolToken>, value: Value) -> Self {
        Self { annotations, value }
    }

    /// The value's type; for a typed null, the null's type.
    pub fn ion_type(&self) -> IonType {
        self.value.ion_type()
    }

    /// True for any null, regardless of the null's type.
    pub fn is_null(&self) -> bool {
        matches!(self.value, Value::Null(_))
    }

    /// The annotations in declaration order.
    pub fn annotations(&self) -> &[SymbolToken] {
        &self.annotations
    }

    /// True wenn eine Annotation den Text `text` hat.
    pub fn has_annotation(&self, text: &str) -> bool {
        self.annotations.iter().any(|a| a.has_text(text))
    }

    /// The content.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Anzahl Kinder eines Containers, `None` fuer Skalare und Nulls.
    pub fn container_len(&self) -> Option<usize> {
        match &self.value {
            Value::List(items) | Value::Sexp(items) => Some(items.len()),
            Value::Struct(fields) => Some(fields.len()),
            _ => None,
        }
    }

    /// Kind `index` eines Containers mit optionalem Feldnamen (nur Structs
    /// haben Feldnamen).
    pub fn child(&self, index: usize) -> Option<(Option<&SymbolToken>, &Rc<Element>)> {
        match &self.value {
            Value::List(items) | Value::Sexp(items) => {
                items.get(index).map(|e| (None, e))
            }
            Value::Struct(fields) => fields.get(index).map(|(name, e)| (Some(name), e)),
            _ => None,
        }
    }

    /// Erstes Feld mit Namen `name` (Structs koennen wiederholte Feldnamen
    /// haben; hier gewinnt das erste).
    pub fn field(&self, name: &str) -> Option<&Rc<Element>> {
        match &self.value {
            Value::Struct(fields) => fields
                .iter()
                .find(|(tok, _)| tok.has_text(name))
                .map(|(_, e)| e),
            _ => None,
        }
    }

    // === Convenience constructors (Testdaten, Tabellen-Strukturen) ===

    /// `null` bzw. typed null.
    pub fn null(of_type: IonType) -> Self {
        Self::new(Value::Null(of_type))
    }

    /// Bool-Wert.
    pub fn bool(value: bool) -> Self {
        Self::new(Value::Bool(value))
    }

    /// Int-Wert.
    pub fn int(value: i64) -> Self {
        Self::new(Value::Int(value))
    }

    /// String-Wert.
    pub fn string(value: impl Into<Rc<str>>) -> Self {
        Self::new(Value::String(value.into()))
    }

    /// Symbol mit bekanntem Text.
    pub fn symbol(token: SymbolToken) -> Self {
        Self::new(Value::Symbol(token))
    }

    /// Liste aus Elementen.
    pub fn list(items: impl IntoIterator<Item = Element>) -> Self {
        Self::new(Value::List(items.into_iter().map(Rc::new).collect()))
    }

    /// S-Expression aus Elementen.
    pub fn sexp(items: impl IntoIterator<Item = Element>) -> Self {
        Self::new(Value::Sexp(items.into_iter().map(Rc::new).collect()))
    }

    /// Struct aus `(feldname, wert)`-Paaren.
    pub fn struct_of(
        fields: impl IntoIterator<Item = (SymbolToken, Element)>,
    ) -> Self {
        Self::new(Value::Struct(
            fields.into_iter().map(|(n, e)| (n, Rc::new(e))).collect(),
        ))
    }
}
