//! Dynamic argument and return values.

use arrow::array::ArrayRef;
use std::collections::BTreeMap;
use std::fmt;

use crate::frame::{Frame, FrameRef, Series, SeriesRef, Shared};

/// Lookup key into a list, tuple or map value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ItemKey {
    None,
    Int(i64),
    Str(String),
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKey::None => write!(f, "None"),
            ItemKey::Int(i) => write!(f, "{}", i),
            ItemKey::Str(s) => write!(f, "'{}'", s),
        }
    }
}

impl From<i64> for ItemKey {
    fn from(value: i64) -> Self {
        ItemKey::Int(value)
    }
}

impl From<&str> for ItemKey {
    fn from(value: &str) -> Self {
        ItemKey::Str(value.to_string())
    }
}

impl From<String> for ItemKey {
    fn from(value: String) -> Self {
        ItemKey::Str(value)
    }
}

/// Any value a checked function receives or returns.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Tuple(Vec<Value>),
    Map(BTreeMap<ItemKey, Value>),
    Frame(FrameRef),
    Series(SeriesRef),
}

impl Value {
    /// Variant name used in messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::None => "None",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Float(_) => "Float",
            Value::Str(_) => "Str",
            Value::List(_) => "List",
            Value::Tuple(_) => "Tuple",
            Value::Map(_) => "Map",
            Value::Frame(_) => "Frame",
            Value::Series(_) => "Series",
        }
    }

    pub fn list<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    pub fn tuple<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::Tuple(items.into_iter().map(Into::into).collect())
    }

    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<ItemKey>,
        V: Into<Value>,
    {
        Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn as_frame(&self) -> Option<&FrameRef> {
        match self {
            Value::Frame(frame) => Some(frame),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Row count for tables, element count for containers and strings.
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::Frame(frame) => Some(frame.read().num_rows()),
            Value::Series(series) => Some(series.read().len()),
            Value::Str(s) => Some(s.chars().count()),
            Value::List(items) | Value::Tuple(items) => Some(items.len()),
            Value::Map(entries) => Some(entries.len()),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    /// Row index of a frame or series.
    pub fn index(&self) -> Option<ArrayRef> {
        match self {
            Value::Frame(frame) => Some(frame.read().index().clone()),
            Value::Series(series) => Some(series.read().index().clone()),
            _ => None,
        }
    }

    /// Reference identity. Only frames and series have identity.
    pub fn same_object(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Frame(a), Value::Frame(b)) => a.ptr_eq(b),
            (Value::Series(a), Value::Series(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Item lookup: position in a list/tuple (negative counts from the end)
    /// or key in a map.
    pub fn get_item(&self, key: &ItemKey) -> Option<Value> {
        match (self, key) {
            (Value::List(items) | Value::Tuple(items), ItemKey::Int(pos)) => {
                let len = items.len() as i64;
                let pos = if *pos < 0 { len + pos } else { *pos };
                if pos < 0 {
                    return None;
                }
                items.get(pos as usize).cloned()
            }
            (Value::Map(entries), key) => entries.get(key).cloned(),
            _ => None,
        }
    }
}

impl From<Frame> for Value {
    fn from(frame: Frame) -> Self {
        Value::Frame(Shared::new(frame))
    }
}

impl From<FrameRef> for Value {
    fn from(frame: FrameRef) -> Self {
        Value::Frame(frame)
    }
}

impl From<&FrameRef> for Value {
    fn from(frame: &FrameRef) -> Self {
        Value::Frame(frame.clone())
    }
}

impl From<Series> for Value {
    fn from(series: Series) -> Self {
        Value::Series(Shared::new(series))
    }
}

impl From<SeriesRef> for Value {
    fn from(series: SeriesRef) -> Self {
        Value::Series(series)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}
