//! Decoded column value types.
//!
//! [`DataItem`] is the scalar type carried by structured envelope fields;
//! [`RowValue`] is the per-encoding union a [`super::Row`] stores, with one
//! variant per source wire format.

use std::fmt;
use std::hash::{Hash, Hasher};

/// A scalar decoded from a structured envelope field.
#[derive(Debug, Clone, PartialEq)]
pub enum DataItem {
    Null,
    Boolean(bool),
    Byte(i8),
    Short(i16),
    Integer(i32),
    Long(i64),
    Double(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl DataItem {
    /// Wire type tags, one per variant.
    pub const TAG_NULL: u8 = 0;
    pub const TAG_BOOLEAN: u8 = 1;
    pub const TAG_BYTE: u8 = 2;
    pub const TAG_SHORT: u8 = 3;
    pub const TAG_INTEGER: u8 = 4;
    pub const TAG_LONG: u8 = 5;
    pub const TAG_DOUBLE: u8 = 6;
    pub const TAG_TEXT: u8 = 7;
    pub const TAG_BYTES: u8 = 8;

    pub fn type_tag(&self) -> u8 {
        match self {
            DataItem::Null => Self::TAG_NULL,
            DataItem::Boolean(_) => Self::TAG_BOOLEAN,
            DataItem::Byte(_) => Self::TAG_BYTE,
            DataItem::Short(_) => Self::TAG_SHORT,
            DataItem::Integer(_) => Self::TAG_INTEGER,
            DataItem::Long(_) => Self::TAG_LONG,
            DataItem::Double(_) => Self::TAG_DOUBLE,
            DataItem::Text(_) => Self::TAG_TEXT,
            DataItem::Bytes(_) => Self::TAG_BYTES,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, DataItem::Null)
    }

    /// JSON rendering of the value.
    ///
    /// Byte payloads are rendered as lossy UTF-8 text, matching how opaque
    /// values are surfaced to listings.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            DataItem::Null => serde_json::Value::Null,
            DataItem::Boolean(b) => serde_json::Value::from(*b),
            DataItem::Byte(v) => serde_json::Value::from(*v),
            DataItem::Short(v) => serde_json::Value::from(*v),
            DataItem::Integer(v) => serde_json::Value::from(*v),
            DataItem::Long(v) => serde_json::Value::from(*v),
            DataItem::Double(v) => serde_json::Value::from(*v),
            DataItem::Text(s) => serde_json::Value::from(s.as_str()),
            DataItem::Bytes(b) => {
                serde_json::Value::from(String::from_utf8_lossy(b).into_owned())
            }
        }
    }
}

impl fmt::Display for DataItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataItem::Null => write!(f, "null"),
            DataItem::Boolean(b) => write!(f, "{}", b),
            DataItem::Byte(v) => write!(f, "{}", v),
            DataItem::Short(v) => write!(f, "{}", v),
            DataItem::Integer(v) => write!(f, "{}", v),
            DataItem::Long(v) => write!(f, "{}", v),
            DataItem::Double(v) => write!(f, "{}", v),
            DataItem::Text(s) => write!(f, "{}", s),
            DataItem::Bytes(b) => write!(f, "{}", String::from_utf8_lossy(b)),
        }
    }
}

/// Hash over the discriminant plus the value. Doubles hash their bit pattern
/// so NaN and signed zero are stable.
impl Hash for DataItem {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);

        match self {
            DataItem::Null => {}
            DataItem::Boolean(b) => b.hash(state),
            DataItem::Byte(v) => v.hash(state),
            DataItem::Short(v) => v.hash(state),
            DataItem::Integer(v) => v.hash(state),
            DataItem::Long(v) => v.hash(state),
            DataItem::Double(v) => v.to_bits().hash(state),
            DataItem::Text(s) => s.hash(state),
            DataItem::Bytes(b) => b.hash(state),
        }
    }
}

/// A decoded column value, one variant per source encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum RowValue {
    /// Structured envelope field value.
    Item(DataItem),
    /// Self-describing (tree-shaped) payload child.
    Node(serde_json::Value),
    /// Delimited text column.
    Text(String),
    /// Opaque container payload.
    Raw(Vec<u8>),
}

impl RowValue {
    pub fn is_null(&self) -> bool {
        match self {
            RowValue::Item(item) => item.is_null(),
            RowValue::Node(node) => node.is_null(),
            RowValue::Text(_) | RowValue::Raw(_) => false,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            RowValue::Item(item) => item.to_json(),
            RowValue::Node(node) => node.clone(),
            RowValue::Text(s) => serde_json::Value::from(s.as_str()),
            RowValue::Raw(b) => {
                serde_json::Value::from(String::from_utf8_lossy(b).into_owned())
            }
        }
    }
}

impl fmt::Display for RowValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowValue::Item(item) => write!(f, "{}", item),
            RowValue::Node(node) => write!(f, "{}", node),
            RowValue::Text(s) => write!(f, "{}", s),
            RowValue::Raw(b) => write!(f, "{}", String::from_utf8_lossy(b)),
        }
    }
}
