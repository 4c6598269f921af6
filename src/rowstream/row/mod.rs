//! The decoded record model: rows, row schemas and column values.
//!
//! A [`Row`] is one decoded record: an ordered sequence of [`RowValue`]s plus
//! a reference to the [`RowSchema`] that names and positions them. Many rows
//! decoded from the same file typically share one schema instance.

pub mod error;
pub mod schema;
pub mod types;

pub use error::RowAccessError;
pub use schema::{ColumnKey, ColumnKeyBuilder, RowSchema};
pub use types::{DataItem, RowValue};

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Record-type tag used for rows that carry no inferable type of their own.
pub const AD_HOC_TYPE: &str = "ad-hoc";

/// Column name under which raw (undecoded) record contents are surfaced.
pub const RAW_RECORD_COLUMN: &str = "record";

/// One decoded record: a schema reference plus its ordered column values.
///
/// A row exclusively owns its value sequence and shares its schema. It is
/// immutable except for [`Row::add_col`], which appends a value and registers
/// the matching column in one step.
#[derive(Debug, Clone)]
pub struct Row {
    schema: Arc<RowSchema>,
    values: Vec<RowValue>,
}

impl Row {
    pub fn new(schema: Arc<RowSchema>, values: Vec<RowValue>) -> Self {
        Row { schema, values }
    }

    /// An empty row over a fresh, unshared schema.
    pub fn with_schema(schema: RowSchema) -> Self {
        Row {
            schema: Arc::new(schema),
            values: Vec::new(),
        }
    }

    pub fn schema(&self) -> &RowSchema {
        &self.schema
    }

    /// The record-type tag this row was decoded under.
    pub fn type_name(&self) -> &str {
        self.schema.name()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[RowValue] {
        &self.values
    }

    pub fn has_key(&self, key: &ColumnKey) -> bool {
        self.schema.has_column_key(key)
    }

    /// The value stored under `key`.
    pub fn get(&self, key: &ColumnKey) -> Result<&RowValue, RowAccessError> {
        let pos = self.schema.col_num(key)?;

        self.values
            .get(pos)
            .ok_or(RowAccessError::PositionOutOfRange {
                pos,
                len: self.values.len(),
            })
    }

    /// Appends `value` and registers `key` for it in the schema.
    ///
    /// The column and the value are added together or not at all. When the
    /// schema is shared with other rows it is copied first, so siblings never
    /// observe a column without a backing value.
    pub fn add_col(
        &mut self,
        key: ColumnKey,
        value: RowValue,
    ) -> Result<&mut Self, RowAccessError> {
        let pos = self.values.len();

        Arc::make_mut(&mut self.schema).add_col(key, pos)?;
        self.values.push(value);

        Ok(self)
    }

    /// Renders the row as a JSON object keyed by column name.
    ///
    /// Positions past the schema's base columns surface under synthesized
    /// placeholder names.
    pub fn to_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::with_capacity(self.values.len());

        for (pos, value) in self.values.iter().enumerate() {
            map.insert(self.schema.field_name_by_position(pos), value.to_json());
        }

        serde_json::Value::Object(map)
    }

    /// Joins the row's values with `delimiter`.
    pub fn delimited(&self, delimiter: &str) -> String {
        let rendered: Vec<String> = self.values.iter().map(|v| v.to_string()).collect();
        rendered.join(delimiter)
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.delimited(","))
    }
}

impl PartialEq for Row {
    fn eq(&self, other: &Self) -> bool {
        self.schema == other.schema && self.values == other.values
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;

        for (pos, value) in self.values.iter().enumerate() {
            map.serialize_entry(&self.schema.field_name_by_position(pos), &value.to_json())?;
        }

        map.end()
    }
}

/// A transient FIFO of decoded rows, produced by one decode step.
#[derive(Debug, Default)]
pub struct Rows {
    rows: VecDeque<Row>,
}

impl Rows {
    pub fn new() -> Self {
        Rows::default()
    }

    pub fn add(&mut self, row: Row) {
        self.rows.push_back(row);
    }

    pub fn add_all(&mut self, rows: Rows) {
        self.rows.extend(rows.rows);
    }

    /// Removes and returns the oldest row.
    pub fn poll(&mut self) -> Option<Row> {
        self.rows.pop_front()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }
}

impl IntoIterator for Rows {
    type Item = Row;
    type IntoIter = std::collections::vec_deque::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl FromIterator<Row> for Rows {
    fn from_iter<I: IntoIterator<Item = Row>>(iter: I) -> Self {
        Rows {
            rows: iter.into_iter().collect(),
        }
    }
}
