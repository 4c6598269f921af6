//! Column identity and row schemas.
//!
//! A [`RowSchema`] maps named columns to positions within a decoded row.
//! Columns declared at construction time form the *base* portion of the
//! schema; columns discovered while decoding are appended afterwards via
//! [`RowSchema::add_col`]. The base portion is what
//! [`RowSchema::field_name_by_position`] reports names from; positions past
//! it get a synthesized placeholder, so callers must tolerate placeholder
//! names when rendering.

use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use super::error::RowAccessError;

/// A named, comparable column identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnKey {
    name: String,
}

impl ColumnKey {
    pub fn new(name: impl Into<String>) -> Self {
        ColumnKey { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&str> for ColumnKey {
    fn from(name: &str) -> Self {
        ColumnKey::new(name)
    }
}

/// Mints anonymous column keys from a namespace-scoped counter.
///
/// Each builder owns its own counter, so independently constructed schemas
/// never contend on shared state and key sequences are reproducible per
/// namespace.
#[derive(Debug)]
pub struct ColumnKeyBuilder {
    namespace: String,
    next: u64,
}

impl ColumnKeyBuilder {
    pub fn new(namespace: impl Into<String>) -> Self {
        ColumnKeyBuilder {
            namespace: namespace.into(),
            next: 0,
        }
    }

    /// Returns the next anonymous key in this namespace.
    pub fn next_key(&mut self) -> ColumnKey {
        let key = ColumnKey::new(format!("__{}_{}", self.namespace, self.next));
        self.next += 1;
        key
    }
}

/// Name-to-position mapping for a record type.
///
/// Internally a single ordered column list: position equals list index, and
/// `base_cols` marks how many columns were fixed at construction. Key names
/// are unique across the whole schema.
#[derive(Debug, Clone)]
pub struct RowSchema {
    name: String,
    columns: Vec<ColumnKey>,
    index: HashMap<String, usize>,
    base_cols: usize,
    sealed: bool,
}

impl RowSchema {
    /// Builds a schema whose base columns are `keys`, positioned in order.
    ///
    /// Fails with [`RowAccessError::DuplicateColumn`] if two keys share a
    /// name.
    pub fn new(
        name: impl Into<String>,
        keys: Vec<ColumnKey>,
    ) -> Result<Self, RowAccessError> {
        let mut index = HashMap::with_capacity(keys.len());

        for (pos, key) in keys.iter().enumerate() {
            if index.insert(key.name().to_string(), pos).is_some() {
                return Err(RowAccessError::DuplicateColumn {
                    key: key.name().to_string(),
                });
            }
        }

        let base_cols = keys.len();

        Ok(RowSchema {
            name: name.into(),
            columns: keys,
            index,
            base_cols,
            sealed: false,
        })
    }

    /// Builds a schema with no base columns.
    pub fn empty(name: impl Into<String>) -> Self {
        RowSchema {
            name: name.into(),
            columns: Vec::new(),
            index: HashMap::new(),
            base_cols: 0,
            sealed: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position of `key`, or [`RowAccessError::ColumnNotFound`].
    pub fn col_num(&self, key: &ColumnKey) -> Result<usize, RowAccessError> {
        self.index
            .get(key.name())
            .copied()
            .ok_or_else(|| RowAccessError::ColumnNotFound {
                key: key.name().to_string(),
            })
    }

    pub fn has_column_key(&self, key: &ColumnKey) -> bool {
        self.index.contains_key(key.name())
    }

    /// Appends a column at position `pos`.
    ///
    /// `pos` must be the next free position (columns are contiguous). Fails
    /// with [`RowAccessError::DuplicateColumn`] if the name exists anywhere in
    /// the schema, and with [`RowAccessError::SchemaSealed`] once
    /// [`RowSchema::seal`] has been called.
    pub fn add_col(&mut self, key: ColumnKey, pos: usize) -> Result<(), RowAccessError> {
        if self.sealed {
            return Err(RowAccessError::SchemaSealed {
                schema: self.name.clone(),
            });
        }

        if pos != self.columns.len() {
            return Err(RowAccessError::PositionOutOfRange {
                pos,
                len: self.columns.len(),
            });
        }

        if self.index.contains_key(key.name()) {
            return Err(RowAccessError::DuplicateColumn {
                key: key.name().to_string(),
            });
        }

        self.index.insert(key.name().to_string(), pos);
        self.columns.push(key);

        Ok(())
    }

    /// Number of columns fixed at construction.
    pub fn num_base_cols(&self) -> usize {
        self.base_cols
    }

    /// Total number of columns, including appended ones.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Marks the schema as closed to further additions.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Name of the base column at `pos`, or a synthesized `Field_<pos>`
    /// placeholder when no base column maps there.
    ///
    /// Placeholder names are not stable across schema versions.
    pub fn field_name_by_position(&self, pos: usize) -> String {
        if pos < self.base_cols {
            self.columns[pos].name().to_string()
        } else {
            format!("Field_{}", pos)
        }
    }

    /// Iterator over all columns in position order.
    pub fn columns(&self) -> impl Iterator<Item = &ColumnKey> {
        self.columns.iter()
    }

    fn structural_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

impl PartialEq for RowSchema {
    fn eq(&self, other: &Self) -> bool {
        self.columns == other.columns && self.base_cols == other.base_cols
    }
}

impl Eq for RowSchema {}

impl Hash for RowSchema {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.base_cols.hash(state);
        for (pos, key) in self.columns.iter().enumerate() {
            key.name().hash(state);
            pos.hash(state);
        }
    }
}

impl PartialOrd for RowSchema {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Hash-derived ordering.
///
/// This is a well-defined total order consistent with `Eq` for use in sorted
/// containers. It is NOT a value ordering: it reflects neither declaration
/// order nor lexicographic column order.
impl Ord for RowSchema {
    fn cmp(&self, other: &Self) -> Ordering {
        if self == other {
            return Ordering::Equal;
        }

        match self.structural_hash().cmp(&other.structural_hash()) {
            Ordering::Equal => Ordering::Greater,
            ordering => ordering,
        }
    }
}

impl fmt::Display for RowSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let base: Vec<&str> = self.columns[..self.base_cols]
            .iter()
            .map(|k| k.name())
            .collect();
        let addendum: Vec<&str> = self.columns[self.base_cols..]
            .iter()
            .map(|k| k.name())
            .collect();
        write!(f, "base: {:?}, addendum: {:?}", base, addendum)
    }
}
