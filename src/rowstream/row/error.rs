//! Error types for the row data model

/// Errors raised by schema and row column access.
///
/// These are programming errors in the caller (a lookup against a column that
/// was never declared, or a declaration that collides with an existing one)
/// and are never retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowAccessError {
    /// The key is absent from the schema.
    ColumnNotFound { key: String },
    /// The key already exists in the schema.
    DuplicateColumn { key: String },
    /// A column position does not map into the row's value sequence.
    PositionOutOfRange { pos: usize, len: usize },
    /// The schema has been sealed and no longer accepts additions.
    SchemaSealed { schema: String },
}

impl std::fmt::Display for RowAccessError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowAccessError::ColumnNotFound { key } => {
                write!(f, "unable to map column {}", key)
            }
            RowAccessError::DuplicateColumn { key } => {
                write!(f, "cannot add duplicate key: {}", key)
            }
            RowAccessError::PositionOutOfRange { pos, len } => {
                write!(
                    f,
                    "column position {} is out of range for {} value(s)",
                    pos, len
                )
            }
            RowAccessError::SchemaSealed { schema } => {
                write!(f, "schema {} is sealed and cannot accept new columns", schema)
            }
        }
    }
}

impl std::error::Error for RowAccessError {}
