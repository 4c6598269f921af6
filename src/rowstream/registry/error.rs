//! Error types for registry lookups and snapshot persistence.

/// Errors from the disk snapshot of resolved schemas.
#[derive(Debug)]
pub enum SnapshotError {
    /// The on-disk document carries an unsupported version. There is no
    /// silent migration; this is fatal at startup.
    IncompatibleVersion { found: u32 },
    Io { path: String, message: String },
    Format { path: String, message: String },
}

impl std::fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotError::IncompatibleVersion { found } => {
                write!(f, "incompatible snapshot version {}", found)
            }
            SnapshotError::Io { path, message } => {
                write!(f, "snapshot io failure at {}: {}", path, message)
            }
            SnapshotError::Format { path, message } => {
                write!(f, "malformed snapshot at {}: {}", path, message)
            }
        }
    }
}

impl std::error::Error for SnapshotError {}

/// Errors from talking to the remote schema service.
///
/// These never escape `resolve` (the client degrades to cached data) but
/// they are reported by `connect` and logged elsewhere.
#[derive(Debug)]
pub enum RegistryError {
    Http { url: String, message: String },
    UnexpectedPayload { url: String, message: String },
    Snapshot(SnapshotError),
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::Http { url, message } => {
                write!(f, "registry request to {} failed: {}", url, message)
            }
            RegistryError::UnexpectedPayload { url, message } => {
                write!(f, "unexpected registry payload from {}: {}", url, message)
            }
            RegistryError::Snapshot(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for RegistryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RegistryError::Snapshot(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SnapshotError> for RegistryError {
    fn from(err: SnapshotError) -> Self {
        RegistryError::Snapshot(err)
    }
}
