use thiserror::Error;

use crate::snapshot::SnapshotError;

/// Why [`crate::registry::UrlRegistry::shorten`] refused a URL.
#[derive(Debug, Error)]
pub enum ShortenError {
    /// The submitted URL was the empty string.
    #[error("url is required")]
    InvalidInput,

    /// Every generated candidate key was already taken.
    #[error("no free short key after {0} attempts")]
    KeySpaceExhausted(usize),
}

/// Errors from writing or loading a registry snapshot.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The snapshot file could not be opened, read or written.
    #[error("snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The snapshot file exists but is not a valid registry snapshot.
    #[error("invalid snapshot: {0}")]
    Format(#[from] SnapshotError),
}

impl PersistenceError {
    /// `true` when a hydrate failed only because no snapshot has been written yet.
    pub fn is_missing_snapshot(&self) -> bool {
        matches!(self, PersistenceError::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}
