//! Shared error types for the services crate.

use std::path::PathBuf;

use thiserror::Error;

use progress_core::{LockViolation, ResolveError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `ProgressStore`.
///
/// A corrupt persisted record is not an error: the store resets it.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("failed to serialize progress: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Locked(#[from] LockViolation),
}

/// Failures fetching or preparing one module document.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContentError {
    #[error("HTTP {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported content URL: {0}")]
    UnsupportedUrl(String),
    #[error("document has no content")]
    MissingRegion,
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Errors emitted by `PhaseNavigator`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum NavigationError {
    #[error(transparent)]
    Locked(#[from] LockViolation),
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

impl NavigationError {
    /// The lock notice to show, when this is an expected lock refusal.
    #[must_use]
    pub fn lock_violation(&self) -> Option<&LockViolation> {
        match self {
            NavigationError::Locked(violation)
            | NavigationError::Progress(ProgressError::Locked(violation)) => Some(violation),
            _ => None,
        }
    }
}

/// Errors emitted by `DriveFetcher`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DriveError {
    #[error("no file id in share link: {0}")]
    InvalidShareUrl(String),
    #[error("access denied by the file host; ensure sharing is set to anyone with the link")]
    AccessDenied,
    #[error("drive request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("redirect without a usable Location header")]
    BadRedirect,
    #[error("too many redirects")]
    TooManyRedirects,
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error(transparent)]
    Drive(#[from] DriveError),
}
