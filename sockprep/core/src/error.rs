//! Socket Preparation Errors
//!
//! Every failure names the operation that failed (the variant), the path
//! involved, and the underlying platform error. Nothing here is retried;
//! the caller decides whether to log and abort.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::platform::EntryKind;

/// Errors returned by the socket cleaner and the permission mask setter
#[derive(Debug, Error)]
pub enum SocketError {
    /// The existence/type probe failed for a reason other than non-existence
    #[error("failed to lstat the socket {path:?}: {source}")]
    Probe {
        /// The path that was probed
        path: PathBuf,
        /// The underlying IO error
        #[source]
        source: io::Error,
    },

    /// The entry existed but could not be removed
    #[error("failed to remove stale socket {path:?}: {source}")]
    Remove {
        /// The path that was being removed
        path: PathBuf,
        /// The underlying IO error
        #[source]
        source: io::Error,
    },

    /// The entry exists but is not a socket, so it was left in place
    #[error("refusing to remove {path:?}: found a {kind}, not a socket")]
    NotASocket {
        /// The path that was probed
        path: PathBuf,
        /// What was found at the path
        kind: EntryKind,
    },

    /// The requested primitive does not exist on this platform
    #[error("{operation} is not supported on this platform")]
    Unsupported {
        /// Name of the unavailable primitive
        operation: &'static str,
    },
}

impl SocketError {
    /// The path involved in the failure, if any
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Probe { path, .. } | Self::Remove { path, .. } | Self::NotASocket { path, .. } => {
                Some(path)
            }
            Self::Unsupported { .. } => None,
        }
    }

    /// Whether this is a platform capability gap rather than a failure
    ///
    /// `Unsupported` never succeeds on retry and is not worth logging as
    /// unexpected.
    #[must_use]
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }
}
