//! Socket Endpoints
//!
//! Listen addresses arrive as `unix:///run/service/api.sock` or as a bare
//! path. Both resolve to the filesystem path the listener binds to.
//!
//! # Default Location
//!
//! Default: `$XDG_RUNTIME_DIR/sockprep/sockprep.sock`
//! Fallback: `/tmp/sockprep-$UID/sockprep.sock`

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

const UNIX_SCHEME: &str = "unix://";

/// Errors from parsing an endpoint string
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EndpointError {
    /// No path was given
    #[error("endpoint is empty")]
    Empty,

    /// Endpoint uses a scheme other than `unix://`
    #[error("unsupported endpoint scheme {scheme:?} in {endpoint:?}, only unix:// is supported")]
    UnsupportedScheme {
        /// The scheme found (without `://`)
        scheme: String,
        /// The full endpoint string
        endpoint: String,
    },
}

/// A Unix domain socket endpoint
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SocketEndpoint {
    path: PathBuf,
}

impl SocketEndpoint {
    /// Create an endpoint from a socket path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The socket path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Consume the endpoint, returning the socket path
    #[must_use]
    pub fn into_path(self) -> PathBuf {
        self.path
    }
}

impl Default for SocketEndpoint {
    fn default() -> Self {
        Self::new(default_socket_path())
    }
}

impl FromStr for SocketEndpoint {
    type Err = EndpointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        let path = if let Some(rest) = strip_unix_scheme(trimmed) {
            rest
        } else if let Some((scheme, _)) = trimmed.split_once("://") {
            return Err(EndpointError::UnsupportedScheme {
                scheme: scheme.to_string(),
                endpoint: s.to_string(),
            });
        } else {
            trimmed
        };

        if path.is_empty() {
            return Err(EndpointError::Empty);
        }
        Ok(Self::new(path))
    }
}

fn strip_unix_scheme(endpoint: &str) -> Option<&str> {
    let scheme = endpoint.get(..UNIX_SCHEME.len())?;
    if scheme.eq_ignore_ascii_case(UNIX_SCHEME) {
        endpoint.get(UNIX_SCHEME.len()..)
    } else {
        None
    }
}

impl fmt::Display for SocketEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{UNIX_SCHEME}{}", self.path.display())
    }
}

/// Get the default socket path
///
/// Uses `XDG_RUNTIME_DIR` if available, otherwise a per-user directory
/// under `/tmp`.
#[must_use]
pub fn default_socket_path() -> PathBuf {
    if let Ok(runtime_dir) = std::env::var("XDG_RUNTIME_DIR") {
        if !runtime_dir.is_empty() {
            return PathBuf::from(runtime_dir)
                .join("sockprep")
                .join("sockprep.sock");
        }
    }
    fallback_socket_path()
}

#[cfg(unix)]
fn fallback_socket_path() -> PathBuf {
    let uid = unsafe { libc::getuid() };
    PathBuf::from(format!("/tmp/sockprep-{uid}/sockprep.sock"))
}

#[cfg(not(unix))]
fn fallback_socket_path() -> PathBuf {
    std::env::temp_dir().join("sockprep").join("sockprep.sock")
}
