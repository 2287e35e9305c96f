//! Socket Bootstrap
//!
//! The startup sequence a Unix socket server runs before it accepts
//! anything:
//!
//! ```text
//! set_umask(mask) ──► create parent dir ──► cleanup(path) ──► bind(path) ──► restore umask
//!  (if configured)     (if enabled)          stale socket      listener       (if enabled)
//! ```
//!
//! Each step is a single attempt. The first failure aborts the sequence and
//! is returned to the caller; the umask is put back before returning when
//! restoring is enabled.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::endpoint::default_socket_path;
use crate::error::SocketError;
use crate::mask::PermissionMask;
use crate::platform::{NativePlatform, SocketPlatform};

/// Errors from the bootstrap sequence
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Installing the umask failed
    #[error("Failed to set umask {mask}: {source}")]
    Umask {
        /// The mask that was requested
        mask: PermissionMask,
        /// The platform error
        #[source]
        source: SocketError,
    },

    /// Creating the socket's parent directory failed
    #[error("Failed to create socket directory {path:?}: {source}")]
    CreateDir {
        /// The directory that was being created
        path: PathBuf,
        /// The underlying IO error
        #[source]
        source: io::Error,
    },

    /// Stale socket cleanup failed
    #[error(transparent)]
    Cleanup(#[from] SocketError),

    /// Binding the listener failed
    #[error("Failed to bind {path:?}: {source}")]
    Bind {
        /// The socket path
        path: PathBuf,
        /// The underlying IO error
        #[source]
        source: io::Error,
    },
}

/// What the bootstrap should do
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SocketOptions {
    /// Where the socket lives
    pub path: PathBuf,
    /// Mask to install before creating the socket (None = leave it alone)
    pub umask: Option<PermissionMask>,
    /// Create the parent directory when it is missing
    pub create_parent_dir: bool,
    /// Put the previous umask back once the listener is bound
    pub restore_umask: bool,
}

impl Default for SocketOptions {
    fn default() -> Self {
        Self {
            path: default_socket_path(),
            umask: None,
            create_parent_dir: true,
            restore_umask: true,
        }
    }
}

impl SocketOptions {
    /// Options for `path` with default settings
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Install `mask` before creating the socket
    #[must_use]
    pub fn with_umask(mut self, mask: PermissionMask) -> Self {
        self.umask = Some(mask);
        self
    }

    /// Enable or disable parent directory creation
    #[must_use]
    pub fn with_create_parent_dir(mut self, create: bool) -> Self {
        self.create_parent_dir = create;
        self
    }

    /// Enable or disable restoring the previous umask after binding
    #[must_use]
    pub fn with_restore_umask(mut self, restore: bool) -> Self {
        self.restore_umask = restore;
        self
    }
}

/// A socket path that is ready to be bound
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedPath {
    /// The socket path, now free
    pub path: PathBuf,
    /// The umask in effect before the bootstrap changed it
    ///
    /// `None` when no mask was configured or the platform has no umask.
    pub previous_mask: Option<PermissionMask>,
}

/// A bound listener and what it took to get there
#[cfg(unix)]
#[derive(Debug)]
pub struct BoundSocket {
    /// The bound listener
    pub listener: std::os::unix::net::UnixListener,
    /// The socket path
    pub path: PathBuf,
    /// The umask in effect before the bootstrap changed it
    pub previous_mask: Option<PermissionMask>,
}

/// Runs the startup sequence on one platform
#[derive(Clone, Debug)]
pub struct Bootstrap<P: SocketPlatform = NativePlatform> {
    platform: P,
    options: SocketOptions,
}

impl Bootstrap<NativePlatform> {
    /// Bootstrap for the current build target
    #[must_use]
    pub fn new(options: SocketOptions) -> Self {
        Self::with_platform(NativePlatform::default(), options)
    }
}

impl<P: SocketPlatform> Bootstrap<P> {
    /// Bootstrap using an explicit platform implementation
    pub fn with_platform(platform: P, options: SocketOptions) -> Self {
        Self { platform, options }
    }

    /// The options this bootstrap runs with
    pub fn options(&self) -> &SocketOptions {
        &self.options
    }

    /// Install the umask, create the directory and remove a stale socket
    pub fn prepare(&self) -> Result<PreparedPath, BootstrapError> {
        let previous_mask = self.install_umask()?;

        if let Err(e) = self.clear_path() {
            if let Some(previous) = previous_mask {
                self.finish_umask(previous);
            }
            return Err(e);
        }

        Ok(PreparedPath {
            path: self.options.path.clone(),
            previous_mask,
        })
    }

    /// Run [`prepare`](Self::prepare) and bind a listener on the path
    #[cfg(unix)]
    pub fn bind(&self) -> Result<BoundSocket, BootstrapError> {
        let prepared = self.prepare()?;

        let bound = std::os::unix::net::UnixListener::bind(&prepared.path);

        if let Some(previous) = prepared.previous_mask {
            self.finish_umask(previous);
        }

        let listener = bound.map_err(|source| BootstrapError::Bind {
            path: prepared.path.clone(),
            source,
        })?;

        info!(path = ?prepared.path, "Socket bound");

        Ok(BoundSocket {
            listener,
            path: prepared.path,
            previous_mask: prepared.previous_mask,
        })
    }

    /// Remove the socket on shutdown
    ///
    /// Failures are logged, not returned; there is nothing left to abort.
    pub fn release(&self) {
        let path = &self.options.path;
        match self.platform.cleanup(path) {
            Ok(()) => debug!(path = ?path, "Socket path released"),
            Err(e) => warn!(path = ?path, error = %e, "Failed to release socket path"),
        }
    }

    fn install_umask(&self) -> Result<Option<PermissionMask>, BootstrapError> {
        let Some(mask) = self.options.umask else {
            return Ok(None);
        };

        match self.platform.set_umask(mask) {
            Ok(previous) => {
                debug!(umask = %mask, previous = %previous, "Installed umask");
                Ok(Some(previous))
            }
            Err(e) if e.is_unsupported() => {
                debug!(umask = %mask, "Umask not available on this platform, skipping");
                Ok(None)
            }
            Err(source) => Err(BootstrapError::Umask { mask, source }),
        }
    }

    fn finish_umask(&self, previous: PermissionMask) {
        if !self.options.restore_umask {
            return;
        }
        match self.platform.set_umask(previous) {
            Ok(_) => debug!(umask = %previous, "Restored umask"),
            Err(e) => warn!(umask = %previous, error = %e, "Failed to restore umask"),
        }
    }

    fn clear_path(&self) -> Result<(), BootstrapError> {
        let path = &self.options.path;

        if self.options.create_parent_dir {
            create_parent_dir(path)?;
        }

        if !P::DETECTS_SOCKETS {
            debug!(
                path = ?path,
                "Platform cannot detect sockets, any entry at the path will be removed"
            );
        }

        self.platform.cleanup(path)?;
        debug!(path = ?path, "Socket path is clear");
        Ok(())
    }
}

fn create_parent_dir(path: &Path) -> Result<(), BootstrapError> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() || parent.exists() {
        return Ok(());
    }

    fs::create_dir_all(parent).map_err(|source| BootstrapError::CreateDir {
        path: parent.to_path_buf(),
        source,
    })?;
    info!(path = ?parent, "Created socket directory");
    Ok(())
}
