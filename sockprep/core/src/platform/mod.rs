//! Platform Socket Capabilities
//!
//! Stale socket cleanup and umask control, behind one trait with two
//! implementations chosen at build time:
//!
//! | Platform   | Socket-type detection | Non-socket entry at path | umask            |
//! |------------|-----------------------|--------------------------|------------------|
//! | [`Posix`]    | yes (`S_IFSOCK`)      | left alone, `NotASocket` | `umask(2)`       |
//! | [`Portable`] | no                    | removed                  | `Unsupported`    |
//!
//! [`NativePlatform`] names the implementation for the current target, and
//! the free functions [`cleanup_socket_file`], [`socket_exists`] and
//! [`set_umask`] delegate to it.
//!
//! # Races
//!
//! Cleanup probes the path and then acts on it. Anything else touching the
//! same path between those two steps can make the outcome stale. This is
//! meant for a single owner at startup, not as a concurrent file API.

#[cfg(unix)]
mod posix;
mod portable;

use std::fmt;
use std::fs::{self, FileType, Metadata};
use std::io;
use std::path::Path;

#[cfg(unix)]
pub use posix::Posix;
pub use portable::Portable;

use crate::error::SocketError;
use crate::mask::PermissionMask;

/// The platform implementation for the current build target
#[cfg(unix)]
pub type NativePlatform = Posix;

/// The platform implementation for the current build target
#[cfg(not(unix))]
pub type NativePlatform = Portable;

/// Socket path cleanup and permission mask control for one platform
///
/// All methods are synchronous single attempts. None of them log or retry.
pub trait SocketPlatform {
    /// Whether [`cleanup`](Self::cleanup) can tell sockets from other files
    ///
    /// When `false`, cleanup deletes whatever entry sits at the path, and
    /// callers must make sure the path is never used for anything else.
    const DETECTS_SOCKETS: bool;

    /// Remove a stale socket at `path`
    ///
    /// A missing entry (or missing parent directory) is success.
    fn cleanup(&self, path: &Path) -> Result<(), SocketError>;

    /// Whether a socket currently exists at `path`
    fn socket_exists(&self, path: &Path) -> Result<bool, SocketError>;

    /// Install `mask` as the process-wide file-creation mask
    ///
    /// Returns the mask that was in effect before the call. The mask is
    /// shared by every thread in the process; callers serialize calls.
    fn set_umask(&self, mask: PermissionMask) -> Result<PermissionMask, SocketError>;
}

/// What was found at a probed path
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// A Unix domain socket
    Socket,
    /// A regular file
    Regular,
    /// A directory
    Directory,
    /// A symbolic link (never followed)
    Symlink,
    /// A named pipe
    Fifo,
    /// A character device
    CharDevice,
    /// A block device
    BlockDevice,
    /// Something the platform cannot classify
    Unknown,
}

impl EntryKind {
    /// Classify a file type as reported by `symlink_metadata`
    #[must_use]
    pub fn from_file_type(file_type: FileType) -> Self {
        #[cfg(unix)]
        {
            use std::os::unix::fs::FileTypeExt;

            if file_type.is_socket() {
                return Self::Socket;
            }
            if file_type.is_fifo() {
                return Self::Fifo;
            }
            if file_type.is_char_device() {
                return Self::CharDevice;
            }
            if file_type.is_block_device() {
                return Self::BlockDevice;
            }
        }

        if file_type.is_symlink() {
            Self::Symlink
        } else if file_type.is_dir() {
            Self::Directory
        } else if file_type.is_file() {
            Self::Regular
        } else {
            Self::Unknown
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Socket => "socket",
            Self::Regular => "regular file",
            Self::Directory => "directory",
            Self::Symlink => "symbolic link",
            Self::Fifo => "named pipe",
            Self::CharDevice => "character device",
            Self::BlockDevice => "block device",
            Self::Unknown => "file of unknown type",
        };
        f.write_str(name)
    }
}

/// Probe `path` without following symlinks
///
/// `Ok(None)` means nothing is there.
pub(crate) fn probe(path: &Path) -> Result<Option<Metadata>, SocketError> {
    match fs::symlink_metadata(path) {
        Ok(metadata) => Ok(Some(metadata)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(SocketError::Probe {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Remove the entry at `path`, which is known to exist
pub(crate) fn remove(path: &Path) -> Result<(), SocketError> {
    fs::remove_file(path).map_err(|source| SocketError::Remove {
        path: path.to_path_buf(),
        source,
    })
}

/// Remove a stale socket at `path` using the native platform rules
pub fn cleanup_socket_file(path: &Path) -> Result<(), SocketError> {
    NativePlatform::default().cleanup(path)
}

/// Whether a socket exists at `path` using the native platform rules
pub fn socket_exists(path: &Path) -> Result<bool, SocketError> {
    NativePlatform::default().socket_exists(path)
}

/// Install `mask` as the process umask, returning the previous one
pub fn set_umask(mask: PermissionMask) -> Result<PermissionMask, SocketError> {
    NativePlatform::default().set_umask(mask)
}
