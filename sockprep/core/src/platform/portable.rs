//! Socket handling without socket-type detection
//!
//! Used where `lstat` cannot report that an entry is a Unix domain socket
//! (Windows reports AF_UNIX socket files as reparse points, not sockets).
//! Cleanup therefore removes whatever entry exists at the path. Callers on
//! these platforms must never point the socket path at anything else.
//!
//! There is no process umask either, so [`Portable::set_umask`] always
//! reports `Unsupported` and changes nothing.

use std::path::Path;

use super::{probe, remove, SocketPlatform};
use crate::error::SocketError;
use crate::mask::PermissionMask;

/// Socket cleanup that removes any entry found at the path
#[derive(Clone, Copy, Debug, Default)]
pub struct Portable;

impl SocketPlatform for Portable {
    const DETECTS_SOCKETS: bool = false;

    fn cleanup(&self, path: &Path) -> Result<(), SocketError> {
        if probe(path)?.is_none() {
            return Ok(());
        }
        remove(path)
    }

    fn socket_exists(&self, path: &Path) -> Result<bool, SocketError> {
        Ok(probe(path)?.is_some())
    }

    fn set_umask(&self, _mask: PermissionMask) -> Result<PermissionMask, SocketError> {
        Err(SocketError::Unsupported { operation: "umask" })
    }
}
