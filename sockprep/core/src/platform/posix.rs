//! POSIX socket handling
//!
//! `lstat` reports `S_IFSOCK` for Unix domain sockets, so only real sockets
//! are ever removed.

use std::path::Path;

use nix::sys::stat::{umask, Mode};

use super::{probe, remove, EntryKind, SocketPlatform};
use crate::error::SocketError;
use crate::mask::PermissionMask;

/// Socket cleanup that refuses to delete anything but a socket
#[derive(Clone, Copy, Debug, Default)]
pub struct Posix;

impl SocketPlatform for Posix {
    const DETECTS_SOCKETS: bool = true;

    fn cleanup(&self, path: &Path) -> Result<(), SocketError> {
        let Some(metadata) = probe(path)? else {
            return Ok(());
        };

        match EntryKind::from_file_type(metadata.file_type()) {
            EntryKind::Socket => remove(path),
            kind => Err(SocketError::NotASocket {
                path: path.to_path_buf(),
                kind,
            }),
        }
    }

    fn socket_exists(&self, path: &Path) -> Result<bool, SocketError> {
        Ok(probe(path)?.is_some_and(|metadata| {
            EntryKind::from_file_type(metadata.file_type()) == EntryKind::Socket
        }))
    }

    // mode_t is u32 on Linux and u16 on macOS and the BSDs
    #[allow(
        clippy::cast_possible_truncation,
        clippy::unnecessary_cast,
        clippy::useless_conversion
    )]
    fn set_umask(&self, mask: PermissionMask) -> Result<PermissionMask, SocketError> {
        let previous = umask(Mode::from_bits_truncate(mask.bits() as libc::mode_t));
        Ok(PermissionMask::from_bits_truncate(u32::from(previous.bits())))
    }
}
