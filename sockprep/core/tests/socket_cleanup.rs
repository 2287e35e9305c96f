//! Integration tests for stale socket cleanup
//!
//! Covers both platform implementations: the native one through the free
//! functions, and `Portable` directly so its unconditional removal is
//! exercised on unix hosts too.

use std::fs;
use std::io;
use std::path::Path;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use sockprep_core::{cleanup_socket_file, socket_exists, Portable, SocketError, SocketPlatform};

fn assert_missing(path: &Path) {
    match fs::symlink_metadata(path) {
        Ok(_) => panic!("{} still exists", path.display()),
        Err(e) => assert_eq!(e.kind(), io::ErrorKind::NotFound),
    }
}

fn assert_present(path: &Path) {
    if let Err(e) = fs::symlink_metadata(path) {
        panic!("{} is gone: {e}", path.display());
    }
}

// =============================================================================
// Nothing to clean
// =============================================================================

#[test]
fn test_missing_file_is_success() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("reg.sock");

    cleanup_socket_file(&path).unwrap();
    cleanup_socket_file(&path).unwrap();
    assert!(!socket_exists(&path).unwrap());
}

#[test]
fn test_missing_directory_is_success() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("test").join("reg.sock");

    cleanup_socket_file(&path).unwrap();
    Portable.cleanup(&path).unwrap();
    assert!(!dir.path().join("test").exists());
}

// =============================================================================
// Portable: no socket-type detection
// =============================================================================

#[test]
fn test_portable_removes_regular_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("reg.sock");
    fs::File::create(&path).unwrap();

    Portable.cleanup(&path).unwrap();
    assert_missing(&path);
}

// =============================================================================
// Posix: socket-type detection
// =============================================================================

#[cfg(unix)]
mod posix {
    use super::*;
    use std::os::unix::net::UnixListener;

    use pretty_assertions::assert_eq;

    use sockprep_core::{EntryKind, Posix};

    #[test]
    fn test_socket_is_removed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reg.sock");
        let listener = UnixListener::bind(&path).unwrap();

        cleanup_socket_file(&path).unwrap();
        assert_missing(&path);
        drop(listener);
    }

    #[test]
    fn test_regular_file_is_kept() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reg.sock");
        fs::write(&path, b"important").unwrap();

        let err = cleanup_socket_file(&path).unwrap_err();
        match err {
            SocketError::NotASocket { path: ref p, kind } => {
                assert_eq!(p, &path);
                assert_eq!(kind, EntryKind::Regular);
            }
            other => panic!("expected NotASocket, got {other:?}"),
        }
        assert_eq!(fs::read(&path).unwrap(), b"important");
    }

    #[test]
    fn test_fifo_is_kept() {
        use nix::sys::stat::Mode;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pipe.sock");
        nix::unistd::mkfifo(&path, Mode::S_IRUSR | Mode::S_IWUSR).unwrap();

        let err = Posix.cleanup(&path).unwrap_err();
        assert!(matches!(
            err,
            SocketError::NotASocket {
                kind: EntryKind::Fifo,
                ..
            }
        ));
        assert_present(&path);
    }

    #[test]
    fn test_remove_error_in_read_only_directory() {
        use std::os::unix::fs::PermissionsExt;

        // root ignores directory permissions
        if unsafe { libc::geteuid() } == 0 {
            return;
        }

        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("ro");
        fs::create_dir(&sub).unwrap();
        let path = sub.join("reg.sock");
        let _listener = UnixListener::bind(&path).unwrap();

        fs::set_permissions(&sub, fs::Permissions::from_mode(0o555)).unwrap();
        let result = Posix.cleanup(&path);
        fs::set_permissions(&sub, fs::Permissions::from_mode(0o755)).unwrap();

        let err = result.unwrap_err();
        assert!(matches!(err, SocketError::Remove { .. }));
        assert!(err.to_string().contains("failed to remove stale socket"));
        assert_present(&path);
    }

    /// The full reg.sock scenario: socket, clean, then a plain file, clean.
    #[test]
    fn test_reg_sock_scenario() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reg.sock");

        let listener = UnixListener::bind(&path).unwrap();
        cleanup_socket_file(&path).unwrap();
        assert_missing(&path);
        drop(listener);

        fs::File::create(&path).unwrap();

        let posix = Posix.cleanup(&path);
        assert!(matches!(posix, Err(SocketError::NotASocket { .. })));
        assert_present(&path);

        Portable.cleanup(&path).unwrap();
        assert_missing(&path);
    }
}
