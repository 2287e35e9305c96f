//! Integration Test: Socket Safety Policies
//!
//! **Policy**: Files at a socket path are removed only by the platform
//! cleaners in `sockprep/core/src/platform/`, which refuse to delete
//! non-socket entries where the platform can tell them apart. The process
//! umask is changed only through `SocketPlatform::set_umask`.
//!
//! **Policy**: Production code returns errors instead of calling
//! `unwrap()` / `expect()`.

use architectural_enforcement::{production_lines, SourceLine};

const PLATFORM_DIR: &str = "sockprep/core/src/platform";

fn in_platform_module(line: &SourceLine) -> bool {
    line.path.starts_with(PLATFORM_DIR)
}

fn report(title: &str, violations: &[SourceLine]) {
    if violations.is_empty() {
        return;
    }

    eprintln!("\n❌ {title}\n");
    for violation in violations {
        eprintln!("  ❌ {violation}");
    }

    panic!(
        "\nFound {} violation(s) in production code.\nFix these before merging!",
        violations.len()
    );
}

/// Test that only the platform cleaners delete files
#[test]
fn test_file_removal_confined_to_platform_cleaners() {
    let violations: Vec<SourceLine> = production_lines()
        .into_iter()
        .filter(|line| !in_platform_module(line))
        .filter(|line| {
            line.code.contains("remove_file(")
                || line.code.contains("remove_dir(")
                || line.code.contains("remove_dir_all(")
        })
        .collect();

    report(
        "File removal outside sockprep/core/src/platform (use cleanup_socket_file or Bootstrap::release)",
        &violations,
    );
}

/// Test that only the POSIX platform calls the umask primitive
#[test]
fn test_umask_primitive_confined_to_platform() {
    let violations: Vec<SourceLine> = production_lines()
        .into_iter()
        .filter(|line| !in_platform_module(line))
        .filter(|line| line.code.contains("libc::umask") || line.code.contains("stat::umask"))
        .collect();

    report(
        "Direct umask call outside sockprep/core/src/platform (use set_umask)",
        &violations,
    );
}

/// Test that production code does not panic on errors
#[test]
fn test_no_unwrap_in_production_code() {
    let violations: Vec<SourceLine> = production_lines()
        .into_iter()
        .filter(|line| line.code.contains(".unwrap()") || line.code.contains(".expect("))
        .collect();

    report(
        "unwrap()/expect() in production code (propagate with ? instead)",
        &violations,
    );
}

#[test]
fn test_platform_module_is_scanned() {
    let platform_lines = production_lines()
        .into_iter()
        .filter(in_platform_module)
        .filter(|line| line.code.contains("remove_file("))
        .count();

    assert!(
        platform_lines > 0,
        "expected the platform cleaners to call remove_file"
    );
}
