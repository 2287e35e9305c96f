//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce architectural principles:
//! - Socket files are only ever removed by the platform cleaners
//! - The process umask is only touched through `SocketPlatform::set_umask`
//! - Production code propagates errors instead of panicking
//!
//! The helpers here walk the workspace sources and hand back the lines that
//! belong to production code, so each policy test is a simple line filter.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// Production source directories checked by the policy tests
pub const PRODUCTION_DIRS: &[&str] = &["sockprep/core/src", "sockprep/daemon/src"];

/// One line of production code
#[derive(Debug, Clone)]
pub struct SourceLine {
    /// File the line came from, relative to the workspace root
    pub path: PathBuf,
    /// 1-based line number
    pub line_number: usize,
    /// The line with any trailing `//` comment removed
    pub code: String,
}

impl std::fmt::Display for SourceLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{} - {}",
            self.path.display(),
            self.line_number,
            self.code.trim()
        )
    }
}

/// Workspace root, two levels above this package
#[must_use]
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..")
}

/// All production lines under [`PRODUCTION_DIRS`]
///
/// Panics if a directory is missing, so a moved crate cannot turn the
/// policy tests into no-ops.
#[must_use]
pub fn production_lines() -> Vec<SourceLine> {
    let root = workspace_root();
    let mut lines = Vec::new();

    for dir in PRODUCTION_DIRS {
        let path = root.join(dir);
        assert!(path.is_dir(), "missing source directory {}", path.display());

        for entry in walkdir::WalkDir::new(&path)
            .into_iter()
            .filter_map(Result::ok)
        {
            if entry.path().extension().and_then(|s| s.to_str()) != Some("rs") {
                continue;
            }
            let Ok(content) = fs::read_to_string(entry.path()) else {
                continue;
            };
            let relative = entry
                .path()
                .strip_prefix(&root)
                .unwrap_or(entry.path())
                .to_path_buf();
            lines.extend(production_part(&relative, &content));
        }
    }

    lines
}

/// Lines of `content` before its `#[cfg(test)]` module, comments stripped
#[must_use]
pub fn production_part(path: &Path, content: &str) -> Vec<SourceLine> {
    content
        .lines()
        .enumerate()
        .take_while(|(_, line)| line.trim() != "#[cfg(test)]")
        .filter_map(|(idx, line)| {
            let code = strip_comment(line);
            if code.trim().is_empty() {
                return None;
            }
            Some(SourceLine {
                path: path.to_path_buf(),
                line_number: idx + 1,
                code: code.to_string(),
            })
        })
        .collect()
}

fn strip_comment(line: &str) -> &str {
    line.split("//").next().unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_part_stops_at_test_module() {
        let content = "fn a() {}\n// note\n#[cfg(test)]\nmod tests {\n    fn b() {}\n}\n";
        let lines = production_part(Path::new("x.rs"), content);

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].line_number, 1);
        assert_eq!(lines[0].code, "fn a() {}");
    }

    #[test]
    fn test_comments_are_stripped() {
        let lines = production_part(Path::new("x.rs"), "let x = 1; // remove_file(p)\n");
        assert_eq!(lines[0].code.trim(), "let x = 1;");
    }
}
