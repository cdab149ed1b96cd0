//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce architectural principles:
//! - The engine stays headless (no terminal or async runtime crates)
//! - No sleep() or thread spawning in production code
//! - No panicking shortcuts in the engine's production code
//!
//! The helpers here scan source files as text. Everything from the first
//! `#[cfg(test)]` line onward is treated as test code and skipped, as are
//! comment lines (doc examples included).

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Root of the workspace
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
}

/// Every `.rs` file under `relative` (relative to the workspace root)
pub fn rust_sources(relative: &str) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(workspace_root().join(relative))
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|path| path.extension().is_some_and(|ext| ext == "rs"))
        .collect();
    files.sort();
    files
}

/// Production lines of a source file as `(line_number, text)`
pub fn production_lines(path: &Path) -> Vec<(usize, String)> {
    let Ok(content) = fs::read_to_string(path) else {
        return Vec::new();
    };

    content
        .lines()
        .enumerate()
        .take_while(|(_, line)| line.trim() != "#[cfg(test)]")
        .filter(|(_, line)| !line.trim_start().starts_with("//"))
        .map(|(idx, line)| (idx + 1, line.to_string()))
        .collect()
}

/// A forbidden pattern found in production code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// File containing the match
    pub file: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// The offending line, trimmed
    pub text: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}: {}", self.file.display(), self.line, self.text)
    }
}

/// Scan production code under `relative` for any of `patterns`
pub fn find_violations(relative: &str, patterns: &[&str]) -> Vec<Violation> {
    rust_sources(relative)
        .into_iter()
        .flat_map(|file| {
            production_lines(&file)
                .into_iter()
                .filter(|(_, text)| patterns.iter().any(|p| text.contains(p)))
                .map(move |(line, text)| Violation {
                    file: file.clone(),
                    line,
                    text: text.trim().to_string(),
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Format violations for an assertion message
pub fn report(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_lines_stop_at_test_module() {
        let dir = std::env::temp_dir().join("visage-arch-scan");
        let _ = fs::create_dir_all(&dir);
        let path = dir.join("sample.rs");
        fs::write(&path, "fn a() {}\n// x.unwrap()\nfn b() {}\n#[cfg(test)]\nmod tests {}\n").unwrap();

        let lines = production_lines(&path);
        assert_eq!(
            lines,
            vec![(1, "fn a() {}".to_string()), (3, "fn b() {}".to_string())]
        );
    }

    #[test]
    fn test_sources_are_found() {
        assert!(!rust_sources("visage/core/src").is_empty());
    }
}
