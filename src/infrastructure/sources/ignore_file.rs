//! Ignore patterns for source content
//!
//! A `.ruleforgeignore` at a source root excludes content with gitignore
//! semantics, matched against paths relative to that root.

use std::fs;
use std::path::{Path, PathBuf};

use ignore::gitignore::{Gitignore, GitignoreBuilder};

/// Ignore file name at a source root
pub const IGNORE_FILE: &str = ".ruleforgeignore";

/// Maximum file size for the ignore file (64KB)
const MAX_FILE_SIZE: u64 = 65536;

#[derive(Debug, thiserror::Error)]
pub enum IgnoreError {
    #[error(".ruleforgeignore exceeds {}KB limit ({size} bytes): {}", MAX_FILE_SIZE / 1024, .path.display())]
    FileTooLarge { path: PathBuf, size: u64 },

    #[error("invalid pattern at {}:{line}: '{pattern}' - {message}", .path.display())]
    InvalidPattern {
        path: PathBuf,
        line: usize,
        pattern: String,
        message: String,
    },

    #[error("failed to build ignore matcher: {0}")]
    BuildFailed(String),

    #[error("IO error reading .ruleforgeignore: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug)]
pub struct IgnorePatterns {
    matcher: Gitignore,
    pattern_count: usize,
}

impl Default for IgnorePatterns {
    fn default() -> Self {
        Self::empty()
    }
}

impl IgnorePatterns {
    /// Matches nothing
    pub fn empty() -> Self {
        Self {
            matcher: Gitignore::empty(),
            pattern_count: 0,
        }
    }

    /// Load the ignore file of the source rooted at `root`; empty when absent
    pub fn load(root: &Path) -> Result<Self, IgnoreError> {
        let ignore_path = root.join(IGNORE_FILE);
        let metadata = match fs::metadata(&ignore_path) {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::empty()),
            Err(e) => return Err(e.into()),
        };
        if metadata.len() > MAX_FILE_SIZE {
            return Err(IgnoreError::FileTooLarge {
                path: ignore_path,
                size: metadata.len(),
            });
        }

        let content = fs::read_to_string(&ignore_path)?;
        Self::from_content(root, &ignore_path, &content)
    }

    pub fn from_content(root: &Path, source_path: &Path, content: &str) -> Result<Self, IgnoreError> {
        let mut builder = GitignoreBuilder::new(root);
        let mut pattern_count = 0;

        for (line_num, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            pattern_count += 1;
            if let Err(e) = builder.add_line(Some(source_path.to_path_buf()), line) {
                return Err(IgnoreError::InvalidPattern {
                    path: source_path.to_path_buf(),
                    line: line_num + 1,
                    pattern: line.to_string(),
                    message: e.to_string(),
                });
            }
        }

        let matcher = builder
            .build()
            .map_err(|e| IgnoreError::BuildFailed(e.to_string()))?;

        Ok(Self {
            matcher,
            pattern_count,
        })
    }

    /// Whether `rel_path` (relative to the source root) is excluded
    pub fn is_ignored(&self, rel_path: &Path, is_dir: bool) -> bool {
        self.pattern_count > 0
            && self
                .matcher
                .matched_path_or_any_parents(rel_path, is_dir)
                .is_ignore()
    }

    pub fn is_empty(&self) -> bool {
        self.pattern_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn patterns(content: &str) -> IgnorePatterns {
        let root = Path::new("/src");
        IgnorePatterns::from_content(root, &root.join(IGNORE_FILE), content).unwrap()
    }

    #[test]
    fn empty_patterns_match_nothing() {
        let patterns = IgnorePatterns::empty();
        assert!(!patterns.is_ignored(Path::new("shared/a.md"), false));
        assert!(patterns.is_empty());
    }

    #[test]
    fn missing_file_returns_empty() {
        let dir = tempdir().unwrap();
        assert!(IgnorePatterns::load(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn comments_only_returns_empty() {
        assert!(patterns("# just a comment\n\n# another").is_empty());
    }

    #[test]
    fn glob_matches_files_anywhere() {
        let p = patterns("*.draft.md\n");
        assert!(p.is_ignored(Path::new("shared/rules/style.draft.md"), false));
        assert!(!p.is_ignored(Path::new("shared/rules/style.md"), false));
    }

    #[test]
    fn directory_pattern_covers_children() {
        let p = patterns("shared/wip/\n");
        assert!(p.is_ignored(Path::new("shared/wip"), true));
        assert!(p.is_ignored(Path::new("shared/wip/notes.md"), false));
    }

    #[test]
    fn negation_reincludes() {
        let p = patterns("*.md\n!keep.md\n");
        assert!(p.is_ignored(Path::new("shared/x.md"), false));
        assert!(!p.is_ignored(Path::new("shared/keep.md"), false));
    }

    #[test]
    fn oversized_file_is_rejected() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(IGNORE_FILE), "x".repeat(70_000)).unwrap();
        assert!(matches!(
            IgnorePatterns::load(dir.path()),
            Err(IgnoreError::FileTooLarge { .. })
        ));
    }
}
