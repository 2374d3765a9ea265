//! Project context - input handed over by the discovery collaborator
//!
//! File and tsconfig discovery is out of scope; the caller supplies the
//! project root, the absolute source file list and the module suffix
//! configuration. Paths are normalized lexically (forward slashes, `.` and
//! `..` folded) so FQN prefixes compare as plain strings.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default resolution suffixes, most specific first
pub const DEFAULT_MODULE_SUFFIXES: &[&str] = &[".ts", ".tsx", ".d.ts", ".js", ".jsx"];

/// Project root, source file list and module-resolution configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectContext {
    /// Absolute project root
    pub root: PathBuf,
    /// Absolute paths of all source files to extract
    pub source_files: Vec<PathBuf>,
    /// File suffixes tried when resolving an extensionless import specifier
    pub module_suffixes: Vec<String>,
}

impl ProjectContext {
    /// Create a project context with the default module suffixes
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            source_files: Vec::new(),
            module_suffixes: DEFAULT_MODULE_SUFFIXES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    /// Add source files (absolute paths)
    pub fn with_sources(mut self, sources: impl IntoIterator<Item = PathBuf>) -> Self {
        self.source_files.extend(sources);
        self
    }

    /// Normalized absolute form of a source path
    pub fn absolute_path(&self, path: &Path) -> String {
        normalize_path(path)
    }

    /// Project-relative `./...` form of an absolute source path.
    ///
    /// A path outside the project root is a usage error: per-file extraction
    /// must only ever be handed project files.
    pub fn relative_path(&self, path: &Path) -> Result<String> {
        let normalized = normalize_path(path);
        let root = normalize_path(&self.root);
        match normalized.strip_prefix(&root) {
            Some(rest) => Ok(format!("./{}", rest.trim_start_matches('/'))),
            None => Err(Error::Usage(format!(
                "path {} is outside project root {}",
                normalized, root
            ))),
        }
    }
}

/// Lexically normalize a path: forward slashes, `.` and `..` folded.
///
/// Never touches the filesystem, so it works for paths that do not exist
/// (synthesized index files, package specifiers resolved by heuristic).
pub fn normalize_path(path: &Path) -> String {
    let raw = path.to_string_lossy().replace('\\', "/");
    let mut parts: Vec<&str> = Vec::new();
    let absolute = raw.starts_with('/');
    for part in raw.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if parts.last().map(|p| *p != "..").unwrap_or(false) {
                    parts.pop();
                } else if !absolute {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }
    let joined = parts.join("/");
    if absolute {
        format!("/{}", joined)
    } else {
        joined
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(Path::new("/a/b/../c/./d.ts")), "/a/c/d.ts");
        assert_eq!(normalize_path(Path::new("a/./b")), "a/b");
        assert_eq!(normalize_path(Path::new("../x")), "../x");
    }

    #[test]
    fn test_relative_path() {
        let project = ProjectContext::new("/proj");
        assert_eq!(
            project.relative_path(Path::new("/proj/src/a.ts")).unwrap(),
            "./src/a.ts"
        );
        assert!(project.relative_path(Path::new("/other/a.ts")).is_err());
    }
}
