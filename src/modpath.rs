//! Module Path Classifier - internal vs external decision
//!
//! Externality is decided by set-membership against the modules extraction
//! actually produced, not by filesystem heuristics. The classifier carries
//! two read-mostly memoization caches (module-index resolution and
//! real-path → package-name mapping), valid for the lifetime of one project
//! run; distinct project roots get distinct classifiers.

use crate::project::{normalize_path, ProjectContext};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Syntactic classification of a module specifier or path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathClass {
    Absolute,
    Relative,
    /// Node-style bare package specifier
    Package,
}

/// Classify a specifier string by shape alone
pub fn classify_specifier(spec: &str) -> PathClass {
    if spec.starts_with('/') {
        PathClass::Absolute
    } else if spec.starts_with("./") || spec.starts_with("../") || spec == "." || spec == ".." {
        PathClass::Relative
    } else {
        PathClass::Package
    }
}

/// Per-project classifier with the extracted-module set and caches
pub struct ModulePathClassifier {
    project_root: String,
    module_suffixes: Vec<String>,
    known_modules: BTreeSet<String>,
    index_cache: RefCell<BTreeMap<String, Option<String>>>,
    package_cache: RefCell<BTreeMap<String, Option<String>>>,
}

impl ModulePathClassifier {
    pub fn new(project: &ProjectContext) -> Self {
        Self {
            project_root: normalize_path(&project.root),
            module_suffixes: project.module_suffixes.clone(),
            known_modules: BTreeSet::new(),
            index_cache: RefCell::new(BTreeMap::new()),
            package_cache: RefCell::new(BTreeMap::new()),
        }
    }

    pub fn project_root(&self) -> &str {
        &self.project_root
    }

    /// Record the modules extraction produced; the membership test below is
    /// the single source of truth for externality
    pub fn record_modules(&mut self, paths: impl IntoIterator<Item = String>) {
        self.known_modules.extend(paths);
    }

    /// Resolve a suffixless module path against the known-module set: exact,
    /// then with each configured suffix, then as a directory index file.
    pub fn resolve_module_path(&self, base: &str) -> Option<String> {
        if self.known_modules.contains(base) {
            return Some(base.to_string());
        }
        for suffix in &self.module_suffixes {
            let candidate = format!("{}{}", base, suffix);
            if self.known_modules.contains(&candidate) {
                return Some(candidate);
            }
        }
        self.resolve_index(base)
    }

    /// Directory-style module path → its index file, memoized
    fn resolve_index(&self, dir: &str) -> Option<String> {
        if let Some(cached) = self.index_cache.borrow().get(dir) {
            return cached.clone();
        }
        let mut resolved = None;
        for suffix in &self.module_suffixes {
            let candidate = format!("{}/index{}", dir, suffix);
            if self.known_modules.contains(&candidate) {
                resolved = Some(candidate);
                break;
            }
        }
        self.index_cache
            .borrow_mut()
            .insert(dir.to_string(), resolved.clone());
        resolved
    }

    /// True when a module FQN part refers outside the analyzed project.
    ///
    /// Package names are always external; path-shaped parts are external
    /// exactly when they match no extracted module.
    pub fn is_external(&self, module_part: &str) -> bool {
        match classify_specifier(module_part) {
            PathClass::Package => true,
            PathClass::Absolute | PathClass::Relative => {
                self.resolve_module_path(module_part).is_none()
            }
        }
    }

    /// Node-style resolution of a specifier from an importing file, walking
    /// `node_modules` directories upward. Touches the filesystem; only the
    /// cross-file export pass uses it, as a fallback for external sources.
    pub fn node_resolve(&self, spec: &str, from_file: &str) -> Option<String> {
        match classify_specifier(spec) {
            PathClass::Relative | PathClass::Absolute => {
                let base = if spec.starts_with('/') {
                    spec.to_string()
                } else {
                    let dir = from_file.rsplit_once('/').map(|(d, _)| d).unwrap_or(".");
                    normalize_path(Path::new(&format!("{}/{}", dir, spec)))
                };
                self.resolve_file_on_disk(&base)
            }
            PathClass::Package => {
                let mut dir = from_file.rsplit_once('/').map(|(d, _)| d.to_string())?;
                loop {
                    let candidate = format!("{}/node_modules/{}", dir, spec);
                    if let Some(found) = self.resolve_file_on_disk(&candidate) {
                        return Some(found);
                    }
                    match dir.rsplit_once('/') {
                        Some((parent, _)) if !parent.is_empty() => dir = parent.to_string(),
                        _ => return None,
                    }
                }
            }
        }
    }

    fn resolve_file_on_disk(&self, base: &str) -> Option<String> {
        if Path::new(base).is_file() {
            return Some(base.to_string());
        }
        for suffix in &self.module_suffixes {
            let candidate = format!("{}{}", base, suffix);
            if Path::new(&candidate).is_file() {
                return Some(candidate);
            }
        }
        for suffix in &self.module_suffixes {
            let candidate = format!("{}/index{}", base, suffix);
            if Path::new(&candidate).is_file() {
                return Some(candidate);
            }
        }
        None
    }

    /// Package name owning a real file path, from its `node_modules`
    /// segment; memoized per path
    pub fn package_name_for_path(&self, real_path: &str) -> Option<String> {
        if let Some(cached) = self.package_cache.borrow().get(real_path) {
            return cached.clone();
        }
        let name = real_path.rsplit_once("/node_modules/").and_then(|(_, rest)| {
            let mut parts = rest.split('/');
            let first = parts.next()?;
            if first.starts_with('@') {
                let second = parts.next()?;
                Some(format!("{}/{}", first, second))
            } else {
                Some(first.to_string())
            }
        });
        self.package_cache
            .borrow_mut()
            .insert(real_path.to_string(), name.clone());
        name
    }

    /// Type-declaration heuristic candidates for an unresolvable external
    /// source: `.js` sources map to their `.d.ts`, packages to `@types/`
    pub fn types_fallback(&self, spec: &str) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(stripped) = spec.strip_suffix(".js") {
            out.push(format!("{}.d.ts", stripped));
        }
        if classify_specifier(spec) == PathClass::Package && !spec.starts_with("@types/") {
            let base = spec.trim_start_matches('@').replace('/', "__");
            out.push(format!("@types/{}", base));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier_with(modules: &[&str]) -> ModulePathClassifier {
        let project = ProjectContext::new("/proj");
        let mut classifier = ModulePathClassifier::new(&project);
        classifier.record_modules(modules.iter().map(|m| m.to_string()));
        classifier
    }

    #[test]
    fn test_classify_specifier() {
        assert_eq!(classify_specifier("./a"), PathClass::Relative);
        assert_eq!(classify_specifier("../a"), PathClass::Relative);
        assert_eq!(classify_specifier("/proj/a.ts"), PathClass::Absolute);
        assert_eq!(classify_specifier("lodash"), PathClass::Package);
        assert_eq!(classify_specifier("@scope/pkg"), PathClass::Package);
    }

    #[test]
    fn test_suffix_resolution() {
        let classifier = classifier_with(&["/proj/src/a.ts"]);
        assert_eq!(
            classifier.resolve_module_path("/proj/src/a").as_deref(),
            Some("/proj/src/a.ts")
        );
        assert!(classifier.resolve_module_path("/proj/src/b").is_none());
    }

    #[test]
    fn test_directory_index_resolution() {
        let classifier = classifier_with(&["/proj/src/utils/index.ts"]);
        assert_eq!(
            classifier.resolve_module_path("/proj/src/utils").as_deref(),
            Some("/proj/src/utils/index.ts")
        );
    }

    #[test]
    fn test_externality_by_membership() {
        let classifier = classifier_with(&["/proj/src/a.ts"]);
        assert!(!classifier.is_external("/proj/src/a"));
        assert!(classifier.is_external("/elsewhere/b"));
        assert!(classifier.is_external("lodash"));
    }

    #[test]
    fn test_package_name_for_path() {
        let classifier = classifier_with(&[]);
        assert_eq!(
            classifier
                .package_name_for_path("/proj/node_modules/lodash/index.js")
                .as_deref(),
            Some("lodash")
        );
        assert_eq!(
            classifier
                .package_name_for_path("/proj/node_modules/@types/node/fs.d.ts")
                .as_deref(),
            Some("@types/node")
        );
        assert!(classifier.package_name_for_path("/proj/src/a.ts").is_none());
    }

    #[test]
    fn test_types_fallback() {
        let classifier = classifier_with(&[]);
        assert_eq!(
            classifier.types_fallback("./lib/helper.js"),
            vec!["./lib/helper.d.ts".to_string()]
        );
        assert_eq!(
            classifier.types_fallback("lodash"),
            vec!["@types/lodash".to_string()]
        );
    }
}
