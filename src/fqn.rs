//! Fully-qualified names - global, stable identity for every declaration
//!
//! An FQN is a pair of dotted paths rooted at a module path literal:
//! - global: `"/home/u/proj/src/auth.ts".AuthService.login`
//! - local:  `"./src/auth.ts".AuthService.login`
//!
//! The global form is unique project-wide and serves as the primary key for
//! declarations, dependency edges and export targets. The local form is
//! relative to the project root and used for display.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Qualified-name pair identifying a declaration.
///
/// Serializes flat as `globalFqn` / `localFqn` so concept records expose the
/// two strings directly instead of a nested object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fqn {
    /// Project-wide unique dotted path, rooted at an absolute module path
    #[serde(rename = "globalFqn")]
    pub global: String,
    /// Project-root-relative dotted path, for human-readable display
    #[serde(rename = "localFqn")]
    pub local: String,
}

impl Fqn {
    /// Create a new FQN from its global and local forms
    pub fn new(global: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            global: global.into(),
            local: local.into(),
        }
    }

    /// FQN of a module itself: both forms are the quoted path literal
    pub fn for_module(absolute_path: &str, relative_path: &str) -> Self {
        Self {
            global: module_prefix(absolute_path),
            local: module_prefix(relative_path),
        }
    }

    /// Append an identifier segment to both forms
    pub fn join(&self, segment: &str) -> Self {
        Self {
            global: join_segment(&self.global, segment),
            local: join_segment(&self.local, segment),
        }
    }
}

impl fmt::Display for Fqn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.global)
    }
}

/// Quote a module path into an FQN prefix literal
pub fn module_prefix(path: &str) -> String {
    format!("\"{}\"", path)
}

/// Append a dotted segment to an FQN string
pub fn join_segment(base: &str, segment: &str) -> String {
    if base.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", base, segment)
    }
}

/// Split a global FQN into its module-path literal and member path.
///
/// `"/p/a.ts".Foo.bar` splits into (`/p/a.ts`, `Foo.bar`). FQNs without a
/// quoted module prefix (bare package references like `lodash.merge`) split
/// on the first dot instead.
pub fn split_module(global: &str) -> (String, String) {
    if let Some(rest) = global.strip_prefix('"') {
        if let Some(end) = rest.find('"') {
            let module = &rest[..end];
            let member = rest[end + 1..].trim_start_matches('.');
            return (module.to_string(), member.to_string());
        }
    }
    match global.split_once('.') {
        Some((module, member)) => (module.to_string(), member.to_string()),
        None => (global.to_string(), String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_fqn() {
        let fqn = Fqn::for_module("/proj/src/a.ts", "./src/a.ts");
        assert_eq!(fqn.global, "\"/proj/src/a.ts\"");
        assert_eq!(fqn.local, "\"./src/a.ts\"");
    }

    #[test]
    fn test_join() {
        let module = Fqn::for_module("/proj/src/a.ts", "./src/a.ts");
        let class = module.join("AuthService").join("login");
        assert_eq!(class.global, "\"/proj/src/a.ts\".AuthService.login");
        assert_eq!(class.local, "\"./src/a.ts\".AuthService.login");
    }

    #[test]
    fn test_split_module() {
        let (module, member) = split_module("\"/proj/src/a.ts\".Foo.bar");
        assert_eq!(module, "/proj/src/a.ts");
        assert_eq!(member, "Foo.bar");

        let (module, member) = split_module("lodash.merge");
        assert_eq!(module, "lodash");
        assert_eq!(member, "merge");

        let (module, member) = split_module("lodash");
        assert_eq!(module, "lodash");
        assert_eq!(member, "");
    }

    #[test]
    fn test_serde_shape() {
        let fqn = Fqn::new("\"/p/a.ts\".X", "\"./a.ts\".X");
        let json = serde_json::to_value(&fqn).unwrap();
        assert_eq!(json["globalFqn"], "\"/p/a.ts\".X");
        assert_eq!(json["localFqn"], "\"./a.ts\".X");
    }
}
