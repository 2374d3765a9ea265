//! Scope-keyed declaration index and deferred resolution queue
//!
//! Resolution algorithm (one flush per file, at top-level scope exit):
//! 1. Walk the pending triple's scope snapshot innermost-out
//! 2. Dotted identifiers: match shrinking prefixes first (`a.b.c`, `a.b`,
//!    `a`) - a whole path may itself be a registered alias
//! 3. Then shrinking suffixes (`c`, `b.c`, `a.b.c`) - leading segments may be
//!    type qualifiers around a locally-declared final segment
//! 4. First match wins; no match leaves the slot unset permanently

use crate::concept::ConceptId;
use crate::fqn::Fqn;
use std::collections::BTreeMap;

/// A reference recorded now, resolved after the scope's declarations are known
#[derive(Debug, Clone)]
pub struct PendingResolution {
    /// Enclosing scope global identifiers at the reference site, outermost first
    pub snapshot: Vec<String>,
    /// Identifier text as written (possibly dotted)
    pub name: String,
    /// Concept whose FQN slot receives the resolution
    pub id: ConceptId,
}

/// Per-file declaration index plus the deferred resolution queue.
///
/// The index (`scope global fqn → local name → FQN`) is the only structure
/// queried during resolution. The queue is append-only until the single
/// flush; there is no partial or incremental resolution.
#[derive(Debug, Default)]
pub struct SymbolTable {
    index: BTreeMap<String, BTreeMap<String, Fqn>>,
    pending: Vec<PendingResolution>,
    resolved: BTreeMap<ConceptId, Fqn>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `local_name → fqn` into a scope's declaration index
    pub fn register(&mut self, scope_global: &str, local_name: &str, fqn: Fqn) {
        self.index
            .entry(scope_global.to_string())
            .or_default()
            .insert(local_name.to_string(), fqn);
    }

    /// Append a pending triple for the end-of-file flush
    pub fn schedule(&mut self, snapshot: Vec<String>, name: impl Into<String>, id: ConceptId) {
        self.pending.push(PendingResolution {
            snapshot,
            name: name.into(),
            id,
        });
    }

    /// Direct index lookup, used by tests and the export processor
    pub fn lookup(&self, scope_global: &str, local_name: &str) -> Option<&Fqn> {
        self.index.get(scope_global)?.get(local_name)
    }

    /// Number of still-pending references
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Run the single resolution pass over all pending triples.
    ///
    /// Returns the side-table mapping concept ids to resolved FQNs.
    /// References that match nothing simply never enter the table; this is
    /// the expected outcome for references into un-analyzed code, not an
    /// error.
    pub fn resolve_all(&mut self) -> &BTreeMap<ConceptId, Fqn> {
        let pending = std::mem::take(&mut self.pending);
        for item in pending {
            if let Some(fqn) = self.resolve_one(&item.snapshot, &item.name) {
                self.resolved.insert(item.id, fqn);
            }
        }
        &self.resolved
    }

    /// Side-table of resolutions performed so far
    pub fn resolved(&self) -> &BTreeMap<ConceptId, Fqn> {
        &self.resolved
    }

    fn resolve_one(&self, snapshot: &[String], name: &str) -> Option<Fqn> {
        let parts: Vec<&str> = name.split('.').collect();

        // Prefix pass: longest prefix first, against each enclosing scope
        // innermost-out. A prefix match stands for the whole head of the
        // path; the remaining segments are appended to the matched FQN.
        for scope in snapshot.iter().rev() {
            let Some(scope_index) = self.index.get(scope) else {
                continue;
            };
            for cut in (1..=parts.len()).rev() {
                let prefix = parts[..cut].join(".");
                if let Some(fqn) = scope_index.get(&prefix) {
                    let mut resolved = fqn.clone();
                    for segment in &parts[cut..] {
                        resolved = resolved.join(segment);
                    }
                    return Some(resolved);
                }
            }
        }

        // Suffix pass: shortest suffix first. Leading segments are treated
        // as qualifiers; the matched FQN is taken as-is.
        for scope in snapshot.iter().rev() {
            let Some(scope_index) = self.index.get(scope) else {
                continue;
            };
            for start in (0..parts.len()).rev() {
                let suffix = parts[start..].join(".");
                if let Some(fqn) = scope_index.get(&suffix) {
                    return Some(fqn.clone());
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fqn(global: &str) -> Fqn {
        Fqn::new(global, global.replace("/p", "."))
    }

    #[test]
    fn test_simple_resolution_in_scope() {
        let mut table = SymbolTable::new();
        table.register("\"/p/a.ts\"", "x", fqn("\"/p/a.ts\".x"));
        table.schedule(vec!["\"/p/a.ts\"".into()], "x", ConceptId(1));

        let resolved = table.resolve_all();
        assert_eq!(resolved.get(&ConceptId(1)).unwrap().global, "\"/p/a.ts\".x");
    }

    #[test]
    fn test_nearest_scope_shadows() {
        let mut table = SymbolTable::new();
        table.register("\"/p/a.ts\"", "x", fqn("\"/p/a.ts\".x"));
        table.register("\"/p/a.ts\".f", "x", fqn("\"/p/a.ts\".f.x"));
        table.schedule(
            vec!["\"/p/a.ts\"".into(), "\"/p/a.ts\".f".into()],
            "x",
            ConceptId(1),
        );

        let resolved = table.resolve_all();
        assert_eq!(
            resolved.get(&ConceptId(1)).unwrap().global,
            "\"/p/a.ts\".f.x"
        );
    }

    #[test]
    fn test_forward_reference_resolves() {
        // Reference scheduled before the declaration is registered; the
        // single end-of-scope flush sees the complete index.
        let mut table = SymbolTable::new();
        table.schedule(vec!["\"/p/a.ts\"".into()], "later", ConceptId(1));
        table.register("\"/p/a.ts\"", "later", fqn("\"/p/a.ts\".later"));

        let resolved = table.resolve_all();
        assert!(resolved.contains_key(&ConceptId(1)));
    }

    #[test]
    fn test_dotted_prefix_beats_suffix() {
        // `ns.sub` is a registered namespace alias; `fn` alone is also
        // registered. Prefix matching must win.
        let mut table = SymbolTable::new();
        table.register("\"/p/a.ts\"", "ns.sub", Fqn::new("\"/p/utils/sub.ts\"", "\"./utils/sub.ts\""));
        table.register("\"/p/a.ts\"", "fn", fqn("\"/p/a.ts\".fn"));
        table.schedule(vec!["\"/p/a.ts\"".into()], "ns.sub.fn", ConceptId(1));

        let resolved = table.resolve_all();
        assert_eq!(
            resolved.get(&ConceptId(1)).unwrap().global,
            "\"/p/utils/sub.ts\".fn"
        );
    }

    #[test]
    fn test_dotted_suffix_fallback() {
        // Only the final segment is locally declared; leading segments are
        // qualifiers.
        let mut table = SymbolTable::new();
        table.register("\"/p/a.ts\"", "member", fqn("\"/p/a.ts\".member"));
        table.schedule(vec!["\"/p/a.ts\"".into()], "Qual.Chain.member", ConceptId(1));

        let resolved = table.resolve_all();
        assert_eq!(
            resolved.get(&ConceptId(1)).unwrap().global,
            "\"/p/a.ts\".member"
        );
    }

    #[test]
    fn test_unresolved_stays_unset() {
        let mut table = SymbolTable::new();
        table.schedule(vec!["\"/p/a.ts\"".into()], "missing", ConceptId(1));

        let resolved = table.resolve_all();
        assert!(!resolved.contains_key(&ConceptId(1)));
    }
}
