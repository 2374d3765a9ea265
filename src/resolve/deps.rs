//! Dependency merge - dedupe and count reference edges
//!
//! Runs alongside the resolution flush at the end of each file. After the
//! merge at most one dependency exists per distinct (source, target) pair,
//! with cardinality equal to the number of raw edges collapsed into it.

use crate::concept::{Concept, ConceptId, Dependency, RefKind};
use crate::fqn::Fqn;
use std::collections::BTreeMap;

/// Statistics of one merge pass
#[derive(Debug, Default, Clone, Copy)]
pub struct MergeStats {
    pub kept: usize,
    pub collapsed: usize,
    pub dropped: usize,
}

/// Merge raw dependency concepts against the resolver's side-table.
///
/// Declaration-kind targets take their FQN from the side-table; edges whose
/// target never resolved are discarded (expected for references into
/// un-analyzed code). Module-kind targets resolve to a path literal at
/// creation time and pass through. Self-referential and empty-target edges
/// are invalid and discarded.
pub fn merge_dependencies(
    raw: Vec<Concept>,
    resolved: &BTreeMap<ConceptId, Fqn>,
) -> (Vec<Dependency>, MergeStats) {
    let mut merged: BTreeMap<(String, String), Dependency> = BTreeMap::new();
    let mut stats = MergeStats::default();

    for concept in raw {
        let Concept::Dependency(dep) = concept else {
            continue;
        };
        let target = match dep.target_kind {
            RefKind::Module => dep
                .target
                .clone()
                .or_else(|| Some(dep.target_text.clone()).filter(|t| !t.is_empty())),
            RefKind::Declaration => resolved.get(&dep.id).map(|fqn| fqn.global.clone()),
        };
        let Some(target) = target else {
            stats.dropped += 1;
            continue;
        };
        if target.is_empty() || target == dep.source {
            stats.dropped += 1;
            continue;
        }

        let key = (dep.source.clone(), target.clone());
        match merged.get_mut(&key) {
            Some(existing) => {
                existing.cardinality += dep.cardinality;
                stats.collapsed += 1;
            }
            None => {
                let mut dep = dep;
                dep.target = Some(target);
                merged.insert(key, dep);
            }
        }
    }

    stats.kept = merged.len();
    (merged.into_values().collect(), stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_dep(id: u32, source: &str, text: &str, kind: RefKind) -> Concept {
        Concept::Dependency(Dependency {
            id: ConceptId(id),
            source: source.to_string(),
            source_kind: RefKind::Declaration,
            target_text: text.to_string(),
            target: None,
            target_kind: kind,
            cardinality: 1,
        })
    }

    #[test]
    fn test_merge_sums_cardinality() {
        let mut resolved = BTreeMap::new();
        resolved.insert(ConceptId(1), Fqn::new("\"/p/b.ts\".y", "\"./b.ts\".y"));
        resolved.insert(ConceptId(2), Fqn::new("\"/p/b.ts\".y", "\"./b.ts\".y"));

        let raw = vec![
            raw_dep(1, "\"/p/a.ts\".f", "y", RefKind::Declaration),
            raw_dep(2, "\"/p/a.ts\".f", "y", RefKind::Declaration),
        ];
        let (merged, stats) = merge_dependencies(raw, &resolved);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].cardinality, 2);
        assert_eq!(stats.collapsed, 1);
    }

    #[test]
    fn test_unresolved_declaration_target_dropped() {
        let resolved = BTreeMap::new();
        let raw = vec![raw_dep(1, "\"/p/a.ts\".f", "ghost", RefKind::Declaration)];
        let (merged, stats) = merge_dependencies(raw, &resolved);

        assert!(merged.is_empty());
        assert_eq!(stats.dropped, 1);
    }

    #[test]
    fn test_module_target_passes_without_lookup() {
        let resolved = BTreeMap::new();
        let raw = vec![raw_dep(1, "\"/p/a.ts\"", "\"/p/b.ts\"", RefKind::Module)];
        let (merged, _) = merge_dependencies(raw, &resolved);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].target.as_deref(), Some("\"/p/b.ts\""));
    }

    #[test]
    fn test_self_edge_dropped() {
        let mut resolved = BTreeMap::new();
        resolved.insert(ConceptId(1), Fqn::new("\"/p/a.ts\".f", "\"./a.ts\".f"));

        let raw = vec![raw_dep(1, "\"/p/a.ts\".f", "f", RefKind::Declaration)];
        let (merged, stats) = merge_dependencies(raw, &resolved);

        assert!(merged.is_empty());
        assert_eq!(stats.dropped, 1);
    }
}
