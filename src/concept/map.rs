//! ConceptMap - nested container grouping concepts by AST slot and kind
//!
//! The traversal engine tags every child's concepts with the named slot the
//! child occupied in its parent. Processors consume the entries they promote
//! into higher-level facts; whatever is left bubbles upward, retagged under
//! the parent's own slot.
//!
//! Merges only concatenate: within one map, list order reflects AST
//! encounter order and concepts are never silently dropped.

use super::model::{Concept, ConceptId, ConceptKind};
use crate::fqn::Fqn;
use serde::Serialize;
use std::collections::BTreeMap;

/// `slot name → concept kind → concepts`, in deterministic order
#[derive(Debug, Default, Clone, Serialize)]
#[serde(transparent)]
pub struct ConceptMap {
    inner: BTreeMap<String, BTreeMap<ConceptKind, Vec<Concept>>>,
}

impl ConceptMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// True if the map holds no concepts
    pub fn is_empty(&self) -> bool {
        self.inner
            .values()
            .all(|kinds| kinds.values().all(|list| list.is_empty()))
    }

    /// Total number of concepts across all slots and kinds
    pub fn len(&self) -> usize {
        self.inner
            .values()
            .map(|kinds| kinds.values().map(Vec::len).sum::<usize>())
            .sum()
    }

    /// Append a concept under a slot, keyed by its own kind
    pub fn add(&mut self, slot: impl Into<String>, concept: Concept) {
        self.inner
            .entry(slot.into())
            .or_default()
            .entry(concept.kind())
            .or_default()
            .push(concept);
    }

    /// Concatenate another map into this one
    pub fn merge(&mut self, other: ConceptMap) {
        for (slot, kinds) in other.inner {
            let target = self.inner.entry(slot).or_default();
            for (kind, list) in kinds {
                target.entry(kind).or_default().extend(list);
            }
        }
    }

    /// Consume and return all concepts of a kind under one slot.
    ///
    /// This is how an after-children hook promotes child facts: taken entries
    /// no longer bubble upward.
    pub fn take(&mut self, slot: &str, kind: ConceptKind) -> Vec<Concept> {
        self.inner
            .get_mut(slot)
            .and_then(|kinds| kinds.remove(&kind))
            .unwrap_or_default()
    }

    /// Consume and return all concepts of a kind across every slot
    pub fn take_kind(&mut self, kind: ConceptKind) -> Vec<Concept> {
        let mut out = Vec::new();
        for kinds in self.inner.values_mut() {
            if let Some(list) = kinds.remove(&kind) {
                out.extend(list);
            }
        }
        out
    }

    /// Iterate all concepts of a kind without consuming them
    pub fn of_kind(&self, kind: ConceptKind) -> impl Iterator<Item = &Concept> {
        self.inner
            .values()
            .filter_map(move |kinds| kinds.get(&kind))
            .flatten()
    }

    /// Iterate all concepts in slot/kind order
    pub fn iter(&self) -> impl Iterator<Item = &Concept> {
        self.inner.values().flat_map(|kinds| kinds.values().flatten())
    }

    /// Visit every concept mutably, in slot/kind order
    pub fn for_each_mut(&mut self, f: &mut dyn FnMut(&mut Concept)) {
        for kinds in self.inner.values_mut() {
            for list in kinds.values_mut() {
                for concept in list.iter_mut() {
                    f(concept);
                }
            }
        }
    }

    /// Materialize resolved FQNs from the resolver's side-table into every
    /// concept's FQN slot. Slots without a table entry stay unset.
    pub fn finalize_fqns(&mut self, table: &BTreeMap<ConceptId, Fqn>) {
        self.for_each_mut(&mut |concept| {
            concept.for_each_fqn_slot(&mut |id, slot| {
                if slot.is_none() {
                    if let Some(fqn) = table.get(&id) {
                        *slot = Some(fqn.clone());
                    }
                }
            });
        });
    }

    /// Flatten every entry under a single slot, preserving kind grouping and
    /// per-list encounter order
    pub fn retag(self, slot: impl Into<String>) -> ConceptMap {
        let slot = slot.into();
        let mut out = ConceptMap::new();
        for (_, kinds) in self.inner {
            let target = out.inner.entry(slot.clone()).or_default();
            for (kind, list) in kinds {
                target.entry(kind).or_default().extend(list);
            }
        }
        out
    }
}
