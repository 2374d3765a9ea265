//! Recursive descent dispatcher
//!
//! At each node: push a context frame recording the slot this node occupies
//! in its parent, run matching processors' before hooks, dispatch the
//! declared child slots, run after hooks (consume-and-retag), pop the frame,
//! and return leftovers plus new concepts tagged under this node's own slot.

use super::tables::{SlotSpec, TraverserTable};
use crate::concept::{Concept, ConceptMap};
use crate::context::{ContextKey, ContextValue};
use crate::process::{ProcessingContext, Processor, ProcessorSet};
use crate::Result;
use std::sync::Arc;
use tree_sitter::Node;

/// Slot name used for the file's root node
pub const ROOT_SLOT: &str = "file";

/// Slot name for named children without a field name
pub const CHILDREN_SLOT: &str = "children";

/// Immutable dispatch configuration for one extraction run
pub struct TraversalEngine<'t> {
    traversers: &'t TraverserTable,
    processors: &'t ProcessorSet,
}

impl<'t> TraversalEngine<'t> {
    pub fn new(traversers: &'t TraverserTable, processors: &'t ProcessorSet) -> Self {
        Self {
            traversers,
            processors,
        }
    }

    /// Produce the aggregated concept map for a whole file
    pub fn traverse_root(&self, root: Node, ctx: &mut ProcessingContext) -> Result<ConceptMap> {
        self.traverse(root, ROOT_SLOT, None, ctx)
    }

    fn traverse(
        &self,
        node: Node,
        slot: &str,
        index: Option<usize>,
        ctx: &mut ProcessingContext,
    ) -> Result<ConceptMap> {
        let Some(spec) = self.traversers.get(node.kind()) else {
            // Node kinds without a traverser are skipped wholesale.
            return Ok(ConceptMap::new());
        };

        ctx.contexts.push_frame();
        let slot_label = match index {
            Some(i) => format!("{}[{}]", slot, i),
            None => slot.to_string(),
        };
        ctx.contexts
            .set(ContextKey::Slot, ContextValue::Text(slot_label));

        let matched: Vec<Arc<dyn Processor>> = self
            .processors
            .for_kind(node.kind())
            .iter()
            .filter(|p| p.applies(&node, ctx))
            .cloned()
            .collect();

        for processor in &matched {
            processor.before_children(&node, ctx)?;
        }

        let mut children = ConceptMap::new();
        for (child, field, index) in declared_children(&node, spec) {
            let field = field.unwrap_or(CHILDREN_SLOT);
            let child_map = self.traverse(child, field, index, ctx)?;
            children.merge(child_map);
        }

        let mut new_concepts: Vec<Concept> = Vec::new();
        for processor in &matched {
            new_concepts.extend(processor.after_children(&node, ctx, &mut children)?);
        }

        ctx.contexts.pop_frame();

        let mut result = children.retag(slot);
        for concept in new_concepts {
            result.add(slot, concept);
        }
        Ok(result)
    }
}

/// Collect the named children selected by a slot spec, with their field
/// names and list indices
fn declared_children<'tree>(
    node: &Node<'tree>,
    spec: &SlotSpec,
) -> Vec<(Node<'tree>, Option<&'static str>, Option<usize>)> {
    let mut out = Vec::new();
    let mut cursor = node.walk();
    if !cursor.goto_first_child() {
        return out;
    }
    loop {
        let child = cursor.node();
        if child.is_named() {
            let field = cursor.field_name();
            let selected = match spec {
                SlotSpec::AllNamed => true,
                SlotSpec::Fields(fields) => field.map(|f| fields.contains(&f)).unwrap_or(false),
            };
            if selected {
                out.push((child, field, None));
            }
        }
        if !cursor.goto_next_sibling() {
            break;
        }
    }

    // Children sharing a field name (or the anonymous children slot) form a
    // list slot; record their index within it.
    let mut counts: std::collections::BTreeMap<&'static str, usize> = Default::default();
    let mut totals: std::collections::BTreeMap<&'static str, usize> = Default::default();
    for (_, field, _) in &out {
        *totals.entry(field.unwrap_or(CHILDREN_SLOT)).or_default() += 1;
    }
    for (_, field, index) in out.iter_mut() {
        let key = field.unwrap_or(CHILDREN_SLOT);
        if totals[key] > 1 {
            let next = counts.entry(key).or_default();
            *index = Some(*next);
            *next += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::SyntacticOracle;
    use crate::parse::{parse, SourceGrammar};
    use crate::process::{default_processors, FileInfo};
    use crate::traverse::default_traversers;

    #[test]
    fn test_unregistered_kind_is_silent_noop() {
        let traversers = TraverserTable::default();
        let processors = ProcessorSet::default();
        let engine = TraversalEngine::new(&traversers, &processors);

        let tree = parse("const x = 1;", SourceGrammar::TypeScript).unwrap();
        let oracle = SyntacticOracle;
        let mut ctx = ProcessingContext::new(
            "const x = 1;",
            FileInfo::new("/p/a.ts", "./a.ts"),
            &oracle,
        );

        let map = engine.traverse_root(tree.root_node(), &mut ctx).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_default_pipeline_produces_concepts() {
        let traversers = default_traversers();
        let processors = ProcessorSet::build(default_processors());
        let engine = TraversalEngine::new(&traversers, &processors);

        let source = "const x = 1;";
        let tree = parse(source, SourceGrammar::TypeScript).unwrap();
        let oracle = SyntacticOracle;
        let mut ctx =
            ProcessingContext::new(source, FileInfo::new("/p/a.ts", "./a.ts"), &oracle);

        let map = engine.traverse_root(tree.root_node(), &mut ctx).unwrap();
        assert!(!map.is_empty());
    }
}
