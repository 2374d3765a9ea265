//! Reference processors - call, construction and type-position usages
//!
//! Each reference becomes a dependency edge whose declaration target is
//! auto-scheduled for the end-of-file flush. Complex receiver expressions
//! (computed access, call chains) yield no edge; only plain dotted paths
//! are resolvable against the declaration index.

use super::{ProcessingContext, Processor};
use crate::concept::{Concept, ConceptMap, RefKind};
use crate::Result;
use tree_sitter::Node;

pub struct CallProcessor;

impl Processor for CallProcessor {
    fn name(&self) -> &'static str {
        "call"
    }

    fn node_kinds(&self) -> &'static [&'static str] {
        &["call_expression"]
    }

    fn after_children(
        &self,
        node: &Node,
        ctx: &mut ProcessingContext,
        _children: &mut ConceptMap,
    ) -> Result<Vec<Concept>> {
        let Some(function) = node.child_by_field_name("function") else {
            return Ok(Vec::new());
        };
        let Some(path) = dotted_path_text(&function, ctx) else {
            return Ok(Vec::new());
        };
        let dep = ctx.register_dependency(&path, RefKind::Declaration, true)?;
        Ok(vec![Concept::Dependency(dep)])
    }
}

pub struct NewProcessor;

impl Processor for NewProcessor {
    fn name(&self) -> &'static str {
        "new"
    }

    fn node_kinds(&self) -> &'static [&'static str] {
        &["new_expression"]
    }

    fn after_children(
        &self,
        node: &Node,
        ctx: &mut ProcessingContext,
        _children: &mut ConceptMap,
    ) -> Result<Vec<Concept>> {
        let Some(ctor) = node.child_by_field_name("constructor") else {
            return Ok(Vec::new());
        };
        let Some(path) = dotted_path_text(&ctor, ctx) else {
            return Ok(Vec::new());
        };
        let dep = ctx.register_dependency(&path, RefKind::Declaration, true)?;
        Ok(vec![Concept::Dependency(dep)])
    }
}

pub struct TypeRefProcessor;

impl Processor for TypeRefProcessor {
    fn name(&self) -> &'static str {
        "type_ref"
    }

    fn node_kinds(&self) -> &'static [&'static str] {
        &["type_identifier", "nested_type_identifier"]
    }

    fn after_children(
        &self,
        node: &Node,
        ctx: &mut ProcessingContext,
        _children: &mut ConceptMap,
    ) -> Result<Vec<Concept>> {
        let path = ctx.node_text(node);
        if path.is_empty() {
            return Ok(Vec::new());
        }
        let dep = ctx.register_dependency(&path, RefKind::Declaration, true)?;
        Ok(vec![Concept::Dependency(dep)])
    }
}

/// Plain dotted path of an identifier or member chain, or `None` for
/// anything the declaration index cannot express
pub(crate) fn dotted_path_text(node: &Node, ctx: &ProcessingContext) -> Option<String> {
    match node.kind() {
        "identifier" | "this" | "super" => Some(ctx.node_text(node)),
        "member_expression" => {
            let object = node.child_by_field_name("object")?;
            let property = node.child_by_field_name("property")?;
            if property.kind() != "property_identifier" {
                return None;
            }
            let head = dotted_path_text(&object, ctx)?;
            Some(format!("{}.{}", head, ctx.node_text(&property)))
        }
        _ => None,
    }
}
