//! Module processor - file-level scope and the Module concept
//!
//! Opens the module scope, seeds the dependency source, and pre-records the
//! `export default name;` identifier so declarations encountered later can
//! register themselves under the literal name `default`.

use super::{ProcessingContext, Processor};
use crate::concept::{Concept, ConceptMap, Metadata, ModuleConcept};
use crate::context::{ContextKey, ContextValue};
use crate::fqn::Fqn;
use crate::Result;
use tree_sitter::Node;

pub struct ModuleProcessor;

impl Processor for ModuleProcessor {
    fn name(&self) -> &'static str {
        "module"
    }

    fn node_kinds(&self) -> &'static [&'static str] {
        &["program"]
    }

    fn before_children(&self, node: &Node, ctx: &mut ProcessingContext) -> Result<()> {
        let module_global = ctx.file.module_global.clone();
        let module_local = ctx.file.module_local.clone();
        ctx.contexts.open_module_scope(&module_global, &module_local);
        ctx.contexts
            .set(ContextKey::DependencySource, ContextValue::Text(module_global));

        // `export default name;` marks an already-declared symbol as the
        // default export. Record the identifier before children run so the
        // declaration registers itself under "default".
        if let Some(name) = scan_default_export_identifier(node, ctx.source) {
            ctx.contexts
                .set(ContextKey::DefaultExportName, ContextValue::Text(name));
        }
        Ok(())
    }

    fn after_children(
        &self,
        _node: &Node,
        ctx: &mut ProcessingContext,
        _children: &mut ConceptMap,
    ) -> Result<Vec<Concept>> {
        Ok(vec![Concept::Module(ModuleConcept {
            fqn: Fqn::new(&ctx.file.module_global, &ctx.file.module_local),
            path: ctx.file.absolute.clone(),
            relative_path: ctx.file.relative.clone(),
            metadata: Metadata::new(),
        })])
    }
}

/// Find the identifier of a statement-form default export, if any
fn scan_default_export_identifier(program: &Node, source: &str) -> Option<String> {
    let mut cursor = program.walk();
    for statement in program.named_children(&mut cursor) {
        if statement.kind() != "export_statement" || !has_default_keyword(&statement) {
            continue;
        }
        if let Some(value) = statement.child_by_field_name("value") {
            if value.kind() == "identifier" {
                return value.utf8_text(source.as_bytes()).ok().map(String::from);
            }
        }
    }
    None
}

/// True if an export statement carries the `default` keyword
pub(crate) fn has_default_keyword(export: &Node) -> bool {
    let mut cursor = export.walk();
    let found = export.children(&mut cursor).any(|c| c.kind() == "default");
    found
}
