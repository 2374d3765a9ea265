//! Export processor - export surface entries
//!
//! Every export statement yields one or more `ExportEntry` concepts. Direct
//! exports schedule their declaration FQN for the end-of-file flush;
//! re-exports (`export ... from`) keep their raw specifier and are flattened
//! by the cross-file pass once every module's surface is known.

use super::imports::{import_specifier_text, module_target};
use super::modules::has_default_keyword;
use super::{ProcessingContext, Processor};
use crate::concept::{Concept, ConceptMap, ExportEntry, ExportKind, RefKind};
use crate::Result;
use tree_sitter::Node;

pub struct ExportProcessor;

impl Processor for ExportProcessor {
    fn name(&self) -> &'static str {
        "export"
    }

    fn node_kinds(&self) -> &'static [&'static str] {
        &["export_statement"]
    }

    /// Only top-level exports form the module's surface; exports inside a
    /// namespace body only affect member visibility
    fn applies(&self, node: &Node, _ctx: &ProcessingContext) -> bool {
        node.parent().map(|p| p.kind() == "program").unwrap_or(false)
    }

    fn after_children(
        &self,
        node: &Node,
        ctx: &mut ProcessingContext,
        _children: &mut ConceptMap,
    ) -> Result<Vec<Concept>> {
        let file_path = ctx.file.absolute.clone();
        let source_spec = import_specifier_text(node, ctx);
        let is_default = has_default_keyword(node);
        let mut out = Vec::new();

        if let Some(declaration) = node.child_by_field_name("declaration") {
            // `export [default] <declaration>` - the declaration's own
            // processor already ran; its concepts stay in the child map.
            let kind = export_kind_for_declaration(declaration.kind());
            for name in declared_names(&declaration, ctx) {
                let reg = if is_default { "default" } else { name.as_str() };
                let id = ctx.next_id();
                ctx.schedule_fqn_resolution(reg, id);
                out.push(Concept::Export(ExportEntry {
                    id,
                    identifier: Some(name.clone()),
                    alias: None,
                    decl_fqn: None,
                    import_source: None,
                    source_in_project: None,
                    is_default,
                    export_kind: kind,
                    file_path: file_path.clone(),
                }));
            }
        } else if let Some(value) = node.child_by_field_name("value") {
            // `export default <expression>`
            let id = ctx.next_id();
            let identifier = if value.kind() == "identifier" {
                let name = ctx.node_text(&value);
                // The named declaration re-registered itself as `default`
                ctx.schedule_fqn_resolution("default", id);
                name
            } else {
                "default".to_string()
            };
            out.push(Concept::Export(ExportEntry {
                id,
                identifier: Some(identifier),
                alias: None,
                decl_fqn: None,
                import_source: None,
                source_in_project: None,
                is_default: true,
                export_kind: ExportKind::Value,
                file_path,
            }));
        } else if let Some(ns) = find_child_of_kind(node, "namespace_export") {
            // `export * as ns from "..."`
            let alias = first_identifier_text(&ns, ctx);
            out.push(Concept::Export(ExportEntry {
                id: ctx.next_id(),
                identifier: None,
                alias,
                decl_fqn: None,
                import_source: source_spec.clone(),
                source_in_project: None,
                is_default: false,
                export_kind: ExportKind::Namespace,
                file_path,
            }));
        } else if has_wildcard(node) {
            // `export * from "..."`
            out.push(Concept::Export(ExportEntry {
                id: ctx.next_id(),
                identifier: None,
                alias: None,
                decl_fqn: None,
                import_source: source_spec.clone(),
                source_in_project: None,
                is_default: false,
                export_kind: ExportKind::Namespace,
                file_path,
            }));
        } else if let Some(clause) = find_child_of_kind(node, "export_clause") {
            let type_only = has_type_keyword(node);
            let mut cursor = clause.walk();
            for specifier in clause.named_children(&mut cursor) {
                if specifier.kind() != "export_specifier" {
                    continue;
                }
                let Some(name) = specifier.child_by_field_name("name") else {
                    continue;
                };
                let identifier = ctx.node_text(&name);
                let alias = specifier
                    .child_by_field_name("alias")
                    .map(|a| ctx.node_text(&a));
                let id = ctx.next_id();
                if source_spec.is_none() {
                    // Local re-export: `export { x }` resolves in this file
                    ctx.schedule_fqn_resolution(&identifier, id);
                }
                out.push(Concept::Export(ExportEntry {
                    id,
                    identifier: Some(identifier),
                    alias,
                    decl_fqn: None,
                    import_source: source_spec.clone(),
                    source_in_project: None,
                    is_default: false,
                    export_kind: if type_only || has_type_keyword(&specifier) {
                        ExportKind::Type
                    } else {
                        ExportKind::Value
                    },
                    file_path: file_path.clone(),
                }));
            }
        }

        // Re-exports also depend on the source module
        if let Some(spec) = source_spec {
            let target = module_target(&spec, ctx);
            out.push(Concept::Dependency(ctx.register_dependency(
                &target.global,
                RefKind::Module,
                false,
            )?));
        }

        Ok(out)
    }
}

/// Exported names declared by an export's declaration child; variable
/// statements may declare several at once
fn declared_names(declaration: &Node, ctx: &ProcessingContext) -> Vec<String> {
    match declaration.kind() {
        "lexical_declaration" | "variable_declaration" => {
            let mut cursor = declaration.walk();
            declaration
                .named_children(&mut cursor)
                .filter(|d| d.kind() == "variable_declarator")
                .filter_map(|d| d.child_by_field_name("name"))
                .filter(|n| n.kind() == "identifier")
                .map(|n| ctx.node_text(&n))
                .collect()
        }
        _ => declaration
            .child_by_field_name("name")
            .map(|n| vec![ctx.node_text(&n)])
            .unwrap_or_else(|| vec!["default".to_string()]),
    }
}

fn export_kind_for_declaration(kind: &str) -> ExportKind {
    match kind {
        "interface_declaration" | "type_alias_declaration" => ExportKind::Type,
        "internal_module" | "module" => ExportKind::Namespace,
        _ => ExportKind::Value,
    }
}

fn find_child_of_kind<'tree>(node: &Node<'tree>, kind: &str) -> Option<Node<'tree>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|c| c.kind() == kind);
    found
}

fn has_wildcard(node: &Node) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|c| c.kind() == "*");
    found
}

fn has_type_keyword(node: &Node) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|c| c.kind() == "type");
    found
}

fn first_identifier_text(node: &Node, ctx: &ProcessingContext) -> Option<String> {
    let mut cursor = node.walk();
    let found = node
        .named_children(&mut cursor)
        .find(|c| c.kind() == "identifier" || c.kind() == "module_export_name")
        .map(|n| ctx.node_text(&n));
    found
}
