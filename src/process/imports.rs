//! Import processor - module dependencies and imported-name registration
//!
//! Imported bindings are registered in the module scope's declaration index
//! pointing at the source module's FQN, so later references resolve without
//! analyzing the other file. A namespace import registers the module FQN
//! itself; dotted-prefix resolution then expands `ns.member` chains.

use super::{ProcessingContext, Processor};
use crate::concept::{Concept, ConceptMap, RefKind};
use crate::fqn::Fqn;
use crate::Result;
use tree_sitter::Node;

pub struct ImportProcessor;

impl Processor for ImportProcessor {
    fn name(&self) -> &'static str {
        "import"
    }

    fn node_kinds(&self) -> &'static [&'static str] {
        &["import_statement"]
    }

    fn after_children(
        &self,
        node: &Node,
        ctx: &mut ProcessingContext,
        _children: &mut ConceptMap,
    ) -> Result<Vec<Concept>> {
        let Some(spec) = import_specifier_text(node, ctx) else {
            return Ok(Vec::new());
        };
        let target = module_target(&spec, ctx);

        let mut out = Vec::new();
        out.push(Concept::Dependency(ctx.register_dependency(
            &target.global,
            RefKind::Module,
            false,
        )?));

        let Some(clause) = find_import_clause(node) else {
            // Side-effect import: `import "./polyfill";`
            return Ok(out);
        };

        let mut cursor = clause.walk();
        let bindings: Vec<Node> = clause.named_children(&mut cursor).collect();
        for binding in bindings {
            match binding.kind() {
                "identifier" => {
                    // Default import binds the source module's `default`
                    let local = ctx.node_text(&binding);
                    ctx.table.register(
                        &ctx.file.module_global.clone(),
                        &local,
                        target.join("default"),
                    );
                    out.push(Concept::Dependency(ctx.register_dependency(
                        &local,
                        RefKind::Declaration,
                        true,
                    )?));
                }
                "named_imports" => {
                    let mut inner = binding.walk();
                    for specifier in binding.named_children(&mut inner) {
                        if specifier.kind() != "import_specifier" {
                            continue;
                        }
                        let Some(name) = specifier.child_by_field_name("name") else {
                            continue;
                        };
                        let imported = ctx.node_text(&name);
                        let local = specifier
                            .child_by_field_name("alias")
                            .map(|a| ctx.node_text(&a))
                            .unwrap_or_else(|| imported.clone());
                        ctx.table.register(
                            &ctx.file.module_global.clone(),
                            &local,
                            target.join(&imported),
                        );
                        out.push(Concept::Dependency(ctx.register_dependency(
                            &local,
                            RefKind::Declaration,
                            true,
                        )?));
                    }
                }
                "namespace_import" => {
                    if let Some(alias) = first_identifier(&binding) {
                        let local = ctx.node_text(&alias);
                        ctx.table
                            .register(&ctx.file.module_global.clone(), &local, target.clone());
                    }
                }
                _ => {}
            }
        }
        Ok(out)
    }
}

/// Trimmed module specifier string of an import statement
pub(crate) fn import_specifier_text(node: &Node, ctx: &ProcessingContext) -> Option<String> {
    let source = node.child_by_field_name("source")?;
    let raw = ctx.node_text(&source);
    Some(
        raw.trim_matches(|c| c == '"' || c == '\'' || c == '`')
            .to_string(),
    )
}

/// FQN base for an import target.
///
/// Relative and absolute specifiers become quoted normalized paths rooted at
/// the importing file; bare specifiers stay as the package name. Suffix
/// resolution happens later, against the set of modules extraction actually
/// produced.
pub(crate) fn module_target(spec: &str, ctx: &ProcessingContext) -> Fqn {
    if spec.starts_with('.') {
        let dir = parent_dir(&ctx.file.absolute);
        let abs = crate::project::normalize_path(std::path::Path::new(&format!(
            "{}/{}",
            dir, spec
        )));
        let rel_dir = parent_dir(&ctx.file.relative);
        let rel = crate::project::normalize_path(std::path::Path::new(&format!(
            "{}/{}",
            rel_dir, spec
        )));
        Fqn::new(
            crate::fqn::module_prefix(&abs),
            crate::fqn::module_prefix(&rel),
        )
    } else if spec.starts_with('/') {
        let normalized = crate::project::normalize_path(std::path::Path::new(spec));
        let prefix = crate::fqn::module_prefix(&normalized);
        Fqn::new(prefix.clone(), prefix)
    } else {
        Fqn::new(spec, spec)
    }
}

fn parent_dir(path: &str) -> String {
    match path.rsplit_once('/') {
        Some((dir, _)) if !dir.is_empty() => dir.to_string(),
        _ => ".".to_string(),
    }
}

fn find_import_clause<'tree>(node: &Node<'tree>) -> Option<Node<'tree>> {
    let mut cursor = node.walk();
    let found = node
        .named_children(&mut cursor)
        .find(|c| c.kind() == "import_clause");
    found
}

fn first_identifier<'tree>(node: &Node<'tree>) -> Option<Node<'tree>> {
    let mut cursor = node.walk();
    let found = node
        .named_children(&mut cursor)
        .find(|c| c.kind() == "identifier");
    found
}
