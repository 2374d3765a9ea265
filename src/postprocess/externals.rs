//! External dependency aggregation
//!
//! Scans every merged dependency edge; targets whose owning module the
//! classifier marks external get a synthesized `ExternalModule` and, for
//! declaration-level targets, an `ExternalDeclaration` under it. Both are
//! deduplicated by FQN.

use super::PostProcessor;
use crate::concept::{Concept, ExternalDeclaration, ExternalModule, RefKind};
use crate::extract::ExtractionResult;
use crate::fqn::{join_segment, module_prefix, split_module};
use crate::modpath::ModulePathClassifier;
use crate::project::ProjectContext;
use crate::Result;
use std::collections::BTreeMap;

pub struct ExternalDependencyAggregator;

impl PostProcessor for ExternalDependencyAggregator {
    fn name(&self) -> &'static str {
        "externals"
    }

    fn run(
        &self,
        result: &mut ExtractionResult,
        _project: &ProjectContext,
        classifier: &ModulePathClassifier,
    ) -> Result<()> {
        // Import-derived targets carry suffixless module paths; rewrite them
        // to the module files extraction actually produced before deciding
        // externality.
        for file in &mut result.files {
            file.concepts.for_each_mut(&mut |concept| {
                if let Concept::Dependency(dep) = concept {
                    if let Some(target) = dep.target.clone() {
                        if let Some(canonical) = canonicalize_target(&target, classifier) {
                            dep.target = Some(canonical);
                        }
                    }
                }
            });
        }

        let targets: Vec<(String, RefKind)> = result
            .dependencies()
            .iter()
            .filter_map(|dep| dep.target.clone().map(|t| (t, dep.target_kind)))
            .collect();

        let mut modules: BTreeMap<String, ExternalModule> = BTreeMap::new();
        for (target, kind) in targets {
            let (module_part, member) = match kind {
                RefKind::Module => (unquote(&target), String::new()),
                RefKind::Declaration => split_module(&target),
            };
            if module_part.is_empty() || !classifier.is_external(&module_part) {
                continue;
            }

            let module = modules
                .entry(module_part.clone())
                .or_insert_with(|| ExternalModule {
                    fqn: module_part.clone(),
                    declarations: Vec::new(),
                });
            if kind == RefKind::Declaration && !member.is_empty() {
                if !module.declarations.iter().any(|d| d.fqn == target) {
                    module.declarations.push(ExternalDeclaration {
                        name: member,
                        fqn: target,
                    });
                }
            }
        }

        result.external_modules = modules.into_values().collect();
        Ok(())
    }
}

/// Rewrite a target FQN whose quoted module part resolves to an extracted
/// module under a different (suffixed or index) path
fn canonicalize_target(target: &str, classifier: &ModulePathClassifier) -> Option<String> {
    if !target.starts_with('"') {
        return None;
    }
    let (module_part, member) = split_module(target);
    let resolved = classifier.resolve_module_path(&module_part)?;
    if resolved == module_part {
        return None;
    }
    let base = module_prefix(&resolved);
    Some(if member.is_empty() {
        base
    } else {
        join_segment(&base, &member)
    })
}

/// Strip the FQN quoting from a module-path literal; package names pass
/// through unchanged
fn unquote(target: &str) -> String {
    target
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(target)
        .to_string()
}
