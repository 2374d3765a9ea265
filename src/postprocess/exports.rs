//! Export-chain resolution - flatten re-exports into direct exports
//!
//! For each module the full export surface is computed depth-first:
//! re-exports from in-project modules recurse into that module's surface,
//! wildcard re-exports flatten to one entry per underlying export, and
//! named re-exports substitute the underlying declaration FQN. A visited
//! set per resolution call detects re-export cycles; a cycle is a soft
//! failure like every other export-resolution error.

use super::PostProcessor;
use crate::concept::{Concept, ConceptKind, ExportEntry};
use crate::extract::ExtractionResult;
use crate::fqn::{join_segment, module_prefix, Fqn};
use crate::modpath::{classify_specifier, ModulePathClassifier, PathClass};
use crate::project::{normalize_path, ProjectContext};
use crate::traverse::engine::ROOT_SLOT;
use crate::Result;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

pub struct ExportChainResolver;

impl PostProcessor for ExportChainResolver {
    fn name(&self) -> &'static str {
        "export_chain"
    }

    fn run(
        &self,
        result: &mut ExtractionResult,
        _project: &ProjectContext,
        classifier: &ModulePathClassifier,
    ) -> Result<()> {
        // Surfaces are computed read-only against the raw export sets, then
        // written back in one sweep; resolving a surface twice yields the
        // same set.
        let mut surfaces: BTreeMap<String, Vec<ExportEntry>> = BTreeMap::new();
        for path in result.module_paths() {
            let mut visiting = BTreeSet::new();
            let surface = resolve_surface(&path, result, classifier, &mut visiting);
            surfaces.insert(path, surface);
        }

        for file in &mut result.files {
            file.concepts.take_kind(ConceptKind::Export);
            if let Some(surface) = surfaces.remove(&file.path) {
                for entry in surface {
                    file.concepts.add(ROOT_SLOT, Concept::Export(entry));
                }
            }
        }
        Ok(())
    }
}

/// Full export surface of one module, re-export chains flattened
fn resolve_surface(
    module_path: &str,
    result: &ExtractionResult,
    classifier: &ModulePathClassifier,
    visiting: &mut BTreeSet<String>,
) -> Vec<ExportEntry> {
    if !visiting.insert(module_path.to_string()) {
        tracing::warn!("Re-export cycle detected at {}; skipping", module_path);
        return Vec::new();
    }

    let mut out = Vec::new();
    for mut entry in result.exports_of(module_path) {
        let Some(spec) = entry.import_source.clone() else {
            out.push(entry);
            continue;
        };

        match resolve_in_project(&spec, module_path, classifier) {
            Some(target) => {
                entry.source_in_project = Some(true);
                let underlying = resolve_surface(&target, result, classifier, visiting);
                if let Some(wanted) = entry.identifier.clone() {
                    // Named re-export: substitute the underlying FQN
                    match underlying.iter().find(|u| exported_name(u) == wanted) {
                        Some(u) => {
                            entry.decl_fqn = u.decl_fqn.clone();
                            out.push(entry);
                        }
                        None => {
                            tracing::warn!(
                                "Unresolved re-export {} from {} in {}; dropping",
                                wanted,
                                spec,
                                module_path
                            );
                        }
                    }
                } else if entry.alias.is_some() {
                    // `export * as ns`: a single entry pointing at the
                    // target module itself
                    entry.decl_fqn = Some(module_fqn_of(&target, result));
                    out.push(entry);
                } else {
                    // `export *`: one concrete entry per underlying export,
                    // aliases preserved; defaults do not pass through a
                    // wildcard.
                    for u in underlying.into_iter().filter(|u| !u.is_default) {
                        out.push(ExportEntry {
                            id: entry.id,
                            identifier: Some(exported_name(&u)),
                            alias: None,
                            decl_fqn: u.decl_fqn,
                            import_source: Some(spec.clone()),
                            source_in_project: Some(true),
                            is_default: false,
                            export_kind: u.export_kind,
                            file_path: entry.file_path.clone(),
                        });
                    }
                }
            }
            None => {
                entry.source_in_project = Some(false);
                match resolve_external_source(&spec, module_path, classifier) {
                    Some(base) => {
                        let global = match &entry.identifier {
                            Some(ident) => join_segment(&base, ident),
                            None => base,
                        };
                        entry.decl_fqn = Some(Fqn::new(global.clone(), global));
                        out.push(entry);
                    }
                    None => {
                        tracing::warn!(
                            "Unresolvable external re-export source {} in {}; dropping",
                            spec,
                            module_path
                        );
                    }
                }
            }
        }
    }

    visiting.remove(module_path);
    out
}

/// Name under which an entry appears on its module's surface
fn exported_name(entry: &ExportEntry) -> String {
    if entry.is_default {
        return "default".to_string();
    }
    entry
        .alias
        .clone()
        .or_else(|| entry.identifier.clone())
        .unwrap_or_else(|| "default".to_string())
}

/// Resolve a re-export specifier to an extracted module path, trying the
/// raw specifier first and then the type-declaration-file heuristic
fn resolve_in_project(
    spec: &str,
    from_module: &str,
    classifier: &ModulePathClassifier,
) -> Option<String> {
    if let Some(found) = resolve_spec_path(spec, from_module, classifier) {
        return Some(found);
    }
    for candidate in classifier.types_fallback(spec) {
        if classify_specifier(&candidate) == PathClass::Package {
            continue;
        }
        if let Some(found) = resolve_spec_path(&candidate, from_module, classifier) {
            return Some(found);
        }
    }
    None
}

fn resolve_spec_path(
    spec: &str,
    from_module: &str,
    classifier: &ModulePathClassifier,
) -> Option<String> {
    let base = match classify_specifier(spec) {
        PathClass::Package => return None,
        PathClass::Absolute => normalize_path(Path::new(spec)),
        PathClass::Relative => {
            let dir = from_module.rsplit_once('/').map(|(d, _)| d).unwrap_or(".");
            normalize_path(Path::new(&format!("{}/{}", dir, spec)))
        }
    };
    classifier.resolve_module_path(&base)
}

/// External source fallback chain: known package FQN, node-style resolution
/// mapped to a package name, direct path normalization, `@types/` heuristic
fn resolve_external_source(
    spec: &str,
    from_module: &str,
    classifier: &ModulePathClassifier,
) -> Option<String> {
    // A bare specifier is its own external-module FQN
    if classify_specifier(spec) == PathClass::Package {
        return Some(spec.to_string());
    }

    // Node-style resolution to a real file, mapped back to a package
    if let Some(real) = classifier.node_resolve(spec, from_module) {
        if let Some(package) = classifier.package_name_for_path(&real) {
            return Some(package);
        }
        // Direct path-normalization match
        return Some(module_prefix(&real));
    }

    // Last resort: the @types companion package
    classifier
        .types_fallback(spec)
        .into_iter()
        .find(|c| classify_specifier(c) == PathClass::Package)
}

/// FQN of a module concept by path, falling back to the quoted path
fn module_fqn_of(path: &str, result: &ExtractionResult) -> Fqn {
    result
        .file(path)
        .and_then(|file| {
            file.concepts
                .of_kind(ConceptKind::Module)
                .find_map(|c| match c {
                    Concept::Module(m) => Some(m.fqn.clone()),
                    _ => None,
                })
        })
        .unwrap_or_else(|| Fqn::new(module_prefix(path), module_prefix(path)))
}
