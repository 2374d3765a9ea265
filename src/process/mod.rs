//! Processor Set - node-kind-specific units of extraction logic
//!
//! A processor declares the node kinds it activates on plus a boolean check
//! over the current processing context. Its before-children hook mutates the
//! freshly pushed context frame (opening scopes, setting flags); its
//! after-children hook consumes the child concepts it promotes and returns
//! newly created ones.
//!
//! The default set covers the TypeScript language concepts; extensions add
//! processors through the `ExtractorBuilder`, never replacing base entries.

pub mod declarations;
pub mod exports;
pub mod imports;
pub mod modules;
pub mod references;

use crate::concept::{Concept, ConceptId, ConceptMap, Dependency, RefKind};
use crate::context::LocalContexts;
use crate::fqn::Fqn;
use crate::oracle::TypeOracle;
use crate::resolve::SymbolTable;
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::sync::Arc;
use tree_sitter::Node;

/// Identity of the file being processed
#[derive(Debug, Clone)]
pub struct FileInfo {
    /// Normalized absolute path
    pub absolute: String,
    /// Project-relative `./...` path
    pub relative: String,
    /// Global FQN of the module itself (quoted absolute path)
    pub module_global: String,
    /// Local FQN of the module itself (quoted relative path)
    pub module_local: String,
}

impl FileInfo {
    pub fn new(absolute: impl Into<String>, relative: impl Into<String>) -> Self {
        let absolute = absolute.into();
        let relative = relative.into();
        let module_global = crate::fqn::module_prefix(&absolute);
        let module_local = crate::fqn::module_prefix(&relative);
        Self {
            absolute,
            relative,
            module_global,
            module_local,
        }
    }
}

/// Mutable per-file state threaded through the traversal.
///
/// Carries the inherited-attribute stack, the symbol table and the concept
/// id allocator. Owning it per file keeps per-file extraction independent;
/// nothing here is shared across files.
pub struct ProcessingContext<'a> {
    pub source: &'a str,
    pub file: FileInfo,
    pub contexts: LocalContexts,
    pub table: SymbolTable,
    pub oracle: &'a dyn TypeOracle,
    next_id: u32,
}

impl<'a> ProcessingContext<'a> {
    pub fn new(source: &'a str, file: FileInfo, oracle: &'a dyn TypeOracle) -> Self {
        Self {
            source,
            file,
            contexts: LocalContexts::new(),
            table: SymbolTable::new(),
            oracle,
            next_id: 0,
        }
    }

    /// Allocate the next locally-unique concept id
    pub fn next_id(&mut self) -> ConceptId {
        self.next_id += 1;
        ConceptId(self.next_id)
    }

    /// Source text of a node
    pub fn node_text(&self, node: &Node) -> String {
        node.utf8_text(self.source.as_bytes())
            .unwrap_or_default()
            .to_string()
    }

    /// Register a declaration in the current scope's index, or in the
    /// enclosing scope when the declaration opened its own body scope first.
    pub fn register_declaration(
        &mut self,
        local_name: &str,
        inside_own_scope: bool,
    ) -> Result<Fqn> {
        let scope = if inside_own_scope {
            self.contexts.enclosing_scope()
        } else {
            self.contexts.current_scope()
        };
        let scope = scope.ok_or_else(|| {
            Error::Usage(format!(
                "no enclosing scope to register declaration {}",
                local_name
            ))
        })?;
        let fqn = Fqn::new(
            crate::fqn::join_segment(&scope.global, local_name),
            crate::fqn::join_segment(&scope.local, local_name),
        );
        let scope_global = scope.global.clone();
        self.table.register(&scope_global, local_name, fqn.clone());
        Ok(fqn)
    }

    /// Snapshot the enclosing scopes and queue a reference for the
    /// end-of-file resolution flush
    pub fn schedule_fqn_resolution(&mut self, name: &str, id: ConceptId) {
        let snapshot = self.contexts.scope_snapshot();
        self.table.schedule(snapshot, name, id);
    }

    /// Create a dependency edge from the nearest dependency-source scope.
    ///
    /// Declaration-kind targets are auto-scheduled for resolution when
    /// requested; module-kind targets carry their path literal directly.
    pub fn register_dependency(
        &mut self,
        target_text: &str,
        target_kind: RefKind,
        auto_schedule: bool,
    ) -> Result<Dependency> {
        let source = self
            .contexts
            .dependency_source()
            .ok_or_else(|| {
                Error::Usage(format!(
                    "no dependency source scope for reference {}",
                    target_text
                ))
            })?
            .to_string();
        let source_kind = if source == self.file.module_global {
            RefKind::Module
        } else {
            RefKind::Declaration
        };

        let id = self.next_id();
        if auto_schedule && target_kind == RefKind::Declaration {
            self.schedule_fqn_resolution(target_text, id);
        }
        Ok(Dependency {
            id,
            source,
            source_kind,
            target_text: target_text.to_string(),
            target: (target_kind == RefKind::Module).then(|| target_text.to_string()),
            target_kind,
            cardinality: 1,
        })
    }
}

/// A node-kind-specific unit of extraction logic
pub trait Processor: Send + Sync {
    /// Display name, for diagnostics
    fn name(&self) -> &'static str;

    /// Node kinds this processor activates on
    fn node_kinds(&self) -> &'static [&'static str];

    /// Additional activation check over the processing context
    fn applies(&self, _node: &Node, _ctx: &ProcessingContext) -> bool {
        true
    }

    /// Runs before child slots are dispatched; may mutate the new frame
    fn before_children(&self, _node: &Node, _ctx: &mut ProcessingContext) -> Result<()> {
        Ok(())
    }

    /// Runs after child slots returned; must consume promoted child entries
    /// and return newly created concepts
    fn after_children(
        &self,
        _node: &Node,
        _ctx: &mut ProcessingContext,
        _children: &mut ConceptMap,
    ) -> Result<Vec<Concept>> {
        Ok(Vec::new())
    }
}

/// Immutable processor dispatch table, kind → processors in registration order
#[derive(Default, Clone)]
pub struct ProcessorSet {
    by_kind: BTreeMap<&'static str, Vec<Arc<dyn Processor>>>,
}

impl ProcessorSet {
    /// Build the dispatch table from an ordered processor list
    pub fn build(processors: Vec<Arc<dyn Processor>>) -> Self {
        let mut by_kind: BTreeMap<&'static str, Vec<Arc<dyn Processor>>> = BTreeMap::new();
        for processor in processors {
            for kind in processor.node_kinds() {
                by_kind
                    .entry(*kind)
                    .or_default()
                    .push(Arc::clone(&processor));
            }
        }
        Self { by_kind }
    }

    /// Processors registered for a node kind
    pub fn for_kind(&self, kind: &str) -> &[Arc<dyn Processor>] {
        self.by_kind.get(kind).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// The base processor list covering the TypeScript language concepts
pub fn default_processors() -> Vec<Arc<dyn Processor>> {
    vec![
        Arc::new(modules::ModuleProcessor),
        Arc::new(declarations::ClassProcessor),
        Arc::new(declarations::MethodProcessor),
        Arc::new(declarations::PropertyProcessor),
        Arc::new(declarations::InterfaceProcessor),
        Arc::new(declarations::FunctionProcessor),
        Arc::new(declarations::VariableProcessor),
        Arc::new(declarations::EnumProcessor),
        Arc::new(declarations::TypeAliasProcessor),
        Arc::new(declarations::NamespaceProcessor),
        Arc::new(declarations::BlockScopeProcessor),
        Arc::new(imports::ImportProcessor),
        Arc::new(exports::ExportProcessor),
        Arc::new(references::CallProcessor),
        Arc::new(references::NewProcessor),
        Arc::new(references::TypeRefProcessor),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullProcessor;
    impl Processor for NullProcessor {
        fn name(&self) -> &'static str {
            "null"
        }
        fn node_kinds(&self) -> &'static [&'static str] {
            &["program", "class_declaration"]
        }
    }

    #[test]
    fn test_processor_set_dispatch() {
        let set = ProcessorSet::build(vec![Arc::new(NullProcessor)]);
        assert_eq!(set.for_kind("program").len(), 1);
        assert_eq!(set.for_kind("class_declaration").len(), 1);
        assert!(set.for_kind("unknown_kind").is_empty());
    }
}
