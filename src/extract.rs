//! Extraction pipeline - per-file runs, aggregation and post-processing
//!
//! `ExtractorBuilder` takes the base configuration plus extensions and seals
//! them into one immutable dispatch configuration before any file is
//! processed. Files run sequentially; each owns its context stack and
//! resolver queue. Cross-file post-processors run strictly after all
//! per-file extraction completes.

use crate::concept::{Concept, ConceptKind, ConceptMap, Dependency, ExportEntry, ExternalModule};
use crate::modpath::ModulePathClassifier;
use crate::oracle::TypeOracle;
use crate::parse::{grammar_for_path, parse};
use crate::postprocess::{default_post_processors, PostProcessor};
use crate::process::{default_processors, FileInfo, ProcessingContext, Processor, ProcessorSet};
use crate::project::ProjectContext;
use crate::resolve::merge_dependencies;
use crate::traverse::engine::ROOT_SLOT;
use crate::traverse::{default_traversers, SlotSpec, TraversalEngine, TraverserTable};
use crate::Result;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Concepts extracted from one source file
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileExtraction {
    /// Normalized absolute path
    pub path: String,
    /// Project-relative path
    pub relative_path: String,
    pub concepts: ConceptMap,
}

/// Counters for one extraction run
#[derive(Debug, Default, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionStats {
    pub files: usize,
    pub concepts: usize,
    pub dependencies_kept: usize,
    pub dependencies_dropped: usize,
    pub external_modules: usize,
}

impl fmt::Display for ExtractionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Extraction Stats:")?;
        writeln!(f, "  Files: {}", self.files)?;
        writeln!(f, "  Concepts: {}", self.concepts)?;
        writeln!(f, "  Dependencies kept: {}", self.dependencies_kept)?;
        writeln!(f, "  Dependencies dropped: {}", self.dependencies_dropped)?;
        writeln!(f, "  External modules: {}", self.external_modules)
    }
}

/// Final concept set handed to the output generator
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub files: Vec<FileExtraction>,
    pub external_modules: Vec<ExternalModule>,
    #[serde(skip)]
    pub stats: ExtractionStats,
}

impl ExtractionResult {
    /// Extraction of one file by absolute path
    pub fn file(&self, path: &str) -> Option<&FileExtraction> {
        self.files.iter().find(|f| f.path == path)
    }

    /// Absolute paths of all extracted modules
    pub fn module_paths(&self) -> Vec<String> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }

    /// Raw export entries of one module
    pub fn exports_of(&self, path: &str) -> Vec<ExportEntry> {
        let Some(file) = self.file(path) else {
            return Vec::new();
        };
        file.concepts
            .of_kind(ConceptKind::Export)
            .filter_map(|c| match c {
                Concept::Export(e) => Some(e.clone()),
                _ => None,
            })
            .collect()
    }

    /// All merged dependency edges across files
    pub fn dependencies(&self) -> Vec<&Dependency> {
        self.files
            .iter()
            .flat_map(|f| f.concepts.of_kind(ConceptKind::Dependency))
            .filter_map(|c| match c {
                Concept::Dependency(d) => Some(d),
                _ => None,
            })
            .collect()
    }

    /// Serialize to the nested records the graph loader consumes
    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Immutable extraction pipeline
pub struct Extractor {
    traversers: TraverserTable,
    processors: ProcessorSet,
    post_processors: Vec<Arc<dyn PostProcessor>>,
}

/// Pipeline construction: base configuration plus purely additive extensions
pub struct ExtractorBuilder {
    traversers: TraverserTable,
    processors: Vec<Arc<dyn Processor>>,
    post_processors: Vec<Arc<dyn PostProcessor>>,
}

impl Default for ExtractorBuilder {
    fn default() -> Self {
        Self {
            traversers: default_traversers(),
            processors: default_processors(),
            post_processors: default_post_processors(),
        }
    }
}

impl ExtractorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an extension traverser; base entries win on conflict
    pub fn with_traverser(mut self, kind: &'static str, spec: SlotSpec) -> Self {
        self.traversers.register(kind, spec);
        self
    }

    /// Append an extension processor
    pub fn with_processor(mut self, processor: Arc<dyn Processor>) -> Self {
        self.processors.push(processor);
        self
    }

    /// Append an extension post-processor
    pub fn with_post_processor(mut self, post: Arc<dyn PostProcessor>) -> Self {
        self.post_processors.push(post);
        self
    }

    pub fn build(self) -> Extractor {
        Extractor {
            traversers: self.traversers,
            processors: ProcessorSet::build(self.processors),
            post_processors: self.post_processors,
        }
    }
}

impl Extractor {
    pub fn builder() -> ExtractorBuilder {
        ExtractorBuilder::new()
    }

    /// Build the default pipeline
    pub fn new() -> Self {
        ExtractorBuilder::new().build()
    }

    /// Extract every project source file, then run the cross-file passes
    pub fn extract_project(
        &self,
        project: &ProjectContext,
        oracle: &dyn TypeOracle,
    ) -> Result<ExtractionResult> {
        let mut result = ExtractionResult::default();
        let mut dep_stats = (0usize, 0usize);

        for path in &project.source_files {
            let source = std::fs::read_to_string(path)?;
            let (file, kept, dropped) = self.extract_file(project, path, &source, oracle)?;
            dep_stats.0 += kept;
            dep_stats.1 += dropped;
            result.files.push(file);
        }

        let mut classifier = ModulePathClassifier::new(project);
        classifier.record_modules(result.module_paths());

        for post in &self.post_processors {
            tracing::debug!("Running post-processor {}", post.name());
            post.run(&mut result, project, &classifier)?;
        }

        result.stats = ExtractionStats {
            files: result.files.len(),
            concepts: result.files.iter().map(|f| f.concepts.len()).sum(),
            dependencies_kept: dep_stats.0,
            dependencies_dropped: dep_stats.1,
            external_modules: result.external_modules.len(),
        };
        Ok(result)
    }

    /// Extract one file from source text.
    ///
    /// Runs the traversal, then the end-of-file sequence: resolution flush,
    /// dependency merge, FQN materialization.
    pub fn extract_source(
        &self,
        project: &ProjectContext,
        path: &Path,
        source: &str,
        oracle: &dyn TypeOracle,
    ) -> Result<FileExtraction> {
        self.extract_file(project, path, source, oracle)
            .map(|(file, _, _)| file)
    }

    fn extract_file(
        &self,
        project: &ProjectContext,
        path: &Path,
        source: &str,
        oracle: &dyn TypeOracle,
    ) -> Result<(FileExtraction, usize, usize)> {
        let absolute = project.absolute_path(path);
        let relative = project.relative_path(path)?;
        tracing::debug!("Extracting {}", absolute);

        let tree = parse(source, grammar_for_path(path))?;
        let mut ctx =
            ProcessingContext::new(source, FileInfo::new(&*absolute, &*relative), oracle);
        let engine = TraversalEngine::new(&self.traversers, &self.processors);
        let mut concepts = engine.traverse_root(tree.root_node(), &mut ctx)?;

        ctx.table.resolve_all();
        let raw = concepts.take_kind(ConceptKind::Dependency);
        let (merged, stats) = merge_dependencies(raw, ctx.table.resolved());
        for dep in merged {
            concepts.add(ROOT_SLOT, Concept::Dependency(dep));
        }
        concepts.finalize_fqns(ctx.table.resolved());

        Ok((
            FileExtraction {
                path: absolute,
                relative_path: relative,
                concepts,
            },
            stats.kept,
            stats.dropped,
        ))
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}
