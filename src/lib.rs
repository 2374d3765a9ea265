//! # Codefacts - TypeScript Concept Extraction
//!
//! Extracts a structured, queryable model of source-code concepts
//! (declarations, types, values, dependencies) from TypeScript/JavaScript
//! syntax trees and assembles a cross-file dependency graph with
//! fully-resolved symbol references.
//!
//! Codefacts provides:
//! - A generic attribute-grammar traversal over tree-sitter ASTs
//! - Pluggable per-node-kind concept processors
//! - A scoped symbol table with deferred two-phase name resolution
//! - Cross-file re-export flattening and external dependency synthesis
//! - JSON-shaped output records for a graph-database loader

pub mod concept;
pub mod context;
pub mod extract;
pub mod fqn;
pub mod modpath;
pub mod oracle;
pub mod parse;
pub mod postprocess;
pub mod process;
pub mod project;
pub mod resolve;
pub mod traverse;

// Re-exports for convenient access
pub use concept::{Concept, ConceptKind, ConceptMap};
pub use extract::{ExtractionResult, Extractor, ExtractorBuilder};
pub use fqn::Fqn;
pub use project::ProjectContext;

/// Result type alias for codefacts operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for codefacts operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid FQN: {0}")]
    InvalidFqn(String),

    #[error("Usage error: {0}")]
    Usage(String),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
