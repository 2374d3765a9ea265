//! Traversal Engine - attribute-grammar descent over the AST
//!
//! Context frames carry inherited attributes downward; returned concept maps
//! carry synthesized attributes upward. Node kinds without a registered
//! traverser are silent no-op subtrees: some kinds are intentionally
//! unmodeled.

pub mod engine;
pub mod tables;

pub use engine::TraversalEngine;
pub use tables::{default_traversers, SlotSpec, TraverserTable};
