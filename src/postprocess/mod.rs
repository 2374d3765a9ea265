//! Cross-File Post-Processors
//!
//! Run strictly after all per-file extraction completes: export-chain and
//! external-classification resolution require the complete module, export
//! and dependency sets of every file. Failures here are soft: logged, the
//! offending entry dropped, the pass continues.

pub mod exports;
pub mod externals;

use crate::extract::ExtractionResult;
use crate::modpath::ModulePathClassifier;
use crate::project::ProjectContext;
use crate::Result;
use std::sync::Arc;

pub use exports::ExportChainResolver;
pub use externals::ExternalDependencyAggregator;

/// A pass over the aggregated extraction result
pub trait PostProcessor: Send + Sync {
    /// Display name, for diagnostics
    fn name(&self) -> &'static str;

    fn run(
        &self,
        result: &mut ExtractionResult,
        project: &ProjectContext,
        classifier: &ModulePathClassifier,
    ) -> Result<()>;
}

/// The base post-processor list, in run order
pub fn default_post_processors() -> Vec<Arc<dyn PostProcessor>> {
    vec![
        Arc::new(ExportChainResolver),
        Arc::new(ExternalDependencyAggregator),
    ]
}
