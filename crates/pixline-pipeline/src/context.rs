//! Per-pipeline context object.

use std::sync::Arc;

use tokio::sync::Semaphore;

use pixline_core::{ConfigError, PipelineConfig};
use pixline_storage::ArtifactStore;

/// Everything an ingest invocation needs, passed explicitly rather than
/// held in ambient singletons: the validated configuration, the artifact
/// store, and the transform permit pool shared by all uploads on this
/// pipeline instance.
#[derive(Clone)]
pub struct PipelineContext {
    config: Arc<PipelineConfig>,
    store: Arc<dyn ArtifactStore>,
    transform_permits: Arc<Semaphore>,
}

impl PipelineContext {
    /// Validates the configuration once; nothing downstream re-checks
    /// ranges.
    pub fn new(
        config: PipelineConfig,
        store: Arc<dyn ArtifactStore>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let transform_permits = Arc::new(Semaphore::new(config.max_concurrent_transforms));
        Ok(PipelineContext {
            config: Arc::new(config),
            store,
            transform_permits,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn ArtifactStore> {
        &self.store
    }

    /// Bounds simultaneously decoded rasters; decoded images are the
    /// memory hot spot, so this must never exceed what memory allows.
    pub(crate) fn transform_permits(&self) -> &Arc<Semaphore> {
        &self.transform_permits
    }
}
