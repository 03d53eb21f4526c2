use crate::config::ArtifactConfig;
use crate::error::ServiceError;
use crate::model::encoder::EncoderTable;
use crate::model::loader;
use crate::model::pipeline::Pipeline;
use std::sync::Arc;

/// Fitted artifacts shared by every request. Built once before serving
/// and never mutated afterwards, so readers need no locking.
#[derive(Clone)]
pub struct ArtifactStore {
    pipeline: Arc<dyn Pipeline>,
    encoders: Arc<EncoderTable>,
}

impl ArtifactStore {
    pub fn new(pipeline: Arc<dyn Pipeline>, encoders: EncoderTable) -> Self {
        Self {
            pipeline,
            encoders: Arc::new(encoders),
        }
    }

    pub fn load(config: &ArtifactConfig) -> Result<Self, ServiceError> {
        let encoders = EncoderTable::load(&config.encoders)?;
        let pipeline = loader::load_pipeline(config)?;
        Ok(Self::new(pipeline, encoders))
    }

    pub fn pipeline(&self) -> &dyn Pipeline {
        self.pipeline.as_ref()
    }

    pub fn encoders(&self) -> &EncoderTable {
        &self.encoders
    }
}
