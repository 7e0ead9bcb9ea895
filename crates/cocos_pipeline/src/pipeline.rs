//! Orchestration of validate → preprocess → (transport) → postprocess.
//!
//! The pipeline never performs transport itself. [`Pipeline::process_request`]
//! returns a [`PipelineResult`] that tells the caller what to send (or that
//! nothing needs to be sent), and [`Pipeline::process_response`] reshapes
//! whatever came back.

use crate::error::PipelineError;
use crate::registry::ProcessorRegistry;
use crate::traits::EditorHandle;
use crate::types::{ActionKey, ApiResponse, Params, PipelineResult, PreparedParams, Preprocessed};
use std::sync::Arc;
use tracing::{debug, trace};

/// Runs the processor stages for one action invocation at a time.
#[derive(Clone)]
pub struct Pipeline {
    registry: Arc<ProcessorRegistry>,
}

impl Pipeline {
    pub fn new(registry: Arc<ProcessorRegistry>) -> Self {
        Self { registry }
    }

    /// A pipeline over the process-wide built-in registry.
    pub fn with_builtins() -> Self {
        Self::new(ProcessorRegistry::shared())
    }

    pub fn registry(&self) -> &ProcessorRegistry {
        &self.registry
    }

    /// Validates and preprocesses a request.
    ///
    /// A validation failure aborts before the preprocessor runs. A preprocessor
    /// may short-circuit by returning a full [`PipelineResult`], which is handed
    /// back untouched.
    pub async fn process_request(
        &self,
        module: &str,
        action: &str,
        params: Params,
        editor: &dyn EditorHandle,
    ) -> Result<PipelineResult, PipelineError> {
        let key = ActionKey::new(module, action);

        if let Some(validator) = self.registry.validators.get_key(&key) {
            trace!("🔍 Validating {}", key);
            validator.validate(&key, &params)?;
        }

        let prepared = match self.registry.preprocessors.get_key(&key) {
            Some(preprocessor) => {
                trace!("⚙️ Preprocessing {}", key);
                match preprocessor.preprocess(&key, params, editor).await? {
                    Preprocessed::Continue(prepared) => prepared,
                    Preprocessed::ShortCircuit(result) => {
                        debug!(
                            "⏭️ Preprocessor for {} short-circuited (skip_api_call: {})",
                            key, result.skip_api_call
                        );
                        return Ok(result);
                    }
                }
            }
            None => PreparedParams::new(params),
        };

        Ok(PipelineResult {
            prepared,
            postprocessor: self.registry.postprocessors.get_key(&key),
            ..Default::default()
        })
    }

    /// Applies the registered postprocessor, if any, to `response`.
    ///
    /// `prepared` is what the preprocessor produced, not the caller's input.
    pub async fn process_response(
        &self,
        module: &str,
        action: &str,
        response: ApiResponse,
        prepared: &PreparedParams,
        editor: &dyn EditorHandle,
    ) -> ApiResponse {
        let key = ActionKey::new(module, action);
        match self.registry.postprocessors.get_key(&key) {
            Some(postprocessor) => {
                trace!("🧩 Postprocessing {}", key);
                postprocessor.postprocess(&key, response, prepared, editor).await
            }
            None => response,
        }
    }
}
