//! Seams between the pipeline, its processors, and the client that drives it.

use crate::error::{PipelineError, ValidationError};
use crate::types::{ActionKey, ApiResponse, Params, PreparedParams, Preprocessed};
use async_trait::async_trait;
use serde_json::Value;

/// Synchronous shape check run before anything else.
///
/// A validator never rewrites params; it either accepts them or fails with a
/// [`ValidationError`].
pub trait Validator: Send + Sync {
    fn validate(&self, key: &ActionKey, params: &[Value]) -> Result<(), ValidationError>;
}

impl<F> Validator for F
where
    F: Fn(&ActionKey, &[Value]) -> Result<(), ValidationError> + Send + Sync,
{
    fn validate(&self, key: &ActionKey, params: &[Value]) -> Result<(), ValidationError> {
        self(key, params)
    }
}

/// Rewrites params before transport, or answers the request itself.
#[async_trait]
pub trait Preprocessor: Send + Sync {
    async fn preprocess(
        &self,
        key: &ActionKey,
        params: Params,
        editor: &dyn EditorHandle,
    ) -> Result<Preprocessed, PipelineError>;
}

/// Reshapes a response before it reaches the caller.
///
/// Postprocessors cannot fail: any problem they hit is reported inside the
/// returned response.
#[async_trait]
pub trait Postprocessor: Send + Sync {
    async fn postprocess(
        &self,
        key: &ActionKey,
        response: ApiResponse,
        prepared: &PreparedParams,
        editor: &dyn EditorHandle,
    ) -> ApiResponse;
}

/// Callback into the client for auxiliary and nested calls.
///
/// `execute` routes through the full pipeline (and may recurse into the caller's
/// own processors), `execute_raw` goes straight to the wire.
#[async_trait]
pub trait EditorHandle: Send + Sync {
    async fn execute(
        &self,
        module: &str,
        action: &str,
        params: Params,
    ) -> Result<ApiResponse, PipelineError>;

    async fn execute_raw(&self, module: &str, action: &str, params: Params) -> ApiResponse;
}
