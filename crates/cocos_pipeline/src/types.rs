//! Core data types shared by every pipeline stage.

use crate::error::ValidationError;
use crate::traits::Postprocessor;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Ordered parameter list sent as `{"params": [...]}`.
pub type Params = Vec<Value>;

/// Composite `(module, action)` key used by all three registries.
///
/// The two halves are kept apart so a module or action containing `:` can never
/// collide with another pair.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActionKey {
    pub module: CompactString,
    pub action: CompactString,
}

impl ActionKey {
    pub fn new(module: impl Into<CompactString>, action: impl Into<CompactString>) -> Self {
        Self {
            module: module.into(),
            action: action.into(),
        }
    }

    /// Builds a [`ValidationError`] attributed to this action.
    pub fn invalid(&self, field: impl Into<String>, message: impl Into<String>) -> ValidationError {
        ValidationError::new(self.module.as_str(), self.action.as_str(), field, message)
    }
}

impl fmt::Display for ActionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.module, self.action)
    }
}

/// Response envelope returned by the editor and by every postprocessor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Success with no payload.
    pub fn bare_success() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }

    /// Payload of a successful response, `None` for failures and empty bodies.
    pub fn payload(&self) -> Option<&Value> {
        if self.success {
            self.data.as_ref().filter(|v| !v.is_null())
        } else {
            None
        }
    }
}

impl Default for ApiResponse {
    fn default() -> Self {
        Self::bare_success()
    }
}

/// Params as a preprocessor left them, plus metadata that never goes on the wire.
///
/// Postprocessors receive this instead of the caller's input so they can see
/// values a preprocessor stripped from the request (a node `type`, an explicit
/// component list).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreparedParams {
    pub params: Params,
    pub hints: Map<String, Value>,
}

impl PreparedParams {
    pub fn new(params: Params) -> Self {
        Self {
            params,
            hints: Map::new(),
        }
    }

    pub fn with_hint(mut self, key: impl Into<String>, value: Value) -> Self {
        self.hints.insert(key.into(), value);
        self
    }

    pub fn hint(&self, key: &str) -> Option<&Value> {
        self.hints.get(key)
    }
}

impl From<Params> for PreparedParams {
    fn from(params: Params) -> Self {
        Self::new(params)
    }
}

/// Handoff between preprocessing and transport.
#[derive(Clone, Default)]
pub struct PipelineResult {
    pub prepared: PreparedParams,
    pub postprocessor: Option<Arc<dyn Postprocessor>>,
    pub skip_api_call: bool,
    pub skip_response: Option<ApiResponse>,
    pub skip_postprocessor: bool,
}

impl PipelineResult {
    /// A result that continues to transport with the given params.
    pub fn proceed(prepared: PreparedParams) -> Self {
        Self {
            prepared,
            ..Default::default()
        }
    }

    /// A result that bypasses transport and answers with `response`.
    pub fn skip(prepared: PreparedParams, response: ApiResponse) -> Self {
        Self {
            prepared,
            skip_api_call: true,
            skip_response: Some(response),
            ..Default::default()
        }
    }

    pub fn without_postprocessing(mut self) -> Self {
        self.skip_postprocessor = true;
        self
    }

    pub fn params(&self) -> &[Value] {
        &self.prepared.params
    }

    /// The canned response for a skipped call, a bare success when none was set.
    pub fn take_skip_response(&mut self) -> ApiResponse {
        self.skip_response.take().unwrap_or_default()
    }
}

impl fmt::Debug for PipelineResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineResult")
            .field("prepared", &self.prepared)
            .field("postprocessor", &self.postprocessor.is_some())
            .field("skip_api_call", &self.skip_api_call)
            .field("skip_response", &self.skip_response)
            .field("skip_postprocessor", &self.skip_postprocessor)
            .finish()
    }
}

/// Outcome of a preprocessor.
#[derive(Debug)]
pub enum Preprocessed {
    /// Continue to transport with these params
    Continue(PreparedParams),
    /// Return this result directly, bypassing the rest of request processing
    ShortCircuit(PipelineResult),
}

impl From<Params> for Preprocessed {
    fn from(params: Params) -> Self {
        Preprocessed::Continue(PreparedParams::new(params))
    }
}
