//! In-memory [`EditorHandle`] for unit tests.

use crate::error::PipelineError;
use crate::pipeline::Pipeline;
use crate::traits::EditorHandle;
use crate::types::{ApiResponse, Params};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub module: String,
    pub action: String,
    pub params: Params,
}

impl RecordedCall {
    pub fn key(&self) -> String {
        format!("{}:{}", self.module, self.action)
    }
}

/// Replays queued responses per `module:action` and records every wire call.
///
/// With a pipeline attached, `execute` runs the full request flow the way the
/// real client does; without one it behaves like `execute_raw`.
#[derive(Default)]
pub struct RecordingEditor {
    queued: Mutex<HashMap<String, VecDeque<ApiResponse>>>,
    calls: Mutex<Vec<RecordedCall>>,
    pipeline: Option<Pipeline>,
}

impl RecordingEditor {
    pub fn with_pipeline(pipeline: Pipeline) -> Self {
        Self {
            pipeline: Some(pipeline),
            ..Default::default()
        }
    }

    /// Queues `response` for the next call to the action.
    pub fn respond(&self, module: &str, action: &str, response: ApiResponse) {
        self.queued
            .lock()
            .unwrap()
            .entry(format!("{module}:{action}"))
            .or_default()
            .push_back(response);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, module: &str, action: &str) -> Vec<RecordedCall> {
        let key = format!("{module}:{action}");
        self.calls().into_iter().filter(|c| c.key() == key).collect()
    }

    fn send(&self, module: &str, action: &str, params: Params) -> ApiResponse {
        self.calls.lock().unwrap().push(RecordedCall {
            module: module.to_string(),
            action: action.to_string(),
            params,
        });
        self.queued
            .lock()
            .unwrap()
            .get_mut(&format!("{module}:{action}"))
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| ApiResponse::failure(format!("no response queued for {module}:{action}")))
    }
}

#[async_trait]
impl EditorHandle for RecordingEditor {
    async fn execute(
        &self,
        module: &str,
        action: &str,
        params: Params,
    ) -> Result<ApiResponse, PipelineError> {
        let Some(pipeline) = &self.pipeline else {
            return Ok(self.send(module, action, params));
        };

        let mut result = pipeline.process_request(module, action, params, self).await?;
        let response = if result.skip_api_call {
            result.take_skip_response()
        } else {
            self.send(module, action, result.prepared.params.clone())
        };
        if result.skip_postprocessor {
            return Ok(response);
        }
        Ok(pipeline
            .process_response(module, action, response, &result.prepared, self)
            .await)
    }

    async fn execute_raw(&self, module: &str, action: &str, params: Params) -> ApiResponse {
        self.send(module, action, params)
    }
}
