//! Node creation with type-driven expansion.
//!
//! The editor's `create-node` only knows about bare nodes. A request carrying a
//! semantic `type` (say `cc.Button`) or an explicit `components` list has those
//! fields stripped before transport; once the node exists, the postprocessor
//! attaches the implied components and creates the implied children, each child
//! going back through the pipeline so its own type expands in turn.

use super::returned_uuid;
use crate::error::PipelineError;
use crate::tables::NodeTypeTable;
use crate::traits::{EditorHandle, Postprocessor, Preprocessor};
use crate::types::{ActionKey, ApiResponse, Params, PreparedParams, Preprocessed};
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const TYPE_HINT: &str = "type";
pub const COMPONENTS_HINT: &str = "components";

/// Preprocessor for `scene:create-node`: moves `type` and `components` out of
/// the wire params and into hints.
pub struct CreateNodeHints;

#[async_trait]
impl Preprocessor for CreateNodeHints {
    async fn preprocess(
        &self,
        _key: &ActionKey,
        mut params: Params,
        _editor: &dyn EditorHandle,
    ) -> Result<Preprocessed, PipelineError> {
        let mut prepared = PreparedParams::default();
        if let Some(Value::Object(options)) = params.first_mut() {
            if let Some(node_type) = options.remove(TYPE_HINT) {
                prepared.hints.insert(TYPE_HINT.to_string(), node_type);
            }
            if let Some(components) = options.remove(COMPONENTS_HINT) {
                prepared.hints.insert(COMPONENTS_HINT.to_string(), components);
            }
        }
        prepared.params = params;
        Ok(Preprocessed::Continue(prepared))
    }
}

/// Postprocessor for `scene:create-node`.
pub struct TypeExpansion {
    table: Arc<NodeTypeTable>,
}

impl TypeExpansion {
    pub fn new(table: Arc<NodeTypeTable>) -> Self {
        Self { table }
    }

    /// Components implied by the type, then explicit ones; duplicates dropped,
    /// first occurrence kept.
    fn components_for(&self, node_type: Option<&str>, explicit: Option<&Value>) -> Vec<String> {
        let from_type = node_type
            .and_then(|t| self.table.get(t))
            .map(|spec| spec.components.clone())
            .unwrap_or_default();
        let from_caller = explicit
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        let mut out: Vec<String> = Vec::new();
        for component in from_type.into_iter().chain(from_caller) {
            if !out.contains(&component) {
                out.push(component);
            }
        }
        out
    }
}

#[async_trait]
impl Postprocessor for TypeExpansion {
    async fn postprocess(
        &self,
        _key: &ActionKey,
        response: ApiResponse,
        prepared: &PreparedParams,
        editor: &dyn EditorHandle,
    ) -> ApiResponse {
        let Some(node_uuid) = response.payload().and_then(returned_uuid) else {
            return response;
        };

        let node_type = prepared.hint(TYPE_HINT).and_then(Value::as_str);
        let components = self.components_for(node_type, prepared.hint(COMPONENTS_HINT));
        let children = node_type
            .and_then(|t| self.table.get(t))
            .map(|spec| spec.children.clone())
            .unwrap_or_default();

        if components.is_empty() && children.is_empty() {
            return response;
        }

        if let Some(t) = node_type {
            info!(
                "🧱 Expanding {} node {}: {} components, {} children",
                t,
                node_uuid,
                components.len(),
                children.len()
            );
        }

        let mut data = match response.data {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        };
        data.insert("uuid".to_string(), Value::String(node_uuid.clone()));

        let mut added = Vec::new();
        for component in &components {
            let result = editor
                .execute_raw(
                    "scene",
                    "create-component",
                    vec![json!({"uuid": node_uuid, "component": component})],
                )
                .await;
            if result.success {
                added.push(Value::String(component.clone()));
            } else {
                warn!(
                    "⚠️ Failed to add {} to {}: {}",
                    component,
                    node_uuid,
                    result.error.as_deref().unwrap_or("unknown error")
                );
            }
        }
        if !components.is_empty() {
            data.insert("components".to_string(), Value::Array(added));
        }

        let mut created = Vec::new();
        for child in &children {
            let mut child_params = json!({"parent": node_uuid, "type": child.node_type});
            if let Some(name) = &child.name {
                child_params["name"] = Value::String(name.clone());
            }
            match editor.execute("scene", "create-node", vec![child_params]).await {
                Ok(result) => match result.payload().and_then(returned_uuid) {
                    Some(child_uuid) => created.push(json!({
                        "type": child.node_type,
                        "name": child.name,
                        "uuid": child_uuid,
                    })),
                    None => debug!("Child {} of {} was not created", child.node_type, node_uuid),
                },
                Err(e) => warn!("⚠️ Child {} of {} rejected: {}", child.node_type, node_uuid, e),
            }
        }
        if !created.is_empty() {
            data.insert("children".to_string(), Value::Array(created));
        }

        ApiResponse {
            success: true,
            data: Some(Value::Object(data)),
            error: None,
        }
    }
}
