//! Idempotent component attachment.

use super::response::query_node;
use crate::error::PipelineError;
use crate::traits::{EditorHandle, Postprocessor, Preprocessor};
use crate::types::{ActionKey, ApiResponse, Params, PipelineResult, PreparedParams, Preprocessed};
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

/// Preprocessor for `scene:create-component`.
///
/// Checks the node's current components first. A request whose components are
/// all present is answered without touching the editor; an array request is
/// narrowed to the missing entries and handed to [`CreateMissingComponents`].
pub struct SkipExistingComponents;

impl SkipExistingComponents {
    fn requested(params: &[Value]) -> Option<(&str, Vec<String>, bool)> {
        let options = params.first()?.as_object()?;
        let uuid = options.get("uuid")?.as_str()?;
        match options.get("component")? {
            Value::String(component) => Some((uuid, vec![component.clone()], false)),
            Value::Array(items) => {
                let components: Vec<String> = items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect();
                (!components.is_empty()).then_some((uuid, components, true))
            }
            _ => None,
        }
    }
}

#[async_trait]
impl Preprocessor for SkipExistingComponents {
    async fn preprocess(
        &self,
        _key: &ActionKey,
        params: Params,
        editor: &dyn EditorHandle,
    ) -> Result<Preprocessed, PipelineError> {
        let Some((uuid, requested, batch)) = Self::requested(&params) else {
            return Ok(params.into());
        };
        let uuid = uuid.to_string();

        let Some(node) = query_node(editor, &uuid).await else {
            debug!("Node {} could not be queried, creating components blindly", uuid);
            return Ok(params.into());
        };

        let missing: Vec<String> = requested
            .iter()
            .filter(|c| !node.has_component(c))
            .cloned()
            .collect();

        if missing.is_empty() {
            let listed = requested.join(", ");
            let message = if batch {
                format!("All components [{listed}] already exist on node")
            } else {
                format!("Component {listed} already exists on node")
            };
            info!("⏭️ {} ({})", message, uuid);
            let response = ApiResponse::ok(json!({
                "uuid": uuid,
                "components": requested,
                "skipped": true,
                "message": message,
            }));
            return Ok(Preprocessed::ShortCircuit(PipelineResult::skip(params.into(), response)));
        }

        if batch {
            let response = ApiResponse::ok(json!({
                "uuid": uuid,
                "components": missing,
                "skipped": false,
                "message": format!("Preparing to create {} components", missing.len()),
            }));
            return Ok(Preprocessed::ShortCircuit(PipelineResult::skip(params.into(), response)));
        }

        Ok(params.into())
    }
}

/// Postprocessor for `scene:create-component`: creates each component the
/// preprocessor found missing, one wire call apiece.
pub struct CreateMissingComponents;

#[async_trait]
impl Postprocessor for CreateMissingComponents {
    async fn postprocess(
        &self,
        _key: &ActionKey,
        response: ApiResponse,
        _prepared: &PreparedParams,
        editor: &dyn EditorHandle,
    ) -> ApiResponse {
        let Some(data) = response.payload().and_then(Value::as_object) else {
            return response;
        };
        if data.get("skipped").and_then(Value::as_bool) != Some(false) {
            return response;
        }
        let (Some(uuid), Some(components)) = (
            data.get("uuid").and_then(Value::as_str),
            data.get("components").and_then(Value::as_array),
        ) else {
            return response;
        };
        let uuid = uuid.to_string();
        let components: Vec<String> = components
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect();

        if components.is_empty() {
            return ApiResponse::ok(json!({
                "uuid": uuid,
                "components": [],
                "message": "No components to create",
            }));
        }

        let mut results = Vec::with_capacity(components.len());
        let mut succeeded = 0;
        for component in &components {
            let outcome = editor
                .execute_raw(
                    "scene",
                    "create-component",
                    vec![json!({"uuid": uuid, "component": component})],
                )
                .await;
            if outcome.success {
                succeeded += 1;
                results.push(json!({"component": component, "success": true}));
            } else {
                let error = outcome
                    .error
                    .unwrap_or_else(|| "Failed to create component".to_string());
                warn!("⚠️ Could not add {} to {}: {}", component, uuid, error);
                results.push(json!({"component": component, "success": false, "error": error}));
            }
        }

        let total = components.len();
        let message = if succeeded == total {
            format!("All {total} components created successfully")
        } else {
            format!("{succeeded}/{total} components created")
        };
        ApiResponse {
            success: succeeded == total,
            data: Some(json!({
                "uuid": uuid,
                "components": components,
                "total": total,
                "successCount": succeeded,
                "failedCount": total - succeeded,
                "results": results,
                "message": message,
            })),
            error: (succeeded < total).then(|| message.clone()),
        }
    }
}
