//! Batch property set.
//!
//! The editor only understands one `{uuid, path, dump}` write per call, with
//! component properties addressed as `__comps__.{index}.{name}`. The
//! preprocessor turns `{uuid, component, properties: [...]}` into that list of
//! calls and short-circuits; the postprocessor plays the list back one call at
//! a time.

use super::response::{property_types, query_node};
use crate::error::PipelineError;
use crate::tables::components::{is_builtin_component, NODE_COMPONENT};
use crate::traits::{EditorHandle, Postprocessor, Preprocessor};
use crate::types::{ActionKey, ApiResponse, Params, PipelineResult, PreparedParams, Preprocessed};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

/// One primitive write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyCall {
    pub uuid: String,
    pub path: String,
    pub dump: PropertyDump,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDump {
    pub value: Value,
    #[serde(rename = "type")]
    pub value_type: String,
}

/// Preprocessor for `scene:set-property`.
pub struct PrepareBatchProperties;

impl PrepareBatchProperties {
    /// Property names the component dump declares, `None` if it cannot be fetched.
    async fn declared_properties(editor: &dyn EditorHandle, component_uuid: &str) -> Option<Vec<(String, String)>> {
        let response = editor
            .execute_raw("scene", "query-component", vec![Value::String(component_uuid.to_string())])
            .await;
        let value = response.payload()?.get("value")?.as_object()?;
        Some(property_types(value))
    }

    fn build_calls(uuid: &str, prefix: &str, properties: &[Value]) -> Vec<PropertyCall> {
        properties
            .iter()
            .filter_map(Value::as_object)
            .filter_map(|prop| {
                let name = prop.get("name")?.as_str()?;
                let value = prop.get("value")?.clone();
                let value_type = prop.get("type")?.as_str()?.to_string();
                Some(PropertyCall {
                    uuid: uuid.to_string(),
                    path: format!("{prefix}{name}"),
                    dump: PropertyDump { value, value_type },
                })
            })
            .collect()
    }
}

#[async_trait]
impl Preprocessor for PrepareBatchProperties {
    async fn preprocess(
        &self,
        key: &ActionKey,
        params: Params,
        editor: &dyn EditorHandle,
    ) -> Result<Preprocessed, PipelineError> {
        let Some(options) = params.first().and_then(Value::as_object) else {
            return Ok(params.into());
        };
        let (Some(uuid), Some(properties)) = (
            options.get("uuid").and_then(Value::as_str),
            options.get("properties").and_then(Value::as_array),
        ) else {
            return Ok(params.into());
        };
        let component = options
            .get("component")
            .and_then(Value::as_str)
            .unwrap_or(NODE_COMPONENT);

        let Some(node) = query_node(editor, uuid).await else {
            debug!("Node {} could not be queried, sending batch as-is", uuid);
            return Ok(params.into());
        };

        let prefix = if component == NODE_COMPONENT {
            String::new()
        } else {
            let Some(index) = node.component_index(component) else {
                warn!(
                    "⚠️ Component {} not found on node {}, sending batch as-is",
                    component, uuid
                );
                return Ok(params.into());
            };

            if !is_builtin_component(component) {
                if let Some(component_uuid) = node.components[index].uuid.as_deref() {
                    match Self::declared_properties(editor, component_uuid).await {
                        Some(declared) => {
                            let unknown: Vec<&str> = properties
                                .iter()
                                .filter_map(|p| p.get("name").and_then(Value::as_str))
                                .filter(|name| !declared.iter().any(|(n, _)| n == name))
                                .collect();
                            if !unknown.is_empty() {
                                let supported: Vec<String> =
                                    declared.iter().map(|(n, t)| format!("{n}: {t}")).collect();
                                return Err(key
                                    .invalid(
                                        "properties",
                                        format!(
                                            "unknown properties {} on {}; supported: {}",
                                            unknown.join(", "),
                                            component,
                                            supported.join(", ")
                                        ),
                                    )
                                    .into());
                            }
                        }
                        None => debug!("Could not query {} properties, skipping name check", component),
                    }
                }
            }
            format!("__comps__.{index}.")
        };

        let calls = Self::build_calls(uuid, &prefix, properties);
        if calls.is_empty() {
            return Ok(params.into());
        }

        let message = format!("Prepared {} set-property calls", calls.len());
        debug!("{} for {}", message, uuid);
        let response = ApiResponse::ok(json!({"calls": calls, "message": message}));
        Ok(Preprocessed::ShortCircuit(PipelineResult::skip(params.into(), response)))
    }
}

/// Postprocessor for `scene:set-property`.
pub struct ExecuteBatchProperties;

#[async_trait]
impl Postprocessor for ExecuteBatchProperties {
    async fn postprocess(
        &self,
        _key: &ActionKey,
        response: ApiResponse,
        _prepared: &PreparedParams,
        editor: &dyn EditorHandle,
    ) -> ApiResponse {
        let calls: Vec<PropertyCall> = match response.payload().and_then(|d| d.get("calls")) {
            Some(calls) => serde_json::from_value(calls.clone()).unwrap_or_default(),
            None => return response,
        };
        if calls.is_empty() {
            return response;
        }

        let mut results = Vec::with_capacity(calls.len());
        let mut succeeded = 0;
        for call in &calls {
            let wire = match serde_json::to_value(call) {
                Ok(wire) => wire,
                Err(e) => {
                    results.push(json!({"path": call.path, "success": false, "error": e.to_string()}));
                    continue;
                }
            };
            let outcome = editor.execute_raw("scene", "set-property", vec![wire]).await;
            let ok = outcome.success && outcome.data != Some(Value::Bool(false));
            if ok {
                succeeded += 1;
                results.push(json!({"path": call.path, "success": true}));
            } else {
                let error = outcome
                    .error
                    .unwrap_or_else(|| "editor rejected the value".to_string());
                warn!("⚠️ set-property {} on {} failed: {}", call.path, call.uuid, error);
                results.push(json!({"path": call.path, "success": false, "error": error}));
            }
        }

        let total = calls.len();
        let message = if succeeded == total {
            format!("All {total} properties set successfully")
        } else {
            format!("{succeeded}/{total} properties set successfully")
        };
        info!("🎛️ {}", message);
        ApiResponse {
            success: succeeded == total,
            data: Some(json!({
                "totalProperties": total,
                "successCount": succeeded,
                "failedCount": total - succeeded,
                "failed": total - succeeded,
                "results": results,
                "message": message,
            })),
            error: (succeeded < total).then(|| message.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Pipeline;
    use crate::testing::RecordingEditor;

    fn node() -> ApiResponse {
        ApiResponse::ok(json!({
            "uuid": {"value": "n1"},
            "name": {"value": "Title"},
            "__comps__": [
                {"type": "cc.UITransform", "value": {"uuid": {"value": "c0"}}},
                {"type": "cc.Label", "value": {"uuid": {"value": "c1"}}},
                {"type": "game.Mover", "value": {"uuid": {"value": "c2"}}}
            ]
        }))
    }

    fn editor() -> RecordingEditor {
        let editor = RecordingEditor::with_pipeline(Pipeline::with_builtins());
        editor.respond("scene", "query-node", node());
        editor
    }

    #[tokio::test]
    async fn label_batch_runs_each_call_in_order() {
        let editor = editor();
        editor.respond("scene", "set-property", ApiResponse::ok(json!(true)));
        editor.respond("scene", "set-property", ApiResponse::ok(json!(false)));
        editor.respond("scene", "set-property", ApiResponse::ok(json!(true)));

        let response = editor
            .execute(
                "scene",
                "set-property",
                vec![json!({
                    "uuid": "n1",
                    "component": "cc.Label",
                    "properties": [
                        {"name": "string", "value": "Hi", "type": "String"},
                        {"name": "fontSize", "value": 40, "type": "Number"},
                        {"name": "color", "value": [255, 0, 0, 255], "type": "cc.Color"}
                    ]
                })],
            )
            .await
            .unwrap();

        assert!(!response.success);
        let data = response.data.unwrap();
        assert_eq!(data["totalProperties"], json!(3));
        assert_eq!(data["successCount"], json!(2));
        assert_eq!(data["failedCount"], json!(1));
        assert_eq!(data["failed"], json!(1));
        assert_eq!(response.error.as_deref(), Some("2/3 properties set successfully"));
        let paths: Vec<&str> = data["results"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["path"].as_str().unwrap())
            .collect();
        assert_eq!(paths, ["__comps__.1.string", "__comps__.1.fontSize", "__comps__.1.color"]);
        assert_eq!(data["results"][1]["success"], json!(false));

        let writes = editor.calls_to("scene", "set-property");
        assert_eq!(writes.len(), 3);
        assert_eq!(
            writes[0].params,
            vec![json!({"uuid": "n1", "path": "__comps__.1.string", "dump": {"value": "Hi", "type": "String"}})]
        );
    }

    #[tokio::test]
    async fn node_properties_have_no_prefix() {
        let editor = editor();
        editor.respond("scene", "set-property", ApiResponse::ok(json!(true)));

        let response = editor
            .execute(
                "scene",
                "set-property",
                vec![json!({"uuid": "n1", "properties": [{"name": "active", "value": false, "type": "Boolean"}]})],
            )
            .await
            .unwrap();

        assert!(response.success);
        assert_eq!(editor.calls_to("scene", "set-property")[0].params[0]["path"], json!("active"));
    }

    #[tokio::test]
    async fn missing_component_falls_back_to_single_call() {
        let editor = editor();
        editor.respond("scene", "set-property", ApiResponse::failure("component not found"));

        let params = vec![json!({
            "uuid": "n1",
            "component": "cc.Sprite",
            "properties": [{"name": "grayscale", "value": true, "type": "Boolean"}]
        })];
        let response = editor.execute("scene", "set-property", params.clone()).await.unwrap();

        assert!(!response.success);
        let writes = editor.calls_to("scene", "set-property");
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].params, params);
    }

    #[tokio::test]
    async fn custom_component_names_are_checked() {
        let editor = editor();
        editor.respond(
            "scene",
            "query-component",
            ApiResponse::ok(json!({
                "type": "game.Mover",
                "value": {"uuid": {"value": "c2"}, "speed": {"value": 1, "type": "Number"}}
            })),
        );

        let err = editor
            .execute(
                "scene",
                "set-property",
                vec![json!({
                    "uuid": "n1",
                    "component": "game.Mover",
                    "properties": [{"name": "velocity", "value": 2, "type": "Number"}]
                })],
            )
            .await
            .unwrap_err();

        let err = err.as_validation().unwrap();
        assert_eq!(err.field, "properties");
        assert!(err.message.contains("velocity") && err.message.contains("speed: Number"));
        assert!(editor.calls_to("scene", "set-property").is_empty());
    }

    #[tokio::test]
    async fn custom_component_without_dump_is_not_checked() {
        let editor = editor();
        editor.respond("scene", "query-component", ApiResponse::failure("Request timeout after 30000ms"));
        editor.respond("scene", "set-property", ApiResponse::ok(json!(true)));

        let response = editor
            .execute(
                "scene",
                "set-property",
                vec![json!({
                    "uuid": "n1",
                    "component": "game.Mover",
                    "properties": [{"name": "velocity", "value": 2, "type": "Number"}]
                })],
            )
            .await
            .unwrap();

        assert!(response.success);
        assert_eq!(editor.calls_to("scene", "set-property")[0].params[0]["path"], json!("__comps__.2.velocity"));
    }
}
