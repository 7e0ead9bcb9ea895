//! Flattening of the editor's verbose property dumps.
//!
//! Node and component queries come back with every field wrapped as
//! `{ "value": ..., "type": ..., ...metadata }`. The postprocessors here
//! collapse those wrappers into plain values and drop editor-internal fields.

use crate::scene::ComponentInfo;
use crate::traits::{EditorHandle, Postprocessor};
use crate::types::{ActionKey, ApiResponse, PreparedParams};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

const SKIPPED_PROPS: &[&str] = &["uuid", "name", "enabled", "node", "__scriptAsset"];

/// Flattened `scene:query-node` result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSummary {
    pub uuid: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<ComponentInfo>,
}

impl NodeSummary {
    /// Builds a summary from a raw dump; `None` without a uuid and name.
    pub fn from_dump(data: &Value) -> Option<NodeSummary> {
        Some(NodeSummary {
            uuid: wrapped_str(data.get("uuid")?)?,
            name: wrapped_str(data.get("name")?)?,
            active: data.get("active").and_then(wrapped_bool),
            position: data.get("position").and_then(vector),
            scale: data.get("scale").and_then(vector),
            rotation: data.get("rotation").and_then(vector),
            parent: data
                .get("parent")
                .and_then(|p| p.get("value"))
                .and_then(|v| v.get("uuid"))
                .and_then(Value::as_str)
                .map(str::to_string),
            components: data
                .get("__comps__")
                .and_then(Value::as_array)
                .map(|items| items.iter().filter_map(component_from_dump).collect())
                .unwrap_or_default(),
        })
    }

    /// Position of the first component of `component_type`.
    pub fn component_index(&self, component_type: &str) -> Option<usize> {
        self.components
            .iter()
            .position(|c| c.component_type == component_type)
    }

    pub fn has_component(&self, component_type: &str) -> bool {
        self.component_index(component_type).is_some()
    }
}

/// Looks a node up through the pipeline; `None` if it cannot be resolved.
pub async fn query_node(editor: &dyn EditorHandle, uuid: &str) -> Option<NodeSummary> {
    let response = editor
        .execute("scene", "query-node", vec![Value::String(uuid.to_string())])
        .await
        .ok()?;
    let data = response.payload()?;
    serde_json::from_value::<NodeSummary>(data.clone())
        .ok()
        .or_else(|| NodeSummary::from_dump(data))
}

fn wrapped_str(field: &Value) -> Option<String> {
    match field {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map.get("value").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

fn wrapped_bool(field: &Value) -> Option<bool> {
    match field {
        Value::Bool(b) => Some(*b),
        Value::Object(map) => map.get("value").and_then(Value::as_bool),
        _ => None,
    }
}

fn vector(field: &Value) -> Option<Value> {
    let xyz = |v: &Value| -> Option<Value> {
        let x = v.get("x")?.as_f64()?;
        let y = v.get("y")?.as_f64()?;
        let z = v.get("z")?.as_f64()?;
        Some(json!({"x": x, "y": y, "z": z}))
    };
    xyz(field).or_else(|| field.get("value").and_then(xyz))
}

fn unwrap_value(item: &Value) -> &Value {
    match item {
        Value::Object(map) => map.get("value").unwrap_or(item),
        _ => item,
    }
}

fn unwrap_list(items: &[Value]) -> Option<Value> {
    let list: Vec<Value> = items
        .iter()
        .map(unwrap_value)
        .filter(|v| !v.is_null())
        .cloned()
        .collect();
    (!list.is_empty()).then_some(Value::Array(list))
}

/// User-facing properties of a component dump, unwrapped.
///
/// Skips identity fields and anything starting with `_`.
pub fn extract_props(component: &Map<String, Value>) -> Map<String, Value> {
    let mut props = Map::new();
    for (key, field) in component {
        if SKIPPED_PROPS.contains(&key.as_str()) || key.starts_with('_') {
            continue;
        }
        let value = match field {
            Value::Object(map) if map.contains_key("value") => match &map["value"] {
                Value::Array(items) => unwrap_list(items),
                Value::Null => None,
                other => Some(other.clone()),
            },
            Value::Array(items) => unwrap_list(items),
            Value::Null => None,
            other => Some(other.clone()),
        };
        if let Some(value) = value {
            props.insert(key.clone(), value);
        }
    }
    props
}

/// `(name, type)` of every typed user-facing property in a component dump.
pub fn property_types(component: &Map<String, Value>) -> Vec<(String, String)> {
    component
        .iter()
        .filter(|(key, _)| !SKIPPED_PROPS.contains(&key.as_str()) && !key.starts_with('_'))
        .filter_map(|(key, field)| {
            let kind = field.get("type")?.as_str()?;
            Some((key.clone(), kind.to_string()))
        })
        .collect()
}

fn component_from_dump(item: &Value) -> Option<ComponentInfo> {
    let component_type = item.get("type")?.as_str()?.to_string();
    let value = item.get("value")?.as_object()?;
    let props = extract_props(value);
    Some(ComponentInfo {
        component_type,
        uuid: value.get("uuid").and_then(|u| u.get("value")).and_then(Value::as_str).map(str::to_string),
        enabled: value.get("enabled").and_then(|e| e.get("value")).and_then(Value::as_bool),
        props: (!props.is_empty()).then_some(props),
    })
}

/// Postprocessor for `scene:query-node`.
pub struct SimplifyNode;

#[async_trait]
impl Postprocessor for SimplifyNode {
    async fn postprocess(
        &self,
        _key: &ActionKey,
        response: ApiResponse,
        _prepared: &PreparedParams,
        _editor: &dyn EditorHandle,
    ) -> ApiResponse {
        let summary = response.payload().and_then(NodeSummary::from_dump);
        match summary.and_then(|s| serde_json::to_value(s).ok()) {
            Some(data) => ApiResponse {
                data: Some(data),
                ..response
            },
            None => response,
        }
    }
}

/// Keeps only the structural fields of a tree node, recursively.
pub fn clean_tree_node(node: &Value) -> Value {
    let Some(map) = node.as_object() else {
        return node.clone();
    };
    let mut out = Map::new();
    for field in ["name", "uuid", "active", "locked", "type", "path"] {
        if let Some(value) = map.get(field).filter(|v| !v.is_null()) {
            out.insert(field.to_string(), value.clone());
        }
    }
    if let Some(components) = map.get("components").and_then(Value::as_array) {
        if !components.is_empty() {
            out.insert("components".to_string(), Value::Array(components.clone()));
        }
    }
    if let Some(children) = map.get("children").and_then(Value::as_array) {
        if !children.is_empty() {
            out.insert(
                "children".to_string(),
                Value::Array(children.iter().map(clean_tree_node).collect()),
            );
        }
    }
    Value::Object(out)
}

/// Postprocessor for `scene:query-node-tree`.
pub struct CleanNodeTree;

#[async_trait]
impl Postprocessor for CleanNodeTree {
    async fn postprocess(
        &self,
        _key: &ActionKey,
        response: ApiResponse,
        _prepared: &PreparedParams,
        _editor: &dyn EditorHandle,
    ) -> ApiResponse {
        let cleaned = match response.payload() {
            Some(Value::Array(roots)) => Value::Array(roots.iter().map(clean_tree_node).collect()),
            Some(root) => clean_tree_node(root),
            None => return response,
        };
        ApiResponse {
            data: Some(cleaned),
            ..response
        }
    }
}

/// Postprocessor for `scene:query-component`.
pub struct SimplifyComponent;

impl SimplifyComponent {
    fn simplify(data: &Value) -> Option<Value> {
        let value = data.get("value")?.as_object()?;
        let component_type = data.get("type")?.as_str()?;
        let uuid = value.get("uuid").and_then(|u| u.get("value"))?.as_str()?;
        let name = value.get("name").and_then(|n| n.get("value"))?.as_str()?;
        let enabled = value
            .get("enabled")
            .and_then(|e| e.get("value"))
            .and_then(Value::as_bool)
            .unwrap_or(true);
        Some(json!({
            "uuid": uuid,
            "name": name,
            "type": component_type,
            "enabled": enabled,
            "props": extract_props(value),
        }))
    }
}

#[async_trait]
impl Postprocessor for SimplifyComponent {
    async fn postprocess(
        &self,
        _key: &ActionKey,
        response: ApiResponse,
        _prepared: &PreparedParams,
        _editor: &dyn EditorHandle,
    ) -> ApiResponse {
        match response.payload().and_then(Self::simplify) {
            Some(data) => ApiResponse {
                data: Some(data),
                ..response
            },
            None => response,
        }
    }
}
