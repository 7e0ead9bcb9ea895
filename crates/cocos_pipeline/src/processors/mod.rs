//! Built-in validators, preprocessors, and postprocessors.
//!
//! Each submodule covers one family of actions. [`register_builtins`] wires all
//! of them into a [`ProcessorRegistry`].

pub mod asset;
pub mod component;
pub mod node;
pub mod property;
pub mod reparent;
pub mod response;
pub mod scene;
pub mod validators;

use crate::error::ValidationError;
use crate::registry::ProcessorRegistry;
use crate::tables::NodeTypeTable;
use crate::types::ActionKey;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Registers every built-in processor.
pub fn register_builtins(registry: &mut ProcessorRegistry, node_types: Arc<NodeTypeTable>) {
    let v = &mut registry.validators;
    v.register("scene", "create-node", Arc::new(validators::create_node));
    v.register("scene", "create-component", Arc::new(validators::create_component));
    v.register("scene", "set-property", Arc::new(validators::set_property));
    v.register("scene", "remove-node", Arc::new(validators::remove_node));
    v.register("scene", "open-scene", Arc::new(validators::open_scene));
    v.register("scene", "set-parent", Arc::new(validators::set_parent));
    v.register("asset-db", "create-asset", Arc::new(validators::create_asset));
    v.register("asset-db", "save-asset", Arc::new(validators::save_asset));

    let p = &mut registry.preprocessors;
    p.register("scene", "set-parent", Arc::new(reparent::CycleSafeReparent));
    p.register("scene", "create-node", Arc::new(node::CreateNodeHints));
    p.register("scene", "create-component", Arc::new(component::SkipExistingComponents));
    p.register("scene", "set-property", Arc::new(property::PrepareBatchProperties));
    p.register("scene", "query-node-tree", Arc::new(scene::EmptyParams));
    p.register("scene", "open-scene", Arc::new(scene::OpenScene));
    p.register("scene", "close-scene", Arc::new(scene::CloseScene));
    p.register("asset-db", "create-asset", Arc::new(asset::CreateAssetContent));
    p.register("asset-db", "save-asset", Arc::new(asset::SaveAssetContent));
    p.register("asset-db", "open-asset", Arc::new(asset::OpenAsset));

    let post = &mut registry.postprocessors;
    post.register("scene", "create-node", Arc::new(node::TypeExpansion::new(node_types)));
    post.register("scene", "create-component", Arc::new(component::CreateMissingComponents));
    post.register("scene", "set-property", Arc::new(property::ExecuteBatchProperties));
    post.register("scene", "query-node", Arc::new(response::SimplifyNode));
    post.register("scene", "query-node-tree", Arc::new(response::CleanNodeTree));
    post.register("scene", "query-component", Arc::new(response::SimplifyComponent));
}

/// The single object argument most scene actions take.
pub(crate) fn single_object<'a>(
    key: &ActionKey,
    params: &'a [Value],
) -> Result<&'a Map<String, Value>, ValidationError> {
    if params.len() != 1 {
        return Err(key.invalid(
            "params",
            format!("expected exactly one JSON object, got {} params", params.len()),
        ));
    }
    params[0]
        .as_object()
        .ok_or_else(|| key.invalid("params", "parameter must be a JSON object"))
}

/// A required, non-blank string field.
pub(crate) fn required_str<'a>(
    key: &ActionKey,
    object: &'a Map<String, Value>,
    field: &str,
) -> Result<&'a str, ValidationError> {
    match object.get(field) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s),
        _ => Err(key.invalid(field, format!("{field} must be a non-empty string"))),
    }
}

/// An optional string field; present but not a string is an error.
pub(crate) fn optional_str<'a>(
    key: &ActionKey,
    object: &'a Map<String, Value>,
    field: &str,
) -> Result<Option<&'a str>, ValidationError> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(key.invalid(field, format!("{field} must be a string"))),
    }
}

/// Identifier of a created object, returned either bare or as `{ "uuid": ... }`.
pub(crate) fn returned_uuid(data: &Value) -> Option<String> {
    match data {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Object(map) => map
            .get("uuid")
            .or_else(|| map.get("value"))
            .and_then(returned_uuid),
        _ => None,
    }
}

/// Database URL or absolute filesystem path.
pub(crate) fn is_path_like(input: &str) -> bool {
    if input.starts_with("db://") || input.starts_with('/') {
        return true;
    }
    let bytes = input.as_bytes();
    bytes.len() >= 3 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && bytes[2] == b'\\'
}

/// `true`, or `{ "result": true }`.
pub(crate) fn truthy_result(data: Option<&Value>) -> bool {
    match data {
        Some(Value::Bool(b)) => *b,
        Some(Value::Object(map)) => map.get("result") == Some(&Value::Bool(true)),
        _ => false,
    }
}
