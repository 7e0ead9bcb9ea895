//! Synchronous parameter shape checks.

use super::{optional_str, required_str, single_object};
use crate::error::ValidationError;
use crate::tables::assets::{self, ASSET_ROOT, SAVEABLE_EXTENSIONS, TEMPLATE_EXTENSIONS};
use crate::tables::components::{builtin_properties, NODE_COMPONENT};
use crate::types::ActionKey;
use serde_json::Value;

/// `scene:create-node` takes `{parent, name?, type?, components?}`.
pub fn create_node(key: &ActionKey, params: &[Value]) -> Result<(), ValidationError> {
    let options = single_object(key, params)?;
    required_str(key, options, "parent")?;
    optional_str(key, options, "name")?;
    optional_str(key, options, "type")?;

    match options.get("components") {
        None | Some(Value::Null) => Ok(()),
        Some(Value::Array(items)) if items.iter().all(Value::is_string) => Ok(()),
        Some(Value::Array(_)) => Err(key.invalid("components", "every component must be a string")),
        Some(_) => Err(key.invalid("components", "components must be an array")),
    }
}

/// `scene:create-component` takes `{uuid, component}` where `component` is one
/// `cc.` type or a list of them.
pub fn create_component(key: &ActionKey, params: &[Value]) -> Result<(), ValidationError> {
    let options = single_object(key, params)?;
    required_str(key, options, "uuid")?;

    let check = |name: &Value| match name.as_str() {
        Some(s) if s.trim().is_empty() => Err(key.invalid("component", "component must not be empty")),
        Some(s) if !s.starts_with("cc.") => Err(key.invalid(
            "component",
            format!("{s} must start with cc., e.g. cc.Sprite or cc.Widget"),
        )),
        Some(_) => Ok(()),
        None => Err(key.invalid("component", "component must be a string")),
    };

    match options.get("component") {
        Some(Value::Array(items)) if items.is_empty() => {
            Err(key.invalid("component", "component list must not be empty"))
        }
        Some(Value::Array(items)) => items.iter().try_for_each(check),
        Some(single) => check(single),
        None => Err(key.invalid("component", "component is required")),
    }
}

/// `scene:set-property` takes either the batch form
/// `{uuid, component?, properties: [{name, value, type}]}` or a single
/// primitive `{uuid, path, dump}`.
pub fn set_property(key: &ActionKey, params: &[Value]) -> Result<(), ValidationError> {
    let options = single_object(key, params)?;
    required_str(key, options, "uuid")?;

    if options.contains_key("dump") && !options.contains_key("properties") {
        required_str(key, options, "path")?;
        return match options.get("dump") {
            Some(Value::Object(_)) => Ok(()),
            _ => Err(key.invalid("dump", "dump must be an object with value and type")),
        };
    }

    let component = optional_str(key, options, "component")?.unwrap_or(NODE_COMPONENT);
    let known = builtin_properties(component);

    let properties = match options.get("properties") {
        Some(Value::Array(items)) if !items.is_empty() => items,
        _ => return Err(key.invalid("properties", "properties must be a non-empty array")),
    };

    for (i, prop) in properties.iter().enumerate() {
        let field = format!("properties[{i}]");
        let prop = prop
            .as_object()
            .ok_or_else(|| key.invalid(&field, "each property must be an object"))?;

        let name = match prop.get("name") {
            Some(Value::String(s)) if !s.trim().is_empty() => s.as_str(),
            _ => return Err(key.invalid(format!("{field}.name"), "name must be a non-empty string")),
        };
        if !prop.contains_key("value") {
            return Err(key.invalid(format!("{field}.value"), "value is required"));
        }
        match prop.get("type") {
            Some(Value::String(s)) if !s.trim().is_empty() => {}
            _ => return Err(key.invalid(format!("{field}.type"), "type must be a non-empty string")),
        }

        if let Some(known) = known {
            if !known.contains(&name) {
                return Err(key.invalid(
                    format!("{field}.name"),
                    format!(
                        "unknown property {name} on {component}; supported: {}",
                        known.join(", ")
                    ),
                ));
            }
        }
    }
    Ok(())
}

/// `scene:remove-node` takes `{uuid}` with one uuid or a list.
pub fn remove_node(key: &ActionKey, params: &[Value]) -> Result<(), ValidationError> {
    let options = single_object(key, params)?;
    match options.get("uuid") {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(()),
        Some(Value::Array(items)) if items.is_empty() => {
            Err(key.invalid("uuid", "uuid list must not be empty"))
        }
        Some(Value::Array(items))
            if items
                .iter()
                .all(|v| v.as_str().is_some_and(|s| !s.trim().is_empty())) =>
        {
            Ok(())
        }
        _ => Err(key.invalid("uuid", "uuid must be a non-empty string or list of strings")),
    }
}

/// `scene:open-scene` takes a scene uuid or asset path.
pub fn open_scene(key: &ActionKey, params: &[Value]) -> Result<(), ValidationError> {
    match params.first() {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(()),
        Some(_) => Err(key.invalid("uuid", "scene must be given as a uuid or db:// path string")),
        None => Err(key.invalid("uuid", "a scene uuid or db:// path is required")),
    }
}

/// `scene:set-parent` takes `{parent, uuids, keepWorldTransform?}`.
pub fn set_parent(key: &ActionKey, params: &[Value]) -> Result<(), ValidationError> {
    let options = single_object(key, params)?;
    required_str(key, options, "parent")?;
    match options.get("uuids") {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(()),
        Some(Value::Array(items))
            if !items.is_empty() && items.iter().all(|v| v.as_str().is_some_and(|s| !s.is_empty())) =>
        {
            Ok(())
        }
        _ => Err(key.invalid("uuids", "uuids must be a non-empty list of node uuids")),
    }
}

/// `asset-db:create-asset` takes one `db://assets/` path with a templated extension.
pub fn create_asset(key: &ActionKey, params: &[Value]) -> Result<(), ValidationError> {
    if params.len() != 1 {
        return Err(key.invalid("params", "expected exactly one asset path"));
    }
    let path = asset_path(key, &params[0])?;
    let ext = assets::extension(path);
    if !TEMPLATE_EXTENSIONS.contains(&ext.as_str()) {
        return Err(key.invalid(
            "path",
            format!("unsupported extension {ext:?}; supported: {}", TEMPLATE_EXTENSIONS.join(", ")),
        ));
    }
    Ok(())
}

/// `asset-db:save-asset` takes a `db://assets/` path and optional string content.
pub fn save_asset(key: &ActionKey, params: &[Value]) -> Result<(), ValidationError> {
    let Some(first) = params.first() else {
        return Err(key.invalid("path", "an asset path is required"));
    };
    let path = asset_path(key, first)?;
    let ext = assets::extension(path);
    if !SAVEABLE_EXTENSIONS.contains(&ext.as_str()) {
        return Err(key.invalid(
            "path",
            format!("cannot save {ext:?} assets; supported: {}", SAVEABLE_EXTENSIONS.join(", ")),
        ));
    }
    match params.get(1) {
        None | Some(Value::String(_)) => Ok(()),
        Some(_) => Err(key.invalid("content", "content must be a string")),
    }
}

fn asset_path<'a>(key: &ActionKey, value: &'a Value) -> Result<&'a str, ValidationError> {
    match value.as_str() {
        Some(path) if path.starts_with(ASSET_ROOT) => Ok(path),
        Some(path) => Err(key.invalid("path", format!("{path} must start with {ASSET_ROOT}"))),
        None => Err(key.invalid("path", "asset path must be a string")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn key(action: &str) -> ActionKey {
        ActionKey::new("scene", action)
    }

    #[test]
    fn create_node_shapes() {
        let k = key("create-node");
        assert!(create_node(&k, &[json!({"parent": "root", "name": "Player"})]).is_ok());
        assert!(create_node(&k, &[json!({"parent": "root", "type": "cc.Canvas", "components": ["cc.Sprite"]})]).is_ok());

        let err = create_node(&k, &[json!({"name": "orphan"})]).unwrap_err();
        assert_eq!(err.field, "parent");
        assert_eq!(create_node(&k, &[json!({"parent": "r", "components": [1]})]).unwrap_err().field, "components");
        assert_eq!(create_node(&k, &[json!({"parent": "r", "name": 5})]).unwrap_err().field, "name");
        assert_eq!(create_node(&k, &[]).unwrap_err().field, "params");
        assert_eq!(create_node(&k, &[json!("root")]).unwrap_err().field, "params");
    }

    #[test]
    fn create_component_requires_engine_prefix() {
        let k = key("create-component");
        assert!(create_component(&k, &[json!({"uuid": "n1", "component": "cc.Sprite"})]).is_ok());
        assert!(create_component(&k, &[json!({"uuid": "n1", "component": ["cc.Sprite", "cc.Widget"]})]).is_ok());
        assert!(create_component(&k, &[json!({"uuid": "n1", "component": "Sprite"})]).is_err());
        assert!(create_component(&k, &[json!({"uuid": "n1", "component": []})]).is_err());
        assert_eq!(
            create_component(&k, &[json!({"uuid": " ", "component": "cc.Sprite"})]).unwrap_err().field,
            "uuid"
        );
    }

    #[test]
    fn set_property_checks_builtin_names() {
        let k = key("set-property");
        let ok = json!({"uuid": "n1", "properties": [{"name": "position", "value": [0, 0, 0], "type": "Vec3"}]});
        assert!(set_property(&k, &[ok]).is_ok());

        let bad = json!({"uuid": "n1", "component": "cc.Label", "properties": [{"name": "colour", "value": 1, "type": "Color"}]});
        let err = set_property(&k, &[bad]).unwrap_err();
        assert_eq!(err.field, "properties[0].name");
        assert!(err.message.contains("fontSize"));

        let custom = json!({"uuid": "n1", "component": "game.Enemy", "properties": [{"name": "speed", "value": 3, "type": "Number"}]});
        assert!(set_property(&k, &[custom]).is_ok());

        let missing_value = json!({"uuid": "n1", "properties": [{"name": "active", "type": "Boolean"}]});
        assert_eq!(set_property(&k, &[missing_value]).unwrap_err().field, "properties[0].value");
        assert_eq!(set_property(&k, &[json!({"uuid": "n1", "properties": []})]).unwrap_err().field, "properties");
    }

    #[test]
    fn set_property_accepts_primitive_form() {
        let k = key("set-property");
        let primitive = json!({"uuid": "n1", "path": "__comps__.1.string", "dump": {"value": "hi", "type": "String"}});
        assert!(set_property(&k, &[primitive]).is_ok());
        let no_path = json!({"uuid": "n1", "dump": {"value": 1, "type": "Number"}});
        assert_eq!(set_property(&k, &[no_path]).unwrap_err().field, "path");
    }

    #[test]
    fn remove_and_reparent() {
        assert!(remove_node(&key("remove-node"), &[json!({"uuid": ["a", "b"]})]).is_ok());
        assert!(remove_node(&key("remove-node"), &[json!({"uuid": []})]).is_err());
        assert!(remove_node(&key("remove-node"), &[json!({"uuid": ["a", 2]})]).is_err());
        assert!(set_parent(&key("set-parent"), &[json!({"parent": "p", "uuids": ["a"]})]).is_ok());
        assert_eq!(set_parent(&key("set-parent"), &[json!({"parent": "p"})]).unwrap_err().field, "uuids");
    }

    #[test]
    fn open_scene_requires_string() {
        assert!(open_scene(&key("open-scene"), &[json!("db://assets/main.scene")]).is_ok());
        assert!(open_scene(&key("open-scene"), &[json!({"uuid": "x"})]).is_err());
        assert!(open_scene(&key("open-scene"), &[]).is_err());
    }

    #[test]
    fn asset_paths() {
        let create = ActionKey::new("asset-db", "create-asset");
        assert!(create_asset(&create, &[json!("db://assets/prefabs/Hero.prefab")]).is_ok());
        assert!(create_asset(&create, &[json!("db://assets/readme.md")]).is_err());
        assert!(create_asset(&create, &[json!("/tmp/Hero.prefab")]).is_err());

        let save = ActionKey::new("asset-db", "save-asset");
        assert!(save_asset(&save, &[json!("db://assets/main.scene")]).is_ok());
        assert!(save_asset(&save, &[json!("db://assets/fx.effect"), json!("{}")]).is_ok());
        assert_eq!(save_asset(&save, &[json!("db://assets/a.scene"), json!(1)]).unwrap_err().field, "content");
        assert!(save_asset(&save, &[json!("db://assets/notes.txt")]).is_err());
    }
}
