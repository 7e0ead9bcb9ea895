//! Asset paths, extensions, and default file contents.

use serde_json::json;

/// Every writable asset lives under this URL prefix.
pub const ASSET_ROOT: &str = "db://assets/";

/// Extensions `create-asset` can produce from a template.
pub const TEMPLATE_EXTENSIONS: &[&str] = &[
    ".prefab",
    ".scene",
    ".material",
    ".mtl",
    ".pmtl",
    ".anim",
    ".animask",
    ".pac",
    ".labelatlas",
];

/// Extensions `save-asset` accepts.
pub const SAVEABLE_EXTENSIONS: &[&str] = &[
    ".scene",
    ".prefab",
    ".anim",
    ".animask",
    ".material",
    ".mtl",
    ".pmtl",
    ".pac",
    ".labelatlas",
    ".fire",
    ".asset",
    ".effect",
    ".mesh",
    ".spline",
    ".fnt",
    ".spriteframe",
    ".physics",
];

/// Lower-cased extension including the dot, empty when there is none.
pub fn extension(path: &str) -> String {
    let file = path.rsplit('/').next().unwrap_or(path);
    match file.rfind('.') {
        Some(dot) => file[dot..].to_ascii_lowercase(),
        None => String::new(),
    }
}

/// Final path component without its extension.
pub fn stem(path: &str) -> &str {
    let file = path.rsplit('/').next().unwrap_or(path);
    match file.rfind('.') {
        Some(dot) => &file[..dot],
        None => file,
    }
}

pub fn is_scene_or_prefab(path: &str) -> bool {
    matches!(extension(path).as_str(), ".scene" | ".prefab")
}

/// Serialized content of a fresh asset at `path`.
///
/// Unknown extensions get an empty string.
pub fn default_content(path: &str) -> String {
    let name = stem(path);
    let value = match extension(path).as_str() {
        ".prefab" => json!([
            {"__type__": "cc.Prefab", "_name": name, "data": {"__id__": 1}, "optimizationPolicy": 0, "persistent": false},
            {"__type__": "cc.Node", "_name": name, "_parent": null, "_children": [], "_active": true, "_components": [], "_prefab": {"__id__": 2}},
            {"__type__": "cc.PrefabInfo", "root": {"__id__": 1}, "asset": {"__id__": 0}, "fileId": ""}
        ]),
        ".scene" => json!([
            {"__type__": "cc.SceneAsset", "_name": name, "scene": {"__id__": 1}},
            {"__type__": "cc.Scene", "_name": name, "_parent": null, "_children": [], "_active": true, "autoReleaseAssets": false}
        ]),
        ".material" | ".mtl" => json!({
            "__type__": "cc.Material",
            "_name": name,
            "_effectAsset": null,
            "_techIdx": 0,
            "_defines": [{}],
            "_states": [{}],
            "_props": [{}]
        }),
        ".pmtl" => json!({
            "__type__": "cc.PhysicsMaterial",
            "_name": name,
            "_friction": 0.6,
            "_rollingFriction": 0,
            "_spinningFriction": 0,
            "_restitution": 0
        }),
        ".anim" => json!({
            "__type__": "cc.AnimationClip",
            "_name": name,
            "sample": 60,
            "speed": 1,
            "wrapMode": 1,
            "_duration": 0,
            "_tracks": [],
            "_events": []
        }),
        ".animask" => json!({
            "__type__": "cc.animation.AnimationMask",
            "_name": name,
            "_jointMasks": []
        }),
        ".pac" => json!({
            "__type__": "cc.SpriteAtlas",
            "_name": name
        }),
        ".labelatlas" => json!({
            "__type__": "cc.LabelAtlas",
            "_name": name,
            "fontSize": 0,
            "spriteFrame": null
        }),
        _ => return String::new(),
    };
    serde_json::to_string_pretty(&value).unwrap_or_default()
}
