//! Known editor modules and their actions.
//!
//! A built-in table covers what the editor ships with. Listings fetched from a
//! running server are cached on top of it until [`ModuleCatalog::invalidate`].

use cocos_pipeline::PipelineError;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

const SCENE: &[&str] = &[
    "open-scene", "save-scene", "save-as-scene", "close-scene", "set-property", "reset-property",
    "move-array-element", "remove-array-element", "copy-node", "duplicate-node", "paste-node",
    "cut-node", "set-parent", "create-node", "remove-node", "reset-node", "reset-component",
    "restore-prefab", "create-component", "remove-component", "execute-component-method",
    "execute-scene-script", "snapshot", "snapshot-abort", "soft-reload", "change-gizmo-tool",
    "query-gizmo-tool-name", "change-gizmo-pivot", "query-gizmo-pivot", "change-gizmo-coordinate",
    "query-gizmo-coordinate", "change-is2D", "query-is2D", "set-grid-visible",
    "query-is-grid-visible", "set-icon-gizmo-3d", "query-is-icon-gizmo-3d", "set-icon-gizmo-size",
    "query-icon-gizmo-size", "focus-camera", "align-with-view", "align-view-with-node",
    "query-is-ready", "query-node", "query-component", "query-node-tree",
    "query-nodes-by-asset-uuid", "query-dirty", "query-classes", "query-components",
    "query-component-has-script", "query-scene-bounds", "is-native",
];

const ASSET_DB: &[&str] = &[
    "query-ready", "create-asset", "import-asset", "copy-asset", "move-asset", "delete-asset",
    "open-asset", "save-asset", "save-asset-meta", "reimport-asset", "refresh-asset",
    "query-asset-info", "query-missing-asset-info", "query-asset-meta", "query-asset-users",
    "query-asset-dependencies", "query-path", "query-url", "query-uuid", "query-assets",
    "generate-available-url",
];

const PROJECT: &[&str] = &["open-settings", "query-config", "set-config"];
const BUILDER: &[&str] = &["open", "query-worker-ready"];
const ENGINE: &[&str] = &["query-info", "query-engine-info"];
const INFORMATION: &[&str] = &["query-information", "open-information-dialog", "has-dialog", "close-dialog"];
const PREFERENCES: &[&str] = &["open-settings", "query-config", "set-config"];
const PROGRAM: &[&str] = &["query-program-info", "open-program", "open-url"];
const PROGRAMMING: &[&str] = &["query-shared-settings", "query-sorted-plugins"];
const SERVER: &[&str] = &["query-ip-list", "query-port"];
const DEVICE: &[&str] = &["query"];
const EXTENSION: &[&str] = &["create-extension-template"];

/// The modules and actions every supported editor version exposes.
pub static BUILTIN_MODULES: Lazy<BTreeMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    BTreeMap::from([
        ("scene", SCENE),
        ("asset-db", ASSET_DB),
        ("project", PROJECT),
        ("builder", BUILDER),
        ("engine", ENGINE),
        ("information", INFORMATION),
        ("preferences", PREFERENCES),
        ("program", PROGRAM),
        ("programming", PROGRAMMING),
        ("server", SERVER),
        ("device", DEVICE),
        ("extension", EXTENSION),
    ])
});

/// Built-in table plus whatever the server has reported.
#[derive(Debug, Default)]
pub struct ModuleCatalog {
    discovered: DashMap<String, BTreeSet<String>>,
}

impl ModuleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_known(&self, module: &str, action: &str) -> bool {
        BUILTIN_MODULES
            .get(module)
            .is_some_and(|actions| actions.contains(&action))
            || self
                .discovered
                .get(module)
                .is_some_and(|actions| actions.contains(action))
    }

    /// Accepts a known pair, otherwise lists what is available.
    pub fn validate(&self, module: &str, action: &str) -> Result<(), PipelineError> {
        if self.is_known(module, action) {
            return Ok(());
        }
        let available = if self.has_module(module) {
            format!("actions of {module}: {}", self.actions(module).join(", "))
        } else {
            format!("modules: {}", self.modules().join(", "))
        };
        Err(PipelineError::UnknownAction {
            module: module.to_string(),
            action: action.to_string(),
            available,
        })
    }

    pub fn has_module(&self, module: &str) -> bool {
        BUILTIN_MODULES.contains_key(module) || self.discovered.contains_key(module)
    }

    /// All module names, sorted.
    pub fn modules(&self) -> Vec<String> {
        let mut names: BTreeSet<String> = BUILTIN_MODULES.keys().map(|m| m.to_string()).collect();
        names.extend(self.discovered.iter().map(|entry| entry.key().clone()));
        names.into_iter().collect()
    }

    /// Actions of `module`, built-in ones first in table order, then discovered ones sorted.
    pub fn actions(&self, module: &str) -> Vec<String> {
        let mut actions: Vec<String> = BUILTIN_MODULES
            .get(module)
            .map(|list| list.iter().map(|a| a.to_string()).collect())
            .unwrap_or_default();
        if let Some(extra) = self.discovered.get(module) {
            for action in extra.iter() {
                if !actions.contains(action) {
                    actions.push(action.clone());
                }
            }
        }
        actions
    }

    /// Records a server module listing.
    ///
    /// Accepts `{"scene": ["open-scene", ...]}`, a list of
    /// `{"name": ..., "actions": [...]}`, or either wrapped in `{"modules": ...}`.
    pub fn absorb_listing(&self, data: &Value) -> usize {
        let data = data.get("modules").unwrap_or(data);
        let mut absorbed = 0;
        match data {
            Value::Object(map) => {
                for (module, actions) in map {
                    absorbed += self.absorb_module(module, actions);
                }
            }
            Value::Array(items) => {
                for item in items {
                    if let (Some(module), Some(actions)) =
                        (item.get("name").and_then(Value::as_str), item.get("actions"))
                    {
                        absorbed += self.absorb_module(module, actions);
                    }
                }
            }
            _ => {}
        }
        debug!("Catalog absorbed {} modules from server", absorbed);
        absorbed
    }

    /// Records the actions listing of a single module.
    pub fn absorb_module(&self, module: &str, actions: &Value) -> usize {
        let actions = actions.get("actions").unwrap_or(actions);
        let Some(items) = actions.as_array() else {
            return 0;
        };
        let names = items.iter().filter_map(|a| match a {
            Value::String(name) => Some(name.clone()),
            other => other.get("name").and_then(Value::as_str).map(str::to_string),
        });
        self.discovered.entry(module.to_string()).or_default().extend(names);
        1
    }

    /// Forgets everything learned from the server.
    pub fn invalidate(&self) {
        self.discovered.clear();
    }
}
