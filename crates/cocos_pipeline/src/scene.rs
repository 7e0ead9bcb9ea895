//! Transient view of the editor's scene hierarchy.
//!
//! Built from a `query-node-tree` response for a single decision and dropped
//! afterwards. Nothing here is cached: the remote scene can change between
//! two calls.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// Component summary attached to a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentInfo {
    #[serde(rename = "type")]
    pub component_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<serde_json::Map<String, Value>>,
}

/// One node of the hierarchy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneNode {
    pub uuid: String,
    pub name: String,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    /// Parses a node, tolerating `{ "value": ... }` wrappers on `uuid` and `name`.
    ///
    /// Returns `None` when the node has no usable uuid.
    pub fn from_value(value: &Value) -> Option<SceneNode> {
        let uuid = text_field(value.get("uuid")?)?;
        let name = value.get("name").and_then(text_field).unwrap_or_default();
        let children = value
            .get("children")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(SceneNode::from_value).collect())
            .unwrap_or_default();
        Some(SceneNode {
            uuid,
            name,
            children,
        })
    }
}

fn text_field(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Object(map) => map.get("value").and_then(text_field),
        _ => None,
    }
}

/// A parsed scene: usually one root, but editors return a list when several
/// scenes or prefabs are open.
#[derive(Debug, Clone, Default)]
pub struct SceneTree {
    pub roots: Vec<SceneNode>,
}

impl SceneTree {
    /// Accepts a single root object, a list of roots, or either wrapped in
    /// `{ "result": ... }`.
    pub fn from_response_data(data: &Value) -> SceneTree {
        let data = data.get("result").unwrap_or(data);
        let roots = match data {
            Value::Array(items) => items.iter().filter_map(SceneNode::from_value).collect(),
            Value::Object(_) => SceneNode::from_value(data).into_iter().collect(),
            _ => Vec::new(),
        };
        SceneTree { roots }
    }

    pub fn index(&self) -> SceneIndex<'_> {
        SceneIndex::build(self)
    }
}

/// Pre-order index of a [`SceneTree`]: uuid to node, and uuid to parent uuid.
pub struct SceneIndex<'a> {
    nodes: HashMap<&'a str, &'a SceneNode>,
    parents: HashMap<&'a str, &'a str>,
}

impl<'a> SceneIndex<'a> {
    fn build(tree: &'a SceneTree) -> Self {
        let mut nodes = HashMap::new();
        let mut parents = HashMap::new();
        let mut stack: Vec<(&'a SceneNode, Option<&'a str>)> =
            tree.roots.iter().rev().map(|n| (n, None)).collect();

        while let Some((node, parent)) = stack.pop() {
            nodes.insert(node.uuid.as_str(), node);
            if let Some(parent) = parent {
                parents.insert(node.uuid.as_str(), parent);
            }
            for child in node.children.iter().rev() {
                stack.push((child, Some(node.uuid.as_str())));
            }
        }
        Self { nodes, parents }
    }

    pub fn get(&self, uuid: &str) -> Option<&'a SceneNode> {
        self.nodes.get(uuid).copied()
    }

    pub fn contains(&self, uuid: &str) -> bool {
        self.nodes.contains_key(uuid)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every node below `uuid`, excluding `uuid` itself.
    pub fn descendants(&self, uuid: &str) -> HashSet<&'a str> {
        let mut out = HashSet::new();
        let Some(node) = self.get(uuid) else {
            return out;
        };
        let mut stack: Vec<&'a SceneNode> = node.children.iter().collect();
        while let Some(next) = stack.pop() {
            if out.insert(next.uuid.as_str()) {
                stack.extend(next.children.iter());
            }
        }
        out
    }

    /// Parent chain of `uuid`, nearest first, excluding `uuid` itself.
    pub fn ancestors(&self, uuid: &str) -> Vec<&'a str> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = uuid;
        while let Some(&parent) = self.parents.get(current) {
            if !seen.insert(parent) {
                break;
            }
            chain.push(parent);
            current = parent;
        }
        chain
    }
}
