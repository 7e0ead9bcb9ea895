//! Semantic node types and what creating one implies.

use crate::error::NodeTypeTableError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A child node created right after its parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildSpec {
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ChildSpec {
    pub fn new(node_type: &str, name: &str) -> Self {
        Self {
            node_type: node_type.to_string(),
            name: Some(name.to_string()),
        }
    }
}

/// Components and children implied by one node type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeTypeSpec {
    #[serde(default)]
    pub components: Vec<String>,
    #[serde(default)]
    pub children: Vec<ChildSpec>,
}

impl NodeTypeSpec {
    pub fn new(components: &[&str], children: Vec<ChildSpec>) -> Self {
        Self {
            components: components.iter().map(|c| c.to_string()).collect(),
            children,
        }
    }
}

/// Map from node type to its expansion.
///
/// Children are themselves typed and expand recursively, so construction
/// rejects any table whose child graph loops.
#[derive(Debug, Clone)]
pub struct NodeTypeTable {
    types: HashMap<String, NodeTypeSpec>,
}

impl NodeTypeTable {
    /// A table with no entries; every type expands to nothing.
    pub fn empty() -> Self {
        Self {
            types: HashMap::new(),
        }
    }

    pub fn from_entries<I, S>(entries: I) -> Result<Self, NodeTypeTableError>
    where
        I: IntoIterator<Item = (S, NodeTypeSpec)>,
        S: Into<String>,
    {
        let table = Self {
            types: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        };
        table.check_acyclic()?;
        Ok(table)
    }

    pub fn get(&self, node_type: &str) -> Option<&NodeTypeSpec> {
        self.types.get(node_type)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    fn check_acyclic(&self) -> Result<(), NodeTypeTableError> {
        let mut done: HashSet<&str> = HashSet::new();
        for root in self.types.keys() {
            let mut path = Vec::new();
            self.visit(root, &mut path, &mut done)?;
        }
        Ok(())
    }

    fn visit<'a>(
        &'a self,
        node_type: &'a str,
        path: &mut Vec<&'a str>,
        done: &mut HashSet<&'a str>,
    ) -> Result<(), NodeTypeTableError> {
        if done.contains(node_type) {
            return Ok(());
        }
        if path.contains(&node_type) {
            path.push(node_type);
            return Err(NodeTypeTableError::Cycle(path.join(" -> ")));
        }
        path.push(node_type);
        if let Some(spec) = self.types.get(node_type) {
            for child in &spec.children {
                self.visit(&child.node_type, path, done)?;
            }
        }
        path.pop();
        done.insert(node_type);
        Ok(())
    }
}

/// The editor's built-in UI node types.
pub fn default_node_types() -> Vec<(&'static str, NodeTypeSpec)> {
    let ui = "cc.UITransform";
    vec![
        (
            "cc.Canvas",
            NodeTypeSpec::new(
                &[ui, "cc.Canvas", "cc.Widget"],
                vec![ChildSpec::new("cc.Camera", "Camera")],
            ),
        ),
        ("cc.Camera", NodeTypeSpec::new(&["cc.Camera"], vec![])),
        ("cc.Sprite", NodeTypeSpec::new(&[ui, "cc.Sprite"], vec![])),
        ("cc.Label", NodeTypeSpec::new(&[ui, "cc.Label"], vec![])),
        ("cc.Button", NodeTypeSpec::new(&[ui, "cc.Button", "cc.Sprite"], vec![])),
        ("cc.Layout", NodeTypeSpec::new(&[ui, "cc.Layout"], vec![])),
        (
            "cc.ScrollView",
            NodeTypeSpec::new(&[ui, "cc.ScrollView", "cc.Widget"], vec![]),
        ),
        (
            "cc.EditBox",
            NodeTypeSpec::new(
                &[ui, "cc.Sprite", "cc.EditBox"],
                vec![
                    ChildSpec::new("cc.Label", "PLACEHOLDER_LABEL"),
                    ChildSpec::new("cc.Label", "TEXT_LABEL"),
                ],
            ),
        ),
        ("cc.Toggle", NodeTypeSpec::new(&[ui, "cc.Toggle", "cc.Sprite"], vec![])),
        ("cc.Slider", NodeTypeSpec::new(&[ui, "cc.Slider", "cc.Sprite"], vec![])),
        (
            "cc.ProgressBar",
            NodeTypeSpec::new(&[ui, "cc.ProgressBar", "cc.Sprite"], vec![]),
        ),
        ("cc.RichText", NodeTypeSpec::new(&[ui, "cc.RichText"], vec![])),
        (
            "cc.BlockInputEvents",
            NodeTypeSpec::new(&["cc.BlockInputEvents"], vec![]),
        ),
        ("cc.Widget", NodeTypeSpec::new(&[ui, "cc.Widget"], vec![])),
    ]
}

impl NodeTypeTable {
    /// The built-in table, see [`default_node_types`].
    pub fn builtin() -> Self {
        Self {
            types: default_node_types()
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        }
    }
}

impl Default for NodeTypeTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_is_acyclic() {
        let table = NodeTypeTable::from_entries(default_node_types()).unwrap();
        assert_eq!(table.len(), 14);
        let canvas = table.get("cc.Canvas").unwrap();
        assert_eq!(canvas.components, vec!["cc.UITransform", "cc.Canvas", "cc.Widget"]);
        assert_eq!(canvas.children[0].node_type, "cc.Camera");
        assert_eq!(table.get("cc.EditBox").unwrap().children.len(), 2);
    }

    #[test]
    fn rejects_cycles() {
        let err = NodeTypeTable::from_entries([
            ("a", NodeTypeSpec::new(&[], vec![ChildSpec::new("b", "B")])),
            ("b", NodeTypeSpec::new(&[], vec![ChildSpec::new("a", "A")])),
        ])
        .unwrap_err();
        assert!(matches!(err, NodeTypeTableError::Cycle(path) if path.ends_with("-> a") || path.ends_with("-> b")));

        let self_ref = NodeTypeTable::from_entries([(
            "loop",
            NodeTypeSpec::new(&["cc.Sprite"], vec![ChildSpec::new("loop", "again")]),
        )]);
        assert!(self_ref.is_err());
    }

    #[test]
    fn unknown_child_type_is_a_leaf() {
        let table = NodeTypeTable::from_entries([(
            "panel",
            NodeTypeSpec::new(&["cc.Sprite"], vec![ChildSpec::new("unlisted", "Child")]),
        )])
        .unwrap();
        assert!(table.get("unlisted").is_none());
    }
}
