//! Refuses node moves that would make a node its own ancestor.
//!
//! A move of node `M` under parent `P` is a cycle exactly when `P` is `M`
//! or sits somewhere below `M`. The check needs the live tree, so it fetches
//! it on every call. When the tree cannot be fetched, or `P` is not in it, the
//! move goes through and the editor decides.

use super::single_object;
use crate::error::{PipelineError, ValidationError};
use crate::scene::SceneTree;
use crate::traits::{EditorHandle, Preprocessor};
use crate::types::{ActionKey, Params, Preprocessed};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

/// Preprocessor for `scene:set-parent`.
pub struct CycleSafeReparent;

/// Result of trying to obtain the current tree.
enum TreeFetch {
    Fetched(SceneTree),
    Unavailable(String),
}

impl CycleSafeReparent {
    fn moved_ids(params: &[Value]) -> Vec<&str> {
        let Some(options) = params.first().and_then(Value::as_object) else {
            return Vec::new();
        };
        match options.get("uuids") {
            Some(Value::String(s)) => vec![s.as_str()],
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    async fn fetch_tree(editor: &dyn EditorHandle) -> TreeFetch {
        let response = editor.execute_raw("scene", "query-node-tree", Vec::new()).await;
        match response.payload() {
            Some(data) => TreeFetch::Fetched(SceneTree::from_response_data(data)),
            None => TreeFetch::Unavailable(
                response
                    .error
                    .unwrap_or_else(|| "empty node tree response".to_string()),
            ),
        }
    }

    /// Fails on the first moved node that is an ancestor of (or equal to) `parent`.
    pub fn check(
        key: &ActionKey,
        tree: &SceneTree,
        moved: &[&str],
        parent: &str,
    ) -> Result<(), ValidationError> {
        let index = tree.index();
        if !index.contains(parent) {
            debug!("🌲 Parent {} not in scene tree, skipping cycle check", parent);
            return Ok(());
        }

        let above_parent = index.ancestors(parent);
        for &id in moved {
            if !index.contains(id) {
                continue;
            }
            if id == parent || above_parent.contains(&id) {
                return Err(key.invalid(
                    "uuids",
                    format!("cannot move node {id} under {parent}: {parent} is a descendant of {id}"),
                ));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Preprocessor for CycleSafeReparent {
    async fn preprocess(
        &self,
        key: &ActionKey,
        params: Params,
        editor: &dyn EditorHandle,
    ) -> Result<Preprocessed, PipelineError> {
        let parent = match single_object(key, &params)
            .ok()
            .and_then(|o| o.get("parent"))
            .and_then(Value::as_str)
        {
            Some(parent) => parent.to_string(),
            None => return Ok(params.into()),
        };

        {
            let moved = Self::moved_ids(&params);
            if let Some(id) = moved.iter().find(|&&id| id == parent) {
                return Err(key
                    .invalid("parent", format!("cannot set node {id} as its own parent"))
                    .into());
            }

            match Self::fetch_tree(editor).await {
                TreeFetch::Fetched(tree) => Self::check(key, &tree, &moved, &parent)?,
                TreeFetch::Unavailable(reason) => {
                    warn!("⚠️ Could not fetch node tree for cycle check, allowing move: {}", reason);
                }
            }
        }

        Ok(params.into())
    }
}
