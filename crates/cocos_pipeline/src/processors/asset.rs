//! Asset database preprocessors.

use super::is_path_like;
use crate::error::PipelineError;
use crate::identifier;
use crate::tables::assets;
use crate::traits::{EditorHandle, Preprocessor};
use crate::types::{ActionKey, Params, Preprocessed};
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

fn lone_path(params: &[Value]) -> Option<&str> {
    match params {
        [Value::String(path)] => Some(path),
        _ => None,
    }
}

/// Preprocessor for `asset-db:create-asset`: fills in template content.
pub struct CreateAssetContent;

#[async_trait]
impl Preprocessor for CreateAssetContent {
    async fn preprocess(
        &self,
        _key: &ActionKey,
        params: Params,
        _editor: &dyn EditorHandle,
    ) -> Result<Preprocessed, PipelineError> {
        let Some(path) = lone_path(&params) else {
            return Ok(params.into());
        };
        let content = assets::default_content(path);
        Ok(vec![Value::String(path.to_string()), Value::String(content)].into())
    }
}

/// Preprocessor for `asset-db:save-asset`.
///
/// Scenes and prefabs are saved from a snapshot of the live scene; anything
/// else, or a scene whose snapshot cannot be taken, gets template content.
pub struct SaveAssetContent;

impl SaveAssetContent {
    async fn scene_snapshot(editor: &dyn EditorHandle) -> Option<String> {
        let dirty = editor.execute("scene", "query-dirty", Vec::new()).await;
        let tree = editor.execute("scene", "query-node-tree", Vec::new()).await;
        let dirty = dirty.ok().filter(|r| r.success);
        let tree = tree.ok().filter(|r| r.success);
        if dirty.is_none() && tree.is_none() {
            return None;
        }
        let snapshot = json!({
            "dirty": dirty.and_then(|r| r.data),
            "nodeTree": tree.and_then(|r| r.data),
        });
        serde_json::to_string(&snapshot).ok()
    }
}

#[async_trait]
impl Preprocessor for SaveAssetContent {
    async fn preprocess(
        &self,
        _key: &ActionKey,
        params: Params,
        editor: &dyn EditorHandle,
    ) -> Result<Preprocessed, PipelineError> {
        let Some(path) = lone_path(&params) else {
            return Ok(params.into());
        };

        let content = if assets::is_scene_or_prefab(path) {
            match Self::scene_snapshot(editor).await {
                Some(snapshot) => snapshot,
                None => {
                    warn!("⚠️ Scene data unavailable, saving {} from template", path);
                    assets::default_content(path)
                }
            }
        } else {
            assets::default_content(path)
        };
        Ok(vec![Value::String(path.to_string()), Value::String(content)].into())
    }
}

/// Preprocessor for `asset-db:open-asset`: turns a UUID into its asset URL.
pub struct OpenAsset;

#[async_trait]
impl Preprocessor for OpenAsset {
    async fn preprocess(
        &self,
        key: &ActionKey,
        params: Params,
        editor: &dyn EditorHandle,
    ) -> Result<Preprocessed, PipelineError> {
        let Some(Value::String(input)) = params.first() else {
            return Ok(params.into());
        };
        if is_path_like(input) || !identifier::is_valid(input) {
            return Ok(params.into());
        }

        let response = editor
            .execute_raw("asset-db", "query-url", vec![Value::String(input.clone())])
            .await;
        if !response.success {
            warn!(
                "⚠️ Could not resolve asset {}: {}",
                input,
                response.error.as_deref().unwrap_or("unknown error")
            );
            return Ok(params.into());
        }
        match response.payload() {
            Some(url) => {
                debug!("Resolved asset {} to {}", input, url);
                Ok(vec![url.clone()].into())
            }
            None => Err(key
                .invalid(
                    "path",
                    format!("unknown asset UUID {input}, try a path such as db://assets/scenes/Main.scene"),
                )
                .into()),
        }
    }
}
