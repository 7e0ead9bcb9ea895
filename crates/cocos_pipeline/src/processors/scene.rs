//! Scene lifecycle preprocessors.

use super::{is_path_like, truthy_result};
use crate::error::PipelineError;
use crate::identifier;
use crate::traits::{EditorHandle, Preprocessor};
use crate::types::{ActionKey, Params, Preprocessed};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Preprocessor for `scene:query-node-tree`, which accepts no arguments.
pub struct EmptyParams;

#[async_trait]
impl Preprocessor for EmptyParams {
    async fn preprocess(
        &self,
        _key: &ActionKey,
        _params: Params,
        _editor: &dyn EditorHandle,
    ) -> Result<Preprocessed, PipelineError> {
        Ok(Params::new().into())
    }
}

/// Saves the open scene if it has unsaved changes. Never fails.
pub(crate) async fn save_if_dirty(editor: &dyn EditorHandle) {
    let dirty = editor.execute_raw("scene", "query-dirty", Vec::new()).await;
    if !truthy_result(dirty.payload()) {
        return;
    }

    info!("💾 Scene has unsaved changes, saving before switching");
    let saved = editor.execute_raw("scene", "save-scene", Vec::new()).await;
    if saved.success {
        info!("💾 Scene saved");
    } else {
        warn!(
            "⚠️ Auto-save failed, continuing anyway: {}",
            saved.error.as_deref().unwrap_or("unknown error")
        );
    }
}

/// Preprocessor for `scene:open-scene`.
///
/// Saves pending changes, then resolves the argument: an asset path becomes
/// its UUID, a UUID is checked for existence. Lookups the editor could not
/// answer at all are left for the real call to report.
pub struct OpenScene;

#[async_trait]
impl Preprocessor for OpenScene {
    async fn preprocess(
        &self,
        key: &ActionKey,
        params: Params,
        editor: &dyn EditorHandle,
    ) -> Result<Preprocessed, PipelineError> {
        save_if_dirty(editor).await;

        let Some(Value::String(input)) = params.first() else {
            return Ok(params.into());
        };

        if is_path_like(input) {
            let response = editor
                .execute_raw("asset-db", "query-uuid", vec![Value::String(input.clone())])
                .await;
            return match response.payload() {
                Some(uuid) => {
                    debug!("Resolved scene {} to {}", input, uuid);
                    Ok(vec![uuid.clone()].into())
                }
                None => Err(key
                    .invalid("uuid", format!("no scene asset at {input}, check the path"))
                    .into()),
            };
        }

        if identifier::is_valid(input) {
            let response = editor
                .execute_raw("asset-db", "query-url", vec![Value::String(input.clone())])
                .await;
            if !response.success {
                warn!(
                    "⚠️ Could not verify scene {}: {}",
                    input,
                    response.error.as_deref().unwrap_or("unknown error")
                );
            } else if response.payload().is_none() {
                return Err(key
                    .invalid(
                        "uuid",
                        format!("unknown scene UUID {input}, try a path such as db://assets/scenes/Main.scene"),
                    )
                    .into());
            }
        }

        Ok(params.into())
    }
}

/// Preprocessor for `scene:close-scene`.
pub struct CloseScene;

#[async_trait]
impl Preprocessor for CloseScene {
    async fn preprocess(
        &self,
        _key: &ActionKey,
        params: Params,
        editor: &dyn EditorHandle,
    ) -> Result<Preprocessed, PipelineError> {
        save_if_dirty(editor).await;
        Ok(params.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingEditor;
    use crate::types::ApiResponse;
    use serde_json::json;

    fn key(action: &str) -> ActionKey {
        ActionKey::new("scene", action)
    }

    fn continued(outcome: Preprocessed) -> Params {
        match outcome {
            Preprocessed::Continue(prepared) => prepared.params,
            Preprocessed::ShortCircuit(_) => panic!("unexpected short-circuit"),
        }
    }

    #[tokio::test]
    async fn tree_query_drops_arguments() {
        let editor = RecordingEditor::default();
        let out = EmptyParams
            .preprocess(&key("query-node-tree"), vec![json!("junk")], &editor)
            .await
            .unwrap();
        assert!(continued(out).is_empty());
    }

    #[tokio::test]
    async fn dirty_scene_is_saved_before_open() {
        let editor = RecordingEditor::default();
        editor.respond("scene", "query-dirty", ApiResponse::ok(json!({"result": true})));
        editor.respond("scene", "save-scene", ApiResponse::bare_success());
        editor.respond("asset-db", "query-uuid", ApiResponse::ok(json!("scene-uuid")));

        let out = OpenScene
            .preprocess(&key("open-scene"), vec![json!("db://assets/Main.scene")], &editor)
            .await
            .unwrap();

        assert_eq!(continued(out), vec![json!("scene-uuid")]);
        let order: Vec<String> = editor.calls().iter().map(|c| c.key()).collect();
        assert_eq!(order, ["scene:query-dirty", "scene:save-scene", "asset-db:query-uuid"]);
    }

    #[tokio::test]
    async fn unknown_path_is_rejected() {
        let editor = RecordingEditor::default();
        editor.respond("scene", "query-dirty", ApiResponse::ok(json!(false)));
        editor.respond("asset-db", "query-uuid", ApiResponse::ok(Value::Null));

        let err = OpenScene
            .preprocess(&key("open-scene"), vec![json!("db://assets/Nope.scene")], &editor)
            .await
            .unwrap_err();
        assert_eq!(err.as_validation().unwrap().field, "uuid");
        assert!(editor.calls_to("scene", "save-scene").is_empty());
    }

    #[tokio::test]
    async fn uuid_input_is_verified() {
        let editor = RecordingEditor::default();
        editor.respond("asset-db", "query-url", ApiResponse::ok(Value::Null));

        let err = OpenScene
            .preprocess(&key("open-scene"), vec![json!("fc991dd7-0033-4b80-9d41-c8a86a702e59")], &editor)
            .await
            .unwrap_err();
        assert_eq!(err.as_validation().unwrap().field, "uuid");
    }

    #[tokio::test]
    async fn unreachable_lookup_fails_open() {
        let editor = RecordingEditor::default();
        editor.respond("asset-db", "query-url", ApiResponse::failure("Connection failed: refused"));

        let params = vec![json!("fcmR3XADNLgJ1ByKhqcC5Z")];
        let out = OpenScene
            .preprocess(&key("open-scene"), params.clone(), &editor)
            .await
            .unwrap();
        assert_eq!(continued(out), params);
    }

    #[tokio::test]
    async fn close_saves_then_passes_through() {
        let editor = RecordingEditor::default();
        editor.respond("scene", "query-dirty", ApiResponse::ok(json!(true)));
        editor.respond("scene", "save-scene", ApiResponse::failure("read-only"));

        let out = CloseScene
            .preprocess(&key("close-scene"), vec![json!(true)], &editor)
            .await
            .unwrap();
        assert_eq!(continued(out), vec![json!(true)]);
        assert_eq!(editor.calls().len(), 2);
    }
}
