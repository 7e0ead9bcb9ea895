use async_trait::async_trait;
use cocos_pipeline::{
    identifier, ActionKey, ApiResponse, EditorHandle, Params, Pipeline, PipelineError, PipelineResult,
    Preprocessed, Preprocessor, ProcessorRegistry,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Counts wire calls and answers every one with the same response.
#[derive(Default)]
struct CountingEditor {
    wire_calls: AtomicUsize,
    seen: Mutex<Vec<String>>,
}

#[async_trait]
impl EditorHandle for CountingEditor {
    async fn execute(&self, module: &str, action: &str, params: Params) -> Result<ApiResponse, PipelineError> {
        Ok(self.execute_raw(module, action, params).await)
    }

    async fn execute_raw(&self, module: &str, action: &str, _params: Params) -> ApiResponse {
        self.wire_calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(format!("{module}:{action}"));
        ApiResponse::ok(json!({"from": "wire"}))
    }
}

struct AnswerLocally;

#[async_trait]
impl Preprocessor for AnswerLocally {
    async fn preprocess(
        &self,
        _key: &ActionKey,
        params: Params,
        _editor: &dyn EditorHandle,
    ) -> Result<Preprocessed, PipelineError> {
        Ok(Preprocessed::ShortCircuit(PipelineResult::skip(
            params.into(),
            ApiResponse::ok(json!({"from": "cache"})),
        )))
    }
}

/// Drives a pipeline the way a client does.
async fn run(pipeline: &Pipeline, editor: &CountingEditor, module: &str, action: &str, params: Params) -> Result<ApiResponse, PipelineError> {
    let mut result = pipeline.process_request(module, action, params, editor).await?;
    let response = if result.skip_api_call {
        result.take_skip_response()
    } else {
        editor.execute_raw(module, action, result.prepared.params.clone()).await
    };
    if result.skip_postprocessor {
        return Ok(response);
    }
    Ok(pipeline.process_response(module, action, response, &result.prepared, editor).await)
}

#[tokio::test]
async fn skipped_call_never_reaches_the_wire() {
    let registry = ProcessorRegistry::builder()
        .preprocessor("project", "query-config", AnswerLocally)
        .build();
    let pipeline = Pipeline::new(Arc::new(registry));
    let editor = CountingEditor::default();

    let response = run(&pipeline, &editor, "project", "query-config", vec![json!("general")])
        .await
        .unwrap();

    assert_eq!(response.data, Some(json!({"from": "cache"})));
    assert_eq!(editor.wire_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unregistered_action_passes_through() {
    let pipeline = Pipeline::new(Arc::new(ProcessorRegistry::default()));
    let editor = CountingEditor::default();

    let response = run(&pipeline, &editor, "engine", "query-engine-info", vec![]).await.unwrap();
    assert_eq!(response.data, Some(json!({"from": "wire"})));
    assert_eq!(*editor.seen.lock().unwrap(), ["engine:query-engine-info"]);
}

#[tokio::test]
async fn invalid_request_fails_before_any_traffic() {
    let pipeline = Pipeline::with_builtins();
    let editor = CountingEditor::default();

    let err = run(&pipeline, &editor, "scene", "create-node", vec![json!({"name": "orphan"})])
        .await
        .unwrap_err();

    let validation = err.as_validation().expect("validation error");
    assert_eq!(validation.module, "scene");
    assert_eq!(validation.action, "create-node");
    assert_eq!(validation.field, "parent");
    assert!(err.to_string().starts_with("[scene/create-node] parent:"));
    assert_eq!(editor.wire_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn self_parent_is_rejected_without_traffic() {
    let pipeline = Pipeline::with_builtins();
    let editor = CountingEditor::default();

    let err = run(&pipeline, &editor, "scene", "set-parent", vec![json!({"uuids": ["n1"], "parent": "n1"})])
        .await
        .unwrap_err();
    assert_eq!(err.as_validation().unwrap().field, "parent");
    assert_eq!(editor.wire_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn shared_registry_is_initialized_once() {
    let first = ProcessorRegistry::shared();
    let second = ProcessorRegistry::shared();
    assert!(Arc::ptr_eq(&first, &second));
    assert!(first.validators.has("scene", "set-property"));
    assert!(first.preprocessors.has("scene", "set-parent"));
    assert!(first.postprocessors.has("scene", "query-node"));
}

#[test]
fn identifier_forms_agree() {
    let canonical = identifier::generate();
    let compact22 = identifier::to_compact22(&canonical).unwrap();
    let compact23 = identifier::compress(&canonical).unwrap();

    assert_eq!(compact22.len(), 22);
    assert_eq!(compact23.len(), 23);
    assert_eq!(identifier::decode(&compact22).unwrap(), canonical);
    assert_eq!(identifier::decompress(&compact23).unwrap(), canonical);
    assert!(identifier::is_valid(&compact22));
    assert!(identifier::is_valid(&format!("{canonical}@f9941")));
}

#[test]
fn unexpected_values_do_not_panic_the_codec() {
    for input in ["", "zz", "fcmR3XADNLgJ1ByKhqcC5", "not-a-uuid-at-all-but-36-characters!"] {
        assert!(identifier::decode(input).is_err(), "{input}");
    }
}
