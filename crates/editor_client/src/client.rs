//! The facade every caller talks to.

use crate::catalog::ModuleCatalog;
use crate::config::{resolve_server_url, ServerInfo};
use crate::transport::{HttpTransport, Method, Transport, WireRequest};
use async_trait::async_trait;
use cocos_pipeline::{ApiResponse, EditorHandle, Params, Pipeline, PipelineError, ProcessorRegistry};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Client for one editor instance.
///
/// [`execute`](EditorClient::execute) runs an action through the processing
/// pipeline; [`execute_raw`](EditorClient::execute_raw) sends it as-is.
pub struct EditorClient {
    base_url: String,
    timeout: Duration,
    validate: bool,
    transport: Arc<dyn Transport>,
    pipeline: Pipeline,
    catalog: ModuleCatalog,
}

impl EditorClient {
    pub fn builder() -> EditorClientBuilder {
        EditorClientBuilder::default()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn server_info(&self) -> ServerInfo {
        ServerInfo::parse(&self.base_url)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn catalog(&self) -> &ModuleCatalog {
        &self.catalog
    }

    async fn request(&self, method: Method, endpoint: &str, body: Option<serde_json::Value>) -> ApiResponse {
        self.transport
            .send(WireRequest {
                method,
                url: format!("{}{}", self.base_url, endpoint),
                body,
                timeout: self.timeout,
            })
            .await
    }

    pub async fn health_check(&self) -> ApiResponse {
        self.request(Method::Get, "/api/server/health", None).await
    }

    pub async fn status(&self) -> ApiResponse {
        self.request(Method::Get, "/api/server/status", None).await
    }

    /// Lists the server's modules and records them in the catalog.
    pub async fn modules(&self) -> ApiResponse {
        let response = self.request(Method::Get, "/api/modules", None).await;
        if let Some(data) = response.payload() {
            self.catalog.absorb_listing(data);
        }
        response
    }

    pub async fn module_actions(&self, module: &str) -> ApiResponse {
        let response = self
            .request(Method::Get, &format!("/api/modules/{module}/actions"), None)
            .await;
        if let Some(data) = response.payload() {
            self.catalog.absorb_module(module, data);
        }
        response
    }

    /// Runs one action through validation, preprocessing, transport and
    /// postprocessing.
    ///
    /// Only a rejected request is an `Err`; editor and network failures come
    /// back as a response with `success: false`.
    pub async fn execute(&self, module: &str, action: &str, params: Params) -> Result<ApiResponse, PipelineError> {
        if self.validate {
            self.validate_module_action(module, action)?;
        }

        let mut result = self.pipeline.process_request(module, action, params, self).await?;

        let response = if result.skip_api_call {
            debug!("⏭️ {}:{} answered without an editor call", module, action);
            result.take_skip_response()
        } else {
            self.execute_raw(module, action, result.prepared.params.clone()).await
        };

        if result.skip_postprocessor {
            return Ok(response);
        }
        Ok(self
            .pipeline
            .process_response(module, action, response, &result.prepared, self)
            .await)
    }

    /// Sends an action straight to the editor, bypassing the pipeline.
    pub async fn execute_raw(&self, module: &str, action: &str, params: Params) -> ApiResponse {
        self.request(
            Method::Post,
            &format!("/api/{module}/{action}"),
            Some(json!({ "params": params })),
        )
        .await
    }

    /// Checks a pair against the module catalog without sending anything.
    pub fn validate_module_action(&self, module: &str, action: &str) -> Result<(), PipelineError> {
        self.catalog.validate(module, action)
    }

    /// Drops module listings learned from the server.
    pub fn invalidate_cache(&self) {
        self.catalog.invalidate();
    }
}

#[async_trait]
impl EditorHandle for EditorClient {
    async fn execute(&self, module: &str, action: &str, params: Params) -> Result<ApiResponse, PipelineError> {
        EditorClient::execute(self, module, action, params).await
    }

    async fn execute_raw(&self, module: &str, action: &str, params: Params) -> ApiResponse {
        EditorClient::execute_raw(self, module, action, params).await
    }
}

/// Builds an [`EditorClient`].
///
/// Without an explicit URL the server is located through
/// [`resolve_server_url`]; without a transport, requests go over HTTP.
pub struct EditorClientBuilder {
    base_url: Option<String>,
    timeout: Duration,
    validate: bool,
    transport: Option<Arc<dyn Transport>>,
    registry: Option<Arc<ProcessorRegistry>>,
}

impl Default for EditorClientBuilder {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
            validate: true,
            transport: None,
            registry: None,
        }
    }
}

impl EditorClientBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Whether `execute` checks the module/action catalog first.
    pub fn validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Uses `registry` instead of the shared built-in one.
    pub fn registry(mut self, registry: Arc<ProcessorRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn build(self) -> Result<EditorClient, ClientError> {
        let base_url = match self.base_url {
            Some(url) => url,
            None => resolve_server_url(None),
        }
        .trim_end_matches('/')
        .to_string();

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(reqwest::Client::builder().build()?)),
        };
        let pipeline = match self.registry {
            Some(registry) => Pipeline::new(registry),
            None => Pipeline::with_builtins(),
        };

        info!("🔌 Editor client targeting {} (timeout {}ms)", base_url, self.timeout.as_millis());
        Ok(EditorClient {
            base_url,
            timeout: self.timeout,
            validate: self.validate,
            transport,
            pipeline,
            catalog: ModuleCatalog::new(),
        })
    }
}
