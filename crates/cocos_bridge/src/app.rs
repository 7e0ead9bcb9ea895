//! Application lifecycle: turn the parsed command line into one editor call.

use crate::cli::{CliArgs, CliCommand, UuidOp};
use crate::config::AppConfig;
use cocos_pipeline::{identifier, ApiResponse, IdentifierError};
use editor_client::EditorClient;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info};

/// One bridge invocation.
pub struct Application {
    client: EditorClient,
    command: CliCommand,
}

impl Application {
    /// Loads configuration, applies command-line overrides, and builds the client.
    pub async fn new(args: CliArgs) -> Result<Self, Box<dyn std::error::Error>> {
        let mut config = AppConfig::load_from_file(&args.config_path).await?;

        if let Some(url) = args.server_url {
            config.client.server_url = Some(url);
        }
        if let Some(timeout_ms) = args.timeout_ms {
            config.client.timeout_ms = timeout_ms;
        }
        if args.no_validate {
            config.client.validate = false;
        }
        if let Some(level) = args.log_level {
            config.logging.level = level;
        }
        config.validate()?;

        let mut builder = EditorClient::builder()
            .timeout(Duration::from_millis(config.client.timeout_ms))
            .validate(config.client.validate);
        if let Some(url) = config.client.server_url {
            builder = builder.base_url(url);
        }

        Ok(Self::with_client(builder.build()?, args.command))
    }

    pub fn with_client(client: EditorClient, command: CliCommand) -> Self {
        Self { client, command }
    }

    /// Runs the command; rejected requests come back as failed responses.
    pub async fn run(&self) -> ApiResponse {
        let client = &self.client;
        match &self.command {
            CliCommand::Health => client.health_check().await,
            CliCommand::Status => client.status().await,
            CliCommand::Config => {
                let info = client.server_info();
                ApiResponse::ok(json!({
                    "baseUrl": client.base_url(),
                    "host": info.host,
                    "port": info.port,
                    "timeoutMs": client.timeout().as_millis() as u64,
                }))
            }
            CliCommand::ListModules { remote: true } => client.modules().await,
            CliCommand::ListModules { remote: false } => ApiResponse::ok(json!(client.catalog().modules())),
            CliCommand::ListActions { module, remote: true } => client.module_actions(module).await,
            CliCommand::ListActions { module, remote: false } => {
                if client.catalog().has_module(module) {
                    ApiResponse::ok(json!(client.catalog().actions(module)))
                } else {
                    ApiResponse::failure(format!(
                        "Unknown module: {module}. Available modules: {}",
                        client.catalog().modules().join(", ")
                    ))
                }
            }
            CliCommand::Exec { module, action, params } => {
                info!("🚀 {}:{} with {} params", module, action, params.len());
                match client.execute(module, action, params.clone()).await {
                    Ok(response) => response,
                    Err(e) => {
                        debug!("Request rejected: {}", e);
                        ApiResponse::failure(e.to_string())
                    }
                }
            }
            CliCommand::Raw { module, action, params } => {
                info!("📨 raw {}:{} with {} params", module, action, params.len());
                client.execute_raw(module, action, params.clone()).await
            }
            CliCommand::Uuid { op, value } => uuid_command(*op, value.as_deref()),
        }
    }
}

/// Identifier conversions run locally; no editor involved.
pub fn uuid_command(op: UuidOp, value: Option<&str>) -> ApiResponse {
    let convert: fn(&str) -> Result<String, IdentifierError> = match op {
        UuidOp::Generate => return ApiResponse::ok(Value::String(identifier::generate())),
        UuidOp::Validate => return value.map_or_else(missing_value, validity),
        UuidOp::Decode => identifier::decode,
        UuidOp::Compress => identifier::compress,
        UuidOp::Decompress => identifier::decompress,
        UuidOp::Compact22 => identifier::to_compact22,
    };
    let Some(value) = value else {
        return missing_value();
    };

    match convert(value) {
        Ok(result) => ApiResponse::ok(Value::String(result)),
        Err(e) => ApiResponse::failure(e.to_string()),
    }
}

fn missing_value() -> ApiResponse {
    ApiResponse::failure("This uuid operation needs a value")
}

fn validity(value: &str) -> ApiResponse {
    let valid = identifier::is_valid(value);
    ApiResponse {
        success: valid,
        data: Some(json!({ "value": value, "valid": valid })),
        error: (!valid).then(|| format!("Not an editor identifier: {value}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use editor_client::{Transport, WireRequest};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Recorder {
        urls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Transport for Recorder {
        async fn send(&self, request: WireRequest) -> ApiResponse {
            self.urls.lock().unwrap().push(request.url);
            ApiResponse::ok(json!({"echo": request.body}))
        }
    }

    fn app(transport: &Arc<Recorder>, command: CliCommand) -> Application {
        let client = EditorClient::builder()
            .base_url("http://127.0.0.1:7456")
            .timeout(Duration::from_millis(1_500))
            .transport(transport.clone())
            .build()
            .unwrap();
        Application::with_client(client, command)
    }

    #[tokio::test]
    async fn config_reports_server_without_traffic() {
        let transport = Arc::new(Recorder::default());
        let response = app(&transport, CliCommand::Config).run().await;

        assert_eq!(
            response.data,
            Some(json!({"baseUrl": "http://127.0.0.1:7456", "host": "127.0.0.1", "port": 7456, "timeoutMs": 1500}))
        );
        assert!(transport.urls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejected_exec_becomes_failed_response() {
        let transport = Arc::new(Recorder::default());
        let command = CliCommand::Exec {
            module: "scene".into(),
            action: "remove-node".into(),
            params: vec![json!({})],
        };
        let response = app(&transport, command).run().await;

        assert!(!response.success);
        assert!(response.error.unwrap().contains("[scene/remove-node] uuid:"));
        assert!(transport.urls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn raw_goes_straight_to_the_editor() {
        let transport = Arc::new(Recorder::default());
        let command = CliCommand::Raw {
            module: "scene".into(),
            action: "made-up".into(),
            params: vec![json!(1)],
        };
        let response = app(&transport, command).run().await;

        assert!(response.success);
        assert_eq!(response.data, Some(json!({"echo": {"params": [1]}})));
        assert_eq!(*transport.urls.lock().unwrap(), ["http://127.0.0.1:7456/api/scene/made-up"]);
    }

    #[tokio::test]
    async fn local_listings() {
        let transport = Arc::new(Recorder::default());

        let modules = app(&transport, CliCommand::ListModules { remote: false }).run().await;
        assert!(modules.data.unwrap().as_array().unwrap().contains(&json!("asset-db")));

        let unknown = app(&transport, CliCommand::ListActions { module: "physics".into(), remote: false })
            .run()
            .await;
        assert!(unknown.error.unwrap().starts_with("Unknown module: physics"));
        assert!(transport.urls.lock().unwrap().is_empty());
    }

    #[test]
    fn uuid_conversions() {
        let canonical = "fc991dd7-0033-4b80-9d41-c8a86a702e59";
        assert_eq!(
            uuid_command(UuidOp::Compact22, Some(canonical)).data,
            Some(json!("fcmR3XADNLgJ1ByKhqcC5Z"))
        );
        assert_eq!(
            uuid_command(UuidOp::Decode, Some("fcmR3XADNLgJ1ByKhqcC5Z")).data,
            Some(json!(canonical))
        );

        let invalid = uuid_command(UuidOp::Validate, Some("not-an-id"));
        assert!(!invalid.success);
        assert_eq!(invalid.data.unwrap()["valid"], json!(false));

        assert!(!uuid_command(UuidOp::Decode, None).success);
        assert!(!uuid_command(UuidOp::Decode, Some("zz")).success);

        let generated = uuid_command(UuidOp::Generate, None);
        assert!(identifier::is_valid(generated.data.unwrap().as_str().unwrap()));
    }
}
