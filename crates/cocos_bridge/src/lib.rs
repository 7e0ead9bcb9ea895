//! # Cocos Bridge
//!
//! Command-line access to a running Cocos Creator editor. Each invocation
//! performs one request and prints the JSON response on stdout.
//!
//! ```bash
//! # Is the editor listening?
//! cocos-bridge health
//!
//! # Create a button under a node, letting the pipeline add its components
//! cocos-bridge exec scene create-node '{"parent":"<uuid>","type":"cc.Button"}'
//!
//! # Talk to a specific editor, bypassing the module catalog
//! cocos-bridge --server http://127.0.0.1:7456 --no-validate raw scene query-dirty
//!
//! # Identifier conversions need no editor
//! cocos-bridge uuid compact22 fc991dd7-0033-4b80-9d41-c8a86a702e59
//! ```
//!
//! Settings come from `cocos-bridge.toml` (see [`AppConfig`]) and are
//! overridden by command-line flags. Logs go to stderr.
//!
//! Exit code is 0 for a successful response, 1 for a failed response, a
//! rejected request or a startup error, and 130 when interrupted.

use tracing::error;

mod app;
mod cli;
mod config;
mod logging;
mod signals;

pub use app::{uuid_command, Application};
pub use cli::{parse_param, CliArgs, CliCommand, UuidOp};
pub use config::{AppConfig, ClientSettings, ConfigError, LoggingSettings};

/// Entry point called from `main`.
pub async fn init() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    let mut config = AppConfig::load_from_file(&args.config_path)
        .await
        .unwrap_or_default();
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }

    if let Err(e) = logging::setup_logging(&config.logging, args.json_logs) {
        eprintln!("❌ Failed to setup logging: {e}");
        std::process::exit(1);
    }

    let app = match Application::new(args).await {
        Ok(app) => app,
        Err(e) => {
            error!("❌ Failed to start: {e}");
            std::process::exit(1);
        }
    };

    let response = tokio::select! {
        response = app.run() => response,
        interrupted = signals::wait_for_interrupt() => {
            if let Err(e) = interrupted {
                error!("❌ Signal handling failed: {e}");
            }
            std::process::exit(130);
        }
    };

    println!("{}", serde_json::to_string_pretty(&response)?);
    if !response.success {
        std::process::exit(1);
    }
    Ok(())
}
