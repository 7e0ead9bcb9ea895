//! Command-line interface for the editor bridge.
//!
//! Global flags override the configuration file; the subcommand says what to
//! ask the editor.

use clap::{Arg, ArgAction, ArgMatches, Command};
use serde_json::Value;
use std::ffi::OsString;
use std::path::PathBuf;

/// What to do once the client is built.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    Health,
    Status,
    /// Prints the resolved server location.
    Config,
    ListModules { remote: bool },
    ListActions { module: String, remote: bool },
    /// Runs an action through the processing pipeline.
    Exec { module: String, action: String, params: Vec<Value> },
    /// Sends an action to the editor untouched.
    Raw { module: String, action: String, params: Vec<Value> },
    Uuid { op: UuidOp, value: Option<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UuidOp {
    Decode,
    Compress,
    Decompress,
    Compact22,
    Validate,
    Generate,
}

impl UuidOp {
    const NAMES: [&'static str; 6] = ["decode", "compress", "decompress", "compact22", "validate", "generate"];

    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "decode" => Self::Decode,
            "compress" => Self::Compress,
            "decompress" => Self::Decompress,
            "compact22" => Self::Compact22,
            "validate" => Self::Validate,
            "generate" => Self::Generate,
            _ => return None,
        })
    }
}

/// Parsed command line.
#[derive(Debug, Clone)]
pub struct CliArgs {
    /// Path to the configuration file
    pub config_path: PathBuf,
    /// Editor server URL, overriding config and discovery
    pub server_url: Option<String>,
    /// Request timeout in milliseconds
    pub timeout_ms: Option<u64>,
    /// Skip the local module/action check
    pub no_validate: bool,
    pub log_level: Option<String>,
    /// Whether to force JSON log output
    pub json_logs: bool,
    pub command: CliCommand,
}

fn module_action_args(cmd: Command) -> Command {
    cmd.arg(Arg::new("module").required(true).help("Editor module, e.g. scene"))
        .arg(Arg::new("action").required(true).help("Module action, e.g. query-node"))
        .arg(
            Arg::new("params")
                .num_args(0..)
                .value_name("PARAM")
                .help("Parameters; each is parsed as JSON, otherwise taken as a string"),
        )
}

fn remote_flag() -> Arg {
    Arg::new("remote")
        .long("remote")
        .help("Ask the running editor instead of the built-in catalog")
        .action(ArgAction::SetTrue)
}

fn command() -> Command {
    Command::new("cocos-bridge")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Talks to the Cocos Creator editor over its HTTP automation API")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("cocos-bridge.toml")
                .global(true),
        )
        .arg(
            Arg::new("server")
                .short('s')
                .long("server")
                .value_name("URL")
                .help("Editor server URL (e.g., http://127.0.0.1:54321)")
                .global(true),
        )
        .arg(
            Arg::new("timeout")
                .short('t')
                .long("timeout")
                .value_name("MS")
                .help("Request timeout in milliseconds")
                .value_parser(clap::value_parser!(u64))
                .global(true),
        )
        .arg(
            Arg::new("no-validate")
                .long("no-validate")
                .help("Send actions missing from the module catalog anyway")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("Log level (trace, debug, info, warn, error)")
                .global(true),
        )
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .help("Output logs in JSON format")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(Command::new("health").about("Check that the editor server answers"))
        .subcommand(Command::new("status").about("Show editor server status"))
        .subcommand(Command::new("config").about("Show which server would be contacted"))
        .subcommand(Command::new("list-modules").about("List editor modules").arg(remote_flag()))
        .subcommand(
            Command::new("list-actions")
                .about("List the actions of a module")
                .arg(Arg::new("module").required(true))
                .arg(remote_flag()),
        )
        .subcommand(module_action_args(
            Command::new("exec").about("Run an action through the processing pipeline"),
        ))
        .subcommand(module_action_args(
            Command::new("raw").about("Send an action without any processing"),
        ))
        .subcommand(
            Command::new("uuid")
                .about("Convert between editor identifier forms")
                .arg(
                    Arg::new("op")
                        .required(true)
                        .value_parser(UuidOp::NAMES),
                )
                .arg(Arg::new("value").help("Identifier to convert (not needed for generate)")),
        )
}

/// Parses one positional parameter: JSON when it parses, a plain string otherwise.
pub fn parse_param(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn params_of(matches: &ArgMatches) -> Vec<Value> {
    matches
        .get_many::<String>("params")
        .map(|values| values.map(|raw| parse_param(raw)).collect())
        .unwrap_or_default()
}

fn required(matches: &ArgMatches, id: &str) -> String {
    matches.get_one::<String>(id).cloned().unwrap_or_default()
}

impl CliArgs {
    /// Parses the process arguments, exiting with usage on error.
    pub fn parse() -> Self {
        Self::from_matches(&command().get_matches())
    }

    pub fn try_parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Ok(Self::from_matches(&command().try_get_matches_from(args)?))
    }

    fn from_matches(matches: &ArgMatches) -> Self {
        let command = match matches.subcommand() {
            Some(("status", _)) => CliCommand::Status,
            Some(("config", _)) => CliCommand::Config,
            Some(("list-modules", sub)) => CliCommand::ListModules { remote: sub.get_flag("remote") },
            Some(("list-actions", sub)) => CliCommand::ListActions {
                module: required(sub, "module"),
                remote: sub.get_flag("remote"),
            },
            Some(("exec", sub)) => CliCommand::Exec {
                module: required(sub, "module"),
                action: required(sub, "action"),
                params: params_of(sub),
            },
            Some(("raw", sub)) => CliCommand::Raw {
                module: required(sub, "module"),
                action: required(sub, "action"),
                params: params_of(sub),
            },
            Some(("uuid", sub)) => CliCommand::Uuid {
                op: sub
                    .get_one::<String>("op")
                    .and_then(|name| UuidOp::from_name(name))
                    .unwrap_or(UuidOp::Validate),
                value: sub.get_one::<String>("value").cloned(),
            },
            _ => CliCommand::Health,
        };

        Self {
            config_path: PathBuf::from(required(matches, "config")),
            server_url: matches.get_one::<String>("server").cloned(),
            timeout_ms: matches.get_one::<u64>("timeout").copied(),
            no_validate: matches.get_flag("no-validate"),
            log_level: matches.get_one::<String>("log-level").cloned(),
            json_logs: matches.get_flag("json-logs"),
            command,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn exec_params_are_json_or_strings() {
        let args = CliArgs::try_parse_from([
            "cocos-bridge",
            "exec",
            "scene",
            "create-node",
            r#"{"parent":"root","type":"cc.Button"}"#,
            "db://assets/a.scene",
            "42",
        ])
        .unwrap();

        assert_eq!(
            args.command,
            CliCommand::Exec {
                module: "scene".into(),
                action: "create-node".into(),
                params: vec![
                    json!({"parent": "root", "type": "cc.Button"}),
                    json!("db://assets/a.scene"),
                    json!(42),
                ],
            }
        );
        assert_eq!(args.config_path, PathBuf::from("cocos-bridge.toml"));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let args = CliArgs::try_parse_from([
            "cocos-bridge",
            "raw",
            "scene",
            "query-dirty",
            "--server",
            "http://10.0.0.5:7456",
            "--timeout",
            "2500",
            "--no-validate",
            "--json-logs",
        ])
        .unwrap();

        assert_eq!(args.server_url.as_deref(), Some("http://10.0.0.5:7456"));
        assert_eq!(args.timeout_ms, Some(2500));
        assert!(args.no_validate);
        assert!(args.json_logs);
        assert!(matches!(args.command, CliCommand::Raw { ref params, .. } if params.is_empty()));
    }

    #[test]
    fn uuid_and_listing_subcommands() {
        let args = CliArgs::try_parse_from(["cocos-bridge", "uuid", "compact22", "fc991dd7-0033-4b80-9d55-c6ef6d3c8d7c"]).unwrap();
        assert_eq!(
            args.command,
            CliCommand::Uuid {
                op: UuidOp::Compact22,
                value: Some("fc991dd7-0033-4b80-9d55-c6ef6d3c8d7c".into()),
            }
        );

        let args = CliArgs::try_parse_from(["cocos-bridge", "list-actions", "asset-db", "--remote"]).unwrap();
        assert_eq!(args.command, CliCommand::ListActions { module: "asset-db".into(), remote: true });

        assert!(CliArgs::try_parse_from(["cocos-bridge", "uuid", "shuffle", "x"]).is_err());
        assert!(CliArgs::try_parse_from(["cocos-bridge", "--timeout", "soon", "health"]).is_err());
    }
}
