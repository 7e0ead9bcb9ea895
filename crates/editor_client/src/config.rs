//! Where the editor's HTTP server lives.
//!
//! Resolution order, first hit wins:
//!
//! 1. an explicit URL from the caller
//! 2. the `COCOS_SERVER_URL` environment variable
//! 3. the project registry at `~/.cocos-http/cocos-http.json`: the entry for
//!    the current project, then the entry named by `currentProject`
//! 4. [`DEFAULT_SERVER_URL`]
//!
//! The current project is the last path component of `COCOS_PROJECT_PATH`, or
//! of the nearest directory (at most five levels up from the working
//! directory) that contains `settings/` or `assets/`.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 54321;
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:54321";

pub const SERVER_URL_ENV: &str = "COCOS_SERVER_URL";
pub const PROJECT_PATH_ENV: &str = "COCOS_PROJECT_PATH";

const REGISTRY_DIR: &str = ".cocos-http";
const REGISTRY_FILE: &str = "cocos-http.json";
const PROJECT_SEARCH_DEPTH: usize = 5;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectRegistry {
    #[serde(default)]
    current_project: Option<String>,
    #[serde(default)]
    projects: HashMap<String, ProjectEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectEntry {
    #[serde(default)]
    server_url: Option<String>,
}

impl ProjectRegistry {
    fn server_url(&self, project: Option<&str>) -> Option<String> {
        let lookup = |name: &str| {
            self.projects
                .get(name)
                .and_then(|entry| entry.server_url.clone())
                .filter(|url| !url.is_empty())
        };
        project
            .and_then(lookup)
            .or_else(|| self.current_project.as_deref().and_then(lookup))
    }
}

/// Inputs to server URL resolution, gathered up front so tests can supply them.
#[derive(Debug, Clone, Default)]
pub struct UrlSources {
    pub explicit: Option<String>,
    pub env_url: Option<String>,
    pub project_path: Option<PathBuf>,
    pub home_dir: Option<PathBuf>,
    pub working_dir: Option<PathBuf>,
}

impl UrlSources {
    /// Reads the environment, home and working directories of this process.
    pub fn from_env(explicit: Option<String>) -> Self {
        Self {
            explicit,
            env_url: std::env::var(SERVER_URL_ENV).ok(),
            project_path: std::env::var_os(PROJECT_PATH_ENV).map(PathBuf::from),
            home_dir: dirs_next::home_dir(),
            working_dir: std::env::current_dir().ok(),
        }
    }

    pub fn resolve(&self) -> String {
        let non_empty = |s: &Option<String>| s.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);

        if let Some(url) = non_empty(&self.explicit) {
            return url;
        }
        if let Some(url) = non_empty(&self.env_url) {
            debug!("Server URL from {}", SERVER_URL_ENV);
            return url;
        }
        if let Some(url) = self.registry_url() {
            debug!("Server URL from project registry");
            return url;
        }
        DEFAULT_SERVER_URL.to_string()
    }

    fn project_name(&self) -> Option<String> {
        let root = match &self.project_path {
            Some(path) => Some(path.clone()),
            None => self.working_dir.as_deref().and_then(find_project_root),
        }?;
        root.file_name().map(|name| name.to_string_lossy().into_owned())
    }

    fn registry_url(&self) -> Option<String> {
        let file = self.home_dir.as_ref()?.join(REGISTRY_DIR).join(REGISTRY_FILE);
        let text = std::fs::read_to_string(&file).ok()?;
        let registry: ProjectRegistry = match serde_json::from_str(&text) {
            Ok(registry) => registry,
            Err(e) => {
                debug!("Ignoring unreadable {}: {}", file.display(), e);
                return None;
            }
        };
        registry.server_url(self.project_name().as_deref())
    }
}

/// Nearest ancestor (including `start`) that looks like an editor project.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .take(PROJECT_SEARCH_DEPTH + 1)
        .find(|dir| dir.join("settings").is_dir() || dir.join("assets").is_dir())
        .map(Path::to_path_buf)
}

/// Resolves the server URL for this process.
pub fn resolve_server_url(explicit: Option<String>) -> String {
    UrlSources::from_env(explicit).resolve()
}

/// Host and port of the editor server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    pub host: String,
    pub port: u16,
}

impl ServerInfo {
    /// Parses `scheme://host[:port][/path]`, falling back to the defaults for
    /// whatever is missing.
    pub fn parse(url: &str) -> ServerInfo {
        let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
        let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();

        let (host, port) = match authority.rsplit_once(':') {
            Some((host, port)) => match port.parse::<u16>() {
                Ok(port) => (host, port),
                Err(_) => (authority, DEFAULT_PORT),
            },
            None => (authority, DEFAULT_PORT),
        };
        let host = host.trim_start_matches('[').trim_end_matches(']');

        ServerInfo {
            host: if host.is_empty() { DEFAULT_HOST.to_string() } else { host.to_string() },
            port,
        }
    }
}
