//! # Editor Client
//!
//! HTTP facade over the Cocos Creator editor's automation server.
//!
//! [`EditorClient`] locates the server (see [`config`]), checks actions
//! against the [`ModuleCatalog`], and drives every call through the
//! [`cocos_pipeline`] stages. It also implements
//! [`EditorHandle`](cocos_pipeline::EditorHandle), which is how processors make
//! their own nested calls.
//!
//! ```rust,no_run
//! use editor_client::EditorClient;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = EditorClient::builder().build()?;
//!     let created = client
//!         .execute("scene", "create-node", vec![json!({"parent": "root-uuid", "type": "cc.Button"})])
//!         .await?;
//!     println!("{}", serde_json::to_string_pretty(&created)?);
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod client;
pub mod config;
pub mod transport;

pub use catalog::ModuleCatalog;
pub use client::{ClientError, EditorClient, EditorClientBuilder, DEFAULT_TIMEOUT};
pub use config::{resolve_server_url, ServerInfo, UrlSources, DEFAULT_SERVER_URL};
pub use transport::{HttpTransport, Method, Transport, WireRequest};
