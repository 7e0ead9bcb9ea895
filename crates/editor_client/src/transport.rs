//! The single point where requests leave the process.
//!
//! A [`Transport`] never fails in the Rust sense: timeouts, refused connections
//! and unparsable bodies all come back as an [`ApiResponse`] with
//! `success: false` and a message in `error`.

use async_trait::async_trait;
use cocos_pipeline::ApiResponse;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => f.write_str("GET"),
            Method::Post => f.write_str("POST"),
        }
    }
}

/// One outgoing HTTP request.
#[derive(Debug, Clone, PartialEq)]
pub struct WireRequest {
    pub method: Method,
    pub url: String,
    /// JSON body, only sent with POST
    pub body: Option<Value>,
    pub timeout: Duration,
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: WireRequest) -> ApiResponse;
}

/// Error text for a request that hit its deadline.
pub fn timeout_message(timeout: Duration) -> String {
    format!("Request timeout after {}ms", timeout.as_millis())
}

/// Error text for a request that never reached the editor.
pub fn connection_message(cause: impl fmt::Display) -> String {
    format!("Connection failed: {cause}")
}

/// [`Transport`] over `reqwest`.
#[derive(Clone, Default)]
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    fn map_error(error: reqwest::Error, timeout: Duration) -> ApiResponse {
        if error.is_timeout() {
            ApiResponse::failure(timeout_message(timeout))
        } else if error.is_connect() {
            ApiResponse::failure(connection_message(&error))
        } else {
            ApiResponse::failure(error.to_string())
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: WireRequest) -> ApiResponse {
        trace!("➡️ {} {} {:?}", request.method, request.url, request.body);

        let builder = match request.method {
            Method::Get => self.http.get(&request.url),
            Method::Post => {
                let builder = self.http.post(&request.url);
                match &request.body {
                    Some(body) => builder.json(body),
                    None => builder,
                }
            }
        };

        let response = match builder.timeout(request.timeout).send().await {
            Ok(response) => response,
            Err(e) => return Self::map_error(e, request.timeout),
        };

        let status = response.status();
        match response.json::<ApiResponse>().await {
            Ok(body) => {
                trace!("⬅️ {} {:?}", status, body);
                body
            }
            Err(e) if e.is_timeout() => ApiResponse::failure(timeout_message(request.timeout)),
            Err(e) => ApiResponse::failure(format!("Invalid response ({status}): {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_messages() {
        assert_eq!(timeout_message(Duration::from_millis(30_000)), "Request timeout after 30000ms");
        assert_eq!(connection_message("refused"), "Connection failed: refused");
        assert_eq!(Method::Post.to_string(), "POST");
    }

    #[tokio::test]
    async fn unreachable_server_becomes_failed_response() {
        let transport = HttpTransport::default();
        let response = transport
            .send(WireRequest {
                method: Method::Get,
                url: "http://127.0.0.1:9/api/server/health".to_string(),
                body: None,
                timeout: Duration::from_millis(2_000),
            })
            .await;

        assert!(!response.success);
        assert!(response.error.is_some());
    }
}
