//! CORS headers for Lambda proxy-integration handlers.
//!
//! Proxy events don't always come from HTTP: a request may have no method, a
//! handler may return no response, and a response may have no header map.
//! [`ProxyCors`] handles each of those the same way the resolver on
//! [`CorsConfig::apply_to_proxy`] does.
//!
//! # Example
//!
//! ```
//! use std::convert::Infallible;
//! use tower::{ServiceBuilder, ServiceExt};
//! use tower_cors_headers::{CorsConfig, ProxyCorsLayer, ProxyRequest, ProxyResponse};
//!
//! async fn handle(_event: ProxyRequest) -> Result<ProxyResponse, Infallible> {
//!     Ok(ProxyResponse::new(200))
//! }
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let service = ServiceBuilder::new()
//!     .layer(ProxyCorsLayer::new(CorsConfig::default()))
//!     .service_fn(handle);
//!
//! let event = ProxyRequest::new("GET").with_header("Origin", "https://example.com");
//! let response = service.oneshot(event).await?.unwrap();
//!
//! assert_eq!(response.header("Access-Control-Allow-Origin"), Some("*"));
//! # Ok(())
//! # }
//! ```
//!
//! [`CorsConfig::apply_to_proxy`]: crate::CorsConfig::apply_to_proxy

use std::collections::HashMap;

mod future;
mod layer;
mod service;

pub use self::{future::ResponseFuture, layer::ProxyCorsLayer, service::ProxyCors};

/// An API Gateway proxy-integration request event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(rename_all = "camelCase", default)
)]
pub struct ProxyRequest {
    /// The HTTP method, absent for non-HTTP invocations.
    pub http_method: Option<String>,
    /// The request path.
    pub path: Option<String>,
    /// Request headers, keyed exactly as received.
    pub headers: Option<HashMap<String, String>>,
    /// Decoded query string parameters.
    pub query_string_parameters: Option<HashMap<String, String>>,
    /// The request body.
    pub body: Option<String>,
    /// Whether `body` is base64 encoded.
    pub is_base64_encoded: bool,
}

impl ProxyRequest {
    /// Create a request event with the given method.
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            http_method: Some(method.into()),
            ..Default::default()
        }
    }

    /// Add a header, keeping the key's casing.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(HashMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// The request origin, read from `Origin` or else `origin`.
    pub fn origin(&self) -> Option<&str> {
        let headers = self.headers.as_ref()?;
        headers
            .get("Origin")
            .or_else(|| headers.get("origin"))
            .map(String::as_str)
    }
}

/// An API Gateway proxy-integration response.
///
/// The default value is an empty response: no status, no headers, no body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(rename_all = "camelCase", default)
)]
pub struct ProxyResponse {
    /// The HTTP status code.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub status_code: Option<u16>,
    /// Response headers, keyed exactly as written.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub headers: Option<HashMap<String, String>>,
    /// The response body.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub body: Option<String>,
    /// Whether `body` is base64 encoded.
    pub is_base64_encoded: bool,
}

impl ProxyResponse {
    /// Create a response with the given status code.
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code: Some(status_code),
            ..Default::default()
        }
    }

    /// Add a header, keeping the key's casing.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(HashMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Set the body.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Look up a header by its exact key.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.as_ref()?.get(name).map(String::as_str)
    }
}

#[cfg(test)]
mod tests;
