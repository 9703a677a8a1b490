//! Middleware which adds [CORS][mdn] headers to responses without overwriting
//! anything the wrapped handler already set.
//!
//! The header logic runs after the inner service has produced a response. For
//! every header it knows about it writes a value only if the response doesn't
//! carry that header yet, so handlers stay in control of their own output.
//!
//! Two adapters share the same resolver:
//!
//! - [`CorsHeadersLayer`] for services speaking [`http::Request`] and
//!   [`http::Response`].
//! - [`ProxyCorsLayer`] for Lambda proxy-integration handlers, where the
//!   method, the response and its header map may all be missing.
//!
//! # Example
//!
//! ```
//! use http::{header, Request, Response};
//! use std::convert::Infallible;
//! use tower::{ServiceBuilder, ServiceExt};
//! use tower_cors_headers::CorsHeadersLayer;
//!
//! async fn handle(_request: Request<()>) -> Result<Response<()>, Infallible> {
//!     Ok(Response::new(()))
//! }
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let service = ServiceBuilder::new()
//!     .layer(CorsHeadersLayer::default())
//!     .service_fn(handle);
//!
//! let request = Request::builder()
//!     .header(header::ORIGIN, "https://example.com")
//!     .body(())?;
//!
//! let response = service.oneshot(request).await?;
//!
//! assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
//! # Ok(())
//! # }
//! ```
//!
//! [mdn]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS

#![warn(
    clippy::all,
    clippy::dbg_macro,
    clippy::todo,
    clippy::empty_enum,
    clippy::enum_glob_use,
    clippy::mem_forget,
    clippy::unused_self,
    clippy::filter_map_next,
    clippy::needless_continue,
    clippy::needless_borrow,
    clippy::match_wildcard_for_single_variants,
    clippy::if_let_mutex,
    clippy::await_holding_lock,
    clippy::imprecise_flops,
    clippy::suboptimal_flops,
    clippy::lossy_float_literal,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::fn_params_excessive_bools,
    clippy::exit,
    clippy::inefficient_to_string,
    clippy::linkedlist,
    clippy::macro_use_imports,
    clippy::option_option,
    clippy::verbose_file_reads,
    clippy::unnested_or_patterns,
    rust_2018_idioms,
    future_incompatible,
    nonstandard_style,
    missing_docs
)]
#![deny(unreachable_pub)]
#![allow(elided_lifetimes_in_paths, clippy::type_complexity)]
#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod allow_origin;
mod config;
mod max_age;
mod resolver;
mod service;

pub mod proxy;

#[cfg(test)]
mod tests;

pub use self::{
    allow_origin::AllowOrigins,
    config::{ConfigError, CorsConfig, CorsOptions},
    max_age::MaxAge,
    proxy::{ProxyCors, ProxyCorsLayer, ProxyRequest, ProxyResponse},
    resolver::CorsRequest,
    service::{CorsHeaders, CorsHeadersLayer, ResponseFuture},
};
