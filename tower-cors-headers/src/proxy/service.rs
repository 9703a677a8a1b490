use std::{
    sync::Arc,
    task::{Context, Poll},
};

use tower_service::Service;

use super::{ProxyCorsLayer, ProxyRequest, ProxyResponse, ResponseFuture};
use crate::{CorsConfig, CorsRequest};

/// Middleware which adds [CORS][mdn] headers to Lambda proxy responses.
///
/// The inner service may answer with a [`ProxyResponse`] or with
/// `Option<ProxyResponse>`. This middleware always answers with
/// `Option<ProxyResponse>`: `None` is only returned when the inner service
/// returned nothing and the request had no method.
///
/// [mdn]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
#[derive(Debug, Clone)]
pub struct ProxyCors<S> {
    inner: S,
    config: Arc<CorsConfig>,
}

impl<S> ProxyCors<S> {
    /// Create a new `ProxyCors` with the given configuration.
    pub fn new(inner: S, config: CorsConfig) -> Self {
        Self::from_shared(inner, Arc::new(config))
    }

    pub(super) fn from_shared(inner: S, config: Arc<CorsConfig>) -> Self {
        Self { inner, config }
    }

    /// Returns a new [`Layer`][tower_layer::Layer] that wraps services with a
    /// [`ProxyCors`] middleware.
    pub fn layer(config: CorsConfig) -> ProxyCorsLayer {
        ProxyCorsLayer::new(config)
    }

    /// The configuration used by this middleware.
    pub fn config(&self) -> &CorsConfig {
        &self.config
    }

    /// Gets a reference to the underlying service.
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    /// Gets a mutable reference to the underlying service.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    /// Consumes `self`, returning the underlying service.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S, R> Service<ProxyRequest> for ProxyCors<S>
where
    S: Service<ProxyRequest, Response = R>,
    R: Into<Option<ProxyResponse>>,
{
    type Response = Option<ProxyResponse>;
    type Error = S::Error;
    type Future = ResponseFuture<S::Future>;

    #[inline]
    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, event: ProxyRequest) -> Self::Future {
        let request = CorsRequest::from_proxy(&event);

        ResponseFuture::new(self.inner.call(event), request, self.config.clone())
    }
}
