use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use futures_core::ready;
use http::{header::HeaderName, HeaderValue, Method, Request, Response};
use pin_project_lite::pin_project;
use tower_layer::Layer;
use tower_service::Service;

use crate::{AllowOrigins, CorsConfig, CorsRequest, MaxAge};

/// Layer that applies the [`CorsHeaders`] middleware which adds headers for [CORS][mdn].
///
/// See the [crate docs](crate) for an example.
///
/// [mdn]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
#[derive(Debug, Clone, Default)]
pub struct CorsHeadersLayer {
    config: Arc<CorsConfig>,
}

impl CorsHeadersLayer {
    /// Create a new `CorsHeadersLayer` from a resolved configuration.
    pub fn new(config: CorsConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// The configuration shared by every service this layer produces.
    pub fn config(&self) -> &CorsConfig {
        &self.config
    }

    /// Set the [`Access-Control-Allow-Credentials`][mdn] header.
    ///
    /// ```
    /// use tower_cors_headers::CorsHeadersLayer;
    ///
    /// let layer = CorsHeadersLayer::default().allow_credentials(true);
    /// ```
    ///
    /// [mdn]: https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/Access-Control-Allow-Credentials
    pub fn allow_credentials(self, allow_credentials: bool) -> Self {
        self.map_config(|config| config.allow_credentials(allow_credentials))
    }

    /// Set the value of the [`Access-Control-Allow-Headers`][mdn] header.
    ///
    /// ```
    /// use tower_cors_headers::CorsHeadersLayer;
    /// use http::header::{AUTHORIZATION, ACCEPT};
    ///
    /// let layer = CorsHeadersLayer::default().allow_headers(vec![AUTHORIZATION, ACCEPT]);
    /// ```
    ///
    /// [mdn]: https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/Access-Control-Allow-Headers
    pub fn allow_headers<I>(self, headers: I) -> Self
    where
        I: IntoIterator<Item = HeaderName>,
    {
        self.map_config(|config| config.allow_headers(headers))
    }

    /// Set the value of the [`Access-Control-Max-Age`][mdn] header.
    ///
    /// ```
    /// use tower_cors_headers::CorsHeadersLayer;
    /// use std::time::Duration;
    ///
    /// let layer = CorsHeadersLayer::default().max_age(Duration::from_secs(60) * 10);
    /// ```
    ///
    /// By default the header will not be set.
    ///
    /// [mdn]: https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/Access-Control-Max-Age
    pub fn max_age<T>(self, max_age: T) -> Self
    where
        T: Into<MaxAge>,
    {
        self.map_config(|config| config.max_age(max_age))
    }

    /// Set the origins used for the [`Access-Control-Allow-Origin`][mdn] header.
    ///
    /// ```
    /// use tower_cors_headers::CorsHeadersLayer;
    /// use http::HeaderValue;
    ///
    /// let origins = vec![
    ///     HeaderValue::from_static("https://example.com"),
    ///     HeaderValue::from_static("https://api.example.com"),
    /// ];
    ///
    /// let layer = CorsHeadersLayer::default().allow_origins(origins);
    /// ```
    ///
    /// A request whose `Origin` is listed gets it echoed back. Any other
    /// request gets `*` if the list contains it, or the first listed origin
    /// otherwise. An empty list disables the header. Defaults to `["*"]`.
    ///
    /// Note that multiple calls to this method will override any previous
    /// calls.
    ///
    /// [mdn]: https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/Access-Control-Allow-Origin
    pub fn allow_origins<T>(self, origins: T) -> Self
    where
        T: Into<AllowOrigins>,
    {
        self.map_config(|config| config.allow_origins(origins))
    }

    /// Set the `Cache-Control` header sent on preflight (`OPTIONS`) responses.
    ///
    /// ```
    /// use tower_cors_headers::CorsHeadersLayer;
    /// use http::HeaderValue;
    ///
    /// let layer = CorsHeadersLayer::default()
    ///     .cache_control(HeaderValue::from_static("max-age=600"));
    /// ```
    pub fn cache_control(self, cache_control: HeaderValue) -> Self {
        self.map_config(|config| config.cache_control(cache_control))
    }

    /// Set the value of the [`Access-Control-Allow-Methods`][mdn] header.
    ///
    /// ```
    /// use tower_cors_headers::CorsHeadersLayer;
    /// use http::Method;
    ///
    /// let layer = CorsHeadersLayer::default().allow_methods(vec![Method::GET, Method::POST]);
    /// ```
    ///
    /// [mdn]: https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/Access-Control-Allow-Methods
    pub fn allow_methods<I>(self, methods: I) -> Self
    where
        I: IntoIterator<Item = Method>,
    {
        self.map_config(|config| config.allow_methods(methods))
    }

    /// Set the value of the [`Access-Control-Expose-Headers`][mdn] header.
    ///
    /// ```
    /// use tower_cors_headers::CorsHeadersLayer;
    /// use http::header::CONTENT_ENCODING;
    ///
    /// let layer = CorsHeadersLayer::default().expose_headers(vec![CONTENT_ENCODING]);
    /// ```
    ///
    /// [mdn]: https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/Access-Control-Expose-Headers
    pub fn expose_headers<I>(self, headers: I) -> Self
    where
        I: IntoIterator<Item = HeaderName>,
    {
        self.map_config(|config| config.expose_headers(headers))
    }

    fn map_config<F>(mut self, f: F) -> Self
    where
        F: FnOnce(CorsConfig) -> CorsConfig,
    {
        let config = Arc::make_mut(&mut self.config);
        *config = f(std::mem::take(config));
        self
    }
}

impl From<CorsConfig> for CorsHeadersLayer {
    fn from(config: CorsConfig) -> Self {
        Self::new(config)
    }
}

impl<S> Layer<S> for CorsHeadersLayer {
    type Service = CorsHeaders<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CorsHeaders {
            inner,
            config: self.config.clone(),
        }
    }
}

/// Middleware which adds headers for [CORS][mdn].
///
/// Headers are added to the inner service's response once it resolves, and
/// only when the response doesn't already carry them. Errors from the inner
/// service are passed through unchanged.
///
/// [mdn]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
#[derive(Debug, Clone)]
pub struct CorsHeaders<S> {
    inner: S,
    config: Arc<CorsConfig>,
}

impl<S> CorsHeaders<S> {
    /// Create a new `CorsHeaders` with the given configuration.
    pub fn new(inner: S, config: CorsConfig) -> Self {
        Self {
            inner,
            config: Arc::new(config),
        }
    }

    /// Returns a new [`Layer`] that wraps services with a [`CorsHeaders`] middleware.
    pub fn layer(config: CorsConfig) -> CorsHeadersLayer {
        CorsHeadersLayer::new(config)
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

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for CorsHeaders<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = ResponseFuture<S::Future>;

    #[inline]
    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let request = CorsRequest::from_request(&req);

        ResponseFuture {
            future: self.inner.call(req),
            request,
            config: self.config.clone(),
        }
    }
}

pin_project! {
    /// Response future for [`CorsHeaders`].
    pub struct ResponseFuture<F> {
        #[pin]
        future: F,
        request: CorsRequest,
        config: Arc<CorsConfig>,
    }
}

impl<F, B, E> Future for ResponseFuture<F>
where
    F: Future<Output = Result<Response<B>, E>>,
{
    type Output = Result<Response<B>, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let mut response = ready!(this.future.poll(cx))?;

        this.config
            .apply_to_headers(this.request, response.headers_mut());

        Poll::Ready(Ok(response))
    }
}
