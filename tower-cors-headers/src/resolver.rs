use std::collections::HashMap;

use http::{
    header::{self, HeaderName},
    request::Parts as RequestParts,
    HeaderMap, HeaderValue, Method, Request,
};

use crate::{CorsConfig, MaxAge, ProxyRequest, ProxyResponse};

/// The parts of a request the CORS headers depend on.
///
/// Captured before the request is handed to the inner service, since the
/// headers are computed once the response is available.
#[derive(Debug, Clone, Default)]
pub struct CorsRequest {
    kind: Option<RequestKind>,
    origin: Option<HeaderValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestKind {
    Preflight,
    Actual,
}

impl CorsRequest {
    /// Capture the method and `Origin` header of an [`http::Request`].
    pub fn from_request<B>(request: &Request<B>) -> Self {
        Self::from_head(request.method(), request.headers())
    }

    /// Capture the method and `Origin` header of a request head.
    pub fn from_parts(parts: &RequestParts) -> Self {
        Self::from_head(&parts.method, &parts.headers)
    }

    /// Capture the method and origin of a Lambda proxy request.
    ///
    /// The `Origin` key is preferred over `origin`. A missing or empty method
    /// marks the request as non-HTTP and disables CORS handling for it.
    pub fn from_proxy(request: &ProxyRequest) -> Self {
        Self::from_raw(request.http_method.as_deref(), request.origin())
    }

    /// Build a request view from a raw method string and origin.
    ///
    /// The method is compared case-sensitively against `OPTIONS`. An origin
    /// that isn't a valid header value can't match any allowed origin and is
    /// treated as absent.
    pub fn from_raw(method: Option<&str>, origin: Option<&str>) -> Self {
        let kind = method.filter(|m| !m.is_empty()).map(|m| {
            if m == Method::OPTIONS.as_str() {
                RequestKind::Preflight
            } else {
                RequestKind::Actual
            }
        });

        Self {
            kind,
            origin: origin.and_then(|o| HeaderValue::from_str(o).ok()),
        }
    }

    fn from_head(method: &Method, headers: &HeaderMap) -> Self {
        let kind = if method == Method::OPTIONS {
            RequestKind::Preflight
        } else {
            RequestKind::Actual
        };

        Self {
            kind: Some(kind),
            origin: headers.get(header::ORIGIN).cloned(),
        }
    }

    /// Returns `true` if the request carried an HTTP method.
    pub fn has_method(&self) -> bool {
        self.kind.is_some()
    }

    /// Returns `true` for `OPTIONS` requests.
    pub fn is_preflight(&self) -> bool {
        self.kind == Some(RequestKind::Preflight)
    }

    /// The origin advertised by the request, if any.
    pub fn origin(&self) -> Option<&HeaderValue> {
        self.origin.as_ref()
    }
}

impl CorsConfig {
    /// Add the CORS headers for `request` to `headers`.
    ///
    /// Headers already present in the map are never overwritten, so calling
    /// this more than once has no further effect.
    pub fn apply_to_headers(&self, request: &CorsRequest, headers: &mut HeaderMap) {
        if !request.has_method() {
            tracing::trace!("request has no method, skipping CORS headers");
            return;
        }

        self.apply(request, headers);
    }

    /// Add the CORS headers for `request` to a Lambda proxy response.
    ///
    /// Does nothing at all when the request has no method. Otherwise a missing
    /// response, or a response without a header map, is created empty first.
    pub fn apply_to_proxy(&self, request: &CorsRequest, response: &mut Option<ProxyResponse>) {
        if !request.has_method() {
            tracing::trace!("request has no method, skipping CORS headers");
            return;
        }

        let response = response.get_or_insert_with(|| {
            tracing::trace!("handler produced no response, creating an empty one");
            ProxyResponse::default()
        });
        let headers = response.headers.get_or_insert_with(HashMap::new);

        self.apply(request, headers);
    }

    fn apply<H>(&self, request: &CorsRequest, headers: &mut H)
    where
        H: HeaderSink,
    {
        set_if_absent(headers, CorsHeader::AllowHeaders, self.allow_headers.as_ref());

        if self.allow_credentials {
            set_if_absent(
                headers,
                CorsHeader::AllowCredentials,
                Some(&HeaderValue::from_static("true")),
            );
        }

        set_if_absent(
            headers,
            CorsHeader::MaxAge,
            self.max_age.as_ref().map(MaxAge::header_value),
        );

        if !self.allow_origins.is_empty() {
            set_if_absent(
                headers,
                CorsHeader::AllowOrigin,
                self.allow_origins.resolve(request.origin()),
            );
        }

        if request.is_preflight() {
            set_if_absent(headers, CorsHeader::CacheControl, self.cache_control.as_ref());
        }

        set_if_absent(headers, CorsHeader::AllowMethods, self.allow_methods.as_ref());
        set_if_absent(headers, CorsHeader::ExposeHeaders, self.expose_headers.as_ref());
    }
}

fn set_if_absent<H>(headers: &mut H, header: CorsHeader, value: Option<&HeaderValue>)
where
    H: HeaderSink,
{
    let value = match value {
        Some(value) => value,
        None => return,
    };

    if headers.contains(header) {
        tracing::trace!(header = header.as_str(), "header already set, keeping it");
        return;
    }

    tracing::trace!(header = header.as_str(), ?value, "setting CORS header");
    headers.insert(header, value);
}

/// Every header the resolver may write.
#[derive(Debug, Clone, Copy)]
pub(crate) enum CorsHeader {
    AllowHeaders,
    AllowCredentials,
    MaxAge,
    AllowOrigin,
    CacheControl,
    AllowMethods,
    ExposeHeaders,
}

impl CorsHeader {
    fn name(self) -> HeaderName {
        match self {
            Self::AllowHeaders => header::ACCESS_CONTROL_ALLOW_HEADERS,
            Self::AllowCredentials => header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
            Self::MaxAge => header::ACCESS_CONTROL_MAX_AGE,
            Self::AllowOrigin => header::ACCESS_CONTROL_ALLOW_ORIGIN,
            Self::CacheControl => header::CACHE_CONTROL,
            Self::AllowMethods => header::ACCESS_CONTROL_ALLOW_METHODS,
            Self::ExposeHeaders => header::ACCESS_CONTROL_EXPOSE_HEADERS,
        }
    }

    // Key used in proxy response header maps.
    fn as_str(self) -> &'static str {
        match self {
            Self::AllowHeaders => "Access-Control-Allow-Headers",
            Self::AllowCredentials => "Access-Control-Allow-Credentials",
            Self::MaxAge => "Access-Control-Max-Age",
            Self::AllowOrigin => "Access-Control-Allow-Origin",
            Self::CacheControl => "Cache-Control",
            Self::AllowMethods => "Access-Control-Allow-Methods",
            Self::ExposeHeaders => "Access-Control-Expose-Headers",
        }
    }
}

/// A response header map the resolver can write into.
pub(crate) trait HeaderSink {
    fn contains(&self, header: CorsHeader) -> bool;

    fn insert(&mut self, header: CorsHeader, value: &HeaderValue);
}

impl HeaderSink for HeaderMap {
    fn contains(&self, header: CorsHeader) -> bool {
        self.contains_key(header.name())
    }

    fn insert(&mut self, header: CorsHeader, value: &HeaderValue) {
        HeaderMap::insert(self, header.name(), value.clone());
    }
}

impl HeaderSink for HashMap<String, String> {
    fn contains(&self, header: CorsHeader) -> bool {
        self.contains_key(header.as_str())
    }

    fn insert(&mut self, header: CorsHeader, value: &HeaderValue) {
        HashMap::insert(
            self,
            header.as_str().to_owned(),
            String::from_utf8_lossy(value.as_bytes()).into_owned(),
        );
    }
}
