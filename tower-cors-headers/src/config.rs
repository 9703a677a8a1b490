use std::{convert::TryFrom, error::Error as StdError, fmt};

use bytes::{BufMut, BytesMut};
use http::{
    header::{HeaderName, InvalidHeaderValue},
    HeaderValue, Method,
};

use crate::{AllowOrigins, MaxAge};

/// Caller supplied CORS options, every field optional.
///
/// Missing fields take their defaults when converted into a [`CorsConfig`]:
/// `allowed_origins` becomes `["*"]` and `credentials` becomes `false`. Every
/// other header is left unset.
///
/// With the `serde` feature enabled the options deserialize from camelCase
/// keys:
///
/// ```json
/// {
///   "allowHeaders": "content-type",
///   "allowedOrigins": ["https://example.com"],
///   "credentials": true,
///   "maxAge": "600",
///   "cacheControl": "max-age=600"
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(rename_all = "camelCase", default)
)]
pub struct CorsOptions {
    /// Raw value for `Access-Control-Allow-Headers`.
    pub allow_headers: Option<String>,
    /// Origins allowed to receive an echoed `Access-Control-Allow-Origin`.
    pub allowed_origins: Option<Vec<String>>,
    /// Whether to send `Access-Control-Allow-Credentials: true`.
    pub credentials: Option<bool>,
    /// Raw value for `Access-Control-Max-Age`.
    pub max_age: Option<String>,
    /// Raw value for `Cache-Control` on preflight responses.
    pub cache_control: Option<String>,
    /// Raw value for `Access-Control-Allow-Methods`.
    pub allow_methods: Option<String>,
    /// Raw value for `Access-Control-Expose-Headers`.
    pub expose_headers: Option<String>,
}

/// Resolved CORS configuration.
///
/// Built once, either from [`CorsOptions`] or with the builder methods, and
/// then shared read-only by every request the middleware handles.
#[derive(Debug, Clone, Default)]
pub struct CorsConfig {
    pub(crate) allow_headers: Option<HeaderValue>,
    pub(crate) allow_origins: AllowOrigins,
    pub(crate) allow_credentials: bool,
    pub(crate) max_age: Option<MaxAge>,
    pub(crate) cache_control: Option<HeaderValue>,
    pub(crate) allow_methods: Option<HeaderValue>,
    pub(crate) expose_headers: Option<HeaderValue>,
}

impl CorsConfig {
    /// Create a config with the defaults: any origin, no credentials, no
    /// other headers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the value of the [`Access-Control-Allow-Headers`][mdn] header.
    ///
    /// An empty list leaves the header unset.
    ///
    /// [mdn]: https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/Access-Control-Allow-Headers
    pub fn allow_headers<I>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = HeaderName>,
    {
        self.allow_headers = separated_by_commas(headers.into_iter().map(Into::into));
        self
    }

    /// Set the origins used for the [`Access-Control-Allow-Origin`][mdn] header.
    ///
    /// [mdn]: https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/Access-Control-Allow-Origin
    pub fn allow_origins<T>(mut self, origins: T) -> Self
    where
        T: Into<AllowOrigins>,
    {
        self.allow_origins = origins.into();
        self
    }

    /// Send [`Access-Control-Allow-Credentials: true`][mdn] when enabled.
    ///
    /// [mdn]: https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/Access-Control-Allow-Credentials
    pub fn allow_credentials(mut self, allow_credentials: bool) -> Self {
        self.allow_credentials = allow_credentials;
        self
    }

    /// Set the value of the [`Access-Control-Max-Age`][mdn] header.
    ///
    /// [mdn]: https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/Access-Control-Max-Age
    pub fn max_age<T>(mut self, max_age: T) -> Self
    where
        T: Into<MaxAge>,
    {
        self.max_age = Some(max_age.into());
        self
    }

    /// Set the `Cache-Control` header sent on preflight (`OPTIONS`) responses.
    pub fn cache_control(mut self, cache_control: HeaderValue) -> Self {
        self.cache_control = Some(cache_control);
        self
    }

    /// Set the value of the [`Access-Control-Allow-Methods`][mdn] header.
    ///
    /// [mdn]: https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/Access-Control-Allow-Methods
    pub fn allow_methods<I>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = Method>,
    {
        self.allow_methods = separated_by_commas(
            methods
                .into_iter()
                .filter_map(|m| HeaderValue::from_str(m.as_str()).ok()),
        );
        self
    }

    /// Set the value of the [`Access-Control-Expose-Headers`][mdn] header.
    ///
    /// [mdn]: https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/Access-Control-Expose-Headers
    pub fn expose_headers<I>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = HeaderName>,
    {
        self.expose_headers = separated_by_commas(headers.into_iter().map(Into::into));
        self
    }
}

impl TryFrom<CorsOptions> for CorsConfig {
    type Error = ConfigError;

    fn try_from(options: CorsOptions) -> Result<Self, Self::Error> {
        let allow_origins = match options.allowed_origins {
            Some(origins) => AllowOrigins::list(
                origins
                    .into_iter()
                    .map(|origin| parse("allowedOrigins", origin))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            None => AllowOrigins::any(),
        };

        Ok(Self {
            allow_headers: parse_opt("allowHeaders", options.allow_headers)?,
            allow_origins,
            allow_credentials: options.credentials.unwrap_or(false),
            max_age: parse_opt("maxAge", options.max_age)?.map(MaxAge::raw),
            cache_control: parse_opt("cacheControl", options.cache_control)?,
            allow_methods: parse_opt("allowMethods", options.allow_methods)?,
            expose_headers: parse_opt("exposeHeaders", options.expose_headers)?,
        })
    }
}

fn parse(field: &'static str, value: String) -> Result<HeaderValue, ConfigError> {
    HeaderValue::try_from(value).map_err(|source| ConfigError { field, source })
}

fn parse_opt(
    field: &'static str,
    value: Option<String>,
) -> Result<Option<HeaderValue>, ConfigError> {
    value.map(|value| parse(field, value)).transpose()
}

fn separated_by_commas<I>(mut iter: I) -> Option<HeaderValue>
where
    I: Iterator<Item = HeaderValue>,
{
    let first = iter.next()?;
    let mut result = BytesMut::from(first.as_bytes());
    for val in iter {
        result.reserve(val.len() + 1);
        result.put_u8(b',');
        result.extend_from_slice(val.as_bytes());
    }

    HeaderValue::from_maybe_shared(result.freeze()).ok()
}

/// Error returned when [`CorsOptions`] contain a value that isn't a valid
/// header value.
#[derive(Debug)]
pub struct ConfigError {
    field: &'static str,
    source: InvalidHeaderValue,
}

impl ConfigError {
    /// The camelCase name of the offending option.
    pub fn field(&self) -> &'static str {
        self.field
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid header value for CORS option `{}`", self.field)
    }
}

impl StdError for ConfigError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&self.source)
    }
}
