use std::{fmt, time::Duration};

use http::HeaderValue;

/// Holds the value of the [`Access-Control-Max-Age`][mdn] header.
///
/// See [`CorsHeadersLayer::max_age`][crate::CorsHeadersLayer::max_age] for more details.
///
/// [mdn]: https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/Access-Control-Max-Age
#[derive(Clone, PartialEq, Eq)]
pub struct MaxAge(HeaderValue);

impl MaxAge {
    /// Advertise `max_age` in whole seconds.
    pub fn exact(max_age: Duration) -> Self {
        Self(max_age.as_secs().into())
    }

    /// Advertise a raw header value, sent as-is.
    pub fn raw(value: HeaderValue) -> Self {
        Self(value)
    }

    pub(crate) fn header_value(&self) -> &HeaderValue {
        &self.0
    }
}

impl fmt::Debug for MaxAge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MaxAge").field(&self.0).finish()
    }
}

impl From<Duration> for MaxAge {
    fn from(max_age: Duration) -> Self {
        Self::exact(max_age)
    }
}

impl From<HeaderValue> for MaxAge {
    fn from(value: HeaderValue) -> Self {
        Self::raw(value)
    }
}
