use std::{fmt, sync::Arc};

use http::HeaderValue;

const WILDCARD: &[u8] = b"*";

/// Ordered list of origins used to pick the [`Access-Control-Allow-Origin`][mdn] value.
///
/// `*` in the list means "accept any origin". The default is a list holding
/// only `*`. An empty list disables the header entirely.
///
/// See [`CorsHeadersLayer::allow_origins`] for more details.
///
/// [mdn]: https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/Access-Control-Allow-Origin
/// [`CorsHeadersLayer::allow_origins`]: crate::CorsHeadersLayer::allow_origins
#[derive(Clone)]
pub struct AllowOrigins(Arc<[HeaderValue]>);

impl AllowOrigins {
    /// Allow any origin by sending a wildcard (`*`).
    pub fn any() -> Self {
        Self::exact(HeaderValue::from_static("*"))
    }

    /// Never send `Access-Control-Allow-Origin`.
    pub fn none() -> Self {
        Self::list(None)
    }

    /// Allow a single origin.
    pub fn exact(origin: HeaderValue) -> Self {
        Self::list(Some(origin))
    }

    /// Allow several origins. Order matters: the first entry is advertised
    /// when the request origin matches nothing and no wildcard is listed.
    pub fn list<I>(origins: I) -> Self
    where
        I: IntoIterator<Item = HeaderValue>,
    {
        Self(origins.into_iter().collect())
    }

    /// Returns `true` if no origin is allowed, which means the header is never set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if the list contains the wildcard entry.
    pub fn allows_any(&self) -> bool {
        self.wildcard().is_some()
    }

    /// Iterate over the configured origins in order.
    pub fn iter(&self) -> impl Iterator<Item = &HeaderValue> {
        self.0.iter()
    }

    /// Pick the value to advertise for a request carrying `origin`.
    ///
    /// - An origin that is listed verbatim is echoed back.
    /// - Otherwise `*` is returned if the list contains it.
    /// - Otherwise the first listed origin is returned.
    ///
    /// Returns `None` only for an empty list.
    pub fn resolve(&self, origin: Option<&HeaderValue>) -> Option<&HeaderValue> {
        let first = self.0.first()?;

        if let Some(origin) = origin {
            if let Some(listed) = self.0.iter().find(|allowed| *allowed == origin) {
                return Some(listed);
            }
        }

        Some(self.wildcard().unwrap_or(first))
    }

    fn wildcard(&self) -> Option<&HeaderValue> {
        self.0.iter().find(|allowed| allowed.as_bytes() == WILDCARD)
    }
}

impl Default for AllowOrigins {
    fn default() -> Self {
        Self::any()
    }
}

impl fmt::Debug for AllowOrigins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

impl From<HeaderValue> for AllowOrigins {
    fn from(val: HeaderValue) -> Self {
        Self::exact(val)
    }
}

impl<const N: usize> From<[HeaderValue; N]> for AllowOrigins {
    fn from(arr: [HeaderValue; N]) -> Self {
        Self::list(arr)
    }
}

impl From<Vec<HeaderValue>> for AllowOrigins {
    fn from(vec: Vec<HeaderValue>) -> Self {
        Self::list(vec)
    }
}
