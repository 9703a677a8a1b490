use std::sync::Arc;

use tower_layer::Layer;

use super::ProxyCors;
use crate::CorsConfig;

/// Layer that applies the [`ProxyCors`] middleware.
///
/// See the [module docs](crate::proxy) for an example.
#[derive(Debug, Clone, Default)]
pub struct ProxyCorsLayer {
    config: Arc<CorsConfig>,
}

impl ProxyCorsLayer {
    /// Create a new `ProxyCorsLayer` from a resolved configuration.
    pub fn new(config: CorsConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// The configuration shared by every service this layer produces.
    pub fn config(&self) -> &CorsConfig {
        &self.config
    }
}

impl From<CorsConfig> for ProxyCorsLayer {
    fn from(config: CorsConfig) -> Self {
        Self::new(config)
    }
}

impl<S> Layer<S> for ProxyCorsLayer {
    type Service = ProxyCors<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ProxyCors::from_shared(inner, self.config.clone())
    }
}
