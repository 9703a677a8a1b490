use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use futures_core::ready;
use pin_project_lite::pin_project;

use super::ProxyResponse;
use crate::{CorsConfig, CorsRequest};

pin_project! {
    /// Response future for [`ProxyCors`].
    ///
    /// [`ProxyCors`]: super::ProxyCors
    pub struct ResponseFuture<F> {
        #[pin]
        future: F,
        request: CorsRequest,
        config: Arc<CorsConfig>,
    }
}

impl<F> ResponseFuture<F> {
    pub(super) fn new(future: F, request: CorsRequest, config: Arc<CorsConfig>) -> Self {
        Self {
            future,
            request,
            config,
        }
    }
}

impl<F, R, E> Future for ResponseFuture<F>
where
    F: Future<Output = Result<R, E>>,
    R: Into<Option<ProxyResponse>>,
{
    type Output = Result<Option<ProxyResponse>, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let mut response: Option<ProxyResponse> = ready!(this.future.poll(cx))?.into();

        this.config.apply_to_proxy(this.request, &mut response);

        Poll::Ready(Ok(response))
    }
}
