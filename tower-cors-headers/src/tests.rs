use std::{convert::Infallible, time::Duration};

use http::{header, HeaderValue, Method, Request, Response, StatusCode};
use tower::{service_fn, util::ServiceExt, Layer, ServiceBuilder};

use crate::{AllowOrigins, CorsConfig, CorsHeaders, CorsHeadersLayer};

async fn ok(_: Request<()>) -> Result<Response<()>, Infallible> {
    Ok(Response::new(()))
}

fn request(method: Method, origin: &'static str) -> Request<()> {
    Request::builder()
        .method(method)
        .header(header::ORIGIN, origin)
        .body(())
        .unwrap()
}

#[tokio::test]
async fn default_layer_sets_wildcard_only() {
    let svc = CorsHeadersLayer::default().layer(service_fn(ok));
    let res = svc
        .oneshot(request(Method::GET, "https://example.com"))
        .await
        .unwrap();

    assert_eq!(res.headers().len(), 1);
    assert_eq!(res.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[tokio::test]
#[allow(
    clippy::declare_interior_mutable_const,
    clippy::borrow_interior_mutable_const
)]
async fn headers_set_by_inner_service_are_kept() {
    const HANDLER_ORIGIN: HeaderValue = HeaderValue::from_static("https://handler.com");
    const HANDLER_MAX_AGE: HeaderValue = HeaderValue::from_static("10");

    async fn inner_svc(_: Request<()>) -> Result<Response<()>, Infallible> {
        Ok(Response::builder()
            .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, HANDLER_ORIGIN)
            .header(header::ACCESS_CONTROL_MAX_AGE, HANDLER_MAX_AGE)
            .header("x-test", "")
            .body(())
            .unwrap())
    }

    let svc = ServiceBuilder::new()
        .layer(
            CorsHeadersLayer::default()
                .allow_origins(HeaderValue::from_static("https://example.com"))
                .max_age(Duration::from_secs(600))
                .allow_credentials(true),
        )
        .service_fn(inner_svc);

    let res = svc
        .oneshot(request(Method::GET, "https://example.com"))
        .await
        .unwrap();

    let headers = res.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], HANDLER_ORIGIN);
    assert_eq!(headers[header::ACCESS_CONTROL_MAX_AGE], HANDLER_MAX_AGE);
    assert_eq!(headers["x-test"], "");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    assert_eq!(
        headers
            .get_all(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .iter()
            .count(),
        1
    );
}

#[tokio::test]
async fn preflight_gets_cache_control() {
    let layer = CorsHeadersLayer::default()
        .allow_origins(AllowOrigins::none())
        .cache_control(HeaderValue::from_static("max-age=300"))
        .allow_methods(vec![Method::GET, Method::POST])
        .allow_headers(vec![header::CONTENT_TYPE]);

    let res = layer
        .layer(service_fn(ok))
        .oneshot(request(Method::OPTIONS, "https://example.com"))
        .await
        .unwrap();
    let headers = res.headers();
    assert_eq!(headers[header::CACHE_CONTROL], "max-age=300");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "GET,POST");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "content-type");
    assert!(!headers.contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));

    let res = layer
        .layer(service_fn(ok))
        .oneshot(request(Method::PUT, "https://example.com"))
        .await
        .unwrap();
    assert!(!res.headers().contains_key(header::CACHE_CONTROL));
}

#[tokio::test]
async fn origin_is_echoed_or_falls_back() {
    let config = CorsConfig::new().allow_origins([
        HeaderValue::from_static("https://a.com"),
        HeaderValue::from_static("https://b.com"),
    ]);
    let svc = CorsHeaders::new(service_fn(ok), config);

    let res = svc
        .clone()
        .oneshot(request(Method::GET, "https://b.com"))
        .await
        .unwrap();
    assert_eq!(
        res.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://b.com"
    );

    let res = svc
        .oneshot(request(Method::GET, "https://evil.com"))
        .await
        .unwrap();
    assert_eq!(
        res.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://a.com"
    );
}

#[tokio::test]
async fn errors_from_inner_service_propagate() {
    let svc = CorsHeadersLayer::default().layer(service_fn(|_: Request<()>| async {
        Err::<Response<()>, _>(StatusCode::BAD_GATEWAY)
    }));

    let err = svc
        .oneshot(request(Method::GET, "https://example.com"))
        .await
        .unwrap_err();
    assert_eq!(err, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn double_wrap_is_idempotent() {
    let layer = CorsHeadersLayer::new(
        CorsConfig::new()
            .allow_credentials(true)
            .expose_headers(vec![header::ETAG]),
    );

    let once = layer
        .layer(service_fn(ok))
        .oneshot(request(Method::GET, "https://example.com"))
        .await
        .unwrap();
    let twice = layer
        .layer(layer.layer(service_fn(ok)))
        .oneshot(request(Method::GET, "https://example.com"))
        .await
        .unwrap();

    assert_eq!(once.headers(), twice.headers());
    assert_eq!(once.headers().len(), 3);
}

#[test]
fn builder_does_not_affect_existing_services() {
    let layer = CorsHeadersLayer::default();
    let svc = layer.layer(());
    let layer = layer.allow_credentials(true);

    assert!(!svc.config().allow_credentials);
    assert!(layer.config().allow_credentials);
}
