use std::convert::Infallible;

use http::HeaderValue;
use tower::{service_fn, util::ServiceExt, Layer};

use super::{ProxyCorsLayer, ProxyRequest, ProxyResponse};
use crate::{AllowOrigins, CorsConfig};

async fn no_response(_: ProxyRequest) -> Result<Option<ProxyResponse>, Infallible> {
    Ok(None)
}

#[tokio::test]
async fn handler_headers_win() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();

    let svc = ProxyCorsLayer::new(CorsConfig::new().allow_credentials(true)).layer(service_fn(
        |_: ProxyRequest| async {
            Ok::<_, Infallible>(
                ProxyResponse::new(200)
                    .with_header("Access-Control-Allow-Origin", "https://handler.com")
                    .with_body("ok"),
            )
        },
    ));

    let event = ProxyRequest::new("GET").with_header("Origin", "https://example.com");
    let res = svc.oneshot(event).await.unwrap().unwrap();

    assert_eq!(res.status_code, Some(200));
    assert_eq!(res.body.as_deref(), Some("ok"));
    assert_eq!(
        res.header("Access-Control-Allow-Origin"),
        Some("https://handler.com")
    );
    assert_eq!(res.header("Access-Control-Allow-Credentials"), Some("true"));
}

#[tokio::test]
async fn missing_response_is_created() {
    let svc = ProxyCorsLayer::default().layer(service_fn(no_response));

    let res = svc.oneshot(ProxyRequest::new("POST")).await.unwrap().unwrap();

    assert_eq!(res.status_code, None);
    assert_eq!(res.headers.unwrap().len(), 1);
}

#[tokio::test]
async fn missing_method_passes_through() {
    let svc = ProxyCorsLayer::default().layer(service_fn(no_response));
    let res = svc.oneshot(ProxyRequest::default()).await.unwrap();
    assert!(res.is_none());

    let svc = ProxyCorsLayer::default().layer(service_fn(|_: ProxyRequest| async {
        Ok::<_, Infallible>(ProxyResponse::new(204))
    }));
    let res = svc.oneshot(ProxyRequest::default()).await.unwrap().unwrap();
    assert_eq!(res, ProxyResponse::new(204));
}

#[tokio::test]
async fn handler_errors_propagate() {
    let svc = ProxyCorsLayer::default().layer(service_fn(|_: ProxyRequest| async {
        Err::<ProxyResponse, _>("handler failed")
    }));

    let err = svc.oneshot(ProxyRequest::new("GET")).await.unwrap_err();
    assert_eq!(err, "handler failed");
}

#[tokio::test]
async fn double_wrap_is_idempotent() {
    let config = CorsConfig::new()
        .allow_origins(AllowOrigins::list(vec![
            HeaderValue::from_static("https://a.com"),
            HeaderValue::from_static("https://b.com"),
        ]))
        .cache_control(HeaderValue::from_static("no-cache"));
    let layer = ProxyCorsLayer::new(config);

    let once = layer.layer(service_fn(no_response));
    let twice = layer.layer(layer.layer(service_fn(no_response)));

    let event = || ProxyRequest::new("OPTIONS").with_header("origin", "https://b.com");
    let once = once.oneshot(event()).await.unwrap();
    let twice = twice.oneshot(event()).await.unwrap();

    assert_eq!(once, twice);
    let res = once.unwrap();
    assert_eq!(res.header("Access-Control-Allow-Origin"), Some("https://b.com"));
    assert_eq!(res.header("Cache-Control"), Some("no-cache"));
}

#[cfg(feature = "serde")]
#[tokio::test]
async fn json_event_round_trip() {
    let config: crate::CorsOptions =
        serde_json::from_str(r#"{ "allowedOrigins": ["https://a.com"], "credentials": true }"#)
            .unwrap();
    let config = <CorsConfig as std::convert::TryFrom<_>>::try_from(config).unwrap();
    let svc = ProxyCorsLayer::new(config).layer(service_fn(|_: ProxyRequest| async {
        Ok::<_, Infallible>(ProxyResponse::new(200).with_body("{}"))
    }));

    let event: ProxyRequest = serde_json::from_str(
        r#"{
            "httpMethod": "GET",
            "path": "/items",
            "headers": { "origin": "https://a.com" },
            "isBase64Encoded": false
        }"#,
    )
    .unwrap();
    let res = svc.oneshot(event).await.unwrap().unwrap();

    let json = serde_json::to_value(&res).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "statusCode": 200,
            "headers": {
                "Access-Control-Allow-Origin": "https://a.com",
                "Access-Control-Allow-Credentials": "true"
            },
            "body": "{}",
            "isBase64Encoded": false
        })
    );
}
