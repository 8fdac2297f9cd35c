//! The tower form of the middleware over plain `http::Request`

use apiver_core::{Attributes, IntoResponse, Response, RouteInfo};
use apiver_versioning::{VersionResolver, VersioningLayer, VERSION_ATTRIBUTE};
use bytes::Bytes;
use http::StatusCode;
use http_body_util::BodyExt;
use std::collections::HashSet;
use std::convert::Infallible;
use std::sync::Arc;
use tower::{service_fn, Layer, ServiceExt};

async fn inner(req: http::Request<Bytes>) -> Result<Response, Infallible> {
    let uses = req
        .extensions()
        .get::<RouteInfo>()
        .map(|r| r.uses().to_string())
        .unwrap_or_default();
    let version = req
        .extensions()
        .get::<Attributes>()
        .and_then(|a| a.get(VERSION_ATTRIBUTE))
        .unwrap_or_default()
        .to_string();
    Ok(format!("{uses}|{version}").into_response())
}

async fn send(accept: Option<&str>, route: Option<RouteInfo>) -> (StatusCode, String) {
    let handlers: Arc<HashSet<String>> = Arc::new(
        [r"Ctrl\V1\Foo@bar", r"Ctrl\V2\Foo@bar"]
            .into_iter()
            .map(String::from)
            .collect(),
    );
    let service =
        VersioningLayer::new(Arc::new(VersionResolver::new()), handlers).layer(service_fn(inner));

    let mut builder = http::Request::builder().uri("/foo");
    if let Some(accept) = accept {
        builder = builder.header("accept", accept);
    }
    let mut req = builder.body(Bytes::new()).unwrap();
    if let Some(route) = route {
        req.extensions_mut().insert(route);
    }

    let response = service.oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_literal_scenarios() {
    let route = || Some(RouteInfo::new(r"Ctrl\V{d}\Foo@bar"));

    assert_eq!(
        send(Some("application/vnd.api-v1.1+json"), route()).await,
        (StatusCode::OK, r"Ctrl\V1\Foo@bar|1.1".to_string())
    );
    assert_eq!(
        send(Some("application/vnd.api-v2.1+json"), route()).await,
        (StatusCode::OK, r"Ctrl\V2\Foo@bar|2.1".to_string())
    );

    let (status, body) = send(Some("application/vnd.api-v3.1+json"), route()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("unsupported_version"));
}

#[tokio::test]
async fn test_request_without_route_still_gets_version() {
    assert_eq!(
        send(Some("application/vnd.api-v2+json"), None).await,
        (StatusCode::OK, "|2".to_string())
    );
    assert_eq!(send(None, None).await, (StatusCode::OK, "|1".to_string()));
}
