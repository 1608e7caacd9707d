//! HTTP tests against a live dispatch server.

use std::net::SocketAddr;
use std::sync::Arc;

use dispatch_router::config::ServerConfig;
use dispatch_router::routing::{ManifestReader, Router};
use dispatch_router::DispatchServer;

mod common;

async fn start_server(dir: &std::path::Path) -> SocketAddr {
    common::write_manifests(dir);
    let router = Router::new(common::test_registry())
        .with_metadata(Arc::new(ManifestReader::from_dir(dir)))
        .with_autoload(dir);

    let server = DispatchServer::new(router, ServerConfig::default()).unwrap();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let _ = server.run(listener).await;
    });

    addr
}

fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

#[tokio::test]
async fn test_dispatch_by_path() {
    let dir = tempfile::tempdir().unwrap();
    let addr = start_server(dir.path()).await;

    let res = client()
        .get(format!("http://{}/admin/page/t-e_s.t/10/20", addr))
        .send()
        .await
        .expect("server unreachable");

    assert_eq!(res.status(), 200);
    assert!(res.headers().contains_key("x-request-id"));
    assert_eq!(res.text().await.unwrap(), "t-e_s.t-10-20");
}

#[tokio::test]
async fn test_dispatch_by_route_query() {
    let dir = tempfile::tempdir().unwrap();
    let addr = start_server(dir.path()).await;

    let res = client()
        .get(format!("http://{}/index.php?_route=/blog/latest", addr))
        .send()
        .await
        .expect("server unreachable");

    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "latest");
}

#[tokio::test]
async fn test_unknown_path_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let addr = start_server(dir.path()).await;

    let res = client()
        .get(format!("http://{}/no/such/route", addr))
        .send()
        .await
        .expect("server unreachable");

    assert_eq!(res.status(), 404);
}

#[tokio::test]
async fn test_missing_autoload_fails_startup() {
    let dir = tempfile::tempdir().unwrap();
    let router = Router::new(common::test_registry()).with_autoload(dir.path().join("missing"));

    assert!(DispatchServer::new(router, ServerConfig::default()).is_err());
}

#[tokio::test]
async fn test_in_process_dispatch() {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    let dir = tempfile::tempdir().unwrap();
    common::write_manifests(dir.path());
    let router = Router::new(common::test_registry())
        .with_metadata(Arc::new(ManifestReader::from_dir(dir.path())))
        .with_autoload(dir.path());
    let app = DispatchServer::new(router, ServerConfig::default())
        .unwrap()
        .into_app();

    let res = app
        .oneshot(Request::builder().uri("/blog/hello").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"post:hello");
}

#[tokio::test]
async fn test_routing_failure_is_500() {
    use axum::body::Body;
    use axum::http::Request;
    use dispatch_router::Route;
    use tower::ServiceExt;

    let mut router = Router::new(common::test_registry());
    router
        .add_route(Route::new("ghost", "/ghost", "GhostController", "index"))
        .unwrap();
    let app = DispatchServer::new(router, ServerConfig::default())
        .unwrap()
        .into_app();

    let res = app
        .oneshot(Request::builder().uri("/ghost").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(res.status(), 500);
}

#[tokio::test]
async fn test_invalid_manifest_route_does_not_block_startup() {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    let dir = tempfile::tempdir().unwrap();
    common::write_manifests(dir.path());
    std::fs::write(
        dir.path().join("BlogController.toml"),
        r#"
prefix = "/blog"

[routes]
show = { rule = "/{slug}", requirements = { slug = "[a-z" } }
latest = "/latest"
"#,
    )
    .unwrap();
    let router = Router::new(common::test_registry())
        .with_metadata(Arc::new(ManifestReader::from_dir(dir.path())))
        .with_autoload(dir.path());
    let app = DispatchServer::new(router, ServerConfig::default())
        .unwrap()
        .into_app();

    let res = app
        .clone()
        .oneshot(Request::builder().uri("/admin/about").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let res = app
        .oneshot(Request::builder().uri("/blog/latest").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
}

#[tokio::test]
async fn test_percent_encoded_path_is_decoded() {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    let dir = tempfile::tempdir().unwrap();
    common::write_manifests(dir.path());
    let router = Router::new(common::test_registry())
        .with_metadata(Arc::new(ManifestReader::from_dir(dir.path())))
        .with_autoload(dir.path());
    let app = DispatchServer::new(router, ServerConfig::default())
        .unwrap()
        .into_app();

    let res = app
        .oneshot(Request::builder().uri("/blog/h%C3%A9llo").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    assert_eq!(std::str::from_utf8(&body).unwrap(), "post:h\u{e9}llo");
}
