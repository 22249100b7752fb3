//! Lookups against a local HTTP server, exercising the real `ureq` fetcher.

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use geoip_resolver::geoip::{Resolver, ResultPair};
use std::net::SocketAddr;

const IPAPI_BODY: &str = r#"{"ip":"85.150.1.1","country":"NL","timezone":"Europe/Amsterdam"}"#;
const KDE_BODY: &str = r#"{"time_zone":"America/Argentina/Cordoba"}"#;

async fn serve() -> SocketAddr {
    let app = Router::new()
        .route("/ipapi", get(|| async { IPAPI_BODY }))
        .route("/kde", get(|| async { KDE_BODY }))
        .route("/xml", get(|| async { "<Response><TimeZone>Asia/Tokyo</TimeZone></Response>" }))
        .route("/down", get(|| async { (StatusCode::SERVICE_UNAVAILABLE, IPAPI_BODY) }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn get_blocking(resolver: &Resolver) -> ResultPair {
    let resolver = resolver.clone();
    tokio::task::spawn_blocking(move || resolver.get()).await.unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_json_fields_over_http() {
    let addr = serve().await;
    let resolver = Resolver::new("json", &format!("http://{}/ipapi", addr), "country,timezone");

    let direct = get_blocking(&resolver).await;
    assert_eq!(direct, ResultPair::new("NL", "Europe/Amsterdam"));
    assert_eq!(resolver.query().await, direct);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_json_timezone_over_http() {
    let addr = serve().await;
    let resolver = Resolver::new("json", &format!("http://{}/kde", addr), "time_zone");
    assert_eq!(resolver.query().await, ResultPair::new("America", "Argentina/Cordoba"));
}

#[cfg(feature = "xml")]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_xml_over_http() {
    let addr = serve().await;
    let resolver = Resolver::new("xml", &format!("http://{}/xml", addr), "TimeZone");
    assert_eq!(resolver.query().await, ResultPair::new("Asia", "Tokyo"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_error_status_is_unknown() {
    let addr = serve().await;
    let resolver = Resolver::new("json", &format!("http://{}/down", addr), "country,timezone");
    assert!(get_blocking(&resolver).await.is_unknown());
    assert!(resolver.query().await.is_unknown());
    assert_eq!(resolver.query_raw().await, "");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_missing_route_is_unknown() {
    let addr = serve().await;
    let resolver = Resolver::new("json", &format!("http://{}/nowhere", addr), "");
    assert!(resolver.query().await.is_unknown());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_raw_body_over_http() {
    let addr = serve().await;
    let resolver = Resolver::new("json", &format!("http://{}/ipapi", addr), "country,timezone");
    assert_eq!(resolver.query_raw().await, IPAPI_BODY);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_connection_refused_is_unknown() {
    // Bind and drop to get a port nobody listens on.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let resolver = Resolver::new("json", &format!("http://{}/ipapi", addr), "country,timezone");
    assert!(resolver.query().await.is_unknown());
}
