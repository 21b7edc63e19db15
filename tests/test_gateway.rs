//! End-to-end tests: client -> gateway -> handler -> mock upstream

mod common;

use coffee_proxy::config::CorsConfig;
use coffee_proxy::http::cors::CorsPolicy;
use coffee_proxy::proxy::ForwardingHandler;
use coffee_proxy::server::gateway::Gateway;
use coffee_proxy::server::listener;
use common::{MockUpstream, Reply, dead_base_url};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use url::Url;

async fn start_gateway(base_url: Url, invocation_timeout: Duration) -> String {
    let gateway = Gateway::new(
        ForwardingHandler::new(base_url).unwrap(),
        CorsPolicy::new(&CorsConfig::default()),
        invocation_timeout,
    );
    let tcp = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = tcp.local_addr().unwrap().to_string();
    tokio::spawn(listener::serve(tcp, gateway));
    addr
}

/// Send one raw request and split the reply into head and body.
async fn roundtrip(addr: &str, raw: &str) -> (String, Vec<u8>) {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw.as_bytes()).await.unwrap();

    let mut reply = Vec::new();
    stream.read_to_end(&mut reply).await.unwrap();

    let split = reply
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("response head");
    let head = String::from_utf8(reply[..split].to_vec()).unwrap();
    (head, reply[split + 4..].to_vec())
}

#[tokio::test]
async fn test_get_returns_decoded_upstream_body() {
    let upstream = MockUpstream::start(Reply::Full {
        status: 200,
        body: br#"{"file":"a.jpg"}"#.to_vec(),
    })
    .await;
    let addr = start_gateway(upstream.base_url.clone(), Duration::from_secs(10)).await;

    let (head, body) = roundtrip(
        &addr,
        "GET /random.json?cache=1 HTTP/1.1\r\nHost: x\r\nOrigin: https://site.example\r\nConnection: close\r\n\r\n",
    )
    .await;

    assert!(head.starts_with("HTTP/1.1 200 OK"));
    assert!(head.contains("Access-Control-Allow-Origin: *"));
    assert_eq!(body, br#"{"file":"a.jpg"}"#);
    // Query string is not forwarded
    assert_eq!(upstream.requests(), vec!["GET /random.json HTTP/1.1"]);
}

#[tokio::test]
async fn test_preflight_is_answered_without_upstream_call() {
    let upstream = MockUpstream::start(Reply::Full {
        status: 200,
        body: b"unused".to_vec(),
    })
    .await;
    let addr = start_gateway(upstream.base_url.clone(), Duration::from_secs(10)).await;

    let (head, body) = roundtrip(
        &addr,
        "OPTIONS /random.json HTTP/1.1\r\nOrigin: https://site.example\r\nAccess-Control-Request-Method: GET\r\nConnection: close\r\n\r\n",
    )
    .await;

    assert!(head.starts_with("HTTP/1.1 204 No Content"));
    assert!(head.contains("Access-Control-Max-Age: 3600"));
    assert!(head.contains("Access-Control-Allow-Origin: *"));
    assert!(body.is_empty());
    assert!(upstream.requests().is_empty());
}

#[tokio::test]
async fn test_unreachable_upstream_returns_500() {
    let addr = start_gateway(dead_base_url().await, Duration::from_secs(10)).await;

    let (head, body) = roundtrip(&addr, "GET /random.json HTTP/1.1\r\nConnection: close\r\n\r\n").await;

    assert!(head.starts_with("HTTP/1.1 500 Internal Server Error"));
    assert_eq!(body, b"Internal Server Error");
}

#[tokio::test]
async fn test_invocation_timeout_returns_502() {
    let upstream = MockUpstream::start(Reply::Hang).await;
    let addr = start_gateway(upstream.base_url.clone(), Duration::from_millis(200)).await;

    let (head, _) = roundtrip(&addr, "GET /slow HTTP/1.1\r\nConnection: close\r\n\r\n").await;

    assert!(head.starts_with("HTTP/1.1 502 Bad Gateway"));
    assert_eq!(upstream.requests(), vec!["GET /slow HTTP/1.1"]);
}

#[tokio::test]
async fn test_malformed_request_returns_400() {
    let addr = start_gateway(dead_base_url().await, Duration::from_secs(10)).await;

    let (head, _) = roundtrip(&addr, "BREW /pot HTTP/1.1\r\n\r\n").await;

    assert!(head.starts_with("HTTP/1.1 400 Bad Request"));
}

#[tokio::test]
async fn test_keep_alive_serves_two_requests() {
    let upstream = MockUpstream::start(Reply::Full {
        status: 200,
        body: b"hi".to_vec(),
    })
    .await;
    let addr = start_gateway(upstream.base_url.clone(), Duration::from_secs(10)).await;

    let (head, body) = roundtrip(
        &addr,
        "GET /one HTTP/1.1\r\n\r\nGET /two HTTP/1.1\r\nConnection: close\r\n\r\n",
    )
    .await;

    assert!(head.starts_with("HTTP/1.1 200 OK"));
    // Second response follows the first body on the same connection
    let rest = String::from_utf8_lossy(&body);
    assert!(rest.starts_with("hi"));
    assert!(rest.contains("HTTP/1.1 200 OK"));
    assert_eq!(upstream.requests(), vec!["GET /one HTTP/1.1", "GET /two HTTP/1.1"]);
}

#[tokio::test]
async fn test_head_response_has_length_but_no_body() {
    let upstream = MockUpstream::start(Reply::Full {
        status: 200,
        body: b"BODYBYTES".to_vec(),
    })
    .await;
    let addr = start_gateway(upstream.base_url.clone(), Duration::from_secs(10)).await;

    // A HEAD reply followed by a GET on the same connection: the GET's status
    // line must start right after the HEAD head.
    let (head, rest) = roundtrip(
        &addr,
        "HEAD /x HTTP/1.1\r\n\r\nGET /x HTTP/1.1\r\nConnection: close\r\n\r\n",
    )
    .await;

    assert!(head.starts_with("HTTP/1.1 200 OK"));
    assert!(head.contains("Content-Length: 9"));
    let rest = String::from_utf8_lossy(&rest);
    assert!(rest.starts_with("HTTP/1.1 200 OK"));
    assert!(rest.ends_with("\r\n\r\nBODYBYTES"));
}

#[tokio::test]
async fn test_oversized_body_returns_413() {
    let addr = start_gateway(dead_base_url().await, Duration::from_secs(10)).await;

    let (head, _) = roundtrip(
        &addr,
        "POST /upload HTTP/1.1\r\nContent-Length: 99999999999\r\n\r\n",
    )
    .await;

    assert!(head.starts_with("HTTP/1.1 413 Payload Too Large"));
}

#[tokio::test]
async fn test_envelope_response_defaults_to_json_content_type() {
    let upstream = MockUpstream::start(Reply::Full {
        status: 200,
        body: br#"{"file":"a.jpg"}"#.to_vec(),
    })
    .await;
    let addr = start_gateway(upstream.base_url.clone(), Duration::from_secs(10)).await;

    let (head, _) = roundtrip(&addr, "GET /random.json HTTP/1.1\r\nConnection: close\r\n\r\n").await;

    assert!(head.contains("Content-Type: application/json"));
}
