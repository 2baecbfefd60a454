//! End-to-end tests over TCP against the demo server.

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::net::TcpListener;

use speedtracer::{
    AppConfig, HttpServer, MemoryStore, Shutdown, SpeedTracer, StoreError, TraceStore,
};

async fn start(tracer: SpeedTracer) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::with_tracer(AppConfig::default(), tracer);
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    (addr, shutdown)
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_trace_round_trip() {
    let db = Arc::new(MemoryStore::new());
    let tracer = SpeedTracer::builder().store(db.clone()).build().unwrap();
    let (addr, shutdown) = start(tracer).await;
    let client = client();

    let res = client.get(format!("http://{}/", addr)).send().await.expect("server unreachable");
    assert_eq!(res.status(), 200);
    let trace_url = res.headers()["x-traceurl"].to_str().unwrap().to_string();
    assert!(trace_url.starts_with("/speedtracer?id="));
    assert_eq!(res.text().await.unwrap(), "Hello World");

    let res = client.get(format!("http://{}{}", addr, trace_url)).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["content-type"], "application/json");
    let body: serde_json::Value = serde_json::from_slice(&res.bytes().await.unwrap()).unwrap();
    assert_eq!(body["trace"]["frameStack"]["operation"]["label"], "GET /");

    let res = client.head(format!("http://{}{}", addr, trace_url)).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["content-length"], "0");

    let res = client
        .get(format!("http://{}/speedtracer?id=test-missing", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);

    shutdown.trigger();
}

#[tokio::test]
async fn test_downstream_404_is_traced() {
    let (addr, shutdown) = start(SpeedTracer::builder().build().unwrap()).await;

    let res = client().get(format!("http://{}/no-such-page", addr)).send().await.unwrap();

    assert_eq!(res.status(), 404);
    assert!(res.headers().contains_key("x-traceurl"));

    shutdown.trigger();
}

struct UnavailableStore;

#[async_trait]
impl TraceStore for UnavailableStore {
    async fn get(&self, _id: &str) -> Result<Option<Bytes>, StoreError> {
        Err(StoreError::Unavailable("down".into()))
    }

    async fn set(&self, _id: &str, _payload: Bytes) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("down".into()))
    }

    fn name(&self) -> &'static str {
        "unavailable"
    }
}

#[tokio::test]
async fn test_store_failure_is_server_error() {
    let tracer = SpeedTracer::builder().store(Arc::new(UnavailableStore)).build().unwrap();
    let (addr, shutdown) = start(tracer).await;

    let res = client().get(format!("http://{}/", addr)).send().await.unwrap();
    assert_eq!(res.status(), 500);

    shutdown.trigger();
}
