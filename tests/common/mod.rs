//! Shared helpers for middleware and server tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use bytes::Bytes;
use tower::{BoxError, Layer, Service, ServiceExt};

use speedtracer::http::SpeedTracerService;
use speedtracer::{SpeedTracer, TraceStore};

/// Downstream application answering every path with
/// `(200, text/plain, "Hello World")`.
pub fn hello_app() -> Router {
    respond_with(StatusCode::OK, "Hello World")
}

/// Downstream application answering every path with `status` and a fixed
/// plain-text body.
pub fn respond_with(status: StatusCode, body: &'static str) -> Router {
    Router::new().fallback(move || async move {
        (status, [(header::CONTENT_TYPE, "text/plain")], body)
    })
}

/// Downstream application that counts its invocations.
#[allow(dead_code)]
pub fn counting_app(calls: Arc<AtomicUsize>) -> Router {
    Router::new().fallback(move || {
        let calls = calls.clone();
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            "counted"
        }
    })
}

/// Wrap `app` with a tracer backed by `store`.
#[allow(dead_code)]
pub fn traced(store: Arc<dyn TraceStore>, app: Router) -> SpeedTracerService<Router> {
    let tracer = SpeedTracer::builder().store(store).build().unwrap();
    tracer.into_layer().layer(app)
}

/// Send `request` through `service` once.
#[allow(dead_code)]
pub async fn send<S>(service: S, request: Request<Body>) -> Result<Response<Body>, BoxError>
where
    S: Service<Request<Body>, Response = Response<Body>, Error = BoxError>,
{
    service.oneshot(request).await
}

#[allow(dead_code)]
pub fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

#[allow(dead_code)]
pub fn head(uri: &str) -> Request<Body> {
    Request::head(uri).body(Body::empty()).unwrap()
}

#[allow(dead_code)]
pub async fn body_bytes(response: Response<Body>) -> Bytes {
    axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap()
}
