//! Tower layer that captures a trace per request and serves stored traces.

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{HeaderName, HeaderValue, Request, Response};
use bytes::Bytes;
use futures_util::future::BoxFuture;
use tower::{BoxError, Layer, Service};

use crate::error::TracerError;
use crate::http::request::{trace_url, TraceLookup};
use crate::http::tracer::SpeedTracer;
use crate::trace::{TraceId, TraceTimer};

/// Response header pointing at the stored trace.
pub static X_TRACE_URL: HeaderName = HeaderName::from_static("x-traceurl");

/// Applies [`SpeedTracerService`] to a downstream service.
///
/// Store failures are not converted into responses: the service fails with
/// a [`BoxError`], so under axum the stack needs an error handler such as
/// `HandleErrorLayer` in front of it.
#[derive(Clone, Debug)]
pub struct SpeedTracerLayer {
    tracer: Arc<SpeedTracer>,
}

impl SpeedTracerLayer {
    pub fn new(tracer: SpeedTracer) -> Self {
        Self {
            tracer: Arc::new(tracer),
        }
    }

    /// Share an existing tracer, and therefore its store.
    pub fn from_shared(tracer: Arc<SpeedTracer>) -> Self {
        Self { tracer }
    }

    pub fn tracer(&self) -> &Arc<SpeedTracer> {
        &self.tracer
    }
}

impl<S> Layer<S> for SpeedTracerLayer {
    type Service = SpeedTracerService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SpeedTracerService {
            inner,
            tracer: self.tracer.clone(),
        }
    }
}

/// Dispatches each request to the retrieval route or to the inner service.
///
/// Requests for the retrieval route never reach `inner`. All other requests
/// are forwarded unchanged; their response keeps its status and body and
/// gains an `X-TraceUrl` header.
#[derive(Clone, Debug)]
pub struct SpeedTracerService<S> {
    inner: S,
    tracer: Arc<SpeedTracer>,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for SpeedTracerService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Error: Into<BoxError>,
    S::Future: Send + 'static,
    ReqBody: Send + 'static,
    ResBody: http_body::Body<Data = Bytes> + Send + 'static,
    ResBody::Error: Into<BoxError>,
{
    type Response = Response<Body>;
    type Error = BoxError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(Into::into)
    }

    fn call(&mut self, request: Request<ReqBody>) -> Self::Future {
        let tracer = self.tracer.clone();

        if let Some(lookup) = TraceLookup::from_request(&request) {
            return Box::pin(async move { tracer.lookup(&lookup).await.map_err(BoxError::from) });
        }

        // Take the service that was driven to readiness, leave a clone behind.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let timer = TraceTimer::start();
            let method = request.method().clone();
            let uri = request.uri().clone();

            let response = inner.call(request).await.map_err(Into::<BoxError>::into)?;

            let id = TraceId::generate();
            let trace = timer.finish(&id, &method, &uri, response.status());
            tracer.capture(&id, &trace).await?;

            let (mut parts, body) = response.into_parts();
            let location =
                HeaderValue::try_from(trace_url(id.as_str())).map_err(TracerError::from)?;
            parts.headers.insert(X_TRACE_URL.clone(), location);

            tracing::debug!(
                trace_id = %id,
                method = %method,
                path = %uri.path(),
                status = parts.status.as_u16(),
                "Request traced"
            );

            Ok::<_, BoxError>(Response::from_parts(parts, Body::new(body)))
        })
    }
}
