//! Responses for the retrieval route.
//!
//! # Design Decisions
//! - The stored payload is returned verbatim, never re-encoded
//! - HEAD carries the same status and content type as GET with an empty body
//! - A missing trace is an ordinary 404 with an empty body

use axum::body::Body;
use axum::http::{header, HeaderValue, Response, StatusCode};
use bytes::Bytes;

/// 200 with the stored JSON document (or an empty body for HEAD).
pub fn trace_found(payload: Bytes, head: bool) -> Response<Body> {
    let body = if head { Bytes::new() } else { payload };
    let length = HeaderValue::from(body.len());

    let mut response = Response::new(Body::from(body));
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(header::CONTENT_LENGTH, length);
    response
}

/// 404 with an empty body.
pub fn trace_not_found() -> Response<Body> {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::NOT_FOUND;
    response
        .headers_mut()
        .insert(header::CONTENT_LENGTH, HeaderValue::from_static("0"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_found_get() {
        let payload = Bytes::from_static(br#"{"trace":{}}"#);
        let response = trace_found(payload.clone(), false);

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "12");

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body, payload);
    }

    #[tokio::test]
    async fn test_found_head() {
        let response = trace_found(Bytes::from_static(br#"{"trace":{}}"#), true);

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "0");

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_not_found() {
        let response = trace_not_found();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.is_empty());
    }
}
