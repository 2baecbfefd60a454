//! Request classification.
//!
//! # Responsibilities
//! - Recognize the trace retrieval route
//! - Extract the `id` query parameter
//!
//! # Design Decisions
//! - The route is an exact path match; `/speedtracer/x` is passed downstream
//! - Only HEAD changes the response shape; every other method is served like GET

use axum::http::{Method, Request};

/// Path of the middleware-owned retrieval route.
pub const TRACE_PATH: &str = "/speedtracer";

/// Build the retrieval URL advertised for a stored trace.
pub fn trace_url(id: &str) -> String {
    format!("{}?id={}", TRACE_PATH, id)
}

/// A request addressed to the retrieval route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceLookup {
    id: Option<String>,
    head: bool,
}

impl TraceLookup {
    /// Classify `request`. Returns `None` for requests meant for the
    /// downstream handler.
    pub fn from_request<B>(request: &Request<B>) -> Option<Self> {
        if request.uri().path() != TRACE_PATH {
            return None;
        }

        let id = request.uri().query().and_then(|query| {
            url::form_urlencoded::parse(query.as_bytes())
                .find(|(key, _)| key == "id")
                .map(|(_, value)| value.into_owned())
        });

        Some(Self {
            id: id.filter(|id| !id.is_empty()),
            head: request.method() == Method::HEAD,
        })
    }

    /// The requested trace id. Missing or empty ids are `None`.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn is_head(&self) -> bool {
        self.head
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(method: Method, uri: &str) -> Request<()> {
        Request::builder().method(method).uri(uri).body(()).unwrap()
    }

    #[test]
    fn test_other_paths_pass_through() {
        assert!(TraceLookup::from_request(&request(Method::GET, "/")).is_none());
        assert!(TraceLookup::from_request(&request(Method::GET, "/speedtracer/x")).is_none());
        assert!(TraceLookup::from_request(&request(Method::GET, "/speedtracers?id=1")).is_none());
    }

    #[test]
    fn test_extracts_id() {
        let lookup = TraceLookup::from_request(&request(Method::GET, "/speedtracer?id=test")).unwrap();
        assert_eq!(lookup.id(), Some("test"));
        assert!(!lookup.is_head());
    }

    #[test]
    fn test_decodes_id_among_other_params() {
        let lookup =
            TraceLookup::from_request(&request(Method::GET, "/speedtracer?x=1&id=a%2Bb&y=2")).unwrap();
        assert_eq!(lookup.id(), Some("a+b"));
    }

    #[test]
    fn test_missing_or_empty_id() {
        let lookup = TraceLookup::from_request(&request(Method::GET, "/speedtracer")).unwrap();
        assert_eq!(lookup.id(), None);

        let lookup = TraceLookup::from_request(&request(Method::GET, "/speedtracer?id=")).unwrap();
        assert_eq!(lookup.id(), None);
    }

    #[test]
    fn test_head_detected() {
        let lookup = TraceLookup::from_request(&request(Method::HEAD, "/speedtracer?id=test")).unwrap();
        assert!(lookup.is_head());
    }

    #[test]
    fn test_trace_url() {
        assert_eq!(trace_url("abc"), "/speedtracer?id=abc");
    }
}
