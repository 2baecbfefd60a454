//! Trace document assembled for a single request.
//!
//! The layout follows the Speed Tracer server-side trace format: a root
//! `trace` object carrying the time range and a frame stack whose root frame
//! is the HTTP exchange itself.

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use axum::http::{Method, StatusCode, Uri};
use bytes::Bytes;
use serde::Serialize;

use crate::trace::TraceId;

/// Serialized wrapper: `{"trace": {...}}`.
#[derive(Debug, Clone, Serialize)]
pub struct RequestTrace {
    pub trace: TraceBody,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceBody {
    pub id: String,
    /// Wall-clock start, milliseconds since the Unix epoch.
    pub date: u64,
    pub range: TimeRange,
    pub frame_stack: Frame,
}

/// Milliseconds. `start`/`end` are whole milliseconds since the Unix epoch;
/// `end` is `start` plus `duration` rounded to the nearest millisecond.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeRange {
    pub start: u64,
    pub end: u64,
    pub duration: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    pub id: String,
    pub range: TimeRange,
    pub operation: Operation,
    pub children: Vec<Frame>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Operation {
    #[serde(rename = "type")]
    pub kind: String,
    pub label: String,
    pub status: u16,
}

impl RequestTrace {
    /// Serialize to the JSON payload stored for this trace.
    pub fn to_payload(&self) -> Result<Bytes, serde_json::Error> {
        serde_json::to_vec(self).map(Bytes::from)
    }
}

/// Measures one request from the moment the middleware receives it.
#[derive(Debug, Clone, Copy)]
pub struct TraceTimer {
    started: Instant,
    /// Milliseconds since the Unix epoch at `started`.
    epoch_ms: u64,
}

impl TraceTimer {
    pub fn start() -> Self {
        let epoch_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;

        Self {
            started: Instant::now(),
            epoch_ms,
        }
    }

    /// Close the measurement and build the trace for the exchange.
    pub fn finish(self, id: &TraceId, method: &Method, uri: &Uri, status: StatusCode) -> RequestTrace {
        let duration = self.started.elapsed().as_secs_f64() * 1000.0;
        let range = TimeRange {
            start: self.epoch_ms,
            end: self.epoch_ms + duration.round() as u64,
            duration,
        };

        RequestTrace {
            trace: TraceBody {
                id: id.to_string(),
                date: self.epoch_ms,
                range,
                frame_stack: Frame {
                    id: "0".to_string(),
                    range,
                    operation: Operation {
                        kind: "HTTP".to_string(),
                        label: format!("{} {}", method, uri),
                        status: status.as_u16(),
                    },
                    children: Vec::new(),
                },
            },
        }
    }
}
