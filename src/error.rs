//! Errors raised while handling a request.
//!
//! A missing trace is not an error: it is answered with a 404 response.
//! These variants cover infrastructure failures that the surrounding
//! transport is expected to turn into a server error.

use axum::http::header::InvalidHeaderValue;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum TracerError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to encode trace: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("invalid trace url header: {0}")]
    Header(#[from] InvalidHeaderValue),
}
