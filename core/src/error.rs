//! Error types for the Emma API client.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers frequently distinguish
//! "the resource does not exist" from "the server rejected the request." The
//! remote API uses 400 for malformed payloads, so that also gets its own
//! variant; every other non-2xx status lands in `HttpError` with the raw
//! status code and body for debugging. `InvalidRadius` is the one error the
//! query builder itself can produce.

use std::fmt;

/// Errors returned by `EmmaClient` parse methods and `Query::zip_radius`.
#[derive(Debug)]
pub enum ApiError {
    /// The server returned 404 — the requested resource does not exist.
    NotFound,

    /// The server returned 400 — the request payload was rejected.
    BadRequest { body: String },

    /// The server returned a non-2xx status other than 400 or 404.
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    SerializationError(String),

    /// A zip-radius query was given a radius outside {5, 10, 15, 20, 25, 50}.
    InvalidRadius(u32),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound => write!(f, "resource not found"),
            ApiError::BadRequest { body } => {
                write!(f, "HTTP 400: {body}")
            }
            ApiError::HttpError { status, body } => {
                write!(f, "HTTP {status}: {body}")
            }
            ApiError::DeserializationError(msg) => {
                write!(f, "deserialization failed: {msg}")
            }
            ApiError::SerializationError(msg) => {
                write!(f, "serialization failed: {msg}")
            }
            ApiError::InvalidRadius(r) => {
                write!(f, "invalid zip radius {r}: must be one of 5, 10, 15, 20, 25, 50")
            }
        }
    }
}

impl std::error::Error for ApiError {}
