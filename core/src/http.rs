//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The core
//! crate builds `HttpRequest` values and parses `HttpResponse` values without
//! ever touching the network — the caller (host) is responsible for executing
//! the actual I/O. This separation keeps the core deterministic and easy to
//! test against canned responses.
//!
//! Unlike a generic REST surface, the Emma API reads pagination and count
//! flags from the URL query string on GET requests, so `HttpRequest` carries
//! query parameters separately from the path instead of forcing the host to
//! re-parse the URL.

/// HTTP method for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

/// An HTTP request described as plain data.
///
/// Built by `EmmaClient::build_*` methods. The caller is responsible for
/// executing this request against the network and returning the corresponding
/// `HttpResponse`. `query` holds URL query parameters the host must encode
/// into the request URL.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// An HTTP response described as plain data.
///
/// Constructed by the caller after executing an `HttpRequest`, then passed
/// to `EmmaClient::parse_*` methods for deserialization.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// A pagination window on a list endpoint.
///
/// The remote API returns at most [`Page::SIZE`] records per request and
/// reads the window from `start`/`end` query parameters. The original
/// adapter tracked these in mutable counters on the connection; here the
/// caller passes an explicit window and advances it with [`Page::next`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub start: u32,
    pub end: u32,
}

impl Page {
    /// Maximum number of records the API returns per request.
    pub const SIZE: u32 = 500;

    /// The first window, covering records `0..500`.
    pub fn first() -> Self {
        Self {
            start: 0,
            end: Self::SIZE,
        }
    }

    /// The window immediately after this one.
    pub fn next(self) -> Self {
        Self {
            start: self.end,
            end: self.end + Self::SIZE,
        }
    }

    pub(crate) fn query_params(self) -> Vec<(String, String)> {
        vec![
            ("start".to_string(), self.start.to_string()),
            ("end".to_string(), self.end.to_string()),
        ]
    }
}
