//! Synchronous API client core for the Emma audience service.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). The caller executes the
//! actual HTTP round-trip, making the core fully deterministic and testable.
//!
//! # Design
//! - `EmmaClient` is stateless — it holds the base URL, account id and a
//!   pre-computed basic-auth header.
//! - Each API operation is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so the I/O boundary is explicit.
//! - `Query` is an immutable search-criteria expression tree; its serialized
//!   nested-array form goes into a search's `criteria` field.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod error;
pub mod http;
pub mod query;
pub mod types;

pub use client::EmmaClient;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Page};
pub use query::{Operator, Query};
pub use types::{
    AddMemberResult, CreateGroup, CreateMember, CreateSearch, CreateWebhook, Group, GroupType,
    Member, MemberStatus, Search, UpdateSearch, Webhook, WebhookMethod,
};
