//! Stateless HTTP request builder and response parser for the Emma API.
//!
//! # Design
//! `EmmaClient` holds the base URL, account id and a pre-computed basic-auth
//! header, and carries no mutable state between calls. Each API operation is
//! split into a `build_*` method that produces an `HttpRequest` and a
//! `parse_*` method that consumes an `HttpResponse`. The caller executes the
//! actual HTTP round-trip, keeping the core deterministic and free of I/O
//! dependencies.
//!
//! Paths follow the remote service exactly: every request lives under
//! `/{account_id}` and list endpoints accept a `start`/`end` pagination
//! window (see `Page`). Endpoints that the service answers with a bare JSON
//! boolean or number (`PUT`/`DELETE` acknowledgements, create-search ids)
//! parse to `bool`/`i64` rather than a record.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Page};
use crate::types::{
    AddMemberResult, CreateGroup, CreateMember, CreateSearch, CreateWebhook, Group, Member,
    Search, UpdateSearch, Webhook,
};

/// Synchronous, stateless client for the Emma audience API.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network. The caller is responsible for executing the HTTP
/// round-trip between `build_*` and `parse_*`.
#[derive(Debug, Clone)]
pub struct EmmaClient {
    base_url: String,
    account_id: String,
    auth_header: String,
}

impl EmmaClient {
    /// `base_url` is the API host (e.g. `https://api.e2ma.net`); the account
    /// id becomes the leading path segment of every request, and the
    /// public/private key pair becomes an HTTP basic-auth header.
    pub fn new(base_url: &str, account_id: &str, public_key: &str, private_key: &str) -> Self {
        let credentials = STANDARD.encode(format!("{public_key}:{private_key}"));
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            account_id: account_id.to_string(),
            auth_header: format!("Basic {credentials}"),
        }
    }

    fn request(&self, method: HttpMethod, path: &str) -> HttpRequest {
        HttpRequest {
            method,
            path: format!("{}/{}{path}", self.base_url, self.account_id),
            query: Vec::new(),
            headers: vec![("authorization".to_string(), self.auth_header.clone())],
            body: None,
        }
    }

    fn request_with_body(
        &self,
        method: HttpMethod,
        path: &str,
        body: &impl serde::Serialize,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(body)
            .map_err(|e| ApiError::SerializationError(e.to_string()))?;
        let mut req = self.request(method, path);
        req.headers
            .push(("content-type".to_string(), "application/json".to_string()));
        req.body = Some(body);
        Ok(req)
    }

    fn list_request(&self, path: &str, page: Option<Page>) -> HttpRequest {
        let mut req = self.request(HttpMethod::Get, path);
        if let Some(page) = page {
            req.query = page.query_params();
        }
        req
    }

    // -- Members ------------------------------------------------------------

    /// `GET /members`. Pass a `Page` to request a window other than the
    /// default first 500 records.
    pub fn build_list_members(&self, page: Option<Page>) -> HttpRequest {
        self.list_request("/members", page)
    }

    pub fn parse_list_members(&self, response: HttpResponse) -> Result<Vec<Member>, ApiError> {
        parse_json(response)
    }

    /// `GET /members/{member_id}`.
    pub fn build_get_member(&self, member_id: i64) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("/members/{member_id}"))
    }

    /// `GET /members/email/{email}`.
    pub fn build_get_member_by_email(&self, email: &str) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("/members/email/{email}"))
    }

    /// Parses the response to either member lookup.
    pub fn parse_get_member(&self, response: HttpResponse) -> Result<Member, ApiError> {
        parse_json(response)
    }

    /// `POST /members/add` — add or update a single member.
    pub fn build_add_member(&self, input: &CreateMember) -> Result<HttpRequest, ApiError> {
        self.request_with_body(HttpMethod::Post, "/members/add", input)
    }

    pub fn parse_add_member(&self, response: HttpResponse) -> Result<AddMemberResult, ApiError> {
        parse_json(response)
    }

    /// `PUT /members/email/optout/{email}` — opt the member out of future
    /// mailings. The service answers with a bare boolean.
    pub fn build_opt_out_member(&self, email: &str) -> HttpRequest {
        self.request(HttpMethod::Put, &format!("/members/email/optout/{email}"))
    }

    pub fn parse_opt_out_member(&self, response: HttpResponse) -> Result<bool, ApiError> {
        parse_json(response)
    }

    /// `DELETE /members/{member_id}`.
    pub fn build_delete_member(&self, member_id: i64) -> HttpRequest {
        self.request(HttpMethod::Delete, &format!("/members/{member_id}"))
    }

    pub fn parse_delete_member(&self, response: HttpResponse) -> Result<bool, ApiError> {
        parse_json(response)
    }

    // -- Groups -------------------------------------------------------------

    /// `GET /groups`.
    pub fn build_list_groups(&self, page: Option<Page>) -> HttpRequest {
        self.list_request("/groups", page)
    }

    pub fn parse_list_groups(&self, response: HttpResponse) -> Result<Vec<Group>, ApiError> {
        parse_json(response)
    }

    /// `POST /groups` — create one or more groups in a single call. The
    /// payload nests the list under a `groups` key and the service echoes
    /// back the created groups.
    pub fn build_create_groups(&self, groups: &[CreateGroup]) -> Result<HttpRequest, ApiError> {
        let body = serde_json::json!({ "groups": groups });
        self.request_with_body(HttpMethod::Post, "/groups", &body)
    }

    pub fn parse_create_groups(&self, response: HttpResponse) -> Result<Vec<Group>, ApiError> {
        parse_json(response)
    }

    /// `DELETE /groups/{group_id}`.
    pub fn build_delete_group(&self, group_id: i64) -> HttpRequest {
        self.request(HttpMethod::Delete, &format!("/groups/{group_id}"))
    }

    pub fn parse_delete_group(&self, response: HttpResponse) -> Result<bool, ApiError> {
        parse_json(response)
    }

    /// `GET /groups/{group_id}/members`.
    pub fn build_list_group_members(&self, group_id: i64, page: Option<Page>) -> HttpRequest {
        self.list_request(&format!("/groups/{group_id}/members"), page)
    }

    pub fn parse_list_group_members(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<Member>, ApiError> {
        parse_json(response)
    }

    /// `PUT /groups/{group_id}/members` — copy the given members into the
    /// group. The service answers with the ids actually added.
    pub fn build_add_members_to_group(
        &self,
        group_id: i64,
        member_ids: &[i64],
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::json!({ "member_ids": member_ids });
        self.request_with_body(HttpMethod::Put, &format!("/groups/{group_id}/members"), &body)
    }

    pub fn parse_add_members_to_group(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<i64>, ApiError> {
        parse_json(response)
    }

    // -- Searches -----------------------------------------------------------

    /// `GET /searches`.
    pub fn build_list_searches(&self, page: Option<Page>) -> HttpRequest {
        self.list_request("/searches", page)
    }

    pub fn parse_list_searches(&self, response: HttpResponse) -> Result<Vec<Search>, ApiError> {
        parse_json(response)
    }

    /// `GET /searches/{search_id}`.
    pub fn build_get_search(&self, search_id: i64) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("/searches/{search_id}"))
    }

    pub fn parse_get_search(&self, response: HttpResponse) -> Result<Search, ApiError> {
        parse_json(response)
    }

    /// `POST /searches` — save a search. `input.criteria` is the serialized
    /// expression from [`crate::Query::to_value`]; the service answers with
    /// the new search id as a bare number.
    pub fn build_create_search(&self, input: &CreateSearch) -> Result<HttpRequest, ApiError> {
        self.request_with_body(HttpMethod::Post, "/searches", input)
    }

    pub fn parse_create_search(&self, response: HttpResponse) -> Result<i64, ApiError> {
        parse_json(response)
    }

    /// `PUT /searches/{search_id}`.
    pub fn build_update_search(
        &self,
        search_id: i64,
        input: &UpdateSearch,
    ) -> Result<HttpRequest, ApiError> {
        self.request_with_body(HttpMethod::Put, &format!("/searches/{search_id}"), input)
    }

    pub fn parse_update_search(&self, response: HttpResponse) -> Result<bool, ApiError> {
        parse_json(response)
    }

    /// `DELETE /searches/{search_id}`.
    pub fn build_delete_search(&self, search_id: i64) -> HttpRequest {
        self.request(HttpMethod::Delete, &format!("/searches/{search_id}"))
    }

    pub fn parse_delete_search(&self, response: HttpResponse) -> Result<bool, ApiError> {
        parse_json(response)
    }

    /// `GET /searches/{search_id}/members` — members matching the search.
    pub fn build_list_search_members(&self, search_id: i64, page: Option<Page>) -> HttpRequest {
        self.list_request(&format!("/searches/{search_id}/members"), page)
    }

    pub fn parse_list_search_members(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<Member>, ApiError> {
        parse_json(response)
    }

    // -- Webhooks -----------------------------------------------------------

    /// `GET /webhooks`.
    pub fn build_list_webhooks(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/webhooks")
    }

    pub fn parse_list_webhooks(&self, response: HttpResponse) -> Result<Vec<Webhook>, ApiError> {
        parse_json(response)
    }

    /// `POST /webhooks` — register a webhook; answers with the new id.
    pub fn build_create_webhook(&self, input: &CreateWebhook) -> Result<HttpRequest, ApiError> {
        self.request_with_body(HttpMethod::Post, "/webhooks", input)
    }

    pub fn parse_create_webhook(&self, response: HttpResponse) -> Result<i64, ApiError> {
        parse_json(response)
    }

    /// `DELETE /webhooks/{webhook_id}`.
    pub fn build_delete_webhook(&self, webhook_id: i64) -> HttpRequest {
        self.request(HttpMethod::Delete, &format!("/webhooks/{webhook_id}"))
    }

    pub fn parse_delete_webhook(&self, response: HttpResponse) -> Result<bool, ApiError> {
        parse_json(response)
    }

    /// `DELETE /webhooks` — remove every registered webhook.
    pub fn build_delete_all_webhooks(&self) -> HttpRequest {
        self.request(HttpMethod::Delete, "/webhooks")
    }

    pub fn parse_delete_all_webhooks(&self, response: HttpResponse) -> Result<bool, ApiError> {
        parse_json(response)
    }
}

/// Map non-success status codes to the appropriate `ApiError` variant, then
/// deserialize the body. The remote service answers every successful call
/// with 200.
fn parse_json<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    match response.status {
        200 => Ok(()),
        404 => Err(ApiError::NotFound),
        400 => Err(ApiError::BadRequest {
            body: response.body.clone(),
        }),
        status => Err(ApiError::HttpError {
            status,
            body: response.body.clone(),
        }),
    }
}
