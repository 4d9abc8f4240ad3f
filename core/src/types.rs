//! Resource DTOs for the Emma audience API.
//!
//! # Design
//! The remote service returns loosely-shaped JSON records; these types pin
//! down the fields the client relies on and collect everything else into
//! explicit extra-field bags (`Member::fields`) instead of duck-typed maps.
//! Status and type enumerations use the API's single-letter wire codes via
//! serde renames, so an unknown code surfaces as a deserialization error
//! rather than a silently-wrong string.
//!
//! Timestamps stay in the API's string form; callers that need real date
//! arithmetic can parse them at the edge.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Audience member status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberStatus {
    #[serde(rename = "a")]
    Active,
    #[serde(rename = "e")]
    Error,
    #[serde(rename = "f")]
    Forwarded,
    #[serde(rename = "o")]
    OptOut,
}

/// Group visibility/type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupType {
    #[serde(rename = "g")]
    Regular,
    #[serde(rename = "t")]
    Test,
    #[serde(rename = "h")]
    Hidden,
}

/// HTTP method a webhook fires with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WebhookMethod {
    #[serde(rename = "GET")]
    Get,
    #[serde(rename = "POST")]
    Post,
}

/// A single audience member.
///
/// `fields` holds the account's custom member fields (`member_field:*`
/// namespace in search criteria) exactly as the API returns them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Member {
    pub member_id: i64,
    pub email: String,
    #[serde(rename = "member_status_id")]
    pub status: MemberStatus,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub fields: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_since: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<String>,
}

/// Request payload for adding a single member (`POST /members/add`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMember {
    pub email: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub fields: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub group_ids: Vec<i64>,
}

/// Result of adding a member: the id and the status it landed in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AddMemberResult {
    pub member_id: i64,
    pub status: MemberStatus,
}

/// An audience group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Group {
    pub member_group_id: i64,
    pub group_name: String,
    pub group_type: GroupType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<String>,
}

/// Request payload for one new group; `POST /groups` takes a list of these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGroup {
    pub group_name: String,
}

/// A saved audience search.
///
/// `criteria` is the nested-array expression produced by
/// [`crate::Query::to_value`], stored verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Search {
    pub search_id: i64,
    pub name: String,
    pub criteria: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<String>,
}

/// Request payload for creating a search (`POST /searches`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSearch {
    pub name: String,
    pub criteria: Value,
}

/// Request payload for updating a search. Only the fields present in the
/// JSON are applied; omitted fields remain unchanged on the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSearch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub criteria: Option<Value>,
}

/// A registered webhook.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Webhook {
    pub webhook_id: i64,
    pub url: String,
    pub event: String,
    pub method: WebhookMethod,
}

/// Request payload for registering a webhook (`POST /webhooks`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWebhook {
    pub url: String,
    pub event: String,
    pub method: WebhookMethod,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn member_status_uses_single_letter_codes() {
        assert_eq!(serde_json::to_value(MemberStatus::Active).unwrap(), json!("a"));
        assert_eq!(serde_json::to_value(MemberStatus::Error).unwrap(), json!("e"));
        assert_eq!(serde_json::to_value(MemberStatus::Forwarded).unwrap(), json!("f"));
        assert_eq!(serde_json::to_value(MemberStatus::OptOut).unwrap(), json!("o"));
    }

    #[test]
    fn member_status_rejects_unknown_code() {
        let result: Result<MemberStatus, _> = serde_json::from_value(json!("z"));
        assert!(result.is_err());
    }

    #[test]
    fn group_type_roundtrips_wire_codes() {
        for (variant, code) in [
            (GroupType::Regular, "g"),
            (GroupType::Test, "t"),
            (GroupType::Hidden, "h"),
        ] {
            assert_eq!(serde_json::to_value(variant).unwrap(), json!(code));
            let back: GroupType = serde_json::from_value(json!(code)).unwrap();
            assert_eq!(back, variant);
        }
    }

    #[test]
    fn member_collects_custom_fields_into_bag() {
        let member: Member = serde_json::from_value(json!({
            "member_id": 200,
            "email": "test@example.com",
            "member_status_id": "a",
            "fields": {"first_name": "Test", "favorite_number": 42},
            "member_since": "@D:2011-01-03T15:54:13"
        }))
        .unwrap();
        assert_eq!(member.member_id, 200);
        assert_eq!(member.status, MemberStatus::Active);
        assert_eq!(member.fields["first_name"], "Test");
        assert_eq!(member.fields["favorite_number"], 42);
        assert_eq!(member.member_since.as_deref(), Some("@D:2011-01-03T15:54:13"));
    }

    #[test]
    fn member_tolerates_missing_optional_fields() {
        let member: Member = serde_json::from_value(json!({
            "member_id": 201,
            "email": "bare@example.com",
            "member_status_id": "o"
        }))
        .unwrap();
        assert!(member.fields.is_empty());
        assert!(member.deleted_at.is_none());
    }

    #[test]
    fn create_member_omits_empty_collections() {
        let input = CreateMember {
            email: "new@example.com".to_string(),
            fields: Map::new(),
            group_ids: Vec::new(),
        };
        assert_eq!(
            serde_json::to_value(&input).unwrap(),
            json!({"email": "new@example.com"})
        );
    }

    #[test]
    fn create_search_embeds_criteria_verbatim() {
        let input = CreateSearch {
            name: "Test Search".to_string(),
            criteria: json!(["group", "eq", "Test Group"]),
        };
        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(value["criteria"], json!(["group", "eq", "Test Group"]));
    }

    #[test]
    fn update_search_omits_absent_fields() {
        let input = UpdateSearch {
            name: Some("Renamed".to_string()),
            criteria: None,
        };
        assert_eq!(
            serde_json::to_value(&input).unwrap(),
            json!({"name": "Renamed"})
        );
    }

    #[test]
    fn webhook_method_uses_uppercase_codes() {
        assert_eq!(serde_json::to_value(WebhookMethod::Post).unwrap(), json!("POST"));
        let back: WebhookMethod = serde_json::from_value(json!("GET")).unwrap();
        assert_eq!(back, WebhookMethod::Get);
    }
}
