use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Member, Search, Webhook};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn get_request(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

// --- members ---

#[tokio::test]
async fn list_members_empty() {
    let app = app();
    let resp = app.oneshot(get_request("/1234/members")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let members: Vec<Member> = body_json(resp).await;
    assert!(members.is_empty());
}

#[tokio::test]
async fn add_member_returns_id_and_status() {
    let app = app();
    let resp = app
        .oneshot(json_request(
            "POST",
            "/1234/members/add",
            r#"{"email":"test@example.com","fields":{"first_name":"Test"}}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let result: serde_json::Value = body_json(resp).await;
    assert_eq!(result["member_id"], 1);
    assert_eq!(result["status"], "a");
}

#[tokio::test]
async fn get_member_not_found() {
    let app = app();
    let resp = app.oneshot(get_request("/1234/members/999")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn opt_out_unknown_email_not_found() {
    let app = app();
    let resp = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/1234/members/email/optout/missing@example.com")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn member_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // add
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/1234/members/add",
            r#"{"email":"test@example.com"}"#,
        ))
        .await
        .unwrap();
    let result: serde_json::Value = body_json(resp).await;
    let id = result["member_id"].as_i64().unwrap();

    // get by email
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request("/1234/members/email/test@example.com"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let member: Member = body_json(resp).await;
    assert_eq!(member.member_id, id);
    assert_eq!(member.member_status_id, "a");

    // opt out flips status
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .method("PUT")
                .uri("/1234/members/email/optout/test@example.com")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_json::<bool>(resp).await);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request(&format!("/1234/members/{id}")))
        .await
        .unwrap();
    let member: Member = body_json(resp).await;
    assert_eq!(member.member_status_id, "o");

    // delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .method("DELETE")
                .uri(&format!("/1234/members/{id}"))
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_json::<bool>(resp).await);

    // get after delete — 404
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request(&format!("/1234/members/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_members_honors_start_end_window() {
    use tower::Service;

    let mut app = app().into_service();

    for i in 0..5 {
        ServiceExt::ready(&mut app)
            .await
            .unwrap()
            .call(json_request(
                "POST",
                "/1234/members/add",
                &format!(r#"{{"email":"member{i}@example.com"}}"#),
            ))
            .await
            .unwrap();
    }

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request("/1234/members?start=2&end=4"))
        .await
        .unwrap();
    let members: Vec<Member> = body_json(resp).await;
    assert_eq!(members.len(), 2);
    assert_eq!(members[0].email, "member2@example.com");
}

// --- groups ---

#[tokio::test]
async fn create_groups_assigns_ids() {
    let app = app();
    let resp = app
        .oneshot(json_request(
            "POST",
            "/1234/groups",
            r#"{"groups":[{"group_name":"Test Group"},{"group_name":"Other Group"}]}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let groups: Vec<serde_json::Value> = body_json(resp).await;
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0]["group_name"], "Test Group");
    assert_eq!(groups[0]["group_type"], "g");
    assert_eq!(groups[0]["active_count"], 0);
}

#[tokio::test]
async fn group_membership_roundtrip() {
    use tower::Service;

    let mut app = app().into_service();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/1234/members/add",
            r#"{"email":"grouped@example.com"}"#,
        ))
        .await
        .unwrap();
    let result: serde_json::Value = body_json(resp).await;
    let member_id = result["member_id"].as_i64().unwrap();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/1234/groups",
            r#"{"groups":[{"group_name":"Test Group"}]}"#,
        ))
        .await
        .unwrap();
    let groups: Vec<serde_json::Value> = body_json(resp).await;
    let group_id = groups[0]["member_group_id"].as_i64().unwrap();

    // add member; unknown ids are dropped, duplicates are not re-added
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "PUT",
            &format!("/1234/groups/{group_id}/members"),
            &format!(r#"{{"member_ids":[{member_id},999]}}"#),
        ))
        .await
        .unwrap();
    let added: Vec<i64> = body_json(resp).await;
    assert_eq!(added, vec![member_id]);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request(&format!("/1234/groups/{group_id}/members")))
        .await
        .unwrap();
    let members: Vec<Member> = body_json(resp).await;
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].member_id, member_id);
}

// --- searches ---

#[tokio::test]
async fn create_search_returns_bare_id() {
    let app = app();
    let resp = app
        .oneshot(json_request(
            "POST",
            "/1234/searches",
            r#"{"name":"Test Search","criteria":["group","eq","Test Group"]}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let id: i64 = body_json(resp).await;
    assert_eq!(id, 1);
}

#[tokio::test]
async fn search_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/1234/searches",
            r#"{"name":"Test Search","criteria":["member_field:foo","eq",1]}"#,
        ))
        .await
        .unwrap();
    let id: i64 = body_json(resp).await;

    // stored criteria come back verbatim
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request(&format!("/1234/searches/{id}")))
        .await
        .unwrap();
    let search: Search = body_json(resp).await;
    assert_eq!(search.name, "Test Search");
    assert_eq!(
        search.criteria,
        serde_json::json!(["member_field:foo", "eq", 1])
    );

    // partial update: rename only
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "PUT",
            &format!("/1234/searches/{id}"),
            r#"{"name":"Renamed Search"}"#,
        ))
        .await
        .unwrap();
    assert!(body_json::<bool>(resp).await);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request(&format!("/1234/searches/{id}")))
        .await
        .unwrap();
    let search: Search = body_json(resp).await;
    assert_eq!(search.name, "Renamed Search");
    assert_eq!(
        search.criteria,
        serde_json::json!(["member_field:foo", "eq", 1])
    );

    // delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .method("DELETE")
                .uri(&format!("/1234/searches/{id}"))
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(body_json::<bool>(resp).await);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request(&format!("/1234/searches/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn search_members_lists_active_members() {
    use tower::Service;

    let mut app = app().into_service();

    for body in [
        r#"{"email":"active@example.com"}"#,
        r#"{"email":"optout@example.com"}"#,
    ] {
        ServiceExt::ready(&mut app)
            .await
            .unwrap()
            .call(json_request("POST", "/1234/members/add", body))
            .await
            .unwrap();
    }
    ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .method("PUT")
                .uri("/1234/members/email/optout/optout@example.com")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/1234/searches",
            r#"{"name":"Active","criteria":["member_status_id","eq","a"]}"#,
        ))
        .await
        .unwrap();
    let id: i64 = body_json(resp).await;

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request(&format!("/1234/searches/{id}/members")))
        .await
        .unwrap();
    let members: Vec<Member> = body_json(resp).await;
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].email, "active@example.com");
}

// --- webhooks ---

#[tokio::test]
async fn webhook_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/1234/webhooks",
            r#"{"url":"http://example.com/hook","event":"mailing_finish","method":"POST"}"#,
        ))
        .await
        .unwrap();
    let id: i64 = body_json(resp).await;

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request("/1234/webhooks"))
        .await
        .unwrap();
    let webhooks: Vec<Webhook> = body_json(resp).await;
    assert_eq!(webhooks.len(), 1);
    assert_eq!(webhooks[0].webhook_id, id);
    assert_eq!(webhooks[0].method, "POST");

    // delete all
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .method("DELETE")
                .uri("/1234/webhooks")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(body_json::<bool>(resp).await);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request("/1234/webhooks"))
        .await
        .unwrap();
    let webhooks: Vec<Webhook> = body_json(resp).await;
    assert!(webhooks.is_empty());
}
