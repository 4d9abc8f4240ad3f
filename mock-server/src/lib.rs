//! In-memory imitation of the Emma audience API, for integration tests.
//!
//! Mirrors the subset of the remote service the core client talks to:
//! account-scoped paths, `start`/`end` pagination on list endpoints,
//! bare-number responses for created search/webhook ids and bare booleans
//! for acknowledgements. Search criteria are stored verbatim but not
//! evaluated; a search's member listing returns the active members.

use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Member {
    pub member_id: i64,
    pub email: String,
    pub member_status_id: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

#[derive(Deserialize)]
pub struct AddMember {
    pub email: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
    #[serde(default)]
    pub group_ids: Vec<i64>,
}

#[derive(Clone, Debug)]
pub struct GroupRecord {
    pub member_group_id: i64,
    pub group_name: String,
    pub group_type: String,
    pub member_ids: BTreeSet<i64>,
}

impl GroupRecord {
    fn view(&self) -> Value {
        json!({
            "member_group_id": self.member_group_id,
            "group_name": self.group_name,
            "group_type": self.group_type,
            "active_count": self.member_ids.len(),
        })
    }
}

#[derive(Deserialize)]
pub struct CreateGroups {
    pub groups: Vec<GroupName>,
}

#[derive(Deserialize)]
pub struct GroupName {
    pub group_name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Search {
    pub search_id: i64,
    pub name: String,
    pub criteria: Value,
}

#[derive(Deserialize)]
pub struct CreateSearch {
    pub name: String,
    pub criteria: Value,
}

#[derive(Deserialize)]
pub struct UpdateSearch {
    pub name: Option<String>,
    pub criteria: Option<Value>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Webhook {
    pub webhook_id: i64,
    pub url: String,
    pub event: String,
    pub method: String,
}

#[derive(Deserialize)]
pub struct CreateWebhook {
    pub url: String,
    pub event: String,
    pub method: String,
}

#[derive(Default)]
pub struct Store {
    last_id: i64,
    members: HashMap<i64, Member>,
    groups: HashMap<i64, GroupRecord>,
    searches: HashMap<i64, Search>,
    webhooks: HashMap<i64, Webhook>,
}

impl Store {
    fn allocate_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

pub type Db = Arc<RwLock<Store>>;

/// `start`/`end` window read from the query string, as the real API does.
#[derive(Deserialize)]
struct Window {
    start: Option<usize>,
    end: Option<usize>,
}

impl Window {
    const PAGE_SIZE: usize = 500;

    fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        let start = self.start.unwrap_or(0);
        let end = self.end.unwrap_or(start + Self::PAGE_SIZE);
        items
            .into_iter()
            .skip(start)
            .take(end.saturating_sub(start))
            .collect()
    }
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/{account}/members", get(list_members))
        .route("/{account}/members/add", post(add_member))
        .route(
            "/{account}/members/{id}",
            get(get_member).delete(delete_member),
        )
        .route("/{account}/members/email/{email}", get(get_member_by_email))
        .route(
            "/{account}/members/email/optout/{email}",
            put(opt_out_member),
        )
        .route("/{account}/groups", get(list_groups).post(create_groups))
        .route("/{account}/groups/{id}", delete(delete_group))
        .route(
            "/{account}/groups/{id}/members",
            get(list_group_members).put(add_members_to_group),
        )
        .route("/{account}/searches", get(list_searches).post(create_search))
        .route(
            "/{account}/searches/{id}",
            get(get_search).put(update_search).delete(delete_search),
        )
        .route("/{account}/searches/{id}/members", get(list_search_members))
        .route(
            "/{account}/webhooks",
            get(list_webhooks)
                .post(create_webhook)
                .delete(delete_all_webhooks),
        )
        .route("/{account}/webhooks/{id}", delete(delete_webhook))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

// -- Members ----------------------------------------------------------------

async fn list_members(
    State(db): State<Db>,
    Query(window): Query<Window>,
) -> Json<Vec<Member>> {
    let store = db.read().await;
    let mut members: Vec<Member> = store.members.values().cloned().collect();
    members.sort_by_key(|m| m.member_id);
    Json(window.apply(members))
}

async fn add_member(State(db): State<Db>, Json(input): Json<AddMember>) -> Json<Value> {
    let mut store = db.write().await;
    let existing = store
        .members
        .values()
        .find(|m| m.email == input.email)
        .map(|m| m.member_id);

    let (member_id, status) = match existing {
        Some(id) => {
            let status = match store.members.get_mut(&id) {
                Some(member) => {
                    member.fields.extend(input.fields);
                    member.member_status_id.clone()
                }
                None => "a".to_string(),
            };
            (id, status)
        }
        None => {
            let id = store.allocate_id();
            store.members.insert(
                id,
                Member {
                    member_id: id,
                    email: input.email,
                    member_status_id: "a".to_string(),
                    fields: input.fields,
                },
            );
            (id, "a".to_string())
        }
    };

    for group_id in input.group_ids {
        if let Some(group) = store.groups.get_mut(&group_id) {
            group.member_ids.insert(member_id);
        }
    }

    Json(json!({ "member_id": member_id, "status": status }))
}

async fn get_member(
    State(db): State<Db>,
    Path((_, id)): Path<(String, i64)>,
) -> Result<Json<Member>, StatusCode> {
    let store = db.read().await;
    store
        .members
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn get_member_by_email(
    State(db): State<Db>,
    Path((_, email)): Path<(String, String)>,
) -> Result<Json<Member>, StatusCode> {
    let store = db.read().await;
    store
        .members
        .values()
        .find(|m| m.email == email)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn opt_out_member(
    State(db): State<Db>,
    Path((_, email)): Path<(String, String)>,
) -> Result<Json<bool>, StatusCode> {
    let mut store = db.write().await;
    let member = store
        .members
        .values_mut()
        .find(|m| m.email == email)
        .ok_or(StatusCode::NOT_FOUND)?;
    member.member_status_id = "o".to_string();
    Ok(Json(true))
}

async fn delete_member(
    State(db): State<Db>,
    Path((_, id)): Path<(String, i64)>,
) -> Result<Json<bool>, StatusCode> {
    let mut store = db.write().await;
    if store.members.remove(&id).is_none() {
        return Err(StatusCode::NOT_FOUND);
    }
    for group in store.groups.values_mut() {
        group.member_ids.remove(&id);
    }
    Ok(Json(true))
}

// -- Groups -----------------------------------------------------------------

async fn list_groups(State(db): State<Db>, Query(window): Query<Window>) -> Json<Vec<Value>> {
    let store = db.read().await;
    let mut groups: Vec<&GroupRecord> = store.groups.values().collect();
    groups.sort_by_key(|g| g.member_group_id);
    let views: Vec<Value> = groups.iter().map(|g| g.view()).collect();
    Json(window.apply(views))
}

async fn create_groups(
    State(db): State<Db>,
    Json(input): Json<CreateGroups>,
) -> Json<Vec<Value>> {
    let mut store = db.write().await;
    let mut created = Vec::with_capacity(input.groups.len());
    for group in input.groups {
        let id = store.allocate_id();
        let record = GroupRecord {
            member_group_id: id,
            group_name: group.group_name,
            group_type: "g".to_string(),
            member_ids: BTreeSet::new(),
        };
        created.push(record.view());
        store.groups.insert(id, record);
    }
    Json(created)
}

async fn delete_group(
    State(db): State<Db>,
    Path((_, id)): Path<(String, i64)>,
) -> Result<Json<bool>, StatusCode> {
    let mut store = db.write().await;
    store
        .groups
        .remove(&id)
        .map(|_| Json(true))
        .ok_or(StatusCode::NOT_FOUND)
}

async fn list_group_members(
    State(db): State<Db>,
    Path((_, id)): Path<(String, i64)>,
    Query(window): Query<Window>,
) -> Result<Json<Vec<Member>>, StatusCode> {
    let store = db.read().await;
    let group = store.groups.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    let members: Vec<Member> = group
        .member_ids
        .iter()
        .filter_map(|mid| store.members.get(mid))
        .cloned()
        .collect();
    Ok(Json(window.apply(members)))
}

#[derive(Deserialize)]
struct MemberIds {
    member_ids: Vec<i64>,
}

async fn add_members_to_group(
    State(db): State<Db>,
    Path((_, id)): Path<(String, i64)>,
    Json(input): Json<MemberIds>,
) -> Result<Json<Vec<i64>>, StatusCode> {
    let mut store = db.write().await;
    let known: Vec<i64> = input
        .member_ids
        .into_iter()
        .filter(|mid| store.members.contains_key(mid))
        .collect();
    let group = store.groups.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    let mut added = Vec::new();
    for mid in known {
        if group.member_ids.insert(mid) {
            added.push(mid);
        }
    }
    Ok(Json(added))
}

// -- Searches ---------------------------------------------------------------

async fn list_searches(State(db): State<Db>, Query(window): Query<Window>) -> Json<Vec<Search>> {
    let store = db.read().await;
    let mut searches: Vec<Search> = store.searches.values().cloned().collect();
    searches.sort_by_key(|s| s.search_id);
    Json(window.apply(searches))
}

async fn get_search(
    State(db): State<Db>,
    Path((_, id)): Path<(String, i64)>,
) -> Result<Json<Search>, StatusCode> {
    let store = db.read().await;
    store
        .searches
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn create_search(State(db): State<Db>, Json(input): Json<CreateSearch>) -> Json<i64> {
    let mut store = db.write().await;
    let id = store.allocate_id();
    store.searches.insert(
        id,
        Search {
            search_id: id,
            name: input.name,
            criteria: input.criteria,
        },
    );
    // The real service answers with the bare id number.
    Json(id)
}

async fn update_search(
    State(db): State<Db>,
    Path((_, id)): Path<(String, i64)>,
    Json(input): Json<UpdateSearch>,
) -> Result<Json<bool>, StatusCode> {
    let mut store = db.write().await;
    let search = store.searches.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if let Some(name) = input.name {
        search.name = name;
    }
    if let Some(criteria) = input.criteria {
        search.criteria = criteria;
    }
    Ok(Json(true))
}

async fn delete_search(
    State(db): State<Db>,
    Path((_, id)): Path<(String, i64)>,
) -> Result<Json<bool>, StatusCode> {
    let mut store = db.write().await;
    store
        .searches
        .remove(&id)
        .map(|_| Json(true))
        .ok_or(StatusCode::NOT_FOUND)
}

async fn list_search_members(
    State(db): State<Db>,
    Path((_, id)): Path<(String, i64)>,
    Query(window): Query<Window>,
) -> Result<Json<Vec<Member>>, StatusCode> {
    let store = db.read().await;
    if !store.searches.contains_key(&id) {
        return Err(StatusCode::NOT_FOUND);
    }
    // Criteria are not evaluated; active members stand in for a real match.
    let mut members: Vec<Member> = store
        .members
        .values()
        .filter(|m| m.member_status_id == "a")
        .cloned()
        .collect();
    members.sort_by_key(|m| m.member_id);
    Ok(Json(window.apply(members)))
}

// -- Webhooks ---------------------------------------------------------------

async fn list_webhooks(State(db): State<Db>) -> Json<Vec<Webhook>> {
    let store = db.read().await;
    let mut webhooks: Vec<Webhook> = store.webhooks.values().cloned().collect();
    webhooks.sort_by_key(|w| w.webhook_id);
    Json(webhooks)
}

async fn create_webhook(State(db): State<Db>, Json(input): Json<CreateWebhook>) -> Json<i64> {
    let mut store = db.write().await;
    let id = store.allocate_id();
    store.webhooks.insert(
        id,
        Webhook {
            webhook_id: id,
            url: input.url,
            event: input.event,
            method: input.method,
        },
    );
    Json(id)
}

async fn delete_webhook(
    State(db): State<Db>,
    Path((_, id)): Path<(String, i64)>,
) -> Result<Json<bool>, StatusCode> {
    let mut store = db.write().await;
    store
        .webhooks
        .remove(&id)
        .map(|_| Json(true))
        .ok_or(StatusCode::NOT_FOUND)
}

async fn delete_all_webhooks(State(db): State<Db>) -> Json<bool> {
    let mut store = db.write().await;
    store.webhooks.clear();
    Json(true)
}
