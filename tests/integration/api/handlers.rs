// HTTP-level integration tests for the group endpoints

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use contacts_api::api::{create_router, AppState};
use contacts_api::auth::auth_middleware::AuthState;
use contacts_api::config::Config;
use contacts_api::core::groups::GroupResource;
use contacts_api::core::models::{Contact, Group};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tower::ServiceExt;

use crate::common::{contact, group, MockAccountStore, MockContactStore, MockGroupStore};

const ALICE_KEY: &str = "alice-key";
const BOB_KEY: &str = "bob-key";

struct TestContext {
    router: Router,
    group_store: Arc<MockGroupStore>,
    contact_store: Arc<MockContactStore>,
}

/// Build a router over mock stores. Alice is account 1, Bob is account 2.
fn test_context(groups: Vec<Group>, contacts: Vec<Contact>) -> TestContext {
    let group_store = Arc::new(MockGroupStore::with_groups(groups));
    let contact_store = Arc::new(MockContactStore::with_contacts(contacts));
    let account_store = Arc::new(
        MockAccountStore::default()
            .with_key(ALICE_KEY, 1)
            .with_key(BOB_KEY, 2),
    );

    let resource = GroupResource::new(group_store.clone(), contact_store.clone());

    let app_state = AppState {
        groups: resource,
        group_store: group_store.clone(),
        config: Arc::new(Config::test_config()),
    };
    let auth_state = Arc::new(AuthState {
        account_store,
    });

    TestContext {
        router: create_router(app_state, Some(auth_state)),
        group_store,
        contact_store,
    }
}

fn get(uri: &str, api_key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(key) = api_key {
        builder = builder.header("X-API-Key", key);
    }
    builder.body(Body::empty()).unwrap()
}

fn post_json(uri: &str, api_key: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("X-API-Key", api_key)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_missing_api_key_returns_401() {
    let ctx = test_context(vec![], vec![]);

    let response = ctx.router.oneshot(get("/group/", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Missing API key");
}

#[tokio::test]
async fn test_unknown_api_key_returns_401() {
    let ctx = test_context(vec![], vec![]);

    let response = ctx
        .router
        .oneshot(get("/group/", Some("not-a-real-key")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Invalid API key");
}

#[tokio::test]
async fn test_health_requires_no_auth() {
    let ctx = test_context(vec![], vec![]);

    let response = ctx.router.oneshot(get("/health", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_create_group_returns_201_with_caller_as_owner() {
    let ctx = test_context(vec![], vec![]);

    let response = ctx
        .router
        .oneshot(post_json("/group/", ALICE_KEY, r#"{"name":"Friends"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["owner_id"], 1);
    assert_eq!(body["name"], "Friends");
    assert!(body["id"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn test_create_group_ignores_owner_in_payload() {
    let ctx = test_context(vec![], vec![]);

    let response = ctx
        .router
        .oneshot(post_json(
            "/group/",
            ALICE_KEY,
            r#"{"name":"Friends","owner_id":99}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["owner_id"], 1, "Owner must come from the caller identity");
}

#[tokio::test]
async fn test_create_group_empty_name_returns_400_without_insert() {
    let ctx = test_context(vec![], vec![]);

    let response = ctx
        .router
        .clone()
        .oneshot(post_json("/group/", ALICE_KEY, r#"{"name":"  "}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(
        ctx.group_store.groups.lock().unwrap().is_empty(),
        "Validation failure must not reach the store"
    );
}

#[tokio::test]
async fn test_create_group_malformed_json_returns_400() {
    let ctx = test_context(vec![], vec![]);

    let response = ctx
        .router
        .oneshot(post_json("/group/", ALICE_KEY, "{not json"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_returns_only_owned_groups() {
    let ctx = test_context(
        vec![
            group(1, 1, "Mine"),
            group(2, 2, "Theirs"),
            group(3, 1, "Also mine"),
        ],
        vec![],
    );

    let response = ctx
        .router
        .oneshot(get("/group/", Some(ALICE_KEY)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let groups = body.as_array().unwrap();
    assert_eq!(groups.len(), 2);
    assert!(groups.iter().all(|g| g["owner_id"] == 1));
}

#[tokio::test]
async fn test_list_is_empty_array_for_caller_without_groups() {
    let ctx = test_context(vec![group(1, 1, "Mine")], vec![]);

    let response = ctx
        .router
        .oneshot(get("/group/", Some(BOB_KEY)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body, serde_json::json!([]));
}

#[tokio::test]
async fn test_detail_returns_group_with_contacts_for_owner() {
    let ctx = test_context(
        vec![group(7, 1, "Friends")],
        vec![
            contact(1, 7, "Ada"),
            contact(2, 7, "Grace"),
            contact(3, 8, "Edsger"),
        ],
    );

    let response = ctx
        .router
        .oneshot(get("/group/7/", Some(ALICE_KEY)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["id"], 7);
    assert_eq!(body["owner_id"], 1);
    assert_eq!(body["name"], "Friends");
    let contacts = body["contacts"].as_array().unwrap();
    assert_eq!(contacts.len(), 2);
    assert!(contacts.iter().all(|c| c["group_id"] == 7));
}

#[tokio::test]
async fn test_detail_returns_403_for_non_owner_without_contact_fetch() {
    let ctx = test_context(
        vec![group(7, 1, "Friends")],
        vec![contact(1, 7, "Ada")],
    );

    let response = ctx
        .router
        .clone()
        .oneshot(get("/group/7/", Some(BOB_KEY)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        ctx.contact_store.list_by_group_calls.load(Ordering::SeqCst),
        0,
        "Contacts must not be fetched for a non-owner"
    );

    // Nothing about the group may leak into the error body
    let body = json_body(response).await;
    assert_eq!(body["error"], "Not the owner of this group");
    assert!(body.get("name").is_none());
    assert!(body.get("contacts").is_none());
}

#[tokio::test]
async fn test_detail_non_numeric_id_returns_400_without_store_calls() {
    let ctx = test_context(vec![group(7, 1, "Friends")], vec![]);

    let response = ctx
        .router
        .clone()
        .oneshot(get("/group/abc/", Some(ALICE_KEY)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(ctx.group_store.get_by_id_calls.load(Ordering::SeqCst), 0);
    assert_eq!(ctx.contact_store.list_by_group_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_detail_absent_group_returns_404() {
    let ctx = test_context(vec![], vec![]);

    let response = ctx
        .router
        .oneshot(get("/group/42/", Some(ALICE_KEY)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["error"], "group not found");
}

#[tokio::test]
async fn test_store_failure_returns_500_without_leaking_detail() {
    let group_store = Arc::new(MockGroupStore {
        get_should_fail: true,
        ..MockGroupStore::default()
    });
    let contact_store = Arc::new(MockContactStore::default());
    let account_store = Arc::new(MockAccountStore::default().with_key(ALICE_KEY, 1));

    let resource = GroupResource::new(group_store.clone(), contact_store.clone());
    let app_state = AppState {
        groups: resource,
        group_store,
        config: Arc::new(Config::test_config()),
    };
    let auth_state = Arc::new(AuthState { account_store });
    let router = create_router(app_state, Some(auth_state));

    let response = router
        .oneshot(get("/group/7/", Some(ALICE_KEY)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Internal error");
}

/// The end-to-end scenario: Alice creates a group, Bob is refused, Alice
/// reads it back with contacts.
#[tokio::test]
async fn test_create_then_fetch_scenario() {
    let ctx = test_context(vec![], vec![]);

    let created = ctx
        .router
        .clone()
        .oneshot(post_json("/group/", ALICE_KEY, r#"{"name":"Friends"}"#))
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);
    let created_body = json_body(created).await;
    let group_id = created_body["id"].as_i64().unwrap();
    assert_eq!(created_body["owner_id"], 1);
    assert_eq!(created_body["name"], "Friends");

    let uri = format!("/group/{}/", group_id);

    let as_bob = ctx
        .router
        .clone()
        .oneshot(get(&uri, Some(BOB_KEY)))
        .await
        .unwrap();
    assert_eq!(as_bob.status(), StatusCode::FORBIDDEN);

    let as_alice = ctx.router.clone().oneshot(get(&uri, Some(ALICE_KEY))).await.unwrap();
    assert_eq!(as_alice.status(), StatusCode::OK);
    let detail = json_body(as_alice).await;
    assert_eq!(detail["id"], group_id);
    assert_eq!(detail["owner_id"], 1);
    assert_eq!(detail["name"], "Friends");
    assert!(detail["contacts"].as_array().unwrap().is_empty());
}
