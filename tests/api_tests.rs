use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use userdesk::config::Config;

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;

    let state = userdesk::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    userdesk::api::router(state).await
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("Content-Type", mime::APPLICATION_JSON.as_ref());
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn create_user(app: &Router, username: &str, email: &str) -> Value {
    let (status, body) = send(
        app,
        "POST",
        "/api/v1/users",
        Some(json!({
            "username": username,
            "email": email,
            "password": "secret123",
            "full_name": format!("{username} tester"),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"].clone()
}

#[tokio::test]
async fn test_root_and_health() {
    let app = spawn_app().await;

    let (status, body) = send(&app, "GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["version"], env!("CARGO_PKG_VERSION"));

    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["database"], true);
}

#[tokio::test]
async fn test_create_then_get() {
    let app = spawn_app().await;

    let created = create_user(&app, "alice", "Alice@Example.com").await;
    assert_eq!(created["username"], "alice");
    assert_eq!(created["email"], "alice@example.com");
    assert_eq!(created["is_active"], true);
    assert!(created.get("password").is_none());
    assert!(created.get("password_hash").is_none());

    let id = created["id"].as_i64().unwrap();
    let (status, body) = send(&app, "GET", &format!("/api/v1/users/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"], created);
}

#[tokio::test]
async fn test_get_missing_user() {
    let app = spawn_app().await;

    let (status, body) = send(&app, "GET", "/api/v1/users/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "User not found");

    let (status, _) = send(&app, "GET", "/api/v1/users/0", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_duplicates_conflict() {
    let app = spawn_app().await;
    create_user(&app, "alice", "alice@example.com").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/users",
        Some(json!({"username": "alice", "email": "new@example.com", "password": "secret123"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Username already exists");

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/users",
        Some(json!({"username": "bob", "email": "ALICE@example.com", "password": "secret123"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Email already exists");
}

#[tokio::test]
async fn test_create_rejects_invalid_input() {
    let app = spawn_app().await;

    let cases = [
        json!({"username": "al", "email": "al@example.com", "password": "secret123"}),
        json!({"username": "alice", "email": "not-an-email", "password": "secret123"}),
        json!({"username": "alice", "email": "alice@example.com", "password": "123"}),
    ];

    for payload in cases {
        let (status, body) = send(&app, "POST", "/api/v1/users", Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(body["success"], false);
    }
}

#[tokio::test]
async fn test_partial_update() {
    let app = spawn_app().await;
    let created = create_user(&app, "alice", "alice@example.com").await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/v1/users/{id}"),
        Some(json!({"full_name": "Alice Liddell"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let updated = &body["data"];
    assert_eq!(updated["full_name"], "Alice Liddell");
    assert_eq!(updated["username"], created["username"]);
    assert_eq!(updated["email"], created["email"]);
    assert_eq!(updated["is_active"], created["is_active"]);
    assert_eq!(updated["created_at"], created["created_at"]);

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/v1/users/{id}"),
        Some(json!({"is_active": false})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["is_active"], false);
    assert_eq!(body["data"]["full_name"], "Alice Liddell");
}

#[tokio::test]
async fn test_update_conflicts_exclude_self() {
    let app = spawn_app().await;
    let alice = create_user(&app, "alice", "alice@example.com").await;
    create_user(&app, "bob", "bob@example.com").await;
    let id = alice["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/v1/users/{id}"),
        Some(json!({"username": "alice", "email": "alice@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/v1/users/{id}"),
        Some(json!({"username": "bob"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Username already exists");

    let (status, _) = send(
        &app,
        "PUT",
        "/api/v1/users/999",
        Some(json!({"full_name": "Nobody"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_then_get() {
    let app = spawn_app().await;
    let created = create_user(&app, "alice", "alice@example.com").await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = send(&app, "DELETE", &format!("/api/v1/users/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["message"], "User deleted successfully");
    assert_eq!(body["data"]["deleted_user_id"], id);

    let (status, _) = send(&app, "GET", &format!("/api/v1/users/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", &format!("/api/v1/users/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_pagination_and_search() {
    let app = spawn_app().await;
    for name in ["alice", "bob", "carol", "dave", "erin"] {
        create_user(&app, name, &format!("{name}@example.com")).await;
    }

    let (status, body) = send(&app, "GET", "/api/v1/users", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 5);
    assert_eq!(body["data"]["page"], 1);
    assert_eq!(body["data"]["per_page"], 100);

    let (status, body) = send(&app, "GET", "/api/v1/users?skip=2&limit=2", None).await;
    assert_eq!(status, StatusCode::OK);
    let page = &body["data"];
    assert_eq!(page["total"], 5);
    assert_eq!(page["page"], 2);
    assert_eq!(page["per_page"], 2);
    let names: Vec<&str> = page["users"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["username"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["carol", "dave"]);

    let (status, body) = send(&app, "GET", "/api/v1/users?search=ar", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["users"][0]["username"], "carol");

    let (status, _) = send(&app, "GET", "/api/v1/users?limit=0", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "GET", "/api/v1/users?limit=1001", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_rejects_out_of_range_skip() {
    let app = spawn_app().await;
    create_user(&app, "alice", "alice@example.com").await;

    for skip in ["9223372036854775808", "18446744073709551615"] {
        let (status, body) =
            send(&app, "GET", &format!("/api/v1/users?skip={skip}&limit=1"), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(body["success"], false);
    }

    let (status, body) = send(
        &app,
        "GET",
        "/api/v1/users?skip=9223372036854775807&limit=1",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["users"], serde_json::json!([]));
    assert_eq!(body["data"]["page"], 9_223_372_036_854_775_808_u64);
}

#[tokio::test]
async fn test_empty_full_name_clears_it() {
    let app = spawn_app().await;
    let created = create_user(&app, "alice", "alice@example.com").await;
    assert_eq!(created["full_name"], "alice tester");
    let id = created["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/v1/users/{id}"),
        Some(json!({"full_name": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["full_name"].is_null());

    let (_, body) = send(&app, "GET", &format!("/api/v1/users/{id}"), None).await;
    assert!(body["data"]["full_name"].is_null());
}

#[tokio::test]
async fn test_malformed_requests_use_error_envelope() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/users")
                .header("Content-Type", mime::APPLICATION_JSON.as_ref())
                .body(Body::from(json!({"username": "alice"}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response.headers()["content-type"],
        mime::APPLICATION_JSON.as_ref()
    );
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("email"));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/users")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let (status, body) = send(&app, "GET", "/api/v1/users/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, body) = send(&app, "GET", "/api/v1/users?limit=many", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/")
                .header("x-request-id", "req-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()["x-request-id"], "req-123");
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
}
