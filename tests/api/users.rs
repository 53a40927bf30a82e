use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde_json::{Value, json};

use crate::helpers::TestApp;

async fn create(app: &TestApp, first: &str, last: &str) -> Value {
    let response = app
        .post("/api/user", json!({ "first_name": first, "last_name": last }))
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let body = response.json();
    assert_eq!(body["success"], true);
    body["user"].clone()
}

async fn user_count(app: &TestApp) -> usize {
    app.get("/api/user").await.json()["users"]
        .as_array()
        .unwrap()
        .len()
}

fn timestamp(value: &Value) -> DateTime<Utc> {
    value.as_str().unwrap().parse().unwrap()
}

#[tokio::test]
async fn create_returns_the_new_user() {
    let app = TestApp::in_memory();

    let user = create(&app, "Ada", "Lovelace").await;

    assert_eq!(user["first_name"], "Ada");
    assert_eq!(user["last_name"], "Lovelace");
    assert_eq!(user["email"], Value::Null);
    assert!(user["id"].is_i64());
    assert_eq!(user["created_at"], user["updated_at"]);
}

#[tokio::test]
async fn create_requires_both_names() {
    let app = TestApp::in_memory();

    for body in [
        json!({ "first_name": "Ada" }),
        json!({ "last_name": "Lovelace" }),
        json!({ "first_name": "", "last_name": "Lovelace" }),
    ] {
        let response = app.post("/api/user", body).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json(),
            json!({ "success": false, "error": "First and Last Name are required" })
        );
    }

    assert_eq!(user_count(&app).await, 0);
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let app = TestApp::in_memory();
    let body = json!({ "first_name": "Ada", "last_name": "Lovelace", "email": "ada@example.com" });
    assert_eq!(
        app.post("/api/user", body.clone()).await.status,
        StatusCode::CREATED
    );

    let response = app.post("/api/user", body).await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(user_count(&app).await, 1);
}

#[tokio::test]
async fn list_is_ordered_by_id_regardless_of_updates() {
    let app = TestApp::in_memory();
    let first = create(&app, "Ada", "Lovelace").await;
    let second = create(&app, "Alan", "Turing").await;
    let third = create(&app, "Grace", "Hopper").await;

    // Touch the oldest row last; the order must not change.
    app.put(
        &format!("/api/user/{}", first["id"]),
        json!({ "first_name": "Ada", "last_name": "King" }),
    )
    .await;

    let body = app.get("/api/user").await.json();
    assert_eq!(body["success"], true);
    let ids: Vec<_> = body["users"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["id"].as_i64().unwrap())
        .collect();
    let expected: Vec<_> = [first, second, third]
        .iter()
        .map(|u| u["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, expected);
    assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
}

#[tokio::test]
async fn get_returns_one_user_or_404() {
    let app = TestApp::in_memory();
    let user = create(&app, "Ada", "Lovelace").await;

    let found = app.get(&format!("/api/user/{}", user["id"])).await;
    assert_eq!(found.status, StatusCode::OK);
    assert_eq!(found.json(), json!({ "success": true, "user": user }));

    let missing = app.get("/api/user/999").await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.json()["error"], "User not found");
}

#[tokio::test]
async fn non_numeric_ids_are_rejected() {
    let app = TestApp::in_memory();

    let response = app.get("/api/user/abc").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_replaces_fields_and_refreshes_updated_at() {
    let app = TestApp::in_memory();
    let user = create(&app, "Ada", "Lovelace").await;

    let response = app
        .put(
            &format!("/api/user/{}", user["id"]),
            json!({ "first_name": "Ada", "last_name": "King", "email": "ada@example.com" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let updated = response.json()["user"].clone();
    assert_eq!(updated["id"], user["id"]);
    assert_eq!(updated["created_at"], user["created_at"]);
    assert_eq!(updated["last_name"], "King");
    assert_eq!(updated["email"], "ada@example.com");
    assert!(timestamp(&updated["updated_at"]) >= timestamp(&user["updated_at"]));
}

#[tokio::test]
async fn update_without_email_key_keeps_the_stored_email() {
    let app = TestApp::in_memory();
    let created = app
        .post(
            "/api/user",
            json!({ "first_name": "Ada", "last_name": "Lovelace", "email": "ada@example.com" }),
        )
        .await
        .json()["user"]
        .clone();
    let path = format!("/api/user/{}", created["id"]);

    let response = app
        .put(&path, json!({ "first_name": "Ada", "last_name": "King" }))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let updated = response.json()["user"].clone();
    assert_eq!(updated["last_name"], "King");
    assert_eq!(updated["email"], "ada@example.com");
}

#[tokio::test]
async fn update_with_null_email_clears_it() {
    let app = TestApp::in_memory();
    let created = app
        .post(
            "/api/user",
            json!({ "first_name": "Ada", "last_name": "Lovelace", "email": "ada@example.com" }),
        )
        .await
        .json()["user"]
        .clone();

    let updated = app
        .put(
            &format!("/api/user/{}", created["id"]),
            json!({ "first_name": "Ada", "last_name": "Lovelace", "email": null }),
        )
        .await
        .json()["user"]
        .clone();

    assert_eq!(updated["email"], Value::Null);
}

#[tokio::test]
async fn update_validates_before_looking_up_the_user() {
    let app = TestApp::in_memory();
    let user = create(&app, "Ada", "Lovelace").await;

    let response = app
        .put(
            &format!("/api/user/{}", user["id"]),
            json!({ "first_name": "Ada" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .put(
            "/api/user/999",
            json!({ "first_name": "Ada", "last_name": "King" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let unchanged = app.get(&format!("/api/user/{}", user["id"])).await.json();
    assert_eq!(unchanged["user"], user);
}

#[tokio::test]
async fn delete_returns_the_removed_user() {
    let app = TestApp::in_memory();
    let user = create(&app, "Ada", "Lovelace").await;
    let path = format!("/api/user/{}", user["id"]);

    let response = app.delete(&path).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.json(),
        json!({ "success": true, "message": "User deleted", "user": user })
    );

    assert_eq!(app.delete(&path).await.status, StatusCode::NOT_FOUND);
    assert_eq!(user_count(&app).await, 0);
}
