use axum::http::{Method, StatusCode};
use serde_json::{Value, json};

use crate::helpers::{TestApp, path_id};

async fn todo_count(app: &TestApp) -> usize {
    app.get("/todos").await.json().as_array().unwrap().len()
}

async fn create(app: &TestApp, title: &str) -> Value {
    let response = app.post("/todos", json!({ "title": title })).await;
    assert_eq!(response.status, StatusCode::CREATED);
    response.json()
}

#[tokio::test]
async fn create_returns_a_pending_todo_with_a_fresh_id() {
    let app = TestApp::in_memory();

    let first = create(&app, "buy milk").await;
    let second = create(&app, "buy milk").await;

    assert_eq!(first["title"], "buy milk");
    assert_eq!(first["completed"], false);
    assert!(first["created_at"].is_string());
    assert_ne!(first["id"], second["id"]);
}

#[tokio::test]
async fn create_accepts_the_text_alias() {
    let app = TestApp::in_memory();

    let response = app.post("/todos", json!({ "text": "  walk dog " })).await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.json()["title"], "walk dog");
}

#[tokio::test]
async fn create_rejects_invalid_titles_without_writing() {
    let app = TestApp::in_memory();
    create(&app, "existing").await;

    for body in [
        json!({}),
        json!({ "title": "" }),
        json!({ "title": "   " }),
        json!({ "title": false }),
    ] {
        let response = app.post("/todos", body.clone()).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "body: {body}");
        assert_eq!(response.json()["success"], false);
        assert!(response.json()["error"].as_str().unwrap().contains("Title"));
    }

    assert_eq!(todo_count(&app).await, 1);
}

#[tokio::test]
async fn create_rejects_malformed_json() {
    let app = TestApp::in_memory();

    let response = app.send_raw(Method::POST, "/todos", "{\"title\":").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"], "Malformed JSON body");
    assert_eq!(todo_count(&app).await, 0);
}

#[tokio::test]
async fn list_keeps_insertion_order() {
    let app = TestApp::in_memory();
    for title in ["first", "second", "third"] {
        create(&app, title).await;
    }

    let todos = app.get("/todos").await.json();
    let titles: Vec<_> = todos
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();

    assert_eq!(titles, ["first", "second", "third"]);
}

#[tokio::test]
async fn get_returns_one_todo_or_404() {
    let app = TestApp::in_memory();
    let todo = create(&app, "read").await;

    let found = app.get(&format!("/todos/{}", path_id(&todo["id"]))).await;
    assert_eq!(found.status, StatusCode::OK);
    assert_eq!(found.json(), todo);

    let missing = app
        .get(&format!("/todos/{}", uuid::Uuid::new_v4()))
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.json()["error"], "Todo not found");

    let garbage = app.get("/todos/not-an-id").await;
    assert_eq!(garbage.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_removes_exactly_that_todo() {
    let app = TestApp::in_memory();
    let keep = create(&app, "keep").await;
    let gone = create(&app, "gone").await;

    let response = app.delete(&format!("/todos/{}", path_id(&gone["id"]))).await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["message"], "Todo deleted");
    assert_eq!(body["todo"], gone);

    let todos = app.get("/todos").await.json();
    assert_eq!(todos, json!([keep]));
}

#[tokio::test]
async fn deleting_a_missing_todo_is_404_and_changes_nothing() {
    let app = TestApp::in_memory();
    create(&app, "survivor").await;

    let response = app
        .delete(&format!("/todos/{}", uuid::Uuid::new_v4()))
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(todo_count(&app).await, 1);
}

#[tokio::test]
async fn empty_patch_toggles_and_two_toggles_cancel_out() {
    let app = TestApp::in_memory();
    let todo = create(&app, "flip me").await;
    let path = format!("/todos/{}", path_id(&todo["id"]));

    let once = app.patch(&path, None).await;
    assert_eq!(once.status, StatusCode::OK);
    assert_eq!(once.json()["completed"], true);

    let twice = app.patch(&path, Some(json!({}))).await;
    assert_eq!(twice.status, StatusCode::OK);
    assert_eq!(twice.json()["completed"], false);
}

#[tokio::test]
async fn patch_updates_only_the_given_fields() {
    let app = TestApp::in_memory();
    let todo = create(&app, "draft").await;
    let path = format!("/todos/{}", path_id(&todo["id"]));

    let renamed = app.patch(&path, Some(json!({ "text": "final" }))).await.json();
    assert_eq!(renamed["title"], "final");
    assert_eq!(renamed["completed"], false);
    assert_eq!(renamed["created_at"], todo["created_at"]);

    let done = app
        .patch(&path, Some(json!({ "completed": true })))
        .await
        .json();
    assert_eq!(done["title"], "final");
    assert_eq!(done["completed"], true);
}

#[tokio::test]
async fn patch_rejects_bad_types_and_leaves_the_todo_alone() {
    let app = TestApp::in_memory();
    let todo = create(&app, "steady").await;
    let path = format!("/todos/{}", path_id(&todo["id"]));

    let response = app
        .patch(&path, Some(json!({ "completed": "yes" })))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"], "Completed must be a boolean");

    let response = app.patch(&path, Some(json!({ "title": "" }))).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    assert_eq!(app.get(&path).await.json(), todo);
}

#[tokio::test]
async fn patching_a_missing_todo_is_404() {
    let app = TestApp::in_memory();

    let response = app
        .patch(&format!("/todos/{}", uuid::Uuid::new_v4()), None)
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn clear_removes_everything() {
    let app = TestApp::in_memory();
    create(&app, "a").await;
    create(&app, "b").await;

    let response = app.delete("/todos").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.json(),
        json!({ "message": "All todos deleted", "deleted": 2 })
    );
    assert_eq!(todo_count(&app).await, 0);
}
