//! Integration tests for the project endpoints.
//!
//! # Tests Covered
//!
//! - `POST /api/projects`: creation, ignored caller fields, authentication
//! - `GET /api/projects`: task expansion
//! - `GET /api/projects/{projectId}`: lookup, `null` for missing, malformed ids
//! - `PUT /api/projects/{projectId}`: partial update, malformed ids
//! - `DELETE /api/projects/{projectId}`: confirmation, tasks left untouched
//! - Store failures on every project route

mod common;

use axum::http::StatusCode;
use rstest::rstest;
use serde_json::json;

use common::{STORE_FAILURE, TEST_TOKEN, TestApp};

const MISSING_ID: &str = "65a1f0c2e4b0a1b2c3d4e5f6";

// =============================================================================
// POST /api/projects Tests
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_create_project_returns_stored_document() {
    let app = TestApp::new();

    let (status, body) = app
        .send(
            "POST",
            "/api/projects",
            Some(TEST_TOKEN),
            Some(json!({ "title": "Launch", "description": "Q1" })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Launch");
    assert_eq!(body["description"], "Q1");
    assert_eq!(body["tasks"], json!([]));
    assert_eq!(body["_id"].as_str().unwrap().len(), 24);
}

#[rstest]
#[tokio::test]
async fn test_create_project_ignores_caller_tasks_and_id() {
    let app = TestApp::new();

    let (status, body) = app
        .send(
            "POST",
            "/api/projects",
            Some(TEST_TOKEN),
            Some(json!({
                "_id": MISSING_ID,
                "title": "Launch",
                "tasks": ["65a1f0c2e4b0a1b2c3d4e5f7"],
            })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tasks"], json!([]));
    assert_ne!(body["_id"], MISSING_ID);
}

#[rstest]
#[case(None)]
#[case(Some("wrong-token"))]
#[tokio::test]
async fn test_create_project_rejects_unauthenticated(#[case] token: Option<&str>) {
    let app = TestApp::new();

    let (status, body) = app
        .send("POST", "/api/projects", token, Some(json!({ "title": "Launch" })))
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
    assert_eq!(app.store_calls(), 0);
}

#[rstest]
#[tokio::test]
async fn test_create_project_rejects_unknown_fields() {
    let app = TestApp::new();

    let (status, body) = app
        .send(
            "POST",
            "/api/projects",
            Some(TEST_TOKEN),
            Some(json!({ "title": "Launch", "owner": "someone" })),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "INVALID_BODY");
    assert!(body["message"].as_str().unwrap().contains("owner"));
    assert_eq!(app.store_calls(), 0);
}

#[rstest]
#[tokio::test]
async fn test_create_project_without_json_body_uses_error_shape() {
    let app = TestApp::new();

    let (status, body) = app
        .send("POST", "/api/projects", Some(TEST_TOKEN), None)
        .await;

    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body["code"], "INVALID_BODY");
    assert_eq!(app.store_calls(), 0);
}

// =============================================================================
// GET /api/projects Tests
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_list_projects_empty() {
    let app = TestApp::new();

    let (status, body) = app.send("GET", "/api/projects", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[rstest]
#[tokio::test]
async fn test_list_projects_expands_tasks() {
    let app = TestApp::new();
    let project_id = app.create_project("Launch").await;
    app.create_task("Plan", &project_id).await;
    app.create_task("Ship", &project_id).await;
    app.create_project("Empty").await;

    let (status, body) = app.send("GET", "/api/projects", None, None).await;

    assert_eq!(status, StatusCode::OK);
    let projects = body.as_array().unwrap();
    assert_eq!(projects.len(), 2);

    let launch = projects.iter().find(|project| project["_id"] == project_id.as_str()).unwrap();
    let tasks = launch["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0]["title"], "Plan");
    assert_eq!(tasks[1]["title"], "Ship");
    assert_eq!(tasks[0]["project"], project_id.as_str());
}

// =============================================================================
// GET /api/projects/{projectId} Tests
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_get_project_expands_tasks() {
    let app = TestApp::new();
    let project_id = app.create_project("Launch").await;
    app.create_task("Plan", &project_id).await;

    let (status, body) = app
        .send("GET", &format!("/api/projects/{project_id}"), None, None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["_id"], project_id.as_str());
    assert_eq!(body["tasks"][0]["title"], "Plan");
}

#[rstest]
#[tokio::test]
async fn test_get_project_missing_returns_null() {
    let app = TestApp::new();

    let (status, body) = app
        .send("GET", &format!("/api/projects/{MISSING_ID}"), None, None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.is_null());
}

// =============================================================================
// Malformed Identifier Tests
// =============================================================================

#[rstest]
#[case("GET", None)]
#[case("PUT", Some(r#"{ "title": "x" }"#))]
#[case("DELETE", None)]
#[tokio::test]
async fn test_malformed_id_returns_bad_request_without_store_access(
    #[case] method: &str,
    #[case] body: Option<&str>,
    #[values("abc", "65a1f0c2e4b0a1b2c3d4e5fz", "65a1f0c2e4b0a1b2c3d4e5f6aa")] project_id: &str,
) {
    let app = TestApp::new();

    let (status, response) = app
        .send(
            method,
            &format!("/api/projects/{project_id}"),
            Some(TEST_TOKEN),
            body.map(|raw| serde_json::from_str(raw).unwrap()),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["message"], "Specified id is not valid");
    assert_eq!(app.store_calls(), 0);
}

#[rstest]
#[case(Some(r#"{ "tasks": ["x"] }"#))]
#[case(Some(r#"{ "owner": 1 }"#))]
#[case(None)]
#[tokio::test]
async fn test_update_with_malformed_id_is_rejected_before_body(#[case] body: Option<&str>) {
    let app = TestApp::new();

    let (status, response) = app
        .send(
            "PUT",
            "/api/projects/abc",
            Some(TEST_TOKEN),
            body.map(|raw| serde_json::from_str(raw).unwrap()),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["message"], "Specified id is not valid");
    assert_eq!(app.store_calls(), 0);
}

// =============================================================================
// PUT /api/projects/{projectId} Tests
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_update_project_replaces_present_fields() {
    let app = TestApp::new();
    let project_id = app.create_project("Launch").await;
    app.create_task("Plan", &project_id).await;

    let (status, body) = app
        .send(
            "PUT",
            &format!("/api/projects/{project_id}"),
            Some(TEST_TOKEN),
            Some(json!({ "description": "Q2" })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Launch");
    assert_eq!(body["description"], "Q2");
    // Updated document keeps task references unexpanded.
    assert!(body["tasks"][0].is_string());
}

#[rstest]
#[tokio::test]
async fn test_update_project_can_overwrite_tasks() {
    let app = TestApp::new();
    let project_id = app.create_project("Launch").await;
    app.create_task("Plan", &project_id).await;

    let (status, body) = app
        .send(
            "PUT",
            &format!("/api/projects/{project_id}"),
            Some(TEST_TOKEN),
            Some(json!({ "tasks": [] })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tasks"], json!([]));
}

#[rstest]
#[tokio::test]
async fn test_update_project_missing_returns_null() {
    let app = TestApp::new();

    let (status, body) = app
        .send(
            "PUT",
            &format!("/api/projects/{MISSING_ID}"),
            Some(TEST_TOKEN),
            Some(json!({ "title": "x" })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.is_null());
}

#[rstest]
#[tokio::test]
async fn test_update_project_requires_token() {
    let app = TestApp::new();
    let project_id = app.create_project("Launch").await;
    let calls = app.store_calls();

    let (status, _) = app
        .send(
            "PUT",
            &format!("/api/projects/{project_id}"),
            None,
            Some(json!({ "title": "x" })),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.store_calls(), calls);
}

// =============================================================================
// DELETE /api/projects/{projectId} Tests
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_delete_project_leaves_tasks() {
    let app = TestApp::new();
    let project_id = app.create_project("Launch").await;
    app.create_task("Plan", &project_id).await;

    let (status, body) = app
        .send(
            "DELETE",
            &format!("/api/projects/{project_id}"),
            Some(TEST_TOKEN),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        format!("Project with {project_id} is removed successfully.")
    );
    assert_eq!(app.tasks.stored().await, 1);

    let (_, body) = app
        .send("GET", &format!("/api/projects/{project_id}"), None, None)
        .await;
    assert!(body.is_null());
}

#[rstest]
#[tokio::test]
async fn test_delete_missing_project_still_confirms() {
    let app = TestApp::new();

    let (status, body) = app
        .send(
            "DELETE",
            &format!("/api/projects/{MISSING_ID}"),
            Some(TEST_TOKEN),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        format!("Project with {MISSING_ID} is removed successfully.")
    );
}

#[rstest]
#[tokio::test]
async fn test_delete_project_echoes_id_as_sent() {
    let app = TestApp::new();
    let project_id = app.create_project("Launch").await.to_uppercase();

    let (status, body) = app
        .send(
            "DELETE",
            &format!("/api/projects/{project_id}"),
            Some(TEST_TOKEN),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        format!("Project with {project_id} is removed successfully.")
    );
    let (_, listed) = app.send("GET", "/api/projects", None, None).await;
    assert_eq!(listed, json!([]));
}

#[rstest]
#[tokio::test]
async fn test_delete_project_requires_token() {
    let app = TestApp::new();
    let project_id = app.create_project("Launch").await;

    let (status, _) = app
        .send("DELETE", &format!("/api/projects/{project_id}"), None, None)
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (_, body) = app
        .send("GET", &format!("/api/projects/{project_id}"), None, None)
        .await;
    assert_eq!(body["title"], "Launch");
}

// =============================================================================
// Store Failure Tests
// =============================================================================

#[rstest]
#[case("POST", "/api/projects", Some(r#"{ "title": "Launch" }"#), "error creating a new project")]
#[case("GET", "/api/projects", None, "error getting list of projects")]
#[case("GET", "/api/projects/65a1f0c2e4b0a1b2c3d4e5f6", None, "error getting project details")]
#[case("PUT", "/api/projects/65a1f0c2e4b0a1b2c3d4e5f6", Some(r#"{ "title": "x" }"#), "error updating project")]
#[case("DELETE", "/api/projects/65a1f0c2e4b0a1b2c3d4e5f6", None, "error deleting project")]
#[tokio::test]
async fn test_store_failure_returns_internal_error(
    #[case] method: &str,
    #[case] uri: &str,
    #[case] body: Option<&str>,
    #[case] message: &str,
) {
    let app = TestApp::failing_store();

    let (status, response) = app
        .send(
            method,
            uri,
            Some(TEST_TOKEN),
            body.map(|raw| serde_json::from_str(raw).unwrap()),
        )
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response["code"], "INTERNAL_ERROR");
    assert_eq!(response["message"], message);
    assert_eq!(response["error"], format!("Database error: {STORE_FAILURE}"));
}

// =============================================================================
// GET /health Tests
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new();

    let (status, body) = app.send("GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}
