//! Integration tests for tree operations over HTTP.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_requests_without_token_are_rejected() {
    let app = helpers::TestApp::new();

    let response = app.request("GET", "/api/nodes", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), "UNAUTHENTICATED");
    assert_eq!(response.body["success"], false);

    let response = app
        .request("GET", "/api/nodes", None, Some("not.a.token"))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_and_identity() {
    let app = helpers::TestApp::new();

    let response = app.request("GET", "/api/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["status"], "ok");
    assert_eq!(response.data()["database"]["provider"], "memory");

    let token = app.token("user_alice");
    let response = app.request("GET", "/api/me", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["userId"], "user_alice");
    assert_eq!(response.data()["name"], "Test User");
}

#[tokio::test]
async fn test_create_and_list_folders() {
    let app = helpers::TestApp::new();
    let token = app.token("alice");

    let response = app
        .request(
            "POST",
            "/api/folders/create",
            Some(json!({ "name": "  Photos  " })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.data()["kind"], "folder");
    assert_eq!(response.data()["name"], "Photos");
    assert_eq!(response.data()["path"], "/Photos");
    assert!(response.data()["parentId"].is_null());
    let photos = response.id();

    app.create_folder(&token, "Albums", None).await;
    app.create_folder(&token, "2024", Some(&photos)).await;

    let response = app.request("GET", "/api/nodes", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.names(), vec!["Albums", "Photos"]);

    let response = app
        .request(
            "GET",
            &format!("/api/nodes?parentId={photos}"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.names(), vec!["2024"]);
    assert_eq!(response.data()[0]["path"], "/Photos/2024");
}

#[tokio::test]
async fn test_invalid_input_is_bad_request() {
    let app = helpers::TestApp::new();
    let token = app.token("alice");

    let response = app
        .request(
            "POST",
            "/api/folders/create",
            Some(json!({ "name": "   " })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "INVALID_ARGUMENT");

    let response = app
        .request("GET", "/api/nodes/not-a-uuid", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .request("GET", "/api/nodes?filter=everything", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    // Malformed query strings and bodies get the same envelope.
    let response = app
        .request("GET", "/api/nodes?parentId=not-a-uuid", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "INVALID_ARGUMENT");
    assert_eq!(response.body["success"], false);

    let response = app
        .request(
            "POST",
            "/api/folders/create",
            Some(json!({ "name": 5 })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "INVALID_ARGUMENT");

    let photos = app.create_folder(&token, "Photos", None).await;
    let response = app
        .request(
            "PATCH",
            &format!("/api/nodes/{photos}/move"),
            Some(json!({ "parentId": "zzz" })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "INVALID_ARGUMENT");

    let response = app
        .request(
            "PATCH",
            &format!("/api/nodes/{photos}/rename"),
            Some(json!({})),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "INVALID_ARGUMENT");

    let response = app
        .request("POST", "/api/files/upload", Some(json!({})), Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "INVALID_ARGUMENT");
}

#[tokio::test]
async fn test_owners_are_isolated() {
    let app = helpers::TestApp::new();
    let alice = app.token("alice");
    let bob = app.token("bob");

    let photos = app.create_folder(&alice, "Photos", None).await;

    let response = app
        .request("GET", &format!("/api/nodes/{photos}"), None, Some(&bob))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.error_code(), "NOT_FOUND");

    let response = app
        .request(
            "POST",
            "/api/folders/create",
            Some(json!({ "name": "Intrusion", "parentId": photos })),
            Some(&bob),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .request("PATCH", &format!("/api/nodes/{photos}/trash"), None, Some(&bob))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app.request("GET", "/api/nodes", None, Some(&bob)).await;
    assert!(response.names().is_empty());
}

#[tokio::test]
async fn test_trash_restore_and_delete_cascade() {
    let app = helpers::TestApp::new();
    let token = app.token("alice");

    let photos = app.create_folder(&token, "Photos", None).await;
    let year = app.create_folder(&token, "2024", Some(&photos)).await;
    app.create_folder(&token, "Summer", Some(&year)).await;

    // Deleting a live node is refused.
    let response = app
        .request("DELETE", &format!("/api/nodes/{photos}"), None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.error_code(), "INVALID_OPERATION");

    let response = app
        .request("PATCH", &format!("/api/nodes/{photos}/trash"), None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["isTrashed"], true);

    let response = app
        .request("GET", &format!("/api/nodes/{year}"), None, Some(&token))
        .await;
    assert_eq!(response.data()["isTrashed"], true);

    let response = app.request("GET", "/api/nodes/trash", None, Some(&token)).await;
    assert_eq!(response.names(), vec!["Photos"]);

    let response = app
        .request("GET", "/api/nodes?filter=trashed", None, Some(&token))
        .await;
    assert_eq!(response.names(), vec!["Photos"]);

    let response = app.request("GET", "/api/nodes", None, Some(&token)).await;
    assert!(response.names().is_empty());

    let response = app
        .request("PATCH", &format!("/api/nodes/{photos}/restore"), None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let response = app
        .request("GET", &format!("/api/nodes/{year}"), None, Some(&token))
        .await;
    assert_eq!(response.data()["isTrashed"], false);

    app.request("PATCH", &format!("/api/nodes/{photos}/trash"), None, Some(&token))
        .await;
    let response = app
        .request("DELETE", &format!("/api/nodes/{photos}"), None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["deletedCount"], 3);

    let response = app
        .request("GET", &format!("/api/nodes/{year}"), None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_move_rename_and_ancestors() {
    let app = helpers::TestApp::new();
    let token = app.token("alice");

    let photos = app.create_folder(&token, "Photos", None).await;
    let year = app.create_folder(&token, "2024", Some(&photos)).await;
    let summer = app.create_folder(&token, "Summer", Some(&year)).await;
    let archive = app.create_folder(&token, "Archive", None).await;

    // A folder cannot move under its own descendant.
    let response = app
        .request(
            "PATCH",
            &format!("/api/nodes/{photos}/move"),
            Some(json!({ "parentId": summer })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);

    let response = app
        .request(
            "PATCH",
            &format!("/api/nodes/{year}/move"),
            Some(json!({ "parentId": archive })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["path"], "/Archive/2024");

    let response = app
        .request(
            "PATCH",
            &format!("/api/nodes/{archive}/rename"),
            Some(json!({ "name": "Old" })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["name"], "Old");

    let response = app
        .request("GET", &format!("/api/nodes/{summer}"), None, Some(&token))
        .await;
    assert_eq!(response.data()["path"], "/Old/2024/Summer");

    let response = app
        .request(
            "GET",
            &format!("/api/nodes/{summer}/ancestors"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.names(), vec!["Old", "2024", "Summer"]);

    let response = app
        .request(
            "PATCH",
            &format!("/api/nodes/{year}/move"),
            Some(json!({ "parentId": null })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.data()["parentId"].is_null());
    assert_eq!(response.data()["path"], "/2024");
}

#[tokio::test]
async fn test_star_and_empty_trash() {
    let app = helpers::TestApp::new();
    let token = app.token("alice");

    let photos = app.create_folder(&token, "Photos", None).await;
    let scans = app.create_folder(&token, "Scans", None).await;

    let response = app
        .request("PATCH", &format!("/api/nodes/{photos}/star"), None, Some(&token))
        .await;
    assert_eq!(response.data()["isStarred"], true);

    let response = app.request("GET", "/api/nodes/starred", None, Some(&token)).await;
    assert_eq!(response.names(), vec!["Photos"]);

    app.request("PATCH", &format!("/api/nodes/{photos}/star"), None, Some(&token))
        .await;
    let response = app.request("GET", "/api/nodes/starred", None, Some(&token)).await;
    assert!(response.names().is_empty());

    app.request("PATCH", &format!("/api/nodes/{photos}/trash"), None, Some(&token))
        .await;
    app.request("PATCH", &format!("/api/nodes/{scans}/trash"), None, Some(&token))
        .await;

    let response = app.request("DELETE", "/api/nodes/trash", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["deletedCount"], 2);

    let response = app.request("GET", "/api/nodes/trash", None, Some(&token)).await;
    assert!(response.names().is_empty());
}
