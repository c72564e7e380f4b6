//! Integration tests for the multipart upload endpoint.

mod helpers;

use axum::http::StatusCode;

const JPEG_STUB: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];

#[tokio::test]
async fn test_upload_into_folder() {
    let app = helpers::TestApp::new();
    let token = app.token("alice");
    let photos = app.create_folder(&token, "Photos", None).await;

    let response = app
        .upload(
            &token,
            "cat.jpg",
            "image/jpeg",
            JPEG_STUB,
            &[("parentId", photos.as_str()), ("userId", "alice")],
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);

    let data = response.data();
    assert_eq!(data["kind"], "file");
    assert_eq!(data["name"], "cat.jpg");
    assert_eq!(data["path"], "/Photos/cat.jpg");
    assert_eq!(data["contentType"], "image/jpeg");
    assert_eq!(data["sizeBytes"], JPEG_STUB.len());
    assert!(data["thumbnailUrl"].is_string());
    assert!(data.get("storageKey").is_none());

    let url = data["storageUrl"].as_str().expect("storageUrl");
    let key = url.trim_start_matches("memory://media/");
    assert!(key.starts_with("alice/"));
    assert!(app.media.contains(key).await);

    let response = app
        .request(
            "GET",
            &format!("/api/nodes?parentId={photos}"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.names(), vec!["cat.jpg"]);
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let app = helpers::TestApp::new();
    let token = app.token("alice");
    let limit = app.config.storage.max_upload_size_bytes as usize;

    let response = app
        .upload(&token, "big.jpg", "image/jpeg", &vec![0u8; limit + 1], &[])
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "INVALID_ARGUMENT");
    assert!(app.media.is_empty().await);

    let response = app.request("GET", "/api/nodes", None, Some(&token)).await;
    assert!(response.names().is_empty());
}

#[tokio::test]
async fn test_upload_at_limit_is_accepted() {
    let app = helpers::TestApp::new();
    let token = app.token("alice");
    let limit = app.config.storage.max_upload_size_bytes as usize;

    let response = app
        .upload(&token, "edge.png", "image/png", &vec![1u8; limit], &[])
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
}

#[tokio::test]
async fn test_foreign_user_id_is_rejected() {
    let app = helpers::TestApp::new();
    let token = app.token("alice");

    let response = app
        .upload(&token, "cat.jpg", "image/jpeg", JPEG_STUB, &[("userId", "mallory")])
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert!(app.media.is_empty().await);
}

#[tokio::test]
async fn test_rejected_uploads_store_nothing() {
    let app = helpers::TestApp::new();
    let token = app.token("alice");

    let response = app
        .upload(&token, "notes.txt", "text/plain", b"hello", &[])
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .upload(
            &token,
            "cat.jpg",
            "image/jpeg",
            JPEG_STUB,
            &[("parentId", "00000000-0000-0000-0000-000000000001")],
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let photos = app.create_folder(&token, "Photos", None).await;
    app.request("PATCH", &format!("/api/nodes/{photos}/trash"), None, Some(&token))
        .await;
    let response = app
        .upload(&token, "cat.jpg", "image/jpeg", JPEG_STUB, &[("parentId", photos.as_str())])
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);

    assert!(app.media.is_empty().await);
}

#[tokio::test]
async fn test_missing_file_field() {
    let app = helpers::TestApp::new();
    let token = app.token("alice");

    let body = b"--picvault-test-boundary\r\nContent-Disposition: form-data; name=\"parentId\"\r\n\r\n\r\n--picvault-test-boundary--\r\n".to_vec();
    let response = app.multipart(&token, body).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "INVALID_ARGUMENT");
}

#[tokio::test]
async fn test_permanent_delete_releases_asset() {
    let app = helpers::TestApp::new();
    let token = app.token("alice");
    let photos = app.create_folder(&token, "Photos", None).await;

    let response = app
        .upload(&token, "cat.jpg", "image/jpeg", JPEG_STUB, &[("parentId", photos.as_str())])
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(app.media.len().await, 1);

    app.request("PATCH", &format!("/api/nodes/{photos}/trash"), None, Some(&token))
        .await;
    let response = app
        .request("DELETE", &format!("/api/nodes/{photos}"), None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["deletedCount"], 2);
    assert_eq!(response.data()["releasedAssets"], 1);
    assert!(response.data()["releaseFailures"].as_array().unwrap().is_empty());
    assert!(app.media.is_empty().await);
}
