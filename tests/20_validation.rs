mod common;

use anyhow::Result;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use orbis_api::auth::{issue_token, Claims};

async fn body_json(response: axum::response::Response) -> Result<Value> {
    let bytes = response.into_body().collect().await?.to_bytes();
    Ok(serde_json::from_slice(&bytes)?)
}

fn bearer() -> String {
    let claims = Claims::new(10, "Alice Smith".to_string(), 2, vec![3, 7], 2);
    format!(
        "Bearer {}",
        issue_token(&claims, common::TEST_SECRET).expect("sign test token")
    )
}

#[tokio::test]
async fn delete_requires_numeric_file_id() -> Result<()> {
    common::setup_env();
    let app = orbis_api::app();

    let res = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/delete-uploaded-file")
                .header(header::AUTHORIZATION, bearer())
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"FileID": "abc"}"#))?,
        )
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = body_json(res).await?;
    assert_eq!(body["message"], "FileID must be numeric");
    Ok(())
}

#[tokio::test]
async fn delete_requires_file_id() -> Result<()> {
    common::setup_env();
    let app = orbis_api::app();

    let res = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/delete-uploaded-file")
                .header(header::AUTHORIZATION, bearer())
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{}"))?,
        )
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = body_json(res).await?;
    assert_eq!(body["message"], "FileID is required");
    Ok(())
}

#[tokio::test]
async fn list_rejects_malformed_process_id() -> Result<()> {
    common::setup_env();
    let app = orbis_api::app();

    let res = app
        .oneshot(
            Request::builder()
                .uri("/api/uploaded-details?processId=abc")
                .header(header::AUTHORIZATION, bearer())
                .body(Body::empty())?,
        )
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = body_json(res).await?;
    assert_eq!(body["message"], "Invalid ProcessID format");
    Ok(())
}

fn multipart_upload_body(boundary: &str, filename: &str) -> String {
    format!(
        "--{b}\r\n\
         Content-Disposition: form-data; name=\"ProcessID\"\r\n\r\n\
         4\r\n\
         --{b}\r\n\
         Content-Disposition: form-data; name=\"FileType\"\r\n\r\n\
         report\r\n\
         --{b}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\n\
         Content-Type: application/octet-stream\r\n\r\n\
         payload-bytes\r\n\
         --{b}--\r\n",
        b = boundary,
        f = filename
    )
}

#[tokio::test]
async fn upload_rejects_disallowed_extension_before_writing() -> Result<()> {
    common::setup_env();
    let app = orbis_api::app();

    let boundary = "XUPLOADBOUNDARYX";
    let res = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/file-management")
                .header(header::AUTHORIZATION, bearer())
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", boundary),
                )
                .body(Body::from(multipart_upload_body(boundary, "evil.exe")))?,
        )
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = body_json(res).await?;
    assert_eq!(body["message"], "File type '.exe' is not allowed");

    // Rejected before any byte was persisted: the upload dir was never created
    assert!(!common::upload_dir().exists());
    Ok(())
}

#[tokio::test]
async fn upload_rejects_extensionless_name() -> Result<()> {
    common::setup_env();
    let app = orbis_api::app();

    let boundary = "XUPLOADBOUNDARYX";
    let res = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/file-management")
                .header(header::AUTHORIZATION, bearer())
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", boundary),
                )
                .body(Body::from(multipart_upload_body(boundary, "noextension")))?,
        )
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = body_json(res).await?;
    assert_eq!(body["message"], "File name must have an extension");
    Ok(())
}

#[tokio::test]
async fn upload_requires_process_id() -> Result<()> {
    common::setup_env();
    let app = orbis_api::app();

    let boundary = "XUPLOADBOUNDARYX";
    let body = format!(
        "--{b}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"notes.txt\"\r\n\
         Content-Type: text/plain\r\n\r\n\
         hello\r\n\
         --{b}--\r\n",
        b = boundary
    );

    let res = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/file-management")
                .header(header::AUTHORIZATION, bearer())
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", boundary),
                )
                .body(Body::from(body))?,
        )
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = body_json(res).await?;
    assert_eq!(body["message"], "ProcessID is required");
    Ok(())
}

#[tokio::test]
async fn add_comment_rejects_whitespace_text() -> Result<()> {
    common::setup_env();
    let app = orbis_api::app();

    let res = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/add-comment")
                .header(header::AUTHORIZATION, bearer())
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"CommentText": "   "}"#))?,
        )
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = body_json(res).await?;
    assert_eq!(body["message"], "CommentText is required");
    Ok(())
}
