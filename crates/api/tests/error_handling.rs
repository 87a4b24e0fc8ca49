//! Status codes and JSON bodies produced by `AppError`.

mod common;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::body_json;
use smuggler_api::error::AppError;
use smuggler_core::error::CoreError;

async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    (status, body_json(response).await)
}

#[tokio::test]
async fn unknown_application_is_not_found() {
    let (status, json) = render(AppError::Core(CoreError::UnknownApplication("flatpages".into()))).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Unknown application: flatpages");
}

#[tokio::test]
async fn unknown_model_is_not_found() {
    let (status, json) = render(AppError::Core(CoreError::UnknownModel {
        app_label: "sites".into(),
        model: "domain".into(),
    }))
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Unknown model: sites.domain");
}

#[tokio::test]
async fn validation_is_bad_request() {
    let (status, json) = render(AppError::Core(CoreError::Validation("too short".into()))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "too short");
}

#[tokio::test]
async fn forbidden_keeps_its_message() {
    let (status, json) = render(AppError::Core(CoreError::Forbidden("Staff role required".into()))).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "FORBIDDEN");
    assert_eq!(json["error"], "Staff role required");
}

#[tokio::test]
async fn bad_request_keeps_its_message() {
    let (status, json) = render(AppError::BadRequest("malformed multipart".into())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["error"], "malformed multipart");
}

#[tokio::test]
async fn row_not_found_is_not_found() {
    let (status, json) = render(AppError::Database(sqlx::Error::RowNotFound)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Resource not found");
}

#[tokio::test]
async fn unique_violation_is_conflict() {
    let pool = common::test_pool().await;
    let err = sqlx::query("INSERT INTO sites_site (id, domain, name) VALUES (2, 'example.com', 'dup')")
        .execute(&pool)
        .await
        .unwrap_err();

    let (status, json) = render(AppError::Database(err)).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONFLICT");
    assert!(json["error"]
        .as_str()
        .unwrap()
        .starts_with("Duplicate value violates unique constraint"));
}

#[tokio::test]
async fn internal_details_are_hidden() {
    for err in [
        AppError::InternalError("disk on fire".into()),
        AppError::Template(tera::Error::msg("missing variable `secret`")),
        AppError::Database(sqlx::Error::PoolTimedOut),
    ] {
        let (status, json) = render(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["code"], "INTERNAL_ERROR");
        assert_eq!(json["error"], "An internal error occurred");
    }
}
