//! HTTP-level integration tests for the dump endpoints.

mod common;

use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE, LOCATION};
use axum::http::StatusCode;
use common::{body_bytes, body_json, flash_messages, get, get_auth, superuser_token, test_pool};
use smuggler_api::config::FixtureSettings;
use smuggler_core::messages::Level;

fn disposition<B>(response: &axum::http::Response<B>) -> String {
    response
        .headers()
        .get(CONTENT_DISPOSITION)
        .expect("dump must be an attachment")
        .to_str()
        .unwrap()
        .to_string()
}

fn models_in(json: &serde_json::Value) -> Vec<String> {
    let mut models: Vec<String> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["model"].as_str().unwrap().to_string())
        .collect();
    models.dedup();
    models
}

// ---------------------------------------------------------------------------
// Filenames
// ---------------------------------------------------------------------------

#[tokio::test]
async fn all_data_dump_is_named_by_timestamp() {
    let pool = test_pool().await;
    let token = superuser_token(&pool).await;
    let app = common::build_test_app(pool, FixtureSettings::default());

    let response = get_auth(app, "/admin/dump-data/", &token).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
    assert_eq!(
        disposition(&response),
        "attachment; filename=2012-01-14T00:00:00.json"
    );
}

#[tokio::test]
async fn app_dump_is_prefixed_with_the_app_label() {
    let pool = test_pool().await;
    let token = superuser_token(&pool).await;
    let app = common::build_test_app(pool, FixtureSettings::default());

    let response = get_auth(app, "/admin/dump-data/sites/", &token).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        disposition(&response),
        "attachment; filename=sites_2012-01-14T00:00:00.json"
    );
    let json = body_json(response).await;
    assert_eq!(json[0]["model"], "sites.site");
    assert_eq!(json[0]["fields"]["domain"], "example.com");
}

#[tokio::test]
async fn model_dump_is_prefixed_with_app_and_model() {
    let pool = test_pool().await;
    let token = superuser_token(&pool).await;
    let app = common::build_test_app(pool, FixtureSettings::default());

    let response = get_auth(app, "/admin/dump-data/sites/site/", &token).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        disposition(&response),
        "attachment; filename=sites-site_2012-01-14T00:00:00.json"
    );
}

// ---------------------------------------------------------------------------
// Scopes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn query_string_dumps_the_listed_scopes() {
    let pool = test_pool().await;
    let token = superuser_token(&pool).await;
    let app = common::build_test_app(pool, FixtureSettings::default());

    let response = get_auth(app, "/admin/dump-data/?app_label=auth.user,sites", &token).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        disposition(&response),
        "attachment; filename=2012-01-14T00:00:00.json"
    );
    let json = body_json(response).await;
    assert_eq!(models_in(&json), vec!["auth.user", "sites.site"]);
}

#[tokio::test]
async fn exclude_list_applies_to_the_unscoped_dump_only() {
    let pool = test_pool().await;
    let token = superuser_token(&pool).await;
    let settings = FixtureSettings {
        exclude_list: vec!["auth".into()],
        ..FixtureSettings::default()
    };

    let app = common::build_test_app(pool.clone(), settings.clone());
    let json = body_json(get_auth(app, "/admin/dump-data/", &token).await).await;
    assert_eq!(models_in(&json), vec!["sites.site"]);

    let app = common::build_test_app(pool, settings);
    let json = body_json(get_auth(app, "/admin/dump-data/auth/", &token).await).await;
    assert_eq!(models_in(&json), vec!["auth.user"]);
}

#[tokio::test]
async fn indent_setting_pretty_prints() {
    let pool = test_pool().await;
    let token = superuser_token(&pool).await;
    let settings = FixtureSettings {
        indent: Some(4),
        ..FixtureSettings::default()
    };
    let app = common::build_test_app(pool, settings);

    let response = get_auth(app, "/admin/dump-data/sites/", &token).await;
    let text = String::from_utf8(body_bytes(response).await).unwrap();

    assert!(text.starts_with("[\n    {\n        \"model\": \"sites.site\""));
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_app_flashes_and_redirects() {
    let pool = test_pool().await;
    let token = superuser_token(&pool).await;
    let app = common::build_test_app(pool.clone(), FixtureSettings::default());

    let response = get_auth(app, "/admin/dump-data/flatpages/", &token).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[LOCATION], "/admin/flatpages/");
    let messages = flash_messages(&response);
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].level, Level::Error);
    assert_eq!(
        messages[0].text,
        "An exception occurred while dumping data: Unknown application: flatpages"
    );

    let app = common::build_test_app(pool, FixtureSettings::default());
    let response = get_auth(app, "/admin/flatpages/", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_model_redirects_to_its_app() {
    let pool = test_pool().await;
    let token = superuser_token(&pool).await;
    let app = common::build_test_app(pool, FixtureSettings::default());

    let response = get_auth(app, "/admin/dump-data/sites/domain/", &token).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[LOCATION], "/admin/sites/");
    assert_eq!(
        flash_messages(&response)[0].text,
        "An exception occurred while dumping data: Unknown model: sites.domain"
    );
}

#[tokio::test]
async fn unknown_label_in_query_redirects_to_index() {
    let pool = test_pool().await;
    let token = superuser_token(&pool).await;
    let app = common::build_test_app(pool, FixtureSettings::default());

    let response = get_auth(app, "/admin/dump-data/?app_label=sites,nope", &token).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[LOCATION], "/admin/");
    assert_eq!(
        flash_messages(&response)[0].text,
        "An exception occurred while dumping data: Unknown application: nope"
    );
}

#[tokio::test]
async fn dump_requires_authentication() {
    let pool = test_pool().await;
    let app = common::build_test_app(pool, FixtureSettings::default());

    let response = get(app, "/admin/dump-data/").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
