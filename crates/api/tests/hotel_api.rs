//! HTTP-level integration tests for hotels, including image ingestion
//! failure paths and the media listing.

mod common;

use axum::http::StatusCode;
use common::{
    admin_token, body_json, build_test_app, delete_auth, expect_json, get, get_auth,
    png_data_url, post_json_auth, put_json, put_json_auth, stored_object, TestApp,
};
use serde_json::json;
use sqlx::PgPool;

async fn create_hotel(app: &TestApp, body: serde_json::Value) -> serde_json::Value {
    let response = post_json_auth(app.app(), "/api/v1/hotels", body, &admin_token()).await;
    expect_json(response, StatusCode::CREATED).await["data"].clone()
}

fn grand_plaza() -> serde_json::Value {
    json!({
        "name": "Grand Plaza",
        "description": "Five minutes from the venue",
        "address": "1 Harbour Road",
        "website_url": "https://grandplaza.example.com",
    })
}

// ---------------------------------------------------------------------------
// Partial updates
// ---------------------------------------------------------------------------

/// Re-submitting the stored values (with surrounding whitespace) is not a
/// change and leaves `updated_at` untouched.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_resubmitting_same_values_reports_no_changes(pool: PgPool) {
    let app = build_test_app(pool);
    let hotel = create_hotel(&app, grand_plaza()).await;
    let id = hotel["id"].as_i64().unwrap();

    let response = put_json_auth(
        app.app(),
        &format!("/api/v1/hotels/{id}"),
        json!({
            "name": "Grand Plaza ",
            "description": "Five minutes from the venue",
            "address": "",
        }),
        &admin_token(),
    )
    .await;
    let json = expect_json(response, StatusCode::OK).await;
    assert_eq!(json["changed"], false);
    assert_eq!(json["message"], "No changes detected");
    assert_eq!(json["data"]["updated_at"], hotel["updated_at"]);
    assert_eq!(json["data"]["address"], "1 Harbour Road");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_update_writes_only_changed_fields(pool: PgPool) {
    let app = build_test_app(pool);
    let hotel = create_hotel(&app, grand_plaza()).await;
    let id = hotel["id"].as_i64().unwrap();

    let response = put_json_auth(
        app.app(),
        &format!("/api/v1/hotels/{id}"),
        json!({ "name": "Grand Plaza", "address": "2 Harbour Road", "website_url": null }),
        &admin_token(),
    )
    .await;
    let json = expect_json(response, StatusCode::OK).await;
    assert_eq!(json["changed"], true);
    assert_eq!(json["message"], "Updated successfully");
    assert_eq!(json["data"]["address"], "2 Harbour Road");
    assert!(json["data"]["website_url"].is_null());
    assert_eq!(json["data"]["description"], "Five minutes from the venue");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_invalid_website_is_rejected(pool: PgPool) {
    let app = build_test_app(pool);
    let mut body = grand_plaza();
    body["website_url"] = json!("not a url");
    let response = post_json_auth(app.app(), "/api/v1/hotels", body, &admin_token()).await;
    let json = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_update_without_token_is_unauthorized(pool: PgPool) {
    let app = build_test_app(pool);
    let hotel = create_hotel(&app, grand_plaza()).await;
    let id = hotel["id"].as_i64().unwrap();

    let response = put_json(app.app(), &format!("/api/v1/hotels/{id}"), json!({ "name": "X" })).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = body_json(get(app.app(), &format!("/api/v1/hotels/{id}")).await).await;
    assert_eq!(json["data"]["name"], "Grand Plaza");
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_external_image_url_is_stored_without_upload(pool: PgPool) {
    let app = build_test_app(pool);
    let mut body = grand_plaza();
    body["image"] = json!("https://photos.example.com/plaza.jpg");
    let hotel = create_hotel(&app, body).await;
    assert_eq!(hotel["image_url"], "https://photos.example.com/plaza.jpg");
    assert_eq!(app.bucket.upload_count(), 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_malformed_image_is_rejected(pool: PgPool) {
    let app = build_test_app(pool);
    let mut body = grand_plaza();
    body["image"] = json!("data:text/plain;base64,aGVsbG8=");
    let response = post_json_auth(app.app(), "/api/v1/hotels", body, &admin_token()).await;
    let json = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["code"], "INVALID_IMAGE_FORMAT");
    assert_eq!(app.bucket.upload_count(), 0);

    let json = body_json(get(app.app(), "/api/v1/hotels").await).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}

/// A failed upload aborts the request before anything is written.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_upload_failure_writes_nothing(pool: PgPool) {
    let app = build_test_app(pool);
    app.bucket.set_fail_uploads(true);

    let mut body = grand_plaza();
    body["image"] = json!(png_data_url(None));
    let response = post_json_auth(app.app(), "/api/v1/hotels", body, &admin_token()).await;
    let json = expect_json(response, StatusCode::INTERNAL_SERVER_ERROR).await;
    assert_eq!(json["code"], "STORAGE_UPLOAD_FAILED");
    assert_eq!(json["error"], "Failed to upload image");

    let json = body_json(get(app.app(), "/api/v1/hotels").await).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_upload_failure_on_update_keeps_record(pool: PgPool) {
    let app = build_test_app(pool);
    let hotel = create_hotel(&app, grand_plaza()).await;
    let id = hotel["id"].as_i64().unwrap();
    app.bucket.set_fail_uploads(true);

    let response = put_json_auth(
        app.app(),
        &format!("/api/v1/hotels/{id}"),
        json!({ "name": "Renamed", "image": png_data_url(None) }),
        &admin_token(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = body_json(get(app.app(), &format!("/api/v1/hotels/{id}")).await).await;
    assert_eq!(json["data"]["name"], "Grand Plaza");
    assert_eq!(json["data"]["updated_at"], hotel["updated_at"]);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_generated_object_name_uses_resource_prefix(pool: PgPool) {
    let app = build_test_app(pool);
    let mut body = grand_plaza();
    body["image"] = json!(png_data_url(None));
    let hotel = create_hotel(&app, body).await;

    let name = stored_object(&hotel["image_url"]);
    assert!(name.starts_with("hotel_"), "unexpected object name {name}");
    assert!(name.ends_with(".png"), "unexpected object name {name}");
    assert!(app.bucket.contains(&name).await);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_clearing_image_removes_object(pool: PgPool) {
    let app = build_test_app(pool);
    let mut body = grand_plaza();
    body["image"] = json!(png_data_url(Some("plaza.png")));
    let hotel = create_hotel(&app, body).await;
    let id = hotel["id"].as_i64().unwrap();

    let response = put_json_auth(
        app.app(),
        &format!("/api/v1/hotels/{id}"),
        json!({ "image": null }),
        &admin_token(),
    )
    .await;
    let json = expect_json(response, StatusCode::OK).await;
    assert!(json["data"]["image_url"].is_null());
    assert!(!app.bucket.contains(&stored_object(&hotel["image_url"])).await);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_reupload_with_same_filename_is_a_change(pool: PgPool) {
    let app = build_test_app(pool);
    let mut body = grand_plaza();
    body["image"] = json!(png_data_url(Some("plaza.png")));
    let hotel = create_hotel(&app, body).await;
    let id = hotel["id"].as_i64().unwrap();
    let first = stored_object(&hotel["image_url"]);

    let response = put_json_auth(
        app.app(),
        &format!("/api/v1/hotels/{id}"),
        json!({ "image": png_data_url(Some("plaza.png")) }),
        &admin_token(),
    )
    .await;
    let json = expect_json(response, StatusCode::OK).await;
    assert_eq!(json["changed"], true);
    assert_ne!(json["data"]["image_url"], hotel["image_url"]);

    let second = stored_object(&json["data"]["image_url"]);
    assert!(second.ends_with("_plaza.png"), "{second}");
    assert!(app.bucket.contains(&second).await);
    assert!(!app.bucket.contains(&first).await);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_deleting_hotel_keeps_image_with_same_filename(pool: PgPool) {
    let app = build_test_app(pool);
    let mut body = grand_plaza();
    body["image"] = json!(png_data_url(Some("lobby.png")));
    let a = create_hotel(&app, body.clone()).await;
    body["name"] = json!("Harbor Inn");
    let b = create_hotel(&app, body).await;
    assert_ne!(a["image_url"], b["image_url"]);

    let id = b["id"].as_i64().unwrap();
    let response = delete_auth(app.app(), &format!("/api/v1/hotels/{id}"), &admin_token()).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    assert!(app.bucket.contains(&stored_object(&a["image_url"])).await);
    assert!(!app.bucket.contains(&stored_object(&b["image_url"])).await);
}

/// A bucket URL copied onto a second record survives deletion of either
/// record until the last one pointing at it is gone.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_shared_bucket_url_is_removed_with_last_reference(pool: PgPool) {
    let app = build_test_app(pool);
    let mut body = grand_plaza();
    body["image"] = json!(png_data_url(Some("lobby.png")));
    let a = create_hotel(&app, body).await;
    let object = stored_object(&a["image_url"]);

    let mut body = grand_plaza();
    body["name"] = json!("Harbor Inn");
    body["image"] = a["image_url"].clone();
    let b = create_hotel(&app, body).await;
    assert_eq!(b["image_url"], a["image_url"]);
    assert_eq!(app.bucket.upload_count(), 1);

    for (hotel, still_stored) in [(&b, true), (&a, false)] {
        let id = hotel["id"].as_i64().unwrap();
        let response =
            delete_auth(app.app(), &format!("/api/v1/hotels/{id}"), &admin_token()).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(app.bucket.contains(&object).await, still_stored);
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_delete_hotel(pool: PgPool) {
    let app = build_test_app(pool);
    let hotel = create_hotel(&app, grand_plaza()).await;
    let id = hotel["id"].as_i64().unwrap();

    let response = delete_auth(app.app(), &format!("/api/v1/hotels/{id}"), &admin_token()).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = get(app.app(), &format!("/api/v1/hotels/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Media listing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_media_lists_uploaded_objects(pool: PgPool) {
    let app = build_test_app(pool);
    let mut body = grand_plaza();
    body["image"] = json!(png_data_url(Some("plaza.png")));
    create_hotel(&app, body).await;

    let response = get_auth(app.app(), "/api/v1/media?prefix=hotel_", &admin_token()).await;
    let json = expect_json(response, StatusCode::OK).await;
    let objects = json["data"].as_array().unwrap();
    assert_eq!(objects.len(), 1);
    let name = objects[0]["name"].as_str().unwrap();
    assert!(name.ends_with("_plaza.png"), "{name}");
    assert_eq!(objects[0]["content_type"], "image/png");

    let response = get(app.app(), "/api/v1/media").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
