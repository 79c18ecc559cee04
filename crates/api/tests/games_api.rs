//! HTTP-level integration tests for games and their cover images.

mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, delete, get, send_form, Form};
use serde_json::json;
use sqlx::PgPool;

fn game_images(root: &std::path::Path) -> usize {
    std::fs::read_dir(root.join("game-images"))
        .map(|entries| entries.count())
        .unwrap_or(0)
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_game_with_image(pool: PgPool) {
    let dir = tempfile::tempdir().unwrap();
    let admin = common::seed_user(&pool, "admin@example.com", &["admin"]).await;

    let app = common::build_test_app_with_files(pool, dir.path());
    let form = Form::new()
        .payload(json!({
            "name": "Final Fantasy XIV",
            "publisher_name": "Square",
            "role_keys": ["seller", "customer"]
        }))
        .file("image", "cover.JPG", b"jpeg");
    let response = send_form(app, Method::POST, "/api/v1/games", admin, form).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["slug"], "final-fantasy-xiv");
    assert_eq!(json["data"]["role_keys"], json!(["customer", "seller"]));
    assert!(json["data"]["image_path"]
        .as_str()
        .unwrap()
        .ends_with(".jpg"));
    assert_eq!(game_images(dir.path()), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_game_with_unknown_role_is_rejected(pool: PgPool) {
    let dir = tempfile::tempdir().unwrap();
    let admin = common::seed_user(&pool, "admin@example.com", &["admin"]).await;

    let app = common::build_test_app_with_files(pool, dir.path());
    let form = Form::new()
        .payload(json!({
            "name": "Tetris",
            "publisher_name": "Nintendo",
            "role_keys": ["wizard"]
        }))
        .file("image", "cover.png", b"png");
    let response = send_form(app, Method::POST, "/api/v1/games", admin, form).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(game_images(dir.path()), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_slug_removes_uploaded_image(pool: PgPool) {
    let dir = tempfile::tempdir().unwrap();
    let admin = common::seed_user(&pool, "admin@example.com", &["admin"]).await;
    let payload = json!({"name": "Tetris", "publisher_name": "Nintendo"});

    let app = common::build_test_app_with_files(pool.clone(), dir.path());
    let response = send_form(
        app,
        Method::POST,
        "/api/v1/games",
        admin,
        Form::new().payload(payload.clone()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = common::build_test_app_with_files(pool, dir.path());
    let response = send_form(
        app,
        Method::POST,
        "/api/v1/games",
        admin,
        Form::new()
            .payload(payload)
            .file("image", "cover.png", b"png"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(game_images(dir.path()), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_game_replaces_image(pool: PgPool) {
    let dir = tempfile::tempdir().unwrap();
    let admin = common::seed_user(&pool, "admin@example.com", &["admin"]).await;

    let app = common::build_test_app_with_files(pool.clone(), dir.path());
    let form = Form::new()
        .payload(json!({"name": "Tetris", "publisher_name": "Nintendo"}))
        .file("image", "old.png", b"old");
    let created = body_json(send_form(app, Method::POST, "/api/v1/games", admin, form).await).await;
    let id = created["data"]["id"].as_i64().unwrap();

    let app = common::build_test_app_with_files(pool.clone(), dir.path());
    let form = Form::new()
        .payload(json!({"name": "Tetris 99", "role_keys": ["seller"]}))
        .file("image", "new.gif", b"new");
    let response = send_form(app, Method::PUT, &format!("/api/v1/games/{id}"), admin, form).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["slug"], "tetris-99");
    assert_eq!(json["data"]["publisher_name"], "Nintendo");
    assert_eq!(json["data"]["role_keys"], json!(["seller"]));
    assert!(json["data"]["image_path"].as_str().unwrap().ends_with(".gif"));
    assert_eq!(game_images(dir.path()), 1);

    let app = common::build_test_app_with_files(pool.clone(), dir.path());
    let response = delete(app, &format!("/api/v1/games/{id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app_with_files(pool, dir.path());
    let response = get(app, &format!("/api/v1/games/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_roles(pool: PgPool) {
    let app = common::build_test_app(pool);
    let json = body_json(get(app, "/api/v1/roles").await).await;

    let keys: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["key"].as_str().unwrap())
        .collect();
    assert_eq!(keys, vec!["admin", "customer", "seller"]);
}
