//! HTTP-level integration tests for discount codes.

mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, delete, get, post_empty, post_json, put_json, send_form, Form};
use serde_json::json;
use sqlx::PgPool;

async fn create_code(pool: &PgPool, admin: i64, code: &str, price: i64) {
    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/discount-codes",
        admin,
        json!({
            "discount_code": code,
            "name": "Summer sale",
            "price": price,
            "buyable": true,
            "percentage_discount": 20,
            "maximum_discount": 150
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

async fn silver_coin(pool: &PgPool, user: i64) -> i64 {
    let (coins,): (i64,) = sqlx::query_as("SELECT silver_coin FROM users WHERE id = $1")
        .bind(user)
        .fetch_one(pool)
        .await
        .unwrap();
    coins
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_buy_deducts_silver_coins(pool: PgPool) {
    let admin = common::seed_user(&pool, "admin@example.com", &["admin"]).await;
    let buyer = common::seed_user(&pool, "buyer@example.com", &["customer"]).await;
    create_code(&pool, admin, "SUMMER", 40).await;

    let app = common::build_test_app(pool.clone());
    let response = post_empty(app, "/api/v1/discount-codes/SUMMER/buy", buyer).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["price_paid"], 40);
    assert_eq!(json["data"]["silver_coin"], 60);
    assert_eq!(silver_coin(&pool, buyer).await, 60);

    let app = common::build_test_app(pool);
    let detail = body_json(get(app, "/api/v1/discount-codes/SUMMER").await).await;
    assert_eq!(detail["data"]["buyer_ids"], json!([buyer]));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_buy_twice_conflicts(pool: PgPool) {
    let admin = common::seed_user(&pool, "admin@example.com", &["admin"]).await;
    let buyer = common::seed_user(&pool, "buyer@example.com", &["customer"]).await;
    create_code(&pool, admin, "SUMMER", 10).await;

    let app = common::build_test_app(pool.clone());
    let response = post_empty(app, "/api/v1/discount-codes/SUMMER/buy", buyer).await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool.clone());
    let response = post_empty(app, "/api/v1/discount-codes/SUMMER/buy", buyer).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(silver_coin(&pool, buyer).await, 90);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_buy_with_insufficient_funds_writes_nothing(pool: PgPool) {
    let admin = common::seed_user(&pool, "admin@example.com", &["admin"]).await;
    let buyer = common::seed_user(&pool, "buyer@example.com", &["customer"]).await;
    create_code(&pool, admin, "PRICEY", 500).await;

    let app = common::build_test_app(pool.clone());
    let response = post_empty(app, "/api/v1/discount-codes/PRICEY/buy", buyer).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["code"], "INSUFFICIENT_FUNDS");
    assert_eq!(silver_coin(&pool, buyer).await, 100);

    let app = common::build_test_app(pool);
    let detail = body_json(get(app, "/api/v1/discount-codes/PRICEY").await).await;
    assert_eq!(detail["data"]["buyer_ids"], json!([]));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_buy_code_not_on_offer_conflicts(pool: PgPool) {
    let admin = common::seed_user(&pool, "admin@example.com", &["admin"]).await;
    let buyer = common::seed_user(&pool, "buyer@example.com", &["customer"]).await;
    create_code(&pool, admin, "CLOSED", 10).await;

    let app = common::build_test_app(pool.clone());
    let response = put_json(
        app,
        "/api/v1/discount-codes/CLOSED",
        admin,
        json!({"buyable": false}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool);
    let response = post_empty(app, "/api/v1/discount-codes/CLOSED/buy", buyer).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_code_conflicts_and_missing_code_404(pool: PgPool) {
    let admin = common::seed_user(&pool, "admin@example.com", &["admin"]).await;
    create_code(&pool, admin, "SUMMER", 10).await;

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/discount-codes",
        admin,
        json!({"discount_code": "SUMMER", "name": "Again"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let app = common::build_test_app(pool.clone());
    let response = get(app, "/api/v1/discount-codes/NOPE").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let app = common::build_test_app(pool);
    let response = delete(app, "/api/v1/discount-codes/SUMMER").await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_price_quote_requires_supported_game(pool: PgPool) {
    let admin = common::seed_user(&pool, "admin@example.com", &["admin"]).await;
    let seller = common::seed_user(&pool, "seller@example.com", &["seller"]).await;
    create_code(&pool, admin, "SUMMER", 10).await;

    let app = common::build_test_app(pool.clone());
    let form = Form::new().payload(json!({
        "name": "Dragon Quest",
        "publisher_name": "Square",
        "role_keys": ["seller"]
    }));
    let response = send_form(app, Method::POST, "/api/v1/games", admin, form).await;
    let game_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        &format!("/api/v1/games/{game_id}/account-types"),
        admin,
        json!({"name": "Casual", "roles": [{"role_key": "seller", "status_code": 0}]}),
    )
    .await;
    let type_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let form = Form::new().payload(json!({
        "roleKey": "seller",
        "username": "slime",
        "password": "pw",
        "cost": 1000
    }));
    let response = send_form(
        app,
        Method::POST,
        &format!("/api/v1/account-types/{type_id}/accounts"),
        seller,
        form,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let account_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let json = body_json(get(app, &format!("/api/v1/accounts/{account_id}/price")).await).await;
    assert_eq!(json["data"]["price"], 1000);
    assert!(json["data"]["discount_code"].is_null());

    let app = common::build_test_app(pool.clone());
    let response = get(
        app,
        &format!("/api/v1/accounts/{account_id}/price?discount_code=SUMMER"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        &format!("/api/v1/games/{game_id}/discount-codes/SUMMER"),
        admin,
        json!({"type_code": 1}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // 20% of 1000 is 200, capped at 150.
    let app = common::build_test_app(pool);
    let json = body_json(
        get(
            app,
            &format!("/api/v1/accounts/{account_id}/price?discount_code=SUMMER"),
        )
        .await,
    )
    .await;
    assert_eq!(json["data"]["temporary_price"], 1000);
    assert_eq!(json["data"]["price"], 850);
    assert_eq!(json["data"]["discount_code"], "SUMMER");
}
