use market_core::roles::{ROLE_ADMIN, ROLE_CUSTOMER, ROLE_SELLER};
use market_db::repositories::RoleRepo;
use sqlx::PgPool;

/// Connect, migrate, verify the seeded roles.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_full_bootstrap(pool: PgPool) {
    market_db::health_check(&pool).await.unwrap();

    let keys: Vec<String> = RoleRepo::list(&pool)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.key)
        .collect();
    for expected in [ROLE_ADMIN, ROLE_CUSTOMER, ROLE_SELLER] {
        assert!(keys.iter().any(|k| k == expected), "role {expected} should be seeded");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_role_keys(pool: PgPool) {
    let unknown = RoleRepo::unknown_keys(
        &pool,
        &["admin".to_string(), "wizard".to_string(), "seller".to_string()],
    )
    .await
    .unwrap();
    assert_eq!(unknown, vec!["wizard".to_string()]);
}
