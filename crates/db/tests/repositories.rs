//! Repository integration tests against a real database.

use std::collections::{BTreeMap, BTreeSet};

use market_core::rules::Datatype;
use market_core::submission::Scope;
use market_db::models::account::NewAccount;
use market_db::models::account_type::{AccountTypeRole, CreateAccountType};
use market_db::models::discount_code::CreateDiscountCode;
use market_db::models::field_definition::CreateFieldDefinition;
use market_db::models::game::CreateGame;
use market_db::models::rule::CreateRule;
use market_db::models::user::CreateUser;
use market_db::repositories::{
    AccountRepo, AccountSearch, AccountTypeRepo, DiscountCodeRepo, FieldDefinitionRepo, GameRepo,
    RoleRepo, RuleRepo, UserRepo,
};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn text_rule(required: bool, required_roles: &[&str]) -> CreateRule {
    CreateRule {
        rule_type: "text".to_string(),
        datatype: Datatype::String,
        required,
        multiple: false,
        min: None,
        max: None,
        minlength: Some(1),
        maxlength: Some(50),
        values: Vec::new(),
        required_role_keys: required_roles.iter().map(|s| s.to_string()).collect(),
    }
}

fn definition(name: &str, rule: CreateRule) -> CreateFieldDefinition {
    CreateFieldDefinition {
        order: None,
        name: name.to_string(),
        slug: None,
        description: None,
        video_path: None,
        rule,
    }
}

async fn seed_user(pool: &PgPool, email: &str, roles: &[&str]) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            name: "Tester".to_string(),
            email: email.to_string(),
            silver_coin: Some(100),
            role_keys: roles.iter().map(|s| s.to_string()).collect(),
        },
    )
    .await
    .unwrap()
    .id
}

async fn seed_game_and_type(pool: &PgPool, user_id: i64) -> (i64, i64) {
    let mut conn = pool.acquire().await.unwrap();
    let game = GameRepo::create(
        &mut conn,
        &CreateGame {
            order: Some(1),
            name: "League".to_string(),
            slug: None,
            description: None,
            publisher_name: "Riot".to_string(),
            role_keys: vec!["seller".to_string()],
        },
        "league",
        None,
        user_id,
    )
    .await
    .unwrap();
    let account_type = AccountTypeRepo::create(
        &mut conn,
        game.id,
        &CreateAccountType {
            name: "Ranked".to_string(),
            slug: None,
            description: None,
            roles: vec![AccountTypeRole {
                role_key: "seller".to_string(),
                status_code: 0,
            }],
        },
        "ranked",
        user_id,
    )
    .await
    .unwrap();
    (game.id, account_type.id)
}

async fn seed_definition(
    pool: &PgPool,
    scope: Scope,
    owner_id: i64,
    user_id: i64,
    input: &CreateFieldDefinition,
) -> i64 {
    let mut tx = pool.begin().await.unwrap();
    let rule = RuleRepo::create(&mut tx, &input.rule).await.unwrap();
    let def = FieldDefinitionRepo::create(
        &mut tx,
        scope,
        owner_id,
        rule.rule.id,
        input,
        &input.name.to_lowercase(),
        user_id,
    )
    .await
    .unwrap();
    tx.commit().await.unwrap();
    def.id
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_rule_round_trips_required_roles(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let created = RuleRepo::create(&mut conn, &text_rule(false, &["seller", "admin"]))
        .await
        .unwrap();
    let id = created.rule.id;

    let found = RuleRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    let expected: BTreeSet<String> = ["admin", "seller"].iter().map(|s| s.to_string()).collect();
    assert_eq!(found.rule.required_roles, expected);
    assert_eq!(found.rule.maxlength, Some(50));

    let mut replacement = text_rule(true, &[]);
    replacement.values = vec![json!("eu"), json!("na")];
    let replaced = RuleRepo::replace(&mut conn, id, &replacement)
        .await
        .unwrap()
        .unwrap();
    assert!(replaced.rule.required);
    assert!(replaced.rule.required_roles.is_empty());

    let many = RuleRepo::find_many(&pool, &[id]).await.unwrap();
    assert_eq!(many[&id].values, vec![json!("eu"), json!("na")]);
    assert!(many[&id].required_roles.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_replace_missing_rule_returns_none(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let result = RuleRepo::replace(&mut conn, 999_999, &text_rule(false, &[]))
        .await
        .unwrap();
    assert!(result.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_field_rules_per_scope(pool: PgPool) {
    let user = seed_user(&pool, "a@example.com", &["seller"]).await;
    let (game_id, type_id) = seed_game_and_type(&pool, user).await;

    let info = seed_definition(
        &pool,
        Scope::AccountInfos,
        type_id,
        user,
        &definition("Rank", text_rule(true, &[])),
    )
    .await;
    let game_info = seed_definition(
        &pool,
        Scope::GameInfos,
        game_id,
        user,
        &definition("Server", text_rule(false, &["seller"])),
    )
    .await;

    let info_rules = FieldDefinitionRepo::field_rules(&pool, Scope::AccountInfos, type_id)
        .await
        .unwrap();
    assert_eq!(info_rules.len(), 1);
    assert_eq!(info_rules[0].field_id, info);
    assert!(info_rules[0].rule.required);

    let game_rules = FieldDefinitionRepo::field_rules(&pool, Scope::GameInfos, game_id)
        .await
        .unwrap();
    assert_eq!(game_rules[0].field_id, game_info);
    assert!(game_rules[0].rule.required_roles.contains("seller"));

    let actions = FieldDefinitionRepo::field_rules(&pool, Scope::AccountActions, type_id)
        .await
        .unwrap();
    assert!(actions.is_empty());

    assert!(FieldDefinitionRepo::soft_delete(&pool, Scope::AccountInfos, info)
        .await
        .unwrap());
    assert!(FieldDefinitionRepo::field_rules(&pool, Scope::AccountInfos, type_id)
        .await
        .unwrap()
        .is_empty());
    assert!(RuleRepo::is_referenced(&pool, info_rules[0].rule.id).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_status_for_role(pool: PgPool) {
    let user = seed_user(&pool, "b@example.com", &["seller"]).await;
    let (_, type_id) = seed_game_and_type(&pool, user).await;

    assert_eq!(
        AccountTypeRepo::status_for_role(&pool, type_id, "seller").await.unwrap(),
        Some(0)
    );
    assert_eq!(
        AccountTypeRepo::status_for_role(&pool, type_id, "customer").await.unwrap(),
        None
    );
    assert_eq!(RoleRepo::keys_for_user(&pool, user).await.unwrap(), vec!["seller"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_sync_replaces_pivot_rows(pool: PgPool) {
    let user = seed_user(&pool, "c@example.com", &["seller"]).await;
    let (_, type_id) = seed_game_and_type(&pool, user).await;
    let first = seed_definition(
        &pool,
        Scope::AccountInfos,
        type_id,
        user,
        &definition("Rank", text_rule(false, &[])),
    )
    .await;
    let second = seed_definition(
        &pool,
        Scope::AccountInfos,
        type_id,
        user,
        &definition("Region", text_rule(false, &[])),
    )
    .await;

    let mut tx = pool.begin().await.unwrap();
    let account = AccountRepo::create(
        &mut tx,
        &NewAccount {
            account_type_id: type_id,
            username: "player1".to_string(),
            password: "secret".to_string(),
            cost: 100,
            description: None,
            status_code: 0,
            role_key: "seller".to_string(),
            representative_image_path: None,
            creator_id: user,
        },
    )
    .await
    .unwrap();

    let values = BTreeMap::from([(first, json!("gold")), (second, json!("eu"))]);
    AccountRepo::sync_account_infos(&mut tx, account.id, &values)
        .await
        .unwrap();
    let values = BTreeMap::from([(second, json!("na"))]);
    AccountRepo::sync_account_infos(&mut tx, account.id, &values)
        .await
        .unwrap();
    tx.commit().await.unwrap();

    let stored = AccountRepo::account_info_values(&pool, account.id).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].field_id, second);
    assert_eq!(stored[0].value.0, json!("na"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_account_search(pool: PgPool) {
    let user = seed_user(&pool, "d@example.com", &["seller"]).await;
    let (_, type_id) = seed_game_and_type(&pool, user).await;

    let mut conn = pool.acquire().await.unwrap();
    for (name, cost) in [("dragon", 10), ("phoenix", 20)] {
        AccountRepo::create(
            &mut conn,
            &NewAccount {
                account_type_id: type_id,
                username: name.to_string(),
                password: "pw".to_string(),
                cost,
                description: Some(format!("{name} account")),
                status_code: 0,
                role_key: "seller".to_string(),
                representative_image_path: None,
                creator_id: user,
            },
        )
        .await
        .unwrap();
    }

    let all = AccountSearch::default();
    assert_eq!(AccountRepo::count(&pool, all).await.unwrap(), 2);
    let dragon = AccountSearch {
        term: Some("DRAG"),
        ..Default::default()
    };
    let found = AccountRepo::list(&pool, dragon, 15, 0).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].username, "dragon");
    let by_cost = AccountSearch {
        term: Some("20"),
        ..Default::default()
    };
    assert_eq!(AccountRepo::count(&pool, by_cost).await.unwrap(), 1);

    let other = seed_user(&pool, "other@example.com", &["seller"]).await;
    let mine = AccountSearch {
        creator_id: Some(user),
        ..Default::default()
    };
    let theirs = AccountSearch {
        creator_id: Some(other),
        ..Default::default()
    };
    assert_eq!(AccountRepo::count(&pool, mine).await.unwrap(), 2);
    assert!(AccountRepo::list(&pool, theirs, 15, 0).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_buyer_violates_unique(pool: PgPool) {
    let user = seed_user(&pool, "e@example.com", &["customer"]).await;
    DiscountCodeRepo::create(
        &pool,
        &CreateDiscountCode {
            discount_code: "SUMMER".to_string(),
            price: 10,
            buyable: true,
            name: "Summer".to_string(),
            description: None,
            minimum_price: None,
            maximum_price: None,
            minimum_discount: None,
            maximum_discount: None,
            percentage_discount: 10,
            direct_discount: 0,
            usable_at: None,
            usable_closed_at: None,
            offered_at: None,
            offer_closed_at: None,
        },
        user,
    )
    .await
    .unwrap();

    let mut conn = pool.acquire().await.unwrap();
    DiscountCodeRepo::add_buyer(&mut conn, "SUMMER", user, 10)
        .await
        .unwrap();
    assert!(DiscountCodeRepo::has_buyer(&mut conn, "SUMMER", user).await.unwrap());

    let err = DiscountCodeRepo::add_buyer(&mut conn, "SUMMER", user, 10)
        .await
        .unwrap_err();
    match err {
        sqlx::Error::Database(db_err) => {
            assert_eq!(db_err.code().as_deref(), Some("23505"));
            assert_eq!(db_err.constraint(), Some("uq_discount_code_buyers"));
        }
        other => panic!("expected database error, got {other:?}"),
    }
}
