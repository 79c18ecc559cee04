//! Account submission: create and update with dynamic field values and
//! images.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use market_core::error::CoreError;
use market_core::pricing::temporary_price;
use market_core::roles::RoleKey;
use market_core::storage::{FileCleanup, FileStore, ACCOUNT_IMAGES_DIR};
use market_core::submission::{
    accepted_values, done_flag, validate_submission, FieldRule, Scope, ScopedPayload,
    SubmissionMode,
};
use market_core::types::DbId;
use market_db::models::account::{
    Account, AccountChanges, AccountImage, ActionState, FieldValue, NewAccount,
};
use market_db::models::account_type::AccountType;
use market_db::repositories::{
    AccountFeeRepo, AccountImageRepo, AccountRepo, AccountTypeRepo, FieldDefinitionRepo,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::{PgConnection, PgPool};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::form::Upload;
use crate::middleware::actor::Actor;
use crate::services::{check_images, settle, store_upload};

// ---------------------------------------------------------------------------
// Input / output
// ---------------------------------------------------------------------------

/// JSON body of an account create or update.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AccountSubmission {
    /// Role the submission is made under. On update, defaults to the role
    /// last used on the account.
    pub role_key: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub username: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub password: Option<String>,
    #[validate(range(min = 0, max = 1_000_000_000_000i64))]
    pub cost: Option<i64>,
    #[validate(length(max = 10000))]
    pub description: Option<String>,
    pub account_infos: Option<Map<String, Value>>,
    pub account_actions: Option<Map<String, Value>>,
    pub game_infos: Option<Map<String, Value>>,
}

/// Files uploaded with a submission.
#[derive(Debug, Clone, Default)]
pub struct AccountImages {
    pub representative: Option<Upload>,
    pub gallery: Vec<Upload>,
}

/// An account with its computed price.
#[derive(Debug, Serialize)]
pub struct AccountResource {
    #[serde(flatten)]
    pub account: Account,
    /// Cost plus the account type's fee.
    pub price: i64,
}

/// An account with its price, field values and gallery.
#[derive(Debug, Serialize)]
pub struct AccountDetail {
    #[serde(flatten)]
    pub account: Account,
    pub price: i64,
    pub account_infos: Vec<FieldValue>,
    pub account_actions: Vec<ActionState>,
    pub game_infos: Vec<FieldValue>,
    pub images: Vec<AccountImage>,
}

// ---------------------------------------------------------------------------
// Field values
// ---------------------------------------------------------------------------

/// Field rules of every scope for one account type.
struct ScopeFields {
    account_infos: Vec<FieldRule>,
    account_actions: Vec<FieldRule>,
    game_infos: Vec<FieldRule>,
}

impl ScopeFields {
    async fn load(pool: &PgPool, account_type: &AccountType) -> AppResult<Self> {
        Ok(Self {
            account_infos: FieldDefinitionRepo::field_rules(
                pool,
                Scope::AccountInfos,
                account_type.id,
            )
            .await?,
            account_actions: FieldDefinitionRepo::field_rules(
                pool,
                Scope::AccountActions,
                account_type.id,
            )
            .await?,
            game_infos: FieldDefinitionRepo::field_rules(
                pool,
                Scope::GameInfos,
                account_type.game_id,
            )
            .await?,
        })
    }

    fn validate(
        &self,
        role: &RoleKey,
        input: &AccountSubmission,
        mode: SubmissionMode,
    ) -> Result<(), CoreError> {
        let parts = [
            ScopedPayload {
                scope: Scope::AccountInfos,
                fields: &self.account_infos,
                payload: input.account_infos.as_ref(),
            },
            ScopedPayload {
                scope: Scope::AccountActions,
                fields: &self.account_actions,
                payload: input.account_actions.as_ref(),
            },
            ScopedPayload {
                scope: Scope::GameInfos,
                fields: &self.game_infos,
                payload: input.game_infos.as_ref(),
            },
        ];
        validate_submission(role, &parts, mode)
    }

    /// Values to write for each scope `mode` keeps.
    fn accepted(&self, input: &AccountSubmission, mode: SubmissionMode) -> FieldValues {
        let empty = Map::new();
        let values = |payload: &Option<Map<String, Value>>, fields: &[FieldRule]| {
            mode.effective_payload(payload.as_ref(), &empty)
                .map(|p| scope_values(p, fields))
        };
        FieldValues {
            account_infos: values(&input.account_infos, &self.account_infos),
            account_actions: values(&input.account_actions, &self.account_actions).map(
                |values| {
                    values
                        .into_iter()
                        .map(|(id, value)| (id, done_flag(&value)))
                        .collect()
                },
            ),
            game_infos: values(&input.game_infos, &self.game_infos),
        }
    }
}

fn scope_values(payload: &Map<String, Value>, fields: &[FieldRule]) -> BTreeMap<DbId, Value> {
    let known: BTreeSet<DbId> = fields.iter().map(|f| f.field_id).collect();
    accepted_values(payload, &known)
}

/// Pivot contents to write; `None` leaves a scope untouched.
struct FieldValues {
    account_infos: Option<BTreeMap<DbId, Value>>,
    account_actions: Option<BTreeMap<DbId, bool>>,
    game_infos: Option<BTreeMap<DbId, Value>>,
}

async fn sync_values(
    conn: &mut PgConnection,
    account_id: DbId,
    values: &FieldValues,
) -> Result<(), sqlx::Error> {
    if let Some(infos) = &values.account_infos {
        AccountRepo::sync_account_infos(&mut *conn, account_id, infos).await?;
    }
    if let Some(actions) = &values.account_actions {
        AccountRepo::sync_account_actions(&mut *conn, account_id, actions).await?;
    }
    if let Some(game_infos) = &values.game_infos {
        AccountRepo::sync_game_infos(&mut *conn, account_id, game_infos).await?;
    }
    Ok(())
}

async fn add_gallery(
    conn: &mut PgConnection,
    files: &dyn FileStore,
    cleanup: &mut FileCleanup,
    account_id: DbId,
    gallery: &[Upload],
) -> AppResult<()> {
    for upload in gallery {
        let path = store_upload(files, cleanup, ACCOUNT_IMAGES_DIR, upload).await?;
        AccountImageRepo::create(&mut *conn, account_id, &path).await?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// Create an account under `account_type_id`.
///
/// The role must belong to the actor and be allowed on the account type;
/// its pivot row decides the initial status. Every scope is validated, an
/// absent one as `{}`.
pub async fn create_account(
    pool: &PgPool,
    files: &dyn FileStore,
    actor: &Actor,
    account_type_id: DbId,
    input: AccountSubmission,
    images: AccountImages,
) -> AppResult<Account> {
    let account_type = AccountTypeRepo::find_by_id(pool, account_type_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "AccountType",
            id: account_type_id,
        }))?;

    let requested = input
        .role_key
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("roleKey is required".into()))?;
    let role = actor.resolve_role(requested)?;
    let status_code = AccountTypeRepo::status_for_role(pool, account_type.id, role.as_str())
        .await?
        .ok_or_else(|| CoreError::RoleNotFound(role.to_string()))?;

    input.validate()?;
    let (username, password, cost) = match (&input.username, &input.password, input.cost) {
        (Some(u), Some(p), Some(c)) => (u.clone(), p.clone(), c),
        _ => {
            return Err(AppError::BadRequest(
                "username, password and cost are required".into(),
            ))
        }
    };

    let fields = ScopeFields::load(pool, &account_type).await?;
    fields.validate(&role, &input, SubmissionMode::Create)?;
    check_images(images.representative.iter().chain(&images.gallery))?;

    let new = NewAccount {
        account_type_id: account_type.id,
        username,
        password,
        cost,
        description: input.description.clone(),
        status_code,
        role_key: role.to_string(),
        representative_image_path: None,
        creator_id: actor.user_id,
    };
    let values = fields.accepted(&input, SubmissionMode::Create);

    let mut tx = pool.begin().await?;
    let mut cleanup = FileCleanup::new();
    let result = insert_account(&mut *tx, files, &mut cleanup, new, &images, &values).await;
    let account = settle(tx, result, cleanup, files).await?;

    tracing::info!(
        account_id = account.id,
        account_type_id,
        role = %role,
        status_code = account.status_code,
        "Account created"
    );
    Ok(account)
}

async fn insert_account(
    conn: &mut PgConnection,
    files: &dyn FileStore,
    cleanup: &mut FileCleanup,
    mut new: NewAccount,
    images: &AccountImages,
    values: &FieldValues,
) -> AppResult<Account> {
    if let Some(upload) = &images.representative {
        let path = store_upload(files, cleanup, ACCOUNT_IMAGES_DIR, upload).await?;
        new.representative_image_path = Some(path);
    }

    let account = AccountRepo::create(&mut *conn, &new).await?;
    sync_values(&mut *conn, account.id, values).await?;
    add_gallery(&mut *conn, files, cleanup, account.id, &images.gallery).await?;
    Ok(account)
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

/// Update an account.
///
/// Only scopes present and non-empty in `input` are validated and
/// re-synced. A new representative image replaces the old one, which is
/// deleted only once the transaction has committed.
pub async fn update_account(
    pool: &PgPool,
    files: &dyn FileStore,
    actor: &Actor,
    account_id: DbId,
    input: AccountSubmission,
    images: AccountImages,
) -> AppResult<Account> {
    let account = AccountRepo::find_by_id(pool, account_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Account",
            id: account_id,
        }))?;
    let account_type = AccountTypeRepo::find_by_id(pool, account.account_type_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "AccountType",
            id: account.account_type_id,
        }))?;

    let requested = input
        .role_key
        .as_deref()
        .unwrap_or(&account.last_role_key_editor_used);
    let role = actor.resolve_role(requested)?;

    input.validate()?;
    let fields = ScopeFields::load(pool, &account_type).await?;
    fields.validate(&role, &input, SubmissionMode::Update)?;
    check_images(images.representative.iter().chain(&images.gallery))?;

    let changes = AccountChanges {
        username: input.username.clone(),
        password: input.password.clone(),
        cost: input.cost,
        description: input.description.clone(),
        role_key: role.to_string(),
        representative_image_path: None,
        updater_id: actor.user_id,
    };
    let values = fields.accepted(&input, SubmissionMode::Update);

    let mut tx = pool.begin().await?;
    let mut cleanup = FileCleanup::new();
    let result = apply_update(
        &mut *tx,
        files,
        &mut cleanup,
        &account,
        changes,
        &images,
        &values,
    )
    .await;
    let updated = settle(tx, result, cleanup, files).await?;

    tracing::info!(account_id, role = %role, "Account updated");
    Ok(updated)
}

async fn apply_update(
    conn: &mut PgConnection,
    files: &dyn FileStore,
    cleanup: &mut FileCleanup,
    current: &Account,
    mut changes: AccountChanges,
    images: &AccountImages,
    values: &FieldValues,
) -> AppResult<Account> {
    if let Some(upload) = &images.representative {
        let path = store_upload(files, cleanup, ACCOUNT_IMAGES_DIR, upload).await?;
        if let Some(old) = &current.representative_image_path {
            cleanup.delete_on_success(old.clone());
        }
        changes.representative_image_path = Some(path);
    }

    let account = AccountRepo::update(&mut *conn, current.id, &changes)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Account",
            id: current.id,
        }))?;
    sync_values(&mut *conn, account.id, values).await?;
    add_gallery(&mut *conn, files, cleanup, account.id, &images.gallery).await?;
    Ok(account)
}

// ---------------------------------------------------------------------------
// Read models
// ---------------------------------------------------------------------------

async fn price_of(pool: &PgPool, account: &Account) -> Result<i64, sqlx::Error> {
    let schedules: Vec<_> = AccountFeeRepo::list_by_account_type(pool, account.account_type_id)
        .await?
        .iter()
        .map(|fee| fee.schedule())
        .collect();
    Ok(temporary_price(account.cost, &schedules))
}

/// Attach prices to a page of accounts, loading each type's fees once.
pub async fn with_prices(
    pool: &PgPool,
    accounts: Vec<Account>,
) -> Result<Vec<AccountResource>, sqlx::Error> {
    let mut schedules = HashMap::new();
    let mut out = Vec::with_capacity(accounts.len());
    for account in accounts {
        if !schedules.contains_key(&account.account_type_id) {
            let fees = AccountFeeRepo::list_by_account_type(pool, account.account_type_id).await?;
            let list: Vec<_> = fees.iter().map(|fee| fee.schedule()).collect();
            schedules.insert(account.account_type_id, list);
        }
        let price = schedules
            .get(&account.account_type_id)
            .map_or(account.cost, |s| temporary_price(account.cost, s));
        out.push(AccountResource { account, price });
    }
    Ok(out)
}

/// Load everything shown on a single account.
pub async fn load_detail(pool: &PgPool, account: Account) -> Result<AccountDetail, sqlx::Error> {
    let price = price_of(pool, &account).await?;
    let account_infos = AccountRepo::account_info_values(pool, account.id).await?;
    let account_actions = AccountRepo::action_states(pool, account.id).await?;
    let game_infos = AccountRepo::game_info_values(pool, account.id).await?;
    let images = AccountImageRepo::list_by_account(pool, account.id).await?;
    Ok(AccountDetail {
        account,
        price,
        account_infos,
        account_actions,
        game_infos,
        images,
    })
}
