//! Game create/update with a cover image.

use market_core::error::CoreError;
use market_core::slug::{slug_or_generate, updated_slug};
use market_core::storage::{FileCleanup, FileStore, GAME_IMAGES_DIR};
use market_core::types::DbId;
use market_db::models::game::{CreateGame, Game, UpdateGame};
use market_db::repositories::{GameRepo, RoleRepo};
use sqlx::PgPool;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::form::Upload;
use crate::middleware::actor::Actor;
use crate::services::{check_images, settle, store_upload};

/// Reject role keys that do not exist.
pub async fn ensure_roles_exist(pool: &PgPool, keys: &[String]) -> AppResult<()> {
    let unknown = RoleRepo::unknown_keys(pool, keys).await?;
    if unknown.is_empty() {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "Unknown role keys: {}",
            unknown.join(", ")
        )))
    }
}

pub async fn create_game(
    pool: &PgPool,
    files: &dyn FileStore,
    actor: &Actor,
    input: CreateGame,
    image: Option<Upload>,
) -> AppResult<Game> {
    input.validate()?;
    let slug = slug_or_generate(input.slug.as_deref(), &input.name)?;
    ensure_roles_exist(pool, &input.role_keys).await?;
    check_images(&image)?;

    let mut tx = pool.begin().await?;
    let mut cleanup = FileCleanup::new();
    let result = async {
        let image_path = match &image {
            Some(upload) => Some(store_upload(files, &mut cleanup, GAME_IMAGES_DIR, upload).await?),
            None => None,
        };
        let game = GameRepo::create(
            &mut *tx,
            &input,
            &slug,
            image_path.as_deref(),
            actor.user_id,
        )
        .await?;
        Ok::<_, AppError>(game)
    }
    .await;
    let game = settle(tx, result, cleanup, files).await?;

    tracing::info!(game_id = game.id, slug = %game.slug, "Game created");
    Ok(game)
}

/// Update a game. A new cover image replaces the old one after commit.
pub async fn update_game(
    pool: &PgPool,
    files: &dyn FileStore,
    actor: &Actor,
    id: DbId,
    input: UpdateGame,
    image: Option<Upload>,
) -> AppResult<Game> {
    let current = GameRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Game", id }))?;

    input.validate()?;
    let slug = updated_slug(input.slug.as_deref(), input.name.as_deref())?;
    if let Some(keys) = &input.role_keys {
        ensure_roles_exist(pool, keys).await?;
    }
    check_images(&image)?;

    let mut tx = pool.begin().await?;
    let mut cleanup = FileCleanup::new();
    let result = async {
        let image_path = match &image {
            Some(upload) => {
                let path = store_upload(files, &mut cleanup, GAME_IMAGES_DIR, upload).await?;
                if let Some(old) = &current.image_path {
                    cleanup.delete_on_success(old.clone());
                }
                Some(path)
            }
            None => None,
        };
        GameRepo::update(
            &mut *tx,
            id,
            &input,
            slug.as_deref(),
            image_path.as_deref(),
            actor.user_id,
        )
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Game", id }))
    }
    .await;
    let game = settle(tx, result, cleanup, files).await?;

    tracing::info!(game_id = game.id, "Game updated");
    Ok(game)
}
