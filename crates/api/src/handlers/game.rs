//! Handlers for the `/games` resource.
//!
//! Create and update take a multipart form: the JSON body in `payload` and
//! an optional cover image in `image`.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use market_core::error::CoreError;
use market_core::pagination::{clamp_limit, clamp_offset};
use market_core::types::DbId;
use market_db::models::game::{CreateGame, Game, UpdateGame};
use market_db::repositories::GameRepo;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::handlers::form::UploadForm;
use crate::middleware::actor::Actor;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::services::games;
use crate::state::AppState;

/// Multipart field carrying the cover image.
pub const IMAGE_FIELD: &str = "image";

/// A game with the roles allowed to use it.
#[derive(Debug, Serialize)]
pub struct GameDetail {
    #[serde(flatten)]
    pub game: Game,
    pub role_keys: Vec<String>,
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Game", id })
}

/// GET /api/v1/games
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Game>>>> {
    let limit = clamp_limit(params.limit);
    let offset = clamp_offset(params.offset);
    let games = GameRepo::list(&state.pool, limit, offset).await?;
    Ok(Json(DataResponse { data: games }))
}

/// GET /api/v1/games/usable
///
/// Games the actor can list accounts under: at least one account type of
/// the game admits one of the actor's roles.
pub async fn usable(
    State(state): State<AppState>,
    actor: Actor,
) -> AppResult<Json<DataResponse<Vec<Game>>>> {
    let games = GameRepo::list_usable(&state.pool, &actor.role_keys).await?;
    Ok(Json(DataResponse { data: games }))
}

/// POST /api/v1/games
pub async fn create(
    State(state): State<AppState>,
    actor: Actor,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<GameDetail>>)> {
    let mut form = UploadForm::read(multipart).await?;
    let input: CreateGame = form.payload()?;
    let image = form.take_file(IMAGE_FIELD);

    let game = games::create_game(&state.pool, state.files.as_ref(), &actor, input, image).await?;
    let role_keys = GameRepo::role_keys(&state.pool, game.id).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: GameDetail { game, role_keys },
        }),
    ))
}

/// GET /api/v1/games/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<GameDetail>>> {
    let game = GameRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let role_keys = GameRepo::role_keys(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: GameDetail { game, role_keys },
    }))
}

/// PUT /api/v1/games/{id}
pub async fn update(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<Json<DataResponse<GameDetail>>> {
    let mut form = UploadForm::read(multipart).await?;
    let input: UpdateGame = form.payload()?;
    let image = form.take_file(IMAGE_FIELD);

    let game =
        games::update_game(&state.pool, state.files.as_ref(), &actor, id, input, image).await?;
    let role_keys = GameRepo::role_keys(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: GameDetail { game, role_keys },
    }))
}

/// DELETE /api/v1/games/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    if GameRepo::soft_delete(&state.pool, id).await? {
        tracing::info!(game_id = id, "Game deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}
