use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument};

use super::dto::{Ack, RecipePayload, SavedAck};
use crate::{
    auth::extractors::SessionUser, error::ApiError, extract::ValidJson, state::AppState,
    store::Recipe,
};

pub fn read_routes() -> Router<AppState> {
    Router::new().route("/api/recipes", get(list_recipes))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/api/recipes", post(create_recipe))
        .route(
            "/api/recipes/:id",
            put(update_recipe).delete(delete_recipe),
        )
}

#[instrument(skip(state))]
pub async fn list_recipes(State(state): State<AppState>) -> Result<Json<Vec<Recipe>>, ApiError> {
    let recipes = state.store.list().await?;
    Ok(Json(recipes))
}

#[instrument(skip(state, user, payload))]
pub async fn create_recipe(
    State(state): State<AppState>,
    user: Option<SessionUser>,
    ValidJson(payload): ValidJson<RecipePayload>,
) -> Result<Json<SavedAck>, ApiError> {
    let recipe = state.store.create(payload.validate()?).await?;
    info!(id = recipe.id, user_id = actor(&user), "recipe created");
    Ok(Json(SavedAck {
        message: "saved",
        status: "ok",
    }))
}

#[instrument(skip(state, user, payload))]
pub async fn update_recipe(
    State(state): State<AppState>,
    user: Option<SessionUser>,
    Path(id): Path<i64>,
    ValidJson(payload): ValidJson<RecipePayload>,
) -> Result<Json<Ack>, ApiError> {
    state.store.update(id, payload.validate()?).await?;
    info!(id, user_id = actor(&user), "recipe updated");
    Ok(Json(Ack { message: "updated" }))
}

/// Deleting an absent id still reports success.
#[instrument(skip(state, user))]
pub async fn delete_recipe(
    State(state): State<AppState>,
    user: Option<SessionUser>,
    Path(id): Path<i64>,
) -> Result<Json<Ack>, ApiError> {
    let existed = state.store.delete(id).await?;
    info!(id, existed, user_id = actor(&user), "recipe deleted");
    Ok(Json(Ack { message: "deleted" }))
}

fn actor(user: &Option<SessionUser>) -> Option<i64> {
    user.as_ref().map(|SessionUser(id)| *id)
}
