use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Extension};
use axum_macros::debug_handler;

use super::extract::{Json, Path};
use crate::model::{
    pin::{self, NewPin},
    user, AppState, Error, Pin, Session,
};

#[debug_handler]
pub async fn list_by_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<user::Id>,
) -> Result<Json<Vec<Pin>>, Error> {
    Ok(Json(state.pins_by_user(&user_id).await?))
}

#[debug_handler]
pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Json(new_pin): Json<NewPin>,
) -> Result<(StatusCode, Json<Pin>), Error> {
    let pin = state.create_pin(&session, new_pin).await?;
    Ok((StatusCode::CREATED, Json(pin)))
}

#[debug_handler]
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(id): Path<pin::Id>,
) -> Result<StatusCode, Error> {
    state.delete_pin(&session, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
