use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Response};
use axum_macros::debug_handler;
use log::debug;

use super::{extract::Json, sessions::authenticated_response};
use crate::model::{user::NewUser, AppState, Error};

#[debug_handler]
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(new_user): Json<NewUser>,
) -> Result<Response, Error> {
    debug!("Got register request for user: {}", new_user.username);

    let (user, session) = state.register(new_user).await?;
    Ok(authenticated_response(StatusCode::CREATED, user, session))
}
