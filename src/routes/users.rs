use std::sync::Arc;

use axum::{extract::State, Extension};
use axum_macros::debug_handler;
use serde_json::{json, Value};

use super::extract::{Json, Path};
use crate::model::{user, AppState, Error, Session, User};

#[debug_handler]
pub async fn find_by_name(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<User>, Error> {
    Ok(Json(state.find_user_by_name(&username).await?))
}

#[debug_handler]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<user::Id>,
) -> Result<Json<User>, Error> {
    Ok(Json(state.find_user(&id).await?))
}

#[debug_handler]
pub async fn followings(
    State(state): State<Arc<AppState>>,
    Path(id): Path<user::Id>,
) -> Result<Json<Vec<User>>, Error> {
    Ok(Json(state.followings(&id).await?))
}

#[debug_handler]
pub async fn followers(
    State(state): State<Arc<AppState>>,
    Path(id): Path<user::Id>,
) -> Result<Json<Vec<User>>, Error> {
    Ok(Json(state.followers(&id).await?))
}

#[debug_handler]
pub async fn follow(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(target): Path<user::Id>,
) -> Result<Json<Value>, Error> {
    state.follow(&session, &target).await?;
    Ok(Json(json!({ "status": "followed" })))
}

#[debug_handler]
pub async fn unfollow(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(target): Path<user::Id>,
) -> Result<Json<Value>, Error> {
    state.unfollow(&session, &target).await?;
    Ok(Json(json!({ "status": "unfollowed" })))
}
