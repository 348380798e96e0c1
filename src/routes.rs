mod auth;
mod extract;
mod pins;
mod register;
mod sessions;
mod users;

use std::sync::Arc;

use axum::{
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use log::{error, warn};

use crate::model::{AppState, Error};

pub fn router(state: Arc<AppState>) -> Router {
    // Everything in here needs a live session
    let authenticated = Router::new()
        .route("/api/auth/logout", post(sessions::logout))
        .route("/api/users/:id/follow", put(users::follow))
        .route("/api/users/:id/unfollow", put(users::unfollow))
        .route("/api/pins", post(pins::create))
        .route("/api/pins/:id", delete(pins::delete))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::authenticate,
        ));

    Router::new()
        .route("/api/auth/register", post(register::register))
        .route("/api/auth/login", post(sessions::login))
        .route("/api/profiles/:username", get(users::find_by_name))
        .route("/api/users/:id", get(users::get_user))
        .route("/api/users/:id/pins", get(pins::list_by_user))
        .route("/api/users/:id/followings", get(users::followings))
        .route("/api/users/:id/followers", get(users::followers))
        .merge(authenticated)
        .with_state(state)
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::InvalidInput(_) | Error::SelfFollowNotAllowed => StatusCode::BAD_REQUEST,
            Error::InvalidCredentials | Error::Unauthorized => StatusCode::UNAUTHORIZED,
            Error::Forbidden => StatusCode::FORBIDDEN,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::DuplicateUsername | Error::DuplicateEmail => StatusCode::CONFLICT,
            err if err.is_retryable() => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match status {
            StatusCode::SERVICE_UNAVAILABLE => {
                warn!("Request failed, client may retry: {}", self);
                "temporarily unavailable, try again".to_string()
            }
            StatusCode::INTERNAL_SERVER_ERROR => {
                error!("Request failed: {}", self);
                "internal server error".to_string()
            }
            _ => self.to_string(),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
