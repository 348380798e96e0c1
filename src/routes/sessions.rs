use std::sync::Arc;

use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Extension,
};
use axum_macros::debug_handler;
use log::{debug, error};

use super::extract::Json;
use crate::model::{session::Token, AppState, Error, Session, User};

pub const TOKEN_COOKIE: &str = "token";

#[derive(Debug, serde::Deserialize)]
pub struct CreateSession {
    username: String,
    password: String,
}

/// What the client keeps after logging in or registering.
#[derive(Debug, serde::Serialize)]
pub struct Authenticated {
    pub user: User,
    pub token: Token,
}

#[debug_handler]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateSession>,
) -> Result<Response, Error> {
    debug!("Got login request for user: {}", body.username);

    let (user, session) = state.login(&body.username, &body.password).await?;
    Ok(authenticated_response(StatusCode::OK, user, session))
}

#[debug_handler]
pub async fn logout(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Result<Response, Error> {
    state.logout(&session).await?;

    let mut response = StatusCode::RESET_CONTENT.into_response();
    set_cookie(&mut response, make_cookie("", 0));
    Ok(response)
}

pub(super) fn authenticated_response(status: StatusCode, user: User, session: Session) -> Response {
    let max_age = (session.expires_at - session.created_at).num_seconds();
    let cookie = make_cookie(&session.token, max_age);

    let mut response = (
        status,
        Json(Authenticated {
            user,
            token: session.token,
        }),
    )
        .into_response();
    set_cookie(&mut response, cookie);

    response
}

fn make_cookie(token: &str, max_age: i64) -> String {
    format!(
        // In production, the secure flag should be present
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        TOKEN_COOKIE, token, max_age,
    )
}

fn set_cookie(response: &mut Response, cookie: String) {
    match HeaderValue::try_from(cookie) {
        Ok(value) => {
            response.headers_mut().insert(SET_COOKIE, value);
        }
        Err(err) => error!("Failed to build session cookie: {}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_format() {
        assert_eq!(
            make_cookie("abc", 60),
            "token=abc; HttpOnly; SameSite=Lax; Path=/; Max-Age=60"
        );
    }
}
