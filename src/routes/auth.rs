use std::sync::Arc;

use axum::{
    extract::{State, TypedHeader},
    headers::{authorization::Bearer, Authorization, Cookie},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use log::trace;

use super::sessions::TOKEN_COOKIE;
use crate::model::{AppState, Error};

/// Let the request through only with a live session, which is handed to the
/// handler as an `Extension<Session>`.
///
/// The token is read from a bearer `Authorization` header, falling back to
/// the `token` cookie.
pub async fn authenticate<B>(
    State(state): State<Arc<AppState>>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    cookies: Option<TypedHeader<Cookie>>,
    mut request: Request<B>,
    next: Next<B>,
) -> Response {
    let token = bearer
        .as_ref()
        .map(|TypedHeader(authorization)| authorization.token())
        .or_else(|| {
            cookies
                .as_ref()
                .and_then(|TypedHeader(cookies)| cookies.get(TOKEN_COOKIE))
        });

    let identity = match state.identify(token).await {
        Ok(identity) => identity,
        Err(err) => return err.into_response(),
    };

    let Some(session) = identity.session() else {
        trace!("Rejecting request to {} without a session", request.uri());
        return Error::Unauthorized.into_response();
    };

    trace!("Request authenticated with session {}", session.id);
    request.extensions_mut().insert(session);

    next.run(request).await
}
