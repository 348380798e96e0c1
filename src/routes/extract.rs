use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    response::{IntoResponse, Response},
};
use axum_macros::{FromRequest, FromRequestParts};
use log::debug;
use serde::Serialize;

use crate::model::Error;

/// `axum::Json`, but a body that can't be read is answered like any other
/// [`Error::InvalidInput`].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        let Self(value) = self;
        axum::Json(value).into_response()
    }
}

/// `axum::extract::Path` with the same error body as everything else.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Error))]
pub struct Path<T>(pub T);

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        debug!("Rejected request body: {}", rejection);

        match rejection {
            JsonRejection::MissingJsonContentType(_) => {
                Error::InvalidInput("expected a JSON request body")
            }
            JsonRejection::JsonSyntaxError(_) => Error::InvalidInput("request body is not valid JSON"),
            _ => Error::InvalidInput("request body has missing or invalid fields"),
        }
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        debug!("Rejected path parameters: {}", rejection);
        Error::InvalidInput("invalid path parameter")
    }
}
