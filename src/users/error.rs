use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::users::{dto::ErrorBody, validator::Violations};

pub const USER_NOT_FOUND: &str = "User not found";

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("{}", USER_NOT_FOUND)]
    NotFound,
    #[error("{0}")]
    Validation(Violations),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0:#}")]
    Unexpected(#[from] anyhow::Error),
}

impl UserError {
    /// Status carried by the failure itself, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            UserError::NotFound => Some(StatusCode::NOT_FOUND),
            UserError::Validation(_) | UserError::BadRequest(_) => Some(StatusCode::BAD_REQUEST),
            UserError::Unexpected(_) => None,
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let status = self.status().unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
