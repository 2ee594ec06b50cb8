use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::{header::CONTENT_TYPE, request::Parts, HeaderMap},
    Form, Json,
};
use tracing::debug;

use crate::users::{dto::UserPayload, error::UserError};

/// `{id}` path segment. Anything that is not an integer cannot name a user.
pub struct UserId(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = UserError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| UserError::NotFound)?;
        raw.parse::<i64>().map(UserId).map_err(|_| {
            debug!(id = %raw, "non-numeric user id");
            UserError::NotFound
        })
    }
}

/// Top-level `name` / `email` fields from a JSON or urlencoded body.
/// Other content types carry no fields.
pub struct UserForm(pub UserPayload);

#[derive(Debug, PartialEq, Eq)]
enum BodyKind {
    Json,
    Form,
    Other,
}

fn body_kind(headers: &HeaderMap) -> BodyKind {
    let Some(ct) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return BodyKind::Other;
    };
    let mime = ct
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if mime == "application/json" || mime.ends_with("+json") {
        BodyKind::Json
    } else if mime == "application/x-www-form-urlencoded" {
        BodyKind::Form
    } else {
        BodyKind::Other
    }
}

#[async_trait]
impl<S> FromRequest<S> for UserForm
where
    S: Send + Sync,
{
    type Rejection = UserError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match body_kind(req.headers()) {
            BodyKind::Json => {
                let Json(payload) = Json::<UserPayload>::from_request(req, state)
                    .await
                    .map_err(|r| UserError::BadRequest(r.body_text()))?;
                Ok(UserForm(payload))
            }
            BodyKind::Form => {
                let Form(payload) = Form::<UserPayload>::from_request(req, state)
                    .await
                    .map_err(|r| UserError::BadRequest(r.body_text()))?;
                Ok(UserForm(payload))
            }
            BodyKind::Other => Ok(UserForm(UserPayload::default())),
        }
    }
}
