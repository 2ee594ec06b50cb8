use axum::{
    extract::{FromRef, State},
    http::{header::LOCATION, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::instrument;

use crate::{
    state::AppState,
    users::{
        dto::{LegacySuccessBody, SuccessBody},
        error::UserError,
        extractors::{UserForm, UserId},
        services::UserService,
    },
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/user/findAll", get(find_all_users))
        .route("/user/find/:id", get(find_user))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/user/add", post(add_user))
        .route("/user/update/:id", put(update_user))
        .route("/user/delete/:id", delete(delete_user))
}

impl FromRef<AppState> for UserService {
    fn from_ref(state: &AppState) -> Self {
        state.users.clone()
    }
}

#[instrument(skip(state))]
pub async fn find_all_users(State(state): State<AppState>) -> Result<Response, UserError> {
    let users = state.users.find_all().await?;
    let body = SuccessBody::with_data("Find all users success", users);
    if state.config.legacy_list_key {
        Ok((StatusCode::OK, Json(LegacySuccessBody::from(body))).into_response())
    } else {
        Ok((StatusCode::OK, Json(body)).into_response())
    }
}

#[instrument(skip(users))]
pub async fn find_user(
    State(users): State<UserService>,
    UserId(id): UserId,
) -> Result<impl IntoResponse, UserError> {
    let user = users.find(id).await?;
    Ok((StatusCode::OK, Json(SuccessBody::with_data("Find user success", user))))
}

#[instrument(skip(users, payload))]
pub async fn add_user(
    State(users): State<UserService>,
    UserForm(payload): UserForm,
) -> Result<impl IntoResponse, UserError> {
    let user = users.create(payload).await?;

    let mut headers = HeaderMap::new();
    if let Some(id) = user.id {
        let location = HeaderValue::from_str(&format!("/user/find/{}", id))
            .map_err(|e| UserError::Unexpected(e.into()))?;
        headers.insert(LOCATION, location);
    }

    Ok((
        StatusCode::CREATED,
        headers,
        Json(SuccessBody::message("Add user success")),
    ))
}

#[instrument(skip(users, body))]
pub async fn update_user(
    State(users): State<UserService>,
    UserId(id): UserId,
    body: Result<UserForm, UserError>,
) -> Result<impl IntoResponse, UserError> {
    users.update(id, body.map(|UserForm(p)| p)).await?;
    Ok((StatusCode::OK, Json(SuccessBody::message("Update user success"))))
}

#[instrument(skip(users))]
pub async fn delete_user(
    State(users): State<UserService>,
    UserId(id): UserId,
) -> Result<impl IntoResponse, UserError> {
    users.delete(id).await?;
    Ok((StatusCode::OK, Json(SuccessBody::message("Delete user success"))))
}
