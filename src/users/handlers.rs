use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{AuthUser, JwtKeys},
    error::{ApiError, ApiResult},
    state::AppState,
    users::{
        dto::{LoginRequest, LoginResponse, PublicUser, SignupRequest, UpdateUserRequest},
        services,
    },
};

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/user/signup", post(signup))
        .route("/user/login", post(login))
}

pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/user", get(list_users))
        .route(
            "/user/:id",
            get(get_user).patch(update_user).delete(delete_user),
        )
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = services::signup(state.users.as_ref(), payload).await?;
    let location = format!("/user/{}", user.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(PublicUser::from(user)),
    ))
}

#[instrument(skip(state, keys, payload))]
pub async fn login(
    State(state): State<AppState>,
    State(keys): State<JwtKeys>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let token = services::login(state.users.as_ref(), &keys, payload).await?;
    Ok(Json(LoginResponse {
        message: "Login successful".into(),
        token,
    }))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    _caller: AuthUser,
) -> ApiResult<Json<Vec<PublicUser>>> {
    let users = state.users.list().await?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    _caller: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<PublicUser>> {
    let user = state.users.find_by_id(&id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> ApiResult<Json<PublicUser>> {
    ensure_self(&state, &caller, &id).await?;
    let user = services::update_user(state.users.as_ref(), &id, payload).await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<PublicUser>> {
    ensure_self(&state, &caller, &id).await?;
    let user = state.users.delete(&id).await?.ok_or(ApiError::NotFound)?;
    info!(user_id = %user.id, "user deleted");
    Ok(Json(user.into()))
}

/// 404 for an unknown account, 403 for someone else's.
async fn ensure_self(state: &AppState, caller: &AuthUser, id: &str) -> ApiResult<()> {
    if state.users.find_by_id(id).await?.is_none() {
        return Err(ApiError::NotFound);
    }
    if caller.id != id {
        warn!(caller = %caller.id, target = %id, "attempt to modify another account");
        return Err(ApiError::Forbidden("You can only modify your own account"));
    }
    Ok(())
}
