use anyhow::Context;
use axum::{
    extract::{rejection::JsonRejection, FromRef, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, MeResponse, PublicUser, RegisterRequest},
        jwt::{AuthUser, JwtKeys},
        password::{hash_password, verify_password_or_dummy},
        repo_types::{CreateUserError, User},
    },
    errors::AppError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, AppError> {
    let Json(mut payload) = payload?;
    if let Err(e) = payload.normalize_and_validate() {
        warn!(error = %e, "register rejected");
        return Err(e);
    }

    let password = payload.password.clone();
    let hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .context("password hashing task")??;

    let user = match User::create(&state.db, &payload.name, &payload.email, &hash).await {
        Ok(u) => u,
        Err(CreateUserError::EmailTaken) => {
            warn!(email = %payload.email, "email already registered");
            return Err(AppError::EmailTaken);
        }
        Err(e) => return Err(e.into()),
    };

    let token = JwtKeys::from_ref(&state).issue(user.id, &user.email)?;

    info!(user_id = user.id, email = %user.email, "user registered");
    Ok(Json(AuthResponse {
        message: "User registered successfully".into(),
        token,
        user: user.into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, AppError> {
    let Json(mut payload) = payload?;
    payload.normalize_and_validate()?;

    // Unknown email and wrong password share one response and one Argon2 run.
    let user = User::find_by_email(&state.db, &payload.email).await?;
    let password = std::mem::take(&mut payload.password);
    let stored = user.as_ref().map(|u| u.password_hash.clone());
    let verified = tokio::task::spawn_blocking(move || {
        verify_password_or_dummy(&password, stored.as_deref())
    })
    .await
    .context("password verification task")?;

    let user = match user {
        Some(u) if verified => u,
        Some(u) => {
            warn!(user_id = u.id, "login invalid password");
            return Err(AppError::InvalidCredentials);
        }
        None => {
            warn!(email = %payload.email, "login unknown email");
            return Err(AppError::InvalidCredentials);
        }
    };

    let token = JwtKeys::from_ref(&state).issue(user.id, &user.email)?;

    info!(user_id = user.id, email = %user.email, "user logged in");
    Ok(Json(AuthResponse {
        message: "Login successful".into(),
        token,
        user: user.into(),
    }))
}

#[instrument(skip_all)]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<MeResponse>, AppError> {
    let user = User::find_by_id(&state.db, claims.user_id)
        .await?
        .ok_or_else(|| {
            warn!(user_id = claims.user_id, "token refers to missing user");
            AppError::UserNotFound
        })?;

    Ok(Json(MeResponse {
        user: PublicUser::from(user),
    }))
}
