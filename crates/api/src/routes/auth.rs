//! Registration and login.

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};
use tracing::info;

use crate::{AppState, ApiError};
use tally_core::auth::{hash_password, verify_password};
use tally_db::UserRepository;
use tally_shared::auth::{LoginRequest, LoginResponse, RegisterRequest, UserResponse};

/// Creates the auth router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
}

fn invalid_credentials() -> ApiError {
    ApiError::unauthorized("invalid_credentials", "Invalid username or password")
}

/// POST /auth/login - Exchange credentials for an access token.
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user_repo = UserRepository::new((*state.db).clone());

    let Some(user) = user_repo
        .find_by_username(&payload.username)
        .await
        .map_err(|e| ApiError::internal("Database error during login", &e))?
    else {
        info!(username = %payload.username, "Login attempt for unknown user");
        return Err(invalid_credentials());
    };

    let verified = verify_password(&payload.password, &user.password_hash)
        .map_err(|e| ApiError::internal("Password verification error", &e))?;
    if !verified {
        info!(user_id = %user.id, "Failed login attempt - invalid password");
        return Err(invalid_credentials());
    }

    let access_token = state
        .jwt_service
        .generate_access_token(user.id, &user.username)
        .map_err(|e| ApiError::internal("Failed to generate access token", &e))?;

    info!(user_id = %user.id, "User logged in");
    Ok(Json(LoginResponse::bearer(
        access_token,
        state.jwt_service.access_token_expires_in(),
    )))
}

/// POST /auth/register - Register a new user.
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let username = payload.username.trim();
    if username.is_empty() || payload.password.is_empty() {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "Username and password are required",
        ));
    }

    let password_hash = hash_password(&payload.password)
        .map_err(|e| ApiError::internal("Failed to hash password", &e))?;

    let user = UserRepository::new((*state.db).clone())
        .create(username, &password_hash)
        .await?;

    info!(user_id = %user.id, "User registered");
    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            id: user.id,
            username: user.username,
        }),
    ))
}
