use axum::{extract::State, http::StatusCode, Json};

use crate::auth::service::{login, register_account, LoginRequest, LoginResponse, RegisterRequest};
use crate::errors::AppError;
use crate::json::ApiJson;
use crate::models::MessageResponse;
use crate::state::AppState;

/// POST /api/auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    register_account(state.users.as_ref(), req).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User registered successfully")),
    ))
}

/// POST /api/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = login(state.users.as_ref(), &state.tokens, req).await?;
    Ok(Json(response))
}
