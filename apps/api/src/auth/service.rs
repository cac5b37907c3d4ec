use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::password::{hash_password_blocking, verify_password_blocking};
use crate::auth::store::UserStore;
use crate::auth::token::TokenKeys;
use crate::config::AdminSeed;
use crate::errors::AppError;
use crate::models::club::normalize_club_name;
use crate::models::user::{normalize_email, NewUser, Role, UserProfile, UserRow};
use crate::validation::required_text;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub club_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

/// Creates an account. The club is recorded only for admins.
pub async fn register_account(
    users: &dyn UserStore,
    req: RegisterRequest,
) -> Result<UserRow, AppError> {
    let name = required_text(req.name, "name")?;
    let email = normalize_email(&required_text(req.email, "email")?);
    let password = req
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::Validation("'password' is required".to_string()))?;
    let role = match req.role.as_deref().map(str::trim) {
        None | Some("") => Role::User,
        Some(raw) => raw.parse::<Role>().map_err(AppError::Validation)?,
    };

    if users.find_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("Email already exists".to_string()));
    }

    let club_id = match (role, req.club_name.as_deref().and_then(normalize_club_name)) {
        (Role::Admin, Some(club_name)) => Some(users.ensure_club(&club_name).await?.id),
        _ => None,
    };

    let password_hash = hash_password_blocking(password).await?;
    let user = users
        .insert_user(NewUser {
            name,
            email,
            password_hash,
            role,
            club_id,
        })
        .await?;

    info!("Registered {} account {}", user.role, user.id);
    Ok(user)
}

/// Verifies credentials and issues a session token.
pub async fn login(
    users: &dyn UserStore,
    tokens: &TokenKeys,
    req: LoginRequest,
) -> Result<LoginResponse, AppError> {
    let email = normalize_email(&required_text(req.email, "email")?);
    let password = req.password.unwrap_or_default();

    let user = users
        .find_by_email(&email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if !verify_password_blocking(password, user.password_hash.clone()).await? {
        return Err(AppError::InvalidCredentials);
    }

    let token = tokens.issue(&user)?;
    Ok(LoginResponse {
        token,
        user: user.profile()?,
    })
}

/// Ensures the configured admin account exists. Returns true when it was created.
pub async fn ensure_admin(users: &dyn UserStore, seed: &AdminSeed) -> Result<bool, AppError> {
    let email = normalize_email(&seed.email);
    if users.find_by_email(&email).await?.is_some() {
        info!("Admin {email} already exists; skipping seed");
        return Ok(false);
    }

    register_account(
        users,
        RegisterRequest {
            name: Some(seed.name.clone()),
            email: Some(email.clone()),
            password: Some(seed.password.clone()),
            role: Some(Role::Admin.as_str().to_string()),
            club_name: Some(seed.club_name.clone()),
        },
    )
    .await?;

    info!("Seeded admin {email} for club '{}'", seed.club_name);
    Ok(true)
}
