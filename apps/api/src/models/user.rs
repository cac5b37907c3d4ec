use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(format!("Unknown role '{other}'")),
        }
    }
}

/// A user account joined with its club name.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub club_id: Option<Uuid>,
    pub club_name: Option<String>,
}

impl UserRow {
    /// Fails on a stored role outside `user`/`admin` rather than guessing one.
    pub fn role(&self) -> Result<Role, AppError> {
        self.role
            .parse()
            .map_err(|e| AppError::Internal(anyhow!("Account {} is corrupt: {e}", self.id)))
    }

    pub fn profile(&self) -> Result<UserProfile, AppError> {
        Ok(UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role()?,
            club_name: self.club_name.clone(),
        })
    }
}

/// Fields needed to insert an account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub club_id: Option<Uuid>,
}

/// Public view of an account, returned on login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub club_name: Option<String>,
}

/// Canonical form of an email address used for storage and lookup.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}
