use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::{Role, UserRow};

/// Session tokens are valid for one day from issue.
const TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// User id.
    pub sub: Uuid,
    pub role: Role,
    pub club_id: Option<Uuid>,
    pub club_name: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

/// HS256 signing and verification keys derived from the shared secret.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn issue(&self, user: &UserRow) -> Result<String, AppError> {
        self.issue_at(user, Utc::now())
    }

    fn issue_at(&self, user: &UserRow, now: DateTime<Utc>) -> Result<String, AppError> {
        let claims = Claims {
            sub: user.id,
            role: user.role()?,
            club_id: user.club_id,
            club_name: user.club_name.clone(),
            iat: now.timestamp(),
            exp: now.timestamp() + TOKEN_TTL_SECS,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to sign session token: {e}")))
    }

    /// Validates signature and expiry. Any failure is `Unauthorized`.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .map_err(|e| {
                debug!("Rejected session token: {e}");
                AppError::Unauthorized
            })
    }
}
