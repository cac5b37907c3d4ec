use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::club::Club;
use crate::models::user::{NewUser, UserRow};

/// Persistence seam for accounts and the club directory.
///
/// Carried in `AppState` as `Arc<dyn UserStore>`.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Looks up an account by its normalized email.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRow>, AppError>;

    /// Inserts an account. Fails with `Conflict` when the email is taken.
    async fn insert_user(&self, user: NewUser) -> Result<UserRow, AppError>;

    /// Returns the club with this name (case-insensitive), creating it if needed.
    async fn ensure_club(&self, name: &str) -> Result<Club, AppError>;
}

pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRow>, AppError> {
        Ok(sqlx::query_as::<_, UserRow>(
            r#"
            SELECT u.id, u.name, u.email, u.password_hash, u.role, u.club_id,
                   c.name AS club_name
            FROM users u
            LEFT JOIN clubs c ON c.id = u.club_id
            WHERE u.email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn insert_user(&self, user: NewUser) -> Result<UserRow, AppError> {
        sqlx::query_as::<_, UserRow>(
            r#"
            WITH inserted AS (
                INSERT INTO users (id, name, email, password_hash, role, club_id)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING *
            )
            SELECT i.id, i.name, i.email, i.password_hash, i.role, i.club_id,
                   c.name AS club_name
            FROM inserted i
            LEFT JOIN clubs c ON c.id = i.club_id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.club_id)
        .fetch_one(&self.pool)
        .await
        .map_err(email_conflict)
    }

    async fn ensure_club(&self, name: &str) -> Result<Club, AppError> {
        // The no-op update makes RETURNING yield the existing row on conflict.
        Ok(sqlx::query_as::<_, Club>(
            r#"
            INSERT INTO clubs (id, name)
            VALUES ($1, $2)
            ON CONFLICT (lower(name)) DO UPDATE SET name = clubs.name
            RETURNING id, name, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .fetch_one(&self.pool)
        .await?)
    }
}

/// Maps the `users.email` unique violation to `Conflict`; the up-front lookup
/// in registration cannot see a concurrent insert.
fn email_conflict(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return AppError::Conflict("Email already exists".to_string());
        }
    }
    AppError::Database(e)
}
