use std::collections::HashMap;

use anyhow::anyhow;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::events::registration::check_registration;
use crate::models::event::{EventRow, NewEvent, Registrant, RosterEvent};

/// Persistence seam for events.
///
/// Carried in `AppState` as `Arc<dyn EventStore>`.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// All events, earliest date first.
    async fn list(&self) -> Result<Vec<EventRow>, AppError>;

    async fn find(&self, id: Uuid) -> Result<Option<EventRow>, AppError>;

    async fn insert(&self, event: NewEvent) -> Result<EventRow, AppError>;

    /// Removes the event. Returns false when no such event existed.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    /// Appends `user_id` to the event's registrants as one atomic step.
    ///
    /// Fails with `NotFound`, `AlreadyRegistered` or `Housefull`. Implementations
    /// must never let two concurrent calls both pass the check on the last seat.
    async fn add_registrant(&self, event_id: Uuid, user_id: Uuid) -> Result<(), AppError>;

    /// Events owned by `club_id`, earliest first, registrants expanded.
    async fn roster(&self, club_id: Uuid) -> Result<Vec<RosterEvent>, AppError>;
}

const SELECT_EVENTS: &str = r#"
    SELECT e.id, e.title, e.description, e.date, e.time, e.location, e.club_id,
           c.name AS club, e.total_seats, e.registered_users, e.is_published,
           e.created_at, e.updated_at
    FROM events e
    JOIN clubs c ON c.id = e.club_id
"#;

pub struct PgEventStore {
    pool: PgPool,
}

impl PgEventStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventStore for PgEventStore {
    async fn list(&self) -> Result<Vec<EventRow>, AppError> {
        Ok(sqlx::query_as::<_, EventRow>(&format!(
            "{SELECT_EVENTS} ORDER BY e.date ASC, e.created_at ASC"
        ))
        .fetch_all(&self.pool)
        .await?)
    }

    async fn find(&self, id: Uuid) -> Result<Option<EventRow>, AppError> {
        Ok(
            sqlx::query_as::<_, EventRow>(&format!("{SELECT_EVENTS} WHERE e.id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn insert(&self, event: NewEvent) -> Result<EventRow, AppError> {
        Ok(sqlx::query_as::<_, EventRow>(
            r#"
            WITH inserted AS (
                INSERT INTO events
                    (id, title, description, date, time, location, club_id, total_seats)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING *
            )
            SELECT i.id, i.title, i.description, i.date, i.time, i.location, i.club_id,
                   c.name AS club, i.total_seats, i.registered_users, i.is_published,
                   i.created_at, i.updated_at
            FROM inserted i
            JOIN clubs c ON c.id = i.club_id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.date)
        .bind(&event.time)
        .bind(&event.location)
        .bind(event.club_id)
        .bind(event.total_seats)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn add_registrant(&self, event_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        // Single conditional UPDATE: Postgres holds the row lock and re-checks the
        // WHERE clause against the latest row version, so concurrent callers serialize.
        let result = sqlx::query(
            r#"
            UPDATE events
            SET registered_users = array_append(registered_users, $2),
                updated_at = now()
            WHERE id = $1
              AND NOT ($2 = ANY (registered_users))
              AND cardinality(registered_users) < total_seats
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(());
        }

        // Nothing appended: re-read only to report why.
        let event = self
            .find(event_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;
        check_registration(&event.registered_users, event.total_seats, user_id)?;

        // Registrant lists only grow, so a rejected update stays rejected on re-read.
        Err(AppError::Internal(anyhow!(
            "registration update for event {event_id} matched no row"
        )))
    }

    async fn roster(&self, club_id: Uuid) -> Result<Vec<RosterEvent>, AppError> {
        let events = sqlx::query_as::<_, EventRow>(&format!(
            "{SELECT_EVENTS} WHERE e.club_id = $1 ORDER BY e.date ASC, e.created_at ASC"
        ))
        .bind(club_id)
        .fetch_all(&self.pool)
        .await?;

        let mut ids: Vec<Uuid> = events
            .iter()
            .flat_map(|e| e.registered_users.iter().copied())
            .collect();
        ids.sort_unstable();
        ids.dedup();

        let registrants: HashMap<Uuid, Registrant> = if ids.is_empty() {
            HashMap::new()
        } else {
            sqlx::query_as::<_, Registrant>("SELECT id, name, email FROM users WHERE id = ANY($1)")
                .bind(&ids)
                .fetch_all(&self.pool)
                .await?
                .into_iter()
                .map(|r| (r.id, r))
                .collect()
        };

        Ok(events
            .into_iter()
            .map(|event| RosterEvent::expand(event, |id| registrants.get(&id).cloned()))
            .collect())
    }
}
