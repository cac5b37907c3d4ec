use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const DEFAULT_TOTAL_SEATS: i32 = 50;

/// An event joined with the name of its owning club.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EventRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub time: String,
    pub location: String,
    pub club_id: Uuid,
    pub club: String,
    pub total_seats: i32,
    pub registered_users: Vec<Uuid>,
    /// Stored and returned; no operation reads it.
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated event ready to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub time: String,
    pub location: String,
    pub club_id: Uuid,
    pub total_seats: i32,
}

/// A registrant expanded to its public identity.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Registrant {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// One row of an admin's roster: the event with its registrants expanded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEvent {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub time: String,
    pub location: String,
    pub club: String,
    pub total_seats: i32,
    pub registered_users: Vec<Registrant>,
}

impl RosterEvent {
    /// Expands `event.registered_users` in registration order, skipping ids
    /// `lookup` cannot resolve.
    pub fn expand<F>(event: EventRow, mut lookup: F) -> Self
    where
        F: FnMut(Uuid) -> Option<Registrant>,
    {
        let registered_users = event
            .registered_users
            .iter()
            .filter_map(|id| lookup(*id))
            .collect();
        RosterEvent {
            id: event.id,
            title: event.title,
            description: event.description,
            date: event.date,
            time: event.time,
            location: event.location,
            club: event.club,
            total_seats: event.total_seats,
            registered_users,
        }
    }
}
