//! In-memory stores and fixtures for unit and router tests.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::auth::store::UserStore;
use crate::auth::token::TokenKeys;
use crate::errors::AppError;
use crate::events::registration::check_registration;
use crate::events::store::EventStore;
use crate::models::club::Club;
use crate::models::event::{EventRow, NewEvent, Registrant, RosterEvent};
use crate::models::user::{NewUser, UserRow};
use crate::state::AppState;

pub const TEST_SECRET: &str = "test-secret";

#[derive(Default)]
struct Inner {
    clubs: Vec<Club>,
    users: Vec<UserRow>,
    events: Vec<EventRow>,
}

/// Implements both store traits over one mutex, so the registration check and
/// append happen under the same lock.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    /// Inserts a sample event, creating its club on first use.
    pub async fn insert_event(&self, sample: SampleEvent) -> EventRow {
        let club = self.ensure_club(&sample.club).await.unwrap();
        let mut event = sample.event;
        event.club_id = club.id;
        self.insert(event).await.unwrap()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRow>, AppError> {
        Ok(self.lock().users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert_user(&self, user: NewUser) -> Result<UserRow, AppError> {
        let mut inner = self.lock();
        if inner.users.iter().any(|u| u.email == user.email) {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }
        let club_name = user
            .club_id
            .and_then(|id| inner.clubs.iter().find(|c| c.id == id))
            .map(|c| c.name.clone());
        let row = UserRow {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role.as_str().to_string(),
            club_id: user.club_id,
            club_name,
        };
        inner.users.push(row.clone());
        Ok(row)
    }

    async fn ensure_club(&self, name: &str) -> Result<Club, AppError> {
        let mut inner = self.lock();
        if let Some(club) = inner
            .clubs
            .iter()
            .find(|c| c.name.to_lowercase() == name.to_lowercase())
        {
            return Ok(club.clone());
        }
        let club = Club {
            id: Uuid::new_v4(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        inner.clubs.push(club.clone());
        Ok(club)
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn list(&self) -> Result<Vec<EventRow>, AppError> {
        let mut events = self.lock().events.clone();
        events.sort_by_key(|e| (e.date, e.created_at));
        Ok(events)
    }

    async fn find(&self, id: Uuid) -> Result<Option<EventRow>, AppError> {
        Ok(self.lock().events.iter().find(|e| e.id == id).cloned())
    }

    async fn insert(&self, event: NewEvent) -> Result<EventRow, AppError> {
        let mut inner = self.lock();
        let club = inner
            .clubs
            .iter()
            .find(|c| c.id == event.club_id)
            .map(|c| c.name.clone())
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("unknown club {}", event.club_id)))?;
        let now = Utc::now();
        let row = EventRow {
            id: Uuid::new_v4(),
            title: event.title,
            description: event.description,
            date: event.date,
            time: event.time,
            location: event.location,
            club_id: event.club_id,
            club,
            total_seats: event.total_seats,
            registered_users: Vec::new(),
            is_published: false,
            created_at: now,
            updated_at: now,
        };
        inner.events.push(row.clone());
        Ok(row)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut inner = self.lock();
        let before = inner.events.len();
        inner.events.retain(|e| e.id != id);
        Ok(inner.events.len() < before)
    }

    async fn add_registrant(&self, event_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        let mut inner = self.lock();
        let event = inner
            .events
            .iter_mut()
            .find(|e| e.id == event_id)
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;
        check_registration(&event.registered_users, event.total_seats, user_id)?;
        event.registered_users.push(user_id);
        event.updated_at = Utc::now();
        Ok(())
    }

    async fn roster(&self, club_id: Uuid) -> Result<Vec<RosterEvent>, AppError> {
        let inner = self.lock();
        let mut events: Vec<_> = inner
            .events
            .iter()
            .filter(|e| e.club_id == club_id)
            .cloned()
            .collect();
        events.sort_by_key(|e| (e.date, e.created_at));
        Ok(events
            .into_iter()
            .map(|event| {
                RosterEvent::expand(event, |id| {
                    inner.users.iter().find(|u| u.id == id).map(|u| Registrant {
                        id: u.id,
                        name: u.name.clone(),
                        email: u.email.clone(),
                    })
                })
            })
            .collect())
    }
}

/// An event draft plus the name of the club that should own it.
pub struct SampleEvent {
    pub club: String,
    pub event: NewEvent,
}

pub fn sample_event(club: &str, total_seats: i32) -> SampleEvent {
    SampleEvent {
        club: club.to_string(),
        event: NewEvent {
            title: format!("{club} showcase"),
            description: String::new(),
            date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            time: "18:00".to_string(),
            location: "Auditorium".to_string(),
            club_id: Uuid::nil(),
            total_seats,
        },
    }
}

/// App state backed by `store` for both users and events.
pub fn test_state(store: Arc<MemoryStore>) -> AppState {
    AppState {
        users: store.clone(),
        events: store,
        tokens: TokenKeys::new(TEST_SECRET),
    }
}
