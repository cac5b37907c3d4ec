use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::extract::CurrentUser;
use crate::auth::store::UserStore;
use crate::errors::AppError;
use crate::events::store::EventStore;
use crate::models::event::{EventRow, NewEvent, RosterEvent, DEFAULT_TOTAL_SEATS};
use crate::validation::required_text;

/// Club stamped on events created by an admin with no club of their own.
pub const FALLBACK_CLUB_NAME: &str = "General Club";

/// Seat counts arrive as JSON integers or floats from API clients and as
/// strings from HTML number inputs.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SeatCount {
    Number(i64),
    Float(f64),
    Text(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub total_seats: Option<SeatCount>,
}

/// Validates a create request into a `NewEvent` owned by `club_id`.
pub fn validate_new_event(req: CreateEventRequest, club_id: Uuid) -> Result<NewEvent, AppError> {
    let title = required_text(req.title, "title")?;
    let date = parse_event_date(&required_text(req.date, "date")?)?;
    let time = required_text(req.time, "time")?;
    let location = required_text(req.location, "location")?;
    let description = req
        .description
        .map(|d| d.trim().to_string())
        .unwrap_or_default();
    let total_seats = parse_total_seats(req.total_seats)?;

    Ok(NewEvent {
        title,
        description,
        date,
        time,
        location,
        club_id,
        total_seats,
    })
}

/// Accepts `YYYY-MM-DD`, or an RFC 3339 timestamp truncated to its date.
fn parse_event_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .map_err(|_| AppError::Validation(format!("'date' must be YYYY-MM-DD, got '{raw}'")))
}

fn parse_total_seats(raw: Option<SeatCount>) -> Result<i32, AppError> {
    let seats = match raw {
        None => return Ok(DEFAULT_TOTAL_SEATS),
        Some(SeatCount::Text(text)) if text.trim().is_empty() => return Ok(DEFAULT_TOTAL_SEATS),
        Some(SeatCount::Text(text)) => text
            .trim()
            .parse::<i64>()
            .map_err(|_| AppError::Validation("'totalSeats' must be a whole number".to_string()))?,
        Some(SeatCount::Number(n)) => n,
        // `as` saturates; out-of-range values fail the i32 conversion below.
        Some(SeatCount::Float(f)) if f.is_finite() && f.fract() == 0.0 => f as i64,
        Some(SeatCount::Float(_)) => {
            return Err(AppError::Validation(
                "'totalSeats' must be a whole number".to_string(),
            ))
        }
    };
    i32::try_from(seats)
        .ok()
        .filter(|s| *s > 0)
        .ok_or_else(|| AppError::Validation("'totalSeats' must be at least 1".to_string()))
}

/// Event ids that do not parse cannot name an event.
pub fn parse_event_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound("Event not found".to_string()))
}

/// Creates an event owned by the admin's club, falling back to the generic club.
pub async fn create_event(
    users: &dyn UserStore,
    events: &dyn EventStore,
    admin: &CurrentUser,
    req: CreateEventRequest,
) -> Result<EventRow, AppError> {
    // Validate with a placeholder owner so bad input never creates the fallback club.
    let mut new_event = validate_new_event(req, Uuid::nil())?;
    new_event.club_id = match admin.club_id {
        Some(club_id) => club_id,
        None => users.ensure_club(FALLBACK_CLUB_NAME).await?.id,
    };

    let event = events.insert(new_event).await?;
    info!(
        "Admin {} created event {} for club '{}' ({} seats)",
        admin.id, event.id, event.club, event.total_seats
    );
    Ok(event)
}

pub async fn get_event(events: &dyn EventStore, raw_id: &str) -> Result<EventRow, AppError> {
    let id = parse_event_id(raw_id)?;
    events
        .find(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))
}

pub async fn delete_event(
    events: &dyn EventStore,
    admin: &CurrentUser,
    raw_id: &str,
) -> Result<Uuid, AppError> {
    let id = parse_event_id(raw_id)?;
    if !events.delete(id).await? {
        return Err(AppError::NotFound("Event not found".to_string()));
    }
    info!("Admin {} deleted event {id}", admin.id);
    Ok(id)
}

/// The admin's club roster. Admins without a club see the fallback club,
/// which is where their events were created.
pub async fn club_roster(
    users: &dyn UserStore,
    events: &dyn EventStore,
    admin: &CurrentUser,
) -> Result<Vec<RosterEvent>, AppError> {
    let club_id = match admin.club_id {
        Some(club_id) => club_id,
        None => users.ensure_club(FALLBACK_CLUB_NAME).await?.id,
    };
    debug!("Roster for club {:?} requested by {}", admin.club_name, admin.id);
    events.roster(club_id).await
}
