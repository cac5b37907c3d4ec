use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::extract::{AdminUser, CurrentUser};
use crate::errors::AppError;
use crate::json::ApiJson;
use crate::events::registration::register_for_event;
use crate::events::service::{
    club_roster, create_event, delete_event, get_event, parse_event_id, CreateEventRequest,
};
use crate::models::event::{EventRow, RosterEvent};
use crate::models::MessageResponse;
use crate::state::AppState;

#[derive(Serialize)]
pub struct DeletedResponse {
    pub id: Uuid,
}

/// GET /api/events
pub async fn handle_list_events(
    State(state): State<AppState>,
) -> Result<Json<Vec<EventRow>>, AppError> {
    Ok(Json(state.events.list().await?))
}

/// GET /api/events/:id
pub async fn handle_get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EventRow>, AppError> {
    Ok(Json(get_event(state.events.as_ref(), &id).await?))
}

/// POST /api/events
pub async fn handle_create_event(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ApiJson(req): ApiJson<CreateEventRequest>,
) -> Result<Json<EventRow>, AppError> {
    let event = create_event(state.users.as_ref(), state.events.as_ref(), &admin, req).await?;
    Ok(Json(event))
}

/// DELETE /api/events/:id
pub async fn handle_delete_event(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, AppError> {
    let id = delete_event(state.events.as_ref(), &admin, &id).await?;
    Ok(Json(DeletedResponse { id }))
}

/// POST /api/events/:id/register
pub async fn handle_register_for_event(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let event_id = parse_event_id(&id)?;
    register_for_event(state.events.as_ref(), event_id, user.id).await?;
    Ok(Json(MessageResponse::new("Registration Successful")))
}

/// GET /api/events/registrations
pub async fn handle_registrations(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
) -> Result<Json<Vec<RosterEvent>>, AppError> {
    Ok(Json(club_roster(state.users.as_ref(), state.events.as_ref(), &admin).await?))
}
