//! Event endpoints

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post, put},
};
use decacal_core::event::validate_note;
use decacal_core::{DecacalError, Event, EventPatch, NewEvent};
use serde::Serialize;
use tracing::info;

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    // The segment after /events is a year in one route and an id in the
    // other; the router wants a single name per position.
    Router::new()
        .route("/api/events", post(create_event))
        .route("/api/events/{key}/{month}", get(list_events))
        .route("/api/events/single/{id}", get(get_event))
        .route("/api/events/{key}", put(update_event).delete(delete_event))
}

/// GET /api/events/:year/:month - All events in a month, by day
async fn list_events(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<Json<Vec<Event>>, AppError> {
    state.spec.validate_month(month)?;

    let mut events = state.store.events_in_month(year, month);
    events.sort_by_key(|e| e.day);

    Ok(Json(events))
}

/// POST /api/events - Create a new event
async fn create_event(
    State(state): State<AppState>,
    Json(mut req): Json<NewEvent>,
) -> Result<Json<Event>, AppError> {
    state.spec.validate(&req.date())?;
    req.note = validate_note(&req.note)?;

    let event = state.store.insert(&req)?;
    info!(id = %event.id, date = %event.date(), "event created");

    Ok(Json(event))
}

/// PUT /api/events/:id - Change an event's note or type
async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<EventPatch>,
) -> Result<Json<Event>, AppError> {
    if patch.is_empty() {
        return Err(DecacalError::Validation("Nothing to update".into()).into());
    }

    let event = state.store.update(&id, &patch)?;
    info!(id = %event.id, "event updated");

    Ok(Json(event))
}

#[derive(Serialize)]
pub struct Deleted {
    pub message: &'static str,
}

/// DELETE /api/events/:id - Delete an event
async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Deleted>, AppError> {
    state.store.remove(&id)?;
    info!(id = %id, "event deleted");

    Ok(Json(Deleted {
        message: "Event deleted successfully",
    }))
}

/// GET /api/events/single/:id - One event by id
async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Event>, AppError> {
    let event = state
        .store
        .find(&id)
        .ok_or_else(|| DecacalError::NotFound(format!("Event {id}")))?;

    Ok(Json(event))
}
