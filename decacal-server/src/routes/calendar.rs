//! Current date and month layout endpoints

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use decacal_core::CustomDate;
use serde::Serialize;

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api", get(health))
        .route("/api/", get(health))
        .route(
            "/api/calendar/current-date",
            get(get_current_date).put(set_current_date),
        )
        .route("/api/calendar/dates/{year}/{month}", get(dates_for_month))
}

#[derive(Serialize)]
pub struct Health {
    pub message: &'static str,
    pub version: &'static str,
}

/// GET /api/ - Health check
async fn health() -> Json<Health> {
    Json(Health {
        message: "decacal API is running",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /api/calendar/current-date - the saved "today", saving the default on first read
async fn get_current_date(State(state): State<AppState>) -> Result<Json<CustomDate>, AppError> {
    if let Some(today) = state.store.today() {
        return Ok(Json(today));
    }

    state.store.store_today(&state.default_today)?;
    Ok(Json(state.default_today))
}

/// PUT /api/calendar/current-date - Set the custom "today"
async fn set_current_date(
    State(state): State<AppState>,
    Json(date): Json<CustomDate>,
) -> Result<Json<CustomDate>, AppError> {
    state.spec.validate(&date)?;
    state.store.store_today(&date)?;
    Ok(Json(date))
}

#[derive(Serialize)]
pub struct DayInfo {
    pub day: u32,
    pub month: u32,
    pub year: i32,
    pub custom_day_name: String,
}

#[derive(Serialize)]
pub struct MonthDates {
    pub year: i32,
    pub month: u32,
    pub days: Vec<DayInfo>,
    pub total_days: u32,
}

/// GET /api/calendar/dates/:year/:month - Day names for every day of a month
async fn dates_for_month(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<Json<MonthDates>, AppError> {
    let grid = state
        .spec
        .expand_month(month, year, &state.default_today, &Default::default())?;

    let days = grid
        .cells
        .into_iter()
        .map(|cell| DayInfo {
            day: cell.day,
            month,
            year,
            custom_day_name: cell.weekday_name,
        })
        .collect();

    Ok(Json(MonthDates {
        year,
        month,
        days,
        total_days: state.spec.days_per_month(),
    }))
}
