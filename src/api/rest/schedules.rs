use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::schedule::ScheduledRide;
use crate::schedule::{confirmation_message, ScheduleForm};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/schedules", post(schedule_ride).get(list_schedules))
        .route("/schedules/:id", get(get_schedule).delete(cancel_schedule))
}

#[derive(Serialize)]
pub struct ScheduleResponse {
    pub ride: ScheduledRide,
    pub message: String,
}

async fn schedule_ride(
    State(state): State<Arc<AppState>>,
    Json(form): Json<ScheduleForm>,
) -> Result<Json<ScheduleResponse>, AppError> {
    let ride = state.schedules.schedule(form, Utc::now()).await?;
    let message = confirmation_message(&ride);
    Ok(Json(ScheduleResponse { ride, message }))
}

async fn list_schedules(State(state): State<Arc<AppState>>) -> Json<Vec<ScheduledRide>> {
    Json(state.schedules.list())
}

async fn get_schedule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ScheduledRide>, AppError> {
    Ok(Json(state.schedules.get(id)?))
}

async fn cancel_schedule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ScheduledRide>, AppError> {
    Ok(Json(state.schedules.cancel(id)?))
}
