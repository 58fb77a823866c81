use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::Json;
use axum::Router;

use crate::error::AppError;
use crate::models::ride::{BookingForm, RideRequest, RideSnapshot};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/rides", post(request_ride))
        .route("/rides/current", get(current_ride))
        .route("/rides/current/cancel", post(cancel_ride))
        .route("/rides/current/complete", post(complete_ride))
}

async fn request_ride(
    State(state): State<Arc<AppState>>,
    Json(form): Json<BookingForm>,
) -> Result<Json<RideSnapshot>, AppError> {
    let snapshot = state.rides.request_ride(form).await?;
    Ok(Json(snapshot))
}

async fn current_ride(State(state): State<Arc<AppState>>) -> Result<Json<RideSnapshot>, AppError> {
    Ok(Json(state.rides.current().await?))
}

async fn cancel_ride(State(state): State<Arc<AppState>>) -> Result<Json<RideRequest>, AppError> {
    Ok(Json(state.rides.cancel().await?))
}

async fn complete_ride(State(state): State<Arc<AppState>>) -> Result<Json<RideRequest>, AppError> {
    Ok(Json(state.rides.complete().await?))
}
