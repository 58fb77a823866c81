use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("invalid vehicle class: {0}")]
    InvalidVehicleClass(String),

    #[error("invalid distance: {0} km")]
    InvalidDistance(f64),

    #[error("ride {0} is already active")]
    RideAlreadyActive(Uuid),

    #[error("no active ride")]
    NoActiveRide,

    #[error("ride {0} has no driver assigned yet")]
    DriverNotAssigned(Uuid),

    #[error("ride {0} was cancelled before it was quoted")]
    RideCancelled(Uuid),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("geocoding unavailable: {0}")]
    GeocodingUnavailable(String),

    #[error("no drivers available")]
    NoDriversAvailable,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Short label used for metrics and event payloads.
    pub fn reason(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation",
            AppError::InvalidVehicleClass(_) => "invalid_vehicle_class",
            AppError::InvalidDistance(_) => "invalid_distance",
            AppError::RideAlreadyActive(_) => "ride_already_active",
            AppError::NoActiveRide => "no_active_ride",
            AppError::DriverNotAssigned(_) => "driver_not_assigned",
            AppError::RideCancelled(_) => "ride_cancelled",
            AppError::NotFound(_) => "not_found",
            AppError::GeocodingUnavailable(_) => "geocoding_unavailable",
            AppError::NoDriversAvailable => "no_drivers_available",
            AppError::Config(_) => "config",
            AppError::Internal(_) => "internal",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::InvalidVehicleClass(_)
            | AppError::InvalidDistance(_) => StatusCode::BAD_REQUEST,
            AppError::RideAlreadyActive(_)
            | AppError::NoActiveRide
            | AppError::DriverNotAssigned(_)
            | AppError::RideCancelled(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::GeocodingUnavailable(_) => StatusCode::BAD_GATEWAY,
            AppError::NoDriversAvailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Config(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "error": self.to_string(),
            "reason": self.reason(),
        }));

        (status, body).into_response()
    }
}
