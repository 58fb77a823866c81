use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::driver::DriverAssignment;
use crate::models::fare::FareQuote;
use crate::models::location::LocationRef;
use crate::models::vehicle::VehicleClass;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RideState {
    Idle,
    Searching,
    Matched,
    Cancelled,
    Completed,
}

impl RideState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RideState::Idle => "idle",
            RideState::Searching => "searching",
            RideState::Matched => "matched",
            RideState::Cancelled => "cancelled",
            RideState::Completed => "completed",
        }
    }
}

/// Raw booking form as submitted by the rider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingForm {
    #[serde(default)]
    pub pickup: LocationRef,
    #[serde(default)]
    pub dropoff: LocationRef,
    #[serde(default)]
    pub vehicle_class: String,
}

impl BookingForm {
    pub fn new(
        pickup: impl Into<LocationRef>,
        dropoff: impl Into<LocationRef>,
        vehicle_class: &str,
    ) -> Self {
        Self {
            pickup: pickup.into(),
            dropoff: dropoff.into(),
            vehicle_class: vehicle_class.to_string(),
        }
    }

    pub fn validate(self) -> Result<RideDraft, AppError> {
        let pickup = self.pickup.normalized();
        let dropoff = self.dropoff.normalized();

        if pickup.is_blank() {
            return Err(AppError::Validation("pickup location is required".to_string()));
        }
        if dropoff.is_blank() {
            return Err(AppError::Validation("dropoff location is required".to_string()));
        }
        if self.vehicle_class.trim().is_empty() {
            return Err(AppError::Validation("vehicle class is required".to_string()));
        }

        Ok(RideDraft {
            pickup,
            dropoff,
            vehicle_class: self.vehicle_class.parse()?,
        })
    }
}

/// A booking form that passed validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RideDraft {
    pub pickup: LocationRef,
    pub dropoff: LocationRef,
    pub vehicle_class: VehicleClass,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RideRequest {
    pub id: Uuid,
    pub pickup: LocationRef,
    pub dropoff: LocationRef,
    pub vehicle_class: VehicleClass,
    /// `None` while the distance lookup is still pending.
    pub quote: Option<FareQuote>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RideSnapshot {
    pub state: RideState,
    pub ride: Option<RideRequest>,
    pub driver: Option<DriverAssignment>,
}

/// Emitted once per lifecycle transition for the view layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RideEvent {
    pub state: RideState,
    pub ride: Option<RideRequest>,
    pub driver: Option<DriverAssignment>,
    pub error: Option<String>,
    pub at: DateTime<Utc>,
}
