use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::fare::FareQuote;
use crate::models::location::LocationRef;
use crate::models::vehicle::VehicleClass;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduledRide {
    pub id: Uuid,
    pub pickup: LocationRef,
    pub dropoff: LocationRef,
    pub vehicle_class: VehicleClass,
    pub pickup_at: DateTime<Utc>,
    pub quote: FareQuote,
    pub created_at: DateTime<Utc>,
}
