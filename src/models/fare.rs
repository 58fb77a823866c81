use serde::{Deserialize, Serialize};

use crate::models::vehicle::VehicleClass;

/// Amounts are in currency minor units.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FareQuote {
    pub vehicle_class: VehicleClass,
    pub base_rate: u64,
    pub per_km_rate: u64,
    pub distance_km: f64,
    pub multiplier: f64,
    pub total_amount: u64,
}
