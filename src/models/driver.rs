use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DriverAssignment {
    pub name: String,
    pub rating: f64,
    pub vehicle_description: String,
    pub eta_minutes: u32,
}

/// Roster entry used by the simulated dispatch backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DriverProfile {
    pub name: String,
    pub rating: f64,
    pub vehicle_model: String,
}

impl DriverProfile {
    pub fn new(name: &str, rating: f64, vehicle_model: &str) -> Self {
        Self {
            name: name.to_string(),
            rating: rating.clamp(0.0, 5.0),
            vehicle_model: vehicle_model.to_string(),
        }
    }
}
