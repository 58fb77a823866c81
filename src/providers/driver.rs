use std::sync::Mutex;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::AppError;
use crate::models::driver::{DriverAssignment, DriverProfile};
use crate::models::vehicle::VehicleClass;

#[async_trait]
pub trait DriverAssignmentProvider: Send + Sync {
    async fn find_driver(&self, vehicle_class: VehicleClass) -> Result<DriverAssignment, AppError>;
}

/// Canned dispatch backend: a random roster entry with a random ETA.
pub struct SimulatedDriverProvider {
    roster: Vec<DriverProfile>,
    eta_minutes: (u32, u32),
    rng: Mutex<StdRng>,
}

impl SimulatedDriverProvider {
    pub fn new(roster: Vec<DriverProfile>, eta_minutes: (u32, u32)) -> Self {
        Self::with_rng(roster, eta_minutes, StdRng::from_entropy())
    }

    pub fn seeded(roster: Vec<DriverProfile>, eta_minutes: (u32, u32), seed: u64) -> Self {
        Self::with_rng(roster, eta_minutes, StdRng::seed_from_u64(seed))
    }

    fn with_rng(roster: Vec<DriverProfile>, eta_minutes: (u32, u32), rng: StdRng) -> Self {
        let min_eta = eta_minutes.0.max(1);
        let max_eta = eta_minutes.1.max(min_eta);

        Self {
            roster,
            eta_minutes: (min_eta, max_eta),
            rng: Mutex::new(rng),
        }
    }

    pub fn default_roster() -> Vec<DriverProfile> {
        vec![
            DriverProfile::new("Mohammed A.", 4.9, "Toyota Allion"),
            DriverProfile::new("Yusuf K.", 4.8, "Honda Grace"),
            DriverProfile::new("Aisha R.", 4.7, "Toyota Noah"),
        ]
    }
}

#[async_trait]
impl DriverAssignmentProvider for SimulatedDriverProvider {
    async fn find_driver(&self, vehicle_class: VehicleClass) -> Result<DriverAssignment, AppError> {
        if self.roster.is_empty() {
            return Err(AppError::NoDriversAvailable);
        }

        let (index, eta_minutes) = {
            let mut rng = self
                .rng
                .lock()
                .map_err(|_| AppError::Internal("driver rng poisoned".to_string()))?;
            (
                rng.gen_range(0..self.roster.len()),
                rng.gen_range(self.eta_minutes.0..=self.eta_minutes.1),
            )
        };

        let profile = &self.roster[index];
        Ok(DriverAssignment {
            name: profile.name.clone(),
            rating: profile.rating.clamp(0.0, 5.0),
            vehicle_description: format!("{} ({})", profile.vehicle_model, vehicle_class),
            eta_minutes,
        })
    }
}
