use crate::config::FareConfig;
use crate::error::AppError;
use crate::models::fare::FareQuote;
use crate::models::vehicle::VehicleClass;

/// Pure fare calculator over a fixed set of pricing tables.
#[derive(Debug, Clone)]
pub struct FareEstimator {
    config: FareConfig,
}

impl FareEstimator {
    pub fn new(config: FareConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FareConfig {
        &self.config
    }

    /// `round((base + km * per_km) * multiplier)`, ties away from zero.
    pub fn estimate(
        &self,
        vehicle_class: VehicleClass,
        distance_km: f64,
    ) -> Result<FareQuote, AppError> {
        if !distance_km.is_finite() || distance_km <= 0.0 {
            return Err(AppError::InvalidDistance(distance_km));
        }

        let base_rate = self.config.base_rates.get(vehicle_class);
        let multiplier = self.config.multipliers.get(vehicle_class);
        let per_km_rate = self.config.per_km_rate;

        let raw = (base_rate as f64 + distance_km * per_km_rate as f64) * multiplier;
        let total = raw.round();
        if !total.is_finite() || total >= u64::MAX as f64 {
            return Err(AppError::InvalidDistance(distance_km));
        }

        Ok(FareQuote {
            vehicle_class,
            base_rate,
            per_km_rate,
            distance_km,
            multiplier,
            total_amount: total as u64,
        })
    }

    pub fn estimate_named(
        &self,
        vehicle_class: &str,
        distance_km: f64,
    ) -> Result<FareQuote, AppError> {
        self.estimate(vehicle_class.parse()?, distance_km)
    }
}
