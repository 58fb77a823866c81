use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::error::AppError;
use crate::geo::{haversine_km, parse_lat_lng};
use crate::models::location::LocationRef;

/// Smallest distance handed to the fare estimator.
pub const MIN_DISTANCE_KM: f64 = 0.1;

#[async_trait]
pub trait DistanceProvider: Send + Sync {
    async fn distance_between(
        &self,
        pickup: &LocationRef,
        dropoff: &LocationRef,
    ) -> Result<f64, AppError>;
}

/// Uniform pseudo-random distance, standing in for a routing backend.
pub struct SyntheticDistanceProvider {
    min_km: f64,
    max_km: f64,
    rng: Mutex<StdRng>,
}

impl SyntheticDistanceProvider {
    pub fn new(min_km: f64, max_km: f64) -> Self {
        Self::with_rng(min_km, max_km, StdRng::from_entropy())
    }

    pub fn seeded(min_km: f64, max_km: f64, seed: u64) -> Self {
        Self::with_rng(min_km, max_km, StdRng::seed_from_u64(seed))
    }

    fn with_rng(min_km: f64, max_km: f64, rng: StdRng) -> Self {
        let min_km = if min_km.is_finite() {
            min_km.max(MIN_DISTANCE_KM)
        } else {
            MIN_DISTANCE_KM
        };
        let max_km = if max_km.is_finite() {
            max_km.max(min_km)
        } else {
            min_km
        };

        Self {
            min_km,
            max_km,
            rng: Mutex::new(rng),
        }
    }
}

#[async_trait]
impl DistanceProvider for SyntheticDistanceProvider {
    async fn distance_between(
        &self,
        _pickup: &LocationRef,
        _dropoff: &LocationRef,
    ) -> Result<f64, AppError> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| AppError::Internal("distance rng poisoned".to_string()))?;
        Ok(rng.gen_range(self.min_km..=self.max_km))
    }
}

/// Great-circle distance between location ids that carry `"lat,lng"`.
#[derive(Debug, Default, Clone)]
pub struct CoordinateDistanceProvider;

#[async_trait]
impl DistanceProvider for CoordinateDistanceProvider {
    async fn distance_between(
        &self,
        pickup: &LocationRef,
        dropoff: &LocationRef,
    ) -> Result<f64, AppError> {
        let from = parse_lat_lng(&pickup.id).ok_or_else(|| {
            AppError::GeocodingUnavailable(format!("cannot resolve pickup '{}'", pickup.label))
        })?;
        let to = parse_lat_lng(&dropoff.id).ok_or_else(|| {
            AppError::GeocodingUnavailable(format!("cannot resolve dropoff '{}'", dropoff.label))
        })?;

        Ok(haversine_km(&from, &to).max(MIN_DISTANCE_KM))
    }
}

/// Uses `primary` and falls back to `fallback` when geocoding fails.
pub struct FallbackDistanceProvider {
    primary: Arc<dyn DistanceProvider>,
    fallback: Arc<dyn DistanceProvider>,
}

impl FallbackDistanceProvider {
    pub fn new(primary: Arc<dyn DistanceProvider>, fallback: Arc<dyn DistanceProvider>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl DistanceProvider for FallbackDistanceProvider {
    async fn distance_between(
        &self,
        pickup: &LocationRef,
        dropoff: &LocationRef,
    ) -> Result<f64, AppError> {
        match self.primary.distance_between(pickup, dropoff).await {
            Err(AppError::GeocodingUnavailable(reason)) => {
                debug!(%reason, "primary distance provider failed; using fallback");
                self.fallback.distance_between(pickup, dropoff).await
            }
            other => other,
        }
    }
}
