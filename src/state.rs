use std::sync::Arc;

use tokio::sync::broadcast;

use crate::config::Config;
use crate::engine::dispatcher::{EngineSettings, RideEngine, RideHandle};
use crate::engine::fare::FareEstimator;
use crate::engine::lifecycle::RideLifecycle;
use crate::observability::metrics::Metrics;
use crate::providers::{
    CoordinateDistanceProvider, FallbackDistanceProvider, Providers, SimulatedDriverProvider,
    SyntheticDistanceProvider,
};
use crate::schedule::ScheduleBook;

pub struct AppState {
    pub rides: RideHandle,
    pub estimator: FareEstimator,
    pub schedules: ScheduleBook,
    pub metrics: Metrics,
}

impl AppState {
    /// Spawns the ride engine; must be called inside a tokio runtime.
    pub fn new(config: &Config, providers: Providers) -> Self {
        let metrics = Metrics::new();
        let estimator = FareEstimator::new(config.fares.clone());
        let (events_tx, _unused_rx) = broadcast::channel(config.event_buffer_size.max(1));

        let lifecycle = RideLifecycle::new(estimator.clone(), events_tx);
        let rides = RideEngine::spawn(
            lifecycle,
            providers.clone(),
            EngineSettings::from_config(config),
            metrics.clone(),
        );

        let schedules = ScheduleBook::new(
            estimator.clone(),
            providers.distance,
            config.provider_timeout,
            metrics.clone(),
        );

        Self {
            rides,
            estimator,
            schedules,
            metrics,
        }
    }

    /// Coordinates when the place ids carry them, synthetic kilometres otherwise,
    /// and the canned driver roster.
    pub fn simulated_providers(config: &Config) -> Providers {
        let (min_km, max_km) = config.synthetic_distance_km;
        let distance = FallbackDistanceProvider::new(
            Arc::new(CoordinateDistanceProvider),
            Arc::new(SyntheticDistanceProvider::new(min_km, max_km)),
        );

        Providers {
            distance: Arc::new(distance),
            drivers: Arc::new(SimulatedDriverProvider::new(
                SimulatedDriverProvider::default_roster(),
                config.driver_eta_minutes,
            )),
        }
    }
}
