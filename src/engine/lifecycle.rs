use chrono::Utc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::engine::fare::FareEstimator;
use crate::error::AppError;
use crate::models::driver::DriverAssignment;
use crate::models::ride::{BookingForm, RideDraft, RideEvent, RideRequest, RideSnapshot, RideState};

/// Result of feeding a distance lookup back into the lifecycle.
#[derive(Debug)]
pub enum QuoteResolution {
    Quoted(RideRequest),
    Failed(AppError),
    /// The distance belongs to a ride that is no longer searching.
    Stale,
}

/// Result of feeding a driver lookup back into the lifecycle.
#[derive(Debug)]
pub enum MatchResolution {
    Matched(DriverAssignment),
    Failed(AppError),
    /// The outcome belongs to a ride that is no longer searching.
    Stale,
}

/// Owns the single active ride and emits one event per transition.
///
/// Every method runs to completion; callers serialise access (see
/// [`crate::engine::dispatcher`]).
pub struct RideLifecycle {
    estimator: FareEstimator,
    state: RideState,
    active: Option<RideRequest>,
    driver: Option<DriverAssignment>,
    events: broadcast::Sender<RideEvent>,
}

impl RideLifecycle {
    pub fn new(estimator: FareEstimator, events: broadcast::Sender<RideEvent>) -> Self {
        Self {
            estimator,
            state: RideState::Idle,
            active: None,
            driver: None,
            events,
        }
    }

    pub fn state(&self) -> RideState {
        self.state
    }

    pub fn active_ride(&self) -> Option<&RideRequest> {
        self.active.as_ref()
    }

    pub fn event_sender(&self) -> broadcast::Sender<RideEvent> {
        self.events.clone()
    }

    pub fn snapshot(&self) -> RideSnapshot {
        RideSnapshot {
            state: self.state,
            ride: self.active.clone(),
            driver: self.driver.clone(),
        }
    }

    /// Availability first, then field validation. Never changes state.
    pub fn check_request(&self, form: BookingForm) -> Result<RideDraft, AppError> {
        if let Some(ride) = &self.active {
            return Err(AppError::RideAlreadyActive(ride.id));
        }
        form.validate()
    }

    /// `Idle -> Searching`. The ride is unquoted until [`Self::attach_quote`].
    pub fn start_search(&mut self, draft: RideDraft) -> Result<RideRequest, AppError> {
        if let Some(ride) = &self.active {
            return Err(AppError::RideAlreadyActive(ride.id));
        }

        let ride = RideRequest {
            id: Uuid::new_v4(),
            pickup: draft.pickup,
            dropoff: draft.dropoff,
            vehicle_class: draft.vehicle_class,
            quote: None,
            created_at: Utc::now(),
        };

        info!(ride_id = %ride.id, vehicle_class = %ride.vehicle_class, "searching for driver");

        self.active = Some(ride.clone());
        self.driver = None;
        self.state = RideState::Searching;
        self.emit(None);

        Ok(ride)
    }

    /// Prices the searching ride once its distance is known. A failed lookup
    /// or an unusable distance releases the ride back to `Idle`.
    pub fn attach_quote(
        &mut self,
        ride_id: Uuid,
        distance_km: Result<f64, AppError>,
    ) -> QuoteResolution {
        if !self.is_searching(ride_id) {
            debug!(ride_id = %ride_id, state = self.state.as_str(), "ignoring stale distance");
            return QuoteResolution::Stale;
        }

        let Some(ride) = self.active.as_mut() else {
            return QuoteResolution::Stale;
        };
        let vehicle_class = ride.vehicle_class;
        match distance_km.and_then(|km| self.estimator.estimate(vehicle_class, km)) {
            Ok(quote) => {
                info!(
                    ride_id = %ride_id,
                    distance_km = quote.distance_km,
                    total_amount = quote.total_amount,
                    "fare quoted"
                );
                ride.quote = Some(quote);
                let quoted = ride.clone();
                self.emit(None);
                QuoteResolution::Quoted(quoted)
            }
            Err(err) => {
                self.release(&err);
                QuoteResolution::Failed(err)
            }
        }
    }

    /// `Searching -> Matched`, or back to `Idle` when the lookup failed.
    pub fn resolve_match(
        &mut self,
        ride_id: Uuid,
        outcome: Result<DriverAssignment, AppError>,
    ) -> MatchResolution {
        if !self.is_searching(ride_id) {
            debug!(ride_id = %ride_id, state = self.state.as_str(), "ignoring stale match outcome");
            return MatchResolution::Stale;
        }

        match outcome {
            Ok(driver) => {
                info!(
                    ride_id = %ride_id,
                    driver = %driver.name,
                    eta_minutes = driver.eta_minutes,
                    "driver en route"
                );
                self.driver = Some(driver.clone());
                self.state = RideState::Matched;
                self.emit(None);
                MatchResolution::Matched(driver)
            }
            Err(err) => {
                self.release(&err);
                MatchResolution::Failed(err)
            }
        }
    }

    /// `Searching | Matched -> Cancelled -> Idle`.
    pub fn cancel(&mut self) -> Result<RideRequest, AppError> {
        let ride = self.active.take().ok_or(AppError::NoActiveRide)?;
        Ok(self.finish(ride, RideState::Cancelled))
    }

    /// `Matched -> Completed -> Idle`.
    pub fn complete(&mut self) -> Result<RideRequest, AppError> {
        if self.state != RideState::Matched {
            return match &self.active {
                Some(ride) => Err(AppError::DriverNotAssigned(ride.id)),
                None => Err(AppError::NoActiveRide),
            };
        }

        let ride = self.active.take().ok_or(AppError::NoActiveRide)?;
        Ok(self.finish(ride, RideState::Completed))
    }

    fn is_searching(&self, ride_id: Uuid) -> bool {
        self.state == RideState::Searching
            && self.active.as_ref().is_some_and(|ride| ride.id == ride_id)
    }

    /// `Searching -> Idle` after an external dependency failed.
    fn release(&mut self, err: &AppError) {
        if let Some(ride) = self.active.take() {
            warn!(ride_id = %ride.id, error = %err, "search failed; releasing ride");
        }
        self.driver = None;
        self.state = RideState::Idle;
        self.emit(Some(err.to_string()));
    }

    fn finish(&mut self, ride: RideRequest, terminal: RideState) -> RideRequest {
        let _ = self.events.send(RideEvent {
            state: terminal,
            ride: Some(ride.clone()),
            driver: self.driver.take(),
            error: None,
            at: Utc::now(),
        });

        self.state = RideState::Idle;
        self.emit(None);

        info!(ride_id = %ride.id, outcome = terminal.as_str(), "ride released");
        ride
    }

    fn emit(&self, error: Option<String>) {
        let event = RideEvent {
            state: self.state,
            ride: self.active.clone(),
            driver: self.driver.clone(),
            error,
            at: Utc::now(),
        };
        let _ = self.events.send(event);
    }
}
