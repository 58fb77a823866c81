//! Rides booked ahead of time.
//!
//! Bookings are quoted when they are made and kept in memory. They are never
//! dispatched by the ride engine and do not count as the active ride.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::info;
use uuid::Uuid;

use crate::engine::fare::FareEstimator;
use crate::error::AppError;
use crate::models::location::LocationRef;
use crate::models::ride::BookingForm;
use crate::models::schedule::ScheduledRide;
use crate::observability::metrics::Metrics;
use crate::providers::DistanceProvider;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleForm {
    #[serde(default)]
    pub pickup: LocationRef,
    #[serde(default)]
    pub dropoff: LocationRef,
    #[serde(default)]
    pub vehicle_class: String,
    pub pickup_at: Option<DateTime<Utc>>,
}

pub struct ScheduleBook {
    rides: DashMap<Uuid, ScheduledRide>,
    estimator: FareEstimator,
    distance: Arc<dyn DistanceProvider>,
    provider_timeout: Duration,
    metrics: Metrics,
}

impl ScheduleBook {
    pub fn new(
        estimator: FareEstimator,
        distance: Arc<dyn DistanceProvider>,
        provider_timeout: Duration,
        metrics: Metrics,
    ) -> Self {
        Self {
            rides: DashMap::new(),
            estimator,
            distance,
            provider_timeout,
            metrics,
        }
    }

    pub async fn schedule(
        &self,
        form: ScheduleForm,
        now: DateTime<Utc>,
    ) -> Result<ScheduledRide, AppError> {
        let draft = BookingForm {
            pickup: form.pickup,
            dropoff: form.dropoff,
            vehicle_class: form.vehicle_class,
        }
        .validate()?;

        let pickup_at = form.pickup_at.ok_or_else(|| {
            AppError::Validation("pickup date and time are required".to_string())
        })?;
        if pickup_at < now {
            return Err(AppError::Validation(format!(
                "pickup time {pickup_at} is in the past"
            )));
        }

        let lookup = self.distance.distance_between(&draft.pickup, &draft.dropoff);
        let distance_km = timeout(self.provider_timeout, lookup)
            .await
            .map_err(|_| AppError::GeocodingUnavailable("distance lookup timed out".to_string()))??;
        let quote = self.estimator.estimate(draft.vehicle_class, distance_km)?;

        let ride = ScheduledRide {
            id: Uuid::new_v4(),
            pickup: draft.pickup,
            dropoff: draft.dropoff,
            vehicle_class: draft.vehicle_class,
            pickup_at,
            quote,
            created_at: now,
        };

        self.rides.insert(ride.id, ride.clone());
        self.metrics.scheduled_rides.set(self.rides.len() as i64);

        info!(
            ride_id = %ride.id,
            pickup_at = %ride.pickup_at,
            vehicle_class = %ride.vehicle_class,
            "ride scheduled"
        );

        Ok(ride)
    }

    /// Upcoming bookings, earliest pickup first.
    pub fn list(&self) -> Vec<ScheduledRide> {
        let mut rides: Vec<ScheduledRide> = self
            .rides
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        rides.sort_by_key(|ride| ride.pickup_at);
        rides
    }

    pub fn get(&self, id: Uuid) -> Result<ScheduledRide, AppError> {
        self.rides
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AppError::NotFound(format!("scheduled ride {id} not found")))
    }

    pub fn cancel(&self, id: Uuid) -> Result<ScheduledRide, AppError> {
        let (_, ride) = self
            .rides
            .remove(&id)
            .ok_or_else(|| AppError::NotFound(format!("scheduled ride {id} not found")))?;
        self.metrics.scheduled_rides.set(self.rides.len() as i64);

        info!(ride_id = %id, "scheduled ride cancelled");
        Ok(ride)
    }

    pub fn len(&self) -> usize {
        self.rides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rides.is_empty()
    }
}

pub fn confirmation_message(ride: &ScheduledRide) -> String {
    format!(
        "Ride scheduled for {}!",
        ride.pickup_at.format("%A, %B %-d, %Y at %I:%M %p")
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    use super::{confirmation_message, ScheduleBook, ScheduleForm};
    use crate::config::FareConfig;
    use crate::engine::fare::FareEstimator;
    use crate::error::AppError;
    use crate::models::location::LocationRef;
    use crate::observability::metrics::Metrics;
    use crate::providers::SyntheticDistanceProvider;

    fn book() -> ScheduleBook {
        ScheduleBook::new(
            FareEstimator::new(FareConfig::default()),
            Arc::new(SyntheticDistanceProvider::seeded(10.0, 10.0, 9)),
            Duration::from_secs(5),
            Metrics::new(),
        )
    }

    fn form(hour: u32) -> ScheduleForm {
        ScheduleForm {
            pickup: LocationRef::from("Home"),
            dropoff: LocationRef::from("Mosque"),
            vehicle_class: "standard".to_string(),
            pickup_at: Some(Utc.with_ymd_and_hms(2026, 10, 16, hour, 30, 0).unwrap()),
        }
    }

    fn now() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 8, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn scheduling_quotes_and_stores_the_ride() {
        let book = book();
        let ride = book.schedule(form(9), now()).await.unwrap();

        assert_eq!(ride.quote.total_amount, 3000);
        assert_eq!(ride.created_at, now());
        assert_eq!(book.get(ride.id).unwrap(), ride);
        assert_eq!(book.len(), 1);
    }

    #[tokio::test]
    async fn list_is_ordered_by_pickup_time() {
        let book = book();
        let late = book.schedule(form(18), now()).await.unwrap();
        let early = book.schedule(form(9), now()).await.unwrap();

        let ids: Vec<_> = book.list().into_iter().map(|ride| ride.id).collect();
        assert_eq!(ids, vec![early.id, late.id]);
    }

    #[tokio::test]
    async fn past_or_missing_pickup_time_is_rejected() {
        let book = book();

        let err = book.schedule(form(7), now()).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref msg) if msg.contains("past")));

        let mut missing = form(9);
        missing.pickup_at = None;
        let err = book.schedule(missing, now()).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(book.is_empty());
    }

    #[tokio::test]
    async fn cancel_removes_and_unknown_id_is_not_found() {
        let book = book();
        let ride = book.schedule(form(9), now()).await.unwrap();

        assert_eq!(book.cancel(ride.id).unwrap().id, ride.id);
        assert!(matches!(book.cancel(ride.id), Err(AppError::NotFound(_))));
        assert!(matches!(book.get(Uuid::new_v4()), Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn confirmation_names_the_pickup_time() {
        let ride = book().schedule(form(9), now()).await.unwrap();
        assert_eq!(
            confirmation_message(&ride),
            "Ride scheduled for Friday, October 16, 2026 at 09:30 AM!"
        );
    }
}
