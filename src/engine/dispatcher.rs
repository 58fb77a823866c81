use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::AbortHandle;
use tokio::time::{sleep_until, timeout, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::engine::lifecycle::{MatchResolution, QuoteResolution, RideLifecycle};
use crate::error::AppError;
use crate::models::driver::DriverAssignment;
use crate::models::ride::{BookingForm, RideEvent, RideRequest, RideSnapshot, RideState};
use crate::observability::metrics::Metrics;
use crate::providers::Providers;

const SEARCH_QUEUE_SIZE: usize = 4;

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub command_queue_size: usize,
    pub matching_delay: Duration,
    pub provider_timeout: Duration,
}

impl EngineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            command_queue_size: config.command_queue_size,
            matching_delay: config.matching_delay,
            provider_timeout: config.provider_timeout,
        }
    }
}

type RequestReply = oneshot::Sender<Result<RideSnapshot, AppError>>;

pub enum RideCommand {
    Request {
        form: BookingForm,
        reply: RequestReply,
    },
    Cancel {
        reply: oneshot::Sender<Result<RideRequest, AppError>>,
    },
    Complete {
        reply: oneshot::Sender<Result<RideRequest, AppError>>,
    },
    Snapshot {
        reply: oneshot::Sender<RideSnapshot>,
    },
}

/// Posted back by the search task, always tagged with the ride it ran for.
enum SearchUpdate {
    Distance {
        ride_id: Uuid,
        distance_km: Result<f64, AppError>,
    },
    Driver {
        ride_id: Uuid,
        outcome: Result<DriverAssignment, AppError>,
        elapsed: Duration,
    },
}

/// Requester still waiting for its ride to be quoted.
struct QuoteWaiter {
    ride_id: Uuid,
    reply: RequestReply,
}

/// Client side of the ride engine. Cheap to clone.
#[derive(Clone)]
pub struct RideHandle {
    commands: mpsc::Sender<RideCommand>,
    events: broadcast::Sender<RideEvent>,
}

impl RideHandle {
    /// Resolves once the ride is quoted, or with the error that released it.
    pub async fn request_ride(&self, form: BookingForm) -> Result<RideSnapshot, AppError> {
        let (reply, rx) = oneshot::channel();
        self.send(RideCommand::Request { form, reply }).await?;
        rx.await.map_err(|_| engine_stopped())?
    }

    pub async fn cancel(&self) -> Result<RideRequest, AppError> {
        let (reply, rx) = oneshot::channel();
        self.send(RideCommand::Cancel { reply }).await?;
        rx.await.map_err(|_| engine_stopped())?
    }

    pub async fn complete(&self) -> Result<RideRequest, AppError> {
        let (reply, rx) = oneshot::channel();
        self.send(RideCommand::Complete { reply }).await?;
        rx.await.map_err(|_| engine_stopped())?
    }

    pub async fn current(&self) -> Result<RideSnapshot, AppError> {
        let (reply, rx) = oneshot::channel();
        self.send(RideCommand::Snapshot { reply }).await?;
        rx.await.map_err(|_| engine_stopped())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RideEvent> {
        self.events.subscribe()
    }

    async fn send(&self, command: RideCommand) -> Result<(), AppError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| engine_stopped())
    }
}

fn engine_stopped() -> AppError {
    AppError::Internal("ride engine is not running".to_string())
}

/// Single task that owns the ride lifecycle.
///
/// Commands and search updates are handled one at a time and never await,
/// so no transition observes another half-done and a snapshot or cancel is
/// answered even while a provider call is outstanding. Provider calls live
/// in one search task per ride, whose abort handle is kept so cancellation
/// can stop it.
pub struct RideEngine {
    lifecycle: RideLifecycle,
    providers: Providers,
    settings: EngineSettings,
    metrics: Metrics,
    search_task: Option<AbortHandle>,
    quote_waiter: Option<QuoteWaiter>,
    search_tx: mpsc::Sender<SearchUpdate>,
}

impl RideEngine {
    pub fn spawn(
        lifecycle: RideLifecycle,
        providers: Providers,
        settings: EngineSettings,
        metrics: Metrics,
    ) -> RideHandle {
        let (command_tx, command_rx) = mpsc::channel(settings.command_queue_size.max(1));
        let (search_tx, search_rx) = mpsc::channel(SEARCH_QUEUE_SIZE);
        let events = lifecycle.event_sender();

        let engine = Self {
            lifecycle,
            providers,
            settings,
            metrics,
            search_task: None,
            quote_waiter: None,
            search_tx,
        };
        tokio::spawn(engine.run(command_rx, search_rx));

        RideHandle {
            commands: command_tx,
            events,
        }
    }

    async fn run(
        mut self,
        mut commands: mpsc::Receiver<RideCommand>,
        mut updates: mpsc::Receiver<SearchUpdate>,
    ) {
        info!("ride engine started");

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                Some(update) = updates.recv() => self.handle_update(update),
            }
            self.refresh_active_gauge();
        }

        self.abort_search();
        warn!("ride engine stopped: command channel closed");
    }

    fn handle_command(&mut self, command: RideCommand) {
        match command {
            RideCommand::Request { form, reply } => self.request_ride(form, reply),
            RideCommand::Cancel { reply } => {
                let result = self.cancel();
                let _ = reply.send(result);
            }
            RideCommand::Complete { reply } => {
                let result = self.complete();
                let _ = reply.send(result);
            }
            RideCommand::Snapshot { reply } => {
                let _ = reply.send(self.lifecycle.snapshot());
            }
        }
    }

    fn handle_update(&mut self, update: SearchUpdate) {
        match update {
            SearchUpdate::Distance {
                ride_id,
                distance_km,
            } => self.handle_distance(ride_id, distance_km),
            SearchUpdate::Driver {
                ride_id,
                outcome,
                elapsed,
            } => self.handle_driver(ride_id, outcome, elapsed),
        }
    }

    fn request_ride(&mut self, form: BookingForm, reply: RequestReply) {
        let started = self
            .lifecycle
            .check_request(form)
            .and_then(|draft| self.lifecycle.start_search(draft));

        let ride = match started {
            Ok(ride) => ride,
            Err(err) => {
                self.metrics.record_failure(err.reason());
                let _ = reply.send(Err(err));
                return;
            }
        };

        self.metrics
            .ride_requests_total
            .with_label_values(&[ride.vehicle_class.as_str()])
            .inc();
        self.metrics.record_transition(RideState::Searching.as_str());

        self.spawn_search(&ride);
        self.quote_waiter = Some(QuoteWaiter {
            ride_id: ride.id,
            reply,
        });
    }

    fn cancel(&mut self) -> Result<RideRequest, AppError> {
        let ride = self.lifecycle.cancel().inspect_err(|err| {
            self.metrics.record_failure(err.reason());
        })?;
        self.abort_search();
        self.answer_waiter(ride.id, Err(AppError::RideCancelled(ride.id)));
        self.record_release(RideState::Cancelled);
        Ok(ride)
    }

    fn complete(&mut self) -> Result<RideRequest, AppError> {
        let ride = self.lifecycle.complete().inspect_err(|err| {
            self.metrics.record_failure(err.reason());
        })?;
        self.abort_search();
        self.record_release(RideState::Completed);
        Ok(ride)
    }

    /// Distance lookup, then the driver lookup once the matching delay
    /// (counted from entering `Searching`) has passed.
    fn spawn_search(&mut self, ride: &RideRequest) {
        self.abort_search();

        let ride_id = ride.id;
        let vehicle_class = ride.vehicle_class;
        let pickup = ride.pickup.clone();
        let dropoff = ride.dropoff.clone();
        let distance = Arc::clone(&self.providers.distance);
        let drivers = Arc::clone(&self.providers.drivers);
        let delay = self.settings.matching_delay;
        let limit = self.settings.provider_timeout;
        let search_tx = self.search_tx.clone();

        let task = tokio::spawn(async move {
            let started = Instant::now();

            let distance_km = match timeout(limit, distance.distance_between(&pickup, &dropoff))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(AppError::GeocodingUnavailable(
                    "distance lookup timed out".to_string(),
                )),
            };
            let quoted = distance_km.is_ok();
            let sent = search_tx
                .send(SearchUpdate::Distance {
                    ride_id,
                    distance_km,
                })
                .await;
            if !quoted || sent.is_err() {
                return;
            }

            sleep_until(started + delay).await;

            let outcome = match timeout(limit, drivers.find_driver(vehicle_class)).await {
                Ok(result) => result,
                Err(_) => Err(AppError::NoDriversAvailable),
            };

            let _ = search_tx
                .send(SearchUpdate::Driver {
                    ride_id,
                    outcome,
                    elapsed: started.elapsed(),
                })
                .await;
        });

        debug!(ride_id = %ride_id, delay_ms = delay.as_millis() as u64, "search started");
        self.search_task = Some(task.abort_handle());
    }

    fn handle_distance(&mut self, ride_id: Uuid, distance_km: Result<f64, AppError>) {
        match self.lifecycle.attach_quote(ride_id, distance_km) {
            QuoteResolution::Quoted(_) => {
                let snapshot = self.lifecycle.snapshot();
                self.answer_waiter(ride_id, Ok(snapshot));
            }
            QuoteResolution::Failed(err) => {
                self.abort_search();
                self.metrics.record_failure(err.reason());
                self.metrics.record_transition(RideState::Idle.as_str());
                self.answer_waiter(ride_id, Err(err));
            }
            QuoteResolution::Stale => {}
        }
    }

    fn handle_driver(
        &mut self,
        ride_id: Uuid,
        outcome: Result<DriverAssignment, AppError>,
        elapsed: Duration,
    ) {
        match self.lifecycle.resolve_match(ride_id, outcome) {
            MatchResolution::Matched(_) => {
                self.search_task = None;
                self.metrics
                    .matching_latency_seconds
                    .observe(elapsed.as_secs_f64());
                self.metrics.record_transition(RideState::Matched.as_str());
            }
            MatchResolution::Failed(err) => {
                self.search_task = None;
                self.metrics.record_failure(err.reason());
                self.metrics.record_transition(RideState::Idle.as_str());
            }
            MatchResolution::Stale => {}
        }
    }

    fn answer_waiter(&mut self, ride_id: Uuid, result: Result<RideSnapshot, AppError>) {
        if let Some(waiter) = self.quote_waiter.take_if(|waiter| waiter.ride_id == ride_id) {
            let _ = waiter.reply.send(result);
        }
    }

    fn record_release(&self, terminal: RideState) {
        self.metrics.record_transition(terminal.as_str());
        self.metrics.record_transition(RideState::Idle.as_str());
    }

    fn abort_search(&mut self) {
        if let Some(task) = self.search_task.take() {
            task.abort();
        }
    }

    fn refresh_active_gauge(&self) {
        let active = i64::from(self.lifecycle.active_ride().is_some());
        self.metrics.active_rides.set(active);
    }
}
