use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub ride_requests_total: IntCounterVec,
    pub ride_transitions_total: IntCounterVec,
    pub ride_failures_total: IntCounterVec,
    pub active_rides: IntGauge,
    pub matching_latency_seconds: Histogram,
    pub scheduled_rides: IntGauge,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let ride_requests_total = IntCounterVec::new(
            Opts::new("ride_requests_total", "Accepted ride requests by vehicle class"),
            &["vehicle_class"],
        )
        .expect("valid ride_requests_total metric");

        let ride_transitions_total = IntCounterVec::new(
            Opts::new("ride_transitions_total", "Lifecycle transitions by target state"),
            &["state"],
        )
        .expect("valid ride_transitions_total metric");

        let ride_failures_total = IntCounterVec::new(
            Opts::new("ride_failures_total", "Failed ride operations by reason"),
            &["reason"],
        )
        .expect("valid ride_failures_total metric");

        let active_rides = IntGauge::new("active_rides", "Rides currently searching or matched")
            .expect("valid active_rides metric");

        let matching_latency_seconds = Histogram::with_opts(HistogramOpts::new(
            "matching_latency_seconds",
            "Time from entering search to a driver lookup outcome",
        ))
        .expect("valid matching_latency_seconds metric");

        let scheduled_rides = IntGauge::new("scheduled_rides", "Rides booked for later")
            .expect("valid scheduled_rides metric");

        registry
            .register(Box::new(ride_requests_total.clone()))
            .expect("register ride_requests_total");
        registry
            .register(Box::new(ride_transitions_total.clone()))
            .expect("register ride_transitions_total");
        registry
            .register(Box::new(ride_failures_total.clone()))
            .expect("register ride_failures_total");
        registry
            .register(Box::new(active_rides.clone()))
            .expect("register active_rides");
        registry
            .register(Box::new(matching_latency_seconds.clone()))
            .expect("register matching_latency_seconds");
        registry
            .register(Box::new(scheduled_rides.clone()))
            .expect("register scheduled_rides");

        Self {
            registry,
            ride_requests_total,
            ride_transitions_total,
            ride_failures_total,
            active_rides,
            matching_latency_seconds,
            scheduled_rides,
        }
    }

    pub fn record_transition(&self, state: &str) {
        self.ride_transitions_total.with_label_values(&[state]).inc();
    }

    pub fn record_failure(&self, reason: &str) {
        self.ride_failures_total.with_label_values(&[reason]).inc();
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
