//! Outbound collaborators of the ride lifecycle.
//!
//! Both traits are async so that a real routing or dispatch backend can be
//! plugged in; the simulated implementations reproduce the demo behaviour.

pub mod distance;
pub mod driver;

use std::sync::Arc;

pub use distance::{
    CoordinateDistanceProvider, DistanceProvider, FallbackDistanceProvider,
    SyntheticDistanceProvider,
};
pub use driver::{DriverAssignmentProvider, SimulatedDriverProvider};

/// The backends a ride engine talks to.
#[derive(Clone)]
pub struct Providers {
    pub distance: Arc<dyn DistanceProvider>,
    pub drivers: Arc<dyn DriverAssignmentProvider>,
}
