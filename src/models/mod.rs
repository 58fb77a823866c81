pub mod driver;
pub mod fare;
pub mod location;
pub mod ride;
pub mod schedule;
pub mod vehicle;
