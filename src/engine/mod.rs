pub mod dispatcher;
pub mod fare;
pub mod lifecycle;
