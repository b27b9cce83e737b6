pub mod dispatcher;
pub mod session;
pub mod throttle;
