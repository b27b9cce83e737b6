// src/lib.rs

pub mod config;
pub mod control;
pub mod http;
pub mod input;
pub mod tasks;

pub use config::ControlConfig;
pub use control::dispatcher::{CommandDispatcher, DispatcherState};
pub use control::session::{ControlSession, SessionExit};
pub use control::throttle::CommandThrottle;
pub use http::ReqwestTransport;
pub use valepad_common::error::Error;
