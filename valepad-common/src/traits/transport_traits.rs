// File: valepad-common/src/traits/transport_traits.rs

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Error;

/// Raw access to the robot's HTTP API.
///
/// Paths are relative to the robot's base URL. Implementations bound every
/// call with their own timeout and report any non-2xx status as an error.
#[async_trait]
pub trait RobotTransport: Send + Sync {
    async fn put_json(&self, path: &str, body: Value) -> Result<(), Error>;
    async fn get_json(&self, path: &str) -> Result<Value, Error>;
}

#[async_trait]
impl<T: RobotTransport + ?Sized> RobotTransport for Arc<T> {
    async fn put_json(&self, path: &str, body: Value) -> Result<(), Error> {
        (**self).put_json(path, body).await
    }

    async fn get_json(&self, path: &str) -> Result<Value, Error> {
        (**self).get_json(path).await
    }
}
