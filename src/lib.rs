//! Publish machine telemetry to Home Assistant, using MQTT device discovery.
//!
//! The [`agent::Agent`] announces the configured metrics as a single device
//! discovery document, retracting components which are no longer configured,
//! and publishes their state periodically.

pub mod agent;
pub mod connector;
pub mod environment;
pub mod generator;
pub mod inventory;
pub mod metrics;
pub mod model;
pub mod state;

mod utils;
