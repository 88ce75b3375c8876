//! Live readings of the machine, and their conversion into state payloads.

mod rate;
mod service;
mod snapshot;
mod system;

pub use rate::*;
pub use service::*;
pub use snapshot::*;
pub use system::*;

use crate::inventory::{ComponentKind, Inventory};
use futures_util::future::join_all;
use std::collections::HashMap;
use std::future::Future;
use std::time::{SystemTime, UNIX_EPOCH};

/// Status reported for a service whose state could not be determined.
pub const UNKNOWN_STATUS: &str = "unknown";

#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    #[error("no disk mounted at {0}")]
    DiskNotFound(String),
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryReading {
    pub total_bytes: u64,
    pub used_bytes: u64,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DiskReading {
    pub total_bytes: u64,
    pub used_bytes: u64,
}

/// Cumulative byte counters of a network interface.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Counters {
    pub bytes_sent: u64,
    pub bytes_received: u64,
}

/// Source of point-in-time machine metrics.
pub trait MetricsProvider {
    /// Update cached values, called once before each tick's reads.
    fn refresh(&mut self);

    fn cpu_usage(&self) -> f32;
    fn memory(&self) -> MemoryReading;
    fn cpu_temperature(&self) -> Option<f32>;
    /// Boot time, in seconds since the epoch
    fn boot_time(&self) -> u64;
    fn disk_usage(&self, mountpoint: &str) -> Result<DiskReading, CollectError>;
    fn network_counters(&self) -> HashMap<String, Counters>;
}

/// Source of service states.
pub trait ServiceStatusProvider {
    /// Returns a short status token like `active`, or [`UNKNOWN_STATUS`]. Never fails.
    fn status(&self, service: &str) -> impl Future<Output = String>;
}

/// Baseline metrics of one tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BaselineReadings {
    pub cpu_usage: f32,
    pub memory: MemoryReading,
    pub uptime_seconds: u64,
    pub cpu_temperature: Option<f32>,
}

/// Everything read from the machine during one tick, restricted to the inventory.
#[derive(Debug, Default)]
pub struct Readings {
    pub baseline: Option<BaselineReadings>,
    pub disks: HashMap<String, Result<DiskReading, CollectError>>,
    pub network: HashMap<String, Counters>,
    pub services: HashMap<String, String>,
}

impl Readings {
    /// Read all metrics the inventory asks for.
    ///
    /// Service states are queried concurrently, so a slow service only delays
    /// the tick by its own timeout.
    pub async fn gather<P, S>(
        inventory: &Inventory,
        metrics: &mut P,
        services: &S,
        now: SystemTime,
    ) -> Self
    where
        P: MetricsProvider,
        S: ServiceStatusProvider,
    {
        metrics.refresh();

        let baseline = inventory.has_baseline().then(|| {
            let now = now
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default();
            BaselineReadings {
                cpu_usage: metrics.cpu_usage(),
                memory: metrics.memory(),
                uptime_seconds: now.saturating_sub(metrics.boot_time()),
                cpu_temperature: metrics.cpu_temperature(),
            }
        });

        let disks = inventory
            .of_kind(ComponentKind::Disk)
            .map(|entity| (entity.target.clone(), metrics.disk_usage(&entity.target)))
            .collect();

        let network = if inventory.of_kind(ComponentKind::Network).next().is_some() {
            metrics.network_counters()
        } else {
            HashMap::new()
        };

        let names = inventory
            .of_kind(ComponentKind::Service)
            .map(|entity| entity.target.clone())
            .collect::<Vec<_>>();
        let states = join_all(names.iter().map(|name| services.status(name))).await;
        let services = names.into_iter().zip(states).collect();

        Self {
            baseline,
            disks,
            network,
            services,
        }
    }
}
