use super::rate::gigabytes;
use super::{CollectError, RateCalculator, RateError, Readings, UNKNOWN_STATUS};
use crate::inventory::{ComponentKind, Entity, Inventory};
use crate::utils::round;
use serde::ser::SerializeMap;
use std::time::SystemTime;

/// A single value of the state payload.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Float(f64),
    Integer(u64),
    Status(String),
}

impl From<f64> for MetricValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<u64> for MetricValue {
    fn from(value: u64) -> Self {
        Self::Integer(value)
    }
}

impl From<String> for MetricValue {
    fn from(value: String) -> Self {
        Self::Status(value)
    }
}

/// The state payload of one tick, serialized as a flat JSON object.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MetricSnapshot {
    values: Vec<(String, MetricValue)>,
}

impl MetricSnapshot {
    pub fn get(&self, key: &str) -> Option<&MetricValue> {
        self.values
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn extend(&mut self, values: Vec<(String, MetricValue)>) {
        for (key, value) in values {
            match self.values.iter_mut().find(|(existing, _)| *existing == key) {
                Some((_, slot)) => *slot = value,
                None => self.values.push((key, value)),
            }
        }
    }
}

impl serde::Serialize for MetricSnapshot {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (key, value) in &self.values {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to read: {0}")]
    Reading(String),
    #[error(transparent)]
    Rate(#[from] RateError),
    #[error("no baseline readings")]
    MissingBaseline,
    #[error("disk at {0} reports no capacity")]
    EmptyDisk(String),
}

/// Builds the state payload of each tick from the readings.
#[derive(Debug)]
pub struct StatePublisher {
    inventory: Inventory,
    rates: RateCalculator,
}

impl StatePublisher {
    pub fn new(inventory: Inventory) -> Self {
        Self {
            inventory,
            rates: RateCalculator::new(),
        }
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// Assemble the snapshot, skipping entities whose readings failed.
    pub fn assemble(&mut self, readings: &Readings, now: SystemTime) -> MetricSnapshot {
        let mut snapshot = MetricSnapshot::default();

        for entity in self.inventory.iter() {
            match collect(&mut self.rates, entity, readings, now) {
                Ok(values) => snapshot.extend(values),
                Err(err) => {
                    log::warn!("Skipping {} {:?}: {err}", entity.kind, entity.target);
                }
            }
        }

        snapshot
    }
}

/// Collect the values of one entity.
fn collect(
    rates: &mut RateCalculator,
    entity: &Entity,
    readings: &Readings,
    now: SystemTime,
) -> Result<Vec<(String, MetricValue)>, SnapshotError> {
    let target = entity.target.as_str();

    Ok(match entity.kind {
        ComponentKind::Baseline => {
            let baseline = readings
                .baseline
                .as_ref()
                .ok_or(SnapshotError::MissingBaseline)?;
            let memory = baseline.memory;

            let mut values = vec![
                value("cpu_usage", round(baseline.cpu_usage as f64, 1)),
                value("memory_usage", percent(memory.used_bytes, memory.total_bytes)),
                value("memory_used", gigabytes(memory.used_bytes)),
                value("memory_total", gigabytes(memory.total_bytes)),
                value("uptime_seconds", baseline.uptime_seconds),
            ];
            if let Some(temperature) = baseline.cpu_temperature {
                values.push(value("cpu_temperature", round(temperature as f64, 1)));
            }
            values
        }
        ComponentKind::Disk => {
            let disk = match readings.disks.get(target) {
                Some(Ok(disk)) => *disk,
                Some(Err(err)) => return Err(SnapshotError::Reading(err.to_string())),
                None => {
                    return Err(SnapshotError::Reading(
                        CollectError::DiskNotFound(target.to_string()).to_string(),
                    ))
                }
            };
            if disk.total_bytes == 0 {
                return Err(SnapshotError::EmptyDisk(target.to_string()));
            }

            vec![
                (
                    entity.metric_id("disk_usage"),
                    percent(disk.used_bytes, disk.total_bytes).into(),
                ),
                (entity.metric_id("disk_used"), gigabytes(disk.used_bytes).into()),
                (entity.metric_id("disk_total"), gigabytes(disk.total_bytes).into()),
            ]
        }
        ComponentKind::Network => {
            let result = rates.sample_from(target, &readings.network, now)?;
            vec![
                (entity.metric_id("net_upload"), result.upload_mbps.into()),
                (entity.metric_id("net_download"), result.download_mbps.into()),
                (entity.metric_id("net_sent"), result.sent_gb.into()),
                (entity.metric_id("net_recv"), result.received_gb.into()),
            ]
        }
        ComponentKind::Service => {
            let status = readings
                .services
                .get(target)
                .cloned()
                .unwrap_or_else(|| UNKNOWN_STATUS.to_string());
            vec![(entity.metric_id("service"), status.into())]
        }
    })
}

fn value(key: &str, value: impl Into<MetricValue>) -> (String, MetricValue) {
    (key.to_string(), value.into())
}

fn percent(used: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round(used as f64 / total as f64 * 100.0, 1)
}
