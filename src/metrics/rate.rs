use super::Counters;
use crate::utils::round;
use std::collections::HashMap;
use std::time::SystemTime;

const MEGABIT: f64 = 1024.0 * 1024.0;
const GIGABYTE: f64 = 1024.0 * 1024.0 * 1024.0;

/// Decimal places of reported rates and totals.
pub const RATE_PRECISION: i32 = 2;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RateError {
    #[error("network interface not found: {0}")]
    InterfaceNotFound(String),
}

/// Throughput and totals of a network interface.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct NetworkRates {
    pub upload_mbps: f64,
    pub download_mbps: f64,
    pub sent_gb: f64,
    pub received_gb: f64,
}

#[derive(Copy, Clone, Debug)]
struct CounterSample {
    counters: Counters,
    at: SystemTime,
}

/// Turns cumulative interface counters into rates.
///
/// Each interface keeps its own previous sample. A counter that went down
/// (reset or wraparound) counts as no traffic for that interval, while the
/// totals always reflect the raw counter.
#[derive(Debug, Default)]
pub struct RateCalculator {
    previous: HashMap<String, CounterSample>,
}

impl RateCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sample(
        &mut self,
        interface: &str,
        bytes_sent: u64,
        bytes_received: u64,
        now: SystemTime,
    ) -> NetworkRates {
        let counters = Counters {
            bytes_sent,
            bytes_received,
        };

        let previous = self.previous.insert(
            interface.to_string(),
            CounterSample { counters, at: now },
        );

        let elapsed = previous.and_then(|previous| {
            now.duration_since(previous.at)
                .ok()
                .filter(|elapsed| !elapsed.is_zero())
                .map(|elapsed| (previous.counters, elapsed.as_secs_f64()))
        });

        let (upload_mbps, download_mbps) = match elapsed {
            Some((previous, seconds)) => (
                mbps(counters.bytes_sent.saturating_sub(previous.bytes_sent), seconds),
                mbps(
                    counters.bytes_received.saturating_sub(previous.bytes_received),
                    seconds,
                ),
            ),
            None => (0.0, 0.0),
        };

        NetworkRates {
            upload_mbps,
            download_mbps,
            sent_gb: gigabytes(counters.bytes_sent),
            received_gb: gigabytes(counters.bytes_received),
        }
    }

    /// Sample `interface` from a set of readings.
    ///
    /// If the interface is missing, its previous sample is kept.
    pub fn sample_from(
        &mut self,
        interface: &str,
        readings: &HashMap<String, Counters>,
        now: SystemTime,
    ) -> Result<NetworkRates, RateError> {
        let counters = readings
            .get(interface)
            .ok_or_else(|| RateError::InterfaceNotFound(interface.to_string()))?;

        Ok(self.sample(interface, counters.bytes_sent, counters.bytes_received, now))
    }
}

fn mbps(bytes: u64, seconds: f64) -> f64 {
    round(bytes as f64 * 8.0 / seconds / MEGABIT, RATE_PRECISION)
}

pub(crate) fn gigabytes(bytes: u64) -> f64 {
    round(bytes as f64 / GIGABYTE, RATE_PRECISION)
}
