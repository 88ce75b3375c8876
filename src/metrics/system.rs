use super::{CollectError, Counters, DiskReading, MemoryReading, MetricsProvider};
use std::collections::HashMap;
use std::path::Path;
use sysinfo::{Components, Disks, Networks, System};

/// Metrics of the local machine, read through `sysinfo`.
pub struct SystemMetrics {
    system: System,
    disks: Disks,
    networks: Networks,
    components: Components,
}

impl Default for SystemMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemMetrics {
    pub fn new() -> Self {
        let mut system = System::new();
        // CPU usage is computed between two refreshes, prime the first one
        system.refresh_cpu();
        system.refresh_memory();

        Self {
            system,
            disks: Disks::new_with_refreshed_list(),
            networks: Networks::new_with_refreshed_list(),
            components: Components::new_with_refreshed_list(),
        }
    }
}

impl MetricsProvider for SystemMetrics {
    fn refresh(&mut self) {
        self.system.refresh_cpu();
        self.system.refresh_memory();
        self.disks.refresh_list();
        self.networks.refresh();
        self.components.refresh();
    }

    fn cpu_usage(&self) -> f32 {
        self.system.global_cpu_info().cpu_usage()
    }

    fn memory(&self) -> MemoryReading {
        MemoryReading {
            total_bytes: self.system.total_memory(),
            used_bytes: self.system.used_memory(),
        }
    }

    fn cpu_temperature(&self) -> Option<f32> {
        self.components
            .list()
            .iter()
            .map(|component| component.temperature())
            .find(|temperature| temperature.is_finite())
    }

    fn boot_time(&self) -> u64 {
        System::boot_time()
    }

    /// Usage of the filesystem holding `mountpoint`, picking the deepest
    /// mount containing the path.
    fn disk_usage(&self, mountpoint: &str) -> Result<DiskReading, CollectError> {
        let path = Path::new(mountpoint);

        let disk = self
            .disks
            .list()
            .iter()
            .filter(|disk| path.starts_with(disk.mount_point()))
            .max_by_key(|disk| disk.mount_point().components().count())
            .ok_or_else(|| CollectError::DiskNotFound(mountpoint.to_string()))?;

        let total_bytes = disk.total_space();
        Ok(DiskReading {
            total_bytes,
            used_bytes: total_bytes.saturating_sub(disk.available_space()),
        })
    }

    fn network_counters(&self) -> HashMap<String, Counters> {
        self.networks
            .iter()
            .map(|(name, data)| {
                (
                    name.clone(),
                    Counters {
                        bytes_sent: data.total_transmitted(),
                        bytes_received: data.total_received(),
                    },
                )
            })
            .collect()
    }
}
