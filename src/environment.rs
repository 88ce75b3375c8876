//! Facts about the machine, detected once at startup.

use crate::metrics::MetricsProvider;
use crate::model::DeviceId;
use std::time::Duration;
use sysinfo::System;
use tokio::process::Command;

const VIRTUALIZATION_TIMEOUT: Duration = Duration::from_secs(3);

const DMI_PATHS: &[&str] = &[
    "/sys/class/dmi/id/product_name",
    "/sys/class/dmi/id/sys_vendor",
    "/sys/class/dmi/id/board_vendor",
];

const HYPERVISORS: &[&str] = &[
    "kvm",
    "qemu",
    "vmware",
    "virtualbox",
    "xen",
    "hyper-v",
    "openstack",
    "bhyve",
];

/// Cached environment facts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Environment {
    pub hostname: String,
    pub device_id: DeviceId,
    /// Human readable name of the operating system
    pub os_model: String,
    /// Operating system and kernel release
    pub os_version: String,
    /// Machine architecture, and virtualization if any
    pub hardware: String,
    pub cpu_temperature_available: bool,
}

impl Environment {
    /// Inspect the local machine.
    pub async fn detect<P: MetricsProvider>(metrics: &P) -> Self {
        let hostname = System::host_name().unwrap_or_else(|| "localhost".to_string());
        let kernel = System::kernel_version().unwrap_or_default();
        let os = os_family();

        let os_model = System::long_os_version()
            .or_else(System::name)
            .unwrap_or_else(|| format!("{os} {kernel}"));

        let hardware = hardware(std::env::consts::ARCH, virtualization().await.as_deref());

        let cpu_temperature_available = metrics.cpu_temperature().is_some();
        log::debug!("CPU temperature available: {cpu_temperature_available}");

        Self {
            device_id: DeviceId::from_hostname(&hostname),
            hostname,
            os_model,
            os_version: format!("{os} {kernel}").trim().to_string(),
            hardware,
            cpu_temperature_available,
        }
    }
}

fn os_family() -> &'static str {
    match std::env::consts::OS {
        "linux" => "Linux",
        "macos" => "Darwin",
        "windows" => "Windows",
        "freebsd" => "FreeBSD",
        other => other,
    }
}

fn hardware(arch: &str, virtualization: Option<&str>) -> String {
    match virtualization {
        Some(virtualization) => format!("{arch} (virtual: {virtualization})"),
        None => arch.to_string(),
    }
}

/// Detect the virtualization technology, `None` on bare metal.
async fn virtualization() -> Option<String> {
    let detect = Command::new("systemd-detect-virt")
        .kill_on_drop(true)
        .output();

    match tokio::time::timeout(VIRTUALIZATION_TIMEOUT, detect).await {
        Ok(Ok(output)) if output.status.success() => {
            let virt = String::from_utf8_lossy(&output.stdout).trim().to_string();
            return (!virt.is_empty()).then_some(virt);
        }
        Ok(Ok(_)) => {}
        Ok(Err(err)) => log::debug!("systemd-detect-virt not available: {err}"),
        Err(_) => log::debug!("systemd-detect-virt timed out"),
    }

    for path in DMI_PATHS {
        let Ok(value) = tokio::fs::read_to_string(path).await else {
            continue;
        };
        if let Some(virt) = match_hypervisor(&value) {
            return Some(virt);
        }
    }

    None
}

fn match_hypervisor(dmi: &str) -> Option<String> {
    let value = dmi.trim().to_lowercase();
    HYPERVISORS
        .iter()
        .any(|token| value.contains(token))
        .then_some(value)
}
