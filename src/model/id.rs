//! Identifiers and topics derived from host and target names.

use std::fmt::Formatter;

/// Application name, used for topics, client id and origin metadata.
pub const APPLICATION: &str = "system2mqtt";

/// The identity of the monitored machine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceId {
    pub id: String,
}

impl DeviceId {
    /// Derive the device id from a hostname, replacing `.` and `-` by `_`.
    pub fn from_hostname(hostname: &str) -> Self {
        Self {
            id: hostname.replace(['.', '-'], "_"),
        }
    }

    /// render the discovery config topic
    pub fn config_topic(&self, discovery_prefix: &str) -> String {
        format!("{discovery_prefix}/device/{id}/config", id = self.id)
    }

    pub fn base_topic(&self) -> String {
        format!("{APPLICATION}/{id}", id = self.id)
    }

    pub fn state_topic(&self) -> String {
        format!("{}/state", self.base_topic())
    }

    pub fn availability_topic(&self) -> String {
        format!("{}/availability", self.base_topic())
    }

    pub fn client_id(&self) -> String {
        format!("{APPLICATION}_{id}", id = self.id)
    }
}

impl std::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.id)
    }
}

/// Identifier of a disk mountpoint. `/` (and the empty string) map to `root`.
pub fn mountpoint_id(mountpoint: &str) -> String {
    let id = mountpoint.replace('/', "_");
    let id = id.trim_matches('_');
    if id.is_empty() {
        "root".to_string()
    } else {
        id.to_string()
    }
}

/// Identifier of a network interface. May be empty.
pub fn interface_id(interface: &str) -> String {
    interface.replace(['/', '-'], "_")
}

/// Identifier of a systemd service. May be empty.
pub fn service_id(service: &str) -> String {
    service.replace(['.', '-', '@'], "_")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_mountpoints() {
        assert_eq!(mountpoint_id("/"), "root");
        assert_eq!(mountpoint_id(""), "root");
        assert_eq!(mountpoint_id("/data"), "data");
        assert_eq!(mountpoint_id("/data-old"), "data-old");
        assert_eq!(mountpoint_id("/mnt/backup/"), "mnt_backup");
        assert_ne!(mountpoint_id("/data"), mountpoint_id("/data-old"));
    }

    #[test]
    fn test_interfaces() {
        assert_eq!(interface_id("eth0"), "eth0");
        assert_eq!(interface_id("br-lan"), "br_lan");
        assert_eq!(interface_id("veth/1"), "veth_1");
    }

    #[test]
    fn test_services() {
        assert_eq!(service_id("nginx.service"), "nginx_service");
        assert_eq!(service_id("getty@tty1.service"), "getty_tty1_service");
        assert_eq!(service_id("systemd-resolved"), "systemd_resolved");
    }

    #[test]
    fn test_topics() {
        let id = DeviceId::from_hostname("my-host.local");
        assert_eq!(id.id, "my_host_local");
        assert_eq!(
            id.config_topic("homeassistant"),
            "homeassistant/device/my_host_local/config"
        );
        assert_eq!(id.state_topic(), "system2mqtt/my_host_local/state");
        assert_eq!(
            id.availability_topic(),
            "system2mqtt/my_host_local/availability"
        );
        assert_eq!(id.client_id(), "system2mqtt_my_host_local");
    }
}
