//! Rendering of the device discovery document.

use crate::agent::MonitorOptions;
use crate::environment::Environment;
use crate::inventory::{ComponentKind, Entity, Inventory};
use crate::model::{
    BinarySensorClass, Component, ComponentMap, Device, DiscoveryDocument, Origin, SensorClass,
    StateClass, APPLICATION,
};

const MANUFACTURER: &str = "System2MQTT";

/// Generate the discovery document for the configured targets.
///
/// The output only depends on its inputs, components are ordered as configured.
pub fn generate(options: &MonitorOptions, environment: &Environment) -> DiscoveryDocument {
    render(&Inventory::build(options), environment)
}

/// Render the discovery document of an inventory.
pub fn render(inventory: &Inventory, environment: &Environment) -> DiscoveryDocument {
    let device_id = &environment.device_id;

    let mut components = ComponentMap::new();
    for entity in inventory.iter() {
        for (id, component) in entity_components(entity, environment) {
            components.insert(id, component);
        }
    }

    DiscoveryDocument {
        device: Device {
            identifiers: vec![device_id.id.clone()],
            name: Some(environment.hostname.clone()),
            model: Some(environment.os_model.clone()),
            manufacturer: Some(MANUFACTURER.to_string()),
            sw_version: Some(environment.os_version.clone()),
            hw_version: Some(environment.hardware.clone()),
        },
        origin: Origin {
            name: APPLICATION.to_string(),
            sw_version: Some(env!("CARGO_PKG_VERSION").to_string()),
            support_url: Some(env!("CARGO_PKG_REPOSITORY").to_string()),
        },
        components,
        state_topic: device_id.state_topic(),
        availability_topic: device_id.availability_topic(),
        qos: 1,
    }
}

fn entity_components(entity: &Entity, environment: &Environment) -> Vec<(String, Component)> {
    let device = environment.device_id.id.as_str();
    let target = entity.target.as_str();

    let sensor = |metric: &str, name: String| {
        let id = entity.metric_id(metric);
        let component = Component::sensor(device, &id, name, id.clone());
        (id, component)
    };

    match entity.kind {
        ComponentKind::Baseline => {
            let measurement = |id: &str, name: &str, unit: &str, icon: &str| {
                (
                    id.to_string(),
                    Component::sensor(device, id, name, id)
                        .unit(unit)
                        .state_class(StateClass::Measurement)
                        .icon(icon),
                )
            };

            let uptime = Component::sensor(device, "uptime", "Uptime", "uptime_seconds")
                .unit("s")
                .state_class(StateClass::TotalIncreasing)
                .icon("mdi:clock-outline");

            let mut temperature =
                Component::sensor(device, "cpu_temp", "CPU Temperature", "cpu_temperature")
                    .unit("°C")
                    .device_class(SensorClass::Temperature)
                    .state_class(StateClass::Measurement)
                    .icon("mdi:thermometer");
            if !environment.cpu_temperature_available {
                log::debug!("CPU temperature not available, announcing it disabled by default");
                temperature = temperature.enabled_by_default(false);
            }

            vec![
                measurement("cpu_usage", "CPU Usage", "%", "mdi:cpu-64-bit"),
                measurement("memory_usage", "Memory Usage", "%", "mdi:memory"),
                measurement("memory_used", "Memory Used", "GB", "mdi:memory"),
                measurement("memory_total", "Memory Total", "GB", "mdi:memory"),
                ("uptime".to_string(), uptime),
                ("cpu_temp".to_string(), temperature),
            ]
        }
        ComponentKind::Disk => [
            ("disk_usage", "Usage", "%"),
            ("disk_used", "Used", "GB"),
            ("disk_total", "Total", "GB"),
        ]
        .into_iter()
        .map(|(metric, label, unit)| {
            let (id, component) = sensor(metric, format!("Disk {target} {label}"));
            let component = component
                .unit(unit)
                .state_class(StateClass::Measurement)
                .icon("mdi:harddisk");
            (id, component)
        })
        .collect(),
        ComponentKind::Network => [
            ("net_upload", "Upload", "Mbps", StateClass::Measurement, "mdi:upload-network"),
            ("net_download", "Download", "Mbps", StateClass::Measurement, "mdi:download-network"),
            ("net_sent", "Sent", "GB", StateClass::TotalIncreasing, "mdi:upload"),
            ("net_recv", "Received", "GB", StateClass::TotalIncreasing, "mdi:download"),
        ]
        .into_iter()
        .map(|(metric, label, unit, state_class, icon)| {
            let (id, component) = sensor(metric, format!("Network {target} {label}"));
            (id, component.unit(unit).state_class(state_class).icon(icon))
        })
        .collect(),
        ComponentKind::Service => {
            let id = entity.metric_id("service");
            let component =
                Component::binary_sensor(device, &id, format!("Service {target}"), id.clone())
                    .device_class(BinarySensorClass::Running)
                    .icon("mdi:cog");
            vec![(id, component)]
        }
    }
}
