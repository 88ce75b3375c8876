use crate::model::{Component, Device, Origin, Platform, Retracted};
use serde::ser::SerializeMap;
use std::collections::BTreeMap;

// also see: https://www.home-assistant.io/integrations/mqtt/#device-discovery-payload

/// Device discovery message, announcing all components of a device at once.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct DiscoveryDocument<C = Component> {
    #[serde(rename = "dev")]
    pub device: Device,

    #[serde(rename = "o")]
    pub origin: Origin,

    #[serde(rename = "cmps")]
    pub components: ComponentMap<C>,

    pub state_topic: String,
    pub availability_topic: String,

    pub qos: u8,
}

/// A retraction document, removing the named components from a device.
pub type Retraction = DiscoveryDocument<Retracted>;

impl DiscoveryDocument {
    /// The platform of each announced component, by component id.
    pub fn platforms(&self) -> BTreeMap<String, Platform> {
        self.components
            .iter()
            .map(|(id, component)| (id.to_string(), component.platform))
            .collect()
    }

    /// The state payload keys the components read their values from.
    pub fn value_keys(&self) -> Vec<&str> {
        self.components
            .iter()
            .map(|(_, component)| component.value_key.as_str())
            .collect()
    }

    /// Build a document retracting `removed`, sharing device and origin metadata.
    ///
    /// Returns `None` if there is nothing to retract.
    pub fn retraction(&self, removed: &BTreeMap<String, Platform>) -> Option<Retraction> {
        if removed.is_empty() {
            return None;
        }

        let mut components = ComponentMap::new();
        for (id, platform) in removed {
            components.insert(
                id.clone(),
                Retracted {
                    platform: *platform,
                },
            );
        }

        Some(DiscoveryDocument {
            device: self.device.clone(),
            origin: self.origin.clone(),
            components,
            state_topic: self.state_topic.clone(),
            availability_topic: self.availability_topic.clone(),
            qos: self.qos,
        })
    }
}

/// Components by id, serialized as a JSON object in insertion order.
#[derive(Clone, Debug, PartialEq)]
pub struct ComponentMap<C> {
    entries: Vec<(String, C)>,
}

impl<C> Default for ComponentMap<C> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<C> ComponentMap<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a component. An existing entry with the same id keeps its
    /// position but takes the new value.
    pub fn insert(&mut self, id: impl Into<String>, component: C) {
        let id = id.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == id) {
            Some((_, slot)) => *slot = component,
            None => self.entries.push((id, component)),
        }
    }

    pub fn get(&self, id: &str) -> Option<&C> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == id)
            .map(|(_, component)| component)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &C)> {
        self.entries
            .iter()
            .map(|(id, component)| (id.as_str(), component))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(id, _)| id.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<C: serde::Serialize> serde::Serialize for ComponentMap<C> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (id, component) in &self.entries {
            map.serialize_entry(id, component)?;
        }
        map.end()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StateClass {
    Measurement,
    TotalIncreasing,
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    fn document() -> DiscoveryDocument {
        let mut components = ComponentMap::new();
        components.insert(
            "cpu_usage",
            Component::sensor("host", "cpu_usage", "CPU Usage", "cpu_usage")
                .unit("%")
                .state_class(StateClass::Measurement)
                .icon("mdi:cpu-64-bit"),
        );

        DiscoveryDocument {
            device: Device {
                identifiers: vec!["host".into()],
                name: Some("host".into()),
                model: None,
                manufacturer: Some("System2MQTT".into()),
                sw_version: None,
                hw_version: None,
            },
            origin: Origin {
                name: "system2mqtt".into(),
                sw_version: None,
                support_url: None,
            },
            components,
            state_topic: "system2mqtt/host/state".into(),
            availability_topic: "system2mqtt/host/availability".into(),
            qos: 1,
        }
    }

    #[test]
    fn test_serde() {
        assert_eq!(
            serde_json::to_value(document()).unwrap(),
            json!({
                "dev": {
                    "identifiers": ["host"],
                    "name": "host",
                    "manufacturer": "System2MQTT",
                },
                "o": {
                    "name": "system2mqtt",
                },
                "cmps": {
                    "cpu_usage": {
                        "p": "sensor",
                        "name": "CPU Usage",
                        "unique_id": "host_cpu_usage",
                        "unit_of_measurement": "%",
                        "state_class": "measurement",
                        "icon": "mdi:cpu-64-bit",
                        "value_template": "{{ value_json['cpu_usage'] }}",
                    }
                },
                "state_topic": "system2mqtt/host/state",
                "availability_topic": "system2mqtt/host/availability",
                "qos": 1,
            })
        )
    }

    #[test]
    fn test_retraction() {
        let document = document();
        assert!(document.retraction(&BTreeMap::new()).is_none());

        let removed = BTreeMap::from([
            ("disk_usage_data".to_string(), Platform::Sensor),
            ("service_nginx".to_string(), Platform::BinarySensor),
        ]);
        let retraction = document.retraction(&removed).unwrap();

        let value = serde_json::to_value(&retraction).unwrap();
        assert_eq!(
            value["cmps"],
            json!({
                "disk_usage_data": { "p": "sensor" },
                "service_nginx": { "p": "binary_sensor" },
            })
        );
        assert_eq!(value["dev"], serde_json::to_value(&document.device).unwrap());
        assert_eq!(value["availability_topic"], "system2mqtt/host/availability");
    }

    #[test]
    fn test_insert_keeps_position() {
        let mut map = ComponentMap::new();
        map.insert("a", 1);
        map.insert("b", 2);
        map.insert("a", 3);

        assert_eq!(map.iter().collect::<Vec<_>>(), vec![("a", &3), ("b", &2)]);
        assert_eq!(
            serde_json::to_string(&map).unwrap(),
            r#"{"a":3,"b":2}"#
        );
    }
}
