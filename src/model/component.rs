use crate::model::StateClass;

/// The Home Assistant platform an entity is announced on.
#[derive(
    Copy,
    Clone,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Debug,
    serde::Serialize,
    serde::Deserialize,
    strum::AsRefStr,
    strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Platform {
    BinarySensor,
    Sensor,
}

/// One entity of a device discovery document.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Component {
    #[serde(rename = "p")]
    pub platform: Platform,

    pub name: String,

    pub unique_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_of_measurement: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_class: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_class: Option<StateClass>,

    pub icon: String,

    pub value_template: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled_by_default: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload_on: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload_off: Option<String>,

    /// Key of this component's value in the state payload
    #[serde(skip)]
    pub value_key: String,
}

impl Component {
    /// Create a sensor reading `value_key` from the state payload.
    pub fn sensor(
        device_id: &str,
        id: &str,
        name: impl Into<String>,
        value_key: impl Into<String>,
    ) -> Self {
        Self::new(Platform::Sensor, device_id, id, name, value_key)
    }

    /// Create a binary sensor reporting `active`/`inactive`.
    pub fn binary_sensor(
        device_id: &str,
        id: &str,
        name: impl Into<String>,
        value_key: impl Into<String>,
    ) -> Self {
        let mut component = Self::new(Platform::BinarySensor, device_id, id, name, value_key);
        component.payload_on = Some("active".into());
        component.payload_off = Some("inactive".into());
        component
    }

    fn new(
        platform: Platform,
        device_id: &str,
        id: &str,
        name: impl Into<String>,
        value_key: impl Into<String>,
    ) -> Self {
        let value_key = value_key.into();
        Self {
            platform,
            name: name.into(),
            unique_id: format!("{device_id}_{id}"),
            unit_of_measurement: None,
            device_class: None,
            state_class: None,
            icon: String::new(),
            // bracket lookup, keys may contain `-` or `.`
            value_template: format!("{{{{ value_json['{value_key}'] }}}}"),
            enabled_by_default: None,
            payload_on: None,
            payload_off: None,
            value_key,
        }
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit_of_measurement = Some(unit.into());
        self
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn device_class(mut self, class: impl AsRef<str>) -> Self {
        self.device_class = Some(class.as_ref().to_string());
        self
    }

    pub fn state_class(mut self, class: StateClass) -> Self {
        self.state_class = Some(class);
        self
    }

    pub fn enabled_by_default(mut self, enabled: bool) -> Self {
        self.enabled_by_default = Some(enabled);
        self
    }
}

/// A component entry of a retraction document, naming only the platform.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Retracted {
    #[serde(rename = "p")]
    pub platform: Platform,
}
