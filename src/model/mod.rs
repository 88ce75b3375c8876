mod component;
mod device_class;
mod discovery;
mod id;

pub use component::*;
pub use device_class::*;
pub use discovery::*;
pub use id::*;

/// Device metadata shared by all components of a discovery document.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Device {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifiers: Vec<String>,

    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sw_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hw_version: Option<String>,
}

/// Information about the application announcing the device.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Origin {
    /// The name of the application that is the origin the discovered MQTT item. This option is required.
    pub name: String,

    /// Software version of the application that supplies the discovered MQTT item.
    #[serde(rename = "sw", alias = "sw_version")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sw_version: Option<String>,

    /// Support URL of the application that supplies the discovered MQTT item.
    #[serde(rename = "url", alias = "support_url")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub support_url: Option<String>,
}
