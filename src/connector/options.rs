use std::time::Duration;

/// Default limit of MQTT packets, well above the 10 KiB of `rumqttc`.
pub const DEFAULT_MAX_PACKET_SIZE: usize = 256 * 1024;

#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[cfg_attr(feature = "clap", derive(clap::Args))]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct ConnectorOptions {
    /// The MQTT client id, defaults to `system2mqtt_<device id>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "clap", arg(long, env))]
    pub client_id: Option<String>,

    /// Discovery prefix, defaults to `homeassistant`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "clap", arg(long, env))]
    pub topic_base: Option<String>,

    /// The MQTT's servers/brokers hostname
    #[serde(default = "default_host")]
    #[cfg_attr(feature = "clap", arg(long, env, default_value = "localhost"))]
    pub host: String,

    /// The MQTT's server/brokers port, defaults to 1883 without TLS and 8883 with TLS
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "clap", arg(long, env))]
    pub port: Option<u16>,

    /// Connect using TLS
    #[serde(default, skip_serializing_if = "crate::utils::is_default")]
    #[cfg_attr(feature = "clap", arg(long, env))]
    pub tls: bool,

    #[serde(default = "default_keep_alive", with = "humantime_serde")]
    #[cfg_attr(feature = "clap", arg(long, env, value_parser = DurationValueParser, default_value = "60s"))]
    #[cfg_attr(feature = "schemars", schemars(schema_with = "humantime_duration"))]
    pub keep_alive: Duration,

    /// Largest MQTT packet sent or received, in bytes. The discovery document
    /// carries all components in a single message.
    #[serde(default = "default_max_packet_size")]
    #[cfg_attr(feature = "clap", arg(long, env, default_value_t = DEFAULT_MAX_PACKET_SIZE))]
    pub max_packet_size: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "clap", arg(long, env))]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "clap", arg(long, env))]
    pub password: Option<String>,
}

impl ConnectorOptions {
    pub fn discovery_prefix(&self) -> &str {
        self.topic_base.as_deref().unwrap_or("homeassistant")
    }

    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or(if self.tls { 8883 } else { 1883 })
    }
}

#[cfg(feature = "schemars")]
pub fn humantime_duration(
    gen: &mut schemars::gen::SchemaGenerator,
) -> schemars::schema::Schema {
    use schemars::schema::*;
    use schemars::JsonSchema;
    use serde_json::json;

    let mut schema: SchemaObject = <String>::json_schema(gen).into();
    schema.metadata = Some(Box::new(Metadata {
        id: None,
        title: None,
        description: Some(r#"A duration in the humantime format. For example: '30s' for 30 seconds. '5m' for 5 minutes."#.to_string()),
        default: None,
        deprecated: false,
        read_only: false,
        write_only: false,
        examples: vec![json!("30s"), json!("1m")],
    }));
    schema.into()
}

#[cfg(feature = "clap")]
#[derive(Clone)]
pub struct DurationValueParser;

#[cfg(feature = "clap")]
impl clap::builder::TypedValueParser for DurationValueParser {
    type Value = Duration;

    fn parse_ref(
        &self,
        cmd: &clap::Command,
        _arg: Option<&clap::Arg>,
        value: &std::ffi::OsStr,
    ) -> Result<Self::Value, clap::Error> {
        use std::str::FromStr;
        Ok(humantime::Duration::from_str(&value.to_string_lossy())
            .map_err(|_err| clap::Error::new(clap::error::ErrorKind::Format).with_cmd(cmd))?
            .into())
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_keep_alive() -> Duration {
    Duration::from_secs(60)
}

fn default_max_packet_size() -> usize {
    DEFAULT_MAX_PACKET_SIZE
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let options: ConnectorOptions = serde_json::from_value(json!({})).unwrap();

        assert_eq!(options.host, "localhost");
        assert_eq!(options.effective_port(), 1883);
        assert_eq!(options.keep_alive, Duration::from_secs(60));
        assert_eq!(options.discovery_prefix(), "homeassistant");
        assert_eq!(options.max_packet_size, DEFAULT_MAX_PACKET_SIZE);
    }

    #[test]
    fn test_tls_port() {
        let options: ConnectorOptions = serde_json::from_value(json!({
            "host": "broker",
            "tls": true,
            "keep_alive": "10s",
            "topic_base": "ha",
        }))
        .unwrap();

        assert_eq!(options.effective_port(), 8883);
        assert_eq!(options.keep_alive, Duration::from_secs(10));
        assert_eq!(options.discovery_prefix(), "ha");
    }
}
