use std::path::PathBuf;
use std::time::Duration;

/// What to monitor, and how often.
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[cfg_attr(feature = "clap", derive(clap::Args))]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct MonitorOptions {
    /// Interval between two state updates
    #[serde(default = "default_interval", with = "humantime_serde")]
    #[cfg_attr(feature = "clap", arg(long, env, value_parser = DurationValueParser, default_value = "30s"))]
    #[cfg_attr(feature = "schemars", schemars(schema_with = "crate::connector::humantime_duration"))]
    pub interval: Duration,

    /// Disk mountpoints to monitor
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[cfg_attr(feature = "clap", arg(long, env, num_args = 1.., value_delimiter = ','))]
    pub disk_mountpoints: Vec<String>,

    /// Network interfaces to monitor (e.g. eth0 wlan0)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[cfg_attr(feature = "clap", arg(long, env, num_args = 1.., value_delimiter = ','))]
    pub net_interfaces: Vec<String>,

    /// Systemd services to monitor (e.g. nginx.service docker.service)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[cfg_attr(feature = "clap", arg(long, env, num_args = 1.., value_delimiter = ','))]
    pub services: Vec<String>,

    /// File keeping the list of announced components
    #[serde(default = "default_state_file")]
    #[cfg_attr(feature = "clap", arg(long, env, default_value = DEFAULT_STATE_FILE))]
    pub state_file: PathBuf,

    /// Don't report CPU, memory, uptime and temperature
    #[serde(default, skip_serializing_if = "crate::utils::is_default")]
    #[cfg_attr(feature = "clap", arg(long, env))]
    pub disable_defaults: bool,

    /// Time to wait for the status of a single service
    #[serde(default = "default_service_timeout", with = "humantime_serde")]
    #[cfg_attr(feature = "clap", arg(long, env, value_parser = DurationValueParser, default_value = "5s"))]
    #[cfg_attr(feature = "schemars", schemars(schema_with = "crate::connector::humantime_duration"))]
    pub service_timeout: Duration,
}

#[cfg(feature = "clap")]
use crate::connector::DurationValueParser;

const DEFAULT_STATE_FILE: &str = "/var/lib/system2mqtt/state.json";

impl Default for MonitorOptions {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            disk_mountpoints: vec![],
            net_interfaces: vec![],
            services: vec![],
            state_file: default_state_file(),
            disable_defaults: false,
            service_timeout: default_service_timeout(),
        }
    }
}

fn default_interval() -> Duration {
    Duration::from_secs(30)
}

fn default_service_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_state_file() -> PathBuf {
    PathBuf::from(DEFAULT_STATE_FILE)
}
