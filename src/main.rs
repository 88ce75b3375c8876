use clap::Parser;
use system2mqtt::agent::{Agent, MonitorOptions};
use system2mqtt::connector::{Availability, Connector, ConnectorOptions};
use system2mqtt::environment::Environment;
use system2mqtt::metrics::{SystemMetrics, Systemctl};

/// MQTT publisher of system metrics for Home Assistant
#[derive(Debug, clap::Parser)]
#[command(version, about)]
struct Cli {
    #[command(flatten)]
    connector: ConnectorOptions,

    #[command(flatten)]
    monitor: MonitorOptions,
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            log::warn!("Unable to listen for Ctrl-C: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(err) => {
                log::warn!("Unable to listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    log::info!("Starting System2MQTT");

    let metrics = SystemMetrics::new();
    let environment = Environment::detect(&metrics).await;
    log::info!(
        "Monitoring {} ({}, {})",
        environment.hostname,
        environment.os_model,
        environment.hardware
    );

    let device_id = environment.device_id.clone();
    let prefix = cli.connector.discovery_prefix().to_string();
    let services = Systemctl::new(cli.monitor.service_timeout);
    let interval = cli.monitor.interval;

    log::info!(
        "Connecting to MQTT broker at {}:{}",
        cli.connector.host,
        cli.connector.effective_port()
    );

    let connector = Connector::new(
        cli.connector,
        device_id.client_id(),
        Availability {
            topic: device_id.availability_topic(),
        },
        interval,
        |client| Agent::new(client, cli.monitor, &prefix, environment, metrics, services),
    );
    connector.run(shutdown_signal()).await?;

    log::info!("Exiting");

    Ok(())
}
