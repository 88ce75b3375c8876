//! The agent announcing the machine and publishing its state.

mod options;

pub use options::*;

use crate::connector::{Client, ClientError, ConnectorHandler, Publisher};
use crate::environment::Environment;
use crate::generator::generate;
use crate::inventory::Inventory;
use crate::metrics::{
    MetricsProvider, Readings, ServiceStatusProvider, StatePublisher, SystemMetrics, Systemctl,
};
use crate::state::{ComponentSnapshot, StateTracker};
use std::time::SystemTime;

pub struct Agent<C = Client, P = SystemMetrics, S = Systemctl> {
    client: C,
    options: MonitorOptions,
    environment: Environment,
    config_topic: String,
    tracker: StateTracker,
    publisher: StatePublisher,
    metrics: P,
    services: S,
}

impl<C, P, S> Agent<C, P, S>
where
    C: Publisher,
    P: MetricsProvider,
    S: ServiceStatusProvider,
{
    pub fn new(
        client: C,
        options: MonitorOptions,
        discovery_prefix: &str,
        environment: Environment,
        metrics: P,
        services: S,
    ) -> Self {
        Self {
            client,
            config_topic: environment.device_id.config_topic(discovery_prefix),
            tracker: StateTracker::new(&options.state_file),
            publisher: StatePublisher::new(Inventory::build(&options)),
            options,
            environment,
            metrics,
            services,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Announce all components, retracting the ones which disappeared since
    /// the last announcement.
    pub async fn publish_discovery(&self) -> Result<(), ClientError> {
        let document = generate(&self.options, &self.environment);
        let current = ComponentSnapshot::from(&document);

        let removed = self.tracker.reconcile(&current).await;
        if let Some(retraction) = document.retraction(&removed.components) {
            log::info!(
                "Removing {} component(s) from discovery",
                removed.components.len()
            );
            self.client
                .publish_json(&self.config_topic, true, &retraction)?;
        }

        log::info!("Publishing discovery config to {}", self.config_topic);
        self.client.publish_json(&self.config_topic, true, &document)?;

        self.tracker.persist(&current).await;

        Ok(())
    }

    pub fn publish_availability(&self, online: bool) -> Result<(), ClientError> {
        let payload = if online { "online" } else { "offline" };
        self.client.publish(
            &self.environment.device_id.availability_topic(),
            true,
            payload.into(),
        )
    }

    /// Read the metrics and publish them. Failures are logged.
    pub async fn publish_states(&mut self) {
        let now = SystemTime::now();
        let readings = Readings::gather(
            self.publisher.inventory(),
            &mut self.metrics,
            &self.services,
            now,
        )
        .await;

        let snapshot = self.publisher.assemble(&readings, now);
        log::debug!("Publishing state: {snapshot:?}");

        if let Err(err) = self.client.publish_json(
            &self.environment.device_id.state_topic(),
            false,
            &snapshot,
        ) {
            log::warn!("Failed to publish state: {err}");
        }
    }
}

impl<C, P, S> ConnectorHandler for Agent<C, P, S>
where
    C: Publisher,
    P: MetricsProvider,
    S: ServiceStatusProvider,
{
    type Error = ClientError;

    async fn connected(&mut self, state: bool) -> Result<(), Self::Error> {
        log::info!("Connected: {state}");
        if state {
            self.publish_discovery().await?;
            self.publish_availability(true)?;
        }
        Ok(())
    }

    async fn restarted(&mut self) -> Result<(), Self::Error> {
        log::info!("Home Assistant restarted, resending discovery config");
        self.publish_discovery().await
    }

    async fn tick(&mut self) -> Result<(), Self::Error> {
        self.publish_states().await;
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<(), Self::Error> {
        self.publish_availability(false)
    }
}
