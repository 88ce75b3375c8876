mod client;
mod error;
mod options;

pub use client::*;
pub use error::*;
pub use options::*;

use rumqttc::{
    AsyncClient, Event, Incoming, LastWill, MqttOptions, Outgoing, QoS, TlsConfiguration,
    Transport,
};
use std::future::Future;
use std::time::Duration;
use tokio::select;
use tokio::time::MissedTickBehavior;

/// Build the client options, with a last will marking the device `offline`.
fn mqtt_options(
    options: &ConnectorOptions,
    client_id: String,
    availability: &Availability,
) -> MqttOptions {
    let mut mqttoptions = MqttOptions::new(client_id, &options.host, options.effective_port());
    mqttoptions.set_keep_alive(options.keep_alive);
    mqttoptions.set_max_packet_size(options.max_packet_size, options.max_packet_size);
    mqttoptions.set_last_will(LastWill::new(
        &availability.topic,
        "offline",
        QoS::AtLeastOnce,
        true,
    ));

    if options.tls {
        mqttoptions.set_transport(Transport::Tls(TlsConfiguration::Native));
    }

    if let Some(username) = &options.username {
        mqttoptions.set_credentials(username, options.password.clone().unwrap_or_default());
    }

    mqttoptions
}

/// Time granted to deliver the final messages on shutdown.
const FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

pub trait ConnectorHandler {
    type Error: std::error::Error + Send + Sync;

    fn connected(&mut self, state: bool) -> impl Future<Output = Result<(), Self::Error>>;
    /// Home Assistant announced it came (back) online.
    fn restarted(&mut self) -> impl Future<Output = Result<(), Self::Error>>;
    /// Called once per interval while connected.
    fn tick(&mut self) -> impl Future<Output = Result<(), Self::Error>>;
    /// Called once before disconnecting, whatever ended the run.
    fn shutdown(&mut self) -> impl Future<Output = Result<(), Self::Error>>;
}

/// The availability topic, carrying `online` and `offline`.
#[derive(Clone, Debug)]
pub struct Availability {
    pub topic: String,
}

pub struct Connector<F, H>
where
    F: FnOnce(Client) -> H,
    H: ConnectorHandler,
{
    options: ConnectorOptions,
    client_id: String,
    availability: Availability,
    interval: Duration,
    handler: F,
}

impl<F, H> Connector<F, H>
where
    F: FnOnce(Client) -> H,
    H: ConnectorHandler,
{
    pub fn new(
        options: ConnectorOptions,
        client_id: impl Into<String>,
        availability: Availability,
        interval: Duration,
        handler: F,
    ) -> Self {
        Self {
            client_id: options.client_id.clone().unwrap_or_else(|| client_id.into()),
            options,
            availability,
            interval,
            handler,
        }
    }

    /// Run until `shutdown` completes or the connection fails.
    pub async fn run(self, shutdown: impl Future<Output = ()>) -> Result<(), Error<H::Error>> {
        let base = self.options.discovery_prefix().to_string();
        let period = self.interval;

        let mqttoptions = mqtt_options(&self.options, self.client_id, &self.availability);
        log::debug!("Options: {mqttoptions:#?}");

        let (client, mut eventloop) = AsyncClient::new(mqttoptions, 32);

        let mut handler = (self.handler)(Client {
            mqtt: client.clone(),
        });

        let result = async {
            // initial handshake, failing here is fatal
            loop {
                if let Event::Incoming(Incoming::ConnAck(_)) = eventloop.poll().await? {
                    break;
                }
            }

            log::info!("Connected");
            client.try_subscribe(format!("{base}/status"), QoS::AtLeastOnce)?;
            handler.connected(true).await.map_err(Error::Handler)?;

            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            tokio::pin!(shutdown);

            loop {
                select! {
                    _ = &mut shutdown => {
                        log::info!("Shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        handler.tick().await.map_err(Error::Handler)?;
                    }
                    event = eventloop.poll() => match event {
                        Ok(Event::Incoming(Incoming::Disconnect)) => {
                            log::info!("Disconnected");
                            handler.connected(false).await.map_err(Error::Handler)?;
                        }
                        Ok(Event::Incoming(Incoming::Publish(publish))) => {
                            log::debug!("Received: {publish:?}");
                            match publish.topic.strip_prefix(&base) {
                                Some("/status") => {
                                    let payload = String::from_utf8_lossy(&publish.payload);
                                    log::info!("Home Assistant status: {payload}");
                                    if payload == "online" {
                                        handler.restarted().await.map_err(Error::Handler)?;
                                    }
                                }
                                _ => {
                                    log::info!("Skipping unknown topic: {}", publish.topic);
                                }
                            }
                        }
                        Ok(_) => {}
                        Err(err) => {
                            log::warn!("Connection failed: {err}");
                            handler.connected(false).await.map_err(Error::Handler)?;
                            return Err(Error::Connection(err));
                        }
                    }
                }
            }

            Ok::<_, Error<H::Error>>(())
        }
        .await;

        if let Err(err) = handler.shutdown().await {
            log::warn!("Failed to announce shutdown: {err}");
        }
        if let Err(err) = client.try_disconnect() {
            log::warn!("Failed to disconnect: {err}");
        }

        let flush = async {
            loop {
                match eventloop.poll().await {
                    Ok(Event::Outgoing(Outgoing::Disconnect)) | Err(_) => break,
                    Ok(_) => {}
                }
            }
        };
        if tokio::time::timeout(FLUSH_TIMEOUT, flush).await.is_err() {
            log::warn!("Timeout delivering final messages");
        }

        log::info!("MQTT runner exited");

        result
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mqtt_options() {
        let options: ConnectorOptions = serde_json::from_value(json!({
            "host": "broker",
            "username": "user",
        }))
        .unwrap();
        let availability = Availability {
            topic: "system2mqtt/host/availability".into(),
        };

        let mqttoptions = mqtt_options(&options, "system2mqtt_host".into(), &availability);

        assert_eq!(mqttoptions.client_id(), "system2mqtt_host");
        assert_eq!(mqttoptions.broker_address(), ("broker".to_string(), 1883));
        assert_eq!(mqttoptions.max_packet_size(), DEFAULT_MAX_PACKET_SIZE);

        let will = mqttoptions.last_will().unwrap();
        assert_eq!(will.topic, "system2mqtt/host/availability");
        assert_eq!(&will.message[..], b"offline");
        assert!(will.retain);
    }
}
