use rumqttc::{AsyncClient, QoS};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("serialization failure")]
    Serialization(#[from] serde_json::Error),
    #[error("client error")]
    Client(#[from] rumqttc::ClientError),
}

/// Sends messages to the broker without waiting for acknowledgement.
pub trait Publisher {
    fn publish(&self, topic: &str, retain: bool, payload: Vec<u8>) -> Result<(), ClientError>;

    fn publish_json<T: serde::Serialize>(
        &self,
        topic: &str,
        retain: bool,
        payload: &T,
    ) -> Result<(), ClientError> {
        self.publish(topic, retain, serde_json::to_vec(payload)?)
    }
}

#[derive(Clone)]
pub struct Client {
    pub mqtt: AsyncClient,
}

impl Publisher for Client {
    fn publish(&self, topic: &str, retain: bool, payload: Vec<u8>) -> Result<(), ClientError> {
        log::debug!("Publish on {topic} (retain: {retain})");

        self.mqtt
            .try_publish(topic, QoS::AtLeastOnce, retain, payload)
            .inspect_err(|err| {
                log::warn!("failed to publish on {topic}: {err}");
            })?;

        Ok(())
    }
}
