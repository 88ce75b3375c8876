#[derive(Debug, thiserror::Error)]
pub enum Error<H> {
    #[error(transparent)]
    Handler(H),
    #[error("MQTT connection error: {0}")]
    Connection(#[from] rumqttc::ConnectionError),
    #[error("MQTT client error: {0}")]
    Client(#[from] rumqttc::ClientError),
}
