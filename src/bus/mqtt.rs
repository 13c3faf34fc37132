//! MQTT transport built on `rumqttc`.
//!
//! [`MqttBus`] publishes outbound envelopes. [`run_subscriber`] drives the
//! client event loop, subscribes to the checklist topics on every
//! (re)connect, decodes incoming publishes, and forwards them to the
//! reactor through a tokio [`mpsc`] channel.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::MessageBus;
use crate::config::MqttConfig;
use crate::hermes::codec::decode_inbound;
use crate::hermes::topics::SUBSCRIPTIONS;
use crate::hermes::{Envelope, InboundMessage};
use crate::Result;

/// Capacity of the request channel between [`AsyncClient`] and [`EventLoop`].
const CLIENT_CHANNEL_CAPACITY: usize = 64;

/// Build `rumqttc` options from configuration.
///
/// The client id is `<client_id_prefix>-<uuid>` so several skill instances
/// can share a broker.
#[must_use]
pub fn mqtt_options(config: &MqttConfig) -> MqttOptions {
    let client_id = format!("{}-{}", config.client_id_prefix, uuid::Uuid::new_v4());
    let mut options = MqttOptions::new(client_id, config.host.clone(), config.port);
    options.set_keep_alive(Duration::from_secs(config.keep_alive_seconds));

    if let Some(username) = &config.username {
        options.set_credentials(username.clone(), config.password.clone().unwrap_or_default());
    }

    options
}

/// Publishing half of the MQTT connection.
#[derive(Clone)]
pub struct MqttBus {
    client: AsyncClient,
}

impl MqttBus {
    /// Create the client and its event loop.
    ///
    /// No network traffic happens until the event loop is polled by
    /// [`run_subscriber`].
    #[must_use]
    pub fn connect(config: &MqttConfig) -> (Self, EventLoop) {
        let (client, eventloop) = AsyncClient::new(mqtt_options(config), CLIENT_CHANNEL_CAPACITY);
        (Self { client }, eventloop)
    }

    /// Underlying client handle.
    #[must_use]
    pub fn client(&self) -> &AsyncClient {
        &self.client
    }

    /// Ask the broker to close the connection.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Mqtt` if the event loop has already stopped.
    pub async fn disconnect(&self) -> Result<()> {
        self.client.disconnect().await?;
        Ok(())
    }
}

impl MessageBus for MqttBus {
    fn publish(&self, envelope: Envelope) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            debug!(topic = envelope.topic.as_str(), bytes = envelope.payload.len(), "publishing");
            self.client
                .publish(envelope.topic, QoS::AtMostOnce, false, envelope.payload)
                .await?;
            Ok(())
        })
    }
}

/// MQTT subscriber task — polls the event loop and emits [`InboundMessage`]s.
///
/// Subscribes to [`SUBSCRIPTIONS`] on every `ConnAck`, so subscriptions
/// survive reconnects. Publishes that fail to decode are logged and
/// skipped. Connection errors are logged and the loop waits
/// `reconnect_delay` before polling again, which makes `rumqttc` reconnect.
///
/// # Cancellation
///
/// Exits cleanly when `cancel` fires or when `event_tx` is closed.
///
/// # Errors
///
/// Always returns `Ok(())`; transport failures are retried, not surfaced.
pub async fn run_subscriber(
    client: AsyncClient,
    mut eventloop: EventLoop,
    event_tx: mpsc::Sender<InboundMessage>,
    reconnect_delay: Duration,
    cancel: CancellationToken,
) -> Result<()> {
    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => {
                debug!("mqtt subscriber: cancellation received, stopping");
                break;
            }

            event = eventloop.poll() => {
                match event {
                    Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                        info!(code = ?ack.code, "mqtt connected");
                        subscribe_all(&client);
                    }

                    Ok(Event::Incoming(Packet::Publish(publish))) => {
                        match decode_inbound(&publish.topic, &publish.payload) {
                            Ok(message) => {
                                // Blocks while the reactor is behind; the event loop is
                                // not polled meanwhile, so the reactor's own publishes
                                // queue in the client's request channel until it drains.
                                if event_tx.send(message).await.is_err() {
                                    debug!("mqtt subscriber: event_tx closed, stopping");
                                    break;
                                }
                            }
                            Err(err) => {
                                warn!(
                                    topic = publish.topic.as_str(),
                                    %err,
                                    "mqtt subscriber: undecodable payload, skipping"
                                );
                            }
                        }
                    }

                    Ok(_) => {}

                    Err(err) => {
                        warn!(%err, "mqtt connection error, retrying");
                        tokio::select! {
                            () = cancel.cancelled() => break,
                            () = tokio::time::sleep(reconnect_delay) => {}
                        }
                    }
                }
            }
        }
    }

    Ok(())
}

fn subscribe_all(client: &AsyncClient) {
    for topic in SUBSCRIPTIONS {
        match client.try_subscribe(topic, QoS::AtMostOnce) {
            Ok(()) => debug!(topic, "subscribed"),
            Err(err) => warn!(topic, %err, "subscribe failed"),
        }
    }
}
