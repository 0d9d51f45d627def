use async_trait::async_trait;
use futures::StreamExt;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{info, warn};

use super::{BrokerError, MessageBroker};

/// Redis pub/sub broker. Publishing reuses one multiplexed connection;
/// each subscription gets a dedicated pub/sub connection pumped into an
/// unbounded channel by a background task.
pub struct RedisBroker {
    client: redis::Client,
    publish_conn: MultiplexedConnection,
}

impl RedisBroker {
    pub async fn connect(client: redis::Client) -> Result<Self, BrokerError> {
        let publish_conn = client.get_multiplexed_async_connection().await?;
        Ok(Self {
            client,
            publish_conn,
        })
    }
}

#[async_trait]
impl MessageBroker for RedisBroker {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), BrokerError> {
        let mut conn = self.publish_conn.clone();
        conn.publish::<_, _, ()>(topic, payload).await?;
        Ok(())
    }

    async fn subscribe(&self, topic: &str) -> Result<UnboundedReceiver<Vec<u8>>, BrokerError> {
        let mut pubsub = self.client.get_async_pubsub().await?;
        pubsub.subscribe(topic).await?;
        info!("Subscribed to redis topic '{topic}'");

        let (tx, rx) = mpsc::unbounded_channel();
        let topic = topic.to_string();
        tokio::spawn(async move {
            let mut messages = pubsub.into_on_message();
            while let Some(msg) = messages.next().await {
                let payload: Vec<u8> = match msg.get_payload() {
                    Ok(p) => p,
                    Err(e) => {
                        warn!("Undecodable payload on topic '{topic}': {e}");
                        continue;
                    }
                };
                if tx.send(payload).is_err() {
                    // Subscriber dropped its receiver; stop pumping.
                    break;
                }
            }
            warn!("Redis subscription for topic '{topic}' ended");
        });

        Ok(rx)
    }
}
