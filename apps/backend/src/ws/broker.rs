//! Redis pub/sub fanout across backend instances.
//!
//! Each instance publishes draft events to `room:{id}` and runs one
//! pattern subscriber that forwards everything it hears to its local
//! [`RoomRegistry`].

use std::sync::Arc;
use std::time::Duration;

use rand::random;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, RedisError};
use tokio::sync::Mutex;
use tokio::time::sleep;
use tokio_stream::StreamExt;
use tracing::{debug, error, info, warn};

use crate::domain::events::DraftEvent;
use crate::error::AppError;
use crate::ws::hub::RoomRegistry;

const CHANNEL_PATTERN: &str = "room:*";

// Subscriber retry (background task)
const INITIAL_RETRY_DELAY_SECS: f64 = 1.0;
const MAX_RETRY_DELAY_SECS: f64 = 60.0;
const RETRY_DELAY_MULTIPLIER: f64 = 2.0;
const JITTER_PERCENT: f64 = 0.2;

// Publisher retry (request path)
const PUBLISHER_MAX_ATTEMPTS: u32 = 3;
const PUBLISHER_INITIAL_RETRY_DELAY_MS: u64 = 50;
const PUBLISHER_MAX_RETRY_DELAY_MS: u64 = 200;

pub fn room_channel(room_id: i64) -> String {
    format!("room:{room_id}")
}

fn parse_room_channel(channel: &str) -> Option<i64> {
    let id = channel.strip_prefix("room:")?;
    id.parse().ok()
}

fn is_transient(err: &RedisError) -> bool {
    err.is_io_error()
        || err.is_connection_refusal()
        || err.is_connection_dropped()
        || err.is_timeout()
}

pub struct RealtimeBroker {
    registry: Arc<RoomRegistry>,
    publisher: Mutex<ConnectionManager>,
}

impl RealtimeBroker {
    pub async fn connect(redis_url: &str) -> Result<Arc<Self>, AppError> {
        let client = Client::open(redis_url)
            .map_err(|err| AppError::config(format!("Invalid REDIS_URL: {err}")))?;

        let manager = ConnectionManager::new(client.clone())
            .await
            .map_err(|err| AppError::internal(format!("Unable to initialize Redis connection manager: {err}")))?;

        let registry = Arc::new(RoomRegistry::new());
        let broker = Arc::new(Self {
            registry: registry.clone(),
            publisher: Mutex::new(manager),
        });

        spawn_subscriber(client, registry);

        Ok(broker)
    }

    pub fn registry(&self) -> Arc<RoomRegistry> {
        self.registry.clone()
    }

    /// Publish with a short bounded retry on transient failures.
    pub async fn publish(&self, event: &DraftEvent) -> Result<(), AppError> {
        let encoded = serde_json::to_string(event)
            .map_err(|err| AppError::internal(format!("Failed to serialize draft event: {err}")))?;
        let channel = room_channel(event.room_id);

        let mut attempt = 0u32;
        loop {
            attempt += 1;

            let res = {
                let mut publisher = self.publisher.lock().await;
                publisher
                    .publish::<_, _, ()>(channel.as_str(), encoded.as_str())
                    .await
            };

            match res {
                Ok(()) => return Ok(()),
                Err(err) if attempt < PUBLISHER_MAX_ATTEMPTS && is_transient(&err) => {
                    let delay_ms = PUBLISHER_INITIAL_RETRY_DELAY_MS
                        .saturating_mul(2_u64.pow(attempt - 1))
                        .min(PUBLISHER_MAX_RETRY_DELAY_MS);
                    warn!(error = %err, attempt, retry_delay_ms = delay_ms, "Redis publish failed, retrying");
                    sleep(Duration::from_millis(delay_ms)).await;
                }
                Err(err) => {
                    return Err(AppError::internal(format!(
                        "Failed to publish draft event to Redis: {err}"
                    )));
                }
            }
        }
    }
}

fn retry_delay(attempt: u32) -> Duration {
    let exp = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
    let capped = (INITIAL_RETRY_DELAY_SECS * RETRY_DELAY_MULTIPLIER.powi(exp)).min(MAX_RETRY_DELAY_SECS);
    let jitter = (random::<f64>() * 2.0 - 1.0) * capped * JITTER_PERCENT;
    Duration::from_secs_f64((capped + jitter).max(0.1))
}

fn spawn_subscriber(client: Client, registry: Arc<RoomRegistry>) {
    tokio::spawn(async move {
        let mut attempt = 0u32;
        loop {
            match run_subscription(&client, &registry).await {
                Ok(()) => {
                    warn!("Redis subscription stream ended, reconnecting");
                    attempt = 0;
                }
                Err(err) if is_transient(&err) => {
                    attempt = attempt.saturating_add(1).min(10);
                    let delay = retry_delay(attempt);
                    warn!(
                        error = %err,
                        attempt,
                        retry_delay_secs = delay.as_secs_f64(),
                        "Redis subscription failed, retrying"
                    );
                    sleep(delay).await;
                }
                Err(err) => {
                    error!(error = %err, "Redis subscription failed with permanent error, exiting");
                    break;
                }
            }
        }
    });
}

/// Returns `Ok` when the stream ends, `Err` when it could not be set up.
async fn run_subscription(client: &Client, registry: &RoomRegistry) -> Result<(), RedisError> {
    let mut pubsub = client.get_async_pubsub().await?;
    pubsub.psubscribe(CHANNEL_PATTERN).await?;
    info!(pattern = CHANNEL_PATTERN, "Redis subscription established");

    let mut stream = pubsub.into_on_message();
    while let Some(msg) = stream.next().await {
        let Ok(channel) = msg.get_channel::<String>() else {
            continue;
        };
        let Ok(payload) = msg.get_payload::<String>() else {
            continue;
        };

        match serde_json::from_str::<DraftEvent>(&payload) {
            Ok(event) => {
                if parse_room_channel(&channel) != Some(event.room_id) {
                    warn!(channel = %channel, room_id = event.room_id, "draft event on mismatched channel");
                }
                let delivered = registry.broadcast(&event);
                debug!(room_id = event.room_id, delivered, "fanned out draft event");
            }
            Err(err) => {
                error!(error = %err, channel = %channel, "Failed to decode draft event payload");
            }
        }
    }
    Ok(())
}
