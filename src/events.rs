//! Scrape completion notifications.
//!
//! A [`ScrapingComplete`] event is published at the end of every full scrape
//! cycle of a provider, so dependent subsystems (downstream caches, API
//! warmers) can react.

use std::pin::Pin;

use futures_util::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tracing::{trace, warn};

const TOPIC_PREFIX: &str = "load:service";

/// Default number of undelivered events buffered per subscriber.
const DEFAULT_CAPACITY: usize = 64;

/// Stream of scrape completion events.
pub type EventStream = Pin<Box<dyn Stream<Item = ScrapingComplete> + Send>>;

/// A full scrape cycle finished for a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapingComplete {
    pub provider: String,
}

impl ScrapingComplete {
    /// Topic name of this event (`load:service:<provider>`).
    pub fn topic(&self) -> String {
        format!("{TOPIC_PREFIX}:{}", self.provider)
    }
}

/// Outbound notification sink.
pub trait EventBus: Send + Sync {
    /// Emit a "scraping complete" event for `provider`.
    fn publish_scraping_complete(&self, provider: &str);
}

/// In-process event bus backed by a tokio broadcast channel.
///
/// Publishing never blocks. Slow subscribers that fall more than the
/// channel capacity behind skip the missed events.
#[derive(Debug, Clone)]
pub struct BroadcastEventBus {
    sender: broadcast::Sender<ScrapingComplete>,
}

impl BroadcastEventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to completion events of every provider.
    pub fn subscribe(&self) -> EventStream {
        Box::pin(
            BroadcastStream::new(self.sender.subscribe()).filter_map(|event| async move {
                match event {
                    Ok(event) => Some(event),
                    Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                        warn!(skipped, "event subscriber lagged, events dropped");
                        None
                    }
                }
            }),
        )
    }

    /// Subscribe to completion events of one provider.
    pub fn subscribe_provider(&self, provider: impl Into<String>) -> EventStream {
        let provider = provider.into();
        Box::pin(self.subscribe().filter(move |event| {
            let matches = event.provider == provider;
            async move { matches }
        }))
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus for BroadcastEventBus {
    fn publish_scraping_complete(&self, provider: &str) {
        let event = ScrapingComplete {
            provider: provider.to_string(),
        };
        trace!(topic = %event.topic(), "publishing event");
        // An error only means nobody is listening.
        let _ = self.sender.send(event);
    }
}

/// Event bus that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEventBus;

impl EventBus for NoopEventBus {
    fn publish_scraping_complete(&self, _provider: &str) {}
}
