//! Load cycles: fetch every feed resource in parallel and hand each one to the
//! UI loop as soon as it settles.

use super::core::EventSender;
use super::periodic::run_marker_check;
use crate::events::{EventType, FetchedResource, LoadMode, WorkerMessage};
use crate::feed::FeedSource;
use crate::logging::LogLevel;
use crate::network::NetworkClient;
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// One load cycle to run.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub seq: u64,
    pub mode: LoadMode,
}

/// Everything a background fetch needs, cheap to clone into spawned tasks.
#[derive(Clone)]
pub struct LoadDispatcher {
    feed: Arc<dyn FeedSource>,
    network: Arc<NetworkClient>,
    sender: EventSender,
}

impl LoadDispatcher {
    pub fn new(feed: Arc<dyn FeedSource>, network: Arc<NetworkClient>, sender: EventSender) -> Self {
        Self {
            feed,
            network,
            sender,
        }
    }

    pub fn has_last_update_feed(&self) -> bool {
        self.feed.has_last_update_feed()
    }

    pub fn spawn_load(&self, request: LoadRequest) -> JoinHandle<()> {
        let dispatcher = self.clone();
        tokio::spawn(async move {
            run_load_cycle(
                dispatcher.feed.as_ref(),
                &dispatcher.network,
                &dispatcher.sender,
                request,
            )
            .await;
        })
    }

    pub fn spawn_marker_check(&self, seq: u64) -> JoinHandle<()> {
        let dispatcher = self.clone();
        tokio::spawn(async move {
            run_marker_check(
                dispatcher.feed.as_ref(),
                &dispatcher.network,
                &dispatcher.sender,
                seq,
            )
            .await;
        })
    }
}

/// Fetch results, last-update marker and meta concurrently. Each resource is
/// sent as its own `Fetched` message in completion order, so a failure of one
/// never holds back another. `CycleFinished` is always sent last.
pub async fn run_load_cycle(
    feed: &dyn FeedSource,
    network: &NetworkClient,
    sender: &EventSender,
    request: LoadRequest,
) {
    let LoadRequest { seq, mode } = request;

    let mut pending: FuturesUnordered<BoxFuture<'_, FetchedResource>> = FuturesUnordered::new();
    pending.push(
        async move { FetchedResource::Results(network.fetch_results(feed).await) }.boxed(),
    );
    if feed.has_last_update_feed() {
        pending.push(
            async move { FetchedResource::LastUpdate(network.fetch_last_update(feed).await) }
                .boxed(),
        );
    }
    if feed.has_meta_feed() {
        pending.push(async move { FetchedResource::Meta(network.fetch_meta(feed).await) }.boxed());
    }

    let level = if mode.is_silent() {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };
    sender
        .send_loader_event(
            format!("Fetching scan results ({} load #{})...", mode, seq),
            EventType::Refresh,
            level,
        )
        .await;

    while let Some(resource) = pending.next().await {
        sender
            .send(WorkerMessage::Fetched {
                seq,
                mode,
                resource,
            })
            .await;
    }
    sender.send(WorkerMessage::CycleFinished { seq }).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::MockFeedSource;
    use crate::feed::error::FeedError;
    use crate::network::{CacheBustStrategy, RetryConfig};
    use crate::types::{Asset, LastUpdate};
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn network() -> NetworkClient {
        NetworkClient::new(RetryConfig {
            max_attempts: 1,
            base_delay: Duration::from_millis(1),
            cache_bust: CacheBustStrategy::Counter,
        })
    }

    fn drain(receiver: &mut mpsc::Receiver<WorkerMessage>) -> Vec<WorkerMessage> {
        let mut messages = Vec::new();
        while let Ok(message) = receiver.try_recv() {
            messages.push(message);
        }
        messages
    }

    #[tokio::test]
    // A failed marker fetch does not hold back the results of the same cycle.
    async fn test_resources_are_delivered_independently() {
        let mut feed = MockFeedSource::new();
        feed.expect_has_last_update_feed().return_const(true);
        feed.expect_has_meta_feed().return_const(false);
        feed.expect_fetch_results()
            .times(1)
            .returning(|_| Ok(vec![Asset::new("btc").with_score(8.0)]));
        feed.expect_fetch_last_update().times(1).returning(|_| {
            Err(FeedError::Http {
                status: 500,
                message: String::new(),
            })
        });

        let (tx, mut rx) = mpsc::channel(16);
        let sender = EventSender::new(tx);
        let request = LoadRequest {
            seq: 4,
            mode: LoadMode::Manual,
        };
        run_load_cycle(&feed, &network(), &sender, request).await;

        let messages = drain(&mut rx);
        let mut results_ok = false;
        let mut marker_failed = false;
        for message in &messages {
            if let WorkerMessage::Fetched { seq, resource, .. } = message {
                assert_eq!(*seq, 4);
                match resource {
                    FetchedResource::Results(Ok(assets)) => results_ok = assets.len() == 1,
                    FetchedResource::LastUpdate(Err(_)) => marker_failed = true,
                    other => panic!("unexpected resource {:?}", other),
                }
            }
        }
        assert!(results_ok);
        assert!(marker_failed);
        assert!(matches!(
            messages.last(),
            Some(WorkerMessage::CycleFinished { seq: 4 })
        ));
    }

    #[tokio::test]
    async fn test_sources_without_marker_fetch_results_only() {
        let mut feed = MockFeedSource::new();
        feed.expect_has_last_update_feed().return_const(false);
        feed.expect_has_meta_feed().return_const(false);
        feed.expect_fetch_results().times(1).returning(|_| Ok(vec![]));
        feed.expect_fetch_last_update()
            .never()
            .returning(|_| Ok(LastUpdate::unknown()));

        let (tx, mut rx) = mpsc::channel(16);
        let request = LoadRequest {
            seq: 1,
            mode: LoadMode::Silent,
        };
        run_load_cycle(&feed, &network(), &EventSender::new(tx), request).await;

        let fetched = drain(&mut rx)
            .into_iter()
            .filter(|message| matches!(message, WorkerMessage::Fetched { .. }))
            .count();
        assert_eq!(fetched, 1);
    }
}
