//! Periodic check: a ticker that wakes the UI loop, and the marker check it may start.

use super::core::EventSender;
use crate::events::{EventType, WorkerMessage};
use crate::feed::FeedSource;
use crate::logging::LogLevel;
use crate::network::NetworkClient;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

/// Send `PeriodicTick` every `period` until shutdown. The first tick fires one
/// period after start; a tick delayed by a busy loop is not replayed.
pub fn spawn_ticker(
    period: Duration,
    sender: EventSender,
    mut shutdown: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = shutdown.recv() => break,
                _ = ticker.tick() => sender.send(WorkerMessage::PeriodicTick).await,
            }
        }
    })
}

/// Fetch only the last-update marker, silently, and report it back.
pub async fn run_marker_check(
    feed: &dyn FeedSource,
    network: &NetworkClient,
    sender: &EventSender,
    seq: u64,
) {
    sender
        .send_periodic_event(
            format!("Checking for a new scan (check #{})", seq),
            EventType::Waiting,
            LogLevel::Debug,
        )
        .await;
    let result = network.fetch_last_update(feed).await;
    sender.send(WorkerMessage::MarkerChecked { seq, result }).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::MockFeedSource;
    use crate::network::RetryConfig;
    use crate::types::LastUpdate;
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_ticker_ticks_until_shutdown() {
        let (tx, mut rx) = mpsc::channel(8);
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let handle = spawn_ticker(Duration::from_millis(10), EventSender::new(tx), shutdown_rx);

        for _ in 0..2 {
            let message = timeout(Duration::from_secs(2), rx.recv()).await.unwrap();
            assert!(matches!(message, Some(WorkerMessage::PeriodicTick)));
        }

        shutdown_tx.send(()).unwrap();
        timeout(Duration::from_secs(2), handle).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_marker_check_reports_marker() {
        let mut feed = MockFeedSource::new();
        feed.expect_fetch_last_update()
            .times(1)
            .returning(|_| Ok(LastUpdate::parse("2024-05-01T12:30:00Z")));

        let (tx, mut rx) = mpsc::channel(8);
        let network = NetworkClient::new(RetryConfig::default());
        run_marker_check(&feed, &network, &EventSender::new(tx), 9).await;

        match rx.try_recv() {
            Ok(WorkerMessage::Event(event)) => assert_eq!(event.log_level, LogLevel::Debug),
            other => panic!("expected check event, got {:?}", other),
        }
        match rx.try_recv() {
            Ok(WorkerMessage::MarkerChecked { seq, result }) => {
                assert_eq!(seq, 9);
                assert_eq!(result.unwrap().raw, "2024-05-01T12:30:00Z");
            }
            other => panic!("expected marker result, got {:?}", other),
        }
    }
}
