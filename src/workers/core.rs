//! Core worker utilities

use crate::events::{Event, EventType, WorkerMessage};
use crate::logging::LogLevel;
use tokio::sync::mpsc;

/// Common message sending utilities for workers
#[derive(Clone, Debug)]
pub struct EventSender {
    sender: mpsc::Sender<WorkerMessage>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<WorkerMessage>) -> Self {
        Self { sender }
    }

    /// Send any worker message. A closed channel means the UI loop is gone.
    pub async fn send(&self, message: WorkerMessage) {
        let _ = self.sender.send(message).await;
    }

    /// Send a generic event
    pub async fn send_event(&self, event: Event) {
        self.send(WorkerMessage::Event(event)).await;
    }

    pub async fn send_loader_event(
        &self,
        message: String,
        event_type: EventType,
        log_level: LogLevel,
    ) {
        self.send_event(Event::loader_with_level(message, event_type, log_level))
            .await;
    }

    pub async fn send_periodic_event(
        &self,
        message: String,
        event_type: EventType,
        log_level: LogLevel,
    ) {
        self.send_event(Event::periodic_with_level(message, event_type, log_level))
            .await;
    }
}
