//! Change notifications for downstream consumers (broadcast, caches, UIs).
//!
//! Events are emitted after a change has been committed. Delivery failures
//! are logged by the caller and never roll the change back.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::bracket::{BracketId, MatchId};

/// Notification errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotifyError {
    #[error("Notification channel closed")]
    ChannelClosed,

    #[error("Notification delivery failed: {0}")]
    Delivery(String),
}

/// Kind of committed change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    BracketGenerated,
    MatchStarted,
    MatchCompleted,
    MatchCancelled,
    RoundGenerated,
    BracketReset,
}

/// A committed change to a bracket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BracketEvent {
    pub id: Uuid,
    pub event_type: EventType,
    pub bracket_id: BracketId,
    pub match_id: Option<MatchId>,
    pub payload: serde_json::Value,
    pub occurred_at: DateTime<Utc>,
}

impl BracketEvent {
    pub fn new(event_type: EventType, bracket_id: BracketId, payload: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_type,
            bracket_id,
            match_id: None,
            payload,
            occurred_at: Utc::now(),
        }
    }

    /// Event about a single match
    pub fn for_match(event_type: EventType, match_id: MatchId, payload: serde_json::Value) -> Self {
        Self {
            match_id: Some(match_id),
            ..Self::new(event_type, match_id.bracket, payload)
        }
    }
}

/// Receives committed bracket changes
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: BracketEvent) -> Result<(), NotifyError>;
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn notify(&self, _event: BracketEvent) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Forwards events into a tokio channel
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: mpsc::UnboundedSender<BracketEvent>,
}

impl ChannelNotifier {
    pub fn new(sender: mpsc::UnboundedSender<BracketEvent>) -> Self {
        Self { sender }
    }

    /// Notifier plus the receiving end of its channel
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<BracketEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::new(sender), receiver)
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn notify(&self, event: BracketEvent) -> Result<(), NotifyError> {
        self.sender
            .send(event)
            .map_err(|_| NotifyError::ChannelClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bracket::BracketKind;

    #[tokio::test]
    async fn test_channel_notifier_delivers() {
        let (notifier, mut receiver) = ChannelNotifier::channel();
        let bracket = BracketId::new(1, BracketKind::Main);
        let match_id = MatchId::new(bracket, 1, 2);

        notifier
            .notify(BracketEvent::for_match(
                EventType::MatchCompleted,
                match_id,
                serde_json::json!({"winner": 4}),
            ))
            .await
            .unwrap();

        let event = receiver.recv().await.unwrap();
        assert_eq!(event.event_type, EventType::MatchCompleted);
        assert_eq!(event.bracket_id, bracket);
        assert_eq!(event.match_id, Some(match_id));
        assert_eq!(event.payload["winner"], 4);
    }

    #[tokio::test]
    async fn test_closed_channel_reports_error() {
        let (notifier, receiver) = ChannelNotifier::channel();
        drop(receiver);
        let event = BracketEvent::new(
            EventType::BracketGenerated,
            BracketId::new(1, BracketKind::Swiss),
            serde_json::Value::Null,
        );
        assert_eq!(notifier.notify(event).await, Err(NotifyError::ChannelClosed));
    }

    #[test]
    fn test_event_type_serialization() {
        let json = serde_json::to_string(&EventType::BracketReset).unwrap();
        assert_eq!(json, "\"bracket_reset\"");
    }
}
