//! Project update notifications and the in-process event bus.
//!
//! After every create, update or delete the coordinator publishes a
//! [`ProjectEvent`] so listing views can re-query. Delivery is same-process
//! only, fire-and-forget: nothing is persisted and nothing is acknowledged.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

// ============================================================================
// Project Event (domain payload)
// ============================================================================

/// Kind of mutation that produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectAction {
    Created,
    Updated,
    Deleted,
}

impl ProjectAction {
    /// Namespaced event type for the envelope (e.g., `"project.created"`).
    pub fn event_type(&self) -> &'static str {
        match self {
            ProjectAction::Created => "project.created",
            ProjectAction::Updated => "project.updated",
            ProjectAction::Deleted => "project.deleted",
        }
    }
}

/// Payload published after a catalog mutation.
///
/// Serialized as `{"action":"created","projectId":"...","imageUrl":"..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectEvent {
    pub action: ProjectAction,
    pub project_id: String,
    /// Cover image of the affected project, empty when it has none.
    pub image_url: String,
}

// ============================================================================
// Event Envelope
// ============================================================================

/// Envelope carrying event metadata around a [`ProjectEvent`].
#[derive(Debug, Clone, Serialize)]
pub struct EventEnvelope {
    /// Unique event identifier (UUIDv7 for temporal ordering).
    pub event_id: Uuid,
    /// Namespaced event type (e.g., `"project.updated"`).
    pub event_type: String,
    /// When the event occurred (UTC).
    pub occurred_at: DateTime<Utc>,
    pub payload: ProjectEvent,
}

impl EventEnvelope {
    pub fn new(event: ProjectEvent) -> Self {
        Self {
            event_id: crate::uuid_utils::new_v7(),
            event_type: event.action.event_type().to_string(),
            occurred_at: Utc::now(),
            payload: event,
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Broadcast-based bus distributing project events to every subscriber.
///
/// Uses `tokio::sync::broadcast`. Sending never blocks and never fails from
/// the publisher's point of view; receivers that fall behind get a `Lagged`
/// error and miss events.
pub struct EventBus {
    tx: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    /// Create a new event bus with the given buffer capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish a mutation notification.
    pub fn publish(
        &self,
        action: ProjectAction,
        project_id: impl Into<String>,
        image_url: impl Into<String>,
    ) {
        self.emit(ProjectEvent {
            action,
            project_id: project_id.into(),
            image_url: image_url.into(),
        });
    }

    /// Emit an event to all subscribers.
    ///
    /// If there are no active subscribers, the event is silently dropped.
    pub fn emit(&self, event: ProjectEvent) {
        let envelope = EventEnvelope::new(event);
        let subscriber_count = self.tx.receiver_count();
        tracing::debug!(
            event_type = %envelope.event_type,
            event_id = %envelope.event_id,
            project_id = %envelope.payload.project_id,
            subscriber_count,
            "EventBus emit"
        );
        let _ = self.tx.send(envelope);
    }

    /// Subscribe to receive events. Each subscriber gets its own stream.
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.tx.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(crate::defaults::EVENT_BUS_CAPACITY)
    }
}
