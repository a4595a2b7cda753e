// ============================================================================
// Event Handler Interface
// Defines the contract for handling request lifecycle events
// ============================================================================

use crate::domain::{MatchStatus, Price, ProtectiveTrigger, Quantity, RequestId};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Events emitted by the matching engine
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OrderEvent {
    /// Request received by the matching engine
    RequestReceived {
        request_id: RequestId,
        timestamp: DateTime<Utc>,
    },

    /// Request rejected before matching
    RequestRejected {
        request_id: RequestId,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// Stop-loss or take-profit fired against the reference price
    ThresholdExecuted {
        request_id: RequestId,
        trigger: ProtectiveTrigger,
        price: Price,
        quantity: Quantity,
        timestamp: DateTime<Utc>,
    },

    /// Matched against a resting request
    BookFill {
        request_id: RequestId,
        counterparty: RequestId,
        price: Price,
        quantity: Quantity,
        timestamp: DateTime<Utc>,
    },

    /// Filled by the liquidity source
    FallbackFill {
        request_id: RequestId,
        price: Price,
        quantity: Quantity,
        timestamp: DateTime<Utc>,
    },

    /// Fallback attempted (or skipped) without contributing a fill
    FallbackFailed {
        request_id: RequestId,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// Remainder added to the book
    RequestRested {
        request_id: RequestId,
        price: Price,
        quantity: Quantity,
        timestamp: DateTime<Utc>,
    },

    /// Resting request dropped after its expiry
    RequestExpired {
        request_id: RequestId,
        timestamp: DateTime<Utc>,
    },

    /// Resting request cancelled by its submitter
    RequestCancelled {
        request_id: RequestId,
        timestamp: DateTime<Utc>,
    },

    /// Processing finished
    RequestCompleted {
        request_id: RequestId,
        status: MatchStatus,
        filled_quantity: Quantity,
        remaining_quantity: Quantity,
        timestamp: DateTime<Utc>,
    },
}

impl OrderEvent {
    pub fn request_id(&self) -> &RequestId {
        match self {
            OrderEvent::RequestReceived { request_id, .. }
            | OrderEvent::RequestRejected { request_id, .. }
            | OrderEvent::ThresholdExecuted { request_id, .. }
            | OrderEvent::BookFill { request_id, .. }
            | OrderEvent::FallbackFill { request_id, .. }
            | OrderEvent::FallbackFailed { request_id, .. }
            | OrderEvent::RequestRested { request_id, .. }
            | OrderEvent::RequestExpired { request_id, .. }
            | OrderEvent::RequestCancelled { request_id, .. }
            | OrderEvent::RequestCompleted { request_id, .. } => request_id,
        }
    }
}

/// Event handler trait for processing matching engine events
/// Implementations can handle logging, metrics, notifications, etc.
pub trait EventHandler: Send + Sync {
    /// Handle an order event
    fn on_event(&self, event: OrderEvent);

    /// Batch event handler (optional optimization)
    fn on_events(&self, events: Vec<OrderEvent>) {
        for event in events {
            self.on_event(event);
        }
    }
}

/// No-op event handler for testing
pub struct NoOpEventHandler;

impl EventHandler for NoOpEventHandler {
    fn on_event(&self, _event: OrderEvent) {}
}

/// Logging event handler
pub struct LoggingEventHandler;

impl EventHandler for LoggingEventHandler {
    fn on_event(&self, event: OrderEvent) {
        tracing::debug!(request_id = %event.request_id(), "Matching engine event: {:?}", event);
    }
}

/// Keeps every event in memory
#[derive(Default)]
pub struct RecordingEventHandler {
    events: Mutex<Vec<OrderEvent>>,
}

impl RecordingEventHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<OrderEvent> {
        self.events.lock().clone()
    }

    pub fn events_for(&self, request_id: &RequestId) -> Vec<OrderEvent> {
        self.events
            .lock()
            .iter()
            .filter(|event| event.request_id() == request_id)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventHandler for RecordingEventHandler {
    fn on_event(&self, event: OrderEvent) {
        self.events.lock().push(event);
    }

    fn on_events(&self, events: Vec<OrderEvent>) {
        self.events.lock().extend(events);
    }
}
