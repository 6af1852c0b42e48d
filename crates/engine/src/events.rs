//! Engine event stream for observers and tests

use relay_core::{CorrelationToken, RequestName};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::Instant;

use crate::error::EngineError;

/// Lifecycle of requests as seen by the engine
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Submitted {
        token: CorrelationToken,
        name: RequestName,
    },
    Dispatched {
        token: CorrelationToken,
        name: RequestName,
        attempt: u32,
        at: Instant,
    },
    /// A reply arrived and released the permit
    Released {
        token: CorrelationToken,
        name: RequestName,
    },
    TimedOut {
        token: CorrelationToken,
        name: RequestName,
        attempt: u32,
    },
    /// Request re-queued at the front after a failed attempt
    Retrying {
        token: CorrelationToken,
        name: RequestName,
        attempt: u32,
        delay: Duration,
    },
    Completed {
        token: CorrelationToken,
        name: RequestName,
    },
    Failed {
        token: CorrelationToken,
        name: RequestName,
        error: EngineError,
    },
    ConnectivityFault {
        token: CorrelationToken,
        name: RequestName,
        reason: String,
    },
    /// A reply that matched no request in flight
    Unsolicited { name: RequestName },
}

impl EngineEvent {
    pub fn name(&self) -> &RequestName {
        match self {
            EngineEvent::Submitted { name, .. }
            | EngineEvent::Dispatched { name, .. }
            | EngineEvent::Released { name, .. }
            | EngineEvent::TimedOut { name, .. }
            | EngineEvent::Retrying { name, .. }
            | EngineEvent::Completed { name, .. }
            | EngineEvent::Failed { name, .. }
            | EngineEvent::ConnectivityFault { name, .. }
            | EngineEvent::Unsolicited { name } => name,
        }
    }
}

/// Broadcast fan-out of [`EngineEvent`]s
///
/// Publishing never blocks; slow subscribers lag and lose old events.
pub struct EventBus {
    sender: broadcast::Sender<EngineEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn publish(&self, event: EngineEvent) {
        // No subscribers is fine
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.sender.subscribe()
    }
}
