//! Change notification system for broadcasting configuration updates to
//! SSE subscribers and MCP sessions.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::store::{ComponentType, Scope};

/// Messages broadcast when configuration changes or agents run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data")]
pub enum UpdateMessage {
    ComponentCreated {
        kind: ComponentType,
        name: String,
        scope: Scope,
    },
    ComponentUpdated {
        kind: ComponentType,
        name: String,
        scope: Scope,
    },
    ComponentDeleted {
        kind: ComponentType,
        name: String,
        scope: Scope,
    },
    AgentRan {
        agent: String,
        steps: u32,
    },
}

/// Pub/sub notifier for broadcasting configuration changes to all subscribers.
#[derive(Clone)]
pub struct ChangeNotifier {
    tx: broadcast::Sender<UpdateMessage>,
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeNotifier {
    /// Create a new ChangeNotifier with a buffer of 100 messages.
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(100);
        Self { tx }
    }

    /// Subscribe to receive update notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<UpdateMessage> {
        self.tx.subscribe()
    }

    /// Broadcast an update message to all subscribers.
    pub fn notify(&self, msg: UpdateMessage) {
        let _ = self.tx.send(msg);
    }
}
