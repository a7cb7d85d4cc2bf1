//! Typed session events and a synchronous publish/subscribe bus.
//!
//! Every event has a dotted subject (`pii.entities.updated`). Subscribers
//! either take everything or filter by subject prefix.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PiiEvent {
    EntitiesUpdated {
        conversation_id: Option<String>,
        count: usize,
    },
    ModifiersUpdated {
        conversation_id: Option<String>,
        count: usize,
    },
    EntityToggled {
        conversation_id: Option<String>,
        label: String,
        should_mask: bool,
    },
    DetectionStarted {
        request_id: u64,
        offset: usize,
        length: usize,
        full: bool,
    },
    DetectionCompleted {
        request_id: u64,
        ok: bool,
        stale: bool,
        entity_count: usize,
    },
    ConversationSwitched {
        from: Option<String>,
        to: Option<String>,
    },
    StatePersisted {
        conversation_id: String,
        saved_at: DateTime<Utc>,
    },
}

impl PiiEvent {
    pub fn subject(&self) -> &'static str {
        match self {
            PiiEvent::EntitiesUpdated { .. } => "pii.entities.updated",
            PiiEvent::ModifiersUpdated { .. } => "pii.modifiers.updated",
            PiiEvent::EntityToggled { .. } => "pii.entities.toggled",
            PiiEvent::DetectionStarted { .. } => "pii.detection.started",
            PiiEvent::DetectionCompleted { .. } => "pii.detection.completed",
            PiiEvent::ConversationSwitched { .. } => "pii.conversation.switched",
            PiiEvent::StatePersisted { .. } => "pii.state.persisted",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&PiiEvent)>;

struct Subscriber {
    id: SubscriptionId,
    /// Subject prefix; empty matches everything
    prefix: String,
    listener: Listener,
}

#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<Subscriber>,
    next_id: u64,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Receive every event
    pub fn subscribe(&mut self, listener: impl FnMut(&PiiEvent) + 'static) -> SubscriptionId {
        self.subscribe_to("", listener)
    }

    /// Receive events whose subject starts with `prefix`
    pub fn subscribe_to(&mut self, prefix: &str, listener: impl FnMut(&PiiEvent) + 'static) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscribers.push(Subscriber {
            id,
            prefix: prefix.to_string(),
            listener: Box::new(listener),
        });
        id
    }

    /// True if the subscription existed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    /// Deliver to matching subscribers. Returns how many received it.
    pub fn publish(&mut self, event: &PiiEvent) -> usize {
        let subject = event.subject();
        let mut delivered = 0;
        for sub in self.subscribers.iter_mut() {
            if subject.starts_with(&sub.prefix) {
                (sub.listener)(event);
                delivered += 1;
            }
        }
        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
