//! Session: the per-editor context object, conversation state and events

pub mod engine;
pub mod events;
pub mod store;


pub use engine::{ChangeDisposition, DetectionOutcome, DetectionRequest, PiiSession};
pub use events::{EventBus, PiiEvent, SubscriptionId};
pub use store::{ConversationState, ConversationStore, MemoryStore, PersistedState, StateStore};
