//! Per-conversation entity and modifier state.
//!
//! A new chat has no conversation id yet; its state lives in a temporary
//! slot until the host assigns one and the state is transferred.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::entity::{sanitize_modifiers, Entity, Modifier};
use crate::error::PiiError;

// =============================================================================
// ConversationState
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    pub entities: Vec<Entity>,
    pub modifiers: Vec<Modifier>,
}

/// In-memory state for every conversation the session has seen
#[derive(Debug, Clone, Default)]
pub struct ConversationStore {
    conversations: HashMap<String, ConversationState>,
    temporary: Option<ConversationState>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn activate_temporary(&mut self) {
        if self.temporary.is_none() {
            self.temporary = Some(ConversationState::default());
        }
    }

    pub fn is_temporary_active(&self) -> bool {
        self.temporary.is_some()
    }

    /// State for `conversation_id`, or the temporary slot for `None`
    pub fn get(&self, conversation_id: Option<&str>) -> Option<&ConversationState> {
        match conversation_id {
            Some(id) => self.conversations.get(id),
            None => self.temporary.as_ref(),
        }
    }

    /// Mutable state, created on first use
    pub fn get_mut(&mut self, conversation_id: Option<&str>) -> &mut ConversationState {
        match conversation_id {
            Some(id) => self.conversations.entry(id.to_string()).or_default(),
            None => self.temporary.get_or_insert_with(ConversationState::default),
        }
    }

    /// Take the temporary state out, deactivating it
    pub fn take_temporary(&mut self) -> Option<ConversationState> {
        self.temporary.take()
    }

    pub fn insert(&mut self, conversation_id: &str, state: ConversationState) {
        self.conversations.insert(conversation_id.to_string(), state);
    }

    pub fn remove(&mut self, conversation_id: Option<&str>) -> Option<ConversationState> {
        match conversation_id {
            Some(id) => self.conversations.remove(id),
            None => self.temporary.take(),
        }
    }

    pub fn conversation_ids(&self) -> impl Iterator<Item = &str> {
        self.conversations.keys().map(String::as_str)
    }
}

// =============================================================================
// Persistence
// =============================================================================

/// Snapshot written through a `StateStore`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    pub conversation_id: String,
    pub entities: Vec<Entity>,
    pub modifiers: Vec<Modifier>,
    pub saved_at: DateTime<Utc>,
}

impl PersistedState {
    pub fn new(conversation_id: &str, state: &ConversationState) -> Self {
        Self {
            conversation_id: conversation_id.to_string(),
            entities: state.entities.clone(),
            modifiers: state.modifiers.clone(),
            saved_at: Utc::now(),
        }
    }

    pub fn to_json(&self) -> Result<String, PiiError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a snapshot. Missing or malformed modifier records are dropped;
    /// everything else must be well-formed.
    pub fn from_json(json: &str) -> Result<Self, PiiError> {
        let mut value: Value = serde_json::from_str(json)?;
        let raw_modifiers = value
            .as_object_mut()
            .and_then(|obj| obj.remove("modifiers"))
            .unwrap_or(Value::Null);

        let modifiers: Vec<Modifier> = match raw_modifiers {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
            _ => Vec::new(),
        };

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Core {
            conversation_id: String,
            #[serde(default)]
            entities: Vec<Entity>,
            saved_at: DateTime<Utc>,
        }
        let core: Core = serde_json::from_value(value)?;

        Ok(Self {
            conversation_id: core.conversation_id,
            entities: core.entities,
            modifiers: sanitize_modifiers(modifiers),
            saved_at: core.saved_at,
        })
    }

    pub fn into_state(self) -> ConversationState {
        ConversationState {
            entities: self.entities,
            modifiers: self.modifiers,
        }
    }
}

/// Host persistence backend
pub trait StateStore {
    fn load(&self, conversation_id: &str) -> Result<Option<PersistedState>, PiiError>;
    fn save(&mut self, state: &PersistedState) -> Result<(), PiiError>;
}

/// JSON-in-memory backend
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw JSON for a conversation
    pub fn raw(&self, conversation_id: &str) -> Option<&str> {
        self.records.get(conversation_id).map(String::as_str)
    }

    pub fn insert_raw(&mut self, conversation_id: &str, json: &str) {
        self.records.insert(conversation_id.to_string(), json.to_string());
    }
}

impl StateStore for MemoryStore {
    fn load(&self, conversation_id: &str) -> Result<Option<PersistedState>, PiiError> {
        self.records
            .get(conversation_id)
            .map(|json| PersistedState::from_json(json))
            .transpose()
    }

    fn save(&mut self, state: &PersistedState) -> Result<(), PiiError> {
        let json = state.to_json()?;
        self.records.insert(state.conversation_id.clone(), json);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityType, ModifierAction};

    #[test]
    fn test_temporary_slot() {
        let mut store = ConversationStore::new();
        assert!(!store.is_temporary_active());
        store.get_mut(None).entities.push(Entity::new("PERSON_1", EntityType::Person, "John"));
        assert!(store.is_temporary_active());

        let taken = store.take_temporary().unwrap();
        assert_eq!(taken.entities.len(), 1);
        assert!(!store.is_temporary_active());
        assert!(store.get(None).is_none());
    }

    #[test]
    fn test_memory_store_round_trip() {
        let mut backend = MemoryStore::new();
        let state = ConversationState {
            entities: vec![Entity::new("EMAIL_1", EntityType::Email, "a@b.io").with_mask(false)],
            modifiers: vec![Modifier::new("m1", "Acme", ModifierAction::Ignore)],
        };
        backend.save(&PersistedState::new("c1", &state)).unwrap();

        let loaded = backend.load("c1").unwrap().unwrap();
        assert_eq!(loaded.into_state(), state);
        assert!(backend.load("missing").unwrap().is_none());
    }

    #[test]
    fn test_malformed_modifiers_dropped() {
        let json = r#"{
            "conversationId": "c1",
            "entities": [],
            "modifiers": [
                {"id": "m1", "entity": "John", "action": "mask"},
                {"id": "m2", "action": "explode"},
                42,
                {"id": "m3", "entity": "  ", "action": "ignore"}
            ],
            "savedAt": "2026-01-05T10:00:00Z"
        }"#;
        let state = PersistedState::from_json(json).unwrap();
        assert_eq!(state.modifiers.len(), 1);
        assert_eq!(state.modifiers[0].id, "m1");
    }

    #[test]
    fn test_missing_modifiers_is_empty() {
        let json = r#"{"conversationId":"c1","savedAt":"2026-01-05T10:00:00Z"}"#;
        let state = PersistedState::from_json(json).unwrap();
        assert!(state.modifiers.is_empty());
        assert!(state.entities.is_empty());
    }

    #[test]
    fn test_malformed_core_is_error() {
        let err = PersistedState::from_json(r#"{"entities": []}"#).unwrap_err();
        assert!(matches!(err, PiiError::Serialization(_)));
    }
}
