//! PiiSession: the per-editor context object.
//!
//! Owns everything one editing session needs (mapping, detector, monitor,
//! caches, conversation state, events) and decides when the external
//! classifier should run. The session never calls the classifier itself:
//! it hands out `DetectionRequest`s and takes results back through
//! `complete_detection`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::events::{EventBus, PiiEvent, SubscriptionId};
use super::store::{ConversationState, ConversationStore, PersistedState, StateStore};
use crate::activity::{ActivityState, Clock, EditDisposition, InstantClock, PauseTimer, TypingActivityMonitor};
use crate::cache::{combine, document_hash, entities_hash, modifiers_hash, text_hash, ResultCache};
use crate::change::{has_significant_content, neutralize_formatting, ChangeDetector};
use crate::config::PiiConfig;
use crate::console;
use crate::decorations::{build_decorations, Decoration};
use crate::entity::{sanitize_modifiers, spans_to_entities, ClassifiedSpan, Entity, EntityMerger, KnownEntity, Modifier};
use crate::error::{DetectionError, PiiError};
use crate::mapping::{remap_entities, DocumentTree, PositionMapper, PositionMapping};
use crate::perf::{PerfSnapshot, PerformanceTracker};
use crate::text::char_len;

/// Cache scope for conversation-less state
const TEMPORARY_SCOPE: &str = "~temporary";

// =============================================================================
// Requests and Outcomes
// =============================================================================

/// One classifier call the host should make
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionRequest {
    pub id: u64,
    /// Formatting-neutralized text to classify
    pub text: String,
    /// Char offset of `text` in the plain-text mirror
    pub offset: usize,
    /// True when `text` is the whole document
    pub full: bool,
    pub known_entities: Vec<KnownEntity>,
    pub modifiers: Vec<Modifier>,
}

/// What an edit led to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChangeDisposition {
    /// Text identical to the last edit
    Unchanged,
    /// Document became blank; entities dropped
    Cleared,
    /// Programmatic burst; folded into one debounced detection
    Suppressed,
    /// Nothing worth sending yet; the pause monitor decides
    Deferred,
    /// Detection scheduled after `delay_ms`
    Debounced { delay_ms: u64 },
    /// Full detection answered from the entity cache
    Cached,
    /// Detection should run now
    Immediate { request: DetectionRequest },
}

impl ChangeDisposition {
    pub fn name(&self) -> &'static str {
        match self {
            ChangeDisposition::Unchanged => "unchanged",
            ChangeDisposition::Cleared => "cleared",
            ChangeDisposition::Suppressed => "suppressed",
            ChangeDisposition::Deferred => "deferred",
            ChangeDisposition::Debounced { .. } => "debounced",
            ChangeDisposition::Cached => "cached",
            ChangeDisposition::Immediate { .. } => "immediate",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionOutcome {
    pub request_id: u64,
    pub ok: bool,
    /// A newer request was dispatched before this one completed
    pub stale: bool,
    /// Entities in the classifier response
    pub detected: usize,
    /// Entities in the conversation after merging
    pub total: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingKind {
    /// Incremental if the diff allows it
    Auto,
    Full,
}

#[derive(Debug, Clone)]
struct InFlight {
    conversation_id: Option<String>,
    /// Raw snippet the classifier's offsets refer to
    text: String,
    offset: usize,
    full: bool,
    document_hash: u64,
    started_at: u64,
}

// =============================================================================
// PiiSession
// =============================================================================

pub struct PiiSession<C: Clock = InstantClock> {
    config: PiiConfig,
    clock: C,
    mapper: PositionMapper,
    detector: ChangeDetector,
    monitor: TypingActivityMonitor,
    merger: EntityMerger,
    cache: ResultCache,
    perf: PerformanceTracker,
    store: ConversationStore,
    events: EventBus,
    conversation_id: Option<String>,
    mapping: PositionMapping,
    mapping_hash: Option<u64>,
    /// Full plain text at the last dispatch
    baseline: Option<String>,
    debounce: PauseTimer,
    pending: Option<PendingKind>,
    next_request_id: u64,
    latest_request: Option<u64>,
    in_flight: HashMap<u64, InFlight>,
}

impl PiiSession<InstantClock> {
    pub fn new(config: PiiConfig, conversation_id: Option<String>) -> Result<Self, PiiError> {
        Self::with_clock(config, conversation_id, InstantClock::new())
    }
}

impl<C: Clock> PiiSession<C> {
    pub fn with_clock(config: PiiConfig, conversation_id: Option<String>, clock: C) -> Result<Self, PiiError> {
        config.validate()?;

        let mut store = ConversationStore::new();
        if conversation_id.is_none() {
            store.activate_temporary();
        }

        Ok(Self {
            mapper: PositionMapper::new(),
            detector: ChangeDetector::new(config.detection.clone()),
            monitor: TypingActivityMonitor::new(config.activity.clone(), config.detection.min_word_len),
            merger: EntityMerger::new(config.labels.clone()),
            cache: ResultCache::new(&config.cache),
            perf: PerformanceTracker::new(),
            store,
            events: EventBus::new(),
            conversation_id,
            mapping: PositionMapping::default(),
            mapping_hash: None,
            baseline: None,
            debounce: PauseTimer::new(),
            pending: None,
            next_request_id: 0,
            latest_request: None,
            in_flight: HashMap::new(),
            config,
            clock,
        })
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn config(&self) -> &PiiConfig {
        &self.config
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    pub fn mapping(&self) -> &PositionMapping {
        &self.mapping
    }

    pub fn plain_text(&self) -> &str {
        self.mapping.plain_text()
    }

    pub fn entities(&self) -> &[Entity] {
        self.store
            .get(self.conversation_id.as_deref())
            .map(|s| s.entities.as_slice())
            .unwrap_or(&[])
    }

    pub fn modifiers(&self) -> &[Modifier] {
        self.store
            .get(self.conversation_id.as_deref())
            .map(|s| s.modifiers.as_slice())
            .unwrap_or(&[])
    }

    pub fn activity_state(&self) -> ActivityState {
        self.monitor.state(self.clock.now_ms())
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    pub fn perf(&self) -> PerfSnapshot {
        self.perf.snapshot()
    }

    pub fn reset_perf(&mut self) {
        self.perf.reset();
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&PiiEvent) + 'static) -> SubscriptionId {
        self.events.subscribe(listener)
    }

    pub fn subscribe_to(&mut self, prefix: &str, listener: impl FnMut(&PiiEvent) + 'static) -> SubscriptionId {
        self.events.subscribe_to(prefix, listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    fn scope(&self) -> String {
        self.conversation_id.clone().unwrap_or_else(|| TEMPORARY_SCOPE.to_string())
    }

    fn emit(&mut self, event: PiiEvent) {
        self.events.publish(&event);
    }

    fn emit_entities_updated(&mut self, conversation_id: Option<String>) {
        let count = self
            .store
            .get(conversation_id.as_deref())
            .map_or(0, |s| s.entities.len());
        self.perf.record_state_update();
        self.emit(PiiEvent::EntitiesUpdated { conversation_id, count });
    }

    // -------------------------------------------------------------------------
    // Editor Events
    // -------------------------------------------------------------------------

    /// A real key press in the editor
    pub fn on_keystroke(&mut self) {
        let now = self.clock.now_ms();
        self.monitor.on_keystroke(now);
    }

    /// The document changed. Refreshes the mirror, remaps entities and
    /// decides whether and when to classify.
    pub fn on_document_changed<T: DocumentTree + ?Sized>(&mut self, tree: &T) -> ChangeDisposition {
        let now = self.clock.now_ms();
        self.refresh_mapping(tree, now);
        let text = self.mapping.plain_text().to_string();

        if !self.detector.has_changed(&text) {
            return ChangeDisposition::Unchanged;
        }
        self.remap_current();

        if text.trim().is_empty() {
            self.cancel_scheduled();
            let conversation_id = self.conversation_id.clone();
            let state = self.store.get_mut(conversation_id.as_deref());
            if !state.entities.is_empty() {
                state.entities.clear();
                self.emit_entities_updated(conversation_id);
            }
            return ChangeDisposition::Cleared;
        }

        if self.monitor.on_document_change(now, &text) == EditDisposition::Burst {
            self.perf.record_suppressed_burst();
            self.schedule(now, self.config.detection.base_debounce_ms, PendingKind::Auto);
            return ChangeDisposition::Suppressed;
        }

        // Word check first: the diff and snippet only run once something new was typed
        let baseline = self.baseline.clone().unwrap_or_default();
        let new_words = self.detector.find_new_words(&baseline, &text);
        if !has_significant_content(&new_words) {
            return ChangeDisposition::Deferred;
        }

        self.perf.record_diff();
        match self.detector.diff(&baseline, &text) {
            Some(change) => {
                let delay_ms = self.detector.debounce_delay(&new_words, Some(&change));
                self.schedule(now, delay_ms, PendingKind::Auto);
                ChangeDisposition::Debounced { delay_ms }
            }
            // Too large to send incrementally and nothing sent yet
            None if self.baseline.is_none() => match self.dispatch(PendingKind::Full, true) {
                Some(request) => ChangeDisposition::Immediate { request },
                None => ChangeDisposition::Cached,
            },
            None => {
                let delay_ms = self.config.detection.base_debounce_ms;
                self.schedule(now, delay_ms, PendingKind::Full);
                ChangeDisposition::Debounced { delay_ms }
            }
        }
    }

    fn refresh_mapping<T: DocumentTree + ?Sized>(&mut self, tree: &T, now: u64) {
        let hash = document_hash(tree);
        if self.mapping_hash == Some(hash) {
            return;
        }

        let scope = self.scope();
        match self.cache.get_mapping(&scope, hash) {
            Some(mapping) => {
                self.mapping = mapping.clone();
                self.perf.record_cache(true);
            }
            None => {
                let mapping = self.mapper.build_mapping(tree);
                self.cache.put_mapping(&scope, hash, mapping.clone(), now);
                self.perf.record_cache(false);
                self.mapping = mapping;
            }
        }
        self.mapping_hash = Some(hash);
    }

    fn remap_current(&mut self) {
        let state = self.store.get_mut(self.conversation_id.as_deref());
        if state.entities.is_empty() {
            return;
        }
        remap_entities(&mut state.entities, &self.mapping);
        self.perf.record_remap();
    }

    fn schedule(&mut self, now: u64, delay_ms: u64, kind: PendingKind) {
        self.debounce.arm(now, delay_ms);
        self.pending = match (self.pending, kind) {
            (Some(PendingKind::Full), _) | (_, PendingKind::Full) => Some(PendingKind::Full),
            _ => Some(PendingKind::Auto),
        };
    }

    fn cancel_scheduled(&mut self) {
        self.debounce.cancel();
        self.pending = None;
        self.monitor.cleanup();
    }

    // -------------------------------------------------------------------------
    // Timers
    // -------------------------------------------------------------------------

    /// Drive timers. Returns a request when a pause or debounce fired.
    pub fn tick(&mut self) -> Option<DetectionRequest> {
        let now = self.clock.now_ms();

        if let Some(signal) = self.monitor.poll(now) {
            self.perf.record_pause_signal();
            console::log(format!(
                "[PiiSession] Pause detected ({} -> {} chars)",
                char_len(&signal.previous),
                char_len(&signal.current)
            ));
            self.debounce.cancel();
            let kind = self.pending.take().unwrap_or(PendingKind::Auto);
            return self.dispatch(kind, true);
        }

        if self.debounce.fire_if_due(now).is_some() {
            let kind = self.pending.take().unwrap_or(PendingKind::Auto);
            return self.dispatch(kind, true);
        }

        None
    }

    /// Earliest pending deadline in clock ms
    pub fn next_deadline(&self) -> Option<u64> {
        [self.monitor.next_deadline(), self.debounce.deadline()]
            .into_iter()
            .flatten()
            .min()
    }

    // -------------------------------------------------------------------------
    // Detection
    // -------------------------------------------------------------------------

    /// Full detection of the current text, bypassing timers and the cache
    pub fn trigger_detection(&mut self) -> Option<DetectionRequest> {
        self.debounce.cancel();
        self.pending = None;
        self.dispatch(PendingKind::Full, false)
    }

    fn dispatch(&mut self, kind: PendingKind, use_cache: bool) -> Option<DetectionRequest> {
        let text = self.mapping.plain_text().to_string();
        if text.trim().is_empty() {
            return None;
        }
        let now = self.clock.now_ms();

        let change = match kind {
            PendingKind::Auto => {
                if self.baseline.as_deref() == Some(text.as_str()) {
                    return None;
                }
                self.perf.record_diff();
                self.detector.diff(self.baseline.as_deref().unwrap_or(""), &text)
            }
            PendingKind::Full => None,
        };
        let has_baseline = self.baseline.as_deref().map_or(false, |b| !b.trim().is_empty());

        let (raw, offset, full) = match change {
            Some(change) if has_baseline => {
                self.perf.record_snippet();
                let snippet = self.detector.context_snippet(&text, change.offset, change.len());
                (snippet.content, snippet.offset, false)
            }
            _ => (text.clone(), 0, true),
        };
        if raw.trim().is_empty() {
            return None;
        }

        let document_hash = text_hash(&text);
        if full && use_cache {
            let scope = self.scope();
            if let Some(cached) = self.cache.get_entities(&scope, document_hash).cloned() {
                self.perf.record_cache(true);
                self.baseline = Some(text.clone());
                self.monitor.on_api_call_made(&text);
                let conversation_id = self.conversation_id.clone();
                self.apply_detected(conversation_id.as_deref(), &cached);
                self.emit_entities_updated(conversation_id);
                return None;
            }
            self.perf.record_cache(false);
        }

        self.next_request_id += 1;
        let id = self.next_request_id;
        self.baseline = Some(text.clone());
        self.monitor.on_api_call_made(&text);
        self.latest_request = Some(id);
        self.perf.record_detector_call();

        let length = char_len(&raw);
        let request = DetectionRequest {
            id,
            text: neutralize_formatting(&raw).into_owned(),
            offset,
            full,
            known_entities: self.known_entities_for_api(),
            modifiers: self.modifiers().to_vec(),
        };
        self.in_flight.insert(
            id,
            InFlight {
                conversation_id: self.conversation_id.clone(),
                text: raw,
                offset,
                full,
                document_hash,
                started_at: now,
            },
        );

        console::log(format!(
            "[PiiSession] Detection #{} ({} chars at {}, {})",
            id,
            length,
            offset,
            if full { "full" } else { "incremental" }
        ));
        self.emit(PiiEvent::DetectionStarted { request_id: id, offset, length, full });
        Some(request)
    }

    /// Feed a classifier response back in.
    ///
    /// Failures keep the current entities and are not retried. Stale
    /// responses still merge; they never move the baseline.
    pub fn complete_detection(
        &mut self,
        request_id: u64,
        result: Result<Vec<ClassifiedSpan>, DetectionError>,
    ) -> Result<DetectionOutcome, PiiError> {
        let flight = match self.in_flight.remove(&request_id) {
            Some(flight) => flight,
            None => {
                console::warn(format!("[PiiSession] Response for unknown request #{}", request_id));
                return Err(PiiError::UnknownRequest(request_id));
            }
        };

        let now = self.clock.now_ms();
        let elapsed = now.saturating_sub(flight.started_at);
        let stale = self.latest_request.map_or(false, |latest| request_id < latest);

        let spans = match result {
            Ok(spans) => spans,
            Err(e) => {
                console::error(format!("[PiiSession] Detection #{} failed: {}", request_id, e));
                self.perf.record_detection_result(false, stale, elapsed);
                let total = self
                    .store
                    .get(flight.conversation_id.as_deref())
                    .map_or(0, |s| s.entities.len());
                self.emit(PiiEvent::DetectionCompleted {
                    request_id,
                    ok: false,
                    stale,
                    entity_count: 0,
                });
                return Ok(DetectionOutcome { request_id, ok: false, stale, detected: 0, total });
            }
        };

        let incoming = spans_to_entities(&spans, &flight.text, flight.offset);
        let merged = self.apply_detected(flight.conversation_id.as_deref(), &incoming);
        if flight.full {
            let scope = flight
                .conversation_id
                .clone()
                .unwrap_or_else(|| TEMPORARY_SCOPE.to_string());
            self.cache.put_entities(&scope, flight.document_hash, merged.clone(), now);
        }

        self.perf.record_detection_result(true, stale, elapsed);
        self.emit_entities_updated(flight.conversation_id.clone());
        self.emit(PiiEvent::DetectionCompleted {
            request_id,
            ok: true,
            stale,
            entity_count: incoming.len(),
        });

        Ok(DetectionOutcome {
            request_id,
            ok: true,
            stale,
            detected: incoming.len(),
            total: merged.len(),
        })
    }

    /// Forget an in-flight request; a late response becomes an unknown id
    pub fn cancel_detection(&mut self, request_id: u64) -> bool {
        self.in_flight.remove(&request_id).is_some()
    }

    /// Merge into a conversation's entities; remaps against the mirror when
    /// that conversation is the one on screen
    fn apply_detected(&mut self, conversation_id: Option<&str>, incoming: &[Entity]) -> Vec<Entity> {
        let on_screen = conversation_id == self.conversation_id.as_deref();
        let state = self.store.get_mut(conversation_id);
        let mut merged = self.merger.merge(&state.entities, incoming);
        if on_screen {
            remap_entities(&mut merged, &self.mapping);
        }
        state.entities = merged.clone();
        merged
    }

    // -------------------------------------------------------------------------
    // State Management
    // -------------------------------------------------------------------------

    /// Replace the current conversation's entities
    pub fn update_entities(&mut self, entities: Vec<Entity>) {
        let conversation_id = self.conversation_id.clone();
        let state = self.store.get_mut(conversation_id.as_deref());
        state.entities = entities;
        remap_entities(&mut state.entities, &self.mapping);
        self.emit_entities_updated(conversation_id);
    }

    /// Replace the current conversation's modifiers; blank records are dropped
    pub fn update_modifiers(&mut self, modifiers: Vec<Modifier>) {
        let conversation_id = self.conversation_id.clone();
        let state = self.store.get_mut(conversation_id.as_deref());
        state.modifiers = sanitize_modifiers(modifiers);
        let count = state.modifiers.len();
        self.perf.record_state_update();
        self.emit(PiiEvent::ModifiersUpdated { conversation_id, count });
    }

    /// Set one entity's mask flag. Returns false if no entity has that label.
    pub fn toggle_entity_masking(&mut self, label: &str, should_mask: bool) -> bool {
        let key = self.merger.normalize_label(label);
        let conversation_id = self.conversation_id.clone();
        let state = self.store.get_mut(conversation_id.as_deref());

        let entity = match state
            .entities
            .iter_mut()
            .find(|e| self.merger.normalize_label(&e.label) == key)
        {
            Some(entity) => entity,
            None => return false,
        };
        entity.should_mask = should_mask;
        let label = entity.label.clone();

        self.perf.record_state_update();
        self.emit(PiiEvent::EntityToggled { conversation_id, label, should_mask });
        true
    }

    /// Set every entity's mask flag. Returns how many changed.
    pub fn set_all_masking(&mut self, should_mask: bool) -> usize {
        let conversation_id = self.conversation_id.clone();
        let state = self.store.get_mut(conversation_id.as_deref());
        let mut changed = 0;
        for entity in state.entities.iter_mut().filter(|e| e.should_mask != should_mask) {
            entity.should_mask = should_mask;
            changed += 1;
        }
        if changed > 0 {
            self.emit_entities_updated(conversation_id);
        }
        changed
    }

    /// Copy of a conversation's state (`None` is the temporary slot)
    pub fn get_current_state(&self, conversation_id: Option<&str>) -> ConversationState {
        self.store.get(conversation_id).cloned().unwrap_or_default()
    }

    /// Entities in the shape the classifier accepts as hints
    pub fn known_entities_for_api(&self) -> Vec<KnownEntity> {
        self.entities()
            .iter()
            .map(|e| KnownEntity {
                label: e.label.clone(),
                name: e.text.to_lowercase(),
                should_mask: e.should_mask,
            })
            .collect()
    }

    // -------------------------------------------------------------------------
    // Conversations
    // -------------------------------------------------------------------------

    /// Switch the conversation on screen. Timers and the baseline are
    /// dropped; in-flight requests still land in their own conversation.
    pub fn switch_conversation(&mut self, conversation_id: Option<String>) {
        if conversation_id == self.conversation_id {
            return;
        }
        let from = std::mem::replace(&mut self.conversation_id, conversation_id.clone());

        self.debounce.cancel();
        self.pending = None;
        self.monitor.reset();
        self.detector.reset();
        self.baseline = None;
        if conversation_id.is_none() {
            self.store.activate_temporary();
        }
        self.remap_current();

        console::log(format!(
            "[PiiSession] Conversation {} -> {}",
            from.as_deref().unwrap_or("(new)"),
            conversation_id.as_deref().unwrap_or("(new)")
        ));
        self.emit(PiiEvent::ConversationSwitched { from, to: conversation_id });
    }

    /// Move temporary new-chat state into `conversation_id`. If the
    /// temporary slot is on screen, the session follows it.
    pub fn transfer_temporary_to(&mut self, conversation_id: &str) -> bool {
        let temporary = match self.store.take_temporary() {
            Some(state) => state,
            None => return false,
        };

        let target = self.store.get_mut(Some(conversation_id));
        target.entities = self.merger.absorb(&target.entities, &temporary.entities);
        for modifier in temporary.modifiers {
            if !target.modifiers.iter().any(|m| m.id == modifier.id) {
                target.modifiers.push(modifier);
            }
        }

        for flight in self.in_flight.values_mut() {
            if flight.conversation_id.is_none() {
                flight.conversation_id = Some(conversation_id.to_string());
            }
        }
        self.cache.clear_conversation(TEMPORARY_SCOPE);

        if self.conversation_id.is_none() {
            self.conversation_id = Some(conversation_id.to_string());
            self.emit(PiiEvent::ConversationSwitched {
                from: None,
                to: Some(conversation_id.to_string()),
            });
        }
        self.emit_entities_updated(Some(conversation_id.to_string()));
        true
    }

    // -------------------------------------------------------------------------
    // Decorations
    // -------------------------------------------------------------------------

    /// Highlight data for the current mirror, cached by content
    pub fn decorations(&mut self) -> Vec<Decoration> {
        let key = combine(&[
            text_hash(self.mapping.plain_text()),
            self.mapping_hash.unwrap_or(0),
            entities_hash(self.entities()),
            modifiers_hash(self.modifiers()),
        ]);
        let scope = self.scope();

        if let Some(cached) = self.cache.get_decorations(&scope, key) {
            self.perf.record_cache(true);
            return cached.clone();
        }
        self.perf.record_cache(false);

        let decorations = build_decorations(self.entities(), self.modifiers(), &self.mapping);
        let now = self.clock.now_ms();
        self.cache.put_decorations(&scope, key, decorations.clone(), now);
        decorations
    }

    // -------------------------------------------------------------------------
    // Persistence
    // -------------------------------------------------------------------------

    /// Snapshot of the current conversation. Temporary state has no id and
    /// cannot be persisted.
    pub fn snapshot(&self) -> Result<PersistedState, PiiError> {
        let conversation_id = self
            .conversation_id
            .as_deref()
            .ok_or_else(|| PiiError::Persistence("temporary state has no conversation id".into()))?;
        let state = self.get_current_state(Some(conversation_id));
        Ok(PersistedState::new(conversation_id, &state))
    }

    pub fn persist(&mut self, backend: &mut dyn StateStore) -> Result<PersistedState, PiiError> {
        let snapshot = self.snapshot()?;
        backend.save(&snapshot)?;
        self.emit(PiiEvent::StatePersisted {
            conversation_id: snapshot.conversation_id.clone(),
            saved_at: snapshot.saved_at,
        });
        Ok(snapshot)
    }

    /// Load saved state. Returns false if the backend has nothing.
    pub fn restore(&mut self, backend: &dyn StateStore, conversation_id: &str) -> Result<bool, PiiError> {
        match backend.load(conversation_id)? {
            Some(snapshot) => {
                self.load_snapshot(snapshot);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Install a snapshot under its conversation id
    pub fn load_snapshot(&mut self, snapshot: PersistedState) {
        let conversation_id = snapshot.conversation_id.clone();
        let mut state = snapshot.into_state();
        if self.conversation_id.as_deref() == Some(conversation_id.as_str()) {
            remap_entities(&mut state.entities, &self.mapping);
        }
        let count = state.modifiers.len();
        self.store.insert(&conversation_id, state);

        self.emit_entities_updated(Some(conversation_id.clone()));
        self.emit(PiiEvent::ModifiersUpdated {
            conversation_id: Some(conversation_id),
            count,
        });
    }

    /// Editor teardown: drop timers and outstanding requests
    pub fn cleanup(&mut self) {
        self.cancel_scheduled();
        self.in_flight.clear();
    }
}
