//! JavaScript binding for `PiiSession`.
//!
//! The host wires editor events in and drives timers with `runPending`.
//! Classification goes through a JS callback `classify(request)` that
//! returns (a promise of) `[{ label, type, start, end }]`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use js_sys::{Function, Promise};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, JsFuture};

use crate::config::PiiConfig;
use crate::entity::{ClassifiedSpan, Entity, Modifier};
use crate::error::DetectionError;
use crate::mapping::DocNode;
use crate::session::{ChangeDisposition, DetectionRequest, PersistedState, PiiSession, SubscriptionId};

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn js_err(e: impl ToString) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen]
pub struct PiiEditorSession {
    inner: Rc<RefCell<PiiSession>>,
    /// Immediate requests handed out by `onDocumentChanged`, not yet run
    queued: Rc<RefCell<Vec<DetectionRequest>>>,
    subscriptions: HashMap<u32, SubscriptionId>,
    next_subscription: u32,
}

#[wasm_bindgen]
impl PiiEditorSession {
    /// `config` may be a partial config object, `undefined` or `null`
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue, conversation_id: Option<String>) -> Result<PiiEditorSession, JsValue> {
        let config: PiiConfig = if config.is_undefined() || config.is_null() {
            PiiConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(js_err)?
        };
        let session = PiiSession::new(config, conversation_id).map_err(js_err)?;

        Ok(PiiEditorSession {
            inner: Rc::new(RefCell::new(session)),
            queued: Rc::new(RefCell::new(Vec::new())),
            subscriptions: HashMap::new(),
            next_subscription: 0,
        })
    }

    // ========================================================================
    // Editor Events
    // ========================================================================

    #[wasm_bindgen(js_name = onKeystroke)]
    pub fn on_keystroke(&self) {
        self.inner.borrow_mut().on_keystroke();
    }

    /// Feed the editor's JSON document. Returns the disposition name
    /// (`immediate`, `debounced`, `suppressed`, ...).
    #[wasm_bindgen(js_name = onDocumentChanged)]
    pub fn on_document_changed(&self, doc: JsValue) -> Result<String, JsValue> {
        let tree: DocNode = serde_wasm_bindgen::from_value(doc).map_err(js_err)?;
        let disposition = self.inner.borrow_mut().on_document_changed(&tree);
        let name = disposition.name().to_string();
        if let ChangeDisposition::Immediate { request } = disposition {
            self.queued.borrow_mut().push(request);
        }
        Ok(name)
    }

    // ========================================================================
    // Detection
    // ========================================================================

    /// Run a queued immediate request, or a fresh full detection.
    /// Resolves to the outcome, or `null` when there is nothing to send.
    #[wasm_bindgen(js_name = runDetection)]
    pub fn run_detection(&self, classify: Function) -> Promise {
        let request = self.take_queued();
        let request = request.or_else(|| self.inner.borrow_mut().trigger_detection());
        self.run(request, classify)
    }

    /// Drive timers: runs a queued request or whatever a pause or debounce
    /// fired. Call from the host loop.
    #[wasm_bindgen(js_name = runPending)]
    pub fn run_pending(&self, classify: Function) -> Promise {
        let request = self.take_queued();
        let request = request.or_else(|| self.inner.borrow_mut().tick());
        self.run(request, classify)
    }

    /// Newest queued request. Older ones are superseded and cancelled so
    /// they do not stay in flight.
    fn take_queued(&self) -> Option<DetectionRequest> {
        let mut queued = std::mem::take(&mut *self.queued.borrow_mut());
        let newest = queued.pop();
        self.cancel_all(queued);
        newest
    }

    fn drop_queued(&self) {
        let queued = std::mem::take(&mut *self.queued.borrow_mut());
        self.cancel_all(queued);
    }

    fn cancel_all(&self, requests: Vec<DetectionRequest>) {
        let mut session = self.inner.borrow_mut();
        for request in requests {
            session.cancel_detection(request.id);
        }
    }

    fn run(&self, request: Option<DetectionRequest>, classify: Function) -> Promise {
        let inner = self.inner.clone();
        future_to_promise(async move {
            let request = match request {
                Some(request) => request,
                None => return Ok(JsValue::NULL),
            };

            let response = match classify.call1(&JsValue::NULL, &to_js(&request)?) {
                Ok(value) => JsFuture::from(Promise::resolve(&value)).await,
                Err(e) => Err(e),
            };
            let result = match response {
                Ok(value) => serde_wasm_bindgen::from_value::<Vec<ClassifiedSpan>>(value).map_err(|e| {
                    DetectionError::Rejected {
                        status: 0,
                        message: format!("malformed classifier response: {}", e),
                    }
                }),
                Err(e) => Err(DetectionError::Network(
                    e.as_string().unwrap_or_else(|| "classifier call failed".to_string()),
                )),
            };

            let outcome = inner
                .borrow_mut()
                .complete_detection(request.id, result)
                .map_err(js_err)?;
            to_js(&outcome)
        })
    }

    /// Complete a request the host classified on its own
    #[wasm_bindgen(js_name = completeDetection)]
    pub fn complete_detection(&self, request_id: u32, spans: JsValue) -> Result<JsValue, JsValue> {
        let spans: Vec<ClassifiedSpan> = serde_wasm_bindgen::from_value(spans).map_err(js_err)?;
        let outcome = self
            .inner
            .borrow_mut()
            .complete_detection(request_id as u64, Ok(spans))
            .map_err(js_err)?;
        to_js(&outcome)
    }

    #[wasm_bindgen(js_name = failDetection)]
    pub fn fail_detection(&self, request_id: u32, message: String) -> Result<JsValue, JsValue> {
        let outcome = self
            .inner
            .borrow_mut()
            .complete_detection(request_id as u64, Err(DetectionError::Network(message)))
            .map_err(js_err)?;
        to_js(&outcome)
    }

    #[wasm_bindgen(js_name = cancelDetection)]
    pub fn cancel_detection(&self, request_id: u32) -> bool {
        self.inner.borrow_mut().cancel_detection(request_id as u64)
    }

    /// Earliest timer deadline in ms since session start
    #[wasm_bindgen(js_name = nextDeadline)]
    pub fn next_deadline(&self) -> Option<f64> {
        self.inner.borrow().next_deadline().map(|d| d as f64)
    }

    #[wasm_bindgen(js_name = activityState)]
    pub fn activity_state(&self) -> String {
        self.inner.borrow().activity_state().name().to_string()
    }

    // ========================================================================
    // State
    // ========================================================================

    #[wasm_bindgen]
    pub fn decorations(&self) -> Result<JsValue, JsValue> {
        let decorations = self.inner.borrow_mut().decorations();
        to_js(&decorations)
    }

    #[wasm_bindgen(js_name = updateEntities)]
    pub fn update_entities(&self, entities: JsValue) -> Result<(), JsValue> {
        let entities: Vec<Entity> = serde_wasm_bindgen::from_value(entities).map_err(js_err)?;
        self.inner.borrow_mut().update_entities(entities);
        Ok(())
    }

    #[wasm_bindgen(js_name = updateModifiers)]
    pub fn update_modifiers(&self, modifiers: JsValue) -> Result<(), JsValue> {
        let modifiers: Vec<Modifier> = serde_wasm_bindgen::from_value(modifiers).map_err(js_err)?;
        self.inner.borrow_mut().update_modifiers(modifiers);
        Ok(())
    }

    #[wasm_bindgen(js_name = toggleEntityMasking)]
    pub fn toggle_entity_masking(&self, label: &str, should_mask: bool) -> bool {
        self.inner.borrow_mut().toggle_entity_masking(label, should_mask)
    }

    #[wasm_bindgen(js_name = setAllMasking)]
    pub fn set_all_masking(&self, should_mask: bool) -> usize {
        self.inner.borrow_mut().set_all_masking(should_mask)
    }

    /// `{ entities, modifiers }` for a conversation (omit for the temporary slot)
    #[wasm_bindgen(js_name = getCurrentState)]
    pub fn get_current_state(&self, conversation_id: Option<String>) -> Result<JsValue, JsValue> {
        let state = self.inner.borrow().get_current_state(conversation_id.as_deref());
        to_js(&state)
    }

    #[wasm_bindgen(js_name = knownEntities)]
    pub fn known_entities(&self) -> Result<JsValue, JsValue> {
        let known = self.inner.borrow().known_entities_for_api();
        to_js(&known)
    }

    #[wasm_bindgen(js_name = switchConversation)]
    pub fn switch_conversation(&self, conversation_id: Option<String>) {
        self.drop_queued();
        self.inner.borrow_mut().switch_conversation(conversation_id);
    }

    #[wasm_bindgen(js_name = transferTemporaryTo)]
    pub fn transfer_temporary_to(&self, conversation_id: &str) -> bool {
        self.inner.borrow_mut().transfer_temporary_to(conversation_id)
    }

    /// Persisted-state JSON for the current conversation
    #[wasm_bindgen(js_name = exportState)]
    pub fn export_state(&self) -> Result<String, JsValue> {
        let snapshot = self.inner.borrow().snapshot().map_err(js_err)?;
        snapshot.to_json().map_err(js_err)
    }

    #[wasm_bindgen(js_name = importState)]
    pub fn import_state(&self, json: &str) -> Result<(), JsValue> {
        let snapshot = PersistedState::from_json(json).map_err(js_err)?;
        self.inner.borrow_mut().load_snapshot(snapshot);
        Ok(())
    }

    #[wasm_bindgen(js_name = perfStats)]
    pub fn perf_stats(&self) -> Result<JsValue, JsValue> {
        let snapshot = self.inner.borrow().perf();
        let stats = serde_json::json!({
            "counters": snapshot,
            "cacheHitRate": snapshot.cache_hit_rate(),
        });
        to_js(&stats)
    }

    #[wasm_bindgen(js_name = resetPerfStats)]
    pub fn reset_perf_stats(&self) {
        self.inner.borrow_mut().reset_perf();
    }

    // ========================================================================
    // Events
    // ========================================================================

    /// Call `callback(event)` for every event whose type starts with
    /// `prefix` (omit for all). Callbacks run inside session calls and must
    /// not call back into the session synchronously.
    #[wasm_bindgen]
    pub fn subscribe(&mut self, callback: Function, prefix: Option<String>) -> u32 {
        let listener = move |event: &crate::session::PiiEvent| {
            if let Ok(payload) = serde_wasm_bindgen::to_value(event) {
                let _ = callback.call1(&JsValue::NULL, &payload);
            }
        };
        let id = match prefix {
            Some(prefix) => self.inner.borrow_mut().subscribe_to(&prefix, listener),
            None => self.inner.borrow_mut().subscribe(listener),
        };

        self.next_subscription += 1;
        self.subscriptions.insert(self.next_subscription, id);
        self.next_subscription
    }

    #[wasm_bindgen]
    pub fn unsubscribe(&mut self, handle: u32) -> bool {
        match self.subscriptions.remove(&handle) {
            Some(id) => self.inner.borrow_mut().unsubscribe(id),
            None => false,
        }
    }

    /// Editor teardown
    #[wasm_bindgen]
    pub fn cleanup(&self) {
        self.drop_queued();
        self.inner.borrow_mut().cleanup();
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    fn doc(text: &str) -> JsValue {
        to_js(&DocNode::doc(vec![DocNode::para_text(text)])).unwrap()
    }

    #[wasm_bindgen_test]
    fn test_document_changes_from_js() {
        let session = PiiEditorSession::new(JsValue::UNDEFINED, Some("c1".into())).unwrap();
        session.on_keystroke();
        assert_eq!(session.on_document_changed(doc("Call John Smith")).unwrap(), "debounced");
        assert_eq!(session.on_document_changed(doc("Call John Smith")).unwrap(), "unchanged");
        assert_eq!(session.activity_state(), "pause_scheduled");
    }

    #[wasm_bindgen_test]
    fn test_masking_round_trip_from_js() {
        let session = PiiEditorSession::new(JsValue::NULL, Some("c1".into())).unwrap();
        let entities = vec![Entity::new("PERSON_1", crate::entity::EntityType::Person, "John")];
        session.update_entities(to_js(&entities).unwrap()).unwrap();
        assert!(session.toggle_entity_masking("PERSON_1", false));

        let json = session.export_state().unwrap();
        let restored = PiiEditorSession::new(JsValue::NULL, Some("c1".into())).unwrap();
        restored.import_state(&json).unwrap();
        assert!(!restored.toggle_entity_masking("PERSON_9", true));
        assert_eq!(restored.set_all_masking(true), 1);
    }

    #[wasm_bindgen_test]
    fn test_superseded_requests_leave_flight() {
        let big = "word ".repeat(1200);
        let session = PiiEditorSession::new(JsValue::UNDEFINED, Some("c1".into())).unwrap();
        assert_eq!(session.on_document_changed(doc(&big)).unwrap(), "immediate");
        session.switch_conversation(Some("c2".into()));
        assert_eq!(session.inner.borrow().in_flight_count(), 0);

        // Two immediate requests queued before the host runs either
        assert_eq!(session.on_document_changed(doc(&big)).unwrap(), "immediate");
        let other = session.inner.borrow_mut().trigger_detection().unwrap();
        session.queued.borrow_mut().insert(0, other);
        assert_eq!(session.inner.borrow().in_flight_count(), 2);

        let newest = session.take_queued().unwrap();
        assert!(session.queued.borrow().is_empty());
        assert_eq!(session.inner.borrow().in_flight_count(), 1);
        assert!(session.inner.borrow_mut().cancel_detection(newest.id));
    }
}
