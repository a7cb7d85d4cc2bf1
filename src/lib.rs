//! PII Sentinel: Live PII Detection Plumbing for Structured Editors
//!
//! A Rust/WASM implementation of the text-synchronization and change-detection
//! engine that sits between a rich-text editor and an external PII classifier.
//!
//! # Architecture
//!
//! ## Text Sync
//! - `mapping/` - PositionMapper: plain-text mirror <-> structured positions
//! - `change/` - ChangeDetector: prefix/suffix diff, context snippets, word heuristics
//!
//! ## Scheduling
//! - `activity/` - TypingActivityMonitor: keystroke window, burst suppression, pause timer
//!
//! ## Results
//! - `entity/` - EntityMerger: mask-preserving merge, modifiers, type priority
//! - `cache/` - ResultCache: bounded FIFO caches keyed by conversation + content hash
//! - `perf.rs` - PerformanceTracker: diagnostic counters
//! - `decorations.rs` - Highlight data for the external renderer
//!
//! ## Session
//! - `session/` - PiiSession: per-editor context object, conversation store, events
//! - `wasm.rs` - `PiiEditorSession` JS binding
//!
//! # Usage (WASM)
//! ```javascript,ignore
//! import init, { PiiEditorSession } from 'pii-sentinel';
//!
//! await init();
//!
//! const session = new PiiEditorSession({ activity: { pause_threshold_ms: 800 } }, 'conv-1');
//!
//! // Wire editor events
//! editor.on('keydown', () => session.onKeystroke());
//! editor.on('update', () => {
//!   const disposition = session.onDocumentChanged(editor.getJSON());
//!   if (disposition === 'immediate') session.runDetection(classify);
//! });
//!
//! // Drive timers from the host loop
//! setInterval(() => session.runPending(classify), 100);
//!
//! // Read highlight data
//! const decorations = session.decorations();
//! ```

pub mod console;
pub mod error;
pub mod config;
pub mod text;
pub mod mapping;
pub mod change;
pub mod activity;
pub mod entity;
pub mod cache;
pub mod perf;
pub mod decorations;
pub mod session;
pub mod wasm;

pub use error::*;
pub use config::*;
pub use mapping::*;
pub use change::*;
pub use activity::*;
pub use entity::*;
pub use cache::*;
pub use perf::*;
pub use decorations::*;
pub use session::*;

use wasm_bindgen::prelude::*;

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator for smaller WASM bundle size.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Get version information
#[wasm_bindgen]
pub fn version() -> String {
    format!("pii-sentinel v{}", env!("CARGO_PKG_VERSION"))
}
