//! TypingActivityMonitor: Typing vs. Programmatic Changes
//!
//! Background re-checks should follow the user's typing rhythm, not
//! content loads or collaborative bulk updates.
//!
//! # State Machine
//! ```text
//! Idle --keystroke--> UserActive --edit--> PauseScheduled --silence--> PauseDetected --> Idle
//!                                    ^            |
//!                                    +---edit-----+  (cancel and restart)
//! ```
//! Transactions arriving faster than the burst threshold are programmatic:
//! they cancel any pending pause and schedule nothing.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::timer::PauseTimer;
use crate::change::word_sets_differ;
use crate::config::ActivityConfig;
use crate::console;
use crate::text::char_len;

// =============================================================================
// Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityState {
    Idle,
    UserActive,
    PauseScheduled,
}

impl ActivityState {
    pub fn name(&self) -> &'static str {
        match self {
            ActivityState::Idle => "idle",
            ActivityState::UserActive => "user_active",
            ActivityState::PauseScheduled => "pause_scheduled",
        }
    }
}

/// What the monitor did with a document change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditDisposition {
    /// Part of a programmatic burst; nothing scheduled
    Burst,
    /// Pause timer (re)armed
    PauseScheduled,
    /// No keystroke in the activity window; nothing scheduled
    NoRecentActivity,
}

/// Emitted when a pause follows a significant change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseSignal {
    /// Baseline text of the last classifier call (empty if none)
    pub previous: String,
    pub current: String,
}

// =============================================================================
// TypingActivityMonitor
// =============================================================================

#[derive(Debug, Clone)]
pub struct TypingActivityMonitor {
    config: ActivityConfig,
    min_word_len: usize,
    last_keystroke_at: Option<u64>,
    last_api_baseline: Option<String>,
    recent_transactions: VecDeque<u64>,
    timer: PauseTimer,
    /// Text captured when the pending timer was armed
    pending_text: Option<String>,
}

impl Default for TypingActivityMonitor {
    fn default() -> Self {
        Self::new(ActivityConfig::default(), 3)
    }
}

impl TypingActivityMonitor {
    pub fn new(config: ActivityConfig, min_word_len: usize) -> Self {
        Self {
            config,
            min_word_len,
            last_keystroke_at: None,
            last_api_baseline: None,
            recent_transactions: VecDeque::new(),
            timer: PauseTimer::new(),
            pending_text: None,
        }
    }

    /// A real key press: refreshes the activity window and clears burst tracking
    pub fn on_keystroke(&mut self, now_ms: u64) {
        self.last_keystroke_at = Some(now_ms);
        self.recent_transactions.clear();
    }

    /// Record a transaction. Returns true if it is part of a programmatic burst.
    pub fn on_transaction(&mut self, now_ms: u64) -> bool {
        let retention = self.config.transaction_retention_ms;
        while let Some(&oldest) = self.recent_transactions.front() {
            if now_ms.saturating_sub(oldest) < retention {
                break;
            }
            self.recent_transactions.pop_front();
        }
        self.recent_transactions.push_back(now_ms);

        let window = self.config.burst_window_ms;
        let in_window = self
            .recent_transactions
            .iter()
            .filter(|&&t| now_ms.saturating_sub(t) < window)
            .count();
        in_window > self.config.burst_max_transactions
    }

    pub fn has_recent_activity(&self, now_ms: u64) -> bool {
        match self.last_keystroke_at {
            Some(at) => now_ms.saturating_sub(at) <= self.config.keystroke_window_ms,
            None => false,
        }
    }

    /// Cancel any pending pause and, after recent typing, arm a new one
    pub fn on_text_change(&mut self, now_ms: u64, text: &str) -> EditDisposition {
        self.timer.cancel();
        self.pending_text = None;

        if !self.has_recent_activity(now_ms) {
            return EditDisposition::NoRecentActivity;
        }
        self.timer.arm(now_ms, self.config.pause_threshold_ms);
        self.pending_text = Some(text.to_string());
        EditDisposition::PauseScheduled
    }

    /// Transaction plus text change, the usual entry point for an edit
    pub fn on_document_change(&mut self, now_ms: u64, text: &str) -> EditDisposition {
        if self.on_transaction(now_ms) {
            if self.timer.cancel() {
                console::log("[TypingActivity] Burst detected, pending pause cancelled");
            }
            self.pending_text = None;
            return EditDisposition::Burst;
        }
        self.on_text_change(now_ms, text)
    }

    /// Fire the pause timer if due. Only a significant difference from the
    /// last classifier baseline yields a signal.
    pub fn poll(&mut self, now_ms: u64) -> Option<PauseSignal> {
        self.timer.fire_if_due(now_ms)?;
        let current = self.pending_text.take()?;
        if !self.has_significant_text_difference(&current) {
            return None;
        }
        Some(PauseSignal {
            previous: self.last_api_baseline.clone().unwrap_or_default(),
            current,
        })
    }

    /// Record the text that was just sent to the classifier
    pub fn on_api_call_made(&mut self, text: &str) {
        self.last_api_baseline = Some(text.to_string());
    }

    pub fn api_baseline(&self) -> Option<&str> {
        self.last_api_baseline.as_deref()
    }

    pub fn has_significant_text_difference(&self, current: &str) -> bool {
        let baseline = match self.last_api_baseline.as_deref() {
            Some(b) if !b.is_empty() => b,
            _ => return !current.trim().is_empty(),
        };
        if char_len(current).abs_diff(char_len(baseline)) > self.config.significant_length_delta {
            return true;
        }
        word_sets_differ(baseline, current, self.min_word_len)
    }

    pub fn state(&self, now_ms: u64) -> ActivityState {
        if self.timer.is_armed() {
            ActivityState::PauseScheduled
        } else if self.has_recent_activity(now_ms) {
            ActivityState::UserActive
        } else {
            ActivityState::Idle
        }
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.timer.deadline()
    }

    /// Drop the pending timer and burst tracking (editor teardown)
    pub fn cleanup(&mut self) {
        self.timer.cancel();
        self.pending_text = None;
        self.recent_transactions.clear();
    }

    /// Forget everything, including the classifier baseline
    pub fn reset(&mut self) {
        self.cleanup();
        self.last_keystroke_at = None;
        self.last_api_baseline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor() -> TypingActivityMonitor {
        TypingActivityMonitor::default()
    }

    // -------------------------------------------------------------------------
    // Requirement 1: No pause without a recent keystroke
    // -------------------------------------------------------------------------
    #[test]
    fn test_no_keystroke_no_pause() {
        let mut m = monitor();
        assert_eq!(m.on_document_change(0, "Hello John"), EditDisposition::NoRecentActivity);
        assert_eq!(m.poll(5000), None);
        assert_eq!(m.state(5000), ActivityState::Idle);
    }

    // -------------------------------------------------------------------------
    // Requirement 2: Burst suppression then exactly one pause
    // -------------------------------------------------------------------------
    #[test]
    fn test_burst_suppressed_then_single_pause() {
        let mut m = monitor();

        // Programmatic load: 5 transactions within 50ms
        let mut dispositions = Vec::new();
        for i in 0..5u64 {
            dispositions.push(m.on_document_change(i * 10, "Loaded text from server"));
        }
        assert!(dispositions.contains(&EditDisposition::Burst));
        assert_eq!(m.poll(10_000), None);

        // Real typing well after the burst
        m.on_keystroke(20_000);
        assert_eq!(
            m.on_document_change(20_000, "Loaded text from server. Call Jane"),
            EditDisposition::PauseScheduled
        );
        assert_eq!(m.state(20_000), ActivityState::PauseScheduled);

        let mut signals = 0;
        for t in (20_000..23_000).step_by(100) {
            if m.poll(t).is_some() {
                signals += 1;
            }
        }
        assert_eq!(signals, 1);
        assert_eq!(m.state(23_000), ActivityState::UserActive);
    }

    #[test]
    fn test_burst_cancels_pending_pause() {
        let mut m = monitor();
        m.on_keystroke(0);
        assert_eq!(m.on_document_change(0, "Hi John"), EditDisposition::PauseScheduled);
        assert_eq!(m.on_document_change(200, "Hi John!"), EditDisposition::PauseScheduled);
        // Three transactions in under 100ms
        m.on_document_change(210, "a");
        assert_eq!(m.on_document_change(220, "b"), EditDisposition::Burst);
        assert_eq!(m.next_deadline(), None);
        assert_eq!(m.poll(5000), None);
    }

    // -------------------------------------------------------------------------
    // Requirement 3: Each edit restarts the timer
    // -------------------------------------------------------------------------
    #[test]
    fn test_edit_restarts_timer() {
        let mut m = monitor();
        m.on_keystroke(0);
        m.on_document_change(0, "Hi");
        m.on_keystroke(600);
        m.on_document_change(600, "Hi John");
        assert_eq!(m.next_deadline(), Some(1600));
        assert_eq!(m.poll(1000), None);
        let signal = m.poll(1600).unwrap();
        assert_eq!(signal.current, "Hi John");
        assert_eq!(signal.previous, "");
    }

    // -------------------------------------------------------------------------
    // Requirement 4: Insignificant pauses are absorbed
    // -------------------------------------------------------------------------
    #[test]
    fn test_insignificant_pause_absorbed() {
        let mut m = monitor();
        m.on_api_call_made("Call John tomorrow");
        m.on_keystroke(0);
        m.on_document_change(0, "Call John tomorrow!");
        assert_eq!(m.poll(1000), None);

        m.on_keystroke(2000);
        m.on_document_change(2000, "Call Jane tomorrow");
        let signal = m.poll(3000).unwrap();
        assert_eq!(signal.previous, "Call John tomorrow");
    }

    #[test]
    fn test_significance_rules() {
        let mut m = monitor();
        assert!(!m.has_significant_text_difference("   "));
        assert!(m.has_significant_text_difference("x"));

        m.on_api_call_made("abc");
        assert!(m.has_significant_text_difference("abc 123456"));
        assert!(!m.has_significant_text_difference("abc 1"));
    }

    #[test]
    fn test_activity_window_expires() {
        let mut m = monitor();
        m.on_keystroke(0);
        assert_eq!(m.state(5000), ActivityState::UserActive);
        assert_eq!(m.state(5001), ActivityState::Idle);
        assert_eq!(m.on_text_change(6000, "late"), EditDisposition::NoRecentActivity);
    }

    #[test]
    fn test_keystroke_clears_burst_buffer() {
        let mut m = monitor();
        m.on_transaction(0);
        m.on_transaction(10);
        m.on_keystroke(15);
        assert!(!m.on_transaction(20));
    }
}
