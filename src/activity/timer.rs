//! Cancellable one-shot timer.
//!
//! No runtime callbacks: the owner arms a deadline and later asks whether it
//! is due. Every arm bumps a generation, so a stale deadline can never fire
//! after it has been replaced.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Armed {
    deadline_ms: u64,
    generation: u64,
}

#[derive(Debug, Clone, Default)]
pub struct PauseTimer {
    armed: Option<Armed>,
    generation: u64,
}

impl PauseTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm (or re-arm) to fire `delay_ms` after `now_ms`. Returns the generation.
    pub fn arm(&mut self, now_ms: u64, delay_ms: u64) -> u64 {
        self.generation += 1;
        self.armed = Some(Armed {
            deadline_ms: now_ms.saturating_add(delay_ms),
            generation: self.generation,
        });
        self.generation
    }

    /// True if a pending deadline was dropped
    pub fn cancel(&mut self) -> bool {
        self.armed.take().is_some()
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    pub fn deadline(&self) -> Option<u64> {
        self.armed.map(|a| a.deadline_ms)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Disarm and return the generation if the deadline has passed
    pub fn fire_if_due(&mut self, now_ms: u64) -> Option<u64> {
        match self.armed {
            Some(armed) if now_ms >= armed.deadline_ms => {
                self.armed = None;
                Some(armed.generation)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_at_deadline() {
        let mut timer = PauseTimer::new();
        let generation = timer.arm(0, 1000);
        assert_eq!(timer.fire_if_due(999), None);
        assert_eq!(timer.fire_if_due(1000), Some(generation));
        assert_eq!(timer.fire_if_due(2000), None);
    }

    #[test]
    fn test_rearm_replaces_deadline() {
        let mut timer = PauseTimer::new();
        let first = timer.arm(0, 1000);
        let second = timer.arm(500, 1000);
        assert_ne!(first, second);
        assert_eq!(timer.fire_if_due(1000), None);
        assert_eq!(timer.fire_if_due(1500), Some(second));
    }

    #[test]
    fn test_cancel() {
        let mut timer = PauseTimer::new();
        assert!(!timer.cancel());
        timer.arm(0, 10);
        assert!(timer.cancel());
        assert_eq!(timer.fire_if_due(100), None);
        assert_eq!(timer.deadline(), None);
    }
}
