//! Typing activity: clocks, the pause timer and the activity monitor

pub mod clock;
pub mod monitor;
pub mod timer;

pub use clock::{Clock, InstantClock, ManualClock};
pub use monitor::{ActivityState, EditDisposition, PauseSignal, TypingActivityMonitor};
pub use timer::PauseTimer;
