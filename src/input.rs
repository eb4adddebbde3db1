//! Host-provided capabilities: control queries and a monotonic clock
//!
//! Both are handed to each tick explicitly. The simulation never reaches for
//! process-wide keyboard or time state.

use std::cell::Cell;
use std::collections::HashSet;
use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Ship controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Control {
    TurnLeft,
    TurnRight,
    Thrust,
    Fire,
}

/// "Is this control currently held" query
pub trait Controls {
    fn is_held(&self, control: Control) -> bool;
}

impl<F> Controls for F
where
    F: Fn(Control) -> bool,
{
    fn is_held(&self, control: Control) -> bool {
        self(control)
    }
}

/// Set of currently held controls, fed by host key events
#[derive(Debug, Clone, Default)]
pub struct ControlState {
    held: HashSet<Control>,
}

impl ControlState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Controls held from the start
    pub fn holding(controls: &[Control]) -> Self {
        Self {
            held: controls.iter().copied().collect(),
        }
    }

    pub fn press(&mut self, control: Control) {
        self.held.insert(control);
    }

    pub fn release(&mut self, control: Control) {
        self.held.remove(&control);
    }

    pub fn release_all(&mut self) {
        self.held.clear();
    }
}

impl Controls for ControlState {
    fn is_held(&self, control: Control) -> bool {
        self.held.contains(&control)
    }
}

/// Monotonic millisecond clock used for fire-rate limiting
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Wall clock, measured from construction
#[derive(Debug, Clone)]
pub struct SystemClock {
    start: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

/// Clock advanced by hand (replays, headless runs, tests)
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Cell<u64>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Cell::new(start_ms),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get().saturating_add(ms));
    }

    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}
