//! Productivity stopwatch.

use serde::{Deserialize, Serialize};

/// Elapsed-seconds stopwatch driven by an external one-second tick.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stopwatch {
    pub elapsed_seconds: u64,
    pub running: bool,
}

impl Stopwatch {
    pub fn new(elapsed_seconds: u64) -> Self {
        Self {
            elapsed_seconds,
            running: false,
        }
    }

    /// Start counting. Returns false if already running.
    pub fn start(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        true
    }

    /// Pause counting. Returns false if already paused.
    pub fn pause(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        true
    }

    /// Advance one second if running.
    pub fn tick(&mut self) -> bool {
        if self.running {
            self.elapsed_seconds += 1;
        }
        self.running
    }

    /// Pause and zero.
    pub fn reset(&mut self) {
        self.running = false;
        self.elapsed_seconds = 0;
    }

    /// Format as `HH:MM:SS`.
    pub fn display(&self) -> String {
        let hours = self.elapsed_seconds / 3600;
        let minutes = (self.elapsed_seconds % 3600) / 60;
        let seconds = self.elapsed_seconds % 60;
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    }
}
