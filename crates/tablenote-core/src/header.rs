//! Report header text and the clock it is seeded from.
//!
//! The header defaults to `DD.MM.YYYY - Daily Breakage - (Shift)`. The time source is injected
//! through [`Clock`] so the text can be generated deterministically.

use chrono::{Local, NaiveDateTime, Timelike};
use std::fmt;

/// Source of the current local time.
pub trait Clock {
    /// Current local wall-clock time.
    fn now(&self) -> NaiveDateTime;
}

/// Reads the system clock in the local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Work shift derived from the hour of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shift {
    /// 06:00 to 17:59.
    Morning,
    /// 18:00 to 05:59.
    Night,
}

impl Shift {
    /// Shift covering `hour` (0-23).
    pub fn from_hour(hour: u32) -> Self {
        if (6..18).contains(&hour) {
            Shift::Morning
        } else {
            Shift::Night
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Shift::Morning => "Morning Shift",
            Shift::Night => "Night Shift",
        }
    }
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Build the default header for the instant reported by `clock`.
pub fn header_text(clock: &dyn Clock) -> String {
    let now = clock.now();
    let shift = Shift::from_hour(now.hour());
    format!("{} - Daily Breakage - ({shift})", now.format("%d.%m.%Y"))
}
