use chrono::Timelike;
use rand::Rng;

use crate::error::{QuotecardError, QuotecardResult};

/// A single daily trigger instant, minute-granular. Compared by value; the
/// whole minute it names counts as "due".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Slot {
    pub hour: u8,
    pub minute: u8,
}

impl Slot {
    pub fn new(hour: u8, minute: u8) -> Self {
        Self { hour, minute }
    }

    pub fn from_time<T: Timelike>(t: &T) -> Self {
        Self {
            hour: t.hour() as u8,
            minute: t.minute() as u8,
        }
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// A half-open hour interval [start, end) from which one slot hour is drawn
/// per day. `end` may be 24, and `end <= start` denotes a window that wraps
/// past midnight; each window is independent of the others.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Window {
    pub start: u8,
    pub end: u8,
}

impl Window {
    pub fn new(start: u8, end: u8) -> Self {
        Self { start, end }
    }

    /// Morning, midday, late afternoon, evening, late night.
    pub fn default_windows() -> Vec<Window> {
        vec![
            Window::new(9, 10),
            Window::new(13, 14),
            Window::new(17, 18),
            Window::new(21, 22),
            Window::new(1, 2),
        ]
    }

    fn hour_span(&self) -> u8 {
        if self.end > self.start {
            self.end - self.start
        } else {
            self.end + 24 - self.start
        }
    }

    pub fn validate(&self) -> QuotecardResult<()> {
        if self.start > 23 || self.end > 24 {
            return Err(QuotecardError::schedule(format!(
                "window {}..{} is outside the clock",
                self.start, self.end
            )));
        }
        if self.hour_span() == 0 || self.hour_span() > 23 {
            return Err(QuotecardError::schedule(format!(
                "window {}..{} spans no drawable hour",
                self.start, self.end
            )));
        }
        Ok(())
    }

    pub fn contains_hour(&self, hour: u8) -> bool {
        if self.end > self.start {
            (self.start..self.end).contains(&hour)
        } else {
            hour >= self.start || hour < self.end
        }
    }

    /// Uniform hour from [start, end), uniform minute from [0, 59]. The hour
    /// is drawn before the minute so a seeded source reproduces slots exactly.
    pub fn draw_slot(&self, rng: &mut impl Rng) -> Slot {
        let hour = (self.start + rng.gen_range(0..self.hour_span())) % 24;
        let minute = rng.gen_range(0..60u8);
        Slot::new(hour, minute)
    }
}

/// The not-yet-fired slots for the current day, one per configured window at
/// generation time. Duplicate slot values across windows are kept as distinct
/// entries; both fire (and are consumed) at the same instant.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScheduleSet {
    slots: Vec<Slot>,
}

impl ScheduleSet {
    /// One slot per window, in window order.
    pub fn generate_daily(windows: &[Window], rng: &mut impl Rng) -> QuotecardResult<Self> {
        if windows.is_empty() {
            return Err(QuotecardError::schedule(
                "cannot generate slots without windows",
            ));
        }
        for w in windows {
            w.validate()?;
        }
        let slots = windows.iter().map(|w| w.draw_slot(rng)).collect();
        Ok(Self { slots })
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Membership test for the minute `now` names.
    pub fn is_due(&self, now: Slot) -> bool {
        self.slots.contains(&now)
    }

    /// Removes every entry matching `now` and returns how many were removed.
    /// Removing the match immediately on first fire is what keeps a slot from
    /// re-firing inside the same clock minute.
    pub fn consume(&mut self, now: Slot) -> usize {
        let before = self.slots.len();
        self.slots.retain(|s| *s != now);
        before - self.slots.len()
    }
}
