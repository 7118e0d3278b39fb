//! Wall clock abstraction and the autosave debounce.
use chrono::{DateTime, Duration, Utc};
use std::cell::Cell;
use std::rc::Rc;

/// Delay between the last mutation and the storage write.
pub const DEFAULT_AUTOSAVE_DELAY_MS: u64 = 1_000;

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// The host's real clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<DateTime<Utc>>>,
}

impl ManualClock {
    #[must_use]
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn advance_ms(&self, millis: i64) {
        self.now.set(self.now.get() + Duration::milliseconds(millis));
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::starting_at(DateTime::<Utc>::default())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

/// A single resettable deadline.
///
/// Every [`Debounce::touch`] pushes the deadline out to `now + delay`; the
/// pending save fires once a poll finds the deadline has passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Debounce {
    delay: Duration,
    deadline: Option<DateTime<Utc>>,
}

impl Debounce {
    #[must_use]
    pub fn new(delay_ms: u64) -> Self {
        let delay_ms = i64::from(u32::try_from(delay_ms).unwrap_or(u32::MAX));
        Self {
            delay: Duration::milliseconds(delay_ms),
            deadline: None,
        }
    }

    /// Restart the timer from `now`.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.deadline = Some(now + self.delay);
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    #[must_use]
    pub const fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    /// Consume the pending deadline if it has elapsed at `now`.
    pub fn fire_if_due(&mut self, now: DateTime<Utc>) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Consume the pending deadline regardless of time.
    pub fn take(&mut self) -> bool {
        self.deadline.take().is_some()
    }
}

impl Default for Debounce {
    fn default() -> Self {
        Self::new(DEFAULT_AUTOSAVE_DELAY_MS)
    }
}
