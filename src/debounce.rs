/// Debouncing for bursts of page events
use gloo_timers::callback::Timeout;
use std::cell::RefCell;
use std::rc::Rc;

/// Delay between the last DOM mutation in a burst and the re-scrape
pub const MUTATION_DEBOUNCE_MS: u32 = 500;

/// Collapses a burst of triggers into a single callback.
///
/// Holds at most one pending timeout; a new trigger replaces it, which
/// cancels the old one. Clones share the pending timeout.
#[derive(Clone)]
pub struct Debouncer {
    pending: Rc<RefCell<Option<Timeout>>>,
    delay_ms: u32,
}

impl Debouncer {
    pub fn new(delay_ms: u32) -> Self {
        Debouncer {
            pending: Rc::new(RefCell::new(None)),
            delay_ms,
        }
    }

    /// Run `callback` once the delay passes with no newer trigger
    pub fn trigger(&self, callback: impl FnOnce() + 'static) {
        *self.pending.borrow_mut() = Some(Timeout::new(self.delay_ms, callback));
    }

    /// Drop whatever is pending without arming a new timer
    pub fn cancel(&self) {
        self.pending.borrow_mut().take();
    }
}
