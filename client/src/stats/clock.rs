/// Millisecond time source for the overlay.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// `performance.now()`, falling back to `Date.now()` where the Performance
/// API is missing.
pub struct PerformanceClock {
    performance: Option<web_sys::Performance>,
}

impl PerformanceClock {
    pub fn new() -> Self {
        Self {
            performance: web_sys::window().and_then(|w| w.performance()),
        }
    }
}

impl Clock for PerformanceClock {
    fn now_ms(&self) -> f64 {
        match &self.performance {
            Some(performance) => performance.now(),
            None => js_sys::Date::now(),
        }
    }
}

#[cfg(test)]
pub(crate) use manual::ManualClock;

#[cfg(test)]
mod manual {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::Clock;

    /// Clock the test advances by hand. Clones share the same time.
    #[derive(Debug, Clone, Default)]
    pub struct ManualClock(Rc<Cell<f64>>);

    impl ManualClock {
        pub fn set(&self, ms: f64) {
            self.0.set(ms);
        }

        pub fn advance(&self, ms: f64) {
            self.0.set(self.0.get() + ms);
        }
    }

    impl Clock for ManualClock {
        fn now_ms(&self) -> f64 {
            self.0.get()
        }
    }
}
