use std::time::{Duration, Instant};

/// Quiet period applied to filter keystrokes.
pub const FILTER_QUIET: Duration = Duration::from_millis(300);

/// Emits the latest input once no new input arrived for `quiet`, and only if
/// it differs from the last emitted value.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    quiet: Duration,
    current: T,
    last_emitted: T,
    deadline: Option<Instant>,
}

impl<T: Clone + PartialEq> Debouncer<T> {
    pub fn new(quiet: Duration, initial: T) -> Self {
        Self {
            quiet,
            current: initial.clone(),
            last_emitted: initial,
            deadline: None,
        }
    }

    /// Records a new value and restarts the quiet period.
    pub fn input(&mut self, value: T, now: Instant) {
        self.current = value;
        self.deadline = Some(now + self.quiet);
    }

    /// The most recent input, emitted or not.
    pub fn current(&self) -> &T {
        &self.current
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns the value to act on once the quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let deadline = self.deadline?;
        if now < deadline {
            return None;
        }
        self.deadline = None;
        if self.current == self.last_emitted {
            return None;
        }
        self.last_emitted = self.current.clone();
        Some(self.current.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_of_keystrokes_fires_once_after_last() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(FILTER_QUIET, String::new());
        let mut fired = Vec::new();

        debouncer.input("a".to_string(), start);
        debouncer.input("an".to_string(), start + Duration::from_millis(100));
        let last = start + Duration::from_millis(250);
        debouncer.input("ana".to_string(), last);

        let mut t = start;
        while t <= last + Duration::from_millis(600) {
            if let Some(value) = debouncer.poll(t) {
                fired.push((value, t));
            }
            t += Duration::from_millis(10);
        }

        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].0, "ana");
        assert_eq!(fired[0].1, last + FILTER_QUIET);
    }

    #[test]
    fn unchanged_value_after_quiet_period_is_swallowed() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(FILTER_QUIET, String::new());
        debouncer.input("x".to_string(), start);
        debouncer.input(String::new(), start + Duration::from_millis(50));
        assert_eq!(debouncer.poll(start + Duration::from_secs(1)), None);
        assert_eq!(debouncer.deadline(), None);
    }

    #[test]
    fn nothing_fires_before_deadline() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(FILTER_QUIET, 0u8);
        debouncer.input(1, start);
        assert_eq!(debouncer.poll(start + Duration::from_millis(299)), None);
        assert_eq!(debouncer.poll(start + Duration::from_millis(300)), Some(1));
        assert_eq!(debouncer.poll(start + Duration::from_millis(900)), None);
    }
}
