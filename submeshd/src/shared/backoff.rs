//! Exponential backoff shared by every consumer loop's reconnect branch.

use std::time::Duration;

/// Starts at ~3s, doubles on each consecutive failure, caps at ~30s,
/// resets after any successful message per §4.2.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    cap: Duration,
    current: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(3), Duration::from_secs(30))
    }
}

impl Backoff {
    pub fn new(initial: Duration, cap: Duration) -> Self {
        Self {
            initial,
            cap,
            current: initial,
        }
    }

    /// The delay to sleep for this failure, then doubles the internal state.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.cap);
        delay
    }

    /// Resets the counter; call on any successful message.
    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doubles_up_to_cap() {
        let mut b = Backoff::new(Duration::from_secs(3), Duration::from_secs(30));
        assert_eq!(b.next_delay(), Duration::from_secs(3));
        assert_eq!(b.next_delay(), Duration::from_secs(6));
        assert_eq!(b.next_delay(), Duration::from_secs(12));
        assert_eq!(b.next_delay(), Duration::from_secs(24));
        assert_eq!(b.next_delay(), Duration::from_secs(30));
        assert_eq!(b.next_delay(), Duration::from_secs(30));
    }

    #[test]
    fn reset_returns_to_initial() {
        let mut b = Backoff::default();
        b.next_delay();
        b.next_delay();
        b.reset();
        assert_eq!(b.next_delay(), Duration::from_secs(3));
    }
}
