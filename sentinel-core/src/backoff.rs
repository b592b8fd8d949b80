use std::time::Duration;

pub const DEFAULT_BACKOFF_CAP: Duration = Duration::from_secs(30);

/// Capped exponential reconnect delay: `min(2^attempt, cap)` seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    cap: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(DEFAULT_BACKOFF_CAP)
    }
}

impl Backoff {
    pub fn new(cap: Duration) -> Self {
        Self { cap }
    }

    pub fn cap(&self) -> Duration {
        self.cap
    }

    pub fn delay(&self, attempt: u32) -> Duration {
        let secs = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        Duration::from_secs(secs).min(self.cap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doubles_until_the_cap() {
        let backoff = Backoff::default();
        let delays: Vec<u64> =
            (0..8).map(|attempt| backoff.delay(attempt).as_secs()).collect();
        assert_eq!(delays, vec![1, 2, 4, 8, 16, 30, 30, 30]);
    }

    #[test]
    fn huge_attempts_saturate() {
        let backoff = Backoff::new(Duration::from_secs(5));
        assert_eq!(backoff.delay(200), Duration::from_secs(5));
    }
}
