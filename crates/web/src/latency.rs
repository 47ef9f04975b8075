//! Simulated network latency for the mock endpoints

use rand::Rng;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Latency {
    enabled: bool,
}

impl Latency {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn disabled() -> Self {
        Self::new(false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Sleep `base_ms` plus a uniform `0..jitter_ms` extra.
    pub async fn pause(&self, base_ms: u64, jitter_ms: u64) {
        if !self.enabled {
            return;
        }
        let delay = Self::delay(base_ms, jitter_ms);
        tokio::time::sleep(delay).await;
    }

    fn delay(base_ms: u64, jitter_ms: u64) -> Duration {
        let extra = if jitter_ms > 0 {
            rand::thread_rng().gen_range(0..jitter_ms)
        } else {
            0
        };
        Duration::from_millis(base_ms + extra)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_delay_bounds() {
        for _ in 0..100 {
            let d = Latency::delay(1000, 2000);
            assert!(d >= Duration::from_millis(1000));
            assert!(d < Duration::from_millis(3000));
        }
        assert_eq!(Latency::delay(300, 0), Duration::from_millis(300));
    }

    #[tokio::test]
    async fn test_disabled_returns_immediately() {
        let start = Instant::now();
        Latency::disabled().pause(5_000, 5_000).await;
        assert!(start.elapsed() < Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_enabled_sleeps() {
        let start = Instant::now();
        Latency::new(true).pause(20, 0).await;
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
