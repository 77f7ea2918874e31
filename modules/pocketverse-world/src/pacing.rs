use std::time::Duration;

use async_trait::async_trait;

use crate::pipeline::Stage;

/// Waits between pipeline stages. Called before every stage except the first.
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self, next: Stage);
}

/// Sleeps for a fixed duration.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay {
    delay: Duration,
}

impl FixedDelay {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for FixedDelay {
    fn default() -> Self {
        Self::from_millis(2_000)
    }
}

#[async_trait]
impl Pacer for FixedDelay {
    async fn pause(&self, next: Stage) {
        tracing::debug!(%next, delay_ms = self.delay.as_millis() as u64, "Pausing before stage");
        tokio::time::sleep(self.delay).await;
    }
}

/// No pause at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

#[async_trait]
impl Pacer for NoDelay {
    async fn pause(&self, _next: Stage) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixed_delay_sleeps_for_configured_duration() {
        let pacer = FixedDelay::from_millis(20);
        let started = std::time::Instant::now();
        pacer.pause(Stage::Tickets).await;
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn default_delay_is_two_seconds() {
        assert_eq!(FixedDelay::default().delay(), Duration::from_secs(2));
    }
}
