use std::time::Duration;
use tokio::time::{ sleep, Instant };

/// A fixed point in time that bounded waits check on every iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    expires_at: Instant,
}

impl Deadline {
    /// Deadline `limit` from now
    pub fn after(limit: Duration) -> Self {
        Self { expires_at: Instant::now() + limit }
    }

    pub fn at(expires_at: Instant) -> Self {
        Self { expires_at }
    }

    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    pub fn remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    /// Sleep for `interval`, cut short at the deadline
    pub async fn sleep(&self, interval: Duration) {
        let wait = interval.min(self.remaining());
        if !wait.is_zero() {
            sleep(wait).await;
        }
    }
}
