//! Async request pacing for the Toggl API.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tokio::time::sleep;

/// Enforces a minimum interval between consecutive Toggl requests.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    cooldown: Duration,
    last_call: Arc<Mutex<Option<Instant>>>,
}

impl RateLimiter {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_call: Arc::new(Mutex::new(None)),
        }
    }

    /// A limiter that never waits.
    pub fn unlimited() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Waits until the cooldown since the previous call has passed and
    /// returns how long this call was held back.
    pub async fn hit(&self) -> Duration {
        let mut guard = self.last_call.lock().await;
        let mut waited = Duration::ZERO;
        if let Some(last) = *guard {
            let elapsed = last.elapsed();
            if elapsed < self.cooldown {
                waited = self.cooldown - elapsed;
                sleep(waited).await;
            }
        }
        *guard = Some(Instant::now());
        waited
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }
}
