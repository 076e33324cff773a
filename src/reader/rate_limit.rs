use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Token-bucket limiter for mutating reader-API calls.
///
/// The bucket starts full, so a burst up to `burst` requests proceeds
/// immediately; after that, callers are paced at `per_second`. The bucket is
/// owned by its client, so two clients never contend on each other's budget.
#[derive(Debug)]
pub struct RateLimiter {
    state: Mutex<Bucket>,
    capacity: f64,
    per_second: f64,
}

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

impl RateLimiter {
    pub fn new(per_second: f64, burst: u32) -> Self {
        Self {
            state: Mutex::new(Bucket {
                tokens: f64::from(burst),
                last_refill: Instant::now(),
            }),
            capacity: f64::from(burst),
            per_second,
        }
    }

    /// Waits until a request slot is available.
    ///
    /// The lock is held across the sleep, so concurrent callers queue up
    /// behind the earliest waiter instead of racing for the same slot.
    pub async fn acquire(&self) {
        let mut bucket = self.state.lock().await;
        let now = Instant::now();
        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.per_second).min(self.capacity);
        bucket.last_refill = now;

        // May go negative; the sleep below repays the debt before returning.
        bucket.tokens -= 1.0;

        if bucket.tokens < 0.0 {
            let wait = Duration::from_secs_f64(-bucket.tokens / self.per_second);
            tokio::time::sleep(wait).await;
        }
    }
}
