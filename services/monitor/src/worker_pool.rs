//! Bounded concurrent work queue gating derived work — contract reads,
//! child tasks spawned while processing a range (spec.md §4.4
//! "Concurrency bound", §5: "concurrency 10, rate 50/s").
//!
//! Range processing itself is *not* gated by this pool — it is serialised
//! per monitor to preserve cursor monotonicity (spec.md §4.4, §5); only the
//! work a handler fans out while processing a range goes through it.

use governor::{DefaultDirectRateLimiter, Quota};
use std::num::NonZeroU32;
use std::sync::Arc;
use tokio::sync::Semaphore;

#[derive(Clone)]
pub struct WorkerPool {
    semaphore: Arc<Semaphore>,
    limiter: Arc<DefaultDirectRateLimiter>,
}

impl WorkerPool {
    /// `concurrency` concurrent tasks, `rate_per_sec` token-bucket cap.
    pub fn new(concurrency: usize, rate_per_sec: u32) -> Self {
        let rate = NonZeroU32::new(rate_per_sec).unwrap_or(NonZeroU32::new(1).unwrap());
        Self {
            semaphore: Arc::new(Semaphore::new(concurrency)),
            limiter: Arc::new(DefaultDirectRateLimiter::direct(Quota::per_second(rate))),
        }
    }

    /// The spec default: 10 concurrent, 50/s (spec.md §4.4, §5).
    pub fn default_bound() -> Self {
        Self::new(10, 50)
    }

    /// Run `fut` once a concurrency slot and a rate-limit token are both
    /// available.
    pub async fn run<F, T>(&self, fut: F) -> T
    where
        F: std::future::Future<Output = T>,
    {
        let _permit = self.semaphore.acquire().await.expect("semaphore never closed");
        self.limiter.until_ready().await;
        fut.await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn runs_tasks_under_the_concurrency_bound() {
        let pool = WorkerPool::new(2, 1000);
        let counter = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let pool = pool.clone();
            let counter = counter.clone();
            let max_seen = max_seen.clone();
            handles.push(tokio::spawn(async move {
                pool.run(async {
                    let now = counter.fetch_add(1, Ordering::SeqCst) + 1;
                    max_seen.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                    counter.fetch_sub(1, Ordering::SeqCst);
                })
                .await;
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert!(max_seen.load(Ordering::SeqCst) <= 2);
    }
}
