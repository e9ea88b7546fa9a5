use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed { remaining: usize },
    Limited { retry_after: Duration },
}

/// Per-key sliding window. Each key keeps the instants of its requests that
/// are still inside the window; keys with none left are dropped.
#[derive(Debug, Clone)]
pub struct SlidingWindowLimiter {
    inner: Arc<Mutex<Buckets>>,
    window: Duration,
    max_requests: usize,
}

#[derive(Debug, Default)]
struct Buckets {
    by_key: HashMap<String, VecDeque<Instant>>,
    last_sweep: Option<Instant>,
}

impl SlidingWindowLimiter {
    pub fn new(window: Duration, max_requests: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Buckets::default())),
            window,
            max_requests: max_requests.max(1),
        }
    }

    pub fn check(&self, key: &str) -> RateDecision {
        self.check_at(key, Instant::now())
    }

    /// Number of keys currently holding a bucket.
    pub fn tracked_keys(&self) -> usize {
        self.inner.lock().by_key.len()
    }

    fn check_at(&self, key: &str, now: Instant) -> RateDecision {
        let mut guard = self.inner.lock();
        self.sweep(&mut guard, now);

        let queue = guard.by_key.entry(key.to_string()).or_default();
        self.expire(queue, now);

        if let Some(oldest) = queue.front().copied() {
            if queue.len() >= self.max_requests {
                let elapsed = now.duration_since(oldest);
                return RateDecision::Limited {
                    retry_after: self.window.saturating_sub(elapsed),
                };
            }
        }

        queue.push_back(now);
        RateDecision::Allowed {
            remaining: self.max_requests - queue.len(),
        }
    }

    /// At most once per window, drops every key whose requests have all expired.
    fn sweep(&self, buckets: &mut Buckets, now: Instant) {
        let due = buckets
            .last_sweep
            .map_or(true, |last| now.duration_since(last) >= self.window);
        if !due {
            return;
        }

        buckets.last_sweep = Some(now);
        buckets.by_key.retain(|_, queue| {
            self.expire(queue, now);
            !queue.is_empty()
        });
    }

    fn expire(&self, queue: &mut VecDeque<Instant>, now: Instant) {
        while let Some(front) = queue.front() {
            if now.duration_since(*front) >= self.window {
                queue.pop_front();
            } else {
                break;
            }
        }
    }
}
