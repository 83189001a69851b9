use std::collections::VecDeque;
use tokio::time::{sleep_until, Duration, Instant};

/// Sliding-window request throttle for one API.
pub struct RequestThrottle {
    max_per_interval: usize,
    interval: Duration,
    timestamps: VecDeque<Instant>,
}

impl RequestThrottle {
    pub fn new(max_per_interval: usize, interval: Duration) -> Self {
        RequestThrottle {
            max_per_interval: max_per_interval.max(1),
            interval,
            timestamps: VecDeque::new(),
        }
    }

    pub fn check_and_record(&mut self) -> bool {
        let now = Instant::now();
        self.evict(now);

        // Check limit
        if self.timestamps.len() >= self.max_per_interval {
            return false;
        }

        // Record new timestamp
        self.timestamps.push_back(now);
        true
    }

    /// Wait until a request slot is free, then take it.
    pub async fn acquire(&mut self) {
        while !self.check_and_record() {
            if let Some(&oldest) = self.timestamps.front() {
                sleep_until(oldest + self.interval).await;
            }
        }
    }

    fn evict(&mut self, now: Instant) {
        while let Some(&front) = self.timestamps.front() {
            if now.duration_since(front) >= self.interval {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }
    }
}
