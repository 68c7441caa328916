//! Fixed-interval crawl delay
//!
//! The crawl loop is single-threaded, so a single "last cycle started at"
//! timestamp is enough: every dequeue-and-fetch cycle starts at least
//! `interval` after the previous one, whatever the previous outcome was.

use std::time::Duration;

use tokio::time::Instant;

/// Rate limit decision for a crawl request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    /// Request is allowed to proceed
    Allow,
    /// Request must wait; contains the remaining delay
    Deny { retry_after: Duration },
}

#[derive(Debug)]
pub struct CrawlDelay {
    interval: Duration,
    last_cycle: Option<Instant>,
}

impl CrawlDelay {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_cycle: None,
        }
    }

    /// Decide whether a new cycle may start now, without recording it
    #[must_use]
    pub fn check(&self) -> RateLimitDecision {
        match self.last_cycle {
            None => RateLimitDecision::Allow,
            Some(last) => {
                let elapsed = last.elapsed();
                if elapsed >= self.interval {
                    RateLimitDecision::Allow
                } else {
                    RateLimitDecision::Deny {
                        retry_after: self.interval - elapsed,
                    }
                }
            }
        }
    }

    /// Sleep until the next cycle may start, then record its start
    pub async fn wait(&mut self) {
        if let RateLimitDecision::Deny { retry_after } = self.check() {
            tokio::time::sleep(retry_after).await;
        }
        self.last_cycle = Some(Instant::now());
    }
}
