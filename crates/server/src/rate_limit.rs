//! Fixed-window request limiter.
//!
//! One [`RateLimiter`] is created when the server starts and lives in its
//! state until the server stops. It counts requests per key (the acting
//! user) in fixed windows and knows nothing about the ledger.

use std::{
    collections::HashMap,
    sync::Mutex,
    time::{Duration, Instant},
};

use uuid::Uuid;

/// Keys are pruned once the table grows past this size.
const PRUNE_THRESHOLD: usize = 1024;

#[derive(Debug)]
struct Window {
    started: Instant,
    count: u32,
}

#[derive(Debug)]
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    windows: Mutex<HashMap<Uuid, Window>>,
}

impl RateLimiter {
    /// Allow `limit` requests per key every `window`. A limit of 0 disables
    /// limiting.
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Record a request for `key` and return whether it is allowed.
    pub fn check(&self, key: Uuid) -> bool {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: Uuid, now: Instant) -> bool {
        if self.limit == 0 {
            return true;
        }
        let mut windows = match self.windows.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if windows.len() > PRUNE_THRESHOLD {
            let window = self.window;
            windows.retain(|_, w| now.duration_since(w.started) < window);
        }

        let entry = windows.entry(key).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.duration_since(entry.started) >= self.window {
            entry.started = now;
            entry.count = 0;
        }
        if entry.count >= self.limit {
            return false;
        }
        entry.count += 1;
        true
    }
}
