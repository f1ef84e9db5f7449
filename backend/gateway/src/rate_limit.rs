//! Gateway Rate Limiting
//!
//! Fixed-window per-client request counter, applied to problem submission.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Per-client fixed-window limiter.
#[derive(Clone)]
pub struct RateLimiter {
    // client key -> (request_count, window_start)
    windows: Arc<RwLock<HashMap<String, (u32, Instant)>>>,
    max_requests: u32,
    window: Duration,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(30, 60)
    }
}

impl RateLimiter {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            windows: Arc::new(RwLock::new(HashMap::new())),
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }

    /// Whether a request from the given client is allowed right now.
    pub async fn check(&self, client: &str) -> bool {
        let mut windows = self.windows.write().await;
        let now = Instant::now();
        let entry = windows.entry(client.to_string()).or_insert((0, now));

        if now.duration_since(entry.1) > self.window {
            *entry = (1, now);
            debug!(client = %client, "Rate limit window reset");
            return true;
        }

        entry.0 += 1;
        if entry.0 > self.max_requests {
            warn!(client = %client, "Rate limit exceeded");
            false
        } else {
            debug!(client = %client, count = entry.0, max = self.max_requests, "Rate limit OK");
            true
        }
    }
}
