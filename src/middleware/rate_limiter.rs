//! Optional per-client rate limiting for the embedding routes

use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per window
    pub max_requests: usize,
    /// Time window duration
    pub window_duration: Duration,
    /// Whether to enable rate limiting
    pub enabled: bool,
    /// Key clients by the first `x-forwarded-for` hop instead of the peer address.
    /// Only safe behind a proxy that overwrites the header.
    pub trust_forwarded_for: bool,
}

impl RateLimitConfig {
    /// Fixed one-minute window; zero requests per minute disables limiting
    pub fn per_minute(max_requests: usize) -> Self {
        Self {
            max_requests,
            window_duration: Duration::from_secs(60),
            enabled: max_requests > 0,
            trust_forwarded_for: false,
        }
    }

    pub fn with_forwarded_for(mut self, trust: bool) -> Self {
        self.trust_forwarded_for = trust;
        self
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::per_minute(0)
    }
}

#[derive(Debug, Clone)]
struct RequestRecord {
    count: usize,
    window_start: Instant,
}

/// Fixed-window rate limiter keyed by client id
pub struct RateLimiter {
    config: RateLimitConfig,
    records: Arc<DashMap<String, RequestRecord>>,
}

impl RateLimiter {
    /// Create a new rate limiter
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            records: Arc::new(DashMap::new()),
        }
    }

    /// Whether limiting is active
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn trusts_forwarded_for(&self) -> bool {
        self.config.trust_forwarded_for
    }

    /// Count a request for `client_id`, failing once the window is exhausted
    pub fn check_rate_limit(&self, client_id: &str) -> Result<(), RateLimitError> {
        if !self.config.enabled {
            return Ok(());
        }

        let now = Instant::now();

        let mut entry = self
            .records
            .entry(client_id.to_string())
            .or_insert(RequestRecord {
                count: 0,
                window_start: now,
            });

        let record = entry.value_mut();

        if now.duration_since(record.window_start) >= self.config.window_duration {
            record.count = 0;
            record.window_start = now;
        }

        if record.count >= self.config.max_requests {
            let retry_after = self
                .config
                .window_duration
                .saturating_sub(now.duration_since(record.window_start));

            warn!(
                "Rate limit exceeded for client: {} ({} requests in window)",
                client_id, record.count
            );

            return Err(RateLimitError::LimitExceeded {
                retry_after,
                limit: self.config.max_requests,
            });
        }

        record.count += 1;
        debug!(
            "Request allowed for client: {} ({}/{})",
            client_id, record.count, self.config.max_requests
        );

        Ok(())
    }

    /// Drop records whose window has elapsed
    pub fn cleanup_expired(&self) {
        let now = Instant::now();

        self.records.retain(|_, record| {
            now.duration_since(record.window_start) < self.config.window_duration
        });

        debug!("Cleaned up expired rate limit records");
    }

    /// Start background cleanup task
    pub fn start_cleanup_task(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.config.window_duration);
            loop {
                interval.tick().await;
                self.cleanup_expired();
            }
        })
    }

    /// Number of clients currently tracked
    pub fn tracked_clients(&self) -> usize {
        self.records.len()
    }
}

/// Rate limit error
#[derive(Debug, Clone, thiserror::Error)]
pub enum RateLimitError {
    #[error("Rate limit exceeded. Retry after {retry_after:?}. Limit: {limit} requests per minute")]
    LimitExceeded { retry_after: Duration, limit: usize },
}
