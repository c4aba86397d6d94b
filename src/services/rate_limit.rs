use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use actix_web::HttpRequest;

/// Fixed-window request counter for one client
#[derive(Debug, Clone, Copy)]
struct WindowState {
    count: u32,
    reset_at: Instant,
}

/// Outcome of a rate-limit check, with everything the HTTP layer needs
/// for the X-RateLimit response headers
#[derive(Debug, Clone, Copy)]
pub struct RateDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_secs: u64,
}

/// In-memory per-client rate limiter.
///
/// Windows are keyed by client address; expired windows are swept
/// opportunistically once the table grows past a threshold.
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    clients: Mutex<HashMap<String, WindowState>>,
}

const CLEANUP_THRESHOLD: usize = 1024;

impl RateLimiter {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        tracing::info!(max_requests, window_secs, "rate limiter initialized");
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Count one request for the client and decide whether it may pass
    pub fn check(&self, client_id: &str) -> RateDecision {
        let now = Instant::now();
        let mut clients = self.clients.lock().expect("rate limiter lock poisoned");

        if clients.len() > CLEANUP_THRESHOLD {
            clients.retain(|_, state| now < state.reset_at);
        }

        let state = clients
            .entry(client_id.to_string())
            .or_insert(WindowState {
                count: 0,
                reset_at: now + self.window,
            });

        if now >= state.reset_at {
            state.count = 0;
            state.reset_at = now + self.window;
        }

        state.count += 1;

        let reset_secs = state.reset_at.saturating_duration_since(now).as_secs();
        if state.count > self.max_requests {
            tracing::warn!(
                client = client_id,
                count = state.count,
                limit = self.max_requests,
                "rate limit exceeded"
            );
            return RateDecision {
                allowed: false,
                limit: self.max_requests,
                remaining: 0,
                reset_secs,
            };
        }

        RateDecision {
            allowed: true,
            limit: self.max_requests,
            remaining: self.max_requests - state.count,
            reset_secs,
        }
    }

    /// Number of tracked client windows (expired ones included until swept)
    pub fn tracked_clients(&self) -> usize {
        self.clients.lock().expect("rate limiter lock poisoned").len()
    }
}

/// Client identity for rate limiting: first X-Forwarded-For hop when
/// present, otherwise the peer address
pub fn client_id(req: &HttpRequest) -> String {
    if let Some(forwarded) = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
