use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderValue, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    refilled_at: Instant,
}

/// Token bucket shared by every route it wraps. Holds at most `rps` tokens
/// and refills `rps` per second.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    rps: f64,
    bucket: Arc<Mutex<Bucket>>,
}

impl RateLimiter {
    pub fn new(rps: u32) -> Self {
        let rps = f64::from(rps.max(1));
        Self {
            rps,
            bucket: Arc::new(Mutex::new(Bucket {
                tokens: rps,
                refilled_at: Instant::now(),
            })),
        }
    }

    fn try_acquire(&self) -> Result<(), Duration> {
        self.take_at(Instant::now())
    }

    /// Spends one token, or reports how long until one is available.
    fn take_at(&self, now: Instant) -> Result<(), Duration> {
        let mut bucket = self.bucket.lock().unwrap_or_else(PoisonError::into_inner);
        let earned = now.saturating_duration_since(bucket.refilled_at).as_secs_f64() * self.rps;
        bucket.tokens = (bucket.tokens + earned).min(self.rps);
        bucket.refilled_at = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            return Ok(());
        }
        Err(Duration::from_secs_f64((1.0 - bucket.tokens) / self.rps))
    }
}

fn too_many_requests(wait: Duration) -> Response {
    let mut resp = (
        StatusCode::TOO_MANY_REQUESTS,
        Json(json!({"error": "rate limit exceeded", "kind": "rate_limited"})),
    )
        .into_response();
    // Retry-After is whole seconds; round up so clients never come back early.
    let secs = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
    if let Ok(value) = HeaderValue::from_str(&secs.max(1).to_string()) {
        resp.headers_mut().insert(header::RETRY_AFTER, value);
    }
    resp
}

pub async fn rps_middleware(
    State(limiter): State<RateLimiter>,
    req: Request<Body>,
    next: Next,
) -> Response {
    match limiter.try_acquire() {
        Ok(()) => next.run(req).await,
        Err(wait) => {
            tracing::warn!(path = %req.uri().path(), wait_ms = wait.as_millis() as u64, "rate limit exceeded");
            too_many_requests(wait)
        }
    }
}
