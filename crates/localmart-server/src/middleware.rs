use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use localmart_discovery::SessionId;
use serde::Serialize;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tokio::sync::Mutex;
use uuid::Uuid;

pub const SESSION_ID_HEADER: &str = "x-session-id";

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// API key auth settings used by middleware.
///
/// Keys are held only as salted SHA-256 digests.
#[derive(Debug, Clone)]
pub struct AuthState {
    key_digests: Arc<Vec<[u8; 32]>>,
    salt: Arc<str>,
    pub enabled: bool,
}

fn digest_key(salt: &str, key: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(key.as_bytes());
    hasher.finalize().into()
}

impl AuthState {
    /// Builds auth config from `LOCALMART_API_KEYS` (comma-separated bearer
    /// tokens), hashed with `salt`.
    ///
    /// In development, empty/missing keys disable auth for local iteration.
    /// In non-development envs, empty/missing keys fail startup.
    pub fn from_env(is_development: bool, salt: Option<&str>) -> anyhow::Result<Self> {
        let raw = std::env::var("LOCALMART_API_KEYS").unwrap_or_default();
        Self::from_keys(&raw, is_development, salt)
    }

    fn from_keys(raw: &str, is_development: bool, salt: Option<&str>) -> anyhow::Result<Self> {
        let salt: Arc<str> = Arc::from(salt.unwrap_or_default());
        let mut digests: Vec<[u8; 32]> = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|key| digest_key(&salt, key))
            .collect();
        digests.sort_unstable();
        digests.dedup();

        if digests.is_empty() {
            if is_development {
                tracing::warn!(
                    "LOCALMART_API_KEYS not set; bearer auth disabled in development environment"
                );
                return Ok(Self {
                    key_digests: Arc::new(Vec::new()),
                    salt,
                    enabled: false,
                });
            }

            anyhow::bail!(
                "LOCALMART_API_KEYS is required outside development; provide comma-separated bearer tokens"
            );
        }

        if salt.is_empty() {
            tracing::warn!("LOCALMART_API_KEY_HASH_SALT not set; API keys hashed without salt");
        }

        Ok(Self {
            key_digests: Arc::new(digests),
            salt,
            enabled: true,
        })
    }

    /// Development auth: disabled, no keys.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            key_digests: Arc::new(Vec::new()),
            salt: Arc::from(""),
            enabled: false,
        }
    }

    fn allows(&self, token: &str) -> bool {
        let presented = digest_key(&self.salt, token);
        self.key_digests
            .iter()
            .fold(subtle::Choice::from(0), |acc, known| {
                acc | known[..].ct_eq(&presented[..])
            })
            .into()
    }
}

#[derive(Debug, Clone)]
struct RateLimitWindow {
    started_at: Instant,
    count: usize,
}

/// Fixed-window limiter for simple API protection.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    max_requests: usize,
    window: Duration,
    state: Arc<Mutex<RateLimitWindow>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            state: Arc::new(Mutex::new(RateLimitWindow {
                started_at: Instant::now(),
                count: 0,
            })),
        }
    }
}

#[derive(Debug, Serialize)]
struct MiddlewareErrorBody {
    error: MiddlewareError,
}

#[derive(Debug, Serialize)]
struct MiddlewareError {
    code: &'static str,
    message: &'static str,
}

fn middleware_error(status: StatusCode, code: &'static str, message: &'static str) -> Response {
    (
        status,
        Json(MiddlewareErrorBody {
            error: MiddlewareError { code, message },
        }),
    )
        .into_response()
}

/// Axum middleware that extracts or generates a request ID.
///
/// If the incoming request has an `x-request-id` header, that value is used.
/// Otherwise a new `UUIDv4` is generated. The ID is:
/// - Inserted into request extensions as [`RequestId`]
/// - Set on the response as the `x-request-id` header
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

/// Axum middleware that attaches the browsing session to the request.
///
/// A missing `x-session-id` header starts a new session; the id is echoed on
/// the response so the client can keep it. A malformed header is rejected.
pub async fn session_id(mut req: Request, next: Next) -> Response {
    let header = req
        .headers()
        .get(SESSION_ID_HEADER)
        .map(|v| v.to_str().ok().and_then(|s| s.parse::<SessionId>().ok()));

    let session = match header {
        None => SessionId::new(),
        Some(Some(session)) => session,
        Some(None) => {
            return middleware_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                "x-session-id must be a UUID",
            );
        }
    };

    req.extensions_mut().insert(session);
    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&session.to_string()) {
        res.headers_mut().insert(SESSION_ID_HEADER, val);
    }

    res
}

/// Middleware enforcing Bearer token auth when enabled.
pub async fn require_bearer_auth(
    State(auth): State<AuthState>,
    req: Request,
    next: Next,
) -> Response {
    if !auth.enabled {
        return next.run(req).await;
    }

    let token = extract_bearer_token(req.headers().get(AUTHORIZATION));

    match token {
        Some(token) if auth.allows(token) => next.run(req).await,
        _ => middleware_error(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "missing or invalid bearer token",
        ),
    }
}

/// Middleware enforcing a fixed request-per-window limit.
pub async fn enforce_rate_limit(
    State(rate_limit): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    let mut window = rate_limit.state.lock().await;
    let elapsed = window.started_at.elapsed();

    if elapsed >= rate_limit.window {
        window.started_at = Instant::now();
        window.count = 0;
    }

    if window.count >= rate_limit.max_requests {
        return middleware_error(
            StatusCode::TOO_MANY_REQUESTS,
            "rate_limited",
            "rate limit exceeded",
        );
    }

    window.count += 1;
    drop(window);

    next.run(req).await
}

fn extract_bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_bearer_token_accepts_valid_header() {
        let header = HeaderValue::from_static("Bearer test-token");
        assert_eq!(extract_bearer_token(Some(&header)), Some("test-token"));
    }

    #[test]
    fn extract_bearer_token_rejects_non_bearer_header() {
        let header = HeaderValue::from_static("Basic abc123");
        assert_eq!(extract_bearer_token(Some(&header)), None);
    }

    #[test]
    fn auth_state_disables_when_no_keys_in_dev() {
        let state = AuthState::from_keys("", true, None).expect("dev should allow missing keys");
        assert!(!state.enabled);
    }

    #[test]
    fn auth_state_requires_keys_outside_dev() {
        assert!(AuthState::from_keys(" , ", false, Some("pepper")).is_err());
    }

    #[test]
    fn auth_state_matches_only_configured_keys() {
        let state = AuthState::from_keys("alpha, beta", false, Some("pepper")).expect("auth");
        assert!(state.enabled);
        assert!(state.allows("alpha"));
        assert!(state.allows("beta"));
        assert!(!state.allows("gamma"));
        assert!(!state.allows("alpha "));
    }

    #[test]
    fn salt_changes_the_digest() {
        assert_ne!(digest_key("a", "key"), digest_key("b", "key"));
    }
}
