//! # Write Guard
//!
//! Session-bound write tokens and origin checks for every mutating route.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GET /api/catalog                                                       │
//! │       └── issue_token(session) ──► { catalog, csrf_token }              │
//! │                                                                         │
//! │  POST / PATCH / DELETE                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  require_write_token (middleware)                                       │
//! │       ├── x-csrf-token header == session token?  no ──► 403             │
//! │       ├── Origin/Referer host not among the allowed                     │
//! │       │   hosts (configured, else request Host)? yes ─► 403             │
//! │       ▼                                                                 │
//! │  handler runs (cart / order state touched only here)                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, Method};
use axum::middleware::Next;
use axum::response::Response;
use tower_sessions::Session;
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use kiosk_core::SessionId;

use crate::error::ApiError;
use crate::state::ConfigState;

/// Header carrying the write token on mutating requests.
pub const CSRF_HEADER: &str = "x-csrf-token";

const CSRF_SESSION_KEY: &str = "csrf_token";
const CART_SESSION_KEY: &str = "cart_id";

// =============================================================================
// Session Values
// =============================================================================

/// Returns the session's write token, creating it on first use.
pub async fn issue_token(session: &Session) -> Result<String, ApiError> {
    if let Some(token) = session.get::<String>(CSRF_SESSION_KEY).await? {
        return Ok(token);
    }

    // 256 random bits, hex encoded
    let token = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
    session.insert(CSRF_SESSION_KEY, &token).await?;
    debug!("Issued write token");
    Ok(token)
}

/// Returns the stable id the session's cart is stored under.
///
/// The id lives in the session rather than being the session id itself,
/// which tower-sessions only assigns once the session is saved.
pub async fn cart_session(session: &Session) -> Result<SessionId, ApiError> {
    if let Some(id) = session.get::<String>(CART_SESSION_KEY).await? {
        return Ok(SessionId::new(id));
    }

    let id = Uuid::new_v4().simple().to_string();
    session.insert(CART_SESSION_KEY, &id).await?;
    Ok(SessionId::new(id))
}

// =============================================================================
// Middleware
// =============================================================================

/// Rejects mutating requests without a valid token or from a foreign origin.
///
/// Safe methods pass through untouched.
pub async fn require_write_token(
    State(config): State<Arc<ConfigState>>,
    session: Session,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if is_safe(request.method()) {
        return Ok(next.run(request).await);
    }

    let expected = session.get::<String>(CSRF_SESSION_KEY).await?;
    let submitted = request
        .headers()
        .get(CSRF_HEADER)
        .and_then(|value| value.to_str().ok());

    let token_ok = match (expected.as_deref(), submitted) {
        (Some(expected), Some(submitted)) if !submitted.is_empty() => {
            constant_time_eq(expected.as_bytes(), submitted.as_bytes())
        }
        _ => false,
    };
    if !token_ok {
        warn!(method = %request.method(), path = %request.uri().path(), "Rejected write: bad token");
        return Err(ApiError::forbidden("Invalid or missing form token."));
    }

    if !origin_allowed(request.headers(), &config.allowed_hosts) {
        warn!(method = %request.method(), path = %request.uri().path(), "Rejected write: origin");
        return Err(ApiError::forbidden("Request origin could not be verified."));
    }

    Ok(next.run(request).await)
}

fn is_safe(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

// =============================================================================
// Checks
// =============================================================================

/// Compares two byte strings without short-circuiting on the first mismatch.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// True when the `Origin` (else `Referer`) host is allowed.
///
/// The allowed hosts are the configured ones or, when none are configured,
/// the request's own `Host`. A request naming neither origin header is
/// rejected. With no configured hosts and no `Host` header there is nothing
/// to compare against and the request passes.
pub fn origin_allowed(headers: &HeaderMap, configured: &[String]) -> bool {
    let request_host;
    let allowed: &[String] = if configured.is_empty() {
        request_host = headers
            .get(header::HOST)
            .and_then(|value| value.to_str().ok())
            .and_then(|host| url_host(&format!("http://{host}")));
        match &request_host {
            Some(host) => std::slice::from_ref(host),
            None => return true,
        }
    } else {
        configured
    };

    [header::ORIGIN, header::REFERER]
        .iter()
        .filter_map(|name| headers.get(name))
        .filter_map(|value| value.to_str().ok())
        .filter_map(url_host)
        .any(|host| allowed.iter().any(|allowed| *allowed == host))
}

/// Lower-cased host of an absolute URL, without port.
fn url_host(value: &str) -> Option<String> {
    Url::parse(value).ok()?.host_str().map(str::to_ascii_lowercase)
}
