//! API authentication middleware.
//!
//! The token is read **once at startup**, from `server.api_token` in the
//! config file or, failing that, the env var named by
//! `server.api_token_env` (default `CF_API_TOKEN`); only its SHA-256
//! digest is cached in `AppState`.
//! - If a token is configured, every protected request must carry
//!   `Authorization: Bearer <token>`.
//! - If no token is configured, the server logs a warning once and
//!   allows unauthenticated access (dev mode).

use axum::body::Body;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::state::AppState;

/// Pulls the token out of an `Authorization: Bearer <token>` header, if any.
fn bearer_token<'a>(req: &'a Request<Body>) -> Option<&'a str> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Axum middleware that enforces bearer-token authentication on
/// protected routes. Attach via `axum::middleware::from_fn_with_state`.
pub async fn require_api_token(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let Some(expected) = state.api_token_digest.as_deref() else {
        // Dev mode: no token configured, everything passes.
        return next.run(req).await;
    };

    // Digesting the presented token first gives both sides a fixed
    // length, so the comparison neither branches on nor leaks it.
    let presented = Sha256::digest(bearer_token(&req).unwrap_or("").as_bytes());

    if bool::from(presented.ct_eq(expected)) {
        next.run(req).await
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "error": "invalid or missing API token" })),
        )
            .into_response()
    }
}
