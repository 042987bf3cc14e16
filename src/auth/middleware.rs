use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use super::service::AuthService;
use crate::error::YardError;
use crate::server::ServerError;

/// Rejects requests without a valid `Authorization: Bearer <jwt>` header.
/// Verified [`Claims`](super::Claims) are attached as a request extension.
pub async fn require_bearer(
    State(auth): State<AuthService>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer ").or_else(|| v.strip_prefix("bearer ")))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| YardError::Unauthorized("missing bearer token".to_string()))?;

    let claims = auth.verify_token(token).map_err(|e| {
        debug!(path = %request.uri().path(), error = %e, "Rejected bearer token");
        e
    })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
