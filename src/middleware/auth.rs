use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::error::AppError;
use crate::services::AuthService;
use crate::AppState;

/// Authentication middleware
/// Resolves the bearer token against the token table on every request and
/// inserts the matching `CurrentAdmin` into the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(token) if !token.trim().is_empty() => token.trim(),
        _ => {
            return Err(AppError::Unauthorized("Unauthenticated.".to_string()));
        }
    };

    let current_admin = AuthService::authenticate(&state.db, token).await?;

    request.extensions_mut().insert(current_admin);

    Ok(next.run(request).await)
}
